//! Integration tests for round pairing.

use anime_tournament_web::{generate_pairs, Entry};
use std::collections::HashMap;

fn entries(rows: &[(&str, i32)]) -> Vec<Entry> {
    rows.iter()
        .enumerate()
        .map(|(i, (title, base))| Entry::new(*title, i.to_string(), *base))
        .collect()
}

fn zero_scores(list: &[Entry]) -> HashMap<String, i32> {
    list.iter().map(|e| (e.title.clone(), 0)).collect()
}

fn titles(pairs: &[anime_tournament_web::Pair]) -> Vec<(String, String)> {
    pairs
        .iter()
        .map(|p| (p.first.title.clone(), p.second.title.clone()))
        .collect()
}

#[test]
fn pairs_by_descending_base_score() {
    let list = entries(&[("A", 5), ("B", 3), ("C", 8), ("D", 1)]);
    let pairs = generate_pairs(&list, &zero_scores(&list));
    assert_eq!(
        titles(&pairs),
        vec![("C".into(), "A".into()), ("B".into(), "D".into())]
    );
}

#[test]
fn even_count_uses_every_entry_once() {
    let list = entries(&[("A", 7), ("B", 2), ("C", 9), ("D", 4), ("E", 6), ("F", 1)]);
    let pairs = generate_pairs(&list, &zero_scores(&list));
    assert_eq!(pairs.len(), 3);
    let mut seen: Vec<&str> = pairs.iter().flat_map(|p| p.titles()).collect();
    seen.sort_unstable();
    assert_eq!(seen, vec!["A", "B", "C", "D", "E", "F"]);
}

#[test]
fn odd_count_drops_lowest_round_score() {
    let list = entries(&[("A", 4), ("B", 9), ("C", 1), ("D", 6), ("E", 3)]);
    let pairs = generate_pairs(&list, &zero_scores(&list));
    assert_eq!(pairs.len(), 2);
    assert!(pairs.iter().all(|p| !p.titles().contains(&"C")));
}

#[test]
fn ties_keep_insertion_order() {
    let list = entries(&[("A", 5), ("B", 5), ("C", 5), ("D", 5)]);
    let pairs = generate_pairs(&list, &zero_scores(&list));
    assert_eq!(
        titles(&pairs),
        vec![("A".into(), "B".into()), ("C".into(), "D".into())]
    );
}

#[test]
fn cumulative_scores_reorder_entries() {
    let list = entries(&[("A", 5), ("B", 3), ("C", 8), ("D", 1)]);
    let mut scores = zero_scores(&list);
    scores.insert("D".into(), 10); // 11
    scores.insert("B".into(), 4); // 7
    let pairs = generate_pairs(&list, &scores);
    assert_eq!(
        titles(&pairs),
        vec![("D".into(), "C".into()), ("B".into(), "A".into())]
    );
}

#[test]
fn missing_score_counts_as_zero() {
    let list = entries(&[("A", 1), ("B", 2)]);
    let pairs = generate_pairs(&list, &HashMap::new());
    assert_eq!(titles(&pairs), vec![("B".into(), "A".into())]);
}

#[test]
fn fewer_than_two_entries_gives_no_pairs() {
    assert!(generate_pairs(&[], &HashMap::new()).is_empty());
    let one = entries(&[("A", 3)]);
    assert!(generate_pairs(&one, &zero_scores(&one)).is_empty());
}
