//! Final ranking, CSV export, and the presentation view.

use crate::models::{Entry, PairSide, Standing, Tournament, TournamentView};
use std::io::Write;

/// Entries by cumulative score, highest first. Ties keep entry-list order.
pub fn ranking(tournament: &Tournament) -> Vec<Standing> {
    let mut rows: Vec<_> = tournament
        .entries
        .iter()
        .map(|e| (e, tournament.score_of(&e.title)))
        .collect();
    rows.sort_by(|a, b| b.1.cmp(&a.1));
    rows.into_iter()
        .enumerate()
        .map(|(i, (e, score))| Standing {
            rank: i + 1,
            title: e.title.clone(),
            score,
            base_score: e.base_score,
            permalink: e.permalink.clone(),
        })
        .collect()
}

/// Write standings as CSV with a header row.
pub fn write_ranking_csv<W: Write>(standings: &[Standing], writer: W) -> Result<(), csv::Error> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(["rank", "title", "score", "base_score", "permalink"])?;
    for s in standings {
        wtr.write_record([
            s.rank.to_string(),
            s.title.clone(),
            s.score.to_string(),
            s.base_score.to_string(),
            s.permalink.clone(),
        ])?;
    }
    wtr.flush()?;
    Ok(())
}

/// Snapshot of what the UI renders: round, current pair, counters, undo, ranking.
pub fn tournament_view(tournament: &Tournament) -> TournamentView {
    let side = |e: &Entry| PairSide {
        poster: tournament
            .posters
            .get(&e.external_id)
            .cloned()
            .or_else(|| e.poster_url.clone()),
        entry: e.clone(),
    };
    let current_pair = tournament
        .current_pair()
        .map(|p| [side(&p.first), side(&p.second)]);
    let pair_number = if current_pair.is_some() {
        tournament.round_pairs_voted + 1
    } else {
        tournament.round_pairs_voted
    };

    TournamentView {
        phase: tournament.phase(),
        username: tournament.username.clone(),
        target_type: tournament.target_type,
        entry_count: tournament.entries.len(),
        rounds: tournament.rounds,
        current_round: tournament.current_round,
        current_pair,
        pair_number,
        total_pairs: tournament.round_pair_total,
        remaining_pairs: tournament.pairs.len(),
        can_undo: tournament.can_undo(),
        finished: tournament.finished,
        ranking: ranking(tournament),
    }
}
