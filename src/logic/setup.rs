//! Setup phase: commit a loaded list, choose rounds, start, reset.

use crate::logic::pairing::generate_pairs;
use crate::models::{Entry, TargetType, Tournament, TournamentError, TournamentPhase};
use std::collections::HashSet;

/// Replace the tournament's list with a freshly loaded catalog.
///
/// Only valid before the start. Duplicate titles are dropped (first one wins) since the
/// title is the scoring key. Keeps the chosen number of rounds.
pub fn load_entries(
    tournament: &mut Tournament,
    username: impl Into<String>,
    target_type: TargetType,
    entries: Vec<Entry>,
) -> Result<(), TournamentError> {
    if tournament.phase() != TournamentPhase::NotStarted {
        return Err(TournamentError::InvalidState);
    }
    let mut seen = HashSet::new();
    let total = entries.len();
    let entries: Vec<Entry> = entries
        .into_iter()
        .filter(|e| seen.insert(e.title.clone()))
        .collect();
    if entries.len() < total {
        log::warn!(
            "Dropped {} entries with duplicate titles",
            total - entries.len()
        );
    }

    let rounds = tournament.rounds;
    *tournament = Tournament::with_entries(entries, rounds);
    tournament.username = username.into();
    tournament.target_type = target_type;
    Ok(())
}

/// Set how many rounds to play (only valid before the start).
pub fn set_rounds(tournament: &mut Tournament, rounds: u32) -> Result<(), TournamentError> {
    if tournament.phase() != TournamentPhase::NotStarted {
        return Err(TournamentError::InvalidState);
    }
    if rounds == 0 {
        return Err(TournamentError::InvalidRounds(rounds));
    }
    tournament.rounds = rounds;
    Ok(())
}

/// Start the tournament: pair round 1 and open voting.
///
/// With a single entry nothing can be paired and the tournament finishes immediately.
pub fn start_tournament(tournament: &mut Tournament) -> Result<(), TournamentError> {
    if tournament.phase() != TournamentPhase::NotStarted {
        return Err(TournamentError::InvalidState);
    }
    if tournament.entries.is_empty() {
        return Err(TournamentError::NoEntries);
    }

    tournament.started = true;
    tournament.current_round = 1;
    tournament.history.clear();
    let pairs = generate_pairs(&tournament.entries, &tournament.scores);
    tournament.round_pair_total = pairs.len();
    tournament.round_pairs_voted = 0;
    tournament.pairs = pairs.into();
    if tournament.pairs.is_empty() {
        tournament.finished = true;
    }
    log::info!(
        "Tournament started for '{}': {} entries, {} rounds, {} pairs in round 1",
        tournament.username,
        tournament.entries.len(),
        tournament.rounds,
        tournament.round_pair_total
    );
    Ok(())
}

/// Back to the empty initial state, including the list type and round count.
pub fn reset_tournament(tournament: &mut Tournament) {
    *tournament = Tournament::new();
}
