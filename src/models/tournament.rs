//! Tournament and TournamentPhase.

use crate::models::entry::{Entry, Pair, TargetType};
use crate::models::vote::VoteRecord;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet, VecDeque};
use thiserror::Error;

/// Errors that can occur during tournament operations.
#[derive(Clone, Debug, Eq, PartialEq, Error)]
pub enum TournamentError {
    /// Tournament is not in a state that allows this action.
    #[error("Invalid state for this action")]
    InvalidState,
    /// Cannot start without a loaded list.
    #[error("No entries loaded")]
    NoEntries,
    #[error("Number of rounds must be at least 1 (got {0})")]
    InvalidRounds(u32),
    /// The chosen winner is not part of the current pair.
    #[error("'{0}' is not in the current pair")]
    WinnerNotInPair(String),
}

/// Current phase, derived from the tournament flags.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TournamentPhase {
    /// List may be loaded and rounds chosen; no votes yet.
    #[default]
    NotStarted,
    /// A pair is waiting for a vote.
    InRound,
    /// Started, not finished, but nothing queued.
    RoundComplete,
    /// All rounds voted; only the ranking remains.
    Finished,
}

/// Full tournament state: entries, scores, pair queue, history.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Tournament {
    pub username: String,
    pub target_type: TargetType,
    /// Entries in provider order (used for stable tie-breaks).
    pub entries: Vec<Entry>,
    /// Number of rounds to play.
    pub rounds: u32,
    /// 0 before the start, then 1..=rounds.
    pub current_round: u32,
    /// Pairs still to vote on this round, head first.
    pub pairs: VecDeque<Pair>,
    /// Pairs generated for the current round.
    pub round_pair_total: usize,
    /// Pairs already voted in the current round.
    pub round_pairs_voted: usize,
    /// Cumulative points per title.
    pub scores: HashMap<String, i32>,
    pub history: Vec<VoteRecord>,
    pub finished: bool,
    /// Resolved poster URLs by external id.
    pub posters: HashMap<String, String>,
    pub started: bool,
}

impl Default for Tournament {
    fn default() -> Self {
        Self::new()
    }
}

impl Tournament {
    /// Create an empty tournament: no entries, one round, not started.
    pub fn new() -> Self {
        Self {
            username: String::new(),
            target_type: TargetType::Anime,
            entries: Vec::new(),
            rounds: 1,
            current_round: 0,
            pairs: VecDeque::new(),
            round_pair_total: 0,
            round_pairs_voted: 0,
            scores: HashMap::new(),
            history: Vec::new(),
            finished: false,
            posters: HashMap::new(),
            started: false,
        }
    }

    /// Create a not-yet-started tournament over these entries (scores at zero).
    pub fn with_entries(entries: Vec<Entry>, rounds: u32) -> Self {
        let scores = entries.iter().map(|e| (e.title.clone(), 0)).collect();
        Self {
            entries,
            scores,
            rounds,
            ..Self::new()
        }
    }

    pub fn phase(&self) -> TournamentPhase {
        if self.finished {
            TournamentPhase::Finished
        } else if !self.started {
            TournamentPhase::NotStarted
        } else if self.pairs.is_empty() {
            TournamentPhase::RoundComplete
        } else {
            TournamentPhase::InRound
        }
    }

    /// Pair awaiting a vote, if any.
    pub fn current_pair(&self) -> Option<&Pair> {
        self.pairs.front()
    }

    /// Cumulative score of a title (0 if unknown).
    pub fn score_of(&self, title: &str) -> i32 {
        self.scores.get(title).copied().unwrap_or(0)
    }

    pub fn entry(&self, title: &str) -> Option<&Entry> {
        self.entries.iter().find(|e| e.title == title)
    }

    pub fn can_undo(&self) -> bool {
        !self.history.is_empty()
    }

    /// Add `delta` to a title's cumulative score.
    pub(crate) fn add_points(&mut self, title: &str, delta: i32) {
        *self.scores.entry(title.to_string()).or_insert(0) += delta;
    }

    /// Entries of the current pair whose high-resolution poster is not cached yet.
    pub fn entries_missing_poster(&self) -> Vec<Entry> {
        self.current_pair()
            .map(|p| {
                [&p.first, &p.second]
                    .into_iter()
                    .filter(|e| !self.posters.contains_key(&e.external_id))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Check the structural invariants. Used when restoring a snapshot.
    pub fn validate(&self) -> Result<(), String> {
        let mut titles = HashSet::new();
        for e in &self.entries {
            if !titles.insert(e.title.as_str()) {
                return Err(format!("duplicate entry title '{}'", e.title));
            }
        }
        if self.scores.len() != titles.len()
            || self.scores.keys().any(|t| !titles.contains(t.as_str()))
        {
            return Err("scores do not match the entry list".into());
        }
        if self.rounds == 0 {
            return Err("rounds must be at least 1".into());
        }
        if self.current_round > self.rounds {
            return Err(format!(
                "current round {} exceeds {} rounds",
                self.current_round, self.rounds
            ));
        }
        if self.started == (self.current_round == 0) {
            return Err("started flag disagrees with current round".into());
        }
        if !self.started && (!self.pairs.is_empty() || !self.history.is_empty() || self.finished) {
            return Err("tournament not started but has progress".into());
        }
        if self.finished && !self.pairs.is_empty() {
            return Err("finished tournament has pending pairs".into());
        }
        if self.pairs.len() + self.round_pairs_voted != self.round_pair_total {
            return Err("pair counters do not match the queue".into());
        }
        let known = |p: &Pair| p.titles().iter().all(|t| titles.contains(t));
        if !self.pairs.iter().all(known) || !self.history.iter().all(|r| known(&r.pair)) {
            return Err("pair references an unknown entry".into());
        }
        Ok(())
    }
}
