//! Ballots and the vote history.

use crate::models::entry::{Entry, Pair};
use serde::{Deserialize, Serialize};

/// What the voter picked for the current pair.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Ballot {
    /// The entry with this title wins (+2).
    Win(String),
    /// Both entries get +1.
    Draw,
}

/// Points for a win.
pub const WIN_POINTS: i32 = 2;
/// Points each entry gets on a draw.
pub const DRAW_POINTS: i32 = 1;

/// One cast vote, kept so it can be undone.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct VoteRecord {
    /// The pair as it was presented.
    pub pair: Pair,
    /// None on a draw.
    pub winner: Option<Entry>,
    pub is_draw: bool,
    /// Round in which the vote was cast.
    pub round: u32,
}

impl VoteRecord {
    /// Score changes this vote applied, as (title, delta).
    pub fn deltas(&self) -> Vec<(&str, i32)> {
        match (&self.winner, self.is_draw) {
            (Some(w), false) => vec![(w.title.as_str(), WIN_POINTS)],
            _ => self
                .pair
                .titles()
                .into_iter()
                .map(|t| (t, DRAW_POINTS))
                .collect(),
        }
    }
}
