//! Read-only views handed to the presentation layer.

use crate::models::entry::{Entry, TargetType};
use crate::models::tournament::TournamentPhase;
use serde::Serialize;

/// One row of the final ranking.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct Standing {
    /// 1-based position.
    pub rank: usize,
    pub title: String,
    pub score: i32,
    pub base_score: i32,
    pub permalink: String,
}

/// An entry of the current pair plus its best known poster.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct PairSide {
    #[serde(flatten)]
    pub entry: Entry,
    pub poster: Option<String>,
}

/// Everything the UI needs to render the tournament.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct TournamentView {
    pub phase: TournamentPhase,
    pub username: String,
    pub target_type: TargetType,
    pub entry_count: usize,
    pub rounds: u32,
    pub current_round: u32,
    pub current_pair: Option<[PairSide; 2]>,
    /// 1-based number of the current pair within the round.
    pub pair_number: usize,
    pub total_pairs: usize,
    pub remaining_pairs: usize,
    pub can_undo: bool,
    pub finished: bool,
    pub ranking: Vec<Standing>,
}
