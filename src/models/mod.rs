//! Data structures for the tournament: entries, pairs, votes, tournament state.

mod entry;
mod tournament;
mod view;
mod vote;

pub use entry::{Entry, Pair, TargetType};
pub use tournament::{Tournament, TournamentError, TournamentPhase};
pub use view::{PairSide, Standing, TournamentView};
pub use vote::{Ballot, VoteRecord, DRAW_POINTS, WIN_POINTS};
