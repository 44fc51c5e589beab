//! Tournament business logic: setup, pairing, voting, ranking.

mod pairing;
mod ranking;
mod setup;
mod voting;

pub use pairing::generate_pairs;
pub use ranking::{ranking, tournament_view, write_ranking_csv};
pub use setup::{load_entries, reset_tournament, set_rounds, start_tournament};
pub use voting::{undo_last_vote, vote};
