//! Anime tournament web app: library with models, tournament logic, catalog client, and storage.

pub mod catalog;
pub mod config;
pub mod logic;
pub mod models;
pub mod storage;

pub use logic::{
    generate_pairs, load_entries, ranking, reset_tournament, set_rounds, start_tournament,
    tournament_view, undo_last_vote, vote, write_ranking_csv,
};
pub use models::{
    Ballot, Entry, Pair, PairSide, Standing, TargetType, Tournament, TournamentError,
    TournamentPhase, TournamentView, VoteRecord,
};
