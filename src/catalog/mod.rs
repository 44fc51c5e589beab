//! Entry catalog: the user's list and posters from the Shikimori GraphQL API.

mod client;
mod loader;
mod transport;

use crate::models::TargetType;
use thiserror::Error;

pub use client::{ListRate, MediaNode, PosterNode, RetryPolicy, ShikimoriClient, PAGE_SIZE};
pub use loader::{load_completed_entries, resolve_posters};
pub use transport::{Delay, HttpTransport, RawResponse, TokioDelay, Transport};

/// Default provider endpoint.
pub const DEFAULT_CATALOG_URL: &str = "https://shikimori.one/api/graphql";

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("provider returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("JSON deserialization failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("GraphQL error: {0}")]
    Graphql(String),

    #[error("response missing data")]
    MissingData,

    #[error("user '{0}' not found")]
    UserNotFound(String),

    #[error("still rate limited after {attempts} attempts")]
    RateLimited { attempts: u32 },
}

impl CatalogError {
    /// Single message shown to the user; details go to the log.
    pub fn user_message(&self, target: TargetType) -> String {
        match self {
            CatalogError::UserNotFound(_) => "User not found. Please check the username.".to_string(),
            _ => format!("Error fetching {} list.", target.as_str()),
        }
    }
}
