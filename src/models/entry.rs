//! Entry, Pair, and TargetType.

use serde::{Deserialize, Serialize};

/// Which list the catalog provider is asked for.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetType {
    #[default]
    Anime,
    Manga,
}

impl TargetType {
    /// Value of the provider's `targetType` enum.
    pub fn as_graphql(self) -> &'static str {
        match self {
            TargetType::Anime => "Anime",
            TargetType::Manga => "Manga",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TargetType::Anime => "anime",
            TargetType::Manga => "manga",
        }
    }
}

/// One title being ranked. Immutable once loaded.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Entry {
    /// Unique key within a tournament.
    pub title: String,
    /// Provider id (used for poster lookups).
    pub external_id: String,
    pub permalink: String,
    /// Small poster from the list query, if the provider returned one.
    pub poster_url: Option<String>,
    /// The user's own rating on the provider.
    pub base_score: i32,
}

impl Entry {
    pub fn new(title: impl Into<String>, external_id: impl Into<String>, base_score: i32) -> Self {
        Self {
            title: title.into(),
            external_id: external_id.into(),
            permalink: String::new(),
            poster_url: None,
            base_score,
        }
    }
}

/// Two entries compared head-to-head in one voting step.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Pair {
    pub first: Entry,
    pub second: Entry,
}

impl Pair {
    pub fn new(first: Entry, second: Entry) -> Self {
        Self { first, second }
    }

    /// The pair member with this title, if any.
    pub fn get(&self, title: &str) -> Option<&Entry> {
        [&self.first, &self.second]
            .into_iter()
            .find(|e| e.title == title)
    }

    pub fn titles(&self) -> [&str; 2] {
        [self.first.title.as_str(), self.second.title.as_str()]
    }
}
