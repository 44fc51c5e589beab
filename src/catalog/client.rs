//! Shikimori GraphQL client: user lookup, paged list rates, poster lookup.

use super::transport::{Delay, Transport};
use super::CatalogError;
use crate::models::TargetType;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;

/// Rows per `userRates` page; a shorter page is the last one.
pub const PAGE_SIZE: usize = 50;

const USER_QUERY: &str = r#"
query FindUser($search: String) {
  users(search: $search) {
    id
  }
}
"#;

const ANIME_RATES_QUERY: &str = r#"
query AnimeRates($userId: ID, $page: PositiveInt, $limit: PositiveInt) {
  userRates(userId: $userId, page: $page, limit: $limit, targetType: Anime, order: { field: updated_at, order: desc }) {
    id
    score
    status
    anime { id name url poster { miniUrl } }
  }
}
"#;

const MANGA_RATES_QUERY: &str = r#"
query MangaRates($userId: ID, $page: PositiveInt, $limit: PositiveInt) {
  userRates(userId: $userId, page: $page, limit: $limit, targetType: Manga, order: { field: updated_at, order: desc }) {
    id
    score
    status
    manga { id name url poster { miniUrl } }
  }
}
"#;

const ANIME_POSTER_QUERY: &str = r#"
query AnimePoster($ids: String) {
  animes(ids: $ids) {
    poster { originalUrl mainUrl }
  }
}
"#;

const MANGA_POSTER_QUERY: &str = r#"
query MangaPoster($ids: String) {
  mangas(ids: $ids) {
    poster { originalUrl mainUrl }
  }
}
"#;

/// How HTTP 429 responses are retried.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct RetryPolicy {
    /// Fixed wait before each retry.
    pub backoff: Duration,
    /// None retries until the provider stops rate limiting.
    pub max_retries: Option<u32>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            backoff: Duration::from_millis(2000),
            max_retries: None,
        }
    }
}

#[derive(Debug, Deserialize)]
struct GraphqlResponse<T> {
    data: Option<T>,
    errors: Option<Vec<GraphqlError>>,
}

#[derive(Debug, Deserialize)]
struct GraphqlError {
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct UsersData {
    #[serde(default)]
    users: Vec<UserNode>,
}

#[derive(Debug, Deserialize)]
struct UserNode {
    id: Value,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RatesData {
    #[serde(default)]
    user_rates: Vec<ListRate>,
}

/// One row of the user's list.
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct ListRate {
    pub status: String,
    #[serde(default)]
    pub score: i32,
    #[serde(default)]
    pub anime: Option<MediaNode>,
    #[serde(default)]
    pub manga: Option<MediaNode>,
}

impl ListRate {
    /// The anime or manga this row is about.
    pub fn media(&self) -> Option<&MediaNode> {
        self.anime.as_ref().or(self.manga.as_ref())
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct MediaNode {
    #[serde(deserialize_with = "id_as_string")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub poster: Option<PosterNode>,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PosterNode {
    #[serde(default)]
    pub mini_url: Option<String>,
    #[serde(default)]
    pub main_url: Option<String>,
    #[serde(default)]
    pub original_url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PosterData {
    #[serde(default, alias = "mangas")]
    animes: Vec<PosterHolder>,
}

#[derive(Debug, Deserialize)]
struct PosterHolder {
    poster: Option<PosterNode>,
}

/// GraphQL ids come back as strings; accept numbers too.
fn id_as_string<'de, D: serde::Deserializer<'de>>(d: D) -> Result<String, D::Error> {
    match Value::deserialize(d)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!("unexpected id {other}"))),
    }
}

/// Client over any [`Transport`], waiting on rate limits through a [`Delay`].
pub struct ShikimoriClient<T, D> {
    transport: T,
    delay: D,
    retry: RetryPolicy,
}

impl<T: Transport, D: Delay> ShikimoriClient<T, D> {
    pub fn new(transport: T, delay: D, retry: RetryPolicy) -> Self {
        Self {
            transport,
            delay,
            retry,
        }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn delay(&self) -> &D {
        &self.delay
    }

    /// Send one query; 429s are retried per the policy, GraphQL errors are surfaced.
    async fn request<R: DeserializeOwned>(&self, query: &str, variables: Value) -> Result<R, CatalogError> {
        let body = json!({ "query": query, "variables": variables });
        let mut retries = 0u32;
        let resp = loop {
            let resp = self.transport.post_json(&body).await?;
            if resp.status != 429 {
                break resp;
            }
            if self.retry.max_retries.is_some_and(|max| retries >= max) {
                return Err(CatalogError::RateLimited {
                    attempts: retries + 1,
                });
            }
            retries += 1;
            log::warn!(
                "Rate limited by catalog provider, retry {} in {:?}",
                retries,
                self.retry.backoff
            );
            self.delay.wait(self.retry.backoff).await;
        };

        if !(200..300).contains(&resp.status) {
            return Err(CatalogError::Status {
                status: resp.status,
                body: resp.body,
            });
        }
        let parsed: GraphqlResponse<R> = serde_json::from_str(&resp.body)?;
        if let Some(errors) = parsed.errors {
            let message = errors
                .into_iter()
                .filter_map(|e| e.message)
                .collect::<Vec<_>>()
                .join(", ");
            if !message.is_empty() {
                return Err(CatalogError::Graphql(message));
            }
        }
        parsed.data.ok_or(CatalogError::MissingData)
    }

    /// Id of the first user matching `username`, or None.
    pub async fn find_user_id(&self, username: &str) -> Result<Option<String>, CatalogError> {
        let data: UsersData = self
            .request(USER_QUERY, json!({ "search": username }))
            .await?;
        Ok(data.users.into_iter().next().and_then(|u| match u.id {
            Value::String(s) => Some(s),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }))
    }

    /// One page (1-based) of the user's list.
    pub async fn list_page(
        &self,
        user_id: &str,
        target: TargetType,
        page: u32,
    ) -> Result<Vec<ListRate>, CatalogError> {
        let query = match target {
            TargetType::Anime => ANIME_RATES_QUERY,
            TargetType::Manga => MANGA_RATES_QUERY,
        };
        let data: RatesData = self
            .request(
                query,
                json!({ "userId": user_id, "page": page, "limit": PAGE_SIZE }),
            )
            .await?;
        Ok(data.user_rates)
    }

    /// Large poster for one title: original size, else main size.
    pub async fn poster(&self, target: TargetType, external_id: &str) -> Result<Option<String>, CatalogError> {
        let query = match target {
            TargetType::Anime => ANIME_POSTER_QUERY,
            TargetType::Manga => MANGA_POSTER_QUERY,
        };
        let data: PosterData = self.request(query, json!({ "ids": external_id })).await?;
        Ok(data
            .animes
            .into_iter()
            .next()
            .and_then(|h| h.poster)
            .and_then(|p| p.original_url.or(p.main_url)))
    }
}
