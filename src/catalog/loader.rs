//! Load a user's completed entries and resolve posters for display.

use super::client::{ListRate, ShikimoriClient, PAGE_SIZE};
use super::transport::{Delay, Transport};
use super::CatalogError;
use crate::models::{Entry, TargetType};
use crate::storage::{cache_poster, cached_poster, KeyValueStore};
use std::collections::HashMap;

/// Provider status of a finished title.
const COMPLETED: &str = "completed";

/// Fetch every page of the user's list and keep the completed entries.
///
/// Paging stops at the first page shorter than [`PAGE_SIZE`]. Nothing is returned unless
/// every request succeeded.
pub async fn load_completed_entries<T: Transport, D: Delay>(
    client: &ShikimoriClient<T, D>,
    username: &str,
    target: TargetType,
) -> Result<Vec<Entry>, CatalogError> {
    let user_id = client
        .find_user_id(username)
        .await?
        .ok_or_else(|| CatalogError::UserNotFound(username.to_string()))?;

    let mut rates: Vec<ListRate> = Vec::new();
    let mut page = 1;
    loop {
        let batch = client.list_page(&user_id, target, page).await?;
        let fetched = batch.len();
        rates.extend(batch);
        if fetched < PAGE_SIZE {
            break;
        }
        page += 1;
    }

    let entries: Vec<Entry> = rates
        .iter()
        .filter(|r| r.status == COMPLETED)
        .filter_map(|r| {
            let media = r.media()?;
            Some(Entry {
                title: media.name.clone(),
                external_id: media.id.clone(),
                permalink: media.url.clone().unwrap_or_default(),
                poster_url: media.poster.as_ref().and_then(|p| p.mini_url.clone()),
                base_score: r.score,
            })
        })
        .collect();
    log::info!(
        "Loaded {} completed {} entries for '{}' ({} rows over {} pages)",
        entries.len(),
        target.as_str(),
        username,
        rates.len(),
        page
    );
    Ok(entries)
}

/// Resolve large posters for `entries`, using and filling the store's poster cache.
///
/// Lookup failures are logged and skipped; the result only holds resolved URLs,
/// keyed by external id.
pub async fn resolve_posters<T: Transport, D: Delay>(
    client: &ShikimoriClient<T, D>,
    store: &dyn KeyValueStore,
    target: TargetType,
    entries: &[Entry],
) -> HashMap<String, String> {
    let mut found = HashMap::new();
    for entry in entries {
        if found.contains_key(&entry.external_id) {
            continue;
        }
        if let Some(url) = cached_poster(store, target.as_str(), &entry.external_id) {
            log::debug!("Poster for {} from cache", entry.external_id);
            found.insert(entry.external_id.clone(), url);
            continue;
        }
        match client.poster(target, &entry.external_id).await {
            Ok(Some(url)) => {
                if let Err(e) = cache_poster(store, target.as_str(), &entry.external_id, &url) {
                    log::warn!("Could not cache poster for {}: {}", entry.external_id, e);
                }
                found.insert(entry.external_id.clone(), url);
            }
            Ok(None) => log::debug!("No poster for {}", entry.external_id),
            Err(e) => log::error!("Error fetching poster for {}: {}", entry.external_id, e),
        }
    }
    found
}
