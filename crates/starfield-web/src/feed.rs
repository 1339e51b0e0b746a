//! Community feed: fetches the community list from the REST backend and
//! hands it to the scene

use bevy::prelude::*;
use serde::Deserialize;
use starfield_core::{CommunityId, CommunityRecord, UniverseKind};
use starfield_scene::{CommunitiesLoaded, SelectionRequest, UniverseState};
use std::sync::{Arc, Mutex};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FeedError {
    #[error("request to {url} failed: {message}")]
    Request { url: String, message: String },

    #[error("{url} answered with status {status}")]
    Status { url: String, status: u16 },

    #[error("invalid community list: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Where to fetch communities from and what to show
#[derive(Resource, Debug, Clone, Default, PartialEq)]
pub struct FeedConfig {
    /// HTTP(S) base URL of the backend, empty for same-origin
    pub api_base: String,
    pub kind: UniverseKind,
    /// Community to fly to once the list has loaded
    pub deep_link: Option<CommunityId>,
}

impl FeedConfig {
    /// Create config from URL query parameters or same-origin fallback
    #[cfg(target_arch = "wasm32")]
    pub fn from_browser() -> Self {
        let Some(window) = web_sys::window() else {
            return Self::default();
        };
        let location = window.location();
        let search = location.search().unwrap_or_default();
        let config = Self::from_query(&search);

        tracing::info!(api = %config.api_base, kind = ?config.kind, "Feed configured from URL");
        config
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn from_browser() -> Self {
        Self::default()
    }

    /// Build from a `?api=&user=&community=` query string
    pub fn from_query(search: &str) -> Self {
        let api_base = parse_query_param(search, "api")
            .map(|api| api.trim_end_matches('/').to_string())
            .unwrap_or_default();
        let kind = match parse_query_param(search, "user") {
            Some(owner) if !owner.is_empty() => UniverseKind::UserSpace { owner },
            _ => UniverseKind::Home,
        };
        let deep_link = parse_query_param(search, "community")
            .filter(|id| !id.is_empty())
            .map(CommunityId);

        Self {
            api_base,
            kind,
            deep_link,
        }
    }

    /// REST endpoint listing the communities for this universe
    pub fn endpoint(&self) -> String {
        match &self.kind {
            UniverseKind::Home => format!("{}/api/communities", self.api_base),
            UniverseKind::UserSpace { owner } => {
                format!("{}/api/users/{}/communities", self.api_base, owner)
            }
        }
    }
}

/// Parse a query parameter from a search string
fn parse_query_param(search: &str, param: &str) -> Option<String> {
    let search = search.trim_start_matches('?');
    for pair in search.split('&') {
        let mut parts = pair.splitn(2, '=');
        if let (Some(key), Some(value)) = (parts.next(), parts.next()) {
            if key == param {
                // URL decode the common escapes
                return Some(
                    value
                        .replace("%3A", ":")
                        .replace("%2F", "/")
                        .replace("%20", " ")
                        .replace('+', " "),
                );
            }
        }
    }
    None
}

/// The backend answers with a bare list; some deployments wrap it
#[derive(Deserialize)]
#[serde(untagged)]
enum CommunityList {
    Bare(Vec<CommunityRecord>),
    Wrapped { communities: Vec<CommunityRecord> },
}

pub fn parse_communities(text: &str) -> Result<Vec<CommunityRecord>, FeedError> {
    let list = serde_json::from_str::<CommunityList>(text)?;
    Ok(match list {
        CommunityList::Bare(records) => records,
        CommunityList::Wrapped { communities } => communities,
    })
}

/// Community list filled in by the fetch task, drained by the frame loop
#[derive(Resource, Default, Clone)]
pub struct PendingCommunities(pub Arc<Mutex<Option<Vec<CommunityRecord>>>>);

/// Deep link waiting for the list that contains it
#[derive(Resource, Default)]
struct PendingDeepLink(Option<CommunityId>);

pub struct FeedPlugin {
    pub config: FeedConfig,
}

impl Plugin for FeedPlugin {
    fn build(&self, app: &mut App) {
        app.insert_resource(self.config.clone())
            .insert_resource(PendingDeepLink(self.config.deep_link.clone()))
            .init_resource::<PendingCommunities>()
            .add_systems(Startup, fetch_communities)
            .add_systems(
                Update,
                (process_communities, follow_deep_link)
                    .chain()
                    .in_set(starfield_scene::UniverseSystems::Input),
            );
    }
}

/// Fetch communities from the REST API on startup
fn fetch_communities(pending: Res<PendingCommunities>, config: Res<FeedConfig>) {
    #[cfg(target_arch = "wasm32")]
    {
        use wasm_bindgen_futures::spawn_local;

        let pending = pending.0.clone();
        let url = config.endpoint();

        spawn_local(async move {
            tracing::info!("Fetching communities from: {}", url);
            match request_communities(&url).await {
                Ok(records) => {
                    if let Ok(mut slot) = pending.lock() {
                        *slot = Some(records);
                    }
                }
                Err(e) => {
                    tracing::warn!("Failed to fetch communities: {}", e);
                }
            }
        });
    }

    #[cfg(not(target_arch = "wasm32"))]
    {
        let _ = (pending, config);
        tracing::info!("Community feed not available in native mode");
    }
}

#[cfg(target_arch = "wasm32")]
async fn request_communities(url: &str) -> Result<Vec<CommunityRecord>, FeedError> {
    let request_error = |e: gloo_net::Error| FeedError::Request {
        url: url.to_string(),
        message: e.to_string(),
    };

    let response = gloo_net::http::Request::get(url)
        .send()
        .await
        .map_err(request_error)?;
    if !response.ok() {
        return Err(FeedError::Status {
            url: url.to_string(),
            status: response.status(),
        });
    }
    let text = response.text().await.map_err(request_error)?;
    parse_communities(&text)
}

fn process_communities(pending: Res<PendingCommunities>, mut loaded: MessageWriter<CommunitiesLoaded>) {
    let records = match pending.0.lock() {
        Ok(mut slot) => slot.take(),
        Err(_) => None,
    };

    if let Some(records) = records {
        tracing::info!("Received {} communities", records.len());
        loaded.write(CommunitiesLoaded(records));
    }
}

/// Issue the deep-linked selection once its community is in the registry.
/// Runs a frame after the list is applied, so the index is current.
fn follow_deep_link(
    mut deep_link: ResMut<PendingDeepLink>,
    universe: Res<UniverseState>,
    mut requests: MessageWriter<SelectionRequest>,
) {
    let Some(id) = deep_link.0.as_ref() else {
        return;
    };
    if universe.registry().is_empty() {
        return;
    }

    match universe.registry().index_of(id) {
        Some(index) => {
            tracing::info!(%id, index, "Following community deep link");
            requests.write(SelectionRequest::Search {
                index,
                generation: universe.registry().generation(),
            });
        }
        None => tracing::warn!(%id, "Deep-linked community not found"),
    }
    deep_link.0 = None;
}
