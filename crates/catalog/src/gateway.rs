//! Fetch gateway: one request per call, normalized results, fallback data on
//! any failure.
//!
//! The gateway never returns an error. Transport failures, non-2xx statuses
//! and malformed bodies are logged and answered with a slice of the static
//! fallback catalog, so callers always have something to render.

use crate::api::{ApiError, ListResponse, MetadataClient};
use crate::fallback;
use crate::normalize::{normalize_anime, normalize_details};
use serde::{Deserialize, Serialize};
use shared::{Anime, AnimeStatus, SearchFilters};
use std::future::Future;
use tracing::{info, warn};

/// Listing category
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Section {
    #[default]
    Trending,
    Popular,
    Ongoing,
    Completed,
    Search,
}

impl Section {
    pub const BROWSABLE: &'static [Section] = &[
        Section::Trending,
        Section::Popular,
        Section::Ongoing,
        Section::Completed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Section::Trending => "trending",
            Section::Popular => "popular",
            Section::Ongoing => "ongoing",
            Section::Completed => "completed",
            Section::Search => "search",
        }
    }
}

impl std::fmt::Display for Section {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Section {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "trending" => Ok(Section::Trending),
            "popular" => Ok(Section::Popular),
            "ongoing" => Ok(Section::Ongoing),
            "completed" => Ok(Section::Completed),
            "search" => Ok(Section::Search),
            _ => Err(anyhow::anyhow!("Invalid section: {}", s)),
        }
    }
}

/// Everything needed to fetch one page of a listing
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListingRequest {
    pub section: Section,
    pub query: String,
    pub filters: SearchFilters,
    pub page: u32,
}

/// Source of listing pages for the listing controller.
///
/// `FetchGateway` is the production implementation and never fails; the
/// error path exists for sources that can.
pub trait CatalogSource: Send + Sync + 'static {
    fn fetch_listing(
        &self,
        request: &ListingRequest,
    ) -> impl Future<Output = anyhow::Result<Vec<Anime>>> + Send;
}

/// Gateway over the metadata API with static fallback data
#[derive(Debug, Clone)]
pub struct FetchGateway {
    client: MetadataClient,
}

impl FetchGateway {
    pub fn new(client: MetadataClient) -> Self {
        Self { client }
    }

    /// Normalize a list response, or log the failure and use `fallback`
    fn list_or_fallback(
        operation: &'static str,
        result: Result<ListResponse, ApiError>,
        fallback: impl FnOnce() -> Vec<Anime>,
    ) -> Vec<Anime> {
        match result {
            Ok(response) => {
                let items: Vec<Anime> = response.results.into_iter().map(normalize_anime).collect();
                info!(operation = operation, count = items.len(), "Fetched anime");
                items
            }
            Err(e) => {
                let items = fallback();
                warn!(
                    operation = operation,
                    error = %e,
                    fallback_count = items.len(),
                    "Fetch failed, serving fallback data"
                );
                items
            }
        }
    }

    pub async fn fetch_trending(&self, page: u32) -> Vec<Anime> {
        let result = self.client.trending(page).await;
        Self::list_or_fallback("trending", result, fallback::all)
    }

    pub async fn fetch_popular(&self, page: u32) -> Vec<Anime> {
        let result = self.client.popular(page).await;
        Self::list_or_fallback("popular", result, fallback::popular)
    }

    /// Currently airing anime. The endpoint filters server-side, so every
    /// result is marked ongoing.
    pub async fn fetch_ongoing(&self, page: u32) -> Vec<Anime> {
        let result = self.client.by_status("Ongoing", page).await.map(|mut response| {
            response.results.iter_mut().for_each(|raw| raw.status = Some("Ongoing".to_string()));
            response
        });
        Self::list_or_fallback("ongoing", result, || fallback::with_status(AnimeStatus::Ongoing))
    }

    /// Finished anime. Every result is marked completed with all episodes out.
    pub async fn fetch_completed(&self, page: u32) -> Vec<Anime> {
        let result = self.client.by_status("Completed", page).await;
        let mut items = Self::list_or_fallback("completed", result, || {
            fallback::with_status(AnimeStatus::Completed)
        });
        for anime in &mut items {
            anime.status = AnimeStatus::Completed;
            anime.current_episode = anime.total_episodes;
        }
        items
    }

    /// Title search with optional `genre`/`status`/`year` filters. The
    /// fallback matches title or genre substrings, ignoring case.
    pub async fn search(&self, query: &str, filters: &SearchFilters, page: u32) -> Vec<Anime> {
        let result = self.client.search(query, filters, page).await;
        Self::list_or_fallback("search", result, || fallback::matching(query))
    }

    pub async fn fetch_by_genre(&self, genre: &str, page: u32) -> Vec<Anime> {
        let result = self.client.by_genre(genre, page).await;
        Self::list_or_fallback("genre", result, || fallback::with_genre(genre))
    }

    /// Full details with episodes, or the fallback entry with the same id
    pub async fn fetch_by_id(&self, id: &str) -> Option<Anime> {
        match self.client.info(id).await {
            Ok(raw) => Some(normalize_details(raw)),
            Err(e) => {
                let found = fallback::by_id(id);
                warn!(
                    id = id,
                    error = %e,
                    fallback_hit = found.is_some(),
                    "Fetch failed, looking up fallback data"
                );
                found
            }
        }
    }

    /// Dispatch a listing request to the matching section fetch. A search
    /// without a query lists trending anime.
    pub async fn fetch_section(&self, request: &ListingRequest) -> Vec<Anime> {
        let page = request.page.max(1);
        match request.section {
            Section::Trending => self.fetch_trending(page).await,
            Section::Popular => self.fetch_popular(page).await,
            Section::Ongoing => self.fetch_ongoing(page).await,
            Section::Completed => self.fetch_completed(page).await,
            Section::Search if request.query.trim().is_empty() => self.fetch_trending(page).await,
            Section::Search => self.search(&request.query, &request.filters, page).await,
        }
    }
}

impl CatalogSource for FetchGateway {
    async fn fetch_listing(&self, request: &ListingRequest) -> anyhow::Result<Vec<Anime>> {
        Ok(self.fetch_section(request).await)
    }
}
