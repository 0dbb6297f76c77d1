//! Consumet metadata API client.

use super::error::ApiError;
use super::types::*;
use anyhow::{Context, Result};
use reqwest::{Client, Url};
use serde::de::DeserializeOwned;
use shared::config::{EndpointConfig, MetadataConfig};
use shared::SearchFilters;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Consumet AniList meta provider client
#[derive(Debug, Clone)]
pub struct MetadataClient {
    /// HTTP client
    client: Client,
    /// Base URL, without trailing slash
    base_url: String,
    /// Endpoint paths
    endpoints: EndpointConfig,
}

impl MetadataClient {
    /// Create a new client from the `[metadata]` configuration
    pub fn new(config: &MetadataConfig) -> Result<Self> {
        let mut builder = Client::builder().user_agent(config.user_agent.as_str());
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let client = builder.build().context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            endpoints: config.endpoints.clone(),
        })
    }

    /// Build `{base}{path}[/{segment}][?query]`, percent-encoding the segment
    /// and query values. `page` is only sent past the first page.
    fn url(
        &self,
        path: &str,
        segment: Option<&str>,
        query: &[(&str, String)],
        page: u32,
    ) -> Result<Url, ApiError> {
        let raw = format!("{}{}", self.base_url, path);
        let mut url = Url::parse(&raw).map_err(|e| ApiError::InvalidUrl {
            url: raw.clone(),
            reason: e.to_string(),
        })?;

        if let Some(segment) = segment {
            url.path_segments_mut()
                .map_err(|_| ApiError::InvalidUrl {
                    url: raw.clone(),
                    reason: "base URL cannot have path segments".to_string(),
                })?
                .push(segment);
        }

        let page_param = (page > 1).then(|| ("page", page.to_string()));
        let pairs: Vec<(&str, String)> = query.iter().cloned().chain(page_param).collect();
        if !pairs.is_empty() {
            url.query_pairs_mut().extend_pairs(pairs);
        }

        Ok(url)
    }

    /// Make a single GET request and decode the JSON body
    async fn get<T: DeserializeOwned>(&self, url: Url) -> Result<T, ApiError> {
        debug!(url = %url, "Making API request");

        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|source| ApiError::Transport {
                url: url.to_string(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());

            warn!(url = %url, status = %status, "Request failed");
            return Err(ApiError::Status {
                url: url.to_string(),
                status,
                body,
            });
        }

        let body = response.text().await.map_err(|source| ApiError::Transport {
            url: url.to_string(),
            source,
        })?;

        let data = serde_json::from_str(&body).map_err(|source| ApiError::Decode {
            url: url.to_string(),
            source,
        })?;

        debug!(url = %url, "Request successful");
        Ok(data)
    }

    /// Fetch trending anime
    pub async fn trending(&self, page: u32) -> Result<ListResponse, ApiError> {
        info!(page = page, "Fetching trending anime");
        let url = self.url(&self.endpoints.trending, None, &[], page)?;
        self.get(url).await
    }

    /// Fetch popular anime
    pub async fn popular(&self, page: u32) -> Result<ListResponse, ApiError> {
        info!(page = page, "Fetching popular anime");
        let url = self.url(&self.endpoints.popular, None, &[], page)?;
        self.get(url).await
    }

    /// Fetch anime by provider status (`Ongoing`, `Completed`)
    pub async fn by_status(&self, status: &str, page: u32) -> Result<ListResponse, ApiError> {
        info!(status = status, page = page, "Fetching anime by status");
        let query = [("status", status.to_string())];
        let url = self.url(&self.endpoints.advanced_search, None, &query, page)?;
        self.get(url).await
    }

    /// Fetch anime of a single genre
    pub async fn by_genre(&self, genre: &str, page: u32) -> Result<ListResponse, ApiError> {
        info!(genre = genre, page = page, "Fetching anime by genre");
        let query = [("genres", format!("[{}]", genre))];
        let url = self.url(&self.endpoints.advanced_search, None, &query, page)?;
        self.get(url).await
    }

    /// Search anime by title. `genre`, `status` and `year` filters are sent
    /// as `genres`, `status` and `year` query parameters.
    pub async fn search(
        &self,
        query: &str,
        filters: &SearchFilters,
        page: u32,
    ) -> Result<ListResponse, ApiError> {
        info!(query = query, page = page, filtered = !filters.is_empty(), "Searching anime");

        let mut params = Vec::new();
        if let Some(genre) = &filters.genre {
            params.push(("genres", genre.clone()));
        }
        if let Some(status) = &filters.status {
            params.push(("status", status.clone()));
        }
        if let Some(year) = filters.year {
            params.push(("year", year.to_string()));
        }

        let url = self.url(&self.endpoints.anime, Some(query), &params, page)?;
        self.get(url).await
    }

    /// Fetch full anime details, including episodes
    pub async fn info(&self, id: &str) -> Result<RawAnime, ApiError> {
        debug!(id = id, "Fetching anime details");
        let url = self.url(&self.endpoints.info, Some(id), &[], 1)?;
        self.get(url).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use serde_json::json;

    fn client_for(base_url: String) -> MetadataClient {
        MetadataClient::new(&MetadataConfig {
            base_url,
            ..Default::default()
        })
        .unwrap()
    }

    #[test]
    fn test_client_creation() {
        let client = MetadataClient::new(&MetadataConfig {
            base_url: "https://api.consumet.org/".to_string(),
            timeout_secs: Some(10),
            ..Default::default()
        });
        assert!(client.is_ok());
        assert_eq!(client.unwrap().base_url, "https://api.consumet.org");
    }

    #[test]
    fn test_url_building() {
        let client = client_for("https://api.consumet.org".to_string());

        let url = client.url("/meta/anilist/trending", None, &[], 1).unwrap();
        assert_eq!(url.as_str(), "https://api.consumet.org/meta/anilist/trending");

        let url = client.url("/meta/anilist/trending", None, &[], 3).unwrap();
        assert_eq!(url.as_str(), "https://api.consumet.org/meta/anilist/trending?page=3");

        let url = client
            .url("/meta/anilist", Some("one piece/film"), &[("year", "2023".to_string())], 1)
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://api.consumet.org/meta/anilist/one%20piece%2Ffilm?year=2023"
        );
    }

    #[test]
    fn test_invalid_base_url() {
        let client = client_for("not a url".to_string());
        let err = client.url("/meta/anilist/trending", None, &[], 1).unwrap_err();
        assert!(matches!(err, ApiError::InvalidUrl { .. }));
    }

    #[tokio::test]
    async fn test_search_sends_filters() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/meta/anilist/naruto")
                    .query_param("genres", "Action")
                    .query_param("year", "2002");
                then.status(200).json_body(json!({
                    "results": [{ "id": "20", "title": { "romaji": "Naruto" } }]
                }));
            })
            .await;

        let client = client_for(server.base_url());
        let filters = SearchFilters {
            genre: Some("Action".to_string()),
            year: Some(2002),
            ..Default::default()
        };

        let response = client.search("naruto", &filters, 1).await.unwrap();
        mock.assert_async().await;
        assert_eq!(response.results.len(), 1);
    }

    #[tokio::test]
    async fn test_status_error() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/meta/anilist/popular");
                then.status(503).body("maintenance");
            })
            .await;

        let client = client_for(server.base_url());
        let err = client.popular(1).await.unwrap_err();
        match err {
            ApiError::Status { status, body, .. } => {
                assert_eq!(status.as_u16(), 503);
                assert_eq!(body, "maintenance");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_malformed_json() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/meta/anilist/info/21");
                then.status(200).body("<html>not json</html>");
            })
            .await;

        let client = client_for(server.base_url());
        let err = client.info("21").await.unwrap_err();
        assert!(matches!(err, ApiError::Decode { .. }));
    }
}
