// HTTP client for the loot feed API

use std::time::Duration;

use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use thiserror::Error;

use backend_domain::{LootEntry, LootPage, MAX_LOOT_LIMIT};

use crate::filters::CategoryFilter;

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Not found")]
    NotFound,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedQuery {
    pub limit: usize,
    pub category: CategoryFilter,
    pub character: Option<String>,
}

impl Default for FeedQuery {
    fn default() -> Self {
        Self {
            limit: MAX_LOOT_LIMIT,
            category: CategoryFilter::All,
            character: None,
        }
    }
}

impl FeedQuery {
    fn params(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![("limit", self.limit.to_string())];
        if let Some(category) = self.category.as_query() {
            params.push(("category", category.to_string()));
        }
        if let Some(character) = &self.character {
            params.push(("character", character.clone()));
        }
        params
    }
}

pub struct LootApiClient {
    base_url: String,
    http: reqwest::Client,
}

impl LootApiClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ClientError> {
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http: reqwest::Client::builder().timeout(timeout).build()?,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn fetch_page(&self, query: &FeedQuery) -> Result<LootPage, ClientError> {
        let url = format!("{}/api/loot", self.base_url);
        let response = self.http.get(&url).query(&query.params()).send().await?;
        handle_response(response).await
    }

    /// The API has no lookup by id; searches the newest page instead.
    pub async fn find_entry(&self, id: &str) -> Result<LootEntry, ClientError> {
        let page = self.fetch_page(&FeedQuery::default()).await?;
        page.logs
            .into_iter()
            .find(|entry| entry.id == id)
            .ok_or(ClientError::NotFound)
    }

    /// WebSocket endpoint pushing newly stored valuable entries.
    pub fn stream_url(&self) -> String {
        let ws_base = if let Some(rest) = self.base_url.strip_prefix("https://") {
            format!("wss://{rest}")
        } else if let Some(rest) = self.base_url.strip_prefix("http://") {
            format!("ws://{rest}")
        } else {
            self.base_url.clone()
        };
        format!("{ws_base}/api/loot/stream")
    }
}

pub(crate) async fn handle_response<T: DeserializeOwned>(
    response: reqwest::Response,
) -> Result<T, ClientError> {
    let status = response.status();

    if status == StatusCode::NOT_FOUND {
        return Err(ClientError::NotFound);
    }

    if !status.is_success() {
        let message = response.text().await.unwrap_or_default();
        return Err(ClientError::Api {
            status: status.as_u16(),
            message,
        });
    }

    let body = response.json().await?;
    Ok(body)
}
