//! Backend Feeds
//!
//! [`FeedSource`] is the seam between the poller and the network. The
//! production implementation, [`HttpFeed`], fetches the two JSON feeds with
//! reqwest. Tests substitute scripted sources.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use serde::de::DeserializeOwned;
use thiserror::Error;
use windlink_core::{Device, Waypoint};

/// Path of the device position feed, relative to the backend base URL
pub const POSITIONS_PATH: &str = "get_positions";

/// Path of the shortest path feed, relative to the backend base URL
pub const SHORTEST_PATH_PATH: &str = "get_shortest_path";

#[derive(Debug, Error)]
pub enum FeedError {
    #[error("Invalid backend URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("Cannot build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("Request to {url} failed: {source}")]
    Request {
        url: Url,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} returned {status}")]
    Status { url: Url, status: StatusCode },

    #[error("Malformed JSON from {url}: {source}")]
    Decode {
        url: Url,
        #[source]
        source: serde_json::Error,
    },
}

/// Source of the two feeds consumed by the dashboard
#[async_trait]
pub trait FeedSource: Send + Sync + 'static {
    /// Current device positions
    async fn positions(&self) -> Result<Vec<Device>, FeedError>;

    /// Current shortest path, ordered start to end
    async fn shortest_path(&self) -> Result<Vec<Waypoint>, FeedError>;
}

/// Fetches the feeds from an HTTP backend
#[derive(Debug, Clone)]
pub struct HttpFeed {
    client: Client,
    positions_url: Url,
    path_url: Url,
}

impl HttpFeed {
    /// Create a feed client for the backend at `base`
    ///
    /// Feed paths are resolved relative to `base`, so a backend mounted
    /// below a prefix (`http://host/feeds`) works with or without a
    /// trailing slash.
    pub fn new(base: &str, timeout: Option<Duration>) -> Result<Self, FeedError> {
        let mut base_url = Url::parse(base).map_err(|e| FeedError::InvalidUrl {
            url: base.to_string(),
            reason: e.to_string(),
        })?;
        if base_url.cannot_be_a_base() {
            return Err(FeedError::InvalidUrl {
                url: base.to_string(),
                reason: "not a base URL".to_string(),
            });
        }
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        let join = |path: &str| {
            base_url.join(path).map_err(|e| FeedError::InvalidUrl {
                url: base.to_string(),
                reason: e.to_string(),
            })
        };
        let positions_url = join(POSITIONS_PATH)?;
        let path_url = join(SHORTEST_PATH_PATH)?;

        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().map_err(FeedError::Client)?;

        Ok(HttpFeed {
            client,
            positions_url,
            path_url,
        })
    }

    pub fn positions_url(&self) -> &Url {
        &self.positions_url
    }

    pub fn path_url(&self) -> &Url {
        &self.path_url
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &Url) -> Result<T, FeedError> {
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|source| FeedError::Request {
                url: url.clone(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FeedError::Status {
                url: url.clone(),
                status,
            });
        }

        let body = response.bytes().await.map_err(|source| FeedError::Request {
            url: url.clone(),
            source,
        })?;
        serde_json::from_slice(&body).map_err(|source| FeedError::Decode {
            url: url.clone(),
            source,
        })
    }
}

#[async_trait]
impl FeedSource for HttpFeed {
    async fn positions(&self) -> Result<Vec<Device>, FeedError> {
        self.get_json(&self.positions_url).await
    }

    async fn shortest_path(&self) -> Result<Vec<Waypoint>, FeedError> {
        self.get_json(&self.path_url).await
    }
}
