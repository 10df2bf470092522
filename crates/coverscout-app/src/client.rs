// HTTP collaborators: the option sources and the coverage solver.
//
// Both are reached through async traits so the event loop can be driven by
// in-memory fakes in tests. `HttpClient` implements both against the
// coverage service.

use std::time::Duration;

use async_trait::async_trait;
use coverscout_core::error::Failure;
use coverscout_core::model::{Game, SolverResponse};
use coverscout_core::query::CoverageQuery;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::debug;

use crate::config::ServiceConfig;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    #[error("request to {url} failed: {message}")]
    Transport { url: String, message: String },

    #[error("{url} answered with status {status}")]
    Status { url: String, status: u16 },

    #[error("could not decode response from {url}: {message}")]
    Decode { url: String, message: String },
}

impl FetchError {
    /// Classify a failed solver call. The service answers with a non-success
    /// status when no package covers the selection.
    pub fn into_solver_failure(self) -> Failure {
        match self {
            FetchError::Status { .. } => Failure::EmptyResult,
            other => Failure::FetchFailure {
                detail: other.to_string(),
            },
        }
    }
}

// ---------------------------------------------------------------------------
// Collaborator traits
// ---------------------------------------------------------------------------

/// Read endpoints for the three pickers. Consumed once at startup.
#[async_trait]
pub trait OptionSource: Send + Sync {
    async fn games(&self) -> Result<Vec<Game>, FetchError>;
    async fn teams(&self) -> Result<Vec<String>, FetchError>;
    async fn tournaments(&self) -> Result<Vec<String>, FetchError>;
}

/// Computes package coverage for a committed selection.
#[async_trait]
pub trait CoverageSolver: Send + Sync {
    async fn solve(&self, query: &CoverageQuery) -> Result<SolverResponse, FetchError>;
}

// ---------------------------------------------------------------------------
// HttpClient
// ---------------------------------------------------------------------------

#[derive(Clone)]
pub struct HttpClient {
    http: reqwest::Client,
    base_url: String,
}

impl HttpClient {
    pub fn new(config: &ServiceConfig) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;
        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, FetchError> {
        let url = self.url(path);
        debug!(%url, "GET");
        let resp = self
            .http
            .get(&url)
            .query(query)
            .send()
            .await
            .map_err(|e| FetchError::Transport {
                url: url.clone(),
                message: e.to_string(),
            })?;
        if !resp.status().is_success() {
            return Err(FetchError::Status {
                url,
                status: resp.status().as_u16(),
            });
        }
        let body = resp.text().await.map_err(|e| FetchError::Transport {
            url: url.clone(),
            message: e.to_string(),
        })?;
        serde_json::from_str(&body).map_err(|e| FetchError::Decode {
            url,
            message: e.to_string(),
        })
    }
}

#[async_trait]
impl OptionSource for HttpClient {
    async fn games(&self) -> Result<Vec<Game>, FetchError> {
        self.get_json("games", &[]).await
    }

    async fn teams(&self) -> Result<Vec<String>, FetchError> {
        self.get_json("teams", &[]).await
    }

    async fn tournaments(&self) -> Result<Vec<String>, FetchError> {
        self.get_json("tournaments", &[]).await
    }
}

#[async_trait]
impl CoverageSolver for HttpClient {
    async fn solve(&self, query: &CoverageQuery) -> Result<SolverResponse, FetchError> {
        self.get_json("", &query.to_query_pairs()).await
    }
}
