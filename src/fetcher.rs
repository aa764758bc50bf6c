//! Article download.
//!
//! Uses reqwest for fetching; URLs are validated with `url` before any request is made.

use crate::config::FetchConfig;
use reqwest::{redirect, Client};
use std::fmt;
use thiserror::Error;
use url::Url;

/// Maximum number of redirects followed before giving up
const MAX_REDIRECTS: usize = 10;

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("invalid URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },
    #[error("failed to fetch URL: {0}")]
    Request(#[from] reqwest::Error),
    #[error("request to {url} failed with status {status}")]
    Status { url: String, status: u16 },
}

/// A validated, absolute http(s) URL pointing at an article
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArticleSource(Url);

impl ArticleSource {
    /// Parse and validate a URL. Never touches the network.
    pub fn parse(input: &str) -> Result<Self, FetchError> {
        let trimmed = input.trim();
        let invalid = |reason: String| FetchError::InvalidUrl {
            url: trimmed.to_string(),
            reason,
        };

        let url = Url::parse(trimmed).map_err(|e| invalid(e.to_string()))?;
        match url.scheme() {
            "http" | "https" => {}
            other => return Err(invalid(format!("unsupported scheme '{other}'"))),
        }
        if url.host_str().map_or(true, str::is_empty) {
            return Err(invalid("missing host".to_string()));
        }

        Ok(Self(url))
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    pub fn url(&self) -> &Url {
        &self.0
    }
}

impl fmt::Display for ArticleSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0.as_str())
    }
}

/// The body of a successful response
#[derive(Debug, Clone)]
pub struct RawDocument {
    /// URL after redirects
    pub url: String,
    pub status: u16,
    pub html: String,
}

/// Create a configured HTTP client for article downloads
fn create_client(config: &FetchConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.user_agent.as_str())
        .timeout(config.timeout())
        .redirect(redirect::Policy::limited(MAX_REDIRECTS))
        .build()
}

/// Download the HTML behind `source`. One attempt, no retries.
pub async fn fetch(source: &ArticleSource, config: &FetchConfig) -> Result<RawDocument, FetchError> {
    let client = create_client(config)?;

    tracing::info!(url = %source, "fetching article");
    let response = client.get(source.url().clone()).send().await?;

    let status = response.status();
    let final_url = response.url().to_string();
    if !status.is_success() {
        tracing::warn!(url = %final_url, status = status.as_u16(), "article request rejected");
        return Err(FetchError::Status {
            url: final_url,
            status: status.as_u16(),
        });
    }

    let html = response.text().await?;
    tracing::debug!(bytes = html.len(), "article downloaded");

    Ok(RawDocument {
        url: final_url,
        status: status.as_u16(),
        html,
    })
}
