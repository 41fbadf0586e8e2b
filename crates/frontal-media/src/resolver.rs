//! Confirms that a remote media location is usable before it is loaded.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{StatusCode, Url, header};

/// Reasons a candidate location could not be confirmed.
#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    #[error("invalid media location: {0}")]
    InvalidUri(String),
    #[error("unsupported media location scheme: {0}")]
    UnsupportedScheme(String),
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("media server answered with {0}")]
    Status(StatusCode),
    #[error("local media file does not exist")]
    MissingFile,
    #[error("failed to check local media file: {0}")]
    Io(#[from] std::io::Error),
}

/// Checks that a candidate location is reachable and returns the location
/// that should actually be loaded (after redirects, for example).
#[async_trait]
pub trait UriResolver: Send + Sync {
    async fn probe(&self, candidate: &str) -> Result<String, ResolveError>;
}

/// Attempts to confirm `candidate` within `timeout`.
///
/// Never fails: a timeout, network error or unusable answer yields
/// `fallback`, and the caller decides how to present that.
pub async fn resolve_uri(
    resolver: &dyn UriResolver,
    candidate: &str,
    timeout: Duration,
    fallback: Option<String>,
) -> Option<String> {
    match tokio::time::timeout(timeout, resolver.probe(candidate)).await {
        Ok(Ok(resolved)) => Some(resolved),
        Ok(Err(error)) => {
            log::warn!("Could not resolve {candidate}: {error}");
            fallback
        }
        Err(_) => {
            log::warn!("Resolving {candidate} timed out after {}ms", timeout.as_millis());
            fallback
        }
    }
}

/// Resolver probing `http(s)` locations with a `HEAD` request and `file`
/// locations with an existence check.
#[derive(Debug, Clone, Default)]
pub struct HttpUriResolver {
    client: reqwest::Client,
}

impl HttpUriResolver {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }

    async fn probe_http(&self, url: Url) -> Result<String, ResolveError> {
        let response = self.client.head(url).send().await?;
        let response = match response.status() {
            // some CDNs refuse HEAD, ask the final location for a single byte
            StatusCode::METHOD_NOT_ALLOWED | StatusCode::NOT_IMPLEMENTED => {
                self.client
                    .get(response.url().clone())
                    .header(header::RANGE, "bytes=0-0")
                    .send()
                    .await?
            }
            _ => response,
        };

        let status = response.status();
        if !status.is_success() {
            return Err(ResolveError::Status(status));
        }
        Ok(response.url().to_string())
    }
}

#[async_trait]
impl UriResolver for HttpUriResolver {
    async fn probe(&self, candidate: &str) -> Result<String, ResolveError> {
        let url =
            Url::parse(candidate).map_err(|error| ResolveError::InvalidUri(error.to_string()))?;
        match url.scheme() {
            "http" | "https" => self.probe_http(url).await,
            "file" => {
                let path = url
                    .to_file_path()
                    .map_err(|_| ResolveError::UnsupportedScheme("file".into()))?;
                if tokio::fs::try_exists(&path).await? {
                    Ok(candidate.to_string())
                } else {
                    Err(ResolveError::MissingFile)
                }
            }
            other => Err(ResolveError::UnsupportedScheme(other.to_string())),
        }
    }
}
