pub mod client;

pub use client::{UpstreamBody, UpstreamClient, UpstreamResponse};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("Upstream base URL is not configured")]
    NotConfigured,

    #[error("Invalid upstream URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("Upstream request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Upstream returned invalid JSON from {url}: {source}")]
    InvalidBody {
        url: String,
        #[source]
        source: serde_json::Error,
    },
}
