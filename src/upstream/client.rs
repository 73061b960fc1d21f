use std::time::Duration;

use axum::body::Bytes;
use reqwest::{header::CONTENT_TYPE, Method, StatusCode};
use serde_json::Value;
use url::Url;

use crate::config::UpstreamConfig;

use super::UpstreamError;

/// Relays catalog calls to the upstream service's own REST API.
#[derive(Debug, Clone)]
pub struct UpstreamClient {
    http: reqwest::Client,
    base_url: Option<Url>,
    token: Option<String>,
}

/// What the upstream answered, status and body as-is.
#[derive(Debug, Clone, PartialEq)]
pub struct UpstreamResponse {
    pub status: StatusCode,
    pub body: UpstreamBody,
}

#[derive(Debug, Clone, PartialEq)]
pub enum UpstreamBody {
    /// JSON, or an empty body as `null`
    Json(Value),
    /// Anything the upstream labelled with a non-JSON Content-Type
    Raw { content_type: String, bytes: Bytes },
}

impl UpstreamBody {
    pub fn json(&self) -> Option<&Value> {
        match self {
            UpstreamBody::Json(value) => Some(value),
            UpstreamBody::Raw { .. } => None,
        }
    }
}

fn is_json(content_type: &str) -> bool {
    let essence = content_type.split(';').next().unwrap_or_default().trim();
    essence.eq_ignore_ascii_case("application/json") || essence.ends_with("+json")
}

impl UpstreamClient {
    pub fn new(config: &UpstreamConfig) -> Result<Self, UpstreamError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url.clone(),
            token: config.token.clone(),
        })
    }

    pub fn is_configured(&self) -> bool {
        self.base_url.is_some()
    }

    /// Resolve `path` (e.g. `api/client/5`) against the base URL, keeping any
    /// path prefix the base already carries.
    pub fn endpoint(&self, path: &str, query: Option<&str>) -> Result<Url, UpstreamError> {
        let base = self.base_url.as_ref().ok_or(UpstreamError::NotConfigured)?;
        let mut base = base.clone();
        if !base.path().ends_with('/') {
            let with_slash = format!("{}/", base.path());
            base.set_path(&with_slash);
        }
        let mut url = base.join(path.trim_start_matches('/'))?;
        url.set_query(query.filter(|q| !q.is_empty()));
        Ok(url)
    }

    pub async fn send(
        &self,
        method: Method,
        path: &str,
        query: Option<&str>,
        body: Option<Value>,
    ) -> Result<UpstreamResponse, UpstreamError> {
        let url = self.endpoint(path, query)?;
        tracing::debug!("Upstream {} {}", method, url);

        let mut request = self
            .http
            .request(method.clone(), url.clone())
            .header(reqwest::header::ACCEPT, "application/json");
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }
        if let Some(body) = body {
            request = request.json(&body);
        }

        let response = request.send().await?;
        let status = response.status();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let bytes = response.bytes().await?;

        let body = match content_type {
            _ if bytes.is_empty() => UpstreamBody::Json(Value::Null),
            Some(content_type) if !is_json(&content_type) => UpstreamBody::Raw { content_type, bytes },
            // Unlabelled bodies must still be JSON
            _ => UpstreamBody::Json(serde_json::from_slice(&bytes).map_err(|e| UpstreamError::InvalidBody {
                url: url.to_string(),
                source: e,
            })?),
        };

        if !status.is_success() {
            tracing::info!("Upstream {} {} answered {}", method, url, status);
        }

        Ok(UpstreamResponse { status, body })
    }
}
