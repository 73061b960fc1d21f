//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::PgPool;

use crate::config::AppConfig;
use crate::query::ListQueryEngine;
use crate::upstream::{UpstreamClient, UpstreamError};

/// Cheaply cloneable handle on the pool, config and upstream client.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: AppConfig,
    pool: PgPool,
    upstream: UpstreamClient,
    lists: ListQueryEngine,
}

impl AppState {
    /// # Errors
    ///
    /// Returns an error if the upstream HTTP client cannot be built.
    pub fn new(config: AppConfig, pool: PgPool) -> Result<Self, UpstreamError> {
        let upstream = UpstreamClient::new(&config.upstream)?;
        let lists = ListQueryEngine::new(&config.listing);

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                upstream,
                lists,
            }),
        })
    }

    pub fn config(&self) -> &AppConfig {
        &self.inner.config
    }

    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    pub fn upstream(&self) -> &UpstreamClient {
        &self.inner.upstream
    }

    pub fn lists(&self) -> &ListQueryEngine {
        &self.inner.lists
    }

    pub fn currency_symbol(&self) -> &str {
        &self.inner.config.catalog.currency_symbol
    }
}
