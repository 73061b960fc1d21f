#![allow(dead_code)]

use std::process::{Child, Command, Stdio};
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use anyhow::{Context, Result};
use reqwest::{Method, StatusCode};
use serde_json::Value;
use sqlx::PgPool;

use catalog_api::database::DatabaseManager;

pub const TOKEN: &str = "integration-token";

/// A server process on its own port, killed on drop.
pub struct TestServer {
    pub base_url: String,
    pub pool: PgPool,
    client: reqwest::Client,
    child: Child,
}

impl TestServer {
    /// Start with the default configuration. `None` when `DATABASE_URL` is
    /// unset, in which case the calling test should return early.
    pub async fn start() -> Result<Option<Self>> {
        Self::start_with(&[]).await
    }

    pub async fn start_with(env: &[(&str, &str)]) -> Result<Option<Self>> {
        let Ok(database_url) = std::env::var("DATABASE_URL") else {
            eprintln!("DATABASE_URL not set; skipping integration test");
            return Ok(None);
        };

        let pool = PgPool::connect(&database_url).await.context("failed to connect to test database")?;
        DatabaseManager::apply_schema(&pool).await.context("failed to apply schema")?;

        // Pick an unused port for isolation
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let base_url = format!("http://127.0.0.1:{}", port);

        let mut cmd = Command::new(env!("CARGO_BIN_EXE_catalog-api"));
        cmd.env("DATABASE_URL", &database_url)
            .env("API_TOKEN", TOKEN)
            .env("HOST", "127.0.0.1")
            .env("PORT", port.to_string())
            .env("RUST_LOG", "warn")
            .env_remove("UPSTREAM_BASE_URL")
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit());
        for (key, value) in env {
            cmd.env(key, value);
        }
        let child = cmd.spawn().context("failed to spawn server binary")?;

        let server = Self {
            base_url,
            pool,
            client: reqwest::Client::new(),
            child,
        };
        server.wait_ready(Duration::from_secs(10)).await?;
        Ok(Some(server))
    }

    async fn wait_ready(&self, timeout: Duration) -> Result<()> {
        let deadline = Instant::now() + timeout;
        let url = format!("{}/health", self.base_url);
        while Instant::now() < deadline {
            if let Ok(resp) = self.client.get(&url).send().await {
                if resp.status() == StatusCode::OK {
                    return Ok(());
                }
            }
            tokio::time::sleep(Duration::from_millis(150)).await;
        }
        anyhow::bail!("server did not become ready on {} within {:?}", self.base_url, timeout)
    }

    /// Authorized request; returns the transport status and the JSON body.
    pub async fn call(&self, method: Method, path: &str, body: Option<Value>) -> Result<(StatusCode, Value)> {
        let mut request = self
            .client
            .request(method, format!("{}{}", self.base_url, path))
            .bearer_auth(TOKEN);
        if let Some(body) = body {
            request = request.json(&body);
        }
        let response = request.send().await?;
        let status = response.status();
        let body = response.json::<Value>().await.unwrap_or(Value::Null);
        Ok((status, body))
    }

    pub async fn get(&self, path: &str) -> Result<(StatusCode, Value)> {
        self.call(Method::GET, path, None).await
    }

    pub async fn post(&self, path: &str, body: Value) -> Result<(StatusCode, Value)> {
        self.call(Method::POST, path, Some(body)).await
    }

    pub async fn put(&self, path: &str, body: Value) -> Result<(StatusCode, Value)> {
        self.call(Method::PUT, path, Some(body)).await
    }

    pub async fn delete(&self, path: &str) -> Result<(StatusCode, Value)> {
        self.call(Method::DELETE, path, None).await
    }

    /// Request without any Authorization header
    pub async fn anonymous_get(&self, path: &str) -> Result<StatusCode> {
        let response = self.client.get(format!("{}{}", self.base_url, path)).send().await?;
        Ok(response.status())
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

/// Suffix that keeps codes and names unique across test runs.
pub fn unique(prefix: &str) -> String {
    static COUNTER: AtomicU32 = AtomicU32::new(0);
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.subsec_nanos() as u64 + d.as_secs() * 1_000_000_000)
        .unwrap_or_default();
    format!("{}{}{}", prefix, nanos % 1_000_000_000_000, COUNTER.fetch_add(1, Ordering::SeqCst))
}
