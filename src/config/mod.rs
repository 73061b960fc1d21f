use serde::{Deserialize, Serialize};
use std::env;
use std::net::IpAddr;
use thiserror::Error;
use url::Url;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(&'static str, String),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub listing: ListingConfig,
    pub upstream: UpstreamConfig,
    pub security: SecurityConfig,
    pub catalog: CatalogConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: IpAddr,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub connection_timeout: u64,
}

/// How collection endpoints treat the requested `sort` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortPolicy {
    /// Sort by the requested field when it is in the endpoint's allow-list.
    Fixed,
    /// Always `id ASC`, whatever was requested. Matches the legacy service.
    Legacy,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListingConfig {
    pub page_size: i64,
    pub sort_policy: SortPolicy,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpstreamConfig {
    pub base_url: Option<Url>,
    pub token: Option<String>,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    pub api_token: String,
    pub enable_cors: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogConfig {
    pub currency_symbol: String,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the config from an arbitrary key lookup. `from_env` passes the
    /// process environment; tests pass a map.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let environment = match lookup("APP_ENV").as_deref() {
            Some("production") | Some("prod") => Environment::Production,
            Some("staging") | Some("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        let database_url = lookup("DATABASE_URL").ok_or(ConfigError::MissingEnvVar("DATABASE_URL"))?;
        let api_token = lookup("API_TOKEN")
            .filter(|t| !t.trim().is_empty())
            .ok_or(ConfigError::MissingEnvVar("API_TOKEN"))?;

        // Set defaults based on environment, then override with specific env vars
        let mut config = match environment {
            Environment::Production => Self::production(database_url, api_token),
            Environment::Staging => Self::staging(database_url, api_token),
            Environment::Development => Self::development(database_url, api_token),
        };
        config.apply_overrides(&lookup)?;
        Ok(config)
    }

    fn apply_overrides<F>(&mut self, lookup: &F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        // Server overrides
        if let Some(v) = lookup("HOST") {
            self.server.host = v
                .parse()
                .map_err(|_| ConfigError::InvalidEnvVar("HOST", v.clone()))?;
        }
        if let Some(v) = lookup("PORT") {
            self.server.port = v
                .parse()
                .map_err(|_| ConfigError::InvalidEnvVar("PORT", v.clone()))?;
        }

        // Database overrides
        if let Some(v) = lookup("DATABASE_MAX_CONNECTIONS") {
            self.database.max_connections = v.parse().unwrap_or(self.database.max_connections);
        }
        if let Some(v) = lookup("DATABASE_CONNECTION_TIMEOUT") {
            self.database.connection_timeout = v.parse().unwrap_or(self.database.connection_timeout);
        }

        // Listing overrides
        if let Some(v) = lookup("LIST_PAGE_SIZE") {
            self.listing.page_size = v
                .parse()
                .ok()
                .filter(|size: &i64| *size > 0)
                .unwrap_or(self.listing.page_size);
        }
        if let Some(v) = lookup("LIST_SORT_POLICY") {
            self.listing.sort_policy = match v.to_ascii_lowercase().as_str() {
                "legacy" => SortPolicy::Legacy,
                "fixed" => SortPolicy::Fixed,
                _ => return Err(ConfigError::InvalidEnvVar("LIST_SORT_POLICY", v)),
            };
        }

        // Upstream overrides
        if let Some(v) = lookup("UPSTREAM_BASE_URL") {
            let url = Url::parse(&v).map_err(|e| ConfigError::InvalidEnvVar("UPSTREAM_BASE_URL", e.to_string()))?;
            self.upstream.base_url = Some(url);
        }
        if let Some(v) = lookup("UPSTREAM_TOKEN") {
            self.upstream.token = Some(v).filter(|t| !t.is_empty());
        }
        if let Some(v) = lookup("UPSTREAM_TIMEOUT_SECS") {
            self.upstream.timeout_secs = v.parse().unwrap_or(self.upstream.timeout_secs);
        }

        // Security overrides
        if let Some(v) = lookup("SECURITY_ENABLE_CORS") {
            self.security.enable_cors = v.parse().unwrap_or(self.security.enable_cors);
        }

        if let Some(v) = lookup("CURRENCY_SYMBOL") {
            self.catalog.currency_symbol = v;
        }

        Ok(())
    }

    fn base(environment: Environment, database_url: String, api_token: String) -> Self {
        Self {
            environment,
            server: ServerConfig {
                host: IpAddr::from([0, 0, 0, 0]),
                port: 3000,
            },
            database: DatabaseConfig {
                url: database_url,
                max_connections: 10,
                connection_timeout: 30,
            },
            listing: ListingConfig {
                page_size: 10,
                sort_policy: SortPolicy::Fixed,
            },
            upstream: UpstreamConfig {
                base_url: None,
                token: None,
                timeout_secs: 30,
            },
            security: SecurityConfig {
                api_token,
                enable_cors: true,
            },
            catalog: CatalogConfig {
                currency_symbol: "$".to_string(),
            },
        }
    }

    fn development(database_url: String, api_token: String) -> Self {
        let mut config = Self::base(Environment::Development, database_url, api_token);
        config.server.host = IpAddr::from([127, 0, 0, 1]);
        config
    }

    fn staging(database_url: String, api_token: String) -> Self {
        let mut config = Self::base(Environment::Staging, database_url, api_token);
        config.database.max_connections = 20;
        config.database.connection_timeout = 10;
        config.upstream.timeout_secs = 15;
        config
    }

    fn production(database_url: String, api_token: String) -> Self {
        let mut config = Self::base(Environment::Production, database_url, api_token);
        config.database.max_connections = 50;
        config.database.connection_timeout = 5;
        config.upstream.timeout_secs = 10;
        config.security.enable_cors = false;
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    const REQUIRED: [(&str, &str); 2] = [
        ("DATABASE_URL", "postgres://localhost/catalog"),
        ("API_TOKEN", "s3cr3t"),
    ];

    #[test]
    fn test_default_development_config() {
        let config = AppConfig::from_lookup(lookup_from(&REQUIRED)).unwrap();
        assert_eq!(config.environment, Environment::Development);
        assert_eq!(config.listing.page_size, 10);
        assert_eq!(config.listing.sort_policy, SortPolicy::Fixed);
        assert_eq!(config.server.port, 3000);
        assert!(config.upstream.base_url.is_none());
        assert_eq!(config.catalog.currency_symbol, "$");
    }

    #[test]
    fn test_default_production_config() {
        let mut pairs = REQUIRED.to_vec();
        pairs.push(("APP_ENV", "production"));
        let config = AppConfig::from_lookup(lookup_from(&pairs)).unwrap();
        assert_eq!(config.environment, Environment::Production);
        assert_eq!(config.database.max_connections, 50);
        assert!(!config.security.enable_cors);
    }

    #[test]
    fn missing_token_is_rejected() {
        let result = AppConfig::from_lookup(lookup_from(&[("DATABASE_URL", "postgres://x/y")]));
        assert!(matches!(result, Err(ConfigError::MissingEnvVar("API_TOKEN"))));
    }

    #[test]
    fn overrides_apply() {
        let mut pairs = REQUIRED.to_vec();
        pairs.extend([
            ("PORT", "8080"),
            ("LIST_SORT_POLICY", "legacy"),
            ("LIST_PAGE_SIZE", "not-a-number"),
            ("UPSTREAM_BASE_URL", "https://enjoy.example.com/"),
            ("CURRENCY_SYMBOL", "€"),
        ]);
        let config = AppConfig::from_lookup(lookup_from(&pairs)).unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.listing.sort_policy, SortPolicy::Legacy);
        assert_eq!(config.listing.page_size, 10);
        assert_eq!(
            config.upstream.base_url.as_ref().map(Url::as_str),
            Some("https://enjoy.example.com/")
        );
        assert_eq!(config.catalog.currency_symbol, "€");
    }

    #[test]
    fn bad_sort_policy_is_rejected() {
        let mut pairs = REQUIRED.to_vec();
        pairs.push(("LIST_SORT_POLICY", "sideways"));
        let result = AppConfig::from_lookup(lookup_from(&pairs));
        assert!(matches!(result, Err(ConfigError::InvalidEnvVar("LIST_SORT_POLICY", _))));
    }
}
