//! Application configuration.

use serde::Deserialize;
use std::path::Path;

/// Environment variable prefix for every setting.
const ENV_PREFIX: &str = "REVIEWBOARD";

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Server configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Database configuration.
    pub database: DatabaseConfig,
    /// External book search configuration.
    #[serde(default)]
    pub book_search: BookSearchConfig,
    /// Page metadata fetching configuration.
    #[serde(default)]
    pub meta_fetch: MetaFetchConfig,
    /// Session cookie configuration.
    #[serde(default)]
    pub session: SessionConfig,
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to bind to.
    #[serde(default = "default_port")]
    pub port: u16,
}

/// Database connection configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// `PostgreSQL` connection URL.
    pub url: String,
    /// Maximum number of connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Minimum number of connections in the pool.
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
}

/// External book search API configuration.
///
/// The application id is optional at startup; searches fail with
/// `NotConfigured` until it is set.
#[derive(Debug, Clone, Deserialize)]
pub struct BookSearchConfig {
    /// Search endpoint URL.
    #[serde(default = "default_book_search_endpoint")]
    pub endpoint: String,
    /// API credential (`applicationId` query parameter).
    #[serde(default)]
    pub application_id: Option<String>,
    /// Additional attempts after the first one on transient failure.
    #[serde(default = "default_retries")]
    pub retries: u32,
    /// Delay before the first retry, doubled on each subsequent retry.
    #[serde(default = "default_initial_backoff_ms")]
    pub initial_backoff_ms: u64,
    /// Per-request timeout in seconds.
    #[serde(default = "default_book_search_timeout")]
    pub timeout_secs: u64,
    /// Number of results requested when the caller does not say.
    #[serde(default = "default_hits")]
    pub default_hits: u32,
}

/// Page metadata fetching configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct MetaFetchConfig {
    /// Request timeout in seconds.
    #[serde(default = "default_meta_timeout")]
    pub timeout_secs: u64,
    /// User agent string sent with each fetch.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    /// Maximum number of body bytes inspected for metadata.
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,
}

/// Session cookie configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    /// Name of the cookie carrying the session id.
    #[serde(default = "default_cookie_name")]
    pub cookie_name: String,
    /// Session lifetime in seconds, counted from login.
    #[serde(default = "default_session_ttl")]
    pub ttl_secs: u64,
    /// How often expired sessions are swept, in seconds.
    #[serde(default = "default_session_cleanup_interval")]
    pub cleanup_interval_secs: u64,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

const fn default_port() -> u16 {
    3000
}

const fn default_max_connections() -> u32 {
    20
}

const fn default_min_connections() -> u32 {
    2
}

fn default_book_search_endpoint() -> String {
    "https://app.rakuten.co.jp/services/api/BooksBook/Search/20170404".to_string()
}

const fn default_retries() -> u32 {
    2
}

const fn default_initial_backoff_ms() -> u64 {
    200
}

const fn default_book_search_timeout() -> u64 {
    10
}

const fn default_hits() -> u32 {
    10
}

const fn default_meta_timeout() -> u64 {
    15
}

fn default_user_agent() -> String {
    crate::page_meta::DEFAULT_USER_AGENT.to_string()
}

const fn default_max_body_bytes() -> usize {
    1024 * 1024 // 1MB
}

fn default_cookie_name() -> String {
    "reviewboard_sid".to_string()
}

const fn default_session_ttl() -> u64 {
    7 * 24 * 60 * 60 // 1 week
}

const fn default_session_cleanup_interval() -> u64 {
    300
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Default for BookSearchConfig {
    fn default() -> Self {
        Self {
            endpoint: default_book_search_endpoint(),
            application_id: None,
            retries: default_retries(),
            initial_backoff_ms: default_initial_backoff_ms(),
            timeout_secs: default_book_search_timeout(),
            default_hits: default_hits(),
        }
    }
}

impl BookSearchConfig {
    /// Returns the credential if it is set to a non-blank value.
    #[must_use]
    pub fn credential(&self) -> Option<&str> {
        self.application_id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
    }
}

impl Default for MetaFetchConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_meta_timeout(),
            user_agent: default_user_agent(),
            max_body_bytes: default_max_body_bytes(),
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            cookie_name: default_cookie_name(),
            ttl_secs: default_session_ttl(),
            cleanup_interval_secs: default_session_cleanup_interval(),
        }
    }
}

impl Config {
    /// Load configuration from files and environment variables.
    ///
    /// Configuration is loaded in the following order:
    /// 1. `config/default.toml`
    /// 2. `config/{environment}.toml` (based on `REVIEWBOARD_ENV`)
    /// 3. Environment variables with `REVIEWBOARD__` prefix
    pub fn load() -> Result<Self, config::ConfigError> {
        // A missing .env file is fine; real deployments use the environment.
        let _ = dotenvy::dotenv();

        let env = std::env::var("REVIEWBOARD_ENV").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{env}")).required(false))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }

    /// Load configuration from a specific file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::from(path.as_ref()))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}
