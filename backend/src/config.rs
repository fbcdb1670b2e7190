//! Service configuration loaded via OrthoConfig.
//!
//! Environment-first settings under the `GRAPH_SERVICE` prefix. Every
//! field is optional; accessor methods supply the defaults so a bare
//! environment runs a working local service. Absence of a Redis URL
//! disables the fast cache tier entirely.

use std::path::PathBuf;
use std::time::Duration;

use ortho_config::OrthoConfig;
use serde::Deserialize;
use url::Url;

const DEFAULT_CACHE_DIR: &str = "cache_data";
const DEFAULT_OVERPASS_URL: &str = "https://overpass-api.de/api/interpreter";
const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_FETCH_TIMEOUT_SECONDS: u64 = 180;
const DEFAULT_CACHE_TTL_SECONDS: u64 = 3600;
const DEFAULT_CACHE_OP_TIMEOUT_MS: u64 = 500;

/// Configuration values for the graph service process.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "GRAPH_SERVICE")]
pub struct GraphServiceSettings {
    /// Redis connection URL for the fast shared cache tier. Unset means
    /// the tier is disabled and a no-op cache is wired in.
    pub redis_url: Option<String>,
    /// Directory for the durable cache tier.
    pub cache_dir: Option<PathBuf>,
    /// Overpass API endpoint for the external map-data source.
    pub overpass_url: Option<String>,
    /// Bind address for the HTTP server.
    pub bind_addr: Option<String>,
    /// Bounded timeout for one external fetch, in seconds.
    pub fetch_timeout_seconds: Option<u64>,
    /// Fast-tier TTL, in seconds (jitter is added on top).
    pub cache_ttl_seconds: Option<u64>,
    /// Bounded timeout for one fast-tier operation, in milliseconds.
    pub cache_op_timeout_ms: Option<u64>,
}

impl GraphServiceSettings {
    /// Redis URL, when the fast tier is configured.
    #[must_use]
    pub fn redis_url(&self) -> Option<&str> {
        self.redis_url.as_deref()
    }

    /// Durable cache directory, falling back to `cache_data`.
    #[must_use]
    pub fn cache_dir(&self) -> PathBuf {
        self.cache_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CACHE_DIR))
    }

    /// Overpass endpoint, falling back to the public instance.
    ///
    /// # Errors
    ///
    /// Returns the parse error for a malformed configured URL.
    pub fn overpass_url(&self) -> Result<Url, url::ParseError> {
        Url::parse(self.overpass_url.as_deref().unwrap_or(DEFAULT_OVERPASS_URL))
    }

    /// HTTP bind address, falling back to `0.0.0.0:8080`.
    #[must_use]
    pub fn bind_addr(&self) -> String {
        self.bind_addr
            .clone()
            .unwrap_or_else(|| DEFAULT_BIND_ADDR.to_owned())
    }

    /// External fetch timeout.
    #[must_use]
    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(
            self.fetch_timeout_seconds
                .unwrap_or(DEFAULT_FETCH_TIMEOUT_SECONDS),
        )
    }

    /// Fast-tier TTL.
    #[must_use]
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_seconds.unwrap_or(DEFAULT_CACHE_TTL_SECONDS))
    }

    /// Fast-tier operation timeout.
    #[must_use]
    pub fn cache_op_timeout(&self) -> Duration {
        Duration::from_millis(
            self.cache_op_timeout_ms
                .unwrap_or(DEFAULT_CACHE_OP_TIMEOUT_MS),
        )
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for settings parsing and defaults.

    use super::*;
    use std::ffi::OsString;

    use env_lock::lock_env;
    use rstest::rstest;

    fn load_from_empty_args() -> GraphServiceSettings {
        GraphServiceSettings::load_from_iter([OsString::from("backend")])
            .expect("settings should load")
    }

    #[rstest]
    fn defaults_apply_when_the_environment_is_empty() {
        let _guard = lock_env([
            ("GRAPH_SERVICE_REDIS_URL", None::<String>),
            ("GRAPH_SERVICE_CACHE_DIR", None::<String>),
            ("GRAPH_SERVICE_OVERPASS_URL", None::<String>),
            ("GRAPH_SERVICE_BIND_ADDR", None::<String>),
            ("GRAPH_SERVICE_FETCH_TIMEOUT_SECONDS", None::<String>),
            ("GRAPH_SERVICE_CACHE_TTL_SECONDS", None::<String>),
            ("GRAPH_SERVICE_CACHE_OP_TIMEOUT_MS", None::<String>),
        ]);

        let settings = load_from_empty_args();
        assert!(settings.redis_url().is_none());
        assert_eq!(settings.cache_dir(), PathBuf::from("cache_data"));
        assert_eq!(
            settings.overpass_url().expect("default parses").as_str(),
            "https://overpass-api.de/api/interpreter"
        );
        assert_eq!(settings.bind_addr(), "0.0.0.0:8080");
        assert_eq!(settings.fetch_timeout(), Duration::from_secs(180));
        assert_eq!(settings.cache_ttl(), Duration::from_secs(3600));
        assert_eq!(settings.cache_op_timeout(), Duration::from_millis(500));
    }

    #[rstest]
    fn environment_overrides_are_respected() {
        let _guard = lock_env([
            (
                "GRAPH_SERVICE_REDIS_URL",
                Some("redis://cache.internal:6379/0".to_owned()),
            ),
            ("GRAPH_SERVICE_CACHE_DIR", Some("/var/cache/graphs".to_owned())),
            ("GRAPH_SERVICE_FETCH_TIMEOUT_SECONDS", Some("30".to_owned())),
        ]);

        let settings = load_from_empty_args();
        assert_eq!(
            settings.redis_url(),
            Some("redis://cache.internal:6379/0")
        );
        assert_eq!(settings.cache_dir(), PathBuf::from("/var/cache/graphs"));
        assert_eq!(settings.fetch_timeout(), Duration::from_secs(30));
    }
}
