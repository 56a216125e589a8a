//! Configuration Module
//!
//! Handles loading and managing server configuration from environment variables.

use std::env;
use std::str::FromStr;
use std::time::Duration;

/// Server configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server port
    pub server_port: u16,
    /// Maximum number of images the image cache holds before evicting
    pub image_cache_max_entries: usize,
    /// Image cache entry lifetime in seconds
    pub image_cache_max_age: u64,
    /// Maximum simultaneous non-priority image fetches
    pub image_load_limit: usize,
    /// Timeout in seconds for a single image fetch
    pub image_fetch_timeout: u64,
    /// Base URL of the secondary backend (fallback reads, dual delete)
    pub backend_url: String,
    /// Timeout in seconds for backend and cleanup calls
    pub backend_timeout: u64,
    /// Third-party cleanup endpoint, keyed by a generation's `leo_id`
    pub cleanup_api_url: Option<String>,
    /// Bearer token for the cleanup endpoint
    pub cleanup_api_key: Option<String>,
    /// JSON file used to seed the primary document store
    pub catalog_seed_path: Option<String>,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    /// - `IMAGE_CACHE_MAX_ENTRIES` - Image cache capacity (default: 200)
    /// - `IMAGE_CACHE_MAX_AGE_SECS` - Image entry lifetime (default: 1800)
    /// - `IMAGE_LOAD_LIMIT` - Concurrent non-priority fetches (default: 6)
    /// - `IMAGE_FETCH_TIMEOUT_SECS` - Image fetch timeout (default: 10)
    /// - `BACKEND_URL` - Secondary backend (default: http://localhost:8000)
    /// - `BACKEND_TIMEOUT_SECS` - Backend/cleanup timeout (default: 5)
    /// - `CLEANUP_API_URL` - Third-party cleanup endpoint (default: unset)
    /// - `CLEANUP_API_KEY` - Cleanup bearer token (default: unset)
    /// - `CATALOG_SEED_PATH` - Primary store seed file (default: unset)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            server_port: parse_var("SERVER_PORT").unwrap_or(defaults.server_port),
            image_cache_max_entries: parse_var("IMAGE_CACHE_MAX_ENTRIES")
                .unwrap_or(defaults.image_cache_max_entries),
            image_cache_max_age: parse_var("IMAGE_CACHE_MAX_AGE_SECS")
                .unwrap_or(defaults.image_cache_max_age),
            image_load_limit: parse_var("IMAGE_LOAD_LIMIT").unwrap_or(defaults.image_load_limit),
            image_fetch_timeout: parse_var("IMAGE_FETCH_TIMEOUT_SECS")
                .unwrap_or(defaults.image_fetch_timeout),
            backend_url: string_var("BACKEND_URL").unwrap_or(defaults.backend_url),
            backend_timeout: parse_var("BACKEND_TIMEOUT_SECS")
                .unwrap_or(defaults.backend_timeout),
            cleanup_api_url: string_var("CLEANUP_API_URL"),
            cleanup_api_key: string_var("CLEANUP_API_KEY"),
            catalog_seed_path: string_var("CATALOG_SEED_PATH"),
        }
    }

    /// Image cache lifetime as a duration.
    pub fn image_max_age(&self) -> Duration {
        Duration::from_secs(self.image_cache_max_age)
    }

    /// Backend and cleanup request timeout as a duration.
    pub fn backend_timeout(&self) -> Duration {
        Duration::from_secs(self.backend_timeout)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_port: 3000,
            image_cache_max_entries: 200,
            image_cache_max_age: 1800,
            image_load_limit: 6,
            image_fetch_timeout: 10,
            backend_url: "http://localhost:8000".to_string(),
            backend_timeout: 5,
            cleanup_api_url: None,
            cleanup_api_key: None,
            catalog_seed_path: None,
        }
    }
}

fn parse_var<T: FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|v| v.parse().ok())
}

fn string_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.server_port, 3000);
        assert_eq!(config.image_cache_max_entries, 200);
        assert_eq!(config.image_cache_max_age, 1800);
        assert_eq!(config.image_load_limit, 6);
        assert_eq!(config.backend_timeout(), Duration::from_secs(5));
        assert!(config.cleanup_api_url.is_none());
    }

    #[test]
    fn test_config_from_env_defaults() {
        // Clear any existing env vars to test defaults
        env::remove_var("SERVER_PORT");
        env::remove_var("IMAGE_CACHE_MAX_ENTRIES");
        env::remove_var("IMAGE_LOAD_LIMIT");
        env::remove_var("BACKEND_URL");
        env::remove_var("CLEANUP_API_URL");

        let config = Config::from_env();
        assert_eq!(config.server_port, 3000);
        assert_eq!(config.image_cache_max_entries, 200);
        assert_eq!(config.image_load_limit, 6);
        assert_eq!(config.backend_url, "http://localhost:8000");
        assert!(config.cleanup_api_url.is_none());
    }

    #[test]
    fn test_unparseable_value_falls_back() {
        env::set_var("IMAGE_CACHE_MAX_AGE_SECS", "forever");
        let config = Config::from_env();
        env::remove_var("IMAGE_CACHE_MAX_AGE_SECS");

        assert_eq!(config.image_max_age(), Duration::from_secs(1800));
    }
}
