//! Configuration management
//!
//! Loads and saves configuration from XDG-compliant paths.
//! Config location: ~/.config/nearby/config.toml

pub mod defaults;

use crate::constants::{api, search, source};
use crate::coord::Coordinates;
use crate::error::{Error, Result};
use crate::poi::category::parse_list;
use crate::poi::Category;
use crate::search::EscalationPolicy;
use crate::source::FetchLimits;
use defaults::*;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Radius escalation tunables
    #[serde(default)]
    pub search: SearchConfig,

    /// Spatial data source settings
    #[serde(default)]
    pub sources: SourcesConfig,

    /// Geocoder settings
    #[serde(default)]
    pub geocoding: GeocodingConfig,

    /// Location settings
    #[serde(default)]
    pub location: LocationConfig,

    /// Default values for discovery
    #[serde(default)]
    pub defaults: DefaultsConfig,

    /// Server settings
    #[serde(default)]
    pub server: ServerConfig,
}

/// Radius escalation tunables
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Radius of the first search cycle in meters
    #[serde(default = "default_initial_radius")]
    pub initial_radius: f64,

    /// Escalate while fewer POIs than this are found
    #[serde(default = "default_min_results")]
    pub min_results: usize,

    /// Radius ceiling in meters
    #[serde(default = "default_max_radius")]
    pub max_radius: f64,

    /// Factor applied to the radius on each escalation
    #[serde(default = "default_radius_multiplier")]
    pub radius_multiplier: f64,

    /// Delay between cycles in milliseconds
    #[serde(default = "default_backoff_ms")]
    pub backoff_ms: u64,
}

/// Spatial data source settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourcesConfig {
    /// Overpass interpreter endpoint
    #[serde(default = "default_overpass_url")]
    pub overpass_url: String,

    /// Client-side deadline for one category query
    #[serde(default = "default_query_timeout")]
    pub query_timeout_secs: u64,

    /// Server-side `[timeout:N]` sent with each query
    #[serde(default = "default_server_timeout")]
    pub server_timeout_secs: u64,

    /// Deadline for one whole fan-out
    #[serde(default = "default_max_total_timeout")]
    pub max_total_timeout_secs: u64,
}

/// Geocoder settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeocodingConfig {
    /// Nominatim base URL
    #[serde(default = "default_nominatim_url")]
    pub nominatim_url: String,

    /// User-Agent sent to Nominatim
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Bound on each geocoding or IP location request
    #[serde(default = "default_geocoding_timeout")]
    pub timeout_secs: u64,
}

/// Location settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocationConfig {
    /// If true, --here is default when no location given
    #[serde(default)]
    pub default_here: bool,

    /// Fallback latitude
    #[serde(default = "default_lat")]
    pub default_lat: f64,

    /// Fallback longitude
    #[serde(default = "default_lng")]
    pub default_lng: f64,
}

/// Default values for discovery
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefaultsConfig {
    /// Default output format
    #[serde(default = "default_format")]
    pub format: String,

    /// Comma-separated categories; empty means all
    #[serde(default = "default_categories")]
    pub categories: String,
}

/// Server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,
}

// Default value functions for serde
fn default_initial_radius() -> f64 {
    search::INITIAL_RADIUS_METERS
}
fn default_min_results() -> usize {
    search::MIN_RESULTS
}
fn default_max_radius() -> f64 {
    search::MAX_RADIUS_METERS
}
fn default_radius_multiplier() -> f64 {
    search::RADIUS_MULTIPLIER
}
fn default_backoff_ms() -> u64 {
    search::BACKOFF_MS
}
fn default_overpass_url() -> String {
    api::OVERPASS_URL.to_string()
}
fn default_query_timeout() -> u64 {
    source::QUERY_TIMEOUT_SECS
}
fn default_server_timeout() -> u64 {
    source::SERVER_TIMEOUT_SECS
}
fn default_max_total_timeout() -> u64 {
    source::MAX_TOTAL_TIMEOUT_SECS
}
fn default_nominatim_url() -> String {
    api::NOMINATIM_URL.to_string()
}
fn default_user_agent() -> String {
    api::USER_AGENT.to_string()
}
fn default_geocoding_timeout() -> u64 {
    DEFAULT_GEOCODING_TIMEOUT_SECS
}
fn default_lat() -> f64 {
    DEFAULT_LAT
}
fn default_lng() -> f64 {
    DEFAULT_LNG
}
fn default_format() -> String {
    DEFAULT_FORMAT.to_string()
}
fn default_categories() -> String {
    DEFAULT_CATEGORIES.to_string()
}
fn default_host() -> String {
    DEFAULT_HOST.to_string()
}
fn default_port() -> u16 {
    DEFAULT_PORT
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            initial_radius: default_initial_radius(),
            min_results: default_min_results(),
            max_radius: default_max_radius(),
            radius_multiplier: default_radius_multiplier(),
            backoff_ms: default_backoff_ms(),
        }
    }
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            overpass_url: default_overpass_url(),
            query_timeout_secs: default_query_timeout(),
            server_timeout_secs: default_server_timeout(),
            max_total_timeout_secs: default_max_total_timeout(),
        }
    }
}

impl Default for GeocodingConfig {
    fn default() -> Self {
        Self {
            nominatim_url: default_nominatim_url(),
            user_agent: default_user_agent(),
            timeout_secs: default_geocoding_timeout(),
        }
    }
}

impl Default for LocationConfig {
    fn default() -> Self {
        Self {
            default_here: false,
            default_lat: default_lat(),
            default_lng: default_lng(),
        }
    }
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            format: default_format(),
            categories: default_categories(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn parse_value<T: std::str::FromStr>(key: &str, value: &str) -> Result<T> {
    value
        .trim()
        .parse()
        .map_err(|_| Error::Config(format!("Invalid value for {}: {}", key, value)))
}

impl Config {
    /// Get the config directory path
    pub fn config_dir() -> Result<PathBuf> {
        dirs::config_dir()
            .map(|p| p.join(APP_DIR_NAME))
            .ok_or_else(|| Error::Config("Could not determine config directory".to_string()))
    }

    /// Get the config file path
    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join(CONFIG_FILE_NAME))
    }

    /// Load configuration from the default path
    ///
    /// Creates default config if file doesn't exist
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    /// Load configuration from a specific file, creating it if missing
    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = fs::read_to_string(path)
                .map_err(|e| Error::Config(format!("Failed to read config file: {}", e)))?;

            toml::from_str(&content)
                .map_err(|e| Error::Config(format!("Failed to parse config file: {}", e)))
        } else {
            let config = Config::default();
            config.save_to(path)?;
            Ok(config)
        }
    }

    /// Save configuration to the default path
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    /// Save configuration to a specific file
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| Error::Config(format!("Failed to create config directory: {}", e)))?;
        }

        let content = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))?;

        fs::write(path, content)
            .map_err(|e| Error::Config(format!("Failed to write config file: {}", e)))?;

        Ok(())
    }

    /// Get a configuration value by key path
    ///
    /// Key format: "section.key"
    /// Returns the value as a string, or None if not found
    pub fn get(&self, key: &str) -> Option<String> {
        let parts: Vec<&str> = key.split('.').collect();

        match parts.as_slice() {
            ["search", "initial_radius"] => Some(self.search.initial_radius.to_string()),
            ["search", "min_results"] => Some(self.search.min_results.to_string()),
            ["search", "max_radius"] => Some(self.search.max_radius.to_string()),
            ["search", "radius_multiplier"] => Some(self.search.radius_multiplier.to_string()),
            ["search", "backoff_ms"] => Some(self.search.backoff_ms.to_string()),

            ["sources", "overpass_url"] => Some(self.sources.overpass_url.clone()),
            ["sources", "query_timeout_secs"] => Some(self.sources.query_timeout_secs.to_string()),
            ["sources", "server_timeout_secs"] => {
                Some(self.sources.server_timeout_secs.to_string())
            }
            ["sources", "max_total_timeout_secs"] => {
                Some(self.sources.max_total_timeout_secs.to_string())
            }

            ["geocoding", "nominatim_url"] => Some(self.geocoding.nominatim_url.clone()),
            ["geocoding", "user_agent"] => Some(self.geocoding.user_agent.clone()),
            ["geocoding", "timeout_secs"] => Some(self.geocoding.timeout_secs.to_string()),

            ["location", "default_here"] => Some(self.location.default_here.to_string()),
            ["location", "default_lat"] => Some(self.location.default_lat.to_string()),
            ["location", "default_lng"] => Some(self.location.default_lng.to_string()),

            ["defaults", "format"] => Some(self.defaults.format.clone()),
            ["defaults", "categories"] => Some(self.defaults.categories.clone()),

            ["server", "host"] => Some(self.server.host.clone()),
            ["server", "port"] => Some(self.server.port.to_string()),

            _ => None,
        }
    }

    /// Set a configuration value by key path
    ///
    /// Key format: "section.key"
    /// Returns error if key is invalid or value type is wrong
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let parts: Vec<&str> = key.split('.').collect();

        match parts.as_slice() {
            ["search", "initial_radius"] => self.search.initial_radius = parse_value(key, value)?,
            ["search", "min_results"] => self.search.min_results = parse_value(key, value)?,
            ["search", "max_radius"] => self.search.max_radius = parse_value(key, value)?,
            ["search", "radius_multiplier"] => {
                self.search.radius_multiplier = parse_value(key, value)?
            }
            ["search", "backoff_ms"] => self.search.backoff_ms = parse_value(key, value)?,

            ["sources", "overpass_url"] => self.sources.overpass_url = value.to_string(),
            ["sources", "query_timeout_secs"] => {
                self.sources.query_timeout_secs = parse_value(key, value)?
            }
            ["sources", "server_timeout_secs"] => {
                self.sources.server_timeout_secs = parse_value(key, value)?
            }
            ["sources", "max_total_timeout_secs"] => {
                self.sources.max_total_timeout_secs = parse_value(key, value)?
            }

            ["geocoding", "nominatim_url"] => self.geocoding.nominatim_url = value.to_string(),
            ["geocoding", "user_agent"] => self.geocoding.user_agent = value.to_string(),
            ["geocoding", "timeout_secs"] => {
                let secs: u64 = parse_value(key, value)?;
                if secs == 0 {
                    return Err(Error::Config("geocoding.timeout_secs must be at least 1".to_string()));
                }
                self.geocoding.timeout_secs = secs;
            }

            ["location", "default_here"] => self.location.default_here = parse_value(key, value)?,
            ["location", "default_lat"] => self.location.default_lat = parse_value(key, value)?,
            ["location", "default_lng"] => self.location.default_lng = parse_value(key, value)?,

            ["defaults", "format"] => self.defaults.format = value.to_string(),
            ["defaults", "categories"] => {
                parse_list(value).map_err(Error::Config)?;
                self.defaults.categories = value.to_string();
            }

            ["server", "host"] => self.server.host = value.to_string(),
            ["server", "port"] => self.server.port = parse_value(key, value)?,

            _ => {
                return Err(Error::Config(format!("Unknown config key: {}", key)));
            }
        }

        Ok(())
    }

    /// List all available config keys
    pub fn available_keys() -> Vec<&'static str> {
        vec![
            "search.initial_radius",
            "search.min_results",
            "search.max_radius",
            "search.radius_multiplier",
            "search.backoff_ms",
            "sources.overpass_url",
            "sources.query_timeout_secs",
            "sources.server_timeout_secs",
            "sources.max_total_timeout_secs",
            "geocoding.nominatim_url",
            "geocoding.user_agent",
            "geocoding.timeout_secs",
            "location.default_here",
            "location.default_lat",
            "location.default_lng",
            "defaults.format",
            "defaults.categories",
            "server.host",
            "server.port",
        ]
    }

    /// Escalation tunables from the `[search]` section
    pub fn escalation_policy(&self) -> EscalationPolicy {
        EscalationPolicy {
            initial_radius_meters: self.search.initial_radius,
            min_results: self.search.min_results,
            max_radius_meters: self.search.max_radius,
            radius_multiplier: self.search.radius_multiplier,
            backoff: Duration::from_millis(self.search.backoff_ms),
        }
    }

    /// Fan-out deadlines from the `[sources]` section
    pub fn fetch_limits(&self) -> FetchLimits {
        FetchLimits {
            per_query: Duration::from_secs(self.sources.query_timeout_secs),
            total: Duration::from_secs(self.sources.max_total_timeout_secs),
        }
    }

    /// Bound on each geocoding or IP location request
    pub fn geocoding_timeout(&self) -> Duration {
        Duration::from_secs(self.geocoding.timeout_secs)
    }

    /// Fallback search center
    pub fn default_location(&self) -> Result<Coordinates> {
        Coordinates::checked(self.location.default_lat, self.location.default_lng)
            .map_err(|e| Error::Config(format!("Invalid default location: {}", e)))
    }

    /// Categories searched when none are given
    pub fn default_categories(&self) -> Result<Vec<Category>> {
        parse_list(&self.defaults.categories).map_err(Error::Config)
    }

    /// Get server address as "host:port"
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = Config::default();

        assert_eq!(config.search.initial_radius, 1000.0);
        assert_eq!(config.search.min_results, 5);
        assert_eq!(config.search.max_radius, 5000.0);
        assert_eq!(config.sources.query_timeout_secs, 15);
        assert_eq!(config.defaults.format, "text");
        assert_eq!(config.server.port, 7979);
    }

    #[test]
    fn test_get_set() {
        let mut config = Config::default();

        assert_eq!(config.get("search.min_results"), Some("5".to_string()));

        config.set("search.min_results", "10").unwrap();
        assert_eq!(config.get("search.min_results"), Some("10".to_string()));

        config.set("search.max_radius", "8000").unwrap();
        assert_eq!(config.get("search.max_radius"), Some("8000".to_string()));
        assert_eq!(config.search.max_radius, 8000.0);
    }

    #[test]
    fn test_every_key_is_readable() {
        let config = Config::default();
        for key in Config::available_keys() {
            assert!(config.get(key).is_some(), "{} has no getter", key);
        }
    }

    #[test]
    fn test_get_invalid_key() {
        let config = Config::default();
        assert_eq!(config.get("invalid.key"), None);
    }

    #[test]
    fn test_set_invalid_key() {
        let mut config = Config::default();
        assert!(config.set("invalid.key", "value").is_err());
    }

    #[test]
    fn test_set_invalid_value() {
        let mut config = Config::default();
        assert!(config.set("search.initial_radius", "not_a_number").is_err());
        assert!(config.set("location.default_here", "maybe").is_err());
    }

    #[test]
    fn test_set_categories_validates() {
        let mut config = Config::default();

        config.set("defaults.categories", "cafe, bar").unwrap();
        assert_eq!(
            config.default_categories().unwrap(),
            vec![Category::Cafe, Category::Bar]
        );

        assert!(config.set("defaults.categories", "cafe,casino").is_err());
        assert_eq!(config.defaults.categories, "cafe, bar");
    }

    #[test]
    fn test_empty_categories_means_all() {
        let config = Config::default();
        assert_eq!(config.default_categories().unwrap(), Category::ALL.to_vec());
    }

    #[test]
    fn test_escalation_policy() {
        let mut config = Config::default();
        config.search.backoff_ms = 250;

        let policy = config.escalation_policy();
        assert_eq!(policy.initial_radius_meters, 1000.0);
        assert_eq!(policy.radius_multiplier, 1.5);
        assert_eq!(policy.backoff, Duration::from_millis(250));
        assert!(policy.validate().is_ok());
    }

    #[test]
    fn test_fetch_limits() {
        let limits = Config::default().fetch_limits();
        assert_eq!(limits.per_query, Duration::from_secs(15));
        assert_eq!(limits.total, Duration::from_secs(60));
    }

    #[test]
    fn test_geocoding_timeout() {
        let mut config = Config::default();
        assert_eq!(config.geocoding_timeout(), Duration::from_secs(10));

        config.set("geocoding.timeout_secs", "3").unwrap();
        assert_eq!(config.get("geocoding.timeout_secs"), Some("3".to_string()));
        assert_eq!(config.geocoding_timeout(), Duration::from_secs(3));

        assert!(config.set("geocoding.timeout_secs", "0").is_err());
        assert_eq!(config.geocoding.timeout_secs, 3);
    }

    #[test]
    fn test_default_location() {
        let mut config = Config::default();
        assert_eq!(
            config.default_location().unwrap(),
            Coordinates::new(37.7749, -122.4194)
        );

        config.location.default_lat = 120.0;
        assert!(config.default_location().is_err());
    }

    #[test]
    fn test_save_and_load() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join(APP_DIR_NAME).join(CONFIG_FILE_NAME);

        let mut config = Config::default();
        config.search.min_results = 3;
        config.sources.overpass_url = "http://localhost:12345/api/interpreter".to_string();
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.search.min_results, 3);
        assert_eq!(
            loaded.sources.overpass_url,
            "http://localhost:12345/api/interpreter"
        );
    }

    #[test]
    fn test_load_creates_missing_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join(CONFIG_FILE_NAME);

        let config = Config::load_from(&path).unwrap();

        assert!(path.exists());
        assert_eq!(config.server.port, 7979);
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let loaded: Config = toml::from_str("[search]\nmin_results = 8\n").unwrap();
        assert_eq!(loaded.search.min_results, 8);
        assert_eq!(loaded.search.initial_radius, 1000.0);
        assert_eq!(loaded.server.host, "127.0.0.1");
    }

    #[test]
    fn test_serialization_format() {
        let config = Config::default();
        let toml = toml::to_string_pretty(&config).unwrap();

        assert!(toml.contains("[search]"));
        assert!(toml.contains("[sources]"));
        assert!(toml.contains("[geocoding]"));
        assert!(toml.contains("[server]"));
    }

    #[test]
    fn test_server_addr() {
        let config = Config::default();
        assert_eq!(config.server_addr(), "127.0.0.1:7979");
    }
}
