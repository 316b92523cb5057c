//! Default configuration values
//!
//! Named constants for the user-tunable parameters. Search and source
//! defaults come from [`crate::constants`].

/// Default output format
pub const DEFAULT_FORMAT: &str = "text";

/// Default category list (empty means every category)
pub const DEFAULT_CATEGORIES: &str = "";

/// Bound on each geocoding or IP location request
pub const DEFAULT_GEOCODING_TIMEOUT_SECS: u64 = 10;

/// Fallback latitude when no location is given (San Francisco)
pub const DEFAULT_LAT: f64 = 37.7749;

/// Fallback longitude when no location is given (San Francisco)
pub const DEFAULT_LNG: f64 = -122.4194;

/// Default server host
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// Default server port
pub const DEFAULT_PORT: u16 = 7979;

/// Config file name
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Application directory name (for XDG paths)
pub const APP_DIR_NAME: &str = "nearby";
