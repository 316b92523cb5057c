//! Serve command handler
//!
//! Runs the HTTP API in the foreground against the configured data sources.

use crate::cli::init_logging;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::server;
use clap::Args;
use tracing::info;

/// Serve command arguments
#[derive(Args, Debug, Default)]
pub struct ServeArgs {
    /// Host address to bind to
    #[arg(long)]
    pub host: Option<String>,

    /// Port to listen on
    #[arg(long, short = 'p')]
    pub port: Option<u16>,

    /// Overpass interpreter endpoint for this run
    #[arg(long, value_name = "URL")]
    pub overpass_url: Option<String>,

    /// Nominatim base URL for this run
    #[arg(long, value_name = "URL")]
    pub nominatim_url: Option<String>,

    /// Delay between escalation cycles in milliseconds
    #[arg(long, value_name = "MS")]
    pub backoff_ms: Option<u64>,
}

impl ServeArgs {
    /// Layer the command-line overrides on top of the loaded config
    fn apply(self, config: &mut Config) -> Result<()> {
        if let Some(host) = self.host {
            config.server.host = host;
        }
        if let Some(port) = self.port {
            config.server.port = port;
        }
        if let Some(url) = self.overpass_url {
            config.sources.overpass_url = endpoint("--overpass-url", url)?;
        }
        if let Some(url) = self.nominatim_url {
            config.geocoding.nominatim_url = endpoint("--nominatim-url", url)?;
        }
        if let Some(ms) = self.backoff_ms {
            config.search.backoff_ms = ms;
        }
        Ok(())
    }
}

fn endpoint(flag: &str, url: String) -> Result<String> {
    if url.starts_with("http://") || url.starts_with("https://") {
        Ok(url.trim_end_matches('/').to_string())
    } else {
        Err(Error::Config(format!("{} must be an http(s) URL, got {}", flag, url)))
    }
}

/// Run the serve command
pub async fn run(args: ServeArgs) -> Result<()> {
    init_logging("info");

    let mut config = Config::load()?;
    args.apply(&mut config)?;

    info!(
        version = env!("CARGO_PKG_VERSION"),
        addr = %config.server_addr(),
        "starting nearby API"
    );
    info!(
        overpass = %config.sources.overpass_url,
        nominatim = %config.geocoding.nominatim_url,
        query_timeout_secs = config.sources.query_timeout_secs,
        geocoding_timeout_secs = config.geocoding.timeout_secs,
        "data sources"
    );

    server::run(config).await
}
