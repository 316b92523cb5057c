//! Discover command handler
//!
//! Resolves the requested location and prints the POIs found around it.

use crate::cli::init_logging;
use crate::config::Config;
use crate::constants::api::IP_API_URL;
use crate::coord::Coordinates;
use crate::discovery::{DiscoveryRequest, LiveDiscovery};
use crate::error::{Error, Result};
use crate::format::{available_formats, get_formatter};
use crate::geo::ip_location::IpLocator;
use crate::poi::category::parse_list;
use crate::poi::Category;
use crate::search::SearchProgress;
use clap::Args;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::warn;

/// Discover command arguments
#[derive(Args)]
pub struct DiscoverArgs {
    /// Place name, address or "lat,lon"
    #[arg(conflicts_with_all = ["lat", "lng", "here"])]
    pub location: Option<String>,

    /// Latitude
    #[arg(long, requires = "lng", allow_negative_numbers = true)]
    pub lat: Option<f64>,

    /// Longitude
    #[arg(long, requires = "lat", allow_negative_numbers = true)]
    pub lng: Option<f64>,

    /// Use current location (IP geolocation)
    #[arg(long, conflicts_with_all = ["lat", "lng"])]
    pub here: bool,

    /// Comma-separated categories (default: all)
    #[arg(long, short = 'c')]
    pub categories: Option<String>,

    /// Initial search radius in meters
    #[arg(long, short = 'r')]
    pub radius: Option<f64>,

    /// Widen the search until at least this many places are found
    #[arg(long, short = 'n')]
    pub min_results: Option<usize>,

    /// Output format
    #[arg(long, short = 'f')]
    pub format: Option<String>,

    /// Write output to file
    #[arg(long, short = 'o')]
    pub output: Option<String>,

    /// List available categories
    #[arg(short = 'C', long = "list-categories")]
    pub list_categories: bool,

    /// List available formats
    #[arg(short = 'F', long = "list-formats")]
    pub list_formats: bool,
}

/// Run the discover command
pub async fn run(args: DiscoverArgs) -> Result<()> {
    // Handle list flags first
    if args.list_categories {
        list_categories();
        return Ok(());
    }

    if args.list_formats {
        list_formats();
        return Ok(());
    }

    init_logging("warn");

    let mut config = Config::load()?;
    if let Some(radius) = args.radius {
        config.search.initial_radius = radius;
        if config.search.max_radius < radius {
            config.search.max_radius = radius;
        }
    }
    if let Some(min_results) = args.min_results {
        config.search.min_results = min_results;
    }

    let categories = match &args.categories {
        Some(list) => parse_list(list).map_err(Error::Config)?,
        None => config.default_categories()?,
    };

    let format = args.format.clone().unwrap_or(config.defaults.format.clone());
    let formatter =
        get_formatter(&format).ok_or_else(|| Error::Config(format!("Unknown format: {}", format)))?;

    let request = build_request(&args, &config).await?.with_categories(categories);

    let discovery = Arc::new(LiveDiscovery::from_config(&config)?);
    let handle = discovery.spawn(request);
    let reporter = tokio::spawn(report_progress(handle.progress()));

    // Dropping the handle on Ctrl-C cancels the whole operation
    let result = tokio::select! {
        result = handle.outcome() => result,
        _ = tokio::signal::ctrl_c() => Err(Error::Cancelled),
    };
    reporter.abort();
    let response = result?;

    if let Some(name) = &response.metadata.location_name {
        eprintln!("Geocoded to: {}", name);
    }

    let output = formatter.format(&response)?;

    if let Some(path) = args.output {
        std::fs::write(&path, &output)?;
        eprintln!("Output written to {}", path);
    } else {
        println!("{}", output);
    }

    Ok(())
}

/// Pick the search target from arguments and config
async fn build_request(args: &DiscoverArgs, config: &Config) -> Result<DiscoveryRequest> {
    if let Some(location) = &args.location {
        return Ok(DiscoveryRequest::text(location.clone()));
    }

    if let (Some(lat), Some(lng)) = (args.lat, args.lng) {
        return Ok(DiscoveryRequest::point(Coordinates::checked(lat, lng)?));
    }

    if args.here || config.location.default_here {
        return Ok(DiscoveryRequest::point(current_location(config).await?));
    }

    Err(Error::Config(
        "No location specified. Pass a location, --lat/--lng, or --here".to_string(),
    ))
}

/// IP location, falling back to the configured default
async fn current_location(config: &Config) -> Result<Coordinates> {
    let located = match IpLocator::with_url(IP_API_URL, config.geocoding_timeout()) {
        Ok(locator) => locator.locate().await,
        Err(e) => Err(e),
    };

    match located.and_then(|l| Coordinates::checked(l.lat, l.lng).map(|c| (c, l.display_name))) {
        Ok((coords, name)) => {
            eprintln!("Using IP location: {}", name);
            Ok(coords)
        }
        Err(e) => {
            let fallback = config.default_location()?;
            warn!(error = %e, %fallback, "IP location failed, using default location");
            eprintln!("Could not determine current location, using {}", fallback);
            Ok(fallback)
        }
    }
}

/// Print escalation steps to stderr as they happen
async fn report_progress(mut progress: watch::Receiver<SearchProgress>) {
    while progress.changed().await.is_ok() {
        let update = progress.borrow_and_update().clone();
        if let SearchProgress::Escalating {
            from_meters,
            to_meters,
            found,
        } = update
        {
            eprintln!(
                "Found {} within {}m, widening to {}m",
                found, from_meters, to_meters
            );
        }
    }
}

/// Print available categories
fn list_categories() {
    println!("Available categories:");
    for category in Category::ALL {
        let tags = category
            .predicates()
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ");
        println!("  {:12} - {}", category.to_string(), tags);
    }
}

/// Print available output formats
fn list_formats() {
    println!("Available output formats:");
    for format in available_formats() {
        println!("  {:6} - {}", format.name, format.description);
    }
}
