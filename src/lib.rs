//! nearby: Points-of-Interest Discovery
//!
//! A library and CLI tool for finding places of interest around a location
//! using OpenStreetMap data, widening the search radius until enough places
//! are found.
//!
//! ## Features
//!
//! - Free-text or "lat,lon" locations (Nominatim geocoding)
//! - Eight fixed categories queried concurrently against Overpass
//! - Deduplication by spatial grid cell and ranking by distance
//! - Radius escalation with backoff and whole-operation cancellation
//! - HTTP API + CLI interface
//!
//! ## Quick Start
//!
//! ```rust
//! use nearby::coord::{bounding_box, distance_meters, Coordinates};
//! use nearby::poi::Category;
//! use nearby::query::build_queries;
//!
//! let louvre = Coordinates::new(48.8606, 2.3376);
//! let notre_dame = Coordinates::new(48.8530, 2.3499);
//! println!("{} m apart", distance_meters(louvre, notre_dame));
//!
//! let bbox = bounding_box(louvre, 1000.0).unwrap();
//! assert!(!bbox.contains(notre_dame));
//!
//! // One Overpass query per category
//! let queries = build_queries(louvre, 1000.0, &[Category::Cafe, Category::Bar]).unwrap();
//! println!("{}", queries[0].to_overpass_ql(10));
//! ```
//!
//! Running a full discovery needs network access:
//!
//! ```rust,no_run
//! use nearby::discovery::{DiscoveryRequest, LiveDiscovery};
//! use nearby::Config;
//! use tokio_util::sync::CancellationToken;
//!
//! # async fn example() -> nearby::Result<()> {
//! let discovery = LiveDiscovery::from_config(&Config::default())?;
//! let response = discovery
//!     .discover(DiscoveryRequest::text("Louvre, Paris"), &CancellationToken::new())
//!     .await?;
//! for poi in response.pois() {
//!     println!("{} ({}) {} m", poi.name, poi.category, poi.distance_meters);
//! }
//! # Ok(())
//! # }
//! ```

pub mod aggregate;
pub mod cli;
pub mod config;
pub mod constants;
pub mod coord;
pub mod discovery;
pub mod error;
pub mod format;
pub mod geo;
pub mod poi;
pub mod query;
pub mod search;
pub mod server;
pub mod source;

// Re-export commonly used types
pub use config::Config;
pub use coord::Coordinates;
pub use discovery::{Discovery, DiscoveryRequest, DiscoveryResponse};
pub use error::{Error, Result};
pub use poi::{Category, Poi};
pub use search::{EscalationPolicy, RadiusEscalationController, SearchOutcome};
