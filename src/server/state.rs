//! Server shared state
//!
//! Holds configuration and the discovery pipeline shared by all requests.

use crate::config::Config;
use crate::discovery::Discovery;
use crate::geo::ip_location::IpLocator;
use std::sync::Arc;
use std::time::Instant;

/// Shared state for the HTTP server
#[derive(Debug)]
pub struct AppState<G, P> {
    /// Configuration
    pub config: Arc<Config>,

    /// Location resolution and radius escalation
    pub discovery: Arc<Discovery<G, P>>,

    /// Used by `GET /api/location`
    pub locator: IpLocator,

    started: Instant,
}

impl<G, P> AppState<G, P> {
    /// Create new application state
    pub fn new(config: Config, discovery: Discovery<G, P>, locator: IpLocator) -> Self {
        Self {
            config: Arc::new(config),
            discovery: Arc::new(discovery),
            locator,
            started: Instant::now(),
        }
    }

    /// Seconds since the state was created
    pub fn uptime_secs(&self) -> u64 {
        self.started.elapsed().as_secs()
    }
}
