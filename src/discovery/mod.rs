//! Discovery operations
//!
//! A discovery operation resolves a location and runs radius escalation
//! around it. It is cancellable as a unit through one
//! [`CancellationToken`]: cancelling aborts resolution, in-flight category
//! fetches and any pending backoff. Nothing outlives the operation.

use crate::config::Config;
use crate::coord::Coordinates;
use crate::error::{Error, Result};
use crate::geo::resolver::{LocationSource, ResolvedLocation};
use crate::geo::nominatim::NominatimBackend;
use crate::geo::{GeoBackend, LocationResolver};
use crate::poi::{Category, Poi};
use crate::search::{RadiusEscalationController, SearchOutcome, SearchProgress};
use crate::source::overpass::OverpassBackend;
use crate::source::{SourceFetcher, SpatialProvider};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::{CancellationToken, DropGuard};
use tracing::info;

/// Where to search
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Target {
    /// Free text or a literal "lat,lon", run through the resolver
    Text(String),
    /// Already-known coordinates
    Point(Coordinates),
}

/// Input to one discovery operation
#[derive(Debug, Clone, PartialEq)]
pub struct DiscoveryRequest {
    pub target: Target,
    pub categories: Vec<Category>,
}

impl DiscoveryRequest {
    /// Search every category around free-text input
    pub fn text(input: impl Into<String>) -> Self {
        Self {
            target: Target::Text(input.into()),
            categories: Category::ALL.to_vec(),
        }
    }

    /// Search every category around a coordinate
    pub fn point(coords: Coordinates) -> Self {
        Self {
            target: Target::Point(coords),
            categories: Category::ALL.to_vec(),
        }
    }

    /// Restrict to a subset of categories; empty means all
    pub fn with_categories(mut self, categories: Vec<Category>) -> Self {
        self.categories = if categories.is_empty() {
            Category::ALL.to_vec()
        } else {
            categories
        };
        self
    }
}

/// Request parameters echoed in the response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestSummary {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub input: Option<String>,
    pub lat: f64,
    pub lng: f64,
    pub categories: Vec<Category>,
}

/// Metadata about the discovery
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscoveryMetadata {
    /// When this was discovered
    pub timestamp: String,
    /// Geocoder display name, if the location was geocoded
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location_name: Option<String>,
    /// Spatial provider used
    pub provider: String,
}

/// The artifact handed to presentation layers
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscoveryResponse {
    /// Unique ID for this discovery
    pub id: String,

    /// Original request parameters
    pub request: RequestSummary,

    /// Ranked POIs, radius used and cycle count
    #[serde(flatten)]
    pub outcome: SearchOutcome,

    /// Metadata about the discovery
    pub metadata: DiscoveryMetadata,
}

impl DiscoveryResponse {
    pub fn pois(&self) -> &[Poi] {
        &self.outcome.pois
    }

    pub fn center(&self) -> Coordinates {
        Coordinates::new(self.request.lat, self.request.lng)
    }
}

/// Location resolution followed by radius escalation
#[derive(Debug)]
pub struct Discovery<G, P> {
    resolver: LocationResolver<G>,
    controller: RadiusEscalationController<P>,
}

impl<G, P> Discovery<G, P>
where
    G: GeoBackend + 'static,
    P: SpatialProvider,
{
    pub fn new(resolver: LocationResolver<G>, controller: RadiusEscalationController<P>) -> Self {
        Self {
            resolver,
            controller,
        }
    }

    pub fn controller(&self) -> &RadiusEscalationController<P> {
        &self.controller
    }

    /// Run one discovery to completion
    pub async fn discover(
        &self,
        request: DiscoveryRequest,
        cancel: &CancellationToken,
    ) -> Result<DiscoveryResponse> {
        let (progress, _) = watch::channel(SearchProgress::Pending);
        self.discover_observed(request, cancel, &progress).await
    }

    /// Run one discovery, publishing progress
    pub async fn discover_observed(
        &self,
        request: DiscoveryRequest,
        cancel: &CancellationToken,
        progress: &watch::Sender<SearchProgress>,
    ) -> Result<DiscoveryResponse> {
        let (location, input) = match request.target {
            Target::Text(input) => {
                progress.send_replace(SearchProgress::Resolving);
                let resolved = tokio::select! {
                    biased;
                    _ = cancel.cancelled() => Err(Error::Cancelled),
                    resolved = self.resolver.resolve_location(&input) => resolved,
                };
                match resolved {
                    Ok(location) => (location, Some(input)),
                    Err(e) => {
                        progress.send_replace(terminal_progress(&e));
                        return Err(e);
                    }
                }
            }
            Target::Point(coords) => (
                ResolvedLocation {
                    coords,
                    display_name: None,
                    source: LocationSource::Literal,
                },
                None,
            ),
        };

        let outcome = self
            .controller
            .run_observed(location.coords, &request.categories, cancel, progress)
            .await?;

        info!(
            found = outcome.pois.len(),
            radius = outcome.radius_used_meters,
            attempts = outcome.attempts,
            "discovery complete"
        );

        Ok(DiscoveryResponse {
            id: uuid::Uuid::new_v4().to_string(),
            request: RequestSummary {
                input,
                lat: location.coords.lat,
                lng: location.coords.lng,
                categories: request.categories,
            },
            outcome,
            metadata: DiscoveryMetadata {
                timestamp: chrono::Utc::now().to_rfc3339(),
                location_name: location.display_name,
                provider: self.controller.provider_name().to_string(),
            },
        })
    }

    /// Start a discovery on the runtime and return a handle to it
    pub fn spawn(self: &Arc<Self>, request: DiscoveryRequest) -> DiscoveryHandle {
        let cancel = CancellationToken::new();
        let (progress_tx, progress_rx) = watch::channel(SearchProgress::Pending);

        let this = Arc::clone(self);
        let token = cancel.clone();
        let task = tokio::spawn(async move {
            this.discover_observed(request, &token, &progress_tx).await
        });

        DiscoveryHandle {
            guard: cancel.clone().drop_guard(),
            cancel,
            progress: progress_rx,
            task,
        }
    }
}

/// Discovery against the public Nominatim and Overpass services
pub type LiveDiscovery = Discovery<NominatimBackend, OverpassBackend>;

impl LiveDiscovery {
    /// Build the network-backed pipeline from configuration
    pub fn from_config(config: &Config) -> Result<Self> {
        let geocoder = NominatimBackend::with_base_url(
            config.geocoding.nominatim_url.clone(),
            &config.geocoding.user_agent,
            config.geocoding_timeout(),
        )?;
        let provider = OverpassBackend::with_url(
            config.sources.overpass_url.clone(),
            config.sources.server_timeout_secs,
        )?;
        let controller = RadiusEscalationController::new(
            SourceFetcher::new(provider),
            config.escalation_policy(),
            config.fetch_limits(),
        )?;

        Ok(Self::new(LocationResolver::new(geocoder), controller))
    }
}

fn terminal_progress(err: &Error) -> SearchProgress {
    match err {
        Error::Cancelled => SearchProgress::Cancelled,
        e => SearchProgress::Failed {
            reason: e.to_string(),
        },
    }
}

/// A running discovery operation
///
/// Dropping the handle cancels the operation.
#[derive(Debug)]
pub struct DiscoveryHandle {
    cancel: CancellationToken,
    guard: DropGuard,
    progress: watch::Receiver<SearchProgress>,
    task: JoinHandle<Result<DiscoveryResponse>>,
}

impl DiscoveryHandle {
    /// Request cancellation; a no-op once the operation has finished
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Latest-state view of the operation's progress
    pub fn progress(&self) -> watch::Receiver<SearchProgress> {
        self.progress.clone()
    }

    /// Wait for the operation to finish
    pub async fn outcome(self) -> Result<DiscoveryResponse> {
        let Self { guard, task, .. } = self;
        let result = match task.await {
            Ok(result) => result,
            Err(e) if e.is_cancelled() => Err(Error::Cancelled),
            Err(e) => Err(Error::Internal(format!("Discovery task failed: {}", e))),
        };
        // Operation is over; cancelling now is a no-op
        drop(guard);
        result
    }
}
