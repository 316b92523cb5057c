//! Radius escalation
//!
//! Runs repeated fetch/aggregate cycles around a fixed center, widening the
//! radius while too few POIs are found.
//!
//! ## State machine
//! - Search: build queries at the current radius, fetch, aggregate.
//!   Every category failing ends the operation (`Failed`).
//! - Escalate: fewer than `min_results` POIs and radius below the ceiling.
//!   Multiply the radius, wait out the backoff, search again.
//! - Settle: otherwise end with the current list (`Done`). Running out of
//!   radius with few results is a valid outcome, not an error.
//!
//! A failed cycle is never retried at the same radius. Cancellation is
//! honoured during a cycle and during the backoff delay.

use crate::aggregate::aggregate;
use crate::constants::search::{
    BACKOFF_MS, INITIAL_RADIUS_METERS, MAX_RADIUS_METERS, MIN_RESULTS, RADIUS_MULTIPLIER,
};
use crate::coord::Coordinates;
use crate::error::{Error, Result};
use crate::poi::{Category, Poi};
use crate::query::build_queries;
use crate::source::{FetchLimits, SourceFetcher, SpatialProvider};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// Tunables for the escalation loop
#[derive(Debug, Clone, PartialEq)]
pub struct EscalationPolicy {
    pub initial_radius_meters: f64,
    pub min_results: usize,
    pub max_radius_meters: f64,
    pub radius_multiplier: f64,
    pub backoff: Duration,
}

impl Default for EscalationPolicy {
    fn default() -> Self {
        Self {
            initial_radius_meters: INITIAL_RADIUS_METERS,
            min_results: MIN_RESULTS,
            max_radius_meters: MAX_RADIUS_METERS,
            radius_multiplier: RADIUS_MULTIPLIER,
            backoff: Duration::from_millis(BACKOFF_MS),
        }
    }
}

impl EscalationPolicy {
    /// Reject policies whose escalation could not terminate
    pub fn validate(&self) -> Result<()> {
        if self.initial_radius_meters <= 0.0 || !self.initial_radius_meters.is_finite() {
            return Err(Error::InvalidRadius(format!(
                "Initial radius must be positive, got {}",
                self.initial_radius_meters
            )));
        }
        if self.max_radius_meters < self.initial_radius_meters
            || !self.max_radius_meters.is_finite()
        {
            return Err(Error::InvalidRadius(format!(
                "Maximum radius {} is below initial radius {}",
                self.max_radius_meters, self.initial_radius_meters
            )));
        }
        if self.radius_multiplier <= 1.0 || !self.radius_multiplier.is_finite() {
            return Err(Error::Config(format!(
                "Radius multiplier must be greater than 1, got {}",
                self.radius_multiplier
            )));
        }
        if self.min_results == 0 {
            return Err(Error::Config("Minimum results must be at least 1".to_string()));
        }
        Ok(())
    }

    /// Whether a cycle that found `found` POIs at `radius_meters` escalates
    pub fn should_escalate(&self, found: usize, radius_meters: f64) -> bool {
        found < self.min_results && radius_meters < self.max_radius_meters
    }

    /// Upper bound on escalations: smallest n with initial * multiplier^n >= ceiling
    pub fn max_escalations(&self) -> u32 {
        let mut radius = self.initial_radius_meters;
        let mut escalations = 0;
        while radius < self.max_radius_meters {
            radius *= self.radius_multiplier;
            escalations += 1;
        }
        escalations
    }
}

/// Mutable state of one escalation run
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SearchState {
    pub center: Coordinates,
    pub radius_meters: f64,
    /// Escalations performed so far
    pub attempt: u32,
}

impl SearchState {
    fn initial(center: Coordinates, policy: &EscalationPolicy) -> Self {
        Self {
            center,
            radius_meters: policy.initial_radius_meters,
            attempt: 0,
        }
    }

    fn escalate(&mut self, policy: &EscalationPolicy) {
        self.radius_meters *= policy.radius_multiplier;
        self.attempt += 1;
    }
}

/// Terminal result of a settled search
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchOutcome {
    pub pois: Vec<Poi>,
    pub radius_used_meters: f64,
    /// Search cycles run, including the first
    pub attempts: u32,
}

/// Observable phase of a discovery operation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "phase", rename_all = "snake_case")]
pub enum SearchProgress {
    Pending,
    Resolving,
    Searching { radius_meters: f64, attempt: u32 },
    Escalating { from_meters: f64, to_meters: f64, found: usize },
    Done { found: usize, radius_meters: f64, attempts: u32 },
    Failed { reason: String },
    Cancelled,
}

impl SearchProgress {
    /// Whether no further progress will be reported
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done { .. } | Self::Failed { .. } | Self::Cancelled)
    }
}

/// Drives the escalation state machine over a source fetcher
#[derive(Debug)]
pub struct RadiusEscalationController<P> {
    fetcher: SourceFetcher<P>,
    policy: EscalationPolicy,
    limits: FetchLimits,
}

impl<P: SpatialProvider> RadiusEscalationController<P> {
    /// Create a controller; fails if the policy could not terminate
    pub fn new(
        fetcher: SourceFetcher<P>,
        policy: EscalationPolicy,
        limits: FetchLimits,
    ) -> Result<Self> {
        policy.validate()?;
        Ok(Self {
            fetcher,
            policy,
            limits,
        })
    }

    pub fn policy(&self) -> &EscalationPolicy {
        &self.policy
    }

    pub fn fetcher(&self) -> &SourceFetcher<P> {
        &self.fetcher
    }

    pub fn provider_name(&self) -> &'static str {
        self.fetcher.provider().name()
    }

    /// Search every category around `center`
    pub async fn run(
        &self,
        center: Coordinates,
        cancel: &CancellationToken,
    ) -> Result<SearchOutcome> {
        let (progress, _) = watch::channel(SearchProgress::Pending);
        self.run_observed(center, &Category::ALL, cancel, &progress).await
    }

    /// Search `categories` around `center`, publishing each transition
    pub async fn run_observed(
        &self,
        center: Coordinates,
        categories: &[Category],
        cancel: &CancellationToken,
        progress: &watch::Sender<SearchProgress>,
    ) -> Result<SearchOutcome> {
        let result = self.escalate(center, categories, cancel, progress).await;

        let terminal = match &result {
            Ok(outcome) => SearchProgress::Done {
                found: outcome.pois.len(),
                radius_meters: outcome.radius_used_meters,
                attempts: outcome.attempts,
            },
            Err(Error::Cancelled) => SearchProgress::Cancelled,
            Err(e) => SearchProgress::Failed {
                reason: e.to_string(),
            },
        };
        progress.send_replace(terminal);

        result
    }

    async fn escalate(
        &self,
        center: Coordinates,
        categories: &[Category],
        cancel: &CancellationToken,
        progress: &watch::Sender<SearchProgress>,
    ) -> Result<SearchOutcome> {
        center.validate()?;
        let max_escalations = self.policy.max_escalations();
        let mut state = SearchState::initial(center, &self.policy);

        loop {
            progress.send_replace(SearchProgress::Searching {
                radius_meters: state.radius_meters,
                attempt: state.attempt,
            });

            let pois = tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(Error::Cancelled),
                pois = self.search(&state, categories) => pois?,
            };

            let escalate = state.attempt < max_escalations
                && self.policy.should_escalate(pois.len(), state.radius_meters);
            if !escalate {
                info!(
                    found = pois.len(),
                    radius = state.radius_meters,
                    attempts = state.attempt + 1,
                    "search settled"
                );
                return Ok(SearchOutcome {
                    pois,
                    radius_used_meters: state.radius_meters,
                    attempts: state.attempt + 1,
                });
            }

            let from = state.radius_meters;
            state.escalate(&self.policy);
            info!(
                found = pois.len(),
                from,
                to = state.radius_meters,
                "too few results, widening search"
            );
            progress.send_replace(SearchProgress::Escalating {
                from_meters: from,
                to_meters: state.radius_meters,
                found: pois.len(),
            });

            tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(Error::Cancelled),
                _ = tokio::time::sleep(self.policy.backoff) => {}
            }
        }
    }

    /// One Search transition
    async fn search(&self, state: &SearchState, categories: &[Category]) -> Result<Vec<Poi>> {
        let queries = build_queries(state.center, state.radius_meters, categories)?;
        debug!(
            radius = state.radius_meters,
            attempt = state.attempt,
            queries = queries.len(),
            "starting search cycle"
        );

        let features = self.fetcher.fetch_all(&queries, self.limits).await?;
        Ok(aggregate(state.center, features))
    }
}
