//! Spatial data sources
//!
//! Defines the `SpatialProvider` trait and the [`SourceFetcher`] that fans a
//! set of category queries out to a provider.
//!
//! ## Failure policy
//! Categories are independent. A failed or timed-out category is logged and
//! skipped; the fan-out only fails with [`Error::AllSourcesFailed`] when no
//! category succeeded at all. Unusable records are dropped here and never
//! reach the aggregator.

pub mod overpass;

use crate::constants::source::{MAX_TOTAL_TIMEOUT_SECS, QUERY_TIMEOUT_SECS};
use crate::error::{Error, Result};
use crate::poi::RawFeature;
use crate::query::CategoryQuery;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinSet;
use tracing::{debug, warn};

/// Trait for spatial data backends
///
/// Implementations must be thread-safe: each category query runs on its own
/// task.
pub trait SpatialProvider: Send + Sync + 'static {
    /// Returns the provider name (e.g., "overpass")
    fn name(&self) -> &'static str;

    /// Run one category query
    ///
    /// `timeout` is the caller's per-query budget; providers may pass it on
    /// to their transport. The fetcher enforces it regardless.
    fn fetch(
        &self,
        query: &CategoryQuery,
        timeout: Duration,
    ) -> impl Future<Output = Result<Vec<RawFeature>>> + Send;
}

/// Time bounds for one fan-out
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FetchLimits {
    /// Bound on each category query
    pub per_query: Duration,
    /// Bound on the whole fan-out; unfinished queries count as failed
    pub total: Duration,
}

impl Default for FetchLimits {
    fn default() -> Self {
        Self {
            per_query: Duration::from_secs(QUERY_TIMEOUT_SECS),
            total: Duration::from_secs(MAX_TOTAL_TIMEOUT_SECS),
        }
    }
}

/// Executes category queries against a provider, tolerating partial failure
#[derive(Debug)]
pub struct SourceFetcher<P> {
    provider: Arc<P>,
}

impl<P> Clone for SourceFetcher<P> {
    fn clone(&self) -> Self {
        Self {
            provider: Arc::clone(&self.provider),
        }
    }
}

impl<P: SpatialProvider> SourceFetcher<P> {
    /// Create a fetcher over a provider
    pub fn new(provider: P) -> Self {
        Self {
            provider: Arc::new(provider),
        }
    }

    /// Create a fetcher over a shared provider
    pub fn from_arc(provider: Arc<P>) -> Self {
        Self { provider }
    }

    /// The underlying provider
    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Run every query concurrently and merge the usable records
    ///
    /// Records come back grouped in query order regardless of completion
    /// order. Dropping the returned future aborts all in-flight queries.
    pub async fn fetch_all(
        &self,
        queries: &[CategoryQuery],
        limits: FetchLimits,
    ) -> Result<Vec<RawFeature>> {
        if queries.is_empty() {
            return Ok(Vec::new());
        }

        let mut tasks = JoinSet::new();
        for (index, query) in queries.iter().cloned().enumerate() {
            let provider = Arc::clone(&self.provider);
            tasks.spawn(async move {
                let fetch = provider.fetch(&query, limits.per_query);
                let outcome = match tokio::time::timeout(limits.per_query, fetch).await {
                    Ok(result) => result,
                    Err(_) => Err(Error::Provider(format!(
                        "timed out after {:?}",
                        limits.per_query
                    ))),
                };
                (index, query.category, outcome)
            });
        }

        let mut per_query: Vec<Option<Vec<RawFeature>>> = vec![None; queries.len()];
        let drain = async {
            while let Some(joined) = tasks.join_next().await {
                match joined {
                    Ok((index, category, Ok(features))) => {
                        debug!(%category, count = features.len(), "category fetch succeeded");
                        per_query[index] = Some(features);
                    }
                    Ok((_, category, Err(e))) => {
                        warn!(%category, error = %e, "category fetch failed, skipping");
                    }
                    Err(e) => {
                        warn!(error = %e, "category fetch task aborted, skipping");
                    }
                }
            }
        };

        if tokio::time::timeout(limits.total, drain).await.is_err() {
            warn!(
                remaining = tasks.len(),
                "fan-out exceeded {:?}, abandoning unfinished categories", limits.total
            );
            tasks.abort_all();
        }

        let succeeded = per_query.iter().filter(|r| r.is_some()).count();
        if succeeded == 0 {
            return Err(Error::AllSourcesFailed {
                attempted: queries.len(),
            });
        }

        let features: Vec<RawFeature> = per_query
            .into_iter()
            .flatten()
            .flatten()
            .filter(RawFeature::is_usable)
            .collect();

        debug!(
            provider = self.provider.name(),
            succeeded,
            attempted = queries.len(),
            features = features.len(),
            "fan-out settled"
        );

        Ok(features)
    }
}
