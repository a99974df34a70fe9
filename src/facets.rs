//! Facet aggregation
//!
//! Maintains the facet buckets shown next to search results. Buckets
//! are counted server-side over the full filtered set, so a refresh
//! sends the current criteria without pagination and replaces the
//! whole list. A failed refresh keeps the previous buckets on display.

use crate::query::UserQuery;
use crate::service::{Bucket, SearchService};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, warn};

/// Fetches and holds the facet buckets for the current criteria.
pub struct FacetAggregator {
    service: Arc<dyn SearchService>,
    buckets: Mutex<Vec<Bucket>>,
}

impl FacetAggregator {
    pub fn new(service: Arc<dyn SearchService>) -> Self {
        Self {
            service,
            buckets: Mutex::new(Vec::new()),
        }
    }

    /// Re-aggregate for the given criteria. On success the stored
    /// buckets are replaced wholesale; on failure they stay as they
    /// were.
    pub async fn refresh(&self, query: &UserQuery) {
        match self.service.aggregate(&query.aggregate_params()).await {
            Ok(buckets) => {
                debug!("Aggregation returned {} buckets", buckets.len());
                *self.buckets.lock().await = buckets;
            }
            Err(err) => {
                warn!("Aggregation request failed: {}", err);
            }
        }
    }

    /// Snapshot of the current buckets.
    pub async fn buckets(&self) -> Vec<Bucket> {
        self.buckets.lock().await.clone()
    }
}
