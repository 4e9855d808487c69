//! Debounced, latest-only async lookups.
//!
//! Used by the category typeahead and the "report date already exists"
//! validator. A new input cancels the lookup still in flight, and a result
//! that arrives for anything but the latest input is discarded.

mod latest;
mod lookups;

use async_trait::async_trait;

use crate::api::ApiError;

pub use latest::{LatestOnly, LookupState};
pub use lookups::{CategorySearch, ReportDateExists, ReportDateQuery};

/// A single async lookup against the backend.
#[async_trait]
pub trait Lookup: Send + Sync + 'static {
    type Query: Clone + PartialEq + Send + Sync + 'static;
    type Output: Clone + PartialEq + Send + Sync + 'static;

    async fn lookup(&self, query: Self::Query) -> Result<Self::Output, ApiError>;

    /// Shown when a failed lookup carries no message of its own.
    fn failure_message(&self) -> &'static str {
        "Lookup failed"
    }

    /// Queries that clear the state instead of calling the backend.
    fn is_empty(&self, _query: &Self::Query) -> bool {
        false
    }
}
