//! Store traits and backends
//!
//! The attribution engine only sees these traits. Touches are an
//! append-only log and conversions are written once; the result store is
//! the single mutable surface and must provide atomic
//! replace-all-for-key semantics so a reader never observes a partial
//! result set mid-overwrite.

pub mod memory;

pub use memory::MemoryStore;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::attribution::{
    AttributionModel, AttributionResult, Conversion, DateRange, NewConversion, NewTouch, Touch,
};
use crate::errors::Result;

/// Read/append view over the visitor touch log
#[async_trait]
pub trait TouchStore: Send + Sync {
    /// Append a touch; the store assigns the insertion id
    async fn record_touch(&self, touch: NewTouch) -> Result<Touch>;

    /// Lookup by insertion id (channel join for report aggregation)
    async fn get_touch(&self, touch_id: i64) -> Result<Option<Touch>>;

    /// All touches for one visitor, ordered ascending by (occurred_at, id),
    /// optionally restricted to touches at or before `before_or_at`
    async fn get_visitor_touches(
        &self,
        visitor_id: &str,
        before_or_at: Option<DateTime<Utc>>,
    ) -> Result<Vec<Touch>>;
}

/// Read/write view over conversion records
#[async_trait]
pub trait ConversionStore: Send + Sync {
    /// Record a conversion; the store assigns the insertion id
    async fn record_conversion(&self, conversion: NewConversion) -> Result<Conversion>;

    async fn get(&self, conversion_id: i64) -> Result<Option<Conversion>>;

    /// Conversions whose `occurred_at` falls inside the inclusive range,
    /// ordered ascending by id
    async fn list_in_range(&self, range: &DateRange) -> Result<Vec<Conversion>>;
}

/// Cached attribution results, keyed by (conversion, model)
#[async_trait]
pub trait AttributionResultStore: Send + Sync {
    /// Atomic replace-all-for-key: drops any prior rows for the pair
    async fn replace(
        &self,
        conversion_id: i64,
        model: AttributionModel,
        results: Vec<AttributionResult>,
    ) -> Result<()>;

    /// Stored rows for the pair; empty when never computed
    async fn get(
        &self,
        conversion_id: i64,
        model: AttributionModel,
    ) -> Result<Vec<AttributionResult>>;
}
