//! Report cache abstraction
//!
//! Dependency-injected cache for computed channel reports, so the lazy
//! compute-on-read path stays testable without a real cache backend.

pub mod moka;
pub mod null;

pub use moka::MokaReportCache;
pub use null::NullReportCache;

use std::future::Future;

use async_trait::async_trait;

use crate::attribution::Report;
use crate::errors::Result;

#[async_trait]
pub trait ReportCache: Send + Sync {
    async fn get(&self, key: &str) -> Option<Report>;

    /// `ttl_secs` is advisory; backends may apply a builder-level TTL instead
    async fn insert(&self, key: String, report: Report, ttl_secs: Option<u64>);

    async fn remove(&self, key: &str);

    async fn invalidate_all(&self);
}

/// Serve from cache when present, otherwise compute, store and return.
///
/// Compute failures are not cached; the next call retries.
pub async fn get_or_compute<F, Fut>(
    cache: &dyn ReportCache,
    key: &str,
    ttl_secs: Option<u64>,
    compute: F,
) -> Result<Report>
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<Report>>,
{
    if let Some(hit) = cache.get(key).await {
        tracing::trace!("Report cache hit: {}", key);
        return Ok(hit);
    }
    let report = compute().await?;
    cache.insert(key.to_string(), report.clone(), ttl_secs).await;
    Ok(report)
}
