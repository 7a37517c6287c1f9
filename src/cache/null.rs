use async_trait::async_trait;

use crate::attribution::Report;
use crate::cache::ReportCache;

/// No-op cache: every lookup misses. Used when caching is disabled and in
/// tests that must observe the compute path.
#[derive(Default)]
pub struct NullReportCache;

impl NullReportCache {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ReportCache for NullReportCache {
    async fn get(&self, _key: &str) -> Option<Report> {
        None
    }

    async fn insert(&self, _key: String, _report: Report, _ttl_secs: Option<u64>) {}

    async fn remove(&self, _key: &str) {}

    async fn invalidate_all(&self) {}
}
