use std::time::Duration;

use async_trait::async_trait;
use moka::future::Cache;
use tracing::debug;

use crate::attribution::Report;
use crate::cache::ReportCache;

pub struct MokaReportCache {
    inner: Cache<String, Report>,
}

impl MokaReportCache {
    pub fn new(max_capacity: u64, default_ttl_secs: u64) -> Self {
        let inner = Cache::builder()
            .max_capacity(max_capacity)
            .time_to_live(Duration::from_secs(default_ttl_secs))
            .build();

        debug!(
            "MokaReportCache initialized with max capacity: {}, TTL: {}s",
            max_capacity, default_ttl_secs
        );
        Self { inner }
    }
}

#[async_trait]
impl ReportCache for MokaReportCache {
    async fn get(&self, key: &str) -> Option<Report> {
        self.inner.get(key).await
    }

    async fn insert(&self, key: String, report: Report, _ttl_secs: Option<u64>) {
        // ttl_secs is ignored; the builder-level TTL governs expiry
        self.inner.insert(key, report).await;
    }

    async fn remove(&self, key: &str) {
        self.inner.invalidate(key).await;
    }

    async fn invalidate_all(&self) {
        self.inner.invalidate_all();
    }
}
