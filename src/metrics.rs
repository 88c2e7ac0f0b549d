//! Store operation timings.
//!
//! Every catalog and ledger call the clients make is recorded under its
//! operation, collection and outcome, the same labels the request layer
//! reports, and logged as a `store_operation` debug event.

use std::collections::BTreeMap;
use std::future::Future;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::time::Instant;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct OperationKey {
    pub operation: &'static str,
    pub collection: &'static str,
    pub success: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DurationSummary {
    pub count: u64,
    pub total: Duration,
    pub max: Duration,
}

impl DurationSummary {
    pub fn mean(&self) -> Option<Duration> {
        u32::try_from(self.count)
            .ok()
            .filter(|count| *count > 0)
            .map(|count| self.total / count)
    }

    fn observe(&mut self, elapsed: Duration) {
        self.count += 1;
        self.total += elapsed;
        self.max = self.max.max(elapsed);
    }
}

/// Shared registry; clones record into the same table.
#[derive(Clone, Default)]
pub struct OperationMetrics {
    table: Arc<Mutex<BTreeMap<OperationKey, DurationSummary>>>,
}

impl OperationMetrics {
    /// Awaits `operation` and records its duration and whether it returned `Ok`.
    pub async fn time<T, E, F>(&self, operation: &'static str, collection: &'static str, call: F) -> Result<T, E>
    where
        F: Future<Output = Result<T, E>>,
    {
        let started = Instant::now();
        let result = call.await;
        let elapsed = started.elapsed();

        let key = OperationKey { operation, collection, success: result.is_ok() };
        debug!(
            operation,
            collection,
            success = key.success,
            duration_ms = elapsed.as_secs_f64() * 1000.0,
            "store_operation"
        );
        self.observe(key, elapsed);
        result
    }

    pub fn observe(&self, key: OperationKey, elapsed: Duration) {
        let mut table = self.table.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        table.entry(key).or_default().observe(elapsed);
    }

    pub fn summary(&self, operation: &str, collection: &str, success: bool) -> Option<DurationSummary> {
        self.snapshot()
            .into_iter()
            .find(|(key, _)| key.operation == operation && key.collection == collection && key.success == success)
            .map(|(_, summary)| summary)
    }

    /// All recorded series, ordered by key.
    pub fn snapshot(&self) -> Vec<(OperationKey, DurationSummary)> {
        let table = self.table.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        table.iter().map(|(key, summary)| (*key, *summary)).collect()
    }
}
