//! Shared fixtures: a record store that fails on demand.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use solve_stats::{
    InMemoryRecordStore, InMemoryStatsStore, Partition, Record, RecordQuery, RecordStore,
    SolveStatus, StatsConfig, StatsService, StoreError,
};

pub const USER: &str = "alice";
pub const CATEGORY: &str = "CUBE_3X3";
pub const TAG: &str = "normal";

pub type Service = StatsService<FaultyRecords, InMemoryStatsStore>;

/// Wraps an in-memory store; each switch makes one kind of query fail.
#[derive(Clone, Default)]
pub struct FaultyRecords {
    pub inner: InMemoryRecordStore,
    total_count: Arc<AtomicBool>,
    valid_count: Arc<AtomicBool>,
    average: Arc<AtomicBool>,
}

impl FaultyRecords {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_total_count(&self, on: bool) {
        self.total_count.store(on, Ordering::SeqCst);
    }

    pub fn fail_valid_count(&self, on: bool) {
        self.valid_count.store(on, Ordering::SeqCst);
    }

    pub fn fail_average(&self, on: bool) {
        self.average.store(on, Ordering::SeqCst);
    }

    pub fn add(&self, id: &str, duration: f64, status: SolveStatus, timestamp: u64) {
        self.inner
            .put(Record::new(id, USER, CATEGORY, TAG, duration, status, timestamp))
            .unwrap();
    }
}

fn outage(what: &str) -> StoreError {
    StoreError::Unavailable(format!("{} aggregation timed out", what))
}

impl RecordStore for FaultyRecords {
    fn count(&self, query: &RecordQuery) -> Result<Option<u64>, StoreError> {
        let filtered = !query.filters().is_empty();
        if filtered && self.valid_count.load(Ordering::SeqCst) {
            return Err(outage("valid count"));
        }
        if !filtered && self.total_count.load(Ordering::SeqCst) {
            return Err(outage("count"));
        }
        self.inner.count(query)
    }

    fn average(&self, query: &RecordQuery) -> Result<Option<f64>, StoreError> {
        if self.average.load(Ordering::SeqCst) {
            return Err(outage("average"));
        }
        self.inner.average(query)
    }

    fn fetch(&self, query: &RecordQuery) -> Result<Vec<Record>, StoreError> {
        self.inner.fetch(query)
    }
}

pub fn partition() -> Partition {
    Partition::new(USER, CATEGORY, TAG).unwrap()
}

pub fn service(records: &FaultyRecords) -> Service {
    StatsService::new(records.clone(), InMemoryStatsStore::new(), StatsConfig::default())
}
