use crate::error::StoreError;
use crate::record::{Partition, Record};
use crate::store::{Direction, RecordQuery, RecordStore, SortField};

/// Cap on the recent-records window.
pub const DEFAULT_WINDOW_LIMIT: usize = 100;

/// Fetches the most recent records of a partition, newest first.
///
/// Errors are returned untouched; in particular `IndexUnavailable` is not
/// retried here, the caller decides whether to abort.
pub struct WindowSampler<R> {
    records: R,
}

impl<R: RecordStore> WindowSampler<R> {
    pub fn new(records: R) -> Self {
        Self { records }
    }

    pub fn sample(&self, partition: &Partition, limit: usize) -> Result<Vec<Record>, StoreError> {
        let query = RecordQuery::partition(partition)
            .order_by(SortField::Timestamp, Direction::Descending)
            .limit(limit);
        self.records.fetch(&query)
    }
}

/// Durations of the valid records in `window`, in window order.
pub fn valid_times(window: &[Record]) -> Vec<f64> {
    window
        .iter()
        .filter(|record| record.is_valid())
        .map(|record| record.duration)
        .collect()
}
