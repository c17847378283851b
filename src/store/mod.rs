//! RecordStore - the queryable collection the statistics are derived from.
//!
//! Queries are always scoped to one partition and may add a status filter,
//! an ordering and a limit. Count and average are native aggregations so an
//! implementation never has to ship the whole partition to the caller.

mod in_memory;

use std::sync::Arc;

use crate::error::StoreError;
use crate::record::{Partition, Record, SolveStatus};

pub use in_memory::InMemoryRecordStore;

/// Extra predicate on top of the partition equality filters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Filter {
    /// `status != value`
    StatusNot(SolveStatus),
}

impl Filter {
    pub fn matches(&self, record: &Record) -> bool {
        match self {
            Filter::StatusNot(status) => record.status != *status,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SortField {
    Timestamp,
    Duration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Ascending,
    Descending,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderBy {
    pub field: SortField,
    pub direction: Direction,
}

/// A partition-scoped query.
///
/// ```
/// use solve_stats::{Direction, Partition, RecordQuery, SortField};
///
/// let partition = Partition::new("u1", "CUBE_3X3", "normal").unwrap();
/// let window = RecordQuery::partition(&partition)
///     .order_by(SortField::Timestamp, Direction::Descending)
///     .limit(100);
/// assert_eq!(window.limit_value(), Some(100));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct RecordQuery {
    partition: Partition,
    filters: Vec<Filter>,
    order: Option<OrderBy>,
    limit: Option<usize>,
}

impl RecordQuery {
    pub fn partition(partition: &Partition) -> Self {
        Self {
            partition: partition.clone(),
            filters: Vec::new(),
            order: None,
            limit: None,
        }
    }

    pub fn filter(mut self, filter: Filter) -> Self {
        self.filters.push(filter);
        self
    }

    /// Shorthand for `status != DNF`.
    pub fn valid_only(self) -> Self {
        self.filter(Filter::StatusNot(SolveStatus::Dnf))
    }

    pub fn order_by(mut self, field: SortField, direction: Direction) -> Self {
        self.order = Some(OrderBy { field, direction });
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn scope(&self) -> &Partition {
        &self.partition
    }

    pub fn filters(&self) -> &[Filter] {
        &self.filters
    }

    pub fn ordering(&self) -> Option<OrderBy> {
        self.order
    }

    pub fn limit_value(&self) -> Option<usize> {
        self.limit
    }

    /// True when the record satisfies the partition and every filter.
    pub fn matches(&self, record: &Record) -> bool {
        record.belongs_to(&self.partition) && self.filters.iter().all(|f| f.matches(record))
    }
}

/// Store interface consumed by the recalculation engine.
pub trait RecordStore: Send + Sync {
    /// Count records matching the query. `None` when the aggregation
    /// produced no result.
    fn count(&self, query: &RecordQuery) -> Result<Option<u64>, StoreError>;

    /// Mean `duration` over records matching the query. `None` when no
    /// record matched.
    fn average(&self, query: &RecordQuery) -> Result<Option<f64>, StoreError>;

    /// Fetch records honouring the query's ordering and limit.
    ///
    /// Must fail with [`StoreError::IndexUnavailable`] when the index that
    /// backs the ordering is still building.
    fn fetch(&self, query: &RecordQuery) -> Result<Vec<Record>, StoreError>;
}

impl<T: RecordStore + ?Sized> RecordStore for Arc<T> {
    fn count(&self, query: &RecordQuery) -> Result<Option<u64>, StoreError> {
        (**self).count(query)
    }

    fn average(&self, query: &RecordQuery) -> Result<Option<f64>, StoreError> {
        (**self).average(query)
    }

    fn fetch(&self, query: &RecordQuery) -> Result<Vec<Record>, StoreError> {
        (**self).fetch(query)
    }
}
