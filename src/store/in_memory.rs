//! InMemoryRecordStore - HashMap-backed record collection for testing and development.

use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::{Arc, RwLock};

use super::{Direction, RecordQuery, RecordStore, SortField};
use crate::error::StoreError;
use crate::record::{MutationEvent, PartitionFields, Record};

/// In-memory record store.
///
/// Records live under their owning user, keyed by record id, so iteration
/// order (and therefore every aggregate) is deterministic. Clone-friendly via
/// Arc; clones share the same collection.
#[derive(Clone)]
pub struct InMemoryRecordStore {
    users: Arc<RwLock<HashMap<String, BTreeMap<String, Record>>>>,
    building: Arc<RwLock<HashSet<SortField>>>,
}

impl Default for InMemoryRecordStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryRecordStore {
    pub fn new() -> Self {
        Self {
            users: Arc::new(RwLock::new(HashMap::new())),
            building: Arc::new(RwLock::new(HashSet::new())),
        }
    }

    /// Insert or replace a record, returning the mutation to deliver.
    pub fn put(&self, record: Record) -> Result<MutationEvent, StoreError> {
        let mut users = self
            .users
            .write()
            .map_err(|_| StoreError::LockPoisoned("put"))?;

        let user = record.user.clone();
        let after = fields_of(&record);
        let previous = users
            .entry(user.clone())
            .or_default()
            .insert(record.id.clone(), record);

        Ok(match previous {
            Some(before) => MutationEvent::updated(user, fields_of(&before), after),
            None => MutationEvent::created(user, after),
        })
    }

    /// Remove a record. `None` when it did not exist.
    pub fn remove(&self, user: &str, id: &str) -> Result<Option<MutationEvent>, StoreError> {
        let mut users = self
            .users
            .write()
            .map_err(|_| StoreError::LockPoisoned("remove"))?;

        let removed = users.get_mut(user).and_then(|records| records.remove(id));
        Ok(removed.map(|record| MutationEvent::deleted(user, fields_of(&record))))
    }

    pub fn get(&self, user: &str, id: &str) -> Result<Option<Record>, StoreError> {
        let users = self
            .users
            .read()
            .map_err(|_| StoreError::LockPoisoned("get"))?;
        Ok(users.get(user).and_then(|records| records.get(id)).cloned())
    }

    /// Total records across all users.
    pub fn len(&self) -> usize {
        self.users
            .read()
            .map(|users| users.values().map(BTreeMap::len).sum())
            .unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Mark the index ordering on `field` as building (or ready again).
    /// Ordered fetches on a building index fail with `IndexUnavailable`.
    pub fn set_index_building(&self, field: SortField, building: bool) {
        if let Ok(mut set) = self.building.write() {
            if building {
                set.insert(field);
            } else {
                set.remove(&field);
            }
        }
    }

    fn matching(&self, query: &RecordQuery) -> Result<Vec<Record>, StoreError> {
        let users = self
            .users
            .read()
            .map_err(|_| StoreError::LockPoisoned("query"))?;

        Ok(users
            .get(&query.scope().user)
            .map(|records| {
                records
                    .values()
                    .filter(|record| query.matches(record))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    fn ensure_index(&self, field: SortField) -> Result<(), StoreError> {
        let building = self
            .building
            .read()
            .map_err(|_| StoreError::LockPoisoned("index check"))?;
        if building.contains(&field) {
            return Err(StoreError::IndexUnavailable {
                index: index_name(field).to_string(),
            });
        }
        Ok(())
    }
}

impl RecordStore for InMemoryRecordStore {
    fn count(&self, query: &RecordQuery) -> Result<Option<u64>, StoreError> {
        Ok(Some(self.matching(query)?.len() as u64))
    }

    fn average(&self, query: &RecordQuery) -> Result<Option<f64>, StoreError> {
        let records = self.matching(query)?;
        if records.is_empty() {
            return Ok(None);
        }
        let sum: f64 = records.iter().map(|r| r.duration).sum();
        Ok(Some(sum / records.len() as f64))
    }

    fn fetch(&self, query: &RecordQuery) -> Result<Vec<Record>, StoreError> {
        if let Some(order) = query.ordering() {
            self.ensure_index(order.field)?;
        }

        let mut records = self.matching(query)?;

        if let Some(order) = query.ordering() {
            records.sort_by(|a, b| {
                let primary = match order.field {
                    SortField::Timestamp => a.timestamp.cmp(&b.timestamp),
                    SortField::Duration => a.duration.total_cmp(&b.duration),
                };
                let primary = match order.direction {
                    Direction::Ascending => primary,
                    Direction::Descending => primary.reverse(),
                };
                match primary {
                    Ordering::Equal => a.id.cmp(&b.id),
                    other => other,
                }
            });
        }

        if let Some(limit) = query.limit_value() {
            records.truncate(limit);
        }

        Ok(records)
    }
}

fn fields_of(record: &Record) -> PartitionFields {
    PartitionFields::new(record.category.clone(), record.tag.clone())
}

fn index_name(field: SortField) -> &'static str {
    match field {
        SortField::Timestamp => "category_tag_timestamp",
        SortField::Duration => "category_tag_duration",
    }
}
