use std::error::Error;
use std::fmt;

/// Error reported by a record or stats store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The index backing an ordered query is still building.
    IndexUnavailable { index: String },
    /// The store could not serve the request (network, timeout, quota).
    Unavailable(String),
    LockPoisoned(&'static str),
    Serde(String),
}

impl StoreError {
    pub fn is_index_unavailable(&self) -> bool {
        matches!(self, StoreError::IndexUnavailable { .. })
    }
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::IndexUnavailable { index } => {
                write!(f, "index {} is not ready yet", index)
            }
            StoreError::Unavailable(msg) => write!(f, "store unavailable: {}", msg),
            StoreError::LockPoisoned(operation) => {
                write!(f, "store lock poisoned during {}", operation)
            }
            StoreError::Serde(msg) => write!(f, "store serialization error: {}", msg),
        }
    }
}

impl Error for StoreError {}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        StoreError::Serde(err.to_string())
    }
}

/// Reason a recomputation stopped without writing a snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecomputeError {
    /// The window query hit an index that is still building. The previous
    /// snapshot stays authoritative until a later mutation retriggers.
    IndexNotReady(StoreError),
    /// A required input (count or window) could not be read.
    Store(StoreError),
    /// The snapshot could not be persisted.
    Persist(StoreError),
}

impl RecomputeError {
    /// Classify a failure of the window query.
    pub(crate) fn from_window(err: StoreError) -> Self {
        if err.is_index_unavailable() {
            RecomputeError::IndexNotReady(err)
        } else {
            RecomputeError::Store(err)
        }
    }
}

impl fmt::Display for RecomputeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecomputeError::IndexNotReady(e) => write!(f, "recompute skipped: {}", e),
            RecomputeError::Store(e) => write!(f, "recompute aborted: {}", e),
            RecomputeError::Persist(e) => write!(f, "snapshot not persisted: {}", e),
        }
    }
}

impl Error for RecomputeError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            RecomputeError::IndexNotReady(e)
            | RecomputeError::Store(e)
            | RecomputeError::Persist(e) => Some(e),
        }
    }
}
