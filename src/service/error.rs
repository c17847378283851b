use std::error::Error;
use std::fmt;

use crate::error::StoreError;
use crate::record::PartitionError;

/// Errors surfaced by [`StatsService`](super::StatsService) queries.
#[derive(Debug)]
pub enum ServiceError {
    /// A user, category or tag was missing or empty.
    InvalidPartition(PartitionError),
    Store(StoreError),
}

impl ServiceError {
    /// HTTP status the error maps to.
    pub fn status_code(&self) -> u16 {
        match self {
            ServiceError::InvalidPartition(_) => 400,
            ServiceError::Store(StoreError::Unavailable(_)) => 503,
            ServiceError::Store(_) => 500,
        }
    }
}

impl fmt::Display for ServiceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServiceError::InvalidPartition(_) => write!(f, "Missing required parameters"),
            ServiceError::Store(e) => write!(f, "stats store error: {}", e),
        }
    }
}

impl Error for ServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            ServiceError::InvalidPartition(e) => Some(e),
            ServiceError::Store(e) => Some(e),
        }
    }
}

impl From<PartitionError> for ServiceError {
    fn from(err: PartitionError) -> Self {
        ServiceError::InvalidPartition(err)
    }
}

impl From<StoreError> for ServiceError {
    fn from(err: StoreError) -> Self {
        ServiceError::Store(err)
    }
}
