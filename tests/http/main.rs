//! HTTP transport integration tests.

#[cfg(feature = "http")]
mod routes;
