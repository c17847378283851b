//! End-to-end recomputation tests over the in-memory stores.

mod support;
mod degraded;
