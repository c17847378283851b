//! Serves solve statistics over HTTP, backed by in-memory stores.
//!
//! Besides the stats routes, `PUT /records` and `DELETE /records/:user/:id`
//! write records and publish the resulting mutation to a queue drained by a
//! `RecomputeWorker`. Configuration comes from `SOLVE_STATS_*` environment
//! variables, verbosity from `RUST_LOG`.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, put};
use axum::{Json, Router};
use serde_json::json;

use solve_stats::bus::{Event, InMemoryQueue, Publisher};
use solve_stats::service::{self, RecomputeWorker};
use solve_stats::{InMemoryRecordStore, InMemoryStatsStore, MutationEvent, Record, StatsConfig, StatsService};

#[derive(Clone)]
struct RecordWriter {
    records: InMemoryRecordStore,
    queue: InMemoryQueue,
    sequence: Arc<AtomicU64>,
}

impl RecordWriter {
    fn notify(&self, mutation: &MutationEvent) -> Response {
        let id = format!("mut-{}", self.sequence.fetch_add(1, Ordering::Relaxed));
        let published = Event::record_mutated(id, mutation).and_then(|event| self.queue.publish(event));
        match published {
            Ok(()) => StatusCode::ACCEPTED.into_response(),
            Err(e) => {
                log::error!("could not publish mutation for {}: {}", mutation.user, e);
                error_response(StatusCode::BAD_GATEWAY, e)
            }
        }
    }
}

fn error_response(status: StatusCode, err: impl std::fmt::Display) -> Response {
    (status, Json(json!({ "error": err.to_string() }))).into_response()
}

async fn put_record(State(writer): State<RecordWriter>, Json(record): Json<Record>) -> Response {
    match writer.records.put(record) {
        Ok(mutation) => writer.notify(&mutation),
        Err(e) => error_response(StatusCode::INTERNAL_SERVER_ERROR, e),
    }
}

async fn delete_record(
    State(writer): State<RecordWriter>,
    Path((user, id)): Path<(String, String)>,
) -> Response {
    match writer.records.remove(&user, &id) {
        Ok(Some(mutation)) => writer.notify(&mutation),
        Ok(None) => error_response(StatusCode::NOT_FOUND, format!("record {} not found", id)),
        Err(e) => error_response(StatusCode::INTERNAL_SERVER_ERROR, e),
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::error!("could not listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    log::info!("shutdown requested");
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();

    let config = StatsConfig::from_env()?;
    let records = InMemoryRecordStore::new();
    let stats = Arc::new(StatsService::new(
        records.clone(),
        InMemoryStatsStore::new(),
        config,
    ));

    let config = stats.config();
    log::info!(
        "solve-stats starting: window={} scope={:?} prune_empty={}",
        config.window_limit,
        config.average_scope,
        config.prune_empty
    );
    let bind_addr = config.bind_addr.clone();
    let poll_interval = config.poll_interval();

    let queue = InMemoryQueue::new();
    let worker = RecomputeWorker::spawn(stats.clone(), queue.clone(), poll_interval);

    let writer = RecordWriter {
        records,
        queue,
        sequence: Arc::new(AtomicU64::new(1)),
    };
    let app = service::router(stats).merge(
        Router::new()
            .route("/records", put(put_record))
            .route("/records/:user/:id", delete(delete_record))
            .with_state(writer),
    );

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    log::info!("listening on {}", listener.local_addr()?);
    let served = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await;

    let worked = worker.stop();
    log::info!(
        "recompute worker stopped: handled={} skipped={} failed={}",
        worked.handled,
        worked.skipped,
        worked.failed
    );
    served?;
    Ok(())
}
