//! HTTP transport for the stats service.
//!
//! Requires the `http` feature. Uses axum for routing.
//!
//! ## Routes
//!
//! - `GET /stats?userId=&cubeType=&tagId=` returns the stored snapshot (zeros if none).
//! - `POST /mutations` takes a `MutationEvent` JSON body and recomputes the
//!   partitions it names, returning `202 { "partitions": [...] }`.
//! - `GET /health` returns `{ "ok": true }`.

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::json;

use super::StatsService;
use crate::record::{MutationEvent, Partition};
use crate::stats_store::StatsStore;
use crate::store::RecordStore;

/// Query string of `GET /stats`. Absent and empty values are both rejected.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsQuery {
    pub user_id: Option<String>,
    pub cube_type: Option<String>,
    pub tag_id: Option<String>,
}

/// Build an axum `Router` over the given service.
pub fn router<R, S>(service: Arc<StatsService<R, S>>) -> Router
where
    R: RecordStore + 'static,
    S: StatsStore + 'static,
{
    Router::new()
        .route("/health", get(health_handler))
        .route("/stats", get(stats_handler::<R, S>))
        .route("/mutations", post(mutation_handler::<R, S>))
        .with_state(service)
}

async fn health_handler() -> impl IntoResponse {
    Json(json!({ "ok": true }))
}

async fn stats_handler<R, S>(
    State(service): State<Arc<StatsService<R, S>>>,
    Query(query): Query<StatsQuery>,
) -> Response
where
    R: RecordStore + 'static,
    S: StatsStore + 'static,
{
    let user = query.user_id.unwrap_or_default();
    let category = query.cube_type.unwrap_or_default();
    let tag = query.tag_id.unwrap_or_default();

    match service.get_stats(&user, &category, &tag) {
        Ok(snapshot) => (StatusCode::OK, Json(snapshot)).into_response(),
        Err(e) => {
            let status =
                StatusCode::from_u16(e.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
            if status.is_server_error() {
                log::error!("stats query failed: {}", e);
            }
            (status, Json(json!({ "error": e.to_string() }))).into_response()
        }
    }
}

async fn mutation_handler<R, S>(
    State(service): State<Arc<StatsService<R, S>>>,
    Json(mutation): Json<MutationEvent>,
) -> Response
where
    R: RecordStore + 'static,
    S: StatsStore + 'static,
{
    let touched = tokio::task::spawn_blocking(move || service.handle_mutation(&mutation)).await;

    match touched {
        Ok(partitions) => {
            let keys: Vec<String> = partitions.iter().map(Partition::key).collect();
            (StatusCode::ACCEPTED, Json(json!({ "partitions": keys }))).into_response()
        }
        Err(e) => {
            log::error!("recompute task failed: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "recompute task failed" })),
            )
                .into_response()
        }
    }
}
