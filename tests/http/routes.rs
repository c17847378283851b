//! Starts the stats router on an ephemeral port and drives it with reqwest.

use std::sync::Arc;

use serde_json::{json, Value};
use solve_stats::service;
use solve_stats::{
    InMemoryRecordStore, InMemoryStatsStore, Record, SolveStatus, StatsConfig, StatsService,
};

type Service = StatsService<InMemoryRecordStore, InMemoryStatsStore>;

fn test_service() -> (InMemoryRecordStore, Arc<Service>) {
    let records = InMemoryRecordStore::new();
    let service = Arc::new(StatsService::new(
        records.clone(),
        InMemoryStatsStore::new(),
        StatsConfig::default(),
    ));
    (records, service)
}

/// Bind to port 0 and return the base URL.
async fn start_server(service: Arc<Service>) -> String {
    let app = service::router(service);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

#[tokio::test]
async fn health_check() {
    let (_, service) = test_service();
    let base = start_server(service).await;

    let resp = reqwest::get(format!("{base}/health")).await.unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body, json!({ "ok": true }));
}

#[tokio::test]
async fn unknown_partition_returns_zeros() {
    let (_, service) = test_service();
    let base = start_server(service).await;

    let resp = reqwest::get(format!("{base}/stats?userId=u1&cubeType=CUBE_5X5&tagId=normal"))
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["count"], 0);
    assert_eq!(body["validCount"], 0);
    assert_eq!(body["ao100"], 0.0);
}

#[tokio::test]
async fn missing_or_empty_parameters_are_rejected() {
    let (_, service) = test_service();
    let base = start_server(service).await;

    for query in [
        "userId=u1&cubeType=CUBE_5X5",
        "userId=&cubeType=CUBE_5X5&tagId=normal",
        "",
    ] {
        let resp = reqwest::get(format!("{base}/stats?{query}")).await.unwrap();
        assert_eq!(resp.status(), 400, "query {:?}", query);
        let body: Value = resp.json().await.unwrap();
        assert_eq!(body, json!({ "error": "Missing required parameters" }));
    }
}

#[tokio::test]
async fn posted_mutation_is_recomputed_and_served() {
    let (records, service) = test_service();
    let base = start_server(service).await;
    let client = reqwest::Client::new();

    records
        .put(Record::new("a", "u1", "CUBE_5X5", "normal", 61.0, SolveStatus::Ok, 1))
        .unwrap();
    let mutation = records
        .put(Record::new("b", "u1", "CUBE_5X5", "normal", 58.5, SolveStatus::PlusTwo, 2))
        .unwrap();

    let resp = client
        .post(format!("{base}/mutations"))
        .json(&mutation)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 202);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body, json!({ "partitions": ["CUBE_5X5_normal"] }));

    let stats: Value = client
        .get(format!("{base}/stats?userId=u1&cubeType=CUBE_5X5&tagId=normal"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(stats["count"], 2);
    assert_eq!(stats["validCount"], 2);
    assert_eq!(stats["best"], 58.5);
}

#[tokio::test]
async fn mutation_without_partition_fields_touches_nothing() {
    let (_, service) = test_service();
    let base = start_server(service).await;

    let resp = reqwest::Client::new()
        .post(format!("{base}/mutations"))
        .json(&json!({ "user": "u1", "after": { "category": "CUBE_5X5" } }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 202);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body, json!({ "partitions": [] }));
}
