//! RecomputeWorker integration tests: bus events drive recomputation.

#![cfg(feature = "bus")]

use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use solve_stats::bus::{Event, InMemoryQueue, Publisher};
use solve_stats::service::{RecomputeWorker, WorkerStats};
use solve_stats::{
    InMemoryRecordStore, InMemoryStatsStore, MutationEvent, PartitionFields, Record, SolveStatus,
    StatsConfig, StatsService,
};

type Service = StatsService<InMemoryRecordStore, InMemoryStatsStore>;

fn setup() -> (InMemoryRecordStore, Arc<Service>, InMemoryQueue) {
    let records = InMemoryRecordStore::new();
    let service = Arc::new(StatsService::new(
        records.clone(),
        InMemoryStatsStore::new(),
        StatsConfig::default(),
    ));
    (records, service, InMemoryQueue::new())
}

fn wait_until(mut done: impl FnMut() -> bool) {
    let deadline = Instant::now() + Duration::from_secs(5);
    while !done() {
        assert!(Instant::now() < deadline, "timed out waiting for worker");
        thread::sleep(Duration::from_millis(5));
    }
}

#[test]
fn worker_recomputes_published_mutations() {
    let (records, service, queue) = setup();
    let worker = RecomputeWorker::spawn(service.clone(), queue.clone(), Duration::from_millis(10));

    for (i, duration) in [9.1, 8.4, 10.2].iter().enumerate() {
        let mutation = records
            .put(Record::new(
                format!("s{}", i),
                "bob",
                "SKEWB",
                "normal",
                *duration,
                SolveStatus::Ok,
                i as u64,
            ))
            .unwrap();
        queue
            .publish(Event::record_mutated(format!("evt-{}", i), &mutation).unwrap())
            .unwrap();
    }

    wait_until(|| queue.acknowledged().len() == 3);
    let stats = worker.stop();
    assert_eq!(stats.handled, 3);
    assert_eq!(stats.failed, 0);
    assert!(stats.polls >= 3);

    let snapshot = service.get_stats("bob", "SKEWB", "normal").unwrap();
    assert_eq!(snapshot.count, 3);
    assert_eq!(snapshot.best, 8.4);
}

#[test]
fn duplicate_deliveries_are_harmless() {
    let (records, service, queue) = setup();
    let mutation = records
        .put(Record::new("s1", "bob", "SKEWB", "oh", 14.0, SolveStatus::Ok, 1))
        .unwrap();
    let event = Event::record_mutated("evt-1", &mutation).unwrap();
    queue.publish_batch(vec![event.clone(), event]).unwrap();

    let worker = RecomputeWorker::spawn(service.clone(), queue.clone(), Duration::from_millis(10));
    wait_until(|| queue.acknowledged().len() == 2);
    assert_eq!(worker.stop().handled, 2);

    let snapshot = service.get_stats("bob", "SKEWB", "oh").unwrap();
    assert_eq!(snapshot.count, 1);
    assert_eq!(snapshot.best, 14.0);
}

#[test]
fn foreign_and_malformed_events_are_settled() {
    let (_records, service, queue) = setup();
    queue
        .publish_batch(vec![
            Event::new("evt-1", "record.archived", vec![]),
            Event::new("evt-2", solve_stats::bus::RECORD_MUTATED, vec![]),
            Event::record_mutated(
                "evt-3",
                &MutationEvent::deleted(
                    "bob",
                    PartitionFields {
                        category: Some("SKEWB".into()),
                        tag: None,
                    },
                ),
            )
            .unwrap(),
        ])
        .unwrap();

    let worker = RecomputeWorker::spawn(service.clone(), queue.clone(), Duration::from_millis(10));
    // evt-2 is nacked, redelivered once, then dropped.
    wait_until(|| queue.rejected().len() == 2 && queue.acknowledged().len() == 2);
    let stats = worker.stop();

    assert_eq!(
        stats,
        WorkerStats {
            skipped: 1,
            failed: 2,
            handled: 1,
            polls: stats.polls,
        }
    );
    assert!(service.list_stats("bob").unwrap().is_empty());
}

#[test]
fn stopped_worker_leaves_later_events_alone() {
    let (records, service, queue) = setup();
    let worker = RecomputeWorker::spawn(service.clone(), queue.clone(), Duration::from_millis(5));
    worker.signal_stop();
    let stats = worker.stop();
    assert_eq!(stats.handled, 0);

    let mutation = records
        .put(Record::new("s1", "bob", "SKEWB", "normal", 9.0, SolveStatus::Ok, 1))
        .unwrap();
    queue
        .publish(Event::record_mutated("evt-1", &mutation).unwrap())
        .unwrap();
    thread::sleep(Duration::from_millis(50));

    assert!(queue.acknowledged().is_empty());
    assert_eq!(queue.pending(), 1);
    assert_eq!(service.get_stats("bob", "SKEWB", "normal").unwrap().count, 0);
}

#[test]
fn dropping_the_worker_stops_it() {
    let (records, service, queue) = setup();
    drop(RecomputeWorker::spawn(service, queue.clone(), Duration::from_millis(5)));
    // Let the thread observe the stop signal before anything is published.
    thread::sleep(Duration::from_millis(50));

    let mutation = records
        .put(Record::new("s1", "bob", "SKEWB", "normal", 9.0, SolveStatus::Ok, 1))
        .unwrap();
    queue
        .publish(Event::record_mutated("evt-1", &mutation).unwrap())
        .unwrap();
    thread::sleep(Duration::from_millis(50));

    assert!(queue.acknowledged().is_empty());
    assert_eq!(queue.pending(), 1);
}
