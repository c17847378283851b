//! Aggregation failures: local fallbacks and hard failures.

use solve_stats::{Fallback, RecomputeError, SolveStatus, StatField, StatsSnapshot};

use crate::support::{partition, service, FaultyRecords, CATEGORY, TAG, USER};

fn seed(records: &FaultyRecords) {
    records.add("a", 10.0, SolveStatus::Ok, 1);
    records.add("b", 11.0, SolveStatus::PlusTwo, 2);
    records.add("c", 30.0, SolveStatus::Dnf, 3);
    records.add("d", 12.0, SolveStatus::Ok, 4);
}

#[test]
fn valid_count_falls_back_to_previous_snapshot() {
    let records = FaultyRecords::new();
    seed(&records);
    let service = service(&records);
    let healthy = service.recompute(&partition()).unwrap().snapshot();
    assert_eq!(healthy.valid_count, 3);

    records.add("e", 13.0, SolveStatus::Ok, 5);
    records.fail_valid_count(true);
    let outcome = service.recompute(&partition()).unwrap();
    let snapshot = outcome.snapshot();

    assert_eq!(snapshot.count, 5);
    assert_eq!(snapshot.valid_count, 3);
    assert_eq!(outcome.degraded().len(), 1);
    assert_eq!(outcome.degraded()[0].field, StatField::ValidCount);
    assert_eq!(outcome.degraded()[0].source, Fallback::PreviousSnapshot);
}

#[test]
fn valid_count_falls_back_to_total_count_without_history() {
    let records = FaultyRecords::new();
    seed(&records);
    records.fail_valid_count(true);

    let outcome = service(&records).recompute(&partition()).unwrap();
    assert_eq!(outcome.snapshot().valid_count, 4);
    assert_eq!(outcome.degraded()[0].source, Fallback::TotalCount);
    assert!(outcome.snapshot().valid_count <= outcome.snapshot().count);
}

#[test]
fn previous_valid_count_is_clamped_to_count() {
    let records = FaultyRecords::new();
    seed(&records);
    let service = service(&records);
    service.recompute(&partition()).unwrap();

    records.inner.remove(USER, "a").unwrap();
    records.inner.remove(USER, "b").unwrap();
    records.inner.remove(USER, "d").unwrap();
    records.fail_valid_count(true);

    let snapshot = service.recompute(&partition()).unwrap().snapshot();
    assert_eq!(snapshot.count, 1);
    assert_eq!(snapshot.valid_count, 1);
}

#[test]
fn average_failure_zeroes_average_and_sum_only() {
    let records = FaultyRecords::new();
    seed(&records);
    records.fail_average(true);

    let outcome = service(&records).recompute(&partition()).unwrap();
    let snapshot = outcome.snapshot();
    assert_eq!(snapshot.average, 0.0);
    assert_eq!(snapshot.sum, 0.0);
    assert_eq!(snapshot.count, 4);
    assert_eq!(snapshot.valid_count, 3);
    assert_eq!(snapshot.best, 10.0);
    assert!(snapshot.deviation > 0.0);

    let fields: Vec<StatField> = outcome.degraded().iter().map(|d| d.field).collect();
    assert_eq!(fields, vec![StatField::Average]);
}

#[test]
fn count_failure_aborts_without_writing() {
    let records = FaultyRecords::new();
    seed(&records);
    let service = service(&records);
    service.on_record_mutated(USER, CATEGORY, TAG);
    let before = service.get_stats(USER, CATEGORY, TAG).unwrap();

    records.add("e", 1.0, SolveStatus::Ok, 5);
    records.fail_total_count(true);
    let err = service.recompute(&partition()).unwrap_err();
    assert!(matches!(err, RecomputeError::Store(_)));

    service.on_record_mutated(USER, CATEGORY, TAG);
    assert!(service.get_stats(USER, CATEGORY, TAG).unwrap().bit_identical(&before));
}

#[test]
fn count_failure_on_fresh_partition_leaves_it_unset() {
    let records = FaultyRecords::new();
    seed(&records);
    records.fail_total_count(true);
    let service = service(&records);
    service.on_record_mutated(USER, CATEGORY, TAG);

    let stats = service.get_stats(USER, CATEGORY, TAG).unwrap();
    assert!(stats.bit_identical(&StatsSnapshot::zero()));
}
