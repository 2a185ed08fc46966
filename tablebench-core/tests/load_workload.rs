use std::time::Duration;

use tablebench_core::{Error, RunConfig, Workload, WorkloadKind, run_workload};

mod support;

use support::{Calls, Reads, StubStorage};

#[test]
fn load_splits_partitions_into_batches() -> anyhow::Result<()> {
    support::init_tracing();
    let cfg = support::config(2, Duration::from_secs(1));
    let (storage, calls) = StubStorage::new(&cfg, Reads::Echo).into_shared();

    let metrics = run_workload(WorkloadKind::Load, cfg, storage)?;

    assert_eq!(Calls::get(&calls.create_table), 1);
    assert_eq!(calls.batch_sizes(), vec![20, 20, 30, 30]);
    assert_eq!(metrics.get("LOAD_TOTAL_COUNT"), Some(4.0));
    assert_eq!(metrics.get("LOAD_OK_TOTAL_COUNT"), Some(4.0));
    assert_eq!(metrics.get("LOAD_ERROR_TOTAL_COUNT"), Some(0.0));
    assert_eq!(metrics.get("RECORDS_TOTAL_COUNT"), Some(100.0));
    Ok(())
}

#[test]
fn load_remainder_lands_in_last_partition() -> anyhow::Result<()> {
    let cfg = RunConfig {
        record_count: 10,
        batch_size: 4,
        ..support::config(3, Duration::from_secs(1))
    };
    let (storage, calls) = StubStorage::new(&cfg, Reads::Echo).into_shared();

    let metrics = run_workload(WorkloadKind::Load, cfg, storage)?;

    // Partitions of 3, 3 and 4 records.
    assert_eq!(calls.batch_sizes(), vec![3, 3, 4]);
    assert_eq!(metrics.get("RECORDS_TOTAL_COUNT"), Some(10.0));
    Ok(())
}

#[test]
fn rejected_batches_are_reported_not_fatal() -> anyhow::Result<()> {
    let cfg = support::config(2, Duration::from_secs(1));
    let (storage, _calls) = StubStorage::new(&cfg, Reads::Echo)
        .rejecting_batches()
        .into_shared();

    let metrics = run_workload(WorkloadKind::Load, cfg, storage)?;

    assert_eq!(metrics.get("LOAD_TOTAL_COUNT"), Some(4.0));
    assert_eq!(metrics.get("LOAD_OK_TOTAL_COUNT"), Some(0.0));
    assert_eq!(metrics.get("LOAD_ERROR_TOTAL_COUNT"), Some(4.0));
    assert_eq!(metrics.get("RECORDS_TOTAL_COUNT"), Some(0.0));
    assert!(metrics.get("LOAD_OK_AVG_MS").is_some_and(f64::is_nan));
    Ok(())
}

#[test]
fn create_table_failure_aborts_before_writing() {
    let cfg = support::config(2, Duration::from_secs(1));
    let (storage, calls) = StubStorage::new(&cfg, Reads::Echo)
        .failing_create_table()
        .into_shared();

    let res = run_workload(WorkloadKind::Load, cfg, storage);

    assert!(matches!(res, Err(Error::CreateTable(_))), "got {res:?}");
    assert!(calls.batch_sizes().is_empty());
}

#[test]
fn invalid_config_is_rejected_before_running() {
    let cfg = RunConfig {
        batch_size: 0,
        ..support::config(2, Duration::from_secs(1))
    };
    let (storage, calls) = StubStorage::new(&cfg, Reads::Echo).into_shared();

    let res = Workload::new(WorkloadKind::Load, cfg, storage);

    assert!(matches!(res, Err(Error::InvalidBatchSize)));
    assert_eq!(Calls::get(&calls.create_table), 0);
}
