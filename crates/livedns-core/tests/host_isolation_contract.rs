//! Contract Test: Per-Host Isolation & Failure Semantics
//!
//! Constraints verified:
//! - A failure on one host never prevents attempts on the others
//! - Failed hosts are reported, not retried within the run
//! - A partial reconciliation does not advance the stored IP
//! - Faults before reconciliation (IP lookup, zone listing) leave state alone
//! - A failed state write does not fail the run

mod common;

use common::*;
use livedns_core::traits::ZoneRecord;
use livedns_core::{HostOutcome, ReconciliationEngine, RunReport, Updater};

#[tokio::test]
async fn create_failure_on_one_host_does_not_block_the_next() {
    let provider = MockDnsProvider::new().rejecting_create("a");
    let config = config_with_hosts(&["a", "b"]);
    let engine = ReconciliationEngine::new(&provider, &config);

    let plan = engine.reconcile("2.2.2.2", &[]);
    let results = engine.apply(&plan).await;

    assert_eq!(
        results[0].outcome,
        HostOutcome::CreateFailed {
            reason: "0".to_string()
        }
    );
    assert_eq!(results[1].outcome, HostOutcome::NotPresentThenCreated);
    assert_eq!(
        provider.mutations(),
        vec![
            Call::delete("a"),
            Call::create("a", "2.2.2.2", 14400),
            Call::delete("b"),
            Call::create("b", "2.2.2.2", 14400),
        ]
    );
}

#[tokio::test]
async fn delete_fault_skips_that_hosts_create_only() {
    let provider = MockDnsProvider::with_zone(vec![
        ZoneRecord::a("a", "1.1.1.1", 3600),
        ZoneRecord::a("b", "1.1.1.1", 3600),
    ])
    .failing_delete("a");
    let config = config_with_hosts(&["a", "b"]);
    let engine = ReconciliationEngine::new(&provider, &config);

    let snapshot = engine.snapshot().await.unwrap();
    let plan = engine.reconcile("2.2.2.2", &snapshot);
    let results = engine.apply(&plan).await;

    assert!(matches!(results[0].outcome, HostOutcome::OperationError { .. }));
    assert_eq!(results[1].outcome, HostOutcome::RemovedAndCreated);
    assert_eq!(
        provider.mutations(),
        vec![
            Call::delete("a"),
            Call::delete("b"),
            Call::create("b", "2.2.2.2", 3600),
        ]
    );
}

#[tokio::test]
async fn create_fault_is_an_operation_error() {
    let provider = MockDnsProvider::new().failing_create("a");
    let config = config_with_hosts(&["a", "b"]);
    let engine = ReconciliationEngine::new(&provider, &config);

    let plan = engine.reconcile("2.2.2.2", &[]);
    let results = engine.apply(&plan).await;

    match &results[0].outcome {
        HostOutcome::OperationError { error } => {
            assert_eq!(error, "Provider error (mock): create timed out")
        }
        other => panic!("expected operation error, got {:?}", other),
    }
    assert!(results[1].is_success());
}

#[tokio::test]
async fn failed_hosts_are_not_retried_within_a_run() {
    let provider = MockDnsProvider::new().rejecting_create("a");
    let config = config_with_hosts(&["a"]);
    let engine = ReconciliationEngine::new(&provider, &config);

    let plan = engine.reconcile("2.2.2.2", &[]);
    engine.apply(&plan).await;

    let creates = provider
        .mutations()
        .into_iter()
        .filter(|c| matches!(c, Call::Create { .. }))
        .count();
    assert_eq!(creates, 1);
}

#[tokio::test]
async fn partial_reconciliation_keeps_previous_state() {
    let provider = MockDnsProvider::new().rejecting_create("vpn");
    let store = MockStateStore::with_ip("1.1.1.1");

    let updater = Updater::new(
        Box::new(FixedIpSource::new("2.2.2.2")),
        Box::new(provider.clone()),
        Box::new(store.clone()),
        config_with_hosts(&["www", "vpn"]),
    )
    .unwrap();

    let report = updater.run_once().await.expect("per-host failures do not fail the run");

    let failed: Vec<String> = report.failed_hosts().iter().map(|r| r.host.clone()).collect();
    assert_eq!(failed, vec!["vpn".to_string()]);
    assert!(matches!(report, RunReport::Reconciled { persisted: false, .. }));
    assert_eq!(store.save_count(), 0);
    assert_eq!(store.stored().unwrap().ip, "1.1.1.1");
}

#[tokio::test]
async fn zone_listing_failure_aborts_without_touching_state() {
    let provider = MockDnsProvider::new().failing_listing();
    let store = MockStateStore::with_ip("1.1.1.1");

    let updater = Updater::new(
        Box::new(FixedIpSource::new("2.2.2.2")),
        Box::new(provider.clone()),
        Box::new(store.clone()),
        config_with_hosts(&["www"]),
    )
    .unwrap();

    assert!(updater.run_once().await.is_err());
    assert!(provider.mutations().is_empty());
    assert_eq!(store.save_count(), 0);
}

#[tokio::test]
async fn ip_lookup_failure_aborts_before_any_provider_call() {
    let ip = FixedIpSource::unreachable();
    let provider = MockDnsProvider::new();
    let store = MockStateStore::new();

    let updater = Updater::new(
        Box::new(ip.clone()),
        Box::new(provider.clone()),
        Box::new(store.clone()),
        config_with_hosts(&["www"]),
    )
    .unwrap();

    assert!(updater.run_once().await.is_err());
    assert_eq!(ip.call_count(), 1);
    assert!(provider.calls().is_empty());
    assert_eq!(store.save_count(), 0);
}

#[tokio::test]
async fn failed_state_write_does_not_fail_the_run() {
    let provider = MockDnsProvider::new();
    let store = MockStateStore::new().failing_saves();

    let updater = Updater::new(
        Box::new(FixedIpSource::new("2.2.2.2")),
        Box::new(provider.clone()),
        Box::new(store.clone()),
        config_with_hosts(&["www"]),
    )
    .unwrap();

    let report = updater.run_once().await.expect("run completes");

    assert!(report.failed_hosts().is_empty());
    assert!(matches!(report, RunReport::Reconciled { persisted: false, .. }));
    assert_eq!(store.save_count(), 1);
    assert_eq!(provider.a_records_for("www"), vec!["2.2.2.2".to_string()]);
}

#[tokio::test]
async fn invalid_config_is_rejected_at_construction() {
    let mut config = config_with_hosts(&["www"]);
    config.credentials.domain.clear();

    let result = Updater::new(
        Box::new(FixedIpSource::new("2.2.2.2")),
        Box::new(MockDnsProvider::new()),
        Box::new(MockStateStore::new()),
        config,
    );

    assert!(matches!(result, Err(e) if e.is_config()));
}
