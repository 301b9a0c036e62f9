// crates/waypoint-approvals/tests/store_unit.rs
// ============================================================================
// Module: In-Memory Store Tests
// Description: Tests for the reference approval store contract.
// Purpose: Ensure loud failures, append-only decisions, and atomic mutation.
// Dependencies: waypoint-approvals, waypoint-core
// ============================================================================

//! ## Overview
//! Validates the in-memory store against the approval store contract.

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only output and panic-based assertions are permitted."
)]

mod common;

use std::sync::Arc;

use common::ManualClock;
use common::new_request;
use common::tenant;
use waypoint_approvals::InMemoryApprovalStore;
use waypoint_core::ApprovalDecision;
use waypoint_core::ApprovalStatus;
use waypoint_core::ApprovalStore;
use waypoint_core::ApproverId;
use waypoint_core::RequestId;
use waypoint_core::RunId;
use waypoint_core::StepId;
use waypoint_core::StoreError;
use waypoint_core::Timestamp;

// ============================================================================
// SECTION: Helpers
// ============================================================================

fn decision(decided_by: &str, approved: bool) -> ApprovalDecision {
    ApprovalDecision {
        approved,
        decided_by: ApproverId::new(decided_by),
        reason: None,
        decided_at: Timestamp::from_unix_millis(1_000),
    }
}

// ============================================================================
// SECTION: Creation and Lookup Tests
// ============================================================================

/// Tests creation assigns an id, creation time, and pending status.
#[test]
fn create_assigns_identity_and_pending_status() {
    let store = InMemoryApprovalStore::new();
    let request = store.create_request(new_request("run-1", "step-1", &["a1"])).expect("create");
    assert!(!request.id.as_str().is_empty());
    assert_eq!(request.status, ApprovalStatus::Pending);
    assert_eq!(request.escalation_count, 0);
    assert!(request.decisions.is_empty());
    assert!(request.resolved_at.is_none());
}

/// Tests creation reads its timestamp from the injected clock.
#[test]
fn create_uses_the_injected_clock() {
    let store = InMemoryApprovalStore::with_clock(Arc::new(ManualClock::at(5_000)));
    let request = store.create_request(new_request("run-1", "step-1", &["a1"])).expect("create");
    assert_eq!(request.created_at, Timestamp::from_unix_millis(5_000));
}

/// Tests lookup by id and by run/step identity.
#[test]
fn lookup_by_id_and_run_step() {
    let store = InMemoryApprovalStore::new();
    let request = store.create_request(new_request("run-1", "step-1", &["a1"])).expect("create");
    let by_id = store.get_request(&request.id).expect("get").expect("present");
    assert_eq!(by_id.id, request.id);
    let by_identity = store
        .get_by_run_and_step(&RunId::new("run-1"), &StepId::new("step-1"))
        .expect("get")
        .expect("present");
    assert_eq!(by_identity.id, request.id);
    let absent =
        store.get_by_run_and_step(&RunId::new("run-1"), &StepId::new("step-2")).expect("get");
    assert!(absent.is_none());
}

// ============================================================================
// SECTION: Loud Failure Tests
// ============================================================================

/// Tests every mutation fails loudly when the target request is unknown.
#[test]
fn mutations_fail_loudly_on_unknown_ids() {
    let store = InMemoryApprovalStore::new();
    let ghost = RequestId::new("apr-ghost");
    let not_found = |result: Result<(), StoreError>| {
        assert!(matches!(result, Err(StoreError::NotFound { .. })));
    };
    not_found(store.update_status(&ghost, ApprovalStatus::Cancelled));
    not_found(store.add_decision(&ghost, decision("a1", true)));
    not_found(store.update_approvers(&ghost, vec![ApproverId::new("a1")]));
    not_found(store.update_expires_at(&ghost, None));
    not_found(store.set_resolved(&ghost, Timestamp::from_unix_millis(1)));
    assert!(matches!(
        store.increment_escalation(&ghost),
        Err(StoreError::NotFound { .. })
    ));
}

// ============================================================================
// SECTION: Decision Log Tests
// ============================================================================

/// Tests decisions append in order and never shrink.
#[test]
fn decisions_are_append_only() {
    let store = InMemoryApprovalStore::new();
    let request =
        store.create_request(new_request("run-1", "step-1", &["a1", "a2"])).expect("create");
    store.add_decision(&request.id, decision("a1", true)).expect("first decision");
    store.add_decision(&request.id, decision("a2", true)).expect("second decision");
    let current = store.get_request(&request.id).expect("get").expect("present");
    assert_eq!(current.decisions.len(), 2);
    assert_eq!(current.decisions[0].decided_by.as_str(), "a1");
    assert_eq!(current.decisions[1].decided_by.as_str(), "a2");
}

/// Tests resolved requests freeze their decision log.
#[test]
fn resolved_requests_reject_further_decisions() {
    let store = InMemoryApprovalStore::new();
    let request = store.create_request(new_request("run-1", "step-1", &["a1"])).expect("create");
    store.update_status(&request.id, ApprovalStatus::Rejected).expect("status");
    store.set_resolved(&request.id, Timestamp::from_unix_millis(2_000)).expect("resolve");
    let err = store.add_decision(&request.id, decision("a1", true)).expect_err("frozen log");
    assert!(matches!(err, StoreError::Conflict(_)));
}

/// Tests double resolution is a conflict.
#[test]
fn double_resolution_is_a_conflict() {
    let store = InMemoryApprovalStore::new();
    let request = store.create_request(new_request("run-1", "step-1", &["a1"])).expect("create");
    store.set_resolved(&request.id, Timestamp::from_unix_millis(2_000)).expect("resolve");
    let err =
        store.set_resolved(&request.id, Timestamp::from_unix_millis(3_000)).expect_err("second");
    assert!(matches!(err, StoreError::Conflict(_)));
    let current = store.get_request(&request.id).expect("get").expect("present");
    assert_eq!(current.resolved_at, Some(Timestamp::from_unix_millis(2_000)));
}

// ============================================================================
// SECTION: Listing Tests
// ============================================================================

/// Tests pending listings are tenant-scoped and exclude terminal requests.
#[test]
fn list_pending_scopes_by_tenant_and_status() {
    let store = InMemoryApprovalStore::new();
    let pending = store.create_request(new_request("run-1", "step-1", &["a1"])).expect("create");
    let mut other_tenant = new_request("run-2", "step-1", &["a1"]);
    other_tenant.tenant_id = tenant(2);
    store.create_request(other_tenant).expect("create");
    let resolved = store.create_request(new_request("run-3", "step-1", &["a1"])).expect("create");
    store.update_status(&resolved.id, ApprovalStatus::Cancelled).expect("status");
    store.set_resolved(&resolved.id, Timestamp::from_unix_millis(1)).expect("resolve");

    let listed = store.list_pending(tenant(1)).expect("list");
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].id, pending.id);
}

/// Tests escalated requests still list as pending work.
#[test]
fn list_pending_includes_escalated_requests() {
    let store = InMemoryApprovalStore::new();
    let request = store.create_request(new_request("run-1", "step-1", &["a1"])).expect("create");
    store.update_status(&request.id, ApprovalStatus::Escalated).expect("status");
    let listed = store.list_pending(tenant(1)).expect("list");
    assert_eq!(listed.len(), 1);
}

/// Tests run listings return every request for the run.
#[test]
fn list_by_run_returns_all_steps() {
    let store = InMemoryApprovalStore::new();
    store.create_request(new_request("run-1", "step-1", &["a1"])).expect("create");
    store.create_request(new_request("run-1", "step-2", &["a1"])).expect("create");
    store.create_request(new_request("run-9", "step-1", &["a1"])).expect("create");
    let listed = store.list_by_run(&RunId::new("run-1")).expect("list");
    assert_eq!(listed.len(), 2);
}

// ============================================================================
// SECTION: Atomicity Tests
// ============================================================================

/// Tests concurrent escalation increments never lose updates.
#[test]
fn concurrent_escalation_increments_are_atomic() {
    let store = Arc::new(InMemoryApprovalStore::new());
    let request = store.create_request(new_request("run-1", "step-1", &["a1"])).expect("create");

    let mut handles = Vec::new();
    for _ in 0 .. 8 {
        let store = Arc::clone(&store);
        let id = request.id.clone();
        handles.push(std::thread::spawn(move || {
            for _ in 0 .. 25 {
                store.increment_escalation(&id).expect("increment");
            }
        }));
    }
    for handle in handles {
        handle.join().expect("join");
    }

    let current = store.get_request(&request.id).expect("get").expect("present");
    assert_eq!(current.escalation_count, 200);
}
