// crates/waypoint-approvals/tests/common/mod.rs
// ============================================================================
// Module: Approvals Test Helpers
// Description: Shared fixtures for store, escalation, and gate tests.
// Purpose: Build requests, clocks, and notifiers without repetition.
// Dependencies: waypoint-approvals, waypoint-core
// ============================================================================

//! ## Overview
//! Shared fixtures for the approvals test suites.

#![allow(
    dead_code,
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only helpers; not every suite uses every fixture."
)]

use std::sync::atomic::AtomicI64;
use std::sync::atomic::Ordering;

use waypoint_core::ApprovalPolicy;
use waypoint_core::ApproverId;
use waypoint_core::Clock;
use waypoint_core::NewApprovalRequest;
use waypoint_core::RequestContext;
use waypoint_core::RiskLevel;
use waypoint_core::RunId;
use waypoint_core::StepId;
use waypoint_core::TenantId;
use waypoint_core::Timestamp;

/// Deterministic clock backed by an atomic millisecond counter.
pub struct ManualClock {
    /// Current time in unix milliseconds.
    now_millis: AtomicI64,
}

impl ManualClock {
    /// Creates a manual clock at the provided time.
    pub fn at(millis: i64) -> Self {
        Self {
            now_millis: AtomicI64::new(millis),
        }
    }

    /// Advances the clock by the provided milliseconds.
    pub fn advance(&self, millis: i64) {
        self.now_millis.fetch_add(millis, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Timestamp {
        Timestamp::from_unix_millis(self.now_millis.load(Ordering::SeqCst))
    }
}

/// Returns a rendering context for test requests.
pub fn sample_context() -> RequestContext {
    RequestContext {
        description: "Apply generated fix to the flaky retry loop".to_string(),
        risk_level: RiskLevel::Medium,
        proposed_changes: Vec::new(),
    }
}

/// Returns the test tenant identifier.
pub fn tenant(raw: u64) -> TenantId {
    TenantId::from_raw(raw).expect("nonzero tenant id")
}

/// Builds creation parameters for a pending request.
pub fn new_request(run: &str, step: &str, approvers: &[&str]) -> NewApprovalRequest {
    NewApprovalRequest {
        run_id: RunId::new(run),
        step_id: StepId::new(step),
        tenant_id: tenant(1),
        requested_by: "agent-code".to_string(),
        approvers: approvers.iter().map(|name| ApproverId::new(*name)).collect(),
        policy: ApprovalPolicy::Any,
        escalation: None,
        channels: Vec::new(),
        correlation_id: None,
        expires_at: None,
        context: sample_context(),
    }
}
