// crates/waypoint-core/tests/policy_eval.rs
// ============================================================================
// Module: Policy Evaluation Tests
// Description: Tests for result-code tables and approval policy evaluation.
// Purpose: Pin the fixed policy tables and decision evaluation semantics.
// Dependencies: waypoint-core, proptest
// ============================================================================

//! ## Overview
//! Validates the result-code policy tables and the pure approval policy
//! evaluator, including property coverage for rejection short-circuits.

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

use proptest::prelude::*;
use waypoint_core::ApprovalDecision;
use waypoint_core::ApprovalPolicy;
use waypoint_core::ApproverId;
use waypoint_core::PolicyVerdict;
use waypoint_core::ResultCode;
use waypoint_core::Timestamp;
use waypoint_core::evaluate_policy;

// ============================================================================
// SECTION: Helpers
// ============================================================================

fn approvers(names: &[&str]) -> Vec<ApproverId> {
    names.iter().map(|name| ApproverId::new(*name)).collect()
}

fn decision(decided_by: &str, approved: bool) -> ApprovalDecision {
    ApprovalDecision {
        approved,
        decided_by: ApproverId::new(decided_by),
        reason: None,
        decided_at: Timestamp::from_unix_millis(1_000),
    }
}

// ============================================================================
// SECTION: Result Code Tables
// ============================================================================

/// Tests the retry-eligibility table admits only retryable.
#[test]
fn only_retryable_may_retry() {
    assert!(ResultCode::Retryable.may_retry());
    assert!(!ResultCode::Ok.may_retry());
    assert!(!ResultCode::Fatal.may_retry());
    assert!(!ResultCode::Blocked.may_retry());
    assert!(!ResultCode::Skipped.may_retry());
}

/// Tests the continuation table advances only ok and skipped.
#[test]
fn only_ok_and_skipped_advance() {
    assert!(ResultCode::Ok.advances_pipeline());
    assert!(ResultCode::Skipped.advances_pipeline());
    assert!(!ResultCode::Retryable.advances_pipeline());
    assert!(!ResultCode::Fatal.advances_pipeline());
    assert!(!ResultCode::Blocked.advances_pipeline());
}

/// Tests blocked is neither retried nor advanced; it awaits external input.
#[test]
fn blocked_is_distinct_from_retryable() {
    assert!(!ResultCode::Blocked.may_retry());
    assert!(!ResultCode::Blocked.advances_pipeline());
}

// ============================================================================
// SECTION: Policy Evaluation Tests
// ============================================================================

/// Tests the any policy is satisfied by the first approval.
#[test]
fn any_policy_satisfied_by_first_approval() {
    let verdict = evaluate_policy(
        ApprovalPolicy::Any,
        &approvers(&["a1", "a2"]),
        &[decision("a1", true)],
    );
    assert_eq!(verdict, PolicyVerdict::Satisfied);
}

/// Tests the all policy stays pending until every approver has approved.
#[test]
fn all_policy_requires_every_approver() {
    let eligible = approvers(&["a1", "a2"]);
    let first = [decision("a1", true)];
    assert_eq!(evaluate_policy(ApprovalPolicy::All, &eligible, &first), PolicyVerdict::Pending);
    let both = [decision("a1", true), decision("a2", true)];
    assert_eq!(evaluate_policy(ApprovalPolicy::All, &eligible, &both), PolicyVerdict::Satisfied);
}

/// Tests duplicate approvals from one approver count once under all.
#[test]
fn duplicate_approvals_count_once() {
    let eligible = approvers(&["a1", "a2"]);
    let votes = [decision("a1", true), decision("a1", true)];
    assert_eq!(evaluate_policy(ApprovalPolicy::All, &eligible, &votes), PolicyVerdict::Pending);
}

/// Tests ineligible voters never satisfy a policy.
#[test]
fn ineligible_voters_do_not_count() {
    let eligible = approvers(&["a1"]);
    let votes = [decision("intruder", true)];
    assert_eq!(evaluate_policy(ApprovalPolicy::Any, &eligible, &votes), PolicyVerdict::Pending);
}

/// Tests the majority policy requires strictly more than half.
#[test]
fn majority_policy_is_strict() {
    let eligible = approvers(&["a1", "a2", "a3", "a4"]);
    let half = [decision("a1", true), decision("a2", true)];
    assert_eq!(evaluate_policy(ApprovalPolicy::Majority, &eligible, &half), PolicyVerdict::Pending);
    let three = [decision("a1", true), decision("a2", true), decision("a3", true)];
    assert_eq!(
        evaluate_policy(ApprovalPolicy::Majority, &eligible, &three),
        PolicyVerdict::Satisfied
    );
}

/// Tests a single rejection short-circuits any approvals.
#[test]
fn rejection_short_circuits_approvals() {
    let eligible = approvers(&["a1", "a2"]);
    let votes = [decision("a1", true), decision("a2", false)];
    for policy in [ApprovalPolicy::Any, ApprovalPolicy::All, ApprovalPolicy::Majority] {
        assert_eq!(evaluate_policy(policy, &eligible, &votes), PolicyVerdict::Rejected);
    }
}

/// Tests an empty eligible list never satisfies a policy.
#[test]
fn empty_approver_list_never_satisfies() {
    for policy in [ApprovalPolicy::Any, ApprovalPolicy::All, ApprovalPolicy::Majority] {
        assert_eq!(evaluate_policy(policy, &[], &[]), PolicyVerdict::Pending);
    }
}

// ============================================================================
// SECTION: Property Tests
// ============================================================================

proptest! {
    /// Any decision list containing a rejection evaluates to rejected.
    #[test]
    fn rejection_always_wins(
        approved_votes in prop::collection::vec("[a-d]", 0 .. 6),
        reject_from in "[a-d]",
    ) {
        let eligible = approvers(&["a", "b", "c", "d"]);
        let mut votes: Vec<ApprovalDecision> =
            approved_votes.iter().map(|voter| decision(voter, true)).collect();
        votes.push(decision(&reject_from, false));
        for policy in [ApprovalPolicy::Any, ApprovalPolicy::All, ApprovalPolicy::Majority] {
            prop_assert_eq!(evaluate_policy(policy, &eligible, &votes), PolicyVerdict::Rejected);
        }
    }

    /// The all policy is satisfied exactly when every eligible approver
    /// appears among the approving voters.
    #[test]
    fn all_policy_matches_distinct_voter_count(
        voters in prop::collection::vec("[a-c]", 0 .. 8),
    ) {
        let eligible = approvers(&["a", "b", "c"]);
        let votes: Vec<ApprovalDecision> =
            voters.iter().map(|voter| decision(voter, true)).collect();
        let distinct: std::collections::BTreeSet<&String> = voters.iter().collect();
        let verdict = evaluate_policy(ApprovalPolicy::All, &eligible, &votes);
        if distinct.len() == eligible.len() {
            prop_assert_eq!(verdict, PolicyVerdict::Satisfied);
        } else {
            prop_assert_eq!(verdict, PolicyVerdict::Pending);
        }
    }
}
