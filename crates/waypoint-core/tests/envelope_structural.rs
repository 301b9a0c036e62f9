// crates/waypoint-core/tests/envelope_structural.rs
// ============================================================================
// Module: Structural Validation Tests
// Description: Tests for fail-closed shape validation of step envelopes.
// Purpose: Ensure violations are aggregated as data and assertions fail fast.
// Dependencies: waypoint-core, serde_json
// ============================================================================

//! ## Overview
//! Validates the structural walkers over untyped step envelopes.

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

use serde_json::Value;
use serde_json::json;
use waypoint_core::assert_valid_step_input;
use waypoint_core::assert_valid_step_output;
use waypoint_core::validate_step_input;
use waypoint_core::validate_step_input_partial;
use waypoint_core::validate_step_output;
use waypoint_core::validate_step_output_partial;

// ============================================================================
// SECTION: Helpers
// ============================================================================

fn sample_input() -> Value {
    json!({
        "run_id": "run-1",
        "step_id": "step-1",
        "tenant_id": 1,
        "step_type": "code",
        "risk_mode": "balanced",
        "capabilities_mode": "suggest",
        "queued_at": 1_700_000_000_000_i64,
        "attempt_number": 1,
        "max_attempts": 3
    })
}

fn sample_output() -> Value {
    json!({
        "run_id": "run-1",
        "step_id": "step-1",
        "result_code": "ok",
        "summary": "completed",
        "timing": {
            "started_at": 1_700_000_000_000_i64,
            "completed_at": 1_700_000_000_500_i64,
            "duration_ms": 500
        }
    })
}

fn paths(issues: &[waypoint_core::ValidationIssue]) -> Vec<&str> {
    issues.iter().map(|issue| issue.path.as_str()).collect()
}

// ============================================================================
// SECTION: Step Input Tests
// ============================================================================

/// Tests a well-formed input passes with no issues.
#[test]
fn valid_input_has_no_issues() {
    assert!(validate_step_input(&sample_input()).is_empty());
}

/// Tests missing required fields are all reported, not just the first.
#[test]
fn missing_input_fields_are_aggregated() {
    let issues = validate_step_input(&json!({ "run_id": "run-1" }));
    let paths = paths(&issues);
    assert!(paths.contains(&"step_id"));
    assert!(paths.contains(&"tenant_id"));
    assert!(paths.contains(&"step_type"));
    assert!(paths.contains(&"attempt_number"));
    assert!(paths.contains(&"max_attempts"));
    for issue in &issues {
        assert_eq!(issue.received, "missing");
    }
}

/// Tests a zero tenant id is rejected.
#[test]
fn zero_tenant_id_is_rejected() {
    let mut input = sample_input();
    input["tenant_id"] = json!(0);
    let issues = validate_step_input(&input);
    assert!(paths(&issues).contains(&"tenant_id"));
}

/// Tests unknown enum labels are rejected with the allowed set.
#[test]
fn unknown_step_type_is_rejected() {
    let mut input = sample_input();
    input["step_type"] = json!("deploy");
    let issues = validate_step_input(&input);
    let issue = issues.iter().find(|issue| issue.path == "step_type").expect("step_type issue");
    assert!(issue.expected.contains("triage"));
    assert_eq!(issue.received, "deploy");
}

/// Tests attempt bookkeeping range checks.
#[test]
fn attempt_number_above_max_attempts_is_rejected() {
    let mut input = sample_input();
    input["attempt_number"] = json!(5);
    input["max_attempts"] = json!(3);
    let issues = validate_step_input(&input);
    let issue =
        issues.iter().find(|issue| issue.path == "attempt_number").expect("attempt issue");
    assert_eq!(issue.expected, "integer <= 3");
    assert_eq!(issue.received, "5");
}

/// Tests model temperature range validation.
#[test]
fn model_temperature_out_of_range_is_rejected() {
    let mut input = sample_input();
    input["model"] = json!({
        "model": "sonnet",
        "provider": "anthropic",
        "temperature": 3.5
    });
    let issues = validate_step_input(&input);
    let issue =
        issues.iter().find(|issue| issue.path == "model.temperature").expect("temperature issue");
    assert_eq!(issue.expected, "number in [0, 2]");
}

/// Tests a nested previous output is validated with prefixed paths.
#[test]
fn nested_previous_output_is_validated() {
    let mut input = sample_input();
    input["previous_output"] = json!({ "run_id": "run-1" });
    let issues = validate_step_input(&input);
    assert!(paths(&issues).contains(&"previous_output.step_id"));
    assert!(paths(&issues).contains(&"previous_output.timing"));
}

/// Tests partial input validation accepts missing top-level fields.
#[test]
fn partial_input_accepts_missing_fields() {
    let issues = validate_step_input_partial(&json!({ "run_id": "run-1" }));
    assert!(issues.is_empty());
}

/// Tests partial input validation still rejects present malformed fields.
#[test]
fn partial_input_rejects_present_malformed_fields() {
    let issues = validate_step_input_partial(&json!({ "tenant_id": "not-a-number" }));
    assert!(paths(&issues).contains(&"tenant_id"));
}

// ============================================================================
// SECTION: Step Output Tests
// ============================================================================

/// Tests a well-formed output passes with no issues.
#[test]
fn valid_output_has_no_issues() {
    assert!(validate_step_output(&sample_output()).is_empty());
}

/// Tests negative token counts are rejected.
#[test]
fn negative_token_total_is_rejected() {
    let mut output = sample_output();
    output["cost"] = json!({
        "model": "sonnet",
        "provider": "anthropic",
        "tokens": { "input": 10, "output": 5, "total": -15 }
    });
    let issues = validate_step_output(&output);
    let issue =
        issues.iter().find(|issue| issue.path == "cost.tokens.total").expect("token issue");
    assert_eq!(issue.expected, "non-negative integer");
}

/// Tests malformed timing fields are reported individually.
#[test]
fn malformed_timing_fields_are_reported() {
    let mut output = sample_output();
    output["timing"] = json!({ "started_at": "noon", "duration_ms": 500 });
    let issues = validate_step_output(&output);
    let paths = paths(&issues);
    assert!(paths.contains(&"timing.started_at"));
    assert!(paths.contains(&"timing.completed_at"));
}

/// Tests artifact references require the discriminator tag.
#[test]
fn artifact_without_kind_is_rejected() {
    let mut output = sample_output();
    output["artifacts"] = json!({ "diff": { "content": "x", "content_type": "text/plain" } });
    let issues = validate_step_output(&output);
    assert!(paths(&issues).contains(&"artifacts.diff.kind"));
}

/// Tests pointer artifacts validate the content hash shape.
#[test]
fn pointer_artifact_hash_shape_is_validated() {
    let mut output = sample_output();
    output["artifacts"] = json!({
        "patch": {
            "kind": "pointer",
            "uri": "blob://patch",
            "content_type": "text/x-diff",
            "size_bytes": 128,
            "content_hash": "abc123"
        }
    });
    let issues = validate_step_output(&output);
    let issue = issues
        .iter()
        .find(|issue| issue.path == "artifacts.patch.content_hash")
        .expect("hash issue");
    assert!(issue.expected.contains("64-character"));
}

/// Tests inline artifacts enforce the inline size cap.
#[test]
fn oversized_inline_artifact_is_rejected() {
    let mut output = sample_output();
    output["artifacts"] = json!({
        "dump": {
            "kind": "inline",
            "content": "x".repeat(64 * 1024 + 1),
            "content_type": "text/plain"
        }
    });
    let issues = validate_step_output(&output);
    assert!(paths(&issues).contains(&"artifacts.dump.content"));
}

/// Tests proposed changes validate per-entry fields with indexed paths.
#[test]
fn proposed_change_entries_are_validated() {
    let mut output = sample_output();
    output["proposed_changes"] = json!([
        { "path": "src/lib.rs", "kind": "modify", "added_lines": 3, "deleted_lines": 1 },
        { "kind": "repaint" }
    ]);
    let issues = validate_step_output(&output);
    let paths = paths(&issues);
    assert!(paths.contains(&"proposed_changes[1].path"));
    assert!(paths.contains(&"proposed_changes[1].kind"));
    assert!(paths.contains(&"proposed_changes[1].added_lines"));
}

/// Tests partial output validation accepts missing top-level fields.
#[test]
fn partial_output_accepts_missing_fields() {
    let issues = validate_step_output_partial(&json!({ "result_code": "ok" }));
    assert!(issues.is_empty());
}

// ============================================================================
// SECTION: Asserting Form Tests
// ============================================================================

/// Tests the asserting input form returns the typed envelope.
#[test]
fn assert_valid_input_returns_typed_envelope() {
    let input = assert_valid_step_input(&sample_input()).expect("valid input");
    assert_eq!(input.run_id.as_str(), "run-1");
    assert_eq!(input.attempt_number, 1);
}

/// Tests the asserting output form returns the typed envelope.
#[test]
fn assert_valid_output_returns_typed_envelope() {
    let output = assert_valid_step_output(&sample_output()).expect("valid output");
    assert_eq!(output.step_id.as_str(), "step-1");
    assert_eq!(output.timing.duration_ms, 500);
}

/// Tests the assertion summary caps at three paths plus a remainder count.
#[test]
fn assertion_summary_caps_offending_paths() {
    let err = assert_valid_step_input(&json!({})).expect_err("invalid input");
    let summary = err.to_string();
    assert!(summary.contains("step input validation failed"));
    assert!(summary.contains("run_id, step_id, tenant_id"));
    assert!(err.issues().len() > 3);
    let remainder = err.issues().len() - 3;
    assert!(summary.contains(&format!("(+{remainder} more)")));
}
