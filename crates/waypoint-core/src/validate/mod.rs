// crates/waypoint-core/src/validate/mod.rs
// ============================================================================
// Module: Waypoint Structural Validation
// Description: Fail-closed shape validation for untyped step envelopes.
// Purpose: Aggregate every violation as data before envelopes reach typed code.
// Dependencies: crate::core, serde_json, thiserror
// ============================================================================

//! ## Overview
//! Structural validation parses untyped JSON against the step envelope
//! shapes. Violations are returned as [`ValidationIssue`] records — all of
//! them, never just the first — so callers can batch-report. The asserting
//! forms exist purely for fail-fast call sites and raise
//! [`StepValidationError`] with a log-friendly summary.
//!
//! Partial validation checks only the top-level fields present, so an
//! incrementally constructed envelope can be checked before it is complete.
//! Present substructures are always validated in full.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde_json::Map;
use serde_json::Value;
use thiserror::Error;

use crate::core::artifact::CONTENT_HASH_LEN;
use crate::core::artifact::MAX_INLINE_BYTES;
use crate::core::artifact::MAX_PREVIEW_BYTES;
use crate::core::outcome::StepOutput;
use crate::core::step::StepInput;

pub mod semantic;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Allowed step type labels.
const STEP_TYPES: &[&str] = &["triage", "plan", "code", "resolve", "review", "apply"];
/// Allowed risk mode labels.
const RISK_MODES: &[&str] = &["conservative", "balanced", "aggressive"];
/// Allowed capabilities mode labels.
const CAPABILITIES_MODES: &[&str] = &["read_only", "suggest", "execute"];
/// Allowed result code labels.
const RESULT_CODES: &[&str] = &["ok", "retryable", "fatal", "blocked", "skipped"];
/// Allowed proposed-change kind labels.
const CHANGE_KINDS: &[&str] = &["create", "modify", "delete"];
/// Allowed artifact reference kind labels.
const ARTIFACT_KINDS: &[&str] = &["pointer", "inline"];
/// Maximum offending paths included in an assertion error summary.
const SUMMARY_PATH_LIMIT: usize = 3;

// ============================================================================
// SECTION: Issue Records
// ============================================================================

/// One structural violation record.
///
/// # Invariants
/// - `path` is a dot-joined field path from the envelope root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationIssue {
    /// Dot-joined path of the offending field.
    pub path: String,
    /// Human-readable violation message.
    pub message: String,
    /// Expected shape description.
    pub expected: String,
    /// Received shape description.
    pub received: String,
}

/// Typed validation error raised by the asserting forms.
///
/// # Invariants
/// - The summary names at most the first three offending paths plus a
///   count of the remainder.
#[derive(Debug, Error)]
#[error("{summary}")]
pub struct StepValidationError {
    /// Log-friendly failure summary.
    summary: String,
    /// Full violation list.
    issues: Vec<ValidationIssue>,
}

impl StepValidationError {
    /// Creates a validation error for the named envelope.
    #[must_use]
    pub fn new(envelope: &str, issues: Vec<ValidationIssue>) -> Self {
        let mut paths: Vec<&str> =
            issues.iter().take(SUMMARY_PATH_LIMIT).map(|issue| issue.path.as_str()).collect();
        if paths.is_empty() {
            paths.push("(root)");
        }
        let remainder = issues.len().saturating_sub(SUMMARY_PATH_LIMIT);
        let summary = if remainder > 0 {
            format!("{envelope} validation failed: {} (+{remainder} more)", paths.join(", "))
        } else {
            format!("{envelope} validation failed: {}", paths.join(", "))
        };
        Self {
            summary,
            issues,
        }
    }

    /// Returns the full violation list.
    #[must_use]
    pub fn issues(&self) -> &[ValidationIssue] {
        &self.issues
    }
}

// ============================================================================
// SECTION: Walk Helpers
// ============================================================================

/// Validation strictness for top-level required fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Strictness {
    /// Missing required fields are violations.
    Complete,
    /// Missing top-level fields are accepted.
    Partial,
}

/// Returns a stable JSON type name for issue reporting.
const fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Joins a field onto a dot-separated path prefix.
fn join_path(prefix: &str, field: &str) -> String {
    if prefix.is_empty() {
        field.to_string()
    } else {
        format!("{prefix}.{field}")
    }
}

/// Pushes a missing-field violation.
fn push_missing(issues: &mut Vec<ValidationIssue>, path: String, expected: &str) {
    issues.push(ValidationIssue {
        message: format!("required field {path} is missing"),
        path,
        expected: expected.to_string(),
        received: "missing".to_string(),
    });
}

/// Pushes a type-mismatch violation.
fn push_mismatch(issues: &mut Vec<ValidationIssue>, path: String, expected: &str, value: &Value) {
    issues.push(ValidationIssue {
        message: format!("field {path} has the wrong type"),
        path,
        expected: expected.to_string(),
        received: json_type_name(value).to_string(),
    });
}

/// Checks a string value, returning it on success.
fn check_string<'a>(
    issues: &mut Vec<ValidationIssue>,
    value: &'a Value,
    path: String,
) -> Option<&'a str> {
    match value.as_str() {
        Some(text) => Some(text),
        None => {
            push_mismatch(issues, path, "string", value);
            None
        }
    }
}

/// Checks a non-empty string value.
fn check_nonempty_string<'a>(
    issues: &mut Vec<ValidationIssue>,
    value: &'a Value,
    path: String,
) -> Option<&'a str> {
    let text = check_string(issues, value, path.clone())?;
    if text.is_empty() {
        issues.push(ValidationIssue {
            message: format!("field {path} must not be empty"),
            path,
            expected: "non-empty string".to_string(),
            received: "empty string".to_string(),
        });
        return None;
    }
    Some(text)
}

/// Checks a boolean value.
fn check_bool(issues: &mut Vec<ValidationIssue>, value: &Value, path: String) -> Option<bool> {
    match value.as_bool() {
        Some(flag) => Some(flag),
        None => {
            push_mismatch(issues, path, "boolean", value);
            None
        }
    }
}

/// Checks a non-negative integer value.
fn check_u64(issues: &mut Vec<ValidationIssue>, value: &Value, path: String) -> Option<u64> {
    match value.as_u64() {
        Some(number) => Some(number),
        None => {
            issues.push(ValidationIssue {
                message: format!("field {path} must be a non-negative integer"),
                path,
                expected: "non-negative integer".to_string(),
                received: render_received(value),
            });
            None
        }
    }
}

/// Checks a signed integer value (timestamps).
fn check_i64(issues: &mut Vec<ValidationIssue>, value: &Value, path: String) -> Option<i64> {
    match value.as_i64() {
        Some(number) => Some(number),
        None => {
            issues.push(ValidationIssue {
                message: format!("field {path} must be an integer"),
                path,
                expected: "integer".to_string(),
                received: render_received(value),
            });
            None
        }
    }
}

/// Checks an object value, returning its map on success.
fn check_object<'a>(
    issues: &mut Vec<ValidationIssue>,
    value: &'a Value,
    path: String,
) -> Option<&'a Map<String, Value>> {
    match value.as_object() {
        Some(object) => Some(object),
        None => {
            push_mismatch(issues, path, "object", value);
            None
        }
    }
}

/// Checks an array value.
fn check_array<'a>(
    issues: &mut Vec<ValidationIssue>,
    value: &'a Value,
    path: String,
) -> Option<&'a [Value]> {
    match value.as_array() {
        Some(array) => Some(array.as_slice()),
        None => {
            push_mismatch(issues, path, "array", value);
            None
        }
    }
}

/// Checks a closed-enum string value.
fn check_enum<'a>(
    issues: &mut Vec<ValidationIssue>,
    value: &'a Value,
    path: String,
    allowed: &[&str],
) -> Option<&'a str> {
    let text = check_string(issues, value, path.clone())?;
    if allowed.contains(&text) {
        Some(text)
    } else {
        issues.push(ValidationIssue {
            message: format!("field {path} is not an allowed value"),
            path,
            expected: format!("one of [{}]", allowed.join(", ")),
            received: text.to_string(),
        });
        None
    }
}

/// Renders a received value for range and integer violations.
fn render_received(value: &Value) -> String {
    match value {
        Value::Number(number) => number.to_string(),
        Value::String(text) => text.clone(),
        other => json_type_name(other).to_string(),
    }
}

// ============================================================================
// SECTION: Shared Substructures
// ============================================================================

/// Validates an artifact reference object.
fn check_artifact_ref(issues: &mut Vec<ValidationIssue>, value: &Value, path: &str) {
    let Some(object) = check_object(issues, value, path.to_string()) else {
        return;
    };
    let Some(kind_value) = object.get("kind") else {
        push_missing(issues, join_path(path, "kind"), "one of [pointer, inline]");
        return;
    };
    let Some(kind) = check_enum(issues, kind_value, join_path(path, "kind"), ARTIFACT_KINDS)
    else {
        return;
    };
    if kind == "pointer" {
        for field in ["uri", "content_type"] {
            match object.get(field) {
                Some(value) => {
                    check_nonempty_string(issues, value, join_path(path, field));
                }
                None => push_missing(issues, join_path(path, field), "non-empty string"),
            }
        }
        match object.get("size_bytes") {
            Some(value) => {
                check_u64(issues, value, join_path(path, "size_bytes"));
            }
            None => push_missing(issues, join_path(path, "size_bytes"), "non-negative integer"),
        }
        match object.get("content_hash") {
            Some(value) => check_content_hash(issues, value, join_path(path, "content_hash")),
            None => {
                push_missing(issues, join_path(path, "content_hash"), "64-character hex string");
            }
        }
        if let Some(preview) = object.get("preview")
            && !preview.is_null()
            && let Some(text) = check_string(issues, preview, join_path(path, "preview"))
            && text.len() > MAX_PREVIEW_BYTES
        {
            issues.push(ValidationIssue {
                path: join_path(path, "preview"),
                message: format!("pointer preview exceeds {MAX_PREVIEW_BYTES} bytes"),
                expected: format!("string of at most {MAX_PREVIEW_BYTES} bytes"),
                received: format!("{} bytes", text.len()),
            });
        }
    } else {
        match object.get("content") {
            Some(value) => {
                if let Some(text) = check_string(issues, value, join_path(path, "content"))
                    && text.len() > MAX_INLINE_BYTES
                {
                    issues.push(ValidationIssue {
                        path: join_path(path, "content"),
                        message: format!("inline content exceeds {MAX_INLINE_BYTES} bytes"),
                        expected: format!("string of at most {MAX_INLINE_BYTES} bytes"),
                        received: format!("{} bytes", text.len()),
                    });
                }
            }
            None => push_missing(issues, join_path(path, "content"), "string"),
        }
        match object.get("content_type") {
            Some(value) => {
                check_nonempty_string(issues, value, join_path(path, "content_type"));
            }
            None => push_missing(issues, join_path(path, "content_type"), "non-empty string"),
        }
        if let Some(hash) = object.get("content_hash")
            && !hash.is_null()
        {
            check_content_hash(issues, hash, join_path(path, "content_hash"));
        }
    }
}

/// Validates a 64-character lowercase hex content hash.
fn check_content_hash(issues: &mut Vec<ValidationIssue>, value: &Value, path: String) {
    let Some(text) = check_string(issues, value, path.clone()) else {
        return;
    };
    let well_formed = text.len() == CONTENT_HASH_LEN
        && text.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase());
    if !well_formed {
        issues.push(ValidationIssue {
            message: format!("field {path} is not a {CONTENT_HASH_LEN}-character hex digest"),
            path,
            expected: format!("{CONTENT_HASH_LEN}-character lowercase hex string"),
            received: text.to_string(),
        });
    }
}

/// Validates an artifact map object.
fn check_artifact_map(issues: &mut Vec<ValidationIssue>, value: &Value, path: &str) {
    let Some(object) = check_object(issues, value, path.to_string()) else {
        return;
    };
    for (name, artifact) in object {
        check_artifact_ref(issues, artifact, &join_path(path, name));
    }
}

// ============================================================================
// SECTION: Step Input Validation
// ============================================================================

/// Validates an untyped value against the step input shape.
///
/// Returns every violation found; an empty list means the value is
/// structurally valid.
#[must_use]
pub fn validate_step_input(value: &Value) -> Vec<ValidationIssue> {
    validate_input_with(value, Strictness::Complete)
}

/// Validates only the step input fields present in the value.
#[must_use]
pub fn validate_step_input_partial(value: &Value) -> Vec<ValidationIssue> {
    validate_input_with(value, Strictness::Partial)
}

/// Shared step input walker.
fn validate_input_with(value: &Value, strictness: Strictness) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();
    let Some(object) = check_object(&mut issues, value, "(root)".to_string()) else {
        return issues;
    };

    let required =
        |issues: &mut Vec<ValidationIssue>, field: &str, expected: &str| match object.get(field) {
            Some(value) if !value.is_null() => Some(value),
            _ => {
                if strictness == Strictness::Complete {
                    push_missing(issues, field.to_string(), expected);
                }
                None
            }
        };

    if let Some(value) = required(&mut issues, "run_id", "non-empty string") {
        check_nonempty_string(&mut issues, value, "run_id".to_string());
    }
    if let Some(value) = required(&mut issues, "step_id", "non-empty string") {
        check_nonempty_string(&mut issues, value, "step_id".to_string());
    }
    if let Some(value) = required(&mut issues, "tenant_id", "integer >= 1")
        && let Some(tenant) = check_u64(&mut issues, value, "tenant_id".to_string())
        && tenant == 0
    {
        issues.push(ValidationIssue {
            path: "tenant_id".to_string(),
            message: "field tenant_id must be at least 1".to_string(),
            expected: "integer >= 1".to_string(),
            received: "0".to_string(),
        });
    }
    if let Some(value) = required(&mut issues, "step_type", "step type label") {
        check_enum(&mut issues, value, "step_type".to_string(), STEP_TYPES);
    }
    if let Some(value) = required(&mut issues, "risk_mode", "risk mode label") {
        check_enum(&mut issues, value, "risk_mode".to_string(), RISK_MODES);
    }
    if let Some(value) = required(&mut issues, "capabilities_mode", "capabilities mode label") {
        check_enum(&mut issues, value, "capabilities_mode".to_string(), CAPABILITIES_MODES);
    }
    if let Some(value) = required(&mut issues, "queued_at", "integer") {
        check_i64(&mut issues, value, "queued_at".to_string());
    }

    let attempt_number = required(&mut issues, "attempt_number", "integer >= 1")
        .and_then(|value| check_u64(&mut issues, value, "attempt_number".to_string()));
    let max_attempts = required(&mut issues, "max_attempts", "integer >= 1")
        .and_then(|value| check_u64(&mut issues, value, "max_attempts".to_string()));
    for (field, count) in [("attempt_number", attempt_number), ("max_attempts", max_attempts)] {
        if count == Some(0) {
            issues.push(ValidationIssue {
                path: field.to_string(),
                message: format!("field {field} must be at least 1"),
                expected: "integer >= 1".to_string(),
                received: "0".to_string(),
            });
        }
    }
    if let (Some(attempt), Some(max)) = (attempt_number, max_attempts)
        && attempt >= 1
        && max >= 1
        && attempt > max
    {
        issues.push(ValidationIssue {
            path: "attempt_number".to_string(),
            message: "attempt_number exceeds max_attempts".to_string(),
            expected: format!("integer <= {max}"),
            received: attempt.to_string(),
        });
    }

    if let Some(context) = object.get("context")
        && !context.is_null()
        && let Some(context) = check_object(&mut issues, context, "context".to_string())
    {
        if let Some(repository) = context.get("repository")
            && !repository.is_null()
        {
            check_nonempty_string(&mut issues, repository, "context.repository".to_string());
        }
        for field in ["pull_request", "issue"] {
            if let Some(value) = context.get(field)
                && !value.is_null()
            {
                check_u64(&mut issues, value, join_path("context", field));
            }
        }
    }

    if let Some(previous) = object.get("previous_output")
        && !previous.is_null()
    {
        for nested in validate_output_with(previous, Strictness::Complete) {
            issues.push(ValidationIssue {
                path: join_path("previous_output", &nested.path),
                message: nested.message,
                expected: nested.expected,
                received: nested.received,
            });
        }
    }

    if let Some(artifacts) = object.get("artifacts")
        && !artifacts.is_null()
    {
        check_artifact_map(&mut issues, artifacts, "artifacts");
    }

    if let Some(model) = object.get("model")
        && !model.is_null()
        && let Some(model) = check_object(&mut issues, model, "model".to_string())
    {
        for field in ["model", "provider"] {
            match model.get(field) {
                Some(value) => {
                    check_nonempty_string(&mut issues, value, join_path("model", field));
                }
                None => push_missing(&mut issues, join_path("model", field), "non-empty string"),
            }
        }
        if let Some(temperature) = model.get("temperature")
            && !temperature.is_null()
        {
            match temperature.as_f64() {
                Some(degrees) if (0.0 ..= 2.0).contains(&degrees) => {}
                Some(degrees) => issues.push(ValidationIssue {
                    path: "model.temperature".to_string(),
                    message: "field model.temperature is out of range".to_string(),
                    expected: "number in [0, 2]".to_string(),
                    received: degrees.to_string(),
                }),
                None => push_mismatch(
                    &mut issues,
                    "model.temperature".to_string(),
                    "number in [0, 2]",
                    temperature,
                ),
            }
        }
        if let Some(ceiling) = model.get("max_output_tokens")
            && !ceiling.is_null()
        {
            check_u64(&mut issues, ceiling, "model.max_output_tokens".to_string());
        }
    }

    if let Some(params) = object.get("params")
        && !params.is_null()
    {
        check_object(&mut issues, params, "params".to_string());
    }

    issues
}

// ============================================================================
// SECTION: Step Output Validation
// ============================================================================

/// Validates an untyped value against the step output shape.
///
/// Returns every violation found; an empty list means the value is
/// structurally valid.
#[must_use]
pub fn validate_step_output(value: &Value) -> Vec<ValidationIssue> {
    validate_output_with(value, Strictness::Complete)
}

/// Validates only the step output fields present in the value.
#[must_use]
pub fn validate_step_output_partial(value: &Value) -> Vec<ValidationIssue> {
    validate_output_with(value, Strictness::Partial)
}

/// Shared step output walker.
fn validate_output_with(value: &Value, strictness: Strictness) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();
    let Some(object) = check_object(&mut issues, value, "(root)".to_string()) else {
        return issues;
    };

    let required =
        |issues: &mut Vec<ValidationIssue>, field: &str, expected: &str| match object.get(field) {
            Some(value) if !value.is_null() => Some(value),
            _ => {
                if strictness == Strictness::Complete {
                    push_missing(issues, field.to_string(), expected);
                }
                None
            }
        };

    if let Some(value) = required(&mut issues, "run_id", "non-empty string") {
        check_nonempty_string(&mut issues, value, "run_id".to_string());
    }
    if let Some(value) = required(&mut issues, "step_id", "non-empty string") {
        check_nonempty_string(&mut issues, value, "step_id".to_string());
    }
    if let Some(value) = required(&mut issues, "result_code", "result code label") {
        check_enum(&mut issues, value, "result_code".to_string(), RESULT_CODES);
    }
    if let Some(value) = required(&mut issues, "summary", "string") {
        check_string(&mut issues, value, "summary".to_string());
    }

    if let Some(error) = object.get("error")
        && !error.is_null()
        && let Some(error) = check_object(&mut issues, error, "error".to_string())
    {
        for field in ["code", "message"] {
            match error.get(field) {
                Some(value) => {
                    check_nonempty_string(&mut issues, value, join_path("error", field));
                }
                None => push_missing(&mut issues, join_path("error", field), "non-empty string"),
            }
        }
        if let Some(hint) = error.get("retryable_hint")
            && !hint.is_null()
        {
            check_bool(&mut issues, hint, "error.retryable_hint".to_string());
        }
    }

    if let Some(artifacts) = object.get("artifacts")
        && !artifacts.is_null()
    {
        check_artifact_map(&mut issues, artifacts, "artifacts");
    }

    if let Some(timing) = required(&mut issues, "timing", "timing object")
        && let Some(timing) = check_object(&mut issues, timing, "timing".to_string())
    {
        for field in ["started_at", "completed_at"] {
            match timing.get(field) {
                Some(value) => {
                    check_i64(&mut issues, value, join_path("timing", field));
                }
                None => push_missing(&mut issues, join_path("timing", field), "integer"),
            }
        }
        match timing.get("duration_ms") {
            Some(value) => {
                check_u64(&mut issues, value, "timing.duration_ms".to_string());
            }
            None => {
                push_missing(&mut issues, "timing.duration_ms".to_string(), "non-negative integer");
            }
        }
        if let Some(phases) = timing.get("phases")
            && !phases.is_null()
            && let Some(phases) = check_object(&mut issues, phases, "timing.phases".to_string())
        {
            for (name, duration) in phases {
                check_u64(&mut issues, duration, join_path("timing.phases", name));
            }
        }
    }

    if let Some(cost) = object.get("cost")
        && !cost.is_null()
        && let Some(cost) = check_object(&mut issues, cost, "cost".to_string())
    {
        for field in ["model", "provider"] {
            match cost.get(field) {
                Some(value) => {
                    check_nonempty_string(&mut issues, value, join_path("cost", field));
                }
                None => push_missing(&mut issues, join_path("cost", field), "non-empty string"),
            }
        }
        match cost.get("tokens") {
            Some(tokens) => {
                if let Some(tokens) =
                    check_object(&mut issues, tokens, "cost.tokens".to_string())
                {
                    for field in ["input", "output", "total"] {
                        match tokens.get(field) {
                            Some(value) => {
                                check_u64(&mut issues, value, join_path("cost.tokens", field));
                            }
                            None => push_missing(
                                &mut issues,
                                join_path("cost.tokens", field),
                                "non-negative integer",
                            ),
                        }
                    }
                }
            }
            None => push_missing(&mut issues, "cost.tokens".to_string(), "token usage object"),
        }
        if let Some(estimated) = cost.get("estimated_usd")
            && !estimated.is_null()
        {
            match estimated.as_f64() {
                Some(amount) if amount >= 0.0 => {}
                Some(amount) => issues.push(ValidationIssue {
                    path: "cost.estimated_usd".to_string(),
                    message: "field cost.estimated_usd must be non-negative".to_string(),
                    expected: "number >= 0".to_string(),
                    received: amount.to_string(),
                }),
                None => push_mismatch(
                    &mut issues,
                    "cost.estimated_usd".to_string(),
                    "number >= 0",
                    estimated,
                ),
            }
        }
    }

    if let Some(next_step) = object.get("next_step")
        && !next_step.is_null()
    {
        check_enum(&mut issues, next_step, "next_step".to_string(), STEP_TYPES);
    }

    if let Some(flag) = object.get("requires_approval")
        && !flag.is_null()
    {
        check_bool(&mut issues, flag, "requires_approval".to_string());
    }

    if let Some(changes) = object.get("proposed_changes")
        && !changes.is_null()
        && let Some(changes) = check_array(&mut issues, changes, "proposed_changes".to_string())
    {
        for (index, change) in changes.iter().enumerate() {
            let prefix = format!("proposed_changes[{index}]");
            let Some(change) = check_object(&mut issues, change, prefix.clone()) else {
                continue;
            };
            match change.get("path") {
                Some(value) => {
                    check_nonempty_string(&mut issues, value, join_path(&prefix, "path"));
                }
                None => push_missing(&mut issues, join_path(&prefix, "path"), "non-empty string"),
            }
            match change.get("kind") {
                Some(value) => {
                    check_enum(&mut issues, value, join_path(&prefix, "kind"), CHANGE_KINDS);
                }
                None => push_missing(
                    &mut issues,
                    join_path(&prefix, "kind"),
                    "one of [create, modify, delete]",
                ),
            }
            for field in ["added_lines", "deleted_lines"] {
                match change.get(field) {
                    Some(value) => {
                        check_u64(&mut issues, value, join_path(&prefix, field));
                    }
                    None => push_missing(
                        &mut issues,
                        join_path(&prefix, field),
                        "non-negative integer",
                    ),
                }
            }
        }
    }

    issues
}

// ============================================================================
// SECTION: Asserting Forms
// ============================================================================

/// Validates and deserializes a step input, failing fast.
///
/// # Errors
///
/// Returns [`StepValidationError`] when the value is structurally invalid.
pub fn assert_valid_step_input(value: &Value) -> Result<StepInput, StepValidationError> {
    let issues = validate_step_input(value);
    if !issues.is_empty() {
        return Err(StepValidationError::new("step input", issues));
    }
    serde_json::from_value(value.clone()).map_err(|err| {
        StepValidationError::new(
            "step input",
            vec![ValidationIssue {
                path: "(root)".to_string(),
                message: err.to_string(),
                expected: "step input envelope".to_string(),
                received: json_type_name(value).to_string(),
            }],
        )
    })
}

/// Validates and deserializes a step output, failing fast.
///
/// # Errors
///
/// Returns [`StepValidationError`] when the value is structurally invalid.
pub fn assert_valid_step_output(value: &Value) -> Result<StepOutput, StepValidationError> {
    let issues = validate_step_output(value);
    if !issues.is_empty() {
        return Err(StepValidationError::new("step output", issues));
    }
    serde_json::from_value(value.clone()).map_err(|err| {
        StepValidationError::new(
            "step output",
            vec![ValidationIssue {
                path: "(root)".to_string(),
                message: err.to_string(),
                expected: "step output envelope".to_string(),
                received: json_type_name(value).to_string(),
            }],
        )
    })
}
