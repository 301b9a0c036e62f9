// crates/waypoint-core/src/validate/semantic.rs
// ============================================================================
// Module: Waypoint Semantic Validation
// Description: Cross-field consistency checks on typed step outputs.
// Purpose: Catch logical inconsistency the envelope shape alone cannot express.
// Dependencies: crate::core, crate::validate, serde_json
// ============================================================================

//! ## Overview
//! Semantic validation runs only after structural validation succeeds and
//! checks cross-field consistency: timing ordering, error presence for
//! failure codes, token arithmetic, and duration agreement. Errors should
//! block progression; warnings are advisory. Results are returned as data,
//! never thrown.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde_json::Value;

use crate::core::outcome::ResultCode;
use crate::core::outcome::StepOutput;
use crate::validate::ValidationIssue;
use crate::validate::validate_step_output;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Tolerated disagreement between `duration_ms` and the timestamp span.
pub const DURATION_TOLERANCE_MS: u64 = 100;

// ============================================================================
// SECTION: Semantic Issues
// ============================================================================

/// Severity of one semantic finding.
///
/// # Invariants
/// - `Error` findings block progression; `Warning` findings are advisory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Advisory inconsistency.
    Warning,
    /// Blocking inconsistency.
    Error,
}

/// One semantic finding on a typed step output.
///
/// # Invariants
/// - `path` is a dot-joined field path from the envelope root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SemanticIssue {
    /// Finding severity.
    pub severity: Severity,
    /// Dot-joined path of the inconsistent field.
    pub path: String,
    /// Human-readable finding message.
    pub message: String,
}

/// Aggregated semantic findings for one output.
///
/// # Invariants
/// - `issues` preserves the order checks ran in.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SemanticReport {
    /// All findings in check order.
    pub issues: Vec<SemanticIssue>,
}

impl SemanticReport {
    /// Returns the blocking findings.
    #[must_use]
    pub fn errors(&self) -> Vec<&SemanticIssue> {
        self.issues.iter().filter(|issue| issue.severity == Severity::Error).collect()
    }

    /// Returns the advisory findings.
    #[must_use]
    pub fn warnings(&self) -> Vec<&SemanticIssue> {
        self.issues.iter().filter(|issue| issue.severity == Severity::Warning).collect()
    }

    /// Returns true when no blocking finding is present.
    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.issues.iter().all(|issue| issue.severity != Severity::Error)
    }
}

// ============================================================================
// SECTION: Semantic Checks
// ============================================================================

/// Runs all semantic checks on a typed step output.
#[must_use]
pub fn validate_output_semantics(output: &StepOutput) -> SemanticReport {
    let mut report = SemanticReport::default();

    if output.timing.completed_at < output.timing.started_at {
        report.issues.push(SemanticIssue {
            severity: Severity::Error,
            path: "timing.completed_at".to_string(),
            message: "completed_at precedes started_at".to_string(),
        });
    } else {
        let span = output.timing.completed_at.saturating_millis_since(output.timing.started_at);
        let span = u64::try_from(span).unwrap_or(0);
        let drift = output.timing.duration_ms.abs_diff(span);
        if drift > DURATION_TOLERANCE_MS {
            report.issues.push(SemanticIssue {
                severity: Severity::Warning,
                path: "timing.duration_ms".to_string(),
                message: format!(
                    "duration_ms disagrees with the timestamp span by {drift} ms \
                     (tolerance {DURATION_TOLERANCE_MS} ms)"
                ),
            });
        }
    }

    if matches!(output.result_code, ResultCode::Fatal | ResultCode::Retryable)
        && output.error.is_none()
    {
        report.issues.push(SemanticIssue {
            severity: Severity::Error,
            path: "error".to_string(),
            message: format!(
                "result code {} requires a populated error object",
                output.result_code.as_str()
            ),
        });
    }

    if output.requires_approval && output.proposed_changes.is_empty() {
        report.issues.push(SemanticIssue {
            severity: Severity::Warning,
            path: "proposed_changes".to_string(),
            message: "requires_approval is set without proposed changes; \
                      approvals may gate non-file actions"
                .to_string(),
        });
    }

    if let Some(cost) = &output.cost {
        let expected = cost.tokens.input.saturating_add(cost.tokens.output);
        if cost.tokens.total != expected {
            report.issues.push(SemanticIssue {
                severity: Severity::Error,
                path: "cost.tokens.total".to_string(),
                message: format!(
                    "token total {} does not equal input + output ({expected})",
                    cost.tokens.total
                ),
            });
        }
    }

    report
}

// ============================================================================
// SECTION: Full Validation
// ============================================================================

/// Combined structural and semantic report for one untyped output.
///
/// # Invariants
/// - `semantic` is populated only when the structural pass succeeded.
#[derive(Debug, Clone, Default)]
pub struct FullOutputReport {
    /// Structural violations.
    pub structural: Vec<ValidationIssue>,
    /// Semantic findings (empty when structural validation failed).
    pub semantic: SemanticReport,
}

impl FullOutputReport {
    /// Returns true when the output is structurally valid and carries no
    /// blocking semantic finding.
    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.structural.is_empty() && self.semantic.is_ok()
    }
}

/// Validates an untyped output structurally, then semantically.
///
/// Semantic checks run only when the structural pass succeeds and the value
/// deserializes; all findings are returned as data.
#[must_use]
pub fn validate_step_output_full(value: &Value) -> FullOutputReport {
    let structural = validate_step_output(value);
    if !structural.is_empty() {
        return FullOutputReport {
            structural,
            semantic: SemanticReport::default(),
        };
    }
    match serde_json::from_value::<StepOutput>(value.clone()) {
        Ok(output) => FullOutputReport {
            structural,
            semantic: validate_output_semantics(&output),
        },
        Err(err) => FullOutputReport {
            structural: vec![ValidationIssue {
                path: "(root)".to_string(),
                message: err.to_string(),
                expected: "step output envelope".to_string(),
                received: "undecodable object".to_string(),
            }],
            semantic: SemanticReport::default(),
        },
    }
}
