// crates/waypoint-core/src/core/outcome.rs
// ============================================================================
// Module: Waypoint Step Outcomes
// Description: Step output envelope, result codes, timing, and cost records.
// Purpose: Classify step outcomes so the orchestrator can drive control flow.
// Dependencies: crate::core::{artifact, identifiers, step, time}, serde, serde_json
// ============================================================================

//! ## Overview
//! Step outputs are the response half of the step envelope. The result code
//! is not merely descriptive: it indexes two fixed policy tables (retry
//! eligibility and pipeline continuation) that the orchestrator consumes.
//! Outputs are immutable once constructed; a correction requires a new
//! output value.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;

use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;

use crate::core::artifact::ArtifactRef;
use crate::core::identifiers::RunId;
use crate::core::identifiers::StepId;
use crate::core::step::StepType;
use crate::core::time::Timestamp;

// ============================================================================
// SECTION: Result Codes
// ============================================================================

/// Five-way step outcome classification.
///
/// # Invariants
/// - Variants are stable for serialization and policy-table lookups.
/// - `blocked` means "awaiting external input": it is resolved by an
///   external decision, never retried on a timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResultCode {
    /// Step completed successfully.
    Ok,
    /// Step failed transiently and may be retried.
    Retryable,
    /// Step failed permanently.
    Fatal,
    /// Step is awaiting external input (canonically an approval decision).
    Blocked,
    /// Step was skipped intentionally.
    Skipped,
}

impl ResultCode {
    /// Returns a stable label for the result code.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Ok => "ok",
            Self::Retryable => "retryable",
            Self::Fatal => "fatal",
            Self::Blocked => "blocked",
            Self::Skipped => "skipped",
        }
    }

    /// Retry-eligibility table consumed by the orchestrator.
    #[must_use]
    pub const fn may_retry(self) -> bool {
        matches!(self, Self::Retryable)
    }

    /// Continuation table consumed by the orchestrator.
    #[must_use]
    pub const fn advances_pipeline(self) -> bool {
        matches!(self, Self::Ok | Self::Skipped)
    }
}

// ============================================================================
// SECTION: Timing and Cost
// ============================================================================

/// Wall-clock timing for one step attempt.
///
/// # Invariants
/// - `completed_at` must not precede `started_at` (semantic validation).
/// - `phases` keys are free-form sub-phase names with millisecond durations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepTiming {
    /// Attempt start time.
    pub started_at: Timestamp,
    /// Attempt completion time.
    pub completed_at: Timestamp,
    /// Total attempt duration in milliseconds.
    pub duration_ms: u64,
    /// Named sub-phase durations in milliseconds.
    #[serde(default)]
    pub phases: BTreeMap<String, u64>,
}

/// Token usage for one model invocation set.
///
/// # Invariants
/// - `total` must equal `input + output` (semantic validation).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    /// Input tokens consumed.
    pub input: u64,
    /// Output tokens produced.
    pub output: u64,
    /// Total tokens for the attempt.
    pub total: u64,
}

/// Cost attribution for one step attempt.
///
/// # Invariants
/// - `estimated_usd`, when present, is non-negative.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepCost {
    /// Model identifier used by the step.
    pub model: String,
    /// Model provider name.
    pub provider: String,
    /// Token usage for the attempt.
    pub tokens: TokenUsage,
    /// Estimated cost in US dollars.
    pub estimated_usd: Option<f64>,
}

// ============================================================================
// SECTION: Error Detail
// ============================================================================

/// Structured error detail carried by failed outputs.
///
/// # Invariants
/// - `code` is a stable identifier for programmatic handling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepErrorDetail {
    /// Stable error code string.
    pub code: String,
    /// Human-readable error message.
    pub message: String,
    /// Optional structured error context.
    pub details: Option<Value>,
    /// Hint that the underlying failure is transient.
    #[serde(default)]
    pub retryable_hint: bool,
}

// ============================================================================
// SECTION: Proposed Changes
// ============================================================================

/// File-change classification for proposed changes.
///
/// # Invariants
/// - Variants are stable for serialization and rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeKind {
    /// File would be created.
    Create,
    /// File would be modified.
    Modify,
    /// File would be deleted.
    Delete,
}

impl ChangeKind {
    /// Returns a stable label for the change kind.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Modify => "modify",
            Self::Delete => "delete",
        }
    }
}

/// One proposed file-level change awaiting approval.
///
/// # Invariants
/// - `path` is repository-relative and not normalized by this type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProposedChange {
    /// Repository-relative file path.
    pub path: String,
    /// Change classification.
    pub kind: ChangeKind,
    /// Lines added by the change.
    pub added_lines: u64,
    /// Lines deleted by the change.
    pub deleted_lines: u64,
    /// Optional one-line change summary.
    pub summary: Option<String>,
}

// ============================================================================
// SECTION: Step Output
// ============================================================================

/// Typed response envelope produced by a step executor.
///
/// # Invariants
/// - Identity fields echo the input envelope for the same attempt.
/// - Never mutated after creation; corrections require a new output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepOutput {
    /// Run identifier echoed from the input.
    pub run_id: RunId,
    /// Step identifier echoed from the input.
    pub step_id: StepId,
    /// Outcome classification.
    pub result_code: ResultCode,
    /// Human-readable outcome summary.
    pub summary: String,
    /// Optional structured result data.
    pub data: Option<Value>,
    /// Error detail; required for fatal and retryable outcomes.
    pub error: Option<StepErrorDetail>,
    /// Artifacts produced by the step, keyed by name.
    #[serde(default)]
    pub artifacts: BTreeMap<String, ArtifactRef>,
    /// Attempt timing.
    pub timing: StepTiming,
    /// Optional cost attribution.
    pub cost: Option<StepCost>,
    /// Optional suggested next step type.
    pub next_step: Option<StepType>,
    /// Indicates the step requires human approval before the pipeline
    /// proceeds.
    #[serde(default)]
    pub requires_approval: bool,
    /// Proposed file-level changes gated by the approval.
    #[serde(default)]
    pub proposed_changes: Vec<ProposedChange>,
}
