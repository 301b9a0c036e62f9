// crates/waypoint-core/src/core/step.rs
// ============================================================================
// Module: Waypoint Step Inputs
// Description: Step input envelope, execution context, and model configuration.
// Purpose: Define the request half of the step contract owned by the orchestrator.
// Dependencies: crate::core::{artifact, identifiers, outcome, time}, serde, serde_json
// ============================================================================

//! ## Overview
//! Step inputs are the request half of the step envelope. They are
//! constructed by the orchestrator, immutable for the lifetime of one step
//! attempt, and consumed by an external step executor. Retry bookkeeping
//! (`attempt_number`, `max_attempts`) travels with the envelope so executors
//! never track attempts themselves.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;

use serde::Deserialize;
use serde::Serialize;
use serde_json::Map;
use serde_json::Value;

use crate::core::artifact::ArtifactRef;
use crate::core::identifiers::RunId;
use crate::core::identifiers::StepId;
use crate::core::identifiers::TenantId;
use crate::core::outcome::StepOutput;
use crate::core::time::Timestamp;

// ============================================================================
// SECTION: Step Classification
// ============================================================================

/// Fixed enumeration of pipeline step types.
///
/// # Invariants
/// - Variants are stable for serialization and contract matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepType {
    /// Classify and prioritize incoming work.
    Triage,
    /// Produce an execution plan.
    Plan,
    /// Produce code changes.
    Code,
    /// Resolve conflicts in proposed changes.
    Resolve,
    /// Review produced changes.
    Review,
    /// Apply approved changes.
    Apply,
}

impl StepType {
    /// Returns a stable label for the step type.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Triage => "triage",
            Self::Plan => "plan",
            Self::Code => "code",
            Self::Resolve => "resolve",
            Self::Review => "review",
            Self::Apply => "apply",
        }
    }
}

/// How aggressively the pipeline may act on risk.
///
/// # Invariants
/// - Variants are stable for serialization and contract matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskMode {
    /// Prefer holding over acting when uncertain.
    Conservative,
    /// Default risk posture.
    Balanced,
    /// Act unless explicitly blocked.
    Aggressive,
}

/// Capability envelope granted to the step.
///
/// # Invariants
/// - Variants are stable for serialization and contract matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CapabilitiesMode {
    /// Read-only access; no mutations proposed or applied.
    ReadOnly,
    /// May propose mutations but never apply them.
    Suggest,
    /// May apply mutations subject to approval gating.
    Execute,
}

// ============================================================================
// SECTION: Execution Context
// ============================================================================

/// External work-item context for a step.
///
/// # Invariants
/// - Fields are optional and mutually non-exclusive.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionContext {
    /// Repository slug (for example `owner/name`).
    pub repository: Option<String>,
    /// Pull request number within the repository.
    pub pull_request: Option<u64>,
    /// Issue number within the tracker.
    pub issue: Option<u64>,
}

/// Model configuration for steps that invoke a model.
///
/// # Invariants
/// - `temperature`, when present, lies in `[0, 2]` (structural validation).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Model identifier.
    pub model: String,
    /// Model provider name.
    pub provider: String,
    /// Sampling temperature.
    pub temperature: Option<f64>,
    /// Output token ceiling.
    pub max_output_tokens: Option<u64>,
}

// ============================================================================
// SECTION: Step Input
// ============================================================================

/// Typed request envelope for one step attempt.
///
/// # Invariants
/// - Immutable once constructed; owned by the orchestrator for the attempt.
/// - `attempt_number` and `max_attempts` are 1-based and
///   `attempt_number <= max_attempts` (structural validation).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepInput {
    /// Run identifier.
    pub run_id: RunId,
    /// Step identifier.
    pub step_id: StepId,
    /// Tenant identifier.
    pub tenant_id: TenantId,
    /// External work-item context.
    #[serde(default)]
    pub context: ExecutionContext,
    /// Step type classification.
    pub step_type: StepType,
    /// Risk posture for the attempt.
    pub risk_mode: RiskMode,
    /// Capability envelope for the attempt.
    pub capabilities_mode: CapabilitiesMode,
    /// Output of the previous step, when chained.
    pub previous_output: Option<StepOutput>,
    /// Named artifact references available to the step.
    #[serde(default)]
    pub artifacts: BTreeMap<String, ArtifactRef>,
    /// Model configuration for model-backed steps.
    pub model: Option<ModelConfig>,
    /// Free-form step parameters.
    #[serde(default)]
    pub params: Map<String, Value>,
    /// Time the step was queued.
    pub queued_at: Timestamp,
    /// Attempt number, starting at 1.
    pub attempt_number: u32,
    /// Maximum attempts allowed for the step.
    pub max_attempts: u32,
}
