// crates/waypoint-core/src/lib.rs
// ============================================================================
// Module: Waypoint Core Library
// Description: Step envelope contract, validation, and approval data model.
// Purpose: Define the typed contracts every Waypoint crate builds on.
// Dependencies: serde, serde_json, sha2, thiserror
// ============================================================================

//! ## Overview
//! Waypoint Core defines the step execution contract for a multi-agent
//! automation pipeline: typed step input/output envelopes, a closed result
//! code set with fixed policy tables, artifact references, the approval
//! request data model, structural and semantic validation, and the
//! backend-agnostic interfaces the approval gate is built against.
//! Invariants:
//! - Validation fails closed and aggregates every violation as data.
//! - Envelopes are immutable once constructed.
//! - Approval decision logs are append-only.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod core;
pub mod interfaces;
pub mod validate;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use crate::core::ApprovalDecision;
pub use crate::core::ApprovalPolicy;
pub use crate::core::ApprovalRequest;
pub use crate::core::ApprovalStatus;
pub use crate::core::ApproverId;
pub use crate::core::ArtifactError;
pub use crate::core::ArtifactRef;
pub use crate::core::CONTENT_HASH_LEN;
pub use crate::core::CapabilitiesMode;
pub use crate::core::ChangeKind;
pub use crate::core::ChannelKind;
pub use crate::core::ContentHash;
pub use crate::core::CorrelationId;
pub use crate::core::EscalationAction;
pub use crate::core::EscalationPolicy;
pub use crate::core::ExecutionContext;
pub use crate::core::MAX_INLINE_BYTES;
pub use crate::core::MAX_PREVIEW_BYTES;
pub use crate::core::ModelConfig;
pub use crate::core::NewApprovalRequest;
pub use crate::core::NotificationChannel;
pub use crate::core::NotificationMessage;
pub use crate::core::NotificationOutcome;
pub use crate::core::NotificationPriority;
pub use crate::core::PolicyVerdict;
pub use crate::core::ProposedChange;
pub use crate::core::RequestContext;
pub use crate::core::RequestId;
pub use crate::core::ResultCode;
pub use crate::core::RiskLevel;
pub use crate::core::RiskMode;
pub use crate::core::RunId;
pub use crate::core::StepCost;
pub use crate::core::StepErrorDetail;
pub use crate::core::StepId;
pub use crate::core::StepInput;
pub use crate::core::StepOutput;
pub use crate::core::StepTiming;
pub use crate::core::StepType;
pub use crate::core::TenantId;
pub use crate::core::Timestamp;
pub use crate::core::TokenUsage;
pub use crate::core::evaluate_policy;
pub use crate::core::hash_bytes;
pub use interfaces::ApprovalStore;
pub use interfaces::Clock;
pub use interfaces::ExecutorError;
pub use interfaces::GateMetrics;
pub use interfaces::NoopMetrics;
pub use interfaces::Notifier;
pub use interfaces::NotifyError;
pub use interfaces::StepExecutor;
pub use interfaces::StoreError;
pub use interfaces::SystemClock;
pub use validate::StepValidationError;
pub use validate::ValidationIssue;
pub use validate::assert_valid_step_input;
pub use validate::assert_valid_step_output;
pub use validate::semantic::FullOutputReport;
pub use validate::semantic::SemanticIssue;
pub use validate::semantic::SemanticReport;
pub use validate::semantic::Severity;
pub use validate::semantic::validate_output_semantics;
pub use validate::semantic::validate_step_output_full;
pub use validate::validate_step_input;
pub use validate::validate_step_input_partial;
pub use validate::validate_step_output;
pub use validate::validate_step_output_partial;
