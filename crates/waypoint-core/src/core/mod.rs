// crates/waypoint-core/src/core/mod.rs
// ============================================================================
// Module: Waypoint Core Types
// Description: Envelope, approval, artifact, and notification data model.
// Purpose: Group the canonical record types shared across Waypoint crates.
// Dependencies: crate::core submodules
// ============================================================================

//! ## Overview
//! The core module holds the canonical data model: step envelopes, approval
//! records, artifact references, notification types, identifiers, and time.
//! Types here carry invariants in their shapes; behavior lives in the
//! validation layer and the approvals crate.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod approval;
pub mod artifact;
pub mod identifiers;
pub mod notify;
pub mod outcome;
pub mod step;
pub mod time;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use approval::ApprovalDecision;
pub use approval::ApprovalPolicy;
pub use approval::ApprovalRequest;
pub use approval::ApprovalStatus;
pub use approval::EscalationAction;
pub use approval::EscalationPolicy;
pub use approval::NewApprovalRequest;
pub use approval::PolicyVerdict;
pub use approval::RequestContext;
pub use approval::RiskLevel;
pub use approval::evaluate_policy;
pub use artifact::ArtifactError;
pub use artifact::ArtifactRef;
pub use artifact::CONTENT_HASH_LEN;
pub use artifact::ContentHash;
pub use artifact::MAX_INLINE_BYTES;
pub use artifact::MAX_PREVIEW_BYTES;
pub use artifact::hash_bytes;
pub use identifiers::ApproverId;
pub use identifiers::CorrelationId;
pub use identifiers::RequestId;
pub use identifiers::RunId;
pub use identifiers::StepId;
pub use identifiers::TenantId;
pub use notify::ChannelKind;
pub use notify::NotificationChannel;
pub use notify::NotificationMessage;
pub use notify::NotificationOutcome;
pub use notify::NotificationPriority;
pub use outcome::ChangeKind;
pub use outcome::ProposedChange;
pub use outcome::ResultCode;
pub use outcome::StepCost;
pub use outcome::StepErrorDetail;
pub use outcome::StepOutput;
pub use outcome::StepTiming;
pub use outcome::TokenUsage;
pub use step::CapabilitiesMode;
pub use step::ExecutionContext;
pub use step::ModelConfig;
pub use step::RiskMode;
pub use step::StepInput;
pub use step::StepType;
pub use time::Timestamp;
