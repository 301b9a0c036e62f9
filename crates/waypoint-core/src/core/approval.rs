// crates/waypoint-core/src/core/approval.rs
// ============================================================================
// Module: Waypoint Approval Records
// Description: Approval requests, decisions, policies, and escalation policy.
// Purpose: Capture the human-in-the-loop gating state machine records.
// Dependencies: crate::core::{identifiers, notify, outcome, time}, serde
// ============================================================================

//! ## Overview
//! Approval records capture the full lifecycle of a human gating decision.
//! Requests are created through the approval store, mutated only through its
//! methods, and terminal once `resolved_at` is set. Decision lists are
//! append-only; policy evaluation over them is a pure function.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeSet;

use serde::Deserialize;
use serde::Serialize;

use crate::core::identifiers::ApproverId;
use crate::core::identifiers::CorrelationId;
use crate::core::identifiers::RequestId;
use crate::core::identifiers::RunId;
use crate::core::identifiers::StepId;
use crate::core::identifiers::TenantId;
use crate::core::notify::NotificationChannel;
use crate::core::outcome::ProposedChange;
use crate::core::time::Timestamp;

// ============================================================================
// SECTION: Request Lifecycle
// ============================================================================

/// Approval request lifecycle status.
///
/// # Invariants
/// - `approved`, `rejected`, `timeout`, and `cancelled` are terminal.
/// - `escalated` re-enters an extended pending wait.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApprovalStatus {
    /// Awaiting decisions.
    Pending,
    /// Policy satisfied by approvals.
    Approved,
    /// Rejected by any single rejection.
    Rejected,
    /// Expired without a decision.
    Timeout,
    /// Escalated to a wider approver set; still awaiting decisions.
    Escalated,
    /// Cancelled by the requester.
    Cancelled,
}

impl ApprovalStatus {
    /// Returns a stable label for the status.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
            Self::Timeout => "timeout",
            Self::Escalated => "escalated",
            Self::Cancelled => "cancelled",
        }
    }

    /// Returns true for terminal statuses.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Approved | Self::Rejected | Self::Timeout | Self::Cancelled)
    }
}

// ============================================================================
// SECTION: Decisions and Policy
// ============================================================================

/// One recorded yes/no vote against a request.
///
/// # Invariants
/// - Immutable once appended; decision lists only grow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApprovalDecision {
    /// Whether the decider approved.
    pub approved: bool,
    /// Principal who decided.
    pub decided_by: ApproverId,
    /// Optional decision reason.
    pub reason: Option<String>,
    /// Decision time.
    pub decided_at: Timestamp,
}

/// Decision policy over the eligible approver list.
///
/// # Invariants
/// - Variants are stable for serialization and contract matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApprovalPolicy {
    /// First approval satisfies the policy.
    Any,
    /// One approval per listed approver is required.
    All,
    /// Strictly more than half of the listed approvers must approve.
    Majority,
}

impl ApprovalPolicy {
    /// Returns a stable label for the policy.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Any => "any",
            Self::All => "all",
            Self::Majority => "majority",
        }
    }
}

/// Outcome of evaluating a policy over the current decision list.
///
/// # Invariants
/// - Variants are exhaustive for gate control flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PolicyVerdict {
    /// Policy satisfied; the request may resolve as approved.
    Satisfied,
    /// A rejection short-circuited evaluation.
    Rejected,
    /// More decisions are needed.
    Pending,
}

/// Evaluates a decision policy over an append-only decision list.
///
/// Any single rejection short-circuits approvals. Approving voters are
/// counted distinctly and only when listed as eligible. An empty eligible
/// list never satisfies any policy.
#[must_use]
pub fn evaluate_policy(
    policy: ApprovalPolicy,
    approvers: &[ApproverId],
    decisions: &[ApprovalDecision],
) -> PolicyVerdict {
    if decisions.iter().any(|decision| !decision.approved) {
        return PolicyVerdict::Rejected;
    }
    if approvers.is_empty() {
        return PolicyVerdict::Pending;
    }
    let eligible: BTreeSet<&ApproverId> = approvers.iter().collect();
    let approving: BTreeSet<&ApproverId> = decisions
        .iter()
        .filter(|decision| decision.approved && eligible.contains(&decision.decided_by))
        .map(|decision| &decision.decided_by)
        .collect();
    let satisfied = match policy {
        ApprovalPolicy::Any => !approving.is_empty(),
        ApprovalPolicy::All => approving.len() == eligible.len(),
        ApprovalPolicy::Majority => approving.len() * 2 > eligible.len(),
    };
    if satisfied {
        PolicyVerdict::Satisfied
    } else {
        PolicyVerdict::Pending
    }
}

// ============================================================================
// SECTION: Escalation Policy
// ============================================================================

/// Corrective action when a request goes unanswered past its deadline.
///
/// # Invariants
/// - Variants are stable for serialization and contract matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EscalationAction {
    /// Resolve the request as timed out.
    AutoReject,
    /// Widen the approver set and extend the deadline.
    Escalate,
    /// Notify admins without mutating the request.
    NotifyAdmin,
}

impl EscalationAction {
    /// Returns a stable label for the action.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::AutoReject => "auto_reject",
            Self::Escalate => "escalate",
            Self::NotifyAdmin => "notify_admin",
        }
    }
}

/// Timeout and corrective action attached at request creation.
///
/// # Invariants
/// - Read-only after attachment; escalation mutates only the request's
///   mutable fields, never its own policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EscalationPolicy {
    /// Deadline extension granted per escalation, in milliseconds.
    pub timeout_ms: u64,
    /// Action taken when the deadline passes.
    pub action: EscalationAction,
    /// Next-level approvers for the `escalate` action.
    #[serde(default)]
    pub escalate_to: Vec<ApproverId>,
    /// Admins notified by the `notify_admin` action.
    #[serde(default)]
    pub notify_admins: Vec<ApproverId>,
    /// Escalation cap forcing a terminal timeout.
    pub max_escalations: Option<u32>,
}

// ============================================================================
// SECTION: Request Context
// ============================================================================

/// Risk classification used for human-facing rendering.
///
/// # Invariants
/// - Variants are stable for serialization and rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    /// Routine change.
    Low,
    /// Elevated but bounded impact.
    Medium,
    /// Significant impact.
    High,
    /// Potentially destructive impact.
    Critical,
}

impl RiskLevel {
    /// Returns a stable label for the risk level.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Critical => "critical",
        }
    }
}

/// Human-facing request context.
///
/// # Invariants
/// - Used only for rendering; never consulted by decision logic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestContext {
    /// What the gated step intends to do.
    pub description: String,
    /// Risk classification of the gated action.
    pub risk_level: RiskLevel,
    /// Proposed file-level changes, when the action touches files.
    #[serde(default)]
    pub proposed_changes: Vec<ProposedChange>,
}

// ============================================================================
// SECTION: Approval Request
// ============================================================================

/// Creation parameters for an approval request.
///
/// # Invariants
/// - Identity fields must refer to the same tenant/run/step scope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewApprovalRequest {
    /// Run identifier.
    pub run_id: RunId,
    /// Step identifier.
    pub step_id: StepId,
    /// Tenant identifier.
    pub tenant_id: TenantId,
    /// Principal (usually an agent) that requested the approval.
    pub requested_by: String,
    /// Eligible approvers.
    pub approvers: Vec<ApproverId>,
    /// Decision policy.
    pub policy: ApprovalPolicy,
    /// Optional escalation policy.
    pub escalation: Option<EscalationPolicy>,
    /// Notification channels for the request.
    #[serde(default)]
    pub channels: Vec<NotificationChannel>,
    /// Optional correlation identifier.
    pub correlation_id: Option<CorrelationId>,
    /// Optional decision deadline.
    pub expires_at: Option<Timestamp>,
    /// Human-facing context.
    pub context: RequestContext,
}

/// Human-in-the-loop gating record.
///
/// # Invariants
/// - Created by the store; mutated only through store methods.
/// - `decisions` is append-only and frozen once `resolved_at` is set.
/// - `escalation_count` is monotonically increasing.
/// - `resolved_at` is set iff `status` is terminal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApprovalRequest {
    /// Request identifier assigned by the store.
    pub id: RequestId,
    /// Run identifier.
    pub run_id: RunId,
    /// Step identifier.
    pub step_id: StepId,
    /// Tenant identifier.
    pub tenant_id: TenantId,
    /// Principal that requested the approval.
    pub requested_by: String,
    /// Eligible approvers; grows on escalation.
    pub approvers: Vec<ApproverId>,
    /// Decision policy.
    pub policy: ApprovalPolicy,
    /// Lifecycle status.
    pub status: ApprovalStatus,
    /// Append-only decision log.
    pub decisions: Vec<ApprovalDecision>,
    /// Optional escalation policy attached at creation.
    pub escalation: Option<EscalationPolicy>,
    /// Number of escalations performed.
    pub escalation_count: u32,
    /// Notification channels for the request.
    pub channels: Vec<NotificationChannel>,
    /// Optional correlation identifier.
    pub correlation_id: Option<CorrelationId>,
    /// Creation time assigned by the store.
    pub created_at: Timestamp,
    /// Decision deadline; extended by escalation.
    pub expires_at: Option<Timestamp>,
    /// Resolution time; set exactly once at terminal transition.
    pub resolved_at: Option<Timestamp>,
    /// Human-facing context.
    pub context: RequestContext,
}

impl ApprovalRequest {
    /// Returns true when the request has reached a terminal status.
    #[must_use]
    pub const fn is_resolved(&self) -> bool {
        self.status.is_terminal()
    }
}
