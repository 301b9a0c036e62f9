// crates/waypoint-approvals/src/escalation.rs
// ============================================================================
// Module: Escalation Engine
// Description: Pure escalation decision plus the effectful store executor.
// Purpose: Drive timeout handling for unanswered approval requests.
// Dependencies: waypoint-core
// ============================================================================

//! ## Overview
//! Escalation is split into a pure decision function and an effectful
//! executor. [`check_escalation`] never touches the store and takes `now`
//! explicitly; [`perform_escalation`] applies a decision through store
//! mutations. The `max_escalations` circuit breaker forces `auto_reject`
//! so bounded policies always terminate.
//!
//! The `notify_admin` action deliberately performs no status mutation: a
//! request under that action stays pending until a human acts or a later
//! check forces a terminal outcome. A notify-admin policy without
//! `max_escalations` can therefore keep a request pending forever; this
//! mirrors the behavior the gate was specified against and is surfaced
//! here rather than silently changed.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeSet;

use waypoint_core::ApprovalRequest;
use waypoint_core::ApprovalStatus;
use waypoint_core::ApprovalStore;
use waypoint_core::ApproverId;
use waypoint_core::EscalationAction;
use waypoint_core::StoreError;
use waypoint_core::Timestamp;

// ============================================================================
// SECTION: Decisions
// ============================================================================

/// Pure escalation decision for one poll tick.
///
/// # Invariants
/// - Variants are exhaustive for gate control flow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EscalationDecision {
    /// Nothing is due; keep waiting.
    Hold,
    /// Resolve the request as timed out.
    AutoReject,
    /// Widen the approver set with the next escalation level.
    Escalate {
        /// Next-level approvers from the policy.
        escalate_to: Vec<ApproverId>,
    },
    /// Notify admins without mutating the request.
    NotifyAdmin {
        /// Admins to notify.
        admins: Vec<ApproverId>,
    },
}

impl EscalationDecision {
    /// Returns the escalation action this decision executes, if any.
    #[must_use]
    pub const fn action(&self) -> Option<EscalationAction> {
        match self {
            Self::Hold => None,
            Self::AutoReject => Some(EscalationAction::AutoReject),
            Self::Escalate { .. } => Some(EscalationAction::Escalate),
            Self::NotifyAdmin { .. } => Some(EscalationAction::NotifyAdmin),
        }
    }
}

/// Effect applied by [`perform_escalation`].
///
/// # Invariants
/// - Variants are exhaustive for gate control flow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EscalationOutcome {
    /// No effect was applied.
    Held,
    /// Request resolved as `timeout` (terminal).
    TimedOut,
    /// Request re-entered the wait with a wider approver set.
    Escalated {
        /// Escalation count after the transition.
        level: u32,
    },
    /// Admins should be notified; the request stays pending.
    AdminsToNotify(Vec<ApproverId>),
}

// ============================================================================
// SECTION: Pure Check
// ============================================================================

/// Decides whether a request is due for escalation at `now`.
///
/// Holds when no policy or no expiry is attached, or the deadline has not
/// passed. Once `escalation_count` reaches `max_escalations` the decision
/// is forced to [`EscalationDecision::AutoReject`] regardless of the
/// configured action; this circuit breaker guarantees bounded policies
/// terminate.
#[must_use]
pub fn check_escalation(request: &ApprovalRequest, now: Timestamp) -> EscalationDecision {
    let Some(policy) = &request.escalation else {
        return EscalationDecision::Hold;
    };
    let Some(expires_at) = request.expires_at else {
        return EscalationDecision::Hold;
    };
    if now < expires_at {
        return EscalationDecision::Hold;
    }
    if let Some(max) = policy.max_escalations
        && request.escalation_count >= max
    {
        return EscalationDecision::AutoReject;
    }
    match policy.action {
        EscalationAction::AutoReject => EscalationDecision::AutoReject,
        EscalationAction::Escalate => EscalationDecision::Escalate {
            escalate_to: policy.escalate_to.clone(),
        },
        EscalationAction::NotifyAdmin => EscalationDecision::NotifyAdmin {
            admins: policy.notify_admins.clone(),
        },
    }
}

// ============================================================================
// SECTION: Effectful Executor
// ============================================================================

/// Applies an escalation decision through store mutations.
///
/// `Escalate` with an empty next-approver list degrades to `AutoReject`
/// since there is nowhere to escalate to. Mutations are ordered so a read
/// between them only ever observes a still-waiting request: approvers and
/// expiry land before the escalation count and the `escalated` status.
///
/// # Errors
///
/// Returns [`StoreError`] when a mutation targets a vanished request.
pub fn perform_escalation(
    store: &dyn ApprovalStore,
    request: &ApprovalRequest,
    decision: &EscalationDecision,
    now: Timestamp,
) -> Result<EscalationOutcome, StoreError> {
    match decision {
        EscalationDecision::Hold => Ok(EscalationOutcome::Held),
        EscalationDecision::AutoReject => {
            apply_auto_reject(store, request, now)?;
            Ok(EscalationOutcome::TimedOut)
        }
        EscalationDecision::Escalate {
            escalate_to,
        } => {
            if escalate_to.is_empty() {
                apply_auto_reject(store, request, now)?;
                return Ok(EscalationOutcome::TimedOut);
            }
            let combined = union_approvers(&request.approvers, escalate_to);
            store.update_approvers(&request.id, combined)?;
            let extension = request.escalation.as_ref().map_or(0, |policy| policy.timeout_ms);
            store.update_expires_at(&request.id, Some(now.saturating_add_millis(extension)))?;
            let level = store.increment_escalation(&request.id)?;
            store.update_status(&request.id, ApprovalStatus::Escalated)?;
            Ok(EscalationOutcome::Escalated {
                level,
            })
        }
        EscalationDecision::NotifyAdmin {
            admins,
        } => Ok(EscalationOutcome::AdminsToNotify(admins.clone())),
    }
}

/// Resolves a request as timed out.
fn apply_auto_reject(
    store: &dyn ApprovalStore,
    request: &ApprovalRequest,
    now: Timestamp,
) -> Result<(), StoreError> {
    store.update_status(&request.id, ApprovalStatus::Timeout)?;
    store.set_resolved(&request.id, now)
}

/// Unions approver lists preserving order and de-duplicating.
fn union_approvers(current: &[ApproverId], added: &[ApproverId]) -> Vec<ApproverId> {
    let mut seen = BTreeSet::new();
    let mut combined = Vec::with_capacity(current.len() + added.len());
    for approver in current.iter().chain(added) {
        if seen.insert(approver.clone()) {
            combined.push(approver.clone());
        }
    }
    combined
}

// ============================================================================
// SECTION: Unit Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::union_approvers;
    use waypoint_core::ApproverId;

    /// Tests the union preserves first-seen order and drops duplicates.
    #[test]
    fn union_preserves_order_and_dedupes() {
        let current = vec![ApproverId::new("a1"), ApproverId::new("a2")];
        let added = vec![ApproverId::new("a2"), ApproverId::new("a3")];
        let combined = union_approvers(&current, &added);
        let labels: Vec<&str> = combined.iter().map(ApproverId::as_str).collect();
        assert_eq!(labels, vec!["a1", "a2", "a3"]);
    }
}
