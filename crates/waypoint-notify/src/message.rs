// crates/waypoint-notify/src/message.rs
// ============================================================================
// Module: Notification Messages
// Description: Renders approval lifecycle events into notification messages.
// Purpose: Produce risk-colored subjects and structured markdown bodies.
// Dependencies: waypoint-core, time
// ============================================================================

//! ## Overview
//! Message construction renders approval lifecycle events for humans: a
//! risk-marked subject line and a markdown body carrying the description,
//! risk level, itemized file changes, and action-specific detail. Priority
//! derives from risk level and upgrades to urgent for escalation and
//! timeout notifications regardless of configured risk.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt::Write as _;

use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;
use waypoint_core::ApprovalDecision;
use waypoint_core::ApprovalRequest;
use waypoint_core::ApprovalStatus;
use waypoint_core::ApproverId;
use waypoint_core::NotificationMessage;
use waypoint_core::NotificationPriority;
use waypoint_core::RiskLevel;
use waypoint_core::Timestamp;

// ============================================================================
// SECTION: Priority and Markers
// ============================================================================

/// Derives the delivery priority for a risk level.
#[must_use]
pub const fn priority_for(risk: RiskLevel) -> NotificationPriority {
    match risk {
        RiskLevel::Low => NotificationPriority::Low,
        RiskLevel::Medium => NotificationPriority::Normal,
        RiskLevel::High => NotificationPriority::High,
        RiskLevel::Critical => NotificationPriority::Urgent,
    }
}

/// Returns the subject marker for a risk level.
const fn risk_marker(risk: RiskLevel) -> &'static str {
    match risk {
        RiskLevel::Low => "[LOW RISK]",
        RiskLevel::Medium => "[MEDIUM RISK]",
        RiskLevel::High => "[HIGH RISK]",
        RiskLevel::Critical => "[CRITICAL RISK]",
    }
}

/// Renders a timestamp as RFC 3339, falling back to raw milliseconds.
fn render_time(timestamp: Timestamp) -> String {
    let nanos = i128::from(timestamp.as_unix_millis()) * 1_000_000;
    OffsetDateTime::from_unix_timestamp_nanos(nanos)
        .ok()
        .and_then(|datetime| datetime.format(&Rfc3339).ok())
        .unwrap_or_else(|| format!("{} ms", timestamp.as_unix_millis()))
}

// ============================================================================
// SECTION: Body Rendering
// ============================================================================

/// Renders the shared body header for a request.
fn body_header(request: &ApprovalRequest) -> String {
    let mut body = String::new();
    let _ = writeln!(body, "{}", request.context.description);
    let _ = writeln!(body);
    let _ = writeln!(body, "- Risk level: {}", request.context.risk_level.as_str());
    let _ = writeln!(body, "- Run: `{}`, step: `{}`", request.run_id, request.step_id);
    let _ = writeln!(body, "- Requested by: {}", request.requested_by);
    let _ = writeln!(body, "- Requested at: {}", render_time(request.created_at));
    body
}

/// Renders the itemized proposed-change list, when present.
fn body_changes(request: &ApprovalRequest) -> String {
    if request.context.proposed_changes.is_empty() {
        return String::new();
    }
    let mut body = String::new();
    let _ = writeln!(body);
    let _ = writeln!(body, "**Proposed changes**");
    for change in &request.context.proposed_changes {
        let _ = writeln!(
            body,
            "- `{}` {} (+{}/-{})",
            change.path,
            change.kind.as_str(),
            change.added_lines,
            change.deleted_lines
        );
    }
    body
}

/// Renders approver identifiers as a comma-separated list.
fn approver_list(approvers: &[ApproverId]) -> String {
    approvers.iter().map(ApproverId::as_str).collect::<Vec<_>>().join(", ")
}

// ============================================================================
// SECTION: Message Builders
// ============================================================================

/// Builds the "created" notification for a new request.
#[must_use]
pub fn approval_created(request: &ApprovalRequest) -> NotificationMessage {
    let mut body = body_header(request);
    let _ = writeln!(body, "- Policy: {}", request.policy.as_str());
    let _ = writeln!(body, "- Approvers: {}", approver_list(&request.approvers));
    if let Some(expires_at) = request.expires_at {
        let _ = writeln!(body, "- Expires at: {}", render_time(expires_at));
    }
    body.push_str(&body_changes(request));
    NotificationMessage {
        subject: format!(
            "{} Approval required: {}",
            risk_marker(request.context.risk_level),
            request.context.description
        ),
        body,
        request_id: request.id.clone(),
        run_id: request.run_id.clone(),
        recipients: request.approvers.iter().map(|approver| approver.as_str().to_string()).collect(),
        priority: priority_for(request.context.risk_level),
        correlation_id: request.correlation_id.clone(),
    }
}

/// Builds the escalation notification; always urgent.
#[must_use]
pub fn approval_escalated(request: &ApprovalRequest, level: u32) -> NotificationMessage {
    let mut body = body_header(request);
    let _ = writeln!(body, "- Escalation level: {level}");
    let _ = writeln!(body, "- Approvers now: {}", approver_list(&request.approvers));
    if let Some(expires_at) = request.expires_at {
        let _ = writeln!(body, "- New deadline: {}", render_time(expires_at));
    }
    body.push_str(&body_changes(request));
    NotificationMessage {
        subject: format!(
            "{} Approval escalated (level {level}): {}",
            risk_marker(request.context.risk_level),
            request.context.description
        ),
        body,
        request_id: request.id.clone(),
        run_id: request.run_id.clone(),
        recipients: request.approvers.iter().map(|approver| approver.as_str().to_string()).collect(),
        priority: NotificationPriority::Urgent,
        correlation_id: request.correlation_id.clone(),
    }
}

/// Builds the resolution notification for a terminal request.
///
/// Timeout resolutions upgrade to urgent regardless of configured risk.
#[must_use]
pub fn approval_resolved(
    request: &ApprovalRequest,
    decision: Option<&ApprovalDecision>,
) -> NotificationMessage {
    let mut body = body_header(request);
    let _ = writeln!(body, "- Outcome: {}", request.status.as_str());
    if let Some(decision) = decision {
        let _ = writeln!(body, "- Decided by: {}", decision.decided_by);
        if let Some(reason) = &decision.reason {
            let _ = writeln!(body, "- Reason: {reason}");
        }
    } else if request.status == ApprovalStatus::Timeout {
        let _ = writeln!(body, "- Reason: no decision was reached before the deadline");
    }
    let priority = if request.status == ApprovalStatus::Timeout {
        NotificationPriority::Urgent
    } else {
        priority_for(request.context.risk_level)
    };
    NotificationMessage {
        subject: format!(
            "{} Approval {}: {}",
            risk_marker(request.context.risk_level),
            request.status.as_str(),
            request.context.description
        ),
        body,
        request_id: request.id.clone(),
        run_id: request.run_id.clone(),
        recipients: request.approvers.iter().map(|approver| approver.as_str().to_string()).collect(),
        priority,
        correlation_id: request.correlation_id.clone(),
    }
}

/// Builds the admin alert for the `notify_admin` escalation action.
///
/// Addressed to the policy's admins and always urgent; the request itself
/// stays pending.
#[must_use]
pub fn admin_alert(request: &ApprovalRequest, admins: &[ApproverId]) -> NotificationMessage {
    let mut body = body_header(request);
    let _ = writeln!(body, "- Awaiting decision past its deadline; admin attention requested");
    body.push_str(&body_changes(request));
    NotificationMessage {
        subject: format!(
            "{} Approval overdue: {}",
            risk_marker(request.context.risk_level),
            request.context.description
        ),
        body,
        request_id: request.id.clone(),
        run_id: request.run_id.clone(),
        recipients: admins.iter().map(|admin| admin.as_str().to_string()).collect(),
        priority: NotificationPriority::Urgent,
        correlation_id: request.correlation_id.clone(),
    }
}
