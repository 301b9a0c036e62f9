// crates/waypoint-core/src/core/notify.rs
// ============================================================================
// Module: Waypoint Notification Types
// Description: Transport-agnostic channel, message, and outcome records.
// Purpose: Define the delivery contract between the gate and notifiers.
// Dependencies: crate::core::{identifiers, time}, serde, serde_json
// ============================================================================

//! ## Overview
//! Notification types are the wire contract between the approval gate and
//! delivery collaborators. Channel configuration is opaque per-kind JSON;
//! the core never interprets it. Outcomes are returned per channel so
//! fan-out can isolate failures.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;

use crate::core::identifiers::CorrelationId;
use crate::core::identifiers::RequestId;
use crate::core::identifiers::RunId;
use crate::core::time::Timestamp;

// ============================================================================
// SECTION: Channels
// ============================================================================

/// Supported notification channel kinds.
///
/// # Invariants
/// - Variants are stable for serialization and contract matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChannelKind {
    /// Slack workspace delivery.
    Slack,
    /// Email delivery.
    Email,
    /// Webhook POST delivery.
    Webhook,
    /// In-application inbox delivery.
    InApp,
}

impl ChannelKind {
    /// Returns a stable label for the channel kind.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Slack => "slack",
            Self::Email => "email",
            Self::Webhook => "webhook",
            Self::InApp => "in_app",
        }
    }
}

/// One configured notification channel.
///
/// # Invariants
/// - `config` is opaque per-kind data; the core never interprets it.
/// - Disabled channels are skipped by fan-out without error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationChannel {
    /// Channel kind.
    pub kind: ChannelKind,
    /// Opaque per-kind configuration.
    pub config: Value,
    /// Whether the channel participates in fan-out.
    pub enabled: bool,
}

// ============================================================================
// SECTION: Messages
// ============================================================================

/// Delivery priority derived from risk and lifecycle action.
///
/// # Invariants
/// - Variants are ordered from least to most urgent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationPriority {
    /// Informational delivery.
    Low,
    /// Default delivery priority.
    Normal,
    /// Elevated delivery priority.
    High,
    /// Immediate attention required.
    Urgent,
}

impl NotificationPriority {
    /// Returns a stable label for the priority.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Normal => "normal",
            Self::High => "high",
            Self::Urgent => "urgent",
        }
    }
}

/// Rendered notification message.
///
/// # Invariants
/// - `body` is markdown; transports unable to render it deliver it verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationMessage {
    /// Subject line with risk marker.
    pub subject: String,
    /// Markdown body.
    pub body: String,
    /// Approval request the message concerns.
    pub request_id: RequestId,
    /// Run the request belongs to.
    pub run_id: RunId,
    /// Recipient list for the delivery.
    pub recipients: Vec<String>,
    /// Delivery priority.
    pub priority: NotificationPriority,
    /// Optional correlation identifier.
    pub correlation_id: Option<CorrelationId>,
}

// ============================================================================
// SECTION: Outcomes
// ============================================================================

/// Per-channel delivery outcome.
///
/// # Invariants
/// - `error` is set iff `success` is false.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationOutcome {
    /// Whether delivery succeeded.
    pub success: bool,
    /// Channel kind the delivery targeted.
    pub kind: ChannelKind,
    /// Recipients the delivery targeted.
    pub recipients: Vec<String>,
    /// Failure detail when delivery failed.
    pub error: Option<String>,
    /// Delivery attempt time.
    pub sent_at: Timestamp,
    /// External message identifier when the transport returns one.
    pub message_id: Option<String>,
}
