// crates/waypoint-notify/src/notifier.rs
// ============================================================================
// Module: Reference Notifiers
// Description: Log-record and channel-based Notifier implementations.
// Purpose: Provide audit-grade reference delivery without external transports.
// Dependencies: waypoint-core, serde_json, tokio, std
// ============================================================================

//! ## Overview
//! Reference [`Notifier`] implementations. [`LogNotifier`] writes one JSON
//! record per delivery and is the audit-grade reference; production
//! transports (Slack, email, webhook) are external collaborators behind
//! the same contract. [`ChannelNotifier`] pushes deliveries into a bounded
//! channel for in-process consumers and tests.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::io::Write;
use std::sync::Mutex;
use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering;

use serde_json::json;
use waypoint_core::NotificationChannel;
use waypoint_core::NotificationMessage;
use waypoint_core::NotificationOutcome;
use waypoint_core::Notifier;
use waypoint_core::NotifyError;
use waypoint_core::Timestamp;

// ============================================================================
// SECTION: Outcome Factory
// ============================================================================

/// Builds sequential delivery outcomes for reference notifiers.
#[derive(Debug)]
struct OutcomeFactory {
    /// Notifier name embedded in message identifiers.
    name: String,
    /// Monotonic counter for deterministic identifiers.
    counter: AtomicU64,
}

impl OutcomeFactory {
    /// Creates a factory with the provided notifier name.
    fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            counter: AtomicU64::new(0),
        }
    }

    /// Returns the next successful outcome for a delivery.
    fn next(&self, channel: &NotificationChannel, message: &NotificationMessage) -> NotificationOutcome {
        let seq = self.counter.fetch_add(1, Ordering::Relaxed) + 1;
        NotificationOutcome {
            success: true,
            kind: channel.kind,
            recipients: message.recipients.clone(),
            error: None,
            sent_at: Timestamp::now(),
            message_id: Some(format!("{}-{seq}", self.name)),
        }
    }
}

// ============================================================================
// SECTION: Log Notifier
// ============================================================================

/// Log-only notifier writing one JSON record per delivery.
pub struct LogNotifier<W: Write + Send> {
    /// Output writer for delivery records.
    writer: Mutex<W>,
    /// Outcome factory for deterministic message identifiers.
    outcomes: OutcomeFactory,
}

impl<W: Write + Send> LogNotifier<W> {
    /// Creates a log notifier with the default name.
    pub fn new(writer: W) -> Self {
        Self {
            writer: Mutex::new(writer),
            outcomes: OutcomeFactory::new("notify-log"),
        }
    }

    /// Creates a log notifier with a custom name.
    pub fn with_name(writer: W, name: impl Into<String>) -> Self {
        Self {
            writer: Mutex::new(writer),
            outcomes: OutcomeFactory::new(name),
        }
    }
}

impl<W: Write + Send> Notifier for LogNotifier<W> {
    fn send(
        &self,
        channel: &NotificationChannel,
        message: &NotificationMessage,
    ) -> Result<NotificationOutcome, NotifyError> {
        let outcome = self.outcomes.next(channel, message);
        let record = json!({
            "message_id": outcome.message_id,
            "channel": channel.kind.as_str(),
            "subject": message.subject,
            "request_id": message.request_id,
            "run_id": message.run_id,
            "recipients": message.recipients,
            "priority": message.priority.as_str(),
            "sent_at": outcome.sent_at,
        });
        let mut guard = self
            .writer
            .lock()
            .map_err(|_| NotifyError::LogWriteFailed("log writer mutex poisoned".to_string()))?;
        serde_json::to_writer(&mut *guard, &record)
            .map_err(|err| NotifyError::LogWriteFailed(err.to_string()))?;
        guard.write_all(b"\n").map_err(|err| NotifyError::LogWriteFailed(err.to_string()))?;
        drop(guard);
        Ok(outcome)
    }
}

// ============================================================================
// SECTION: Channel Notifier
// ============================================================================

/// Delivery record emitted by [`ChannelNotifier`].
///
/// # Invariants
/// - `outcome` corresponds to the provided channel and message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationDelivery {
    /// Channel the delivery targeted.
    pub channel: NotificationChannel,
    /// Message that was delivered.
    pub message: NotificationMessage,
    /// Delivery outcome.
    pub outcome: NotificationOutcome,
}

/// Channel-based notifier for in-process consumers.
pub struct ChannelNotifier {
    /// Bounded delivery channel.
    sender: tokio::sync::mpsc::Sender<NotificationDelivery>,
    /// Outcome factory for deterministic message identifiers.
    outcomes: OutcomeFactory,
}

impl ChannelNotifier {
    /// Creates a channel notifier with the default name.
    #[must_use]
    pub fn new(sender: tokio::sync::mpsc::Sender<NotificationDelivery>) -> Self {
        Self {
            sender,
            outcomes: OutcomeFactory::new("notify-channel"),
        }
    }
}

impl Notifier for ChannelNotifier {
    fn send(
        &self,
        channel: &NotificationChannel,
        message: &NotificationMessage,
    ) -> Result<NotificationOutcome, NotifyError> {
        let outcome = self.outcomes.next(channel, message);
        self.sender
            .try_send(NotificationDelivery {
                channel: channel.clone(),
                message: message.clone(),
                outcome: outcome.clone(),
            })
            .map_err(|err| NotifyError::DeliveryFailed(err.to_string()))?;
        Ok(outcome)
    }
}
