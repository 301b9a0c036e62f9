// crates/waypoint-core/src/interfaces/mod.rs
// ============================================================================
// Module: Waypoint Interfaces
// Description: Backend-agnostic interfaces for storage, delivery, and execution.
// Purpose: Define the contract surfaces used by the approval gate and orchestrator.
// Dependencies: crate::core, thiserror
// ============================================================================

//! ## Overview
//! Interfaces define how Waypoint integrates with external systems without
//! embedding backend-specific details. Store implementations must be atomic
//! per request id and fail loudly on unknown targets; notifier
//! implementations must isolate per-channel failures during fan-out.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::time::Duration;

use thiserror::Error;

use crate::core::approval::ApprovalDecision;
use crate::core::approval::ApprovalRequest;
use crate::core::approval::ApprovalStatus;
use crate::core::approval::EscalationAction;
use crate::core::approval::NewApprovalRequest;
use crate::core::identifiers::ApproverId;
use crate::core::identifiers::RequestId;
use crate::core::identifiers::RunId;
use crate::core::identifiers::StepId;
use crate::core::identifiers::TenantId;
use crate::core::notify::NotificationChannel;
use crate::core::notify::NotificationMessage;
use crate::core::notify::NotificationOutcome;
use crate::core::notify::NotificationPriority;
use crate::core::outcome::StepOutput;
use crate::core::step::StepInput;
use crate::core::time::Timestamp;

// ============================================================================
// SECTION: Approval Store
// ============================================================================

/// Approval store errors.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
/// - `NotFound` indicates a collaborator contract violation for mutations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Target request does not exist.
    #[error("approval request not found: {id}")]
    NotFound {
        /// Request identifier that failed to resolve.
        id: RequestId,
    },
    /// Mutation conflicts with the request's current state.
    #[error("approval store conflict: {0}")]
    Conflict(String),
    /// Store data is invalid.
    #[error("approval store invalid data: {0}")]
    Invalid(String),
    /// Store I/O error.
    #[error("approval store io error: {0}")]
    Io(String),
}

/// Persistence contract for approval requests.
///
/// Implementations must make each method atomic per request id: no two
/// mutations to the same request may interleave to produce a corrupt
/// intermediate state. Every mutation fails loudly when the target request
/// does not exist.
pub trait ApprovalStore: Send + Sync {
    /// Creates a request, assigning its id and creation time.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the store cannot persist the request.
    fn create_request(&self, new_request: NewApprovalRequest)
    -> Result<ApprovalRequest, StoreError>;

    /// Loads a request by id.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when loading fails.
    fn get_request(&self, id: &RequestId) -> Result<Option<ApprovalRequest>, StoreError>;

    /// Loads a request by run and step identity.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when loading fails.
    fn get_by_run_and_step(
        &self,
        run_id: &RunId,
        step_id: &StepId,
    ) -> Result<Option<ApprovalRequest>, StoreError>;

    /// Updates the request status.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] when the request does not exist.
    fn update_status(&self, id: &RequestId, status: ApprovalStatus) -> Result<(), StoreError>;

    /// Appends a decision to the request's decision log.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] when the request does not exist and
    /// [`StoreError::Conflict`] when the request is already resolved.
    fn add_decision(&self, id: &RequestId, decision: ApprovalDecision) -> Result<(), StoreError>;

    /// Increments the escalation count and returns the new value.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] when the request does not exist.
    fn increment_escalation(&self, id: &RequestId) -> Result<u32, StoreError>;

    /// Replaces the eligible approver list.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] when the request does not exist.
    fn update_approvers(
        &self,
        id: &RequestId,
        approvers: Vec<ApproverId>,
    ) -> Result<(), StoreError>;

    /// Replaces the decision deadline.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] when the request does not exist.
    fn update_expires_at(
        &self,
        id: &RequestId,
        expires_at: Option<Timestamp>,
    ) -> Result<(), StoreError>;

    /// Marks the request resolved at the provided time.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] when the request does not exist.
    fn set_resolved(&self, id: &RequestId, resolved_at: Timestamp) -> Result<(), StoreError>;

    /// Lists non-terminal requests for a tenant.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when listing fails.
    fn list_pending(&self, tenant_id: TenantId) -> Result<Vec<ApprovalRequest>, StoreError>;

    /// Lists all requests for a run.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when listing fails.
    fn list_by_run(&self, run_id: &RunId) -> Result<Vec<ApprovalRequest>, StoreError>;
}

// ============================================================================
// SECTION: Notifier
// ============================================================================

/// Notifier errors.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Error)]
pub enum NotifyError {
    /// Channel delivery failed.
    #[error("notification delivery failed: {0}")]
    DeliveryFailed(String),
    /// Log notifier failed to write its record.
    #[error("notification log write failed: {0}")]
    LogWriteFailed(String),
}

/// Transport-agnostic notification delivery contract.
///
/// Implementations deliver to exactly one channel per [`Notifier::send`]
/// call; fan-out and failure isolation live in the provided
/// [`Notifier::send_to_all`].
pub trait Notifier: Send + Sync {
    /// Delivers a message to one channel.
    ///
    /// # Errors
    ///
    /// Returns [`NotifyError`] when delivery fails.
    fn send(
        &self,
        channel: &NotificationChannel,
        message: &NotificationMessage,
    ) -> Result<NotificationOutcome, NotifyError>;

    /// Delivers a message to every enabled channel.
    ///
    /// Disabled channels are skipped without producing an outcome.
    /// Per-channel failures are folded into failed outcomes so one bad
    /// channel cannot prevent delivery to the others.
    fn send_to_all(
        &self,
        channels: &[NotificationChannel],
        message: &NotificationMessage,
    ) -> Vec<NotificationOutcome> {
        channels
            .iter()
            .filter(|channel| channel.enabled)
            .map(|channel| {
                self.send(channel, message).unwrap_or_else(|err| NotificationOutcome {
                    success: false,
                    kind: channel.kind,
                    recipients: message.recipients.clone(),
                    error: Some(err.to_string()),
                    sent_at: Timestamp::now(),
                    message_id: None,
                })
            })
            .collect()
    }

    /// Sends a probe message through one channel.
    ///
    /// # Errors
    ///
    /// Returns [`NotifyError`] when the probe delivery fails.
    fn test_channel(
        &self,
        channel: &NotificationChannel,
    ) -> Result<NotificationOutcome, NotifyError> {
        let probe = NotificationMessage {
            subject: "Waypoint channel test".to_string(),
            body: "Channel connectivity probe.".to_string(),
            request_id: RequestId::new("channel-test"),
            run_id: RunId::new("channel-test"),
            recipients: Vec::new(),
            priority: NotificationPriority::Low,
            correlation_id: None,
        };
        self.send(channel, &probe)
    }
}

// ============================================================================
// SECTION: Clock
// ============================================================================

/// Wall-clock source for host-boundary components.
///
/// Pure decision functions take `now` explicitly; only the gate loop and
/// stores read a clock, and they read it through this trait so tests can
/// substitute deterministic time.
pub trait Clock: Send + Sync {
    /// Returns the current time.
    fn now(&self) -> Timestamp;
}

/// System wall-clock.
///
/// # Invariants
/// - Delegates to [`Timestamp::now`]; no caching.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        Timestamp::now()
    }
}

// ============================================================================
// SECTION: Gate Metrics
// ============================================================================

/// Metrics sink for approval gate activity.
///
/// Intentionally dependency-light so deployments can plug in Prometheus or
/// OpenTelemetry without redesign.
pub trait GateMetrics: Send + Sync {
    /// Records one poll tick for a waiting request.
    fn record_poll(&self, request_id: &RequestId);
    /// Records an escalation decision being executed.
    fn record_escalation(&self, request_id: &RequestId, action: EscalationAction);
    /// Records a terminal outcome and the total time waited.
    fn record_outcome(&self, request_id: &RequestId, status: ApprovalStatus, waited: Duration);
}

/// No-op metrics sink.
///
/// # Invariants
/// - Metrics are intentionally discarded.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopMetrics;

impl GateMetrics for NoopMetrics {
    fn record_poll(&self, _request_id: &RequestId) {}

    fn record_escalation(&self, _request_id: &RequestId, _action: EscalationAction) {}

    fn record_outcome(&self, _request_id: &RequestId, _status: ApprovalStatus, _waited: Duration) {}
}

// ============================================================================
// SECTION: Step Executor
// ============================================================================

/// Step executor errors.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Error)]
pub enum ExecutorError {
    /// Executor reported an error.
    #[error("step executor error: {0}")]
    Executor(String),
}

/// Consumed contract for the external step executor.
///
/// Waypoint never implements this trait; the orchestrator supplies an
/// implementation and validates its outputs through the validation layer.
pub trait StepExecutor {
    /// Executes one step attempt.
    ///
    /// # Errors
    ///
    /// Returns [`ExecutorError`] when the executor fails outside the
    /// envelope contract (envelope-level failures use result codes).
    fn execute(&self, input: &StepInput) -> Result<StepOutput, ExecutorError>;
}
