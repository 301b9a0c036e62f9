// crates/waypoint-approvals/src/gate.rs
// ============================================================================
// Module: Approval Gate
// Description: Blocking approval wait loop with escalation and notification.
// Purpose: Hold a pipeline step until humans resolve its approval request.
// Dependencies: waypoint-core, waypoint-notify, tokio, serde, thiserror
// ============================================================================

//! ## Overview
//! The approval gate creates an approval request bound to one (run, step)
//! identity, notifies approvers, and suspends the calling step until the
//! request reaches a terminal state. Escalation checks run on every poll
//! tick. Decisions may arrive from a different logical context (a webhook
//! handler, a CLI); the waiter and the decider communicate only through
//! the store. Decisions recorded through this gate instance additionally
//! interrupt the sleep so they are observed without waiting out the tick;
//! decisions recorded elsewhere are observed on the next tick, a latency
//! bounded by `poll_interval_ms`.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;
use tokio::sync::Notify;
use waypoint_core::ApprovalDecision;
use waypoint_core::ApprovalPolicy;
use waypoint_core::ApprovalRequest;
use waypoint_core::ApprovalStatus;
use waypoint_core::ApprovalStore;
use waypoint_core::ApproverId;
use waypoint_core::Clock;
use waypoint_core::CorrelationId;
use waypoint_core::EscalationPolicy;
use waypoint_core::GateMetrics;
use waypoint_core::NewApprovalRequest;
use waypoint_core::NoopMetrics;
use waypoint_core::NotificationChannel;
use waypoint_core::Notifier;
use waypoint_core::PolicyVerdict;
use waypoint_core::RequestContext;
use waypoint_core::RequestId;
use waypoint_core::RunId;
use waypoint_core::StepId;
use waypoint_core::StoreError;
use waypoint_core::SystemClock;
use waypoint_core::TenantId;
use waypoint_core::evaluate_policy;
use waypoint_notify::message;

use crate::escalation::EscalationDecision;
use crate::escalation::EscalationOutcome;
use crate::escalation::check_escalation;
use crate::escalation::perform_escalation;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default poll interval between wait ticks.
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 1_000;
/// Default wait bound when neither config nor escalation provides one.
pub const DEFAULT_MAX_WAIT_MS: u64 = 60 * 60 * 1_000;

// ============================================================================
// SECTION: Gate Errors
// ============================================================================

/// Errors returned by the approval gate.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Error)]
pub enum GateError {
    /// Store operation failed.
    #[error("approval store error: {0}")]
    Store(#[from] StoreError),
    /// Request disappeared mid-wait; a collaborator contract violation.
    #[error("approval request vanished mid-wait: {id}")]
    RequestVanished {
        /// Identifier of the vanished request.
        id: RequestId,
    },
    /// No request exists for the gate's run/step identity.
    #[error("no approval request exists for {run_id}/{step_id}")]
    NoRequest {
        /// Run identifier of the gate.
        run_id: RunId,
        /// Step identifier of the gate.
        step_id: StepId,
    },
    /// Gate configuration failed validation.
    #[error("invalid gate config: {0}")]
    InvalidConfig(String),
}

// ============================================================================
// SECTION: Configuration
// ============================================================================

/// Approval gate wait configuration.
///
/// # Invariants
/// - `poll_interval_ms >= 1` and, when set, `max_wait_ms >= poll_interval_ms`
///   (enforced by [`GateConfig::validate`]).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct GateConfig {
    /// Sleep between poll ticks, in milliseconds.
    pub poll_interval_ms: u64,
    /// Overall wait bound; defaults at wait time to the escalation timeout
    /// or [`DEFAULT_MAX_WAIT_MS`].
    pub max_wait_ms: Option<u64>,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            max_wait_ms: None,
        }
    }
}

impl GateConfig {
    /// Validates the configuration, failing closed on degenerate values.
    ///
    /// # Errors
    ///
    /// Returns [`GateError::InvalidConfig`] when the poll interval is zero
    /// or the wait bound is shorter than one poll interval.
    pub fn validate(&self) -> Result<(), GateError> {
        if self.poll_interval_ms == 0 {
            return Err(GateError::InvalidConfig("poll_interval_ms must be >= 1".to_string()));
        }
        if let Some(max_wait) = self.max_wait_ms
            && max_wait < self.poll_interval_ms
        {
            return Err(GateError::InvalidConfig(format!(
                "max_wait_ms ({max_wait}) must be >= poll_interval_ms ({})",
                self.poll_interval_ms
            )));
        }
        Ok(())
    }
}

/// Identity and policy for the request a gate creates.
///
/// # Invariants
/// - One gate instance serves exactly one (run, step) identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GateSpec {
    /// Run identifier.
    pub run_id: RunId,
    /// Step identifier.
    pub step_id: StepId,
    /// Tenant identifier.
    pub tenant_id: TenantId,
    /// Principal requesting the approval.
    pub requested_by: String,
    /// Eligible approvers.
    pub approvers: Vec<ApproverId>,
    /// Decision policy.
    pub policy: ApprovalPolicy,
    /// Optional escalation policy.
    pub escalation: Option<EscalationPolicy>,
    /// Notification channels.
    pub channels: Vec<NotificationChannel>,
    /// Optional correlation identifier.
    pub correlation_id: Option<CorrelationId>,
    /// Human-facing context.
    pub context: RequestContext,
}

// ============================================================================
// SECTION: Gate Outcome
// ============================================================================

/// Result of one blocking wait.
///
/// # Invariants
/// - `approved` is true iff the request resolved as approved.
/// - `timed_out` is true when the gate returned on a timeout, either the
///   request's own or the gate's overall wait bound.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GateOutcome {
    /// Whether the request resolved approved.
    pub approved: bool,
    /// Final request snapshot.
    pub request: ApprovalRequest,
    /// Human-readable outcome reason suitable for direct display.
    pub reason: Option<String>,
    /// Whether the gate returned on a timeout.
    pub timed_out: bool,
    /// Whether the request escalated at least once.
    pub escalated: bool,
}

// ============================================================================
// SECTION: Approval Gate
// ============================================================================

/// Blocking approval gate bound to one (run, step) identity.
///
/// # Invariants
/// - Holds no request state of its own; the store is the single source of
///   truth shared with decision contexts.
/// - Receives its store, notifier, metrics, and clock explicitly; no
///   ambient globals.
pub struct ApprovalGate {
    /// Approval store shared with decision contexts.
    store: Arc<dyn ApprovalStore>,
    /// Notifier used for created/escalated/resolved messages.
    notifier: Arc<dyn Notifier>,
    /// Metrics sink for gate activity.
    metrics: Arc<dyn GateMetrics>,
    /// Clock for deadlines and decision timestamps.
    clock: Arc<dyn Clock>,
    /// Wait configuration.
    config: GateConfig,
    /// Request identity and policy.
    spec: GateSpec,
    /// Wake signal interrupting the poll sleep after local decisions.
    wake: Notify,
}

impl ApprovalGate {
    /// Creates a gate with default config, no-op metrics, and the system
    /// clock.
    #[must_use]
    pub fn new(store: Arc<dyn ApprovalStore>, notifier: Arc<dyn Notifier>, spec: GateSpec) -> Self {
        Self {
            store,
            notifier,
            metrics: Arc::new(NoopMetrics),
            clock: Arc::new(SystemClock),
            config: GateConfig::default(),
            spec,
            wake: Notify::new(),
        }
    }

    /// Replaces the wait configuration.
    #[must_use]
    pub fn with_config(mut self, config: GateConfig) -> Self {
        self.config = config;
        self
    }

    /// Replaces the metrics sink.
    #[must_use]
    pub fn with_metrics(mut self, metrics: Arc<dyn GateMetrics>) -> Self {
        self.metrics = metrics;
        self
    }

    /// Replaces the clock.
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Creates the request and blocks until it reaches a terminal state.
    ///
    /// The wait is bounded by `max_wait_ms` (defaulting to the escalation
    /// timeout, else [`DEFAULT_MAX_WAIT_MS`]); when the bound elapses the
    /// gate forces one final escalation pass and returns its outcome.
    ///
    /// # Errors
    ///
    /// Returns [`GateError::InvalidConfig`] on degenerate configuration,
    /// [`GateError::RequestVanished`] when the request disappears mid-wait,
    /// and [`GateError::Store`] on store failures.
    pub async fn wait_for_approval(&self) -> Result<GateOutcome, GateError> {
        self.config.validate()?;
        let now = self.clock.now();
        let expires_at = self
            .spec
            .escalation
            .as_ref()
            .map(|policy| now.saturating_add_millis(policy.timeout_ms));
        let request = self.store.create_request(NewApprovalRequest {
            run_id: self.spec.run_id.clone(),
            step_id: self.spec.step_id.clone(),
            tenant_id: self.spec.tenant_id,
            requested_by: self.spec.requested_by.clone(),
            approvers: self.spec.approvers.clone(),
            policy: self.spec.policy,
            escalation: self.spec.escalation.clone(),
            channels: self.spec.channels.clone(),
            correlation_id: self.spec.correlation_id.clone(),
            expires_at,
            context: self.spec.context.clone(),
        })?;
        let _ = self.notifier.send_to_all(&request.channels, &message::approval_created(&request));

        let poll = Duration::from_millis(self.config.poll_interval_ms);
        let max_wait = self
            .config
            .max_wait_ms
            .or_else(|| self.spec.escalation.as_ref().map(|policy| policy.timeout_ms))
            .unwrap_or(DEFAULT_MAX_WAIT_MS);
        let started = tokio::time::Instant::now();
        let deadline = started + Duration::from_millis(max_wait);

        loop {
            let current = self.reload(&request.id)?;
            self.metrics.record_poll(&current.id);
            if current.status.is_terminal() {
                return Ok(self.finish(current, false, started));
            }

            if let Some(outcome) = self.run_escalation_pass(&current)? {
                match outcome {
                    EscalationOutcome::TimedOut => {
                        let resolved = self.reload(&request.id)?;
                        let _ = self.notifier.send_to_all(
                            &resolved.channels,
                            &message::approval_resolved(&resolved, None),
                        );
                        return Ok(self.finish(resolved, true, started));
                    }
                    EscalationOutcome::Escalated {
                        level,
                    } => {
                        let escalated = self.reload(&request.id)?;
                        let _ = self.notifier.send_to_all(
                            &escalated.channels,
                            &message::approval_escalated(&escalated, level),
                        );
                    }
                    EscalationOutcome::AdminsToNotify(admins) => {
                        let _ = self.notifier.send_to_all(
                            &current.channels,
                            &message::admin_alert(&current, &admins),
                        );
                    }
                    EscalationOutcome::Held => {}
                }
            }

            if tokio::time::Instant::now() >= deadline {
                return self.final_escalation_pass(&request.id, started);
            }
            let remaining = deadline.saturating_duration_since(tokio::time::Instant::now());
            let tick = poll.min(remaining.max(Duration::from_millis(1)));
            tokio::select! {
                () = self.wake.notified() => {}
                () = tokio::time::sleep(tick) => {}
            }
        }
    }

    /// Records an approval decision and applies the policy.
    ///
    /// # Errors
    ///
    /// Returns [`GateError::NoRequest`] when no request exists for the
    /// gate's identity, and [`GateError::Store`] when the request is
    /// already resolved or the store fails.
    pub fn approve(
        &self,
        decided_by: ApproverId,
        reason: Option<String>,
    ) -> Result<ApprovalRequest, GateError> {
        let request = self.current()?;
        let now = self.clock.now();
        self.store.add_decision(&request.id, ApprovalDecision {
            approved: true,
            decided_by,
            reason,
            decided_at: now,
        })?;
        let current = self.reload(&request.id)?;
        match evaluate_policy(current.policy, &current.approvers, &current.decisions) {
            PolicyVerdict::Satisfied => {
                self.resolve(&current.id, ApprovalStatus::Approved)?;
            }
            PolicyVerdict::Rejected => {
                self.resolve(&current.id, ApprovalStatus::Rejected)?;
            }
            PolicyVerdict::Pending => {}
        }
        self.wake.notify_one();
        self.reload(&request.id)
    }

    /// Records a rejection; a single rejection terminates the request.
    ///
    /// # Errors
    ///
    /// Returns [`GateError::NoRequest`] when no request exists for the
    /// gate's identity, and [`GateError::Store`] when the request is
    /// already resolved or the store fails.
    pub fn reject(
        &self,
        decided_by: ApproverId,
        reason: Option<String>,
    ) -> Result<ApprovalRequest, GateError> {
        let request = self.current()?;
        let now = self.clock.now();
        self.store.add_decision(&request.id, ApprovalDecision {
            approved: false,
            decided_by,
            reason,
            decided_at: now,
        })?;
        self.resolve(&request.id, ApprovalStatus::Rejected)?;
        self.wake.notify_one();
        self.reload(&request.id)
    }

    /// Forces a terminal `cancelled` state with no decision recorded.
    ///
    /// Idempotent: cancelling an already-terminal request returns it
    /// unchanged and does not touch `resolved_at`.
    ///
    /// # Errors
    ///
    /// Returns [`GateError::NoRequest`] when no request exists for the
    /// gate's identity, and [`GateError::Store`] on store failures.
    pub fn cancel(&self) -> Result<ApprovalRequest, GateError> {
        let request = self.current()?;
        if request.status.is_terminal() {
            return Ok(request);
        }
        self.store.update_status(&request.id, ApprovalStatus::Cancelled)?;
        self.store.set_resolved(&request.id, self.clock.now())?;
        self.wake.notify_one();
        self.reload(&request.id)
    }

    /// Runs one escalation check-and-perform pass.
    fn run_escalation_pass(
        &self,
        current: &ApprovalRequest,
    ) -> Result<Option<EscalationOutcome>, GateError> {
        let now = self.clock.now();
        let decision = check_escalation(current, now);
        if decision == EscalationDecision::Hold {
            return Ok(None);
        }
        if let Some(action) = decision.action() {
            self.metrics.record_escalation(&current.id, action);
        }
        let outcome = perform_escalation(self.store.as_ref(), current, &decision, now)?;
        Ok(Some(outcome))
    }

    /// Forces the final escalation pass once the wait bound elapses.
    fn final_escalation_pass(
        &self,
        id: &RequestId,
        started: tokio::time::Instant,
    ) -> Result<GateOutcome, GateError> {
        let current = self.reload(id)?;
        if current.status.is_terminal() {
            return Ok(self.finish(current, true, started));
        }
        if let Some(EscalationOutcome::TimedOut | EscalationOutcome::Escalated { .. }) =
            self.run_escalation_pass(&current)?
        {
            let resolved = self.reload(id)?;
            if resolved.status.is_terminal() {
                let _ = self
                    .notifier
                    .send_to_all(&resolved.channels, &message::approval_resolved(&resolved, None));
            }
            return Ok(self.finish(resolved, true, started));
        }
        Ok(self.finish(current, true, started))
    }

    /// Loads the gate's request by run/step identity.
    fn current(&self) -> Result<ApprovalRequest, GateError> {
        self.store.get_by_run_and_step(&self.spec.run_id, &self.spec.step_id)?.ok_or_else(|| {
            GateError::NoRequest {
                run_id: self.spec.run_id.clone(),
                step_id: self.spec.step_id.clone(),
            }
        })
    }

    /// Reloads a request by id, treating absence as a contract violation.
    fn reload(&self, id: &RequestId) -> Result<ApprovalRequest, GateError> {
        self.store.get_request(id)?.ok_or_else(|| GateError::RequestVanished {
            id: id.clone(),
        })
    }

    /// Resolves a request into a terminal status and notifies.
    fn resolve(&self, id: &RequestId, status: ApprovalStatus) -> Result<(), GateError> {
        self.store.update_status(id, status)?;
        self.store.set_resolved(id, self.clock.now())?;
        let resolved = self.reload(id)?;
        let decision = resolved.decisions.last().cloned();
        let _ = self
            .notifier
            .send_to_all(&resolved.channels, &message::approval_resolved(&resolved, decision.as_ref()));
        Ok(())
    }

    /// Builds the outcome record for a finished wait.
    fn finish(
        &self,
        request: ApprovalRequest,
        timed_out: bool,
        started: tokio::time::Instant,
    ) -> GateOutcome {
        let waited = started.elapsed();
        self.metrics.record_outcome(&request.id, request.status, waited);
        let approved = request.status == ApprovalStatus::Approved;
        let escalated = request.escalation_count > 0;
        let reason = outcome_reason(&request);
        GateOutcome {
            approved,
            reason,
            timed_out: timed_out || request.status == ApprovalStatus::Timeout,
            escalated,
            request,
        }
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Renders a human-readable outcome reason for a finished request.
fn outcome_reason(request: &ApprovalRequest) -> Option<String> {
    match request.status {
        ApprovalStatus::Approved | ApprovalStatus::Rejected => {
            request.decisions.last().map(|decision| {
                decision.reason.clone().unwrap_or_else(|| {
                    format!(
                        "{} by {}",
                        request.status.as_str(),
                        decision.decided_by.as_str()
                    )
                })
            })
        }
        ApprovalStatus::Timeout => {
            Some("no decision was reached before the deadline".to_string())
        }
        ApprovalStatus::Cancelled => Some("request was cancelled".to_string()),
        ApprovalStatus::Pending | ApprovalStatus::Escalated => {
            Some("wait bound elapsed without a decision".to_string())
        }
    }
}
