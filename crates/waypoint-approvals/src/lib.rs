// crates/waypoint-approvals/src/lib.rs
// ============================================================================
// Module: Waypoint Approvals Library
// Description: Approval store, escalation engine, and blocking approval gate.
// Purpose: Hold sensitive pipeline steps until humans resolve them.
// Dependencies: waypoint-core, waypoint-notify, tokio
// ============================================================================

//! ## Overview
//! Waypoint Approvals implements the human-in-the-loop control plane: the
//! reference in-memory [`waypoint_core::ApprovalStore`], the escalation
//! engine (pure [`check_escalation`] plus effectful [`perform_escalation`]),
//! and the [`ApprovalGate`] that blocks a step until its request resolves.
//! Invariants:
//! - The store is the only state shared between waiter and deciders.
//! - Escalation with `max_escalations` set always terminates.
//! - Cancellation is cooperative and observed within one poll interval.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod escalation;
pub mod gate;
pub mod store;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use escalation::EscalationDecision;
pub use escalation::EscalationOutcome;
pub use escalation::check_escalation;
pub use escalation::perform_escalation;
pub use gate::ApprovalGate;
pub use gate::DEFAULT_MAX_WAIT_MS;
pub use gate::DEFAULT_POLL_INTERVAL_MS;
pub use gate::GateConfig;
pub use gate::GateError;
pub use gate::GateOutcome;
pub use gate::GateSpec;
pub use store::InMemoryApprovalStore;
