// crates/waypoint-notify/src/lib.rs
// ============================================================================
// Module: Waypoint Notify Library
// Description: Notification message construction and reference notifiers.
// Purpose: Render approval lifecycle events and deliver them per channel.
// Dependencies: waypoint-core, serde_json, time, tokio
// ============================================================================

//! ## Overview
//! Waypoint Notify renders approval lifecycle events into
//! [`waypoint_core::NotificationMessage`] values and provides the reference
//! [`waypoint_core::Notifier`] implementations. Fan-out semantics (skip
//! disabled channels, isolate per-channel failures) live on the trait's
//! provided `send_to_all`; this crate supplies the message construction
//! and concrete delivery backends.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod message;
pub mod notifier;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use message::admin_alert;
pub use message::approval_created;
pub use message::approval_escalated;
pub use message::approval_resolved;
pub use message::priority_for;
pub use notifier::ChannelNotifier;
pub use notifier::LogNotifier;
pub use notifier::NotificationDelivery;
