// crates/waypoint-core/src/core/time.rs
// ============================================================================
// Module: Waypoint Time Model
// Description: Canonical timestamp representation for envelopes and approvals.
// Purpose: Provide explicit time values so decision logic stays replayable.
// Dependencies: serde, std
// ============================================================================

//! ## Overview
//! Waypoint embeds explicit unix-millisecond timestamps in envelopes and
//! approval records. Pure decision functions (policy evaluation, escalation
//! checks) never read wall-clock time; callers pass `now` explicitly.
//! [`Timestamp::now`] exists for the host boundary only: the gate loop and
//! store creation paths.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use serde::Deserialize;
use serde::Serialize;

// ============================================================================
// SECTION: Timestamp
// ============================================================================

/// Unix epoch milliseconds timestamp.
///
/// # Invariants
/// - Values are explicit; no monotonicity is enforced by this type.
/// - Arithmetic saturates instead of wrapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(i64);

impl Timestamp {
    /// Creates a timestamp from unix epoch milliseconds.
    #[must_use]
    pub const fn from_unix_millis(millis: i64) -> Self {
        Self(millis)
    }

    /// Returns the timestamp as unix epoch milliseconds.
    #[must_use]
    pub const fn as_unix_millis(self) -> i64 {
        self.0
    }

    /// Reads the current wall-clock time at the host boundary.
    ///
    /// Clamps to zero for clocks before the epoch and to `i64::MAX` on
    /// overflow.
    #[must_use]
    pub fn now() -> Self {
        let millis = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|elapsed| elapsed.as_millis())
            .unwrap_or(0);
        Self(i64::try_from(millis).unwrap_or(i64::MAX))
    }

    /// Returns this timestamp advanced by `millis`, saturating on overflow.
    #[must_use]
    pub fn saturating_add_millis(self, millis: u64) -> Self {
        let step = i64::try_from(millis).unwrap_or(i64::MAX);
        Self(self.0.saturating_add(step))
    }

    /// Returns the signed millisecond distance from `earlier` to `self`.
    #[must_use]
    pub const fn saturating_millis_since(self, earlier: Self) -> i64 {
        self.0.saturating_sub(earlier.0)
    }
}
