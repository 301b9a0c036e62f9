// crates/waypoint-approvals/src/store.rs
// ============================================================================
// Module: In-Memory Approval Store
// Description: Reference ApprovalStore backed by a mutex-guarded table.
// Purpose: Provide the single-table reference persistence implementation.
// Dependencies: waypoint-core, std
// ============================================================================

//! ## Overview
//! The in-memory store is the reference [`ApprovalStore`] implementation:
//! a single table keyed by request id, with tenant/run/step lookups scanned
//! linearly. The table mutex makes every method atomic per request id. A
//! durable, tenant-partitioned backend swaps in behind the same contract
//! with no change to callers.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::Mutex;

use waypoint_core::ApprovalDecision;
use waypoint_core::ApprovalRequest;
use waypoint_core::ApprovalStatus;
use waypoint_core::ApprovalStore;
use waypoint_core::ApproverId;
use waypoint_core::Clock;
use waypoint_core::NewApprovalRequest;
use waypoint_core::RequestId;
use waypoint_core::RunId;
use waypoint_core::StepId;
use waypoint_core::StoreError;
use waypoint_core::SystemClock;
use waypoint_core::TenantId;
use waypoint_core::Timestamp;

// ============================================================================
// SECTION: Store State
// ============================================================================

/// Mutable table state behind the store mutex.
struct StoreState {
    /// Requests keyed by request id.
    requests: BTreeMap<RequestId, ApprovalRequest>,
    /// Monotonic counter for assigned request ids.
    next_id: u64,
}

/// Reference in-memory approval store.
///
/// # Invariants
/// - Every method is atomic per request id via the table mutex.
/// - Mutations fail loudly when the target request does not exist.
pub struct InMemoryApprovalStore {
    /// Table state guarded for concurrent callers.
    state: Mutex<StoreState>,
    /// Clock used to assign creation times.
    clock: Arc<dyn Clock>,
}

impl Default for InMemoryApprovalStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryApprovalStore {
    /// Creates an empty store on the system clock.
    #[must_use]
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    /// Creates an empty store on the provided clock.
    #[must_use]
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            state: Mutex::new(StoreState {
                requests: BTreeMap::new(),
                next_id: 0,
            }),
            clock,
        }
    }

    /// Locks the table, mapping poisoning to a store error.
    fn lock(&self) -> Result<std::sync::MutexGuard<'_, StoreState>, StoreError> {
        self.state.lock().map_err(|_| StoreError::Io("approval store mutex poisoned".to_string()))
    }

    /// Applies a mutation to one request, failing loudly on unknown ids.
    fn mutate<T>(
        &self,
        id: &RequestId,
        apply: impl FnOnce(&mut ApprovalRequest) -> Result<T, StoreError>,
    ) -> Result<T, StoreError> {
        let mut state = self.lock()?;
        let request = state.requests.get_mut(id).ok_or_else(|| StoreError::NotFound {
            id: id.clone(),
        })?;
        apply(request)
    }
}

// ============================================================================
// SECTION: ApprovalStore Implementation
// ============================================================================

impl ApprovalStore for InMemoryApprovalStore {
    fn create_request(
        &self,
        new_request: NewApprovalRequest,
    ) -> Result<ApprovalRequest, StoreError> {
        let created_at = self.clock.now();
        let mut state = self.lock()?;
        state.next_id += 1;
        let id = RequestId::new(format!("apr-{}", state.next_id));
        let request = ApprovalRequest {
            id: id.clone(),
            run_id: new_request.run_id,
            step_id: new_request.step_id,
            tenant_id: new_request.tenant_id,
            requested_by: new_request.requested_by,
            approvers: new_request.approvers,
            policy: new_request.policy,
            status: ApprovalStatus::Pending,
            decisions: Vec::new(),
            escalation: new_request.escalation,
            escalation_count: 0,
            channels: new_request.channels,
            correlation_id: new_request.correlation_id,
            created_at,
            expires_at: new_request.expires_at,
            resolved_at: None,
            context: new_request.context,
        };
        state.requests.insert(id, request.clone());
        Ok(request)
    }

    fn get_request(&self, id: &RequestId) -> Result<Option<ApprovalRequest>, StoreError> {
        Ok(self.lock()?.requests.get(id).cloned())
    }

    fn get_by_run_and_step(
        &self,
        run_id: &RunId,
        step_id: &StepId,
    ) -> Result<Option<ApprovalRequest>, StoreError> {
        let state = self.lock()?;
        Ok(state
            .requests
            .values()
            .find(|request| request.run_id == *run_id && request.step_id == *step_id)
            .cloned())
    }

    fn update_status(&self, id: &RequestId, status: ApprovalStatus) -> Result<(), StoreError> {
        self.mutate(id, |request| {
            request.status = status;
            Ok(())
        })
    }

    fn add_decision(&self, id: &RequestId, decision: ApprovalDecision) -> Result<(), StoreError> {
        self.mutate(id, |request| {
            if request.resolved_at.is_some() {
                return Err(StoreError::Conflict(format!(
                    "request {} is already resolved; decisions are frozen",
                    request.id
                )));
            }
            request.decisions.push(decision);
            Ok(())
        })
    }

    fn increment_escalation(&self, id: &RequestId) -> Result<u32, StoreError> {
        self.mutate(id, |request| {
            request.escalation_count = request.escalation_count.saturating_add(1);
            Ok(request.escalation_count)
        })
    }

    fn update_approvers(
        &self,
        id: &RequestId,
        approvers: Vec<ApproverId>,
    ) -> Result<(), StoreError> {
        self.mutate(id, |request| {
            request.approvers = approvers;
            Ok(())
        })
    }

    fn update_expires_at(
        &self,
        id: &RequestId,
        expires_at: Option<Timestamp>,
    ) -> Result<(), StoreError> {
        self.mutate(id, |request| {
            request.expires_at = expires_at;
            Ok(())
        })
    }

    fn set_resolved(&self, id: &RequestId, resolved_at: Timestamp) -> Result<(), StoreError> {
        self.mutate(id, |request| {
            if request.resolved_at.is_some() {
                return Err(StoreError::Conflict(format!(
                    "request {} is already resolved",
                    request.id
                )));
            }
            request.resolved_at = Some(resolved_at);
            Ok(())
        })
    }

    fn list_pending(&self, tenant_id: TenantId) -> Result<Vec<ApprovalRequest>, StoreError> {
        let state = self.lock()?;
        Ok(state
            .requests
            .values()
            .filter(|request| {
                request.tenant_id == tenant_id && !request.status.is_terminal()
            })
            .cloned()
            .collect())
    }

    fn list_by_run(&self, run_id: &RunId) -> Result<Vec<ApprovalRequest>, StoreError> {
        let state = self.lock()?;
        Ok(state.requests.values().filter(|request| request.run_id == *run_id).cloned().collect())
    }
}
