//! Confirmation gate: two-phase commit for destructive actions.
//!
//! ```text
//! request_confirmation ──▶ pending (expires after ttl)
//!                               │
//!            ┌──────────────────┼──────────────────┐
//!            ▼                  ▼                  ▼
//!      confirm_action      cancel_action        expiry
//!      (true, once)        (idempotent)      (confirm → false)
//! ```
//!
//! An id is consumed at most once. Every mutation happens under one lock,
//! so two racing confirmations of the same id cannot both succeed. An
//! approval covers exactly the arguments it was requested with:
//! [`ConfirmationGate::confirm_action_with`] refuses any other call.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use chrono::{DateTime, Utc};
use dashagent_domain::confirmation::{ConfirmationRequest, PendingConfirmation, Severity};
use dashagent_domain::tool::ToolArguments;
use tracing::debug;
use uuid::Uuid;

/// Default lifetime of a pending confirmation
pub const DEFAULT_CONFIRMATION_TTL: Duration = Duration::from_secs(300);

/// Source of the current time
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Holds destructive actions until a human approves them
pub struct ConfirmationGate {
    pending: Mutex<HashMap<String, PendingConfirmation>>,
    ttl: chrono::Duration,
    clock: Arc<dyn Clock>,
}

impl ConfirmationGate {
    pub fn new(ttl: Duration) -> Self {
        Self {
            pending: Mutex::new(HashMap::new()),
            ttl: chrono::Duration::from_std(ttl).unwrap_or_else(|_| chrono::Duration::days(365)),
            clock: Arc::new(SystemClock),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn ttl(&self) -> chrono::Duration {
        self.ttl
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, PendingConfirmation>> {
        self.pending.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Store a pending confirmation and return its fresh id
    ///
    /// Nothing is executed.
    pub fn request_confirmation(&self, request: ConfirmationRequest) -> String {
        let id = Uuid::new_v4().to_string();
        let pending = PendingConfirmation::from_request(&id, request, self.clock.now(), self.ttl);
        debug!(
            confirmation_id = %id,
            tool = %pending.tool_name,
            severity = %pending.severity,
            "Confirmation requested"
        );
        self.lock().insert(id.clone(), pending);
        id
    }

    /// The unexpired pending entry for `id`; expired entries are evicted
    pub fn get_pending(&self, id: &str) -> Option<PendingConfirmation> {
        let now = self.clock.now();
        let mut pending = self.lock();
        if pending.get(id)?.is_expired_at(now) {
            debug!(confirmation_id = %id, "Confirmation expired");
            pending.remove(id);
            return None;
        }
        pending.get(id).cloned()
    }

    /// Consume `id`: true exactly once for a present, unexpired entry
    pub fn confirm_action(&self, id: &str) -> bool {
        self.take_if(id, |_| true)
    }

    /// Consume `id` only for the call it was requested for: same tool, same
    /// arguments (without the confirmation id) and same severity.
    ///
    /// A mismatch leaves the entry pending.
    pub fn confirm_action_with(&self, id: &str, tool_name: &str, params: &ToolArguments, severity: Severity) -> bool {
        self.take_if(id, |entry| {
            let matches = entry.tool_name == tool_name && entry.severity == severity && &entry.params == params;
            if !matches {
                debug!(confirmation_id = %id, tool = tool_name, "Confirmation does not cover this call");
            }
            matches
        })
    }

    fn take_if(&self, id: &str, accept: impl FnOnce(&PendingConfirmation) -> bool) -> bool {
        let now = self.clock.now();
        let mut pending = self.lock();
        let Some(entry) = pending.get(id) else {
            return false;
        };
        if entry.is_expired_at(now) {
            debug!(confirmation_id = %id, "Confirmation expired");
            pending.remove(id);
            return false;
        }
        if !accept(entry) {
            return false;
        }
        pending.remove(id);
        debug!(confirmation_id = %id, "Confirmation consumed");
        true
    }

    /// Drop `id` unconditionally; unknown ids are ignored
    pub fn cancel_action(&self, id: &str) {
        if self.lock().remove(id).is_some() {
            debug!(confirmation_id = %id, "Confirmation cancelled");
        }
    }

    /// Evict every expired entry, returning how many were removed
    pub fn purge_expired(&self) -> usize {
        let now = self.clock.now();
        let mut pending = self.lock();
        let before = pending.len();
        pending.retain(|_, entry| !entry.is_expired_at(now));
        before - pending.len()
    }

    /// Unexpired entries, oldest first
    pub fn list_pending(&self) -> Vec<PendingConfirmation> {
        let now = self.clock.now();
        let mut entries: Vec<PendingConfirmation> = self
            .lock()
            .values()
            .filter(|entry| !entry.is_expired_at(now))
            .cloned()
            .collect();
        entries.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.confirmation_id.cmp(&b.confirmation_id)));
        entries
    }

    pub fn pending_count(&self) -> usize {
        self.purge_expired();
        self.lock().len()
    }
}

impl Default for ConfirmationGate {
    fn default() -> Self {
        Self::new(DEFAULT_CONFIRMATION_TTL)
    }
}
