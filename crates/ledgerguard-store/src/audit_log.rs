//! Bounded in-memory audit trail.
//!
//! Auditing is observability, not control flow: recording an event can
//! never fail the transaction that produced it. `record` therefore has no
//! error path — if the log is unavailable the event is dropped and a
//! warning is emitted, and the caller proceeds.

use std::collections::VecDeque;
use std::sync::RwLock;

use ledgerguard_types::constants::AUDIT_LOG_CAPACITY;
use ledgerguard_types::{AuditEvent, AuditSeverity, UserId};
use tracing::warn;

/// Append-only ring of audit events, oldest evicted first.
pub struct AuditLog {
    events: RwLock<VecDeque<AuditEvent>>,
    capacity: usize,
}

impl AuditLog {
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(AUDIT_LOG_CAPACITY)
    }

    /// # Panics
    /// Panics if `capacity` is zero.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        assert!(capacity > 0, "AuditLog capacity must be > 0");
        Self {
            events: RwLock::new(VecDeque::with_capacity(capacity.min(4096))),
            capacity,
        }
    }

    /// Record an event. Infallible by contract: failures are swallowed
    /// after a warning so audit problems never block money movement.
    pub fn record(&self, event: AuditEvent) {
        match self.events.write() {
            Ok(mut events) => {
                if events.len() >= self.capacity {
                    events.pop_front();
                }
                events.push_back(event);
            }
            Err(_) => {
                warn!(
                    action = %event.action,
                    severity = %event.severity,
                    "audit log unavailable, event dropped"
                );
            }
        }
    }

    /// The most recent `n` events, newest first.
    #[must_use]
    pub fn recent(&self, n: usize) -> Vec<AuditEvent> {
        match self.events.read() {
            Ok(events) => events.iter().rev().take(n).cloned().collect(),
            Err(_) => Vec::new(),
        }
    }

    /// The most recent `n` events for one user, newest first.
    #[must_use]
    pub fn recent_for_user(&self, user_id: UserId, n: usize) -> Vec<AuditEvent> {
        match self.events.read() {
            Ok(events) => events
                .iter()
                .rev()
                .filter(|e| e.user_id == Some(user_id))
                .take(n)
                .cloned()
                .collect(),
            Err(_) => Vec::new(),
        }
    }

    /// The most recent `n` events at or above `severity`, newest first.
    #[must_use]
    pub fn recent_at_severity(&self, severity: AuditSeverity, n: usize) -> Vec<AuditEvent> {
        match self.events.read() {
            Ok(events) => events
                .iter()
                .rev()
                .filter(|e| e.severity >= severity)
                .take(n)
                .cloned()
                .collect(),
            Err(_) => Vec::new(),
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.events.read().map(|e| e.len()).unwrap_or(0)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for AuditLog {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use ledgerguard_types::AuditAction;

    use super::*;

    fn event(action: AuditAction, severity: AuditSeverity, user: Option<UserId>) -> AuditEvent {
        AuditEvent::new(action, severity, None, user, "test")
    }

    #[test]
    fn records_and_reads_newest_first() {
        let log = AuditLog::new();
        log.record(event(AuditAction::WalletCreated, AuditSeverity::Info, None));
        log.record(event(
            AuditAction::TransactionCompleted,
            AuditSeverity::Info,
            None,
        ));

        let recent = log.recent(10);
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].action, AuditAction::TransactionCompleted);
        assert_eq!(recent[1].action, AuditAction::WalletCreated);
    }

    #[test]
    fn evicts_oldest_at_capacity() {
        let log = AuditLog::with_capacity(2);
        log.record(event(AuditAction::WalletCreated, AuditSeverity::Info, None));
        log.record(event(AuditAction::SecurityBlock, AuditSeverity::High, None));
        log.record(event(AuditAction::WalletDeleted, AuditSeverity::Info, None));

        let recent = log.recent(10);
        assert_eq!(recent.len(), 2);
        assert!(recent.iter().all(|e| e.action != AuditAction::WalletCreated));
    }

    #[test]
    fn filters_by_user_and_severity() {
        let log = AuditLog::new();
        let alice = UserId::new();
        let bob = UserId::new();
        log.record(event(
            AuditAction::RateLimitExceeded,
            AuditSeverity::Medium,
            Some(alice),
        ));
        log.record(event(
            AuditAction::OwnershipViolation,
            AuditSeverity::High,
            Some(bob),
        ));
        log.record(event(
            AuditAction::IntegrityFailure,
            AuditSeverity::Critical,
            Some(alice),
        ));

        assert_eq!(log.recent_for_user(alice, 10).len(), 2);
        assert_eq!(log.recent_at_severity(AuditSeverity::High, 10).len(), 2);
        assert_eq!(log.recent_at_severity(AuditSeverity::Critical, 10).len(), 1);
    }
}
