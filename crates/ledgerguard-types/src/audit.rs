//! Audit trail types.
//!
//! Audit events are append-only, best-effort records of security- and
//! money-relevant actions. A failed audit write must never roll back the
//! transaction it describes; the log is a side channel, never read back on
//! the transaction path.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{AuditEventId, UserId};

/// The action an audit event records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AuditAction {
    TransactionCompleted,
    TransactionRejected,
    OwnershipViolation,
    RateLimitExceeded,
    SuspiciousAmount,
    LocationMismatch,
    IntegrityFailure,
    SecurityBlock,
    FraudBlock,
    WalletCreated,
    WalletDeleted,
}

impl std::fmt::Display for AuditAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::TransactionCompleted => write!(f, "TRANSACTION_COMPLETED"),
            Self::TransactionRejected => write!(f, "TRANSACTION_REJECTED"),
            Self::OwnershipViolation => write!(f, "OWNERSHIP_VIOLATION"),
            Self::RateLimitExceeded => write!(f, "RATE_LIMIT_EXCEEDED"),
            Self::SuspiciousAmount => write!(f, "SUSPICIOUS_AMOUNT"),
            Self::LocationMismatch => write!(f, "LOCATION_MISMATCH"),
            Self::IntegrityFailure => write!(f, "INTEGRITY_FAILURE"),
            Self::SecurityBlock => write!(f, "SECURITY_BLOCK"),
            Self::FraudBlock => write!(f, "FRAUD_BLOCK"),
            Self::WalletCreated => write!(f, "WALLET_CREATED"),
            Self::WalletDeleted => write!(f, "WALLET_DELETED"),
        }
    }
}

/// How serious the recorded action is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AuditSeverity {
    Info,
    Medium,
    High,
    Critical,
}

impl std::fmt::Display for AuditSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Info => write!(f, "INFO"),
            Self::Medium => write!(f, "MEDIUM"),
            Self::High => write!(f, "HIGH"),
            Self::Critical => write!(f, "CRITICAL"),
        }
    }
}

/// One append-only audit record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEvent {
    pub id: AuditEventId,
    pub action: AuditAction,
    pub severity: AuditSeverity,
    /// The entity acted upon (wallet id, transaction id), stringified.
    pub target_id: Option<String>,
    /// The acting user, if known.
    pub user_id: Option<UserId>,
    /// Free-text detail for human review.
    pub detail: String,
    pub metadata: HashMap<String, String>,
    /// Server timestamp at record time.
    pub recorded_at: DateTime<Utc>,
}

impl AuditEvent {
    /// Build an event stamped with the current server time.
    #[must_use]
    pub fn new(
        action: AuditAction,
        severity: AuditSeverity,
        target_id: Option<String>,
        user_id: Option<UserId>,
        detail: impl Into<String>,
    ) -> Self {
        Self {
            id: AuditEventId::new(),
            action,
            severity,
            target_id,
            user_id,
            detail: detail.into(),
            metadata: HashMap::new(),
            recorded_at: Utc::now(),
        }
    }

    /// Attach a metadata entry.
    #[must_use]
    pub fn with_meta(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }
}
