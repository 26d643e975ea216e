//! Error types for the LedgerGuard engine.
//!
//! All errors use the `LG_ERR_` prefix convention for easy grepping in logs.
//! Error codes are grouped by subsystem:
//! - 1xx: Validation errors
//! - 2xx: Wallet errors
//! - 3xx: Concurrency / idempotency errors
//! - 4xx: Security errors
//! - 5xx: Limit errors
//! - 9xx: General / internal errors
//!
//! Audit-write failure is deliberately absent: the audit log never raises to
//! the caller (failures are logged locally and swallowed), so money movement
//! can never be broken by audit durability.

use rust_decimal::Decimal;
use thiserror::Error;

use crate::{LimitScope, RiskFlag, TransactionId, WalletId};

/// Central error enum for all LedgerGuard operations.
#[derive(Debug, Error)]
pub enum LedgerGuardError {
    // =================================================================
    // Validation Errors (1xx)
    // =================================================================
    /// The amount is outside the configured bounds or not positive.
    #[error("LG_ERR_100: Invalid amount {amount}: must be between {min} and {max}")]
    InvalidAmount {
        amount: Decimal,
        min: Decimal,
        max: Decimal,
    },

    // =================================================================
    // Wallet Errors (2xx)
    // =================================================================
    /// The requested wallet does not exist.
    #[error("LG_ERR_200: Wallet not found: {0}")]
    WalletNotFound(WalletId),

    /// The acting user is not the wallet's recorded owner.
    #[error("LG_ERR_201: Unauthorized: user is not the wallet owner")]
    Unauthorized,

    /// The wallet is blocked or closed.
    #[error("LG_ERR_202: Wallet is not active (status: {status})")]
    WalletInactive { status: String },

    /// Not enough balance to cover a debit.
    #[error("LG_ERR_203: Insufficient funds: need {needed}, have {available}")]
    InsufficientFunds { needed: Decimal, available: Decimal },

    /// A wallet for this (user, currency) already exists.
    #[error("LG_ERR_204: Duplicate wallet for currency {currency}")]
    DuplicateWallet { currency: String },

    /// A primary wallet cannot be deleted, independent of balance.
    #[error("LG_ERR_205: Cannot delete primary wallet")]
    PrimaryWalletUndeletable,

    /// A wallet holding funds cannot be deleted.
    #[error("LG_ERR_206: Cannot delete wallet with non-zero balance ({balance})")]
    WalletNotEmpty { balance: Decimal },

    // =================================================================
    // Concurrency / Idempotency Errors (3xx)
    // =================================================================
    /// Optimistic-concurrency retries were exhausted without a clean commit.
    #[error("LG_ERR_300: Contention: wallet mutation retried {attempts} times without success")]
    Contention { attempts: u32 },

    /// The idempotency key was already used; the original transaction id is
    /// attached so callers can recover the first outcome.
    #[error("LG_ERR_301: Duplicate submission: idempotency key already applied as {original}")]
    DuplicateSubmission { original: TransactionId },

    // =================================================================
    // Security Errors (4xx)
    // =================================================================
    /// The risk score exceeded the blocking threshold.
    #[error("LG_ERR_400: Security block: risk score {score} with flags {flags:?}")]
    SecurityBlocked { score: u8, flags: Vec<RiskFlag> },

    /// The fraud heuristic flagged this request.
    #[error("LG_ERR_401: Fraud block: {reason}")]
    FraudBlocked { reason: String },

    /// Too many transactions inside the guard's sliding window.
    #[error("LG_ERR_402: Rate limit exceeded: {count} transactions in {window_secs}s")]
    RateLimitExceeded { count: usize, window_secs: u64 },

    /// Suspicious-activity check rejected the request pending verification.
    #[error("LG_ERR_403: Suspicious activity: {reason}")]
    SuspiciousActivity { reason: String },

    /// The transaction integrity hash failed verification.
    #[error("LG_ERR_404: Transaction integrity verification failed")]
    IntegrityFailure,

    // =================================================================
    // Limit Errors (5xx)
    // =================================================================
    /// A role-based ceiling would be exceeded.
    #[error("LG_ERR_500: {scope} limit exceeded: ceiling {ceiling}")]
    LimitExceeded { scope: LimitScope, ceiling: Decimal },

    // =================================================================
    // General / Internal (9xx)
    // =================================================================
    /// Unrecoverable internal error.
    #[error("LG_ERR_900: Internal error: {0}")]
    Internal(String),

    /// Serialization / deserialization error.
    #[error("LG_ERR_901: Serialization error: {0}")]
    Serialization(String),
}

/// Crate-wide `Result` alias.
pub type Result<T> = std::result::Result<T, LedgerGuardError>;
