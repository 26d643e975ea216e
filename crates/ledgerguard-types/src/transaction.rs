//! Immutable transaction records.
//!
//! A record is created only as a side effect of a (successful or attempted)
//! balance mutation. Once `Completed` it is permanent: appended to the
//! ledger, never edited, never removed.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{IdempotencyKey, TransactionId, UserId, WalletId};

/// The direction of a balance-affecting event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransactionKind {
    /// Adds to the wallet balance.
    Deposit,
    /// Subtracts from the wallet balance.
    Withdrawal,
    /// Subtracts from the source wallet balance. Crediting the counterparty
    /// is the surrounding application's concern.
    Transfer,
}

impl TransactionKind {
    /// Whether this kind debits the wallet (requires sufficient funds).
    #[must_use]
    pub fn is_debit(self) -> bool {
        matches!(self, Self::Withdrawal | Self::Transfer)
    }
}

impl std::fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Deposit => write!(f, "deposit"),
            Self::Withdrawal => write!(f, "withdrawal"),
            Self::Transfer => write!(f, "transfer"),
        }
    }
}

impl std::str::FromStr for TransactionKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "deposit" => Ok(Self::Deposit),
            "withdrawal" => Ok(Self::Withdrawal),
            "transfer" => Ok(Self::Transfer),
            _ => Err(format!("Invalid transaction kind: {s}")),
        }
    }
}

/// Lifecycle status of a transaction record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransactionStatus {
    Pending,
    Completed,
    Failed,
    Cancelled,
}

impl std::fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Completed => write!(f, "completed"),
            Self::Failed => write!(f, "failed"),
            Self::Cancelled => write!(f, "cancelled"),
        }
    }
}

/// An immutable record of one balance-affecting event on a wallet.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionRecord {
    pub id: TransactionId,
    pub wallet_id: WalletId,
    pub user_id: UserId,
    pub kind: TransactionKind,
    /// Always positive; the sign is carried by `kind`.
    pub amount: Decimal,
    pub description: Option<String>,
    pub metadata: HashMap<String, String>,
    /// Keyed-MAC integrity tag, present on guard-verified transactions.
    pub integrity_hash: Option<String>,
    pub status: TransactionStatus,
    pub idempotency_key: Option<IdempotencyKey>,
    pub created_at: DateTime<Utc>,
}

impl TransactionRecord {
    /// The signed balance impact of this record: positive for deposits,
    /// negative for withdrawals and transfers.
    #[must_use]
    pub fn signed_amount(&self) -> Decimal {
        if self.kind.is_debit() {
            -self.amount
        } else {
            self.amount
        }
    }
}

/// Filter for history reads. All fields are conjunctive; `None` matches all.
#[derive(Debug, Clone, Default)]
pub struct TransactionFilter {
    pub kind: Option<TransactionKind>,
    pub status: Option<TransactionStatus>,
    pub since: Option<DateTime<Utc>>,
    /// Maximum number of records to return (newest first).
    pub limit: Option<usize>,
}
