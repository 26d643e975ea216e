//! Wallet account model.
//!
//! A wallet is a per-(user, currency) balance-holding record. Per the
//! append-only ledger design, the wallet document carries only the current
//! balance and a monotonic version counter — the transaction history lives
//! in the ledger table keyed by `(WalletId, TransactionId)`.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{UserId, WalletId};

/// Type alias for ISO-style currency codes (e.g., "USD", "EUR", "NGN").
pub type Currency = String;

/// Lifecycle status of a wallet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WalletStatus {
    /// Open for transactions.
    Active,
    /// Frozen by an operator or a security action. No mutations allowed.
    Blocked,
    /// Permanently closed. No mutations allowed.
    Closed,
}

impl std::fmt::Display for WalletStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Active => write!(f, "active"),
            Self::Blocked => write!(f, "blocked"),
            Self::Closed => write!(f, "closed"),
        }
    }
}

impl std::str::FromStr for WalletStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(Self::Active),
            "blocked" => Ok(Self::Blocked),
            "closed" => Ok(Self::Closed),
            _ => Err(format!("Invalid wallet status: {s}")),
        }
    }
}

/// Descriptor for an externally linked bank account. Display-only — the
/// engine never initiates transfers against it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BankAccountRef {
    pub bank_name: String,
    /// Masked account number (e.g., "****1234").
    pub masked_account: String,
}

/// A per-user, per-currency balance-holding account.
///
/// Invariants maintained by the store:
/// - at most one wallet per (user, currency);
/// - exactly one wallet per user has `is_primary = true` once any exists;
/// - `balance >= 0` at all times;
/// - `balance` equals the signed sum of all completed ledger records.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Wallet {
    pub id: WalletId,
    pub user_id: UserId,
    pub currency: Currency,
    /// ISO country code of the wallet's jurisdiction.
    pub country: String,
    pub balance: Decimal,
    pub is_primary: bool,
    pub status: WalletStatus,
    pub bank_account: Option<BankAccountRef>,
    /// Monotonic version for optimistic concurrency. Every committed
    /// mutation bumps it by one; a stale-version write is rejected.
    pub version: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Wallet {
    /// Create a fresh, empty, active wallet.
    #[must_use]
    pub fn new(user_id: UserId, currency: impl Into<Currency>, country: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: WalletId::new(),
            user_id,
            currency: currency.into(),
            country: country.into(),
            balance: Decimal::ZERO,
            is_primary: false,
            status: WalletStatus::Active,
            bank_account: None,
            version: 0,
            created_at: now,
            updated_at: now,
        }
    }

    /// Whether this wallet accepts balance mutations.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.status == WalletStatus::Active
    }
}
