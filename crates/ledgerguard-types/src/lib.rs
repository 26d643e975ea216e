//! # ledgerguard-types
//!
//! Shared types, errors, and configuration for the **LedgerGuard** wallet
//! transaction engine.
//!
//! This crate is the leaf dependency of the workspace — every other crate
//! depends on it. It defines:
//!
//! - **Identifiers**: [`WalletId`], [`UserId`], [`TransactionId`], [`AuditEventId`], [`IdempotencyKey`]
//! - **Wallet model**: [`Wallet`], [`WalletStatus`], [`BankAccountRef`], [`Currency`]
//! - **Transaction model**: [`TransactionRecord`], [`TransactionKind`], [`TransactionStatus`], [`TransactionFilter`]
//! - **Risk model**: [`RiskAssessment`], [`RiskFlag`], [`ActivityContext`], [`UserActivity`]
//! - **Roles & limits**: [`Role`], [`RoleLimits`], [`LimitPolicy`], [`LimitScope`]
//! - **Audit model**: [`AuditEvent`], [`AuditAction`], [`AuditSeverity`]
//! - **Configuration**: [`EngineConfig`] and its per-component sections
//! - **Errors**: [`LedgerGuardError`] with `LG_ERR_` prefix codes
//! - **Constants**: system-wide thresholds and defaults

pub mod audit;
pub mod config;
pub mod constants;
pub mod error;
pub mod ids;
pub mod risk;
pub mod role;
pub mod transaction;
pub mod wallet;

// Re-export all primary types at crate root for ergonomic imports:
//   use ledgerguard_types::{Wallet, TransactionRecord, RiskAssessment, ...};

pub use audit::*;
pub use config::*;
pub use error::*;
pub use ids::*;
pub use risk::*;
pub use role::*;
pub use transaction::*;
pub use wallet::*;

// Constants are accessed via `ledgerguard_types::constants::FOO`
// (not re-exported to avoid name collisions).
