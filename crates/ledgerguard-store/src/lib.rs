//! # ledgerguard-store
//!
//! State layer of the LedgerGuard engine: wallet documents, the
//! append-only transaction ledger, the idempotency registry, the
//! best-effort audit log, and the atomic mutator that ties them together.
//!
//! ## Design principles
//!
//! - **One write path.** Balances change only through [`AtomicMutator`];
//!   everything else is read-only against snapshots.
//! - **Optimistic concurrency.** [`WalletStore::compare_and_update`] is a
//!   version-checked CAS; the mutator wraps it in a bounded retry loop.
//! - **History is immutable.** [`TransactionLedger`] records are appended,
//!   never edited or removed; the wallet holds only balance and version.
//! - **Auditing never blocks money.** [`AuditLog::record`] has no error
//!   path by contract.

pub mod audit_log;
pub mod idempotency;
pub mod ledger;
pub mod mutator;
pub mod store;

pub use audit_log::AuditLog;
pub use idempotency::IdempotencyRegistry;
pub use ledger::TransactionLedger;
pub use mutator::{Applied, ApplyRequest, AtomicMutator};
pub use store::WalletStore;
