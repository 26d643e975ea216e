//! # ledgerguard-engine
//!
//! The LedgerGuard wallet transaction engine: multi-currency wallets with
//! an append-only ledger, optimistic-concurrency balance mutation, layered
//! security screening, and a best-effort audit trail.
//!
//! [`WalletEngine`] is the assembled facade. Two submission paths exist:
//!
//! - [`WalletEngine::process_transaction`] — the standard pipeline: risk
//!   scoring, fraud heuristics, role limits, then the atomic mutation.
//! - [`WalletEngine::verify_and_process`] — the guarded pipeline: adds
//!   ownership, rate-limit, and suspicious-activity checks, and embeds a
//!   keyed integrity token in the committed record.
//!
//! ```
//! use ledgerguard_engine::{ProcessRequest, WalletEngine};
//! use ledgerguard_types::{EngineConfig, TransactionKind};
//! use rust_decimal::Decimal;
//!
//! let engine = WalletEngine::new(EngineConfig::default());
//! let user = ledgerguard_types::UserId::new();
//! let wallet = engine.create_wallet(user, "USD", "US").unwrap();
//!
//! let outcome = engine
//!     .process_transaction(&ProcessRequest::new(
//!         wallet.id,
//!         user,
//!         TransactionKind::Deposit,
//!         Decimal::new(100, 0),
//!     ))
//!     .unwrap();
//! assert_eq!(outcome.applied.new_balance, Decimal::new(100, 0));
//! ```

use std::sync::Arc;

use ledgerguard_store::{AtomicMutator, AuditLog, TransactionLedger, WalletStore};
use ledgerguard_types::constants::IDEMPOTENCY_CACHE_SIZE;
use ledgerguard_types::{
    AuditAction, AuditEvent, AuditSeverity, BankAccountRef, Currency, EngineConfig,
    LedgerGuardError, Result, TransactionFilter, TransactionKind, TransactionRecord, UserId,
    Wallet, WalletId, WalletStatus,
};
use rust_decimal::Decimal;
use tracing::info;

pub mod guard;
pub mod integrity;
pub mod processor;

pub use guard::TransactionGuard;
pub use integrity::IntegritySigner;
pub use processor::{ProcessOutcome, ProcessRequest, TransactionProcessor};

/// The assembled engine: store, ledger, audit trail, processor, and guard.
pub struct WalletEngine {
    store: Arc<WalletStore>,
    ledger: Arc<TransactionLedger>,
    audit: Arc<AuditLog>,
    processor: Arc<TransactionProcessor>,
    guard: TransactionGuard,
}

impl WalletEngine {
    /// Assemble an engine from explicit configuration.
    #[must_use]
    pub fn new(config: EngineConfig) -> Self {
        let store = Arc::new(WalletStore::new());
        let ledger = Arc::new(TransactionLedger::new());
        let audit = Arc::new(AuditLog::new());
        let mutator = Arc::new(AtomicMutator::new(
            Arc::clone(&store),
            Arc::clone(&ledger),
            config.amounts,
            config.retry,
            IDEMPOTENCY_CACHE_SIZE,
        ));
        let processor = Arc::new(TransactionProcessor::new(
            Arc::clone(&store),
            Arc::clone(&ledger),
            mutator,
            Arc::clone(&audit),
            &config,
        ));
        let guard = TransactionGuard::new(Arc::clone(&processor), config.guard.clone());
        Self {
            store,
            ledger,
            audit,
            processor,
            guard,
        }
    }

    // -- wallet lifecycle ---------------------------------------------------

    /// Create a wallet; the user's first wallet becomes primary.
    ///
    /// # Errors
    /// `DuplicateWallet` if a wallet for this currency already exists.
    pub fn create_wallet(
        &self,
        user_id: UserId,
        currency: impl Into<Currency>,
        country: impl Into<String>,
    ) -> Result<Wallet> {
        let wallet = self.store.create_wallet(user_id, currency, country)?;
        self.audit.record(
            AuditEvent::new(
                AuditAction::WalletCreated,
                AuditSeverity::Info,
                Some(wallet.id.to_string()),
                Some(user_id),
                format!("{} wallet created", wallet.currency),
            )
            .with_meta("primary", wallet.is_primary.to_string()),
        );
        info!(wallet = %wallet.id, currency = %wallet.currency, "wallet created");
        Ok(wallet)
    }

    /// Delete an empty, non-primary wallet owned by the caller.
    ///
    /// # Errors
    /// `Unauthorized`, `PrimaryWalletUndeletable`, or `WalletNotEmpty`.
    pub fn delete_wallet(&self, wallet_id: WalletId, user_id: UserId) -> Result<()> {
        self.store.delete_wallet(wallet_id, user_id)?;
        self.audit.record(AuditEvent::new(
            AuditAction::WalletDeleted,
            AuditSeverity::Info,
            Some(wallet_id.to_string()),
            Some(user_id),
            "wallet deleted",
        ));
        Ok(())
    }

    /// Block, close, or reactivate a wallet.
    ///
    /// # Errors
    /// `WalletNotFound`.
    pub fn set_wallet_status(&self, wallet_id: WalletId, status: WalletStatus) -> Result<Wallet> {
        self.store.set_status(wallet_id, status)
    }

    /// Attach a linked bank-account descriptor.
    ///
    /// # Errors
    /// `WalletNotFound`.
    pub fn link_bank_account(
        &self,
        wallet_id: WalletId,
        account: BankAccountRef,
    ) -> Result<Wallet> {
        self.store.link_bank_account(wallet_id, account)
    }

    /// Current snapshot of a wallet.
    ///
    /// # Errors
    /// `WalletNotFound`.
    pub fn wallet(&self, wallet_id: WalletId) -> Result<Wallet> {
        self.store.get(wallet_id)
    }

    /// Current balance of a wallet.
    ///
    /// # Errors
    /// `WalletNotFound`.
    pub fn balance(&self, wallet_id: WalletId) -> Result<Decimal> {
        Ok(self.store.get(wallet_id)?.balance)
    }

    /// All wallets owned by a user.
    #[must_use]
    pub fn user_wallets(&self, user_id: UserId) -> Vec<Wallet> {
        self.store.user_wallets(user_id)
    }

    /// A user's wallet in a given currency, if any.
    #[must_use]
    pub fn find_wallet(&self, user_id: UserId, currency: &str) -> Option<Wallet> {
        self.store.find_by_currency(user_id, currency)
    }

    // -- transactions -------------------------------------------------------

    /// Submit a transaction through the standard screening pipeline.
    ///
    /// # Errors
    /// Any screening or mutation error; the wallet is untouched on `Err`.
    pub fn process_transaction(&self, request: &ProcessRequest) -> Result<ProcessOutcome> {
        self.processor.process(request)
    }

    /// Convenience deposit with default role and context.
    ///
    /// # Errors
    /// As [`Self::process_transaction`].
    pub fn deposit(
        &self,
        wallet_id: WalletId,
        user_id: UserId,
        amount: Decimal,
    ) -> Result<ProcessOutcome> {
        self.process_transaction(&ProcessRequest::new(
            wallet_id,
            user_id,
            TransactionKind::Deposit,
            amount,
        ))
    }

    /// Submit a transaction through the guarded pipeline, embedding a
    /// keyed integrity token in the committed record.
    ///
    /// # Errors
    /// Guard, screening, or mutation errors; the wallet is untouched on
    /// `Err`.
    pub fn verify_and_process(&self, request: &ProcessRequest) -> Result<ProcessOutcome> {
        self.guard.verify_and_process(request)
    }

    /// Check role limits for a proposed transaction without mutating.
    ///
    /// # Errors
    /// `LimitExceeded`, or `Internal` if history is unreadable.
    pub fn check_limits(&self, request: &ProcessRequest) -> Result<()> {
        self.processor.check_limits(request)
    }

    /// Re-verify the embedded integrity token of a committed record.
    ///
    /// # Errors
    /// `IntegrityFailure`.
    pub fn verify_record(&self, record: &TransactionRecord) -> Result<()> {
        self.guard.verify_record(record)
    }

    /// A wallet's transaction history, newest first. Owner-checked: only
    /// the wallet's recorded owner may read it.
    ///
    /// # Errors
    /// `WalletNotFound` or `Unauthorized`.
    pub fn list_wallet_transactions(
        &self,
        wallet_id: WalletId,
        user_id: UserId,
        filter: &TransactionFilter,
    ) -> Result<Vec<TransactionRecord>> {
        let wallet = self.store.get(wallet_id)?;
        if wallet.user_id != user_id {
            return Err(LedgerGuardError::Unauthorized);
        }
        Ok(self.ledger.wallet_history_filtered(wallet_id, filter))
    }

    // -- observability ------------------------------------------------------

    /// The most recent audit events, newest first.
    #[must_use]
    pub fn recent_audit_events(&self, n: usize) -> Vec<AuditEvent> {
        self.audit.recent(n)
    }

    /// Direct access to the underlying store, for integration embedding.
    #[must_use]
    pub fn store(&self) -> &Arc<WalletStore> {
        &self.store
    }

    /// Direct access to the ledger, for integration embedding.
    #[must_use]
    pub fn ledger(&self) -> &Arc<TransactionLedger> {
        &self.ledger
    }
}

impl Default for WalletEngine {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}
