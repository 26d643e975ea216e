//! Role-based transaction limits.
//!
//! Three ceilings per role tier, checked cheapest first: single-transaction
//! amount, then rolling 24-hour total, then rolling 30-day total. Totals
//! accumulate per transaction kind — a day of withdrawals does not consume
//! the deposit allowance.

use chrono::{Duration, Utc};
use ledgerguard_types::constants::{LIMIT_DAILY_WINDOW_HOURS, LIMIT_MONTHLY_WINDOW_DAYS};
use ledgerguard_types::{
    LedgerGuardError, LimitPolicy, LimitScope, Result, Role, TransactionKind, TransactionRecord,
    TransactionStatus,
};
use rust_decimal::Decimal;
use tracing::debug;

/// Enforces per-transaction, daily, and monthly ceilings.
#[derive(Debug, Clone)]
pub struct LimitEnforcer {
    policy: LimitPolicy,
}

impl LimitEnforcer {
    #[must_use]
    pub fn new(policy: LimitPolicy) -> Self {
        Self { policy }
    }

    /// Check a proposed amount against the caller's ceilings, given the
    /// user's completed history (30 days is enough lookback).
    ///
    /// Spending exactly up to a ceiling is allowed; the first unit over is
    /// not.
    ///
    /// # Errors
    /// `LimitExceeded` naming the first ceiling hit.
    pub fn check(
        &self,
        role: Role,
        kind: TransactionKind,
        amount: Decimal,
        history: &[TransactionRecord],
    ) -> Result<()> {
        let limits = self.policy.for_role(role);

        if amount > limits.per_transaction {
            return Err(LedgerGuardError::LimitExceeded {
                scope: LimitScope::PerTransaction,
                ceiling: limits.per_transaction,
            });
        }

        let now = Utc::now();
        let daily_cutoff = now - Duration::hours(LIMIT_DAILY_WINDOW_HOURS);
        let monthly_cutoff = now - Duration::days(LIMIT_MONTHLY_WINDOW_DAYS);

        let mut daily_total = Decimal::ZERO;
        let mut monthly_total = Decimal::ZERO;
        for record in history {
            if record.kind != kind || record.status != TransactionStatus::Completed {
                continue;
            }
            if record.created_at >= monthly_cutoff {
                monthly_total += record.amount;
                if record.created_at >= daily_cutoff {
                    daily_total += record.amount;
                }
            }
        }

        if daily_total + amount > limits.daily {
            debug!(role = %role, kind = %kind, %daily_total, %amount, "daily ceiling hit");
            return Err(LedgerGuardError::LimitExceeded {
                scope: LimitScope::Daily,
                ceiling: limits.daily,
            });
        }
        if monthly_total + amount > limits.monthly {
            debug!(role = %role, kind = %kind, %monthly_total, %amount, "monthly ceiling hit");
            return Err(LedgerGuardError::LimitExceeded {
                scope: LimitScope::Monthly,
                ceiling: limits.monthly,
            });
        }

        Ok(())
    }

    /// Remaining same-kind headroom inside the daily window.
    #[must_use]
    pub fn daily_headroom(
        &self,
        role: Role,
        kind: TransactionKind,
        history: &[TransactionRecord],
    ) -> Decimal {
        let limits = self.policy.for_role(role);
        let cutoff = Utc::now() - Duration::hours(LIMIT_DAILY_WINDOW_HOURS);
        let spent: Decimal = history
            .iter()
            .filter(|r| r.kind == kind && r.status == TransactionStatus::Completed)
            .filter(|r| r.created_at >= cutoff)
            .map(|r| r.amount)
            .sum();
        (limits.daily - spent).max(Decimal::ZERO)
    }
}

impl Default for LimitEnforcer {
    fn default() -> Self {
        Self::new(LimitPolicy::default())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use chrono::{DateTime, Utc};
    use ledgerguard_types::{TransactionId, UserId, WalletId};

    use super::*;

    fn record_at(
        kind: TransactionKind,
        amount: Decimal,
        created_at: DateTime<Utc>,
    ) -> TransactionRecord {
        TransactionRecord {
            id: TransactionId::new(),
            wallet_id: WalletId::new(),
            user_id: UserId::new(),
            kind,
            amount,
            description: None,
            metadata: HashMap::new(),
            integrity_hash: None,
            status: TransactionStatus::Completed,
            idempotency_key: None,
            created_at,
        }
    }

    fn enforcer() -> LimitEnforcer {
        LimitEnforcer::default()
    }

    #[test]
    fn per_transaction_ceiling_is_inclusive() {
        let e = enforcer();
        // User per-transaction ceiling is 5,000.
        e.check(
            Role::User,
            TransactionKind::Withdrawal,
            Decimal::new(5_000, 0),
            &[],
        )
        .unwrap();

        let err = e
            .check(
                Role::User,
                TransactionKind::Withdrawal,
                Decimal::new(5_001, 0),
                &[],
            )
            .unwrap_err();
        assert!(matches!(
            err,
            LedgerGuardError::LimitExceeded {
                scope: LimitScope::PerTransaction,
                ..
            }
        ));
    }

    #[test]
    fn daily_ceiling_exact_passes_over_fails() {
        let e = enforcer();
        let now = Utc::now();
        // User daily ceiling is 10,000; 7,000 already spent today.
        let history = vec![record_at(
            TransactionKind::Withdrawal,
            Decimal::new(7_000, 0),
            now - Duration::hours(2),
        )];

        // Exactly reaching the ceiling is fine.
        e.check(
            Role::User,
            TransactionKind::Withdrawal,
            Decimal::new(3_000, 0),
            &history,
        )
        .unwrap();

        let err = e
            .check(
                Role::User,
                TransactionKind::Withdrawal,
                Decimal::new(3_001, 0),
                &history,
            )
            .unwrap_err();
        assert!(matches!(
            err,
            LedgerGuardError::LimitExceeded {
                scope: LimitScope::Daily,
                ..
            }
        ));
    }

    #[test]
    fn old_spend_rolls_out_of_daily_window() {
        let e = enforcer();
        let history = vec![record_at(
            TransactionKind::Withdrawal,
            Decimal::new(9_000, 0),
            Utc::now() - Duration::hours(25),
        )];
        // Out of the daily window, inside the monthly one.
        e.check(
            Role::User,
            TransactionKind::Withdrawal,
            Decimal::new(5_000, 0),
            &history,
        )
        .unwrap();
    }

    #[test]
    fn monthly_ceiling_accumulates_across_days() {
        let e = enforcer();
        let now = Utc::now();
        // 98,000 over the past month for a 100,000 user ceiling.
        let history: Vec<_> = (1..=28)
            .map(|d| {
                record_at(
                    TransactionKind::Withdrawal,
                    Decimal::new(3_500, 0),
                    now - Duration::days(d),
                )
            })
            .collect();

        let err = e
            .check(
                Role::User,
                TransactionKind::Withdrawal,
                Decimal::new(2_001, 0),
                &history,
            )
            .unwrap_err();
        assert!(matches!(
            err,
            LedgerGuardError::LimitExceeded {
                scope: LimitScope::Monthly,
                ..
            }
        ));

        e.check(
            Role::User,
            TransactionKind::Withdrawal,
            Decimal::new(2_000, 0),
            &history,
        )
        .unwrap();
    }

    #[test]
    fn totals_are_per_kind() {
        let e = enforcer();
        let history = vec![record_at(
            TransactionKind::Deposit,
            Decimal::new(9_500, 0),
            Utc::now() - Duration::hours(1),
        )];
        // A day of deposits leaves the withdrawal allowance untouched.
        e.check(
            Role::User,
            TransactionKind::Withdrawal,
            Decimal::new(5_000, 0),
            &history,
        )
        .unwrap();
    }

    #[test]
    fn higher_roles_get_higher_ceilings() {
        let e = enforcer();
        let amount = Decimal::new(15_000, 0);
        assert!(e
            .check(Role::User, TransactionKind::Withdrawal, amount, &[])
            .is_err());
        e.check(Role::Admin, TransactionKind::Withdrawal, amount, &[])
            .unwrap();
        e.check(Role::SuperAdmin, TransactionKind::Withdrawal, amount, &[])
            .unwrap();
    }

    #[test]
    fn daily_headroom_reports_remaining() {
        let e = enforcer();
        let history = vec![record_at(
            TransactionKind::Withdrawal,
            Decimal::new(4_000, 0),
            Utc::now() - Duration::hours(3),
        )];
        assert_eq!(
            e.daily_headroom(Role::User, TransactionKind::Withdrawal, &history),
            Decimal::new(6_000, 0)
        );
    }
}
