//! Weighted-signal risk scorer.
//!
//! Each signal is independent and additive; the accumulated score is capped
//! so that default weights can never reject every request on their own. The
//! scorer itself is pure — the caller gathers the withdrawal count and
//! activity snapshot and degrades to [`RiskAssessment::error_fallback`] if
//! that gathering fails.

use ledgerguard_types::{
    ActivityContext, RiskAssessment, RiskConfig, RiskFlag, TransactionKind, UserActivity,
};
use rust_decimal::Decimal;
use tracing::debug;

/// What the scorer looks at for one request.
#[derive(Debug, Clone)]
pub struct RiskInput<'a> {
    pub kind: TransactionKind,
    pub amount: Decimal,
    /// Completed withdrawals by this user inside the lookback window.
    pub recent_withdrawals: usize,
    /// Last recorded fingerprints, if the user has history.
    pub activity: Option<&'a UserActivity>,
    /// Fingerprints supplied with the current request.
    pub context: &'a ActivityContext,
}

/// Scores requests against configured weights.
#[derive(Debug, Clone)]
pub struct RiskScorer {
    config: RiskConfig,
}

impl RiskScorer {
    #[must_use]
    pub fn new(config: RiskConfig) -> Self {
        Self { config }
    }

    /// Whether an assessment should block the transaction.
    #[must_use]
    pub fn blocks(&self, assessment: &RiskAssessment) -> bool {
        assessment.score > self.config.block_threshold
    }

    /// Score one request. Pure and infallible: signals that cannot be
    /// evaluated (no prior fingerprint on record) simply do not fire.
    #[must_use]
    pub fn assess(&self, input: &RiskInput<'_>) -> RiskAssessment {
        let mut score: u32 = 0;
        let mut flags = Vec::new();

        if input.amount > self.config.high_value_threshold {
            score += u32::from(self.config.weight_high_value);
            flags.push(RiskFlag::HighValueTransaction);
        }

        if input.kind == TransactionKind::Withdrawal
            && input.recent_withdrawals > self.config.max_recent_withdrawals
        {
            score += u32::from(self.config.weight_multiple_withdrawals);
            flags.push(RiskFlag::MultipleWithdrawals);
        }

        if let Some(activity) = input.activity {
            if fingerprint_changed(activity.last_location.as_deref(), input.context.location.as_deref())
            {
                score += u32::from(self.config.weight_location_changed);
                flags.push(RiskFlag::LocationChanged);
            }
            if fingerprint_changed(activity.last_device.as_deref(), input.context.device.as_deref()) {
                score += u32::from(self.config.weight_device_changed);
                flags.push(RiskFlag::DeviceChanged);
            }
        }

        let capped =
            u8::try_from(score.min(u32::from(self.config.score_cap))).unwrap_or(u8::MAX);
        if !flags.is_empty() {
            debug!(score = capped, ?flags, "risk signals triggered");
        }
        RiskAssessment {
            score: capped,
            flags,
        }
    }
}

/// A fingerprint change requires both a recorded value and a supplied value;
/// a missing side is "unknown", not "changed".
fn fingerprint_changed(recorded: Option<&str>, supplied: Option<&str>) -> bool {
    matches!((recorded, supplied), (Some(prev), Some(cur)) if prev != cur)
}

#[cfg(test)]
mod tests {
    use ledgerguard_types::constants;

    use super::*;

    fn scorer() -> RiskScorer {
        RiskScorer::new(RiskConfig::default())
    }

    fn input<'a>(
        kind: TransactionKind,
        amount: Decimal,
        recent_withdrawals: usize,
        activity: Option<&'a UserActivity>,
        context: &'a ActivityContext,
    ) -> RiskInput<'a> {
        RiskInput {
            kind,
            amount,
            recent_withdrawals,
            activity,
            context,
        }
    }

    #[test]
    fn small_deposit_is_clean() {
        let ctx = ActivityContext::default();
        let a = scorer().assess(&input(
            TransactionKind::Deposit,
            Decimal::new(50, 0),
            0,
            None,
            &ctx,
        ));
        assert_eq!(a, RiskAssessment::clean());
    }

    #[test]
    fn high_value_scores_twenty_five() {
        let ctx = ActivityContext::default();
        let a = scorer().assess(&input(
            TransactionKind::Deposit,
            Decimal::new(10_001, 0),
            0,
            None,
            &ctx,
        ));
        assert_eq!(a.score, 25);
        assert_eq!(a.flags, vec![RiskFlag::HighValueTransaction]);
    }

    #[test]
    fn threshold_amount_itself_not_high_value() {
        let ctx = ActivityContext::default();
        let a = scorer().assess(&input(
            TransactionKind::Deposit,
            constants::HIGH_VALUE_THRESHOLD,
            0,
            None,
            &ctx,
        ));
        assert!(!a.flags.contains(&RiskFlag::HighValueTransaction));
    }

    #[test]
    fn withdrawal_burst_scores_fifteen() {
        let ctx = ActivityContext::default();
        let a = scorer().assess(&input(
            TransactionKind::Withdrawal,
            Decimal::new(100, 0),
            4,
            None,
            &ctx,
        ));
        assert_eq!(a.score, 15);
        assert_eq!(a.flags, vec![RiskFlag::MultipleWithdrawals]);

        // Same count on a deposit does not fire.
        let a = scorer().assess(&input(
            TransactionKind::Deposit,
            Decimal::new(100, 0),
            4,
            None,
            &ctx,
        ));
        assert!(a.flags.is_empty());
    }

    #[test]
    fn fingerprint_changes_score_five_each() {
        let activity = UserActivity {
            last_location: Some("NG-Lagos".to_string()),
            last_device: Some("ios-17".to_string()),
            last_transaction_at: None,
        };
        let ctx = ActivityContext {
            location: Some("DE-Berlin".to_string()),
            device: Some("android-14".to_string()),
        };
        let a = scorer().assess(&input(
            TransactionKind::Deposit,
            Decimal::new(100, 0),
            0,
            Some(&activity),
            &ctx,
        ));
        assert_eq!(a.score, 10);
        assert!(a.flags.contains(&RiskFlag::LocationChanged));
        assert!(a.flags.contains(&RiskFlag::DeviceChanged));
    }

    #[test]
    fn missing_fingerprint_side_does_not_fire() {
        let activity = UserActivity {
            last_location: Some("NG-Lagos".to_string()),
            last_device: None,
            last_transaction_at: None,
        };
        // No location supplied with the request, no device on record.
        let ctx = ActivityContext {
            location: None,
            device: Some("ios-17".to_string()),
        };
        let a = scorer().assess(&input(
            TransactionKind::Deposit,
            Decimal::new(100, 0),
            0,
            Some(&activity),
            &ctx,
        ));
        assert!(a.flags.is_empty());
    }

    #[test]
    fn all_signals_sum_and_stay_under_cap() {
        let activity = UserActivity {
            last_location: Some("NG-Lagos".to_string()),
            last_device: Some("ios-17".to_string()),
            last_transaction_at: None,
        };
        let ctx = ActivityContext {
            location: Some("DE-Berlin".to_string()),
            device: Some("android-14".to_string()),
        };
        let a = scorer().assess(&input(
            TransactionKind::Withdrawal,
            Decimal::new(20_000, 0),
            10,
            Some(&activity),
            &ctx,
        ));
        assert_eq!(a.score, 50); // 25 + 15 + 5 + 5
        assert_eq!(a.flags.len(), 4);
        assert!(a.score <= constants::RISK_SCORE_CAP);
    }

    #[test]
    fn score_is_capped() {
        let mut config = RiskConfig::default();
        config.weight_high_value = 200;
        config.score_cap = 100;
        let scorer = RiskScorer::new(config);
        let ctx = ActivityContext::default();
        let a = scorer.assess(&input(
            TransactionKind::Deposit,
            Decimal::new(50_000, 0),
            0,
            None,
            &ctx,
        ));
        assert_eq!(a.score, 100);
    }

    #[test]
    fn default_weights_never_block() {
        let scorer = scorer();
        let activity = UserActivity {
            last_location: Some("a".to_string()),
            last_device: Some("b".to_string()),
            last_transaction_at: None,
        };
        let ctx = ActivityContext {
            location: Some("x".to_string()),
            device: Some("y".to_string()),
        };
        let a = scorer.assess(&input(
            TransactionKind::Withdrawal,
            Decimal::new(999_999, 0),
            100,
            Some(&activity),
            &ctx,
        ));
        assert!(!scorer.blocks(&a));
    }
}
