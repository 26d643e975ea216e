//! Fraud heuristics over a user's recent transaction window.
//!
//! Two signals, checked in order: raw velocity (too many transactions in
//! the window) and amount patterning (too many near-identical amounts,
//! typical of card-testing and structuring). Either one flags the request.
//!
//! Like the risk scorer, the screen itself is pure over a caller-supplied
//! window; a failed window lookup degrades to a pass upstream.

use ledgerguard_types::{FraudConfig, TransactionRecord};
use rust_decimal::Decimal;
use tracing::debug;

/// Outcome of the fraud screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FraudVerdict {
    Clear,
    Flagged { reason: String },
}

impl FraudVerdict {
    #[must_use]
    pub fn is_flagged(&self) -> bool {
        matches!(self, Self::Flagged { .. })
    }
}

/// Evaluates a proposed transaction against the user's recent window.
#[derive(Debug, Clone)]
pub struct FraudScreen {
    config: FraudConfig,
}

impl FraudScreen {
    #[must_use]
    pub fn new(config: FraudConfig) -> Self {
        Self { config }
    }

    /// The window cutoff this screen expects its input gathered from.
    #[must_use]
    pub fn window_hours(&self) -> i64 {
        self.config.window_hours
    }

    /// Evaluate one proposed amount against the user's completed
    /// transactions inside the window (the proposed one excluded).
    #[must_use]
    pub fn evaluate(&self, amount: Decimal, window: &[TransactionRecord]) -> FraudVerdict {
        if window.len() > self.config.max_velocity {
            debug!(
                in_window = window.len(),
                max = self.config.max_velocity,
                "fraud velocity exceeded"
            );
            return FraudVerdict::Flagged {
                reason: "Unusual transaction frequency".to_string(),
            };
        }

        let near_identical = window
            .iter()
            .filter(|r| (r.amount - amount).abs() <= self.config.amount_epsilon)
            .count();
        if near_identical > self.config.pattern_min_count {
            debug!(
                matches = near_identical,
                %amount,
                "fraud amount pattern detected"
            );
            return FraudVerdict::Flagged {
                reason: "Suspicious amount pattern".to_string(),
            };
        }

        FraudVerdict::Clear
    }
}
