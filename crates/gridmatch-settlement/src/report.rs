//! Settlement report returned by every successful cycle.

use chrono::{DateTime, Utc};
use gridmatch_clearing::ClearingOutcome;
use gridmatch_types::{AccountId, Fill};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Summary of one committed settlement cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettlementReport {
    /// Fills in execution order.
    pub fills: Vec<Fill>,
    /// Accounts written by the commit, sorted by id.
    pub committed: Vec<AccountId>,
    #[serde(with = "rust_decimal::serde::str")]
    pub fee_rate: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub pool_before: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub pool_after: Decimal,
    /// Fees moved into the pool by this cycle.
    #[serde(with = "rust_decimal::serde::str")]
    pub fees: Decimal,
    /// Buyers left with a deficit for the next cycle.
    pub carried_buyers: usize,
    /// Sellers left with a surplus for the next cycle.
    pub carried_sellers: usize,
    /// Hex SHA-256 over `fills`.
    pub settlement_root: String,
    pub settled_at: DateTime<Utc>,
}

impl SettlementReport {
    pub(crate) fn new(outcome: ClearingOutcome, settled_at: DateTime<Utc>) -> Self {
        Self {
            committed: outcome.updated.iter().map(|a| a.id.clone()).collect(),
            fee_rate: outcome.fee_rate,
            pool_before: outcome.pool_before,
            pool_after: outcome.pool_after,
            fees: outcome.fees,
            carried_buyers: outcome.carried_buyers,
            carried_sellers: outcome.carried_sellers,
            settlement_root: hex::encode(outcome.settlement_root),
            fills: outcome.fills,
            settled_at,
        }
    }

    /// `true` when the cycle traded nothing.
    #[must_use]
    pub fn is_noop(&self) -> bool {
        self.fills.is_empty()
    }

    /// Total kWh traded.
    #[must_use]
    pub fn volume(&self) -> u128 {
        self.fills
            .iter()
            .map(|f| u128::from(f.quantity.unsigned_abs()))
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use gridmatch_clearing::clear;
    use gridmatch_types::{ExchangeState, MeterAccount};

    use super::*;

    #[test]
    fn report_from_outcome() {
        let snapshot = vec![
            MeterAccount::dummy("A", -100, 5),
            MeterAccount::dummy("B", 150, 3),
        ];
        let outcome = clear(&snapshot, &ExchangeState::new(Decimal::new(1, 1))).unwrap();
        let root = hex::encode(outcome.settlement_root);
        let report = SettlementReport::new(outcome, Utc::now());

        assert!(!report.is_noop());
        assert_eq!(report.committed, [AccountId::from("A"), AccountId::from("B")]);
        assert_eq!(report.fees, Decimal::new(30, 0));
        assert_eq!(report.volume(), 100);
        assert_eq!(report.settlement_root, root);
        assert_eq!(report.settlement_root.len(), 64);
    }

    #[test]
    fn serializes_money_as_text() {
        let outcome = clear(&[], &ExchangeState::new(Decimal::new(25, 3))).unwrap();
        let report = SettlementReport::new(outcome, Utc::now());
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["fees"], "0");
        assert_eq!(json["fee_rate"], "0.025");
        assert_eq!(json["fills"], serde_json::json!([]));
    }
}
