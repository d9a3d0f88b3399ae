//! Exchange-wide market parameters.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Fee rate and operator pool balance, loaded and committed as one value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExchangeState {
    /// Fraction of each trade's value retained by the operator.
    pub fee_rate: Decimal,
    /// Accumulated fees.
    pub pool_balance: Decimal,
}

impl ExchangeState {
    /// State of a freshly initialized market: empty pool.
    #[must_use]
    pub fn new(fee_rate: Decimal) -> Self {
        Self {
            fee_rate,
            pool_balance: Decimal::ZERO,
        }
    }

    /// Whether the fee rate lies in the conventional [0, 1] range.
    #[must_use]
    pub fn fee_rate_in_bounds(&self) -> bool {
        self.fee_rate >= Decimal::ZERO && self.fee_rate <= Decimal::ONE
    }
}
