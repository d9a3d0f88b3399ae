//! Trade records produced by the clearing pass.
//!
//! A [`Fill`] is the immutable record of one buyer/seller match. All money
//! fields derive from `quantity`, `price` and the cycle's fee rate:
//! `trade_value = quantity * price`, `seller_credit = trade_value - fee`.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::AccountId;

/// One executed match between a deficit and a surplus account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fill {
    /// Position of this fill within its settlement cycle (0-based).
    pub seq: u64,
    /// Account whose deficit was reduced.
    pub buyer: AccountId,
    /// Account whose surplus was consumed.
    pub seller: AccountId,
    /// kWh transferred.
    pub quantity: i64,
    /// Per-kWh price: always the seller's rate.
    pub price: i64,
    /// Amount debited from the buyer.
    #[serde(with = "rust_decimal::serde::str")]
    pub trade_value: Decimal,
    /// Amount retained by the exchange pool.
    #[serde(with = "rust_decimal::serde::str")]
    pub fee: Decimal,
    /// Amount credited to the seller.
    #[serde(with = "rust_decimal::serde::str")]
    pub seller_credit: Decimal,
}

impl std::fmt::Display for Fill {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Fill[{}] {} <- {} {} kWh @ {} = {} (fee {})",
            self.seq, self.buyer, self.seller, self.quantity, self.price, self.trade_value, self.fee,
        )
    }
}
