//! Pure deterministic double-auction clearing.
//!
//! ```text
//! clear(snapshot, exchange_state) -> ClearingOutcome
//! ```
//!
//! ## Algorithm
//!
//! 1. Rank buyers and sellers by ascending rate (ties by id), see [`ClearingBook`]
//! 2. For each buyer in rank order, take surplus from sellers in rank order
//!    while the buyer still has a deficit and the seller's ask is at or below
//!    the buyer's bid
//! 3. Each fill trades `min(deficit, surplus)` kWh at the **seller's** rate;
//!    `fee = value * fee_rate` goes to the pool, the rest to the seller
//! 4. Whatever is left unmatched stays on the accounts for the next cycle
//!
//! ## Seller cursor
//!
//! A buyer always drains sellers front to back, so the exhausted sellers form
//! a prefix of the ranked list. Keeping a cursor past that prefix yields the
//! same fills as rescanning every seller for every buyer, in O(B + S) after
//! sorting. Buyers arrive in ascending bid order, so once the cursor's ask is
//! above a buyer's bid that buyer is done.

use gridmatch_types::{
    AccountId, ExchangeState, Fill, GridmatchError, MeterAccount, Result, amount,
};
use rust_decimal::Decimal;

use crate::book::ClearingBook;
use crate::determinism::compute_settlement_root;

/// Result of one clearing pass.
#[derive(Debug, Clone)]
pub struct ClearingOutcome {
    /// Executed fills in execution order.
    pub fills: Vec<Fill>,
    /// Every account that took part in at least one fill, sorted by id.
    /// Each carries the version it had in the snapshot.
    pub updated: Vec<MeterAccount>,
    /// Fee rate the pass ran with.
    pub fee_rate: Decimal,
    /// Pool balance before clearing.
    pub pool_before: Decimal,
    /// Pool balance after all fees were added.
    pub pool_after: Decimal,
    /// Sum of every fill's fee.
    pub fees: Decimal,
    /// Buyers still holding a deficit after clearing.
    pub carried_buyers: usize,
    /// Sellers still holding a surplus after clearing.
    pub carried_sellers: usize,
    /// SHA-256 fingerprint of `fills`.
    pub settlement_root: [u8; 32],
}

impl ClearingOutcome {
    /// `true` when nothing traded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fills.is_empty()
    }

    /// Fees collected by this pass.
    #[must_use]
    pub fn fees_collected(&self) -> Decimal {
        self.fees
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

/// Clear a snapshot against the exchange state.
///
/// The snapshot is not modified; updated copies of the accounts that traded
/// are returned in the outcome.
///
/// # Errors
/// Returns [`GridmatchError::ArithmeticOverflow`] if a trade value, fee or
/// balance leaves the representable range. No partial outcome is produced.
pub fn clear(snapshot: &[MeterAccount], exchange: &ExchangeState) -> Result<ClearingOutcome> {
    let mut book = ClearingBook::from_snapshot(snapshot);

    if !book.is_two_sided() || book.best_ask() > book.best_bid() {
        tracing::debug!(
            buyers = book.buyers.len(),
            sellers = book.sellers.len(),
            idle = book.idle,
            best_bid = ?book.best_bid(),
            best_ask = ?book.best_ask(),
            "Book does not cross"
        );
        return Ok(ClearingOutcome {
            fills: Vec::new(),
            updated: Vec::new(),
            fee_rate: exchange.fee_rate,
            pool_before: exchange.pool_balance,
            pool_after: exchange.pool_balance,
            fees: Decimal::ZERO,
            carried_buyers: book.buyers.len(),
            carried_sellers: book.sellers.len(),
            settlement_root: compute_settlement_root(&[]),
        });
    }

    let mut pool = exchange.pool_balance;
    let mut fees = Decimal::ZERO;
    let mut fills: Vec<Fill> = Vec::new();

    let mut buyer_traded = vec![false; book.buyers.len()];
    let mut seller_traded = vec![false; book.sellers.len()];
    let mut seller_idx = 0;

    for (buyer_idx, buyer) in book.buyers.iter_mut().enumerate() {
        while seller_idx < book.sellers.len() && buyer.net_energy < 0 {
            let seller = &mut book.sellers[seller_idx];

            if seller.net_energy <= 0 {
                seller_idx += 1;
                continue;
            }
            if seller.rate_per_kwh > buyer.rate_per_kwh {
                break;
            }

            let fill = execute(fills.len() as u64, buyer, seller, exchange.fee_rate, &mut pool)?;
            fees = fees
                .checked_add(fill.fee)
                .ok_or_else(|| overflow("fees collected", &buyer.id, &seller.id))?;
            buyer_traded[buyer_idx] = true;
            seller_traded[seller_idx] = true;

            tracing::debug!(
                seq = fill.seq,
                buyer = %fill.buyer,
                seller = %fill.seller,
                qty = fill.quantity,
                price = fill.price,
                value = %fill.trade_value,
                fee = %fill.fee,
                "Fill executed"
            );

            if seller.net_energy == 0 {
                seller_idx += 1;
            }
            fills.push(fill);
        }

        if seller_idx == book.sellers.len() {
            break;
        }
    }

    let carried_buyers = book.buyers.iter().filter(|b| b.net_energy < 0).count();
    let carried_sellers = book.sellers.iter().filter(|s| s.net_energy > 0).count();

    let mut updated: Vec<MeterAccount> = book
        .buyers
        .into_iter()
        .zip(buyer_traded)
        .chain(book.sellers.into_iter().zip(seller_traded))
        .filter_map(|(account, traded)| traded.then_some(account))
        .collect();
    updated.sort_by(|a, b| a.id.cmp(&b.id));

    let settlement_root = compute_settlement_root(&fills);

    tracing::info!(
        fills = fills.len(),
        updated = updated.len(),
        carried_buyers,
        carried_sellers,
        pool_before = %exchange.pool_balance,
        pool_after = %pool,
        fees = %fees,
        root = hex::encode(settlement_root),
        "Clearing complete"
    );

    Ok(ClearingOutcome {
        fills,
        updated,
        fee_rate: exchange.fee_rate,
        pool_before: exchange.pool_balance,
        pool_after: pool,
        fees,
        carried_buyers,
        carried_sellers,
        settlement_root,
    })
}

/// Trade `min(deficit, surplus)` between one buyer and one seller.
///
/// All amounts are computed before anything is written, so an overflow
/// leaves both accounts and the pool untouched.
fn execute(
    seq: u64,
    buyer: &mut MeterAccount,
    seller: &mut MeterAccount,
    fee_rate: Decimal,
    pool: &mut Decimal,
) -> Result<Fill> {
    // Bounded by the seller's surplus, which fits in i64.
    let quantity = i64::try_from(buyer.deficit().min(seller.surplus()))
        .map_err(|_| overflow("fill quantity", &buyer.id, &seller.id))?;
    let price = seller.rate_per_kwh;

    let trade_value = Decimal::from(quantity)
        .checked_mul(Decimal::from(price))
        .ok_or_else(|| overflow("trade value", &buyer.id, &seller.id))?;
    let fee = amount::normalize(
        trade_value
            .checked_mul(fee_rate)
            .ok_or_else(|| overflow("fee", &buyer.id, &seller.id))?,
    );
    let seller_credit = trade_value
        .checked_sub(fee)
        .ok_or_else(|| overflow("seller credit", &buyer.id, &seller.id))?;

    let buyer_balance = buyer
        .balance
        .checked_sub(trade_value)
        .ok_or_else(|| overflow("buyer balance", &buyer.id, &seller.id))?;
    let seller_balance = seller
        .balance
        .checked_add(seller_credit)
        .ok_or_else(|| overflow("seller balance", &buyer.id, &seller.id))?;
    let pool_after = pool
        .checked_add(fee)
        .ok_or_else(|| overflow("pool balance", &buyer.id, &seller.id))?;

    seller.net_energy -= quantity;
    buyer.net_energy += quantity;
    buyer.balance = buyer_balance;
    seller.balance = seller_balance;
    *pool = pool_after;

    Ok(Fill {
        seq,
        buyer: buyer.id.clone(),
        seller: seller.id.clone(),
        quantity,
        price,
        trade_value,
        fee,
        seller_credit,
    })
}

fn overflow(what: &str, buyer: &AccountId, seller: &AccountId) -> GridmatchError {
    GridmatchError::ArithmeticOverflow {
        context: format!("{what} for buyer {buyer} / seller {seller}"),
    }
}
