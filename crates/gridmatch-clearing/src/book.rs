//! Two-sided book built from a ledger snapshot.
//!
//! Buyers (negative net energy) and sellers (positive net energy) are each
//! ranked by ascending rate, ties broken by ascending account id. Idle
//! accounts never enter the book.

use gridmatch_types::{MeterAccount, MeterRole};

/// Ranked buyers and sellers for one clearing pass.
#[derive(Debug, Clone, Default)]
pub struct ClearingBook {
    /// Deficit accounts, lowest bid first.
    pub buyers: Vec<MeterAccount>,
    /// Surplus accounts, lowest ask first.
    pub sellers: Vec<MeterAccount>,
    /// Accounts excluded because their net energy is zero.
    pub idle: usize,
}

impl ClearingBook {
    /// Partition and rank a snapshot. The snapshot's own order is irrelevant.
    #[must_use]
    pub fn from_snapshot(snapshot: &[MeterAccount]) -> Self {
        let mut book = Self::default();
        for account in snapshot {
            match account.role() {
                MeterRole::Buyer => book.buyers.push(account.clone()),
                MeterRole::Seller => book.sellers.push(account.clone()),
                MeterRole::Idle => book.idle += 1,
            }
        }
        sort_by_rate(&mut book.buyers);
        sort_by_rate(&mut book.sellers);
        book
    }

    /// Whether any trade is structurally possible.
    #[must_use]
    pub fn is_two_sided(&self) -> bool {
        !self.buyers.is_empty() && !self.sellers.is_empty()
    }

    /// Lowest ask on the book.
    #[must_use]
    pub fn best_ask(&self) -> Option<i64> {
        self.sellers.first().map(|s| s.rate_per_kwh)
    }

    /// Highest bid on the book.
    #[must_use]
    pub fn best_bid(&self) -> Option<i64> {
        self.buyers.last().map(|b| b.rate_per_kwh)
    }
}

fn sort_by_rate(accounts: &mut [MeterAccount]) {
    accounts.sort_by(|a, b| {
        a.rate_per_kwh
            .cmp(&b.rate_per_kwh)
            .then_with(|| a.id.cmp(&b.id))
    });
}
