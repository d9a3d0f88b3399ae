//! Conservation invariants checked before every settlement commit.
//!
//! ```text
//! Σ(Δbalance) + Δpool        == 0
//! Σ(Δnet_energy)             == 0
//! Δnet_energy(account)       == Σ(bought) - Σ(sold) over its fills
//! Δpool                      == Σ(fee)
//! ```
//!
//! Clearing only moves value and energy between accounts, so a violation
//! means the outcome is wrong and must not reach the store. The checks work
//! on deltas so that ledgers holding balances near the `Decimal` bounds are
//! verified without summing those balances.

use std::collections::BTreeMap;

use gridmatch_clearing::ClearingOutcome;
use gridmatch_types::{AccountId, GridmatchError, MeterAccount, Result};
use rust_decimal::Decimal;

/// Per-account state captured from a pre-settlement snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConservationCheck {
    /// Balance and net energy of every account before clearing.
    before: BTreeMap<AccountId, (Decimal, i64)>,
    pool_before: Decimal,
}

impl ConservationCheck {
    /// Capture the snapshot that clearing will run on.
    #[must_use]
    pub fn capture(snapshot: &[MeterAccount], pool_balance: Decimal) -> Self {
        let before = snapshot
            .iter()
            .map(|a| (a.id.clone(), (a.balance, a.net_energy)))
            .collect();
        Self {
            before,
            pool_before: pool_balance,
        }
    }

    #[must_use]
    pub fn accounts(&self) -> usize {
        self.before.len()
    }

    #[must_use]
    pub fn pool_before(&self) -> Decimal {
        self.pool_before
    }

    /// Verify that `outcome` conserves value and energy relative to the
    /// captured snapshot.
    ///
    /// # Errors
    /// Returns [`GridmatchError::ConservationViolation`] describing the first
    /// broken invariant, or [`GridmatchError::ArithmeticOverflow`] if a
    /// delta leaves the `Decimal` range.
    pub fn verify(&self, outcome: &ClearingOutcome) -> Result<()> {
        if outcome.pool_before != self.pool_before {
            return Err(violation(format!(
                "outcome starts from pool {} but snapshot pool is {}",
                outcome.pool_before, self.pool_before
            )));
        }

        let mut traded: BTreeMap<&AccountId, i128> = BTreeMap::new();
        let mut fees = Decimal::ZERO;
        for fill in &outcome.fills {
            *traded.entry(&fill.buyer).or_default() += i128::from(fill.quantity);
            *traded.entry(&fill.seller).or_default() -= i128::from(fill.quantity);
            fees = fees.checked_add(fill.fee).ok_or_else(|| overflow("fill fees"))?;
        }

        let pool_delta = outcome
            .pool_after
            .checked_sub(outcome.pool_before)
            .ok_or_else(|| overflow("pool delta"))?;
        let mut value_delta = pool_delta;
        let mut energy_delta: i128 = 0;
        let mut moved: BTreeMap<&AccountId, i128> = BTreeMap::new();

        for account in &outcome.updated {
            let Some(&(balance, energy)) = self.before.get(&account.id) else {
                return Err(violation(format!(
                    "clearing produced account {} that is not in the snapshot",
                    account.id
                )));
            };
            if moved.contains_key(&account.id) {
                return Err(violation(format!(
                    "clearing updated account {} twice",
                    account.id
                )));
            }
            let balance_delta = account
                .balance
                .checked_sub(balance)
                .ok_or_else(|| overflow("balance delta"))?;
            value_delta = value_delta
                .checked_add(balance_delta)
                .ok_or_else(|| overflow("value delta"))?;
            let delta = i128::from(account.net_energy) - i128::from(energy);
            energy_delta += delta;
            moved.insert(&account.id, delta);
        }

        if !value_delta.is_zero() {
            return Err(violation(format!(
                "settlement changes total value by {value_delta}"
            )));
        }
        if energy_delta != 0 {
            return Err(violation(format!(
                "settlement changes total energy by {energy_delta} kWh"
            )));
        }

        // Accounts absent from `updated` moved nothing, so their fills must net out too.
        for id in moved.keys().chain(traded.keys()) {
            let delta = moved.get(id).copied().unwrap_or_default();
            let expected = traded.get(id).copied().unwrap_or_default();
            if delta != expected {
                return Err(violation(format!(
                    "account {id} moved {delta} kWh but its fills account for {expected} kWh"
                )));
            }
        }

        if pool_delta != fees {
            return Err(violation(format!(
                "pool grew by {pool_delta} but fills charged {fees} in fees"
            )));
        }
        if outcome.fees_collected() != fees {
            return Err(violation(format!(
                "outcome reports {} in fees but fills charged {fees}",
                outcome.fees_collected()
            )));
        }

        Ok(())
    }
}

fn violation(reason: String) -> GridmatchError {
    tracing::error!(%reason, "Conservation check failed");
    GridmatchError::ConservationViolation { reason }
}

fn overflow(what: &str) -> GridmatchError {
    tracing::error!(what, "Conservation check overflowed");
    GridmatchError::ArithmeticOverflow {
        context: format!("conservation {what}"),
    }
}
