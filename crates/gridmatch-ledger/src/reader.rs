//! Decoded read-only views over a [`LedgerStore`].

use gridmatch_types::{
    AccountId, ExchangeState, GridmatchError, MeterAccount, Result, amount, constants,
};
use rust_decimal::Decimal;

use crate::codec;
use crate::store::LedgerStore;

/// Read-only access to accounts and exchange parameters.
pub struct LedgerReader<'a, S: LedgerStore + ?Sized> {
    store: &'a S,
}

impl<'a, S: LedgerStore + ?Sized> LedgerReader<'a, S> {
    #[must_use]
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// Look up an account, `None` if it is not enrolled.
    pub fn find(&self, id: &AccountId) -> Result<Option<MeterAccount>> {
        self.store
            .get_row(id)?
            .map(|stored| codec::decode(&stored))
            .transpose()
    }

    /// Look up an account.
    ///
    /// # Errors
    /// Returns [`GridmatchError::AccountNotFound`] if `id` is not enrolled.
    pub fn get(&self, id: &AccountId) -> Result<MeterAccount> {
        self.find(id)?
            .ok_or_else(|| GridmatchError::AccountNotFound(id.clone()))
    }

    /// Every enrolled account. Order follows the store and is unspecified.
    pub fn list_all(&self) -> Result<Vec<MeterAccount>> {
        self.store.rows()?.iter().map(codec::decode).collect()
    }

    pub fn count(&self) -> Result<usize> {
        self.store.row_count()
    }

    pub fn fee_rate(&self) -> Result<Decimal> {
        self.scalar(constants::EXCHANGE_RATE_KEY)
    }

    pub fn pool_balance(&self) -> Result<Decimal> {
        self.scalar(constants::EXCHANGE_BALANCE_KEY)
    }

    pub fn exchange_state(&self) -> Result<ExchangeState> {
        Ok(ExchangeState {
            fee_rate: self.fee_rate()?,
            pool_balance: self.pool_balance()?,
        })
    }

    fn scalar(&self, key: &str) -> Result<Decimal> {
        let text = self
            .store
            .get_state(key)?
            .ok_or_else(|| GridmatchError::NotInitialized {
                key: key.to_string(),
            })?;
        amount::decode(key, &text)
    }
}
