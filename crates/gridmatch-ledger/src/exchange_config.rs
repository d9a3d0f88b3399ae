//! Market-wide parameters: fee rate and operator pool balance.

use gridmatch_types::{ExchangeState, MarketConfig, Result, amount};
use rust_decimal::Decimal;

use crate::reader::LedgerReader;
use crate::store::{LedgerStore, WriteBatch};

/// Read/write access to the exchange scalars.
pub struct ExchangeConfig<'a, S: LedgerStore + ?Sized> {
    store: &'a mut S,
    config: &'a MarketConfig,
}

impl<'a, S: LedgerStore + ?Sized> ExchangeConfig<'a, S> {
    pub fn new(store: &'a mut S, config: &'a MarketConfig) -> Self {
        Self { store, config }
    }

    /// Set the fee rate and reset the pool to zero.
    ///
    /// Calling this again overwrites both values, including any fees already
    /// collected.
    ///
    /// # Errors
    /// Returns `InvalidFeeRate` if inputs are validated and the rate lies
    /// outside [0, 1].
    pub fn initialize(&mut self, fee_rate: Decimal) -> Result<ExchangeState> {
        self.config.check_fee_rate(fee_rate)?;

        let state = ExchangeState::new(amount::normalize(fee_rate));
        let mut batch = WriteBatch::new();
        batch
            .put_fee_rate(state.fee_rate)
            .put_pool_balance(state.pool_balance);
        self.store.commit(batch)?;

        tracing::info!(fee_rate = %state.fee_rate, "Exchange initialized");
        Ok(state)
    }

    pub fn fee_rate(&self) -> Result<Decimal> {
        LedgerReader::new(&*self.store).fee_rate()
    }

    pub fn pool_balance(&self) -> Result<Decimal> {
        LedgerReader::new(&*self.store).pool_balance()
    }

    pub fn state(&self) -> Result<ExchangeState> {
        LedgerReader::new(&*self.store).exchange_state()
    }

    /// Overwrite the pool balance.
    pub fn set_pool_balance(&mut self, value: Decimal) -> Result<()> {
        let mut batch = WriteBatch::new();
        batch.put_pool_balance(value);
        self.store.commit(batch)
    }
}
