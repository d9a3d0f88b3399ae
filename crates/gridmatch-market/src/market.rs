//! The market: a store and its configuration.

use gridmatch_ledger::{ExchangeConfig, LedgerStore, MeterLedger};
use gridmatch_settlement::SettlementReport;
use gridmatch_types::{AccountId, ExchangeState, MarketConfig, MeterAccount, Result};
use rust_decimal::Decimal;

use crate::dispatch::{self, Operation, Query};
use crate::query::QueryFacade;

/// A GridMatch market over a [`LedgerStore`].
///
/// Calls run to completion one at a time; `&mut self` on every write makes
/// that ordering explicit.
pub struct Market<S: LedgerStore> {
    store: S,
    config: MarketConfig,
}

impl<S: LedgerStore> Market<S> {
    /// Wrap a store.
    ///
    /// # Errors
    /// Returns `Configuration` if `config` fails its sanity checks.
    pub fn new(store: S, config: MarketConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { store, config })
    }

    #[must_use]
    pub fn config(&self) -> &MarketConfig {
        &self.config
    }

    #[must_use]
    pub fn store(&self) -> &S {
        &self.store
    }

    // -----------------------------------------------------------------
    // String surface
    // -----------------------------------------------------------------

    /// `init <fee_rate>`. Returns an empty payload.
    pub fn init<A: AsRef<str>>(&mut self, args: &[A]) -> Result<Vec<u8>> {
        let fee_rate = dispatch::parse_init(args)?;
        self.initialize(fee_rate)?;
        Ok(Vec::new())
    }

    /// Dispatch a state-changing function. Returns an empty payload.
    pub fn invoke<A: AsRef<str>>(&mut self, function: &str, args: &[A]) -> Result<Vec<u8>> {
        let op = Operation::parse(function, args)?;
        self.apply(op)?;
        Ok(Vec::new())
    }

    /// Dispatch a read-only function.
    pub fn query<A: AsRef<str>>(&self, function: &str, args: &[A]) -> Result<Vec<u8>> {
        let query = Query::parse(function, args)?;
        tracing::debug!(query = query.name(), "Query");
        self.queries().execute(&query)
    }

    /// Execute a parsed operation.
    pub fn apply(&mut self, op: Operation) -> Result<()> {
        tracing::debug!(operation = op.name(), "Invoke");
        match op {
            Operation::Enroll {
                id,
                name,
                rate_per_kwh,
            } => self.enroll(id, &name, rate_per_kwh).map(drop),
            Operation::Delete { id } => self.delete(&id),
            Operation::ChangeAccountBalance { id, amount } => {
                self.change_account_balance(&id, amount).map(drop)
            }
            Operation::ReportDelta { id, delta_kwh } => self.report_delta(&id, delta_kwh).map(drop),
            Operation::Settle => self.settle().map(drop),
        }
    }

    // -----------------------------------------------------------------
    // Typed surface
    // -----------------------------------------------------------------

    /// Set the fee rate and reset the pool. Overwrites any earlier state.
    pub fn initialize(&mut self, fee_rate: Decimal) -> Result<ExchangeState> {
        ExchangeConfig::new(&mut self.store, &self.config).initialize(fee_rate)
    }

    pub fn enroll(&mut self, id: AccountId, name: &str, rate_per_kwh: i64) -> Result<MeterAccount> {
        self.ledger().enroll(id, name, rate_per_kwh)
    }

    pub fn delete(&mut self, id: &AccountId) -> Result<()> {
        self.ledger().delete(id)
    }

    pub fn change_account_balance(&mut self, id: &AccountId, amount: Decimal) -> Result<MeterAccount> {
        self.ledger().adjust_balance(id, amount)
    }

    pub fn report_delta(&mut self, id: &AccountId, delta_kwh: i64) -> Result<MeterAccount> {
        self.ledger().accumulate_energy(id, delta_kwh)
    }

    /// Run one settlement cycle.
    pub fn settle(&mut self) -> Result<SettlementReport> {
        gridmatch_settlement::settle(&mut self.store)
    }

    #[must_use]
    pub fn queries(&self) -> QueryFacade<'_, S> {
        QueryFacade::new(&self.store)
    }

    fn ledger(&mut self) -> MeterLedger<'_, S> {
        MeterLedger::new(&mut self.store, &self.config)
    }
}
