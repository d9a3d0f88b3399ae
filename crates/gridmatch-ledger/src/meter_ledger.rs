//! Meter account CRUD.
//!
//! Tracks one record per enrolled meter. Every mutation is validated
//! before it is staged, and staged writes go to the store as a single
//! batch: either the operation fully succeeds or the ledger is unchanged.
//!
//! `adjust_balance` and `accumulate_energy` are read-modify-write. The write
//! is guarded by the version the record was read at, so if another writer
//! slipped in between, the update fails with `VersionConflict` instead of
//! silently overwriting it.

use gridmatch_types::{AccountId, GridmatchError, MarketConfig, MeterAccount, Result, amount};
use rust_decimal::Decimal;

use crate::reader::LedgerReader;
use crate::store::{LedgerStore, WriteBatch};

/// Mutating access to the `Meters` table.
pub struct MeterLedger<'a, S: LedgerStore + ?Sized> {
    store: &'a mut S,
    config: &'a MarketConfig,
}

impl<'a, S: LedgerStore + ?Sized> MeterLedger<'a, S> {
    pub fn new(store: &'a mut S, config: &'a MarketConfig) -> Self {
        Self { store, config }
    }

    fn reader(&self) -> LedgerReader<'_, S> {
        LedgerReader::new(&*self.store)
    }

    /// Enroll a new meter with zero energy and zero balance.
    ///
    /// # Errors
    /// - `InvalidRate` if inputs are validated and `rate_per_kwh <= 0`
    /// - `AccountAlreadyExists` if `id` is taken
    /// - `AccountLimitReached` if the ledger is full
    pub fn enroll(&mut self, id: AccountId, name: &str, rate_per_kwh: i64) -> Result<MeterAccount> {
        self.config.check_rate(rate_per_kwh)?;

        let reader = self.reader();
        if reader.find(&id)?.is_some() {
            tracing::warn!(account = %id, "Enroll rejected: id already taken");
            return Err(GridmatchError::AccountAlreadyExists(id));
        }
        if reader.count()? >= self.config.max_accounts {
            return Err(GridmatchError::AccountLimitReached {
                limit: self.config.max_accounts,
            });
        }

        let mut account = MeterAccount::enrolled(id, name, rate_per_kwh);
        let mut batch = WriteBatch::new();
        batch.insert_meter(&account);
        self.store.commit(batch)?;
        account.version = 1;

        tracing::info!(account = %account.id, name, rate = rate_per_kwh, "Meter enrolled");
        Ok(account)
    }

    /// Remove an enrolled meter.
    pub fn delete(&mut self, id: &AccountId) -> Result<()> {
        let existing = self.reader().get(id)?;
        let mut batch = WriteBatch::new();
        batch.delete_meter(id, existing.version);
        self.store.commit(batch)?;

        tracing::info!(account = %id, "Meter deleted");
        Ok(())
    }

    pub fn get(&self, id: &AccountId) -> Result<MeterAccount> {
        self.reader().get(id)
    }

    pub fn list_all(&self) -> Result<Vec<MeterAccount>> {
        self.reader().list_all()
    }

    /// Replace an existing record. The record must carry the version it was
    /// read at; on success the returned copy carries the new version.
    ///
    /// # Errors
    /// - `AccountNotFound` if no record matches `record.id`
    /// - `VersionConflict` if the stored record changed since it was read
    pub fn put(&mut self, record: &MeterAccount) -> Result<MeterAccount> {
        let mut batch = WriteBatch::new();
        batch.replace_meter(record);
        self.store.commit(batch)?;

        let mut updated = record.clone();
        updated.version += 1;
        Ok(updated)
    }

    /// Add `delta` to the balance. Negative values are withdrawals; the
    /// balance may go below zero.
    ///
    /// # Errors
    /// Returns `ArithmeticOverflow` if the balance would leave the `Decimal`
    /// range. The record is left as it was.
    pub fn adjust_balance(&mut self, id: &AccountId, delta: Decimal) -> Result<MeterAccount> {
        let mut account = self.get(id)?;
        let previous = account.balance;
        let sum = previous
            .checked_add(amount::normalize(delta))
            .ok_or_else(|| GridmatchError::ArithmeticOverflow {
                context: format!("balance of account {id}"),
            })?;
        account.balance = amount::normalize(sum);

        tracing::debug!(
            account = %id,
            previous = %previous,
            new = %account.balance,
            "Balance adjusted"
        );
        self.put(&account)
    }

    /// Add `delta` kWh to the reported net energy. Positive = produced,
    /// negative = consumed.
    ///
    /// # Errors
    /// Returns `EnergyOverflow` if the counter would leave the `i64` range.
    pub fn accumulate_energy(&mut self, id: &AccountId, delta: i64) -> Result<MeterAccount> {
        let mut account = self.get(id)?;
        let previous = account.net_energy;
        account.net_energy = previous
            .checked_add(delta)
            .ok_or_else(|| GridmatchError::EnergyOverflow(id.clone()))?;

        tracing::debug!(
            account = %id,
            previous,
            new = account.net_energy,
            "Reported energy accumulated"
        );
        self.put(&account)
    }
}
