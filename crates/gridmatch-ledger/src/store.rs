//! The persisted store boundary.
//!
//! The store holds two kinds of data:
//! - scalar state values keyed by name (`exchange_rate`, `exchange_account_balance`)
//! - the `Meters` table, one [`MeterRow`] per enrolled account
//!
//! Reads are individual; writes are only ever issued through
//! [`LedgerStore::commit`], which must apply a whole [`WriteBatch`] or none
//! of it.

use gridmatch_types::{AccountId, MeterAccount, Result, amount, constants};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One row of the `Meters` table, with the persisted column names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeterRow {
    #[serde(rename = "AccountId")]
    pub account_id: String,
    #[serde(rename = "AccountName")]
    pub account_name: String,
    #[serde(rename = "ReportedKWH")]
    pub reported_kwh: i64,
    /// Fixed 6-decimal text.
    #[serde(rename = "AccountBalance")]
    pub account_balance: String,
    #[serde(rename = "RatePerKWH")]
    pub rate_per_kwh: i64,
}

/// A row together with the revision the store holds it at.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionedRow {
    pub row: MeterRow,
    pub version: u64,
}

/// A single staged write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteOp {
    /// Overwrite a scalar state value.
    PutState { key: String, value: String },
    /// Create a row. Fails if the key is taken.
    InsertRow(MeterRow),
    /// Replace an existing row. Fails if absent or not at `expected_version`.
    ReplaceRow { row: MeterRow, expected_version: u64 },
    /// Remove an existing row. Fails if absent or not at `expected_version`.
    DeleteRow { id: AccountId, expected_version: u64 },
}

/// An ordered set of writes committed atomically.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WriteBatch {
    ops: Vec<WriteOp>,
}

impl WriteBatch {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn put_state(&mut self, key: &str, value: String) -> &mut Self {
        self.ops.push(WriteOp::PutState {
            key: key.to_string(),
            value,
        });
        self
    }

    pub fn put_fee_rate(&mut self, fee_rate: Decimal) -> &mut Self {
        self.put_state(constants::EXCHANGE_RATE_KEY, amount::format(fee_rate))
    }

    pub fn put_pool_balance(&mut self, pool_balance: Decimal) -> &mut Self {
        self.put_state(constants::EXCHANGE_BALANCE_KEY, amount::format(pool_balance))
    }

    pub fn insert_meter(&mut self, account: &MeterAccount) -> &mut Self {
        self.ops.push(WriteOp::InsertRow(crate::codec::encode(account)));
        self
    }

    /// Stage a replacement guarded by the version `account` was read at.
    pub fn replace_meter(&mut self, account: &MeterAccount) -> &mut Self {
        self.ops.push(WriteOp::ReplaceRow {
            row: crate::codec::encode(account),
            expected_version: account.version,
        });
        self
    }

    pub fn delete_meter(&mut self, id: &AccountId, expected_version: u64) -> &mut Self {
        self.ops.push(WriteOp::DeleteRow {
            id: id.clone(),
            expected_version,
        });
        self
    }

    #[must_use]
    pub fn ops(&self) -> &[WriteOp] {
        &self.ops
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.ops.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    #[must_use]
    pub fn into_ops(self) -> Vec<WriteOp> {
        self.ops
    }
}

/// Transactional key/table store backing a market.
pub trait LedgerStore {
    /// Read a scalar state value.
    fn get_state(&self, key: &str) -> Result<Option<String>>;

    /// Read one `Meters` row.
    fn get_row(&self, id: &AccountId) -> Result<Option<VersionedRow>>;

    /// Enumerate every `Meters` row. Order is unspecified.
    fn rows(&self) -> Result<Vec<VersionedRow>>;

    /// Number of `Meters` rows.
    fn row_count(&self) -> Result<usize> {
        Ok(self.rows()?.len())
    }

    /// Apply every write in `batch`, or none of them.
    ///
    /// # Errors
    /// - `AccountAlreadyExists` on an insert over an existing key
    /// - `AccountNotFound` on a replace/delete of a missing key
    /// - `VersionConflict` when a guarded row moved on
    /// - `Persistence` for substrate failures
    fn commit(&mut self, batch: WriteBatch) -> Result<()>;
}
