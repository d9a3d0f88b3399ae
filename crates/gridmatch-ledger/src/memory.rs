//! In-process reference store.
//!
//! Rows carry a revision counter starting at 1 on insert and bumped on every
//! replace. A commit stages all of its writes against copies of the state
//! and swaps them in only when every write succeeded, so a failing batch
//! leaves the store exactly as it was.

use std::collections::BTreeMap;

use gridmatch_types::{AccountId, GridmatchError, Result};
use serde::Serialize;

use crate::store::{LedgerStore, MeterRow, VersionedRow, WriteBatch, WriteOp};

/// In-memory [`LedgerStore`] with per-row optimistic versioning.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    /// Scalar state values.
    state: BTreeMap<String, String>,
    /// The `Meters` table.
    rows: BTreeMap<AccountId, VersionedRow>,
    /// Number of batches successfully applied.
    commits: u64,
}

/// Serializable dump of a store's contents.
#[derive(Debug, Serialize)]
pub struct StoreDump<'a> {
    pub state: &'a BTreeMap<String, String>,
    #[serde(rename = "Meters")]
    pub meters: Vec<&'a MeterRow>,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of batches applied since creation.
    #[must_use]
    pub fn commit_count(&self) -> u64 {
        self.commits
    }

    /// Borrow the full contents for serialization.
    #[must_use]
    pub fn dump(&self) -> StoreDump<'_> {
        StoreDump {
            state: &self.state,
            meters: self.rows.values().map(|r| &r.row).collect(),
        }
    }

    fn apply(
        state: &mut BTreeMap<String, String>,
        rows: &mut BTreeMap<AccountId, VersionedRow>,
        op: WriteOp,
    ) -> Result<()> {
        match op {
            WriteOp::PutState { key, value } => {
                state.insert(key, value);
            }
            WriteOp::InsertRow(row) => {
                let id = AccountId::new(row.account_id.clone());
                if rows.contains_key(&id) {
                    return Err(GridmatchError::AccountAlreadyExists(id));
                }
                rows.insert(id, VersionedRow { row, version: 1 });
            }
            WriteOp::ReplaceRow {
                row,
                expected_version,
            } => {
                let id = AccountId::new(row.account_id.clone());
                let current = rows
                    .get_mut(&id)
                    .ok_or_else(|| GridmatchError::AccountNotFound(id.clone()))?;
                if current.version != expected_version {
                    return Err(GridmatchError::VersionConflict {
                        id,
                        expected: expected_version,
                        actual: current.version,
                    });
                }
                current.row = row;
                current.version += 1;
            }
            WriteOp::DeleteRow {
                id,
                expected_version,
            } => {
                let current = rows
                    .get(&id)
                    .ok_or_else(|| GridmatchError::AccountNotFound(id.clone()))?;
                if current.version != expected_version {
                    return Err(GridmatchError::VersionConflict {
                        expected: expected_version,
                        actual: current.version,
                        id,
                    });
                }
                rows.remove(&id);
            }
        }
        Ok(())
    }
}

impl LedgerStore for MemoryStore {
    fn get_state(&self, key: &str) -> Result<Option<String>> {
        Ok(self.state.get(key).cloned())
    }

    fn get_row(&self, id: &AccountId) -> Result<Option<VersionedRow>> {
        Ok(self.rows.get(id).cloned())
    }

    fn rows(&self) -> Result<Vec<VersionedRow>> {
        Ok(self.rows.values().cloned().collect())
    }

    fn row_count(&self) -> Result<usize> {
        Ok(self.rows.len())
    }

    fn commit(&mut self, batch: WriteBatch) -> Result<()> {
        if batch.is_empty() {
            return Ok(());
        }

        let mut state = self.state.clone();
        let mut rows = self.rows.clone();
        let len = batch.len();
        for op in batch.into_ops() {
            Self::apply(&mut state, &mut rows, op)?;
        }

        self.state = state;
        self.rows = rows;
        self.commits += 1;
        tracing::trace!(ops = len, commits = self.commits, "Batch committed");
        Ok(())
    }
}
