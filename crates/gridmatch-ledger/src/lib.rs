//! # gridmatch-ledger
//!
//! **Ledger plane**: typed access to meter accounts and exchange parameters
//! on top of a transactional key/table store.
//!
//! ## Architecture
//!
//! 1. **LedgerStore**: the store boundary (scalar state, the `Meters` table
//!    and an atomic [`WriteBatch`] commit)
//! 2. **MemoryStore**: in-process reference store with per-row versions
//! 3. **LedgerReader**: decoded, read-only views (accounts, fee rate, pool)
//! 4. **MeterLedger**: enroll / delete / put / balance and energy adjustments
//! 5. **ExchangeConfig**: fee rate and operator pool balance
//!
//! ## Write Flow
//!
//! ```text
//! MeterLedger / ExchangeConfig → WriteBatch → LedgerStore::commit (all-or-nothing)
//! ```
//!
//! Every mutation is expressed as a batch; a single-record update is simply a
//! batch of one.

pub mod codec;
pub mod exchange_config;
pub mod memory;
pub mod meter_ledger;
pub mod reader;
pub mod store;

pub use exchange_config::ExchangeConfig;
pub use memory::MemoryStore;
pub use meter_ledger::MeterLedger;
pub use reader::LedgerReader;
pub use store::{LedgerStore, MeterRow, VersionedRow, WriteBatch, WriteOp};
