//! # gridmatch-settlement
//!
//! **Finality plane**: turns a clearing outcome into committed ledger state.
//!
//! ## Cycle
//!
//! [`settle`] runs one cycle:
//!
//! 1. Snapshot every meter and the exchange state through [`LedgerReader`]
//! 2. Run the pure clearing pass ([`gridmatch_clearing::clear`])
//! 3. Check value and energy conservation against the snapshot
//! 4. Commit every changed account plus the pool balance as one batch
//! 5. Return a [`SettlementReport`]
//!
//! Steps 1-3 never write. If step 3 or 4 fails the store is exactly as it
//! was before the cycle started.
//!
//! [`LedgerReader`]: gridmatch_ledger::LedgerReader

pub mod conservation;
pub mod engine;
pub mod report;

pub use conservation::ConservationCheck;
pub use engine::settle;
pub use report::SettlementReport;
