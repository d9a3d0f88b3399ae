//! # gridmatch-clearing
//!
//! **Pure deterministic clearing for GridMatch.**
//!
//! Clearing is the compute plane: it takes a snapshot of meter accounts plus
//! the exchange state and produces fills, updated accounts and the new pool
//! balance. It has:
//!
//! - **Zero side effects**: no store access, no persistence
//! - **Deterministic output**: same snapshot (in any order) -> same fills
//! - **Seller-price rule**: every fill executes at the seller's rate
//! - **Carry-forward**: unmatched deficit and surplus are left in place

pub mod book;
pub mod determinism;
pub mod matcher;

pub use book::ClearingBook;
pub use determinism::{compute_settlement_root, verify_settlement_root};
pub use matcher::{ClearingOutcome, clear};
