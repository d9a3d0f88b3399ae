//! # gridmatch-types
//!
//! Shared types, errors, and configuration for the **GridMatch** energy
//! micro-market.
//!
//! This crate is the leaf dependency of the workspace; every other crate
//! depends on it. It defines:
//!
//! - **Identifiers**: [`AccountId`]
//! - **Account model**: [`MeterAccount`], [`MeterInfo`], [`MeterRole`]
//! - **Exchange model**: [`ExchangeState`]
//! - **Trade model**: [`Fill`]
//! - **Amounts**: fixed 6-decimal text formatting and parsing
//! - **Configuration**: [`MarketConfig`]
//! - **Errors**: [`GridmatchError`] with `GM_ERR_` prefix codes
//! - **Constants**: persisted key names and precision

pub mod account;
pub mod amount;
pub mod config;
pub mod constants;
pub mod error;
pub mod exchange;
pub mod fill;
pub mod ids;

pub use account::*;
pub use config::*;
pub use error::*;
pub use exchange::*;
pub use fill::*;
pub use ids::*;

// `amount` and `constants` are accessed by path
// (`gridmatch_types::amount::format`) to keep call sites explicit.
