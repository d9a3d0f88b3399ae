//! # gridmatch-market
//!
//! The external operation surface of a GridMatch market.
//!
//! Callers address the market by function name with positional string
//! arguments, the way a host runtime would:
//!
//! ```text
//! init   [fee_rate]
//! invoke enroll | delete | changeAccountBalance | reportDelta | settle
//! query  balance | reportedKwh | meterInfo | meters | exchangeRate | exchangeAccountBalance
//! ```
//!
//! Arguments are parsed into a typed [`Operation`] or [`Query`] before any
//! state is read, so malformed calls never reach the ledger.

pub mod dispatch;
pub mod market;
pub mod query;

pub use dispatch::{Operation, Query};
pub use market::Market;
pub use query::QueryFacade;
