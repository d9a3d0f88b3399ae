//! System-wide constants for the GridMatch market.

/// Decimal places used when persisting currency and fee-rate values as text.
pub const AMOUNT_DECIMAL_PLACES: u32 = 6;

/// Scalar key holding the exchange fee rate.
pub const EXCHANGE_RATE_KEY: &str = "exchange_rate";

/// Scalar key holding the exchange (operator pool) balance.
pub const EXCHANGE_BALANCE_KEY: &str = "exchange_account_balance";

/// Name of the meter account table.
pub const METER_TABLE: &str = "Meters";

/// Default upper bound on enrolled meters.
pub const DEFAULT_MAX_ACCOUNTS: usize = 100_000;

/// Version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Engine name.
pub const ENGINE_NAME: &str = "GridMatch";
