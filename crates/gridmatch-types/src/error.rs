//! Error types for the GridMatch market.
//!
//! All errors use the `GM_ERR_` prefix convention for easy grepping in logs.
//! Error codes are grouped by subsystem:
//! - 1xx: Validation errors (rejected before any state access)
//! - 2xx: Account errors
//! - 3xx: Exchange errors
//! - 4xx: Persistence errors
//! - 5xx: Settlement errors
//! - 9xx: General / internal errors

use rust_decimal::Decimal;
use thiserror::Error;

use crate::AccountId;

/// Central error enum for all GridMatch operations.
#[derive(Debug, Error)]
pub enum GridmatchError {
    // =================================================================
    // Validation Errors (1xx)
    // =================================================================
    /// The operation received too few (or, for nullary operations, any) arguments.
    #[error("GM_ERR_100: Incorrect number of arguments for {operation}: expected {expected}, got {got}")]
    WrongArgumentCount {
        operation: String,
        expected: usize,
        got: usize,
    },

    /// A positional argument could not be parsed.
    #[error("GM_ERR_101: Invalid value for {name}: {value}")]
    InvalidArgument { name: String, value: String },

    /// No operation is registered under this name.
    #[error("GM_ERR_102: Unknown operation: {0}")]
    UnknownOperation(String),

    /// The fee rate lies outside [0, 1].
    #[error("GM_ERR_103: Fee rate {0} outside [0, 1]")]
    InvalidFeeRate(Decimal),

    /// The rate per kWh is not positive.
    #[error("GM_ERR_104: Rate per kWh must be positive, got {0}")]
    InvalidRate(i64),

    /// Accumulating a reported delta would overflow the meter's counter.
    #[error("GM_ERR_105: Reported energy overflow for account {0}")]
    EnergyOverflow(AccountId),

    // =================================================================
    // Account Errors (2xx)
    // =================================================================
    /// No meter account is enrolled under this id.
    #[error("GM_ERR_200: Account not found: {0}")]
    AccountNotFound(AccountId),

    /// A meter account with this id is already enrolled.
    #[error("GM_ERR_201: Account already exists: {0}")]
    AccountAlreadyExists(AccountId),

    /// The ledger already holds the configured maximum number of meters.
    #[error("GM_ERR_202: Account limit reached ({limit})")]
    AccountLimitReached { limit: usize },

    // =================================================================
    // Exchange Errors (3xx)
    // =================================================================
    /// The exchange state has not been initialized.
    #[error("GM_ERR_300: Exchange not initialized: missing {key}")]
    NotInitialized { key: String },

    // =================================================================
    // Persistence Errors (4xx)
    // =================================================================
    /// The underlying store rejected a read or write.
    #[error("GM_ERR_400: Persistence error: {reason}")]
    Persistence { reason: String },

    /// The stored record changed since it was read.
    #[error("GM_ERR_401: Version conflict on account {id}: expected {expected}, found {actual}")]
    VersionConflict {
        id: AccountId,
        expected: u64,
        actual: u64,
    },

    /// A persisted value could not be decoded.
    #[error("GM_ERR_402: Corrupt record {key}: {reason}")]
    CorruptRecord { key: String, reason: String },

    // =================================================================
    // Settlement Errors (5xx)
    // =================================================================
    /// Value or energy was created or destroyed during clearing.
    #[error("GM_ERR_500: Conservation violation: {reason}")]
    ConservationViolation { reason: String },

    /// A trade computation overflowed.
    #[error("GM_ERR_501: Arithmetic overflow: {context}")]
    ArithmeticOverflow { context: String },

    // =================================================================
    // General / Internal (9xx)
    // =================================================================
    /// Serialization / deserialization error.
    #[error("GM_ERR_900: Serialization error: {0}")]
    Serialization(String),

    /// Configuration error (invalid config file, missing fields, etc.).
    #[error("GM_ERR_901: Configuration error: {0}")]
    Configuration(String),

    /// I/O error.
    #[error("GM_ERR_902: I/O error: {0}")]
    Io(String),
}

/// Crate-wide `Result` alias.
pub type Result<T> = std::result::Result<T, GridmatchError>;

impl GridmatchError {
    /// Whether this error was raised before any state was touched.
    #[must_use]
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::WrongArgumentCount { .. }
                | Self::InvalidArgument { .. }
                | Self::UnknownOperation(_)
                | Self::InvalidFeeRate(_)
                | Self::InvalidRate(_)
                | Self::EnergyOverflow(_)
        )
    }
}

impl From<std::io::Error> for GridmatchError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<serde_json::Error> for GridmatchError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}
