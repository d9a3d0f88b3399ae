//! Configuration for a GridMatch market.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{GridmatchError, Result, constants};

/// Per-market configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarketConfig {
    /// Reject fee rates outside [0, 1] and non-positive enrollment rates.
    /// When `false` those inputs are accepted as-is.
    pub validate_inputs: bool,
    /// Maximum number of enrolled meters.
    pub max_accounts: usize,
}

impl Default for MarketConfig {
    fn default() -> Self {
        Self {
            validate_inputs: true,
            max_accounts: constants::DEFAULT_MAX_ACCOUNTS,
        }
    }
}

impl MarketConfig {
    /// A configuration that accepts any fee rate or enrollment rate.
    #[must_use]
    pub fn permissive() -> Self {
        Self {
            validate_inputs: false,
            ..Self::default()
        }
    }

    /// Parse a JSON document; missing fields take their defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let cfg: Self = serde_json::from_str(json)
            .map_err(|e| GridmatchError::Configuration(e.to_string()))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Structural sanity checks.
    pub fn validate(&self) -> Result<()> {
        if self.max_accounts == 0 {
            return Err(GridmatchError::Configuration(
                "max_accounts must be > 0".to_string(),
            ));
        }
        Ok(())
    }

    /// Apply the fee-rate policy.
    pub fn check_fee_rate(&self, fee_rate: Decimal) -> Result<()> {
        if self.validate_inputs && (fee_rate < Decimal::ZERO || fee_rate > Decimal::ONE) {
            return Err(GridmatchError::InvalidFeeRate(fee_rate));
        }
        Ok(())
    }

    /// Apply the enrollment-rate policy.
    pub fn check_rate(&self, rate_per_kwh: i64) -> Result<()> {
        if self.validate_inputs && rate_per_kwh <= 0 {
            return Err(GridmatchError::InvalidRate(rate_per_kwh));
        }
        Ok(())
    }
}
