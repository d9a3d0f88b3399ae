//! Fixed-precision text encoding for currency amounts and fee rates.
//!
//! Balances and rates are persisted as decimal text with exactly
//! [`AMOUNT_DECIMAL_PLACES`] fractional digits (`"12.500000"`). Every value
//! that enters the ledger is normalized to that precision first so that the
//! in-memory and persisted views never diverge.

use std::str::FromStr;

use rust_decimal::{Decimal, RoundingStrategy};

use crate::constants::AMOUNT_DECIMAL_PLACES;
use crate::{GridmatchError, Result};

/// Round to the persisted precision (banker's rounding, as `Decimal::round_dp`).
#[must_use]
pub fn normalize(value: Decimal) -> Decimal {
    let mut rounded = value.round_dp_with_strategy(
        AMOUNT_DECIMAL_PLACES,
        RoundingStrategy::MidpointNearestEven,
    );
    if rounded.is_zero() {
        rounded.set_sign_positive(true);
    }
    rounded
}

/// Format an amount as fixed 6-decimal text.
#[must_use]
pub fn format(value: Decimal) -> String {
    let mut fixed = normalize(value);
    fixed.rescale(AMOUNT_DECIMAL_PLACES);
    fixed.to_string()
}

/// Parse decimal text (plain or scientific notation) supplied by a caller.
///
/// # Errors
/// Returns [`GridmatchError::InvalidArgument`] naming `field` when the text is
/// not a finite decimal.
pub fn parse(field: &str, text: &str) -> Result<Decimal> {
    let trimmed = text.trim();
    Decimal::from_str(trimmed)
        .or_else(|_| Decimal::from_scientific(trimmed))
        .map_err(|_| GridmatchError::InvalidArgument {
            name: field.to_string(),
            value: text.to_string(),
        })
}

/// Decode a persisted amount. Failure means the stored value is corrupt,
/// not that the caller sent bad input.
pub fn decode(key: &str, text: &str) -> Result<Decimal> {
    Decimal::from_str(text.trim()).map_err(|e| GridmatchError::CorruptRecord {
        key: key.to_string(),
        reason: format!("invalid decimal {text:?}: {e}"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_with_six_places() {
        assert_eq!(format(Decimal::ZERO), "0.000000");
        assert_eq!(format(Decimal::new(270, 0)), "270.000000");
        assert_eq!(format(Decimal::new(-3005, 1)), "-300.500000");
    }

    #[test]
    fn rounds_excess_precision() {
        // 0.1234565 -> nearest even at the 6th place
        assert_eq!(format(Decimal::new(1_234_565, 7)), "0.123456");
        assert_eq!(format(Decimal::new(1_234_575, 7)), "0.123458");
    }

    #[test]
    fn negative_zero_prints_unsigned() {
        assert_eq!(format(-Decimal::ZERO), "0.000000");
        assert_eq!(format(Decimal::new(-1, 9)), "0.000000");
    }

    #[test]
    fn parse_accepts_plain_and_scientific() {
        assert_eq!(parse("amount", "12.5").unwrap(), Decimal::new(125, 1));
        assert_eq!(parse("amount", "-7").unwrap(), Decimal::new(-7, 0));
        assert_eq!(parse("amount", "1e3").unwrap(), Decimal::new(1000, 0));
    }

    #[test]
    fn parse_rejects_garbage() {
        let err = parse("amount", "ten").unwrap_err();
        assert!(matches!(err, GridmatchError::InvalidArgument { ref name, .. } if name == "amount"));
    }

    #[test]
    fn decode_reports_corruption() {
        let err = decode("Meters/m-1", "abc").unwrap_err();
        assert!(matches!(err, GridmatchError::CorruptRecord { .. }));
    }
}
