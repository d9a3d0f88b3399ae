//! Meter account model.
//!
//! A [`MeterAccount`] is one participant's ledger record. Its `net_energy`
//! sign decides which side of the market it trades on during the next
//! settlement cycle.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::AccountId;

/// Which side of the market an account trades on this cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MeterRole {
    /// Negative net energy: consumed more than produced.
    Buyer,
    /// Positive net energy: produced more than consumed.
    Seller,
    /// Zero net energy: excluded from matching.
    Idle,
}

impl std::fmt::Display for MeterRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Buyer => write!(f, "BUYER"),
            Self::Seller => write!(f, "SELLER"),
            Self::Idle => write!(f, "IDLE"),
        }
    }
}

/// A meter's ledger record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeterAccount {
    /// Primary key, immutable once enrolled.
    pub id: AccountId,
    /// Display name.
    pub name: String,
    /// Signed kWh: positive = surplus, negative = deficit.
    pub net_energy: i64,
    /// Signed currency balance. May go negative (debt is not prevented).
    pub balance: Decimal,
    /// Ask (seller) or bid (buyer) price per kWh.
    pub rate_per_kwh: i64,
    /// Store revision this copy was read at. Not persisted as a column.
    #[serde(default, skip_serializing)]
    pub version: u64,
}

impl MeterAccount {
    /// A freshly enrolled account: no energy reported, zero balance.
    #[must_use]
    pub fn enrolled(id: AccountId, name: impl Into<String>, rate_per_kwh: i64) -> Self {
        Self {
            id,
            name: name.into(),
            net_energy: 0,
            balance: Decimal::ZERO,
            rate_per_kwh,
            version: 0,
        }
    }

    #[must_use]
    pub fn role(&self) -> MeterRole {
        match self.net_energy.signum() {
            -1 => MeterRole::Buyer,
            1 => MeterRole::Seller,
            _ => MeterRole::Idle,
        }
    }

    /// Remaining unmet consumption in kWh (0 for non-buyers).
    #[must_use]
    pub fn deficit(&self) -> u64 {
        if self.net_energy < 0 {
            self.net_energy.unsigned_abs()
        } else {
            0
        }
    }

    /// Remaining unsold production in kWh (0 for non-sellers).
    #[must_use]
    pub fn surplus(&self) -> u64 {
        u64::try_from(self.net_energy).unwrap_or(0)
    }

    /// Public projection of this record.
    #[must_use]
    pub fn info(&self) -> MeterInfo {
        MeterInfo::from(self)
    }
}

/// Structured projection returned by the `meterInfo` and `meters` queries.
///
/// Field names match the external JSON contract; `account_balance` is
/// emitted as a JSON number.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeterInfo {
    pub id: String,
    pub name: String,
    pub kwh: i64,
    #[serde(with = "rust_decimal::serde::float")]
    pub account_balance: Decimal,
    pub rate_per_kwh: i64,
}

impl From<&MeterAccount> for MeterInfo {
    fn from(account: &MeterAccount) -> Self {
        Self {
            id: account.id.to_string(),
            name: account.name.clone(),
            kwh: account.net_energy,
            account_balance: account.balance,
            rate_per_kwh: account.rate_per_kwh,
        }
    }
}

/// Test helpers.
#[cfg(any(test, feature = "test-helpers"))]
impl MeterAccount {
    /// An account named after its id with the given energy position and rate.
    pub fn dummy(id: &str, net_energy: i64, rate_per_kwh: i64) -> Self {
        Self {
            id: AccountId::from(id),
            name: format!("meter {id}"),
            net_energy,
            balance: Decimal::ZERO,
            rate_per_kwh,
            version: 1,
        }
    }

    /// Same as [`MeterAccount::dummy`] with a starting balance.
    pub fn dummy_with_balance(id: &str, net_energy: i64, rate_per_kwh: i64, balance: Decimal) -> Self {
        Self {
            balance,
            ..Self::dummy(id, net_energy, rate_per_kwh)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn enrolled_account_is_idle() {
        let acct = MeterAccount::enrolled(AccountId::from("m-1"), "Roof A", 4);
        assert_eq!(acct.net_energy, 0);
        assert_eq!(acct.balance, Decimal::ZERO);
        assert_eq!(acct.role(), MeterRole::Idle);
    }

    #[test]
    fn role_follows_sign() {
        assert_eq!(MeterAccount::dummy("b", -5, 3).role(), MeterRole::Buyer);
        assert_eq!(MeterAccount::dummy("s", 5, 3).role(), MeterRole::Seller);
    }

    #[test]
    fn deficit_and_surplus() {
        let buyer = MeterAccount::dummy("b", -40, 3);
        assert_eq!(buyer.deficit(), 40);
        assert_eq!(buyer.surplus(), 0);

        let seller = MeterAccount::dummy("s", 25, 3);
        assert_eq!(seller.deficit(), 0);
        assert_eq!(seller.surplus(), 25);

        let extreme = MeterAccount::dummy("x", i64::MIN, 1);
        assert_eq!(extreme.deficit(), 1u64 << 63);
    }

    #[test]
    fn info_serializes_balance_as_number() {
        let acct = MeterAccount::dummy_with_balance("m-9", -3, 5, Decimal::new(-1_500, 1));
        let json = serde_json::to_value(acct.info()).unwrap();
        assert_eq!(json["id"], "m-9");
        assert_eq!(json["kwh"], -3);
        assert_eq!(json["rate_per_kwh"], 5);
        assert_eq!(json["account_balance"], serde_json::json!(-150.0));
    }

    #[test]
    fn version_is_not_serialized() {
        let acct = MeterAccount::dummy("m-1", 0, 1);
        let json = serde_json::to_value(&acct).unwrap();
        assert!(json.get("version").is_none());
    }
}
