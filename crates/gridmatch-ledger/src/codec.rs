//! Conversion between typed [`MeterAccount`]s and persisted [`MeterRow`]s.

use gridmatch_types::{AccountId, MeterAccount, Result, amount, constants};

use crate::store::{MeterRow, VersionedRow};

/// Encode an account into its persisted row. The balance is written as
/// fixed 6-decimal text.
#[must_use]
pub fn encode(account: &MeterAccount) -> MeterRow {
    MeterRow {
        account_id: account.id.to_string(),
        account_name: account.name.clone(),
        reported_kwh: account.net_energy,
        account_balance: amount::format(account.balance),
        rate_per_kwh: account.rate_per_kwh,
    }
}

/// Decode a stored row, carrying its version into the account.
pub fn decode(stored: &VersionedRow) -> Result<MeterAccount> {
    let row = &stored.row;
    let key = format!("{}/{}", constants::METER_TABLE, row.account_id);
    Ok(MeterAccount {
        id: AccountId::new(row.account_id.clone()),
        name: row.account_name.clone(),
        net_energy: row.reported_kwh,
        balance: amount::decode(&key, &row.account_balance)?,
        rate_per_kwh: row.rate_per_kwh,
        version: stored.version,
    })
}
