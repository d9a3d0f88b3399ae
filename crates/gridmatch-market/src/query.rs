//! Read-only queries and their wire encodings.
//!
//! | query                    | payload                                |
//! |--------------------------|----------------------------------------|
//! | `balance`                | 6-decimal text, e.g. `-300.000000`     |
//! | `reportedKwh`            | integer text                           |
//! | `meterInfo`              | JSON object                            |
//! | `meters`                 | JSON array, sorted by id               |
//! | `exchangeRate`           | 6-decimal text                         |
//! | `exchangeAccountBalance` | 6-decimal text                         |

use gridmatch_ledger::{LedgerReader, LedgerStore};
use gridmatch_types::{AccountId, MeterInfo, Result, amount};

use crate::dispatch::Query;

/// Pure reads over a store.
pub struct QueryFacade<'a, S: LedgerStore + ?Sized> {
    reader: LedgerReader<'a, S>,
}

impl<'a, S: LedgerStore + ?Sized> QueryFacade<'a, S> {
    #[must_use]
    pub fn new(store: &'a S) -> Self {
        Self {
            reader: LedgerReader::new(store),
        }
    }

    pub fn balance(&self, id: &AccountId) -> Result<String> {
        Ok(amount::format(self.reader.get(id)?.balance))
    }

    pub fn reported_kwh(&self, id: &AccountId) -> Result<String> {
        Ok(self.reader.get(id)?.net_energy.to_string())
    }

    pub fn meter_info(&self, id: &AccountId) -> Result<MeterInfo> {
        Ok(self.reader.get(id)?.info())
    }

    /// Every enrolled meter, sorted by id.
    pub fn meters(&self) -> Result<Vec<MeterInfo>> {
        let mut accounts = self.reader.list_all()?;
        accounts.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(accounts.iter().map(gridmatch_types::MeterAccount::info).collect())
    }

    pub fn exchange_rate(&self) -> Result<String> {
        Ok(amount::format(self.reader.fee_rate()?))
    }

    pub fn exchange_account_balance(&self) -> Result<String> {
        Ok(amount::format(self.reader.pool_balance()?))
    }

    /// Run a parsed query and encode its payload.
    pub fn execute(&self, query: &Query) -> Result<Vec<u8>> {
        let payload = match query {
            Query::Balance { id } => self.balance(id)?.into_bytes(),
            Query::ReportedKwh { id } => self.reported_kwh(id)?.into_bytes(),
            Query::MeterInfo { id } => serde_json::to_vec(&self.meter_info(id)?)?,
            Query::Meters => serde_json::to_vec(&self.meters()?)?,
            Query::ExchangeRate => self.exchange_rate()?.into_bytes(),
            Query::ExchangeAccountBalance => self.exchange_account_balance()?.into_bytes(),
        };
        Ok(payload)
    }
}
