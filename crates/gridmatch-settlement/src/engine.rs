//! Settlement cycle driver.
//!
//! Reads a snapshot, clears it in memory, checks conservation and writes
//! the result with a single [`LedgerStore::commit`]. The store only ever sees
//! the complete cycle or nothing.

use chrono::Utc;
use gridmatch_clearing::clear;
use gridmatch_ledger::{LedgerReader, LedgerStore, WriteBatch};
use gridmatch_types::Result;

use crate::conservation::ConservationCheck;
use crate::report::SettlementReport;

/// Run one settlement cycle against `store`.
///
/// A cycle with nothing to trade succeeds without writing.
///
/// # Errors
/// - `NotInitialized` if the exchange has no fee rate yet
/// - `CorruptRecord` if a stored row cannot be decoded
/// - `ArithmeticOverflow` / `ConservationViolation` from clearing
/// - `Persistence` / `VersionConflict` if the commit is rejected
///
/// On any error the store is unchanged.
pub fn settle<S: LedgerStore + ?Sized>(store: &mut S) -> Result<SettlementReport> {
    let (snapshot, exchange) = {
        let reader = LedgerReader::new(&*store);
        (reader.list_all()?, reader.exchange_state()?)
    };

    let check = ConservationCheck::capture(&snapshot, exchange.pool_balance);
    let outcome = clear(&snapshot, &exchange)?;
    check.verify(&outcome)?;

    let mut batch = WriteBatch::new();
    for account in &outcome.updated {
        batch.replace_meter(account);
    }
    if !outcome.is_empty() {
        batch.put_pool_balance(outcome.pool_after);
    }

    let writes = batch.len();
    if let Err(err) = store.commit(batch) {
        tracing::error!(error = %err, writes, "Settlement commit rejected");
        return Err(err);
    }

    let report = SettlementReport::new(outcome, Utc::now());

    tracing::info!(
        accounts = snapshot.len(),
        fills = report.fills.len(),
        volume_kwh = %report.volume(),
        fees = %report.fees,
        pool = %report.pool_after,
        root = %report.settlement_root,
        "Settlement committed"
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use gridmatch_ledger::{ExchangeConfig, MemoryStore, MeterLedger};
    use gridmatch_types::{AccountId, GridmatchError, MarketConfig};
    use rust_decimal::Decimal;

    use super::*;

    fn id(s: &str) -> AccountId {
        AccountId::from(s)
    }

    fn seeded(fee_rate: Decimal, meters: &[(&str, i64, i64)]) -> MemoryStore {
        let mut store = MemoryStore::new();
        let cfg = MarketConfig::default();
        ExchangeConfig::new(&mut store, &cfg).initialize(fee_rate).unwrap();
        let mut ledger = MeterLedger::new(&mut store, &cfg);
        for (meter, kwh, rate) in meters {
            ledger.enroll(id(meter), meter, *rate).unwrap();
            ledger.accumulate_energy(&id(meter), *kwh).unwrap();
        }
        store
    }

    #[test]
    fn uninitialized_exchange_fails() {
        let mut store = MemoryStore::new();
        let err = settle(&mut store).unwrap_err();
        assert!(matches!(err, GridmatchError::NotInitialized { .. }));
    }

    #[test]
    fn worked_example_commits() {
        let mut store = seeded(
            Decimal::new(1, 1),
            &[("A", -100, 5), ("B", 150, 3), ("C", 50, 4)],
        );
        let report = settle(&mut store).unwrap();

        assert_eq!(report.fills.len(), 1);
        assert_eq!(report.committed, [id("A"), id("B")]);
        assert_eq!(report.fees, Decimal::new(30, 0));

        let reader = LedgerReader::new(&store);
        let a = reader.get(&id("A")).unwrap();
        assert_eq!((a.net_energy, a.balance), (0, Decimal::new(-300, 0)));
        let b = reader.get(&id("B")).unwrap();
        assert_eq!((b.net_energy, b.balance), (50, Decimal::new(270, 0)));
        let c = reader.get(&id("C")).unwrap();
        assert_eq!((c.net_energy, c.balance), (50, Decimal::ZERO));
        assert_eq!(reader.pool_balance().unwrap(), Decimal::new(30, 0));
    }

    #[test]
    fn second_cycle_is_noop_and_writes_nothing() {
        let mut store = seeded(
            Decimal::new(1, 1),
            &[("A", -100, 5), ("B", 150, 3), ("C", 50, 4)],
        );
        settle(&mut store).unwrap();
        let commits = store.commit_count();

        let report = settle(&mut store).unwrap();
        assert!(report.is_noop());
        assert_eq!(report.pool_after, Decimal::new(30, 0));
        assert_eq!(store.commit_count(), commits);
        assert_eq!(report.fees, Decimal::ZERO);
    }

    #[test]
    fn empty_ledger_succeeds() {
        let mut store = seeded(Decimal::new(1, 1), &[]);
        let report = settle(&mut store).unwrap();
        assert!(report.is_noop());
        assert!(report.committed.is_empty());
    }
}
