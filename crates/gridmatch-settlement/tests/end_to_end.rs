//! End-to-end settlement cycles over the meter ledger.
//!
//! Exercises the full path: enroll and report through `MeterLedger`,
//! settle through `settle`, read back through `LedgerReader`.
//! Covers the reference scenario, all-or-nothing commits, carry-forward
//! across cycles, balances near the `Decimal` bounds, and conservation
//! over randomized activity.

use gridmatch_ledger::{
    ExchangeConfig, LedgerReader, LedgerStore, MemoryStore, MeterLedger, VersionedRow, WriteBatch,
};
use gridmatch_settlement::settle;
use gridmatch_types::{AccountId, GridmatchError, MarketConfig, MeterAccount, Result};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rust_decimal::Decimal;

/// Store wrapper whose commits can be made to fail.
#[derive(Default)]
struct FlakyStore {
    inner: MemoryStore,
    fail_commits: bool,
}

impl LedgerStore for FlakyStore {
    fn get_state(&self, key: &str) -> Result<Option<String>> {
        self.inner.get_state(key)
    }

    fn get_row(&self, id: &AccountId) -> Result<Option<VersionedRow>> {
        self.inner.get_row(id)
    }

    fn rows(&self) -> Result<Vec<VersionedRow>> {
        self.inner.rows()
    }

    fn commit(&mut self, batch: WriteBatch) -> Result<()> {
        if self.fail_commits {
            return Err(GridmatchError::Persistence {
                reason: "store unavailable".to_string(),
            });
        }
        self.inner.commit(batch)
    }
}

fn id(s: &str) -> AccountId {
    AccountId::from(s)
}

fn setup<S: LedgerStore>(store: &mut S, fee_rate: Decimal, meters: &[(&str, i64, i64)]) {
    let cfg = MarketConfig::default();
    ExchangeConfig::new(&mut *store, &cfg)
        .initialize(fee_rate)
        .unwrap();
    let mut ledger = MeterLedger::new(store, &cfg);
    for (meter, kwh, rate) in meters {
        ledger.enroll(id(meter), meter, *rate).unwrap();
        ledger.accumulate_energy(&id(meter), *kwh).unwrap();
    }
}

fn snapshot<S: LedgerStore>(store: &S) -> (Vec<MeterAccount>, Decimal) {
    let reader = LedgerReader::new(store);
    let mut accounts = reader.list_all().unwrap();
    accounts.sort_by(|a, b| a.id.cmp(&b.id));
    (accounts, reader.pool_balance().unwrap())
}

fn total_value(accounts: &[MeterAccount], pool: Decimal) -> Decimal {
    accounts.iter().map(|a| a.balance).sum::<Decimal>() + pool
}

#[test]
fn reference_scenario() {
    let mut store = MemoryStore::new();
    setup(
        &mut store,
        Decimal::new(1, 1),
        &[("A", -100, 5), ("B", 150, 3), ("C", 50, 4)],
    );

    let first = settle(&mut store).unwrap();
    assert_eq!(first.fills.len(), 1);
    assert_eq!(first.fees, Decimal::new(30, 0));

    let (accounts, pool) = snapshot(&store);
    let summary: Vec<(&str, i64, Decimal)> = accounts
        .iter()
        .map(|a| (a.id.as_str(), a.net_energy, a.balance))
        .collect();
    assert_eq!(
        summary,
        [
            ("A", 0, Decimal::new(-300, 0)),
            ("B", 50, Decimal::new(270, 0)),
            ("C", 50, Decimal::ZERO),
        ]
    );
    assert_eq!(pool, Decimal::new(30, 0));

    let second = settle(&mut store).unwrap();
    assert!(second.is_noop());
    assert_eq!(snapshot(&store), (accounts, pool));
}

#[test]
fn failed_commit_changes_nothing() {
    let mut store = FlakyStore::default();
    setup(
        &mut store,
        Decimal::new(1, 1),
        &[("A", -100, 5), ("B", 150, 3), ("C", 50, 4)],
    );
    let before = snapshot(&store);

    store.fail_commits = true;
    let err = settle(&mut store).unwrap_err();
    assert!(matches!(err, GridmatchError::Persistence { .. }));
    assert_eq!(snapshot(&store), before);

    // Once the store recovers the same cycle goes through.
    store.fail_commits = false;
    let report = settle(&mut store).unwrap();
    assert_eq!(report.fills.len(), 1);
    assert_ne!(snapshot(&store), before);
}

#[test]
fn unmatched_energy_carries_into_next_cycle() {
    let mut store = MemoryStore::new();
    setup(&mut store, Decimal::ZERO, &[("buyer", -100, 4), ("seller", 30, 3)]);

    settle(&mut store).unwrap();
    assert_eq!(
        LedgerReader::new(&store).get(&id("buyer")).unwrap().net_energy,
        -70
    );

    // New production arrives; the old deficit is still there to absorb it.
    let cfg = MarketConfig::default();
    MeterLedger::new(&mut store, &cfg)
        .accumulate_energy(&id("seller"), 80)
        .unwrap();
    let report = settle(&mut store).unwrap();
    assert_eq!(report.fills[0].quantity, 70);

    let reader = LedgerReader::new(&store);
    assert_eq!(reader.get(&id("buyer")).unwrap().net_energy, 0);
    assert_eq!(reader.get(&id("seller")).unwrap().net_energy, 10);
    assert_eq!(
        reader.get(&id("buyer")).unwrap().balance,
        Decimal::new(-(30 * 3 + 70 * 3), 0)
    );
}

fn deposit<S: LedgerStore>(store: &mut S, meter: &str, amount: Decimal) {
    MeterLedger::new(store, &MarketConfig::default())
        .adjust_balance(&id(meter), amount)
        .unwrap();
}

#[test]
fn large_balances_settle_without_overflow() {
    let mut store = MemoryStore::new();
    setup(&mut store, Decimal::new(1, 1), &[("A", -10, 1), ("B", 10, 1)]);
    let large = Decimal::from_str_exact("50000000000000000000000000000").unwrap();
    deposit(&mut store, "A", large);
    deposit(&mut store, "B", large);

    let report = settle(&mut store).unwrap();
    assert_eq!(report.fills.len(), 1);
    assert_eq!(report.fees, Decimal::ONE);

    let reader = LedgerReader::new(&store);
    assert_eq!(
        reader.get(&id("A")).unwrap().balance,
        large - Decimal::new(10, 0)
    );
    assert_eq!(
        reader.get(&id("B")).unwrap().balance,
        large + Decimal::new(9, 0)
    );
    assert_eq!(reader.pool_balance().unwrap(), Decimal::ONE);
}

#[test]
fn seller_balance_overflow_fails_and_changes_nothing() {
    let mut store = MemoryStore::new();
    setup(&mut store, Decimal::ZERO, &[("A", -10, 2), ("B", 10, 2)]);
    deposit(&mut store, "B", Decimal::MAX);
    let before = snapshot(&store);
    let commits = store.commit_count();

    let err = settle(&mut store).unwrap_err();
    assert!(matches!(err, GridmatchError::ArithmeticOverflow { .. }));
    assert_eq!(snapshot(&store), before);
    assert_eq!(store.commit_count(), commits);
}

#[test]
fn identical_ledgers_produce_identical_roots() {
    let meters = [("m1", -40, 6), ("m2", 25, 2), ("m3", 25, 5), ("m4", -10, 2)];
    let mut a = MemoryStore::new();
    let mut b = MemoryStore::new();
    setup(&mut a, Decimal::new(3, 2), &meters);
    let mut reversed = meters;
    reversed.reverse();
    setup(&mut b, Decimal::new(3, 2), &reversed);

    let ra = settle(&mut a).unwrap();
    let rb = settle(&mut b).unwrap();
    assert_eq!(ra.fills, rb.fills);
    assert_eq!(ra.settlement_root, rb.settlement_root);
}

#[test]
fn randomized_cycles_conserve_value_and_energy() {
    let mut rng = StdRng::seed_from_u64(2024);
    let cfg = MarketConfig::default();
    let mut store = MemoryStore::new();
    ExchangeConfig::new(&mut store, &cfg)
        .initialize(Decimal::new(rng.gen_range(0..=250), 3))
        .unwrap();

    let ids: Vec<AccountId> = (0..25).map(|i| AccountId::new(format!("meter-{i:02}"))).collect();
    {
        let mut ledger = MeterLedger::new(&mut store, &cfg);
        for meter in &ids {
            ledger.enroll(meter.clone(), meter.as_str(), rng.gen_range(1..=12)).unwrap();
        }
    }

    for _ in 0..30 {
        {
            let mut ledger = MeterLedger::new(&mut store, &cfg);
            for _ in 0..10 {
                let meter = &ids[rng.gen_range(0..ids.len())];
                ledger
                    .accumulate_energy(meter, rng.gen_range(-200..=200))
                    .unwrap();
            }
        }

        let (before, pool_before) = snapshot(&store);
        let report = settle(&mut store).unwrap();
        let (after, pool_after) = snapshot(&store);

        assert_eq!(total_value(&before, pool_before), total_value(&after, pool_after));
        let energy = |accts: &[MeterAccount]| accts.iter().map(|a| i128::from(a.net_energy)).sum::<i128>();
        assert_eq!(energy(&before), energy(&after));
        assert_eq!(pool_after, report.pool_after);

        // Nothing tradeable is left behind.
        let again = settle(&mut store.clone()).unwrap();
        assert!(again.is_noop());
    }
}
