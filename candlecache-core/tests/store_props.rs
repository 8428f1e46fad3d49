use std::collections::BTreeMap;

use candlecache_core::{
    CacheError, CandleStore, Candle, Granularity, InsertOutcome, RawCandle, TimeRange,
    merge_insert,
};
use chrono::{DateTime, Utc};
use proptest::prelude::*;
use rust_decimal::Decimal;

fn t(s: i64) -> DateTime<Utc> {
    DateTime::from_timestamp(s, 0).unwrap()
}

fn candle(ts: i64, close: i64) -> Candle {
    let px = Decimal::from(close);
    Candle {
        ts: t(ts),
        open: px,
        high: px,
        low: px,
        close: px,
        volume: Decimal::ONE,
        trades: None,
    }
}

fn arb_series() -> impl Strategy<Value = Vec<Candle>> {
    proptest::collection::btree_map(0i64..5_000i64, 0i64..10_000i64, 0..120)
        .prop_map(|m| m.into_iter().map(|(ts, v)| candle(ts, v)).collect())
}

fn minute() -> Granularity {
    Granularity::from_secs(1).unwrap()
}

proptest! {
    #[test]
    fn merge_insert_is_sorted_unique_and_incoming_wins(a in arb_series(), b in arb_series()) {
        let mut expected: BTreeMap<i64, Decimal> = BTreeMap::new();
        for c in &a { expected.insert(c.ts.timestamp(), c.close); }
        for c in &b { expected.insert(c.ts.timestamp(), c.close); }

        let merged = merge_insert(a, b);
        for w in merged.windows(2) {
            prop_assert!(w[0].ts < w[1].ts);
        }
        let got: BTreeMap<i64, Decimal> = merged.iter().map(|c| (c.ts.timestamp(), c.close)).collect();
        prop_assert_eq!(got, expected);
    }

    #[test]
    fn fetch_after_insert_returns_inserted_slice(series in arb_series(), lo in 0i64..5_000i64, len in 0i64..5_000i64) {
        prop_assume!(!series.is_empty());
        let mut store = CandleStore::new();
        store.insert(minute(), series.clone());

        let first = series.first().unwrap().ts.timestamp();
        let last = series.last().unwrap().ts.timestamp();
        let start = first.max(lo.min(last));
        let end = (start + len).min(last);
        let got = store.fetch(minute(), &TimeRange::new(t(start), t(end)));
        let want: Vec<Candle> = series
            .into_iter()
            .filter(|c| (start..=end).contains(&c.ts.timestamp()))
            .collect();
        prop_assert_eq!(got, want);
    }
}

#[test]
fn last_write_wins_on_same_bucket() {
    let mut store = CandleStore::new();
    let g = Granularity::new(1).unwrap();
    store.insert(g, vec![candle(1, 1)]);
    // A covered single-bucket batch is skipped, so overwrite through a wider batch.
    store.insert(g, vec![candle(0, 9), candle(1, 2)]);
    let got = store.fetch(g, &TimeRange::new(t(0), t(1)));
    assert_eq!(got.len(), 2);
    assert_eq!(got[1].close, Decimal::TWO);
}

#[test]
fn covered_batch_is_a_noop() {
    let mut store = CandleStore::new();
    let g = minute();
    let first = store.insert(g, vec![candle(0, 1), candle(1, 1), candle(2, 1)]);
    assert!(first.is_merged());
    let second = store.insert(g, vec![candle(1, 7)]);
    assert_eq!(second, InsertOutcome::AlreadyCovered);
    assert_eq!(store.fetch(g, &TimeRange::new(t(1), t(1)))[0].close, Decimal::ONE);
}

#[test]
fn finer_coverage_also_skips_coarser_insert() {
    let mut store = CandleStore::new();
    let fine = Granularity::new(5_000).unwrap();
    let coarse = Granularity::new(10_000).unwrap();
    store.insert(fine, (0..=20).step_by(5).map(|s| candle(s, 1)).collect());
    let out = store.insert(coarse, vec![candle(0, 1), candle(10, 1), candle(20, 1)]);
    assert_eq!(out, InsertOutcome::AlreadyCovered);
    assert_eq!(store.len(coarse), 0);
}

#[test]
fn raw_batch_missing_timestamp_is_rejected_without_partial_insert() {
    let mut store = CandleStore::new();
    let mut bad: RawCandle = candle(5, 1).into();
    bad.ts = None;
    let batch = vec![candle(0, 1).into(), bad, candle(10, 1).into()];
    let err = store.insert_raw(minute(), batch).unwrap_err();
    assert!(matches!(err, CacheError::Validation(_)));
    assert!(store.is_empty());
    assert!(store.skyline(minute()).is_none());
}

#[test]
fn empty_batch_is_ignored() {
    let mut store = CandleStore::new();
    assert_eq!(store.insert(minute(), vec![]), InsertOutcome::Empty);
    assert!(store.is_empty());
}

#[test]
fn clear_drops_everything() {
    let mut store = CandleStore::new();
    store.insert(minute(), vec![candle(0, 1)]);
    store.clear();
    assert!(store.is_empty());
    assert_eq!(store.len(minute()), 0);
    assert!(store.skyline(minute()).is_none());
}

#[test]
fn merge_insert_single_bucket_overwrite() {
    let merged = merge_insert(vec![candle(1, 1)], vec![candle(1, 2)]);
    assert_eq!(merged.len(), 1);
    assert_eq!(merged[0].close, Decimal::TWO);
}
