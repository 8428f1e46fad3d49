mod helpers;

use std::sync::Arc;

use candlecache::{QueryOutcome, RawCandle, TimeRange};
use candlecache_mock::{MockSource, synthesize};
use helpers::*;
use rust_decimal::Decimal;

#[tokio::test]
async fn cache_hit_skips_the_source() {
    let source = Arc::new(MockSource::new());
    let cache = cache_over(source.clone());
    cache
        .add(g(100), synthesize(TimeRange::new(t(0), t(1_000)), g(100)))
        .unwrap();

    let out = cache.query(t(200), t(700), g(100)).await.unwrap();
    assert_eq!(out, QueryOutcome::CacheHit(expected(200, 700, g(100))));
    assert_eq!(source.calls(), 0);
}

#[tokio::test]
async fn finer_cache_is_downsampled_without_write_back() {
    let source = Arc::new(MockSource::new());
    let cache = cache_over(source.clone());
    let minute = g(60_000);
    let five = g(300_000);
    let raw: Vec<RawCandle> = synthesize(TimeRange::new(t(0), t(540_000)), minute);
    cache.add(minute, raw.clone()).unwrap();

    let out = cache.query(t(0), t(540_000), five).await.unwrap();
    let QueryOutcome::Downsampled { from, candles } = out else {
        panic!("expected a downsampled result, got {out:?}");
    };
    assert_eq!(from, minute);
    assert_eq!(candles.len(), 2);

    let head = &raw[..5];
    let first = &candles[0];
    assert_eq!(first.ts, t(0));
    assert_eq!(first.open, head[0].open);
    assert_eq!(first.close, head[4].close);
    assert_eq!(first.high, head.iter().map(|c| c.high).max().unwrap());
    assert_eq!(first.low, head.iter().map(|c| c.low).min().unwrap());
    assert_eq!(first.volume, head.iter().map(|c| c.volume).sum::<Decimal>());
    assert_eq!(
        first.trades,
        Some(head.iter().filter_map(|c| c.trades).sum::<u64>())
    );
    assert_eq!(candles[1].ts, t(300_000));

    assert_eq!(source.calls(), 0);
    assert!(cache.coverage(five).unwrap().is_empty());
}

#[tokio::test]
async fn exact_granularity_wins_over_finer() {
    let cache = cache_over(Arc::new(MockSource::new()));
    cache
        .add(g(500), vec![raw(0, 7), raw(500, 7), raw(1_000, 7)])
        .unwrap();
    cache
        .add(g(100), synthesize(TimeRange::new(t(0), t(1_000)), g(100)))
        .unwrap();

    let out = cache.query(t(0), t(1_000), g(500)).await.unwrap();
    let QueryOutcome::CacheHit(candles) = out else {
        panic!("expected a cache hit, got {out:?}");
    };
    assert!(candles.iter().all(|c| c.close == Decimal::from(7)));
}

#[tokio::test]
async fn backfill_fills_range_then_serves_from_cache() {
    let source = Arc::new(MockSource::new());
    let cache = cache_over(source.clone());

    let out = cache.query(t(0), t(3_000), g(100)).await.unwrap();
    assert_eq!(out, QueryOutcome::Backfilled(expected(0, 3_000, g(100))));
    assert_eq!(source.calls(), 3);
    assert_eq!(
        cache.coverage(g(100)).unwrap(),
        vec![TimeRange::new(t(0), t(3_000))]
    );

    let again = cache.query(t(0), t(3_000), g(100)).await.unwrap();
    assert_eq!(again, QueryOutcome::CacheHit(expected(0, 3_000, g(100))));
    assert_eq!(source.calls(), 3);
}

#[tokio::test]
async fn backfilled_result_is_sorted_and_unique() {
    let source = Arc::new(MockSource::new());
    let cache = cache_over(source);
    let candles = cache
        .query(t(0), t(2_500), g(100))
        .await
        .unwrap()
        .into_candles()
        .unwrap();
    assert!(candles.windows(2).all(|w| w[0].ts < w[1].ts));
    assert_eq!(candles.len(), 26);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn query_future_can_be_spawned() {
    let cache = Arc::new(cache_over(Arc::new(MockSource::new())));
    let handles: Vec<_> = (0..4)
        .map(|i| {
            let cache = Arc::clone(&cache);
            tokio::spawn(async move {
                let start = i * 10_000;
                cache.query(t(start), t(start + 1_000), g(100)).await
            })
        })
        .collect();
    for h in handles {
        let out = h.await.unwrap().unwrap();
        assert!(!out.is_throttled());
    }
    assert_eq!(cache.coverage(g(100)).unwrap().len(), 4);
}
