use std::sync::Arc;
use std::time::Duration;

use candlecache::{Granularity, QueryOutcome, TimeSeriesCache};
use candlecache_mock::MockSource;
use chrono::{TimeDelta, TimeZone, Utc};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Run with `RUST_LOG=candlecache=debug` and `--features tracing` to see cache decisions.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    // 1. A mock source that synthesizes candles and takes 50ms per call.
    let source = Arc::new(MockSource::new().with_latency(Duration::from_millis(50)));

    // 2. Build the cache: at most 120 candles per source call, 200ms cooldown.
    let cache = TimeSeriesCache::builder()
        .source(source.clone())
        .granularity(Granularity::from_minutes(1)?)
        .max_candles_per_request(120)
        .cooldown(Duration::from_millis(200))
        .build()?;

    let mut events = cache.subscribe();
    let minute = Granularity::from_minutes(1)?;
    let five = Granularity::from_minutes(5)?;
    let start = Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).single().ok_or("bad date")?;
    let end = start + TimeDelta::hours(6);

    // 3. Cold query: six hours of 1m candles, fetched in concurrent windows.
    let cold = cache.query(start, end, minute).await?;
    println!(
        "cold 1m query: {} candles from {} source calls",
        cold.candles().map_or(0, <[_]>::len),
        source.calls()
    );
    let mut modified = 0;
    while events.try_recv().is_ok() {
        modified += 1;
    }
    println!("  {modified} DataModified events");

    // 4. Immediate re-query is dropped by the cooldown.
    let dropped = cache.query(start, end, minute).await?;
    println!("immediate re-query throttled: {}", dropped.is_throttled());

    tokio::time::sleep(Duration::from_millis(250)).await;

    // 5. 5m candles are built from the cached 1m series without touching the source.
    match cache.query(start, end, five).await? {
        QueryOutcome::Downsampled { from, candles } => {
            println!("5m query: {} candles aggregated from {from}", candles.len());
            for c in candles.iter().take(3) {
                println!(
                    " - {} O {} H {} L {} C {} V {}",
                    c.ts, c.open, c.high, c.low, c.close, c.volume
                );
            }
        }
        other => println!("5m query: unexpected outcome {other:?}"),
    }
    println!("source calls after 5m query: {}", source.calls());

    println!("1m coverage: {:?}", cache.coverage(minute)?);
    cache.dispose();
    Ok(())
}
