use candlecache_core::{Candle, Granularity, downsample};
use chrono::DateTime;
use proptest::prelude::*;
use rust_decimal::Decimal;

fn arb_complete_series() -> impl Strategy<Value = (u64, u64, Vec<Candle>)> {
    // (source_ms, factor, candles) where the series is gap-free at source_ms
    (1u64..60u64, 1u64..8u64, 1usize..12usize).prop_flat_map(|(src, factor, groups)| {
        let n = usize::try_from(factor).unwrap() * groups;
        proptest::collection::vec((0i64..1_000i64, 0i64..1_000i64, 0i64..1_000i64), n).prop_map(
            move |rows| {
                let candles = rows
                    .into_iter()
                    .enumerate()
                    .map(|(i, (a, b, v))| {
                        let lo = Decimal::from(a.min(b));
                        let hi = Decimal::from(a.max(b));
                        Candle {
                            ts: DateTime::from_timestamp_millis(
                                i64::try_from(i).unwrap() * i64::try_from(src).unwrap(),
                            )
                            .unwrap(),
                            open: lo,
                            high: hi,
                            low: lo,
                            close: hi,
                            volume: Decimal::from(v),
                            trades: Some(1),
                        }
                    })
                    .collect();
                (src, factor, candles)
            },
        )
    })
}

proptest! {
    #[test]
    fn complete_runs_collapse_by_factor((src, factor, candles) in arb_complete_series()) {
        let source = Granularity::new(src).unwrap();
        let target = Granularity::new(src * factor).unwrap();
        let out = downsample(candles.clone(), source, target).unwrap();
        let f = usize::try_from(factor).unwrap();
        prop_assert_eq!(out.len(), candles.len() / f);

        for (bucket, chunk) in out.iter().zip(candles.chunks(f)) {
            prop_assert_eq!(bucket.ts, chunk[0].ts);
            prop_assert_eq!(bucket.open, chunk[0].open);
            prop_assert_eq!(bucket.close, chunk[f - 1].close);
            prop_assert_eq!(bucket.high, chunk.iter().map(|c| c.high).max().unwrap());
            prop_assert_eq!(bucket.low, chunk.iter().map(|c| c.low).min().unwrap());
            prop_assert_eq!(bucket.volume, chunk.iter().map(|c| c.volume).sum::<Decimal>());
            prop_assert_eq!(bucket.trades, Some(factor));
        }
    }

    #[test]
    fn total_volume_is_preserved((src, factor, candles) in arb_complete_series()) {
        let total: Decimal = candles.iter().map(|c| c.volume).sum();
        let out = downsample(
            candles,
            Granularity::new(src).unwrap(),
            Granularity::new(src * factor).unwrap(),
        )
        .unwrap();
        prop_assert_eq!(out.iter().map(|c| c.volume).sum::<Decimal>(), total);
    }
}
