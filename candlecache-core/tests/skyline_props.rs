use candlecache_core::{Skyline, TimeRange, merge_ranges};
use chrono::{DateTime, Utc};
use proptest::prelude::*;

fn t(s: i64) -> DateTime<Utc> {
    DateTime::from_timestamp(s, 0).unwrap()
}

fn arb_range() -> impl Strategy<Value = TimeRange> {
    (0i64..10_000i64, 0i64..500i64).prop_map(|(start, len)| TimeRange::new(t(start), t(start + len)))
}

proptest! {
    #[test]
    fn merge_is_idempotent(ranges in proptest::collection::vec(arb_range(), 0..60)) {
        let once = merge_ranges(ranges);
        let twice = merge_ranges(once.clone());
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn merged_ranges_are_sorted_and_strictly_disjoint(ranges in proptest::collection::vec(arb_range(), 0..60)) {
        let merged = merge_ranges(ranges);
        for w in merged.windows(2) {
            prop_assert!(w[0].start <= w[0].end);
            prop_assert!(w[0].end < w[1].start);
        }
    }

    #[test]
    fn every_input_is_covered_after_merge(ranges in proptest::collection::vec(arb_range(), 1..60)) {
        let mut sky = Skyline::new();
        for r in &ranges {
            sky.add(*r);
        }
        for r in &ranges {
            prop_assert!(sky.covers(r));
        }
        let expected = merge_ranges(ranges);
        prop_assert_eq!(sky.ranges(), expected.as_slice());
    }

    #[test]
    fn merge_does_not_invent_coverage(ranges in proptest::collection::vec(arb_range(), 1..30), point in 0i64..11_000i64) {
        let merged = merge_ranges(ranges.clone());
        let inside_merged = merged.iter().any(|r| r.contains_ts(t(point)));
        let inside_input = ranges.iter().any(|r| r.contains_ts(t(point)));
        prop_assert_eq!(inside_merged, inside_input);
    }
}

#[test]
fn touching_and_disjoint_examples() {
    assert_eq!(
        merge_ranges(vec![TimeRange::new(t(0), t(10)), TimeRange::new(t(10), t(20))]),
        vec![TimeRange::new(t(0), t(20))]
    );
    assert_eq!(
        merge_ranges(vec![TimeRange::new(t(0), t(5)), TimeRange::new(t(10), t(15))]),
        vec![TimeRange::new(t(0), t(5)), TimeRange::new(t(10), t(15))]
    );
}
