use candlecache_types::{CacheError, Granularity};
use chrono::DateTime;

fn g(ms: u64) -> Granularity {
    Granularity::new(ms).unwrap()
}

#[test]
fn zero_is_a_configuration_error() {
    match Granularity::new(0) {
        Err(CacheError::Configuration(_)) => {}
        other => panic!("unexpected: {other:?}"),
    }
    assert!(Granularity::from_minutes(0).is_err());
}

#[test]
fn divides_requires_even_tiling() {
    assert!(g(5).divides(g(10)));
    assert!(g(10).divides(g(10)));
    assert!(!g(5).divides(g(7)));
    assert!(!g(20).divides(g(10)));
    assert!(g(60_000).divides(Granularity::from_minutes(15).unwrap()));
}

#[test]
fn buckets_between_rounds_up() {
    let t = |ms: i64| DateTime::from_timestamp_millis(ms).unwrap();
    assert_eq!(g(10).buckets_between(t(0), t(100)), 10);
    assert_eq!(g(10).buckets_between(t(0), t(101)), 11);
    assert_eq!(g(10).buckets_between(t(0), t(0)), 0);
    assert_eq!(g(10).buckets_between(t(50), t(0)), 0);
}

#[test]
fn display_and_duration() {
    assert_eq!(g(1_500).to_string(), "1500ms");
    assert_eq!(g(1_500).as_duration().num_milliseconds(), 1_500);
}
