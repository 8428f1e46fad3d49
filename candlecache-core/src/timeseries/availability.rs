use candlecache_types::{Granularity, TimeRange};

use super::store::CandleStore;

impl CandleStore {
    /// Find a cached granularity that can serve `range` at `target`.
    ///
    /// A granularity `g` qualifies when it divides `target` evenly and its
    /// skyline has a single entry containing `range`. The target itself is
    /// preferred; otherwise the coarsest qualifying divisor is returned so the
    /// fewest candles need aggregating.
    #[must_use]
    pub fn resolve(&self, range: &TimeRange, target: Granularity) -> Option<Granularity> {
        if self
            .skylines
            .get(&target)
            .is_some_and(|s| s.covers(range))
        {
            return Some(target);
        }
        self.skylines
            .range(..target)
            .rev()
            .find(|(g, s)| g.divides(target) && s.covers(range))
            .map(|(g, _)| *g)
    }

    /// Returns `true` if `range` can be served at `target` from cache, either
    /// directly or by downsampling a finer granularity.
    #[must_use]
    pub fn available(&self, range: &TimeRange, target: Granularity) -> bool {
        self.resolve(range, target).is_some()
    }
}
