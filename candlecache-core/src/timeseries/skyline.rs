use candlecache_types::TimeRange;

/// Merge possibly-overlapping ranges into a minimal, sorted, disjoint cover.
///
/// Ranges are sorted by `start` and swept left to right against the last
/// accepted range:
/// - a strict gap (`top.end < range.start`) starts a new entry;
/// - an overlap that reaches further extends `top.end`;
/// - a range already contained in `top` is dropped.
///
/// Touching ranges (`top.end == range.start`) are merged.
#[must_use]
pub fn merge_ranges(mut ranges: Vec<TimeRange>) -> Vec<TimeRange> {
    if ranges.is_empty() {
        return ranges;
    }
    ranges.sort_by_key(|r| r.start);

    let mut stack: Vec<TimeRange> = Vec::with_capacity(ranges.len());
    for range in ranges {
        if let Some(top) = stack.last_mut()
            && top.end >= range.start
        {
            if top.end < range.end {
                top.end = range.end;
            }
            continue;
        }
        stack.push(range);
    }
    stack
}

/// Sorted, disjoint set of time ranges known to be fully populated for one granularity.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Skyline {
    ranges: Vec<TimeRange>,
}

impl Skyline {
    /// Create an empty skyline.
    #[must_use]
    pub const fn new() -> Self {
        Self { ranges: Vec::new() }
    }

    /// Record `range` as covered and re-merge the whole skyline.
    pub fn add(&mut self, range: TimeRange) {
        let mut all = std::mem::take(&mut self.ranges);
        all.push(range);
        self.ranges = merge_ranges(all);
    }

    /// Returns `true` if a single entry fully contains `range`.
    #[must_use]
    pub fn covers(&self, range: &TimeRange) -> bool {
        self.ranges.iter().any(|r| r.contains(range))
    }

    /// The merged ranges in ascending order.
    #[must_use]
    pub fn ranges(&self) -> &[TimeRange] {
        &self.ranges
    }

    /// Returns `true` if nothing is covered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }
}
