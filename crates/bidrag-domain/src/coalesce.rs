//! Sweep-line coalescer
//!
//! Turns a bag of possibly overlapping intervals into an ordered,
//! non-overlapping timeline where every segment carries a derived value,
//! typically how many inputs cover it ("antall barn i husstanden").
//!
//! The sweep registers a start event at every `from` and an end event at the
//! day after every `to` (or at +∞ for ongoing intervals), then walks the
//! distinct event points in order. Each pair of consecutive points is one
//! segment. Segments with equal values are never merged: callers key their
//! results by segment boundaries.

use crate::interval::{previous_day, DateRange, Interval};
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

/// One segment of a coalesced timeline
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CanonicalPeriod<V> {
    /// First included day
    pub from: NaiveDate,
    /// Last included day, `None` for the open-ended tail
    pub to: Option<NaiveDate>,
    /// Derived value for every day in the segment
    pub value: V,
}

impl<V> CanonicalPeriod<V> {
    /// The tagless range of this segment
    pub fn range(&self) -> DateRange {
        DateRange { from: self.from, to: self.to }
    }

    /// Check if the segment covers a date
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.range().contains(date)
    }
}

/// An event point on the sweep line. `Infinity` orders after every date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum EventPoint {
    Date(NaiveDate),
    Infinity,
}

impl EventPoint {
    fn end_of(interval_end: Option<NaiveDate>) -> Self {
        interval_end.map_or(EventPoint::Infinity, EventPoint::Date)
    }

    /// Inclusive end of a segment that stops just before this point
    fn segment_to(self) -> Option<NaiveDate> {
        match self {
            EventPoint::Date(date) => Some(previous_day(date)),
            EventPoint::Infinity => None,
        }
    }
}

/// Count overlapping intervals over time
///
/// For every day covered by at least one input, exactly one output period
/// contains it and its value is the number of inputs covering that day.
/// Days covered by no input appear in no output period.
///
/// # Examples
///
/// ```
/// use bidrag_domain::{coalesce, Interval};
/// use chrono::NaiveDate;
///
/// let d = |y, m, d| NaiveDate::from_ymd_opt(y, m, d).unwrap();
/// let intervals = vec![
///     Interval::new(d(2023, 1, 1), Some(d(2023, 3, 31)), ()).unwrap(),
///     Interval::ongoing(d(2023, 2, 1), ()),
/// ];
///
/// let periods = coalesce(&intervals);
/// assert_eq!(periods.len(), 3);
/// assert_eq!(periods[1].value, 2);
/// assert_eq!(periods[2].to, None);
/// ```
pub fn coalesce<T>(intervals: &[Interval<T>]) -> Vec<CanonicalPeriod<usize>> {
    let mut events: BTreeMap<EventPoint, (usize, usize)> = BTreeMap::new();
    for interval in intervals {
        events.entry(EventPoint::Date(interval.from())).or_default().0 += 1;
        events.entry(EventPoint::end_of(interval.end_exclusive())).or_default().1 += 1;
    }

    let mut points = events.into_iter();
    // An end event sits strictly after its start, so the first point only starts
    let Some((mut last, (mut count, _))) = points.next() else {
        return Vec::new();
    };

    let mut periods = Vec::new();
    for (point, (starts, ends)) in points {
        if let EventPoint::Date(from) = last {
            if count > 0 {
                periods.push(CanonicalPeriod {
                    from,
                    to: point.segment_to(),
                    value: count,
                });
            }
        }
        count = count + starts - ends;
        last = point;
    }

    periods
}

/// Sweep the intervals and derive each segment's value from its active tags
///
/// `value_of` receives the tags of every interval covering the segment, in
/// input order. Returning `None` drops the segment. Segments covered by no
/// interval are skipped without calling `value_of`.
///
/// # Examples
///
/// ```
/// use bidrag_domain::{coalesce_with, Interval};
/// use chrono::NaiveDate;
///
/// let d = |y, m, d| NaiveDate::from_ymd_opt(y, m, d).unwrap();
/// let incomes = vec![
///     Interval::new(d(2023, 1, 1), Some(d(2023, 12, 31)), 300_000).unwrap(),
///     Interval::ongoing(d(2023, 7, 1), 50_000),
/// ];
///
/// let total = coalesce_with(&incomes, |active| Some(active.iter().copied().sum::<i32>()));
/// assert_eq!(total[1].value, 350_000);
/// ```
pub fn coalesce_with<T, V, F>(intervals: &[Interval<T>], value_of: F) -> Vec<CanonicalPeriod<V>>
where
    F: Fn(&[&T]) -> Option<V>,
{
    let mut events: BTreeMap<EventPoint, (Vec<usize>, Vec<usize>)> = BTreeMap::new();
    for (idx, interval) in intervals.iter().enumerate() {
        events.entry(EventPoint::Date(interval.from())).or_default().0.push(idx);
        events
            .entry(EventPoint::end_of(interval.end_exclusive()))
            .or_default()
            .1
            .push(idx);
    }

    let mut active: BTreeSet<usize> = BTreeSet::new();
    let mut last: Option<EventPoint> = None;
    let mut periods = Vec::new();

    for (point, (starts, ends)) in events {
        if let Some(EventPoint::Date(from)) = last {
            if !active.is_empty() {
                let tags: Vec<&T> = active.iter().map(|&idx| intervals[idx].tag()).collect();
                if let Some(value) = value_of(&tags) {
                    periods.push(CanonicalPeriod {
                        from,
                        to: point.segment_to(),
                        value,
                    });
                }
            }
        }
        for idx in ends {
            active.remove(&idx);
        }
        active.extend(starts);
        last = Some(point);
    }

    periods
}

/// Reduce intervals to the ranges covered by at least one of them
///
/// Overlapping and contiguous inputs are joined, so the result is the
/// minimal set of disjoint, non-adjacent ranges with the same coverage.
pub fn merge_coverage<T>(intervals: &[Interval<T>]) -> Vec<DateRange> {
    let mut merged: Vec<DateRange> = Vec::new();
    for period in coalesce(intervals) {
        match merged.last_mut() {
            Some(last) if last.to.and_then(|to| to.succ_opt()) == Some(period.from) => {
                last.to = period.to;
            }
            _ => merged.push(period.range()),
        }
    }
    merged
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    const HORIZON: i64 = 400;

    fn base() -> NaiveDate {
        NaiveDate::from_ymd_opt(2023, 1, 1).unwrap()
    }

    fn day(offset: i64) -> NaiveDate {
        base() + chrono::Duration::days(offset)
    }

    fn interval_strategy() -> impl Strategy<Value = Interval<()>> {
        (0..HORIZON, proptest::option::of(0..90i64)).prop_map(|(start, len)| {
            Interval::new(day(start), len.map(|len| day(start + len)), ()).unwrap()
        })
    }

    proptest! {
        /// Property: every day reports exactly the number of covering inputs
        #[test]
        fn test_coverage_property(intervals in proptest::collection::vec(interval_strategy(), 0..12)) {
            let periods = coalesce(&intervals);

            for offset in -5..HORIZON + 100 {
                let x = day(offset);
                let expected = intervals.iter().filter(|i| i.contains(x)).count();
                let covering: Vec<_> = periods.iter().filter(|p| p.contains(x)).collect();

                if expected == 0 {
                    prop_assert!(covering.is_empty(), "{} should be uncovered", x);
                } else {
                    prop_assert_eq!(covering.len(), 1, "{} should be in exactly one period", x);
                    prop_assert_eq!(covering[0].value, expected);
                }
            }
        }

        /// Property: output is sorted, disjoint and contiguous unless a zero segment was dropped
        #[test]
        fn test_partition_property(intervals in proptest::collection::vec(interval_strategy(), 0..12)) {
            let periods = coalesce(&intervals);

            for pair in periods.windows(2) {
                let (a, b) = (&pair[0], &pair[1]);
                let a_to = a.to.expect("only the last period may be open-ended");
                prop_assert!(a_to < b.from);

                let next = a_to.succ_opt().unwrap();
                if next != b.from {
                    // The skipped days must be covered by no input
                    prop_assert!(!intervals.iter().any(|i| i.contains(next)));
                }
            }
            prop_assert!(periods.iter().all(|p| p.value > 0));
        }

        /// Property: re-coalescing a timeline yields the same segments with value 1
        #[test]
        fn test_idempotence(intervals in proptest::collection::vec(interval_strategy(), 0..12)) {
            let periods = coalesce(&intervals);
            let as_intervals: Vec<Interval<()>> = periods
                .iter()
                .map(|p| Interval::new(p.from, p.to, ()).unwrap())
                .collect();

            let again = coalesce(&as_intervals);

            prop_assert_eq!(again.len(), periods.len());
            for (a, b) in again.iter().zip(&periods) {
                prop_assert_eq!(a.range(), b.range());
                prop_assert_eq!(a.value, 1);
            }
        }

        /// Property: counting through coalesce_with matches coalesce
        #[test]
        fn test_coalesce_with_matches_count(intervals in proptest::collection::vec(interval_strategy(), 0..12)) {
            let counted = coalesce(&intervals);
            let derived = coalesce_with(&intervals, |active| Some(active.len()));
            prop_assert_eq!(counted, derived);
        }
    }
}
