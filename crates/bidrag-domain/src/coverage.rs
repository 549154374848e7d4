//! Coverage validator
//!
//! Checks one subject's periods for completeness from a reference start
//! (the case's virkningstidspunkt) into the unbounded future: gaps,
//! conflicting overlaps, future-dated periods and missing ongoing coverage.
//!
//! A subject whose last period has a hard end date is missing current
//! information. That is reported as a gap with no end (see
//! [`Finding::NoOngoingPeriod`]), the same defect class as any other gap.

use crate::finding::{Finding, Gap, OverlapGroup, SubjectValidationResult};
use crate::interval::{first_day_of_month, previous_day, DateRange, Interval, PeriodId};
use crate::traits::{SameTag, TagEquivalence};
use chrono::NaiveDate;
use std::collections::BTreeSet;

/// Which checks apply beyond gaps and overlaps
///
/// The default is the plain coverage contract: ongoing coverage is required,
/// future periods are flagged, stale periods are not.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CoverageRules {
    /// Report a trailing gap when no period is ongoing
    pub require_ongoing_period: bool,
    /// Report periods starting after the first day of the current month
    pub flag_future_periods: bool,
    /// Report periods that end before the reference start
    pub flag_periods_before_reference_start: bool,
}

impl Default for CoverageRules {
    fn default() -> Self {
        Self {
            require_ongoing_period: true,
            flag_future_periods: true,
            flag_periods_before_reference_start: false,
        }
    }
}

/// Validate a subject's periods with the default rules
///
/// Overlaps count only between periods with equal tags; use `()` tags to
/// make every overlap count.
///
/// # Examples
///
/// ```
/// use bidrag_domain::{validate, Interval};
/// use chrono::NaiveDate;
///
/// let d = |y, m, d| NaiveDate::from_ymd_opt(y, m, d).unwrap();
/// let periods = vec![Interval::new(d(2023, 1, 1), Some(d(2023, 6, 30)), ()).unwrap()];
///
/// let result = validate(&periods, d(2023, 1, 1), d(2024, 1, 15));
/// assert!(result.has_feil());
/// assert!(!result.has_ongoing_period());
/// assert!(result.gaps()[0].is_trailing());
/// ```
pub fn validate<T>(
    periods: &[Interval<T>],
    reference_start: NaiveDate,
    now: NaiveDate,
) -> SubjectValidationResult<T>
where
    T: Clone + PartialEq,
{
    validate_with(periods, reference_start, now, &CoverageRules::default(), &SameTag)
}

/// Validate a subject's periods with explicit rules and overlap policy
///
/// Gaps are reported on `[reference_start, ∞)`: uncovered stretches ending
/// before the reference start are ignored and straddling ones are clipped.
pub fn validate_with<T, E>(
    periods: &[Interval<T>],
    reference_start: NaiveDate,
    now: NaiveDate,
    rules: &CoverageRules,
    equivalence: &E,
) -> SubjectValidationResult<T>
where
    T: Clone + PartialEq,
    E: TagEquivalence<T> + ?Sized,
{
    if periods.is_empty() {
        return SubjectValidationResult::new(vec![Finding::NoPeriods], false);
    }

    let order = sorted_order(periods);
    let mut findings = Vec::new();

    let (gaps, covered_to) = find_gaps(periods, &order, reference_start);
    findings.extend(gaps.into_iter().map(Finding::Gap));

    let has_ongoing_period = covered_to.is_none();
    if rules.require_ongoing_period {
        // A period ending on the last representable day never leaves a trailing gap
        if let Some(since) = covered_to.and_then(|to| to.succ_opt()) {
            findings.push(Finding::NoOngoingPeriod {
                since: since.max(reference_start),
            });
        }
    }

    findings.extend(find_overlaps(periods, &order, equivalence).into_iter().map(Finding::Overlap));

    if rules.flag_future_periods {
        let cutoff = first_day_of_month(now);
        for &idx in &order {
            let from = periods[idx].from();
            if from > cutoff {
                findings.push(Finding::FuturePeriod {
                    period: PeriodId(idx),
                    from,
                });
            }
        }
    }

    if rules.flag_periods_before_reference_start {
        for &idx in &order {
            if let Some(to) = periods[idx].to().filter(|to| *to < reference_start) {
                findings.push(Finding::PeriodBeforeReferenceStart {
                    period: PeriodId(idx),
                    to,
                });
            }
        }
    }

    SubjectValidationResult::new(findings, has_ongoing_period)
}

/// Input positions sorted by start, closed periods before open ones on ties
fn sorted_order<T>(periods: &[Interval<T>]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..periods.len()).collect();
    order.sort_by_key(|&idx| {
        let period = &periods[idx];
        (period.from(), period.is_ongoing(), period.to())
    });
    order
}

/// Walk the sorted periods with a coverage frontier
///
/// Returns the gaps and the last covered day, `None` when some period is
/// ongoing.
fn find_gaps<T>(
    periods: &[Interval<T>],
    order: &[usize],
    reference_start: NaiveDate,
) -> (Vec<Gap>, Option<NaiveDate>) {
    let mut gaps = Vec::new();
    let mut push_gap = |from: NaiveDate, to: NaiveDate| {
        if to >= reference_start {
            gaps.push(Gap {
                from: from.max(reference_start),
                to: Some(to),
            });
        }
    };

    let first = &periods[order[0]];
    if first.from() > reference_start {
        push_gap(reference_start, previous_day(first.from()));
    }

    let mut covered_to = first.to();
    for &idx in &order[1..] {
        let Some(frontier) = covered_to else {
            break;
        };
        let period = &periods[idx];
        if let Some(next_uncovered) = frontier.succ_opt() {
            if period.from() > next_uncovered {
                push_gap(next_uncovered, previous_day(period.from()));
            }
        }
        covered_to = period.to().map(|to| to.max(frontier));
    }

    (gaps, covered_to)
}

/// Group conflicting overlaps by their intersection ranges
///
/// Pairwise intersections are merged while they overlap or touch, so every
/// day of a group's range is covered by at least two conflicting periods.
fn find_overlaps<T, E>(periods: &[Interval<T>], order: &[usize], equivalence: &E) -> Vec<OverlapGroup<T>>
where
    T: Clone + PartialEq,
    E: TagEquivalence<T> + ?Sized,
{
    let mut links: Vec<(DateRange, usize, usize)> = Vec::new();
    for (pos, &a) in order.iter().enumerate() {
        for &b in &order[pos + 1..] {
            // Sorted by start: once b starts after a ends, so does everything after b
            let Some(range) = periods[a].range().intersection(&periods[b].range()) else {
                break;
            };
            if equivalence.equivalent(periods[a].tag(), periods[b].tag()) {
                links.push((range, a.min(b), a.max(b)));
            }
        }
    }
    links.sort_by_key(|(range, a, b)| (range.from, range.to.is_none(), range.to, *a, *b));

    let mut merged: Vec<(DateRange, BTreeSet<PeriodId>)> = Vec::new();
    for (range, a, b) in links {
        match merged.last_mut() {
            Some((current, members)) if reaches(current, &range) => {
                *current = current.span(&range);
                members.insert(PeriodId(a));
                members.insert(PeriodId(b));
            }
            _ => merged.push((range, BTreeSet::from([PeriodId(a), PeriodId(b)]))),
        }
    }

    merged
        .into_iter()
        .map(|(range, members)| {
            let mut shared_tags: Vec<T> = Vec::new();
            for member in &members {
                let tag = periods[member.index()].tag();
                if !shared_tags.contains(tag) {
                    shared_tags.push(tag.clone());
                }
            }
            OverlapGroup {
                range,
                members,
                shared_tags,
            }
        })
        .collect()
}

/// Whether `next`, starting no earlier than `current`, overlaps or touches it
fn reaches(current: &DateRange, next: &DateRange) -> bool {
    match current.to.and_then(|to| to.succ_opt()) {
        Some(after) => next.from <= after,
        None => true,
    }
}
