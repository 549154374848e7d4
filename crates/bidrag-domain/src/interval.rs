//! Interval module - the date-ranged fact every other module works on

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Raised when an interval would end before it starts
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("Invalid interval: to ({to}) is before from ({from})")]
pub struct InvalidIntervalError {
    /// Requested start date
    pub from: NaiveDate,
    /// Requested (inclusive) end date
    pub to: NaiveDate,
}

/// Position of a period in the caller's input slice
///
/// Findings name periods by `PeriodId` so the caller can map them back to
/// the rows it loaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PeriodId(pub usize);

impl PeriodId {
    /// Index into the slice the period came from
    pub fn index(&self) -> usize {
        self.0
    }
}

impl fmt::Display for PeriodId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A date-ranged fact `[from, to]` with a classification tag
///
/// `to` is the last included day. `to = None` means the interval is still in
/// effect ("løpende"). Fields are private so the `to >= from` invariant holds
/// for every value in circulation.
///
/// # Examples
///
/// ```
/// use bidrag_domain::Interval;
/// use chrono::NaiveDate;
///
/// let from = NaiveDate::from_ymd_opt(2023, 1, 1).unwrap();
/// let to = NaiveDate::from_ymd_opt(2023, 6, 30).unwrap();
///
/// let interval = Interval::new(from, Some(to), ()).unwrap();
/// assert!(interval.contains(NaiveDate::from_ymd_opt(2023, 3, 15).unwrap()));
///
/// assert!(Interval::new(to, Some(from), ()).is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawInterval<T>")]
pub struct Interval<T> {
    from: NaiveDate,
    to: Option<NaiveDate>,
    tag: T,
}

#[derive(Deserialize)]
struct RawInterval<T> {
    from: NaiveDate,
    #[serde(default)]
    to: Option<NaiveDate>,
    tag: T,
}

impl<T> TryFrom<RawInterval<T>> for Interval<T> {
    type Error = InvalidIntervalError;

    fn try_from(raw: RawInterval<T>) -> Result<Self, Self::Error> {
        Interval::new(raw.from, raw.to, raw.tag)
    }
}

impl<T> Interval<T> {
    /// Create a new interval
    ///
    /// # Errors
    /// Returns [`InvalidIntervalError`] when `to` is before `from`
    pub fn new(from: NaiveDate, to: Option<NaiveDate>, tag: T) -> Result<Self, InvalidIntervalError> {
        if let Some(to) = to {
            if to < from {
                return Err(InvalidIntervalError { from, to });
            }
        }
        Ok(Self { from, to, tag })
    }

    /// Create an open-ended interval starting at `from`
    pub fn ongoing(from: NaiveDate, tag: T) -> Self {
        Self { from, to: None, tag }
    }

    /// First included day
    pub fn from(&self) -> NaiveDate {
        self.from
    }

    /// Last included day, or `None` while the interval is ongoing
    pub fn to(&self) -> Option<NaiveDate> {
        self.to
    }

    /// Classification payload
    pub fn tag(&self) -> &T {
        &self.tag
    }

    /// Whether the interval has no end date
    pub fn is_ongoing(&self) -> bool {
        self.to.is_none()
    }

    /// First day after the interval
    ///
    /// `None` when the interval is ongoing, or when it ends on the last
    /// representable date.
    pub fn end_exclusive(&self) -> Option<NaiveDate> {
        self.to.and_then(|to| to.succ_opt())
    }

    /// Check if the interval covers a date
    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.from && self.to.is_none_or(|to| date <= to)
    }

    /// Check if two intervals share at least one day
    pub fn intersects<U>(&self, other: &Interval<U>) -> bool {
        self.range().intersection(&other.range()).is_some()
    }

    /// The tagless range of this interval
    pub fn range(&self) -> DateRange {
        DateRange { from: self.from, to: self.to }
    }

    /// Replace the tag, keeping the range
    pub fn map_tag<U>(self, f: impl FnOnce(T) -> U) -> Interval<U> {
        Interval {
            from: self.from,
            to: self.to,
            tag: f(self.tag),
        }
    }
}

impl<T> fmt::Display for Interval<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.range().fmt(f)
    }
}

/// An inclusive date range without a payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DateRange {
    /// First included day
    pub from: NaiveDate,
    /// Last included day, `None` for unbounded
    pub to: Option<NaiveDate>,
}

impl DateRange {
    /// Check if the range covers a date
    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.from && self.to.is_none_or(|to| date <= to)
    }

    /// The days covered by both ranges, if any
    pub fn intersection(&self, other: &DateRange) -> Option<DateRange> {
        let from = self.from.max(other.from);
        let to = match (self.to, other.to) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (Some(a), None) | (None, Some(a)) => Some(a),
            (None, None) => None,
        };
        match to {
            Some(to) if to < from => None,
            _ => Some(DateRange { from, to }),
        }
    }

    /// Smallest range covering both
    pub fn span(&self, other: &DateRange) -> DateRange {
        let to = match (self.to, other.to) {
            (Some(a), Some(b)) => Some(a.max(b)),
            _ => None,
        };
        DateRange {
            from: self.from.min(other.from),
            to,
        }
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to {
            Some(to) => write!(f, "{}..{}", self.from, to),
            None => write!(f, "{}..", self.from),
        }
    }
}

/// The day before `date`, saturating at the calendar minimum
pub fn previous_day(date: NaiveDate) -> NaiveDate {
    date.pred_opt().unwrap_or(date)
}

/// First day of the month containing `date`
pub fn first_day_of_month(date: NaiveDate) -> NaiveDate {
    date.with_day0(0).unwrap_or(date)
}
