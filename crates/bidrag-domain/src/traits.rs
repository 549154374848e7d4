//! Trait definitions for the seams callers plug into
//!
//! Validation takes "today" from a [`Clock`] the caller picks and never
//! hard-codes which overlaps matter. Both decisions come in through these
//! traits.

use chrono::NaiveDate;

/// Decides whether two overlapping periods are in conflict
///
/// Boforhold and sivilstand treat every overlap as a conflict. Income only
/// conflicts when two records share the same income type, so the inntekt
/// policy plugs in [`SameTag`] or a closure.
pub trait TagEquivalence<T: ?Sized> {
    /// Whether an overlap between periods tagged `a` and `b` is a finding
    fn equivalent(&self, a: &T, b: &T) -> bool;
}

/// Every overlap counts, regardless of tags
#[derive(Debug, Clone, Copy, Default)]
pub struct AnyTag;

impl<T: ?Sized> TagEquivalence<T> for AnyTag {
    fn equivalent(&self, _a: &T, _b: &T) -> bool {
        true
    }
}

/// Overlaps count only between periods with equal tags
#[derive(Debug, Clone, Copy, Default)]
pub struct SameTag;

impl<T: PartialEq + ?Sized> TagEquivalence<T> for SameTag {
    fn equivalent(&self, a: &T, b: &T) -> bool {
        a == b
    }
}

impl<T: ?Sized, F> TagEquivalence<T> for F
where
    F: Fn(&T, &T) -> bool,
{
    fn equivalent(&self, a: &T, b: &T) -> bool {
        self(a, b)
    }
}

/// Source of "today"
///
/// Injected so validation is reproducible in tests.
pub trait Clock {
    /// The current calendar date
    fn today(&self) -> NaiveDate;
}

/// Clock reading the local system date
///
/// The only place in the crate that reads the system time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        chrono::Local::now().date_naive()
    }
}

/// Clock pinned to a fixed date
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedClock(pub NaiveDate);

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.0
    }
}
