//! Bidrag Domain Layer
//!
//! Temporal periodization and coverage validation for child-support
//! (bidrag) cases. Coalescing and validation are pure functions over
//! immutable value types: no I/O, no logging. They never read the system
//! time themselves; `now` is passed in, and callers obtain it from an
//! injected [`Clock`].
//!
//! ## Key Concepts
//!
//! - **Interval**: a date-ranged fact `[from, to]`, `to = None` meaning ongoing
//! - **Coalescer**: sweeps intervals into a canonical timeline with a count
//!   (or any derived value) per segment
//! - **Coverage validator**: finds gaps, conflicting overlaps, future periods
//!   and missing ongoing coverage for one subject
//! - **Findings**: a closed set of irregularities; a subject "har feil" when
//!   it has any
//! - **Aggregate report**: per-category results with a single calculation gate
//!
//! ## Example
//!
//! ```
//! use bidrag_domain::{aggregate, validate, Category, Interval};
//! use chrono::NaiveDate;
//! use std::collections::BTreeMap;
//!
//! let d = |y, m, d| NaiveDate::from_ymd_opt(y, m, d).unwrap();
//! let boforhold = vec![
//!     Interval::new(d(2023, 1, 1), Some(d(2023, 6, 30)), ()).unwrap(),
//!     Interval::ongoing(d(2023, 7, 1), ()),
//! ];
//!
//! let result = validate(&boforhold, d(2023, 1, 1), d(2024, 1, 15));
//! let report = aggregate(BTreeMap::from([(Category::Boforhold, vec![result])]));
//! assert!(!report.har_feil());
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod category;
pub mod coalesce;
pub mod coverage;
pub mod finding;
pub mod interval;
pub mod report;
pub mod traits;

// Re-exports for convenience
pub use category::Category;
pub use coalesce::{coalesce, coalesce_with, merge_coverage, CanonicalPeriod};
pub use coverage::{validate, validate_with, CoverageRules};
pub use finding::{Finding, FindingKind, Gap, OverlapGroup, SubjectValidationResult};
pub use interval::{DateRange, Interval, InvalidIntervalError, PeriodId};
pub use report::{aggregate, AggregateValidationReport};
pub use traits::{AnyTag, Clock, FixedClock, SameTag, SystemClock, TagEquivalence};
