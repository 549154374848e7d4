//! Findings module - what coverage validation reports about one subject
//!
//! Irregularities in a subject's timeline are data, not errors. Each one is
//! a [`Finding`] variant; a subject is in error ("har feil") exactly when its
//! finding list is non-empty.

use crate::interval::{DateRange, PeriodId};
use chrono::NaiveDate;
use serde::{Serialize, Serializer};
use std::collections::BTreeSet;
use std::fmt;

/// A stretch of time not covered by any period ("hull i perioder")
///
/// `to = None` marks a trailing gap: coverage stops and nothing picks it up
/// again, so the subject has no ongoing period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Gap {
    /// First uncovered day
    pub from: NaiveDate,
    /// Last uncovered day, `None` for a trailing gap
    pub to: Option<NaiveDate>,
}

impl Gap {
    /// Whether this gap runs into the unbounded future
    pub fn is_trailing(&self) -> bool {
        self.to.is_none()
    }

    /// Check if the gap covers a date
    pub fn contains(&self, date: NaiveDate) -> bool {
        DateRange { from: self.from, to: self.to }.contains(date)
    }
}

/// A maximal set of periods that overlap in conflict
///
/// Built from pairwise intersections whose tags the category's equivalence
/// accepted, merged while they overlap or touch. Every day of `range` is
/// covered by at least two members.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OverlapGroup<T> {
    /// Span of the conflicting intersections
    pub range: DateRange,
    /// Periods taking part in the conflict
    pub members: BTreeSet<PeriodId>,
    /// Distinct tags carried by the members
    pub shared_tags: Vec<T>,
}

impl<T> OverlapGroup<T> {
    /// Convert the tags, keeping range and members
    pub fn map_tags<U>(self, f: impl Fn(T) -> U) -> OverlapGroup<U> {
        OverlapGroup {
            range: self.range,
            members: self.members,
            shared_tags: self.shared_tags.into_iter().map(f).collect(),
        }
    }
}

/// Finding category, used for counting and display
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum FindingKind {
    /// Uncovered stretch inside the timeline
    Gap,
    /// Conflicting overlap
    Overlap,
    /// Period starting after the current month
    FuturePeriod,
    /// Coverage ends and no period is ongoing
    NoOngoingPeriod,
    /// Subject has no periods at all
    NoPeriods,
    /// Period ending before the reference start
    PeriodBeforeReferenceStart,
    /// Period carrying an unusable status
    InvalidStatus,
}

impl FindingKind {
    /// Get the kind name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            FindingKind::Gap => "gap",
            FindingKind::Overlap => "overlap",
            FindingKind::FuturePeriod => "future_period",
            FindingKind::NoOngoingPeriod => "no_ongoing_period",
            FindingKind::NoPeriods => "no_periods",
            FindingKind::PeriodBeforeReferenceStart => "period_before_reference_start",
            FindingKind::InvalidStatus => "invalid_status",
        }
    }
}

impl fmt::Display for FindingKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One irregularity in a subject's timeline
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Finding<T> {
    /// Uncovered stretch between the reference start and the last coverage
    Gap(Gap),

    /// Periods overlapping in conflict
    Overlap(OverlapGroup<T>),

    /// A period starts after the first day of the current month
    FuturePeriod {
        /// Offending period
        period: PeriodId,
        /// Its start date
        from: NaiveDate,
    },

    /// Every period has ended; uncovered from `since` onwards
    NoOngoingPeriod {
        /// First day without coverage
        since: NaiveDate,
    },

    /// The subject has no periods
    NoPeriods,

    /// A period lies entirely before the reference start
    PeriodBeforeReferenceStart {
        /// Offending period
        period: PeriodId,
        /// Its last day
        to: NaiveDate,
    },

    /// A period's status cannot be used for calculation
    InvalidStatus {
        /// Offending period
        period: PeriodId,
        /// Its range
        range: DateRange,
    },
}

impl<T> Finding<T> {
    /// The kind of this finding
    pub fn kind(&self) -> FindingKind {
        match self {
            Finding::Gap(_) => FindingKind::Gap,
            Finding::Overlap(_) => FindingKind::Overlap,
            Finding::FuturePeriod { .. } => FindingKind::FuturePeriod,
            Finding::NoOngoingPeriod { .. } => FindingKind::NoOngoingPeriod,
            Finding::NoPeriods => FindingKind::NoPeriods,
            Finding::PeriodBeforeReferenceStart { .. } => FindingKind::PeriodBeforeReferenceStart,
            Finding::InvalidStatus { .. } => FindingKind::InvalidStatus,
        }
    }

    /// Rewrite the period positions this finding refers to
    pub fn map_period_ids(self, f: impl Fn(PeriodId) -> PeriodId) -> Finding<T> {
        match self {
            Finding::Overlap(mut group) => {
                group.members = group.members.into_iter().map(&f).collect();
                Finding::Overlap(group)
            }
            Finding::FuturePeriod { period, from } => Finding::FuturePeriod { period: f(period), from },
            Finding::PeriodBeforeReferenceStart { period, to } => {
                Finding::PeriodBeforeReferenceStart { period: f(period), to }
            }
            Finding::InvalidStatus { period, range } => Finding::InvalidStatus { period: f(period), range },
            other => other,
        }
    }

    /// Convert the tags carried by overlap findings
    pub fn map_tag<U>(self, f: impl Fn(T) -> U) -> Finding<U> {
        match self {
            Finding::Gap(gap) => Finding::Gap(gap),
            Finding::Overlap(group) => Finding::Overlap(group.map_tags(f)),
            Finding::FuturePeriod { period, from } => Finding::FuturePeriod { period, from },
            Finding::NoOngoingPeriod { since } => Finding::NoOngoingPeriod { since },
            Finding::NoPeriods => Finding::NoPeriods,
            Finding::PeriodBeforeReferenceStart { period, to } => {
                Finding::PeriodBeforeReferenceStart { period, to }
            }
            Finding::InvalidStatus { period, range } => Finding::InvalidStatus { period, range },
        }
    }
}

/// Validation outcome for one subject (one person, one classification context)
///
/// Serializes in the flag-based report shape
/// `{ gaps, overlaps, hasFuturePeriod, hasNoPeriods, hasOngoingPeriod, hasFeil, findings }`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubjectValidationResult<T> {
    /// Caller-chosen label (ident, income class, ...)
    pub subject: Option<String>,
    findings: Vec<Finding<T>>,
    has_ongoing_period: bool,
}

impl<T> SubjectValidationResult<T> {
    /// Create a result from findings
    ///
    /// `has_ongoing_period` is tracked separately because a caller may have
    /// waived the ongoing-period requirement, in which case its absence is
    /// not a finding.
    pub fn new(findings: Vec<Finding<T>>, has_ongoing_period: bool) -> Self {
        Self {
            subject: None,
            findings,
            has_ongoing_period,
        }
    }

    /// Attach a subject label
    pub fn with_subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = Some(subject.into());
        self
    }

    /// Add a finding produced outside coverage validation
    pub fn push(&mut self, finding: Finding<T>) {
        self.findings.push(finding);
    }

    /// All findings, in detection order
    pub fn findings(&self) -> &[Finding<T>] {
        &self.findings
    }

    /// Gaps, including the trailing gap when no period is ongoing
    pub fn gaps(&self) -> Vec<Gap> {
        self.findings
            .iter()
            .filter_map(|finding| match finding {
                Finding::Gap(gap) => Some(*gap),
                Finding::NoOngoingPeriod { since } => Some(Gap { from: *since, to: None }),
                _ => None,
            })
            .collect()
    }

    /// Overlap groups
    pub fn overlaps(&self) -> Vec<&OverlapGroup<T>> {
        self.findings
            .iter()
            .filter_map(|finding| match finding {
                Finding::Overlap(group) => Some(group),
                _ => None,
            })
            .collect()
    }

    /// Whether some period starts after the current month began
    pub fn has_future_period(&self) -> bool {
        self.has(FindingKind::FuturePeriod)
    }

    /// Whether the subject had no periods
    pub fn has_no_periods(&self) -> bool {
        self.has(FindingKind::NoPeriods)
    }

    /// Whether some period is open-ended
    pub fn has_ongoing_period(&self) -> bool {
        self.has_ongoing_period
    }

    /// Whether the subject blocks calculation
    pub fn has_feil(&self) -> bool {
        !self.findings.is_empty()
    }

    /// Check for a finding of the given kind
    pub fn has(&self, kind: FindingKind) -> bool {
        self.findings.iter().any(|finding| finding.kind() == kind)
    }

    /// Rewrite period positions, e.g. after validating a filtered subset
    ///
    /// `positions[i]` is the original position of the `i`th validated period.
    pub fn remap_periods(self, positions: &[usize]) -> Self {
        let remap = |id: PeriodId| PeriodId(positions.get(id.index()).copied().unwrap_or(id.index()));
        Self {
            subject: self.subject,
            findings: self.findings.into_iter().map(|finding| finding.map_period_ids(remap)).collect(),
            has_ongoing_period: self.has_ongoing_period,
        }
    }

    /// Convert the tags carried by overlap findings
    pub fn map_tags<U>(self, f: impl Fn(T) -> U) -> SubjectValidationResult<U> {
        SubjectValidationResult {
            subject: self.subject,
            findings: self.findings.into_iter().map(|finding| finding.map_tag(&f)).collect(),
            has_ongoing_period: self.has_ongoing_period,
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SubjectReport<'a, T> {
    #[serde(skip_serializing_if = "Option::is_none")]
    subject: Option<&'a str>,
    gaps: Vec<Gap>,
    overlaps: Vec<&'a OverlapGroup<T>>,
    has_future_period: bool,
    has_no_periods: bool,
    has_ongoing_period: bool,
    has_feil: bool,
    findings: &'a [Finding<T>],
}

impl<T: Serialize> Serialize for SubjectValidationResult<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        SubjectReport {
            subject: self.subject.as_deref(),
            gaps: self.gaps(),
            overlaps: self.overlaps(),
            has_future_period: self.has_future_period(),
            has_no_periods: self.has_no_periods(),
            has_ongoing_period: self.has_ongoing_period(),
            has_feil: self.has_feil(),
            findings: &self.findings,
        }
        .serialize(serializer)
    }
}
