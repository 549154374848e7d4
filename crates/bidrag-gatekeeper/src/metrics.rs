//! Metrics collection for case validation

use bidrag_domain::{AggregateValidationReport, Category, FindingKind};
use std::collections::BTreeMap;

/// Metrics collected across validated cases
///
/// Tracks findings per category and kind, and how many reports blocked
/// calculation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationMetrics {
    /// Findings per category and kind
    pub findings: BTreeMap<(Category, FindingKind), usize>,

    /// Subjects validated per category
    pub subjects_validated: BTreeMap<Category, usize>,

    /// Subjects with at least one finding, per category
    pub failing_subjects: BTreeMap<Category, usize>,

    /// Reports produced
    pub reports: usize,

    /// Reports with `har_feil` set
    pub blocked_reports: usize,
}

impl ValidationMetrics {
    /// Create new empty metrics
    pub fn new() -> Self {
        Self::default()
    }

    /// Record everything in a finished report
    pub fn record_report<T>(&mut self, report: &AggregateValidationReport<T>) {
        self.reports += 1;
        if report.har_feil() {
            self.blocked_reports += 1;
        }

        for (category, result) in report.iter() {
            *self.subjects_validated.entry(category).or_insert(0) += 1;
            if result.has_feil() {
                *self.failing_subjects.entry(category).or_insert(0) += 1;
            }
            for finding in result.findings() {
                *self.findings.entry((category, finding.kind())).or_insert(0) += 1;
            }
        }
    }

    /// Findings of one kind across all categories
    pub fn count(&self, kind: FindingKind) -> usize {
        self.findings
            .iter()
            .filter(|((_, k), _)| *k == kind)
            .map(|(_, count)| count)
            .sum()
    }

    /// Total findings across all categories
    pub fn total_findings(&self) -> usize {
        self.findings.values().sum()
    }

    /// Total subjects validated
    pub fn total_subjects(&self) -> usize {
        self.subjects_validated.values().sum()
    }

    /// Total failing subjects
    pub fn total_failing_subjects(&self) -> usize {
        self.failing_subjects.values().sum()
    }

    /// Reset all metrics
    pub fn reset(&mut self) {
        self.findings.clear();
        self.subjects_validated.clear();
        self.failing_subjects.clear();
        self.reports = 0;
        self.blocked_reports = 0;
    }

    /// Generate a summary report of metrics
    pub fn summary(&self) -> String {
        let mut lines = vec![
            "Validation Metrics Summary".to_string(),
            "==========================".to_string(),
            format!("Reports: {} ({} blocked)", self.reports, self.blocked_reports),
            format!(
                "Subjects: {} ({} failing)",
                self.total_subjects(),
                self.total_failing_subjects()
            ),
        ];

        if !self.findings.is_empty() {
            lines.push(String::new());
            lines.push("Findings by category:".to_string());
            for ((category, kind), count) in &self.findings {
                lines.push(format!("  {} {}: {}", category, kind, count));
            }
            lines.push(format!("  Total: {}", self.total_findings()));
        }

        lines.join("\n")
    }
}
