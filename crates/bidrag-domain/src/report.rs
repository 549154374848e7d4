//! Aggregate validation report
//!
//! Composes per-subject results across categories into one report with a
//! single gate. No category rules live here: what goes into each category
//! is decided by whoever ran the coverage validator.

use crate::category::Category;
use crate::finding::SubjectValidationResult;
use serde::Serialize;
use std::collections::BTreeMap;

/// Validation results for a whole case
///
/// Serializes as `{ "boforhold": [...], ..., "harFeil": bool }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregateValidationReport<T> {
    #[serde(flatten)]
    results: BTreeMap<Category, Vec<SubjectValidationResult<T>>>,
    har_feil: bool,
}

/// Compose category results into a report
///
/// `har_feil` is the logical OR of every contained result's `has_feil()`.
/// This cannot fail.
pub fn aggregate<T>(
    results: BTreeMap<Category, Vec<SubjectValidationResult<T>>>,
) -> AggregateValidationReport<T> {
    let har_feil = results.values().flatten().any(|result| result.has_feil());
    AggregateValidationReport { results, har_feil }
}

impl<T> Default for AggregateValidationReport<T> {
    fn default() -> Self {
        aggregate(BTreeMap::new())
    }
}

impl<T> AggregateValidationReport<T> {
    /// Whether any subject in any category has findings
    pub fn har_feil(&self) -> bool {
        self.har_feil
    }

    /// Results for one category (empty if the category was not validated)
    pub fn results(&self, category: Category) -> &[SubjectValidationResult<T>] {
        self.results.get(&category).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Categories that were validated
    pub fn categories(&self) -> impl Iterator<Item = Category> + '_ {
        self.results.keys().copied()
    }

    /// Every result, tagged with its category
    pub fn iter(&self) -> impl Iterator<Item = (Category, &SubjectValidationResult<T>)> {
        self.results
            .iter()
            .flat_map(|(category, results)| results.iter().map(move |result| (*category, result)))
    }

    /// Results that block calculation
    pub fn failing_subjects(&self) -> Vec<(Category, &SubjectValidationResult<T>)> {
        self.iter().filter(|(_, result)| result.has_feil()).collect()
    }

    /// Whether no results were aggregated
    pub fn is_empty(&self) -> bool {
        self.results.values().all(Vec::is_empty)
    }

    /// Consume the report, returning the category map
    pub fn into_results(self) -> BTreeMap<Category, Vec<SubjectValidationResult<T>>> {
        self.results
    }

    /// Generate a human-readable summary
    pub fn summary(&self) -> String {
        let mut lines = vec![
            "Validation Report".to_string(),
            "=================".to_string(),
            format!("Har feil: {}", self.har_feil),
        ];

        for (category, results) in &self.results {
            let failing = results.iter().filter(|result| result.has_feil()).count();
            lines.push(String::new());
            lines.push(format!("{}: {} subjects, {} with findings", category, results.len(), failing));

            for result in results.iter().filter(|result| result.has_feil()) {
                let subject = result.subject.as_deref().unwrap_or("<unnamed>");
                let kinds: Vec<&str> = result.findings().iter().map(|f| f.kind().as_str()).collect();
                lines.push(format!("  {}: {}", subject, kinds.join(", ")));
            }
        }

        lines.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::finding::Finding;
    use chrono::NaiveDate;

    fn clean(subject: &str) -> SubjectValidationResult<()> {
        SubjectValidationResult::new(vec![], true).with_subject(subject)
    }

    fn failing(subject: &str) -> SubjectValidationResult<()> {
        SubjectValidationResult::new(
            vec![Finding::NoOngoingPeriod {
                since: NaiveDate::from_ymd_opt(2023, 7, 1).unwrap(),
            }],
            false,
        )
        .with_subject(subject)
    }

    #[test]
    fn test_empty_report_has_no_feil() {
        let report = aggregate::<()>(BTreeMap::new());
        assert!(!report.har_feil());
        assert!(report.is_empty());
        assert!(report.results(Category::Inntekt).is_empty());
    }

    #[test]
    fn test_har_feil_is_or_over_results() {
        let mut results = BTreeMap::new();
        results.insert(Category::Boforhold, vec![clean("barn-1"), clean("barn-2")]);
        results.insert(Category::Sivilstand, vec![clean("bm")]);

        assert!(!aggregate(results.clone()).har_feil());

        results.insert(Category::Inntekt, vec![clean("bp"), failing("bm")]);
        let report = aggregate(results);

        assert!(report.har_feil());
        let failing = report.failing_subjects();
        assert_eq!(failing.len(), 1);
        assert_eq!(failing[0].0, Category::Inntekt);
        assert_eq!(failing[0].1.subject.as_deref(), Some("bm"));
    }

    #[test]
    fn test_empty_category_is_not_feil() {
        let mut results = BTreeMap::new();
        results.insert(Category::AndreVoksneIHusstanden, Vec::<SubjectValidationResult<()>>::new());

        let report = aggregate(results);

        assert!(!report.har_feil());
        assert_eq!(report.categories().collect::<Vec<_>>(), vec![Category::AndreVoksneIHusstanden]);
    }

    #[test]
    fn test_summary() {
        let mut results = BTreeMap::new();
        results.insert(Category::Boforhold, vec![clean("barn-1"), failing("barn-2")]);

        let summary = aggregate(results).summary();

        assert!(summary.contains("Har feil: true"));
        assert!(summary.contains("boforhold: 2 subjects, 1 with findings"));
        assert!(summary.contains("barn-2: no_ongoing_period"));
    }

    #[test]
    fn test_serialized_shape() {
        let mut results = BTreeMap::new();
        results.insert(Category::Sivilstand, vec![failing("bm")]);

        let json = serde_json::to_value(aggregate(results)).unwrap();

        assert_eq!(json["harFeil"], true);
        assert_eq!(json["sivilstand"][0]["hasOngoingPeriod"], false);
        assert_eq!(json["sivilstand"][0]["subject"], "bm");
    }
}
