//! Case validation logic

use crate::config::{CategoryPolicy, ValidationConfig};
use crate::facts::{
    Bostatus, CaseFacts, FactTag, InntektTag, Inntektstype, Person, Rolle, Sivilstandskode,
    SubjectFacts, VoksenStatus,
};
use crate::metrics::ValidationMetrics;
use bidrag_domain::{
    aggregate, validate_with, AggregateValidationReport, AnyTag, Category, Clock, Finding,
    Interval, PeriodId, SameTag, SubjectValidationResult,
};
use chrono::NaiveDate;
use rayon::prelude::*;
use std::collections::BTreeMap;

/// The CaseValidator decides whether a case's facts are complete enough
/// for a calculation to run
#[derive(Debug, Clone)]
pub struct CaseValidator {
    config: ValidationConfig,
    metrics: ValidationMetrics,
}

impl CaseValidator {
    /// Create a new CaseValidator with the given configuration
    pub fn new(config: ValidationConfig) -> Self {
        Self {
            config,
            metrics: ValidationMetrics::new(),
        }
    }

    /// Create a CaseValidator with default configuration
    pub fn default_config() -> Self {
        Self::new(ValidationConfig::default())
    }

    /// The active configuration
    pub fn config(&self) -> &ValidationConfig {
        &self.config
    }

    /// Metrics accumulated over every validated case
    pub fn metrics(&self) -> &ValidationMetrics {
        &self.metrics
    }

    /// Clear accumulated metrics
    pub fn reset_metrics(&mut self) {
        self.metrics.reset();
    }

    /// Validate every enabled category of a case
    ///
    /// # Arguments
    ///
    /// * `facts` - The case's date-ranged facts
    /// * `clock` - Source of "today" for the future-period check
    ///
    /// # Returns
    ///
    /// One report over all enabled categories; `har_feil` blocks calculation
    pub fn validate(
        &mut self,
        facts: &CaseFacts,
        clock: &impl Clock,
    ) -> AggregateValidationReport<FactTag> {
        let now = clock.today();
        let mut results = BTreeMap::new();

        for category in self.config.enabled_categories() {
            let category_results = match category {
                Category::Boforhold => self.validate_boforhold(facts, now),
                Category::Sivilstand => self.validate_sivilstand(facts, now),
                Category::Inntekt => self.validate_inntekt(facts, now),
                Category::AndreVoksneIHusstanden => self.validate_andre_voksne(facts, now),
            };

            for result in &category_results {
                tracing::debug!(
                    "{} {}: {} findings",
                    category,
                    result.subject.as_deref().unwrap_or("<unnamed>"),
                    result.findings().len()
                );
            }
            results.insert(category, category_results);
        }

        let report = aggregate(results);
        self.metrics.record_report(&report);

        let failing = report.failing_subjects().len();
        if report.har_feil() {
            tracing::warn!(
                "Case with virkningstidspunkt {} is not ready for calculation: {} subjects with findings",
                facts.virkningstidspunkt,
                failing
            );
        } else {
            tracing::info!(
                "Case with virkningstidspunkt {} passed validation",
                facts.virkningstidspunkt
            );
        }

        report
    }

    /// Whether the case may proceed to calculation
    pub fn is_ready_for_calculation(&mut self, facts: &CaseFacts, clock: &impl Clock) -> bool {
        !self.validate(facts, clock).har_feil()
    }

    /// One subject per child
    fn validate_boforhold(
        &self,
        facts: &CaseFacts,
        now: NaiveDate,
    ) -> Vec<SubjectValidationResult<FactTag>> {
        let policy = self.config.boforhold;
        self.per_subject(&facts.boforhold, |child: &SubjectFacts<Bostatus>| {
            let mut rules = policy.rules();
            // A deceased child has no current household
            if child.person.is_deceased() {
                rules.require_ongoing_period = false;
            }

            let mut result = validate_with(
                &child.periods,
                facts.virkningstidspunkt,
                now,
                &rules,
                &AnyTag,
            );
            if policy.flag_unknown_status {
                flag_unknown(&mut result, &child.periods, |status| *status == Bostatus::Ukjent);
            }
            result
                .with_subject(child.person.ident.clone())
                .map_tags(FactTag::Bostatus)
        })
    }

    /// The receiving parent's marital status
    fn validate_sivilstand(
        &self,
        facts: &CaseFacts,
        now: NaiveDate,
    ) -> Vec<SubjectValidationResult<FactTag>> {
        let Some(subject) = subject_label(
            &facts.bidragsmottaker,
            &facts.sivilstand,
            Rolle::Bidragsmottaker,
        ) else {
            return Vec::new();
        };

        let result = validate_single(
            &self.config.sivilstand,
            &facts.sivilstand,
            facts.virkningstidspunkt,
            now,
            |status| *status == Sivilstandskode::Ukjent,
        );
        vec![result.with_subject(subject).map_tags(FactTag::Sivilstand)]
    }

    /// Other adults in the paying parent's household
    fn validate_andre_voksne(
        &self,
        facts: &CaseFacts,
        now: NaiveDate,
    ) -> Vec<SubjectValidationResult<FactTag>> {
        let Some(subject) = subject_label(
            &facts.bidragspliktig,
            &facts.andre_voksne_i_husstanden,
            Rolle::Bidragspliktig,
        ) else {
            return Vec::new();
        };

        let result = validate_single(
            &self.config.andre_voksne_i_husstanden,
            &facts.andre_voksne_i_husstanden,
            facts.virkningstidspunkt,
            now,
            |status| *status == VoksenStatus::Ukjent,
        );
        vec![result.with_subject(subject).map_tags(FactTag::AndreVoksne)]
    }

    /// One subject per person and income class
    ///
    /// Ordinary income forms one class per person. Each benefit type, per
    /// child it is paid for, forms its own class and is only checked from
    /// its first period onwards.
    fn validate_inntekt(
        &self,
        facts: &CaseFacts,
        now: NaiveDate,
    ) -> Vec<SubjectValidationResult<FactTag>> {
        let policy = self.config.inntekt;
        let without_income = parents_without_income(facts);
        let classes: Vec<IncomeClass<'_>> = facts
            .inntekter
            .iter()
            .chain(&without_income)
            .flat_map(income_classes)
            .collect();

        self.per_subject(&classes, |class: &IncomeClass<'_>| {
            let periods: Vec<Interval<InntektTag>> = class
                .positions
                .iter()
                .map(|&idx| class.subject.periods[idx].clone())
                .collect();

            let mut rules = policy.rules();
            let mut reference_start = facts.virkningstidspunkt;
            match &class.ytelse {
                Some(_) => {
                    rules.require_ongoing_period = false;
                    if let Some(first) = periods.iter().map(|period| period.from()).min() {
                        reference_start = reference_start.max(first);
                    }
                }
                None if class.subject.person.rolle == Rolle::Barn => {
                    rules.require_ongoing_period = false;
                }
                None => {}
            }

            validate_with(&periods, reference_start, now, &rules, &SameTag)
                .remap_periods(&class.positions)
                .with_subject(class.label())
                .map_tags(FactTag::Inntekt)
        })
    }

    /// Run `validate` over subjects, on the rayon pool when configured
    ///
    /// Results keep the order of `subjects`.
    fn per_subject<S, F>(&self, subjects: &[S], validate: F) -> Vec<SubjectValidationResult<FactTag>>
    where
        S: Sync,
        F: Fn(&S) -> SubjectValidationResult<FactTag> + Sync + Send,
    {
        if self.config.parallel {
            subjects.par_iter().map(validate).collect()
        } else {
            subjects.iter().map(validate).collect()
        }
    }
}

/// A subset of one person's income periods validated together
struct IncomeClass<'a> {
    subject: &'a SubjectFacts<InntektTag>,
    ytelse: Option<(Inntektstype, Option<&'a str>)>,
    positions: Vec<usize>,
}

impl IncomeClass<'_> {
    fn label(&self) -> String {
        match self.ytelse {
            None => self.subject.person.ident.clone(),
            Some((inntektstype, None)) => {
                format!("{}/{}", self.subject.person.ident, inntektstype.as_str())
            }
            Some((inntektstype, Some(barn))) => {
                format!("{}/{}/{}", self.subject.person.ident, inntektstype.as_str(), barn)
            }
        }
    }
}

/// Split a person's income into classes, ordinary income first
///
/// Ordinary income is always a class for the parents, so a parent without
/// income is reported as having no periods.
fn income_classes(subject: &SubjectFacts<InntektTag>) -> Vec<IncomeClass<'_>> {
    let mut ordinary = Vec::new();
    let mut ytelser: BTreeMap<(Inntektstype, Option<&str>), Vec<usize>> = BTreeMap::new();

    for (idx, period) in subject.periods.iter().enumerate() {
        let tag = period.tag();
        if tag.inntektstype.is_ytelse() {
            ytelser
                .entry((tag.inntektstype, tag.gjelder_barn.as_deref()))
                .or_default()
                .push(idx);
        } else {
            ordinary.push(idx);
        }
    }

    let mut classes = Vec::new();
    if !ordinary.is_empty() || subject.person.rolle != Rolle::Barn {
        classes.push(IncomeClass {
            subject,
            ytelse: None,
            positions: ordinary,
        });
    }
    classes.extend(ytelser.into_iter().map(|(key, positions)| IncomeClass {
        subject,
        ytelse: Some(key),
        positions,
    }));
    classes
}

/// Empty income entries for parents missing from `inntekter`
///
/// They still get an ordinary income class, reported as having no periods.
fn parents_without_income(facts: &CaseFacts) -> Vec<SubjectFacts<InntektTag>> {
    [&facts.bidragsmottaker, &facts.bidragspliktig]
        .into_iter()
        .flatten()
        .filter(|parent| {
            !facts
                .inntekter
                .iter()
                .any(|subject| subject.person.ident == parent.ident)
        })
        .map(|parent| SubjectFacts {
            person: parent.clone(),
            periods: Vec::new(),
        })
        .collect()
}

/// Validate a category holding a single subject
fn validate_single<T>(
    policy: &CategoryPolicy,
    periods: &[Interval<T>],
    reference_start: NaiveDate,
    now: NaiveDate,
    is_unknown: impl Fn(&T) -> bool,
) -> SubjectValidationResult<T>
where
    T: Clone + PartialEq,
{
    let mut result = validate_with(periods, reference_start, now, &policy.rules(), &AnyTag);
    if policy.flag_unknown_status {
        flag_unknown(&mut result, periods, is_unknown);
    }
    result
}

/// Add an invalid-status finding for every period with an unknown status
fn flag_unknown<T>(
    result: &mut SubjectValidationResult<T>,
    periods: &[Interval<T>],
    is_unknown: impl Fn(&T) -> bool,
) {
    for (idx, period) in periods.iter().enumerate() {
        if is_unknown(period.tag()) {
            result.push(Finding::InvalidStatus {
                period: PeriodId(idx),
                range: period.range(),
            });
        }
    }
}

/// Label for a single-subject category, `None` when there is nothing to check
fn subject_label<T>(person: &Option<Person>, periods: &[Interval<T>], rolle: Rolle) -> Option<String> {
    match person {
        Some(person) => Some(person.ident.clone()),
        None if !periods.is_empty() => Some(rolle.as_str().to_string()),
        None => None,
    }
}
