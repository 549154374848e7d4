//! Integration tests for bidrag-gatekeeper
//!
//! These tests validate whole cases loaded from JSON and TOML the way a
//! calculation service would before running a calculation.

use bidrag_domain::{Category, FindingKind, FixedClock, Interval};
use bidrag_gatekeeper::household::children_in_household;
use bidrag_gatekeeper::{
    Bostatus, CaseFacts, CaseValidator, GatekeeperError, InntektTag, Inntektstype, Person, Rolle,
    Sivilstandskode, ValidationConfig, VoksenStatus,
};
use chrono::NaiveDate;
use std::io::Write;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn clock() -> FixedClock {
    FixedClock(date(2024, 1, 15))
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("bidrag_gatekeeper=debug")
        .with_test_writer()
        .try_init();
}

const CASE_JSON: &str = r#"{
    "virkningstidspunkt": "2023-01-01",
    "bidragsmottaker": { "ident": "12345678901", "rolle": "BIDRAGSMOTTAKER" },
    "bidragspliktig": { "ident": "10987654321", "rolle": "BIDRAGSPLIKTIG" },
    "boforhold": [
        {
            "person": { "ident": "barn-1", "rolle": "BARN" },
            "periods": [
                { "from": "2023-01-01", "to": "2023-06-30", "tag": "MED_FORELDER" },
                { "from": "2023-07-01", "tag": "DOKUMENTERT_SKOLEGANG" }
            ]
        },
        {
            "person": { "ident": "barn-2", "rolle": "BARN" },
            "periods": [
                { "from": "2023-03-01", "tag": "MED_FORELDER" }
            ]
        }
    ],
    "sivilstand": [
        { "from": "2022-01-01", "tag": "BOR_ALENE_MED_BARN" }
    ],
    "inntekter": [
        {
            "person": { "ident": "12345678901", "rolle": "BIDRAGSMOTTAKER" },
            "periods": [
                { "from": "2023-01-01", "tag": { "inntektstype": "AINNTEKT" } },
                {
                    "from": "2023-01-01",
                    "to": "2023-12-31",
                    "tag": { "inntektstype": "SMABARNSTILLEGG", "gjelderBarn": "barn-2" }
                }
            ]
        },
        {
            "person": { "ident": "10987654321", "rolle": "BIDRAGSPLIKTIG" },
            "periods": [
                { "from": "2022-01-01", "tag": { "inntektstype": "SKATTEGRUNNLAG" } }
            ]
        }
    ],
    "andreVoksneIHusstanden": [
        { "from": "2023-01-01", "tag": "BOR_IKKE_MED_ANDRE_VOKSNE" }
    ]
}"#;

#[test]
fn test_case_from_json_with_leading_gap() {
    init_tracing();
    let facts = CaseFacts::from_json(CASE_JSON).unwrap();
    let mut validator = CaseValidator::default_config();

    let report = validator.validate(&facts, &clock());

    assert!(report.har_feil());
    let failing = report.failing_subjects();
    assert_eq!(failing.len(), 1);
    assert_eq!(failing[0].0, Category::Boforhold);
    assert_eq!(failing[0].1.subject.as_deref(), Some("barn-2"));
    assert_eq!(failing[0].1.gaps()[0].from, date(2023, 1, 1));
    assert_eq!(failing[0].1.gaps()[0].to, Some(date(2023, 2, 28)));
}

#[test]
fn test_fixed_case_is_ready() {
    init_tracing();
    let mut facts = CaseFacts::from_json(CASE_JSON).unwrap();
    facts.boforhold[1].periods = vec![Interval::ongoing(date(2023, 1, 1), Bostatus::IkkeMedForelder)];

    let mut validator = CaseValidator::default_config();

    assert!(validator.is_ready_for_calculation(&facts, &clock()));
}

#[test]
fn test_report_serializes_tags_as_statuses() {
    let mut facts = CaseFacts::from_json(CASE_JSON).unwrap();
    facts.sivilstand.push(Interval::ongoing(date(2023, 6, 1), Sivilstandskode::Samboer));

    let mut validator = CaseValidator::default_config();
    let report = validator.validate(&facts, &clock());
    let json = serde_json::to_value(&report).unwrap();

    let overlap = &json["sivilstand"][0]["overlaps"][0];
    assert_eq!(overlap["sharedTags"][0], "BOR_ALENE_MED_BARN");
    assert_eq!(overlap["sharedTags"][1], "SAMBOER");
    assert_eq!(json["harFeil"], true);
}

#[test]
fn test_income_report_subjects() {
    let facts = CaseFacts::from_json(CASE_JSON).unwrap();
    let mut validator = CaseValidator::default_config();

    let report = validator.validate(&facts, &clock());
    let subjects: Vec<_> = report
        .results(Category::Inntekt)
        .iter()
        .map(|result| result.subject.clone().unwrap_or_default())
        .collect();

    assert_eq!(
        subjects,
        vec![
            "12345678901".to_string(),
            "12345678901/smabarnstillegg/barn-2".to_string(),
            "10987654321".to_string(),
        ]
    );
}

#[test]
fn test_parallel_validation_matches_sequential() {
    let mut builder = CaseFacts::builder(date(2023, 1, 1))
        .bidragsmottaker(Person::new("bm", Rolle::Bidragsmottaker))
        .sivilstand(vec![Interval::ongoing(date(2023, 1, 1), Sivilstandskode::Enslig)]);
    for n in 0..40 {
        let start = date(2023, 1, 1 + (n % 28));
        builder = builder
            .barn(
                Person::new(format!("barn-{}", n), Rolle::Barn),
                vec![Interval::ongoing(start, Bostatus::MedForelder)],
            )
            .inntekter(
                Person::new(format!("barn-{}", n), Rolle::Barn),
                vec![Interval::new(
                    start,
                    Some(date(2023, 12, 31)),
                    InntektTag::new(Inntektstype::Kapitalinntekt),
                )
                .unwrap()],
            );
    }
    let facts = builder
        .inntekter(
            Person::new("bm", Rolle::Bidragsmottaker),
            vec![Interval::ongoing(date(2023, 1, 1), InntektTag::new(Inntektstype::Ainntekt))],
        )
        .build();

    let mut sequential = CaseValidator::default_config();
    let mut parallel = CaseValidator::new(ValidationConfig {
        parallel: true,
        ..ValidationConfig::default()
    });

    let expected = sequential.validate(&facts, &clock());
    let actual = parallel.validate(&facts, &clock());

    assert_eq!(expected, actual);
    assert_eq!(expected.results(Category::Boforhold).len(), 40);
    // Every child starting after the first has a leading gap
    assert_eq!(
        expected
            .results(Category::Boforhold)
            .iter()
            .filter(|result| result.has(FindingKind::Gap))
            .count(),
        38
    );
}

#[test]
fn test_config_from_file_changes_outcome() {
    let facts = CaseFacts::builder(date(2023, 1, 1))
        .bidragspliktig(Person::new("bp", Rolle::Bidragspliktig))
        .andre_voksne_i_husstanden(vec![Interval::new(
            date(2023, 1, 1),
            Some(date(2023, 9, 30)),
            VoksenStatus::BorMedAndreVoksne,
        )
        .unwrap()])
        .build();

    let mut strict = CaseValidator::default_config();
    assert!(!strict.is_ready_for_calculation(&facts, &clock()));

    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        file,
        "[andre_voksne_i_husstanden]\nrequire_ongoing_period = false\n\n[inntekt]\nenabled = false"
    )
    .unwrap();
    let config = ValidationConfig::load(file.path()).unwrap();

    let mut relaxed = CaseValidator::new(config);
    assert!(relaxed.is_ready_for_calculation(&facts, &clock()));
}

#[test]
fn test_invalid_case_json() {
    let result = CaseFacts::from_json(r#"{ "virkningstidspunkt": "not a date" }"#);
    assert!(matches!(result, Err(GatekeeperError::JsonParse(_))));
}

#[test]
fn test_household_timeline_from_json() {
    let facts = CaseFacts::from_json(CASE_JSON).unwrap();

    let timeline = children_in_household(&facts);

    assert_eq!(timeline.len(), 2);
    assert_eq!(timeline[0].value, 1);
    assert_eq!(timeline[0].to, Some(date(2023, 2, 28)));
    assert_eq!(timeline[1].from, date(2023, 3, 1));
    assert_eq!(timeline[1].value, 2);
    assert!(timeline[1].to.is_none());
}

#[test]
fn test_metrics_over_several_cases() {
    let facts = CaseFacts::from_json(CASE_JSON).unwrap();
    let mut validator = CaseValidator::default_config();

    for _ in 0..3 {
        validator.validate(&facts, &clock());
    }

    let metrics = validator.metrics();
    assert_eq!(metrics.reports, 3);
    assert_eq!(metrics.blocked_reports, 3);
    assert_eq!(metrics.subjects_validated[&Category::Boforhold], 6);
    assert_eq!(metrics.count(FindingKind::Gap), 3);
    assert!(metrics.summary().contains("boforhold gap: 3"));
}

#[test]
fn test_case_without_any_income_is_blocked() {
    let virk = date(2023, 1, 1);
    let facts = CaseFacts::builder(virk)
        .bidragsmottaker(Person::new("bm", Rolle::Bidragsmottaker))
        .bidragspliktig(Person::new("bp", Rolle::Bidragspliktig))
        .barn(
            Person::new("barn-1", Rolle::Barn),
            vec![Interval::ongoing(virk, Bostatus::MedForelder)],
        )
        .sivilstand(vec![Interval::ongoing(virk, Sivilstandskode::Enslig)])
        .andre_voksne_i_husstanden(vec![Interval::ongoing(
            virk,
            VoksenStatus::BorIkkeMedAndreVoksne,
        )])
        .build();

    let mut validator = CaseValidator::default_config();
    let report = validator.validate(&facts, &clock());

    assert!(report.har_feil());
    let failing = report.failing_subjects();
    assert_eq!(failing.len(), 2);
    assert!(failing
        .iter()
        .all(|(category, result)| *category == Category::Inntekt && result.has_no_periods()));
}
