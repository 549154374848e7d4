//! Bidrag Gatekeeper
//!
//! Decides whether a child-support case has complete enough facts to be
//! calculated.
//!
//! The Gatekeeper provides:
//! - Per-category validation (boforhold, sivilstand, inntekt, andre voksne)
//! - Configurable checks per category, loadable from TOML
//! - A household timeline of resident children
//! - Metrics over validated cases
//!
//! # Examples
//!
//! ```
//! use bidrag_domain::{FixedClock, Interval};
//! use bidrag_gatekeeper::{Bostatus, CaseFacts, CaseValidator, Person, Rolle, ValidationConfig};
//! use chrono::NaiveDate;
//!
//! let virk = NaiveDate::from_ymd_opt(2023, 1, 1).unwrap();
//! let facts = CaseFacts::builder(virk)
//!     .barn(
//!         Person::new("barn-1", Rolle::Barn),
//!         vec![Interval::ongoing(virk, Bostatus::MedForelder)],
//!     )
//!     .build();
//!
//! let mut validator = CaseValidator::new(ValidationConfig::default());
//! let clock = FixedClock(NaiveDate::from_ymd_opt(2024, 1, 15).unwrap());
//! let report = validator.validate(&facts, &clock);
//! assert!(!report.har_feil());
//! ```

#![warn(missing_docs)]

mod config;
mod error;
mod facts;
pub mod household;
mod metrics;
mod validator;

pub use config::{CategoryPolicy, ValidationConfig};
pub use error::{GatekeeperError, Result};
pub use facts::{
    Bostatus, CaseFacts, CaseFactsBuilder, FactTag, InntektTag, Inntektstype, Person, Rolle,
    Sivilstandskode, SubjectFacts, VoksenStatus,
};
pub use metrics::ValidationMetrics;
pub use validator::CaseValidator;
