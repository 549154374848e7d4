//! Case facts - the date-ranged inputs a case is validated on
//!
//! Facts arrive from persistence or the grunnlag/person services. They are
//! assembled here into [`CaseFacts`], either through [`CaseFactsBuilder`] or
//! by deserializing JSON in the same shape.

use crate::error::Result;
use bidrag_domain::Interval;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Household status of a child ("bostatus")
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Bostatus {
    /// Lives with the parent
    MedForelder,
    /// Adult child in documented schooling
    DokumentertSkolegang,
    /// Shared residence
    DeltBosted,
    /// Does not live with the parent
    IkkeMedForelder,
    /// Not known
    Ukjent,
}

impl Bostatus {
    /// Whether the child counts as living in the household
    pub fn counts_as_resident(&self) -> bool {
        matches!(
            self,
            Bostatus::MedForelder | Bostatus::DokumentertSkolegang | Bostatus::DeltBosted
        )
    }
}

/// Marital status of the receiving parent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Sivilstandskode {
    /// Married or cohabiting
    GiftSamboer,
    /// Lives alone with the children
    BorAleneMedBarn,
    /// Single
    Enslig,
    /// Cohabiting
    Samboer,
    /// Not known
    Ukjent,
}

/// Income classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Inntektstype {
    /// Employer-reported income
    Ainntekt,
    /// Tax assessment
    Skattegrunnlag,
    /// Capital income
    Kapitalinntekt,
    /// Child supplement to a benefit
    Barnetillegg,
    /// Cash-for-care benefit
    Kontantstotte,
    /// Infant supplement
    Smabarnstillegg,
    /// Extended child benefit
    UtvidetBarnetrygd,
}

impl Inntektstype {
    /// Whether the type is a benefit ("ytelse") rather than ordinary income
    pub fn is_ytelse(&self) -> bool {
        matches!(
            self,
            Inntektstype::Barnetillegg
                | Inntektstype::Kontantstotte
                | Inntektstype::Smabarnstillegg
                | Inntektstype::UtvidetBarnetrygd
        )
    }

    /// Get the type name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            Inntektstype::Ainntekt => "ainntekt",
            Inntektstype::Skattegrunnlag => "skattegrunnlag",
            Inntektstype::Kapitalinntekt => "kapitalinntekt",
            Inntektstype::Barnetillegg => "barnetillegg",
            Inntektstype::Kontantstotte => "kontantstotte",
            Inntektstype::Smabarnstillegg => "smabarnstillegg",
            Inntektstype::UtvidetBarnetrygd => "utvidet_barnetrygd",
        }
    }
}

/// Classification of an income period
///
/// Two income periods conflict only when both type and child match.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InntektTag {
    /// Income type
    pub inntektstype: Inntektstype,
    /// Child the income is paid for (benefits per child)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gjelder_barn: Option<String>,
}

impl InntektTag {
    /// Income not tied to a child
    pub fn new(inntektstype: Inntektstype) -> Self {
        Self {
            inntektstype,
            gjelder_barn: None,
        }
    }

    /// Income paid for a specific child
    pub fn for_barn(inntektstype: Inntektstype, barn: impl Into<String>) -> Self {
        Self {
            inntektstype,
            gjelder_barn: Some(barn.into()),
        }
    }
}

/// Whether other adults live in the paying parent's household
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VoksenStatus {
    /// Other adults live in the household
    BorMedAndreVoksne,
    /// No other adults
    BorIkkeMedAndreVoksne,
    /// Not known
    Ukjent,
}

/// A person's role in the case
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Rolle {
    /// Receiving parent
    Bidragsmottaker,
    /// Paying parent
    Bidragspliktig,
    /// Child
    Barn,
}

impl Rolle {
    /// Get the role name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            Rolle::Bidragsmottaker => "BM",
            Rolle::Bidragspliktig => "BP",
            Rolle::Barn => "BA",
        }
    }
}

/// A person taking part in the case
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Person {
    /// National identity number
    pub ident: String,
    /// Role in the case
    pub rolle: Rolle,
    /// Date of death, if deceased
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dodsdato: Option<NaiveDate>,
}

impl Person {
    /// Create a living person
    pub fn new(ident: impl Into<String>, rolle: Rolle) -> Self {
        Self {
            ident: ident.into(),
            rolle,
            dodsdato: None,
        }
    }

    /// Mark the person as deceased
    pub fn deceased(mut self, dodsdato: NaiveDate) -> Self {
        self.dodsdato = Some(dodsdato);
        self
    }

    /// Whether the person is deceased
    pub fn is_deceased(&self) -> bool {
        self.dodsdato.is_some()
    }
}

impl fmt::Display for Person {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.rolle.as_str(), self.ident)
    }
}

/// Tag carried by overlap findings in a case report
///
/// Serializes as the wrapped status, so a report reads the same as the
/// facts it was built from.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(untagged)]
pub enum FactTag {
    /// Household status
    Bostatus(Bostatus),
    /// Marital status
    Sivilstand(Sivilstandskode),
    /// Income classification
    Inntekt(InntektTag),
    /// Other adults status
    AndreVoksne(VoksenStatus),
}

/// One person's periods for a category
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubjectFacts<T> {
    /// Whose facts these are
    pub person: Person,
    /// The periods, in any order
    pub periods: Vec<Interval<T>>,
}

impl<T> SubjectFacts<T> {
    /// Build from raw `(from, to, tag)` rows
    ///
    /// # Errors
    /// Fails on the first row whose `to` is before its `from`.
    pub fn from_rows<I>(person: Person, rows: I) -> Result<Self>
    where
        I: IntoIterator<Item = (NaiveDate, Option<NaiveDate>, T)>,
    {
        let periods = rows
            .into_iter()
            .map(|(from, to, tag)| Interval::new(from, to, tag))
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(Self { person, periods })
    }
}

/// Everything a case is validated on
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaseFacts {
    /// Effective date from which facts must be complete
    pub virkningstidspunkt: NaiveDate,

    /// Receiving parent
    #[serde(default)]
    pub bidragsmottaker: Option<Person>,

    /// Paying parent
    #[serde(default)]
    pub bidragspliktig: Option<Person>,

    /// Household status per child
    #[serde(default)]
    pub boforhold: Vec<SubjectFacts<Bostatus>>,

    /// Marital status of the receiving parent
    #[serde(default)]
    pub sivilstand: Vec<Interval<Sivilstandskode>>,

    /// Income per person
    #[serde(default)]
    pub inntekter: Vec<SubjectFacts<InntektTag>>,

    /// Other adults in the paying parent's household
    #[serde(default)]
    pub andre_voksne_i_husstanden: Vec<Interval<VoksenStatus>>,
}

impl CaseFacts {
    /// Start building facts for a case
    pub fn builder(virkningstidspunkt: NaiveDate) -> CaseFactsBuilder {
        CaseFactsBuilder {
            facts: CaseFacts {
                virkningstidspunkt,
                bidragsmottaker: None,
                bidragspliktig: None,
                boforhold: Vec::new(),
                sivilstand: Vec::new(),
                inntekter: Vec::new(),
                andre_voksne_i_husstanden: Vec::new(),
            },
        }
    }

    /// Parse facts from JSON
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Builder for [`CaseFacts`]
#[derive(Debug, Clone)]
pub struct CaseFactsBuilder {
    facts: CaseFacts,
}

impl CaseFactsBuilder {
    /// Set the receiving parent
    pub fn bidragsmottaker(mut self, person: Person) -> Self {
        self.facts.bidragsmottaker = Some(person);
        self
    }

    /// Set the paying parent
    pub fn bidragspliktig(mut self, person: Person) -> Self {
        self.facts.bidragspliktig = Some(person);
        self
    }

    /// Add a child with its household periods
    pub fn barn(mut self, child: Person, periods: Vec<Interval<Bostatus>>) -> Self {
        self.facts.boforhold.push(SubjectFacts {
            person: child,
            periods,
        });
        self
    }

    /// Set the receiving parent's marital status periods
    pub fn sivilstand(mut self, periods: Vec<Interval<Sivilstandskode>>) -> Self {
        self.facts.sivilstand = periods;
        self
    }

    /// Add a person's income periods
    pub fn inntekter(mut self, person: Person, periods: Vec<Interval<InntektTag>>) -> Self {
        self.facts.inntekter.push(SubjectFacts { person, periods });
        self
    }

    /// Set the other-adults periods of the paying parent's household
    pub fn andre_voksne_i_husstanden(mut self, periods: Vec<Interval<VoksenStatus>>) -> Self {
        self.facts.andre_voksne_i_husstanden = periods;
        self
    }

    /// Finish building
    pub fn build(self) -> CaseFacts {
        self.facts
    }
}
