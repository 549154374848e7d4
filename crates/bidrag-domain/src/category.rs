//! Category module - the kinds of facts a case must have complete timelines for

use serde::{Deserialize, Serialize};

/// Fact category validated before a calculation may run
///
/// Each category is checked per subject:
/// - Boforhold: one timeline per child
/// - Sivilstand: the receiving parent's marital status
/// - Inntekt: one timeline per person and income class
/// - AndreVoksneIHusstanden: other adults in the paying parent's household
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Category {
    /// Household status of each child
    Boforhold,

    /// Marital status of the receiving parent
    Sivilstand,

    /// Income records
    Inntekt,

    /// Other adults in the household
    AndreVoksneIHusstanden,
}

impl Category {
    /// All categories in report order
    pub const ALL: [Category; 4] = [
        Category::Boforhold,
        Category::Sivilstand,
        Category::Inntekt,
        Category::AndreVoksneIHusstanden,
    ];

    /// Get the category name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Boforhold => "boforhold",
            Category::Sivilstand => "sivilstand",
            Category::Inntekt => "inntekt",
            Category::AndreVoksneIHusstanden => "andreVoksneIHusstanden",
        }
    }

    /// Parse a category from a string (case-insensitive)
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "boforhold" => Some(Category::Boforhold),
            "sivilstand" => Some(Category::Sivilstand),
            "inntekt" => Some(Category::Inntekt),
            "andrevoksneihusstanden" | "andre_voksne_i_husstanden" => {
                Some(Category::AndreVoksneIHusstanden)
            }
            _ => None,
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("Invalid category: {}", s))
    }
}
