//! Gatekeeper configuration
//!
//! Each fact category gets its own [`CategoryPolicy`]. Policies can be
//! loaded from TOML:
//!
//! ```toml
//! parallel = true
//!
//! [boforhold]
//! require_ongoing_period = true
//! flag_unknown_status = true
//!
//! [inntekt]
//! flag_periods_before_reference_start = true
//! ```

use crate::error::{GatekeeperError, Result};
use bidrag_domain::{Category, CoverageRules};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Which checks apply to one fact category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CategoryPolicy {
    /// Validate this category at all
    pub enabled: bool,

    /// Require an open-ended period (no trailing gap)
    pub require_ongoing_period: bool,

    /// Flag periods starting after the first day of the current month
    pub flag_future_periods: bool,

    /// Flag periods that end before virkningstidspunkt
    pub flag_periods_before_reference_start: bool,

    /// Flag periods whose status is unknown
    pub flag_unknown_status: bool,
}

impl Default for CategoryPolicy {
    fn default() -> Self {
        Self {
            enabled: true,
            require_ongoing_period: true,
            flag_future_periods: true,
            flag_periods_before_reference_start: false,
            flag_unknown_status: true,
        }
    }
}

impl CategoryPolicy {
    /// Coverage rules for the domain validator
    pub fn rules(&self) -> CoverageRules {
        CoverageRules {
            require_ongoing_period: self.require_ongoing_period,
            flag_future_periods: self.flag_future_periods,
            flag_periods_before_reference_start: self.flag_periods_before_reference_start,
        }
    }

    fn permissive() -> Self {
        Self {
            enabled: true,
            require_ongoing_period: false,
            flag_future_periods: false,
            flag_periods_before_reference_start: false,
            flag_unknown_status: false,
        }
    }

    fn strict() -> Self {
        Self {
            enabled: true,
            require_ongoing_period: true,
            flag_future_periods: true,
            flag_periods_before_reference_start: true,
            flag_unknown_status: true,
        }
    }
}

/// Configuration for case validation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationConfig {
    /// Validate subjects of a category on the rayon thread pool
    pub parallel: bool,

    /// Household status per child
    pub boforhold: CategoryPolicy,

    /// Marital status of the receiving parent
    pub sivilstand: CategoryPolicy,

    /// Income records per person
    pub inntekt: CategoryPolicy,

    /// Other adults in the paying parent's household
    pub andre_voksne_i_husstanden: CategoryPolicy,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            boforhold: CategoryPolicy::default(),
            sivilstand: CategoryPolicy::default(),
            inntekt: CategoryPolicy {
                flag_periods_before_reference_start: true,
                ..CategoryPolicy::default()
            },
            andre_voksne_i_husstanden: CategoryPolicy::default(),
            parallel: false,
        }
    }
}

impl ValidationConfig {
    /// Create a permissive configuration (gaps and overlaps only)
    pub fn permissive() -> Self {
        Self {
            boforhold: CategoryPolicy::permissive(),
            sivilstand: CategoryPolicy::permissive(),
            inntekt: CategoryPolicy::permissive(),
            andre_voksne_i_husstanden: CategoryPolicy::permissive(),
            parallel: false,
        }
    }

    /// Create a strict configuration (all checks enabled)
    pub fn strict() -> Self {
        Self {
            boforhold: CategoryPolicy::strict(),
            sivilstand: CategoryPolicy::strict(),
            inntekt: CategoryPolicy::strict(),
            andre_voksne_i_husstanden: CategoryPolicy::strict(),
            parallel: false,
        }
    }

    /// Policy for a category
    pub fn policy(&self, category: Category) -> &CategoryPolicy {
        match category {
            Category::Boforhold => &self.boforhold,
            Category::Sivilstand => &self.sivilstand,
            Category::Inntekt => &self.inntekt,
            Category::AndreVoksneIHusstanden => &self.andre_voksne_i_husstanden,
        }
    }

    /// Categories with validation enabled, in report order
    pub fn enabled_categories(&self) -> Vec<Category> {
        Category::ALL
            .into_iter()
            .filter(|category| self.policy(*category).enabled)
            .collect()
    }

    /// Parse configuration from a TOML string
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let config: ValidationConfig = toml::from_str(contents)?;
        config.check()?;
        Ok(config)
    }

    /// Load configuration from a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    /// Serialize configuration to TOML
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self)
            .map_err(|e| GatekeeperError::Config(format!("Failed to serialize config: {}", e)))
    }

    fn check(&self) -> Result<()> {
        if self.enabled_categories().is_empty() {
            return Err(GatekeeperError::Config(
                "At least one category must be enabled".to_string(),
            ));
        }
        Ok(())
    }
}
