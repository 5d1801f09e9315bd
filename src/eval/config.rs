//! Evaluation configuration and its builder.
//!
//! A configuration can be assembled in code:
//!
//! ```rust
//! use ontoeval::eval::{BoundaryMatch, EvalConfig, MatchingStrategy};
//!
//! let config = EvalConfig::builder()
//!     .with_boundary(BoundaryMatch::Exact)
//!     .with_matching(MatchingStrategy::Optimal)
//!     .with_weight_factor_f64(0.5)
//!     .build()
//!     .unwrap();
//! assert_eq!(config.boundary, BoundaryMatch::Exact);
//! ```
//!
//! or read from TOML, where every key is optional:
//!
//! ```rust
//! use ontoeval::eval::{BoundaryMatch, EvalConfig};
//!
//! let config = EvalConfig::from_toml_str(r#"
//!     boundary = "exact"
//!     weight_factor = 0.65
//! "#).unwrap();
//! assert_eq!(config.boundary, BoundaryMatch::Exact);
//! ```

use super::assignment::MatchingStrategy;
use super::boundary::BoundaryMatch;
use crate::ontology::similarity::validate_weight_factor;
use crate::ontology::DEFAULT_WEIGHT_FACTOR;
use crate::{Error, Result};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Settings for one evaluation run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct EvalConfig {
    /// How span boundaries are scored.
    pub boundary: BoundaryMatch,
    /// How competing candidate pairs are resolved.
    pub matching: MatchingStrategy,
    /// Decay per is-a edge in the similarity engine, in `(0, 1]`.
    pub weight_factor: Decimal,
}

impl Default for EvalConfig {
    fn default() -> Self {
        Self {
            boundary: BoundaryMatch::default(),
            matching: MatchingStrategy::default(),
            weight_factor: DEFAULT_WEIGHT_FACTOR,
        }
    }
}

impl EvalConfig {
    /// Start a builder from the defaults.
    pub fn builder() -> EvalConfigBuilder {
        EvalConfigBuilder::new()
    }

    /// Check value ranges.
    pub fn validate(&self) -> Result<()> {
        validate_weight_factor(self.weight_factor)
    }

    /// Parse and validate a TOML document.
    ///
    /// Recognised keys: `boundary` (`"exact"` | `"jaccard"`), `matching`
    /// (`"greedy"` | `"optimal"`), `weight_factor` (number or decimal string).
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let raw: RawConfig =
            toml::from_str(text).map_err(|e| Error::config(format!("invalid TOML: {}", e)))?;

        let mut builder = EvalConfigBuilder::new();
        if let Some(boundary) = raw.boundary {
            builder = builder.with_boundary(boundary);
        }
        if let Some(matching) = raw.matching {
            builder = builder.with_matching(matching);
        }
        if let Some(factor) = raw.weight_factor {
            builder = builder.with_weight_factor(factor.to_decimal()?);
        }
        builder.build()
    }
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct RawConfig {
    boundary: Option<BoundaryMatch>,
    matching: Option<MatchingStrategy>,
    weight_factor: Option<RawNumber>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawNumber {
    Float(f64),
    Text(String),
}

impl RawNumber {
    fn to_decimal(&self) -> Result<Decimal> {
        match self {
            RawNumber::Float(f) => decimal_from_f64(*f),
            RawNumber::Text(s) => Decimal::from_str(s.trim())
                .map_err(|e| Error::config(format!("weight_factor '{}': {}", s, e))),
        }
    }
}

/// Convert through the shortest decimal rendering, so `0.65` stays `0.65`.
fn decimal_from_f64(value: f64) -> Result<Decimal> {
    if !value.is_finite() {
        return Err(Error::config(format!("weight_factor {} is not finite", value)));
    }
    Decimal::from_str(&value.to_string())
        .map_err(|e| Error::config(format!("weight_factor {}: {}", value, e)))
}

/// Builder for [`EvalConfig`].
#[derive(Debug, Clone)]
pub struct EvalConfigBuilder {
    boundary: BoundaryMatch,
    matching: MatchingStrategy,
    weight_factor: Decimal,
    invalid: Option<String>,
}

impl EvalConfigBuilder {
    /// Create a new builder with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the boundary mode.
    pub fn with_boundary(mut self, boundary: BoundaryMatch) -> Self {
        self.boundary = boundary;
        self
    }

    /// Set the conflict-resolution strategy.
    pub fn with_matching(mut self, matching: MatchingStrategy) -> Self {
        self.matching = matching;
        self
    }

    /// Set the weight factor.
    pub fn with_weight_factor(mut self, weight_factor: Decimal) -> Self {
        self.weight_factor = weight_factor;
        self
    }

    /// Set the weight factor from a float.
    ///
    /// Non-finite values are reported by [`build`](Self::build).
    pub fn with_weight_factor_f64(mut self, weight_factor: f64) -> Self {
        match decimal_from_f64(weight_factor) {
            Ok(d) => self.weight_factor = d,
            Err(e) => self.invalid = Some(e.to_string()),
        }
        self
    }

    /// Build and validate the configuration.
    pub fn build(self) -> Result<EvalConfig> {
        if let Some(msg) = self.invalid {
            return Err(Error::config(msg));
        }
        let config = EvalConfig {
            boundary: self.boundary,
            matching: self.matching,
            weight_factor: self.weight_factor,
        };
        config.validate()?;
        Ok(config)
    }
}

impl Default for EvalConfigBuilder {
    fn default() -> Self {
        let defaults = EvalConfig::default();
        Self {
            boundary: defaults.boundary,
            matching: defaults.matching,
            weight_factor: defaults.weight_factor,
            invalid: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EvalConfig::default();
        assert_eq!(config.boundary, BoundaryMatch::Jaccard);
        assert_eq!(config.matching, MatchingStrategy::Greedy);
        assert_eq!(config.weight_factor, Decimal::from_str("0.65").unwrap());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder_rejects_bad_factor() {
        assert!(EvalConfig::builder().with_weight_factor_f64(0.0).build().is_err());
        assert!(EvalConfig::builder().with_weight_factor_f64(1.2).build().is_err());
        assert!(EvalConfig::builder().with_weight_factor_f64(f64::NAN).build().is_err());
        assert!(EvalConfig::builder().with_weight_factor_f64(1.0).build().is_ok());
    }

    #[test]
    fn test_f64_conversion_is_shortest() {
        let config = EvalConfig::builder().with_weight_factor_f64(0.65).build().unwrap();
        assert_eq!(config.weight_factor.to_string(), "0.65");
    }

    #[test]
    fn test_from_toml_full() {
        let config = EvalConfig::from_toml_str(
            r#"
            boundary = "exact"
            matching = "optimal"
            weight_factor = "0.7"
            "#,
        )
        .unwrap();
        assert_eq!(config.boundary, BoundaryMatch::Exact);
        assert_eq!(config.matching, MatchingStrategy::Optimal);
        assert_eq!(config.weight_factor, Decimal::from_str("0.7").unwrap());
    }

    #[test]
    fn test_from_toml_empty_is_default() {
        assert_eq!(EvalConfig::from_toml_str("").unwrap(), EvalConfig::default());
    }

    #[test]
    fn test_from_toml_integer_factor() {
        let config = EvalConfig::from_toml_str("weight_factor = 1").unwrap();
        assert_eq!(config.weight_factor, Decimal::ONE);
    }

    #[test]
    fn test_from_toml_errors() {
        assert!(matches!(
            EvalConfig::from_toml_str("boundary = \"fuzzy\""),
            Err(Error::Config(_))
        ));
        assert!(matches!(
            EvalConfig::from_toml_str("colour = \"blue\""),
            Err(Error::Config(_))
        ));
        assert!(matches!(
            EvalConfig::from_toml_str("weight_factor = 2.0"),
            Err(Error::Config(_))
        ));
    }
}
