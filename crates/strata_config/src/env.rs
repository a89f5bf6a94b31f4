//! Deployment environment names.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{ValidationError, ValidationResult};

/// One of the fixed deployment targets. Drives every policy default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnvironmentName {
    Dev,
    Staging,
    Prod,
}

impl EnvironmentName {
    pub fn as_str(&self) -> &'static str {
        match self {
            EnvironmentName::Dev => "dev",
            EnvironmentName::Staging => "staging",
            EnvironmentName::Prod => "prod",
        }
    }

    pub fn all() -> [Self; 3] {
        [EnvironmentName::Dev, EnvironmentName::Staging, EnvironmentName::Prod]
    }

    pub fn is_production(&self) -> bool {
        matches!(self, EnvironmentName::Prod)
    }

    /// Parse a raw `envName` value.
    ///
    /// Blank input is reported as missing; anything else outside the allowed
    /// set is reported with the list of accepted names.
    pub fn parse(raw: &str) -> ValidationResult<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::new(
                "envName",
                "is required and must be a non-empty string",
            ));
        }

        Self::all()
            .into_iter()
            .find(|env| env.as_str() == trimmed)
            .ok_or_else(|| {
                let allowed: Vec<_> = Self::all().iter().map(|e| e.as_str()).collect();
                ValidationError::new(
                    "envName",
                    format!("'{}' is not allowed (expected one of: {})", trimmed, allowed.join(", ")),
                )
            })
    }
}

impl FromStr for EnvironmentName {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for EnvironmentName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_known_names() {
        assert_eq!(EnvironmentName::parse("dev").unwrap(), EnvironmentName::Dev);
        assert_eq!(EnvironmentName::parse(" staging ").unwrap(), EnvironmentName::Staging);
        assert_eq!("prod".parse::<EnvironmentName>().unwrap(), EnvironmentName::Prod);
    }

    #[test]
    fn test_parse_rejects_unknown_and_blank() {
        let err = EnvironmentName::parse("qa").unwrap_err();
        assert_eq!(err.field, "envName");
        assert!(err.reason.contains("dev, staging, prod"));

        let err = EnvironmentName::parse("   ").unwrap_err();
        assert!(err.reason.contains("required"));

        // Membership is case-sensitive.
        assert!(EnvironmentName::parse("Prod").is_err());
    }

    #[test]
    fn test_only_prod_is_production() {
        assert!(EnvironmentName::Prod.is_production());
        assert!(!EnvironmentName::Dev.is_production());
        assert!(!EnvironmentName::Staging.is_production());
    }
}
