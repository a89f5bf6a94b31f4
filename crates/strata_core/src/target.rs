//! Deployment target preconditions.

use serde::{Deserialize, Serialize};

use crate::error::TargetError;

pub const ACCOUNT_ENV: &str = "STRATA_ACCOUNT";
pub const REGION_ENV: &str = "STRATA_REGION";

/// The account and region a deployment goes to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentTarget {
    pub account: String,
    pub region: String,
}

impl DeploymentTarget {
    /// Both values must be present and non-blank.
    pub fn new(account: Option<String>, region: Option<String>) -> Result<Self, TargetError> {
        let account = present(account).ok_or(TargetError {
            field: "account",
            variable: ACCOUNT_ENV,
        })?;
        let region = present(region).ok_or(TargetError {
            field: "region",
            variable: REGION_ENV,
        })?;
        Ok(Self { account, region })
    }

    /// Read the target from `STRATA_ACCOUNT` and `STRATA_REGION`.
    pub fn from_env() -> Result<Self, TargetError> {
        Self::new(std::env::var(ACCOUNT_ENV).ok(), std::env::var(REGION_ENV).ok())
    }
}

fn present(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl std::fmt::Display for DeploymentTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.account, self.region)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_complete_target() {
        let target =
            DeploymentTarget::new(Some("123456789012".into()), Some(" eu-west-1 ".into())).unwrap();
        assert_eq!(target.region, "eu-west-1");
        assert_eq!(target.to_string(), "123456789012/eu-west-1");
    }

    #[test]
    fn test_missing_account_reported_first() {
        let err = DeploymentTarget::new(None, None).unwrap_err();
        assert_eq!(err.variable, ACCOUNT_ENV);
    }

    #[test]
    fn test_blank_region_is_missing() {
        let err = DeploymentTarget::new(Some("1".into()), Some("  ".into())).unwrap_err();
        assert_eq!(err.field, "region");
    }
}
