//! Resolved policy bundle.

use serde::{Deserialize, Serialize};

use strata_config::{EnvironmentName, LoggingVerbosity, Tags};

/// What happens to a resource's data when the stack is destroyed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RemovalPolicy {
    Retain,
    Destroy,
}

impl RemovalPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            RemovalPolicy::Retain => "RETAIN",
            RemovalPolicy::Destroy => "DESTROY",
        }
    }
}

impl std::fmt::Display for RemovalPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Environment-dependent behavioral defaults, computed once per run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PolicyBundle {
    pub env: EnvironmentName,
    pub retain: bool,
    pub auto_delete_on_destroy: bool,
    pub log_retention_days: u32,
    pub logging_verbosity: LoggingVerbosity,
    pub default_asn: u32,
    /// Tags every resource must carry.
    pub default_tags: Tags,
}

impl PolicyBundle {
    pub fn removal_policy(&self) -> RemovalPolicy {
        if self.retain {
            RemovalPolicy::Retain
        } else {
            RemovalPolicy::Destroy
        }
    }

    /// Serialize the bundle to YAML.
    pub fn to_yaml(&self) -> Result<String, serde_yaml::Error> {
        serde_yaml::to_string(self)
    }
}
