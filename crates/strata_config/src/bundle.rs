//! Raw configuration bundle as supplied by files and command-line overrides.
//!
//! Every field here is loosely typed on purpose: numbers are signed and tag
//! values are arbitrary JSON so that the validator, not the deserializer,
//! reports out-of-range or mistyped parameters with a field name attached.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Tags as declared, before type and length checks.
pub type RawTags = BTreeMap<String, serde_json::Value>;

/// Subnet placement of a subnet group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubnetType {
    Public,
    Private,
    Isolated,
}

impl SubnetType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubnetType::Public => "public",
            SubnetType::Private => "private",
            SubnetType::Isolated => "isolated",
        }
    }

    /// Name of the default subnet group of this type.
    pub fn default_group_name(&self) -> &'static str {
        match self {
            SubnetType::Public => "Public",
            SubnetType::Private => "Private",
            SubnetType::Isolated => "Isolated",
        }
    }

    /// Provider-side subnet type identifier.
    pub fn provider_name(&self) -> &'static str {
        match self {
            SubnetType::Public => "PUBLIC",
            SubnetType::Private => "PRIVATE_WITH_EGRESS",
            SubnetType::Isolated => "PRIVATE_ISOLATED",
        }
    }

    pub fn all() -> [Self; 3] {
        [SubnetType::Public, SubnetType::Private, SubnetType::Isolated]
    }
}

impl std::fmt::Display for SubnetType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Logging verbosity for API stages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LoggingVerbosity {
    #[default]
    #[serde(alias = "info")]
    Info,
    #[serde(alias = "error")]
    Error,
}

impl LoggingVerbosity {
    pub fn as_str(&self) -> &'static str {
        match self {
            LoggingVerbosity::Info => "INFO",
            LoggingVerbosity::Error => "ERROR",
        }
    }
}

impl std::fmt::Display for LoggingVerbosity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An additional subnet group declared next to the defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubnetGroupConfig {
    pub name: String,
    pub subnet_type: SubnetType,
    #[serde(default)]
    pub cidr_mask: Option<i64>,
}

impl SubnetGroupConfig {
    pub fn new(name: impl Into<String>, subnet_type: SubnetType) -> Self {
        Self {
            name: name.into(),
            subnet_type,
            cidr_mask: None,
        }
    }

    pub fn with_cidr_mask(mut self, mask: i64) -> Self {
        self.cidr_mask = Some(mask);
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct NetworkConfig {
    pub cidr: Option<String>,
    pub max_azs: Option<i64>,
    pub nat_gateways: Option<i64>,
    pub tags: RawTags,
    pub additional_subnet_groups: Vec<SubnetGroupConfig>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TransitGatewayConfig {
    /// Amazon-side ASN; falls back to the policy default when absent.
    pub asn: Option<i64>,
    pub auto_accept_shared_attachments: Option<bool>,
    pub default_route_table_association: Option<bool>,
    pub default_route_table_propagation: Option<bool>,
    pub tags: RawTags,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct StorageConfig {
    pub bucket_prefix: Option<String>,
    pub versioned: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ApiConfig {
    pub stage_name: Option<String>,
    pub data_trace_enabled: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ComputeConfig {
    pub instance_type: Option<String>,
    pub machine_image: Option<String>,
}

/// Environment policy overrides, as declared.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PolicyOverrides {
    pub retain: Option<bool>,
    pub auto_delete_on_destroy: Option<bool>,
    pub log_retention_days: Option<i64>,
    pub logging_verbosity: Option<LoggingVerbosity>,
    pub default_asn: Option<i64>,
}

/// Declared parameters for one composition run, keyed by resource kind.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ConfigBundle {
    pub env_name: String,
    /// Tags applied to every resource in the stack.
    pub tags: RawTags,
    pub network: NetworkConfig,
    pub transit_gateway: TransitGatewayConfig,
    pub storage: StorageConfig,
    pub api: ApiConfig,
    pub compute: ComputeConfig,
    pub policy: PolicyOverrides,
}

impl ConfigBundle {
    /// Create a bundle for an environment with every other parameter defaulted.
    pub fn new(env_name: impl Into<String>) -> Self {
        Self {
            env_name: env_name.into(),
            ..Self::default()
        }
    }

    pub fn with_env_name(mut self, env_name: impl Into<String>) -> Self {
        self.env_name = env_name.into();
        self
    }

    pub fn with_cidr(mut self, cidr: impl Into<String>) -> Self {
        self.network.cidr = Some(cidr.into());
        self
    }

    pub fn with_max_azs(mut self, max_azs: i64) -> Self {
        self.network.max_azs = Some(max_azs);
        self
    }

    pub fn with_nat_gateways(mut self, nat_gateways: i64) -> Self {
        self.network.nat_gateways = Some(nat_gateways);
        self
    }

    pub fn with_asn(mut self, asn: i64) -> Self {
        self.transit_gateway.asn = Some(asn);
        self
    }

    pub fn with_retention_days(mut self, days: i64) -> Self {
        self.policy.log_retention_days = Some(days);
        self
    }

    pub fn with_tag(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.tags
            .insert(key.into(), serde_json::Value::String(value.into()));
        self
    }

    pub fn with_subnet_group(mut self, group: SubnetGroupConfig) -> Self {
        self.network.additional_subnet_groups.push(group);
        self
    }

    pub fn with_policy(mut self, policy: PolicyOverrides) -> Self {
        self.policy = policy;
        self
    }
}
