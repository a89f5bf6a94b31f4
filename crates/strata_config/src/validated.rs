//! Typed configuration produced by a successful validation.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::bundle::{LoggingVerbosity, SubnetType};
use crate::env::EnvironmentName;

/// Default VPC address range.
pub const DEFAULT_CIDR: &str = "10.0.0.0/16";
pub const DEFAULT_MAX_AZS: u32 = 2;
pub const DEFAULT_NAT_GATEWAYS: u32 = 1;
pub const DEFAULT_BUCKET_PREFIX: &str = "strata";

/// Longest bucket name the storage provider accepts.
pub const MAX_BUCKET_NAME_LEN: usize = 63;
/// Longest prefix that still leaves room for `-<env>-bucket` in every environment.
pub const MAX_BUCKET_PREFIX_LEN: usize = MAX_BUCKET_NAME_LEN - "-staging-bucket".len();
pub const DEFAULT_INSTANCE_TYPE: &str = "t3.micro";
pub const DEFAULT_MACHINE_IMAGE: &str = "amazon-linux-2023";

pub const MAX_TAG_KEY_LEN: usize = 128;
pub const MAX_TAG_VALUE_LEN: usize = 256;

/// Retention windows the log service accepts, in days.
pub const LOG_RETENTION_DAYS: &[u32] = &[
    1, 3, 5, 7, 14, 30, 60, 90, 120, 150, 180, 365, 400, 545, 731, 1096, 1827, 2192, 2557, 2922,
    3288, 3653,
];

/// Validated tags, ordered by key.
pub type Tags = BTreeMap<String, String>;

/// A subnet group with its base name (environment prefix is applied by the network node).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubnetGroup {
    pub name: String,
    pub subnet_type: SubnetType,
    pub cidr_mask: Option<u8>,
}

impl SubnetGroup {
    /// The three groups every network gets.
    pub fn defaults() -> Vec<Self> {
        SubnetType::all()
            .into_iter()
            .map(|subnet_type| Self {
                name: subnet_type.default_group_name().to_string(),
                subnet_type,
                cidr_mask: None,
            })
            .collect()
    }

    pub fn qualified_name(&self, env: EnvironmentName) -> String {
        format!("{}-{}", env, self.name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkSettings {
    pub cidr: String,
    pub max_azs: u32,
    pub nat_gateways: u32,
    pub tags: Tags,
    /// Defaults first, then additional groups in declaration order.
    pub subnet_groups: Vec<SubnetGroup>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransitGatewaySettings {
    /// Explicit ASN. `None` means the policy default applies.
    pub asn: Option<u32>,
    pub auto_accept_shared_attachments: bool,
    pub default_route_table_association: bool,
    pub default_route_table_propagation: bool,
    pub tags: Tags,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StorageSettings {
    pub bucket_prefix: String,
    pub versioned: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiSettings {
    pub stage_name: String,
    pub data_trace_enabled: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComputeSettings {
    pub instance_type: String,
    pub machine_image: String,
}

/// Typed policy overrides. Every present field wins over the environment table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartialPolicyBundle {
    pub retain: Option<bool>,
    pub auto_delete_on_destroy: Option<bool>,
    pub log_retention_days: Option<u32>,
    pub logging_verbosity: Option<LoggingVerbosity>,
    pub default_asn: Option<u32>,
}

impl PartialPolicyBundle {
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

/// Configuration that passed every check, with defaults filled in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidatedConfig {
    pub env: EnvironmentName,
    pub tags: Tags,
    pub network: NetworkSettings,
    pub transit_gateway: TransitGatewaySettings,
    pub storage: StorageSettings,
    pub api: ApiSettings,
    pub compute: ComputeSettings,
    pub policy_overrides: PartialPolicyBundle,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_subnet_groups() {
        let groups = SubnetGroup::defaults();
        let names: Vec<_> = groups.iter().map(|g| g.name.as_str()).collect();
        assert_eq!(names, vec!["Public", "Private", "Isolated"]);
        assert_eq!(groups[1].qualified_name(EnvironmentName::Staging), "staging-Private");
    }

    #[test]
    fn test_partial_policy_is_empty() {
        assert!(PartialPolicyBundle::default().is_empty());
        let overrides = PartialPolicyBundle {
            retain: Some(true),
            ..Default::default()
        };
        assert!(!overrides.is_empty());
    }
}
