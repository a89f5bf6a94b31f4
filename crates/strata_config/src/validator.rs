//! Fail-fast validation of configuration bundles.
//!
//! Checks run in a fixed order and stop at the first failure:
//!
//! 1. environment name (presence, then membership)
//! 2. numeric ranges (AZ count, NAT gateway count, ASNs, log retention)
//! 3. CIDR grammar
//! 4. tag keys and values
//! 5. other string parameters
//! 6. subnet group names and masks
//!
//! The input bundle is only borrowed; validation has no side effects.

use std::collections::HashSet;
use std::sync::OnceLock;

use regex::Regex;
use tracing::debug;

use crate::bundle::{ConfigBundle, RawTags, SubnetGroupConfig};
use crate::env::EnvironmentName;
use crate::error::{ValidationError, ValidationResult};
use crate::validated::{
    ApiSettings, ComputeSettings, NetworkSettings, PartialPolicyBundle, StorageSettings,
    SubnetGroup, Tags, TransitGatewaySettings, ValidatedConfig, DEFAULT_BUCKET_PREFIX, DEFAULT_CIDR,
    DEFAULT_INSTANCE_TYPE, DEFAULT_MACHINE_IMAGE, DEFAULT_MAX_AZS, DEFAULT_NAT_GATEWAYS,
    LOG_RETENTION_DAYS, MAX_BUCKET_PREFIX_LEN, MAX_TAG_KEY_LEN, MAX_TAG_VALUE_LEN,
};

const CIDR_GRAMMAR: &str = r"^([0-9]{1,3})\.([0-9]{1,3})\.([0-9]{1,3})\.([0-9]{1,3})/([0-9]{1,2})$";

const SUBNET_MASK_RANGE: std::ops::RangeInclusive<i64> = 16..=28;

fn cidr_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(CIDR_GRAMMAR).expect("CIDR grammar is a valid regex"))
}

/// Validator for configuration bundles.
pub struct ConfigValidator;

impl ConfigValidator {
    /// Validate a bundle and produce its typed, defaulted form.
    pub fn validate(bundle: &ConfigBundle) -> ValidationResult<ValidatedConfig> {
        debug!("Validating configuration bundle for '{}'", bundle.env_name);

        let env = EnvironmentName::parse(&bundle.env_name)?;

        let max_azs = Self::check_count("network.maxAzs", bundle.network.max_azs, 1)?
            .unwrap_or(DEFAULT_MAX_AZS);
        let nat_gateways = Self::check_count("network.natGateways", bundle.network.nat_gateways, 0)?
            .unwrap_or(DEFAULT_NAT_GATEWAYS);
        let asn = Self::check_count("transitGateway.asn", bundle.transit_gateway.asn, 0)?;
        let default_asn = Self::check_count("policy.defaultAsn", bundle.policy.default_asn, 0)?;
        let log_retention_days =
            Self::check_retention("policy.logRetentionDays", bundle.policy.log_retention_days)?;

        let cidr = match &bundle.network.cidr {
            Some(cidr) => Self::check_cidr("network.cidr", cidr)?,
            None => DEFAULT_CIDR.to_string(),
        };

        let tags = Self::check_tags("tags", &bundle.tags)?;
        let network_tags = Self::check_tags("network.tags", &bundle.network.tags)?;
        let tgw_tags = Self::check_tags("transitGateway.tags", &bundle.transit_gateway.tags)?;

        let bucket_prefix = Self::check_bucket_prefix(bundle.storage.bucket_prefix.as_deref())?;
        let stage_name = Self::check_optional_string(
            "api.stageName",
            bundle.api.stage_name.as_deref(),
            env.as_str(),
        )?;
        let instance_type = Self::check_optional_string(
            "compute.instanceType",
            bundle.compute.instance_type.as_deref(),
            DEFAULT_INSTANCE_TYPE,
        )?;
        let machine_image = Self::check_optional_string(
            "compute.machineImage",
            bundle.compute.machine_image.as_deref(),
            DEFAULT_MACHINE_IMAGE,
        )?;

        let subnet_groups = Self::check_subnet_groups(&bundle.network.additional_subnet_groups)?;

        Ok(ValidatedConfig {
            env,
            tags,
            network: NetworkSettings {
                cidr,
                max_azs,
                nat_gateways,
                tags: network_tags,
                subnet_groups,
            },
            transit_gateway: TransitGatewaySettings {
                asn,
                auto_accept_shared_attachments: bundle
                    .transit_gateway
                    .auto_accept_shared_attachments
                    .unwrap_or(true),
                default_route_table_association: bundle
                    .transit_gateway
                    .default_route_table_association
                    .unwrap_or(true),
                default_route_table_propagation: bundle
                    .transit_gateway
                    .default_route_table_propagation
                    .unwrap_or(true),
                tags: tgw_tags,
            },
            storage: StorageSettings {
                bucket_prefix,
                versioned: bundle.storage.versioned.unwrap_or(true),
            },
            api: ApiSettings {
                stage_name,
                data_trace_enabled: bundle.api.data_trace_enabled.unwrap_or(true),
            },
            compute: ComputeSettings {
                instance_type,
                machine_image,
            },
            policy_overrides: PartialPolicyBundle {
                retain: bundle.policy.retain,
                auto_delete_on_destroy: bundle.policy.auto_delete_on_destroy,
                log_retention_days,
                logging_verbosity: bundle.policy.logging_verbosity,
                default_asn,
            },
        })
    }

    /// Check a non-negative count with a lower bound that fits in `u32`.
    fn check_count(field: &str, value: Option<i64>, min: i64) -> ValidationResult<Option<u32>> {
        let Some(value) = value else {
            return Ok(None);
        };

        if value < min {
            let expectation = if min == 0 {
                "a non-negative integer".to_string()
            } else if min == 1 {
                "a positive integer".to_string()
            } else {
                format!("an integer >= {}", min)
            };
            return Err(ValidationError::new(
                field,
                format!("must be {} (got {})", expectation, value),
            ));
        }

        u32::try_from(value).map(Some).map_err(|_| {
            ValidationError::new(field, format!("must not exceed {} (got {})", u32::MAX, value))
        })
    }

    fn check_retention(field: &str, value: Option<i64>) -> ValidationResult<Option<u32>> {
        let Some(days) = Self::check_count(field, value, 1)? else {
            return Ok(None);
        };

        if !LOG_RETENTION_DAYS.contains(&days) {
            let allowed: Vec<_> = LOG_RETENTION_DAYS.iter().map(|d| d.to_string()).collect();
            return Err(ValidationError::new(
                field,
                format!("{} is not a supported retention window (expected one of: {})", days, allowed.join(", ")),
            ));
        }

        Ok(Some(days))
    }

    /// Check the `ddd.ddd.ddd.ddd/dd` grammar plus octet and prefix ranges.
    fn check_cidr(field: &str, raw: &str) -> ValidationResult<String> {
        let cidr = raw.trim();
        let captures = cidr_pattern().captures(cidr).ok_or_else(|| {
            ValidationError::new(
                field,
                format!("must be an IPv4 CIDR block such as \"10.0.0.0/16\" (got \"{}\")", cidr),
            )
        })?;

        for index in 1..=4 {
            let octet: u16 = captures[index].parse().unwrap_or(u16::MAX);
            if octet > 255 {
                return Err(ValidationError::new(
                    field,
                    format!("octet {} is out of range 0-255 in \"{}\"", &captures[index], cidr),
                ));
            }
        }

        let prefix: u8 = captures[5].parse().unwrap_or(u8::MAX);
        if prefix > 32 {
            return Err(ValidationError::new(
                field,
                format!("prefix length /{} is out of range 0-32 in \"{}\"", &captures[5], cidr),
            ));
        }

        Ok(cidr.to_string())
    }

    fn check_tags(field: &str, tags: &RawTags) -> ValidationResult<Tags> {
        let mut checked = Tags::new();

        for (key, value) in tags {
            if key.trim().is_empty() {
                return Err(ValidationError::new(field, "tag keys must be non-empty"));
            }
            if key.chars().count() > MAX_TAG_KEY_LEN {
                return Err(ValidationError::new(
                    format!("{}.{}", field, key),
                    format!("tag key exceeds {} characters", MAX_TAG_KEY_LEN),
                ));
            }

            let Some(text) = value.as_str() else {
                return Err(ValidationError::new(
                    format!("{}.{}", field, key),
                    format!("tag value must be a string (got {})", json_type_name(value)),
                ));
            };
            if text.chars().count() > MAX_TAG_VALUE_LEN {
                return Err(ValidationError::new(
                    format!("{}.{}", field, key),
                    format!("tag value exceeds {} characters", MAX_TAG_VALUE_LEN),
                ));
            }

            checked.insert(key.clone(), text.to_string());
        }

        Ok(checked)
    }

    fn check_optional_string(
        field: &str,
        value: Option<&str>,
        default: &str,
    ) -> ValidationResult<String> {
        match value {
            Some(v) if v.trim().is_empty() => {
                Err(ValidationError::new(field, "must be non-empty when provided"))
            }
            Some(v) => Ok(v.trim().to_string()),
            None => Ok(default.to_string()),
        }
    }

    fn check_bucket_prefix(value: Option<&str>) -> ValidationResult<String> {
        let field = "storage.bucketPrefix";
        let prefix = Self::check_optional_string(field, value, DEFAULT_BUCKET_PREFIX)?;
        let len = prefix.to_lowercase().chars().count();
        if len > MAX_BUCKET_PREFIX_LEN {
            return Err(ValidationError::new(
                field,
                format!("must be at most {} characters (got {})", MAX_BUCKET_PREFIX_LEN, len),
            ));
        }
        Ok(prefix)
    }

    /// Build the full subnet group list and reject duplicate names.
    fn check_subnet_groups(additional: &[SubnetGroupConfig]) -> ValidationResult<Vec<SubnetGroup>> {
        let mut groups = SubnetGroup::defaults();

        for (index, group) in additional.iter().enumerate() {
            let field = format!("network.additionalSubnetGroups[{}]", index);
            let name = group.name.trim();
            if name.is_empty() {
                return Err(ValidationError::new(format!("{}.name", field), "must be non-empty"));
            }

            let cidr_mask = match group.cidr_mask {
                Some(mask) if !SUBNET_MASK_RANGE.contains(&mask) => {
                    return Err(ValidationError::new(
                        format!("{}.cidrMask", field),
                        format!(
                            "must be between {} and {} (got {})",
                            SUBNET_MASK_RANGE.start(),
                            SUBNET_MASK_RANGE.end(),
                            mask
                        ),
                    ));
                }
                Some(mask) => u8::try_from(mask).ok(),
                None => None,
            };

            groups.push(SubnetGroup {
                name: name.to_string(),
                subnet_type: group.subnet_type,
                cidr_mask,
            });
        }

        let unique: HashSet<&str> = groups.iter().map(|g| g.name.as_str()).collect();
        if unique.len() != groups.len() {
            let mut seen = HashSet::new();
            let duplicate = groups
                .iter()
                .map(|g| g.name.as_str())
                .find(|name| !seen.insert(*name))
                .unwrap_or_default();
            return Err(ValidationError::new(
                "network.additionalSubnetGroups",
                format!("duplicate subnet group name '{}'", duplicate),
            ));
        }

        Ok(groups)
    }
}

fn json_type_name(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "boolean",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bundle::{LoggingVerbosity, SubnetType};

    #[test]
    fn test_defaults_applied() {
        let config = ConfigValidator::validate(&ConfigBundle::new("dev")).unwrap();
        assert_eq!(config.env, EnvironmentName::Dev);
        assert_eq!(config.network.cidr, DEFAULT_CIDR);
        assert_eq!(config.network.max_azs, 2);
        assert_eq!(config.network.nat_gateways, 1);
        assert_eq!(config.network.subnet_groups.len(), 3);
        assert_eq!(config.transit_gateway.asn, None);
        assert!(config.transit_gateway.auto_accept_shared_attachments);
        assert_eq!(config.api.stage_name, "dev");
        assert!(config.policy_overrides.is_empty());
    }

    #[test]
    fn test_rejects_unknown_environment() {
        let err = ConfigValidator::validate(&ConfigBundle::new("qa")).unwrap_err();
        assert_eq!(err.field, "envName");
    }

    #[test]
    fn test_rejects_negative_nat_gateways() {
        let bundle = ConfigBundle::new("dev").with_nat_gateways(-1);
        let err = ConfigValidator::validate(&bundle).unwrap_err();
        assert_eq!(err.field, "network.natGateways");
        assert!(err.to_string().contains("natGateways"));
        assert!(err.reason.contains("non-negative"));
    }

    #[test]
    fn test_rejects_zero_azs() {
        let err = ConfigValidator::validate(&ConfigBundle::new("dev").with_max_azs(0)).unwrap_err();
        assert_eq!(err.field, "network.maxAzs");
        assert!(err.reason.contains("positive"));
    }

    #[test]
    fn test_rejects_negative_asn() {
        let err = ConfigValidator::validate(&ConfigBundle::new("dev").with_asn(-5)).unwrap_err();
        assert_eq!(err.field, "transitGateway.asn");
    }

    #[test]
    fn test_rejects_oversized_asn() {
        let err = ConfigValidator::validate(&ConfigBundle::new("dev").with_asn(1 << 33)).unwrap_err();
        assert_eq!(err.field, "transitGateway.asn");
        assert!(err.reason.contains("exceed"));
    }

    #[test]
    fn test_rejects_unsupported_retention() {
        let err = ConfigValidator::validate(&ConfigBundle::new("dev").with_retention_days(8)).unwrap_err();
        assert_eq!(err.field, "policy.logRetentionDays");

        let ok = ConfigValidator::validate(&ConfigBundle::new("dev").with_retention_days(14)).unwrap();
        assert_eq!(ok.policy_overrides.log_retention_days, Some(14));
    }

    #[test]
    fn test_cidr_grammar() {
        for good in ["10.0.0.0/16", "192.168.1.0/24", "0.0.0.0/0", " 172.16.0.0/12 "] {
            assert!(ConfigValidator::validate(&ConfigBundle::new("dev").with_cidr(good)).is_ok(), "{}", good);
        }
        for bad in ["999.0.0.0/16", "10.0.0.0/33", "10.0.0/16", "10.0.0.0", "abc", "10.0.0.0/016"] {
            let err = ConfigValidator::validate(&ConfigBundle::new("dev").with_cidr(bad)).unwrap_err();
            assert_eq!(err.field, "network.cidr", "{}", bad);
        }
    }

    #[test]
    fn test_numeric_checks_run_before_cidr() {
        let bundle = ConfigBundle::new("dev").with_cidr("bogus").with_nat_gateways(-1);
        let err = ConfigValidator::validate(&bundle).unwrap_err();
        assert_eq!(err.field, "network.natGateways");
    }

    #[test]
    fn test_tag_limits() {
        let long_key = "k".repeat(129);
        let err = ConfigValidator::validate(&ConfigBundle::new("dev").with_tag(long_key, "v")).unwrap_err();
        assert!(err.reason.contains("128"));

        let long_value = "v".repeat(257);
        let err = ConfigValidator::validate(&ConfigBundle::new("dev").with_tag("Owner", long_value)).unwrap_err();
        assert_eq!(err.field, "tags.Owner");
        assert!(err.reason.contains("256"));

        let at_limit = ConfigBundle::new("dev").with_tag("k".repeat(128), "v".repeat(256));
        assert!(ConfigValidator::validate(&at_limit).is_ok());
    }

    #[test]
    fn test_tag_values_must_be_strings() {
        let mut bundle = ConfigBundle::new("dev");
        bundle.network.tags.insert("CostCenter".into(), serde_json::json!(42));
        let err = ConfigValidator::validate(&bundle).unwrap_err();
        assert_eq!(err.field, "network.tags.CostCenter");
        assert!(err.reason.contains("number"));
    }

    #[test]
    fn test_blank_tag_key_rejected() {
        let err = ConfigValidator::validate(&ConfigBundle::new("dev").with_tag("  ", "x")).unwrap_err();
        assert_eq!(err.field, "tags");
    }

    #[test]
    fn test_blank_optional_string_rejected() {
        let mut bundle = ConfigBundle::new("dev");
        bundle.compute.instance_type = Some("   ".into());
        let err = ConfigValidator::validate(&bundle).unwrap_err();
        assert_eq!(err.field, "compute.instanceType");
    }

    #[test]
    fn test_bucket_prefix_length_limit() {
        let mut bundle = ConfigBundle::new("staging");
        bundle.storage.bucket_prefix = Some("a".repeat(MAX_BUCKET_PREFIX_LEN));
        let config = ConfigValidator::validate(&bundle).unwrap();
        assert_eq!(config.storage.bucket_prefix.len(), MAX_BUCKET_PREFIX_LEN);

        bundle.storage.bucket_prefix = Some("a".repeat(MAX_BUCKET_PREFIX_LEN + 1));
        let err = ConfigValidator::validate(&bundle).unwrap_err();
        assert_eq!(err.field, "storage.bucketPrefix");
        assert!(err.reason.contains("at most 48"));
    }

    #[test]
    fn test_cidr_rejects_non_ascii_digits() {
        let err = ConfigValidator::validate(&ConfigBundle::new("dev").with_cidr("١٠.0.0.0/16"))
            .unwrap_err();
        assert_eq!(err.field, "network.cidr");
        assert!(err.reason.contains("IPv4 CIDR block"), "{}", err.reason);
    }

    #[test]
    fn test_duplicate_default_subnet_group_rejected() {
        let bundle = ConfigBundle::new("dev")
            .with_subnet_group(SubnetGroupConfig::new("Public", SubnetType::Public));
        let err = ConfigValidator::validate(&bundle).unwrap_err();
        assert!(err.reason.contains("duplicate subnet group name 'Public'"));
    }

    #[test]
    fn test_duplicate_additional_subnet_groups_rejected() {
        let bundle = ConfigBundle::new("dev")
            .with_subnet_group(SubnetGroupConfig::new("Data", SubnetType::Isolated))
            .with_subnet_group(SubnetGroupConfig::new(" Data ", SubnetType::Private));
        let err = ConfigValidator::validate(&bundle).unwrap_err();
        assert!(err.reason.contains("'Data'"));
    }

    #[test]
    fn test_subnet_mask_range() {
        let bundle = ConfigBundle::new("dev")
            .with_subnet_group(SubnetGroupConfig::new("Data", SubnetType::Isolated).with_cidr_mask(30));
        let err = ConfigValidator::validate(&bundle).unwrap_err();
        assert_eq!(err.field, "network.additionalSubnetGroups[0].cidrMask");

        let bundle = ConfigBundle::new("dev")
            .with_subnet_group(SubnetGroupConfig::new("Data", SubnetType::Isolated).with_cidr_mask(24));
        let config = ConfigValidator::validate(&bundle).unwrap();
        assert_eq!(config.network.subnet_groups[3].cidr_mask, Some(24));
    }

    #[test]
    fn test_policy_overrides_carried() {
        let mut bundle = ConfigBundle::new("prod");
        bundle.policy.retain = Some(false);
        bundle.policy.logging_verbosity = Some(LoggingVerbosity::Error);
        bundle.policy.default_asn = Some(64600);
        let config = ConfigValidator::validate(&bundle).unwrap();
        assert_eq!(config.policy_overrides.retain, Some(false));
        assert_eq!(config.policy_overrides.logging_verbosity, Some(LoggingVerbosity::Error));
        assert_eq!(config.policy_overrides.default_asn, Some(64600));
    }

    #[test]
    fn test_validation_does_not_mutate_input() {
        let bundle = ConfigBundle::new(" dev ").with_cidr(" 10.0.0.0/16 ");
        let before = bundle.clone();
        let first = ConfigValidator::validate(&bundle).unwrap();
        let second = ConfigValidator::validate(&bundle).unwrap();
        assert_eq!(bundle, before);
        assert_eq!(first, second);
    }
}
