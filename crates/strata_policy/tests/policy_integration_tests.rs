//! Integration tests for policy resolution from validated configuration.

use strata_config::{ConfigBundle, ConfigValidator, EnvironmentName, LoggingVerbosity};
use strata_policy::{PolicyResolver, RemovalPolicy};

/// Without overrides, only production keeps its data.
#[test]
fn test_retain_only_in_prod() {
    assert!(PolicyResolver::resolve(EnvironmentName::Prod, None).retain);
    assert!(!PolicyResolver::resolve(EnvironmentName::Dev, None).retain);
    assert!(!PolicyResolver::resolve(EnvironmentName::Staging, None).retain);
}

/// Overrides declared in a bundle flow through validation into the policy.
#[test]
fn test_overrides_from_bundle() {
    let bundle = ConfigBundle::from_yaml(
        r#"
envName: staging
policy:
  retain: true
  autoDeleteOnDestroy: false
  logRetentionDays: 90
  loggingVerbosity: ERROR
  defaultAsn: 65000
"#,
    )
    .unwrap();
    let config = ConfigValidator::validate(&bundle).unwrap();
    let policy = PolicyResolver::resolve(config.env, Some(&config.policy_overrides));

    assert_eq!(policy.env, EnvironmentName::Staging);
    assert_eq!(policy.removal_policy(), RemovalPolicy::Retain);
    assert!(!policy.auto_delete_on_destroy);
    assert_eq!(policy.log_retention_days, 90);
    assert_eq!(policy.logging_verbosity, LoggingVerbosity::Error);
    assert_eq!(policy.default_asn, 65000);
}

#[test]
fn test_policy_yaml_is_camel_case() {
    let yaml = PolicyResolver::resolve(EnvironmentName::Prod, None).to_yaml().unwrap();
    assert!(yaml.contains("autoDeleteOnDestroy: false"));
    assert!(yaml.contains("loggingVerbosity: INFO"));
    assert!(yaml.contains("env: prod"));
}
