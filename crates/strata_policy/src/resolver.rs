//! Environment policy table and override resolution.
//!
//! Retention and removal behavior used to be decided at each resource site;
//! every resource now reads one resolved [`PolicyBundle`] instead.

use tracing::debug;

use strata_config::{EnvironmentName, LoggingVerbosity, PartialPolicyBundle, Tags};

use crate::bundle::PolicyBundle;

pub const DEFAULT_LOG_RETENTION_DAYS: u32 = 7;
pub const DEFAULT_ASN: u32 = 64512;
pub const ENVIRONMENT_TAG: &str = "Environment";

/// Maps environment names to policy bundles.
pub struct PolicyResolver;

impl PolicyResolver {
    /// Table defaults for an environment, without overrides.
    pub fn defaults(env: EnvironmentName) -> PolicyBundle {
        let production = env.is_production();

        let mut default_tags = Tags::new();
        default_tags.insert(ENVIRONMENT_TAG.to_string(), env.to_string());

        PolicyBundle {
            env,
            retain: production,
            auto_delete_on_destroy: !production,
            log_retention_days: DEFAULT_LOG_RETENTION_DAYS,
            logging_verbosity: LoggingVerbosity::Info,
            default_asn: DEFAULT_ASN,
            default_tags,
        }
    }

    /// Resolve the policy for an environment. Every present override wins.
    pub fn resolve(env: EnvironmentName, overrides: Option<&PartialPolicyBundle>) -> PolicyBundle {
        let mut policy = Self::defaults(env);

        if let Some(overrides) = overrides {
            Self::apply(&mut policy, overrides);
        }

        debug!(
            "Resolved policy for {}: retain={} autoDelete={} retention={}d verbosity={}",
            env,
            policy.retain,
            policy.auto_delete_on_destroy,
            policy.log_retention_days,
            policy.logging_verbosity
        );

        policy
    }

    fn apply(policy: &mut PolicyBundle, overrides: &PartialPolicyBundle) {
        if let Some(retain) = overrides.retain {
            policy.retain = retain;
        }
        if let Some(auto_delete) = overrides.auto_delete_on_destroy {
            policy.auto_delete_on_destroy = auto_delete;
        }
        if let Some(days) = overrides.log_retention_days {
            policy.log_retention_days = days;
        }
        if let Some(verbosity) = overrides.logging_verbosity {
            policy.logging_verbosity = verbosity;
        }
        if let Some(asn) = overrides.default_asn {
            policy.default_asn = asn;
        }
    }

    /// Resolve every environment with the same overrides.
    pub fn resolve_all(overrides: Option<&PartialPolicyBundle>) -> Vec<PolicyBundle> {
        EnvironmentName::all()
            .into_iter()
            .map(|env| Self::resolve(env, overrides))
            .collect()
    }
}
