//! # strata_config
//!
//! Configuration bundles for Strata compositions.
//!
//! A [`ConfigBundle`] is the raw, per-environment description of a stack
//! (network ranges, AZ and NAT counts, tags, subnet groups, policy overrides).
//! [`ConfigValidator`] checks it fail-fast and produces a [`ValidatedConfig`]
//! with every default filled in.
//!
//! ## Example
//!
//! ```rust
//! use strata_config::{ConfigBundle, ConfigValidator, EnvironmentName};
//!
//! let bundle = ConfigBundle::new("dev")
//!     .with_cidr("10.1.0.0/16")
//!     .with_nat_gateways(0)
//!     .with_tag("Owner", "platform");
//!
//! let config = ConfigValidator::validate(&bundle).unwrap();
//! assert_eq!(config.env, EnvironmentName::Dev);
//! assert_eq!(config.network.max_azs, 2);
//! ```

pub mod bundle;
pub mod env;
pub mod error;
pub mod reader;
pub mod validated;
pub mod validator;

pub use bundle::{
    ApiConfig, ComputeConfig, ConfigBundle, LoggingVerbosity, NetworkConfig, PolicyOverrides,
    RawTags, StorageConfig, SubnetGroupConfig, SubnetType, TransitGatewayConfig,
};
pub use env::EnvironmentName;
pub use error::{ConfigError, ConfigResult, ValidationError, ValidationResult};
pub use reader::ConfigFormat;
pub use validated::{
    ApiSettings, ComputeSettings, NetworkSettings, PartialPolicyBundle, StorageSettings,
    SubnetGroup, Tags, TransitGatewaySettings, ValidatedConfig, MAX_BUCKET_NAME_LEN,
    MAX_BUCKET_PREFIX_LEN,
};
pub use validator::ConfigValidator;
