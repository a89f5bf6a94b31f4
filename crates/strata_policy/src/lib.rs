//! # strata_policy
//!
//! Environment policy resolution for Strata.
//!
//! This crate provides:
//! - **Policy table**: retention, auto-delete, log retention, logging verbosity
//!   and ASN defaults per environment
//! - **Overrides**: any field of a [`PartialPolicyBundle`] wins over the table
//! - **Tag policy**: layered tag merging with reserved policy tags
//!
//! ## Example
//!
//! ```rust
//! use strata_config::EnvironmentName;
//! use strata_policy::{PolicyResolver, RemovalPolicy};
//!
//! let prod = PolicyResolver::resolve(EnvironmentName::Prod, None);
//! assert!(prod.retain);
//! assert_eq!(prod.removal_policy(), RemovalPolicy::Retain);
//!
//! let dev = PolicyResolver::resolve(EnvironmentName::Dev, None);
//! assert!(dev.auto_delete_on_destroy);
//! ```

pub mod bundle;
pub mod resolver;
pub mod tags;

pub use bundle::{PolicyBundle, RemovalPolicy};
pub use resolver::{PolicyResolver, DEFAULT_ASN, DEFAULT_LOG_RETENTION_DAYS, ENVIRONMENT_TAG};
pub use strata_config::PartialPolicyBundle;
