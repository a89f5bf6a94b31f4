//! # strata_graph
//!
//! Resource composition for Strata.
//!
//! This crate provides:
//! - **Resource kinds**: required inputs and produced outputs per kind
//! - **Nodes**: typed inputs that are literals or references to other nodes' outputs
//! - **Stack definition**: the nodes one environment's stack is made of
//! - **Composition graph**: admission checks and deterministic topological ordering
//! - **Export registry**: scoped, first-wins named outputs
//!
//! ## Example
//!
//! ```rust
//! use strata_config::{ConfigBundle, ConfigValidator, EnvironmentName};
//! use strata_graph::{CompositionGraph, ExportRegistry};
//! use strata_policy::PolicyResolver;
//!
//! let config = ConfigValidator::validate(&ConfigBundle::new("dev")).unwrap();
//! let policy = PolicyResolver::resolve(config.env, Some(&config.policy_overrides));
//!
//! let plan = CompositionGraph::build(&config, &policy).unwrap();
//! assert!(plan.position("Vpc-dev") < plan.position("TgwAttachment-dev"));
//!
//! let mut exports = ExportRegistry::new();
//! plan.register_exports(EnvironmentName::Dev, &mut exports).unwrap();
//! assert_eq!(
//!     exports.get(EnvironmentName::Dev, "dev-VpcId").unwrap().value,
//!     "${Vpc-dev.vpcId}"
//! );
//! ```

pub mod error;
pub mod exports;
pub mod graph;
pub mod kind;
pub mod node;
pub mod resources;
pub mod value;

pub use error::{CompositionError, CompositionResult, DuplicateExportError, ResolutionError};
pub use exports::{Export, ExportRegistry};
pub use graph::{CompositionGraph, ExecutionPlan, PlanDocument, PlanEntry};
pub use kind::ResourceKind;
pub use node::{ExportRequest, ResourceNode};
pub use resources::{export_name, logical_id, sanitize_bucket_name, StackDefinition, LOG_GROUP_TAG};
pub use value::{value_to_string, InputValue, OutputRef, OutputTable, OutputValues};
