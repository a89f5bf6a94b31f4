//! # strata_core
//!
//! Stack assembly for Strata.
//!
//! This crate provides:
//! - **StackAssembler**: the run state machine from raw bundle to plan and exports
//! - **ProvisioningEngine**: the async boundary resolved nodes are handed to
//! - **DryRunEngine**: a recording engine with fabricated, deterministic outputs
//! - **deploy**: plan-order realization with reference resolution
//! - **Artifacts**: `plan.json`, `exports.json` and deployment reports

pub mod artifact;
pub mod assembler;
pub mod deploy;
pub mod dry_run;
pub mod engine;
pub mod error;
pub mod state;
pub mod target;

pub use artifact::{write_artifacts, write_report, ArtifactPaths, StackDocument};
pub use assembler::{assemble, Assembly, StackAssembler};
pub use deploy::{deploy, DeploymentReport, RealizedNode};
pub use dry_run::DryRunEngine;
pub use engine::{ProvisioningEngine, ResolvedNode};
pub use error::{
    AssemblyError, AssemblyResult, EngineError, EngineResult, Stage, StageError, TargetError,
};
pub use state::AssemblyState;
pub use target::{DeploymentTarget, ACCOUNT_ENV, REGION_ENV};
