//! Error types for assembly, realization and deployment targets.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use strata_config::ValidationError;
use strata_graph::{CompositionError, DuplicateExportError, ResolutionError};

/// Result type alias for assembler operations.
pub type AssemblyResult<T> = Result<T, AssemblyError>;

/// Result type alias for provisioning engine calls.
pub type EngineResult<T> = Result<T, EngineError>;

/// The step of a run that produced an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Validation,
    PolicyResolution,
    Composition,
    Export,
    Completion,
    Realization,
    Artifacts,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Validation => "validation",
            Stage::PolicyResolution => "policy_resolution",
            Stage::Composition => "composition",
            Stage::Export => "export",
            Stage::Completion => "completion",
            Stage::Realization => "realization",
            Stage::Artifacts => "artifacts",
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Errors raised by a provisioning engine.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    #[error("Engine failed to realize {logical_id}: {message}")]
    Failed { logical_id: String, message: String },

    #[error("Engine did not return output '{output}' for {logical_id}")]
    MissingOutput { logical_id: String, output: String },
}

/// Missing deployment account or region.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Missing deployment {field}: set {variable} or pass --{field}")]
pub struct TargetError {
    pub field: &'static str,
    pub variable: &'static str,
}

/// The underlying failure of a stage.
#[derive(Error, Debug)]
pub enum StageError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Composition(#[from] CompositionError),

    #[error(transparent)]
    DuplicateExport(#[from] DuplicateExportError),

    #[error(transparent)]
    Resolution(#[from] ResolutionError),

    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error("Invalid state transition: {from} -> {to}")]
    InvalidTransition { from: String, to: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A failed run, tagged with the stage that failed.
#[derive(Error, Debug)]
#[error("{stage} failed: {source}")]
pub struct AssemblyError {
    pub stage: Stage,
    pub source: StageError,
}

impl AssemblyError {
    pub fn new(stage: Stage, source: impl Into<StageError>) -> Self {
        Self {
            stage,
            source: source.into(),
        }
    }
}
