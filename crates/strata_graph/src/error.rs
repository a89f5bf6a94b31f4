//! Error types for graph composition, reference resolution and exports.

use strata_config::EnvironmentName;
use thiserror::Error;

/// Result type alias for composition operations.
pub type CompositionResult<T> = Result<T, CompositionError>;

/// Errors in resource-kind wiring. Always fatal to the run.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CompositionError {
    #[error("Cyclic dependency between: {}", .ids.join(", "))]
    CyclicDependency { ids: Vec<String> },

    #[error("Unresolved reference in {node}.{input}: {target}.{output} ({reason})")]
    UnresolvedReference {
        node: String,
        input: String,
        target: String,
        output: String,
        reason: String,
    },

    #[error("Unknown dependency: {node} depends on missing node {target}")]
    UnknownDependency { node: String, target: String },

    #[error("Required input '{input}' of {kind} node {node} is not bound")]
    UnboundInput {
        node: String,
        kind: String,
        input: String,
    },

    #[error("Duplicate logical id: {0}")]
    DuplicateLogicalId(String),
}

/// Errors turning a reference into a concrete value after realization.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolutionError {
    #[error("Node {0} has not been realized")]
    NotRealized(String),

    #[error("Node {logical_id} did not produce output '{output}'")]
    MissingOutput { logical_id: String, output: String },

    #[error("Output {logical_id}.{output} has no field '{field}'")]
    MissingField {
        logical_id: String,
        output: String,
        field: String,
    },

    #[error("Cannot join non-scalar value in {0}")]
    NotJoinable(String),
}

/// A second registration of an export name within the same scope.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error(
    "Duplicate export '{name}' in scope {scope}: already registered as '{existing_value}', rejected '{rejected_value}'"
)]
pub struct DuplicateExportError {
    pub name: String,
    pub scope: EnvironmentName,
    pub existing_value: String,
    pub rejected_value: String,
}
