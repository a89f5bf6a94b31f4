//! Realization of an assembled stack.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{error, info};
use uuid::Uuid;

use strata_config::EnvironmentName;
use strata_graph::{Export, OutputTable, OutputValues, ResourceKind, ResourceNode};

use crate::assembler::Assembly;
use crate::engine::{ProvisioningEngine, ResolvedNode};
use crate::error::{AssemblyError, AssemblyResult, EngineError, Stage};

/// A node the engine realized, with its outputs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RealizedNode {
    pub logical_id: String,
    pub kind: ResourceKind,
    pub outputs: OutputValues,
}

/// Outcome of a deployment.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentReport {
    pub run_id: Uuid,
    pub env: EnvironmentName,
    pub stack_name: String,
    pub engine: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub realized: Vec<RealizedNode>,
    /// Exports with concrete values.
    pub exports: Vec<Export>,
}

impl DeploymentReport {
    pub fn duration_ms(&self) -> i64 {
        (self.finished_at - self.started_at).num_milliseconds()
    }

    pub fn export_value(&self, name: &str) -> Option<&str> {
        self.exports
            .iter()
            .find(|e| e.name == name)
            .map(|e| e.value.as_str())
    }
}

fn resolve_node(node: &ResourceNode, outputs: &OutputTable) -> AssemblyResult<ResolvedNode> {
    let mut properties = BTreeMap::new();
    for (name, value) in &node.inputs {
        let resolved = value
            .resolve(outputs)
            .map_err(|e| AssemblyError::new(Stage::Realization, e))?;
        properties.insert(name.clone(), resolved);
    }
    Ok(ResolvedNode {
        logical_id: node.logical_id.clone(),
        kind: node.kind,
        properties,
    })
}

fn check_outputs(node: &ResourceNode, outputs: &OutputValues) -> Result<(), EngineError> {
    match node
        .produced_outputs()
        .iter()
        .find(|o| !outputs.contains_key(**o))
    {
        Some(missing) => Err(EngineError::MissingOutput {
            logical_id: node.logical_id.clone(),
            output: missing.to_string(),
        }),
        None => Ok(()),
    }
}

/// Realize every node of `assembly` in plan order.
///
/// Each node's references are resolved from the outputs of nodes realized
/// before it. The first engine failure stops the run.
pub async fn deploy(
    assembly: &Assembly,
    engine: &dyn ProvisioningEngine,
) -> AssemblyResult<DeploymentReport> {
    let run_id = Uuid::new_v4();
    let started_at = Utc::now();
    let total = assembly.plan.len();
    info!(
        "Deploying {} ({} nodes) with {} engine, run {}",
        assembly.stack_name,
        total,
        engine.name(),
        run_id
    );

    let mut table = OutputTable::new();
    let mut realized = Vec::with_capacity(total);

    for (i, node) in assembly.plan.nodes().iter().enumerate() {
        let resolved = resolve_node(node, &table)?;
        info!("Realizing [{}/{}]: {}", i + 1, total, node.logical_id);

        let outputs = match engine.realize(&resolved).await {
            Ok(outputs) => outputs,
            Err(e) => {
                error!("Realization of {} failed: {}", node.logical_id, e);
                return Err(AssemblyError::new(Stage::Realization, e));
            }
        };
        check_outputs(node, &outputs).map_err(|e| AssemblyError::new(Stage::Realization, e))?;

        table.insert(node.logical_id.clone(), outputs.clone());
        realized.push(RealizedNode {
            logical_id: node.logical_id.clone(),
            kind: node.kind,
            outputs,
        });
    }

    let exports = assembly
        .exports
        .resolve(&table)
        .map_err(|e| AssemblyError::new(Stage::Export, e))?;

    let finished_at = Utc::now();
    info!(
        "Deployed {}: {} nodes, {} exports",
        assembly.stack_name,
        realized.len(),
        exports.len()
    );

    Ok(DeploymentReport {
        run_id,
        env: assembly.env,
        stack_name: assembly.stack_name.clone(),
        engine: engine.name().to_string(),
        started_at,
        finished_at,
        realized,
        exports: exports.snapshot(),
    })
}
