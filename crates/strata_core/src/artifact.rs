//! Build artifacts written by `synth` and `deploy`.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::info;

use strata_config::EnvironmentName;
use strata_graph::PlanDocument;
use strata_policy::PolicyBundle;

use crate::assembler::Assembly;
use crate::deploy::DeploymentReport;
use crate::error::{AssemblyError, AssemblyResult, Stage};

pub const PLAN_FILE: &str = "plan.json";
pub const EXPORTS_FILE: &str = "exports.json";
pub const REPORT_FILE: &str = "deployment.json";

/// Contents of `plan.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StackDocument {
    pub stack_name: String,
    pub description: String,
    pub env: EnvironmentName,
    pub policy: PolicyBundle,
    pub plan: PlanDocument,
}

impl StackDocument {
    pub fn from_assembly(assembly: &Assembly) -> Self {
        Self {
            stack_name: assembly.stack_name.clone(),
            description: assembly.description.clone(),
            env: assembly.env,
            policy: assembly.policy.clone(),
            plan: assembly.plan.to_document(),
        }
    }
}

/// Where the artifacts of one synth went.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactPaths {
    pub dir: PathBuf,
    pub plan: PathBuf,
    pub exports: PathBuf,
}

fn artifact_error(e: impl Into<crate::error::StageError>) -> AssemblyError {
    AssemblyError::new(Stage::Artifacts, e)
}

fn env_dir(out_dir: &Path, env: EnvironmentName) -> AssemblyResult<PathBuf> {
    let dir = out_dir.join(env.as_str());
    fs::create_dir_all(&dir).map_err(artifact_error)?;
    Ok(dir)
}

/// Write `plan.json` and `exports.json` under `<out_dir>/<env>/`.
pub fn write_artifacts(assembly: &Assembly, out_dir: &Path) -> AssemblyResult<ArtifactPaths> {
    let dir = env_dir(out_dir, assembly.env)?;

    let plan = dir.join(PLAN_FILE);
    let document = serde_json::to_string_pretty(&StackDocument::from_assembly(assembly))
        .map_err(artifact_error)?;
    fs::write(&plan, document).map_err(artifact_error)?;

    let exports = dir.join(EXPORTS_FILE);
    let snapshot = assembly.exports.to_json().map_err(artifact_error)?;
    fs::write(&exports, snapshot).map_err(artifact_error)?;

    info!("Wrote artifacts for {} to {:?}", assembly.env, dir);
    Ok(ArtifactPaths { dir, plan, exports })
}

/// Write `deployment.json` under `<out_dir>/<env>/`.
pub fn write_report(report: &DeploymentReport, out_dir: &Path) -> AssemblyResult<PathBuf> {
    let path = env_dir(out_dir, report.env)?.join(REPORT_FILE);
    let json = serde_json::to_string_pretty(report).map_err(artifact_error)?;
    fs::write(&path, json).map_err(artifact_error)?;
    info!("Wrote deployment report to {:?}", path);
    Ok(path)
}
