//! Deploy command - Realize the stack.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use tracing::info;

use strata_core::{
    deploy, write_artifacts, write_report, DeploymentTarget, DryRunEngine, StackAssembler,
    ACCOUNT_ENV, REGION_ENV,
};

use super::BundleArgs;

#[derive(Args)]
pub struct DeployArgs {
    #[command(flatten)]
    pub bundle: BundleArgs,

    /// Target account
    #[arg(long, env = ACCOUNT_ENV)]
    pub account: Option<String>,

    /// Target region
    #[arg(long, env = REGION_ENV)]
    pub region: Option<String>,

    /// Output directory for artifacts and the deployment report
    #[arg(short, long, default_value = "strata.out")]
    pub out: PathBuf,
}

pub async fn execute(args: DeployArgs) -> Result<()> {
    let target = DeploymentTarget::new(args.account, args.region)?;
    info!("Deploying to {}", target);

    let bundle = args.bundle.load()?;
    let assembly = StackAssembler::new(bundle).run()?;
    write_artifacts(&assembly, &args.out)?;

    let engine = DryRunEngine::for_target(&target);
    let report = deploy(&assembly, &engine)
        .await
        .with_context(|| format!("Deployment of {} failed", assembly.stack_name))?;
    let report_path = write_report(&report, &args.out)?;

    println!(
        "✅ Deployed {} to {} ({} nodes, {} ms)",
        report.stack_name,
        target,
        report.realized.len(),
        report.duration_ms()
    );
    for export in &report.exports {
        println!("   {} = {}", export.name, export.value);
    }
    println!("   Report: {}", report_path.display());
    Ok(())
}
