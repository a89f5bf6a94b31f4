//! Synth command - Compose the stack and write build artifacts.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use tracing::info;

use strata_core::{write_artifacts, StackAssembler};

use super::BundleArgs;

#[derive(Args)]
pub struct SynthArgs {
    #[command(flatten)]
    pub bundle: BundleArgs,

    /// Output directory; artifacts go to <out>/<env>/
    #[arg(short, long, default_value = "strata.out")]
    pub out: PathBuf,
}

pub async fn execute(args: SynthArgs) -> Result<()> {
    let bundle = args.bundle.load()?;
    let assembly = StackAssembler::new(bundle).run()?;

    let paths = write_artifacts(&assembly, &args.out)?;
    info!("Synthesized {}", assembly.stack_name);

    println!("✅ Synthesized {} ({})", assembly.stack_name, assembly.description);
    println!("   Order:");
    for (i, node) in assembly.plan.nodes().iter().enumerate() {
        println!("      {}. {} ({})", i + 1, node.logical_id, node.kind);
    }
    println!("   Exports: {}", assembly.exports.len());
    println!("   Plan:    {}", paths.plan.display());
    println!("   Exports: {}", paths.exports.display());
    Ok(())
}
