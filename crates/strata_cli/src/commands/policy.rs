//! Policy command - Show the resolved policy for an environment.

use anyhow::Result;
use clap::{Args, ValueEnum};
use tracing::info;

use strata_config::ConfigValidator;
use strata_policy::PolicyResolver;

use super::BundleArgs;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Yaml,
    Json,
}

#[derive(Args)]
pub struct PolicyArgs {
    #[command(flatten)]
    pub bundle: BundleArgs,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Yaml)]
    pub format: OutputFormat,
}

pub async fn execute(args: PolicyArgs) -> Result<()> {
    let config = ConfigValidator::validate(&args.bundle.load()?)?;
    let policy = PolicyResolver::resolve(config.env, Some(&config.policy_overrides));
    info!("Resolved policy for {}", policy.env);

    let rendered = match args.format {
        OutputFormat::Yaml => policy.to_yaml()?,
        OutputFormat::Json => serde_json::to_string_pretty(&policy)?,
    };
    println!("{}", rendered.trim_end());
    Ok(())
}
