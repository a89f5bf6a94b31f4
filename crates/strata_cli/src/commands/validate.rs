//! Validate command - Check a configuration bundle.

use anyhow::Result;
use clap::Args;
use tracing::info;

use strata_config::ConfigValidator;

use super::BundleArgs;

#[derive(Args)]
pub struct ValidateArgs {
    #[command(flatten)]
    pub bundle: BundleArgs,
}

pub async fn execute(args: ValidateArgs) -> Result<()> {
    let bundle = args.bundle.load()?;
    info!("Validating configuration for '{}'", bundle.env_name);

    let config = ConfigValidator::validate(&bundle)?;

    println!("✅ Configuration for {} is valid", config.env);
    println!("   CIDR:          {}", config.network.cidr);
    println!("   AZs:           {}", config.network.max_azs);
    println!("   NAT gateways:  {}", config.network.nat_gateways);
    println!("   Subnet groups:");
    for group in &config.network.subnet_groups {
        match group.cidr_mask {
            Some(mask) => println!(
                "      - {} ({}, /{})",
                group.qualified_name(config.env),
                group.subnet_type,
                mask
            ),
            None => println!(
                "      - {} ({})",
                group.qualified_name(config.env),
                group.subnet_type
            ),
        }
    }
    if !config.policy_overrides.is_empty() {
        println!("   Policy overrides present");
    }

    Ok(())
}
