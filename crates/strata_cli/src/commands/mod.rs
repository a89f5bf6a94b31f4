//! CLI command definitions.
//!
//! Every command reads the same configuration inputs: an optional bundle
//! file plus flag overrides applied on top of it.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};

use strata_config::ConfigBundle;

pub mod deploy;
pub mod policy;
pub mod synth;
pub mod validate;

/// Strata - infrastructure composition and policy engine
#[derive(Parser)]
#[command(name = "strata")]
#[command(version, about = "Strata - infrastructure composition and policy engine")]
#[command(long_about = r#"
Strata validates a per-environment configuration bundle, resolves the
environment's policy, composes resource nodes into an ordered plan and
publishes named exports.

COMMANDS:
  validate  → Validate a configuration bundle
  policy    → Show the resolved policy for an environment
  synth     → Write plan.json and exports.json for an environment
  deploy    → Realize the plan against a provisioning engine

EXIT CODES:
  0 - Success
  1 - General error
  2 - Invalid arguments or missing deployment target
  3 - Validation failure
  4 - Composition error or duplicate export
  5 - Provisioning engine error
"#)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Log output format
    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Validate a configuration bundle
    Validate(validate::ValidateArgs),

    /// Show the resolved policy for an environment
    Policy(policy::PolicyArgs),

    /// Compose the stack and write build artifacts
    Synth(synth::SynthArgs),

    /// Compose the stack and realize it
    Deploy(deploy::DeployArgs),
}

/// Configuration inputs shared by every command.
#[derive(Args, Debug, Clone, Default)]
pub struct BundleArgs {
    /// Configuration bundle (.yaml, .yml, .json or .toml)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Environment name (dev, staging, prod)
    #[arg(short, long)]
    pub env: Option<String>,

    /// VPC CIDR range
    #[arg(long)]
    pub cidr: Option<String>,

    /// Number of availability zones
    #[arg(long, allow_negative_numbers = true)]
    pub max_azs: Option<i64>,

    /// Number of NAT gateways
    #[arg(long, allow_negative_numbers = true)]
    pub nat_gateways: Option<i64>,

    /// Transit gateway ASN
    #[arg(long, allow_negative_numbers = true)]
    pub asn: Option<i64>,

    /// Log retention in days
    #[arg(long, allow_negative_numbers = true)]
    pub retention_days: Option<i64>,

    /// Stack tag (repeatable)
    #[arg(long = "tag", value_name = "KEY=VALUE", value_parser = parse_tag)]
    pub tags: Vec<(String, String)>,
}

impl BundleArgs {
    /// Load the bundle file, if any, and apply flag overrides.
    pub fn load(&self) -> Result<ConfigBundle> {
        let mut bundle = match &self.config {
            Some(path) => ConfigBundle::from_file(path)
                .with_context(|| format!("Failed to load configuration from {:?}", path))?,
            None => ConfigBundle::default(),
        };

        if let Some(env) = &self.env {
            bundle = bundle.with_env_name(env.clone());
        }
        if let Some(cidr) = &self.cidr {
            bundle = bundle.with_cidr(cidr.clone());
        }
        if let Some(max_azs) = self.max_azs {
            bundle = bundle.with_max_azs(max_azs);
        }
        if let Some(nat_gateways) = self.nat_gateways {
            bundle = bundle.with_nat_gateways(nat_gateways);
        }
        if let Some(asn) = self.asn {
            bundle = bundle.with_asn(asn);
        }
        if let Some(days) = self.retention_days {
            bundle = bundle.with_retention_days(days);
        }
        for (key, value) in &self.tags {
            bundle = bundle.with_tag(key.clone(), value.clone());
        }

        Ok(bundle)
    }
}

fn parse_tag(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => {
            Ok((key.trim().to_string(), value.to_string()))
        }
        _ => Err(format!("expected KEY=VALUE, got '{}'", raw)),
    }
}
