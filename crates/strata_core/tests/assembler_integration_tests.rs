//! Integration tests for assembly, deployment and artifacts.

use std::fs;

use strata_config::{ConfigBundle, EnvironmentName};
use strata_core::artifact::EXPORTS_FILE;
use strata_core::{
    assemble, deploy, write_artifacts, write_report, AssemblyState, DryRunEngine, EngineError,
    Stage, StackAssembler, StageError,
};
use tempfile::tempdir;

const BUNDLE: &str = r#"
envName: prod
tags:
  Owner: platform
network:
  cidr: 10.40.0.0/16
  maxAzs: 3
  natGateways: 2
  additionalSubnetGroups:
    - name: Data
      subnetType: isolated
      cidrMask: 24
storage:
  bucketPrefix: Acme_Data
policy:
  logRetentionDays: 30
"#;

/// Two runs with identical input give byte-identical export snapshots.
#[test]
fn test_identical_runs_give_identical_snapshots() {
    let run = || {
        let bundle = ConfigBundle::from_yaml(BUNDLE).unwrap();
        assemble(bundle).unwrap().exports.to_json().unwrap()
    };
    assert_eq!(run(), run());
}

/// An unknown environment fails validation before any node is built.
#[test]
fn test_unknown_environment_fails_before_composition() {
    let mut assembler = StackAssembler::new(ConfigBundle::new("sandbox"));
    let err = assembler.run().unwrap_err();

    assert_eq!(err.stage, Stage::Validation);
    match &err.source {
        StageError::Validation(e) => assert_eq!(e.field, "envName"),
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(assembler.history().len(), 3);
    assert!(matches!(
        assembler.history().last(),
        Some(AssemblyState::Failed { .. })
    ));
}

#[test]
fn test_negative_nat_gateways_rejected() {
    let err = assemble(ConfigBundle::new("dev").with_nat_gateways(-1)).unwrap_err();
    assert_eq!(err.stage, Stage::Validation);
    assert!(err.to_string().contains("natGateways"));
}

#[test]
fn test_bundle_settings_reach_the_plan() {
    let assembly = assemble(ConfigBundle::from_yaml(BUNDLE).unwrap()).unwrap();
    assert_eq!(assembly.env, EnvironmentName::Prod);
    assert!(assembly.policy.retain);
    assert_eq!(assembly.policy.log_retention_days, 30);

    let bucket = &assembly.plan.nodes()[assembly.plan.position("Bucket-prod").unwrap()];
    assert_eq!(
        bucket.inputs["bucketName"].to_symbolic(),
        "acme-data-prod-bucket"
    );
}

#[tokio::test]
async fn test_deploy_dry_run_resolves_exports() {
    let assembly = assemble(ConfigBundle::from_yaml(BUNDLE).unwrap()).unwrap();
    let engine = DryRunEngine::new("eu-west-1");

    let report = deploy(&assembly, &engine).await.unwrap();
    assert_eq!(report.engine, "dry-run");
    assert_eq!(report.exports.len(), assembly.exports.len());
    assert!(report.exports.iter().all(|e| !e.value.contains("${")));

    // default groups plus Data, three AZs each
    let isolated = report.export_value("prod-IsolatedSubnetIds").unwrap();
    assert_eq!(isolated.split(',').count(), 6);
    assert_eq!(report.export_value("prod-S3BucketName"), Some("acme-data-prod-bucket"));
    assert!(report
        .export_value("prod-ApiGatewayUrl")
        .unwrap()
        .starts_with("https://"));
}

/// A failing engine stops the run at the failing node.
#[tokio::test]
async fn test_engine_failure_halts_deployment() {
    let assembly = assemble(ConfigBundle::new("dev")).unwrap();
    let engine = DryRunEngine::new("us-east-1").fail_on("TransitGateway-dev", "limit exceeded");

    let err = deploy(&assembly, &engine).await.unwrap_err();
    assert_eq!(err.stage, Stage::Realization);
    assert!(matches!(
        err.source,
        StageError::Engine(EngineError::Failed { .. })
    ));

    let realized: Vec<_> = engine.calls().into_iter().map(|n| n.logical_id).collect();
    assert_eq!(realized, vec!["LogGroup-dev", "Vpc-dev", "TransitGateway-dev"]);
}

#[tokio::test]
async fn test_artifacts_and_report_written_per_environment() {
    let out = tempdir().unwrap();
    let assembly = assemble(ConfigBundle::new("dev")).unwrap();

    let paths = write_artifacts(&assembly, out.path()).unwrap();
    let exports = fs::read_to_string(out.path().join("dev").join(EXPORTS_FILE)).unwrap();
    assert_eq!(exports, assembly.exports.to_json().unwrap());
    assert!(fs::read_to_string(&paths.plan)
        .unwrap()
        .contains("\"stackName\": \"MainStack-dev\""));

    let report = deploy(&assembly, &DryRunEngine::new("us-east-1")).await.unwrap();
    let path = write_report(&report, out.path()).unwrap();
    assert!(fs::read_to_string(path).unwrap().contains("\"engine\": \"dry-run\""));
}
