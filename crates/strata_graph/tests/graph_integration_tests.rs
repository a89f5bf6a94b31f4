//! Integration tests for composition, ordering and exports.

use strata_config::{ConfigBundle, ConfigValidator, EnvironmentName};
use strata_graph::{
    CompositionError, CompositionGraph, Export, ExportRegistry, InputValue, OutputRef,
    ResourceKind, ResourceNode, StackDefinition,
};
use strata_policy::PolicyResolver;

fn network(id: &str) -> ResourceNode {
    ResourceNode::new(id, ResourceKind::Network)
        .with_input("envName", "dev")
        .with_input("cidr", "10.0.0.0/16")
        .with_input("maxAzs", 2u32)
        .with_input("natGateways", 1u32)
        .with_input("subnetGroups", InputValue::List(vec![]))
}

fn transit_gateway(id: &str) -> ResourceNode {
    ResourceNode::new(id, ResourceKind::TransitGateway)
        .with_input("envName", "dev")
        .with_input("asn", 64512u32)
        .with_input("tags", InputValue::map([("Name", InputValue::from(id))]))
}

fn attachment(id: &str, vpc: &str, tgw: &str) -> ResourceNode {
    ResourceNode::new(id, ResourceKind::TransitGatewayAttachment)
        .with_input("envName", "dev")
        .with_input("vpcId", InputValue::reference(vpc, "vpcId"))
        .with_input("transitGatewayId", InputValue::reference(tgw, "transitGatewayId"))
        .with_input(
            "privateSubnetIds",
            OutputRef::new(vpc, "subnetIdsByType").field("private"),
        )
}

fn log_sink(id: &str) -> ResourceNode {
    ResourceNode::new(id, ResourceKind::LogSink)
        .with_input("envName", "dev")
        .with_input("retentionDays", 7u32)
        .with_input("retain", false)
}

/// The network is ordered before the attachment even when declared after it.
#[test]
fn test_network_precedes_attachment_regardless_of_declaration() {
    let mut graph = CompositionGraph::new();
    graph.add(attachment("Att", "Net", "Tgw")).unwrap();
    graph.add(transit_gateway("Tgw")).unwrap();
    graph.add(network("Net")).unwrap();

    let plan = graph.order().unwrap();
    assert_eq!(plan.logical_ids(), vec!["Tgw", "Net", "Att"]);
    assert!(plan.position("Net").unwrap() < plan.position("Att").unwrap());
}

/// Two log sinks that depend on each other are both named in the error.
#[test]
fn test_synthetic_cycle_names_participants() {
    let mut graph = CompositionGraph::new();
    graph.add(log_sink("A").with_dependency("B")).unwrap();
    graph.add(log_sink("B").with_dependency("A")).unwrap();

    let err = graph.order().unwrap_err();
    assert_eq!(
        err,
        CompositionError::CyclicDependency {
            ids: vec!["A".to_string(), "B".to_string()]
        }
    );
    assert_eq!(err.to_string(), "Cyclic dependency between: A, B");
}

#[test]
fn test_self_loop_is_a_cycle() {
    let mut graph = CompositionGraph::new();
    graph.add(log_sink("Solo").with_dependency("Solo")).unwrap();
    assert_eq!(
        graph.order().unwrap_err(),
        CompositionError::CyclicDependency {
            ids: vec!["Solo".to_string()]
        }
    );
}

#[test]
fn test_reference_to_missing_node() {
    let mut graph = CompositionGraph::new();
    graph.add(transit_gateway("Tgw")).unwrap();
    graph.add(attachment("Att", "Missing", "Tgw")).unwrap();

    match graph.order().unwrap_err() {
        CompositionError::UnresolvedReference { node, target, .. } => {
            assert_eq!(node, "Att");
            assert_eq!(target, "Missing");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_unbound_required_input_rejected_at_admission() {
    let mut graph = CompositionGraph::new();
    let node = ResourceNode::new("Api", ResourceKind::ApiSurface).with_input("envName", "dev");

    assert_eq!(
        graph.add(node).unwrap_err(),
        CompositionError::UnboundInput {
            node: "Api".into(),
            kind: "apiSurface".into(),
            input: "storageBucketName".into(),
        }
    );
    assert!(graph.is_empty());
}

/// The declared stack orders the log sink first and storage before the API.
#[test]
fn test_full_stack_order() {
    let config = ConfigValidator::validate(&ConfigBundle::new("dev")).unwrap();
    let policy = PolicyResolver::resolve(config.env, Some(&config.policy_overrides));
    let plan = CompositionGraph::build(&config, &policy).unwrap();

    assert_eq!(
        plan.logical_ids(),
        vec![
            "LogGroup-dev",
            "Vpc-dev",
            "TransitGateway-dev",
            "TgwAttachment-dev",
            "Bucket-dev",
            "ApiGateway-dev",
            "Instance-dev",
        ]
    );
    assert_eq!(StackDefinition::new(&config, &policy).declare().len(), plan.len());
}

#[test]
fn test_plan_document_is_deterministic() {
    let render = || {
        let config = ConfigValidator::validate(&ConfigBundle::new("staging").with_tag("Owner", "net"))
            .unwrap();
        let policy = PolicyResolver::resolve(config.env, Some(&config.policy_overrides));
        CompositionGraph::build(&config, &policy)
            .unwrap()
            .to_document()
            .to_json()
            .unwrap()
    };

    let first = render();
    assert_eq!(first, render());
    assert!(first.contains("\"logicalId\": \"TgwAttachment-staging\""));
    assert!(first.contains("${Vpc-staging.subnetIdsByType.private}"));
}

#[test]
fn test_stack_exports_registered_in_plan_order() {
    let config = ConfigValidator::validate(&ConfigBundle::new("prod")).unwrap();
    let policy = PolicyResolver::resolve(config.env, None);
    let plan = CompositionGraph::build(&config, &policy).unwrap();

    let mut registry = ExportRegistry::new();
    plan.register_exports(EnvironmentName::Prod, &mut registry).unwrap();

    let names: Vec<_> = registry.snapshot().into_iter().map(|e| e.name).collect();
    assert_eq!(
        names,
        vec![
            "prod-LogGroupName",
            "prod-VpcId",
            "prod-PublicSubnetIds",
            "prod-PrivateSubnetIds",
            "prod-IsolatedSubnetIds",
            "prod-TransitGatewayId",
            "prod-TgwAttachmentId",
            "prod-S3BucketName",
            "prod-ApiGatewayUrl",
            "prod-InstanceId",
        ]
    );

    // registering the same plan twice collides on the first export
    let err = plan
        .register_exports(EnvironmentName::Prod, &mut registry)
        .unwrap_err();
    assert_eq!(err.name, "prod-LogGroupName");
}

#[test]
fn test_duplicate_export_keeps_first_value() {
    let mut registry = ExportRegistry::new();
    registry
        .register(Export::new("dev-VpcId", "vpc-aaa", EnvironmentName::Dev))
        .unwrap();
    let err = registry
        .register(Export::new("dev-VpcId", "vpc-bbb", EnvironmentName::Dev))
        .unwrap_err();

    assert_eq!(err.existing_value, "vpc-aaa");
    assert_eq!(registry.snapshot()[0].value, "vpc-aaa");
    assert!(err.to_string().contains("dev-VpcId"));
}
