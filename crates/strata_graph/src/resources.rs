//! Node declarations for one environment's stack.
//!
//! Each builder maps validated configuration and resolved policy onto the
//! inputs of one resource kind, wires references to the nodes it consumes,
//! and requests the exports that node publishes.

use serde_json::{json, Value};

use strata_config::{EnvironmentName, SubnetType, Tags, ValidatedConfig, MAX_BUCKET_NAME_LEN};
use strata_policy::PolicyBundle;

use crate::kind::ResourceKind;
use crate::node::ResourceNode;
use crate::value::{InputValue, OutputRef};

/// Tag key carrying the log sink's name on every other node.
pub const LOG_GROUP_TAG: &str = "LogGroup";

/// Logical id of the node of `kind` in `env`.
pub fn logical_id(kind: ResourceKind, env: EnvironmentName) -> String {
    let base = match kind {
        ResourceKind::Network => "Vpc",
        ResourceKind::TransitGateway => "TransitGateway",
        ResourceKind::TransitGatewayAttachment => "TgwAttachment",
        ResourceKind::LogSink => "LogGroup",
        ResourceKind::Storage => "Bucket",
        ResourceKind::ApiSurface => "ApiGateway",
        ResourceKind::Compute => "Instance",
    };
    format!("{}-{}", base, env)
}

/// Export name scoped to `env`, e.g. `dev-VpcId`.
pub fn export_name(env: EnvironmentName, name: &str) -> String {
    format!("{}-{}", env, name)
}

/// Lowercase, provider-safe bucket name.
pub fn sanitize_bucket_name(raw: &str) -> String {
    let mut name: String = raw
        .to_lowercase()
        .chars()
        .map(|c| {
            if c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' || c == '.' {
                c
            } else {
                '-'
            }
        })
        .collect();
    name.truncate(MAX_BUCKET_NAME_LEN);
    name.trim_matches(|c| c == '-' || c == '.').to_string()
}

fn enable_flag(enabled: bool) -> &'static str {
    if enabled {
        "enable"
    } else {
        "disable"
    }
}

/// Declares the nodes of one stack from validated configuration and policy.
pub struct StackDefinition<'a> {
    config: &'a ValidatedConfig,
    policy: &'a PolicyBundle,
}

impl<'a> StackDefinition<'a> {
    pub fn new(config: &'a ValidatedConfig, policy: &'a PolicyBundle) -> Self {
        Self { config, policy }
    }

    fn env(&self) -> EnvironmentName {
        self.config.env
    }

    fn id(&self, kind: ResourceKind) -> String {
        logical_id(kind, self.env())
    }

    fn export(&self, name: &str) -> String {
        export_name(self.env(), name)
    }

    /// All nodes, in declaration order. Ordering for realization is the
    /// graph's job; declaration order only breaks ties.
    pub fn declare(&self) -> Vec<ResourceNode> {
        vec![
            self.log_sink(),
            self.network(),
            self.transit_gateway(),
            self.transit_gateway_attachment(),
            self.api_surface(),
            self.storage(),
            self.compute(),
        ]
    }

    fn tags(&self, kind: ResourceKind, resource: Tags) -> InputValue {
        let merged = self.policy.tags_for(&self.config.tags, &resource);
        let mut entries: std::collections::BTreeMap<String, InputValue> = merged
            .into_iter()
            .map(|(k, v)| (k, InputValue::from(v)))
            .collect();

        if kind != ResourceKind::LogSink {
            entries.entry(LOG_GROUP_TAG.to_string()).or_insert_with(|| {
                InputValue::reference(self.id(ResourceKind::LogSink), "logGroupName")
            });
        }

        InputValue::Map(entries)
    }

    fn private_subnets(&self) -> OutputRef {
        OutputRef::new(self.id(ResourceKind::Network), "subnetIdsByType")
            .field(SubnetType::Private.as_str())
    }

    pub fn log_sink(&self) -> ResourceNode {
        let kind = ResourceKind::LogSink;
        let node = ResourceNode::new(self.id(kind), kind);
        let name = node.output("logGroupName");

        node.with_input("envName", self.env().as_str())
            .with_input("logGroupName", format!("/strata/{}/network", self.env()))
            .with_input("retentionDays", self.policy.log_retention_days)
            .with_input("retain", self.policy.retain)
            .with_input("removalPolicy", self.policy.removal_policy().as_str())
            .with_input("tags", self.tags(kind, Tags::new()))
            .with_export(self.export("LogGroupName"), name)
    }

    pub fn network(&self) -> ResourceNode {
        let kind = ResourceKind::Network;
        let network = &self.config.network;

        let subnet_groups: Vec<InputValue> = network
            .subnet_groups
            .iter()
            .map(|group| {
                let mut entry = json!({
                    "name": group.qualified_name(self.env()),
                    "subnetType": group.subnet_type.provider_name(),
                });
                if let Some(mask) = group.cidr_mask {
                    entry["cidrMask"] = Value::from(mask);
                }
                InputValue::Literal(entry)
            })
            .collect();

        let mut node = ResourceNode::new(self.id(kind), kind)
            .with_input("envName", self.env().as_str())
            .with_input("cidr", network.cidr.as_str())
            .with_input("maxAzs", network.max_azs)
            .with_input("natGateways", network.nat_gateways)
            .with_input("subnetGroups", subnet_groups)
            .with_input("tags", self.tags(kind, network.tags.clone()));

        let vpc_id = node.output("vpcId");
        node = node.with_export(self.export("VpcId"), vpc_id);

        for subnet_type in SubnetType::all() {
            let ids = node.output("subnetIdsByType").field(subnet_type.as_str());
            let name = format!("{}SubnetIds", subnet_type.default_group_name());
            node = node.with_export(self.export(&name), InputValue::join(",", vec![ids.into()]));
        }

        node
    }

    pub fn transit_gateway(&self) -> ResourceNode {
        let kind = ResourceKind::TransitGateway;
        let tgw = &self.config.transit_gateway;
        let id = self.id(kind);

        let mut resource_tags = tgw.tags.clone();
        resource_tags.insert("Name".to_string(), id.clone());

        let node = ResourceNode::new(id, kind);
        let gateway_id = node.output("transitGatewayId");

        node.with_input("envName", self.env().as_str())
            .with_input("asn", tgw.asn.unwrap_or(self.policy.default_asn))
            .with_input("description", format!("Transit gateway for {}", self.env()))
            .with_input(
                "autoAcceptSharedAttachments",
                enable_flag(tgw.auto_accept_shared_attachments),
            )
            .with_input(
                "defaultRouteTableAssociation",
                enable_flag(tgw.default_route_table_association),
            )
            .with_input(
                "defaultRouteTablePropagation",
                enable_flag(tgw.default_route_table_propagation),
            )
            .with_input("tags", self.tags(kind, resource_tags))
            .with_export(self.export("TransitGatewayId"), gateway_id)
    }

    pub fn transit_gateway_attachment(&self) -> ResourceNode {
        let kind = ResourceKind::TransitGatewayAttachment;
        let id = self.id(kind);

        let resource_tags = Tags::from([
            ("Name".to_string(), id.clone()),
            ("Env".to_string(), self.env().to_string()),
        ]);

        let node = ResourceNode::new(id, kind);
        let attachment_id = node.output("attachmentId");

        node.with_input("envName", self.env().as_str())
            .with_input(
                "vpcId",
                InputValue::reference(self.id(ResourceKind::Network), "vpcId"),
            )
            .with_input(
                "transitGatewayId",
                InputValue::reference(self.id(ResourceKind::TransitGateway), "transitGatewayId"),
            )
            .with_input("privateSubnetIds", self.private_subnets())
            .with_input("tags", self.tags(kind, resource_tags))
            .with_export(self.export("TgwAttachmentId"), attachment_id)
    }

    pub fn storage(&self) -> ResourceNode {
        let kind = ResourceKind::Storage;
        let storage = &self.config.storage;
        let bucket_name =
            sanitize_bucket_name(&format!("{}-{}-bucket", storage.bucket_prefix, self.env()));

        let node = ResourceNode::new(self.id(kind), kind);
        let name = node.output("bucketName");

        node.with_input("envName", self.env().as_str())
            .with_input("bucketName", bucket_name)
            .with_input("retain", self.policy.retain)
            .with_input("autoDelete", self.policy.auto_delete_on_destroy)
            .with_input("removalPolicy", self.policy.removal_policy().as_str())
            .with_input("versioned", storage.versioned)
            .with_input("encryption", "S3_MANAGED")
            .with_input("blockPublicAccess", "BLOCK_ALL")
            .with_input("tags", self.tags(kind, Tags::new()))
            .with_export(self.export("S3BucketName"), name)
    }

    pub fn api_surface(&self) -> ResourceNode {
        let kind = ResourceKind::ApiSurface;
        let api = &self.config.api;
        let bucket = InputValue::reference(self.id(ResourceKind::Storage), "bucketName");

        let statement = InputValue::map([
            ("effect", InputValue::from("Allow")),
            (
                "actions",
                InputValue::List(vec!["s3:ListBucket".into(), "s3:GetObject".into()]),
            ),
            (
                "resources",
                InputValue::List(vec![
                    InputValue::join("", vec!["arn:aws:s3:::".into(), bucket.clone()]),
                    InputValue::join("", vec!["arn:aws:s3:::".into(), bucket.clone(), "/*".into()]),
                ]),
            ),
        ]);

        let handler = InputValue::map([
            ("name", InputValue::from(format!("HelloHandler-{}", self.env()))),
            ("policyStatements", InputValue::List(vec![statement])),
        ]);

        let route = InputValue::Literal(json!({
            "method": "GET",
            "path": "/hello",
        }));

        let node = ResourceNode::new(self.id(kind), kind);
        let url = node.output("apiUrl");

        node.with_input("envName", self.env().as_str())
            .with_input("storageBucketName", bucket)
            .with_input("restApiName", format!("ServiceApi-{}", self.env()))
            .with_input("stageName", api.stage_name.as_str())
            .with_input("loggingLevel", self.policy.logging_verbosity.as_str())
            .with_input("dataTraceEnabled", api.data_trace_enabled)
            .with_input("routes", InputValue::List(vec![route]))
            .with_input("handler", handler)
            .with_input("tags", self.tags(kind, Tags::new()))
            .with_export(self.export("ApiGatewayUrl"), url)
    }

    pub fn compute(&self) -> ResourceNode {
        let kind = ResourceKind::Compute;
        let compute = &self.config.compute;

        let node = ResourceNode::new(self.id(kind), kind);
        let instance_id = node.output("instanceOutputs").field("instanceId");

        node.with_input("envName", self.env().as_str())
            .with_input(
                "vpcId",
                InputValue::reference(self.id(ResourceKind::Network), "vpcId"),
            )
            .with_input("subnetIds", self.private_subnets())
            .with_input("instanceType", compute.instance_type.as_str())
            .with_input("machineImage", compute.machine_image.as_str())
            .with_input("tags", self.tags(kind, Tags::new()))
            .with_export(self.export("InstanceId"), instance_id)
    }
}
