//! In-process provisioning engine.
//!
//! [`DryRunEngine`] realizes nothing. It fabricates deterministic outputs
//! for each node, records every call, and can be told to fail on a given
//! node or to leave an output out. `strata deploy` uses it when no real
//! engine is configured, and tests use it to inspect what would be sent.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::{Mutex, RwLock};
use serde_json::{json, Value};
use tracing::{debug, warn};

use strata_config::SubnetType;
use strata_graph::{OutputValues, ResourceKind};

use crate::engine::{ProvisioningEngine, ResolvedNode};
use crate::error::{EngineError, EngineResult};
use crate::target::DeploymentTarget;

const DEFAULT_AZ_COUNT: u64 = 2;

/// Recording engine that fabricates outputs.
#[derive(Clone)]
pub struct DryRunEngine {
    region: String,
    sequence: Arc<Mutex<u32>>,
    calls: Arc<RwLock<Vec<ResolvedNode>>>,
    fail_on: Arc<RwLock<Option<(String, String)>>>,
    omitted: Arc<RwLock<Vec<(String, String)>>>,
}

impl DryRunEngine {
    pub fn new(region: impl Into<String>) -> Self {
        Self {
            region: region.into(),
            sequence: Arc::new(Mutex::new(0)),
            calls: Arc::new(RwLock::new(Vec::new())),
            fail_on: Arc::new(RwLock::new(None)),
            omitted: Arc::new(RwLock::new(Vec::new())),
        }
    }

    pub fn for_target(target: &DeploymentTarget) -> Self {
        Self::new(target.region.clone())
    }

    /// Fail when asked to realize `logical_id`.
    pub fn fail_on(self, logical_id: impl Into<String>, message: impl Into<String>) -> Self {
        *self.fail_on.write() = Some((logical_id.into(), message.into()));
        self
    }

    /// Leave `output` out of the outputs returned for `logical_id`.
    pub fn omit_output(self, logical_id: impl Into<String>, output: impl Into<String>) -> Self {
        self.omitted.write().push((logical_id.into(), output.into()));
        self
    }

    /// Nodes handed to the engine so far, in call order.
    pub fn calls(&self) -> Vec<ResolvedNode> {
        self.calls.read().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.read().len()
    }

    pub fn was_realized(&self, logical_id: &str) -> bool {
        self.calls.read().iter().any(|n| n.logical_id == logical_id)
    }

    fn next_id(&self, prefix: &str) -> String {
        let mut sequence = self.sequence.lock();
        *sequence += 1;
        format!("{}-{:08x}", prefix, *sequence)
    }

    fn check_failure(&self, node: &ResolvedNode) -> EngineResult<()> {
        if let Some((logical_id, message)) = self.fail_on.read().clone() {
            if logical_id == node.logical_id {
                return Err(EngineError::Failed { logical_id, message });
            }
        }
        Ok(())
    }

    fn subnet_ids(&self, node: &ResolvedNode) -> Value {
        let az_count = node
            .property("maxAzs")
            .and_then(Value::as_u64)
            .unwrap_or(DEFAULT_AZ_COUNT);

        let mut by_type: BTreeMap<&str, Vec<String>> = SubnetType::all()
            .iter()
            .map(|t| (t.as_str(), Vec::new()))
            .collect();

        let groups = node
            .property("subnetGroups")
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default();

        for group in groups {
            let provider_name = group.get("subnetType").and_then(Value::as_str);
            let Some(subnet_type) = SubnetType::all()
                .into_iter()
                .find(|t| Some(t.provider_name()) == provider_name)
            else {
                warn!("Skipping subnet group with unknown type in {}", node.logical_id);
                continue;
            };
            for _ in 0..az_count {
                let id = self.next_id("subnet");
                by_type.entry(subnet_type.as_str()).or_default().push(id);
            }
        }

        json!(by_type)
    }

    fn fabricate(&self, node: &ResolvedNode) -> OutputValues {
        let mut outputs = OutputValues::new();
        match node.kind {
            ResourceKind::Network => {
                outputs.insert("vpcId".into(), json!(self.next_id("vpc")));
                outputs.insert("subnetIdsByType".into(), self.subnet_ids(node));
            }
            ResourceKind::TransitGateway => {
                outputs.insert("transitGatewayId".into(), json!(self.next_id("tgw")));
            }
            ResourceKind::TransitGatewayAttachment => {
                outputs.insert("attachmentId".into(), json!(self.next_id("tgw-attach")));
            }
            ResourceKind::LogSink => {
                let name = node
                    .string_property("logGroupName")
                    .map(str::to_string)
                    .unwrap_or_else(|| self.next_id("log-group"));
                outputs.insert("logGroupName".into(), json!(name));
            }
            ResourceKind::Storage => {
                let name = node
                    .string_property("bucketName")
                    .map(str::to_string)
                    .unwrap_or_else(|| self.next_id("bucket"));
                outputs.insert("bucketName".into(), json!(name));
            }
            ResourceKind::ApiSurface => {
                let api_id = self.next_id("api");
                let stage = node.string_property("stageName").unwrap_or("prod");
                outputs.insert(
                    "apiUrl".into(),
                    json!(format!(
                        "https://{}.execute-api.{}.amazonaws.com/{}/",
                        api_id, self.region, stage
                    )),
                );
            }
            ResourceKind::Compute => {
                outputs.insert(
                    "instanceOutputs".into(),
                    json!({
                        "instanceId": self.next_id("i"),
                        "availabilityZone": format!("{}a", self.region),
                    }),
                );
            }
        }

        for (logical_id, output) in self.omitted.read().iter() {
            if *logical_id == node.logical_id {
                outputs.remove(output);
            }
        }
        outputs
    }
}

#[async_trait]
impl ProvisioningEngine for DryRunEngine {
    fn name(&self) -> &str {
        "dry-run"
    }

    async fn realize(&self, node: &ResolvedNode) -> EngineResult<OutputValues> {
        self.calls.write().push(node.clone());
        self.check_failure(node)?;

        let outputs = self.fabricate(node);
        debug!("Dry-run realized {} with {} outputs", node.logical_id, outputs.len());
        Ok(outputs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(logical_id: &str, kind: ResourceKind, properties: Value) -> ResolvedNode {
        let properties = properties
            .as_object()
            .map(|o| o.clone().into_iter().collect())
            .unwrap_or_default();
        ResolvedNode {
            logical_id: logical_id.to_string(),
            kind,
            properties,
        }
    }

    #[tokio::test]
    async fn test_network_outputs_follow_subnet_groups() {
        let engine = DryRunEngine::new("eu-west-1");
        let vpc = node(
            "Vpc-dev",
            ResourceKind::Network,
            json!({
                "maxAzs": 3,
                "subnetGroups": [
                    {"name": "dev-Public", "subnetType": "PUBLIC"},
                    {"name": "dev-Private", "subnetType": "PRIVATE_WITH_EGRESS"},
                ],
            }),
        );

        let outputs = engine.realize(&vpc).await.unwrap();
        assert_eq!(outputs["vpcId"], "vpc-00000001");
        let subnets = &outputs["subnetIdsByType"];
        assert_eq!(subnets["public"].as_array().unwrap().len(), 3);
        assert_eq!(subnets["private"].as_array().unwrap().len(), 3);
        assert!(subnets["isolated"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_outputs_are_deterministic() {
        let make = || node("Tgw", ResourceKind::TransitGateway, json!({}));
        let first = DryRunEngine::new("us-east-1").realize(&make()).await.unwrap();
        let second = DryRunEngine::new("us-east-1").realize(&make()).await.unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_api_url_uses_region_and_stage() {
        let engine = DryRunEngine::new("eu-central-1");
        let api = node("Api", ResourceKind::ApiSurface, json!({"stageName": "v1"}));
        let outputs = engine.realize(&api).await.unwrap();
        let url = outputs["apiUrl"].as_str().unwrap();
        assert!(url.contains("eu-central-1"));
        assert!(url.ends_with("/v1/"));
    }

    #[tokio::test]
    async fn test_failure_injection_records_call() {
        let engine = DryRunEngine::new("us-east-1").fail_on("Bucket", "quota exceeded");
        let bucket = node("Bucket", ResourceKind::Storage, json!({"bucketName": "b"}));

        let err = engine.realize(&bucket).await.unwrap_err();
        assert_eq!(
            err,
            EngineError::Failed {
                logical_id: "Bucket".into(),
                message: "quota exceeded".into()
            }
        );
        assert!(engine.was_realized("Bucket"));
    }

    #[tokio::test]
    async fn test_omitted_output() {
        let engine = DryRunEngine::new("us-east-1").omit_output("Log", "logGroupName");
        let log = node("Log", ResourceKind::LogSink, json!({"logGroupName": "/x"}));
        assert!(engine.realize(&log).await.unwrap().is_empty());
    }
}
