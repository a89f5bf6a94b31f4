//! Provisioning engine boundary.

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use strata_graph::{OutputValues, ResourceKind};

use crate::error::EngineResult;

/// A node with every reference replaced by a concrete value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedNode {
    pub logical_id: String,
    pub kind: ResourceKind,
    pub properties: BTreeMap<String, Value>,
}

impl ResolvedNode {
    pub fn property(&self, name: &str) -> Option<&Value> {
        self.properties.get(name)
    }

    pub fn string_property(&self, name: &str) -> Option<&str> {
        self.properties.get(name).and_then(Value::as_str)
    }
}

/// Turns resolved node descriptions into real resources.
///
/// Nodes are handed over one at a time, in plan order. The returned map must
/// contain every output the node's kind declares.
#[async_trait]
pub trait ProvisioningEngine: Send + Sync {
    /// Engine name, recorded in deployment reports.
    fn name(&self) -> &str;

    /// Create or update the resource described by `node`.
    async fn realize(&self, node: &ResolvedNode) -> EngineResult<OutputValues>;
}
