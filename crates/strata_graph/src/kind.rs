//! Resource kinds and their input/output contracts.

use serde::{Deserialize, Serialize};

/// The kinds of resource a stack is composed of.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ResourceKind {
    Network,
    TransitGateway,
    TransitGatewayAttachment,
    LogSink,
    Storage,
    ApiSurface,
    Compute,
}

impl ResourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceKind::Network => "network",
            ResourceKind::TransitGateway => "transitGateway",
            ResourceKind::TransitGatewayAttachment => "transitGatewayAttachment",
            ResourceKind::LogSink => "logSink",
            ResourceKind::Storage => "storage",
            ResourceKind::ApiSurface => "apiSurface",
            ResourceKind::Compute => "compute",
        }
    }

    pub fn all() -> [Self; 7] {
        [
            ResourceKind::Network,
            ResourceKind::TransitGateway,
            ResourceKind::TransitGatewayAttachment,
            ResourceKind::LogSink,
            ResourceKind::Storage,
            ResourceKind::ApiSurface,
            ResourceKind::Compute,
        ]
    }

    /// Inputs that must be bound before a node of this kind is admitted.
    pub fn required_inputs(&self) -> &'static [&'static str] {
        match self {
            ResourceKind::Network => &["envName", "cidr", "maxAzs", "natGateways", "subnetGroups"],
            ResourceKind::TransitGateway => &["envName", "asn", "tags"],
            ResourceKind::TransitGatewayAttachment => {
                &["vpcId", "transitGatewayId", "privateSubnetIds", "envName"]
            }
            ResourceKind::LogSink => &["envName", "retentionDays", "retain"],
            ResourceKind::Storage => &["envName", "retain", "autoDelete"],
            ResourceKind::ApiSurface => &["envName", "storageBucketName"],
            ResourceKind::Compute => &["envName", "vpcId"],
        }
    }

    /// Outputs the provisioning engine returns once a node is realized.
    pub fn produced_outputs(&self) -> &'static [&'static str] {
        match self {
            ResourceKind::Network => &["vpcId", "subnetIdsByType"],
            ResourceKind::TransitGateway => &["transitGatewayId"],
            ResourceKind::TransitGatewayAttachment => &["attachmentId"],
            ResourceKind::LogSink => &["logGroupName"],
            ResourceKind::Storage => &["bucketName"],
            ResourceKind::ApiSurface => &["apiUrl"],
            ResourceKind::Compute => &["instanceOutputs"],
        }
    }

    pub fn produces(&self, output: &str) -> bool {
        self.produced_outputs().contains(&output)
    }
}

impl std::fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attachment_contract() {
        let kind = ResourceKind::TransitGatewayAttachment;
        assert!(kind.required_inputs().contains(&"vpcId"));
        assert!(kind.required_inputs().contains(&"privateSubnetIds"));
        assert!(kind.produces("attachmentId"));
        assert!(!kind.produces("vpcId"));
    }

    #[test]
    fn test_every_kind_produces_something() {
        for kind in ResourceKind::all() {
            assert!(!kind.produced_outputs().is_empty(), "{}", kind);
            assert!(kind.required_inputs().contains(&"envName") || kind == ResourceKind::TransitGatewayAttachment);
        }
    }
}
