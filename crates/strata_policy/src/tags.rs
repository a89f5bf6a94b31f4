//! Tag layering.
//!
//! Tags are merged from least to most specific: stack tags, then resource
//! tags. Policy default tags are applied last and cannot be overridden.

use tracing::warn;

use strata_config::Tags;

use crate::bundle::PolicyBundle;

impl PolicyBundle {
    /// Merge stack-wide and resource tags under this policy.
    pub fn tags_for(&self, stack: &Tags, resource: &Tags) -> Tags {
        let mut merged = stack.clone();
        merged.extend(resource.iter().map(|(k, v)| (k.clone(), v.clone())));

        for (key, value) in &self.default_tags {
            if let Some(previous) = merged.insert(key.clone(), value.clone()) {
                if &previous != value {
                    warn!(
                        "Tag '{}' = '{}' is reserved by policy; using '{}'",
                        key, previous, value
                    );
                }
            }
        }

        merged
    }
}
