//! Resource nodes.

use std::collections::{BTreeMap, BTreeSet};

use serde_json::Value;

use crate::error::{CompositionError, CompositionResult};
use crate::kind::ResourceKind;
use crate::value::{InputValue, OutputRef};

/// An export a node asks to publish once it is realized.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportRequest {
    pub name: String,
    pub value: InputValue,
}

/// One resource in the composition graph.
#[derive(Debug, Clone, PartialEq)]
pub struct ResourceNode {
    pub logical_id: String,
    pub kind: ResourceKind,
    pub inputs: BTreeMap<String, InputValue>,
    /// Explicit ordering edges in addition to those implied by references.
    pub depends_on: BTreeSet<String>,
    pub exports: Vec<ExportRequest>,
}

impl ResourceNode {
    pub fn new(logical_id: impl Into<String>, kind: ResourceKind) -> Self {
        Self {
            logical_id: logical_id.into(),
            kind,
            inputs: BTreeMap::new(),
            depends_on: BTreeSet::new(),
            exports: Vec::new(),
        }
    }

    pub fn with_input(mut self, name: impl Into<String>, value: impl Into<InputValue>) -> Self {
        self.inputs.insert(name.into(), value.into());
        self
    }

    pub fn with_dependency(mut self, logical_id: impl Into<String>) -> Self {
        self.depends_on.insert(logical_id.into());
        self
    }

    pub fn with_export(mut self, name: impl Into<String>, value: impl Into<InputValue>) -> Self {
        self.exports.push(ExportRequest {
            name: name.into(),
            value: value.into(),
        });
        self
    }

    /// Reference to one of this node's outputs.
    pub fn output(&self, output: &str) -> OutputRef {
        OutputRef::new(self.logical_id.clone(), output)
    }

    pub fn produced_outputs(&self) -> &'static [&'static str] {
        self.kind.produced_outputs()
    }

    /// `(input name, reference)` pairs across all inputs and exports.
    pub fn references(&self) -> Vec<(&str, &OutputRef)> {
        let inputs = self
            .inputs
            .iter()
            .flat_map(|(name, value)| value.references().into_iter().map(move |r| (name.as_str(), r)));
        let exports = self
            .exports
            .iter()
            .flat_map(|e| e.value.references().into_iter().map(move |r| (e.name.as_str(), r)));
        inputs.chain(exports).collect()
    }

    /// Every logical id this node must come after.
    ///
    /// Exports of the node's own outputs are published after it is realized,
    /// so they never order the node against itself.
    pub fn dependencies(&self) -> BTreeSet<String> {
        let mut deps = self.depends_on.clone();
        for value in self.inputs.values() {
            deps.extend(value.references().into_iter().map(|r| r.logical_id.clone()));
        }
        for export in &self.exports {
            deps.extend(
                export
                    .value
                    .references()
                    .into_iter()
                    .filter(|r| r.logical_id != self.logical_id)
                    .map(|r| r.logical_id.clone()),
            );
        }
        deps
    }

    /// Fails on the first required input that is missing or null.
    pub fn check_bound(&self) -> CompositionResult<()> {
        for input in self.kind.required_inputs() {
            let bound = self.inputs.get(*input).is_some_and(|v| !v.is_unbound());
            if !bound {
                return Err(CompositionError::UnboundInput {
                    node: self.logical_id.clone(),
                    kind: self.kind.to_string(),
                    input: input.to_string(),
                });
            }
        }
        Ok(())
    }

    /// Inputs with references rendered as tokens.
    pub fn symbolic_inputs(&self) -> BTreeMap<String, Value> {
        self.inputs
            .iter()
            .map(|(k, v)| (k.clone(), v.to_symbolic()))
            .collect()
    }
}
