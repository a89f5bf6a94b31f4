//! Composition graph and execution plans.
//!
//! Nodes are admitted one at a time; admission rejects duplicate logical ids
//! and unbound required inputs. Ordering validates every reference, then runs
//! Kahn's algorithm with ready nodes taken lowest declaration index first, so
//! the same declarations always yield the same plan.

use std::cmp::Reverse;
use std::collections::{BTreeMap, BinaryHeap, HashMap};

use petgraph::algo::tarjan_scc;
use petgraph::graphmap::DiGraphMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info};

use strata_config::{EnvironmentName, ValidatedConfig};
use strata_policy::PolicyBundle;

use crate::error::{CompositionError, CompositionResult, DuplicateExportError};
use crate::exports::{Export, ExportRegistry};
use crate::kind::ResourceKind;
use crate::node::ResourceNode;
use crate::resources::StackDefinition;
use crate::value::value_to_string;

/// Resource nodes and the dependency edges between them.
#[derive(Debug, Clone, Default)]
pub struct CompositionGraph {
    nodes: Vec<ResourceNode>,
    index: HashMap<String, usize>,
}

impl CompositionGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare and order the full stack for a validated configuration.
    pub fn build(config: &ValidatedConfig, policy: &PolicyBundle) -> CompositionResult<ExecutionPlan> {
        let mut graph = Self::new();
        for node in StackDefinition::new(config, policy).declare() {
            graph.add(node)?;
        }
        let plan = graph.order()?;
        info!(
            "Composed {} nodes for {}: {}",
            plan.len(),
            config.env,
            plan.logical_ids().join(" -> ")
        );
        Ok(plan)
    }

    /// Admit a node. Its references are checked when the graph is ordered.
    pub fn add(&mut self, node: ResourceNode) -> CompositionResult<()> {
        if self.index.contains_key(&node.logical_id) {
            return Err(CompositionError::DuplicateLogicalId(node.logical_id));
        }
        node.check_bound()?;

        debug!("Admitted {} node {}", node.kind, node.logical_id);
        self.index.insert(node.logical_id.clone(), self.nodes.len());
        self.nodes.push(node);
        Ok(())
    }

    /// Nodes in declaration order.
    pub fn nodes(&self) -> &[ResourceNode] {
        &self.nodes
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    fn check_references(&self) -> CompositionResult<()> {
        for node in &self.nodes {
            for (input, reference) in node.references() {
                let reason = match self.index.get(&reference.logical_id) {
                    None => Some("no node with that logical id".to_string()),
                    Some(&target) => {
                        let kind = self.nodes[target].kind;
                        if kind.produces(&reference.output) {
                            None
                        } else {
                            Some(format!("{} nodes do not produce it", kind))
                        }
                    }
                };

                if let Some(reason) = reason {
                    return Err(CompositionError::UnresolvedReference {
                        node: node.logical_id.clone(),
                        input: input.to_string(),
                        target: reference.logical_id.clone(),
                        output: reference.output.clone(),
                        reason,
                    });
                }
            }

            if let Some(target) = node.depends_on.iter().find(|d| !self.index.contains_key(*d)) {
                return Err(CompositionError::UnknownDependency {
                    node: node.logical_id.clone(),
                    target: target.clone(),
                });
            }
        }
        Ok(())
    }

    /// `(dependency, dependent)` index pairs.
    fn edges(&self) -> Vec<(usize, usize)> {
        let mut edges = Vec::new();
        for (i, node) in self.nodes.iter().enumerate() {
            for dep in node.dependencies() {
                if let Some(&j) = self.index.get(&dep) {
                    edges.push((j, i));
                }
            }
        }
        edges
    }

    /// Topologically order the admitted nodes.
    pub fn order(&self) -> CompositionResult<ExecutionPlan> {
        self.check_references()?;

        let edges = self.edges();
        let mut in_degree = vec![0usize; self.nodes.len()];
        let mut dependents: Vec<Vec<usize>> = vec![Vec::new(); self.nodes.len()];
        for &(from, to) in &edges {
            in_degree[to] += 1;
            dependents[from].push(to);
        }

        let mut ready: BinaryHeap<Reverse<usize>> = in_degree
            .iter()
            .enumerate()
            .filter(|(_, d)| **d == 0)
            .map(|(i, _)| Reverse(i))
            .collect();

        let mut ordered = Vec::with_capacity(self.nodes.len());
        while let Some(Reverse(i)) = ready.pop() {
            ordered.push(i);
            for &next in &dependents[i] {
                in_degree[next] -= 1;
                if in_degree[next] == 0 {
                    ready.push(Reverse(next));
                }
            }
        }

        if ordered.len() < self.nodes.len() {
            return Err(CompositionError::CyclicDependency {
                ids: self.cycle_members(&edges),
            });
        }

        debug!("Ordered {} nodes", ordered.len());
        Ok(ExecutionPlan {
            nodes: ordered.into_iter().map(|i| self.nodes[i].clone()).collect(),
        })
    }

    /// Logical ids on a cycle, in declaration order.
    fn cycle_members(&self, edges: &[(usize, usize)]) -> Vec<String> {
        let mut graph = DiGraphMap::<usize, ()>::new();
        for i in 0..self.nodes.len() {
            graph.add_node(i);
        }
        for &(from, to) in edges {
            graph.add_edge(from, to, ());
        }

        let mut members: Vec<usize> = tarjan_scc(&graph)
            .into_iter()
            .filter(|scc| scc.len() > 1 || graph.contains_edge(scc[0], scc[0]))
            .flatten()
            .collect();
        members.sort_unstable();

        members
            .into_iter()
            .map(|i| self.nodes[i].logical_id.clone())
            .collect()
    }
}

/// Nodes in realization order.
#[derive(Debug, Clone, PartialEq)]
pub struct ExecutionPlan {
    nodes: Vec<ResourceNode>,
}

impl ExecutionPlan {
    pub fn nodes(&self) -> &[ResourceNode] {
        &self.nodes
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn position(&self, logical_id: &str) -> Option<usize> {
        self.nodes.iter().position(|n| n.logical_id == logical_id)
    }

    pub fn logical_ids(&self) -> Vec<String> {
        self.nodes.iter().map(|n| n.logical_id.clone()).collect()
    }

    /// Register every requested export, in plan order, with symbolic values.
    pub fn register_exports(
        &self,
        scope: EnvironmentName,
        registry: &mut ExportRegistry,
    ) -> Result<(), DuplicateExportError> {
        for node in &self.nodes {
            for request in &node.exports {
                let value = value_to_string(&request.value.to_symbolic());
                registry.register(Export::new(request.name.clone(), value, scope))?;
            }
        }
        Ok(())
    }

    pub fn to_document(&self) -> PlanDocument {
        PlanDocument {
            nodes: self
                .nodes
                .iter()
                .enumerate()
                .map(|(position, node)| PlanEntry {
                    position,
                    logical_id: node.logical_id.clone(),
                    kind: node.kind,
                    depends_on: node.dependencies().into_iter().collect(),
                    inputs: node.symbolic_inputs(),
                    produced_outputs: node.produced_outputs().iter().map(|o| o.to_string()).collect(),
                    exports: node.exports.iter().map(|e| e.name.clone()).collect(),
                })
                .collect(),
        }
    }
}

/// Serializable form of an [`ExecutionPlan`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanDocument {
    pub nodes: Vec<PlanEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanEntry {
    pub position: usize,
    pub logical_id: String,
    pub kind: ResourceKind,
    pub depends_on: Vec<String>,
    pub inputs: BTreeMap<String, Value>,
    pub produced_outputs: Vec<String>,
    pub exports: Vec<String>,
}

impl PlanDocument {
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
