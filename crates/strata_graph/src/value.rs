//! Input values, references to produced outputs, and their resolution.
//!
//! A node input is either a concrete JSON value or a reference to an output
//! another node will produce. References stay symbolic while the graph is
//! described and ordered; they are replaced with concrete values only after
//! the referenced node has been realized.

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ResolutionError;

/// Concrete outputs of one realized node.
pub type OutputValues = BTreeMap<String, Value>;

/// Pointer to an output of another node, optionally narrowed to one field of
/// a map-valued output.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutputRef {
    pub logical_id: String,
    pub output: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

impl OutputRef {
    pub fn new(logical_id: impl Into<String>, output: impl Into<String>) -> Self {
        Self {
            logical_id: logical_id.into(),
            output: output.into(),
            field: None,
        }
    }

    pub fn field(mut self, field: impl Into<String>) -> Self {
        self.field = Some(field.into());
        self
    }

    /// Symbolic form, e.g. `${Vpc-dev.subnetIdsByType.private}`.
    pub fn token(&self) -> String {
        match &self.field {
            Some(field) => format!("${{{}.{}.{}}}", self.logical_id, self.output, field),
            None => format!("${{{}.{}}}", self.logical_id, self.output),
        }
    }
}

impl fmt::Display for OutputRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.token())
    }
}

/// A node input: a literal, a reference, or a composition of both.
#[derive(Debug, Clone, PartialEq)]
pub enum InputValue {
    Literal(Value),
    Reference(OutputRef),
    List(Vec<InputValue>),
    Map(BTreeMap<String, InputValue>),
    /// String concatenation; list-valued parts are flattened.
    Join {
        separator: String,
        parts: Vec<InputValue>,
    },
}

impl InputValue {
    pub fn literal(value: impl Into<Value>) -> Self {
        InputValue::Literal(value.into())
    }

    pub fn reference(logical_id: impl Into<String>, output: impl Into<String>) -> Self {
        InputValue::Reference(OutputRef::new(logical_id, output))
    }

    pub fn join(separator: impl Into<String>, parts: Vec<InputValue>) -> Self {
        InputValue::Join {
            separator: separator.into(),
            parts,
        }
    }

    pub fn map<K: Into<String>>(entries: impl IntoIterator<Item = (K, InputValue)>) -> Self {
        InputValue::Map(entries.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    /// `true` when the value carries no information (a literal null).
    pub fn is_unbound(&self) -> bool {
        matches!(self, InputValue::Literal(Value::Null))
    }

    /// Every reference in this value, depth first.
    pub fn references(&self) -> Vec<&OutputRef> {
        let mut refs = Vec::new();
        self.collect_references(&mut refs);
        refs
    }

    fn collect_references<'a>(&'a self, refs: &mut Vec<&'a OutputRef>) {
        match self {
            InputValue::Literal(_) => {}
            InputValue::Reference(r) => refs.push(r),
            InputValue::List(items) => items.iter().for_each(|i| i.collect_references(refs)),
            InputValue::Map(entries) => entries.values().for_each(|v| v.collect_references(refs)),
            InputValue::Join { parts, .. } => parts.iter().for_each(|p| p.collect_references(refs)),
        }
    }

    /// Render with references as tokens. Deterministic for identical input.
    pub fn to_symbolic(&self) -> Value {
        match self {
            InputValue::Literal(v) => v.clone(),
            InputValue::Reference(r) => Value::String(r.token()),
            InputValue::List(items) => Value::Array(items.iter().map(|i| i.to_symbolic()).collect()),
            InputValue::Map(entries) => Value::Object(
                entries
                    .iter()
                    .map(|(k, v)| (k.clone(), v.to_symbolic()))
                    .collect(),
            ),
            InputValue::Join { separator, parts } => Value::String(
                parts
                    .iter()
                    .map(|p| value_to_string(&p.to_symbolic()))
                    .collect::<Vec<_>>()
                    .join(separator),
            ),
        }
    }

    /// Replace every reference with the concrete value from `table`.
    pub fn resolve(&self, table: &OutputTable) -> Result<Value, ResolutionError> {
        match self {
            InputValue::Literal(v) => Ok(v.clone()),
            InputValue::Reference(r) => table.lookup(r).cloned(),
            InputValue::List(items) => items
                .iter()
                .map(|i| i.resolve(table))
                .collect::<Result<Vec<_>, _>>()
                .map(Value::Array),
            InputValue::Map(entries) => {
                let mut object = serde_json::Map::new();
                for (key, value) in entries {
                    object.insert(key.clone(), value.resolve(table)?);
                }
                Ok(Value::Object(object))
            }
            InputValue::Join { separator, parts } => {
                let mut pieces = Vec::new();
                for part in parts {
                    let resolved = part.resolve(table)?;
                    match resolved {
                        Value::Array(items) => {
                            for item in items {
                                pieces.push(scalar_to_string(&item, &part.to_symbolic())?);
                            }
                        }
                        other => pieces.push(scalar_to_string(&other, &part.to_symbolic())?),
                    }
                }
                Ok(Value::String(pieces.join(separator)))
            }
        }
    }
}

impl From<&str> for InputValue {
    fn from(value: &str) -> Self {
        InputValue::Literal(Value::String(value.to_string()))
    }
}

impl From<String> for InputValue {
    fn from(value: String) -> Self {
        InputValue::Literal(Value::String(value))
    }
}

impl From<bool> for InputValue {
    fn from(value: bool) -> Self {
        InputValue::Literal(Value::Bool(value))
    }
}

impl From<u32> for InputValue {
    fn from(value: u32) -> Self {
        InputValue::Literal(Value::from(value))
    }
}

impl From<Value> for InputValue {
    fn from(value: Value) -> Self {
        InputValue::Literal(value)
    }
}

impl From<OutputRef> for InputValue {
    fn from(value: OutputRef) -> Self {
        InputValue::Reference(value)
    }
}

impl From<Vec<InputValue>> for InputValue {
    fn from(value: Vec<InputValue>) -> Self {
        InputValue::List(value)
    }
}

/// String form used for export values: lists are comma-joined.
pub fn value_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Array(items) => items.iter().map(value_to_string).collect::<Vec<_>>().join(","),
        other => other.to_string(),
    }
}

fn scalar_to_string(value: &Value, context: &Value) -> Result<String, ResolutionError> {
    match value {
        Value::String(s) => Ok(s.clone()),
        Value::Number(n) => Ok(n.to_string()),
        Value::Bool(b) => Ok(b.to_string()),
        _ => Err(ResolutionError::NotJoinable(value_to_string(context))),
    }
}

/// Outputs of realized nodes, keyed by logical id.
#[derive(Debug, Clone, Default)]
pub struct OutputTable {
    outputs: HashMap<String, OutputValues>,
}

impl OutputTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, logical_id: impl Into<String>, outputs: OutputValues) {
        self.outputs.insert(logical_id.into(), outputs);
    }

    pub fn get(&self, logical_id: &str) -> Option<&OutputValues> {
        self.outputs.get(logical_id)
    }

    pub fn contains(&self, logical_id: &str) -> bool {
        self.outputs.contains_key(logical_id)
    }

    pub fn lookup(&self, reference: &OutputRef) -> Result<&Value, ResolutionError> {
        let outputs = self
            .outputs
            .get(&reference.logical_id)
            .ok_or_else(|| ResolutionError::NotRealized(reference.logical_id.clone()))?;

        let value = outputs
            .get(&reference.output)
            .ok_or_else(|| ResolutionError::MissingOutput {
                logical_id: reference.logical_id.clone(),
                output: reference.output.clone(),
            })?;

        match &reference.field {
            None => Ok(value),
            Some(field) => value.get(field).ok_or_else(|| ResolutionError::MissingField {
                logical_id: reference.logical_id.clone(),
                output: reference.output.clone(),
                field: field.clone(),
            }),
        }
    }
}
