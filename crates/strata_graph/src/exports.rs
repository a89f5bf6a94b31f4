//! Export registry.
//!
//! Exports are named values published for other stacks to consume. Names are
//! unique within an environment scope and the first registration wins.
//! During composition values hold reference tokens such as
//! `${Vpc-dev.vpcId}`; [`ExportRegistry::resolve`] swaps them for the
//! concrete outputs of realized nodes.

use std::collections::HashMap;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use strata_config::EnvironmentName;

use crate::error::{DuplicateExportError, ResolutionError};
use crate::value::{value_to_string, OutputRef, OutputTable};

/// A named, scoped output value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Export {
    pub name: String,
    pub value: String,
    pub scope: EnvironmentName,
}

impl Export {
    pub fn new(name: impl Into<String>, value: impl Into<String>, scope: EnvironmentName) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            scope,
        }
    }
}

/// Per-run collection of exports, kept in registration order.
#[derive(Debug, Clone, Default)]
pub struct ExportRegistry {
    exports: Vec<Export>,
    index: HashMap<(EnvironmentName, String), usize>,
}

impl ExportRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an export. A name already taken in the same scope is rejected
    /// and the existing value is kept.
    pub fn register(&mut self, export: Export) -> Result<(), DuplicateExportError> {
        let key = (export.scope, export.name.clone());
        if let Some(&existing) = self.index.get(&key) {
            let existing = &self.exports[existing];
            warn!(
                "Rejecting duplicate export {} in scope {}",
                export.name, export.scope
            );
            return Err(DuplicateExportError {
                name: export.name,
                scope: export.scope,
                existing_value: existing.value.clone(),
                rejected_value: export.value,
            });
        }

        debug!("Registered export {} = {}", export.name, export.value);
        self.index.insert(key, self.exports.len());
        self.exports.push(export);
        Ok(())
    }

    pub fn get(&self, scope: EnvironmentName, name: &str) -> Option<&Export> {
        self.index
            .get(&(scope, name.to_string()))
            .map(|&i| &self.exports[i])
    }

    /// Copy of all exports in registration order.
    pub fn snapshot(&self) -> Vec<Export> {
        self.exports.clone()
    }

    pub fn len(&self) -> usize {
        self.exports.len()
    }

    pub fn is_empty(&self) -> bool {
        self.exports.is_empty()
    }

    /// Pretty JSON of the snapshot. Identical registries give identical bytes.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&self.exports)
    }

    /// A new registry with every reference token replaced by its realized value.
    pub fn resolve(&self, outputs: &OutputTable) -> Result<ExportRegistry, ResolutionError> {
        let mut resolved = ExportRegistry::new();
        for export in &self.exports {
            let value = substitute_tokens(&export.value, outputs)?;
            // names were unique on the way in, so registration cannot collide
            let key = (export.scope, export.name.clone());
            resolved.index.insert(key, resolved.exports.len());
            resolved
                .exports
                .push(Export::new(export.name.clone(), value, export.scope));
        }
        Ok(resolved)
    }
}

fn token_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"\$\{([A-Za-z0-9_-]+)\.([A-Za-z0-9_]+)(?:\.([A-Za-z0-9_]+))?\}")
            .expect("reference token grammar is a valid regex")
    })
}

fn substitute_tokens(value: &str, outputs: &OutputTable) -> Result<String, ResolutionError> {
    let mut result = String::with_capacity(value.len());
    let mut last = 0;

    for caps in token_pattern().captures_iter(value) {
        let Some(whole) = caps.get(0) else { continue };
        let mut reference = OutputRef::new(&caps[1], &caps[2]);
        if let Some(field) = caps.get(3) {
            reference = reference.field(field.as_str());
        }

        result.push_str(&value[last..whole.start()]);
        result.push_str(&value_to_string(outputs.lookup(&reference)?));
        last = whole.end();
    }

    result.push_str(&value[last..]);
    Ok(result)
}
