//! Code mappings: which type, and which constructor arguments, build a parameter

use crate::parameters::{DesignSpace, ParamStore};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{debug, warn};

/// The code mapping of one parameter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CodeMapping {
    /// Fully qualified id of the mapped parameter
    pub id: String,

    /// Name of the registered type that implements the parameter
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub component: Option<String>,

    /// Whitespace-separated formal argument identifiers
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub constructor: Option<String>,
}

impl CodeMapping {
    pub fn new(id: &str, component: &str) -> Self {
        Self {
            id: id.to_string(),
            component: Some(component.to_string()),
            constructor: None,
        }
    }

    /// A mapping that names no type
    pub fn without_component(id: &str) -> Self {
        Self {
            id: id.to_string(),
            component: None,
            constructor: None,
        }
    }

    pub fn with_constructor(mut self, constructor: &str) -> Self {
        self.constructor = Some(constructor.to_string());
        self
    }

    pub fn component(&self) -> Option<&str> {
        self.component.as_deref()
    }

    /// The explicit formal argument identifiers, if the mapping lists any
    pub fn formal_ids(&self) -> Option<Vec<String>> {
        self.constructor
            .as_deref()
            .map(|c| c.split_whitespace().map(str::to_string).collect())
    }
}

/// All code mappings of a design space, by parameter id
///
/// Serialized as a list of [`CodeMapping`]s.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<CodeMapping>", into = "Vec<CodeMapping>")]
pub struct CodeMappings {
    mappings: HashMap<String, CodeMapping>,
}

impl CodeMappings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_json_str(json: &str) -> Result<Self, crate::error::SpaceError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Add a mapping, returning the one it replaces
    pub fn insert(&mut self, mapping: CodeMapping) -> Option<CodeMapping> {
        self.mappings.insert(mapping.id.clone(), mapping)
    }

    pub fn with(mut self, mapping: CodeMapping) -> Self {
        self.insert(mapping);
        self
    }

    pub fn get(&self, id: &str) -> Option<&CodeMapping> {
        self.mappings.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.mappings.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.mappings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mappings.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &CodeMapping> {
        self.mappings.values()
    }

    /// Record each mapped type name on its parameter, so that parameters referencing
    /// it as a constructor argument know its type.
    ///
    /// Mappings for unknown parameters are skipped. Returns the number of stamped nodes.
    pub fn apply_to(&self, space: &mut DesignSpace) -> usize {
        let mut applied = 0;
        for mapping in self.mappings.values() {
            let Some(component) = mapping.component() else {
                continue;
            };
            let handle = space.get_param(&mapping.id).map(|node| node.handle());
            match handle.and_then(|h| space.node_mut(h)) {
                Some(node) => {
                    node.set_class(Some(component.to_string()));
                    applied += 1;
                }
                None => warn!(param = %mapping.id, "code mapping for unknown parameter"),
            }
        }
        debug!(mappings = self.len(), applied, "applied code mappings");
        applied
    }
}

impl From<Vec<CodeMapping>> for CodeMappings {
    fn from(mappings: Vec<CodeMapping>) -> Self {
        let mut result = Self::new();
        for mapping in mappings {
            result.insert(mapping);
        }
        result
    }
}

impl From<CodeMappings> for Vec<CodeMapping> {
    fn from(mappings: CodeMappings) -> Self {
        let mut list: Vec<CodeMapping> = mappings.mappings.into_values().collect();
        list.sort_by(|a, b| a.id.cmp(&b.id));
        list
    }
}
