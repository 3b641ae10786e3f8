//! Design space: the parameter tree and its lookup service
//!
//! A [`DesignSpace`] owns every [`ParamNode`] of one parameter space in an arena. It is
//! built from pre-parsed [`ParamDecl`] descriptors, linked once, and then answers
//! lookups through the [`ParamStore`] trait, which is all the constructor resolver
//! needs to know about parameters.

use crate::parameters::bounds::{BoundExprs, BoundKind, Bounds, BoundsError};
use crate::parameters::config::LinkConfig;
use crate::parameters::expression::{EvaluationContext, Expression, ExpressionError};
use crate::parameters::linker;
use crate::parameters::node::{NodeId, ParamKind, ParamNode};
use crate::parameters::numeric::Numeric;
use crate::parameters::order::EvaluationOrder;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;
use tracing::{debug, trace};

/// Errors that can occur when building, linking or ordering a design space
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParamError {
    #[error("Parameter '{id}' is declared more than once")]
    DuplicateId { id: String },

    #[error("Parameter '{id}' not found")]
    ParameterNotFound { id: String },

    #[error("Unknown node handle {handle}")]
    UnknownNode { handle: NodeId },

    #[error("Circular dependency between parameters: {}", .cycle.join(" -> "))]
    CircularDependency { cycle: Vec<String> },

    #[error("Cannot evaluate {kind} of parameter '{id}': {source}")]
    BoundEvaluation {
        id: String,
        kind: BoundKind,
        #[source]
        source: ExpressionError,
    },

    #[error("Invalid bounds for parameter '{id}': {source}")]
    InvalidBounds {
        id: String,
        #[source]
        source: BoundsError,
    },
}

/// Lookup service over the parameters of one design space.
pub trait ParamStore {
    /// Check whether a parameter with this (fully qualified) id exists
    fn contains_param(&self, id: &str) -> bool;

    /// Look up a parameter by its fully qualified id
    fn get_param(&self, id: &str) -> Option<&ParamNode>;

    /// Look up a parameter by an id relative to `context`: a child of `context`, or a
    /// child of any of its ancestors (which covers siblings).
    fn get_param_for_local_id(&self, local_id: &str, context: &ParamNode) -> Option<&ParamNode>;

    /// The parent of a node, if it is not a root
    fn parent(&self, node: &ParamNode) -> Option<&ParamNode>;
}

/// A pre-parsed parameter declaration
///
/// Child ids are relative; the space qualifies them as `parent.child`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParamDecl {
    pub id: String,

    pub kind: ParamKind,

    #[serde(flatten)]
    pub bounds: BoundExprs,

    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub class: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<ParamDecl>,
}

impl ParamDecl {
    pub fn new(id: &str, kind: ParamKind) -> Self {
        Self {
            id: id.to_string(),
            kind,
            bounds: BoundExprs::new(),
            class: None,
            children: Vec::new(),
        }
    }

    /// A numeric parameter
    pub fn numeric(id: &str, numeric: Numeric) -> Self {
        Self::new(id, ParamKind::Numeric(numeric))
    }

    /// A structured parameter
    pub fn structured(id: &str) -> Self {
        Self::new(id, ParamKind::Structured)
    }

    /// A choice variant (only meaningful as a child)
    pub fn choice(id: &str) -> Self {
        Self::new(id, ParamKind::Choice)
    }

    pub fn with_bound(mut self, kind: BoundKind, expr: &str) -> Self {
        self.bounds.set(kind, Some(expr));
        self
    }

    pub fn incl_min(self, expr: &str) -> Self {
        self.with_bound(BoundKind::InclMin, expr)
    }

    pub fn excl_min(self, expr: &str) -> Self {
        self.with_bound(BoundKind::ExclMin, expr)
    }

    pub fn incl_max(self, expr: &str) -> Self {
        self.with_bound(BoundKind::InclMax, expr)
    }

    pub fn excl_max(self, expr: &str) -> Self {
        self.with_bound(BoundKind::ExclMax, expr)
    }

    pub fn with_class(mut self, class: &str) -> Self {
        self.class = Some(class.to_string());
        self
    }

    pub fn with_child(mut self, child: ParamDecl) -> Self {
        self.children.push(child);
        self
    }
}

/// All parameters of one design space
#[derive(Debug, Clone, Default)]
pub struct DesignSpace {
    nodes: Vec<ParamNode>,
    index: HashMap<String, NodeId>,
    roots: Vec<NodeId>,
    config: LinkConfig,
}

impl DesignSpace {
    /// Create an empty space with the default link configuration
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: LinkConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// Build and link a space from top-level declarations
    ///
    /// # Examples
    ///
    /// ```
    /// use dspace_rs::parameters::{DesignSpace, Numeric, ParamDecl};
    ///
    /// let space = DesignSpace::from_decls(vec![
    ///     ParamDecl::numeric("size", Numeric::Integer).incl_min("1").incl_max("100"),
    ///     ParamDecl::numeric("elite", Numeric::Integer).incl_min("0").incl_max("size"),
    /// ])
    /// .unwrap();
    ///
    /// let order: Vec<_> = space.evaluation_order().unwrap()
    ///     .into_iter()
    ///     .map(|h| space.node(h).unwrap().id().to_string())
    ///     .collect();
    /// assert_eq!(order, vec!["size", "elite"]);
    /// ```
    pub fn from_decls(decls: Vec<ParamDecl>) -> Result<Self, ParamError> {
        Self::from_decls_with_config(decls, LinkConfig::default())
    }

    pub fn from_decls_with_config(
        decls: Vec<ParamDecl>,
        config: LinkConfig,
    ) -> Result<Self, ParamError> {
        let mut space = Self::with_config(config);
        for decl in decls {
            space.add(decl)?;
        }
        space.link()?;
        Ok(space)
    }

    /// Parse top-level declarations from JSON and build a linked space
    pub fn from_json_str(json: &str) -> Result<Self, crate::error::SpaceError> {
        let decls: Vec<ParamDecl> = serde_json::from_str(json)?;
        Ok(Self::from_decls(decls)?)
    }

    pub fn config(&self) -> &LinkConfig {
        &self.config
    }

    /// Add a top-level declaration (with its children)
    pub fn add(&mut self, decl: ParamDecl) -> Result<NodeId, ParamError> {
        let handle = self.insert_subtree(decl, None)?;
        self.roots.push(handle);
        Ok(handle)
    }

    /// Add a declaration below an existing node
    pub fn add_child(&mut self, parent: NodeId, decl: ParamDecl) -> Result<NodeId, ParamError> {
        if parent.0 >= self.nodes.len() {
            return Err(ParamError::UnknownNode { handle: parent });
        }
        let handle = self.insert_subtree(decl, Some(parent))?;
        self.nodes[parent.0].push_child(handle);
        Ok(handle)
    }

    /// Insert a declaration tree, leaving the space untouched if any id is taken
    fn insert_subtree(
        &mut self,
        decl: ParamDecl,
        parent: Option<NodeId>,
    ) -> Result<NodeId, ParamError> {
        let mark = self.nodes.len();
        match self.insert(decl, parent) {
            Ok(handle) => Ok(handle),
            Err(err) => {
                for node in self.nodes.drain(mark..) {
                    self.index.remove(node.id());
                }
                Err(err)
            }
        }
    }

    fn insert(&mut self, decl: ParamDecl, parent: Option<NodeId>) -> Result<NodeId, ParamError> {
        let id = match parent {
            Some(parent) => format!("{}.{}", self.nodes[parent.0].id(), decl.id),
            None => decl.id,
        };
        if self.index.contains_key(&id) {
            return Err(ParamError::DuplicateId { id });
        }

        let handle = NodeId(self.nodes.len());
        trace!(param = %id, %handle, "adding parameter");
        self.index.insert(id.clone(), handle);
        self.nodes.push(ParamNode::new(
            handle,
            id,
            decl.kind,
            decl.bounds,
            decl.class,
            parent,
        ));

        for child in decl.children {
            let child_handle = self.insert(child, Some(handle))?;
            self.nodes[handle.0].push_child(child_handle);
        }
        Ok(handle)
    }

    /// Link every pair of parameters, replacing earlier links.
    ///
    /// Fails with [`ParamError::CircularDependency`] if cycle detection is enabled and
    /// the bounds form a cycle.
    pub fn link(&mut self) -> Result<(), ParamError> {
        for node in &mut self.nodes {
            node.clear_links();
        }

        let mode = self.config.match_mode;
        let mut edges = 0;
        for a in 0..self.nodes.len() {
            for b in (a + 1)..self.nodes.len() {
                if linker::link(&mut self.nodes, NodeId(a), NodeId(b), mode) {
                    edges += 1;
                }
            }
        }
        debug!(params = self.nodes.len(), linked_pairs = edges, ?mode, "linked design space");

        if self.config.detect_cycles {
            linker::check_acyclic(&self.nodes)?;
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, handle: NodeId) -> Option<&ParamNode> {
        self.nodes.get(handle.0)
    }

    pub(crate) fn node_mut(&mut self, handle: NodeId) -> Option<&mut ParamNode> {
        self.nodes.get_mut(handle.0)
    }

    /// Handle of the parameter with this fully qualified id
    pub fn handle(&self, id: &str) -> Option<NodeId> {
        self.index.get(id).copied()
    }

    pub fn nodes(&self) -> &[ParamNode] {
        &self.nodes
    }

    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    pub fn iter(&self) -> impl Iterator<Item = &ParamNode> {
        self.nodes.iter()
    }

    /// The order in which parameters can be evaluated, dependencies first
    pub fn evaluation_order(&self) -> Result<Vec<NodeId>, ParamError> {
        EvaluationOrder::new(self).order()
    }

    /// Evaluate a parameter's bound expressions against already known values.
    ///
    /// Missing bounds stay infinite; when both an inclusive and an exclusive bound are
    /// declared on the same side, the inclusive one is used.
    pub fn evaluate_bounds<C>(&self, id: &str, values: &C) -> Result<Bounds, ParamError>
    where
        C: EvaluationContext + ?Sized,
    {
        let node = self
            .get_param(id)
            .ok_or_else(|| ParamError::ParameterNotFound { id: id.to_string() })?;

        let eval = |kind: BoundKind, expr: &str| {
            Expression::parse(expr)
                .and_then(|e| e.evaluate(values))
                .map_err(|source| ParamError::BoundEvaluation {
                    id: id.to_string(),
                    kind,
                    source,
                })
        };

        let mut bounds = Bounds::unbounded();
        if let Some((kind, expr)) = node.bounds().min() {
            bounds.min = eval(kind, expr)?;
            bounds.min_exclusive = kind.is_exclusive();
        }
        if let Some((kind, expr)) = node.bounds().max() {
            bounds.max = eval(kind, expr)?;
            bounds.max_exclusive = kind.is_exclusive();
        }

        if bounds.min > bounds.max {
            return Err(ParamError::InvalidBounds {
                id: id.to_string(),
                source: BoundsError::InvalidBounds {
                    min: bounds.min,
                    max: bounds.max,
                },
            });
        }
        trace!(param = id, %bounds, "evaluated bounds");
        Ok(bounds)
    }
}

impl ParamStore for DesignSpace {
    fn contains_param(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    fn get_param(&self, id: &str) -> Option<&ParamNode> {
        self.handle(id).and_then(|handle| self.node(handle))
    }

    fn get_param_for_local_id(&self, local_id: &str, context: &ParamNode) -> Option<&ParamNode> {
        let mut scope = Some(context);
        while let Some(node) = scope {
            if let Some(found) = self.get_param(&format!("{}.{}", node.id(), local_id)) {
                return Some(found);
            }
            scope = self.parent(node);
        }
        None
    }

    fn parent(&self, node: &ParamNode) -> Option<&ParamNode> {
        node.parent().and_then(|handle| self.node(handle))
    }
}
