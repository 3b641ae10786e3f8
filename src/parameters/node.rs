//! Parameter nodes
//!
//! A [`ParamNode`] is one declared dimension of a design space. Nodes live in the
//! arena of a [`DesignSpace`](crate::parameters::DesignSpace) and refer to each other
//! by [`NodeId`] handles: the parent link is navigational only, and the dependency
//! sets are filled once by the linker.

use crate::mapping::TypeRef;
use crate::parameters::bounds::{BoundExprs, BoundKind};
use crate::parameters::numeric::Numeric;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// Handle of a node inside its design space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    pub fn index(&self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// What kind of parameter a node declares.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamKind {
    /// A scalar or range parameter of a primitive kind
    Numeric(Numeric),

    /// A complex parameter built from its sub-parameters
    Structured,

    /// One alternative of its parent parameter
    Choice,
}

/// One declared parameter of a design space
#[derive(Debug, Clone)]
pub struct ParamNode {
    handle: NodeId,
    id: String,
    kind: ParamKind,
    bounds: BoundExprs,
    class: Option<String>,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    max_dependencies: HashSet<NodeId>,
    min_dependencies: HashSet<NodeId>,
    dependees: HashSet<NodeId>,
}

impl ParamNode {
    pub(crate) fn new(
        handle: NodeId,
        id: String,
        kind: ParamKind,
        bounds: BoundExprs,
        class: Option<String>,
        parent: Option<NodeId>,
    ) -> Self {
        Self {
            handle,
            id,
            kind,
            bounds,
            class,
            parent,
            children: Vec::new(),
            max_dependencies: HashSet::new(),
            min_dependencies: HashSet::new(),
            dependees: HashSet::new(),
        }
    }

    /// The node's handle in its design space
    pub fn handle(&self) -> NodeId {
        self.handle
    }

    /// The fully qualified id, unique within the design space
    pub fn id(&self) -> &str {
        &self.id
    }

    /// The id relative to the parent (the last dot-separated segment)
    pub fn local_id(&self) -> &str {
        self.id.rsplit('.').next().unwrap_or(&self.id)
    }

    pub fn kind(&self) -> ParamKind {
        self.kind
    }

    pub fn is_choice(&self) -> bool {
        self.kind == ParamKind::Choice
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    pub fn bounds(&self) -> &BoundExprs {
        &self.bounds
    }

    /// The raw expression declared for one bound kind
    pub fn bound(&self, kind: BoundKind) -> Option<&str> {
        self.bounds.get(kind)
    }

    /// The declared type name of a structured or choice parameter
    pub fn class_name(&self) -> Option<&str> {
        self.class.as_deref()
    }

    /// The type a value of this parameter has, if known.
    ///
    /// Numeric parameters have their primitive kind; other parameters have the type
    /// their declaration or code mapping names.
    pub fn value_type(&self) -> Option<TypeRef> {
        match self.kind {
            ParamKind::Numeric(numeric) => Some(TypeRef::Primitive(numeric)),
            ParamKind::Structured | ParamKind::Choice => {
                self.class.as_deref().map(TypeRef::class)
            }
        }
    }

    /// Parameters referenced by this node's maximum bound
    pub fn max_dependencies(&self) -> &HashSet<NodeId> {
        &self.max_dependencies
    }

    /// Parameters referenced by this node's minimum bound
    pub fn min_dependencies(&self) -> &HashSet<NodeId> {
        &self.min_dependencies
    }

    /// Parameters whose bounds reference this node
    pub fn dependees(&self) -> &HashSet<NodeId> {
        &self.dependees
    }

    /// Iterate over the distinct direct dependencies (minimum and maximum)
    pub fn dependencies(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.max_dependencies.iter().copied().chain(
            self.min_dependencies
                .iter()
                .copied()
                .filter(move |id| !self.max_dependencies.contains(id)),
        )
    }

    /// Number of distinct direct dependencies
    pub fn dependency_count(&self) -> usize {
        self.dependencies().count()
    }

    pub fn dependee_count(&self) -> usize {
        self.dependees.len()
    }

    pub fn has_dependencies(&self) -> bool {
        !self.max_dependencies.is_empty() || !self.min_dependencies.is_empty()
    }

    pub(crate) fn push_child(&mut self, child: NodeId) {
        self.children.push(child);
    }

    pub(crate) fn set_class(&mut self, class: Option<String>) {
        self.class = class;
    }

    pub(crate) fn add_max_dependency(&mut self, node: NodeId) {
        self.max_dependencies.insert(node);
    }

    pub(crate) fn add_min_dependency(&mut self, node: NodeId) {
        self.min_dependencies.insert(node);
    }

    pub(crate) fn add_dependee(&mut self, node: NodeId) {
        self.dependees.insert(node);
    }

    pub(crate) fn clear_links(&mut self) {
        self.max_dependencies.clear();
        self.min_dependencies.clear();
        self.dependees.clear();
    }
}
