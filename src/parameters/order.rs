//! Evaluation order of parameters
//!
//! Parameters have to be evaluated after every parameter their bounds reference. The
//! [`EvaluationOrder`] comparator encodes that rule plus the tie-breaks used when two
//! parameters are unrelated:
//!
//! 1. if one depends (directly or transitively) on the other, it sorts after it;
//! 2. more direct dependencies sort later, then fewer dependees sort later;
//! 3. resolved nodes sort before raw descriptor elements, and equal candidates fall
//!    back to comparing ids.
//!
//! The pairwise comparator is not transitive on every graph (rule 1 only relates
//! connected pairs), so [`EvaluationOrder::order`] and [`EvaluationOrder::sort_items`]
//! never hand it to a sorting algorithm. They repeatedly emit the smallest item, by the
//! tie-breaks, among those whose dependencies have all been emitted.

use crate::parameters::linker;
use crate::parameters::node::{NodeId, ParamNode};
use crate::parameters::space::{DesignSpace, ParamError};
use std::cmp::{Ordering, Reverse};
use std::collections::{BTreeSet, HashSet};
use tracing::debug;

/// A descriptor element that has not been turned into a node yet.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RawElement {
    id: String,
}

impl RawElement {
    pub fn new(id: &str) -> Self {
        Self { id: id.to_string() }
    }

    pub fn id(&self) -> &str {
        &self.id
    }
}

/// Anything the evaluation order can rank.
#[derive(Debug, Clone, Copy)]
pub enum OrderItem<'a> {
    Node(&'a ParamNode),
    Element(&'a RawElement),
}

impl<'a> OrderItem<'a> {
    pub fn id(&self) -> &'a str {
        match self {
            OrderItem::Node(node) => node.id(),
            OrderItem::Element(element) => element.id(),
        }
    }

    pub fn node(&self) -> Option<&'a ParamNode> {
        match self {
            OrderItem::Node(node) => Some(node),
            OrderItem::Element(_) => None,
        }
    }

    fn dependency_count(&self) -> usize {
        self.node().map_or(0, ParamNode::dependency_count)
    }

    fn dependee_count(&self) -> usize {
        self.node().map_or(0, ParamNode::dependee_count)
    }
}

impl<'a> From<&'a ParamNode> for OrderItem<'a> {
    fn from(node: &'a ParamNode) -> Self {
        OrderItem::Node(node)
    }
}

impl<'a> From<&'a RawElement> for OrderItem<'a> {
    fn from(element: &'a RawElement) -> Self {
        OrderItem::Element(element)
    }
}

/// Comparator and ordering over the parameters of one linked design space
#[derive(Debug, Clone, Copy)]
pub struct EvaluationOrder<'a> {
    space: &'a DesignSpace,
}

impl<'a> EvaluationOrder<'a> {
    pub fn new(space: &'a DesignSpace) -> Self {
        Self { space }
    }

    /// Check whether `x` depends on `y` directly or through other parameters' bounds.
    pub fn depends_on(&self, x: &ParamNode, y: &ParamNode) -> bool {
        let target = y.handle();
        let mut visited = HashSet::new();
        let mut stack: Vec<NodeId> = x.dependencies().collect();

        while let Some(current) = stack.pop() {
            if current == target {
                return true;
            }
            if !visited.insert(current) {
                continue;
            }
            if let Some(node) = self.space.node(current) {
                stack.extend(node.dependencies());
            }
        }
        false
    }

    /// Compare two items; `Ordering::Greater` means `a` is evaluated after `b`.
    pub fn compare(&self, a: OrderItem<'_>, b: OrderItem<'_>) -> Ordering {
        if let (OrderItem::Node(x), OrderItem::Node(y)) = (a, b) {
            if x.handle() == y.handle() {
                return Ordering::Equal;
            }
            if self.depends_on(x, y) {
                return Ordering::Greater;
            }
            if self.depends_on(y, x) {
                return Ordering::Less;
            }
        }
        Self::tie_break(a, b)
    }

    /// Compare two nodes of the space by handle
    pub fn compare_nodes(&self, a: NodeId, b: NodeId) -> Ordering {
        match (self.space.node(a), self.space.node(b)) {
            (Some(x), Some(y)) => self.compare(x.into(), y.into()),
            _ => a.cmp(&b),
        }
    }

    fn tie_break(a: OrderItem<'_>, b: OrderItem<'_>) -> Ordering {
        a.dependency_count()
            .cmp(&b.dependency_count())
            .then_with(|| b.dependee_count().cmp(&a.dependee_count()))
            .then_with(|| match (a, b) {
                (OrderItem::Node(_), OrderItem::Element(_)) => Ordering::Less,
                (OrderItem::Element(_), OrderItem::Node(_)) => Ordering::Greater,
                _ => a.id().cmp(b.id()),
            })
    }

    /// Order an arbitrary selection of items so that dependencies come first.
    pub fn sort_items<'b>(&self, items: &[OrderItem<'b>]) -> Result<Vec<OrderItem<'b>>, ParamError> {
        let mut remaining = items.to_vec();
        let mut sorted = Vec::with_capacity(items.len());

        while !remaining.is_empty() {
            let blocked = |i: usize| {
                remaining.iter().enumerate().any(|(j, other)| {
                    j != i
                        && matches!(
                            (remaining[i], *other),
                            (OrderItem::Node(x), OrderItem::Node(y)) if self.depends_on(x, y)
                        )
                })
            };

            let next = (0..remaining.len())
                .filter(|&i| !blocked(i))
                .min_by(|&i, &j| Self::tie_break(remaining[i], remaining[j]))
                .ok_or_else(|| ParamError::CircularDependency {
                    cycle: remaining.iter().map(|item| item.id().to_string()).collect(),
                })?;
            sorted.push(remaining.remove(next));
        }
        Ok(sorted)
    }

    /// The evaluation order of every parameter in the space.
    ///
    /// Fails with [`ParamError::CircularDependency`] if the dependencies form a cycle.
    pub fn order(&self) -> Result<Vec<NodeId>, ParamError> {
        let nodes = self.space.nodes();
        let key = |node: &'a ParamNode| {
            (
                node.dependency_count(),
                Reverse(node.dependee_count()),
                node.id(),
                node.handle(),
            )
        };

        let mut unresolved: Vec<usize> = nodes.iter().map(ParamNode::dependency_count).collect();
        let mut ready: BTreeSet<_> = nodes
            .iter()
            .filter(|node| !node.has_dependencies())
            .map(key)
            .collect();
        let mut order = Vec::with_capacity(nodes.len());

        while let Some((_, _, _, handle)) = ready.pop_first() {
            order.push(handle);
            for dependee in nodes[handle.0].dependees() {
                unresolved[dependee.0] -= 1;
                if unresolved[dependee.0] == 0 {
                    ready.insert(key(&nodes[dependee.0]));
                }
            }
        }

        if order.len() < nodes.len() {
            linker::check_acyclic(nodes)?;
            // Unreachable for consistent links; report what is left.
            let emitted: HashSet<NodeId> = order.iter().copied().collect();
            return Err(ParamError::CircularDependency {
                cycle: nodes
                    .iter()
                    .filter(|node| !emitted.contains(&node.handle()))
                    .map(|node| node.id().to_string())
                    .collect(),
            });
        }

        debug!(params = order.len(), "computed evaluation order");
        Ok(order)
    }
}
