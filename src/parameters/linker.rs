//! Dependency linking between parameters
//!
//! Two parameters are linked when one's minimum or maximum bound expression mentions
//! the other's id. Only leaves can be depended upon, and a node never depends on
//! itself. For a given pair at most one direction is registered: the second direction
//! is only checked when the first one yields nothing.

use crate::parameters::bounds::BoundKind;
use crate::parameters::config::MatchMode;
use crate::parameters::expression::identifiers;
use crate::parameters::node::{NodeId, ParamNode};
use crate::parameters::space::ParamError;
use tracing::trace;

/// Check whether an expression references a parameter id.
///
/// ```
/// use dspace_rs::parameters::{linker::references, MatchMode};
///
/// assert!(references("sizeMax - 1", "size", MatchMode::Substring));
/// assert!(!references("sizeMax - 1", "size", MatchMode::Token));
/// ```
pub fn references(expr: &str, id: &str, mode: MatchMode) -> bool {
    match mode {
        MatchMode::Substring => expr.contains(id),
        MatchMode::Token => identifiers(expr).iter().any(|token| token == id),
    }
}

/// Link a pair of nodes, checking `a -> b` first and `b -> a` only if that found nothing.
///
/// Returns whether an edge was registered.
pub fn link(nodes: &mut [ParamNode], a: NodeId, b: NodeId, mode: MatchMode) -> bool {
    link_directed(nodes, a, b, mode) || link_directed(nodes, b, a, mode)
}

/// Register `from -> to` edges for every bound side of `from` that references `to`
fn link_directed(nodes: &mut [ParamNode], from: NodeId, to: NodeId, mode: MatchMode) -> bool {
    if from == to {
        return false;
    }
    let (Some(source), Some(target)) = (nodes.get(from.0), nodes.get(to.0)) else {
        return false;
    };
    if !target.is_leaf() {
        return false;
    }

    let relative_to = |kinds: [BoundKind; 2]| {
        kinds.into_iter().any(|kind| {
            source
                .bound(kind)
                .is_some_and(|expr| references(expr, target.id(), mode))
        })
    };
    let on_max = relative_to(BoundKind::MAX);
    let on_min = relative_to(BoundKind::MIN);

    if on_max {
        trace!(from = %nodes[from.0].id(), to = %nodes[to.0].id(), "max bound dependency");
        nodes[from.0].add_max_dependency(to);
        nodes[to.0].add_dependee(from);
    }
    if on_min {
        trace!(from = %nodes[from.0].id(), to = %nodes[to.0].id(), "min bound dependency");
        nodes[from.0].add_min_dependency(to);
        nodes[to.0].add_dependee(from);
    }
    on_max || on_min
}

/// Fail with [`ParamError::CircularDependency`] if the dependency edges form a cycle.
///
/// `nodes` must be the whole arena, since handles index into it.
pub(crate) fn check_acyclic(nodes: &[ParamNode]) -> Result<(), ParamError> {
    #[derive(Clone, Copy, PartialEq)]
    enum Mark {
        New,
        Active,
        Done,
    }

    fn visit(
        node: NodeId,
        nodes: &[ParamNode],
        marks: &mut [Mark],
        path: &mut Vec<NodeId>,
    ) -> Result<(), ParamError> {
        match marks[node.0] {
            Mark::Done => return Ok(()),
            Mark::Active => {
                let start = path.iter().position(|n| *n == node).unwrap_or(0);
                let mut cycle: Vec<String> = path[start..]
                    .iter()
                    .map(|n| nodes[n.0].id().to_string())
                    .collect();
                cycle.push(nodes[node.0].id().to_string());
                return Err(ParamError::CircularDependency { cycle });
            }
            Mark::New => {}
        }

        marks[node.0] = Mark::Active;
        path.push(node);

        let mut deps: Vec<NodeId> = nodes[node.0].dependencies().collect();
        deps.sort();
        for dep in deps {
            visit(dep, nodes, marks, path)?;
        }

        path.pop();
        marks[node.0] = Mark::Done;
        Ok(())
    }

    let mut marks = vec![Mark::New; nodes.len()];
    let mut path = Vec::new();
    for node in nodes {
        visit(node.handle(), nodes, &mut marks, &mut path)?;
    }
    Ok(())
}
