//! Property-Based Tests for the Evaluation Order
//!
//! Property: For any acyclic design space, every parameter is ordered after all of the
//! parameters its bounds depend on, and the comparator never contradicts itself.

use dspace_rs::parameters::{DesignSpace, EvaluationOrder, NodeId, Numeric, OrderItem, ParamDecl};
use proptest::prelude::*;
use std::cmp::Ordering;

// ============================================================================
// ARBITRATORS (Generate Random Acyclic Spaces)
// ============================================================================

/// Edges only point from a parameter to lower-numbered ones, so every generated space
/// is acyclic. Declarations are inserted in a shuffled order.
fn arb_space() -> impl Strategy<Value = DesignSpace> {
    (2usize..10)
        .prop_flat_map(|n| {
            (
                prop::collection::vec(prop::collection::vec(0u8..3, n), n),
                Just((0..n).collect::<Vec<_>>()).prop_shuffle(),
            )
        })
        .prop_map(|(edges, insertion)| {
            let decls = insertion
                .into_iter()
                .map(|i| {
                    // 0: no edge, 1: referenced by the max bound, 2: by the min bound
                    let refs = |side: u8| {
                        (0..i)
                            .filter(|&j| edges[i][j] == side)
                            .map(|j| format!("p{}", j))
                            .collect::<Vec<_>>()
                    };
                    let mut decl = ParamDecl::numeric(&format!("p{}", i), Numeric::Double);
                    let (max, min) = (refs(1), refs(2));
                    if !max.is_empty() {
                        decl = decl.incl_max(&max.join(" + "));
                    }
                    if !min.is_empty() {
                        decl = decl.excl_min(&min.join(" - "));
                    }
                    decl
                })
                .collect();
            DesignSpace::from_decls(decls).unwrap()
        })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Property: dependencies precede their dependents in the evaluation order
    #[test]
    fn prop_dependencies_precede_dependents(space in arb_space()) {
        let order = space.evaluation_order().unwrap();
        prop_assert_eq!(order.len(), space.len());

        let position = |handle: NodeId| order.iter().position(|h| *h == handle).unwrap();
        for node in space.iter() {
            for dependency in node.dependencies() {
                prop_assert!(position(dependency) < position(node.handle()));
            }
        }
    }

    /// Property: the comparator is antisymmetric and ranks dependents after dependencies
    #[test]
    fn prop_comparator_is_consistent(space in arb_space()) {
        let cmp = EvaluationOrder::new(&space);

        for x in space.iter() {
            for y in space.iter() {
                let forward = cmp.compare(x.into(), y.into());
                let backward = cmp.compare(y.into(), x.into());
                prop_assert_eq!(forward, backward.reverse());

                if x.handle() == y.handle() {
                    prop_assert_eq!(forward, Ordering::Equal);
                } else {
                    prop_assert_ne!(forward, Ordering::Equal);
                }
                if cmp.depends_on(x, y) {
                    prop_assert_eq!(forward, Ordering::Greater);
                }
            }
        }
    }

    /// Property: sorting any selection keeps transitive dependencies in order
    #[test]
    fn prop_sorted_selection_respects_dependencies(
        space in arb_space(),
        mask in prop::collection::vec(any::<bool>(), 10),
    ) {
        let cmp = EvaluationOrder::new(&space);
        let items: Vec<OrderItem<'_>> = space
            .iter()
            .zip(mask)
            .filter(|(_, keep)| *keep)
            .map(|(node, _)| node.into())
            .collect();

        let sorted = cmp.sort_items(&items).unwrap();
        prop_assert_eq!(sorted.len(), items.len());

        for (i, earlier) in sorted.iter().enumerate() {
            for later in &sorted[i + 1..] {
                let (Some(earlier), Some(later)) = (earlier.node(), later.node()) else {
                    continue;
                };
                prop_assert!(!cmp.depends_on(earlier, later));
            }
        }
    }
}
