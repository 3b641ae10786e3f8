//! Tests for the evaluation order

use crate::test_helpers::{ids, param, position};
use approx::assert_relative_eq;
use dspace_rs::parameters::{
    DesignSpace, EvaluationOrder, LinkConfig, Numeric, OrderItem, ParamDecl, ParamError, RawElement,
};
use std::cmp::Ordering;
use std::collections::HashMap;

fn diamond() -> DesignSpace {
    // top depends on left and right, both depend on base
    DesignSpace::from_decls(vec![
        ParamDecl::numeric("top", Numeric::Double)
            .incl_min("left")
            .incl_max("right"),
        ParamDecl::numeric("left", Numeric::Double).incl_max("base"),
        ParamDecl::numeric("right", Numeric::Double).incl_min("base"),
        ParamDecl::numeric("base", Numeric::Double)
            .incl_min("0")
            .incl_max("10"),
    ])
    .unwrap()
}

#[test]
fn test_dependencies_come_first() {
    let space = diamond();
    let order = space.evaluation_order().unwrap();

    assert_eq!(order.len(), space.len());
    for node in space.iter() {
        for dependency in node.dependencies() {
            let dep_id = space.node(dependency).unwrap().id();
            assert!(
                position(&space, &order, dep_id) < position(&space, &order, node.id()),
                "{} must precede {}",
                dep_id,
                node.id()
            );
        }
    }
    assert_eq!(ids(&space, &order), vec!["base", "left", "right", "top"]);
}

#[test]
fn test_transitive_comparison() {
    let space = diamond();
    let cmp = EvaluationOrder::new(&space);
    let top = param(&space, "top");
    let base = param(&space, "base");
    let left = param(&space, "left");
    let right = param(&space, "right");

    assert!(cmp.depends_on(top, base));
    assert!(!cmp.depends_on(base, top));
    assert!(!cmp.depends_on(left, right));
    assert_eq!(cmp.compare(top.into(), base.into()), Ordering::Greater);
    assert_eq!(cmp.compare(base.into(), top.into()), Ordering::Less);
    assert_eq!(cmp.compare_nodes(left.handle(), right.handle()), Ordering::Less);
    assert_eq!(cmp.compare_nodes(right.handle(), left.handle()), Ordering::Greater);
}

#[test]
fn test_dependee_tie_break() {
    // both have no dependencies; `shared` is referenced twice, `single` once
    let space = DesignSpace::from_decls(vec![
        ParamDecl::numeric("single", Numeric::Integer),
        ParamDecl::numeric("shared", Numeric::Integer),
        ParamDecl::numeric("p", Numeric::Integer).incl_max("shared"),
        ParamDecl::numeric("q", Numeric::Integer).incl_max("shared + single"),
    ])
    .unwrap();
    let cmp = EvaluationOrder::new(&space);

    let shared = param(&space, "shared");
    let single = param(&space, "single");
    assert_eq!(shared.dependee_count(), 2);
    assert_eq!(cmp.compare(shared.into(), single.into()), Ordering::Less);
    assert_eq!(cmp.compare(single.into(), shared.into()), Ordering::Greater);

    let order = ids(&space, &space.evaluation_order().unwrap());
    assert_eq!(order, vec!["shared", "single", "p", "q"]);
}

#[test]
fn test_dependency_count_tie_break() {
    let space = DesignSpace::from_decls(vec![
        ParamDecl::numeric("a", Numeric::Integer),
        ParamDecl::numeric("b", Numeric::Integer),
        ParamDecl::numeric("two", Numeric::Integer)
            .incl_min("a")
            .incl_max("b"),
        ParamDecl::numeric("one", Numeric::Integer).incl_max("a"),
    ])
    .unwrap();
    let cmp = EvaluationOrder::new(&space);

    let two = param(&space, "two");
    let one = param(&space, "one");
    assert!(!cmp.depends_on(two, one));
    assert_eq!(cmp.compare(two.into(), one.into()), Ordering::Greater);
}

#[test]
fn test_raw_elements_and_mixed_items() {
    let space = diamond();
    let cmp = EvaluationOrder::new(&space);
    let base = param(&space, "base");

    let alpha = RawElement::new("alpha");
    let beta = RawElement::new("beta");
    assert_eq!(alpha.id(), "alpha");

    assert_eq!(cmp.compare((&alpha).into(), (&beta).into()), Ordering::Less);
    assert_eq!(cmp.compare((&beta).into(), (&beta).into()), Ordering::Equal);
    assert_eq!(cmp.compare(base.into(), (&alpha).into()), Ordering::Less);
    assert_eq!(cmp.compare((&alpha).into(), base.into()), Ordering::Greater);

    let items = [
        OrderItem::from(&beta),
        OrderItem::from(param(&space, "top")),
        OrderItem::from(&alpha),
        OrderItem::from(base),
    ];
    let sorted: Vec<_> = cmp
        .sort_items(&items)
        .unwrap()
        .iter()
        .map(|item| item.id())
        .collect();
    assert_eq!(sorted, vec!["base", "alpha", "beta", "top"]);
}

#[test]
fn test_order_drives_bound_evaluation() {
    let space = DesignSpace::from_decls(vec![
        ParamDecl::numeric("offspring", Numeric::Integer)
            .incl_min("parents")
            .incl_max("parents * 4"),
        ParamDecl::numeric("parents", Numeric::Integer)
            .incl_min("2")
            .incl_max("population / 2"),
        ParamDecl::numeric("population", Numeric::Integer)
            .incl_min("10")
            .incl_max("100"),
    ])
    .unwrap();

    // half the upper bound, but at least the lower bound, in evaluation order
    let mut values: HashMap<String, f64> = HashMap::new();
    for handle in space.evaluation_order().unwrap() {
        let id = space.node(handle).unwrap().id();
        let bounds = space.evaluate_bounds(id, &values).unwrap();
        values.insert(id.to_string(), bounds.min.max(bounds.max / 2.0));
    }

    assert_relative_eq!(values["population"], 50.0);
    assert_relative_eq!(values["parents"], 12.5);
    assert_relative_eq!(values["offspring"], 25.0);
}

#[test]
fn test_cycle_without_detection_fails_ordering() {
    let space = DesignSpace::from_decls_with_config(
        vec![
            ParamDecl::numeric("x", Numeric::Integer).incl_max("y"),
            ParamDecl::numeric("y", Numeric::Integer).incl_max("z"),
            ParamDecl::numeric("z", Numeric::Integer).incl_min("x"),
            ParamDecl::numeric("free", Numeric::Integer),
        ],
        LinkConfig::new().with_cycle_detection(false),
    )
    .unwrap();

    match space.evaluation_order() {
        Err(ParamError::CircularDependency { cycle }) => {
            assert!(cycle.contains(&"x".to_string()));
            assert!(!cycle.contains(&"free".to_string()));
        }
        other => panic!("expected a circular dependency, got {:?}", other),
    }
}

#[test]
fn test_empty_space() {
    let space = DesignSpace::new();
    assert!(space.evaluation_order().unwrap().is_empty());
    assert!(EvaluationOrder::new(&space).sort_items(&[]).unwrap().is_empty());
}
