//! Tests for building and querying design spaces

use crate::test_helpers::param;
use approx::assert_relative_eq;
use dspace_rs::parameters::{
    BoundKind, DesignSpace, LinkConfig, MatchMode, Numeric, ParamDecl, ParamError, ParamKind,
    ParamStore,
};
use dspace_rs::SpaceError;
use std::collections::HashMap;

fn ga_space() -> DesignSpace {
    DesignSpace::from_decls(vec![
        ParamDecl::numeric("PopulationSize", Numeric::Integer)
            .incl_min("10")
            .incl_max("1000"),
        ParamDecl::numeric("EliteSize", Numeric::Integer)
            .incl_min("0")
            .excl_max("PopulationSize / 2"),
        ParamDecl::structured("Selection")
            .with_class("ga.Selection")
            .with_child(
                ParamDecl::numeric("pressure", Numeric::Double)
                    .excl_min("1")
                    .incl_max("2"),
            )
            .with_child(ParamDecl::choice("Tournament").with_child(ParamDecl::numeric(
                "rounds",
                Numeric::Integer,
            )))
            .with_child(ParamDecl::choice("Roulette")),
    ])
    .unwrap()
}

#[test]
fn test_space_structure() {
    let space = ga_space();

    assert_eq!(space.len(), 7);
    assert_eq!(space.roots().len(), 3);
    assert!(space.contains_param("Selection.Tournament.rounds"));

    let selection = param(&space, "Selection");
    assert_eq!(selection.kind(), ParamKind::Structured);
    assert_eq!(selection.children().len(), 3);
    assert!(!selection.is_leaf());

    let rounds = param(&space, "Selection.Tournament.rounds");
    assert_eq!(rounds.local_id(), "rounds");
    assert_eq!(space.parent(rounds).unwrap().id(), "Selection.Tournament");
    assert!(param(&space, "Selection.Roulette").is_choice());
}

#[test]
fn test_local_lookup() {
    let space = ga_space();
    let roulette = param(&space, "Selection.Roulette");

    let pressure = space.get_param_for_local_id("pressure", roulette).unwrap();
    assert_eq!(pressure.id(), "Selection.pressure");

    // a child of a sibling is not in scope
    assert!(space.get_param_for_local_id("rounds", roulette).is_none());

    // global ids are not local ids
    assert!(space.get_param_for_local_id("PopulationSize", roulette).is_none());
}

#[test]
fn test_bounds_evaluation_with_dependency_values() {
    let space = ga_space();

    let bounds = space
        .evaluate_bounds("PopulationSize", &HashMap::<String, f64>::new())
        .unwrap();
    assert_relative_eq!(bounds.min, 10.0);
    assert_relative_eq!(bounds.max, 1000.0);

    let values = HashMap::from([("PopulationSize".to_string(), 75.0)]);
    let elite = space.evaluate_bounds("EliteSize", &values).unwrap();
    assert_relative_eq!(elite.max, 37.5);
    assert!(elite.contains(37.0));
    assert!(!elite.contains(37.5));

    let pressure = space
        .evaluate_bounds("Selection.pressure", &HashMap::<String, f64>::new())
        .unwrap();
    assert!(pressure.min_exclusive);
    assert!(!pressure.contains(1.0));
    assert!(pressure.contains(2.0));

    let unbounded = space
        .evaluate_bounds("Selection.Tournament.rounds", &HashMap::<String, f64>::new())
        .unwrap();
    assert!(!unbounded.is_finite());
}

#[test]
fn test_bounds_evaluation_errors() {
    let space = ga_space();

    match space.evaluate_bounds("EliteSize", &HashMap::<String, f64>::new()) {
        Err(ParamError::BoundEvaluation { id, kind, .. }) => {
            assert_eq!(id, "EliteSize");
            assert_eq!(kind, BoundKind::ExclMax);
        }
        other => panic!("expected a bound evaluation error, got {:?}", other),
    }

    assert_eq!(
        space
            .evaluate_bounds("Nope", &HashMap::<String, f64>::new())
            .unwrap_err(),
        ParamError::ParameterNotFound {
            id: "Nope".to_string()
        }
    );
}

#[test]
fn test_add_child_after_construction() {
    let mut space = DesignSpace::with_config(LinkConfig::new().with_match_mode(MatchMode::Token));
    let group = space.add(ParamDecl::structured("Group")).unwrap();
    let child = space
        .add_child(group, ParamDecl::numeric("x", Numeric::Float))
        .unwrap();
    space
        .add(ParamDecl::numeric("y", Numeric::Float).incl_max("Group.x"))
        .unwrap();
    space.link().unwrap();

    assert_eq!(space.node(child).unwrap().id(), "Group.x");
    assert!(param(&space, "y").max_dependencies().contains(&child));
    assert!(matches!(
        space.add_child(group, ParamDecl::numeric("x", Numeric::Float)),
        Err(ParamError::DuplicateId { .. })
    ));
}

#[test]
fn test_from_json() {
    let space = DesignSpace::from_json_str(
        r#"[
            {"id": "n", "kind": {"numeric": "long"}, "inclMin": "1", "exclMax": "limit"},
            {"id": "limit", "kind": {"numeric": "long"}}
        ]"#,
    )
    .unwrap();

    let n = param(&space, "n");
    assert_eq!(n.kind(), ParamKind::Numeric(Numeric::Long));
    assert_eq!(n.bound(BoundKind::ExclMax), Some("limit"));
    assert_eq!(n.dependency_count(), 1);

    assert!(matches!(
        DesignSpace::from_json_str("{"),
        Err(SpaceError::Json(_))
    ));
    assert!(matches!(
        DesignSpace::from_json_str(
            r#"[{"id": "a", "kind": "structured"}, {"id": "a", "kind": "structured"}]"#
        ),
        Err(SpaceError::Param(ParamError::DuplicateId { .. }))
    ));
}
