//! Tests for instantiation

use dspace_rs::mapping::{
    ClassDescriptor, ClassKind, ClassRegistry, CodeMapping, CodeMappings, ConstructorResolver,
    Instance, Instantiator, InvokeError, MappingError, Selection, TypeRef, Value,
};
use dspace_rs::parameters::{DesignSpace, Numeric, ParamDecl, ParamKind, ParamStore};
use std::collections::HashMap;

#[derive(Debug, PartialEq)]
struct Point {
    x: i32,
    y: i32,
}

#[derive(Debug)]
struct Line {
    start: (i32, i32),
    label: Option<String>,
}

fn geometry() -> ClassRegistry {
    let mut registry = ClassRegistry::new();
    registry.register(ClassDescriptor::new("geo.Shape").with_kind(ClassKind::Interface));
    registry.register(ClassDescriptor::new("geo.Point").extends("geo.Shape").with_constructor(
        vec![Numeric::Integer.into(), Numeric::Integer.into()],
        |args| match args.as_slice() {
            [Value::Integer(x), Value::Integer(y)] => {
                Ok(Instance::new("geo.Point", Point { x: *x, y: *y }).into())
            }
            _ => Err(InvokeError::Raised("expected two integers".to_string())),
        },
    ));
    registry.register(
        ClassDescriptor::new("geo.Line")
            .extends("geo.Shape")
            .with_constructor(vec![TypeRef::class("geo.Shape"), TypeRef::string()], |args| {
                let start = args[0]
                    .downcast_ref::<Point>()
                    .map(|p| (p.x, p.y))
                    .ok_or_else(|| InvokeError::Raised("start must be a point".to_string()))?;
                let label = args[1].as_str().map(str::to_string);
                Ok(Instance::new("geo.Line", Line { start, label }).into())
            })
            .with_constructor(vec![], |_| Err(InvokeError::Raised("empty line".to_string()))),
    );
    registry
}

#[test]
fn test_point_from_values() {
    let space = DesignSpace::from_decls(vec![ParamDecl::structured("origin")]).unwrap();
    let registry = geometry();
    let mappings = CodeMappings::new().with(CodeMapping::new("origin", "geo.Point"));
    let origin = space.get_param("origin").unwrap();

    let mut resolver = ConstructorResolver::new(origin, &mappings, &space, &registry);
    let point = resolver
        .new_instance(vec![Value::from(3), Value::from(4)])
        .unwrap();

    assert_eq!(point.type_name(), "geo.Point");
    assert_eq!(point.downcast_ref::<Point>(), Some(&Point { x: 3, y: 4 }));
    assert_eq!(resolver.resolve().unwrap().selection(), Selection::Single);
}

#[test]
fn test_argument_mismatch_reports_runtime_types() {
    let space = DesignSpace::from_decls(vec![ParamDecl::structured("origin")]).unwrap();
    let registry = geometry();
    let mappings = CodeMappings::new().with(CodeMapping::new("origin", "geo.Point"));
    let mut instantiator = Instantiator::new(&space, &registry, &mappings);

    let err = instantiator
        .new_instance("origin", vec![Value::from("3"), Value::Null])
        .unwrap_err();
    match &err {
        MappingError::ArgumentMismatch { id, expected, actual } => {
            assert_eq!(id, "origin");
            assert_eq!(expected, "(i32, i32)");
            assert_eq!(actual, &vec!["String".to_string(), "null".to_string()]);
        }
        other => panic!("expected an argument mismatch, got {:?}", other),
    }
    assert!(err.to_string().contains("String null"));

    // narrowing is not allowed
    assert!(matches!(
        instantiator.new_instance("origin", vec![Value::Long(1), Value::Integer(2)]),
        Err(MappingError::ArgumentMismatch { .. })
    ));
    // widening is
    assert!(instantiator
        .new_instance("origin", vec![Value::Short(1), Value::Integer(2)])
        .is_ok());
}

#[test]
fn test_object_arguments_and_supertypes() {
    let space = DesignSpace::from_decls(vec![
        ParamDecl::structured("Start").with_class("geo.Point"),
        ParamDecl::structured("Line"),
    ])
    .unwrap();
    let registry = geometry();
    let mappings = CodeMappings::new()
        .with(CodeMapping::new("Start", "geo.Point"))
        .with(CodeMapping::new("Line", "geo.Line").with_constructor("geo.Shape String"));
    let mut instantiator = Instantiator::new(&space, &registry, &mappings);

    let start = instantiator
        .new_instance("Start", vec![Value::from(1), Value::from(2)])
        .unwrap();
    let line = instantiator
        .new_instance("Line", vec![start, Value::from("diagonal")])
        .unwrap();
    let line = line.downcast_ref::<Line>().unwrap();
    assert_eq!(line.start, (1, 2));
    assert_eq!(line.label.as_deref(), Some("diagonal"));

    // null is accepted for any non-primitive type, and the factory sees it
    let err = instantiator
        .new_instance("Line", vec![Value::Null, Value::Null])
        .unwrap_err();
    assert!(matches!(
        err,
        MappingError::ConstructionFailed { ref message, .. } if message == "start must be a point"
    ));
}

#[test]
fn test_interfaces_cannot_be_instantiated() {
    let space = DesignSpace::from_decls(vec![ParamDecl::structured("shape")]).unwrap();
    let mut registry = geometry();
    registry.register(
        ClassDescriptor::new("geo.Abstract")
            .with_kind(ClassKind::Abstract)
            .with_constructor(vec![], |_| Ok(Value::Null)),
    );
    let mappings = CodeMappings::new().with(CodeMapping::new("shape", "geo.Abstract"));
    let mut instantiator = Instantiator::new(&space, &registry, &mappings);

    let err = instantiator.new_instance("shape", vec![]).unwrap_err();
    assert_eq!(
        err,
        MappingError::NotInstantiable {
            id: "shape".to_string(),
            class: "geo.Abstract".to_string(),
            kind: ClassKind::Abstract,
        }
    );
    assert_eq!(err.to_string(), "shape: The abstract class 'geo.Abstract' cannot be instantiated");

    // an interface has no constructors at all
    let mappings = CodeMappings::new().with(CodeMapping::new("shape", "geo.Shape"));
    let mut instantiator = Instantiator::new(&space, &registry, &mappings);
    assert!(matches!(
        instantiator.new_instance("shape", vec![]),
        Err(MappingError::NoConstructor { .. })
    ));
}

#[test]
fn test_restricted_and_inaccessible_constructors() {
    let space = DesignSpace::from_decls(vec![ParamDecl::structured("vault")]).unwrap();
    let mut registry = ClassRegistry::new();
    registry.register(
        ClassDescriptor::new("sec.Vault")
            .with_constructor(vec![TypeRef::string()], |_| Err(InvokeError::Inaccessible))
            .with_constructor(vec![Numeric::Long.into()], |_| Ok(Value::Null))
            .with_restricted_constructor(vec![Numeric::Integer.into()], |_| Ok(Value::Null)),
    );

    let mappings =
        CodeMappings::new().with(CodeMapping::new("vault", "sec.Vault").with_constructor("integer"));
    let mut instantiator = Instantiator::new(&space, &registry, &mappings);
    assert!(matches!(
        instantiator.new_instance("vault", vec![Value::from(1)]),
        Err(MappingError::PermissionDenied { .. })
    ));
    assert!(!instantiator.is_resolved("vault"));

    let mappings =
        CodeMappings::new().with(CodeMapping::new("vault", "sec.Vault").with_constructor("String"));
    let mut instantiator = Instantiator::new(&space, &registry, &mappings);
    assert!(matches!(
        instantiator.new_instance("vault", vec![Value::from("key")]),
        Err(MappingError::Inaccessible { .. })
    ));
    assert!(instantiator.is_resolved("vault"));
}

#[test]
fn test_evaluate_then_instantiate() {
    let space = DesignSpace::from_json_str(
        r#"[
            {"id": "width", "kind": {"numeric": "integer"}, "inclMin": "1", "inclMax": "height"},
            {"id": "height", "kind": {"numeric": "integer"}, "inclMin": "1", "inclMax": "10"},
            {"id": "Corner", "kind": "structured"}
        ]"#,
    )
    .unwrap();
    let mappings = CodeMappings::from_json_str(
        r#"[{"id": "Corner", "type": "geo.Point", "constructor": "width height"}]"#,
    )
    .unwrap();
    let registry = geometry();

    // evaluate each numeric parameter at its upper bound, dependencies first
    let mut values: HashMap<String, f64> = HashMap::new();
    for handle in space.evaluation_order().unwrap() {
        let node = space.node(handle).unwrap();
        if node.kind() == ParamKind::Numeric(Numeric::Integer) {
            let bounds = space.evaluate_bounds(node.id(), &values).unwrap();
            values.insert(node.id().to_string(), bounds.max);
        }
    }
    assert_eq!(values["width"], 10.0);

    let mut instantiator = Instantiator::new(&space, &registry, &mappings);
    let resolver = instantiator.resolver("Corner").unwrap();
    let args = resolver
        .formal_ids()
        .iter()
        .map(|id| Value::from(values[id.as_str()] as i32))
        .collect();
    let corner = resolver.new_instance(args).unwrap();
    assert_eq!(corner.downcast_ref::<Point>(), Some(&Point { x: 10, y: 10 }));
    assert!(instantiator.is_resolved("Corner"));
}
