//! # Code Mapping and Construction
//!
//! Parameters that stand for objects (structured parameters and choice variants) are
//! built through a registered type. A [`CodeMapping`] names that type and, optionally,
//! the identifiers whose values are passed to its constructor. The
//! [`ConstructorResolver`] picks the constructor; [`ConstructorResolver::new_instance`]
//! and the [`Instantiator`] façade call it with evaluated arguments.
//!
//! ## Example Usage
//!
//! ```rust
//! use dspace_rs::mapping::{
//!     ClassDescriptor, ClassRegistry, CodeMapping, CodeMappings, Instance, Instantiator, Value,
//! };
//! use dspace_rs::parameters::{DesignSpace, Numeric, ParamDecl};
//!
//! #[derive(Debug, PartialEq)]
//! struct Point {
//!     x: i32,
//!     y: i32,
//! }
//!
//! let mut registry = ClassRegistry::new();
//! registry.register(ClassDescriptor::new("geo.Point").with_constructor(
//!     vec![Numeric::Integer.into(), Numeric::Integer.into()],
//!     |args| match args.as_slice() {
//!         [Value::Integer(x), Value::Integer(y)] => {
//!             Ok(Instance::new("geo.Point", Point { x: *x, y: *y }).into())
//!         }
//!         _ => unreachable!(),
//!     },
//! ));
//!
//! let space = DesignSpace::from_decls(vec![ParamDecl::structured("origin")]).unwrap();
//! let mappings = CodeMappings::new().with(CodeMapping::new("origin", "geo.Point"));
//!
//! let mut instantiator = Instantiator::new(&space, &registry, &mappings);
//! let point = instantiator
//!     .new_instance("origin", vec![Value::from(3), Value::from(4)])
//!     .unwrap();
//! assert_eq!(point.downcast_ref::<Point>(), Some(&Point { x: 3, y: 4 }));
//! ```

pub mod code_mapping;
pub mod constructor;
pub mod instantiate;
pub mod registry;
pub mod types;
pub mod value;

pub use code_mapping::{CodeMapping, CodeMappings};
pub use constructor::{
    ArgumentKind, ConstructorResolver, MappingError, Resolution, ResolvedConstructor, Selection,
};
pub use instantiate::Instantiator;
pub use registry::{
    ClassDescriptor, ClassKind, ClassRegistry, ConstructorDescriptor, Factory, InvokeError,
    Visibility,
};
pub use types::{TypeRef, STRING_TYPE};
pub use value::{Instance, Value};
