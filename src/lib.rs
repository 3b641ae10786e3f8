//! # dspace-rs
//!
//! `dspace-rs` is the dependency-resolution and object-construction core of a
//! design-space description library.
//!
//! The library provides:
//! - A parameter tree whose bounds may be expressions over other parameters
//! - Dependency linking between parameters and a dependency-respecting evaluation order
//! - Heuristic constructor resolution from declarative code mappings
//! - Instantiation of parameters through a registry of constructible types
//!
//! ## Basic Usage
//!
//! ```
//! use dspace_rs::parameters::{DesignSpace, Numeric, ParamDecl};
//!
//! let space = DesignSpace::from_decls(vec![
//!     ParamDecl::numeric("hi", Numeric::Double).incl_min("lo"),
//!     ParamDecl::numeric("lo", Numeric::Double).incl_min("0"),
//! ])
//! .unwrap();
//!
//! let first = space.evaluation_order().unwrap()[0];
//! assert_eq!(space.node(first).unwrap().id(), "lo");
//! ```

// Public modules
pub mod error;

// Parameter system
pub mod parameters;

// Code mappings and construction
pub mod mapping;

// Re-exports for convenience
pub use error::{Result, SpaceError};
pub use mapping::{ClassRegistry, CodeMappings, ConstructorResolver, Instantiator, MappingError, Value};
pub use parameters::{DesignSpace, EvaluationOrder, ParamDecl, ParamError, ParamStore};

/// Version of the library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
