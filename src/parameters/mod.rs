//! # Parameter System
//!
//! This module models the parameters of a design space: named dimensions, optionally
//! nested, whose minimum and maximum bounds may be expressions over other parameters.
//!
//! ## Key Features
//!
//! - **Parameter Tree**: Numeric, structured and choice parameters with qualified ids
//! - **Bound Expressions**: Inclusive or exclusive min/max bounds written as expressions
//! - **Dependency Linking**: Parameters whose bounds mention other parameters are linked to them
//! - **Evaluation Order**: A dependency-respecting order with deterministic tie-breaks
//! - **Serialization Support**: Declarations and link options load from JSON with serde
//!
//! ## Core Components
//!
//! - [`ParamDecl`]: A pre-parsed declaration of one parameter and its children
//! - [`DesignSpace`]: The linked parameter tree, and the [`ParamStore`] lookup service
//! - [`ParamNode`]: One parameter with its dependency sets
//! - [`EvaluationOrder`]: The comparator and ordering over linked parameters
//! - [`Expression`]: Parse and evaluate bound expressions
//!
//! ## Example Usage
//!
//! ```rust
//! use dspace_rs::parameters::{DesignSpace, Numeric, ParamDecl, ParamStore};
//! use std::collections::HashMap;
//!
//! let space = DesignSpace::from_decls(vec![
//!     ParamDecl::numeric("offspring", Numeric::Integer).incl_min("1").excl_max("population"),
//!     ParamDecl::numeric("population", Numeric::Integer).incl_min("2").incl_max("500"),
//! ])
//! .unwrap();
//!
//! // `offspring` depends on `population`
//! let offspring = space.get_param("offspring").unwrap();
//! assert_eq!(offspring.dependency_count(), 1);
//!
//! let order: Vec<_> = space
//!     .evaluation_order()
//!     .unwrap()
//!     .into_iter()
//!     .map(|h| space.node(h).unwrap().id().to_string())
//!     .collect();
//! assert_eq!(order, vec!["population", "offspring"]);
//!
//! let values = HashMap::from([("population".to_string(), 40.0)]);
//! let bounds = space.evaluate_bounds("offspring", &values).unwrap();
//! assert!(bounds.contains(39.0));
//! assert!(!bounds.contains(40.0));
//! ```

pub mod bounds;
pub mod config;
pub mod expression;
pub mod linker;
pub mod node;
pub mod numeric;
pub mod order;
pub mod space;

// Re-export key types
pub use bounds::{BoundExprs, BoundKind, Bounds, BoundsError};
pub use config::{LinkConfig, MatchMode};
pub use expression::{EvaluationContext, Expression, ExpressionError};
pub use node::{NodeId, ParamKind, ParamNode};
pub use numeric::Numeric;
pub use order::{EvaluationOrder, OrderItem, RawElement};
pub use space::{DesignSpace, ParamDecl, ParamError, ParamStore};
