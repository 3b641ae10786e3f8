//! Type registry
//!
//! Rust has no runtime class lookup, so every type a code mapping may name is registered
//! up front as a [`ClassDescriptor`]: its kind, its supertypes, and its constructors,
//! each of which is a parameter signature plus a factory closure.
//!
//! ```
//! use dspace_rs::mapping::{ClassDescriptor, ClassRegistry, Instance, TypeRef, Value};
//! use dspace_rs::parameters::Numeric;
//!
//! struct Point(i32, i32);
//!
//! let mut registry = ClassRegistry::new();
//! registry.register(ClassDescriptor::new("geo.Point").with_constructor(
//!     vec![Numeric::Integer.into(), Numeric::Integer.into()],
//!     |args| {
//!         let x = args[0].as_i32().unwrap_or_default();
//!         let y = args[1].as_i32().unwrap_or_default();
//!         Ok(Value::from(Instance::new("geo.Point", Point(x, y))))
//!     },
//! ));
//!
//! assert!(registry.contains("geo.Point"));
//! assert!(registry.is_known_type("String"));
//! ```

use crate::mapping::types::{self, TypeRef, STRING_TYPE};
use crate::mapping::value::Value;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// Errors a constructor factory reports
#[derive(Error, Debug, Clone, PartialEq)]
pub enum InvokeError {
    #[error("Constructor is not accessible")]
    Inaccessible,

    #[error("{0}")]
    Raised(String),
}

/// A constructor body: takes the actual arguments, returns the new object
pub type Factory = Arc<dyn Fn(Vec<Value>) -> Result<Value, InvokeError> + Send + Sync>;

/// Whether a registered type can be instantiated directly
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ClassKind {
    #[default]
    Concrete,
    Abstract,
    Interface,
}

impl ClassKind {
    pub fn is_instantiable(&self) -> bool {
        *self == ClassKind::Concrete
    }
}

impl fmt::Display for ClassKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClassKind::Concrete => write!(f, "concrete class"),
            ClassKind::Abstract => write!(f, "abstract class"),
            ClassKind::Interface => write!(f, "interface"),
        }
    }
}

/// Who may invoke a constructor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    Public,
    Restricted,
}

/// One constructor of a registered type
#[derive(Clone)]
pub struct ConstructorDescriptor {
    params: Vec<TypeRef>,
    visibility: Visibility,
    factory: Factory,
}

impl ConstructorDescriptor {
    pub fn new<F>(params: Vec<TypeRef>, visibility: Visibility, factory: F) -> Self
    where
        F: Fn(Vec<Value>) -> Result<Value, InvokeError> + Send + Sync + 'static,
    {
        Self {
            params,
            visibility,
            factory: Arc::new(factory),
        }
    }

    /// Declared parameter types, in order
    pub fn params(&self) -> &[TypeRef] {
        &self.params
    }

    pub fn arity(&self) -> usize {
        self.params.len()
    }

    pub fn visibility(&self) -> Visibility {
        self.visibility
    }

    pub fn is_public(&self) -> bool {
        self.visibility == Visibility::Public
    }

    pub fn signature(&self) -> String {
        types::signature(&self.params)
    }

    /// Run the factory with already checked arguments
    pub fn invoke(&self, args: Vec<Value>) -> Result<Value, InvokeError> {
        (self.factory)(args)
    }
}

impl fmt::Debug for ConstructorDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConstructorDescriptor")
            .field("params", &self.params)
            .field("visibility", &self.visibility)
            .finish_non_exhaustive()
    }
}

/// A registered type
#[derive(Debug, Clone)]
pub struct ClassDescriptor {
    name: String,
    kind: ClassKind,
    supertypes: Vec<String>,
    constructors: Vec<ConstructorDescriptor>,
}

impl ClassDescriptor {
    /// A concrete type without constructors
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            kind: ClassKind::Concrete,
            supertypes: Vec::new(),
            constructors: Vec::new(),
        }
    }

    pub fn with_kind(mut self, kind: ClassKind) -> Self {
        self.kind = kind;
        self
    }

    /// Declare a direct supertype (class or interface)
    pub fn extends(mut self, supertype: &str) -> Self {
        self.supertypes.push(supertype.to_string());
        self
    }

    /// Add a public constructor
    pub fn with_constructor<F>(self, params: Vec<TypeRef>, factory: F) -> Self
    where
        F: Fn(Vec<Value>) -> Result<Value, InvokeError> + Send + Sync + 'static,
    {
        self.with(ConstructorDescriptor::new(params, Visibility::Public, factory))
    }

    /// Add a constructor callers are not allowed to invoke
    pub fn with_restricted_constructor<F>(self, params: Vec<TypeRef>, factory: F) -> Self
    where
        F: Fn(Vec<Value>) -> Result<Value, InvokeError> + Send + Sync + 'static,
    {
        self.with(ConstructorDescriptor::new(params, Visibility::Restricted, factory))
    }

    pub fn with(mut self, constructor: ConstructorDescriptor) -> Self {
        self.constructors.push(constructor);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> ClassKind {
        self.kind
    }

    pub fn supertypes(&self) -> &[String] {
        &self.supertypes
    }

    pub fn constructors(&self) -> &[ConstructorDescriptor] {
        &self.constructors
    }

    pub fn public_constructors(&self) -> Vec<&ConstructorDescriptor> {
        self.constructors.iter().filter(|c| c.is_public()).collect()
    }

    /// The constructor with exactly this signature, public or not
    pub fn find_constructor(&self, params: &[TypeRef]) -> Option<&ConstructorDescriptor> {
        self.constructors.iter().find(|c| c.params() == params)
    }
}

/// Registered types by name
#[derive(Debug, Clone, Default)]
pub struct ClassRegistry {
    classes: HashMap<String, ClassDescriptor>,
}

impl ClassRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a type, returning the descriptor it replaces
    pub fn register(&mut self, class: ClassDescriptor) -> Option<ClassDescriptor> {
        self.classes.insert(class.name.clone(), class)
    }

    pub fn get(&self, name: &str) -> Option<&ClassDescriptor> {
        self.classes.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.classes.contains_key(name)
    }

    /// Registered, or the builtin `String`
    pub fn is_known_type(&self, name: &str) -> bool {
        name == STRING_TYPE || self.contains(name)
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    /// Whether `sub` is `sup` or (transitively) extends it
    pub fn is_subtype(&self, sub: &str, sup: &str) -> bool {
        let mut visited = HashSet::new();
        let mut stack = vec![sub];
        while let Some(name) = stack.pop() {
            if name == sup {
                return true;
            }
            if !visited.insert(name) {
                continue;
            }
            if let Some(class) = self.get(name) {
                stack.extend(class.supertypes().iter().map(String::as_str));
            }
        }
        false
    }

    /// Whether a value may be passed where `expected` is declared
    pub fn is_assignable(&self, value: &Value, expected: &TypeRef) -> bool {
        match (value, expected) {
            (Value::Null, TypeRef::Primitive(_)) => false,
            (Value::Null, TypeRef::Class(_)) => true,
            (Value::Text(_), TypeRef::Class(name)) => name == STRING_TYPE,
            (Value::Object(instance), TypeRef::Class(name)) => self.is_subtype(instance.class(), name),
            (value, TypeRef::Primitive(target)) => match value.runtime_type() {
                Some(TypeRef::Primitive(actual)) => actual.widens_to(*target),
                _ => false,
            },
            _ => false,
        }
    }
}
