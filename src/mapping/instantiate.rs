//! Instantiation of parameters through their resolved constructors

use crate::mapping::code_mapping::CodeMappings;
use crate::mapping::constructor::{ConstructorResolver, MappingError, ResolvedConstructor};
use crate::mapping::registry::{ClassRegistry, InvokeError};
use crate::mapping::types::TypeRef;
use crate::mapping::value::Value;
use crate::parameters::{DesignSpace, NodeId, ParamStore};
use std::collections::HashMap;
use tracing::debug;

impl<'a> ConstructorResolver<'a> {
    /// Build a new object from already evaluated arguments.
    ///
    /// Resolves the constructor first if needed. Primitive arguments are widened to the
    /// declared parameter types before the factory runs.
    pub fn new_instance(&mut self, args: Vec<Value>) -> Result<Value, MappingError> {
        let (param, registry) = (self.param, self.registry);
        let id = param.id();
        let resolved = self.resolve()?;

        if !resolved.kind().is_instantiable() {
            return Err(MappingError::NotInstantiable {
                id: id.to_string(),
                class: resolved.class().to_string(),
                kind: resolved.kind(),
            });
        }

        let expected = resolved.arg_types();
        let matches = args.len() == expected.len()
            && args
                .iter()
                .zip(expected)
                .all(|(value, ty)| registry.is_assignable(value, ty));
        if !matches {
            return Err(MappingError::ArgumentMismatch {
                id: id.to_string(),
                expected: resolved.signature(),
                actual: args.iter().map(Value::type_name).collect(),
            });
        }

        let args = args
            .into_iter()
            .zip(expected)
            .map(|(value, ty)| match ty {
                TypeRef::Primitive(numeric) => value.widen_to(*numeric).unwrap_or(value),
                TypeRef::Class(_) => value,
            })
            .collect();

        let value = invoke(id, resolved, args)?;
        debug!(param = %id, class = %resolved.class(), "instantiated parameter");
        Ok(value)
    }
}

fn invoke(id: &str, resolved: &ResolvedConstructor, args: Vec<Value>) -> Result<Value, MappingError> {
    resolved.constructor().invoke(args).map_err(|err| match err {
        InvokeError::Inaccessible => MappingError::Inaccessible {
            id: id.to_string(),
            class: resolved.class().to_string(),
            signature: resolved.signature(),
        },
        InvokeError::Raised(message) => MappingError::ConstructionFailed {
            id: id.to_string(),
            class: resolved.class().to_string(),
            message,
        },
    })
}

/// Instantiates the parameters of one design space, keeping one resolver per parameter
pub struct Instantiator<'a> {
    space: &'a DesignSpace,
    registry: &'a ClassRegistry,
    mappings: &'a CodeMappings,
    resolvers: HashMap<NodeId, ConstructorResolver<'a>>,
}

impl<'a> Instantiator<'a> {
    pub fn new(space: &'a DesignSpace, registry: &'a ClassRegistry, mappings: &'a CodeMappings) -> Self {
        Self {
            space,
            registry,
            mappings,
            resolvers: HashMap::new(),
        }
    }

    /// The resolver of a parameter, created on first use
    pub fn resolver(&mut self, id: &str) -> Result<&mut ConstructorResolver<'a>, MappingError> {
        let space = self.space;
        let node = space
            .get_param(id)
            .ok_or_else(|| MappingError::ParameterNotFound { id: id.to_string() })?;
        let (mappings, registry) = (self.mappings, self.registry);

        Ok(self
            .resolvers
            .entry(node.handle())
            .or_insert_with(|| ConstructorResolver::new(node, mappings, space, registry)))
    }

    /// Resolve the constructor of a parameter
    pub fn resolve(&mut self, id: &str) -> Result<&ResolvedConstructor, MappingError> {
        self.resolver(id)?.resolve()
    }

    /// Build a parameter from already evaluated arguments
    pub fn new_instance(&mut self, id: &str, args: Vec<Value>) -> Result<Value, MappingError> {
        self.resolver(id)?.new_instance(args)
    }

    pub fn is_resolved(&self, id: &str) -> bool {
        self.space
            .handle(id)
            .and_then(|handle| self.resolvers.get(&handle))
            .is_some_and(ConstructorResolver::is_resolved)
    }
}
