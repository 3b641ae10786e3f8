//! Constructor resolution
//!
//! A [`ConstructorResolver`] decides which registered constructor builds a parameter, and
//! with which argument types. The formal argument identifiers of the parameter's code
//! mapping are classified in this order:
//!
//! 1. a global parameter id,
//! 2. a parameter id local to the parameter (a child of it or of one of its ancestors),
//! 3. a numeric keyword such as `integer` or `double`,
//! 4. the name of a registered type (or `String`).
//!
//! Selection first guesses from the public constructors: a single constructor is taken
//! as is, otherwise the one with a matching arity, otherwise the one left after filtering
//! by the types of the referenced parameters. When guessing fails, every identifier is
//! resolved to a type and the constructor with exactly that signature is looked up.
//!
//! Resolution happens at most once per resolver. A failed attempt leaves the resolver
//! unresolved, so it can be retried.

use crate::mapping::code_mapping::{CodeMapping, CodeMappings};
use crate::mapping::registry::{ClassDescriptor, ClassKind, ClassRegistry, ConstructorDescriptor};
use crate::mapping::types::{self, TypeRef};
use crate::parameters::{Numeric, ParamNode, ParamStore};
use std::collections::HashSet;
use thiserror::Error;
use tracing::{debug, trace};

/// Errors raised while resolving a constructor or instantiating a parameter.
///
/// Every variant carries the id of the parameter being built.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MappingError {
    #[error("{id}: No type for this parameter could be found in the code mappings")]
    MissingComponent { id: String },

    #[error("{id}: There is no such type '{class}'")]
    ClassNotFound { id: String, class: String },

    #[error("{id}: There is no type, sub-parameter or parameter with identifier '{identifier}'")]
    UnresolvableIdentifier { id: String, identifier: String },

    #[error("{id}: Type '{class}' has no public constructor")]
    NoConstructor { id: String, class: String },

    #[error("{id}: There is no constructor {signature} for '{class}'")]
    ConstructorNotFound {
        id: String,
        class: String,
        signature: String,
    },

    #[error("{id}: {candidates} constructors of '{class}' fit the formal arguments")]
    AmbiguousConstructor {
        id: String,
        class: String,
        candidates: usize,
    },

    #[error("{id}: You do not have the right to invoke constructor {signature} of '{class}'")]
    PermissionDenied {
        id: String,
        class: String,
        signature: String,
    },

    #[error("{id}: The {kind} '{class}' cannot be instantiated")]
    NotInstantiable {
        id: String,
        class: String,
        kind: ClassKind,
    },

    #[error("{id}: Constructor {signature} of '{class}' is not accessible")]
    Inaccessible {
        id: String,
        class: String,
        signature: String,
    },

    #[error("{id}: Arguments ({}) do not match constructor {expected}", .actual.join(" "))]
    ArgumentMismatch {
        id: String,
        expected: String,
        actual: Vec<String>,
    },

    #[error("{id}: Constructing '{class}' failed: {message}")]
    ConstructionFailed {
        id: String,
        class: String,
        message: String,
    },

    #[error("Parameter '{id}' not found")]
    ParameterNotFound { id: String },
}

impl MappingError {
    /// Id of the parameter the error is about
    pub fn param_id(&self) -> &str {
        match self {
            MappingError::MissingComponent { id }
            | MappingError::ClassNotFound { id, .. }
            | MappingError::UnresolvableIdentifier { id, .. }
            | MappingError::NoConstructor { id, .. }
            | MappingError::ConstructorNotFound { id, .. }
            | MappingError::AmbiguousConstructor { id, .. }
            | MappingError::PermissionDenied { id, .. }
            | MappingError::NotInstantiable { id, .. }
            | MappingError::Inaccessible { id, .. }
            | MappingError::ArgumentMismatch { id, .. }
            | MappingError::ConstructionFailed { id, .. }
            | MappingError::ParameterNotFound { id } => id,
        }
    }
}

/// How a formal argument identifier was classified
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgumentKind {
    Global,
    Local,
    Numeric(Numeric),
    Literal,
}

/// Which rule picked the constructor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection {
    /// The type has exactly one public constructor
    Single,

    /// Exactly one public constructor has as many parameters as there are identifiers
    Arity,

    /// Exactly one candidate is left after filtering by the referenced parameters' types
    Context,

    /// Exact lookup of the signature the identifiers resolve to
    Signature,
}

/// The outcome of a successful resolution
#[derive(Debug, Clone)]
pub struct ResolvedConstructor {
    class: String,
    kind: ClassKind,
    selection: Selection,
    constructor: ConstructorDescriptor,
}

impl ResolvedConstructor {
    /// Name of the type being constructed
    pub fn class(&self) -> &str {
        &self.class
    }

    pub fn kind(&self) -> ClassKind {
        self.kind
    }

    pub fn selection(&self) -> Selection {
        self.selection
    }

    /// The argument types the constructor expects
    pub fn arg_types(&self) -> &[TypeRef] {
        self.constructor.params()
    }

    pub fn constructor(&self) -> &ConstructorDescriptor {
        &self.constructor
    }

    pub fn signature(&self) -> String {
        self.constructor.signature()
    }
}

/// Resolution state of a resolver
#[derive(Debug, Clone)]
pub enum Resolution {
    Unresolved,
    Resolved(ResolvedConstructor),
}

struct Guess<'c> {
    selected: Option<(&'c ConstructorDescriptor, Selection)>,
    candidates: usize,
}

/// Resolves, once, the constructor that builds one parameter
pub struct ConstructorResolver<'a> {
    pub(super) param: &'a ParamNode,
    store: &'a dyn ParamStore,
    pub(super) registry: &'a ClassRegistry,
    mapping: Option<&'a CodeMapping>,
    formal_ids: Vec<String>,
    global_refs: HashSet<String>,
    local_refs: HashSet<String>,
    state: Resolution,
}

impl<'a> ConstructorResolver<'a> {
    /// Create an unresolved resolver for `param`.
    ///
    /// Without explicit formal arguments, a choice variant takes the formal arguments of
    /// its parent.
    pub fn new(
        param: &'a ParamNode,
        mappings: &'a CodeMappings,
        store: &'a dyn ParamStore,
        registry: &'a ClassRegistry,
    ) -> Self {
        let mapping = mappings.get(param.id());
        let formal_ids = Self::inherited_formal_ids(param, mappings, store);

        let global_refs: HashSet<String> = formal_ids
            .iter()
            .filter(|id| store.contains_param(id))
            .cloned()
            .collect();
        let local_refs: HashSet<String> = formal_ids
            .iter()
            .filter(|id| !global_refs.contains(*id))
            .filter(|id| store.get_param_for_local_id(id, param).is_some())
            .cloned()
            .collect();

        Self {
            param,
            store,
            registry,
            mapping,
            formal_ids,
            global_refs,
            local_refs,
            state: Resolution::Unresolved,
        }
    }

    fn inherited_formal_ids(
        param: &ParamNode,
        mappings: &CodeMappings,
        store: &dyn ParamStore,
    ) -> Vec<String> {
        if let Some(ids) = mappings.get(param.id()).and_then(CodeMapping::formal_ids) {
            return ids;
        }
        match store.parent(param) {
            Some(parent) if param.is_choice() => Self::inherited_formal_ids(parent, mappings, store),
            _ => Vec::new(),
        }
    }

    pub fn param(&self) -> &'a ParamNode {
        self.param
    }

    /// The formal argument identifiers, in order
    pub fn formal_ids(&self) -> &[String] {
        &self.formal_ids
    }

    /// Whether a global parameter is passed to the constructor
    pub fn is_global_id_used(&self, id: &str) -> bool {
        self.global_refs.contains(id)
    }

    /// Whether a local parameter is passed to the constructor
    pub fn is_local_init_by_constructor(&self, local_id: &str) -> bool {
        self.local_refs.contains(local_id)
    }

    pub fn is_resolved(&self) -> bool {
        matches!(self.state, Resolution::Resolved(_))
    }

    pub fn state(&self) -> &Resolution {
        &self.state
    }

    /// Argument types of the resolved constructor, if resolved
    pub fn arg_types(&self) -> Option<&[TypeRef]> {
        match &self.state {
            Resolution::Resolved(resolved) => Some(resolved.arg_types()),
            Resolution::Unresolved => None,
        }
    }

    /// Resolve the constructor, or return the earlier resolution.
    pub fn resolve(&mut self) -> Result<&ResolvedConstructor, MappingError> {
        if let Resolution::Unresolved = self.state {
            let resolved = self.try_resolve()?;
            debug!(
                param = %self.param.id(),
                class = %resolved.class(),
                signature = %resolved.signature(),
                selection = ?resolved.selection(),
                "resolved constructor"
            );
            self.state = Resolution::Resolved(resolved);
        }
        match &self.state {
            Resolution::Resolved(resolved) => Ok(resolved),
            Resolution::Unresolved => unreachable!(),
        }
    }

    /// Classify an identifier, or `None` if it is unknown
    pub fn classify(&self, identifier: &str) -> Option<ArgumentKind> {
        if self.store.contains_param(identifier) {
            Some(ArgumentKind::Global)
        } else if self.store.get_param_for_local_id(identifier, self.param).is_some() {
            Some(ArgumentKind::Local)
        } else if let Some(numeric) = Numeric::from_keyword(identifier) {
            Some(ArgumentKind::Numeric(numeric))
        } else if self.registry.is_known_type(identifier) {
            Some(ArgumentKind::Literal)
        } else {
            None
        }
    }

    /// Resolve one identifier to the type of the value it stands for.
    ///
    /// A referenced parameter without a known type falls back to a type of the same name.
    pub fn class_for(&self, identifier: &str) -> Result<TypeRef, MappingError> {
        let resolved = match self.classify(identifier) {
            Some(ArgumentKind::Global) | Some(ArgumentKind::Local) => self.param_type(identifier),
            Some(ArgumentKind::Numeric(numeric)) => Some(TypeRef::Primitive(numeric)),
            Some(ArgumentKind::Literal) => Some(TypeRef::class(identifier)),
            None => None,
        };
        resolved
            .or_else(|| {
                self.registry
                    .is_known_type(identifier)
                    .then(|| TypeRef::class(identifier))
            })
            .ok_or_else(|| MappingError::UnresolvableIdentifier {
                id: self.param.id().to_string(),
                identifier: identifier.to_string(),
            })
    }

    fn param_type(&self, identifier: &str) -> Option<TypeRef> {
        self.store
            .get_param(identifier)
            .or_else(|| self.store.get_param_for_local_id(identifier, self.param))
            .and_then(ParamNode::value_type)
    }

    /// Types of the referenced parameters by position; `None` where unknown
    fn context(&self) -> Vec<Option<TypeRef>> {
        self.formal_ids
            .iter()
            .map(|id| {
                if self.global_refs.contains(id) || self.local_refs.contains(id) {
                    self.param_type(id)
                } else {
                    None
                }
            })
            .collect()
    }

    fn try_resolve(&self) -> Result<ResolvedConstructor, MappingError> {
        let id = self.param.id();
        let component = self
            .mapping
            .and_then(CodeMapping::component)
            .ok_or_else(|| MappingError::MissingComponent { id: id.to_string() })?;
        let class = self
            .registry
            .get(component)
            .ok_or_else(|| MappingError::ClassNotFound {
                id: id.to_string(),
                class: component.to_string(),
            })?;
        if class.constructors().is_empty() {
            return Err(MappingError::NoConstructor {
                id: id.to_string(),
                class: component.to_string(),
            });
        }

        let guess = self.guess_constructor(class);
        if let Some((constructor, selection)) = guess.selected {
            return Ok(self.resolved(class, constructor, selection));
        }

        let arg_types = self
            .formal_ids
            .iter()
            .map(|identifier| self.class_for(identifier))
            .collect::<Result<Vec<_>, _>>()?;
        let signature = types::signature(&arg_types);
        trace!(param = %id, %signature, "looking up constructor by signature");

        match class.find_constructor(&arg_types) {
            Some(constructor) if constructor.is_public() => {
                Ok(self.resolved(class, constructor, Selection::Signature))
            }
            Some(_) => Err(MappingError::PermissionDenied {
                id: id.to_string(),
                class: component.to_string(),
                signature,
            }),
            None if class.public_constructors().is_empty() => Err(MappingError::NoConstructor {
                id: id.to_string(),
                class: component.to_string(),
            }),
            None if guess.candidates > 1 => Err(MappingError::AmbiguousConstructor {
                id: id.to_string(),
                class: component.to_string(),
                candidates: guess.candidates,
            }),
            None => Err(MappingError::ConstructorNotFound {
                id: id.to_string(),
                class: component.to_string(),
                signature,
            }),
        }
    }

    fn guess_constructor<'c>(&self, class: &'c ClassDescriptor) -> Guess<'c> {
        let public = class.public_constructors();
        if let [only] = public.as_slice() {
            return Guess {
                selected: Some((*only, Selection::Single)),
                candidates: 1,
            };
        }

        let mut candidates: Vec<&ConstructorDescriptor> = public
            .into_iter()
            .filter(|c| c.arity() == self.formal_ids.len())
            .collect();
        if let [only] = candidates.as_slice() {
            return Guess {
                selected: Some((*only, Selection::Arity)),
                candidates: 1,
            };
        }

        let context = self.context();
        if context.iter().any(Option::is_some) {
            for (position, expected) in context.iter().enumerate() {
                let Some(expected) = expected else {
                    continue;
                };
                if candidates.len() == 1 {
                    break;
                }
                candidates.retain(|c| c.params().get(position) == Some(expected));
            }
            trace!(param = %self.param.id(), ?context, remaining = candidates.len(), "reduced constructors by context");
            if let [only] = candidates.as_slice() {
                return Guess {
                    selected: Some((*only, Selection::Context)),
                    candidates: 1,
                };
            }
        }

        Guess {
            selected: None,
            candidates: candidates.len(),
        }
    }

    fn resolved(
        &self,
        class: &ClassDescriptor,
        constructor: &ConstructorDescriptor,
        selection: Selection,
    ) -> ResolvedConstructor {
        ResolvedConstructor {
            class: class.name().to_string(),
            kind: class.kind(),
            selection,
            constructor: constructor.clone(),
        }
    }
}
