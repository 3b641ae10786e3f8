//! Type references used in constructor signatures

use crate::parameters::Numeric;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Name of the builtin text type.
pub const STRING_TYPE: &str = "String";

/// A type a constructor argument or parameter value can have.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TypeRef {
    /// A primitive numeric kind
    Primitive(Numeric),

    /// A named (registered or builtin) type
    Class(String),
}

impl TypeRef {
    pub fn class(name: impl Into<String>) -> Self {
        TypeRef::Class(name.into())
    }

    /// The builtin text type
    pub fn string() -> Self {
        TypeRef::Class(STRING_TYPE.to_string())
    }

    /// The type name as it appears in diagnostics
    pub fn name(&self) -> &str {
        match self {
            TypeRef::Primitive(numeric) => numeric.type_name(),
            TypeRef::Class(name) => name,
        }
    }
}

impl From<Numeric> for TypeRef {
    fn from(numeric: Numeric) -> Self {
        TypeRef::Primitive(numeric)
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Format a signature as `(i32, String)`
pub fn signature(types: &[TypeRef]) -> String {
    let names: Vec<&str> = types.iter().map(TypeRef::name).collect();
    format!("({})", names.join(", "))
}
