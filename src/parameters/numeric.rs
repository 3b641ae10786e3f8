//! Primitive numeric kinds
//!
//! Numeric parameters carry one of these kinds, and formal constructor arguments may
//! name a kind directly by keyword (`integer`, `double`, ...).

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A primitive value kind a numeric parameter can take.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Numeric {
    Boolean,
    Short,
    Integer,
    Long,
    Float,
    Double,
}

impl Numeric {
    /// All numeric kinds, narrowest first.
    pub const ALL: [Numeric; 6] = [
        Numeric::Boolean,
        Numeric::Short,
        Numeric::Integer,
        Numeric::Long,
        Numeric::Float,
        Numeric::Double,
    ];

    /// The keyword used for this kind in descriptors and code mappings.
    pub fn keyword(&self) -> &'static str {
        match self {
            Numeric::Boolean => "boolean",
            Numeric::Short => "short",
            Numeric::Integer => "integer",
            Numeric::Long => "long",
            Numeric::Float => "float",
            Numeric::Double => "double",
        }
    }

    /// The name of the primitive type backing this kind.
    pub fn type_name(&self) -> &'static str {
        match self {
            Numeric::Boolean => "bool",
            Numeric::Short => "i16",
            Numeric::Integer => "i32",
            Numeric::Long => "i64",
            Numeric::Float => "f32",
            Numeric::Double => "f64",
        }
    }

    /// Look up a kind by keyword, ignoring case.
    ///
    /// # Examples
    ///
    /// ```
    /// use dspace_rs::parameters::Numeric;
    ///
    /// assert_eq!(Numeric::from_keyword("INTEGER"), Some(Numeric::Integer));
    /// assert_eq!(Numeric::from_keyword("integr"), None);
    /// ```
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.keyword().eq_ignore_ascii_case(keyword))
    }

    /// Check whether an identifier is a numeric keyword.
    pub fn is_numeric(identifier: &str) -> bool {
        Self::from_keyword(identifier).is_some()
    }

    /// Whether a value of this kind may be passed where `target` is expected
    /// (identity or a lossless primitive widening).
    pub fn widens_to(&self, target: Numeric) -> bool {
        use Numeric::*;

        match (self, target) {
            (a, b) if *a == b => true,
            (Short, Integer | Long | Float | Double) => true,
            (Integer, Long | Float | Double) => true,
            (Long, Float | Double) => true,
            (Float, Double) => true,
            _ => false,
        }
    }
}

impl fmt::Display for Numeric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

impl FromStr for Numeric {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_keyword(s).ok_or_else(|| format!("'{}' is not a numeric type", s))
    }
}
