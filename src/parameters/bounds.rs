//! Parameter bound declarations and evaluated bounds
//!
//! A numeric parameter may declare an inclusive or exclusive minimum and maximum.
//! Each declaration is an expression that can reference other parameters, which is
//! what creates the dependency graph between parameters. Once the referenced
//! parameters have values, the expressions evaluate to a concrete [`Bounds`] interval.

use serde::{Deserialize, Serialize};
use std::f64::{INFINITY, NEG_INFINITY};
use std::fmt;
use thiserror::Error;

/// Errors that can occur when working with parameter bounds
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BoundsError {
    #[error("Invalid bounds: min ({min}) must not exceed max ({max})")]
    InvalidBounds { min: f64, max: f64 },

    #[error("Value {value} is outside bounds {bounds}")]
    ValueOutsideBounds { value: f64, bounds: Bounds },
}

/// The four ways a parameter can bound its value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum BoundKind {
    InclMin,
    ExclMin,
    InclMax,
    ExclMax,
}

impl BoundKind {
    pub const ALL: [BoundKind; 4] = [
        BoundKind::InclMin,
        BoundKind::ExclMin,
        BoundKind::InclMax,
        BoundKind::ExclMax,
    ];

    /// Both maximum kinds, inclusive first.
    pub const MAX: [BoundKind; 2] = [BoundKind::InclMax, BoundKind::ExclMax];

    /// Both minimum kinds, inclusive first.
    pub const MIN: [BoundKind; 2] = [BoundKind::InclMin, BoundKind::ExclMin];

    /// The descriptor attribute name of this bound.
    pub fn attribute(&self) -> &'static str {
        match self {
            BoundKind::InclMin => "inclMin",
            BoundKind::ExclMin => "exclMin",
            BoundKind::InclMax => "inclMax",
            BoundKind::ExclMax => "exclMax",
        }
    }

    pub fn is_exclusive(&self) -> bool {
        matches!(self, BoundKind::ExclMin | BoundKind::ExclMax)
    }
}

impl fmt::Display for BoundKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.attribute())
    }
}

/// The raw bound expressions declared for a parameter.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoundExprs {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    incl_min: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    excl_min: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    incl_max: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    excl_max: Option<String>,
}

impl BoundExprs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the expression declared for a bound kind
    pub fn get(&self, kind: BoundKind) -> Option<&str> {
        match kind {
            BoundKind::InclMin => self.incl_min.as_deref(),
            BoundKind::ExclMin => self.excl_min.as_deref(),
            BoundKind::InclMax => self.incl_max.as_deref(),
            BoundKind::ExclMax => self.excl_max.as_deref(),
        }
    }

    /// Declare (or clear) the expression for a bound kind
    pub fn set(&mut self, kind: BoundKind, expr: Option<&str>) {
        let expr = expr.map(|s| s.trim().to_string());
        match kind {
            BoundKind::InclMin => self.incl_min = expr,
            BoundKind::ExclMin => self.excl_min = expr,
            BoundKind::InclMax => self.incl_max = expr,
            BoundKind::ExclMax => self.excl_max = expr,
        }
    }

    /// Iterate over the declared bounds
    pub fn iter(&self) -> impl Iterator<Item = (BoundKind, &str)> {
        BoundKind::ALL
            .into_iter()
            .filter_map(move |kind| self.get(kind).map(|expr| (kind, expr)))
    }

    pub fn is_empty(&self) -> bool {
        self.iter().next().is_none()
    }

    /// The effective minimum declaration; an inclusive minimum wins over an exclusive one.
    pub fn min(&self) -> Option<(BoundKind, &str)> {
        BoundKind::MIN
            .into_iter()
            .find_map(|kind| self.get(kind).map(|expr| (kind, expr)))
    }

    /// The effective maximum declaration; an inclusive maximum wins over an exclusive one.
    pub fn max(&self) -> Option<(BoundKind, &str)> {
        BoundKind::MAX
            .into_iter()
            .find_map(|kind| self.get(kind).map(|expr| (kind, expr)))
    }
}

/// An evaluated value interval
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    /// Lower end of the interval
    pub min: f64,

    /// Upper end of the interval
    pub max: f64,

    /// Whether `min` itself is excluded
    pub min_exclusive: bool,

    /// Whether `max` itself is excluded
    pub max_exclusive: bool,
}

impl Serialize for Bounds {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        use serde::ser::SerializeStruct;

        let mut state = serializer.serialize_struct("Bounds", 4)?;

        // Infinite ends are written as null
        if self.min.is_infinite() && self.min.is_sign_negative() {
            state.serialize_field("min", &serde_json::Value::Null)?;
        } else {
            state.serialize_field("min", &self.min)?;
        }

        if self.max.is_infinite() && self.max.is_sign_positive() {
            state.serialize_field("max", &serde_json::Value::Null)?;
        } else {
            state.serialize_field("max", &self.max)?;
        }

        state.serialize_field("minExclusive", &self.min_exclusive)?;
        state.serialize_field("maxExclusive", &self.max_exclusive)?;
        state.end()
    }
}

impl<'de> Deserialize<'de> for Bounds {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(rename_all = "camelCase")]
        struct BoundsHelper {
            #[serde(default)]
            min: Option<f64>,

            #[serde(default)]
            max: Option<f64>,

            #[serde(default)]
            min_exclusive: bool,

            #[serde(default)]
            max_exclusive: bool,
        }

        let helper = BoundsHelper::deserialize(deserializer)?;

        Ok(Bounds {
            min: helper.min.unwrap_or(NEG_INFINITY),
            max: helper.max.unwrap_or(INFINITY),
            min_exclusive: helper.min_exclusive,
            max_exclusive: helper.max_exclusive,
        })
    }
}

impl Default for Bounds {
    fn default() -> Self {
        Self {
            min: NEG_INFINITY,
            max: INFINITY,
            min_exclusive: false,
            max_exclusive: false,
        }
    }
}

impl Bounds {
    /// Create an inclusive interval `[min, max]`
    ///
    /// # Examples
    ///
    /// ```
    /// use dspace_rs::parameters::Bounds;
    ///
    /// let bounds = Bounds::new(0.0, 10.0).unwrap();
    /// assert!(bounds.contains(10.0));
    /// assert!(Bounds::new(10.0, 0.0).is_err());
    /// ```
    pub fn new(min: f64, max: f64) -> Result<Self, BoundsError> {
        if min > max {
            return Err(BoundsError::InvalidBounds { min, max });
        }

        Ok(Self {
            min,
            max,
            ..Self::default()
        })
    }

    pub fn unbounded() -> Self {
        Self::default()
    }

    /// Mark the lower end as excluded
    pub fn exclude_min(mut self) -> Self {
        self.min_exclusive = true;
        self
    }

    /// Mark the upper end as excluded
    pub fn exclude_max(mut self) -> Self {
        self.max_exclusive = true;
        self
    }

    /// Check if a value lies inside the interval, honouring exclusive ends
    pub fn contains(&self, value: f64) -> bool {
        let above = if self.min_exclusive {
            value > self.min
        } else {
            value >= self.min
        };
        let below = if self.max_exclusive {
            value < self.max
        } else {
            value <= self.max
        };
        above && below
    }

    /// Fail with [`BoundsError::ValueOutsideBounds`] unless the value is inside
    pub fn check(&self, value: f64) -> Result<f64, BoundsError> {
        if self.contains(value) {
            Ok(value)
        } else {
            Err(BoundsError::ValueOutsideBounds {
                value,
                bounds: *self,
            })
        }
    }

    pub fn is_finite(&self) -> bool {
        self.min.is_finite() && self.max.is_finite()
    }
}

impl fmt::Display for Bounds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let open = if self.min_exclusive { '(' } else { '[' };
        let close = if self.max_exclusive { ')' } else { ']' };
        write!(f, "{}{}, {}{}", open, self.min, self.max, close)
    }
}
