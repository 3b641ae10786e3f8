//! Runtime values passed to and returned from constructors

use crate::mapping::types::TypeRef;
use crate::parameters::Numeric;
use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// An instance of a registered type
#[derive(Clone)]
pub struct Instance {
    class: String,
    payload: Arc<dyn Any + Send + Sync>,
}

impl Instance {
    pub fn new<T: Any + Send + Sync>(class: impl Into<String>, payload: T) -> Self {
        Self {
            class: class.into(),
            payload: Arc::new(payload),
        }
    }

    /// The registered type this instance was built as
    pub fn class(&self) -> &str {
        &self.class
    }

    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.payload.downcast_ref::<T>()
    }

    pub fn is<T: Any>(&self) -> bool {
        self.payload.is::<T>()
    }
}

impl PartialEq for Instance {
    fn eq(&self, other: &Self) -> bool {
        self.class == other.class && Arc::ptr_eq(&self.payload, &other.payload)
    }
}

impl fmt::Debug for Instance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Instance").field("class", &self.class).finish_non_exhaustive()
    }
}

/// A value of a parameter, a constructor argument, or a constructed object
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Boolean(bool),
    Short(i16),
    Integer(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    Text(String),
    Object(Instance),
}

impl Value {
    /// The runtime type of the value, `None` for null
    pub fn runtime_type(&self) -> Option<TypeRef> {
        let numeric = match self {
            Value::Null => return None,
            Value::Text(_) => return Some(TypeRef::string()),
            Value::Object(instance) => return Some(TypeRef::class(instance.class())),
            Value::Boolean(_) => Numeric::Boolean,
            Value::Short(_) => Numeric::Short,
            Value::Integer(_) => Numeric::Integer,
            Value::Long(_) => Numeric::Long,
            Value::Float(_) => Numeric::Float,
            Value::Double(_) => Numeric::Double,
        };
        Some(TypeRef::Primitive(numeric))
    }

    /// Name of the runtime type, used in diagnostics
    pub fn type_name(&self) -> String {
        self.runtime_type()
            .map_or_else(|| "null".to_string(), |t| t.name().to_string())
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Convert a primitive value to a wider (or the same) numeric kind.
    ///
    /// Returns `None` for non-primitive values and narrowing conversions.
    pub fn widen_to(&self, target: Numeric) -> Option<Value> {
        let source = match self.runtime_type()? {
            TypeRef::Primitive(numeric) => numeric,
            TypeRef::Class(_) => return None,
        };
        if !source.widens_to(target) {
            return None;
        }
        if source == target {
            return Some(self.clone());
        }

        let widened = match (self, target) {
            (Value::Short(v), Numeric::Integer) => Value::Integer(i32::from(*v)),
            (Value::Short(v), Numeric::Long) => Value::Long(i64::from(*v)),
            (Value::Short(v), Numeric::Float) => Value::Float(f32::from(*v)),
            (Value::Short(v), Numeric::Double) => Value::Double(f64::from(*v)),
            (Value::Integer(v), Numeric::Long) => Value::Long(i64::from(*v)),
            (Value::Integer(v), Numeric::Float) => Value::Float(*v as f32),
            (Value::Integer(v), Numeric::Double) => Value::Double(f64::from(*v)),
            (Value::Long(v), Numeric::Float) => Value::Float(*v as f32),
            (Value::Long(v), Numeric::Double) => Value::Double(*v as f64),
            (Value::Float(v), Numeric::Double) => Value::Double(f64::from(*v)),
            _ => return None,
        };
        Some(widened)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Boolean(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_i16(&self) -> Option<i16> {
        match self {
            Value::Short(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_i32(&self) -> Option<i32> {
        match self {
            Value::Integer(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Long(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_f32(&self) -> Option<f32> {
        match self {
            Value::Float(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Double(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_instance(&self) -> Option<&Instance> {
        match self {
            Value::Object(instance) => Some(instance),
            _ => None,
        }
    }

    /// Borrow the payload of an object value as `T`
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.as_instance().and_then(Instance::downcast_ref)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Boolean(v)
    }
}

impl From<i16> for Value {
    fn from(v: i16) -> Self {
        Value::Short(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Integer(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Long(v)
    }
}

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Value::Float(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Double(v)
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<Instance> for Value {
    fn from(v: Instance) -> Self {
        Value::Object(v)
    }
}
