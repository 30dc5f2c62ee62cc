//! Pass-through values carried across the bridge
//!
//! The bridge never interprets arguments or return values; it only moves them
//! between the caller and the foreign dispatcher. `Value` is the owned
//! container for that traffic, and `IntoValue`/`FromValue` convert between it
//! and the Rust types used in interface signatures.

use std::fmt;

use crate::error::{BridgeError, BridgeResult};

/// Owned value passed to and returned from the foreign side.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Value {
    /// Null / void
    #[default]
    Null,

    /// Boolean value
    Bool(bool),

    /// 32-bit signed integer
    I32(i32),

    /// 64-bit signed integer
    I64(i64),

    /// 64-bit floating point number
    F64(f64),

    /// String value
    Str(String),

    /// Array of values
    Array(Vec<Value>),

    /// Opaque object reference owned by whichever side produced it
    Object(u64),
}

impl Value {
    /// Check if this value is null
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Get the value's type
    pub fn value_type(&self) -> ValueType {
        match self {
            Value::Null => ValueType::Void,
            Value::Bool(_) => ValueType::Bool,
            Value::I32(_) => ValueType::I32,
            Value::I64(_) => ValueType::I64,
            Value::F64(_) => ValueType::F64,
            Value::Str(_) => ValueType::Str,
            Value::Array(_) => ValueType::Array,
            Value::Object(_) => ValueType::Object,
        }
    }

    /// Get the type name as a string
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            other => other.value_type().name(),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::I32(i) => write!(f, "{}", i),
            Value::I64(i) => write!(f, "{}", i),
            Value::F64(fl) => write!(f, "{}", fl),
            Value::Str(s) => write!(f, "\"{}\"", s),
            Value::Array(arr) => {
                write!(f, "[")?;
                for (i, v) in arr.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", v)?;
                }
                write!(f, "]")
            }
            Value::Object(id) => write!(f, "Object({:#x})", id),
        }
    }
}

/// Declared type of a method's return value.
///
/// Used to produce the zero value a call on a disabled proxy resolves to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueType {
    Void,
    Bool,
    I32,
    I64,
    F64,
    Str,
    Array,
    Object,
    /// Untyped (`Value` itself)
    Any,
}

impl ValueType {
    /// Zero value returned when no call could be made.
    pub fn zero_value(self) -> Value {
        match self {
            ValueType::Bool => Value::Bool(false),
            ValueType::I32 => Value::I32(0),
            ValueType::I64 => Value::I64(0),
            ValueType::F64 => Value::F64(0.0),
            ValueType::Void
            | ValueType::Str
            | ValueType::Array
            | ValueType::Object
            | ValueType::Any => Value::Null,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            ValueType::Void => "void",
            ValueType::Bool => "boolean",
            ValueType::I32 => "i32",
            ValueType::I64 => "i64",
            ValueType::F64 => "f64",
            ValueType::Str => "string",
            ValueType::Array => "array",
            ValueType::Object => "object",
            ValueType::Any => "any",
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ============================================================================
// Conversion Traits
// ============================================================================

/// Convert a Rust value into a bridge `Value`.
///
/// Implemented for every type that may appear as an argument or return type
/// of a `#[bridge_interface]` method.
pub trait IntoValue {
    fn into_value(self) -> Value;
}

/// Convert a bridge `Value` back into a Rust value.
pub trait FromValue: Sized {
    /// Declared type recorded in method descriptors
    const VALUE_TYPE: ValueType;

    /// Convert from Value, returning an error if the type doesn't match.
    fn from_value(value: Value) -> BridgeResult<Self>;
}

fn mismatch<T>(expected: ValueType, got: &Value) -> BridgeResult<T> {
    Err(BridgeError::TypeMismatch {
        expected,
        got: got.type_name(),
    })
}

impl IntoValue for Value {
    fn into_value(self) -> Value {
        self
    }
}

impl FromValue for Value {
    const VALUE_TYPE: ValueType = ValueType::Any;

    fn from_value(value: Value) -> BridgeResult<Self> {
        Ok(value)
    }
}

// Unit type (for methods that return void)
impl IntoValue for () {
    fn into_value(self) -> Value {
        Value::Null
    }
}

impl FromValue for () {
    const VALUE_TYPE: ValueType = ValueType::Void;

    // The foreign side may hand back anything for a void method; it is dropped.
    fn from_value(_value: Value) -> BridgeResult<Self> {
        Ok(())
    }
}

macro_rules! primitive_value {
    ($ty:ty, $variant:ident, $value_type:ident) => {
        impl IntoValue for $ty {
            fn into_value(self) -> Value {
                Value::$variant(self)
            }
        }

        impl FromValue for $ty {
            const VALUE_TYPE: ValueType = ValueType::$value_type;

            fn from_value(value: Value) -> BridgeResult<Self> {
                match value {
                    Value::$variant(v) => Ok(v),
                    other => mismatch(ValueType::$value_type, &other),
                }
            }
        }
    };
}

primitive_value!(bool, Bool, Bool);
primitive_value!(i32, I32, I32);
primitive_value!(f64, F64, F64);
primitive_value!(String, Str, Str);

impl IntoValue for i64 {
    fn into_value(self) -> Value {
        Value::I64(self)
    }
}

impl FromValue for i64 {
    const VALUE_TYPE: ValueType = ValueType::I64;

    fn from_value(value: Value) -> BridgeResult<Self> {
        match value {
            Value::I64(v) => Ok(v),
            // Widening is lossless; foreign dispatchers often only produce i32.
            Value::I32(v) => Ok(v as i64),
            other => mismatch(ValueType::I64, &other),
        }
    }
}

impl IntoValue for &str {
    fn into_value(self) -> Value {
        Value::Str(self.to_string())
    }
}

impl IntoValue for &String {
    fn into_value(self) -> Value {
        Value::Str(self.clone())
    }
}

impl<T: IntoValue> IntoValue for Option<T> {
    fn into_value(self) -> Value {
        match self {
            Some(v) => v.into_value(),
            None => Value::Null,
        }
    }
}

impl<T: FromValue> FromValue for Option<T> {
    const VALUE_TYPE: ValueType = T::VALUE_TYPE;

    fn from_value(value: Value) -> BridgeResult<Self> {
        match value {
            Value::Null => Ok(None),
            other => T::from_value(other).map(Some),
        }
    }
}

impl<T: IntoValue> IntoValue for Vec<T> {
    fn into_value(self) -> Value {
        Value::Array(self.into_iter().map(IntoValue::into_value).collect())
    }
}

impl<T: IntoValue + Clone> IntoValue for &[T] {
    fn into_value(self) -> Value {
        Value::Array(self.iter().cloned().map(IntoValue::into_value).collect())
    }
}

impl<T: FromValue> FromValue for Vec<T> {
    const VALUE_TYPE: ValueType = ValueType::Array;

    fn from_value(value: Value) -> BridgeResult<Self> {
        match value {
            Value::Array(items) => items.into_iter().map(T::from_value).collect(),
            other => mismatch(ValueType::Array, &other),
        }
    }
}
