//! Typed extraction of `sea_query::Value`s read back from a session.
//!
//! Sessions do not agree on storage classes: `SQLite` hands back every integer as
//! a 64-bit value and stores booleans and timestamps as integers or text, while
//! `PostgreSQL` reports the exact column type. [`TryGetable`] accepts every
//! lossless representation of the requested Rust type.

use chrono::NaiveDateTime;
use sea_query::Value;

/// Text layouts accepted for timestamps stored as strings.
pub(crate) const TIMESTAMP_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"];

/// Error type for value extraction failures
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValueExtractionError {
    /// The value is null
    NullValue,
    /// The value type doesn't match the expected type
    TypeMismatch { expected: String, actual: String },
    /// Value conversion failed (overflow, invalid format)
    ConversionError(String),
}

impl std::fmt::Display for ValueExtractionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValueExtractionError::NullValue => write!(f, "Value is null"),
            ValueExtractionError::TypeMismatch { expected, actual } => {
                write!(f, "Type mismatch: expected {expected}, got {actual}")
            }
            ValueExtractionError::ConversionError(msg) => write!(f, "Conversion error: {msg}"),
        }
    }
}

impl std::error::Error for ValueExtractionError {}

/// Safe extraction of a Rust value from a `sea_query::Value`
///
/// ```
/// use fluentguard::TryGetable;
/// use sea_query::Value;
///
/// assert_eq!(i32::try_get(&Value::BigInt(Some(42))), Ok(42));
/// assert_eq!(bool::try_get(&Value::BigInt(Some(1))), Ok(true));
/// assert_eq!(Option::<String>::try_get(&Value::String(None)), Ok(None));
/// ```
pub trait TryGetable: Sized {
    /// Extract a value, failing on nulls and incompatible variants
    fn try_get(value: &Value) -> Result<Self, ValueExtractionError>;
}

impl<T: TryGetable> TryGetable for Option<T> {
    fn try_get(value: &Value) -> Result<Self, ValueExtractionError> {
        if is_null(value) {
            return Ok(None);
        }
        T::try_get(value).map(Some)
    }
}

fn mismatch(expected: &str, value: &Value) -> ValueExtractionError {
    ValueExtractionError::TypeMismatch {
        expected: expected.to_string(),
        actual: format!("{value:?}"),
    }
}

/// Widen any integer variant to `i128` so narrowing can be range checked once.
fn integer_of(value: &Value) -> Option<i128> {
    match value {
        Value::TinyInt(Some(v)) => Some(i128::from(*v)),
        Value::SmallInt(Some(v)) => Some(i128::from(*v)),
        Value::Int(Some(v)) => Some(i128::from(*v)),
        Value::BigInt(Some(v)) => Some(i128::from(*v)),
        Value::TinyUnsigned(Some(v)) => Some(i128::from(*v)),
        Value::SmallUnsigned(Some(v)) => Some(i128::from(*v)),
        Value::Unsigned(Some(v)) => Some(i128::from(*v)),
        Value::BigUnsigned(Some(v)) => Some(i128::from(*v)),
        _ => None,
    }
}

macro_rules! impl_try_getable_integer {
    ($($type:ty => $expected:expr),* $(,)?) => {
        $(
            impl TryGetable for $type {
                fn try_get(value: &Value) -> Result<Self, ValueExtractionError> {
                    if is_null(value) {
                        return Err(ValueExtractionError::NullValue);
                    }
                    let wide = integer_of(value).ok_or_else(|| mismatch($expected, value))?;
                    <$type>::try_from(wide).map_err(|_| {
                        ValueExtractionError::ConversionError(format!(
                            "{wide} is out of range for {}",
                            stringify!($type)
                        ))
                    })
                }
            }
        )*
    };
}

impl_try_getable_integer!(
    i8 => "TinyInt",
    i16 => "SmallInt",
    i32 => "Int",
    i64 => "BigInt",
    u8 => "TinyUnsigned",
    u16 => "SmallUnsigned",
    u32 => "Unsigned",
    u64 => "BigUnsigned",
);

impl TryGetable for bool {
    fn try_get(value: &Value) -> Result<Self, ValueExtractionError> {
        match value {
            Value::Bool(Some(b)) => Ok(*b),
            v if is_null(v) => Err(ValueExtractionError::NullValue),
            v => match integer_of(v) {
                Some(0) => Ok(false),
                Some(1) => Ok(true),
                Some(other) => Err(ValueExtractionError::ConversionError(format!(
                    "{other} is not a boolean"
                ))),
                None => Err(mismatch("Bool", v)),
            },
        }
    }
}

impl TryGetable for f64 {
    fn try_get(value: &Value) -> Result<Self, ValueExtractionError> {
        match value {
            Value::Double(Some(d)) => Ok(*d),
            Value::Float(Some(f)) => Ok(f64::from(*f)),
            v if is_null(v) => Err(ValueExtractionError::NullValue),
            v => Err(mismatch("Double", v)),
        }
    }
}

impl TryGetable for f32 {
    fn try_get(value: &Value) -> Result<Self, ValueExtractionError> {
        match value {
            Value::Float(Some(f)) => Ok(*f),
            #[allow(clippy::cast_possible_truncation)]
            Value::Double(Some(d)) => Ok(*d as f32),
            v if is_null(v) => Err(ValueExtractionError::NullValue),
            v => Err(mismatch("Float", v)),
        }
    }
}

impl TryGetable for String {
    fn try_get(value: &Value) -> Result<Self, ValueExtractionError> {
        match value {
            Value::String(Some(s)) => Ok(s.to_string()),
            Value::Char(Some(c)) => Ok(c.to_string()),
            v if is_null(v) => Err(ValueExtractionError::NullValue),
            v => Err(mismatch("String", v)),
        }
    }
}

impl TryGetable for Vec<u8> {
    fn try_get(value: &Value) -> Result<Self, ValueExtractionError> {
        match value {
            Value::Bytes(Some(b)) => Ok(b.to_vec()),
            v if is_null(v) => Err(ValueExtractionError::NullValue),
            v => Err(mismatch("Bytes", v)),
        }
    }
}

impl TryGetable for NaiveDateTime {
    fn try_get(value: &Value) -> Result<Self, ValueExtractionError> {
        match value {
            Value::ChronoDateTime(Some(dt)) => {
                let dt: &NaiveDateTime = dt;
                Ok(*dt)
            }
            Value::String(Some(s)) => parse_timestamp(s).ok_or_else(|| {
                ValueExtractionError::ConversionError(format!("'{s}' is not a timestamp"))
            }),
            v if is_null(v) => Err(ValueExtractionError::NullValue),
            v => Err(mismatch("ChronoDateTime", v)),
        }
    }
}

impl TryGetable for serde_json::Value {
    fn try_get(value: &Value) -> Result<Self, ValueExtractionError> {
        match value {
            Value::Json(Some(j)) => {
                let j: &serde_json::Value = j;
                Ok(j.clone())
            }
            Value::String(Some(s)) => serde_json::from_str(s)
                .map_err(|e| ValueExtractionError::ConversionError(e.to_string())),
            v if is_null(v) => Err(ValueExtractionError::NullValue),
            v => Err(mismatch("Json", v)),
        }
    }
}

pub(crate) fn parse_timestamp(text: &str) -> Option<NaiveDateTime> {
    TIMESTAMP_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(text, fmt).ok())
}

/// Whether a value is SQL NULL, whatever its declared variant
pub fn is_null(value: &Value) -> bool {
    matches!(
        value,
        Value::Bool(None)
            | Value::TinyInt(None)
            | Value::SmallInt(None)
            | Value::Int(None)
            | Value::BigInt(None)
            | Value::TinyUnsigned(None)
            | Value::SmallUnsigned(None)
            | Value::Unsigned(None)
            | Value::BigUnsigned(None)
            | Value::Float(None)
            | Value::Double(None)
            | Value::String(None)
            | Value::Char(None)
            | Value::Bytes(None)
            | Value::Json(None)
            | Value::ChronoDateTime(None)
    )
}

/// Stable textual identity of a value, used to compare primary keys across rows.
///
/// Integer variants collapse to the same key so that `Int(1)` from one backend
/// and `BigInt(1)` from another identify the same entity.
pub(crate) fn identity_key(value: &Value) -> String {
    if is_null(value) {
        return "NULL".to_string();
    }
    if let Some(i) = integer_of(value) {
        return i.to_string();
    }
    match value {
        Value::String(Some(s)) => format!("'{}'", s.replace('\'', "''")),
        Value::Bytes(Some(b)) => b.iter().map(|byte| format!("{byte:02x}")).collect(),
        other => format!("{other:?}"),
    }
}
