//! value representation
//!
//! Every layer holds one document made of the following data types
//! - null
//! - boolean (true/false)
//! - integer (signed, i64)
//! - decimal (f64)
//! - string (utf-8)
//! - array (ordered list of values)
//! - object (order-preserving "map"/"dictionary", where the key is of type string)
//!
//! Documents are normalized into this shape by the loaders in [crate::format] and must
//! round-trip through them structurally: object keys and their order, array order and
//! scalar types are kept.
use serde::{
    ser::{SerializeMap, SerializeSeq},
    Serializer,
};

/// Object representation: keys keep their insertion order
pub type Map = indexmap::IndexMap<String, Value>;

/// All possible value types
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    #[default]
    Null,
    Boolean(bool),
    Integer(i64),
    Decimal(f64),
    String(String),
    Array(Vec<Value>),
    Object(Map),
}

impl Value {
    /// An empty object, the only composite that is ever created implicitly
    pub fn empty_object() -> Self {
        Value::Object(Map::new())
    }

    /// Name of the value type, used in diagnostics
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Boolean(_) => "boolean",
            Value::Integer(_) => "integer",
            Value::Decimal(_) => "decimal",
            Value::String(_) => "string",
            Value::Array(_) => "array",
            Value::Object(_) => "object",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Boolean(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Integer(value) => Some(*value),
            _ => None,
        }
    }

    /// Every integer is also a decimal
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Integer(value) => Some(*value as f64),
            Value::Decimal(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&Vec<Value>> {
        match self {
            Value::Array(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&Map> {
        match self {
            Value::Object(value) => Some(value),
            _ => None,
        }
    }

    /// Converts a parsed yaml document
    ///
    /// Object keys must be scalars; they are rendered as strings (`1: a` gets key `"1"`).
    /// Tags are dropped and the tagged value is kept. Integers must fit an `i64`.
    pub fn from_yaml(value: serde_yaml::Value) -> Result<Self, ConversionError> {
        use serde_yaml::Value as Yaml;

        Ok(match value {
            Yaml::Null => Value::Null,
            Yaml::Bool(value) => value.into(),
            Yaml::Number(number) if number.is_f64() => {
                Value::Decimal(number.as_f64().unwrap_or(f64::NAN))
            }
            Yaml::Number(number) => number
                .as_i64()
                .map(Value::Integer)
                .ok_or_else(|| ConversionError::IntegerOutOfRange(number.to_string()))?,
            Yaml::String(value) => value.into(),
            Yaml::Sequence(items) => Value::Array(
                items
                    .into_iter()
                    .map(Value::from_yaml)
                    .collect::<Result<_, _>>()?,
            ),
            Yaml::Mapping(mapping) => {
                let mut object = Map::with_capacity(mapping.len());
                for (key, value) in mapping {
                    let key = match key {
                        Yaml::String(key) => key,
                        Yaml::Bool(key) => key.to_string(),
                        Yaml::Number(key) => key.to_string(),
                        other => {
                            return Err(ConversionError::UnsupportedKey(format!("{other:?}")))
                        }
                    };
                    object.insert(key, Value::from_yaml(value)?);
                }
                Value::Object(object)
            }
            Yaml::Tagged(tagged) => Value::from_yaml(tagged.value)?,
        })
    }

    /// Converts a parsed json document, rejecting integers that do not fit an `i64`
    ///
    /// The infallible `From<serde_json::Value>` turns those into decimals instead.
    pub fn from_json(value: serde_json::Value) -> Result<Self, ConversionError> {
        use serde_json::Value as Json;

        Ok(match value {
            Json::Number(number) => match number.as_i64() {
                Some(int) => Value::Integer(int),
                None if number.is_f64() => Value::Decimal(number.as_f64().unwrap_or(f64::NAN)),
                None => return Err(ConversionError::IntegerOutOfRange(number.to_string())),
            },
            Json::Array(items) => Value::Array(
                items
                    .into_iter()
                    .map(Value::from_json)
                    .collect::<Result<_, _>>()?,
            ),
            Json::Object(object) => Value::Object(
                object
                    .into_iter()
                    .map(|(key, value)| Ok((key, Value::from_json(value)?)))
                    .collect::<Result<_, ConversionError>>()?,
            ),
            other => other.into(),
        })
    }

    /// First decimal in the document that is NaN or infinite, depth first
    pub fn find_non_finite(&self) -> Option<f64> {
        match self {
            Value::Decimal(decimal) if !decimal.is_finite() => Some(*decimal),
            Value::Array(items) => items.iter().find_map(Value::find_non_finite),
            Value::Object(object) => object.values().find_map(Value::find_non_finite),
            _ => None,
        }
    }
}

/// A parsed document that does not fit the [Value] model
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ConversionError {
    #[error("unsupported object key: {0}")]
    UnsupportedKey(String),
    #[error("integer {0} does not fit a signed 64 bit integer")]
    IntegerOutOfRange(String),
}

impl std::fmt::Display for Value {
    /// Compact json rendering
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let rendered = serde_json::to_string(self).map_err(|_| std::fmt::Error)?;
        f.write_str(&rendered)
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_string())
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Self::Boolean(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Self::Integer(value.into())
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Self::Decimal(value)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Value::Null, Into::into)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(value: Vec<T>) -> Self {
        Value::Array(value.into_iter().map(Into::into).collect())
    }
}

impl<K: ToString, V: Into<Value>> FromIterator<(K, V)> for Value {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Value::Object(
            iter.into_iter()
                .map(|(k, v)| (k.to_string(), v.into()))
                .collect(),
        )
    }
}

/// Integers beyond `i64` become decimals, see [Value::from_json] for a checked conversion
impl From<serde_json::Value> for Value {
    fn from(value: serde_json::Value) -> Self {
        use serde_json::Value as Json;

        match value {
            Json::Null => Value::Null,
            Json::Bool(b) => b.into(),
            Json::Number(n) => match n.as_i64() {
                Some(int) => Value::Integer(int),
                None => Value::Decimal(n.as_f64().unwrap_or(f64::NAN)),
            },
            Json::String(s) => s.into(),
            Json::Array(a) => a.into(),
            Json::Object(o) => o.into_iter().collect(),
        }
    }
}

impl serde::ser::Serialize for Value {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Value::Null => serializer.serialize_unit(),
            Value::Boolean(value) => serializer.serialize_bool(*value),
            Value::Integer(value) => serializer.serialize_i64(*value),
            Value::Decimal(value) => serializer.serialize_f64(*value),
            Value::String(value) => serializer.serialize_str(value),
            Value::Array(value) => {
                let mut ser = serializer.serialize_seq(Some(value.len()))?;
                for element in value {
                    ser.serialize_element(element)?;
                }
                ser.end()
            }
            Value::Object(value) => {
                let mut ser = serializer.serialize_map(Some(value.len()))?;
                for (element_key, element_value) in value {
                    ser.serialize_entry(element_key, element_value)?;
                }
                ser.end()
            }
        }
    }
}

/// Builds a [Value] from a json literal
///
/// ```
/// # use confrigulator::document;
/// let value = document!({"root": {"list": [1, 2, 3]}});
/// assert_eq!(value.as_object().unwrap().len(), 1);
/// ```
#[macro_export]
macro_rules! document {
    ($($json:tt)+) => {
        $crate::value::Value::from($crate::__private::serde_json::json!($($json)+))
    };
}
