//! casting of query results
//!
//! A [Cast] is any function from a resolved [Value] to another value. The standard casts
//! coerce between scalar types:
//!
//! | cast         | accepts                                                          |
//! |--------------|------------------------------------------------------------------|
//! | [to_integer] | integers, decimals without fraction, strings holding an integer  |
//! | [to_decimal] | integers, decimals, strings holding a number                     |
//! | [to_boolean] | booleans, `0`/`1`, strings `true/false/yes/no/on/off/1/0`        |
//! | [to_string]  | any scalar except null                                           |
use crate::value::Value;
use std::sync::Arc;

/// A shareable cast function
#[derive(Clone)]
pub struct Cast(Arc<dyn Fn(&Value) -> Result<Value, CastError> + Send + Sync>);

impl Cast {
    pub fn new(cast: impl Fn(&Value) -> Result<Value, CastError> + Send + Sync + 'static) -> Self {
        Self(Arc::new(cast))
    }

    pub fn apply(&self, value: &Value) -> Result<Value, CastError> {
        (self.0)(value)
    }

    pub fn integer() -> Self {
        Self::new(to_integer)
    }

    pub fn decimal() -> Self {
        Self::new(to_decimal)
    }

    pub fn boolean() -> Self {
        Self::new(to_boolean)
    }

    pub fn string() -> Self {
        Self::new(to_string)
    }
}

impl std::fmt::Debug for Cast {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Cast(..)")
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
#[error("cannot cast {found} to {expected}")]
pub struct CastError {
    pub expected: &'static str,
    pub found: Value,
}

impl CastError {
    pub fn new(expected: &'static str, found: &Value) -> Self {
        Self {
            expected,
            found: found.clone(),
        }
    }
}

pub fn to_integer(value: &Value) -> Result<Value, CastError> {
    let fail = || CastError::new("integer", value);

    match value {
        Value::Integer(_) => Ok(value.clone()),
        Value::Decimal(decimal)
            if decimal.fract() == 0.0
                && *decimal >= i64::MIN as f64
                && *decimal < i64::MAX as f64 =>
        {
            Ok(Value::Integer(*decimal as i64))
        }
        Value::String(s) => s.trim().parse().map(Value::Integer).map_err(|_| fail()),
        _ => Err(fail()),
    }
}

pub fn to_decimal(value: &Value) -> Result<Value, CastError> {
    match value {
        Value::Integer(int) => Ok(Value::Decimal(*int as f64)),
        Value::Decimal(_) => Ok(value.clone()),
        Value::String(s) => s
            .trim()
            .parse()
            .map(Value::Decimal)
            .map_err(|_| CastError::new("decimal", value)),
        _ => Err(CastError::new("decimal", value)),
    }
}

pub fn to_boolean(value: &Value) -> Result<Value, CastError> {
    let boolean = match value {
        Value::Boolean(b) => Some(*b),
        Value::Integer(0) => Some(false),
        Value::Integer(1) => Some(true),
        Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "yes" | "on" | "1" => Some(true),
            "false" | "no" | "off" | "0" => Some(false),
            _ => None,
        },
        _ => None,
    };

    boolean
        .map(Value::Boolean)
        .ok_or_else(|| CastError::new("boolean", value))
}

pub fn to_string(value: &Value) -> Result<Value, CastError> {
    match value {
        Value::String(_) => Ok(value.clone()),
        Value::Boolean(b) => Ok(b.to_string().into()),
        Value::Integer(int) => Ok(int.to_string().into()),
        Value::Decimal(decimal) => Ok(decimal.to_string().into()),
        _ => Err(CastError::new("string", value)),
    }
}
