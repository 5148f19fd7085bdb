//! transform pipeline
//!
//! A transform is a pure function rewriting a resolved [Value] before it is
//! returned to the caller. Each descriptor carries an ordered chain; [apply]
//! folds it left-to-right with the first transform receiving the raw string
//! fetched from the backing store. A failing transform is fatal for that
//! field read and surfaces to the caller - a declared transform is a
//! correctness contract, not a best-effort hint.

use crate::value::Value;
use std::sync::Arc;

/// A single value transform, shareable between descriptors
pub type Transform = Arc<dyn Fn(Value) -> Result<Value, TransformError> + Send + Sync>;

#[derive(thiserror::Error, Debug)]
pub enum TransformError {
    #[error("cannot parse {input:?} as {target}")]
    Parse {
        input: String,
        target: &'static str,
    },
    #[error("expected a {expected} value, got {got}")]
    UnexpectedType {
        expected: &'static str,
        got: &'static str,
    },
    #[error("{0}")]
    Custom(String),
}

impl TransformError {
    /// Failure raised by a caller-supplied transform
    pub fn custom(message: impl Into<String>) -> Self {
        TransformError::Custom(message.into())
    }
}

/// Fold `transforms` over `value`, left to right
///
/// Each transform receives the previous transform's output.
pub fn apply(transforms: &[Transform], value: Value) -> Result<Value, TransformError> {
    let mut value = value;
    for transform in transforms {
        value = transform(value)?;
    }
    Ok(value)
}

/// Parse a string value into [Value::Integer]; integers pass through
pub fn to_integer(value: Value) -> Result<Value, TransformError> {
    match value {
        Value::Integer(_) => Ok(value),
        Value::String(input) => input
            .trim()
            .parse::<i64>()
            .map(Value::Integer)
            .map_err(|_| TransformError::Parse {
                input,
                target: "integer",
            }),
        other => Err(TransformError::UnexpectedType {
            expected: "string",
            got: other.kind(),
        }),
    }
}

/// Parse a string value into [Value::Decimal]; integers widen, decimals pass
pub fn to_decimal(value: Value) -> Result<Value, TransformError> {
    match value {
        Value::Decimal(_) => Ok(value),
        Value::Integer(int) => Ok(Value::Decimal(int as f64)),
        Value::String(input) => input
            .trim()
            .parse::<f64>()
            .map(Value::Decimal)
            .map_err(|_| TransformError::Parse {
                input,
                target: "decimal",
            }),
        other => Err(TransformError::UnexpectedType {
            expected: "string",
            got: other.kind(),
        }),
    }
}

/// Parse a string value into [Value::Boolean]; booleans pass through
///
/// Accepts the usual spellings: true/false, 1/0, yes/no, on/off.
pub fn to_boolean(value: Value) -> Result<Value, TransformError> {
    match value {
        Value::Boolean(_) => Ok(value),
        Value::String(input) => {
            let parsed = match input.trim() {
                "true" | "1" | "yes" | "on" => Some(true),
                "false" | "0" | "no" | "off" => Some(false),
                _ => None,
            };

            match parsed {
                Some(boolean) => Ok(Value::Boolean(boolean)),
                None => Err(TransformError::Parse {
                    input,
                    target: "boolean",
                }),
            }
        }
        other => Err(TransformError::UnexpectedType {
            expected: "string",
            got: other.kind(),
        }),
    }
}

/// Trim surrounding whitespace from a string value
pub fn trimmed(value: Value) -> Result<Value, TransformError> {
    match value {
        Value::String(input) => Ok(Value::String(input.trim().to_string())),
        other => Err(TransformError::UnexpectedType {
            expected: "string",
            got: other.kind(),
        }),
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn chain_applies_in_declaration_order() {
        let transforms: Vec<Transform> = vec![Arc::new(trimmed), Arc::new(to_integer)];
        let result = apply(&transforms, Value::String("  8080 ".to_string())).unwrap();
        assert_eq!(result, Value::Integer(8080));
    }

    #[test]
    fn empty_chain_is_identity() {
        let result = apply(&[], Value::String("raw".to_string())).unwrap();
        assert_eq!(result, Value::String("raw".to_string()));
    }

    #[test]
    fn integer_parse_failure() {
        let error = to_integer(Value::String("not-a-number".to_string())).unwrap_err();
        assert_eq!(
            error.to_string(),
            "cannot parse \"not-a-number\" as integer"
        );
    }

    #[test]
    fn boolean_spellings() {
        assert_eq!(
            to_boolean(Value::String("true".to_string())).unwrap(),
            Value::Boolean(true)
        );
        assert_eq!(
            to_boolean(Value::String("off".to_string())).unwrap(),
            Value::Boolean(false)
        );
        assert!(to_boolean(Value::String("maybe".to_string())).is_err());
    }

    #[test]
    fn type_mismatch_is_reported() {
        let error = to_integer(Value::Boolean(true)).unwrap_err();
        assert_eq!(error.to_string(), "expected a string value, got boolean");
    }
}
