//! Turning operator input into typed parameter values.
//!
//! Front-ends pick an input widget per declared SQL type with
//! [`InputKind::for_type`], turn entered text into a [`SqlValue`] with
//! [`InputKind::parse`], and may check values with [`validate_value`]. None of
//! this is authoritative: the call builder formats whatever value it is given,
//! and the database has the final word on types.

use crate::call::CallArgs;
use crate::metadata::ParameterSpec;
use crate::value::SqlValue;
use chrono::{NaiveDate, NaiveDateTime};
use std::fmt;

/// The kind of input a declared parameter type asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputKind {
    /// Whole numbers; parsed as `i64`.
    Integer,
    /// Finite decimal numbers.
    Decimal,
    /// Free text, kept as typed.
    Text,
    /// `YYYY-MM-DD`.
    Date,
    /// `true/false`, `t/f`, `yes/no` or `1/0`.
    Boolean,
    /// Date and time, with a space or `T` separator.
    Timestamp,
    /// Unrecognized type; entered as free text.
    Other,
}

impl InputKind {
    /// Classifies a SQL type token, ignoring case.
    pub fn for_type(ty: &str) -> Self {
        match ty.trim().to_ascii_uppercase().as_str() {
            "INT" | "INTEGER" | "BIGINT" | "SMALLINT" => InputKind::Integer,
            "DECIMAL" | "NUMERIC" | "FLOAT" | "REAL" | "DOUBLE" => InputKind::Decimal,
            "TEXT" | "VARCHAR" | "CHAR" | "STRING" => InputKind::Text,
            "DATE" => InputKind::Date,
            "BOOLEAN" | "BOOL" => InputKind::Boolean,
            "TIMESTAMP" | "DATETIME" => InputKind::Timestamp,
            _ => InputKind::Other,
        }
    }

    /// Parses entered text. Empty input is `Null` for every kind; for
    /// non-text kinds whitespace-only input is empty too.
    pub fn parse(self, raw: &str) -> Result<SqlValue, InputError> {
        if matches!(self, InputKind::Text | InputKind::Other) {
            return Ok(SqlValue::from(raw));
        }
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Ok(SqlValue::Null);
        }
        let invalid = || InputError::InvalidValue {
            value: raw.to_string(),
            expected: self,
        };

        match self {
            InputKind::Integer => trimmed.parse().map(SqlValue::Int).map_err(|_| invalid()),
            InputKind::Decimal => trimmed
                .parse::<f64>()
                .ok()
                .filter(|x| x.is_finite())
                .map(SqlValue::Float)
                .ok_or_else(invalid),
            InputKind::Date => NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
                .map(SqlValue::Date)
                .map_err(|_| invalid()),
            InputKind::Boolean => parse_bool(trimmed).map(SqlValue::Bool).ok_or_else(invalid),
            InputKind::Timestamp => parse_timestamp(trimmed)
                .map(|ts| SqlValue::Other(format!("{} {}", ts.date(), ts.time())))
                .ok_or_else(invalid),
            InputKind::Text | InputKind::Other => Ok(SqlValue::from(raw)),
        }
    }
}

impl fmt::Display for InputKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            InputKind::Integer => "integer",
            InputKind::Decimal => "decimal",
            InputKind::Text => "text",
            InputKind::Date => "date (YYYY-MM-DD)",
            InputKind::Boolean => "boolean",
            InputKind::Timestamp => "timestamp (YYYY-MM-DD HH:MM[:SS])",
            InputKind::Other => "text",
        };
        f.write_str(name)
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.to_ascii_lowercase().as_str() {
        "true" | "t" | "yes" | "1" => Some(true),
        "false" | "f" | "no" | "0" => Some(false),
        _ => None,
    }
}

fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    const FORMATS: [&str; 4] = [
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%d %H:%M",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%dT%H:%M",
    ];
    FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
}

/// Checks whether `value` plausibly fits a declared type. `Null` always fits.
pub fn validate_value(value: &SqlValue, ty: &str) -> bool {
    if value.is_absent() {
        return true;
    }
    match InputKind::for_type(ty) {
        InputKind::Integer => match value {
            SqlValue::Int(_) => true,
            SqlValue::Float(x) => x.fract() == 0.0,
            _ => false,
        },
        InputKind::Decimal => matches!(value, SqlValue::Int(_) | SqlValue::Float(_)),
        InputKind::Text => matches!(value, SqlValue::Text(_)),
        InputKind::Date => matches!(value, SqlValue::Date(_)),
        InputKind::Boolean => matches!(value, SqlValue::Bool(_)),
        InputKind::Timestamp | InputKind::Other => true,
    }
}

/// Builds call arguments from `name=value` text pairs.
///
/// Values are parsed per declared type and placed in declaration order;
/// declared parameters without input become `Null`.
pub fn bind_inputs(params: &[ParameterSpec], inputs: &[(String, String)]) -> Result<CallArgs, InputError> {
    if let Some((name, _)) = inputs
        .iter()
        .find(|(name, _)| !params.iter().any(|p| p.name == name.as_str()))
    {
        return Err(InputError::UnknownParameter(name.clone()));
    }

    let mut args = CallArgs::new();
    for param in params {
        let value = match inputs.iter().rev().find(|(name, _)| param.name == name.as_str()) {
            Some((_, raw)) => InputKind::for_type(&param.ty)
                .parse(raw)
                .map_err(|err| err.for_parameter(&param.name))?,
            None => SqlValue::Null,
        };
        args.push(param.name.clone(), value);
    }
    Ok(args)
}

/// Splits a `name=value` argument.
pub fn split_assignment(raw: &str) -> Result<(String, String), InputError> {
    raw.split_once('=')
        .map(|(name, value)| (name.trim().to_string(), value.to_string()))
        .ok_or_else(|| InputError::MalformedAssignment(raw.to_string()))
}

/// Errors from turning operator input into values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputError {
    /// Text that does not parse as the expected kind.
    InvalidValue { value: String, expected: InputKind },
    /// As `InvalidValue`, attributed to a named parameter.
    InvalidParameter {
        parameter: String,
        value: String,
        expected: InputKind,
    },
    /// A name the descriptor does not declare.
    UnknownParameter(String),
    /// An argument without `=`.
    MalformedAssignment(String),
}

impl InputError {
    fn for_parameter(self, parameter: &str) -> Self {
        match self {
            InputError::InvalidValue { value, expected } => InputError::InvalidParameter {
                parameter: parameter.to_string(),
                value,
                expected,
            },
            other => other,
        }
    }
}

impl fmt::Display for InputError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InputError::InvalidValue { value, expected } => {
                write!(f, "'{value}' is not a valid {expected}")
            }
            InputError::InvalidParameter {
                parameter,
                value,
                expected,
            } => write!(f, "parameter '{parameter}': '{value}' is not a valid {expected}"),
            InputError::UnknownParameter(name) => write!(f, "unknown parameter '{name}'"),
            InputError::MalformedAssignment(raw) => {
                write!(f, "expected name=value, got '{raw}'")
            }
        }
    }
}

impl std::error::Error for InputError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_types_case_insensitively() {
        assert_eq!(InputKind::for_type("bigint"), InputKind::Integer);
        assert_eq!(InputKind::for_type("NUMERIC"), InputKind::Decimal);
        assert_eq!(InputKind::for_type("varchar"), InputKind::Text);
        assert_eq!(InputKind::for_type("Date"), InputKind::Date);
        assert_eq!(InputKind::for_type("BOOL"), InputKind::Boolean);
        assert_eq!(InputKind::for_type("DATETIME"), InputKind::Timestamp);
        assert_eq!(InputKind::for_type("UUID"), InputKind::Other);
    }

    #[test]
    fn parses_each_kind() {
        assert_eq!(InputKind::Integer.parse(" 42 "), Ok(SqlValue::Int(42)));
        assert_eq!(InputKind::Decimal.parse("25.50"), Ok(SqlValue::Float(25.5)));
        assert_eq!(InputKind::Boolean.parse("Yes"), Ok(SqlValue::Bool(true)));
        assert_eq!(
            InputKind::Date.parse("2024-01-15"),
            Ok(SqlValue::Date(NaiveDate::from_ymd_opt(2024, 1, 15).expect("date")))
        );
        assert_eq!(
            InputKind::Timestamp.parse("2024-01-15T08:30"),
            Ok(SqlValue::Other("2024-01-15 08:30:00".to_string()))
        );
        assert_eq!(InputKind::Text.parse(" keep spaces "), Ok(SqlValue::Text(" keep spaces ".to_string())));
    }

    #[test]
    fn blank_input_is_null() {
        assert_eq!(InputKind::Integer.parse("  "), Ok(SqlValue::Null));
        assert!(InputKind::Text.parse("").expect("text").is_absent());
    }

    #[test]
    fn rejects_bad_input() {
        assert!(InputKind::Integer.parse("4.5").is_err());
        assert!(InputKind::Decimal.parse("inf").is_err());
        assert!(InputKind::Date.parse("15/01/2024").is_err());
        assert!(InputKind::Boolean.parse("maybe").is_err());
        assert!(InputKind::Boolean.parse("y").is_err());
        for raw in ["TRUE", "t", "yes", "1"] {
            assert_eq!(InputKind::Boolean.parse(raw), Ok(SqlValue::Bool(true)), "{raw}");
        }
        for raw in ["false", "F", "No", "0"] {
            assert_eq!(InputKind::Boolean.parse(raw), Ok(SqlValue::Bool(false)), "{raw}");
        }
        assert!(InputKind::Boolean.parse("N").is_err());
    }

    #[test]
    fn validator_accepts_matching_values() {
        assert!(validate_value(&SqlValue::Int(1), "INT"));
        assert!(validate_value(&SqlValue::Float(2.0), "INTEGER"));
        assert!(!validate_value(&SqlValue::Float(2.5), "INTEGER"));
        assert!(validate_value(&SqlValue::Int(1), "DECIMAL"));
        assert!(!validate_value(&SqlValue::Text("x".into()), "DECIMAL"));
        assert!(validate_value(&SqlValue::Null, "DATE"));
        assert!(validate_value(&SqlValue::Bool(true), "UUID"));
    }

    #[test]
    fn split_assignment_keeps_value_verbatim() {
        assert_eq!(
            split_assignment("note= a=b "),
            Ok(("note".to_string(), " a=b ".to_string()))
        );
        assert!(split_assignment("novalue").is_err());
    }
}
