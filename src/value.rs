//! Typed parameter values and their SQL literal text.

use chrono::NaiveDate;
use std::fmt;

/// A parameter value supplied by a front-end.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    /// No value; renders as `NULL`.
    Null,
    /// Free text; quoted and escaped.
    Text(String),
    /// Renders as `TRUE` / `FALSE`.
    Bool(bool),
    /// Integer, rendered unquoted.
    Int(i64),
    /// Floating point, rendered unquoted when finite.
    Float(f64),
    /// Calendar date, rendered as a quoted ISO date.
    Date(NaiveDate),
    /// Anything else, already in its display form. Quoted but not escaped.
    Other(String),
}

/// Semantic tag of a value, in formatting priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueTag {
    /// `Null` or empty text.
    Absent,
    /// Non-empty text.
    Text,
    /// `TRUE` or `FALSE`.
    Boolean,
    /// Integer or floating point.
    Numeric,
    /// Calendar date.
    Date,
    /// Anything else; rendered through the quoted fallback.
    Other,
}

impl SqlValue {
    /// Classifies the value. Empty text is absent, like `Null`.
    pub fn tag(&self) -> ValueTag {
        match self {
            SqlValue::Null => ValueTag::Absent,
            SqlValue::Text(text) if text.is_empty() => ValueTag::Absent,
            SqlValue::Text(_) => ValueTag::Text,
            SqlValue::Bool(_) => ValueTag::Boolean,
            SqlValue::Int(_) | SqlValue::Float(_) => ValueTag::Numeric,
            SqlValue::Date(_) => ValueTag::Date,
            SqlValue::Other(_) => ValueTag::Other,
        }
    }

    /// Returns true for `Null` and empty text.
    pub fn is_absent(&self) -> bool {
        self.tag() == ValueTag::Absent
    }

    /// The value's natural string form, unquoted.
    fn raw_text(&self) -> String {
        match self {
            SqlValue::Null => String::new(),
            SqlValue::Text(text) | SqlValue::Other(text) => text.clone(),
            SqlValue::Bool(b) => b.to_string(),
            SqlValue::Int(n) => n.to_string(),
            SqlValue::Float(x) => x.to_string(),
            SqlValue::Date(date) => date.to_string(),
        }
    }

    /// Renders the value as literal SQL text.
    pub fn to_literal(&self) -> String {
        format_literal(self)
    }
}

/// Renders `value` as a SQL literal.
///
/// Dispatch is on [`SqlValue::tag`], in tag order: absent values become
/// `NULL`, text is single-quoted with embedded quotes doubled, booleans are
/// upper-cased, numbers are bare, dates are quoted ISO text. Everything else
/// falls back to its natural string form in single quotes, unescaped.
pub fn format_literal(value: &SqlValue) -> String {
    match (value.tag(), value) {
        (ValueTag::Absent, _) => "NULL".to_string(),
        (ValueTag::Text, SqlValue::Text(text)) => quote_text(text),
        (ValueTag::Boolean, SqlValue::Bool(true)) => "TRUE".to_string(),
        (ValueTag::Boolean, SqlValue::Bool(false)) => "FALSE".to_string(),
        (ValueTag::Numeric, SqlValue::Int(n)) => n.to_string(),
        (ValueTag::Numeric, SqlValue::Float(x)) => format_float(*x),
        (ValueTag::Date, SqlValue::Date(date)) => format!("'{date}'"),
        _ => format!("'{}'", value.raw_text()),
    }
}

/// Wraps `text` in single quotes, doubling embedded quotes.
pub fn quote_text(text: &str) -> String {
    format!("'{}'", text.replace('\'', "''"))
}

fn format_float(x: f64) -> String {
    if x.is_nan() {
        "'NaN'".to_string()
    } else if x == f64::INFINITY {
        "'Infinity'".to_string()
    } else if x == f64::NEG_INFINITY {
        "'-Infinity'".to_string()
    } else if x.fract() == 0.0 {
        // Keep a decimal point so the literal stays numeric, not integer.
        format!("{x:.1}")
    } else {
        x.to_string()
    }
}

impl fmt::Display for SqlValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&format_literal(self))
    }
}

impl From<&str> for SqlValue {
    fn from(value: &str) -> Self {
        SqlValue::Text(value.to_string())
    }
}

impl From<String> for SqlValue {
    fn from(value: String) -> Self {
        SqlValue::Text(value)
    }
}

impl From<bool> for SqlValue {
    fn from(value: bool) -> Self {
        SqlValue::Bool(value)
    }
}

impl From<i32> for SqlValue {
    fn from(value: i32) -> Self {
        SqlValue::Int(i64::from(value))
    }
}

impl From<i64> for SqlValue {
    fn from(value: i64) -> Self {
        SqlValue::Int(value)
    }
}

impl From<f64> for SqlValue {
    fn from(value: f64) -> Self {
        SqlValue::Float(value)
    }
}

impl From<NaiveDate> for SqlValue {
    fn from(value: NaiveDate) -> Self {
        SqlValue::Date(value)
    }
}

impl<T: Into<SqlValue>> From<Option<T>> for SqlValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(SqlValue::Null, Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_values_render_null() {
        assert_eq!(format_literal(&SqlValue::Null), "NULL");
        assert_eq!(format_literal(&SqlValue::from("")), "NULL");
        assert_eq!(format_literal(&SqlValue::from(None::<i64>)), "NULL");
    }

    #[test]
    fn text_is_quoted_and_escaped() {
        assert_eq!(format_literal(&SqlValue::from("O'Brien")), "'O''Brien'");
        assert_eq!(format_literal(&SqlValue::from("''")), "''''''");
    }

    #[test]
    fn scalars() {
        assert_eq!(format_literal(&SqlValue::from(true)), "TRUE");
        assert_eq!(format_literal(&SqlValue::from(false)), "FALSE");
        assert_eq!(format_literal(&SqlValue::from(42i64)), "42");
        assert_eq!(format_literal(&SqlValue::from(-7i64)), "-7");
        assert_eq!(format_literal(&SqlValue::from(3.5)), "3.5");
    }

    #[test]
    fn whole_floats_keep_a_decimal_point() {
        assert_eq!(format_literal(&SqlValue::Float(80.0)), "80.0");
        assert_eq!(format_literal(&SqlValue::Float(-2.0)), "-2.0");
        assert_eq!(format_literal(&SqlValue::Float(0.25)), "0.25");
        assert_eq!(format_literal(&SqlValue::Int(80)), "80");
    }

    #[test]
    fn null_literal_exactly_when_tag_is_absent() {
        let values = [
            SqlValue::Null,
            SqlValue::Text(String::new()),
            SqlValue::Text("NULL".into()),
            SqlValue::Bool(false),
            SqlValue::Int(0),
            SqlValue::Float(0.0),
            SqlValue::Other(String::new()),
        ];
        for value in &values {
            assert_eq!(format_literal(value) == "NULL", value.is_absent(), "{value:?}");
        }
    }

    #[test]
    fn non_finite_floats_are_quoted() {
        assert_eq!(format_literal(&SqlValue::Float(f64::NAN)), "'NaN'");
        assert_eq!(format_literal(&SqlValue::Float(f64::INFINITY)), "'Infinity'");
        assert_eq!(format_literal(&SqlValue::Float(f64::NEG_INFINITY)), "'-Infinity'");
    }

    #[test]
    fn date_is_quoted_iso() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 15).expect("valid date");
        assert_eq!(format_literal(&SqlValue::from(date)), "'2024-01-15'");
    }

    #[test]
    fn other_is_quoted_without_escaping() {
        assert_eq!(
            format_literal(&SqlValue::Other("2024-01-15 08:30:00".into())),
            "'2024-01-15 08:30:00'"
        );
        assert_eq!(format_literal(&SqlValue::Other("a'b".into())), "'a'b'");
    }

    #[test]
    fn tags_follow_priority() {
        assert_eq!(SqlValue::Text(String::new()).tag(), ValueTag::Absent);
        assert_eq!(SqlValue::Text("x".into()).tag(), ValueTag::Text);
        assert_eq!(SqlValue::Float(1.0).tag(), ValueTag::Numeric);
        assert_eq!(SqlValue::Other("x".into()).tag(), ValueTag::Other);
        assert!(SqlValue::Null.is_absent());
    }
}
