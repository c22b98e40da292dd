//! Field-line extraction inside a metadata block.

use super::ParameterSpec;
use crate::diag::{Diag, Span};
use smol_str::SmolStr;

/// The four recognized field keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Field {
    Name,
    Params,
    Description,
    Returns,
}

impl Field {
    fn from_key(key: &str) -> Option<Self> {
        match key {
            "name" => Some(Field::Name),
            "params" => Some(Field::Params),
            "description" => Some(Field::Description),
            "returns" => Some(Field::Returns),
            _ => None,
        }
    }

    pub(super) fn key(self) -> &'static str {
        match self {
            Field::Name => "name",
            Field::Params => "params",
            Field::Description => "description",
            Field::Returns => "returns",
        }
    }
}

/// Splits a comment body of the form ` <field>: <value>` into its field and
/// trimmed value. Lines with unknown keys yield `None`.
pub(super) fn split_field(body: &str) -> Option<(Field, &str)> {
    let (key, value) = body.trim_start().split_once(':')?;
    Some((Field::from_key(key)?, value.trim()))
}

/// Normalizes a SQL type or return token: trimmed and upper-cased.
pub(super) fn normalize_token(raw: &str) -> SmolStr {
    SmolStr::new(raw.trim().to_uppercase())
}

/// Parses a `params` value. `none` (any case) and the empty string mean no
/// parameters; entries without a colon are skipped with a warning.
pub(super) fn parse_params(value: &str, span: &Span, diagnostics: &mut Vec<Diag>) -> Vec<ParameterSpec> {
    if value.is_empty() || value.eq_ignore_ascii_case("none") {
        return Vec::new();
    }

    let mut params = Vec::new();
    for entry in value.split(',').map(str::trim) {
        match entry.split_once(':') {
            Some((name, ty)) => params.push(ParameterSpec {
                name: SmolStr::new(name.trim()),
                ty: normalize_token(ty),
            }),
            None if entry.is_empty() => {}
            None => diagnostics.push(
                Diag::warning(format!("parameter entry '{entry}' has no type and was skipped"))
                    .with_label(span.clone(), "in this params line")
                    .with_help("write each parameter as name:TYPE")
                    .with_code("M002"),
            ),
        }
    }
    params
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_field_trims_value() {
        assert_eq!(split_field(" name:  calc_profit  "), Some((Field::Name, "calc_profit")));
        assert_eq!(split_field("returns:table"), Some((Field::Returns, "table")));
    }

    #[test]
    fn split_field_requires_exact_key() {
        assert_eq!(split_field(" Name: x"), None);
        assert_eq!(split_field(" name : x"), None);
        assert_eq!(split_field(" author: someone"), None);
        assert_eq!(split_field(" no colon here"), None);
    }

    #[test]
    fn params_split_on_first_colon() {
        let mut diags = Vec::new();
        let params = parse_params("ts:timestamp:tz", &(0..0), &mut diags);
        assert_eq!(params.len(), 1);
        assert_eq!(params[0].name, "ts");
        assert_eq!(params[0].ty, "TIMESTAMP:TZ");
        assert!(diags.is_empty());
    }

    #[test]
    fn params_entry_without_colon_warns() {
        let mut diags = Vec::new();
        let params = parse_params("a:int, oops, b:text", &(3..9), &mut diags);
        let names: Vec<_> = params.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["a", "b"]);
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].code.as_deref(), Some("M002"));
        assert_eq!(diags[0].labels[0].span, 3..9);
    }

    #[test]
    fn params_trailing_comma_is_silent() {
        let mut diags = Vec::new();
        let params = parse_params("a:INT,", &(0..0), &mut diags);
        assert_eq!(params.len(), 1);
        assert!(diags.is_empty());
    }

    #[test]
    fn params_none_in_any_case() {
        let mut diags = Vec::new();
        assert!(parse_params("NONE", &(0..0), &mut diags).is_empty());
        assert!(parse_params("None", &(0..0), &mut diags).is_empty());
        assert!(parse_params("", &(0..0), &mut diags).is_empty());
        assert!(diags.is_empty());
    }
}
