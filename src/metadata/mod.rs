//! Metadata blocks embedded in SQL function and procedure files.
//!
//! A callable file describes itself in a delimited run of `--` comments:
//!
//! ```sql
//! -- FUNCTION_METADATA
//! -- name: calculate_batch_profit
//! -- params: batch_id:INT
//! -- description: Revenue minus cost for one batch
//! -- returns: DECIMAL
//! -- END_METADATA
//! ```
//!
//! Functions and procedures share one grammar; they differ only in the start
//! marker and the default return token, captured by [`MetadataSyntax`].
//! Parsing never fails. A missing block is `None`, and anything skipped or
//! defaulted inside a block is reported as a [`Diag`].

mod fields;

use crate::diag::{Diag, Span};
use crate::lexer::comment_lines;
use fields::{Field, normalize_token, parse_params, split_field};
use smol_str::SmolStr;
use std::collections::BTreeMap;
use std::fmt;

/// Comment body closing every metadata block.
pub const END_MARKER: &str = "END_METADATA";

// ============================================================================
// Kinds and syntax
// ============================================================================

/// The two kinds of discoverable callables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CallableKind {
    /// Invoked with `SELECT`.
    Function,
    /// Invoked with `CALL`.
    Procedure,
}

/// Kind-specific parts of the metadata grammar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MetadataSyntax {
    /// Comment body opening the block.
    pub start_marker: &'static str,
    /// Return token used when the block has no `returns` line.
    pub default_return: &'static str,
}

/// Syntax for function files.
pub const FUNCTION_SYNTAX: MetadataSyntax = MetadataSyntax {
    start_marker: "FUNCTION_METADATA",
    default_return: "DECIMAL",
};

/// Syntax for procedure files.
pub const PROCEDURE_SYNTAX: MetadataSyntax = MetadataSyntax {
    start_marker: "PROCEDURE_METADATA",
    default_return: "VOID",
};

impl CallableKind {
    /// Returns the metadata syntax for this kind.
    pub fn syntax(self) -> &'static MetadataSyntax {
        match self {
            CallableKind::Function => &FUNCTION_SYNTAX,
            CallableKind::Procedure => &PROCEDURE_SYNTAX,
        }
    }
}

impl fmt::Display for CallableKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CallableKind::Function => write!(f, "function"),
            CallableKind::Procedure => write!(f, "procedure"),
        }
    }
}

// ============================================================================
// Descriptor types
// ============================================================================

/// One declared parameter: its name and upper-cased SQL type token.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ParameterSpec {
    /// Parameter name as written.
    pub name: SmolStr,
    /// Normalized type token (e.g. `INT`, `TEXT`, `DATE`).
    pub ty: SmolStr,
}

impl ParameterSpec {
    /// Creates a parameter, normalizing the type token.
    pub fn new(name: impl Into<SmolStr>, ty: &str) -> Self {
        Self {
            name: name.into(),
            ty: normalize_token(ty),
        }
    }
}

impl fmt::Display for ParameterSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.name, self.ty)
    }
}

/// Normalized return token. Never empty.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ReturnKind(SmolStr);

impl ReturnKind {
    /// The token that switches a function call to `SELECT * FROM`.
    pub const TABLE: &'static str = "TABLE";

    /// Normalizes `raw`; blank input falls back to `default`.
    pub fn new(raw: &str, default: &str) -> Self {
        let token = normalize_token(raw);
        if token.is_empty() {
            Self(normalize_token(default))
        } else {
            Self(token)
        }
    }

    /// The default return kind for `kind`.
    pub fn default_for(kind: CallableKind) -> Self {
        Self(SmolStr::new_static(kind.syntax().default_return))
    }

    /// Returns true if the callable returns a row set.
    pub fn is_table(&self) -> bool {
        self.0 == Self::TABLE
    }

    /// Returns the token text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ReturnKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Everything a metadata block declared, as parsed.
///
/// `name` may be missing; use [`Metadata::into_descriptor`] to get something
/// callable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Metadata {
    /// Which block delimiter matched.
    pub kind: CallableKind,
    /// Declared routine name.
    pub name: Option<SmolStr>,
    /// Parameters in declaration order.
    pub parameters: Vec<ParameterSpec>,
    /// Free-text description.
    pub description: Option<String>,
    /// Declared or defaulted return token.
    pub returns: ReturnKind,
    /// Source range from the start marker through the end marker.
    pub span: Span,
}

impl Metadata {
    /// Converts to a descriptor, or `None` when no name was declared.
    pub fn into_descriptor(self) -> Option<CallableDescriptor> {
        let name = self.name?;
        Some(CallableDescriptor {
            kind: self.kind,
            name,
            parameters: self.parameters,
            description: self.description,
            returns: self.returns,
        })
    }
}

/// A callable routine discovered from a metadata block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallableDescriptor {
    /// Function or procedure.
    pub kind: CallableKind,
    /// Routine name used in the generated call. Never empty.
    pub name: SmolStr,
    /// Parameters in positional call order.
    pub parameters: Vec<ParameterSpec>,
    /// Free-text description for display.
    pub description: Option<String>,
    /// Return token; `TABLE` changes the call shape.
    pub returns: ReturnKind,
}

impl CallableDescriptor {
    /// Looks up a declared parameter by name.
    pub fn parameter(&self, name: &str) -> Option<&ParameterSpec> {
        self.parameters.iter().find(|p| p.name == name)
    }
}

impl fmt::Display for CallableDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.name)?;
        for (i, param) in self.parameters.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{param}")?;
        }
        write!(f, ") -> {}", self.returns)
    }
}

// ============================================================================
// Parsing
// ============================================================================

/// Result of metadata parsing: the block (if any) plus findings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetadataResult {
    /// The parsed block, or `None` when no complete block exists.
    pub metadata: Option<Metadata>,
    /// Warnings and notes about skipped or defaulted input.
    pub diagnostics: Vec<Diag>,
}

/// Parses the first `kind` metadata block in `source`.
pub fn parse_metadata(kind: CallableKind, source: &str) -> MetadataResult {
    let syntax = kind.syntax();
    let comments = comment_lines(source);
    let mut diagnostics = Vec::new();

    let Some(start) = comments
        .iter()
        .position(|c| c.body.trim() == syntax.start_marker)
    else {
        return MetadataResult {
            metadata: None,
            diagnostics,
        };
    };

    let Some(end) = comments[start + 1..]
        .iter()
        .position(|c| c.body.trim() == END_MARKER)
        .map(|offset| start + 1 + offset)
    else {
        diagnostics.push(
            Diag::note(format!("{} block is never closed", syntax.start_marker))
                .with_label(comments[start].span(), "block opened here")
                .with_help(format!("close the block with `-- {END_MARKER}`")),
        );
        return MetadataResult {
            metadata: None,
            diagnostics,
        };
    };

    let span = comments[start].start..comments[end].end;
    let mut name = None;
    let mut description = None;
    let mut returns = None;
    let mut parameters = None;
    let mut seen: Vec<Field> = Vec::new();

    for line in &comments[start + 1..end] {
        let Some((field, value)) = split_field(line.body) else {
            continue;
        };
        if seen.contains(&field) {
            diagnostics.push(
                Diag::note(format!("repeated `{}` field ignored", field.key()))
                    .with_label(line.span(), "first occurrence wins")
                    .with_code("M003"),
            );
            continue;
        }
        seen.push(field);

        match field {
            Field::Name => name = non_empty(value).map(SmolStr::new),
            Field::Description => description = non_empty(value).map(str::to_string),
            Field::Returns => returns = Some(ReturnKind::new(value, syntax.default_return)),
            Field::Params => parameters = Some(parse_params(value, &line.span(), &mut diagnostics)),
        }
    }

    if name.is_none() {
        diagnostics.push(
            Diag::warning("metadata block declares no name")
                .with_label(span.clone(), "this block")
                .with_help("add `-- name: <identifier>` so the routine can be called")
                .with_code("M001"),
        );
    }

    MetadataResult {
        metadata: Some(Metadata {
            kind,
            name,
            parameters: parameters.unwrap_or_default(),
            description,
            returns: returns.unwrap_or_else(|| ReturnKind::default_for(kind)),
            span,
        }),
        diagnostics,
    }
}

fn non_empty(value: &str) -> Option<&str> {
    if value.is_empty() { None } else { Some(value) }
}

/// Parses a `FUNCTION_METADATA` block.
pub fn parse_function_metadata(source: &str) -> Option<Metadata> {
    parse_metadata(CallableKind::Function, source).metadata
}

/// Parses a `PROCEDURE_METADATA` block.
pub fn parse_procedure_metadata(source: &str) -> Option<Metadata> {
    parse_metadata(CallableKind::Procedure, source).metadata
}

/// Parses a block and requires a name; this is the "usable metadata" check
/// front-ends perform before building a call.
pub fn parse_descriptor(kind: CallableKind, source: &str) -> Option<CallableDescriptor> {
    parse_metadata(kind, source)
        .metadata
        .and_then(Metadata::into_descriptor)
}

/// Parses every source in a stem → content map, keeping those with a block.
pub fn collect_metadata(
    kind: CallableKind,
    sources: &BTreeMap<String, String>,
) -> BTreeMap<String, Metadata> {
    let mut result = BTreeMap::new();
    for (stem, content) in sources {
        match parse_metadata(kind, content).metadata {
            Some(metadata) => {
                result.insert(stem.clone(), metadata);
            }
            None => log::debug!("{kind} source '{stem}' has no metadata block"),
        }
    }
    result
}
