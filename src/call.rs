//! Literal SQL call text for functions and procedures.
//!
//! Every call goes through [`render_call`] with a [`CallShape`]; the shape is
//! the only thing that differs between `SELECT f(..) AS result`,
//! `SELECT * FROM f(..)` and `CALL p(..)`. Arguments are rendered with
//! [`format_literal`] in the order they were pushed. No reordering or type
//! checking happens here.

use crate::metadata::{CallableDescriptor, CallableKind, ReturnKind};
use crate::value::{SqlValue, format_literal};
use smol_str::SmolStr;

/// Named argument values in positional call order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CallArgs {
    entries: Vec<(SmolStr, SqlValue)>,
}

impl CallArgs {
    /// Creates an empty argument list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an argument, or replaces the value of an existing name in place.
    pub fn push(&mut self, name: impl Into<SmolStr>, value: impl Into<SqlValue>) {
        let name = name.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(existing, _)| *existing == name) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((name, value)),
        }
    }

    /// Builder form of [`CallArgs::push`].
    pub fn with(mut self, name: impl Into<SmolStr>, value: impl Into<SqlValue>) -> Self {
        self.push(name, value);
        self
    }

    /// Returns the value bound to `name`.
    pub fn get(&self, name: &str) -> Option<&SqlValue> {
        self.entries
            .iter()
            .find(|(existing, _)| existing == name)
            .map(|(_, value)| value)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates `(name, value)` pairs in call order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &SqlValue)> {
        self.entries.iter().map(|(name, value)| (name.as_str(), value))
    }

    /// Renders the values as a comma-separated literal list.
    pub fn to_literal_list(&self) -> String {
        self.entries
            .iter()
            .map(|(_, value)| format_literal(value))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl<N: Into<SmolStr>, V: Into<SqlValue>> FromIterator<(N, V)> for CallArgs {
    fn from_iter<I: IntoIterator<Item = (N, V)>>(iter: I) -> Self {
        let mut args = CallArgs::new();
        for (name, value) in iter {
            args.push(name, value);
        }
        args
    }
}

/// The statement form wrapped around a routine invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CallShape {
    /// `SELECT name(args) AS result;`
    Scalar,
    /// `SELECT * FROM name(args);`
    Table,
    /// `CALL name(args);`
    Procedure,
}

impl CallShape {
    /// Picks the shape for a callable of `kind` returning `returns`.
    pub fn for_callable(kind: CallableKind, returns: &ReturnKind) -> Self {
        match kind {
            CallableKind::Procedure => CallShape::Procedure,
            CallableKind::Function if returns.is_table() => CallShape::Table,
            CallableKind::Function => CallShape::Scalar,
        }
    }
}

/// Renders `name(args)` inside the statement form for `shape`.
pub fn render_call(shape: CallShape, name: &str, args: &CallArgs) -> String {
    let args = args.to_literal_list();
    match shape {
        CallShape::Scalar => format!("SELECT {name}({args}) AS result;"),
        CallShape::Table => format!("SELECT * FROM {name}({args});"),
        CallShape::Procedure => format!("CALL {name}({args});"),
    }
}

/// Builds the `SELECT` invoking a function.
pub fn build_function_call(name: &str, args: &CallArgs, returns: &ReturnKind) -> String {
    render_call(CallShape::for_callable(CallableKind::Function, returns), name, args)
}

/// Builds the `CALL` invoking a procedure.
pub fn build_procedure_call(name: &str, args: &CallArgs) -> String {
    render_call(CallShape::Procedure, name, args)
}

/// Builds the call for a descriptor, choosing the shape from its kind and
/// return token.
pub fn build_call(descriptor: &CallableDescriptor, args: &CallArgs) -> String {
    let sql = render_call(
        CallShape::for_callable(descriptor.kind, &descriptor.returns),
        &descriptor.name,
        args,
    );
    log::debug!("built {} call: {sql}", descriptor.kind);
    sql
}
