//! Uniform result shapes returned by the executor.

use smol_str::SmolStr;

/// A fully buffered tabular result: column names plus positional rows.
///
/// Values are the server's text rendering; `None` is SQL `NULL`. An empty
/// row set is a successful result, not a failure.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RowSet {
    /// Column names in result order.
    pub columns: Vec<SmolStr>,
    /// Rows in result order; each has one entry per column.
    pub rows: Vec<Vec<Option<String>>>,
}

impl RowSet {
    /// Creates an empty row set with the given columns.
    pub fn new(columns: Vec<SmolStr>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    /// Appends a row.
    pub fn push_row(&mut self, row: Vec<Option<String>>) {
        self.rows.push(row);
    }

    /// Returns true when the result has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Returns the value at `row`, `column`, flattening out-of-range and `NULL`.
    pub fn value(&self, row: usize, column: &str) -> Option<&str> {
        let index = self.columns.iter().position(|c| c == column)?;
        self.rows.get(row)?.get(index)?.as_deref()
    }
}

/// Outcome of a committed procedure call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcedureOutcome {
    /// True when the call ran and was committed.
    pub success: bool,
    /// Server notices raised during the call, in arrival order.
    pub notices: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn value_lookup_by_column_name() {
        let mut rows = RowSet::new(vec!["id".into(), "label".into()]);
        rows.push_row(vec![Some("7".into()), None]);

        assert_eq!(rows.row_count(), 1);
        assert_eq!(rows.value(0, "id"), Some("7"));
        assert_eq!(rows.value(0, "label"), None);
        assert_eq!(rows.value(0, "missing"), None);
        assert_eq!(rows.value(3, "id"), None);
    }

    #[test]
    fn empty_result_is_not_an_error_shape() {
        let rows = RowSet::new(vec!["result".into()]);
        assert!(rows.is_empty());
        assert_eq!(rows.columns.len(), 1);
    }
}
