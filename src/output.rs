//! Rendering row sets for the terminal.

use prettytable::{Cell, Row, Table};
use sql_catalog::{OutputFormat, RowSet};

/// Shown instead of an empty table so an empty result never looks like a failure.
pub const NO_RESULTS: &str = "No results found.";

/// Renders `rows` in `format`.
pub fn render_rows(rows: &RowSet, format: OutputFormat) -> String {
    match format {
        OutputFormat::Table => render_table(rows),
        OutputFormat::Json => render_json(rows),
        OutputFormat::Csv => render_csv(rows),
    }
}

fn render_table(rows: &RowSet) -> String {
    if rows.is_empty() {
        return NO_RESULTS.to_string();
    }

    let mut table = Table::new();
    table.set_titles(Row::new(rows.columns.iter().map(|c| Cell::new(c)).collect()));
    for row in &rows.rows {
        table.add_row(Row::new(
            row.iter()
                .map(|value| Cell::new(value.as_deref().unwrap_or("NULL")))
                .collect(),
        ));
    }
    let noun = if rows.row_count() == 1 { "row" } else { "rows" };
    format!("{table}{} {noun}", rows.row_count())
}

fn render_json(rows: &RowSet) -> String {
    let objects: Vec<serde_json::Value> = rows
        .rows
        .iter()
        .map(|row| {
            let mut object = serde_json::Map::new();
            for (column, value) in rows.columns.iter().zip(row) {
                let value = match value {
                    Some(text) => serde_json::Value::String(text.clone()),
                    None => serde_json::Value::Null,
                };
                object.insert(column.to_string(), value);
            }
            serde_json::Value::Object(object)
        })
        .collect();
    serde_json::to_string_pretty(&objects).unwrap_or_else(|_| "[]".to_string())
}

fn render_csv(rows: &RowSet) -> String {
    let mut lines = Vec::with_capacity(rows.row_count() + 1);
    lines.push(
        rows.columns
            .iter()
            .map(|c| csv_field(c))
            .collect::<Vec<_>>()
            .join(","),
    );
    for row in &rows.rows {
        lines.push(
            row.iter()
                .map(|value| value.as_deref().map(csv_field).unwrap_or_default())
                .collect::<Vec<_>>()
                .join(","),
        );
    }
    lines.join("\n")
}

fn csv_field(text: &str) -> String {
    if text.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", text.replace('"', "\"\""))
    } else {
        text.to_string()
    }
}
