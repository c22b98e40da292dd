//! Metadata-driven access to file-defined SQL queries, functions and procedures.
//!
//! SQL files describe their callable routine in a structured comment block.
//! This library discovers those descriptors, turns typed parameter values into
//! literal call text, and runs the result against PostgreSQL with failures
//! classified into a small taxonomy.
//!
//! # Example
//!
//! ```
//! use sql_catalog::{CallArgs, CallableKind, build_call, parse_descriptor};
//!
//! let source = "\
//! -- FUNCTION_METADATA
//! -- name: calculate_batch_profit
//! -- params: batch_id:INT
//! -- returns: DECIMAL
//! -- END_METADATA
//! CREATE FUNCTION calculate_batch_profit(batch_id INT) RETURNS DECIMAL AS $$ SELECT 0 $$ LANGUAGE sql;
//! ";
//!
//! let descriptor = parse_descriptor(CallableKind::Function, source).expect("metadata");
//! let args = CallArgs::new().with("batch_id", 1i64);
//! assert_eq!(
//!     build_call(&descriptor, &args),
//!     "SELECT calculate_batch_profit(1) AS result;"
//! );
//! ```

pub mod call;
pub mod catalog;
pub mod config;
pub mod diag;
pub mod exec;
pub mod input;
pub mod lexer;
pub mod metadata;
pub mod value;

pub use call::{CallArgs, CallShape, build_call, build_function_call, build_procedure_call, render_call};
pub use catalog::{Catalog, CatalogError, SqlFolder, load_sql_files};
pub use config::{Config, ConfigError, OutputFormat};
pub use diag::{Diag, DiagLabel, DiagSeverity, SourceFile, Span};
pub use exec::{
    Connector, ErrorKind, ExecError, Executor, Failure, PgConnector, ProcedureOutcome, RowSet,
    Session, SetupReport,
};
pub use input::{InputError, InputKind, bind_inputs, validate_value};
pub use metadata::{
    CallableDescriptor, CallableKind, Metadata, MetadataResult, MetadataSyntax, ParameterSpec,
    ReturnKind, collect_metadata, parse_descriptor, parse_function_metadata, parse_metadata,
    parse_procedure_metadata,
};
pub use value::{SqlValue, ValueTag, format_literal};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn public_api_accessible() {
        let _span: Span = 0..5;
        let _kind = CallableKind::Procedure;
        assert_eq!(format_literal(&SqlValue::Null), "NULL");
    }
}
