//! Classified execution failures.
//!
//! Backends report raw [`Failure`]s; [`ExecError::classify`] maps them onto the
//! closed [`ErrorKind`] taxonomy using the SQLSTATE code. Only `NotFound` and
//! `ValidationFailed` carry remediation help.

use miette::{Diagnostic, Severity};
use postgres::error::SqlState;
use std::fmt;

/// The closed set of execution failure kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// A referenced function, procedure, table or column does not exist.
    NotFound,
    /// The statement text is not valid SQL.
    SyntaxInvalid,
    /// A routine raised an error or a constraint rejected the values.
    ValidationFailed,
    /// Any other failure reported by the database.
    BackendError,
    /// A failure outside the database, such as connectivity.
    Unexpected,
}

impl ErrorKind {
    /// Maps a SQLSTATE code onto a kind.
    ///
    /// Undefined tables and columns are `NotFound`, not `SyntaxInvalid`;
    /// `SyntaxInvalid` is reserved for malformed statement text.
    pub fn from_sqlstate(code: &SqlState) -> Self {
        if *code == SqlState::UNDEFINED_FUNCTION
            || *code == SqlState::UNDEFINED_TABLE
            || *code == SqlState::UNDEFINED_COLUMN
        {
            ErrorKind::NotFound
        } else if *code == SqlState::SYNTAX_ERROR {
            ErrorKind::SyntaxInvalid
        } else if *code == SqlState::RAISE_EXCEPTION
            || *code == SqlState::INVALID_PARAMETER_VALUE
            || *code == SqlState::FOREIGN_KEY_VIOLATION
            || *code == SqlState::CHECK_VIOLATION
            || *code == SqlState::NUMERIC_VALUE_OUT_OF_RANGE
        {
            ErrorKind::ValidationFailed
        } else {
            ErrorKind::BackendError
        }
    }

    /// Returns true for the kinds front-ends present with remediation text.
    pub fn is_actionable(self) -> bool {
        matches!(self, ErrorKind::NotFound | ErrorKind::ValidationFailed)
    }

    fn code(self) -> &'static str {
        match self {
            ErrorKind::NotFound => "sql_catalog::not_found",
            ErrorKind::SyntaxInvalid => "sql_catalog::syntax_invalid",
            ErrorKind::ValidationFailed => "sql_catalog::validation_failed",
            ErrorKind::BackendError => "sql_catalog::backend_error",
            ErrorKind::Unexpected => "sql_catalog::unexpected",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::NotFound => "not found",
            ErrorKind::SyntaxInvalid => "syntax invalid",
            ErrorKind::ValidationFailed => "validation failed",
            ErrorKind::BackendError => "backend error",
            ErrorKind::Unexpected => "unexpected",
        };
        f.write_str(name)
    }
}

/// An unclassified failure as reported by a backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Failure {
    /// The server rejected the statement.
    Database { code: SqlState, message: String },
    /// Anything else: connection, protocol, configuration.
    Other(String),
}

impl Failure {
    /// Shorthand for a server failure with the given SQLSTATE.
    pub fn database(code: SqlState, message: impl Into<String>) -> Self {
        Failure::Database {
            code,
            message: message.into(),
        }
    }
}

impl From<postgres::Error> for Failure {
    fn from(err: postgres::Error) -> Self {
        match err.as_db_error() {
            Some(db) => Failure::Database {
                code: db.code().clone(),
                message: db.message().to_string(),
            },
            None => Failure::Other(err.to_string()),
        }
    }
}

/// A classified execution failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecError {
    kind: ErrorKind,
    reason: &'static str,
    message: String,
    sqlstate: Option<SqlState>,
}

impl ExecError {
    /// Classifies a backend failure.
    pub fn classify(failure: Failure) -> Self {
        match failure {
            Failure::Database { code, message } => Self {
                kind: ErrorKind::from_sqlstate(&code),
                reason: reason_for(&code),
                message,
                sqlstate: Some(code),
            },
            Failure::Other(message) => Self {
                kind: ErrorKind::Unexpected,
                reason: "unexpected error",
                message,
                sqlstate: None,
            },
        }
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// The server's (or transport's) message, verbatim.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// The SQLSTATE code, when the server reported one.
    pub fn sqlstate(&self) -> Option<&SqlState> {
        self.sqlstate.as_ref()
    }

    /// Remediation text for actionable kinds.
    pub fn remediation(&self) -> Option<&'static str> {
        match self.kind {
            ErrorKind::NotFound if self.sqlstate == Some(SqlState::UNDEFINED_FUNCTION) => Some(
                "create the catalog's functions and procedures in the database (run `sql-catalog setup`), then retry",
            ),
            ErrorKind::NotFound => {
                Some("check that the referenced table or column exists in the connected database")
            }
            ErrorKind::ValidationFailed => Some(
                "check that the parameter values are correct and that the referenced rows exist",
            ),
            _ => None,
        }
    }
}

fn reason_for(code: &SqlState) -> &'static str {
    if *code == SqlState::UNDEFINED_FUNCTION {
        "database function not found"
    } else if *code == SqlState::UNDEFINED_TABLE {
        "table not found"
    } else if *code == SqlState::UNDEFINED_COLUMN {
        "column not found"
    } else if *code == SqlState::SYNTAX_ERROR {
        "SQL syntax error"
    } else if *code == SqlState::RAISE_EXCEPTION {
        "routine raised an error"
    } else if *code == SqlState::INVALID_PARAMETER_VALUE {
        "invalid parameter value"
    } else if *code == SqlState::FOREIGN_KEY_VIOLATION {
        "foreign key constraint error"
    } else if *code == SqlState::CHECK_VIOLATION {
        "check constraint error"
    } else if *code == SqlState::NUMERIC_VALUE_OUT_OF_RANGE {
        "numeric value out of range"
    } else {
        "database error"
    }
}

impl fmt::Display for ExecError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.reason, self.message)
    }
}

impl std::error::Error for ExecError {}

impl Diagnostic for ExecError {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        Some(Box::new(self.kind.code()))
    }

    fn severity(&self) -> Option<Severity> {
        Some(Severity::Error)
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        self.remediation()
            .map(|help| Box::new(help) as Box<dyn fmt::Display>)
    }
}
