//! Running catalog SQL against a database.
//!
//! Each entry point on [`Executor`] opens a fresh [`Session`] through its
//! [`Connector`], runs one statement (or one transactional block), and drops
//! the session on every exit path. Nothing is pooled, retried or cached, and
//! every failure leaves here already classified as an [`ExecError`].

pub mod error;
pub mod pg;
pub mod rowset;

pub use error::{ErrorKind, ExecError, Failure};
pub use pg::{PgConnector, PgSession};
pub use rowset::{ProcedureOutcome, RowSet};

use std::collections::BTreeMap;
use std::fmt;

/// Opens sessions against a database.
pub trait Connector {
    type Session: Session;

    /// Opens a new connection.
    fn connect(&self) -> Result<Self::Session, Failure>;
}

/// One open connection. Dropping the session releases it.
pub trait Session {
    /// Runs a row-returning statement and buffers the whole result.
    fn fetch(&mut self, sql: &str) -> Result<RowSet, Failure>;

    /// Runs `sql` inside a transaction, committing on success. On failure
    /// the transaction is rolled back.
    fn execute_in_transaction(&mut self, sql: &str) -> Result<(), Failure>;

    /// Drains server notices received so far.
    fn take_notices(&mut self) -> Vec<String>;
}

/// Which entry point a statement came through; used in logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Entry {
    Query,
    Function,
    Procedure,
    Setup,
}

impl fmt::Display for Entry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Entry::Query => "query",
            Entry::Function => "function",
            Entry::Procedure => "procedure",
            Entry::Setup => "setup",
        };
        f.write_str(name)
    }
}

/// Runs queries, function calls and procedure calls.
#[derive(Debug, Clone)]
pub struct Executor<C> {
    connector: C,
}

impl<C: Connector> Executor<C> {
    pub fn new(connector: C) -> Self {
        Self { connector }
    }

    pub fn connector(&self) -> &C {
        &self.connector
    }

    /// Runs a `SELECT` and returns its rows.
    pub fn run_query(&self, sql: &str) -> Result<RowSet, ExecError> {
        self.fetch(Entry::Query, sql)
    }

    /// Runs a built function call and returns its rows.
    pub fn run_function(&self, sql: &str) -> Result<RowSet, ExecError> {
        self.fetch(Entry::Function, sql)
    }

    /// Runs a `CALL` in a committed transaction and collects server notices.
    pub fn run_procedure(&self, sql: &str) -> Result<ProcedureOutcome, ExecError> {
        log::debug!("running {}: {sql}", Entry::Procedure);
        let mut session = self.open(Entry::Procedure)?;
        session
            .execute_in_transaction(sql)
            .map_err(|failure| classify_and_log(Entry::Procedure, failure))?;
        Ok(ProcedureOutcome {
            success: true,
            notices: session.take_notices(),
        })
    }

    /// Executes every source (usually the function folder) in its own
    /// transaction, in key order, continuing past failures.
    ///
    /// Fails only when no connection can be opened.
    pub fn install(&self, sources: &BTreeMap<String, String>) -> Result<SetupReport, ExecError> {
        let mut session = self.open(Entry::Setup)?;
        let mut summary = SetupReport::default();
        for (stem, sql) in sources {
            log::debug!("installing '{stem}'");
            match session.execute_in_transaction(sql) {
                Ok(()) => summary.installed.push(stem.clone()),
                Err(failure) => summary
                    .failed
                    .push((stem.clone(), classify_and_log(Entry::Setup, failure))),
            }
        }
        log::info!(
            "setup installed {} of {} sources",
            summary.installed.len(),
            sources.len()
        );
        Ok(summary)
    }

    fn fetch(&self, entry: Entry, sql: &str) -> Result<RowSet, ExecError> {
        log::debug!("running {entry}: {sql}");
        let mut session = self.open(entry)?;
        let rows = session.fetch(sql).map_err(|failure| classify_and_log(entry, failure))?;
        for notice in session.take_notices() {
            log::debug!("{entry} notice: {notice}");
        }
        Ok(rows)
    }

    fn open(&self, entry: Entry) -> Result<C::Session, ExecError> {
        self.connector
            .connect()
            .map_err(|failure| classify_and_log(entry, failure))
    }
}

fn classify_and_log(entry: Entry, failure: Failure) -> ExecError {
    let err = ExecError::classify(failure);
    log::warn!("{entry} failed ({}): {err}", err.kind());
    err
}

/// Outcome of [`Executor::install`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SetupReport {
    /// Keys whose source executed and committed.
    pub installed: Vec<String>,
    /// Keys whose source failed, with the classified error.
    pub failed: Vec<(String, ExecError)>,
}

impl SetupReport {
    /// Returns true when nothing failed.
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }

    /// Number of sources attempted.
    pub fn total(&self) -> usize {
        self.installed.len() + self.failed.len()
    }
}
