//! Common test utilities
//!
//! Shared SQL fixtures and a scripted in-memory backend.
//!
//! # Fixtures
//! - [`PROFIT_FUNCTION`], [`TABLE_FUNCTION`], [`RECORD_PROCEDURE`] - catalog sources
//! - [`write_catalog`] - lay out a catalog root on disk
//!
//! # Backend
//! - [`FakeConnector`] - a [`Connector`] whose sessions replay scripted results

#![allow(dead_code)]

use sql_catalog::{Connector, Failure, RowSet, Session};
use std::cell::RefCell;
use std::collections::VecDeque;
use std::fs;
use std::path::Path;
use std::rc::Rc;

// ============================================================================
// SQL Fixtures
// ============================================================================

pub const PROFIT_FUNCTION: &str = "\
-- FUNCTION_METADATA
-- name: calculate_batch_profit
-- params: batch_id:INT
-- description: Revenue minus feed and labour cost for one batch
-- returns: DECIMAL
-- END_METADATA
CREATE OR REPLACE FUNCTION calculate_batch_profit(batch_id INT)
RETURNS DECIMAL AS $$
BEGIN
    RETURN 0;
END;
$$ LANGUAGE plpgsql;
";

pub const TABLE_FUNCTION: &str = "\
-- FUNCTION_METADATA
-- name: pond_summary
-- params: pond_id:INT, since:DATE
-- returns: TABLE
-- END_METADATA
CREATE OR REPLACE FUNCTION pond_summary(pond_id INT, since DATE)
RETURNS TABLE(batch_id INT, weight DECIMAL) AS $$
    SELECT 1, 2.5;
$$ LANGUAGE sql;
";

pub const RECORD_PROCEDURE: &str = "\
-- PROCEDURE_METADATA
-- name: record_harvest
-- params: batch_id:INT, weight_kg:DECIMAL, harvested_on:DATE, notes:TEXT
-- description: Marks a batch harvested
-- END_METADATA
CREATE OR REPLACE PROCEDURE record_harvest(batch_id INT, weight_kg DECIMAL, harvested_on DATE, notes TEXT)
LANGUAGE plpgsql AS $$
BEGIN
    RAISE NOTICE 'Harvest recorded for batch %', batch_id;
END;
$$;
";

pub const PLAIN_QUERY: &str = "SELECT id, name FROM ponds ORDER BY id;\n";

/// Writes `queries/`, `functions/` and `procedures/` under `root`.
pub fn write_catalog(root: &Path) {
    let files: [(&str, &str, &str); 4] = [
        ("queries", "ponds", PLAIN_QUERY),
        ("functions", "calculate_batch_profit", PROFIT_FUNCTION),
        ("functions", "pond_summary", TABLE_FUNCTION),
        ("procedures", "record_harvest", RECORD_PROCEDURE),
    ];
    for (folder, stem, content) in files {
        let dir = root.join(folder);
        fs::create_dir_all(&dir).expect("create catalog folder");
        fs::write(dir.join(format!("{stem}.sql")), content).expect("write catalog file");
    }
}

/// Builds a row set from string columns and optional values.
pub fn rows(columns: &[&str], values: &[&[Option<&str>]]) -> RowSet {
    let mut result = RowSet::new(columns.iter().map(|c| (*c).into()).collect());
    for row in values {
        result.push_row(row.iter().map(|v| v.map(str::to_string)).collect());
    }
    result
}

// ============================================================================
// Scripted Backend
// ============================================================================

/// State shared between a [`FakeConnector`] and the sessions it opens.
#[derive(Debug, Default)]
pub struct FakeState {
    /// Replayed in order by `fetch` and `execute_in_transaction`; an empty
    /// script answers with an empty row set or success.
    pub responses: VecDeque<Result<RowSet, Failure>>,
    /// Notices handed out by the next `take_notices`.
    pub notices: Vec<String>,
    /// When set, every `connect` fails with this transport message.
    pub connect_failure: Option<String>,
    /// Statements seen, in order.
    pub statements: Vec<String>,
    /// Statements whose transaction committed.
    pub committed: Vec<String>,
    pub connects: usize,
}

#[derive(Debug, Clone, Default)]
pub struct FakeConnector {
    state: Rc<RefCell<FakeState>>,
}

impl FakeConnector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a response.
    pub fn respond(self, response: Result<RowSet, Failure>) -> Self {
        self.state.borrow_mut().responses.push_back(response);
        self
    }

    /// Queues notices for the next session to report.
    pub fn with_notices(self, notices: &[&str]) -> Self {
        self.state
            .borrow_mut()
            .notices
            .extend(notices.iter().map(|n| n.to_string()));
        self
    }

    /// Makes every connection attempt fail.
    pub fn refusing(self, message: &str) -> Self {
        self.state.borrow_mut().connect_failure = Some(message.to_string());
        self
    }

    pub fn state(&self) -> std::cell::Ref<'_, FakeState> {
        self.state.borrow()
    }
}

impl Connector for FakeConnector {
    type Session = FakeSession;

    fn connect(&self) -> Result<FakeSession, Failure> {
        let mut state = self.state.borrow_mut();
        state.connects += 1;
        if let Some(message) = &state.connect_failure {
            return Err(Failure::Other(message.clone()));
        }
        Ok(FakeSession {
            state: Rc::clone(&self.state),
        })
    }
}

pub struct FakeSession {
    state: Rc<RefCell<FakeState>>,
}

impl FakeSession {
    fn next(&self, sql: &str) -> Result<RowSet, Failure> {
        let mut state = self.state.borrow_mut();
        state.statements.push(sql.to_string());
        state.responses.pop_front().unwrap_or_else(|| Ok(RowSet::default()))
    }
}

impl Session for FakeSession {
    fn fetch(&mut self, sql: &str) -> Result<RowSet, Failure> {
        self.next(sql)
    }

    fn execute_in_transaction(&mut self, sql: &str) -> Result<(), Failure> {
        self.next(sql)?;
        self.state.borrow_mut().committed.push(sql.to_string());
        Ok(())
    }

    fn take_notices(&mut self) -> Vec<String> {
        std::mem::take(&mut self.state.borrow_mut().notices)
    }
}
