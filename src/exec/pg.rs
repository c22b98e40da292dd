//! PostgreSQL backend built on the synchronous `postgres` client.

use super::error::Failure;
use super::rowset::RowSet;
use super::{Connector, Session};
use postgres::{Client, Config, NoTls, SimpleQueryMessage};
use smol_str::SmolStr;
use std::sync::mpsc::{self, Receiver};

/// Opens a fresh connection per session from a parsed connection string.
#[derive(Clone)]
pub struct PgConnector {
    config: Config,
}

impl PgConnector {
    /// Accepts either a URL (`postgres://user@host/db`) or key/value form
    /// (`host=localhost user=postgres`).
    pub fn new(connection: &str) -> Result<Self, Failure> {
        let config = connection.parse::<Config>()?;
        Ok(Self { config })
    }
}

impl std::fmt::Debug for PgConnector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PgConnector")
            .field("hosts", &self.config.get_hosts())
            .field("dbname", &self.config.get_dbname())
            .finish()
    }
}

impl Connector for PgConnector {
    type Session = PgSession;

    fn connect(&self) -> Result<PgSession, Failure> {
        let (sender, notices) = mpsc::channel();
        let mut config = self.config.clone();
        config.notice_callback(move |notice| {
            let _ = sender.send(notice.message().to_string());
        });
        let client = config.connect(NoTls)?;
        Ok(PgSession { client, notices })
    }
}

/// One open connection. Dropping it closes the connection.
pub struct PgSession {
    client: Client,
    notices: Receiver<String>,
}

impl Session for PgSession {
    fn fetch(&mut self, sql: &str) -> Result<RowSet, Failure> {
        let mut result = RowSet::default();
        for message in self.client.simple_query(sql)? {
            match message {
                SimpleQueryMessage::RowDescription(columns) => {
                    result = RowSet::new(columns.iter().map(|c| SmolStr::new(c.name())).collect());
                }
                SimpleQueryMessage::Row(row) => {
                    if result.columns.is_empty() {
                        result.columns = row.columns().iter().map(|c| SmolStr::new(c.name())).collect();
                    }
                    let mut values = Vec::with_capacity(row.len());
                    for index in 0..row.len() {
                        values.push(row.try_get(index)?.map(str::to_string));
                    }
                    result.push_row(values);
                }
                _ => {}
            }
        }
        Ok(result)
    }

    fn execute_in_transaction(&mut self, sql: &str) -> Result<(), Failure> {
        let mut transaction = self.client.transaction()?;
        transaction.batch_execute(sql)?;
        transaction.commit()?;
        Ok(())
    }

    fn take_notices(&mut self) -> Vec<String> {
        self.notices.try_iter().collect()
    }
}
