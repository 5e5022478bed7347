use crate::error::Error;
use crate::{AsyncResult, Connection, Result, Row, Value};
use std::sync::Mutex;

const TRANSACTION_MARKERS: [&str; 3] = ["BEGIN", "COMMIT", "ROLLBACK"];

/// Records everything sent to it. Fails any statement (or transaction
/// marker) containing the configured pattern.
#[derive(Debug, Default)]
pub struct MockConnection {
    log: Mutex<Vec<String>>,
    fail_on: Option<String>,
}

impl MockConnection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_on(mut self, pattern: &str) -> Self {
        self.fail_on = Some(pattern.to_string());
        self
    }

    pub fn log(&self) -> Vec<String> {
        self.log.lock().unwrap().clone()
    }

    /// The log without the transaction markers.
    pub fn statements(&self) -> Vec<String> {
        self.log()
            .into_iter()
            .filter(|s| !TRANSACTION_MARKERS.contains(&s.as_str()))
            .collect()
    }

    fn record(&self, sql: &str) -> Result<usize> {
        self.log.lock().unwrap().push(sql.to_string());
        match &self.fail_on {
            Some(pattern) if sql.contains(pattern.as_str()) => {
                Err(Error::from(format!("mock failure on \"{}\"", sql)))
            }
            _ => Ok(0),
        }
    }
}

impl Connection for MockConnection {
    fn begin_transaction(&self) -> AsyncResult<'_, ()> {
        Box::pin(async move { self.record("BEGIN").map(|_| ()) })
    }

    fn commit(&self) -> AsyncResult<'_, ()> {
        Box::pin(async move { self.record("COMMIT").map(|_| ()) })
    }

    fn roll_back(&self) -> AsyncResult<'_, ()> {
        Box::pin(async move { self.record("ROLLBACK").map(|_| ()) })
    }

    fn execute_statement<'a>(&'a self, sql: &'a str, _: &'a [Value]) -> AsyncResult<'a, usize> {
        Box::pin(async move { self.record(sql) })
    }

    fn fetch_all<'a>(&'a self, _: &'a str, _: &'a [Value]) -> AsyncResult<'a, Vec<Row>> {
        Box::pin(async move { Ok(vec![]) })
    }
}
