use crate::{AsyncResult, Result, Row, Value};
use log::debug;
use std::sync::atomic::{AtomicUsize, Ordering};

/// The database connection migrations are executed on.
pub trait Connection: Send + Sync {
    fn begin_transaction(&self) -> AsyncResult<'_, ()>;
    fn commit(&self) -> AsyncResult<'_, ()>;
    fn roll_back(&self) -> AsyncResult<'_, ()>;

    /// Executes a statement, returning the number of affected rows.
    fn execute_statement<'a>(&'a self, sql: &'a str, params: &'a [Value]) -> AsyncResult<'a, usize>;

    /// Executes a query and collects all of its rows.
    fn fetch_all<'a>(&'a self, sql: &'a str, params: &'a [Value]) -> AsyncResult<'a, Vec<Row>>;
}

/// Tracks the transaction nesting level on a connection.
///
/// Only the outermost scope talks to the database: nested begin, commit and
/// roll back calls just move the depth counter. A nested roll back leaves the
/// decision to the outermost scope.
pub struct TransactionScope<'conn> {
    connection: &'conn dyn Connection,
    depth: AtomicUsize,
}

impl<'conn> TransactionScope<'conn> {
    pub fn new(connection: &'conn dyn Connection) -> Self {
        Self {
            connection,
            depth: AtomicUsize::new(0),
        }
    }

    pub fn connection(&self) -> &'conn dyn Connection {
        self.connection
    }

    pub fn depth(&self) -> usize {
        self.depth.load(Ordering::SeqCst)
    }

    pub fn is_transaction_active(&self) -> bool {
        self.depth() > 0
    }

    pub async fn begin_transaction(&self) -> Result<()> {
        let depth = self.depth();
        if depth == 0 {
            self.connection.begin_transaction().await?;
            debug!(target: "creed::migrate", "Transaction started");
        } else {
            debug!(target: "creed::migrate", "Joining outer transaction (depth {})", depth + 1);
        }

        self.depth.store(depth + 1, Ordering::SeqCst);
        Ok(())
    }

    /// Commits the transaction if this is the outermost scope. No-op when no
    /// transaction is active.
    pub async fn commit(&self) -> Result<()> {
        match self.depth() {
            0 => Ok(()),
            1 => {
                self.connection.commit().await?;
                self.depth.store(0, Ordering::SeqCst);
                debug!(target: "creed::migrate", "Transaction committed");
                Ok(())
            }
            depth => {
                self.depth.store(depth - 1, Ordering::SeqCst);
                Ok(())
            }
        }
    }

    /// Rolls back the transaction if this is the outermost scope. No-op when
    /// no transaction is active.
    pub async fn roll_back(&self) -> Result<()> {
        match self.depth() {
            0 => Ok(()),
            1 => {
                self.depth.store(0, Ordering::SeqCst);
                self.connection.roll_back().await?;
                debug!(target: "creed::migrate", "Transaction rolled back");
                Ok(())
            }
            depth => {
                self.depth.store(depth - 1, Ordering::SeqCst);
                debug!(target: "creed::migrate", "Nested roll back deferred to the outer transaction");
                Ok(())
            }
        }
    }
}
