use crate::driver::sqlite::rows::fetch_rows;
use crate::{AsyncResult, Connection, Result, Row, Value};
use log::debug;
use rusqlite::ToSql;
use rusqlite::types::ToSqlOutput;
use std::sync::{Mutex, MutexGuard, PoisonError};
use url::Url;

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ConnectionOptions {
    path: Option<String>,
    memory: bool,
}

impl ConnectionOptions {
    /// Parses a DSN. Anything not starting with `sqlite:` is taken as a file
    /// path.
    pub fn new<T: Into<String>>(dsn: T) -> Result<Self> {
        let dsn = dsn.into();
        if !dsn.starts_with("sqlite:") {
            return Ok(Self::new_with_path(dsn));
        }

        if dsn.starts_with("sqlite://:memory:") {
            return Ok(Self::new_from_memory());
        }

        let url = Url::parse(dsn.as_str())?;
        let target = match url.domain() {
            Some(domain) if !domain.is_empty() => domain,
            _ => url.path(),
        };

        Ok(Self::new_with_path(target))
    }

    pub fn new_with_path<T: Into<String>>(path: T) -> Self {
        ConnectionOptions {
            path: Some(path.into()),
            memory: false,
        }
    }

    pub fn new_from_memory() -> Self {
        ConnectionOptions {
            path: None,
            memory: true,
        }
    }

    pub fn get_path(&self) -> Option<&str> {
        self.path.as_deref()
    }

    pub fn is_memory(&self) -> bool {
        self.memory
    }
}

/// [`Connection`] backed by a single rusqlite connection.
pub struct SqliteConnection {
    connection: Mutex<rusqlite::Connection>,
}

impl SqliteConnection {
    pub fn create(options: &ConnectionOptions) -> Result<Self> {
        let connection = match options.get_path() {
            Some(path) if !options.is_memory() => rusqlite::Connection::open(path),
            _ => rusqlite::Connection::open_in_memory(),
        }?;

        Ok(Self {
            connection: Mutex::new(connection),
        })
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::create(&ConnectionOptions::new_from_memory())
    }

    pub fn open<T: Into<String>>(path: T) -> Result<Self> {
        Self::create(&ConnectionOptions::new_with_path(path))
    }

    pub fn from_dsn<T: Into<String>>(dsn: T) -> Result<Self> {
        Self::create(&ConnectionOptions::new(dsn)?)
    }

    fn lock(&self) -> MutexGuard<'_, rusqlite::Connection> {
        self.connection
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn execute_batch(&self, sql: &str) -> Result<()> {
        debug!(target: "creed::migrate", "sqlite: {}", sql);
        Ok(self.lock().execute_batch(sql)?)
    }

    fn execute(&self, sql: &str, params: &[Value]) -> Result<usize> {
        let connection = self.lock();
        let mut statement = connection.prepare(sql)?;

        match statement.execute(rusqlite::params_from_iter(params.iter())) {
            Ok(affected) => Ok(affected),
            Err(rusqlite::Error::ExecuteReturnedResults) => Ok(0),
            Err(e) => Err(e.into()),
        }
    }

    fn query(&self, sql: &str, params: &[Value]) -> Result<Vec<Row>> {
        let connection = self.lock();
        let mut statement = connection.prepare(sql)?;

        fetch_rows(&mut statement, params)
    }
}

impl Connection for SqliteConnection {
    fn begin_transaction(&self) -> AsyncResult<'_, ()> {
        Box::pin(async move { self.execute_batch("BEGIN") })
    }

    fn commit(&self) -> AsyncResult<'_, ()> {
        Box::pin(async move { self.execute_batch("COMMIT") })
    }

    fn roll_back(&self) -> AsyncResult<'_, ()> {
        Box::pin(async move { self.execute_batch("ROLLBACK") })
    }

    fn execute_statement<'a>(&'a self, sql: &'a str, params: &'a [Value]) -> AsyncResult<'a, usize> {
        Box::pin(async move { self.execute(sql, params) })
    }

    fn fetch_all<'a>(&'a self, sql: &'a str, params: &'a [Value]) -> AsyncResult<'a, Vec<Row>> {
        Box::pin(async move { self.query(sql, params) })
    }
}

impl ToSql for Value {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(match self {
            Value::NULL => ToSqlOutput::from(rusqlite::types::Null),
            Value::Int(value) => ToSqlOutput::from(*value),
            Value::UInt(value) => ToSqlOutput::from(i64::try_from(*value).unwrap_or(i64::MAX)),
            Value::String(value) => ToSqlOutput::from(value.as_str()),
            Value::Bytes(value) => ToSqlOutput::from(value.as_slice()),
            Value::Float(value) => ToSqlOutput::from(*value),
            Value::Boolean(value) => ToSqlOutput::from(*value),
            Value::DateTime(value) => {
                ToSqlOutput::Owned(rusqlite::types::Value::Text(value.to_rfc3339()))
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::{ConnectionOptions, SqliteConnection};
    use crate::{Connection, Value};
    use serial_test::serial;
    use std::fs::remove_file;

    fn temp_db_path() -> String {
        let mut file = std::env::temp_dir();
        file.push("creed_migrate_test_temp_db.sqlite");
        file.to_str().unwrap().to_string()
    }

    #[test]
    fn parses_dsn() {
        assert!(ConnectionOptions::new("sqlite://:memory:").unwrap().is_memory());

        let options = ConnectionOptions::new("sqlite:///tmp/db.sqlite").unwrap();
        assert_eq!(options.get_path(), Some("/tmp/db.sqlite"));

        let options = ConnectionOptions::new("var/db.sqlite").unwrap();
        assert_eq!(options.get_path(), Some("var/db.sqlite"));
        assert!(!options.is_memory());
    }

    #[tokio::test]
    #[serial]
    async fn can_connect_to_a_file() {
        let path = temp_db_path();
        let connection = SqliteConnection::from_dsn(format!("sqlite://{}", path)).unwrap();
        connection
            .execute_statement("CREATE TABLE IF NOT EXISTS foo (id INTEGER)", &[])
            .await
            .unwrap();
        drop(connection);

        let _ = remove_file(path);
    }

    #[tokio::test]
    #[serial]
    async fn persists_across_connections() {
        let path = temp_db_path();
        let _ = remove_file(&path);

        let connection = SqliteConnection::open(path.as_str()).unwrap();
        connection
            .execute_statement("CREATE TABLE bar (id INTEGER)", &[])
            .await
            .unwrap();
        connection
            .execute_statement("INSERT INTO bar (id) VALUES (?)", &[Value::Int(42)])
            .await
            .unwrap();
        drop(connection);

        let connection = SqliteConnection::open(path.as_str()).unwrap();
        let rows = connection.fetch_all("SELECT id FROM bar", &[]).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].get("id").unwrap(), &Value::Int(42));
        drop(connection);

        let _ = remove_file(path);
    }

    #[tokio::test]
    async fn executes_and_fetches() {
        let connection = SqliteConnection::open_in_memory().unwrap();
        connection
            .execute_statement("CREATE TABLE foo (id INTEGER, name TEXT)", &[])
            .await
            .unwrap();

        let affected = connection
            .execute_statement(
                "INSERT INTO foo (id, name) VALUES (?, ?)",
                &[Value::Int(1), Value::from("one")],
            )
            .await
            .unwrap();
        assert_eq!(affected, 1);

        let rows = connection
            .fetch_all("SELECT id, name FROM foo WHERE id = ?", &[Value::Int(1)])
            .await
            .unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].get("name").unwrap(), &Value::from("one"));
        assert_eq!(rows[0].get(0usize).unwrap(), &Value::Int(1));

        assert!(
            connection
                .execute_statement("NOT_A_COMMAND 1", &[])
                .await
                .is_err()
        );
    }

    #[tokio::test]
    async fn rolls_back_transactions() {
        let connection = SqliteConnection::open_in_memory().unwrap();
        connection.begin_transaction().await.unwrap();
        connection
            .execute_statement("CREATE TABLE foo (id INTEGER)", &[])
            .await
            .unwrap();
        connection.roll_back().await.unwrap();

        let rows = connection
            .fetch_all("SELECT name FROM sqlite_master WHERE type = 'table'", &[])
            .await
            .unwrap();
        assert!(rows.is_empty());
    }
}
