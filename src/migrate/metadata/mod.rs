mod executed_migration;
mod in_memory;

use crate::error::Error;
use crate::migrate::{Direction, ExecutionResult};
use crate::{
    AsyncResult, Configuration, Connection, Result, Row, TableMetadataStorageConfiguration, Value,
};
use chrono::{DateTime, NaiveDateTime, Utc};
pub use executed_migration::{ExecutedMigration, ExecutedMigrationsList};
pub use in_memory::InMemoryMetadataStorage;
use log::debug;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

/// Records which versions have been executed.
///
/// The engine treats this as the only source of truth for "what has run".
pub trait MetadataStorage: Send + Sync {
    /// Creates the underlying storage if it does not exist yet.
    fn ensure_initialized(&self) -> AsyncResult<'_, ()>;

    fn get_executed_migrations(&self) -> AsyncResult<'_, ExecutedMigrationsList>;

    /// Marks the result's version as executed (up) or not executed (down).
    fn complete<'a>(&'a self, execution_result: &'a ExecutionResult) -> AsyncResult<'a, ()>;

    /// Forgets the whole history.
    fn reset(&self) -> AsyncResult<'_, ()>;
}

/// Stores the migration history in a database table, through the same
/// connection the migrations run on. History rows are therefore part of the
/// migration transaction and are rolled back with it.
pub struct TableMetadataStorage<'conn> {
    connection: &'conn dyn Connection,
    configuration: TableMetadataStorageConfiguration,
    is_initialized: AtomicBool,
}

impl<'conn> TableMetadataStorage<'conn> {
    pub fn new(connection: &'conn dyn Connection) -> Self {
        Self {
            connection,
            configuration: TableMetadataStorageConfiguration::default(),
            is_initialized: AtomicBool::new(false),
        }
    }

    /// Storage using the table settings of `configuration`.
    pub fn from_configuration(
        connection: &'conn dyn Connection,
        configuration: &Configuration,
    ) -> Self {
        Self::new(connection)
            .with_configuration(configuration.get_metadata_storage_configuration().clone())
    }

    pub fn with_configuration(mut self, configuration: TableMetadataStorageConfiguration) -> Self {
        self.configuration = configuration;
        self
    }

    pub fn get_configuration(&self) -> &TableMetadataStorageConfiguration {
        &self.configuration
    }

    fn get_create_table_sql(&self) -> String {
        let c = &self.configuration;
        format!(
            "CREATE TABLE IF NOT EXISTS {} ({} VARCHAR({}) NOT NULL, {} VARCHAR(64) DEFAULT NULL, {} INTEGER DEFAULT NULL, PRIMARY KEY ({}))",
            c.get_table_name(),
            c.get_version_column_name(),
            c.get_version_column_length(),
            c.get_executed_at_column_name(),
            c.get_execution_time_column_name(),
            c.get_version_column_name(),
        )
    }

    fn row_to_executed_migration(&self, row: &Row) -> Result<ExecutedMigration> {
        let c = &self.configuration;
        let version = row.get(c.get_version_column_name())?.to_string();
        let executed_at = parse_executed_at(&version, row.get(c.get_executed_at_column_name())?)?;
        let execution_time = row
            .get(c.get_execution_time_column_name())?
            .as_i64()
            .and_then(|ms| u64::try_from(ms).ok())
            .map(Duration::from_millis);

        Ok(ExecutedMigration {
            version: version.into(),
            executed_at,
            execution_time,
        })
    }
}

fn parse_executed_at(version: &str, value: &Value) -> Result<Option<DateTime<Utc>>> {
    match value {
        Value::NULL => Ok(None),
        Value::DateTime(executed_at) => Ok(Some(*executed_at)),
        Value::String(executed_at) => DateTime::parse_from_rfc3339(executed_at)
            .map(|dt| dt.with_timezone(&Utc))
            .or_else(|_| {
                NaiveDateTime::parse_from_str(executed_at, "%Y-%m-%d %H:%M:%S")
                    .map(|dt| dt.and_utc())
            })
            .map(Some)
            .map_err(|_| Error::invalid_executed_at(version, executed_at)),
        other => Err(Error::invalid_executed_at(version, &other.to_string())),
    }
}

impl MetadataStorage for TableMetadataStorage<'_> {
    fn ensure_initialized(&self) -> AsyncResult<'_, ()> {
        Box::pin(async move {
            if self.is_initialized.load(Ordering::SeqCst) {
                return Ok(());
            }

            debug!(target: "creed::migrate", "Initializing metadata table {}", self.configuration.get_table_name());
            self.connection
                .execute_statement(&self.get_create_table_sql(), &[])
                .await?;
            self.is_initialized.store(true, Ordering::SeqCst);

            Ok(())
        })
    }

    fn get_executed_migrations(&self) -> AsyncResult<'_, ExecutedMigrationsList> {
        Box::pin(async move {
            self.ensure_initialized().await?;

            let c = &self.configuration;
            let sql = format!(
                "SELECT {}, {}, {} FROM {}",
                c.get_version_column_name(),
                c.get_executed_at_column_name(),
                c.get_execution_time_column_name(),
                c.get_table_name(),
            );

            let rows = self.connection.fetch_all(&sql, &[]).await?;
            rows.iter()
                .map(|row| self.row_to_executed_migration(row))
                .collect::<Result<ExecutedMigrationsList>>()
        })
    }

    fn complete<'a>(&'a self, execution_result: &'a ExecutionResult) -> AsyncResult<'a, ()> {
        Box::pin(async move {
            self.ensure_initialized().await?;

            let c = &self.configuration;
            let version = Value::from(execution_result.version.as_str());
            if execution_result.direction == Direction::Up {
                let sql = format!(
                    "INSERT INTO {} ({}, {}, {}) VALUES (?, ?, ?)",
                    c.get_table_name(),
                    c.get_version_column_name(),
                    c.get_executed_at_column_name(),
                    c.get_execution_time_column_name(),
                );
                let execution_time = execution_result
                    .execution_time
                    .map(|t| i64::try_from(t.as_millis()).unwrap_or(i64::MAX));

                self.connection
                    .execute_statement(
                        &sql,
                        &[
                            version,
                            Value::DateTime(execution_result.executed_at),
                            Value::from(execution_time),
                        ],
                    )
                    .await?;
            } else {
                let sql = format!(
                    "DELETE FROM {} WHERE {} = ?",
                    c.get_table_name(),
                    c.get_version_column_name(),
                );

                self.connection.execute_statement(&sql, &[version]).await?;
            }

            Ok(())
        })
    }

    fn reset(&self) -> AsyncResult<'_, ()> {
        Box::pin(async move {
            self.ensure_initialized().await?;

            let sql = format!("DELETE FROM {}", self.configuration.get_table_name());
            self.connection.execute_statement(&sql, &[]).await?;

            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::MockConnection;

    #[test]
    fn parses_stored_execution_dates() {
        let parsed = parse_executed_at("1", &Value::from("2024-01-10T20:48:30+00:00")).unwrap();
        assert_eq!(parsed.unwrap().to_rfc3339(), "2024-01-10T20:48:30+00:00");

        let parsed = parse_executed_at("1", &Value::from("2024-01-10 20:48:30")).unwrap();
        assert_eq!(parsed.unwrap().to_rfc3339(), "2024-01-10T20:48:30+00:00");

        assert!(parse_executed_at("1", &Value::NULL).unwrap().is_none());
        assert!(parse_executed_at("1", &Value::from("yesterday")).is_err());
    }

    #[tokio::test]
    async fn writes_history_through_the_connection() {
        let connection = MockConnection::new();
        let storage = TableMetadataStorage::new(&connection).with_configuration(
            TableMetadataStorageConfiguration::default().with_table_name("schema_history"),
        );

        let mut result = ExecutionResult::new("20240101000000".into(), Direction::Up);
        result.execution_time = Some(Duration::from_millis(12));
        storage.complete(&result).await.unwrap();

        let result = ExecutionResult::new("20240101000000".into(), Direction::Down);
        storage.complete(&result).await.unwrap();

        let statements = connection.statements();
        assert_eq!(statements.len(), 3);
        assert!(statements[0].starts_with("CREATE TABLE IF NOT EXISTS schema_history"));
        assert_eq!(
            statements[1],
            "INSERT INTO schema_history (version, executed_at, execution_time) VALUES (?, ?, ?)"
        );
        assert_eq!(statements[2], "DELETE FROM schema_history WHERE version = ?");
    }

    #[tokio::test]
    async fn takes_the_table_settings_from_the_configuration() {
        let connection = MockConnection::new();
        let configuration = Configuration::default().set_metadata_storage_configuration(
            TableMetadataStorageConfiguration::default()
                .with_table_name("schema_versions")
                .with_version_column_name("id"),
        );
        let storage = TableMetadataStorage::from_configuration(&connection, &configuration);

        assert_eq!(storage.get_configuration().get_table_name(), "schema_versions");
        storage.ensure_initialized().await.unwrap();
        storage
            .complete(&ExecutionResult::new("1".into(), Direction::Down))
            .await
            .unwrap();

        let statements = connection.statements();
        assert!(statements[0].starts_with("CREATE TABLE IF NOT EXISTS schema_versions (id VARCHAR"));
        assert_eq!(statements[1], "DELETE FROM schema_versions WHERE id = ?");
    }

    #[cfg(feature = "sqlite")]
    #[tokio::test]
    async fn reads_back_the_history() {
        use crate::driver::sqlite::SqliteConnection;

        let connection = SqliteConnection::open_in_memory().unwrap();
        let storage = TableMetadataStorage::new(&connection);
        assert!(storage.get_executed_migrations().await.unwrap().is_empty());

        let mut result = ExecutionResult::new("2".into(), Direction::Up);
        result.execution_time = Some(Duration::from_millis(7));
        storage.complete(&result).await.unwrap();
        storage
            .complete(&ExecutionResult::new("1".into(), Direction::Up))
            .await
            .unwrap();

        let executed = storage.get_executed_migrations().await.unwrap();
        assert_eq!(executed.len(), 2);
        let migration = executed.get_migration(&"2".into()).unwrap();
        assert_eq!(migration.execution_time, Some(Duration::from_millis(7)));
        assert_eq!(
            migration.executed_at.map(|d| d.timestamp()),
            Some(result.executed_at.timestamp())
        );

        storage.reset().await.unwrap();
        assert!(storage.get_executed_migrations().await.unwrap().is_empty());
    }
}
