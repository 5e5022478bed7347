use crate::{AsyncResult, Result};

/// Produces schema snapshots and turns the difference between two snapshots
/// into SQL.
///
/// The engine never looks inside a schema: `S` is opaque and only flows
/// between this provider and the migrations.
pub trait SchemaDiffProvider<S>: Send + Sync {
    /// Snapshot of the schema currently in the database.
    fn create_from_schema(&self) -> AsyncResult<'_, S>;

    /// The schema a migration starts editing, derived from the "from" snapshot.
    fn create_to_schema(&self, from_schema: &S) -> S;

    fn get_sql_diff_to_migrate(&self, from_schema: &S, to_schema: &S) -> Result<Vec<String>>;
}

/// Provider for migrations that only issue explicit SQL.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopSchemaDiffProvider;

impl SchemaDiffProvider<()> for NoopSchemaDiffProvider {
    fn create_from_schema(&self) -> AsyncResult<'_, ()> {
        Box::pin(async { Ok(()) })
    }

    fn create_to_schema(&self, _: &()) {}

    fn get_sql_diff_to_migrate(&self, _: &(), _: &()) -> Result<Vec<String>> {
        Ok(vec![])
    }
}
