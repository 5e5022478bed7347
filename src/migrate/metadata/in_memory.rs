use crate::AsyncResult;
use crate::migrate::metadata::{ExecutedMigration, ExecutedMigrationsList, MetadataStorage};
use crate::migrate::{Direction, ExecutionResult, Version};
use dashmap::DashMap;

/// Keeps the history in process memory.
///
/// Writes are not tied to any database transaction: a rolled back
/// all-or-nothing run still leaves its completed versions here.
#[derive(Debug, Default)]
pub struct InMemoryMetadataStorage {
    items: DashMap<Version, ExecutedMigration>,
}

impl InMemoryMetadataStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds the storage with an existing history.
    pub fn with_executed<I, V>(self, versions: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Version>,
    {
        for version in versions {
            let version = version.into();
            self.items
                .insert(version.clone(), ExecutedMigration::new(version));
        }

        self
    }
}

impl MetadataStorage for InMemoryMetadataStorage {
    fn ensure_initialized(&self) -> AsyncResult<'_, ()> {
        Box::pin(async move { Ok(()) })
    }

    fn get_executed_migrations(&self) -> AsyncResult<'_, ExecutedMigrationsList> {
        Box::pin(async move {
            let mut items = self
                .items
                .iter()
                .map(|entry| entry.value().clone())
                .collect::<Vec<_>>();
            items.sort_by(|a, b| a.version.as_str().cmp(b.version.as_str()));

            Ok(ExecutedMigrationsList::new(items))
        })
    }

    fn complete<'a>(&'a self, execution_result: &'a ExecutionResult) -> AsyncResult<'a, ()> {
        Box::pin(async move {
            let version = execution_result.version.clone();
            match execution_result.direction {
                Direction::Up => {
                    self.items.insert(
                        version.clone(),
                        ExecutedMigration {
                            version,
                            executed_at: Some(execution_result.executed_at),
                            execution_time: execution_result.execution_time,
                        },
                    );
                }
                Direction::Down => {
                    self.items.remove(&version);
                }
            }

            Ok(())
        })
    }

    fn reset(&self) -> AsyncResult<'_, ()> {
        Box::pin(async move {
            self.items.clear();
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tracks_completed_versions() {
        tokio_test::block_on(async {
            let storage = InMemoryMetadataStorage::new().with_executed(["1"]);

            storage
                .complete(&ExecutionResult::new("2".into(), Direction::Up))
                .await
                .unwrap();
            let executed = storage.get_executed_migrations().await.unwrap();
            assert_eq!(executed.len(), 2);
            assert!(
                executed
                    .get_migration(&"2".into())
                    .unwrap()
                    .executed_at
                    .is_some()
            );

            storage
                .complete(&ExecutionResult::new("1".into(), Direction::Down))
                .await
                .unwrap();
            let executed = storage.get_executed_migrations().await.unwrap();
            assert!(!executed.has_migration(&"1".into()));

            storage.reset().await.unwrap();
            assert!(storage.get_executed_migrations().await.unwrap().is_empty());
        });
    }
}
