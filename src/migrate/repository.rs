use crate::Result;
use crate::error::Error;
use crate::migrate::{FnMigration, Migration, Version};
use std::cmp::Ordering;
use std::collections::HashSet;

/// Read-only catalog of the migrations known to the application.
pub trait MigrationsRepository<S>: Send + Sync {
    fn has_version(&self, version: &Version) -> bool;

    /// Fails with `MigrationClassNotFound` for unknown versions.
    fn get_migration(&self, version: &Version) -> Result<&dyn Migration<S>>;

    /// All the migrations, in no particular order.
    ///
    /// Fails with `DuplicateMigrationVersion` if the same version has been
    /// registered twice.
    fn get_all_migrations(&self) -> Result<AvailableMigrationsList<'_, S>>;
}

pub struct AvailableMigration<'a, S> {
    pub version: Version,
    pub migration: &'a dyn Migration<S>,
}

impl<S> Clone for AvailableMigration<'_, S> {
    fn clone(&self) -> Self {
        Self {
            version: self.version.clone(),
            migration: self.migration,
        }
    }
}

pub struct AvailableMigrationsList<'a, S> {
    items: Vec<AvailableMigration<'a, S>>,
}

impl<'a, S> AvailableMigrationsList<'a, S> {
    pub fn new(items: Vec<AvailableMigration<'a, S>>) -> Self {
        Self { items }
    }

    delegate::delegate! {
        to self.items {
            pub fn len(&self) -> usize;
            pub fn is_empty(&self) -> bool;
            pub fn first(&self) -> Option<&AvailableMigration<'a, S>>;
            pub fn last(&self) -> Option<&AvailableMigration<'a, S>>;
            pub fn iter(&self) -> std::slice::Iter<'_, AvailableMigration<'a, S>>;
        }
    }

    pub(crate) fn sort_by<F>(&mut self, compare: F)
    where
        F: FnMut(&AvailableMigration<'a, S>, &AvailableMigration<'a, S>) -> Ordering,
    {
        self.items.sort_by(compare);
    }

    pub fn has_migration(&self, version: &Version) -> bool {
        self.items.iter().any(|m| &m.version == version)
    }

    pub fn get_migration(&self, version: &Version) -> Option<&AvailableMigration<'a, S>> {
        self.items.iter().find(|m| &m.version == version)
    }

    pub fn versions(&self) -> Vec<Version> {
        self.items.iter().map(|m| m.version.clone()).collect()
    }

    fn ensure_unique(self) -> Result<Self> {
        let mut seen = HashSet::new();
        for item in &self.items {
            if !seen.insert(&item.version) {
                return Err(Error::duplicate_migration_version(&item.version));
            }
        }

        Ok(self)
    }
}

impl<'a, S> FromIterator<AvailableMigration<'a, S>> for AvailableMigrationsList<'a, S> {
    fn from_iter<T: IntoIterator<Item = AvailableMigration<'a, S>>>(iter: T) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

/// Catalog of function-based migrations, built at compile time by the
/// [`migrations!`](crate::migrations) macro.
pub struct StaticMigrations<S: 'static> {
    migrations: &'static [FnMigration<S>],
}

impl<S: 'static> StaticMigrations<S> {
    pub const fn new(migrations: &'static [FnMigration<S>]) -> Self {
        Self { migrations }
    }

    fn find(&self, version: &Version) -> Option<&FnMigration<S>> {
        self.migrations.iter().find(|m| m.version == version.as_str())
    }
}

impl<S: 'static> MigrationsRepository<S> for StaticMigrations<S> {
    fn has_version(&self, version: &Version) -> bool {
        self.find(version).is_some()
    }

    fn get_migration(&self, version: &Version) -> Result<&dyn Migration<S>> {
        self.find(version)
            .map(|m| m as &dyn Migration<S>)
            .ok_or_else(|| Error::migration_class_not_found(version))
    }

    fn get_all_migrations(&self) -> Result<AvailableMigrationsList<'_, S>> {
        self.migrations
            .iter()
            .map(|m| AvailableMigration {
                version: Version::from(m.version),
                migration: m as &dyn Migration<S>,
            })
            .collect::<AvailableMigrationsList<_>>()
            .ensure_unique()
    }
}

/// Catalog filled at runtime.
pub struct InMemoryMigrationsRepository<S> {
    migrations: Vec<(Version, Box<dyn Migration<S>>)>,
}

impl<S> Default for InMemoryMigrationsRepository<S> {
    fn default() -> Self {
        Self { migrations: vec![] }
    }
}

impl<S> InMemoryMigrationsRepository<S> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<M>(&mut self, version: impl Into<Version>, migration: M) -> Result<()>
    where
        M: Migration<S> + 'static,
    {
        let version = version.into();
        if self.has_version(&version) {
            return Err(Error::duplicate_migration_version(&version));
        }

        self.migrations.push((version, Box::new(migration)));
        Ok(())
    }

    pub fn with_migration<M>(mut self, version: impl Into<Version>, migration: M) -> Result<Self>
    where
        M: Migration<S> + 'static,
    {
        self.register(version, migration)?;
        Ok(self)
    }
}

impl<S> MigrationsRepository<S> for InMemoryMigrationsRepository<S> {
    fn has_version(&self, version: &Version) -> bool {
        self.migrations.iter().any(|(v, _)| v == version)
    }

    fn get_migration(&self, version: &Version) -> Result<&dyn Migration<S>> {
        self.migrations
            .iter()
            .find(|(v, _)| v == version)
            .map(|(_, m)| m.as_ref())
            .ok_or_else(|| Error::migration_class_not_found(version))
    }

    fn get_all_migrations(&self) -> Result<AvailableMigrationsList<'_, S>> {
        Ok(self
            .migrations
            .iter()
            .map(|(version, migration)| AvailableMigration {
                version: version.clone(),
                migration: migration.as_ref(),
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::tests::{TestMigration, TestSchema};

    #[test]
    fn in_memory_repository_rejects_duplicates() {
        let mut repository = InMemoryMigrationsRepository::<TestSchema>::new();
        repository
            .register("1", TestMigration::creating("users"))
            .unwrap();

        let error = repository
            .register("1", TestMigration::creating("groups"))
            .unwrap_err();
        assert_eq!(error.kind(), ErrorKind::DuplicateMigrationVersion);
    }

    #[test]
    fn unknown_versions_are_not_found() {
        let repository = InMemoryMigrationsRepository::<TestSchema>::new()
            .with_migration("1", TestMigration::creating("users"))
            .unwrap();

        assert!(repository.has_version(&"1".into()));
        assert!(!repository.has_version(&"2".into()));
        assert_eq!(
            repository.get_migration(&"2".into()).err().unwrap().kind(),
            ErrorKind::MigrationClassNotFound
        );
        assert_eq!(repository.get_all_migrations().unwrap().len(), 1);
    }
}
