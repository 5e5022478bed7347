use crate::Result;
use crate::error::Error;
use crate::migrate::metadata::ExecutedMigrationsList;
use crate::migrate::{
    AvailableMigrationsList, Comparator, Direction, ExecutionPlan, MigrationsRepository, Version,
};
use itertools::Itertools;
use std::cmp::Ordering;

/// Computes which versions have to run, and in which order, to move the
/// database to a given version.
///
/// The calculator holds no state besides the catalog and the ordering: every
/// operation takes the current history as an argument.
pub struct MigrationPlanCalculator<'a, S> {
    repository: &'a dyn MigrationsRepository<S>,
    comparator: &'a dyn Comparator,
}

impl<'a, S> MigrationPlanCalculator<'a, S> {
    pub fn new(repository: &'a dyn MigrationsRepository<S>, comparator: &'a dyn Comparator) -> Self {
        Self {
            repository,
            comparator,
        }
    }

    /// Compares two versions. The zero version sorts before everything else.
    pub fn compare(&self, a: &Version, b: &Version) -> Ordering {
        match (a.is_zero(), b.is_zero()) {
            (true, true) => Ordering::Equal,
            (true, false) => Ordering::Less,
            (false, true) => Ordering::Greater,
            (false, false) => self.comparator.compare(a, b),
        }
    }

    /// The available migrations, sorted ascending.
    pub fn get_migrations(&self) -> Result<AvailableMigrationsList<'a, S>> {
        let mut migrations = self.repository.get_all_migrations()?;
        migrations.sort_by(|a, b| self.compare(&a.version, &b.version));

        Ok(migrations)
    }

    /// The executed versions, sorted ascending.
    pub fn get_executed_versions(&self, executed: &ExecutedMigrationsList) -> Vec<Version> {
        executed
            .iter()
            .map(|m| m.version.clone())
            .sorted_by(|a, b| self.compare(a, b))
            .collect()
    }

    /// The highest executed version, or zero if nothing has been executed.
    pub fn get_current_version(&self, executed: &ExecutedMigrationsList) -> Version {
        executed
            .iter()
            .map(|m| &m.version)
            .max_by(|a, b| self.compare(a, b))
            .cloned()
            .unwrap_or_else(Version::zero)
    }

    pub fn get_plan_until_version(
        &self,
        target: &Version,
        executed: &ExecutedMigrationsList,
    ) -> Result<ExecutionPlan> {
        let migrations = self.get_migrations()?;
        if !target.is_zero() && !migrations.has_migration(target) {
            return Err(Error::unknown_migration_version(target.as_str()));
        }

        let current = self.get_current_version(executed);
        if self.compare(target, &current) == Ordering::Equal {
            return Ok(ExecutionPlan::empty(Direction::Up));
        }

        // Executed versions missing from the catalog never drive the
        // direction: only available ones above the target are reverted.
        let to_revert = migrations
            .iter()
            .rev()
            .filter(|m| self.compare(&m.version, target) == Ordering::Greater)
            .filter(|m| executed.has_migration(&m.version))
            .map(|m| m.version.clone())
            .collect_vec();

        let plan = if to_revert.is_empty() {
            ExecutionPlan::new(
                migrations
                    .iter()
                    .filter(|m| self.compare(&m.version, target) != Ordering::Greater)
                    .filter(|m| !executed.has_migration(&m.version))
                    .map(|m| m.version.clone()),
                Direction::Up,
            )
        } else {
            ExecutionPlan::new(to_revert, Direction::Down)
        };

        Ok(plan)
    }

    /// Plans exactly the given versions, whatever their relation to the
    /// current version.
    pub fn get_plan_for_versions(
        &self,
        versions: &[Version],
        direction: Direction,
    ) -> Result<ExecutionPlan> {
        if let Some(missing) = versions.iter().find(|v| !self.repository.has_version(v)) {
            return Err(Error::migration_class_not_found(missing));
        }

        let sorted = versions.iter().cloned().sorted_by(|a, b| match direction {
            Direction::Up => self.compare(a, b),
            Direction::Down => self.compare(b, a),
        });

        Ok(ExecutionPlan::new(sorted, direction))
    }

    /// Migrations that have never been executed, ascending.
    pub fn get_new_migrations(
        &self,
        executed: &ExecutedMigrationsList,
    ) -> Result<AvailableMigrationsList<'a, S>> {
        Ok(self
            .get_migrations()?
            .iter()
            .filter(|m| !executed.has_migration(&m.version))
            .cloned()
            .collect())
    }

    /// Executed versions that are not in the catalog anymore.
    pub fn get_executed_unavailable_migrations(
        &self,
        executed: &ExecutedMigrationsList,
    ) -> Result<ExecutedMigrationsList> {
        let migrations = self.get_migrations()?;
        let mut unavailable = executed
            .iter()
            .filter(|m| !migrations.has_migration(&m.version))
            .cloned()
            .collect::<ExecutedMigrationsList>();
        unavailable.sort(self.comparator);

        Ok(unavailable)
    }
}
