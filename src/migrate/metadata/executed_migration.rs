use crate::migrate::{Comparator, Version};
use chrono::{DateTime, Utc};
use std::time::Duration;

/// One row of migration history.
#[derive(Clone, Debug, PartialEq)]
pub struct ExecutedMigration {
    pub version: Version,
    pub executed_at: Option<DateTime<Utc>>,
    pub execution_time: Option<Duration>,
}

impl ExecutedMigration {
    pub fn new(version: Version) -> Self {
        Self {
            version,
            executed_at: None,
            execution_time: None,
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct ExecutedMigrationsList {
    items: Vec<ExecutedMigration>,
}

impl ExecutedMigrationsList {
    pub fn new(items: Vec<ExecutedMigration>) -> Self {
        Self { items }
    }

    delegate::delegate! {
        to self.items {
            pub fn len(&self) -> usize;
            pub fn is_empty(&self) -> bool;
            pub fn first(&self) -> Option<&ExecutedMigration>;
            pub fn last(&self) -> Option<&ExecutedMigration>;
            pub fn iter(&self) -> std::slice::Iter<'_, ExecutedMigration>;
        }
    }

    pub fn has_migration(&self, version: &Version) -> bool {
        self.items.iter().any(|v| &v.version == version)
    }

    pub fn get_migration(&self, version: &Version) -> Option<&ExecutedMigration> {
        self.items.iter().find(|v| &v.version == version)
    }

    /// Sorts the history ascending by version.
    pub fn sort(&mut self, comparator: &dyn Comparator) {
        self.items
            .sort_by(|a, b| comparator.compare(&a.version, &b.version));
    }
}

impl FromIterator<ExecutedMigration> for ExecutedMigrationsList {
    fn from_iter<T: IntoIterator<Item = ExecutedMigration>>(iter: T) -> Self {
        Self::new(iter.into_iter().collect())
    }
}
