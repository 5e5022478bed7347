mod alias_resolver;
mod execution_result;
mod executor;
mod memory;
pub mod metadata;
mod migration;
mod migration_plan;
mod migrator;
mod plan_calculator;
mod progress;
mod repository;
mod schema;
mod status;
mod version;

pub use alias_resolver::AliasResolver;
pub use execution_result::{ExecutionResult, MigrationsResult, Query};
pub use executor::{ExecutionState, Executor};
pub use memory::format_memory;
pub use migration::{CheckFn, FnMigration, HookOutcome, Migration, OpFn, Queries};
pub use migration_plan::{ExecutionPlan, PlanItem};
pub use migrator::{Migrator, MigratorOptions};
pub use plan_calculator::MigrationPlanCalculator;
pub use progress::{LogProgressSink, ProgressSink};
pub use repository::{
    AvailableMigration, AvailableMigrationsList, InMemoryMigrationsRepository,
    MigrationsRepository, StaticMigrations,
};
pub use schema::{NoopSchemaDiffProvider, SchemaDiffProvider};
pub use status::MigrationStatus;
pub use version::{AlphabeticalComparator, Comparator, NumericAwareComparator, Version};

use std::fmt::{Display, Formatter};

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum Direction {
    Up,
    Down,
}

impl Display for Direction {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Self::Up => "up",
                Self::Down => "down",
            }
        )
    }
}
