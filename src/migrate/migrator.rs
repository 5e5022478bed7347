use crate::error::Error;
use crate::migrate::memory::{current_memory_usage, format_memory, memory_delta};
use crate::migrate::metadata::{ExecutedMigrationsList, MetadataStorage};
use crate::migrate::{
    AliasResolver, Direction, ExecutionPlan, ExecutionResult, Executor, LogProgressSink,
    MigrationPlanCalculator, MigrationStatus, MigrationsRepository, MigrationsResult,
    ProgressSink, SchemaDiffProvider, Version,
};
use crate::{
    Configuration, Connection, EventDispatcher, MigrationsMigratedEvent, MigrationsMigratingEvent,
    Result, TransactionScope,
};
use log::{error, info, warn};
use std::sync::Arc;
use std::time::Instant;

/// Per-run switches. Threaded by value through a run, never mutated.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct MigratorOptions {
    /// Compute and echo the SQL without executing it or touching the history.
    pub dry_run: bool,
    /// Wrap the whole plan in one transaction.
    pub all_or_nothing: bool,
    /// Measure and report every statement.
    pub time_all_queries: bool,
    /// Return an empty result instead of failing when an alias does not
    /// resolve to a version.
    pub no_migration_exception: bool,
}

impl MigratorOptions {
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn with_all_or_nothing(mut self, all_or_nothing: bool) -> Self {
        self.all_or_nothing = all_or_nothing;
        self
    }

    pub fn with_time_all_queries(mut self, time_all_queries: bool) -> Self {
        self.time_all_queries = time_all_queries;
        self
    }

    pub fn with_no_migration_exception(mut self, no_migration_exception: bool) -> Self {
        self.no_migration_exception = no_migration_exception;
        self
    }
}

impl From<&Configuration> for MigratorOptions {
    fn from(configuration: &Configuration) -> Self {
        Self::default()
            .with_all_or_nothing(configuration.is_all_or_nothing())
            .with_time_all_queries(configuration.is_time_all_queries())
    }
}

/// Executes plans against a database and keeps its history up to date.
pub struct Migrator<'a, S> {
    connection: &'a dyn Connection,
    repository: &'a dyn MigrationsRepository<S>,
    metadata_storage: &'a dyn MetadataStorage,
    schema_provider: &'a dyn SchemaDiffProvider<S>,
    configuration: Configuration,
    event_dispatcher: Arc<EventDispatcher>,
    progress: Arc<dyn ProgressSink>,
}

impl<'a, S> Migrator<'a, S> {
    pub fn new(
        connection: &'a dyn Connection,
        repository: &'a dyn MigrationsRepository<S>,
        metadata_storage: &'a dyn MetadataStorage,
        schema_provider: &'a dyn SchemaDiffProvider<S>,
    ) -> Self {
        Self {
            connection,
            repository,
            metadata_storage,
            schema_provider,
            configuration: Configuration::default(),
            event_dispatcher: Arc::new(EventDispatcher::new()),
            progress: Arc::new(LogProgressSink),
        }
    }

    pub fn with_configuration(mut self, configuration: Configuration) -> Self {
        self.configuration = configuration;
        self
    }

    pub fn with_event_dispatcher(mut self, event_dispatcher: Arc<EventDispatcher>) -> Self {
        self.event_dispatcher = event_dispatcher;
        self
    }

    pub fn with_progress_sink(mut self, progress: Arc<dyn ProgressSink>) -> Self {
        self.progress = progress;
        self
    }

    pub fn get_configuration(&self) -> &Configuration {
        &self.configuration
    }

    /// Options seeded from the configuration.
    pub fn default_options(&self) -> MigratorOptions {
        MigratorOptions::from(&self.configuration)
    }

    pub fn plan_calculator(&self) -> MigrationPlanCalculator<'_, S> {
        MigrationPlanCalculator::new(self.repository, self.configuration.get_comparator())
    }

    /// Executes every item of `plan`, in order.
    ///
    /// In all-or-nothing mode the whole plan runs inside a single
    /// transaction; otherwise each migration commits on its own and a failure
    /// leaves the previous ones applied.
    pub async fn migrate(
        &self,
        plan: &ExecutionPlan,
        options: &MigratorOptions,
    ) -> Result<MigrationsResult> {
        if plan.is_empty() {
            info!(target: "creed::migrate", "No migrations to execute.");
            self.progress.write_line("No migrations to execute.");
            return Ok(MigrationsResult::empty(plan.direction()));
        }

        self.event_dispatcher
            .dispatch(&mut MigrationsMigratingEvent::new(
                plan.clone(),
                options.dry_run,
            ))
            .await;

        self.metadata_storage.ensure_initialized().await?;

        let transactions = TransactionScope::new(self.connection);
        let start = Instant::now();
        let memory_before = current_memory_usage();

        if options.all_or_nothing {
            transactions.begin_transaction().await?;
        }

        let results = match self.execute_plan(plan, options, &transactions).await {
            Ok(results) => results,
            Err(e) => {
                error!(target: "creed::migrate", "{}", e);
                self.roll_back_all(&transactions, options).await;
                return Err(e);
            }
        };

        if options.all_or_nothing {
            if let Err(e) = transactions.commit().await {
                error!(target: "creed::migrate", "Unable to commit migrations: {}", e);
                self.roll_back_all(&transactions, options).await;
                return Err(e);
            }
        }

        let result = MigrationsResult {
            direction: plan.direction(),
            results,
            time: start.elapsed(),
            memory_usage: memory_delta(memory_before, current_memory_usage()),
        };

        self.event_dispatcher
            .dispatch(&mut MigrationsMigratedEvent::new(
                plan.clone(),
                options.dry_run,
            ))
            .await;

        let memory = result
            .memory_usage
            .map_or_else(|| "unknown".to_string(), format_memory);
        info!(target: "creed::migrate", "Migrated database in {}ms using {} memory, {} migrations executed, {} sql queries", result.time.as_millis(), memory, result.len(), result.query_count());
        self.progress.write_line("------------------------");
        self.progress
            .write_line(&format!("++ finished in {}ms", result.time.as_millis()));
        self.progress.write_line(&format!("++ used {} memory", memory));
        self.progress
            .write_line(&format!("++ {} migrations executed", result.len()));
        self.progress
            .write_line(&format!("++ {} sql queries", result.query_count()));

        Ok(result)
    }

    async fn execute_plan(
        &self,
        plan: &ExecutionPlan,
        options: &MigratorOptions,
        transactions: &TransactionScope<'_>,
    ) -> Result<Vec<ExecutionResult>> {
        let mut executor = Executor::new(
            self.repository,
            self.metadata_storage,
            self.schema_provider,
            transactions,
            self.event_dispatcher.as_ref(),
            self.progress.as_ref(),
        );

        let mut results = Vec::with_capacity(plan.len());
        let mut schema = None;
        for item in plan {
            let (result, to_schema) = executor.execute(item, options, schema.take()).await?;
            schema = to_schema;
            results.push(result);
        }

        Ok(results)
    }

    async fn roll_back_all(&self, transactions: &TransactionScope<'_>, options: &MigratorOptions) {
        if !options.all_or_nothing {
            return;
        }

        if let Err(e) = transactions.roll_back().await {
            error!(target: "creed::migrate", "Unable to roll back migrations: {}", e);
        }
    }

    /// Migrates the database to the version `alias` resolves to.
    pub async fn migrate_to(
        &self,
        alias: &str,
        options: &MigratorOptions,
    ) -> Result<MigrationsResult> {
        self.metadata_storage.ensure_initialized().await?;
        let executed = self.metadata_storage.get_executed_migrations().await?;
        let calculator = self.plan_calculator();

        let unavailable = calculator.get_executed_unavailable_migrations(&executed)?;
        if !unavailable.is_empty() {
            warn!(target: "creed::migrate", "You have {} previously executed migrations in the database that are not registered migrations.", unavailable.len());
            for migration in unavailable.iter() {
                self.progress
                    .write_warning(&format!("  >> {}", migration.version));
            }
        }

        let Some(version) =
            AliasResolver::new(&calculator).resolve_version_alias(alias, &executed)?
        else {
            if options.no_migration_exception {
                self.progress.write_warning(&format!(
                    r#"Could not find any migrations to execute for "{}"."#,
                    alias
                ));
                return Ok(MigrationsResult::empty(Direction::Up));
            }

            return Err(Error::no_migrations_to_execute());
        };

        let plan = calculator.get_plan_until_version(&version, &executed)?;
        info!(target: "creed::migrate", "Migrating {} to {}", plan.direction(), version);

        self.migrate(&plan, options).await
    }

    /// Executes exactly the given versions in `direction`, whatever the
    /// current version is.
    pub async fn execute_versions(
        &self,
        versions: &[Version],
        direction: Direction,
        options: &MigratorOptions,
    ) -> Result<MigrationsResult> {
        self.metadata_storage.ensure_initialized().await?;
        let plan = self
            .plan_calculator()
            .get_plan_for_versions(versions, direction)?;

        self.migrate(&plan, options).await
    }

    pub async fn status(&self) -> Result<MigrationStatus> {
        self.metadata_storage.ensure_initialized().await?;
        let executed = self.metadata_storage.get_executed_migrations().await?;
        let calculator = self.plan_calculator();
        let resolver = AliasResolver::new(&calculator);
        let resolve = |alias: &str| -> Result<Version> {
            Ok(resolver
                .resolve_version_alias(alias, &executed)?
                .unwrap_or_else(Version::zero))
        };

        Ok(MigrationStatus {
            current: resolve("current")?,
            prev: resolve("prev")?,
            next: resolver.resolve_version_alias("next", &executed)?,
            latest: resolve("latest")?,
            executed: executed.len(),
            executed_unavailable: calculator
                .get_executed_unavailable_migrations(&executed)?
                .len(),
            available: calculator.get_migrations()?.len(),
            new: calculator.get_new_migrations(&executed)?.len(),
        })
    }

    /// Records versions as executed (up) or not executed (down) without
    /// running them.
    pub async fn mark_versions(&self, versions: &[Version], direction: Direction) -> Result<()> {
        self.metadata_storage.ensure_initialized().await?;
        let executed = self.metadata_storage.get_executed_migrations().await?;
        check_markable(self.repository, &executed, versions, direction)?;

        for version in versions {
            self.metadata_storage
                .complete(&ExecutionResult::new(version.clone(), direction))
                .await?;

            self.progress.write_line(&format!(
                "{} {} the version table.",
                version,
                match direction {
                    Direction::Up => "added to",
                    Direction::Down => "deleted from",
                }
            ));
        }

        Ok(())
    }

    /// Replaces the whole history with the only available migration.
    pub async fn rollup(&self) -> Result<Version> {
        self.metadata_storage.ensure_initialized().await?;
        let migrations = self.plan_calculator().get_migrations()?;
        let latest = match migrations.len() {
            0 => return Err(Error::no_migrations_found()),
            1 => migrations.versions().remove(0),
            count => return Err(Error::too_many_migrations_for_rollup(count)),
        };

        self.metadata_storage.reset().await?;
        self.metadata_storage
            .complete(&ExecutionResult::new(latest.clone(), Direction::Up))
            .await?;

        self.progress
            .write_line(&format!("Rolled up migrations to version {}", latest));
        Ok(latest)
    }
}

fn check_markable<S>(
    repository: &dyn MigrationsRepository<S>,
    executed: &ExecutedMigrationsList,
    versions: &[Version],
    direction: Direction,
) -> Result<()> {
    for version in versions {
        match direction {
            Direction::Up if !repository.has_version(version) => {
                return Err(Error::migration_class_not_found(version));
            }
            Direction::Up if executed.has_migration(version) => {
                return Err(Error::migration_already_executed(version));
            }
            Direction::Down if !executed.has_migration(version) => {
                return Err(Error::migration_not_executed(version));
            }
            _ => {}
        }
    }

    Ok(())
}
