use crate::error::Error;
use crate::migrate::memory::{current_memory_usage, memory_delta};
use crate::migrate::metadata::MetadataStorage;
use crate::migrate::{
    Direction, ExecutionResult, HookOutcome, Migration, MigrationsRepository, MigratorOptions,
    PlanItem, ProgressSink, Queries, Query, SchemaDiffProvider,
};
use crate::{
    EventDispatcher, Result, TransactionScope, VersionExecutedEvent, VersionExecutingEvent,
    VersionSkippedEvent,
};
use log::{debug, error};
use std::fmt::{Display, Formatter};
use std::time::Instant;

/// Lifecycle phase of the migration currently being executed.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ExecutionState {
    None,
    Pre,
    Exec,
    Post,
}

impl Display for ExecutionState {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::None => "None",
            Self::Pre => "Pre-Checks",
            Self::Exec => "Execution",
            Self::Post => "Post-Checks",
        })
    }
}

enum Flow<S> {
    Completed(S),
    Skipped { reason: String, schema: S },
}

/// Turns a hook outcome into control flow: skips return early with the
/// untouched "from" schema, aborts become errors.
macro_rules! proceed {
    ($outcome:expr, $schema:expr) => {
        match $outcome? {
            HookOutcome::Continue => {}
            HookOutcome::Skip(reason) => {
                return Ok(Flow::Skipped {
                    reason,
                    schema: $schema,
                });
            }
            HookOutcome::Abort(reason) => return Err(Error::migration_aborted(&reason)),
        }
    };
}

/// Runs a single plan item through its pre, execution and post phases.
pub struct Executor<'a, S> {
    repository: &'a dyn MigrationsRepository<S>,
    metadata_storage: &'a dyn MetadataStorage,
    schema_provider: &'a dyn SchemaDiffProvider<S>,
    transactions: &'a TransactionScope<'a>,
    event_dispatcher: &'a EventDispatcher,
    progress: &'a dyn ProgressSink,
    state: ExecutionState,
}

impl<'a, S> Executor<'a, S> {
    pub fn new(
        repository: &'a dyn MigrationsRepository<S>,
        metadata_storage: &'a dyn MetadataStorage,
        schema_provider: &'a dyn SchemaDiffProvider<S>,
        transactions: &'a TransactionScope<'a>,
        event_dispatcher: &'a EventDispatcher,
        progress: &'a dyn ProgressSink,
    ) -> Self {
        Self {
            repository,
            metadata_storage,
            schema_provider,
            transactions,
            event_dispatcher,
            progress,
            state: ExecutionState::None,
        }
    }

    pub fn get_execution_state(&self) -> ExecutionState {
        self.state
    }

    /// Executes `item`, starting from `from_schema` when the previous item
    /// left one behind.
    ///
    /// Returns the result together with the schema the next item should
    /// start from. A skipped migration is not an error.
    pub async fn execute(
        &mut self,
        item: &PlanItem,
        options: &MigratorOptions,
        from_schema: Option<S>,
    ) -> Result<(ExecutionResult, Option<S>)> {
        let migration = self.repository.get_migration(&item.version)?;
        let mut result = ExecutionResult::new(item.version.clone(), item.direction);

        self.event_dispatcher
            .dispatch(&mut VersionExecutingEvent::new(
                item.version.clone(),
                item.direction,
                options.dry_run,
            ))
            .await;

        let began = migration.is_transactional();
        if began {
            if let Err(e) = self.transactions.begin_transaction().await {
                return Err(self.fail(item, false, e).await);
            }
        }

        let start = Instant::now();
        let memory_before = current_memory_usage();
        let outcome = self
            .run(migration, item, options, from_schema, began, &mut result, start)
            .await;
        result.memory_usage = memory_delta(memory_before, current_memory_usage());

        match outcome {
            Ok(Flow::Completed(schema)) => {
                self.state = ExecutionState::None;
                self.event_dispatcher
                    .dispatch(&mut VersionExecutedEvent::new(
                        item.version.clone(),
                        item.direction,
                        options.dry_run,
                    ))
                    .await;

                self.progress.write_line(&format!(
                    "{} (took {}ms, {} sql statements)",
                    match item.direction {
                        Direction::Up => "++ migrated",
                        Direction::Down => "-- reverted",
                    },
                    start.elapsed().as_millis(),
                    result.sql.len(),
                ));

                Ok((result, Some(schema)))
            }
            Ok(Flow::Skipped { reason, schema }) => {
                match self.skip(item, options, began, reason, &mut result).await {
                    Ok(()) => Ok((result, Some(schema))),
                    Err(e) => Err(self.fail(item, began, e).await),
                }
            }
            Err(e) => Err(self.fail(item, began, e).await),
        }
    }

    #[allow(clippy::too_many_arguments)]
    async fn run(
        &mut self,
        migration: &dyn Migration<S>,
        item: &PlanItem,
        options: &MigratorOptions,
        from_schema: Option<S>,
        began: bool,
        result: &mut ExecutionResult,
        start: Instant,
    ) -> Result<Flow<S>> {
        self.state = ExecutionState::Pre;
        let from = match from_schema {
            Some(schema) => schema,
            None => self.schema_provider.create_from_schema().await?,
        };

        proceed!(
            match item.direction {
                Direction::Up => migration.pre_up(&from),
                Direction::Down => migration.pre_down(&from),
            },
            from
        );

        self.progress.write_line(&format!(
            "{} {}",
            match item.direction {
                Direction::Up => "++ migrating",
                Direction::Down => "-- reverting",
            },
            item.version
        ));
        if !migration.description().is_empty() {
            self.progress
                .write_line(&format!("     {}", migration.description()));
        }

        self.state = ExecutionState::Exec;
        let mut to = self.schema_provider.create_to_schema(&from);
        let mut queries = Queries::new();
        proceed!(
            match item.direction {
                Direction::Up => migration.up(&mut to, &mut queries),
                Direction::Down => migration.down(&mut to, &mut queries),
            },
            from
        );

        result.sql = queries.into_inner();
        result.sql.extend(
            self.schema_provider
                .get_sql_diff_to_migrate(&from, &to)?
                .into_iter()
                .map(Query::new),
        );

        if result.sql.is_empty() {
            self.progress.write_warning(&format!(
                "Migration {} was executed but did not result in any SQL statements.",
                item.version
            ));
        }

        for query in result.sql.iter_mut() {
            self.progress.write_line(&format!("     -> {}", query));
            if options.dry_run {
                continue;
            }

            debug!(target: "creed::migrate", "Executing {}", query.statement);
            let query_start = Instant::now();
            self.transactions
                .connection()
                .execute_statement(&query.statement, &query.parameters)
                .await?;

            if options.time_all_queries {
                let elapsed = query_start.elapsed();
                query.execution_time = Some(elapsed);
                self.progress
                    .write_line(&format!("     {}ms", elapsed.as_millis()));
            }
        }

        self.state = ExecutionState::Post;
        proceed!(
            match item.direction {
                Direction::Up => migration.post_up(&to),
                Direction::Down => migration.post_down(&to),
            },
            from
        );

        result.execution_time = Some(start.elapsed());
        result.state = self.state;
        if !options.dry_run {
            self.metadata_storage.complete(result).await?;
        }

        if began {
            self.transactions.commit().await?;
        }

        Ok(Flow::Completed(to))
    }

    async fn skip(
        &mut self,
        item: &PlanItem,
        options: &MigratorOptions,
        began: bool,
        reason: String,
        result: &mut ExecutionResult,
    ) -> Result<()> {
        if began {
            self.transactions.roll_back().await?;
        }

        // Statements of a post-check skip have already been sent.
        if self.state != ExecutionState::Post {
            result.sql.clear();
        }

        result.skipped = true;
        result.skip_reason = Some(reason.clone());
        result.state = self.state;
        if !options.dry_run {
            self.metadata_storage.complete(result).await?;
        }

        self.progress.write_line(&format!(
            r#"↓ Migration {} skipped during {}. Reason: "{}""#,
            item.version, self.state, reason
        ));

        self.event_dispatcher
            .dispatch(&mut VersionSkippedEvent::new(
                item.version.clone(),
                item.direction,
                options.dry_run,
                reason,
            ))
            .await;

        self.state = ExecutionState::None;
        Ok(())
    }

    async fn fail(&mut self, item: &PlanItem, began: bool, error: Error) -> Error {
        let state = self.state;
        self.progress.write_warning(&format!(
            r#"Migration {} failed during {}. Error: "{}""#,
            item.version, state, error
        ));

        if began {
            if let Err(e) = self.transactions.roll_back().await {
                error!(target: "creed::migrate", "Unable to roll back migration {}: {}", item.version, e);
            }
        }

        self.state = ExecutionState::None;
        Error::migration_failed(&item.version, item.direction, state, error)
    }
}
