use crate::migrate::{Direction, ExecutionState, Version};
use crate::{ParameterType, Value};
use chrono::{DateTime, Utc};
use std::fmt::{Display, Formatter};
use std::time::Duration;

/// A single SQL statement of a migration.
#[derive(Clone, Debug, PartialEq)]
pub struct Query {
    pub statement: String,
    pub parameters: Vec<Value>,
    pub types: Vec<ParameterType>,
    /// Set only when query timing is enabled and the statement was executed.
    pub execution_time: Option<Duration>,
}

impl Query {
    pub fn new(statement: String) -> Self {
        Self::with_parameters(statement, vec![], vec![])
    }

    pub fn with_parameters(
        statement: String,
        parameters: Vec<Value>,
        types: Vec<ParameterType>,
    ) -> Self {
        Self {
            statement,
            parameters,
            types,
            execution_time: None,
        }
    }
}

impl Display for Query {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if self.parameters.is_empty() {
            write!(f, "{}", self.statement)
        } else {
            let params = self
                .parameters
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>();
            write!(f, "{} [{}]", self.statement, params.join(", "))
        }
    }
}

/// Outcome of running one plan item.
#[derive(Clone, Debug)]
pub struct ExecutionResult {
    pub version: Version,
    pub direction: Direction,
    pub sql: Vec<Query>,
    pub executed_at: DateTime<Utc>,
    pub execution_time: Option<Duration>,
    /// Growth of the process memory while the migration ran, in bytes.
    pub memory_usage: Option<i64>,
    pub skipped: bool,
    pub skip_reason: Option<String>,
    /// Last lifecycle state reached before the result was finalized.
    pub state: ExecutionState,
}

impl ExecutionResult {
    pub fn new(version: Version, direction: Direction) -> Self {
        Self {
            version,
            direction,
            sql: vec![],
            executed_at: Utc::now(),
            execution_time: None,
            memory_usage: None,
            skipped: false,
            skip_reason: None,
            state: ExecutionState::None,
        }
    }

    pub fn is_skipped(&self) -> bool {
        self.skipped
    }
}

/// Aggregated results of a whole execution plan, in execution order.
#[derive(Debug)]
pub struct MigrationsResult {
    pub direction: Direction,
    pub results: Vec<ExecutionResult>,
    pub time: Duration,
    /// Growth of the process memory over the whole run, in bytes.
    pub memory_usage: Option<i64>,
}

impl MigrationsResult {
    pub(crate) fn empty(direction: Direction) -> Self {
        Self {
            direction,
            results: vec![],
            time: Duration::ZERO,
            memory_usage: None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn get(&self, version: &Version) -> Option<&ExecutionResult> {
        self.results.iter().find(|r| &r.version == version)
    }

    /// The SQL run (or, in dry-run mode, that would have been run) for each
    /// version.
    pub fn sql(&self) -> impl Iterator<Item = (&Version, &[Query])> {
        self.results.iter().map(|r| (&r.version, r.sql.as_slice()))
    }

    pub fn query_count(&self) -> usize {
        self.results.iter().map(|r| r.sql.len()).sum()
    }
}
