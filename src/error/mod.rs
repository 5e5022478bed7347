use crate::migrate::{Direction, ExecutionState, Version};
use std::backtrace::Backtrace;
use std::fmt::{Debug, Display, Formatter};

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorKind {
    UnknownMigrationVersion = 1,
    MigrationClassNotFound = 2,
    DuplicateMigrationVersion = 3,
    NoMigrationsToExecute = 4,
    NoMigrationsFound = 5,
    MigrationAlreadyExecuted = 6,
    MigrationNotExecuted = 7,
    RollupFailed = 8,

    MigrationFailed = 100,

    OutOfBoundsError = 200,
    InvalidExecutedAt = 201,

    UnknownError = -1,
}

/// Where a migration was when it failed.
#[derive(Clone, Debug)]
pub struct MigrationFailure {
    pub version: Version,
    pub direction: Direction,
    pub state: ExecutionState,
}

pub struct Error {
    kind: ErrorKind,
    inner: Box<dyn std::error::Error + Send + Sync>,
    failure: Option<MigrationFailure>,
    backtrace: Backtrace,
}

pub struct StdError(Error);

impl Display for StdError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        Display::fmt(&self.0, f)
    }
}

impl Debug for StdError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        Display::fmt(&self.0, f)
    }
}

impl std::error::Error for StdError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(self.0.inner.as_ref())
    }
}

impl From<Error> for StdError {
    fn from(e: Error) -> Self {
        StdError(e)
    }
}

impl Error {
    pub fn new<E>(kind: ErrorKind, error: E) -> Self
    where
        E: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        Error {
            kind,
            inner: error.into(),
            failure: None,
            backtrace: Backtrace::capture(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Version, direction and lifecycle state of the failed migration, if
    /// this error has been raised by the executor.
    pub fn failure(&self) -> Option<&MigrationFailure> {
        self.failure.as_ref()
    }

    pub fn unknown_migration_version(alias: &str) -> Self {
        Self::new(
            ErrorKind::UnknownMigrationVersion,
            format!(r#"Could not find migration version "{}""#, alias),
        )
    }

    pub fn migration_class_not_found(version: &Version) -> Self {
        Self::new(
            ErrorKind::MigrationClassNotFound,
            format!(r#"Migration "{}" could not be found in the repository"#, version),
        )
    }

    pub fn duplicate_migration_version(version: &Version) -> Self {
        Self::new(
            ErrorKind::DuplicateMigrationVersion,
            format!(r#"Migration version "{}" is already registered"#, version),
        )
    }

    pub fn no_migrations_to_execute() -> Self {
        Self::new(
            ErrorKind::NoMigrationsToExecute,
            "Could not find any migrations to execute",
        )
    }

    pub fn no_migrations_found() -> Self {
        Self::new(ErrorKind::NoMigrationsFound, "No migrations found")
    }

    pub fn migration_already_executed(version: &Version) -> Self {
        Self::new(
            ErrorKind::MigrationAlreadyExecuted,
            format!(r#"The version "{}" already exists in the version table"#, version),
        )
    }

    pub fn migration_not_executed(version: &Version) -> Self {
        Self::new(
            ErrorKind::MigrationNotExecuted,
            format!(r#"The version "{}" does not exist in the version table"#, version),
        )
    }

    pub fn too_many_migrations_for_rollup(count: usize) -> Self {
        Self::new(
            ErrorKind::RollupFailed,
            format!("Too many migrations to roll up ({} available), delete all but one", count),
        )
    }

    /// Wraps an error raised while running a migration, recording where the
    /// migration was at the time.
    pub fn migration_failed(
        version: &Version,
        direction: Direction,
        state: ExecutionState,
        source: Error,
    ) -> Self {
        let mut error = Self::new(ErrorKind::MigrationFailed, StdError(source));
        error.failure = Some(MigrationFailure {
            version: version.clone(),
            direction,
            state,
        });

        error
    }

    pub fn migration_aborted(reason: &str) -> Self {
        Self::new(
            ErrorKind::MigrationFailed,
            format!("Migration aborted: {}", reason),
        )
    }

    pub fn out_of_bounds<T>(index: T) -> Self
    where
        T: ToString,
    {
        Self::new(
            ErrorKind::OutOfBoundsError,
            format!("Unable to read {} index", index.to_string()),
        )
    }

    pub fn invalid_executed_at(version: &str, value: &str) -> Self {
        Self::new(
            ErrorKind::InvalidExecutedAt,
            format!(
                r#"Invalid execution date "{}" stored for version "{}""#,
                value, version
            ),
        )
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if let Some(failure) = &self.failure {
            write!(
                f,
                "Migration {} failed during {} ({}): {}",
                failure.version, failure.state, failure.direction, self.inner
            )
        } else {
            write!(f, "{}", self.inner)
        }
    }
}

impl Debug for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}\nBacktrace:\n{}", self, self.backtrace)
    }
}

impl<T> From<T> for Error
where
    T: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    fn from(err: T) -> Self {
        crate::error::Error::new(ErrorKind::UnknownError, err)
    }
}
