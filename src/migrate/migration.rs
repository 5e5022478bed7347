use crate::migrate::Query;
use crate::{ParameterType, Result, Value};
use std::fmt::Display;

/// What a migration hook asks the executor to do next.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum HookOutcome {
    Continue,
    /// Treat the migration as done without applying it.
    Skip(String),
    /// Stop the migration (and the plan) with an error.
    Abort(String),
}

impl HookOutcome {
    pub fn skip<S: Into<String>>(reason: S) -> Self {
        Self::Skip(reason.into())
    }

    pub fn abort<S: Into<String>>(reason: S) -> Self {
        Self::Abort(reason.into())
    }
}

/// SQL explicitly added by a migration body while running `up` or `down`.
#[derive(Debug, Default)]
pub struct Queries {
    queries: Vec<Query>,
}

impl Queries {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_sql(&mut self, sql: impl Display) {
        self.queries.push(Query::new(sql.to_string()));
    }

    /// Adds a parameterized statement. Parameter types are inferred from the
    /// values.
    pub fn add_sql_with_params(&mut self, sql: impl Display, params: Vec<Value>) {
        let types = params.iter().map(Value::parameter_type).collect();
        self.add_sql_with_types(sql, params, types);
    }

    pub fn add_sql_with_types(
        &mut self,
        sql: impl Display,
        params: Vec<Value>,
        types: Vec<ParameterType>,
    ) {
        self.queries
            .push(Query::with_parameters(sql.to_string(), params, types));
    }

    pub fn len(&self) -> usize {
        self.queries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Query> {
        self.queries.iter()
    }

    pub(crate) fn into_inner(self) -> Vec<Query> {
        self.queries
    }
}

/// A reversible schema change.
///
/// `S` is the schema snapshot type produced by the
/// [`SchemaDiffProvider`](crate::migrate::SchemaDiffProvider) in use. `up` and
/// `down` receive the "to" schema and may modify it: the difference between
/// the "from" and "to" snapshots is turned into SQL after the hook returns.
pub trait Migration<S>: Send + Sync {
    fn description(&self) -> &str {
        ""
    }

    /// Whether the executor should wrap this migration in a transaction.
    fn is_transactional(&self) -> bool {
        true
    }

    fn pre_up(&self, _schema: &S) -> Result<HookOutcome> {
        Ok(HookOutcome::Continue)
    }

    fn up(&self, schema: &mut S, queries: &mut Queries) -> Result<HookOutcome>;

    fn post_up(&self, _schema: &S) -> Result<HookOutcome> {
        Ok(HookOutcome::Continue)
    }

    fn pre_down(&self, _schema: &S) -> Result<HookOutcome> {
        Ok(HookOutcome::Continue)
    }

    fn down(&self, schema: &mut S, queries: &mut Queries) -> Result<HookOutcome>;

    fn post_down(&self, _schema: &S) -> Result<HookOutcome> {
        Ok(HookOutcome::Continue)
    }
}

pub type OpFn<S> = dyn (Fn(&mut S, &mut Queries) -> Result<HookOutcome>) + Send + Sync;
pub type CheckFn<S> = dyn (Fn(&S) -> Result<HookOutcome>) + Send + Sync;

/// A migration made of plain functions, as generated by the
/// [`migrations!`](crate::migrations) macro.
pub struct FnMigration<S: 'static> {
    pub version: &'static str,
    pub description: &'static (dyn (Fn() -> &'static str) + Send + Sync),
    pub is_transactional: Option<&'static (dyn (Fn() -> bool) + Send + Sync)>,
    pub up: &'static OpFn<S>,
    pub down: &'static OpFn<S>,
    pub pre_up: Option<&'static CheckFn<S>>,
    pub post_up: Option<&'static CheckFn<S>>,
    pub pre_down: Option<&'static CheckFn<S>>,
    pub post_down: Option<&'static CheckFn<S>>,
}

fn run_check<S: 'static>(check: Option<&'static CheckFn<S>>, schema: &S) -> Result<HookOutcome> {
    match check {
        Some(check) => check(schema),
        None => Ok(HookOutcome::Continue),
    }
}

impl<S: 'static> Migration<S> for FnMigration<S> {
    fn description(&self) -> &str {
        (self.description)()
    }

    fn is_transactional(&self) -> bool {
        self.is_transactional.is_none_or(|f| f())
    }

    fn pre_up(&self, schema: &S) -> Result<HookOutcome> {
        run_check(self.pre_up, schema)
    }

    fn up(&self, schema: &mut S, queries: &mut Queries) -> Result<HookOutcome> {
        (self.up)(schema, queries)
    }

    fn post_up(&self, schema: &S) -> Result<HookOutcome> {
        run_check(self.post_up, schema)
    }

    fn pre_down(&self, schema: &S) -> Result<HookOutcome> {
        run_check(self.pre_down, schema)
    }

    fn down(&self, schema: &mut S, queries: &mut Queries) -> Result<HookOutcome> {
        (self.down)(schema, queries)
    }

    fn post_down(&self, schema: &S) -> Result<HookOutcome> {
        run_check(self.post_down, schema)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn description() -> &'static str {
        "create users table"
    }

    fn up(schema: &mut Vec<String>, queries: &mut Queries) -> Result<HookOutcome> {
        schema.push("users".to_string());
        queries.add_sql_with_params("INSERT INTO users (id) VALUES (?)", vec![Value::Int(1)]);
        Ok(HookOutcome::Continue)
    }

    fn down(_: &mut Vec<String>, _: &mut Queries) -> Result<HookOutcome> {
        Ok(HookOutcome::skip("irreversible"))
    }

    fn non_transactional() -> bool {
        false
    }

    static MIGRATION: FnMigration<Vec<String>> = FnMigration {
        version: "1",
        description: &description,
        is_transactional: Some(&non_transactional),
        up: &up,
        down: &down,
        pre_up: None,
        post_up: None,
        pre_down: None,
        post_down: None,
    };

    #[test]
    fn fn_migration_dispatches_to_functions() {
        let mut schema = vec![];
        let mut queries = Queries::new();

        assert_eq!(MIGRATION.description(), "create users table");
        assert!(!MIGRATION.is_transactional());
        assert_eq!(MIGRATION.pre_up(&schema).unwrap(), HookOutcome::Continue);
        assert_eq!(
            MIGRATION.up(&mut schema, &mut queries).unwrap(),
            HookOutcome::Continue
        );
        assert_eq!(schema, vec!["users".to_string()]);
        assert_eq!(
            MIGRATION.down(&mut schema, &mut queries).unwrap(),
            HookOutcome::Skip("irreversible".to_string())
        );

        let queries = queries.into_inner();
        assert_eq!(queries.len(), 1);
        assert_eq!(queries[0].types, vec![ParameterType::Integer]);
    }
}
