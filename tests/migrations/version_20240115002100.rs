use super::Tables;
use creed_migrate::Result;
use creed_migrate::migrate::{HookOutcome, Queries};

pub fn description() -> &'static str {
    "create client_credential table"
}

pub fn pre_up(schema: &Tables) -> Result<HookOutcome> {
    if schema.contains("client_credential") {
        return Ok(HookOutcome::skip("client_credential already exists"));
    }

    Ok(HookOutcome::Continue)
}

pub fn up(_: &mut Tables, queries: &mut Queries) -> Result<HookOutcome> {
    queries.add_sql(
        "CREATE TABLE client_credential (client_id TEXT NOT NULL PRIMARY KEY, secret TEXT NOT NULL, expires_at TEXT NOT NULL)",
    );
    Ok(HookOutcome::Continue)
}

pub fn post_up(schema: &Tables) -> Result<HookOutcome> {
    if !schema.contains("users") {
        return Ok(HookOutcome::abort("users table is required"));
    }

    Ok(HookOutcome::Continue)
}

pub fn down(_: &mut Tables, queries: &mut Queries) -> Result<HookOutcome> {
    queries.add_sql("DROP TABLE client_credential");
    Ok(HookOutcome::Continue)
}
