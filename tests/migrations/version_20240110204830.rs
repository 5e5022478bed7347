use super::Tables;
use creed_migrate::Result;
use creed_migrate::migrate::{HookOutcome, Queries};

fn description() -> &'static str {
    "create users table"
}

fn up(schema: &mut Tables, _: &mut Queries) -> Result<HookOutcome> {
    schema.create("users");
    Ok(HookOutcome::Continue)
}

fn down(schema: &mut Tables, _: &mut Queries) -> Result<HookOutcome> {
    schema.drop("users");
    Ok(HookOutcome::Continue)
}
