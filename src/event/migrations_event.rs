use crate::Event;
use crate::migrate::{Direction, ExecutionPlan};

/// Dispatched before a non-empty plan starts executing.
pub struct MigrationsMigratingEvent {
    plan: ExecutionPlan,
    dry_run: bool,
}

impl Event for MigrationsMigratingEvent {}

impl MigrationsMigratingEvent {
    pub(crate) fn new(plan: ExecutionPlan, dry_run: bool) -> Self {
        Self { plan, dry_run }
    }

    pub fn get_plan(&self) -> &ExecutionPlan {
        &self.plan
    }

    pub fn get_direction(&self) -> Direction {
        self.plan.direction()
    }

    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }
}

/// Dispatched once every item of a plan has been executed (or skipped).
pub struct MigrationsMigratedEvent {
    plan: ExecutionPlan,
    dry_run: bool,
}

impl Event for MigrationsMigratedEvent {}

impl MigrationsMigratedEvent {
    pub(crate) fn new(plan: ExecutionPlan, dry_run: bool) -> Self {
        Self { plan, dry_run }
    }

    pub fn get_plan(&self) -> &ExecutionPlan {
        &self.plan
    }

    pub fn get_direction(&self) -> Direction {
        self.plan.direction()
    }

    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }
}
