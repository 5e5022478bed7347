use crate::Event;
use crate::migrate::{Direction, Version};

macro_rules! version_event {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        pub struct $name {
            version: Version,
            direction: Direction,
            dry_run: bool,
        }

        impl Event for $name {}

        impl $name {
            pub(crate) fn new(version: Version, direction: Direction, dry_run: bool) -> Self {
                Self {
                    version,
                    direction,
                    dry_run,
                }
            }

            pub fn get_version(&self) -> &Version {
                &self.version
            }

            pub fn get_direction(&self) -> Direction {
                self.direction
            }

            pub fn is_dry_run(&self) -> bool {
                self.dry_run
            }
        }
    };
}

version_event!(
    /// Dispatched before a single version starts running.
    VersionExecutingEvent
);

version_event!(
    /// Dispatched after a version has been applied or reverted.
    VersionExecutedEvent
);

/// Dispatched when a migration hook asked to skip its version.
pub struct VersionSkippedEvent {
    version: Version,
    direction: Direction,
    dry_run: bool,
    reason: String,
}

impl Event for VersionSkippedEvent {}

impl VersionSkippedEvent {
    pub(crate) fn new(version: Version, direction: Direction, dry_run: bool, reason: String) -> Self {
        Self {
            version,
            direction,
            dry_run,
            reason,
        }
    }

    pub fn get_version(&self) -> &Version {
        &self.version
    }

    pub fn get_direction(&self) -> Direction {
        self.direction
    }

    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    pub fn get_reason(&self) -> &str {
        &self.reason
    }
}
