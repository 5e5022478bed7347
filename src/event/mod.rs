mod event;
mod event_dispatcher;
mod migrations_event;
mod version_event;

pub use event::Event;
pub use event_dispatcher::EventDispatcher;
pub use migrations_event::{MigrationsMigratedEvent, MigrationsMigratingEvent};
pub use version_event::{VersionExecutedEvent, VersionExecutingEvent, VersionSkippedEvent};
