mod connection;
mod progress;

pub use connection::MockConnection;
pub use migration::{TestMigration, repository};
pub use progress::CapturingProgress;
pub use schema::{TestSchema, TestSchemaProvider};

pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}
