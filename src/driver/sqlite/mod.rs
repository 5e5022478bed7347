mod driver;
mod rows;

pub use driver::{ConnectionOptions, SqliteConnection};
