extern crate self as creed_migrate;

mod configuration;
mod connection;
pub mod driver;
pub mod error;
mod event;
pub mod migrate;
mod parameter_type;
mod result;
mod rows;
mod sync;
mod value;

#[cfg(test)]
mod tests;

pub use configuration::{Configuration, TableMetadataStorageConfiguration};
pub use connection::{Connection, TransactionScope};
pub use creed_migrate_macros::migrations;
pub use error::Error;
pub use event::*;
pub use parameter_type::ParameterType;
pub use result::{Async, AsyncResult, Result};
pub use rows::{ColumnIndex, Row};
pub use value::Value;
