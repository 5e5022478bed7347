use crate::error::Error;
use futures::future::BoxFuture;
use std::future::Future;
use std::pin::Pin;

pub type Result<T> = std::result::Result<T, Error>;

/// Boxed future returned by the async collaborator traits (connection,
/// metadata storage, schema provider).
pub type AsyncResult<'a, R> = Pin<Box<dyn 'a + Future<Output = Result<R>>>>;

pub type Async<'a, R> = BoxFuture<'a, R>;
