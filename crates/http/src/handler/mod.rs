//! Request handler abstraction.
//!
//! A [`Handler`] is invoked once per connection with the parsed [`Request`]
//! and a [`ResponseWriter`] bound to that connection. It is expected to call
//! exactly one of the writer's `send*` methods.

use std::error::Error;

use async_trait::async_trait;
use futures::future::BoxFuture;
use tokio::io::AsyncWrite;

use crate::connection::ResponseWriter;
use crate::protocol::Request;

#[async_trait]
pub trait Handler<W>: Send + Sync
where
    W: AsyncWrite + Unpin + Send + 'static,
{
    type Error: Into<Box<dyn Error + Send + Sync>>;

    async fn call(&self, request: Request, writer: &mut ResponseWriter<W>) -> Result<(), Self::Error>;
}

#[derive(Debug)]
pub struct HandlerFn<F> {
    f: F,
}

#[async_trait]
impl<W, F, Err> Handler<W> for HandlerFn<F>
where
    W: AsyncWrite + Unpin + Send + 'static,
    F: for<'a> Fn(Request, &'a mut ResponseWriter<W>) -> BoxFuture<'a, Result<(), Err>> + Send + Sync,
    Err: Into<Box<dyn Error + Send + Sync>>,
{
    type Error = Err;

    async fn call(&self, request: Request, writer: &mut ResponseWriter<W>) -> Result<(), Self::Error> {
        (self.f)(request, writer).await
    }
}

/// Wraps a closure returning a boxed future into a [`Handler`].
///
/// ```
/// use futures::FutureExt;
/// use http::StatusCode;
/// use micro_h1::handler::{make_handler, Handler};
///
/// let handler = make_handler(|request, writer: &mut micro_h1::connection::ResponseWriter<Vec<u8>>| {
///     async move { writer.send_with_default_headers(StatusCode::OK, request.target().as_bytes()).await }.boxed()
/// });
/// # fn assert_handler<H: Handler<Vec<u8>>>(_: &H) {}
/// # assert_handler(&handler);
/// ```
pub fn make_handler<W, F, Err>(f: F) -> HandlerFn<F>
where
    W: AsyncWrite + Unpin + Send + 'static,
    F: for<'a> Fn(Request, &'a mut ResponseWriter<W>) -> BoxFuture<'a, Result<(), Err>>,
    Err: Into<Box<dyn Error + Send + Sync>>,
{
    HandlerFn { f }
}
