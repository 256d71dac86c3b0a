use std::error::Error;
use std::sync::Arc;

use futures::StreamExt;
use http::StatusCode;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio_util::codec::FramedRead;
use tracing::{error, info, warn};

use crate::codec::RequestDecoder;
use crate::connection::ResponseWriter;
use crate::handler::Handler;
use crate::protocol::{HttpError, ParseError, Request};

/// Initial capacity of the receive buffer
pub const DEFAULT_READ_BUFFER: usize = 8 * 1024;

/// Body sent when a handler fails before writing anything
pub const INTERNAL_ERROR_BODY: &[u8] = b"Internal Server Error";

/// A single-exchange HTTP connection.
///
/// `HttpConnection` reads exactly one request, hands it to the handler
/// together with a [`ResponseWriter`] bound to the write half, and shuts the
/// write half down afterwards. Connections are never reused.
///
/// # Type Parameters
///
/// * `R`: The async readable stream type
/// * `W`: The async writable stream type
#[derive(Debug)]
pub struct HttpConnection<R, W> {
    framed_read: FramedRead<R, RequestDecoder>,
    writer: ResponseWriter<W>,
}

impl<R, W> HttpConnection<R, W>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin + Send + 'static,
{
    pub fn new(reader: R, writer: W) -> Self {
        Self::with_capacity(reader, writer, DEFAULT_READ_BUFFER)
    }

    pub fn with_capacity(reader: R, writer: W, read_buffer_capacity: usize) -> Self {
        Self {
            framed_read: FramedRead::with_capacity(reader, RequestDecoder::new(), read_buffer_capacity),
            writer: ResponseWriter::new(writer),
        }
    }

    /// Runs the exchange to completion.
    ///
    /// A request that fails to parse is answered with `400 Bad Request` and
    /// the parse error is returned. A handler error is answered with
    /// `500 Internal Server Error` when the handler had not started writing.
    pub async fn process<H>(mut self, handler: Arc<H>) -> Result<(), HttpError>
    where
        H: Handler<W>,
    {
        let request = match self.read_request().await {
            Ok(Some(request)) => request,
            Ok(None) => {
                info!("connection closed before any request arrived");
                return Ok(());
            }
            Err(e) => {
                warn!(cause = %e, "can't parse request, responding bad request");
                if let Err(send_error) = self.writer.send_empty(StatusCode::BAD_REQUEST).await {
                    warn!(cause = %send_error, "failed to send bad request response");
                }
                self.close().await;
                return Err(e.into());
            }
        };

        info!(method = request.method(), target = request.target(), body_size = request.body().len(), "received request");

        let outcome = handler.call(request, &mut self.writer).await.map_err(Into::<Box<dyn Error + Send + Sync>>::into);
        let result = match outcome {
            Ok(()) if self.writer.is_pending() => {
                warn!("handler returned without responding, sending empty response");
                self.writer.send_empty(StatusCode::OK).await.map_err(HttpError::from)
            }
            Ok(()) => Ok(()),
            Err(e) => {
                error!(cause = %e, "handle request error");
                if self.writer.is_pending() {
                    self.writer
                        .send_with_default_headers(StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_ERROR_BODY)
                        .await
                        .map_err(HttpError::from)
                } else {
                    Err(HttpError::handler(e))
                }
            }
        };

        self.close().await;
        result
    }

    async fn read_request(&mut self) -> Result<Option<Request>, ParseError> {
        self.framed_read.next().await.transpose()
    }

    async fn close(&mut self) {
        if let Err(e) = self.writer.shutdown().await {
            warn!(cause = %e, "failed to shutdown connection");
        }
    }
}
