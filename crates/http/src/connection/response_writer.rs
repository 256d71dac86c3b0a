//! Response sink bound to one exchange.
//!
//! [`ResponseWriter`] owns the write half of a connection, the response and
//! trailer headers, and a [`ResponseEncoder`] that enforces the write order.
//! Each public `send*` method drives the encoder through every remaining
//! state, so exactly one of them can succeed per writer. A second call fails
//! with [`SendError::InvalidState`] before anything reaches the socket.

use bytes::BytesMut;
use http::{header, StatusCode};
use sha2::{Digest, Sha256};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio_util::codec::Encoder;
use tracing::{trace, warn};

use crate::codec::{ResponseEncoder, ResponseFrame, WriteState};
use crate::ensure;
use crate::protocol::{default_headers, HeaderMap, SendError};

/// Bytes read from the upstream source per chunk in [`ResponseWriter::send_from_stream`]
pub const STREAM_BLOCK_SIZE: usize = 1024;

/// Header announcing which trailer fields follow a chunked body
pub const TRAILERS: &str = "Trailers";
pub const X_CONTENT_SHA256: &str = "X-Content-SHA256";
pub const X_CONTENT_LENGTH: &str = "X-Content-Length";

const INIT_BUFFER_SIZE: usize = 4 * 1024;

#[derive(Debug)]
pub struct ResponseWriter<W> {
    writer: W,
    buffer: BytesMut,
    encoder: ResponseEncoder,
    headers: HeaderMap,
    trailers: HeaderMap,
}

impl<W> ResponseWriter<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            buffer: BytesMut::with_capacity(INIT_BUFFER_SIZE),
            encoder: ResponseEncoder::new(),
            headers: default_headers(0),
            trailers: HeaderMap::new(),
        }
    }

    #[inline]
    pub fn state(&self) -> WriteState {
        self.encoder.state()
    }

    /// Returns true until one of the `send*` methods has started writing.
    #[inline]
    pub fn is_pending(&self) -> bool {
        self.encoder.state() == WriteState::StatusLine
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Response headers, pre-seeded with `Content-Length: 0`,
    /// `Connection: close` and `Content-Type: text/plain`.
    pub fn headers_mut(&mut self) -> &mut HeaderMap {
        &mut self.headers
    }

    /// Trailers written after a chunked body, empty until a stream completes.
    pub fn trailers(&self) -> &HeaderMap {
        &self.trailers
    }

    #[inline]
    pub fn get_ref(&self) -> &W {
        &self.writer
    }

    #[inline]
    pub fn get_mut(&mut self) -> &mut W {
        &mut self.writer
    }

    pub fn into_inner(self) -> W {
        self.writer
    }

    fn ensure_pending(&self) -> Result<(), SendError> {
        ensure!(self.is_pending(), SendError::invalid_state(self.state(), "status line"));
        Ok(())
    }

    #[inline]
    fn write(&mut self, frame: ResponseFrame<'_>) -> Result<(), SendError> {
        self.encoder.encode(frame, &mut self.buffer)
    }

    fn write_head(&mut self, status: StatusCode) -> Result<(), SendError> {
        self.encoder.encode(ResponseFrame::StatusLine(status), &mut self.buffer)?;
        self.encoder.encode(ResponseFrame::Headers(&self.headers), &mut self.buffer)
    }
}

impl<W> ResponseWriter<W>
where
    W: AsyncWrite + Unpin,
{
    /// Sends `body` with the default headers overridden by `headers`.
    ///
    /// `Content-Length` is always recomputed from `body`.
    pub async fn send(&mut self, status: StatusCode, headers: &HeaderMap, body: &[u8]) -> Result<(), SendError> {
        self.ensure_pending()?;
        self.headers.extend(headers);
        self.send_fixed(status, body).await
    }

    /// Sends `body` with only the default headers and a recomputed `Content-Length`.
    pub async fn send_with_default_headers(&mut self, status: StatusCode, body: &[u8]) -> Result<(), SendError> {
        self.ensure_pending()?;
        self.send_fixed(status, body).await
    }

    /// Sends the status line and the current headers verbatim with an empty body.
    pub async fn send_empty(&mut self, status: StatusCode) -> Result<(), SendError> {
        self.ensure_pending()?;
        self.write_head(status)?;
        self.write(ResponseFrame::Body(&[]))?;
        self.flush().await
    }

    /// Streams `upstream` as a chunked body followed by digest and length trailers.
    ///
    /// Blocks of up to [`STREAM_BLOCK_SIZE`] bytes are forwarded as chunks
    /// while a SHA-256 digest and a byte count are accumulated. Once the
    /// upstream reports end of stream the terminating chunk is written,
    /// followed by `X-Content-SHA256` and `X-Content-Length` trailers.
    ///
    /// # Errors
    ///
    /// If reading `upstream` fails, the chunk sequence is still terminated,
    /// no trailers are written and [`SendError::Upstream`] is returned.
    /// Failures writing to the connection are returned as [`SendError::Io`]
    /// immediately.
    pub async fn send_from_stream<R>(&mut self, status: StatusCode, mut upstream: R) -> Result<(), SendError>
    where
        R: AsyncRead + Unpin,
    {
        self.ensure_pending()?;

        self.headers.delete(header::CONTENT_LENGTH);
        self.headers.set(header::TRANSFER_ENCODING, "chunked");
        self.headers.set(header::CONTENT_TYPE, mime::TEXT_PLAIN.as_ref());
        self.headers.set(TRAILERS, format!("{X_CONTENT_SHA256}, {X_CONTENT_LENGTH}"));
        self.write_head(status)?;
        self.flush().await?;

        let mut block = [0u8; STREAM_BLOCK_SIZE];
        let mut hasher = Sha256::new();
        let mut content_length = 0usize;

        let upstream_error = loop {
            match upstream.read(&mut block).await {
                Ok(0) => break None,
                Ok(n) => {
                    let chunk = &block[..n];
                    self.write(ResponseFrame::Chunk(chunk))?;
                    self.flush().await?;

                    hasher.update(chunk);
                    content_length += n;
                    trace!(size = n, total = content_length, "sent chunk");
                }
                Err(e) if e.kind() == std::io::ErrorKind::Interrupted => {}
                Err(e) => {
                    warn!(cause = %e, sent = content_length, "upstream read failed, terminating chunked body");
                    break Some(e);
                }
            }
        };

        self.write(ResponseFrame::LastChunk)?;

        if upstream_error.is_none() {
            self.trailers.set(X_CONTENT_SHA256, format!("{:x}", hasher.finalize()));
            self.trailers.set(X_CONTENT_LENGTH, content_length.to_string());
        }
        self.encoder.encode(ResponseFrame::Trailers(&self.trailers), &mut self.buffer)?;
        self.flush().await?;

        match upstream_error {
            Some(e) => Err(SendError::upstream(e)),
            None => Ok(()),
        }
    }

    /// Shuts down the write half, signalling the end of the exchange to the peer.
    pub async fn shutdown(&mut self) -> Result<(), SendError> {
        self.flush().await?;
        self.writer.shutdown().await.map_err(SendError::io)
    }

    async fn send_fixed(&mut self, status: StatusCode, body: &[u8]) -> Result<(), SendError> {
        self.headers.set(header::CONTENT_LENGTH, body.len().to_string());
        self.write_head(status)?;
        self.write(ResponseFrame::Body(body))?;
        self.flush().await
    }

    async fn flush(&mut self) -> Result<(), SendError> {
        if self.buffer.is_empty() {
            return Ok(());
        }

        // buffered bytes are discarded even when the write fails
        let buffer = self.buffer.split();
        self.writer.write_all(&buffer).await?;
        Ok(self.writer.flush().await?)
    }
}
