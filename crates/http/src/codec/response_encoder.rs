//! HTTP response encoder module
//!
//! [`ResponseEncoder`] serializes the pieces of a response in strict order and
//! refuses anything out of sequence:
//!
//! ```text
//! StatusLine -> Headers -> Body -------------------------> Done
//!                           \                             /
//!                            +-- Chunk* -> LastChunk -> Trailers
//! ```
//!
//! A fixed-length body is written as a single [`ResponseFrame::Body`]. A
//! chunked body is any number of [`ResponseFrame::Chunk`]s, the terminating
//! [`ResponseFrame::LastChunk`] and then the [`ResponseFrame::Trailers`].

use std::io::Write;

use bytes::BytesMut;
use http::StatusCode;
use tokio_util::codec::Encoder;
use tracing::error;

use crate::codec::header::HeaderEncoder;
use crate::protocol::{HeaderMap, SendError};

const LAST_CHUNK: &[u8] = b"0\r\n\r\n";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteState {
    StatusLine,
    Headers,
    Body,
    Trailers,
    Done,
}

/// One piece of a response, in wire order.
#[derive(Debug, Clone, Copy)]
pub enum ResponseFrame<'a> {
    StatusLine(StatusCode),
    Headers(&'a HeaderMap),
    /// The complete fixed-length body.
    Body(&'a [u8]),
    /// One chunk of a chunked body, empty chunks are skipped.
    Chunk(&'a [u8]),
    /// The zero-length chunk that ends a chunked body.
    LastChunk,
    Trailers(&'a HeaderMap),
}

impl ResponseFrame<'_> {
    fn name(&self) -> &'static str {
        match self {
            ResponseFrame::StatusLine(_) => "status line",
            ResponseFrame::Headers(_) => "headers",
            ResponseFrame::Body(_) => "body",
            ResponseFrame::Chunk(_) => "chunk",
            ResponseFrame::LastChunk => "last chunk",
            ResponseFrame::Trailers(_) => "trailers",
        }
    }
}

#[derive(Debug)]
pub struct ResponseEncoder {
    state: WriteState,
    header_encoder: HeaderEncoder,
}

impl ResponseEncoder {
    pub fn new() -> Self {
        Default::default()
    }

    #[inline]
    pub fn state(&self) -> WriteState {
        self.state
    }

    #[inline]
    pub fn is_finish(&self) -> bool {
        self.state == WriteState::Done
    }
}

impl Default for ResponseEncoder {
    fn default() -> Self {
        Self { state: WriteState::StatusLine, header_encoder: HeaderEncoder }
    }
}

impl Encoder<ResponseFrame<'_>> for ResponseEncoder {
    type Error = SendError;

    fn encode(&mut self, item: ResponseFrame<'_>, dst: &mut BytesMut) -> Result<(), Self::Error> {
        let next = match (self.state, item) {
            (WriteState::StatusLine, ResponseFrame::StatusLine(status)) => {
                self.header_encoder.encode_status_line(status, dst);
                WriteState::Headers
            }

            (WriteState::Headers, ResponseFrame::Headers(headers)) => {
                self.header_encoder.encode_bytes(headers, dst);
                WriteState::Body
            }

            (WriteState::Body, ResponseFrame::Body(body)) => {
                dst.extend_from_slice(body);
                WriteState::Done
            }

            (WriteState::Body, ResponseFrame::Chunk(chunk)) => {
                if !chunk.is_empty() {
                    write!(helper::Writer(dst), "{:x}\r\n", chunk.len())?;
                    dst.reserve(chunk.len() + 2);
                    dst.extend_from_slice(chunk);
                    dst.extend_from_slice(b"\r\n");
                }
                WriteState::Body
            }

            (WriteState::Body, ResponseFrame::LastChunk) => {
                dst.extend_from_slice(LAST_CHUNK);
                WriteState::Trailers
            }

            (WriteState::Trailers, ResponseFrame::Trailers(trailers)) => {
                if !trailers.is_empty() {
                    self.header_encoder.encode_bytes(trailers, dst);
                }
                WriteState::Done
            }

            (state, item) => {
                error!(state = ?state, frame = item.name(), "response frame out of order");
                return Err(SendError::invalid_state(state, item.name()));
            }
        };

        self.state = next;
        Ok(())
    }
}

mod helper {
    use bytes::{BufMut, BytesMut};
    use std::io;

    pub struct Writer<'a>(pub &'a mut BytesMut);

    impl io::Write for Writer<'_> {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.put_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::default_headers;

    #[test]
    fn fixed_length_response() {
        let mut encoder = ResponseEncoder::new();
        let mut dst = BytesMut::new();
        let headers = default_headers(5);

        encoder.encode(ResponseFrame::StatusLine(StatusCode::OK), &mut dst).unwrap();
        encoder.encode(ResponseFrame::Headers(&headers), &mut dst).unwrap();
        encoder.encode(ResponseFrame::Body(b"hello"), &mut dst).unwrap();

        assert!(encoder.is_finish());
        assert_eq!(
            &dst[..],
            b"HTTP/1.1 200 OK\r\ncontent-length: 5\r\nconnection: close\r\ncontent-type: text/plain\r\n\r\nhello"
        );
    }

    #[test]
    fn chunked_response() {
        let mut encoder = ResponseEncoder::new();
        let mut dst = BytesMut::new();
        let headers = HeaderMap::new();
        let trailers: HeaderMap = [("X-Content-Length", "19")].into_iter().collect();
        let big = [b'x'; 16];

        encoder.encode(ResponseFrame::StatusLine(StatusCode::OK), &mut dst).unwrap();
        encoder.encode(ResponseFrame::Headers(&headers), &mut dst).unwrap();
        encoder.encode(ResponseFrame::Chunk(b"abc"), &mut dst).unwrap();
        encoder.encode(ResponseFrame::Chunk(b""), &mut dst).unwrap();
        encoder.encode(ResponseFrame::Chunk(&big), &mut dst).unwrap();
        encoder.encode(ResponseFrame::LastChunk, &mut dst).unwrap();
        assert_eq!(encoder.state(), WriteState::Trailers);
        encoder.encode(ResponseFrame::Trailers(&trailers), &mut dst).unwrap();

        assert!(encoder.is_finish());
        assert_eq!(
            &dst[..],
            b"HTTP/1.1 200 OK\r\n\r\n3\r\nabc\r\n10\r\nxxxxxxxxxxxxxxxx\r\n0\r\n\r\nx-content-length: 19\r\n\r\n"
        );
    }

    #[test]
    fn empty_trailers_write_nothing() {
        let mut encoder = ResponseEncoder::new();
        let mut dst = BytesMut::new();
        let headers = HeaderMap::new();

        encoder.encode(ResponseFrame::StatusLine(StatusCode::OK), &mut dst).unwrap();
        encoder.encode(ResponseFrame::Headers(&headers), &mut dst).unwrap();
        encoder.encode(ResponseFrame::LastChunk, &mut dst).unwrap();
        encoder.encode(ResponseFrame::Trailers(&headers), &mut dst).unwrap();

        assert_eq!(&dst[..], b"HTTP/1.1 200 OK\r\n\r\n0\r\n\r\n");
    }

    #[test]
    fn out_of_order_frames_are_rejected() {
        let mut encoder = ResponseEncoder::new();
        let mut dst = BytesMut::new();
        let headers = HeaderMap::new();

        let result = encoder.encode(ResponseFrame::Headers(&headers), &mut dst);
        assert!(matches!(result, Err(SendError::InvalidState { state: WriteState::StatusLine, frame: "headers" })));
        assert!(dst.is_empty());

        encoder.encode(ResponseFrame::StatusLine(StatusCode::OK), &mut dst).unwrap();
        encoder.encode(ResponseFrame::Headers(&headers), &mut dst).unwrap();
        encoder.encode(ResponseFrame::Body(b""), &mut dst).unwrap();
        let written = dst.len();

        let result = encoder.encode(ResponseFrame::StatusLine(StatusCode::OK), &mut dst);
        assert!(matches!(result, Err(SendError::InvalidState { state: WriteState::Done, .. })));
        let result = encoder.encode(ResponseFrame::Chunk(b"late"), &mut dst);
        assert!(matches!(result, Err(SendError::InvalidState { .. })));
        assert_eq!(dst.len(), written);
    }
}
