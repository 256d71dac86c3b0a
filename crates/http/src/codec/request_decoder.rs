//! HTTP request decoder module
//!
//! This module turns an arbitrary byte stream into a [`Request`], tolerating
//! any split of the input across reads. Parsing is a one-way state machine:
//!
//! ```text
//! Initialized -> ParsingHeaders -> ParsingBody -> Done
//!        \              \               \
//!         +--------------+---------------+--> Error
//! ```
//!
//! [`RequestDecoder::parse`] is a pure buffer-in/count-out step: it advances
//! through as many states as the given bytes allow and reports how many of
//! them it consumed, so the caller can slide its receive buffer. The
//! [`Decoder`] implementation wraps that step for use with
//! [`FramedRead`](tokio_util::codec::FramedRead).
//!
//! # Example
//!
//! ```
//! use micro_h1::codec::{ParseState, RequestDecoder};
//!
//! let mut decoder = RequestDecoder::new();
//! let consumed = decoder.parse(b"GET / HTTP/1.1\r\nHost: a\r\n\r\n").unwrap();
//!
//! assert_eq!(consumed, 27);
//! assert_eq!(decoder.state(), ParseState::Done);
//!
//! let request = decoder.take_request().unwrap();
//! assert_eq!(request.method(), "GET");
//! assert_eq!(request.headers().get("host"), "a");
//! ```

use std::cmp;
use std::io;

use bytes::{Buf, BytesMut};
use http::header;
use tokio_util::codec::Decoder;
use tracing::trace;

use crate::ensure;
use crate::protocol::{HeaderMap, ParseError, Request, RequestLine};
use crate::utils::{find_crlf, CRLF};

/// Maximum size in bytes allowed for the request line plus the header block
pub const MAX_HEADER_BYTES: usize = 8 * 1024;

/// Upper bound for the body buffer allocated up front from `Content-Length`
const MAX_BODY_RESERVE: usize = 64 * 1024;

const HTTP_VERSION: &[u8] = b"HTTP/1.1";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseState {
    Initialized,
    ParsingHeaders,
    ParsingBody,
    Done,
    Error,
}

/// Incremental parser for a single request.
#[derive(Debug)]
pub struct RequestDecoder {
    state: ParseState,
    request_line: Option<RequestLine>,
    headers: HeaderMap,
    body: BytesMut,
    content_length: usize,
    head_size: usize,
}

impl RequestDecoder {
    pub fn new() -> Self {
        Default::default()
    }

    #[inline]
    pub fn state(&self) -> ParseState {
        self.state
    }

    /// Returns true once the decoder reached `Done` or `Error`.
    #[inline]
    pub fn is_done(&self) -> bool {
        matches!(self.state, ParseState::Done | ParseState::Error)
    }

    /// The declared body length, known once the header block is complete.
    #[inline]
    pub fn content_length(&self) -> usize {
        self.content_length
    }

    /// Body bytes received so far.
    #[inline]
    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Feeds `src` to the state machine and returns how many bytes were consumed.
    ///
    /// Unconsumed bytes must be offered again, together with newly read ones,
    /// on the next call. Once the decoder is `Done` or `Error` further calls
    /// consume nothing. Any error moves the decoder to `Error`.
    pub fn parse(&mut self, src: &[u8]) -> Result<usize, ParseError> {
        let result = self.parse_step(src);
        if result.is_err() {
            self.transition(ParseState::Error);
        }
        result
    }

    /// Signals that the stream ended and no more bytes will arrive.
    ///
    /// # Errors
    ///
    /// - [`ParseError::ContentLengthMismatch`] if the body is short of `Content-Length`
    /// - [`ParseError::Io`] with [`io::ErrorKind::UnexpectedEof`] if the stream
    ///   ended before the header block was complete
    pub fn finish(&mut self) -> Result<(), ParseError> {
        let result = match self.state {
            ParseState::Done => return Ok(()),
            ParseState::ParsingBody => Err(ParseError::content_length_mismatch(self.content_length, self.body.len())),
            ParseState::Initialized | ParseState::ParsingHeaders => {
                Err(ParseError::io(io::Error::new(io::ErrorKind::UnexpectedEof, "stream closed before request head was complete")))
            }
            ParseState::Error => Err(ParseError::io(io::Error::other("request parsing already failed"))),
        };
        self.transition(ParseState::Error);
        result
    }

    /// Takes the parsed request out of a `Done` decoder.
    ///
    /// Returns `None` before completion, after an error, or if the request was
    /// already taken.
    pub fn take_request(&mut self) -> Option<Request> {
        if self.state != ParseState::Done {
            return None;
        }

        let request_line = self.request_line.take()?;
        let headers = std::mem::take(&mut self.headers);
        Some(Request::new(request_line, headers, self.body.split().freeze()))
    }

    fn parse_step(&mut self, src: &[u8]) -> Result<usize, ParseError> {
        let mut read = 0;

        loop {
            let remaining = &src[read..];

            match self.state {
                ParseState::Initialized => match parse_request_line(remaining)? {
                    Some((request_line, n)) => {
                        trace!(method = %request_line.method, target = %request_line.target, "parsed request line");
                        self.request_line = Some(request_line);
                        self.head_size += n;
                        read += n;
                        check_head_size(self.head_size)?;
                        self.transition(ParseState::ParsingHeaders);
                    }
                    None => break,
                },

                ParseState::ParsingHeaders => {
                    let status = self.headers.parse_block(remaining)?;
                    self.head_size += status.consumed();
                    read += status.consumed();
                    check_head_size(self.head_size)?;

                    if !status.is_complete() {
                        break;
                    }
                    self.on_headers_complete()?;
                }

                ParseState::ParsingBody => {
                    if remaining.is_empty() {
                        break;
                    }

                    let wanted = self.content_length - self.body.len();
                    let n = cmp::min(wanted, remaining.len());
                    self.body.extend_from_slice(&remaining[..n]);
                    read += n;

                    if self.body.len() < self.content_length {
                        break;
                    }
                    self.transition(ParseState::Done);
                }

                ParseState::Done | ParseState::Error => break,
            }
        }

        if matches!(self.state, ParseState::Initialized | ParseState::ParsingHeaders) {
            check_head_size(self.head_size + (src.len() - read))?;
        }

        Ok(read)
    }

    fn on_headers_complete(&mut self) -> Result<(), ParseError> {
        if !self.headers.contains(header::CONTENT_LENGTH) {
            self.transition(ParseState::Done);
            return Ok(());
        }

        let value = self.headers.get(header::CONTENT_LENGTH).trim();
        let length = value.parse::<usize>().map_err(|_e| ParseError::malformed_content_length(value))?;

        if length == 0 {
            self.transition(ParseState::Done);
        } else {
            self.content_length = length;
            self.body.reserve(cmp::min(length, MAX_BODY_RESERVE));
            self.transition(ParseState::ParsingBody);
        }
        Ok(())
    }

    #[inline]
    fn transition(&mut self, next: ParseState) {
        trace!(from = ?self.state, to = ?next, "request parser transition");
        self.state = next;
    }
}

impl Default for RequestDecoder {
    fn default() -> Self {
        Self {
            state: ParseState::Initialized,
            request_line: None,
            headers: HeaderMap::new(),
            body: BytesMut::new(),
            content_length: 0,
            head_size: 0,
        }
    }
}

impl Decoder for RequestDecoder {
    type Item = Request;
    type Error = ParseError;

    /// Consumes what it can from `src` and yields the request once it is `Done`.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(request))`: the request is complete
    /// - `Ok(None)`: need more data to proceed
    /// - `Err(_)`: encountered a parsing error
    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        let consumed = self.parse(&src[..])?;
        src.advance(consumed);
        Ok(self.take_request())
    }

    fn decode_eof(&mut self, buf: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        if let Some(request) = self.decode(buf)? {
            return Ok(Some(request));
        }

        // peer went away without sending anything
        if self.state == ParseState::Initialized && buf.is_empty() {
            return Ok(None);
        }

        self.finish()?;
        Ok(None)
    }
}

#[inline]
fn check_head_size(size: usize) -> Result<(), ParseError> {
    ensure!(size <= MAX_HEADER_BYTES, ParseError::too_large_header(size, MAX_HEADER_BYTES));
    Ok(())
}

/// Parses `METHOD SP TARGET SP HTTP/1.1 CRLF`.
///
/// Returns `Ok(None)` when no complete line is available yet, otherwise the
/// request line and the bytes consumed including the CRLF.
fn parse_request_line(src: &[u8]) -> Result<Option<(RequestLine, usize)>, ParseError> {
    let Some(idx) = find_crlf(src) else {
        return Ok(None);
    };

    let fields = src[..idx].split(|b| *b == b' ').collect::<Vec<_>>();
    let &[method, target, version] = fields.as_slice() else {
        return Err(ParseError::bad_start_line(format!("expected 3 fields, found {}", fields.len())));
    };

    ensure!(
        !method.is_empty() && method.iter().all(u8::is_ascii_uppercase),
        ParseError::bad_start_line("method must be upper-case letters")
    );
    ensure!(!target.is_empty(), ParseError::bad_start_line("empty request target"));
    ensure!(version == HTTP_VERSION, ParseError::version_not_supported(String::from_utf8_lossy(version)));

    let target = std::str::from_utf8(target).map_err(|_e| ParseError::bad_start_line("request target is not utf-8"))?;
    let number = &version[b"HTTP/".len()..];

    let request_line = RequestLine {
        method: String::from_utf8_lossy(method).into_owned(),
        target: target.to_owned(),
        http_version: String::from_utf8_lossy(number).into_owned(),
    };

    Ok(Some((request_line, idx + CRLF.len())))
}
