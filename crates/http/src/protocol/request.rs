//! Parsed HTTP request values.
//!
//! A [`Request`] is produced by [`RequestDecoder`](crate::codec::RequestDecoder)
//! once the request line, the header block and any `Content-Length` body have
//! all been received.

use bytes::Bytes;
use http::header;

use crate::protocol::HeaderMap;

/// The first line of a request: `METHOD SP TARGET SP HTTP/1.1`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestLine {
    pub method: String,
    pub target: String,
    /// The numeric part of the version token, always `1.1`.
    pub http_version: String,
}

#[derive(Debug, Clone)]
pub struct Request {
    request_line: RequestLine,
    headers: HeaderMap,
    body: Bytes,
}

impl Request {
    pub(crate) fn new(request_line: RequestLine, headers: HeaderMap, body: Bytes) -> Self {
        Self { request_line, headers, body }
    }

    pub fn request_line(&self) -> &RequestLine {
        &self.request_line
    }

    pub fn method(&self) -> &str {
        &self.request_line.method
    }

    pub fn target(&self) -> &str {
        &self.request_line.target
    }

    pub fn http_version(&self) -> &str {
        &self.request_line.http_version
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// The declared `Content-Length`, `0` when the header is absent.
    pub fn content_length(&self) -> usize {
        self.headers.get(header::CONTENT_LENGTH).trim().parse().unwrap_or(0)
    }

    pub fn into_parts(self) -> (RequestLine, HeaderMap, Bytes) {
        (self.request_line, self.headers, self.body)
    }
}
