//! Serialization of header blocks and status lines.
//!
//! Both response headers and chunked trailers share the same wire shape:
//! one `name: value\r\n` line per entry followed by a bare `\r\n`.

use bytes::{BufMut, BytesMut};
use http::StatusCode;

use crate::protocol::{reason_phrase, HeaderMap};

/// Initial buffer size allocated for header serialization
pub(crate) const INIT_HEADER_SIZE: usize = 1024;

#[derive(Debug, Clone, Copy, Default)]
pub struct HeaderEncoder;

impl HeaderEncoder {
    /// Appends the header block, including its terminating blank line, to `dst`.
    pub fn encode(&self, headers: &HeaderMap, dst: &mut String) {
        for (name, value) in headers.iter() {
            dst.push_str(name);
            dst.push_str(": ");
            dst.push_str(value);
            dst.push_str("\r\n");
        }
        dst.push_str("\r\n");
    }

    /// Appends the header block to a byte buffer.
    pub fn encode_bytes(&self, headers: &HeaderMap, dst: &mut BytesMut) {
        dst.reserve(INIT_HEADER_SIZE);
        for (name, value) in headers.iter() {
            dst.put_slice(name.as_bytes());
            dst.put_slice(b": ");
            dst.put_slice(value.as_bytes());
            dst.put_slice(b"\r\n");
        }
        dst.put_slice(b"\r\n");
    }

    /// Appends `HTTP/1.1 <code> <reason>\r\n` to `dst`.
    pub fn encode_status_line(&self, status: StatusCode, dst: &mut BytesMut) {
        dst.put_slice(b"HTTP/1.1 ");
        dst.put_slice(status.as_str().as_bytes());
        dst.put_u8(b' ');
        dst.put_slice(reason_phrase(status).as_bytes());
        dst.put_slice(b"\r\n");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_lines() {
        let mut dst = BytesMut::new();
        HeaderEncoder.encode_status_line(StatusCode::OK, &mut dst);
        HeaderEncoder.encode_status_line(StatusCode::BAD_REQUEST, &mut dst);
        HeaderEncoder.encode_status_line(StatusCode::NOT_FOUND, &mut dst);

        assert_eq!(&dst[..], b"HTTP/1.1 200 OK\r\nHTTP/1.1 400 Bad Request\r\nHTTP/1.1 404 \r\n");
    }

    #[test]
    fn string_and_bytes_forms_agree() {
        let headers: HeaderMap = [("Host", "a"), ("X-Content-Length", "10")].into_iter().collect();

        let mut text = String::new();
        HeaderEncoder.encode(&headers, &mut text);

        let mut bytes = BytesMut::new();
        HeaderEncoder.encode_bytes(&headers, &mut bytes);

        assert_eq!(text, "host: a\r\nx-content-length: 10\r\n\r\n");
        assert_eq!(&bytes[..], text.as_bytes());
    }

    #[test]
    fn empty_map_is_blank_line() {
        let mut bytes = BytesMut::new();
        HeaderEncoder.encode_bytes(&HeaderMap::new(), &mut bytes);
        assert_eq!(&bytes[..], b"\r\n");
    }
}
