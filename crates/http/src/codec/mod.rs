//! HTTP codec module for decoding requests and encoding responses
//!
//! Both directions are explicit state machines with a single state field that
//! only ever moves forward.
//!
//! # Architecture
//!
//! - Request handling:
//!   - [`RequestDecoder`]: request line, header block and `Content-Length` body
//!   - [`HeaderDecoder`]: the re-entrant header block parser it delegates to
//!
//! - Response handling:
//!   - [`ResponseEncoder`]: status line, headers, fixed or chunked body, trailers
//!   - [`HeaderEncoder`]: status line and header block serialization
//!
//! # Example
//!
//! ```
//! use bytes::BytesMut;
//! use http::StatusCode;
//! use micro_h1::codec::{RequestDecoder, ResponseEncoder, ResponseFrame};
//! use micro_h1::protocol::default_headers;
//! use tokio_util::codec::{Decoder, Encoder};
//!
//! let mut request_buffer = BytesMut::from(&b"GET / HTTP/1.1\r\n\r\n"[..]);
//! let request = RequestDecoder::new().decode(&mut request_buffer).unwrap().unwrap();
//! assert_eq!(request.target(), "/");
//!
//! let mut encoder = ResponseEncoder::new();
//! let mut response_buffer = BytesMut::new();
//! let headers = default_headers(0);
//! encoder.encode(ResponseFrame::StatusLine(StatusCode::OK), &mut response_buffer).unwrap();
//! encoder.encode(ResponseFrame::Headers(&headers), &mut response_buffer).unwrap();
//! encoder.encode(ResponseFrame::Body(b""), &mut response_buffer).unwrap();
//! assert!(encoder.is_finish());
//! ```

mod header;
mod request_decoder;
mod response_encoder;

pub use header::BlockStatus;
pub use header::HeaderDecoder;
pub use header::HeaderEncoder;
pub use request_decoder::ParseState;
pub use request_decoder::RequestDecoder;
pub use request_decoder::MAX_HEADER_BYTES;
pub use response_encoder::ResponseEncoder;
pub use response_encoder::ResponseFrame;
pub use response_encoder::WriteState;
