//! HTTP connection handling module
//!
//! This module glues the codecs to a duplex byte stream for one exchange.
//!
//! # Components
//!
//! - [`HttpConnection`]: reads one request through
//!   [`RequestDecoder`](crate::codec::RequestDecoder), invokes the handler and
//!   closes the connection
//! - [`ResponseWriter`]: the response sink handed to handlers, supporting
//!   fixed-length bodies and chunked streaming with trailers

mod http_connection;
mod response_writer;

pub use http_connection::HttpConnection;
pub use http_connection::DEFAULT_READ_BUFFER;
pub use http_connection::INTERNAL_ERROR_BODY;
pub use response_writer::ResponseWriter;
pub use response_writer::STREAM_BLOCK_SIZE;
pub use response_writer::TRAILERS;
pub use response_writer::X_CONTENT_LENGTH;
pub use response_writer::X_CONTENT_SHA256;
