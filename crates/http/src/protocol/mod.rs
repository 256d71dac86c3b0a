//! Core HTTP protocol values.
//!
//! This module holds the data the codecs produce and consume:
//!
//! - **Headers**: [`HeaderMap`], a case-insensitive field store,
//!   and [`default_headers`] which seeds every response
//! - **Requests**: [`RequestLine`] and the fully received [`Request`]
//! - **Status**: fixed reason phrases for status lines
//! - **Errors**: [`ParseError`], [`SendError`] and the connection
//!   level [`HttpError`]

mod headers;
pub use headers::default_headers;
pub use headers::HeaderMap;

mod request;
pub use request::Request;
pub use request::RequestLine;

mod status;
pub use status::reason_phrase;

mod error;
pub use error::HttpError;
pub use error::ParseError;
pub use error::SendError;
