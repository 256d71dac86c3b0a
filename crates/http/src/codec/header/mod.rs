//! Header block processing for both directions.
//!
//! # Components
//!
//! - [`HeaderDecoder`]: incremental, re-entrant parser for a CRLF-delimited
//!   block of field lines, used for request headers
//! - [`HeaderEncoder`]: renders status lines, response headers and chunked
//!   trailers

mod header_decoder;
mod header_encoder;

pub use header_decoder::BlockStatus;
pub use header_decoder::HeaderDecoder;
pub use header_encoder::HeaderEncoder;
