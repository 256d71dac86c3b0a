//! A small asynchronous HTTP/1.1 server core
//!
//! This crate parses requests incrementally from any byte stream and writes
//! responses through a strict state machine, either with a fixed-length body
//! or as a chunked stream followed by `X-Content-SHA256` and
//! `X-Content-Length` trailers. It is built on top of tokio.
//!
//! # Features
//!
//! - Incremental request parsing that tolerates arbitrary read boundaries
//! - Case-insensitive header store with comma-joining of repeated fields
//! - Fixed-length and chunked responses with integrity trailers
//! - One request per connection, the connection is always closed afterwards
//!
//! # Example
//!
//! ```no_run
//! use async_trait::async_trait;
//! use http::StatusCode;
//! use tokio::net::tcp::OwnedWriteHalf;
//! use micro_h1::connection::ResponseWriter;
//! use micro_h1::handler::Handler;
//! use micro_h1::protocol::{Request, SendError};
//! use micro_h1::server::Server;
//!
//! struct HelloWorld;
//!
//! #[async_trait]
//! impl Handler<OwnedWriteHalf> for HelloWorld {
//!     type Error = SendError;
//!
//!     async fn call(&self, _request: Request, writer: &mut ResponseWriter<OwnedWriteHalf>) -> Result<(), SendError> {
//!         writer.send_with_default_headers(StatusCode::OK, b"Hello World!\r\n").await
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let server = Server::builder().address("127.0.0.1:8080").handler(HelloWorld).build()?;
//!     server.start().await?;
//!     Ok(())
//! }
//! ```
//!
//! # Architecture
//!
//! - [`protocol`]: headers, requests, status reason phrases and error types
//! - [`codec`]: the request decoder and response encoder state machines
//! - [`connection`]: one exchange over a duplex stream, and the [`connection::ResponseWriter`]
//! - [`handler`]: the [`handler::Handler`] trait and [`handler::make_handler`]
//! - [`server`]: the TCP accept loop
//!
//! # Error Handling
//!
//! - [`protocol::ParseError`]: malformed or truncated requests
//! - [`protocol::SendError`]: out-of-order writes, upstream and socket failures
//! - [`protocol::HttpError`]: everything a connection can end with
//!
//! # Limitations
//!
//! - HTTP/1.1 only, no keep-alive
//! - No TLS support (use a reverse proxy for HTTPS)
//! - Request bodies are delimited by `Content-Length` only
//! - Maximum request line plus header block size: 8KB

pub mod codec;
pub mod connection;
pub mod handler;
pub mod protocol;
pub mod server;

mod utils;
pub(crate) use utils::ensure;
