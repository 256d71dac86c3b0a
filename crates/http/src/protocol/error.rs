use std::error::Error;
use std::io;
use thiserror::Error;

use crate::codec::WriteState;

#[derive(Debug, Error)]
pub enum HttpError {
    #[error("request error: {source}")]
    RequestError {
        #[from]
        source: ParseError,
    },

    #[error("response error: {source}")]
    ResponseError {
        #[from]
        source: SendError,
    },

    #[error("handler error: {source}")]
    HandlerError { source: Box<dyn Error + Send + Sync> },
}

impl HttpError {
    pub fn handler<E: Into<Box<dyn Error + Send + Sync>>>(e: E) -> Self {
        Self::HandlerError { source: e.into() }
    }
}

#[derive(Error, Debug)]
pub enum ParseError {
    #[error("invalid start line: {reason}")]
    BadStartLine { reason: String },

    #[error("http version not supported: {version}")]
    HttpVersionNotSupported { version: String },

    #[error("malformed field line")]
    MalformedFieldLine,

    #[error("malformed field name: {name:?}")]
    MalformedFieldName { name: String },

    #[error("malformed content-length header: {value}")]
    MalformedContentLength { value: String },

    #[error("content-length doesn't match actual body length, expected: {expected}, actual: {actual}")]
    ContentLengthMismatch { expected: usize, actual: usize },

    #[error("header size too large, current: {current_size} exceed the limit {max_size}")]
    TooLargeHeader { current_size: usize, max_size: usize },

    #[error("io error: {source}")]
    Io {
        #[from]
        source: io::Error,
    },
}

impl ParseError {
    pub fn bad_start_line<S: ToString>(str: S) -> Self {
        Self::BadStartLine { reason: str.to_string() }
    }

    pub fn version_not_supported<S: ToString>(str: S) -> Self {
        Self::HttpVersionNotSupported { version: str.to_string() }
    }

    pub fn malformed_field_name(name: &[u8]) -> Self {
        Self::MalformedFieldName { name: String::from_utf8_lossy(name).into_owned() }
    }

    pub fn malformed_content_length<S: ToString>(str: S) -> Self {
        Self::MalformedContentLength { value: str.to_string() }
    }

    pub fn content_length_mismatch(expected: usize, actual: usize) -> Self {
        Self::ContentLengthMismatch { expected, actual }
    }

    pub fn too_large_header(current_size: usize, max_size: usize) -> Self {
        Self::TooLargeHeader { current_size, max_size }
    }

    pub fn io<E: Into<io::Error>>(e: E) -> Self {
        Self::Io { source: e.into() }
    }
}

#[derive(Error, Debug)]
pub enum SendError {
    #[error("invalid writer state {state:?} to write {frame}")]
    InvalidState { state: WriteState, frame: &'static str },

    #[error("upstream read error: {source}")]
    Upstream { source: io::Error },

    #[error("io error: {source}")]
    Io {
        #[from]
        source: io::Error,
    },
}

impl SendError {
    pub fn invalid_state(state: WriteState, frame: &'static str) -> Self {
        Self::InvalidState { state, frame }
    }

    pub fn upstream<E: Into<io::Error>>(e: E) -> Self {
        Self::Upstream { source: e.into() }
    }

    pub fn io<E: Into<io::Error>>(e: E) -> Self {
        Self::Io { source: e.into() }
    }
}
