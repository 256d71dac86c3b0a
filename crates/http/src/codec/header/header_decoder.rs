//! Incremental decoder for CRLF-delimited header blocks.
//!
//! The decoder is re-entrant: each call receives only the bytes the caller
//! has not consumed yet, records every complete field line it finds into the
//! target [`HeaderMap`] and reports how many bytes it used. A field line split
//! across two reads is simply left in the caller's buffer until its CRLF
//! arrives.
//!
//! # Field line rules
//!
//! - the name is everything before the first `:`
//! - a space right before the colon (`Host : x`) is rejected
//! - every name byte must belong to the token charset
//! - surrounding whitespace is trimmed from the value
//! - a repeated name is merged as `first, second`

use crate::ensure;
use crate::protocol::{HeaderMap, ParseError};
use crate::utils::{find_crlf, CRLF};

/// Progress reported by [`HeaderDecoder::decode`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockStatus {
    /// The terminating blank line was found; holds the bytes consumed through it.
    Complete(usize),
    /// More bytes are needed; holds the bytes consumed by complete field lines.
    Partial(usize),
}

impl BlockStatus {
    #[inline]
    pub fn consumed(&self) -> usize {
        match self {
            BlockStatus::Complete(n) | BlockStatus::Partial(n) => *n,
        }
    }

    #[inline]
    pub fn is_complete(&self) -> bool {
        matches!(self, BlockStatus::Complete(_))
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct HeaderDecoder;

impl HeaderDecoder {
    /// Decodes field lines from `src` into `headers`.
    ///
    /// # Returns
    ///
    /// - `Ok(BlockStatus::Complete(n))` if the blank line ending the block was consumed
    /// - `Ok(BlockStatus::Partial(n))` if the input ran out first, `n` may be `0`
    /// - `Err(ParseError)` if a field line is malformed, nothing is reported as consumed
    pub fn decode(&self, headers: &mut HeaderMap, src: &[u8]) -> Result<BlockStatus, ParseError> {
        let mut read = 0;

        loop {
            let Some(idx) = find_crlf(&src[read..]) else {
                return Ok(BlockStatus::Partial(read));
            };

            if idx == 0 {
                return Ok(BlockStatus::Complete(read + CRLF.len()));
            }

            let (name, value) = parse_field_line(&src[read..read + idx])?;
            headers.append(name, value);

            read += idx + CRLF.len();
        }
    }
}

fn parse_field_line(line: &[u8]) -> Result<(&str, String), ParseError> {
    let colon = line.iter().position(|b| *b == b':').ok_or(ParseError::MalformedFieldLine)?;

    let name = &line[..colon];
    ensure!(!name.ends_with(b" "), ParseError::malformed_field_name(name));
    ensure!(is_token(name), ParseError::malformed_field_name(name));

    let name = std::str::from_utf8(name).map_err(|_e| ParseError::malformed_field_name(name))?;
    let value = String::from_utf8_lossy(line[colon + 1..].trim_ascii()).into_owned();

    Ok((name, value))
}

/// Checks `name` against the RFC 9110 `token` production.
fn is_token(name: &[u8]) -> bool {
    !name.is_empty() && name.iter().all(|b| is_token_byte(*b))
}

#[inline]
fn is_token_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric()
        || matches!(b, b'!' | b'#' | b'$' | b'%' | b'&' | b'\'' | b'*' | b'+' | b'-' | b'.' | b'^' | b'_' | b'`' | b'|' | b'~')
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;

    fn crlf(s: &str) -> String {
        s.replace('\n', "\r\n")
    }

    #[test]
    fn valid_single_headers() {
        let mut headers = HeaderMap::new();
        let data = b"Host: localhost:42069\r\nAuth: Bearer token\r\n\r\n";

        let status = HeaderDecoder.decode(&mut headers, data).unwrap();

        assert_eq!(status, BlockStatus::Complete(45));
        assert_eq!(headers.get("HOST"), "localhost:42069");
        assert_eq!(headers.get("Auth"), "Bearer token");
    }

    #[test]
    fn consumes_exactly_through_blank_line() {
        let block = crlf(indoc! {r##"
        Host: 127.0.0.1:8080
        User-Agent: curl/7.79.1
        Accept: */*

        "##});
        let mut data = block.clone().into_bytes();
        data.extend_from_slice(b"hello");

        let mut headers = HeaderMap::new();
        let status = headers.parse_block(&data).unwrap();

        assert!(status.is_complete());
        assert_eq!(status.consumed(), block.len());
        assert_eq!(&data[status.consumed()..], b"hello");
        assert_eq!(headers.len(), 3);
    }

    #[test]
    fn space_before_colon_is_rejected() {
        let mut headers = HeaderMap::new();
        let result = HeaderDecoder.decode(&mut headers, b"       Host : localhost:42069       \r\n\r\n");

        assert!(matches!(result, Err(ParseError::MalformedFieldName { .. })));
    }

    #[test]
    fn non_token_name_is_rejected() {
        let mut headers = HeaderMap::new();
        let result = HeaderDecoder.decode(&mut headers, "H©st: localhost:42069\r\n\r\n".as_bytes());
        assert!(matches!(result, Err(ParseError::MalformedFieldName { .. })));

        let result = HeaderDecoder.decode(&mut headers, b"X Forwarded: a\r\n\r\n");
        assert!(matches!(result, Err(ParseError::MalformedFieldName { .. })));

        let result = HeaderDecoder.decode(&mut headers, b": empty\r\n\r\n");
        assert!(matches!(result, Err(ParseError::MalformedFieldName { .. })));
    }

    #[test]
    fn missing_colon_is_rejected() {
        let mut headers = HeaderMap::new();
        let result = HeaderDecoder.decode(&mut headers, b"Host localhost\r\n\r\n");
        assert!(matches!(result, Err(ParseError::MalformedFieldLine)));
    }

    #[test]
    fn value_whitespace_is_trimmed() {
        let mut headers = HeaderMap::new();
        HeaderDecoder.decode(&mut headers, b"Host:   localhost:42069 \t \r\n\r\n").unwrap();
        assert_eq!(headers.get("host"), "localhost:42069");
    }

    #[test]
    fn token_punctuation_is_accepted() {
        let mut headers = HeaderMap::new();
        let status = HeaderDecoder.decode(&mut headers, b"X-!#$%&'*+.^_`|~9: ok\r\n\r\n").unwrap();
        assert!(status.is_complete());
        assert_eq!(headers.get("x-!#$%&'*+.^_`|~9"), "ok");
    }

    #[test]
    fn duplicate_names_are_merged_in_order() {
        let mut headers = HeaderMap::new();
        let data = b"Set-Person: lane-loves-go\r\nSet-Person: prime-loves-zig\r\nset-person: tj-loves-ocaml\r\n\r\n";

        let status = HeaderDecoder.decode(&mut headers, data).unwrap();

        assert!(status.is_complete());
        assert_eq!(headers.get("Set-Person"), "lane-loves-go, prime-loves-zig, tj-loves-ocaml");
    }

    #[test]
    fn partial_line_waits_for_more() {
        let mut headers = HeaderMap::new();

        assert_eq!(HeaderDecoder.decode(&mut headers, b"Host: local").unwrap(), BlockStatus::Partial(0));
        assert!(headers.is_empty());

        let status = HeaderDecoder.decode(&mut headers, b"Host: localhost\r\nAcc").unwrap();
        assert_eq!(status, BlockStatus::Partial(17));
        assert_eq!(headers.get("host"), "localhost");

        let status = HeaderDecoder.decode(&mut headers, b"Accept: */*\r\n\r\n").unwrap();
        assert_eq!(status, BlockStatus::Complete(15));
        assert_eq!(headers.get("accept"), "*/*");
    }

    #[test]
    fn byte_by_byte_matches_whole() {
        let block = crlf(indoc! {r##"
        Host: 127.0.0.1:8080
        Accept: text/html
        Accept: application/json
        Cache-Control: max-age=0
        sec-ch-ua: "Chromium";v="109"

        "##});
        let data = block.as_bytes();

        let mut whole = HeaderMap::new();
        assert_eq!(whole.parse_block(data).unwrap(), BlockStatus::Complete(data.len()));

        let mut incremental = HeaderMap::new();
        let mut buffer = Vec::new();
        let mut total = 0;
        let mut complete = false;
        for byte in data {
            assert!(!complete);
            buffer.push(*byte);
            let status = incremental.parse_block(&buffer).unwrap();
            buffer.drain(..status.consumed());
            total += status.consumed();
            complete = status.is_complete();
        }

        assert!(complete);
        assert!(buffer.is_empty());
        assert_eq!(total, data.len());
        assert_eq!(incremental, whole);
        assert_eq!(incremental.get("accept"), "text/html, application/json");
    }
}
