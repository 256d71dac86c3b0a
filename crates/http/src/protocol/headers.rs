//! Case-insensitive header storage shared by requests, responses and trailers.
//!
//! Field names are normalised to lower case on every operation, so `Host`,
//! `HOST` and `host` all address the same entry. Entries keep the order in
//! which they were first inserted, which makes the serialized form stable,
//! although nothing on the wire depends on that order.

use std::fmt;

use http::header;

use crate::codec::{BlockStatus, HeaderDecoder, HeaderEncoder};
use crate::protocol::ParseError;

/// A mapping from lower-cased field names to field values.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderMap {
    entries: Vec<(String, String)>,
}

impl HeaderMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the value stored under `name`, or `""` when absent.
    pub fn get<K: AsRef<str>>(&self, name: K) -> &str {
        self.position(name.as_ref()).map_or("", |idx| self.entries[idx].1.as_str())
    }

    /// Inserts or overwrites the value stored under `name`.
    pub fn set<K: AsRef<str>, V: Into<String>>(&mut self, name: K, value: V) {
        let value = value.into();
        match self.position(name.as_ref()) {
            Some(idx) => self.entries[idx].1 = value,
            None => self.entries.push((name.as_ref().to_ascii_lowercase(), value)),
        }
    }

    /// Returns true when `name` maps to a non-empty value.
    ///
    /// A field explicitly set to `""` is reported as absent. Parsing relies on
    /// this when merging duplicates, so it is kept as is.
    pub fn contains<K: AsRef<str>>(&self, name: K) -> bool {
        !self.get(name).is_empty()
    }

    pub fn delete<K: AsRef<str>>(&mut self, name: K) {
        if let Some(idx) = self.position(name.as_ref()) {
            self.entries.remove(idx);
        }
    }

    /// Copies every entry of `other` into `self`, overwriting existing values.
    pub fn extend(&mut self, other: &HeaderMap) {
        for (name, value) in other.iter() {
            self.set(name, value);
        }
    }

    /// Adds `value` to the field, comma-joining it with a value already present.
    pub(crate) fn append(&mut self, name: &str, value: String) {
        if self.contains(name) {
            let merged = format!("{}, {}", self.get(name), value);
            self.set(name, merged);
        } else {
            self.set(name, value);
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(name, value)| (name.as_str(), value.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Parses as much of a CRLF-delimited header block from `src` as is available.
    ///
    /// See [`HeaderDecoder::decode`] for the exact contract.
    pub fn parse_block(&mut self, src: &[u8]) -> Result<BlockStatus, ParseError> {
        HeaderDecoder.decode(self, src)
    }

    /// Renders every entry as `name: value\r\n` followed by the blank line.
    pub fn serialize(&self) -> String {
        let mut dst = String::new();
        HeaderEncoder.encode(self, &mut dst);
        dst
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.entries.iter().position(|(key, _)| key.eq_ignore_ascii_case(name))
    }
}

impl fmt::Display for HeaderMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.serialize())
    }
}

impl<K: AsRef<str>, V: Into<String>> FromIterator<(K, V)> for HeaderMap {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut headers = HeaderMap::new();
        for (name, value) in iter {
            headers.set(name, value);
        }
        headers
    }
}

/// Builds the header set every response starts from.
pub fn default_headers(content_length: usize) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.set(header::CONTENT_LENGTH, content_length.to_string());
    headers.set(header::CONNECTION, "close");
    headers.set(header::CONTENT_TYPE, mime::TEXT_PLAIN.as_ref());
    headers
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookups_ignore_case() {
        let mut headers = HeaderMap::new();
        headers.set("Content-Type", "text/html");

        assert_eq!(headers.get("content-type"), "text/html");
        assert_eq!(headers.get("CONTENT-TYPE"), "text/html");
        assert_eq!(headers.get(header::CONTENT_TYPE), "text/html");
        assert_eq!(headers.iter().next(), Some(("content-type", "text/html")));

        headers.set("CONTENT-TYPE", "text/plain");
        assert_eq!(headers.len(), 1);
        assert_eq!(headers.get("Content-Type"), "text/plain");
    }

    #[test]
    fn missing_header_is_empty() {
        let headers = HeaderMap::new();
        assert_eq!(headers.get("Host"), "");
        assert!(!headers.contains("Host"));
    }

    #[test]
    fn contains_treats_empty_value_as_absent() {
        let mut headers = HeaderMap::new();
        headers.set("X-Empty", "");

        assert_eq!(headers.len(), 1);
        assert!(!headers.contains("X-Empty"));
    }

    #[test]
    fn delete_removes_entry() {
        let mut headers = default_headers(0);
        headers.delete("content-LENGTH");

        assert!(!headers.contains(header::CONTENT_LENGTH));
        assert_eq!(headers.len(), 2);

        headers.delete("not-there");
        assert_eq!(headers.len(), 2);
    }

    #[test]
    fn extend_overwrites() {
        let mut headers = default_headers(12);
        let extra: HeaderMap = [("Content-Type", "text/html"), ("X-Request", "1")].into_iter().collect();

        headers.extend(&extra);

        assert_eq!(headers.get(header::CONTENT_TYPE), "text/html");
        assert_eq!(headers.get("x-request"), "1");
        assert_eq!(headers.get(header::CONTENT_LENGTH), "12");
        assert_eq!(headers.len(), 4);
    }

    #[test]
    fn append_joins_with_comma() {
        let mut headers = HeaderMap::new();
        headers.append("accept", "a".into());
        headers.append("accept", "b".into());
        assert_eq!(headers.get("Accept"), "a, b");

        headers.set("x-blank", "");
        headers.append("x-blank", "c".into());
        assert_eq!(headers.get("x-blank"), "c");
    }

    #[test]
    fn default_headers_are_seeded() {
        let headers = default_headers(0);
        assert_eq!(headers.get("Content-Length"), "0");
        assert_eq!(headers.get("Connection"), "close");
        assert_eq!(headers.get("Content-Type"), "text/plain");
        assert_eq!(headers.serialize(), "content-length: 0\r\nconnection: close\r\ncontent-type: text/plain\r\n\r\n");
    }

    #[test]
    fn serialize_then_parse_is_equivalent() {
        let mut headers = HeaderMap::new();
        headers.set("Host", "localhost:42069");
        headers.set("User-Agent", "curl/8.4.0");
        headers.set("Accept", "*/*");

        let wire = headers.serialize();
        let mut parsed = HeaderMap::new();
        let status = parsed.parse_block(wire.as_bytes()).unwrap();

        assert_eq!(status, BlockStatus::Complete(wire.len()));
        assert_eq!(parsed.len(), headers.len());
        for (name, value) in headers.iter() {
            assert_eq!(parsed.get(name.to_ascii_uppercase()), value);
        }
    }
}
