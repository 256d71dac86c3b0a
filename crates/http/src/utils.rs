//! Small byte-scanning helpers shared by the decoders.

pub(crate) const CRLF: &[u8] = b"\r\n";

/// Returns `Err($error)` from the enclosing function unless `$predicate` holds.
macro_rules! ensure {
    ($predicate:expr, $error:expr) => {
        if !$predicate {
            return Err($error);
        }
    };
}

pub(crate) use ensure;

/// Returns the offset of the first `\r\n` in `src`.
#[inline]
pub(crate) fn find_crlf(src: &[u8]) -> Option<usize> {
    src.windows(CRLF.len()).position(|window| window == CRLF)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn find_crlf_offsets() {
        assert_eq!(find_crlf(b"GET / HTTP/1.1\r\n"), Some(14));
        assert_eq!(find_crlf(b"\r\n"), Some(0));
        assert_eq!(find_crlf(b"abc\r"), None);
        assert_eq!(find_crlf(b""), None);
        assert_eq!(find_crlf(b"a\nb\r\n"), Some(3));
    }
}
