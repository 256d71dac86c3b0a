use http::StatusCode;

/// Returns the reason phrase written after the status code.
///
/// Only the codes this server emits itself carry a phrase; every other code
/// gets an empty one.
pub fn reason_phrase(status: StatusCode) -> &'static str {
    match status {
        StatusCode::OK => "OK",
        StatusCode::BAD_REQUEST => "Bad Request",
        StatusCode::INTERNAL_SERVER_ERROR => "Internal Server Error",
        _ => "",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_and_unknown_codes() {
        assert_eq!(reason_phrase(StatusCode::OK), "OK");
        assert_eq!(reason_phrase(StatusCode::BAD_REQUEST), "Bad Request");
        assert_eq!(reason_phrase(StatusCode::INTERNAL_SERVER_ERROR), "Internal Server Error");
        assert_eq!(reason_phrase(StatusCode::NOT_FOUND), "");
        assert_eq!(reason_phrase(StatusCode::IM_A_TEAPOT), "");
    }
}
