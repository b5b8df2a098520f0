//! Turns a [`Request`] back into bytes for the origin server.
//!
//! Forwarding is a two-step pipeline:
//!
//! 1. [`rewrite_request_line_to_origin_form`] drops the scheme and authority
//!    from the Request-URI, mutating the request in place,
//! 2. [`format`] writes the request-line and every present header in
//!    [`HeaderField`] declaration order, followed by a blank line.
//!
//! [`serialize`] runs both steps. The rewrite only ever happens once per
//! request-line; calling [`serialize`] again yields the same bytes.

use thiserror::Error;

use crate::http::headers::HeaderField;
use crate::http::request::Request;
use crate::http::split_request_line;
use crate::http::status::HttpStatus;

const CRLF: &str = "\r\n";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SerializeError {
    #[error("request has no request-line")]
    EmptyRequest,

    #[error("request-line {0:?} cannot be rewritten to origin form")]
    MalformedRequestLine(String),
}

impl SerializeError {
    pub fn into_http_status(self) -> HttpStatus {
        match self {
            SerializeError::EmptyRequest => HttpStatus::BadRequest,
            SerializeError::MalformedRequestLine(_) => HttpStatus::BadRequest,
        }
    }
}

/// Origin-form version of a request-line.
///
/// The path starts at the third `/` of the Request-URI, the first two being
/// taken as the end of the scheme (`http://`). Without a third `/` the path
/// becomes `/`.
///
/// A URI that is already in origin form is not recognized as such and goes
/// through the same counting, so `/a/b` becomes `/` and `/a/b/c` becomes `/c`.
pub fn origin_form_line(line: &str) -> Option<String> {
    let (method, uri, version) = split_request_line(line)?;

    let path = match uri.match_indices('/').nth(2) {
        Some((start, _)) => &uri[start..],
        None => "/",
    };

    Some(format!("{method} {path} {version}"))
}

/// Rewrites the stored request-line from absolute-URI form to origin form.
///
/// Does nothing if the current request-line was already rewritten.
pub fn rewrite_request_line_to_origin_form(req: &mut Request) -> Result<(), SerializeError> {
    if req.is_origin_form() {
        return Ok(());
    }

    let line = req.request_line().ok_or(SerializeError::EmptyRequest)?;
    let rewritten = origin_form_line(line)
        .ok_or_else(|| SerializeError::MalformedRequestLine(line.to_string()))?;

    req.set_origin_form_line(rewritten);
    Ok(())
}

/// Writes the request as it currently stands, without rewriting anything.
///
/// Headers that are absent or empty are skipped.
pub fn format(req: &Request) -> Result<String, SerializeError> {
    let line = req.request_line().ok_or(SerializeError::EmptyRequest)?;

    let mut result = String::from(line);
    for (field, value) in req.headers() {
        if value.is_empty() {
            continue;
        }
        // headers() never yields RequestLine, every other field has a name
        let Some(name) = field.name() else { continue };

        result.push_str(CRLF);
        result.push_str(name);
        result.push_str(": ");
        result.push_str(value);
    }
    result.push_str(CRLF);
    result.push_str(CRLF);

    Ok(result)
}

/// Rewrites the request-line to origin form, then formats the request.
pub fn serialize(req: &mut Request) -> Result<String, SerializeError> {
    rewrite_request_line_to_origin_form(req)?;
    format(req)
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn with_line(line: &str) -> Request {
        let mut req = Request::new();
        req.set(HeaderField::RequestLine, line);
        req
    }

    #[test]
    fn rewrites_absolute_uri_to_path() {
        let mut req = with_line("GET http://example.com/a/b HTTP/1.1");
        rewrite_request_line_to_origin_form(&mut req).unwrap();
        assert_eq!(req.request_line(), Some("GET /a/b HTTP/1.1"));
        assert!(req.is_origin_form());
    }

    #[test]
    fn uri_without_path_collapses_to_root() {
        let mut req = with_line("GET http://example.com HTTP/1.1");
        rewrite_request_line_to_origin_form(&mut req).unwrap();
        assert_eq!(req.request_line(), Some("GET / HTTP/1.1"));
    }

    #[test]
    fn keeps_query_after_path() {
        assert_eq!(
            origin_form_line("GET http://example.com:8080/search?q=a/b HTTP/1.0").as_deref(),
            Some("GET /search?q=a/b HTTP/1.0")
        );
    }

    #[test]
    fn origin_form_input_is_counted_like_any_other_uri() {
        assert_eq!(
            origin_form_line("GET /a/b HTTP/1.1").as_deref(),
            Some("GET / HTTP/1.1")
        );
        assert_eq!(
            origin_form_line("GET /a/b/c HTTP/1.1").as_deref(),
            Some("GET /c HTTP/1.1")
        );
    }

    #[test]
    fn rewrite_happens_once() {
        let mut req = with_line("GET http://example.com/a/b/c HTTP/1.1");
        rewrite_request_line_to_origin_form(&mut req).unwrap();
        rewrite_request_line_to_origin_form(&mut req).unwrap();
        assert_eq!(req.request_line(), Some("GET /a/b/c HTTP/1.1"));
    }

    #[test]
    fn rewrite_rejects_malformed_line() {
        let mut req = with_line("GET");
        assert_matches!(
            rewrite_request_line_to_origin_form(&mut req),
            Err(SerializeError::MalformedRequestLine(line)) if line == "GET"
        );
        assert_eq!(req.request_line(), Some("GET"));
    }

    #[test]
    fn serializes_in_declaration_order() {
        let mut req = with_line("GET http://x.com/ HTTP/1.1");
        req.set(HeaderField::UserAgent, "test");
        req.set(HeaderField::Host, "x.com");

        assert_eq!(
            serialize(&mut req).unwrap(),
            "GET / HTTP/1.1\r\nHost: x.com\r\nUser-Agent: test\r\n\r\n"
        );
    }

    #[test]
    fn serialize_is_stable_across_calls() {
        let mut req = with_line("GET http://x.com/a/b HTTP/1.1");
        req.set(HeaderField::Host, "x.com");

        let first = serialize(&mut req).unwrap();
        let second = serialize(&mut req).unwrap();
        assert_eq!(first, second);
        assert_eq!(first, "GET /a/b HTTP/1.1\r\nHost: x.com\r\n\r\n");
    }

    #[test]
    fn skips_empty_values() {
        let mut req = with_line("GET http://x.com/ HTTP/1.1");
        req.set(HeaderField::Host, "x.com");
        req.set(HeaderField::Cookie, "");

        assert_eq!(
            serialize(&mut req).unwrap(),
            "GET / HTTP/1.1\r\nHost: x.com\r\n\r\n"
        );
    }

    #[test]
    fn line_only_request_ends_with_blank_line() {
        let mut req = with_line("GET http://x.com HTTP/1.0");
        assert_eq!(serialize(&mut req).unwrap(), "GET / HTTP/1.0\r\n\r\n");
    }

    #[test]
    fn empty_request_fails() {
        let mut req = Request::new();
        req.set(HeaderField::Host, "x.com");
        assert_eq!(serialize(&mut req), Err(SerializeError::EmptyRequest));
        assert_eq!(format(&req), Err(SerializeError::EmptyRequest));
    }

    #[test]
    fn format_alone_does_not_rewrite() {
        let mut req = with_line("GET http://x.com/a HTTP/1.1");
        req.set(HeaderField::Host, "x.com");
        assert_eq!(
            format(&req).unwrap(),
            "GET http://x.com/a HTTP/1.1\r\nHost: x.com\r\n\r\n"
        );
        assert!(!req.is_origin_form());
    }
}
