pub mod headers;
pub mod parser;
pub mod request;
pub mod response;
pub mod serializer;
pub mod status;
pub mod validator;

/// HTTP versions the proxy forwards.
#[derive(PartialEq, Debug, Clone, Copy)]
pub enum HttpVersion {
    V1_0,
    V1_1,
}

impl HttpVersion {
    /// Matches the exact version token of a request-line; no case folding or
    /// whitespace trimming is done.
    pub fn from_token(token: &str) -> Option<HttpVersion> {
        match token {
            "HTTP/1.0" => Some(HttpVersion::V1_0),
            "HTTP/1.1" => Some(HttpVersion::V1_1),
            _ => None,
        }
    }
}

#[derive(PartialEq, Debug)]
pub enum HttpMethod {
    Get,
    Head,
    Post,
    Put,
    Delete,
    Connect,
    Options,
    Trace,
    Unknown,
}

pub fn http_method_from_str(method: &str) -> HttpMethod {
    match method {
        "GET" => HttpMethod::Get,
        "HEAD" => HttpMethod::Head,
        "POST" => HttpMethod::Post,
        "PUT" => HttpMethod::Put,
        "DELETE" => HttpMethod::Delete,
        "TRACE" => HttpMethod::Trace,
        "OPTIONS" => HttpMethod::Options,
        "CONNECT" => HttpMethod::Connect,
        _ => HttpMethod::Unknown,
    }
}

/// Splits `Method SP Request-URI SP HTTP-Version` on its first two spaces.
///
/// Whatever follows the second space is returned as the version, extra
/// spaces included.
pub fn split_request_line(line: &str) -> Option<(&str, &str, &str)> {
    let (method, rest) = line.split_once(' ')?;
    let (uri, version) = rest.split_once(' ')?;
    Some((method, uri, version))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_on_first_two_spaces() {
        assert_eq!(
            split_request_line("GET http://a.com/x HTTP/1.1"),
            Some(("GET", "http://a.com/x", "HTTP/1.1"))
        );
        assert_eq!(
            split_request_line("GET / HTTP/1.1 extra"),
            Some(("GET", "/", "HTTP/1.1 extra"))
        );
        assert_eq!(split_request_line("GET /"), None);
        assert_eq!(split_request_line("GET"), None);
    }

    #[test]
    fn version_tokens_are_exact() {
        assert_eq!(HttpVersion::from_token("HTTP/1.1"), Some(HttpVersion::V1_1));
        assert_eq!(HttpVersion::from_token("HTTP/1.0"), Some(HttpVersion::V1_0));
        assert_eq!(HttpVersion::from_token("http/1.1"), None);
        assert_eq!(HttpVersion::from_token("HTTP/2.0"), None);
    }

    #[test]
    fn methods_are_case_sensitive() {
        assert_eq!(http_method_from_str("POST"), HttpMethod::Post);
        assert_eq!(http_method_from_str("post"), HttpMethod::Unknown);
    }
}
