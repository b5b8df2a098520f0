use crate::http::status::HttpStatus;

/// Minimal response sent back to the client when a request is not forwarded.
///
/// The proxy never relays a rejected request, so the client gets a status line,
/// an explicit empty body and a closed connection.
pub fn error_response(status: HttpStatus) -> String {
    // HTTP/1.1 <status> <reason>\r\n
    // Content-Length: 0\r\n
    // Connection: close\r\n
    // \r\n
    format!(
        "HTTP/1.1 {} {}\r\n\
         Content-Length: 0\r\n\
         Connection: close\r\n\
         \r\n",
        status.code(),
        status.reason(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_status_line_and_blank_line() {
        assert_eq!(
            error_response(HttpStatus::LengthRequired),
            "HTTP/1.1 411 Length Required\r\nContent-Length: 0\r\nConnection: close\r\n\r\n"
        );
    }

    #[test]
    fn gateway_errors_use_5xx() {
        assert!(error_response(HttpStatus::BadGateway).starts_with("HTTP/1.1 502 Bad Gateway\r\n"));
    }
}
