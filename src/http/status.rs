#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpStatus {
    BadRequest = 400,
    MethodNotAllowed = 405,
    RequestTimeout = 408,
    LengthRequired = 411,
    RequestHeaderFieldsTooLarge = 431,

    BadGateway = 502,
    GatewayTimeout = 504,
    HttpVersionNotSupported = 505,
}

impl HttpStatus {
    pub fn code(self) -> u16 {
        self as u16
    }

    pub fn reason(self) -> &'static str {
        match self {
            HttpStatus::BadRequest => "Bad Request",                                     // 400
            HttpStatus::MethodNotAllowed => "Method Not Allowed",                        // 405
            HttpStatus::RequestTimeout => "Request Timeout",                             // 408
            HttpStatus::LengthRequired => "Length Required",                             // 411
            HttpStatus::RequestHeaderFieldsTooLarge => "Request Header Fields Too Large", // 431

            HttpStatus::BadGateway => "Bad Gateway",                                     // 502
            HttpStatus::GatewayTimeout => "Gateway Timeout",                             // 504
            HttpStatus::HttpVersionNotSupported => "HTTP Version Not Supported",         // 505
        }
    }
}
