use thiserror::Error;

use crate::http::headers::HeaderField;
use crate::http::request::Request;
use crate::http::status::HttpStatus;
use crate::http::{HttpMethod, HttpVersion, http_method_from_str, split_request_line};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("request-line is missing or not `Method SP Request-URI SP HTTP-Version`")]
    MalformedRequestLine,

    #[error("unsupported HTTP version {0:?}")]
    UnsupportedVersion(String),

    #[error("missing required header {}", .0.name().unwrap_or("Request-Line"))]
    MissingRequiredHeader(HeaderField),
}

impl ValidationError {
    pub fn into_http_status(self) -> HttpStatus {
        match self {
            ValidationError::MalformedRequestLine => HttpStatus::BadRequest,
            ValidationError::UnsupportedVersion(_) => HttpStatus::HttpVersionNotSupported,
            ValidationError::MissingRequiredHeader(HeaderField::ContentLength) => {
                HttpStatus::LengthRequired
            }
            ValidationError::MissingRequiredHeader(_) => HttpStatus::BadRequest,
        }
    }
}

pub struct Validator;

impl Validator {
    fn validate_http_version(version: &str) -> Result<(), ValidationError> {
        match HttpVersion::from_token(version) {
            Some(_) => Ok(()),
            None => Err(ValidationError::UnsupportedVersion(version.to_string())),
        }
    }

    fn require(req: &Request, field: HeaderField) -> Result<(), ValidationError> {
        if req.contains(field) {
            Ok(())
        } else {
            Err(ValidationError::MissingRequiredHeader(field))
        }
    }

    /// Checks a request against the minimums the proxy needs before forwarding.
    ///
    /// The Request-URI itself is not checked. `Host` is required for HTTP/1.0
    /// as well as HTTP/1.1.
    pub fn validate_request(req: &Request) -> Result<(), ValidationError> {
        let line = req
            .request_line()
            .ok_or(ValidationError::MalformedRequestLine)?;
        let (method, _uri, version) =
            split_request_line(line).ok_or(ValidationError::MalformedRequestLine)?;

        Self::validate_http_version(version)?;
        Self::require(req, HeaderField::Host)?;

        if http_method_from_str(method) == HttpMethod::Post {
            Self::require(req, HeaderField::ContentLength)?;
        }

        Ok(())
    }
}

/// Binary form of [`Validator::validate_request`].
pub fn validate(req: &Request) -> bool {
    Validator::validate_request(req).is_ok()
}
