//! Incremental reader for the head of an HTTP/1.x request.
//!
//! Bytes are pushed as they arrive from the client. Once the blank line ending
//! the head is seen, the request-line and every recognized header are stored in
//! a [`Request`]. Headers that are not a [`HeaderField`] are dropped, and a
//! repeated header keeps its last value.
//!
//! The reader does not look at the body. Whatever follows the head in the
//! buffered bytes is handed back untouched so it can be forwarded as is.

use thiserror::Error;

use crate::http::headers::{HeaderField, field_for_name};
use crate::http::request::Request;
use crate::http::status::HttpStatus;

const HEAD_TERMINATOR: &[u8] = b"\r\n\r\n";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReadError {
    #[error("request head exceeds {0} bytes")]
    HeadTooLarge(usize),

    #[error("header line {0:?} has no `:` separator")]
    MalformedHeaderLine(String),

    #[error("request head is not valid UTF-8")]
    InvalidEncoding,
}

impl ReadError {
    pub fn into_http_status(self) -> HttpStatus {
        match self {
            ReadError::HeadTooLarge(_) => HttpStatus::RequestHeaderFieldsTooLarge,
            ReadError::MalformedHeaderLine(_) => HttpStatus::BadRequest,
            ReadError::InvalidEncoding => HttpStatus::BadRequest,
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum ReadStatus {
    /// The head is not complete yet.
    Incomplete,

    /// The head was parsed. `body` holds the bytes received after it.
    Done { request: Request, body: Vec<u8> },
}

pub struct RequestReader {
    buf: Vec<u8>,
    max_head_bytes: usize,
}

impl RequestReader {
    pub fn new(max_head_bytes: usize) -> Self {
        Self {
            buf: Vec::new(),
            max_head_bytes,
        }
    }

    /// Buffers `bytes` and tries to parse a complete head.
    pub fn push(&mut self, bytes: &[u8]) -> Result<ReadStatus, ReadError> {
        self.buf.extend_from_slice(bytes);

        // Empty lines before the request-line are ignored
        while self.buf.starts_with(b"\r\n") {
            self.buf.drain(..2);
        }

        let head_end = match self
            .buf
            .windows(HEAD_TERMINATOR.len())
            .position(|w| w == HEAD_TERMINATOR)
        {
            Some(end) => end,
            // Up to three bytes of a split terminator may already be buffered
            None if self.buf.len() > self.max_head_bytes + HEAD_TERMINATOR.len() - 1 => {
                return Err(ReadError::HeadTooLarge(self.max_head_bytes));
            }
            None => return Ok(ReadStatus::Incomplete),
        };

        if head_end > self.max_head_bytes {
            return Err(ReadError::HeadTooLarge(self.max_head_bytes));
        }

        let head =
            std::str::from_utf8(&self.buf[..head_end]).map_err(|_| ReadError::InvalidEncoding)?;
        let request = parse_head(head)?;

        let body = self.buf.split_off(head_end + HEAD_TERMINATOR.len());
        self.buf.clear();

        Ok(ReadStatus::Done { request, body })
    }
}

fn parse_head(head: &str) -> Result<Request, ReadError> {
    let mut req = Request::new();
    let mut lines = head.split('\n').map(|l| l.strip_suffix('\r').unwrap_or(l));

    if let Some(request_line) = lines.next() {
        req.set(HeaderField::RequestLine, request_line);
    }

    for line in lines {
        if line.is_empty() {
            continue;
        }

        let (name, value) = line
            .split_once(':')
            .ok_or_else(|| ReadError::MalformedHeaderLine(line.to_string()))?;

        if let Some(field) = field_for_name(name.trim()) {
            req.set(field, value.trim());
        }
    }

    Ok(req)
}
