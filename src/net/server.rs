//! Forwarding proxy runtime.
//!
//! This module owns everything the request core leaves out:
//! - accepting TCP connections from clients,
//! - reading raw bytes until a request head is complete,
//! - connecting to the origin server named by `Host`,
//! - sending the request body and relaying the response.
//!
//! Each connection carries exactly one [`Request`], which is never shared
//! between tasks. Nothing past the body announced by `Content-Length` is
//! forwarded, so a second request on the same connection never reaches the
//! origin without being checked.
//!
//! ## Request handling flow
//!
//! 1. Accept a TCP connection
//! 2. Read the request head
//!    (delegated to [`RequestReader`](crate::http::parser::RequestReader))
//! 3. Validate the request
//!    (delegated to [`Validator`](crate::http::validator::Validator))
//! 4. Rewrite and serialize it
//!    (delegated to [`serializer::serialize`](crate::http::serializer::serialize))
//! 5. Send the head and exactly `Content-Length` body bytes to the origin,
//!    then close the write side towards it
//! 6. Relay the response until the origin closes
//!
//! A request rejected at steps 2-5 is answered with a minimal error response
//! and never reaches the origin.

use async_std::future;
use async_std::io;
use async_std::net::{Shutdown, SocketAddr, TcpListener, TcpStream};
use async_std::prelude::*;
use async_std::task;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::config::config;
use crate::http::headers::HeaderField;
use crate::http::parser::{ReadError, ReadStatus, RequestReader};
use crate::http::request::Request;
use crate::http::response::error_response;
use crate::http::serializer::{SerializeError, serialize};
use crate::http::status::HttpStatus;
use crate::http::validator::{ValidationError, Validator};
use crate::http::{HttpMethod, http_method_from_str, split_request_line};

pub struct Server;

/// Reasons a client connection ends without a completed relay.
#[derive(Debug, Error)]
enum ProxyError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("client closed the connection")]
    ConnectionClosed,

    #[error("request head not received within {0:?}")]
    ReadTimeout(std::time::Duration),

    #[error(transparent)]
    Read(#[from] ReadError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("invalid Content-Length {0:?}")]
    InvalidContentLength(String),

    #[error(transparent)]
    Serialize(#[from] SerializeError),

    #[error("CONNECT tunnelling is not supported")]
    TunnelNotSupported,

    #[error("cannot reach origin {addr}: {source}")]
    Upstream {
        addr: String,
        source: std::io::Error,
    },
}

impl ProxyError {
    /// Status to answer the client with, `None` when nothing should be sent.
    fn into_http_status(self) -> Option<HttpStatus> {
        match self {
            ProxyError::Io(_) | ProxyError::ConnectionClosed => None,
            ProxyError::ReadTimeout(_) => Some(HttpStatus::RequestTimeout),
            ProxyError::Read(err) => Some(err.into_http_status()),
            ProxyError::Validation(err) => Some(err.into_http_status()),
            ProxyError::InvalidContentLength(_) => Some(HttpStatus::BadRequest),
            ProxyError::Serialize(err) => Some(err.into_http_status()),
            ProxyError::TunnelNotSupported => Some(HttpStatus::MethodNotAllowed),
            ProxyError::Upstream { source, .. }
                if source.kind() == std::io::ErrorKind::TimedOut =>
            {
                Some(HttpStatus::GatewayTimeout)
            }
            ProxyError::Upstream { .. } => Some(HttpStatus::BadGateway),
        }
    }
}

impl Server {
    /// Binds to the configured address and port and serves clients until the
    /// listener fails.
    pub async fn run(&self) -> std::io::Result<()> {
        let listener = TcpListener::bind((config().address, config().port)).await?;
        info!(address = %listener.local_addr()?, "listening for connections");

        loop {
            match listener.accept().await {
                Ok((stream, peer)) => {
                    task::spawn(Self::handle_client(stream, peer));
                }
                Err(err) => warn!(error = %err, "failed to accept connection"),
            }
        }
    }

    /// Reads from the client until the request head is complete.
    ///
    /// The whole head must arrive within `read_timeout`, however it is split
    /// across reads. Returns the populated [`Request`] and any bytes that
    /// arrived after the head.
    async fn read_request(stream: &mut TcpStream) -> Result<(Request, Vec<u8>), ProxyError> {
        let read_timeout = config().read_timeout;
        let mut reader = RequestReader::new(config().max_head_size);
        let mut buffer = vec![0; config().buffer_size];

        let read = async {
            loop {
                let n = match stream.read(&mut buffer).await {
                    Ok(0) => return Err(ProxyError::ConnectionClosed),
                    Ok(n) => n,
                    Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
                    Err(e) => return Err(ProxyError::Io(e)),
                };

                match reader.push(&buffer[..n]) {
                    Ok(ReadStatus::Done { request, body }) => return Ok((request, body)),
                    Ok(ReadStatus::Incomplete) => continue,
                    Err(e) => return Err(ProxyError::Read(e)),
                }
            }
        };

        future::timeout(read_timeout, read)
            .await
            .map_err(|_| ProxyError::ReadTimeout(read_timeout))?
    }

    async fn connect_upstream(host: &str) -> Result<TcpStream, ProxyError> {
        let addr = upstream_address(host, config().upstream_port);
        let connected =
            io::timeout(config().connect_timeout, TcpStream::connect(addr.as_str())).await;
        connected.map_err(|source| ProxyError::Upstream { addr, source })
    }

    /// Sends the rest of the request body, then relays the response.
    ///
    /// At most `remaining` more bytes are taken from the client. The write
    /// half towards the origin is shut down afterwards, and the response is
    /// copied back until the origin closes.
    async fn relay(
        client: &TcpStream,
        upstream: &TcpStream,
        remaining: u64,
    ) -> std::io::Result<u64> {
        let mut body_reader = client.take(remaining);
        let mut upstream_writer = upstream;
        io::copy(&mut body_reader, &mut upstream_writer).await?;
        upstream.shutdown(Shutdown::Write)?;

        let mut upstream_reader = upstream;
        let mut client_writer = client;
        io::copy(&mut upstream_reader, &mut client_writer).await
    }

    async fn forward(client: &mut TcpStream, peer: SocketAddr) -> Result<u64, ProxyError> {
        let (mut request, mut body) = Self::read_request(client).await?;
        Validator::validate_request(&request)?;

        let tunnel = request
            .request_line()
            .and_then(split_request_line)
            .is_some_and(|(method, _, _)| http_method_from_str(method) == HttpMethod::Connect);
        if tunnel {
            return Err(ProxyError::TunnelNotSupported);
        }

        let content_length = content_length(&request)?;
        if body.len() as u64 > content_length {
            debug!(
                %peer,
                dropped = body.len() as u64 - content_length,
                "discarding bytes past the request body"
            );
            // Bounded by body.len(), which fits in usize
            body.truncate(content_length as usize);
        }
        let remaining = content_length - body.len() as u64;

        let host = request
            .get(HeaderField::Host)
            .ok_or(ValidationError::MissingRequiredHeader(HeaderField::Host))?
            .to_string();
        let head = serialize(&mut request)?;

        let upstream = Self::connect_upstream(&host).await?;
        info!(
            %peer,
            host = %host,
            request_line = request.request_line().unwrap_or_default(),
            "forwarding request"
        );

        (&upstream).write_all(head.as_bytes()).await?;
        (&upstream).write_all(&body).await?;

        Ok(Self::relay(client, &upstream, remaining).await?)
    }

    /// Handles a single client connection from first byte to close.
    async fn handle_client(mut stream: TcpStream, peer: SocketAddr) {
        let err = match Self::forward(&mut stream, peer).await {
            Ok(received) => {
                debug!(%peer, bytes = received, "relay finished");
                return;
            }
            Err(err) => err,
        };

        match err {
            ProxyError::ConnectionClosed => {
                debug!(%peer, "client closed before sending a request")
            }
            ProxyError::Io(ref e) => warn!(%peer, error = %e, "I/O error while serving client"),
            ref e => warn!(%peer, error = %e, "rejecting request"),
        }

        if let Some(status) = err.into_http_status() {
            if let Err(e) = stream.write_all(error_response(status).as_bytes()).await {
                debug!(%peer, error = %e, "failed to send error response");
            }
        }
    }
}

/// Announced body size; zero when the request carries no `Content-Length`.
fn content_length(req: &Request) -> Result<u64, ProxyError> {
    match req.get(HeaderField::ContentLength) {
        Some(value) => value
            .parse::<u64>()
            .map_err(|_| ProxyError::InvalidContentLength(value.to_string())),
        None => Ok(0),
    }
}

/// `host[:port]` from a `Host` value, adding `default_port` when it has none.
fn upstream_address(host: &str, default_port: u16) -> String {
    let has_port = match host.rsplit_once(':') {
        Some(_) if host.ends_with(']') => false,
        Some((_, port)) => port.parse::<u16>().is_ok(),
        None => false,
    };

    if has_port {
        host.to_string()
    } else {
        format!("{host}:{default_port}")
    }
}
