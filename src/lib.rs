//! HTTP/1.x forwarding proxy.
//!
//! The [`http`] module holds the request core: a fixed-slot [`Request`](http::request::Request)
//! model, validation, origin-form rewriting and serialization. None of it
//! performs I/O or logs. The [`net`] module wires that core to sockets.

pub mod config;
pub mod http;
pub mod net;
