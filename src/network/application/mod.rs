//! # Application Layer Network Protocols
//!
//! Application layer (OSI Layer 7) protocols built on the core network traits.
//!
//! - **[`http`]**: HTTP/1.1 request/response cycle for RESTful services
//!
//! Protocol clients here are connection agnostic (they work with any type
//! implementing [`Connect`](crate::network::Connect)), allocate nothing, and
//! read into fixed-size buffers whose capacity is chosen by the caller.

/// HTTP client implementation.
///
/// Sends one GET or POST per connection and reads a `Content-Length` framed
/// response with bounded waiting.
pub mod http;
