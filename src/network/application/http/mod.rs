//! HTTP/1.1 protocol implementation for embedded systems.
//!
//! This module provides a lightweight HTTP client designed for embedded systems
//! and `no_std` environments. It focuses on predictable memory usage and on
//! never leaving a connection half-used.
//!
//! # Features
//!
//! - One request per connection, `Connection: close`, no keep-alive
//! - Request bodies are streamed from a [`Payload`](client::Payload), so the
//!   whole body never has to sit in memory next to the headers
//! - Status line, `Content-Length` and body parsed with a bounded wait on the
//!   transport, driven by an [`embedded_hal::delay::DelayNs`]
//! - Residual bytes drained and the connection closed on every outcome
//!
//! # Usage
//!
//! ```rust,no_run
//! use libthingspeak::network::application::http::{Client, Endpoint, Header, Method, Request};
//! # use libthingspeak::network::{Close, Connect, Connection, Read, Write};
//! # struct MockConnection;
//! # impl Connection for MockConnection {}
//! # impl Read for MockConnection {
//! #     type Error = ();
//! #     fn read(&mut self, _buf: &mut [u8]) -> Result<usize, Self::Error> { Ok(0) }
//! #     fn available(&mut self) -> Result<usize, Self::Error> { Ok(0) }
//! # }
//! # impl Write for MockConnection {
//! #     type Error = ();
//! #     fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error> { Ok(buf.len()) }
//! #     fn flush(&mut self) -> Result<(), Self::Error> { Ok(()) }
//! # }
//! # impl Close for MockConnection {
//! #     type Error = ();
//! #     fn close(self) -> Result<(), Self::Error> { Ok(()) }
//! # }
//! # struct MockNetwork;
//! # impl Connect for MockNetwork {
//! #     type Connection = MockConnection;
//! #     type Error = ();
//! #     fn connect(&mut self, _remote: &str) -> Result<MockConnection, ()> { Ok(MockConnection) }
//! # }
//! # struct NoDelay;
//! # impl embedded_hal::delay::DelayNs for NoDelay { fn delay_ns(&mut self, _ns: u32) {} }
//!
//! let mut client = Client::new(MockNetwork, NoDelay);
//! let endpoint = Endpoint::new("api.thingspeak.com", 80);
//! let request = Request {
//!     method: Method::Get,
//!     path: "/channels/12397/fields/1/last",
//!     user_agent: "example/1.0",
//!     headers: &[],
//!     body: None,
//! };
//!
//! // let response = client.request::<512>(&endpoint, &request)?;
//! ```

/// HTTP client implementation and supporting types.
pub mod client;

pub use client::{Body, Client, Endpoint, Header, Method, Payload, Request, Response, Timeouts};
