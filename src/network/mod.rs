//! A network abstraction layer for embedded systems
//!
//! This module defines the small set of traits the channel client consumes from
//! a byte-stream transport: open a connection, write bytes, ask how many bytes
//! are waiting, read them, and close. Anything from an AT-command Wi-Fi modem to
//! a `std::net::TcpStream` can implement them.
//!
//! Connections are single-use: [`Connect::connect`] hands out a fresh
//! [`Connection`] and [`Close::close`] consumes it, so a finished request can
//! never be written to again.

#![deny(unsafe_code)]

/// Common error types for network operations
pub mod error;

/// Protocol-specific client implementations
pub mod application;

/// `std::net` transport for hosted targets
#[cfg(feature = "std")]
pub mod tcp;

/// Re-exports of common traits
pub mod prelude {
    pub use super::{Close, Connect, Connection, Read, Write};
}

/// The read half of a connection.
pub trait Read {
    /// Associated error type
    type Error: core::fmt::Debug;
    /// Read data from the connection.
    ///
    /// Reads at most `buf.len()` bytes and returns how many were read. Callers
    /// only invoke this once [`available`](Read::available) reports data, so an
    /// implementation may block until at least one byte arrives.
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error>;
    /// Number of bytes that can be read right now without blocking.
    fn available(&mut self) -> Result<usize, Self::Error>;
}

/// The write half of a connection.
pub trait Write {
    /// Associated error type
    type Error: core::fmt::Debug;
    /// Write data to the connection, returning how many bytes were accepted.
    fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error>;
    /// Flush the write buffer
    fn flush(&mut self) -> Result<(), Self::Error>;
}

/// Tears a connection down.
pub trait Close {
    /// Associated error type
    type Error: core::fmt::Debug;
    /// Close the connection
    fn close(self) -> Result<(), Self::Error>;
}

/// A synchronous connection
pub trait Connection: Read + Write + Close {}

/// A synchronous connector (client)
pub trait Connect {
    /// Associated connection type
    type Connection: Connection;
    /// Associated error type
    type Error: core::fmt::Debug;
    /// Open a connection to `remote`, given as `host:port`.
    fn connect(&mut self, remote: &str) -> Result<Self::Connection, Self::Error>;
}
