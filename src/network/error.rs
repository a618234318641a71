//! Common error types for network operations

/// A common error type for network operations.
///
/// These are the failures the transport and the HTTP adapter can report. They
/// are deliberately coarse and `Copy` so they travel through `no_std` code
/// without allocation; the channel client maps them onto its own codes.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Error {
    /// Neither the host nor the fallback address accepted a connection.
    ConnectFailed,
    /// The remote address does not fit the address buffer.
    InvalidAddress,
    /// An error occurred during a write operation, or the transport accepted
    /// zero bytes.
    WriteError,
    /// An error occurred during a read operation.
    ReadError,
    /// The peer closed the connection in the middle of a response.
    ConnectionClosed,
    /// The response, or its body, did not arrive in time.
    Timeout,
    /// The response could not be parsed (bad status line, no `Content-Length`).
    ProtocolError,
    /// The declared body is larger than the receive buffer.
    BodyTooLarge,
}

#[cfg(feature = "defmt")]
impl defmt::Format for Error {
    fn format(&self, f: defmt::Formatter) {
        match self {
            Error::ConnectFailed => defmt::write!(f, "ConnectFailed"),
            Error::InvalidAddress => defmt::write!(f, "InvalidAddress"),
            Error::WriteError => defmt::write!(f, "WriteError"),
            Error::ReadError => defmt::write!(f, "ReadError"),
            Error::ConnectionClosed => defmt::write!(f, "ConnectionClosed"),
            Error::Timeout => defmt::write!(f, "Timeout"),
            Error::ProtocolError => defmt::write!(f, "ProtocolError"),
            Error::BodyTooLarge => defmt::write!(f, "BodyTooLarge"),
        }
    }
}
