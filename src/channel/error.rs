//! Error codes reported by the channel client

use crate::network::error::Error as NetworkError;

/// Status code the service uses for success.
pub const OK_SUCCESS: i32 = 200;

/// Everything that can go wrong in a channel operation.
///
/// Each variant maps onto the service's numeric status code through
/// [`Error::code`], so firmware that reports codes upstream can keep doing so.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Error {
    /// A value is out of range or a string is longer than 255 bytes.
    OutOfRange,
    /// The field number is not between 1 and 8.
    InvalidField,
    /// `write_fields` was called with nothing staged.
    NotStaged,
    /// No connection could be opened.
    ConnectFailed,
    /// The request could not be written, or the transport failed mid-response.
    UnexpectedFailure,
    /// The response could not be parsed.
    BadResponse,
    /// The server did not answer in time.
    Timeout,
    /// The server accepted the request but did not insert the entry, most
    /// likely because of the update rate limit.
    NotInserted,
    /// The server answered with a status other than 200.
    Http(u16),
}

impl Error {
    /// The numeric status code for this error.
    ///
    /// ```
    /// use libthingspeak::channel::Error;
    ///
    /// assert_eq!(Error::InvalidField.code(), -201);
    /// assert_eq!(Error::Http(404).code(), 404);
    /// ```
    pub fn code(&self) -> i32 {
        match self {
            Error::OutOfRange => -101,
            Error::InvalidField => -201,
            Error::NotStaged => -210,
            Error::ConnectFailed => -301,
            Error::UnexpectedFailure => -302,
            Error::BadResponse => -303,
            Error::Timeout => -304,
            Error::NotInserted => -401,
            Error::Http(status) => i32::from(*status),
        }
    }
}

impl From<NetworkError> for Error {
    fn from(error: NetworkError) -> Self {
        match error {
            NetworkError::ConnectFailed | NetworkError::InvalidAddress => Error::ConnectFailed,
            NetworkError::Timeout => Error::Timeout,
            NetworkError::ProtocolError | NetworkError::BodyTooLarge => Error::BadResponse,
            NetworkError::WriteError | NetworkError::ReadError | NetworkError::ConnectionClosed => {
                Error::UnexpectedFailure
            }
        }
    }
}

impl core::fmt::Display for Error {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Error::OutOfRange => f.write_str("value out of range or string too long"),
            Error::InvalidField => f.write_str("invalid field number"),
            Error::NotStaged => f.write_str("no fields staged for writing"),
            Error::ConnectFailed => f.write_str("failed to connect"),
            Error::UnexpectedFailure => f.write_str("unexpected transport failure"),
            Error::BadResponse => f.write_str("unable to parse response"),
            Error::Timeout => f.write_str("timeout waiting for server response"),
            Error::NotInserted => f.write_str("entry was not inserted"),
            Error::Http(status) => write!(f, "HTTP status {}", status),
        }
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for Error {
    fn format(&self, f: defmt::Formatter) {
        match self {
            Error::OutOfRange => defmt::write!(f, "OutOfRange"),
            Error::InvalidField => defmt::write!(f, "InvalidField"),
            Error::NotStaged => defmt::write!(f, "NotStaged"),
            Error::ConnectFailed => defmt::write!(f, "ConnectFailed"),
            Error::UnexpectedFailure => defmt::write!(f, "UnexpectedFailure"),
            Error::BadResponse => defmt::write!(f, "BadResponse"),
            Error::Timeout => defmt::write!(f, "Timeout"),
            Error::NotInserted => defmt::write!(f, "NotInserted"),
            Error::Http(status) => defmt::write!(f, "Http({})", status),
        }
    }
}
