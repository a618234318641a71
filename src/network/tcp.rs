//! `std::net` transport for Linux-class devices and host-side testing.
//!
//! [`TcpNetwork`] implements [`Connect`] over blocking [`TcpStream`]s;
//! [`StdDelay`] implements [`DelayNs`] with [`thread::sleep`]. Together they let
//! the channel client run unchanged on a Raspberry Pi or a development machine.

use super::{Close, Connect, Connection, Read, Write};
use ::std::io::{self, ErrorKind, Read as _, Write as _};
use ::std::net::{Shutdown, TcpStream, ToSocketAddrs};
use ::std::thread;
use ::std::time::Duration;
use embedded_hal::delay::DelayNs;

/// Bytes peeked to answer [`Read::available`].
const PEEK_LEN: usize = 512;

/// Opens plain TCP connections.
#[derive(Debug, Clone, Copy)]
pub struct TcpNetwork {
    connect_timeout: Duration,
}

impl Default for TcpNetwork {
    fn default() -> Self {
        Self::new()
    }
}

impl TcpNetwork {
    /// A connector with a 10 second connect timeout.
    pub fn new() -> Self {
        Self {
            connect_timeout: Duration::from_secs(10),
        }
    }

    /// Sets the connect timeout, applied to each resolved address in turn.
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }
}

impl Connect for TcpNetwork {
    type Connection = TcpConnection;
    type Error = io::Error;

    fn connect(&mut self, remote: &str) -> Result<TcpConnection, io::Error> {
        let mut last_error = io::Error::new(ErrorKind::NotFound, "no address resolved");
        for address in remote.to_socket_addrs()? {
            match TcpStream::connect_timeout(&address, self.connect_timeout) {
                Ok(stream) => {
                    stream.set_nodelay(true)?;
                    return Ok(TcpConnection { stream });
                }
                Err(e) => last_error = e,
            }
        }
        Err(last_error)
    }
}

/// One open TCP connection.
#[derive(Debug)]
pub struct TcpConnection {
    stream: TcpStream,
}

impl Connection for TcpConnection {}

impl Read for TcpConnection {
    type Error = io::Error;

    fn read(&mut self, buf: &mut [u8]) -> Result<usize, io::Error> {
        self.stream.read(buf)
    }

    fn available(&mut self) -> Result<usize, io::Error> {
        let mut scratch = [0u8; PEEK_LEN];
        self.stream.set_nonblocking(true)?;
        let peeked = self.stream.peek(&mut scratch);
        self.stream.set_nonblocking(false)?;
        match peeked {
            Ok(n) => Ok(n),
            Err(e) if e.kind() == ErrorKind::WouldBlock => Ok(0),
            Err(e) => Err(e),
        }
    }
}

impl Write for TcpConnection {
    type Error = io::Error;

    fn write(&mut self, buf: &[u8]) -> Result<usize, io::Error> {
        self.stream.write(buf)
    }

    fn flush(&mut self) -> Result<(), io::Error> {
        self.stream.flush()
    }
}

impl Close for TcpConnection {
    type Error = io::Error;

    fn close(self) -> Result<(), io::Error> {
        match self.stream.shutdown(Shutdown::Both) {
            Err(e) if e.kind() != ErrorKind::NotConnected => Err(e),
            _ => Ok(()),
        }
    }
}

/// [`DelayNs`] backed by [`thread::sleep`].
#[derive(Debug, Clone, Copy, Default)]
pub struct StdDelay;

impl DelayNs for StdDelay {
    fn delay_ns(&mut self, ns: u32) {
        thread::sleep(Duration::from_nanos(u64::from(ns)));
    }
}
