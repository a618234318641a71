use crate::network::error::Error;
use crate::network::{Close, Connect, Read, Write};
use core::fmt::Write as _;
use embedded_hal::delay::DelayNs;
use heapless::{String, Vec};

const MAX_REMOTE_LEN: usize = 96;
const MAX_LINE_LEN: usize = 128;
/// Shortest status line worth parsing: `HTTP/1.1 200`.
const MIN_STATUS_LINE_LEN: usize = 12;
const DRAIN_CHUNK_LEN: usize = 64;

/// The only status code for which a body is read.
pub const STATUS_OK: u16 = 200;

/// HTTP request methods supported by the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    /// `GET`
    Get,
    /// `POST`
    Post,
}

impl Method {
    /// The method token as it appears on the request line.
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
        }
    }
}

/// An extra request header, written after `User-Agent`.
#[derive(Debug, Clone, Copy)]
pub struct Header<'a> {
    /// Header name
    pub name: &'a str,
    /// Header value
    pub value: &'a str,
}

/// A request body that can be streamed in pieces.
///
/// The client first asks for [`content_length`](Payload::content_length) to
/// declare `Content-Length`, then calls [`emit`](Payload::emit) to push the
/// bytes onto the connection. Both walk the same sequence of chunks, which is
/// what keeps the declared length exact without buffering the body.
pub trait Payload {
    /// Feed every chunk of the body to `sink`, in order, stopping at the first
    /// error the sink returns.
    fn emit(&self, sink: &mut dyn FnMut(&[u8]) -> Result<(), Error>) -> Result<(), Error>;

    /// Total number of bytes [`emit`](Payload::emit) produces.
    fn content_length(&self) -> usize {
        let mut len = 0;
        // The counting sink never fails.
        let _ = self.emit(&mut |chunk: &[u8]| {
            len += chunk.len();
            Ok(())
        });
        len
    }
}

impl Payload for &[u8] {
    fn emit(&self, sink: &mut dyn FnMut(&[u8]) -> Result<(), Error>) -> Result<(), Error> {
        sink(*self)
    }

    fn content_length(&self) -> usize {
        self.len()
    }
}

impl Payload for &str {
    fn emit(&self, sink: &mut dyn FnMut(&[u8]) -> Result<(), Error>) -> Result<(), Error> {
        sink(self.as_bytes())
    }

    fn content_length(&self) -> usize {
        self.len()
    }
}

/// A request body together with its media type.
#[derive(Clone, Copy)]
pub struct Body<'a> {
    /// Value of the `Content-Type` header.
    pub content_type: &'a str,
    /// The bytes to send.
    pub payload: &'a dyn Payload,
}

impl core::fmt::Debug for Body<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Body")
            .field("content_type", &self.content_type)
            .field("content_length", &self.payload.content_length())
            .finish()
    }
}

/// A single HTTP request.
#[derive(Debug, Clone, Copy)]
pub struct Request<'a> {
    /// Request method
    pub method: Method,
    /// Origin-form request target, e.g. `/update`
    pub path: &'a str,
    /// Value of the `User-Agent` header
    pub user_agent: &'a str,
    /// Additional headers, written in order
    pub headers: &'a [Header<'a>],
    /// Optional body; `Content-Type` and `Content-Length` are derived from it
    pub body: Option<Body<'a>>,
}

/// Where requests are sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Endpoint<'a> {
    /// Host name, also sent as the `Host` header
    pub host: &'a str,
    /// TCP port
    pub port: u16,
    /// Address tried once, on the same port, when `host` refuses to connect
    pub fallback: Option<&'a str>,
}

impl<'a> Endpoint<'a> {
    /// An endpoint without a fallback address.
    pub const fn new(host: &'a str, port: u16) -> Self {
        Self {
            host,
            port,
            fallback: None,
        }
    }

    /// Adds a fallback address, typically the service's well-known IP.
    pub const fn with_fallback(mut self, address: &'a str) -> Self {
        self.fallback = Some(address);
        self
    }
}

/// Bounded-wait settings for reading a response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeouts {
    /// How long to wait for the status line and headers, and separately for the body.
    pub response_ms: u32,
    /// Sleep between polls of [`Read::available`].
    pub poll_interval_ms: u32,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            response_ms: 5000,
            poll_interval_ms: 10,
        }
    }
}

/// A parsed response.
///
/// For any status other than [`STATUS_OK`] the body is left empty: the status
/// code is the whole outcome.
#[derive(Debug)]
pub struct Response<const N: usize> {
    /// Status code from the status line
    pub status_code: u16,
    /// Exactly `Content-Length` bytes of body
    pub body: Vec<u8, N>,
}

impl<const N: usize> Response<N> {
    /// Whether the server answered `200`.
    pub fn is_success(&self) -> bool {
        self.status_code == STATUS_OK
    }

    /// The body as UTF-8 text.
    pub fn body_str(&self) -> Result<&str, Error> {
        core::str::from_utf8(&self.body).map_err(|_| Error::ProtocolError)
    }
}

/// Time left before a wait gives up.
struct Deadline {
    remaining_ms: u32,
    poll_ms: u32,
}

impl Deadline {
    fn new(timeouts: &Timeouts) -> Self {
        Self {
            remaining_ms: timeouts.response_ms,
            poll_ms: timeouts.poll_interval_ms.max(1),
        }
    }

    /// Sleep one poll interval, or fail if the budget is spent.
    fn wait<D: DelayNs>(&mut self, delay: &mut D) -> Result<(), Error> {
        if self.remaining_ms == 0 {
            return Err(Error::Timeout);
        }
        let step = self.poll_ms.min(self.remaining_ms);
        delay.delay_ms(step);
        self.remaining_ms -= step;
        Ok(())
    }
}

/// HTTP/1.1 client performing one request/response cycle per connection.
///
/// Every call to [`request`](Client::request) opens a connection through the
/// [`Connect`] implementation, writes the request, reads the response, drains
/// whatever is left on the wire and closes the connection, whatever the
/// outcome.
#[derive(Debug)]
pub struct Client<N: Connect, D: DelayNs> {
    network: N,
    delay: D,
    timeouts: Timeouts,
}

impl<N: Connect, D: DelayNs> Client<N, D> {
    /// Creates a client with the default [`Timeouts`].
    pub fn new(network: N, delay: D) -> Self {
        Self {
            network,
            delay,
            timeouts: Timeouts::default(),
        }
    }

    /// Replaces the timeouts.
    pub fn with_timeouts(mut self, timeouts: Timeouts) -> Self {
        self.timeouts = timeouts;
        self
    }

    /// Current timeouts.
    pub fn timeouts(&self) -> &Timeouts {
        &self.timeouts
    }

    /// Performs one request/response cycle.
    ///
    /// `B` is the capacity of the response body buffer.
    ///
    /// # Errors
    ///
    /// * [`Error::ConnectFailed`] / [`Error::InvalidAddress`] - no connection was made
    /// * [`Error::WriteError`] - the request could not be sent in full
    /// * [`Error::Timeout`] - the response or its body did not arrive in time
    /// * [`Error::ProtocolError`] - malformed status line or missing `Content-Length`
    /// * [`Error::BodyTooLarge`] - the declared body does not fit in `B` bytes
    /// * [`Error::ReadError`] / [`Error::ConnectionClosed`] - the transport failed mid-response
    ///
    /// A non-200 status is not an error: it is returned as the response's
    /// `status_code` with an empty body.
    pub fn request<const B: usize>(
        &mut self,
        endpoint: &Endpoint<'_>,
        request: &Request<'_>,
    ) -> Result<Response<B>, Error> {
        let mut connection = self.open(endpoint)?;
        debug!("{} {}", request.method.as_str(), request.path);

        let result = match write_request(&mut connection, endpoint.host, request) {
            Ok(()) => self.read_response(&mut connection),
            Err(e) => Err(e),
        };

        drain(&mut connection);
        if connection.close().is_err() {
            warn!("closing connection to {} failed", endpoint.host);
        }
        result
    }

    fn open(&mut self, endpoint: &Endpoint<'_>) -> Result<N::Connection, Error> {
        let remote = remote_address(endpoint.host, endpoint.port)?;
        match self.network.connect(&remote) {
            Ok(connection) => return Ok(connection),
            Err(_) => warn!("connect to {} failed", endpoint.host),
        }

        if let Some(fallback) = endpoint.fallback {
            let remote = remote_address(fallback, endpoint.port)?;
            match self.network.connect(&remote) {
                Ok(connection) => return Ok(connection),
                Err(_) => warn!("connect to fallback {} failed", fallback),
            }
        }
        Err(Error::ConnectFailed)
    }

    fn read_response<C: Read, const B: usize>(
        &mut self,
        connection: &mut C,
    ) -> Result<Response<B>, Error> {
        let mut deadline = Deadline::new(&self.timeouts);
        while available(connection)? < MIN_STATUS_LINE_LEN {
            deadline.wait(&mut self.delay)?;
        }

        let mut line: Vec<u8, MAX_LINE_LEN> = Vec::new();
        self.read_line(connection, &mut line, &mut deadline)?;
        let status_code = parse_status_line(&line)?;
        trace!("status {}", status_code);
        if status_code != STATUS_OK {
            return Ok(Response {
                status_code,
                body: Vec::new(),
            });
        }

        let mut content_length = None;
        loop {
            self.read_line(connection, &mut line, &mut deadline)?;
            if line.is_empty() {
                break;
            }
            if let Some(value) = header_value(&line, "Content-Length") {
                content_length = Some(parse_content_length(value)?);
            }
        }
        let length = content_length.ok_or(Error::ProtocolError)?;
        trace!("content length {}", length);

        let mut body: Vec<u8, B> = Vec::new();
        body.resize(length, 0).map_err(|_| Error::BodyTooLarge)?;

        let mut deadline = Deadline::new(&self.timeouts);
        let mut filled = 0;
        while filled < length {
            if available(connection)? == 0 {
                deadline.wait(&mut self.delay)?;
                continue;
            }
            match connection.read(&mut body[filled..]) {
                Ok(0) => return Err(Error::ConnectionClosed),
                Ok(n) => filled += n,
                Err(_) => return Err(Error::ReadError),
            }
        }

        Ok(Response { status_code, body })
    }

    /// Reads one line without its terminator. Bytes past the buffer capacity
    /// are dropped, the terminator is still consumed.
    fn read_line<C: Read, const L: usize>(
        &mut self,
        connection: &mut C,
        line: &mut Vec<u8, L>,
        deadline: &mut Deadline,
    ) -> Result<(), Error> {
        line.clear();
        loop {
            match self.read_byte(connection, deadline)? {
                b'\n' => break,
                byte => {
                    let _ = line.push(byte);
                }
            }
        }
        if line.last() == Some(&b'\r') {
            line.pop();
        }
        Ok(())
    }

    fn read_byte<C: Read>(&mut self, connection: &mut C, deadline: &mut Deadline) -> Result<u8, Error> {
        while available(connection)? == 0 {
            deadline.wait(&mut self.delay)?;
        }
        let mut byte = [0u8; 1];
        match connection.read(&mut byte) {
            Ok(1) => Ok(byte[0]),
            Ok(_) => Err(Error::ConnectionClosed),
            Err(_) => Err(Error::ReadError),
        }
    }
}

fn remote_address(host: &str, port: u16) -> Result<String<MAX_REMOTE_LEN>, Error> {
    let mut remote = String::new();
    write!(remote, "{}:{}", host, port).map_err(|_| Error::InvalidAddress)?;
    Ok(remote)
}

fn write_request<C: Write>(connection: &mut C, host: &str, request: &Request<'_>) -> Result<(), Error> {
    write_all(connection, request.method.as_str().as_bytes())?;
    write_all(connection, b" ")?;
    write_all(connection, request.path.as_bytes())?;
    write_all(connection, b" HTTP/1.1\r\n")?;

    write_header(connection, "Host", host)?;
    write_header(connection, "Connection", "close")?;
    write_header(connection, "User-Agent", request.user_agent)?;
    for header in request.headers {
        write_header(connection, header.name, header.value)?;
    }

    match request.body {
        Some(body) => {
            let mut length: String<20> = String::new();
            write!(length, "{}", body.payload.content_length()).map_err(|_| Error::WriteError)?;
            write_header(connection, "Content-Type", body.content_type)?;
            write_header(connection, "Content-Length", &length)?;
            write_all(connection, b"\r\n")?;
            body.payload
                .emit(&mut |chunk: &[u8]| write_all(connection, chunk))?;
        }
        None => write_all(connection, b"\r\n")?,
    }

    connection.flush().map_err(|_| Error::WriteError)
}

fn write_header<C: Write>(connection: &mut C, name: &str, value: &str) -> Result<(), Error> {
    write_all(connection, name.as_bytes())?;
    write_all(connection, b": ")?;
    write_all(connection, value.as_bytes())?;
    write_all(connection, b"\r\n")
}

/// Writes the whole buffer; a transport that accepts nothing is a failure.
fn write_all<C: Write>(connection: &mut C, mut buf: &[u8]) -> Result<(), Error> {
    while !buf.is_empty() {
        match connection.write(buf) {
            Ok(0) | Err(_) => return Err(Error::WriteError),
            Ok(n) => buf = &buf[n.min(buf.len())..],
        }
    }
    Ok(())
}

fn available<C: Read>(connection: &mut C) -> Result<usize, Error> {
    connection.available().map_err(|_| Error::ReadError)
}

/// Discards whatever is still buffered on the connection.
fn drain<C: Read>(connection: &mut C) {
    let mut scratch = [0u8; DRAIN_CHUNK_LEN];
    let mut discarded = 0;
    loop {
        match connection.available() {
            Ok(0) | Err(_) => break,
            Ok(n) => match connection.read(&mut scratch[..n.min(DRAIN_CHUNK_LEN)]) {
                Ok(0) | Err(_) => break,
                Ok(read) => discarded += read,
            },
        }
    }
    if discarded > 0 {
        trace!("discarded {} residual bytes", discarded);
    }
}

fn parse_status_line(line: &[u8]) -> Result<u16, Error> {
    let line = core::str::from_utf8(line).map_err(|_| Error::ProtocolError)?;
    let mut parts = line.splitn(3, ' ');

    let version = parts.next().ok_or(Error::ProtocolError)?;
    if !version.starts_with("HTTP/1.") {
        return Err(Error::ProtocolError);
    }

    let code = parts.next().ok_or(Error::ProtocolError)?;
    if code.len() != 3 || !code.bytes().all(|b| b.is_ascii_digit()) {
        return Err(Error::ProtocolError);
    }
    code.parse::<u16>().map_err(|_| Error::ProtocolError)
}

fn header_value<'l>(line: &'l [u8], name: &str) -> Option<&'l str> {
    let line = core::str::from_utf8(line).ok()?;
    let (key, value) = line.split_once(':')?;
    key.trim().eq_ignore_ascii_case(name).then(|| value.trim())
}

fn parse_content_length(value: &str) -> Result<usize, Error> {
    if value.is_empty() || !value.bytes().all(|b| b.is_ascii_digit()) {
        return Err(Error::ProtocolError);
    }
    value.parse::<usize>().map_err(|_| Error::ProtocolError)
}
