//! # ThingSpeak channel client
//!
//! [`Client`] is the public face of the crate. It writes readings to a channel,
//! either one field at a time or as a staged multi-field update, and reads them
//! back as text or numbers.
//!
//! ## Writing
//!
//! Single writes go straight out. Multi-field writes are staged first with the
//! `set_*` methods and sent with [`Client::write_fields`]; the staged values are
//! cleared by the write whether it succeeds or not, so a failed update is never
//! resent by accident.
//!
//! A write that the server answers with entry ID `0` was not stored, most
//! often because the channel's update rate limit was hit. It is reported as
//! [`Error::NotInserted`]. Nothing is retried.
//!
//! ## Reading
//!
//! Reads return a `Result` and also remember their outcome, which
//! [`Client::last_read_status`] reports as the service's numeric code. That
//! status is how a caller tells an empty field from a failed read when it only
//! kept the value.
//!
//! [`Client::read_multiple_fields`] fetches the latest entry once and caches
//! it; the `field_as_*` accessors then read from that cache. A client built
//! with [`Client::new_compact`] has no cache and no multi-field read.
//!
//! ```rust,no_run
//! use libthingspeak::channel::{Client, Config};
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
//! let mut client = Client::new(MockNetwork, NoDelay, Config::default());
//!
//! match client.read_float_field(12397, 4, None) {
//!     Ok(temperature) => { /* use it */ }
//!     Err(e) => { let _code = e.code(); }
//! }
//! assert_eq!(client.last_read_status(), client.last_read_error().map_or(200, |e| e.code()));
//! ```

use crate::network::Connect;
use crate::network::application::http::{self, Body, Header, Method, Request, Response};
use core::fmt::Write as _;
use embedded_hal::delay::DelayNs;
use heapless::String;

/// Runtime configuration
pub mod config;
/// Status and error codes
pub mod error;
/// Latest-entry cache and key extraction
pub mod feed;
/// Number/text conversion
pub mod format;
/// Update request bodies
pub mod request;


pub use config::Config;
pub use error::{Error, OK_SUCCESS};
pub use feed::{Compact, FeedSnapshot};
pub use format::Value;
pub use request::{PendingUpdate, UpdateBody};

/// Number of fields in a channel.
pub const FIELD_COUNT: usize = 8;
/// Longest value a field holds, in UTF-8 bytes.
pub const FIELD_MAX_LEN: usize = 255;

/// Text of one field.
pub type FieldValue = String<FIELD_MAX_LEN>;
/// Identifier the service assigns to a stored entry.
pub type EntryId = u64;

/// Body capacity for a feed entry: eight full fields plus metadata and JSON.
const FEED_RESPONSE_LEN: usize = 4096;
const MAX_PATH_LEN: usize = 96;
const MAX_SUFFIX_LEN: usize = 24;
const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";
const API_KEY_HEADER: &str = "X-THINGSPEAKAPIKEY";

const FEED_SUFFIX: &str = "/feeds/last.txt";
const FEED_STATUS_SUFFIX: &str = "/feeds/last.txt?status=true";
const FEED_ALL_SUFFIX: &str = "/feeds/last.txt?status=true&location=true";

/// Wire names of the eight fields, in order.
pub(crate) const FIELD_NAMES: [&str; FIELD_COUNT] = [
    "field1", "field2", "field3", "field4", "field5", "field6", "field7", "field8",
];

/// Zero-based slot of a 1-based field number.
pub(crate) fn field_index(field: u32) -> Result<usize, Error> {
    match field {
        1..=8 => Ok(field as usize - 1),
        _ => Err(Error::InvalidField),
    }
}

/// Client for one ThingSpeak server.
///
/// Each network operation opens a connection, performs exactly one request,
/// and closes it again; the client holds no connection between calls. It is
/// not reentrant: share it between tasks only behind a lock held for the whole
/// call.
///
/// # Type Parameters
///
/// * `N` - the transport, implementing [`Connect`]
/// * `D` - the delay used while waiting for responses
/// * `S` - [`FeedSnapshot`] for a full client, [`Compact`] for one without
///   multi-field reads
#[derive(Debug)]
pub struct Client<'a, N: Connect, D: DelayNs, S = FeedSnapshot> {
    http: http::Client<N, D>,
    config: Config<'a>,
    pending: PendingUpdate,
    last_read: Result<(), Error>,
    feed: S,
}

impl<'a, N: Connect, D: DelayNs> Client<'a, N, D, FeedSnapshot> {
    /// Creates a client with multi-field read support.
    ///
    /// No network traffic happens until the first read or write.
    pub fn new(network: N, delay: D, config: Config<'a>) -> Self {
        Self::build(network, delay, config)
    }

    /// Fetches the latest entry, with status and location, into the feed
    /// snapshot.
    ///
    /// On failure the snapshot is emptied rather than left half-updated.
    pub fn read_multiple_fields(&mut self, channel: u32, read_key: Option<&str>) -> Result<(), Error> {
        debug!("read_multiple_fields channel {}", channel);
        let result = self
            .get_text::<FEED_RESPONSE_LEN>(channel, FEED_ALL_SUFFIX, read_key)
            .map(|payload| FeedSnapshot::parse(&payload));
        match self.record(result) {
            Ok(snapshot) => {
                self.feed = snapshot;
                Ok(())
            }
            Err(e) => {
                self.feed = FeedSnapshot::default();
                Err(e)
            }
        }
    }

    /// The cached feed entry.
    pub fn feed(&self) -> &FeedSnapshot {
        &self.feed
    }

    /// Cached text of field `field`.
    pub fn field_as_str(&self, field: u32) -> Result<&str, Error> {
        self.feed.field_as_str(field)
    }

    /// Cached field `field` as a float.
    pub fn field_as_float(&self, field: u32) -> Result<f32, Error> {
        self.feed.field_as_float(field)
    }

    /// Cached field `field` as a long.
    pub fn field_as_long(&self, field: u32) -> Result<i64, Error> {
        self.feed.field_as_long(field)
    }

    /// Cached field `field` as an int.
    pub fn field_as_int(&self, field: u32) -> Result<i32, Error> {
        self.feed.field_as_int(field)
    }

    /// Cached status message.
    pub fn status(&self) -> &str {
        self.feed.status()
    }

    /// Cached entry timestamp.
    pub fn created_at(&self) -> &str {
        self.feed.created_at()
    }

    /// Cached latitude.
    pub fn latitude(&self) -> f32 {
        self.feed.latitude()
    }

    /// Cached longitude.
    pub fn longitude(&self) -> f32 {
        self.feed.longitude()
    }

    /// Cached elevation.
    pub fn elevation(&self) -> f32 {
        self.feed.elevation()
    }
}

impl<'a, N: Connect, D: DelayNs> Client<'a, N, D, Compact> {
    /// Creates a client without multi-field read support, for targets that
    /// cannot spare the memory of a feed snapshot.
    pub fn new_compact(network: N, delay: D, config: Config<'a>) -> Self {
        Self::build(network, delay, config)
    }
}

impl<'a, N: Connect, D: DelayNs, S: Default> Client<'a, N, D, S> {
    fn build(network: N, delay: D, config: Config<'a>) -> Self {
        debug!("channel client for {}:{}", config.host, config.port);
        Self {
            http: http::Client::new(network, delay).with_timeouts(config.timeouts()),
            config,
            pending: PendingUpdate::default(),
            last_read: Ok(()),
            feed: S::default(),
        }
    }

    /// The configuration the client was built with.
    pub fn config(&self) -> &Config<'a> {
        &self.config
    }

    /// Drops staged values and resets the last read status to success.
    pub fn reset(&mut self) {
        self.pending.clear();
        self.last_read = Ok(());
    }

    /// Values staged for the next [`write_fields`](Client::write_fields).
    pub fn pending(&self) -> &PendingUpdate {
        &self.pending
    }

    /// Numeric status of the most recent read: [`OK_SUCCESS`] or an
    /// [`Error::code`].
    pub fn last_read_status(&self) -> i32 {
        match self.last_read {
            Ok(()) => OK_SUCCESS,
            Err(e) => e.code(),
        }
    }

    /// Error of the most recent read, if it failed.
    pub fn last_read_error(&self) -> Option<Error> {
        self.last_read.err()
    }

    /// Writes one value to field `field` (1-8) and returns the new entry ID.
    ///
    /// The field number and the value are checked before any connection is
    /// made.
    ///
    /// # Errors
    ///
    /// * [`Error::InvalidField`] - `field` is not 1-8
    /// * [`Error::OutOfRange`] - the value is too long or a float is out of range
    /// * [`Error::NotInserted`] - the server answered entry ID 0
    /// * any transport or HTTP error
    pub fn write_field<'v>(
        &mut self,
        channel: u32,
        field: u32,
        value: impl Into<Value<'v>>,
        write_key: &str,
    ) -> Result<EntryId, Error> {
        field_index(field)?;
        let text = self.render(value.into())?;
        debug!("write_field channel {} field {}", channel, field);
        let body = UpdateBody::field(field, &text)?;
        self.post_update(&body, write_key)
    }

    /// Stages a value for field `field` (1-8). No network traffic.
    pub fn set_field<'v>(&mut self, field: u32, value: impl Into<Value<'v>>) -> Result<(), Error> {
        field_index(field)?;
        let text = self.render(value.into())?;
        trace!("set_field {}", field);
        self.pending.set_field(field, text)
    }

    /// Stages the latitude in degrees; NaN unsets it.
    pub fn set_latitude(&mut self, latitude: f32) -> Result<(), Error> {
        self.pending.set_latitude(latitude)
    }

    /// Stages the longitude in degrees; NaN unsets it.
    pub fn set_longitude(&mut self, longitude: f32) -> Result<(), Error> {
        self.pending.set_longitude(longitude)
    }

    /// Stages the elevation in meters; NaN unsets it.
    pub fn set_elevation(&mut self, elevation: f32) -> Result<(), Error> {
        self.pending.set_elevation(elevation)
    }

    /// Stages a status message for the next update.
    pub fn set_status(&mut self, status: &str) -> Result<(), Error> {
        self.check_len(status)?;
        self.pending.set_status(status)
    }

    /// Stages an ISO 8601 timestamp for the next update, e.g.
    /// `2024-01-01T00:00:00Z`. Without one the server stamps the entry.
    pub fn set_created_at(&mut self, created_at: &str) -> Result<(), Error> {
        self.check_len(created_at)?;
        self.pending.set_created_at(created_at)
    }

    /// Sends everything staged as one update and returns the new entry ID.
    ///
    /// The staged values are cleared before the request goes out, so they are
    /// gone whether the write succeeds or fails.
    ///
    /// # Errors
    ///
    /// [`Error::NotStaged`] when nothing was staged, otherwise as
    /// [`write_field`](Client::write_field).
    pub fn write_fields(&mut self, channel: u32, write_key: &str) -> Result<EntryId, Error> {
        let pending = core::mem::take(&mut self.pending);
        let body = pending.body()?;
        debug!("write_fields channel {}", channel);
        self.post_update(&body, write_key)
    }

    /// Sends a caller-built parameter string, such as `field1=4&field3=7`, as
    /// an update. `headers=false` is appended.
    pub fn write_raw(&mut self, channel: u32, body: &str, write_key: &str) -> Result<EntryId, Error> {
        debug!("write_raw channel {} ({} bytes)", channel, body.len());
        self.post_update(&UpdateBody::Raw(body), write_key)
    }

    /// Reads the latest value of field `field` as text.
    pub fn read_string_field(
        &mut self,
        channel: u32,
        field: u32,
        read_key: Option<&str>,
    ) -> Result<FieldValue, Error> {
        let result = field_index(field).and_then(|_| {
            let mut suffix: String<MAX_SUFFIX_LEN> = String::new();
            write!(suffix, "/fields/{}/last", field).map_err(|_| Error::OutOfRange)?;
            debug!("read field {} of channel {}", field, channel);
            self.get_text::<FIELD_MAX_LEN>(channel, &suffix, read_key)
        });
        self.record(result)
    }

    /// Reads the latest value of field `field` as a float; non-numeric text
    /// reads as `0.0`.
    pub fn read_float_field(&mut self, channel: u32, field: u32, read_key: Option<&str>) -> Result<f32, Error> {
        self.read_string_field(channel, field, read_key)
            .map(|text| format::parse_float(&text))
    }

    /// Reads the latest value of field `field` as a long; non-numeric text
    /// reads as `0`.
    pub fn read_long_field(&mut self, channel: u32, field: u32, read_key: Option<&str>) -> Result<i64, Error> {
        self.read_string_field(channel, field, read_key)
            .map(|text| format::parse_long(&text))
    }

    /// Reads the latest value of field `field` as an int; non-numeric text
    /// reads as `0`.
    pub fn read_int_field(&mut self, channel: u32, field: u32, read_key: Option<&str>) -> Result<i32, Error> {
        self.read_string_field(channel, field, read_key)
            .map(|text| format::parse_int(&text))
    }

    /// Reads the status message of the latest entry; empty when it has none.
    pub fn read_status(&mut self, channel: u32, read_key: Option<&str>) -> Result<FieldValue, Error> {
        self.read_feed_value(channel, FEED_STATUS_SUFFIX, "status", read_key)
    }

    /// Reads the timestamp of the latest entry; empty when it has none.
    pub fn read_created_at(&mut self, channel: u32, read_key: Option<&str>) -> Result<FieldValue, Error> {
        self.read_feed_value(channel, FEED_SUFFIX, "created_at", read_key)
    }

    /// Reads `/channels/<channel><suffix>` and returns the body as text.
    ///
    /// `B` bounds the body; a longer body is a [`Error::BadResponse`].
    pub fn read_raw<const B: usize>(
        &mut self,
        channel: u32,
        suffix: &str,
        read_key: Option<&str>,
    ) -> Result<String<B>, Error> {
        debug!("read_raw channel {} {}", channel, suffix);
        let result = self.get_text::<B>(channel, suffix, read_key);
        self.record(result)
    }

    fn read_feed_value(
        &mut self,
        channel: u32,
        suffix: &str,
        key: &str,
        read_key: Option<&str>,
    ) -> Result<FieldValue, Error> {
        debug!("read {} of channel {}", key, channel);
        let result = self
            .get_text::<FEED_RESPONSE_LEN>(channel, suffix, read_key)
            .map(|payload| FieldValue::try_from(feed::extract(&payload, key)).unwrap_or_default());
        self.record(result)
    }

    fn render(&self, value: Value<'_>) -> Result<FieldValue, Error> {
        let text = value.render()?;
        self.check_len(&text)?;
        Ok(text)
    }

    fn check_len(&self, text: &str) -> Result<(), Error> {
        if text.len() > self.config.field_limit() {
            return Err(Error::OutOfRange);
        }
        Ok(())
    }

    fn record<T>(&mut self, result: Result<T, Error>) -> Result<T, Error> {
        self.last_read = match &result {
            Ok(_) => Ok(()),
            Err(e) => {
                warn!("read failed: {:?}", e);
                Err(*e)
            }
        };
        result
    }

    /// POSTs `body` to `/update` and interprets the entry ID.
    fn post_update(&mut self, body: &UpdateBody<'_>, write_key: &str) -> Result<EntryId, Error> {
        let headers = [Header {
            name: API_KEY_HEADER,
            value: write_key,
        }];
        let request = Request {
            method: Method::Post,
            path: "/update",
            user_agent: self.config.user_agent,
            headers: &headers,
            body: Some(Body {
                content_type: FORM_CONTENT_TYPE,
                payload: body,
            }),
        };
        let response = self.send::<FIELD_MAX_LEN>(&request)?;
        let entry_id = format::parse_long(response.body_str()?);
        if entry_id <= 0 {
            warn!("update was not inserted");
            return Err(Error::NotInserted);
        }
        debug!("inserted entry {}", entry_id);
        Ok(entry_id as EntryId)
    }

    fn get_text<const B: usize>(
        &mut self,
        channel: u32,
        suffix: &str,
        read_key: Option<&str>,
    ) -> Result<String<B>, Error> {
        let mut path: String<MAX_PATH_LEN> = String::new();
        write!(path, "/channels/{}{}", channel, suffix).map_err(|_| Error::OutOfRange)?;

        let key_header = read_key.map(|key| Header {
            name: API_KEY_HEADER,
            value: key,
        });
        let request = Request {
            method: Method::Get,
            path: &path,
            user_agent: self.config.user_agent,
            headers: key_header.as_slice(),
            body: None,
        };
        let response = self.send::<B>(&request)?;
        String::from_utf8(response.body).map_err(|_| Error::BadResponse)
    }

    /// One request/response cycle; anything but 200 is an error.
    fn send<const B: usize>(&mut self, request: &Request<'_>) -> Result<Response<B>, Error> {
        let endpoint = self.config.endpoint();
        let response = self.http.request::<B>(&endpoint, request)?;
        if !response.is_success() {
            warn!("server answered {}", response.status_code);
            return Err(Error::Http(response.status_code));
        }
        Ok(response)
    }
}
