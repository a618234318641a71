//! Runtime configuration of the channel client

use super::FIELD_MAX_LEN;
use crate::network::application::http::{Endpoint, Timeouts};

/// Host name of the public ThingSpeak service.
pub const DEFAULT_HOST: &str = "api.thingspeak.com";
/// Well-known address of the public service, tried when DNS fails.
pub const DEFAULT_FALLBACK_ADDRESS: &str = "184.106.153.149";
/// Plain HTTP port.
pub const PORT: u16 = 80;
/// Port for a transport that wraps the connection in TLS.
pub const SECURE_PORT: u16 = 443;
/// `User-Agent` sent with every request.
pub const DEFAULT_USER_AGENT: &str = "tslib-rust/0.1";
/// How long to wait for the server to respond.
pub const DEFAULT_RESPONSE_TIMEOUT_MS: u32 = 5000;
/// Sleep between polls of the transport while waiting.
pub const DEFAULT_POLL_INTERVAL_MS: u32 = 10;

/// Where and how the client talks to the service.
///
/// ```
/// use libthingspeak::channel::Config;
///
/// let config = Config {
///     host: "thingspeak.internal",
///     fallback_address: None,
///     port: 3000,
///     ..Config::default()
/// };
/// assert_eq!(config.response_timeout_ms, 5000);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config<'a> {
    /// Host name, also sent as the `Host` header.
    pub host: &'a str,
    /// Address tried once when `host` cannot be reached.
    pub fallback_address: Option<&'a str>,
    /// TCP port.
    pub port: u16,
    /// `User-Agent` header value.
    pub user_agent: &'a str,
    /// Wait budget for the response headers, and again for the body.
    pub response_timeout_ms: u32,
    /// Sleep between polls of the transport.
    pub poll_interval_ms: u32,
    /// Longest field, status or timestamp text accepted, in bytes. Values above
    /// 255 are treated as 255.
    pub max_field_len: usize,
}

impl Default for Config<'_> {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST,
            fallback_address: Some(DEFAULT_FALLBACK_ADDRESS),
            port: PORT,
            user_agent: DEFAULT_USER_AGENT,
            response_timeout_ms: DEFAULT_RESPONSE_TIMEOUT_MS,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            max_field_len: FIELD_MAX_LEN,
        }
    }
}

impl<'a> Config<'a> {
    /// The public service on the secure port. The transport is expected to
    /// perform the TLS handshake.
    pub fn secure() -> Self {
        Self {
            port: SECURE_PORT,
            ..Self::default()
        }
    }

    /// A self-hosted server, without fallback address.
    pub fn custom(host: &'a str, port: u16) -> Self {
        Self {
            host,
            fallback_address: None,
            port,
            ..Self::default()
        }
    }

    pub(crate) fn endpoint(&self) -> Endpoint<'a> {
        Endpoint {
            host: self.host,
            port: self.port,
            fallback: self.fallback_address,
        }
    }

    pub(crate) fn timeouts(&self) -> Timeouts {
        Timeouts {
            response_ms: self.response_timeout_ms,
            poll_interval_ms: self.poll_interval_ms,
        }
    }

    pub(crate) fn field_limit(&self) -> usize {
        self.max_field_len.min(FIELD_MAX_LEN)
    }
}
