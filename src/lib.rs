//! # libthingspeak - ThingSpeak client for IoT devices
//!
//! A Rust client that lets microcontroller-class devices write time-series
//! readings to, and read them back from, a [ThingSpeak](https://thingspeak.com)
//! channel. It runs over a minimal byte-stream transport and a hand-rolled
//! HTTP/1.1 layer built on fixed-size buffers, so it fits `no_std` targets
//! without an allocator.
//!
//! ## Features
//!
//! ### Channel Client
//! - Write one field, or stage up to 8 fields plus location, status and
//!   timestamp and write them in a single update
//! - Read single fields as text, float, long or int
//! - Read the latest feed (all fields, status, location) into a local snapshot
//! - Distinct error codes for every failure, including rate-limit rejections
//!
//! ### Network Layer
//! - Transport-agnostic `Connect`/`Connection` traits
//! - HTTP/1.1 request writer and response reader with bounded waiting
//! - Optional `std::net` transport for Linux-class devices
//!
//! ## Usage
//!
//! Add this to your `Cargo.toml`:
//!
//! ```toml
//! [dependencies]
//! libthingspeak = "0.1.0"
//! ```
//!
//! ### Writing a Reading
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
//!
//! let mut client = Client::new(MockNetwork, NoDelay, Config::default());
//!
//! client.set_field(1, 23.5_f32).unwrap();
//! client.set_field(2, 48_i32).unwrap();
//! client.set_status("sensor ok").unwrap();
//!
//! // let entry_id = client.write_fields(12397, "XXXXXXXXXXXXXXXX")?;
//! ```
//!
//! ## Platform Support
//!
//! This library is designed to work on:
//! - Embedded microcontrollers (ARM Cortex-M, RISC-V, Xtensa)
//! - Linux-based IoT devices (Raspberry Pi, etc.)
//! - Any platform supporting Rust's `core` library
//!
//! ## Optional Features
//!
//! - `std`: Enable standard library support and the `std::net` transport
//! - `defmt`: Enable defmt logging support for embedded debugging
//! - `log`: Route diagnostics through the `log` facade

#![cfg_attr(not(any(feature = "std", test)), no_std)]
#![deny(missing_docs)]
#![warn(missing_debug_implementations)]

#[macro_use]
mod fmt;

/// Network abstraction layer: transport traits and the HTTP/1.1 adapter.
///
/// Everything the channel client needs from the outside world goes through the
/// traits defined here, so the same client runs on a Wi-Fi modem, an Ethernet
/// shield or a `std::net` socket.
pub mod network;

/// ThingSpeak channel client.
///
/// Value formatting, request building, feed parsing and the public
/// read/write API.
pub mod channel;
