//! Scripted transport shared by the integration tests.
//!
//! A [`MockNetwork`] hands out connections that replay queued responses and
//! record every byte written to them. Clones share state, so a test keeps one
//! clone to inspect traffic after giving the other to a client.

#![allow(dead_code)]

use embedded_hal::delay::DelayNs;
use libthingspeak::network::{Close, Connect, Connection, Read, Write};
use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

#[derive(Debug, Default)]
struct State {
    responses: VecDeque<Vec<u8>>,
    refused: Vec<String>,
    fail_writes: bool,
    attempts: Vec<String>,
    requests: Vec<Vec<u8>>,
    closed: usize,
    unread: usize,
}

#[derive(Debug, Clone, Default)]
pub struct MockNetwork {
    state: Rc<RefCell<State>>,
}

impl MockNetwork {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues the raw bytes the next connection will read.
    pub fn respond(&self, response: impl Into<Vec<u8>>) {
        self.state.borrow_mut().responses.push_back(response.into());
    }

    /// Queues a `200 OK` with `body` and a matching `Content-Length`.
    pub fn respond_ok(&self, body: &str) {
        self.respond(ok(body));
    }

    /// Makes every connect to `remote` fail.
    pub fn refuse(&self, remote: &str) {
        self.state.borrow_mut().refused.push(remote.to_string());
    }

    /// Makes every write fail.
    pub fn fail_writes(&self) {
        self.state.borrow_mut().fail_writes = true;
    }

    /// Remotes passed to `connect`, in order.
    pub fn attempts(&self) -> Vec<String> {
        self.state.borrow().attempts.clone()
    }

    /// Everything written on each closed connection.
    pub fn requests(&self) -> Vec<String> {
        self.state
            .borrow()
            .requests
            .iter()
            .map(|bytes| String::from_utf8_lossy(bytes).into_owned())
            .collect()
    }

    /// The most recent request.
    pub fn last_request(&self) -> String {
        self.requests().pop().unwrap_or_default()
    }

    pub fn closed(&self) -> usize {
        self.state.borrow().closed
    }

    /// Bytes left unread on closed connections.
    pub fn unread(&self) -> usize {
        self.state.borrow().unread
    }
}

impl Connect for MockNetwork {
    type Connection = MockConnection;
    type Error = ();

    fn connect(&mut self, remote: &str) -> Result<MockConnection, ()> {
        let mut state = self.state.borrow_mut();
        state.attempts.push(remote.to_string());
        if state.refused.iter().any(|refused| refused == remote) {
            return Err(());
        }
        let inbound = state.responses.pop_front().unwrap_or_default();
        Ok(MockConnection {
            state: Rc::clone(&self.state),
            inbound,
            position: 0,
            outbound: Vec::new(),
        })
    }
}

#[derive(Debug)]
pub struct MockConnection {
    state: Rc<RefCell<State>>,
    inbound: Vec<u8>,
    position: usize,
    outbound: Vec<u8>,
}

impl Connection for MockConnection {}

impl Read for MockConnection {
    type Error = ();

    fn read(&mut self, buf: &mut [u8]) -> Result<usize, ()> {
        let rest = &self.inbound[self.position..];
        let len = buf.len().min(rest.len());
        buf[..len].copy_from_slice(&rest[..len]);
        self.position += len;
        Ok(len)
    }

    fn available(&mut self) -> Result<usize, ()> {
        Ok(self.inbound.len() - self.position)
    }
}

impl Write for MockConnection {
    type Error = ();

    fn write(&mut self, buf: &[u8]) -> Result<usize, ()> {
        if self.state.borrow().fail_writes {
            return Err(());
        }
        self.outbound.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> Result<(), ()> {
        Ok(())
    }
}

impl Close for MockConnection {
    type Error = ();

    fn close(self) -> Result<(), ()> {
        let mut state = self.state.borrow_mut();
        state.requests.push(self.outbound);
        state.closed += 1;
        state.unread += self.inbound.len() - self.position;
        Ok(())
    }
}

/// Delay that only adds up how long it was asked to sleep.
#[derive(Debug, Clone, Default)]
pub struct CountingDelay {
    total_ns: Rc<RefCell<u64>>,
}

impl CountingDelay {
    pub fn total_ms(&self) -> u64 {
        *self.total_ns.borrow() / 1_000_000
    }
}

impl DelayNs for CountingDelay {
    fn delay_ns(&mut self, ns: u32) {
        *self.total_ns.borrow_mut() += u64::from(ns);
    }
}

/// A complete `200 OK` response carrying `body`.
pub fn ok(body: &str) -> String {
    format!(
        "HTTP/1.1 200 OK\r\nContent-Type: text/plain; charset=utf-8\r\nContent-Length: {}\r\n\r\n{}",
        body.len(),
        body
    )
}
