mod mock;

use libthingspeak::channel::UpdateBody;
use libthingspeak::network::application::http::{
    Body, Client, Endpoint, Header, Method, Payload, Request, Timeouts,
};
use libthingspeak::network::error::Error;
use mock::{CountingDelay, MockNetwork, ok};

fn get(path: &str) -> Request<'_> {
    Request {
        method: Method::Get,
        path,
        user_agent: "test/1.0",
        headers: &[],
        body: None,
    }
}

#[test]
fn get_request_wire_format() {
    let network = MockNetwork::new();
    network.respond_ok("hello");
    let mut client = Client::new(network.clone(), CountingDelay::default());

    let response = client
        .request::<32>(&Endpoint::new("example.com", 8080), &get("/ping"))
        .unwrap();

    assert!(response.is_success());
    assert_eq!(response.body_str(), Ok("hello"));
    assert_eq!(network.attempts(), vec!["example.com:8080"]);
    assert_eq!(
        network.last_request(),
        "GET /ping HTTP/1.1\r\nHost: example.com\r\nConnection: close\r\nUser-Agent: test/1.0\r\n\r\n"
    );
}

#[test]
fn extra_headers_come_before_the_body_headers() {
    let network = MockNetwork::new();
    network.respond_ok("1");
    let mut client = Client::new(network.clone(), CountingDelay::default());
    let headers = [Header {
        name: "X-Extra",
        value: "yes",
    }];
    let request = Request {
        method: Method::Post,
        path: "/submit",
        user_agent: "test/1.0",
        headers: &headers,
        body: Some(Body {
            content_type: "text/plain",
            payload: &"abc",
        }),
    };

    client.request::<8>(&Endpoint::new("example.com", 80), &request).unwrap();
    assert_eq!(
        network.last_request(),
        "POST /submit HTTP/1.1\r\nHost: example.com\r\nConnection: close\r\nUser-Agent: test/1.0\r\n\
         X-Extra: yes\r\nContent-Type: text/plain\r\nContent-Length: 3\r\n\r\nabc"
    );
}

#[test]
fn byte_payloads_are_sent_unchanged() {
    let network = MockNetwork::new();
    network.respond_ok("1");
    let mut client = Client::new(network.clone(), CountingDelay::default());
    let bytes: &[u8] = b"field1=1&headers=false";
    let request = Request {
        method: Method::Post,
        path: "/update",
        user_agent: "test/1.0",
        headers: &[],
        body: Some(Body {
            content_type: "application/x-www-form-urlencoded",
            payload: &bytes,
        }),
    };

    client.request::<8>(&Endpoint::new("example.com", 80), &request).unwrap();
    assert_eq!(bytes.content_length(), 22);
    assert!(network.last_request().ends_with("Content-Length: 22\r\n\r\nfield1=1&headers=false"));
}

#[test]
fn declared_length_matches_streamed_body() {
    let network = MockNetwork::new();
    network.respond_ok("1");
    let mut client = Client::new(network.clone(), CountingDelay::default());
    let payload = UpdateBody::Raw("field1=1&status=caf%C3%A9");
    let request = Request {
        method: Method::Post,
        path: "/update",
        user_agent: "test/1.0",
        headers: &[],
        body: Some(Body {
            content_type: "application/x-www-form-urlencoded",
            payload: &payload,
        }),
    };

    client.request::<8>(&Endpoint::new("example.com", 80), &request).unwrap();

    let sent = network.last_request();
    let (head, body) = sent.split_once("\r\n\r\n").unwrap();
    assert!(head.ends_with(&format!("Content-Length: {}", body.len())));
    assert_eq!(body.len(), payload.content_length());
}

#[test]
fn non_success_status_returns_an_empty_body() {
    let network = MockNetwork::new();
    network.respond("HTTP/1.1 401 Unauthorized\r\nContent-Length: 2\r\n\r\n-1");
    let mut client = Client::new(network.clone(), CountingDelay::default());

    let response = client.request::<8>(&Endpoint::new("example.com", 80), &get("/")).unwrap();
    assert_eq!(response.status_code, 401);
    assert!(!response.is_success());
    assert!(response.body.is_empty());
    assert_eq!(network.unread(), 0);
}

#[test]
fn bare_line_feeds_are_tolerated() {
    let network = MockNetwork::new();
    network.respond("HTTP/1.1 200 OK\nContent-Length: 2\n\nok");
    let mut client = Client::new(network.clone(), CountingDelay::default());

    let response = client.request::<8>(&Endpoint::new("example.com", 80), &get("/")).unwrap();
    assert_eq!(response.body_str(), Ok("ok"));
}

#[test]
fn body_larger_than_buffer_is_rejected() {
    let network = MockNetwork::new();
    network.respond_ok("0123456789");
    let mut client = Client::new(network.clone(), CountingDelay::default());

    let result = client.request::<4>(&Endpoint::new("example.com", 80), &get("/"));
    assert_eq!(result.unwrap_err(), Error::BodyTooLarge);
    assert_eq!(network.closed(), 1);
    assert_eq!(network.unread(), 0);
}

#[test]
fn malformed_status_line_is_a_protocol_error() {
    let network = MockNetwork::new();
    network.respond("SSH-2.0-OpenSSH_9.6\r\n\r\n");
    let mut client = Client::new(network.clone(), CountingDelay::default());

    let result = client.request::<8>(&Endpoint::new("example.com", 80), &get("/"));
    assert_eq!(result.unwrap_err(), Error::ProtocolError);
}

#[test]
fn timeouts_bound_the_wait() {
    let network = MockNetwork::new();
    network.respond("HTTP/1.1 200");
    let delay = CountingDelay::default();
    let mut client = Client::new(network.clone(), delay.clone()).with_timeouts(Timeouts {
        response_ms: 30,
        poll_interval_ms: 7,
    });

    let result = client.request::<8>(&Endpoint::new("example.com", 80), &get("/"));
    assert_eq!(result.unwrap_err(), Error::Timeout);
    assert_eq!(delay.total_ms(), 30);
    assert_eq!(network.closed(), 1);
}

#[test]
fn fallback_is_tried_on_the_same_port() {
    let network = MockNetwork::new();
    network.refuse("example.com:8080");
    network.respond(ok("x"));
    let mut client = Client::new(network.clone(), CountingDelay::default());
    let endpoint = Endpoint::new("example.com", 8080).with_fallback("10.0.0.1");

    client.request::<8>(&endpoint, &get("/")).unwrap();
    assert_eq!(network.attempts(), vec!["example.com:8080", "10.0.0.1:8080"]);
}

#[test]
fn oversized_host_is_an_invalid_address() {
    let network = MockNetwork::new();
    let host = "h".repeat(120);
    let mut client = Client::new(network.clone(), CountingDelay::default());

    let result = client.request::<8>(&Endpoint::new(&host, 80), &get("/"));
    assert_eq!(result.unwrap_err(), Error::InvalidAddress);
    assert!(network.attempts().is_empty());
}
