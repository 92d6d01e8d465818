//! End-to-end tests through libcurl against local servers.

use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::thread;
use std::time::Duration;

use curlreq::{Client, FetchError, HeaderRetention, RequestSpec, TransferCode, ValidationError};

/// Serve `responses` in order, one per connection, returning each raw request.
fn serve(responses: Vec<String>) -> (String, thread::JoinHandle<Vec<String>>) {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let base_url = format!("http://{}", listener.local_addr().unwrap());

    let handle = thread::spawn(move || {
        let mut requests = Vec::new();
        for response in responses {
            let (mut socket, _) = listener.accept().unwrap();
            requests.push(read_request(&mut socket));
            let _ = socket.write_all(response.as_bytes());
        }
        requests
    });
    (base_url, handle)
}

fn read_request(socket: &mut TcpStream) -> String {
    socket
        .set_read_timeout(Some(Duration::from_secs(5)))
        .unwrap();
    let mut data = Vec::new();
    let mut buf = [0u8; 4096];
    loop {
        let n = socket.read(&mut buf).unwrap_or(0);
        if n == 0 {
            break;
        }
        data.extend_from_slice(&buf[..n]);
        let text = String::from_utf8_lossy(&data);
        if let Some(end) = text.find("\r\n\r\n") {
            let length = text[..end]
                .lines()
                .find_map(|l| {
                    l.split_once(':')
                        .filter(|(n, _)| n.eq_ignore_ascii_case("content-length"))
                        .and_then(|(_, v)| v.trim().parse::<usize>().ok())
                })
                .unwrap_or(0);
            if data.len() >= end + 4 + length {
                break;
            }
        }
    }
    String::from_utf8_lossy(&data).into_owned()
}

#[test]
fn test_get_against_local_server() {
    let (base_url, server) = serve(vec![
        "HTTP/1.1 200 OK\r\nContent-Type: text/plain\r\nX-Test: one\r\nX-Test: two\r\nContent-Length: 2\r\nConnection: close\r\n\r\nhi"
            .to_string(),
    ]);

    let spec = RequestSpec::new()
        .with_url(&format!("{}/hello", base_url))
        .unwrap()
        .with_header("X-Custom", "value")
        .with_timeout(5);
    let resp = Client::new().fetch(&spec).unwrap();

    assert_eq!(resp.status(), 200);
    assert_eq!(resp.status_text(), "OK");
    assert_eq!(resp.version(), Some("1.1"));
    assert_eq!(resp.text().unwrap(), "hi");
    assert_eq!(resp.content_type(), Some("text/plain"));
    assert_eq!(resp.headers().get("X-Test").unwrap(), &["one", "two"]);
    assert_eq!(resp.request_headers().get("X-Custom").unwrap(), &["value"]);
    assert!(resp.header_size() > 0);
    assert!(resp.release_transport());

    let requests = server.join().unwrap();
    assert!(requests[0].starts_with("GET /hello HTTP/1.1"));
    assert!(requests[0].contains("X-Custom: value"));
}

#[test]
fn test_post_json_against_local_server() {
    let (base_url, server) = serve(vec![
        "HTTP/1.1 201 Created\r\nContent-Length: 0\r\nConnection: close\r\n\r\n".to_string(),
    ]);

    let spec = RequestSpec::new()
        .with_url(&format!("{}/items", base_url))
        .unwrap()
        .with_timeout(5)
        .post_json(r#"{"a":1}"#);
    let resp = Client::new().fetch(&spec).unwrap();
    assert_eq!(resp.status(), 201);
    assert_eq!(resp.status_text(), "Created");

    let requests = server.join().unwrap();
    assert!(requests[0].starts_with("POST /items HTTP/1.1"));
    assert!(requests[0].contains("Content-Type: application/json"));
    assert!(requests[0].ends_with(r#"{"a":1}"#));
}

#[test]
fn test_redirect_not_followed_by_default() {
    let (base_url, server) = serve(vec![format!(
        "HTTP/1.1 302 Found\r\nLocation: {}/next\r\nContent-Length: 0\r\nConnection: close\r\n\r\n",
        "http://127.0.0.1:1"
    )]);

    let spec = RequestSpec::new()
        .with_url(&format!("{}/start", base_url))
        .unwrap()
        .with_timeout(5);
    let resp = Client::new().fetch(&spec).unwrap();

    assert_eq!(resp.status(), 302);
    assert_eq!(resp.redirect_count(), 0);
    assert_eq!(resp.redirect_url(), Some("http://127.0.0.1:1/next"));
    server.join().unwrap();
}

#[test]
fn test_redirect_followed() {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let base_url = format!("http://{}", listener.local_addr().unwrap());
    let location = format!("{}/target", base_url);

    let server = thread::spawn(move || {
        let responses = [
            format!(
                "HTTP/1.1 301 Moved Permanently\r\nLocation: {}\r\nContent-Length: 0\r\nConnection: close\r\n\r\n",
                location
            ),
            "HTTP/1.1 200 OK\r\nContent-Length: 6\r\nConnection: close\r\n\r\nTARGET".to_string(),
        ];
        for response in responses {
            let (mut socket, _) = listener.accept().unwrap();
            read_request(&mut socket);
            let _ = socket.write_all(response.as_bytes());
        }
    });

    let spec = RequestSpec::new()
        .with_url(&format!("{}/start", base_url))
        .unwrap()
        .with_auto_redirect(true)
        .with_timeout(5);
    let resp = Client::new().fetch(&spec).unwrap();

    assert_eq!(resp.status(), 200);
    assert_eq!(resp.redirect_count(), 1);
    assert!(resp.url().ends_with("/target"));
    assert_eq!(resp.text().unwrap(), "TARGET");
    assert!(resp.raw_headers().contains("301 Moved Permanently"));
    assert!(resp.headers().contains("Location"));
    server.join().unwrap();
}

#[test]
fn test_closed_port_is_network_error() {
    let port = {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };

    let spec = RequestSpec::new()
        .with_url(&format!("http://127.0.0.1:{}/", port))
        .unwrap()
        .with_timeout(5);
    let err = Client::new().fetch(&spec).unwrap_err();

    assert!(err.is_network(), "{err:?}");
    assert!(matches!(
        err,
        FetchError::Network {
            code: TransferCode::CouldntConnect,
            ..
        }
    ));
}

#[test]
fn test_header_size_covers_final_attempt_only() {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let base_url = format!("http://{}", listener.local_addr().unwrap());

    let server = thread::spawn(move || {
        // First connection: half a response head, then silence until the client gives up.
        let (mut stalled, _) = listener.accept().unwrap();
        read_request(&mut stalled);
        let _ = stalled.write_all(b"HTTP/1.1 200 OK\r\nX-Slow: 1\r\n");
        let staller = thread::spawn(move || {
            thread::sleep(Duration::from_secs(3));
            drop(stalled);
        });

        let (mut socket, _) = listener.accept().unwrap();
        read_request(&mut socket);
        let _ = socket.write_all(b"HTTP/1.1 200 OK\r\nContent-Length: 2\r\nConnection: close\r\n\r\nok");
        staller.join().unwrap();
    });

    let spec = RequestSpec::new()
        .with_url(&format!("{}/slow", base_url))
        .unwrap()
        .with_timeout(1)
        .with_retry(1);
    let client = Client::builder()
        .header_retention(HeaderRetention::ResetPerAttempt)
        .build();
    let resp = client.fetch(&spec).unwrap();

    assert_eq!(resp.status(), 200);
    assert_eq!(resp.text().unwrap(), "ok");
    assert!(!resp.headers().contains("X-Slow"));
    assert_eq!(resp.header_size(), resp.raw_headers().len() as u64);
    server.join().unwrap();
}

#[test]
fn test_malformed_urls_fail_before_transfer() {
    for bad in [
        "http://exa\nmple.com/",
        "http://example.com/a b",
        "http:example.com",
        "  http://example.com/",
    ] {
        let err = Client::new()
            .fetch_with(&RequestSpec::new(), Some(bad), None, None)
            .unwrap_err();
        assert!(
            matches!(err, FetchError::Validation(ValidationError::InvalidUrl(_))),
            "{bad:?}: {err:?}"
        );
    }
}
