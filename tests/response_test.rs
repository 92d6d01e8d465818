//! Tests for the response envelope.

use std::io::{self, Cursor, Read, Seek, SeekFrom};

use curlreq::http::{ResponseBody, ResponseParts};
use curlreq::{FetchError, HeaderList, RequestSpec, Response};

/// A stream that reads once and refuses to rewind.
struct OneShot(Cursor<Vec<u8>>);

impl Read for OneShot {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.0.read(buf)
    }
}

impl Seek for OneShot {
    fn seek(&mut self, _: SeekFrom) -> io::Result<u64> {
        Err(io::Error::new(io::ErrorKind::Unsupported, "pipe"))
    }
}

fn parts(body: ResponseBody) -> ResponseParts {
    ResponseParts {
        url: Some("https://example.com/final".into()),
        status: Some(200),
        version: Some("2.0".into()),
        content_type: Some("text/plain; charset=utf-8".into()),
        redirect_count: 2,
        redirect_url: None,
        headers: HeaderList::from([("Content-Type", "text/plain; charset=utf-8"), ("Set-Cookie", "a=1")]),
        header_size: 120,
        request_headers: HeaderList::from([("Host", "example.com")]),
        raw_headers: "HTTP/2 200\r\n".into(),
        exec_succeeded: true,
        body: Some(body),
        request: Some(RequestSpec::new().with_url("https://example.com/start").unwrap()),
        ..Default::default()
    }
}

#[test]
fn test_accessors() {
    let resp = Response::from_parts(parts(ResponseBody::new(Cursor::new(b"body".to_vec())))).unwrap();

    assert_eq!(resp.url(), "https://example.com/final");
    assert_eq!(resp.request().url(), Some("https://example.com/start"));
    assert_eq!(resp.status(), 200);
    assert_eq!(resp.status_text(), "OK");
    assert_eq!(resp.version(), Some("2.0"));
    assert_eq!(resp.redirect_count(), 2);
    assert_eq!(resp.redirect_url(), None);
    assert_eq!(resp.header_size(), 120);
    assert_eq!(resp.header("set-cookie"), Some("a=1"));
    assert_eq!(resp.request_headers().get("Host").unwrap(), &["example.com"]);
    assert_eq!(resp.transport_error(), "");
}

#[test]
fn test_contents_is_idempotent() {
    let resp = Response::from_parts(parts(ResponseBody::new(Cursor::new(b"abc".to_vec())))).unwrap();
    assert_eq!(resp.contents().unwrap(), b"abc");
    assert_eq!(resp.contents().unwrap(), b"abc");
    assert_eq!(resp.text().unwrap(), "abc");
    assert_eq!(format!("{}", resp), "abc");
}

#[test]
fn test_unseekable_body() {
    let resp = Response::from_parts(parts(ResponseBody::new(OneShot(Cursor::new(b"abc".to_vec()))))).unwrap();
    assert!(matches!(resp.contents(), Err(FetchError::Stream(_))));
    assert_eq!(resp.to_string(), "");
}

#[test]
fn test_lossy_text() {
    let resp = Response::from_parts(parts(ResponseBody::new(Cursor::new(vec![b'o', b'k', 0xff])))).unwrap();
    assert_eq!(resp.text().unwrap(), "ok\u{fffd}");
}

#[test]
fn test_close_body_twice() {
    let resp = Response::from_parts(parts(ResponseBody::new(Cursor::new(b"abc".to_vec())))).unwrap();
    assert!(resp.close_body());
    assert!(!resp.close_body());
    assert!(resp.contents().is_err());
}

#[test]
fn test_metadata_required() {
    let err = Response::from_parts(ResponseParts {
        request: None,
        ..parts(ResponseBody::new(Cursor::new(Vec::new())))
    })
    .unwrap_err();
    assert!(matches!(err, FetchError::Metadata("request")));
    assert_eq!(err.to_string(), "Invalid metadata provided: missing request");

    let err = Response::from_parts(ResponseParts {
        body: None,
        ..parts(ResponseBody::new(Cursor::new(Vec::new())))
    })
    .unwrap_err();
    assert!(matches!(err, FetchError::Metadata("body")));
}

#[test]
fn test_response_is_send_and_sync() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<Response>();
    assert_send_sync::<RequestSpec>();
    assert_send_sync::<curlreq::Client>();
}
