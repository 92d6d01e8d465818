//! The response envelope.
//!
//! A [`Response`] is a frozen snapshot of one finished exchange. Scalars are
//! copied out of the transport when the transfer completes; the body stays in
//! its spool and is read on demand. The envelope also owns the transport
//! handle until [`Response::release_transport`] or drop.

use std::fmt;
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::base::neterror::FetchError;
use crate::http::orderedheaders::HeaderList;
use crate::http::reason::reason_phrase;
use crate::http::responsebody::ResponseBody;
use crate::transport::TransferHandle;
use crate::urlrequest::RequestSpec;

/// Everything the executor collected, before it is frozen into a [`Response`].
#[derive(Default)]
pub struct ResponseParts {
    pub url: Option<String>,
    pub status: Option<u32>,
    pub version: Option<String>,
    pub content_type: Option<String>,
    pub redirect_count: u32,
    pub redirect_url: Option<String>,
    pub headers: HeaderList,
    pub header_size: u64,
    pub request_headers: HeaderList,
    pub raw_headers: String,
    pub exec_succeeded: bool,
    pub transport_error: String,
    pub transport_errno: i32,
    pub body: Option<ResponseBody>,
    pub transport: Option<Box<dyn TransferHandle>>,
    pub request: Option<RequestSpec>,
}

/// Immutable snapshot of a completed HTTP exchange.
pub struct Response {
    url: String,
    status: u32,
    status_text: &'static str,
    version: Option<String>,
    content_type: Option<String>,
    redirect_count: u32,
    redirect_url: Option<String>,
    headers: HeaderList,
    header_size: u64,
    request_headers: HeaderList,
    raw_headers: String,
    exec_succeeded: bool,
    transport_error: String,
    transport_errno: i32,
    request: RequestSpec,
    body: Mutex<ResponseBody>,
    transport: Mutex<Option<Box<dyn TransferHandle>>>,
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

impl Response {
    /// Freeze collected parts.
    ///
    /// Fails with [`FetchError::Metadata`] when the URL, status, body or
    /// originating request is missing. The transport handle is optional so
    /// envelopes can be built around bodies that never touched a transport.
    pub fn from_parts(parts: ResponseParts) -> Result<Self, FetchError> {
        let ResponseParts {
            url,
            status,
            version,
            content_type,
            redirect_count,
            redirect_url,
            headers,
            header_size,
            request_headers,
            raw_headers,
            exec_succeeded,
            transport_error,
            transport_errno,
            body,
            transport,
            request,
        } = parts;

        let url = url.ok_or(FetchError::Metadata("url"))?;
        let status = status.ok_or(FetchError::Metadata("status"))?;
        let body = body.ok_or(FetchError::Metadata("body"))?;
        let request = request.ok_or(FetchError::Metadata("request"))?;

        Ok(Self {
            url,
            status,
            status_text: reason_phrase(status),
            version,
            content_type,
            redirect_count,
            redirect_url,
            headers,
            header_size,
            request_headers,
            raw_headers,
            exec_succeeded,
            transport_error,
            transport_errno,
            request,
            body: Mutex::new(body),
            transport: Mutex::new(transport),
        })
    }

    /// Final URL after any redirects.
    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn status(&self) -> u32 {
        self.status
    }

    /// Reason phrase for [`status`](Self::status).
    pub fn status_text(&self) -> &'static str {
        self.status_text
    }

    /// HTTP version from the last status line, as `major.minor`.
    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    pub fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }

    pub fn redirect_count(&self) -> u32 {
        self.redirect_count
    }

    /// Where the transport would have gone next when redirects are not followed.
    pub fn redirect_url(&self) -> Option<&str> {
        self.redirect_url.as_deref()
    }

    pub fn headers(&self) -> &HeaderList {
        &self.headers
    }

    /// First value of `name`, compared case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get_ignore_case(name)
    }

    pub fn header_size(&self) -> u64 {
        self.header_size
    }

    /// Headers the transport actually put on the wire.
    pub fn request_headers(&self) -> &HeaderList {
        &self.request_headers
    }

    /// Every header byte received, status lines and blank terminators included.
    pub fn raw_headers(&self) -> &str {
        &self.raw_headers
    }

    pub fn exec_succeeded(&self) -> bool {
        self.exec_succeeded
    }

    pub fn transport_error(&self) -> &str {
        &self.transport_error
    }

    pub fn transport_errno(&self) -> i32 {
        self.transport_errno
    }

    pub fn request(&self) -> &RequestSpec {
        &self.request
    }

    /// Whole body, read from the start. Safe to call repeatedly.
    pub fn contents(&self) -> Result<Vec<u8>, FetchError> {
        lock(&self.body).read_all()
    }

    /// Body decoded as UTF-8, with invalid sequences replaced.
    pub fn text(&self) -> Result<String, FetchError> {
        let bytes = self.contents()?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    #[cfg(feature = "json")]
    pub fn json<T: serde::de::DeserializeOwned>(&self) -> Result<T, FetchError> {
        let bytes = self.contents()?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    /// Close the body stream. Returns `false` if it was already closed.
    pub fn close_body(&self) -> bool {
        lock(&self.body).close()
    }

    /// Close the transport handle. Returns `false` if it was already released.
    pub fn release_transport(&self) -> bool {
        let handle = lock(&self.transport).take();
        match handle {
            Some(mut handle) => {
                handle.close();
                tracing::trace!(url = %self.url, "transport released");
                true
            }
            None => false,
        }
    }
}

impl fmt::Debug for Response {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Response")
            .field("url", &self.url)
            .field("status", &self.status)
            .field("version", &self.version)
            .field("headers", &self.headers)
            .finish_non_exhaustive()
    }
}

impl fmt::Display for Response {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.contents() {
            Ok(bytes) => f.write_str(&String::from_utf8_lossy(&bytes)),
            Err(_) => Ok(()),
        }
    }
}

impl Drop for Response {
    fn drop(&mut self) {
        let transport = self
            .transport
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner);
        if let Some(mut handle) = transport.take() {
            handle.close();
        }
        self.body
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner)
            .close();
    }
}
