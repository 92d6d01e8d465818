//! One HTTP exchange driven over a transport handle.
//!
//! The transaction owns the handle for the whole exchange: it applies the
//! merged option layers, runs the transfer (repeating it while it times out),
//! rebuilds status, version and headers from the raw header lines, and finally
//! moves the handle and the spooled body into a [`Response`].

use std::path::PathBuf;

use http::Method;

use crate::base::neterror::{FetchError, TransferCode, ValidationError};
use crate::http::headercodec::{parse_header_text, parse_line, to_wire_lines, HeaderLine};
use crate::http::orderedheaders::HeaderList;
use crate::http::response::{Response, ResponseParts};
use crate::http::responsebody::SpooledBody;
use crate::http::retry::{HeaderRetention, RetryConfig};
use crate::transport::{OptionId, OptionValue, TransferHandle, TransferOutcome, TransferSink, TransportOptions};
use crate::urlrequest::RequestSpec;

/// The resolved URL, method and body of a fetch, after call-site overrides.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchTarget {
    pub url: String,
    pub method: Option<Method>,
    pub body: Option<String>,
}

/// Options every transfer starts from, before cookies, TLS and caller layers.
pub fn default_options() -> TransportOptions {
    [
        (OptionId::ReturnTransfer, OptionValue::Bool(true)),
        (OptionId::Encoding, OptionValue::from("gzip,deflate")),
        (OptionId::FollowLocation, OptionValue::Bool(false)),
        (OptionId::AutoReferer, OptionValue::Bool(true)),
        (OptionId::CookieFile, OptionValue::from("")),
        (OptionId::HeaderOut, OptionValue::Bool(true)),
    ]
    .into_iter()
    .collect()
}

/// Merge every option layer, lowest precedence first:
/// header list, defaults, cookie jar, TLS, client defaults, the request's own
/// options, then the resolved target.
pub fn build_options(
    spec: &RequestSpec,
    target: &FetchTarget,
    client_options: &TransportOptions,
    ca_bundle: Option<PathBuf>,
) -> TransportOptions {
    let mut options = TransportOptions::new();

    if !spec.headers().is_empty() {
        options.set(OptionId::HttpHeader, to_wire_lines(spec.headers()));
    }

    options.merge(&default_options());

    if let Some(jar) = spec.cookie_jar() {
        options.set(OptionId::CookieFile, jar.to_path_buf());
        options.set(OptionId::CookieJar, jar.to_path_buf());
    }

    match ca_bundle {
        Some(bundle) => {
            options.set(OptionId::CaInfo, bundle);
            options.set(OptionId::SslVerifyPeer, true);
        }
        None => options.set(OptionId::SslVerifyPeer, false),
    }

    options.merge(client_options);
    options.merge(spec.options());

    options.set(OptionId::Url, target.url.as_str());
    if let Some(method) = &target.method {
        options.set(OptionId::CustomRequest, method.as_str());
    }
    if let Some(body) = &target.body {
        options.set(OptionId::PostFields, body.as_str());
    }
    options
}

/// Collects the raw header lines and body bytes of a transfer.
#[derive(Debug, Default)]
pub struct ResponseSink {
    status: Option<u16>,
    version: Option<String>,
    headers: HeaderList,
    raw_headers: String,
    body: SpooledBody,
}

impl ResponseSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn status(&self) -> Option<u16> {
        self.status
    }

    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    pub fn headers(&self) -> &HeaderList {
        &self.headers
    }

    /// Prepare for another attempt on the same handle.
    fn reset(&mut self, retention: HeaderRetention) -> std::io::Result<()> {
        if retention == HeaderRetention::ResetPerAttempt {
            self.status = None;
            self.version = None;
            self.headers = HeaderList::new();
            self.raw_headers.clear();
        }
        self.body.reset()
    }
}

impl TransferSink for ResponseSink {
    fn header(&mut self, line: &[u8]) -> usize {
        let text = String::from_utf8_lossy(line);
        self.raw_headers.push_str(&text);

        match parse_line(&text) {
            HeaderLine::Status(status) => {
                tracing::trace!(status = status.status, version = %status.version, "status line");
                self.status = Some(status.status);
                self.version = Some(status.version);
            }
            HeaderLine::Field { name, value } => {
                tracing::trace!(name, value, "response header");
                self.headers.append(name, value);
            }
            HeaderLine::Ignored => {}
        }
        line.len()
    }

    fn write(&mut self, chunk: &[u8]) -> usize {
        self.body.write_chunk(chunk)
    }
}

/// Drives one fetch over a configured handle.
pub struct HttpTransaction<H: TransferHandle> {
    handle: H,
    retry: RetryConfig,
    sink: ResponseSink,
    attempts: u32,
}

impl<H: TransferHandle + 'static> HttpTransaction<H> {
    pub fn new(handle: H, retry: RetryConfig) -> Self {
        Self {
            handle,
            retry,
            sink: ResponseSink::new(),
            attempts: 0,
        }
    }

    /// Apply every option to the handle, in key order.
    pub fn configure(&mut self, options: &TransportOptions) -> Result<(), ValidationError> {
        for (id, value) in options.iter() {
            self.handle.set_option(id, value)?;
        }
        Ok(())
    }

    /// Number of transfers performed so far.
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    /// Run the transfer, repeating it while it times out and retries remain.
    pub fn start(&mut self) -> TransferOutcome {
        loop {
            if self.attempts > 0 {
                if let Err(e) = self.sink.reset(self.retry.header_retention) {
                    return TransferOutcome::failed(
                        TransferCode::WriteError,
                        format!("could not rewind body for retry: {}", e),
                    );
                }
            }
            self.attempts += 1;

            let outcome = self.handle.perform(&mut self.sink);
            let code = outcome.code();
            if !self.retry.should_retry(self.attempts, code) {
                return outcome;
            }
            tracing::warn!(
                attempt = self.attempts,
                max_attempts = self.retry.max_attempts,
                error = %outcome.error,
                "transfer timed out, retrying"
            );
        }
    }

    /// Freeze the exchange into a [`Response`], or classify its failure.
    pub fn into_response(
        mut self,
        outcome: TransferOutcome,
        target: &FetchTarget,
        spec: &RequestSpec,
    ) -> Result<Response, FetchError> {
        if outcome.errno != 0 {
            self.handle.close();
            return Err(FetchError::from_transfer(spec, outcome.code(), outcome.error));
        }

        let info = self.handle.info();
        let request_headers = info
            .header_out
            .as_deref()
            .map(parse_header_text)
            .unwrap_or_default();

        let status = match info.response_code {
            0 => u32::from(self.sink.status.unwrap_or(0)),
            code => code,
        };
        let header_size = match info.header_size {
            0 => self.sink.raw_headers.len() as u64,
            size => size,
        };
        let ResponseSink {
            version,
            headers,
            raw_headers,
            body,
            ..
        } = self.sink;

        Response::from_parts(ResponseParts {
            url: Some(info.effective_url.unwrap_or_else(|| target.url.clone())),
            status: Some(status),
            version,
            content_type: info.content_type.filter(|c| !c.is_empty()),
            redirect_count: info.redirect_count,
            redirect_url: info.redirect_url.filter(|u| !u.is_empty()),
            headers,
            header_size,
            request_headers,
            raw_headers,
            exec_succeeded: outcome.succeeded,
            transport_error: outcome.error,
            transport_errno: outcome.errno,
            body: Some(body.into_body()),
            transport: Some(Box::new(self.handle)),
            request: Some(spec.clone()),
        })
    }
}
