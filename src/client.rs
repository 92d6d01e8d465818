//! HTTP client with builder pattern.
//!
//! A [`Client`] turns a [`RequestSpec`] into a [`Response`]. It holds the
//! process-wide pieces every fetch shares: the transport, the certificate
//! source, default transport options and the header retention policy.
//!
//! # Example
//!
//! ```rust,ignore
//! use curlreq::{Client, RequestSpec};
//!
//! let client = Client::new();
//! let spec = RequestSpec::new()
//!     .with_url("https://example.com")?
//!     .with_default_user_agent()
//!     .with_retry(2);
//!
//! let resp = client.fetch(&spec)?;
//! println!("{} {}", resp.status(), resp.status_text());
//! ```

use std::sync::Arc;

use crate::base::neterror::{FetchError, ValidationError};
use crate::http::requestbody::RequestData;
use crate::http::response::Response;
use crate::http::retry::{HeaderRetention, RetryConfig};
use crate::http::transaction::{build_options, FetchTarget, HttpTransaction};
use crate::tls::{CertificateSource, NoCertificates};
use crate::transport::{CurlTransport, OptionId, OptionValue, Transport, TransportOptions};
use crate::urlrequest::{parse_method, validate_url, RequestSpec};

/// Executes request specs.
///
/// Use [`Client::builder()`] to configure one; [`Client::new()`] gives a
/// libcurl-backed client with peer verification off.
pub struct Client<T: Transport = CurlTransport> {
    transport: Arc<T>,
    certificates: Arc<dyn CertificateSource>,
    options: TransportOptions,
    header_retention: HeaderRetention,
}

impl<T: Transport> Clone for Client<T> {
    fn clone(&self) -> Self {
        Self {
            transport: self.transport.clone(),
            certificates: self.certificates.clone(),
            options: self.options.clone(),
            header_retention: self.header_retention,
        }
    }
}

impl<T: Transport> std::fmt::Debug for Client<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("options", &self.options)
            .field("header_retention", &self.header_retention)
            .finish_non_exhaustive()
    }
}

impl Default for Client {
    fn default() -> Self {
        Self::new()
    }
}

impl Client {
    /// Create a new client with default settings.
    pub fn new() -> Self {
        Self::builder().build()
    }

    /// Create a new client builder.
    pub fn builder() -> ClientBuilder {
        ClientBuilder::default()
    }
}

impl<T: Transport> Client<T> {
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Execute `spec` as built.
    pub fn fetch(&self, spec: &RequestSpec) -> Result<Response, FetchError> {
        self.fetch_with(spec, None, None, None)
    }

    /// Execute `spec`, overriding its URL, method or body for this call only.
    pub fn fetch_with(
        &self,
        spec: &RequestSpec,
        url: Option<&str>,
        method: Option<&str>,
        data: Option<RequestData>,
    ) -> Result<Response, FetchError> {
        let target = resolve_target(spec, url, method, data)?;
        let options = build_options(
            spec,
            &target,
            &self.options,
            self.certificates.ca_bundle(),
        );

        let retry = RetryConfig::with_retries(spec.retry()).header_retention(self.header_retention);
        let mut txn = HttpTransaction::new(self.transport.open(), retry);
        txn.configure(&options)?;

        tracing::debug!(
            url = %target.url,
            method = target.method.as_ref().map(|m| m.as_str()).unwrap_or("default"),
            max_attempts = retry.max_attempts,
            "fetch started"
        );

        let outcome = txn.start();
        let attempts = txn.attempts();
        let result = txn.into_response(outcome, &target, spec);

        match &result {
            Ok(resp) => tracing::debug!(
                url = %resp.url(),
                status = resp.status(),
                attempts,
                "fetch finished"
            ),
            Err(e) => tracing::debug!(url = %target.url, attempts, error = %e, "fetch failed"),
        }
        result
    }
}

fn resolve_target(
    spec: &RequestSpec,
    url: Option<&str>,
    method: Option<&str>,
    data: Option<RequestData>,
) -> Result<FetchTarget, ValidationError> {
    let url = url.or(spec.url()).ok_or(ValidationError::NoUrl)?;
    validate_url(url)?;

    let method = match method {
        Some(m) => Some(parse_method(m)?),
        None => spec.method().cloned(),
    };
    let body = match data {
        Some(data) => Some(data.encode()),
        None => spec.body().map(str::to_owned),
    };

    Ok(FetchTarget {
        url: url.to_string(),
        method,
        body,
    })
}

/// Builder for creating a [`Client`].
pub struct ClientBuilder<T: Transport = CurlTransport> {
    transport: T,
    certificates: Arc<dyn CertificateSource>,
    options: TransportOptions,
    header_retention: HeaderRetention,
}

impl Default for ClientBuilder {
    fn default() -> Self {
        Self {
            transport: CurlTransport::new(),
            certificates: Arc::new(NoCertificates),
            options: TransportOptions::new(),
            header_retention: HeaderRetention::default(),
        }
    }
}

impl<T: Transport> ClientBuilder<T> {
    /// Swap the transport backend.
    pub fn transport<U: Transport>(self, transport: U) -> ClientBuilder<U> {
        ClientBuilder {
            transport,
            certificates: self.certificates,
            options: self.options,
            header_retention: self.header_retention,
        }
    }

    /// Set where CA bundles come from.
    pub fn certificates<C: CertificateSource + 'static>(mut self, source: C) -> Self {
        self.certificates = Arc::new(source);
        self
    }

    /// Set a default transport option, applied under each request's own options.
    pub fn option(mut self, id: OptionId, value: impl Into<OptionValue>) -> Self {
        self.options.set(id, value);
        self
    }

    pub fn options(mut self, options: &TransportOptions) -> Self {
        self.options.merge(options);
        self
    }

    /// Set what happens to headers of a timed-out attempt that is retried.
    pub fn header_retention(mut self, retention: HeaderRetention) -> Self {
        self.header_retention = retention;
        self
    }

    /// Build the client.
    pub fn build(self) -> Client<T> {
        Client {
            transport: Arc::new(self.transport),
            certificates: self.certificates,
            options: self.options,
            header_retention: self.header_retention,
        }
    }
}
