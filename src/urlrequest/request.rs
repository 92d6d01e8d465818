//! Immutable request description.
//!
//! Every `with_*` call returns a fresh [`RequestSpec`] and leaves the receiver
//! untouched, so a base spec can be shared and specialized freely.

use std::path::{Path, PathBuf};

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use http::Method;
use url::Url;
use zeroize::Zeroizing;

use crate::base::context::{ensure_writable_dir, IoResultExt};
use crate::base::neterror::ValidationError;
use crate::http::headercodec::parse_header_text;
use crate::http::orderedheaders::HeaderList;
use crate::http::requestbody::RequestData;
use crate::transport::{OptionId, OptionValue, TransportOptions};

/// Crate version, for callers that want it in their own user agent.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Firefox ESR user agent used by [`RequestSpec::with_default_user_agent`].
pub const USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:68.0) Gecko/20100101 Firefox/68.0";

/// Methods a request may carry.
pub const VALID_METHODS: [Method; 9] = [
    Method::GET,
    Method::HEAD,
    Method::POST,
    Method::PUT,
    Method::DELETE,
    Method::CONNECT,
    Method::OPTIONS,
    Method::TRACE,
    Method::PATCH,
];

const PROXY_PROTOCOLS: [&str; 4] = ["http", "https", "socks4", "socks5"];

/// Check that `url` is absolute with a scheme and a host.
///
/// The input is taken verbatim: whitespace and control characters are
/// rejected rather than stripped or percent-encoded, and the scheme must be
/// followed by `://`.
pub fn validate_url(url: &str) -> Result<Url, ValidationError> {
    let invalid = || ValidationError::InvalidUrl(url.to_string());

    if url.chars().any(|c| c.is_ascii_whitespace() || c.is_control()) {
        return Err(invalid());
    }
    let parsed = Url::parse(url).map_err(|_| invalid())?;
    if !url[parsed.scheme().len()..].starts_with("://") {
        return Err(invalid());
    }
    match parsed.host_str() {
        Some(host) if !host.is_empty() => Ok(parsed),
        _ => Err(invalid()),
    }
}

/// Parse a method name case-insensitively, accepting only [`VALID_METHODS`].
pub fn parse_method(method: &str) -> Result<Method, ValidationError> {
    let upper = method.to_ascii_uppercase();
    VALID_METHODS
        .iter()
        .find(|m| m.as_str() == upper)
        .cloned()
        .ok_or_else(|| ValidationError::InvalidMethod(upper))
}

/// Description of one HTTP call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestSpec {
    url: Option<String>,
    method: Option<Method>,
    headers: HeaderList,
    body: Option<String>,
    options: TransportOptions,
    retry: u32,
    cookie_jar: Option<PathBuf>,
}

impl RequestSpec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn url(&self) -> Option<&str> {
        self.url.as_deref()
    }

    pub fn method(&self) -> Option<&Method> {
        self.method.as_ref()
    }

    pub fn headers(&self) -> &HeaderList {
        &self.headers
    }

    pub fn body(&self) -> Option<&str> {
        self.body.as_deref()
    }

    pub fn options(&self) -> &TransportOptions {
        &self.options
    }

    /// Extra attempts allowed after a timeout.
    pub fn retry(&self) -> u32 {
        self.retry
    }

    pub fn cookie_jar(&self) -> Option<&Path> {
        self.cookie_jar.as_deref()
    }

    // Raw options

    pub fn with_opt(&self, id: OptionId, value: impl Into<OptionValue>) -> Self {
        let mut spec = self.clone();
        spec.options.set(id, value);
        spec
    }

    pub fn with_opts(&self, options: &TransportOptions) -> Self {
        if options.is_empty() {
            return self.clone();
        }
        let mut spec = self.clone();
        spec.options.merge(options);
        spec
    }

    // Headers

    /// Append `value` to the values already held for `name`.
    pub fn with_header(&self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let mut spec = self.clone();
        spec.headers.append(name, value);
        spec
    }

    /// Replace the whole header set.
    pub fn with_headers(&self, headers: HeaderList) -> Self {
        let mut spec = self.clone();
        spec.headers = headers;
        spec
    }

    pub fn with_added_headers(&self, headers: &HeaderList) -> Self {
        let mut spec = self.clone();
        spec.headers.extend_from(headers);
        spec
    }

    /// Append headers parsed from a raw `Name: value` block.
    pub fn with_added_header_text(&self, raw: &str) -> Self {
        self.with_added_headers(&parse_header_text(raw))
    }

    /// Replace the header set with one parsed from a raw `Name: value` block.
    pub fn with_header_text(&self, raw: &str) -> Self {
        self.with_headers(parse_header_text(raw))
    }

    /// Basic authorization.
    pub fn with_auth(&self, user: &str, password: &str) -> Self {
        let credentials = Zeroizing::new(format!("{}:{}", user, password));
        let encoded = Zeroizing::new(STANDARD.encode(credentials.as_bytes()));
        self.with_header("Authorization", format!("Basic {}", encoded.as_str()))
    }

    /// Adds `X-Requested-With: XMLHttpRequest`.
    pub fn with_ajax(&self) -> Self {
        self.with_header("X-Requested-With", "XMLHttpRequest")
    }

    // Transport behaviour

    pub fn with_referer(&self, referer: &str) -> Self {
        self.with_opt(OptionId::Referer, referer)
    }

    pub fn with_user_agent(&self, user_agent: &str) -> Self {
        self.with_opt(OptionId::UserAgent, user_agent)
    }

    pub fn with_default_user_agent(&self) -> Self {
        self.with_user_agent(USER_AGENT)
    }

    /// Route through `protocol://host:port`, without CONNECT tunnelling.
    pub fn with_proxy(&self, protocol: &str, host: &str, port: u16) -> Result<Self, ValidationError> {
        if !PROXY_PROTOCOLS.contains(&protocol) {
            return Err(ValidationError::InvalidProxyProtocol(protocol.to_string()));
        }
        let mut spec = self.clone();
        spec.options.set(OptionId::HttpProxyTunnel, false);
        spec.options
            .set(OptionId::Proxy, format!("{}://{}:{}", protocol, host, port));
        Ok(spec)
    }

    /// Attempts after the first one, made only when a transfer times out.
    pub fn with_retry(&self, retry: u32) -> Self {
        let mut spec = self.clone();
        spec.retry = retry;
        spec
    }

    /// Connect and total timeout, in seconds.
    pub fn with_timeout(&self, seconds: u32) -> Self {
        let mut spec = self.clone();
        spec.options.set(OptionId::ConnectTimeout, seconds);
        spec.options.set(OptionId::Timeout, seconds);
        spec
    }

    pub fn with_auto_redirect(&self, follow: bool) -> Self {
        self.with_opt(OptionId::FollowLocation, follow)
    }

    /// Persist cookies to `path`, creating its directory if needed.
    pub fn with_cookie_file(&self, path: impl AsRef<Path>) -> Result<Self, ValidationError> {
        let path = path.as_ref();
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        ensure_writable_dir(dir).cookie_dir_context(dir)?;

        let mut spec = self.clone();
        spec.cookie_jar = Some(path.to_path_buf());
        Ok(spec)
    }

    // Target

    pub fn with_method(&self, method: &str) -> Result<Self, ValidationError> {
        let method = parse_method(method)?;
        let mut spec = self.clone();
        spec.method = Some(method);
        Ok(spec)
    }

    pub fn with_url(&self, url: &str) -> Result<Self, ValidationError> {
        validate_url(url)?;
        let mut spec = self.clone();
        spec.url = Some(url.to_string());
        Ok(spec)
    }

    // Body

    pub fn with_data(&self, data: impl Into<RequestData>) -> Self {
        let mut spec = self.clone();
        spec.body = Some(data.into().encode());
        spec
    }

    /// POST `json` with JSON content headers. Other headers are kept.
    pub fn post_json(&self, json: impl Into<String>) -> Self {
        let json = json.into();
        let mut spec = self.clone();
        spec.headers.set("Content-Type", "application/json");
        spec.headers.set("Content-Length", json.len().to_string());
        spec.method = Some(Method::POST);
        spec.body = Some(json);
        spec
    }

    #[cfg(feature = "json")]
    pub fn post_json_value<T: serde::Serialize + ?Sized>(
        &self,
        value: &T,
    ) -> Result<Self, serde_json::Error> {
        Ok(self.post_json(serde_json::to_string(value)?))
    }

    /// Url-encode `form` as the body and keep POST across 301/302/303.
    pub fn post_data(&self, form: impl Into<RequestData>) -> Self {
        self.with_data(form).with_opt(OptionId::PostRedirect, true)
    }
}
