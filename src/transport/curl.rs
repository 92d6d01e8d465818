//! libcurl-backed transport.

use std::cell::RefCell;
use std::path::Path;
use std::time::Duration;

use curl::easy::{Easy, InfoType, List, PostRedirections};

use super::{OptionId, OptionValue, TransferHandle, TransferInfo, TransferOutcome, TransferSink, Transport};
use crate::base::neterror::{TransferCode, ValidationError};

/// Opens one libcurl easy handle per fetch.
#[derive(Debug, Clone, Copy, Default)]
pub struct CurlTransport;

impl CurlTransport {
    pub fn new() -> Self {
        Self
    }
}

impl Transport for CurlTransport {
    type Handle = CurlHandle;

    fn open(&self) -> CurlHandle {
        CurlHandle::new()
    }
}

/// A libcurl easy handle plus the bits of state libcurl does not keep for us.
pub struct CurlHandle {
    easy: Option<Easy>,
    capture_header_out: bool,
    header_out: Option<String>,
}

impl std::fmt::Debug for CurlHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CurlHandle")
            .field("open", &self.easy.is_some())
            .field("capture_header_out", &self.capture_header_out)
            .finish()
    }
}

impl Default for CurlHandle {
    fn default() -> Self {
        Self::new()
    }
}

impl CurlHandle {
    pub fn new() -> Self {
        Self {
            easy: Some(Easy::new()),
            capture_header_out: false,
            header_out: None,
        }
    }

    fn apply(easy: &mut Easy, id: OptionId, value: &OptionValue) -> Option<Result<(), curl::Error>> {
        let result = match id {
            OptionId::Url => easy.url(value.as_text()?),
            OptionId::CustomRequest => easy.custom_request(value.as_text()?),
            OptionId::PostFields => easy.post_fields_copy(value.as_text()?.as_bytes()),
            OptionId::PostRedirect => {
                let mut redirects = PostRedirections::new();
                redirects.redirect_all(value.as_bool()?);
                easy.post_redirections(&redirects)
            }
            OptionId::FollowLocation => easy.follow_location(value.as_bool()?),
            OptionId::MaxRedirects => easy.max_redirections(u32::try_from(value.as_int()?).ok()?),
            OptionId::AutoReferer => easy.autoreferer(value.as_bool()?),
            OptionId::Referer => easy.referer(value.as_text()?),
            OptionId::UserAgent => easy.useragent(value.as_text()?),
            OptionId::HttpHeader => {
                let mut list = List::new();
                for line in value.as_list()? {
                    if let Err(e) = list.append(line) {
                        return Some(Err(e));
                    }
                }
                easy.http_headers(list)
            }
            OptionId::Encoding => easy.accept_encoding(value.as_text()?),
            OptionId::CookieFile => easy.cookie_file(Path::new(value.as_text()?)),
            OptionId::CookieJar => easy.cookie_jar(Path::new(value.as_text()?)),
            OptionId::CaInfo => easy.cainfo(Path::new(value.as_text()?)),
            OptionId::SslVerifyPeer => easy.ssl_verify_peer(value.as_bool()?),
            OptionId::ConnectTimeout => easy.connect_timeout(seconds(value)?),
            OptionId::Timeout => easy.timeout(seconds(value)?),
            OptionId::Proxy => easy.proxy(value.as_text()?),
            OptionId::HttpProxyTunnel => easy.http_proxy_tunnel(value.as_bool()?),
            // The body always flows through the sink; there is nothing to toggle.
            OptionId::ReturnTransfer => Ok(()),
            // Sent headers only reach the debug callback in verbose mode.
            OptionId::HeaderOut => easy.verbose(value.as_bool()?),
            OptionId::Raw(_) => return None,
        };
        Some(result)
    }
}

fn seconds(value: &OptionValue) -> Option<Duration> {
    u64::try_from(value.as_int()?).ok().map(Duration::from_secs)
}

impl TransferHandle for CurlHandle {
    fn set_option(&mut self, id: OptionId, value: &OptionValue) -> Result<(), ValidationError> {
        let easy = self
            .easy
            .as_mut()
            .ok_or(ValidationError::UnsupportedOption(id))?;

        match Self::apply(easy, id, value) {
            Some(Ok(())) => {
                if id == OptionId::HeaderOut {
                    self.capture_header_out = value.as_bool().unwrap_or(false);
                }
                Ok(())
            }
            Some(Err(e)) => {
                tracing::debug!(option = ?id, error = %e, "libcurl rejected option");
                Err(ValidationError::UnsupportedOption(id))
            }
            None => Err(ValidationError::UnsupportedOption(id)),
        }
    }

    fn perform(&mut self, sink: &mut dyn TransferSink) -> TransferOutcome {
        let Some(easy) = self.easy.as_mut() else {
            return TransferOutcome::failed(TransferCode::FailedInit, "transfer handle already released");
        };

        let sink = RefCell::new(sink);
        let header_out: RefCell<Option<String>> = RefCell::new(None);
        let capture = self.capture_header_out;

        let result = (|| {
            let mut transfer = easy.transfer();
            transfer.header_function(|line| sink.borrow_mut().header(line) == line.len())?;
            transfer.write_function(|chunk| Ok(sink.borrow_mut().write(chunk)))?;
            if capture {
                transfer.debug_function(|kind, data| {
                    if let InfoType::HeaderOut = kind {
                        *header_out.borrow_mut() = Some(String::from_utf8_lossy(data).into_owned());
                    }
                })?;
            }
            transfer.perform()
        })();

        if let Some(text) = header_out.into_inner() {
            self.header_out = Some(text);
        }

        match result {
            Ok(()) => TransferOutcome::ok(),
            Err(e) => {
                let message = match e.extra_description() {
                    Some(extra) => format!("{}: {}", e.description(), extra),
                    None => e.description().to_string(),
                };
                TransferOutcome {
                    succeeded: false,
                    errno: e.code() as i32,
                    error: message,
                }
            }
        }
    }

    fn info(&mut self) -> TransferInfo {
        let Some(easy) = self.easy.as_mut() else {
            return TransferInfo::default();
        };

        TransferInfo {
            effective_url: easy.effective_url().ok().flatten().map(str::to_owned),
            response_code: easy.response_code().unwrap_or(0),
            content_type: easy.content_type().ok().flatten().map(str::to_owned),
            redirect_count: easy.redirect_count().unwrap_or(0),
            redirect_url: easy.redirect_url().ok().flatten().map(str::to_owned),
            header_size: easy.header_size().unwrap_or(0),
            header_out: self.header_out.clone(),
        }
    }

    fn close(&mut self) {
        if self.easy.take().is_some() {
            tracing::trace!("libcurl handle released");
        }
    }
}
