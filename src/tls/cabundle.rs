//! CA bundle bootstrap.
//!
//! [`CaBundleCache`] keeps a copy of the curl project's Mozilla CA bundle in a
//! caller-chosen directory. The bundle is fetched once, on first use, with peer
//! verification off (there is nothing to verify against yet).

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use tempfile::NamedTempFile;

use super::CertificateSource;
use crate::base::context::{ensure_writable_dir, IoResultExt};
use crate::base::neterror::ValidationError;
use crate::transport::{
    CurlTransport, OptionId, OptionValue, TransferHandle, TransferSink, Transport,
};

/// Where the bundle is downloaded from.
pub const CA_BUNDLE_URL: &str = "https://curl.se/ca/cacert.pem";

/// File name of the cached bundle inside the cache directory.
pub const CA_BUNDLE_FILE: &str = "cacert.pem";

/// Lazily downloaded CA bundle, shared by every fetch of a client.
pub struct CaBundleCache<T: Transport = CurlTransport> {
    file: PathBuf,
    transport: T,
    resolved: Mutex<Option<PathBuf>>,
}

impl<T: Transport> std::fmt::Debug for CaBundleCache<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CaBundleCache")
            .field("file", &self.file)
            .finish_non_exhaustive()
    }
}

impl CaBundleCache<CurlTransport> {
    /// Cache in `dir`, downloading through libcurl.
    pub fn new(dir: impl AsRef<Path>) -> Result<Self, ValidationError> {
        Self::init(dir, CurlTransport::new())
    }
}

impl<T: Transport> CaBundleCache<T> {
    /// Create `dir` if needed and check it is writable.
    pub fn init(dir: impl AsRef<Path>, transport: T) -> Result<Self, ValidationError> {
        let dir = dir.as_ref();
        ensure_writable_dir(dir).cert_dir_context(dir)?;

        Ok(Self {
            file: dir.join(CA_BUNDLE_FILE),
            transport,
            resolved: Mutex::new(None),
        })
    }

    /// Path the bundle is (or will be) stored at.
    pub fn file(&self) -> &Path {
        &self.file
    }

    fn download(&self) -> Option<()> {
        let mut handle = self.transport.open();
        let options = [
            (OptionId::ReturnTransfer, OptionValue::Bool(true)),
            (OptionId::Encoding, OptionValue::from("gzip,deflate")),
            (OptionId::FollowLocation, OptionValue::Bool(false)),
            (OptionId::AutoReferer, OptionValue::Bool(true)),
            (OptionId::CookieFile, OptionValue::from("")),
            (OptionId::Url, OptionValue::from(CA_BUNDLE_URL)),
            (OptionId::SslVerifyPeer, OptionValue::Bool(false)),
        ];
        for (id, value) in &options {
            if let Err(e) = handle.set_option(*id, value) {
                tracing::warn!(error = %e, "CA bundle download: option rejected");
                handle.close();
                return None;
            }
        }

        let mut sink = BundleSink::default();
        let outcome = handle.perform(&mut sink);
        let status = handle.info().response_code;
        handle.close();

        if !outcome.succeeded || !(200..300).contains(&status) || sink.body.is_empty() {
            tracing::warn!(
                errno = outcome.errno,
                status,
                error = %outcome.error,
                "CA bundle download failed"
            );
            return None;
        }

        let dir = self.file.parent()?;
        let mut tmp = NamedTempFile::new_in(dir).ok()?;
        tmp.write_all(&sink.body).ok()?;
        if let Err(e) = tmp.persist(&self.file) {
            tracing::warn!(error = %e, path = %self.file.display(), "could not store CA bundle");
            return None;
        }
        tracing::debug!(path = %self.file.display(), bytes = sink.body.len(), "CA bundle stored");
        Some(())
    }
}

impl<T: Transport> CertificateSource for CaBundleCache<T> {
    fn ca_bundle(&self) -> Option<PathBuf> {
        let mut resolved = self.resolved.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(path) = resolved.as_ref() {
            return Some(path.clone());
        }

        if !self.file.is_file() {
            self.download()?;
        }
        let path = self.file.canonicalize().ok()?;
        *resolved = Some(path.clone());
        Some(path)
    }
}

#[derive(Default)]
struct BundleSink {
    body: Vec<u8>,
}

impl TransferSink for BundleSink {
    fn header(&mut self, line: &[u8]) -> usize {
        line.len()
    }

    fn write(&mut self, chunk: &[u8]) -> usize {
        self.body.extend_from_slice(chunk);
        chunk.len()
    }
}
