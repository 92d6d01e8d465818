//! Certificate trust configuration.
//!
//! TLS itself is left to the transport. This module only decides which CA
//! bundle, if any, the transport is pointed at.

pub mod cabundle;

pub use cabundle::{CaBundleCache, CA_BUNDLE_FILE, CA_BUNDLE_URL};

use std::path::PathBuf;

/// Supplies a CA bundle path for peer verification.
///
/// When no bundle is available, requests go out with peer verification off.
pub trait CertificateSource: Send + Sync {
    fn ca_bundle(&self) -> Option<PathBuf>;
}

/// Never provides a bundle.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoCertificates;

impl CertificateSource for NoCertificates {
    fn ca_bundle(&self) -> Option<PathBuf> {
        None
    }
}

/// A fixed, already present bundle file.
#[derive(Debug, Clone)]
pub struct StaticBundle(pub PathBuf);

impl CertificateSource for StaticBundle {
    fn ca_bundle(&self) -> Option<PathBuf> {
        self.0.is_file().then(|| self.0.clone())
    }
}
