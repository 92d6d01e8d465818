//! Ergonomic error context helpers.
//!
//! Provides extension traits for adding context to `Result` types,
//! converting IO errors into context-rich `ValidationError` variants.

use crate::base::neterror::ValidationError;
use std::fs;
use std::io;
use std::path::Path;

/// Extension trait for adding context to IO Results.
pub trait IoResultExt<T> {
    /// Attach the cookie jar directory to an IO error.
    ///
    /// # Example
    /// ```ignore
    /// use curlreq::base::context::IoResultExt;
    ///
    /// ensure_writable_dir(dir).cookie_dir_context(dir)?;
    /// // Error: "/var/lib/app for cookie file does not exist or is not writable: ..."
    /// ```
    fn cookie_dir_context(self, dir: &Path) -> Result<T, ValidationError>;

    /// Attach the CA bundle directory to an IO error.
    fn cert_dir_context(self, dir: &Path) -> Result<T, ValidationError>;
}

impl<T> IoResultExt<T> for Result<T, io::Error> {
    fn cookie_dir_context(self, dir: &Path) -> Result<T, ValidationError> {
        self.map_err(|source| ValidationError::CookieDirectory {
            path: dir.to_path_buf(),
            source,
        })
    }

    fn cert_dir_context(self, dir: &Path) -> Result<T, ValidationError> {
        self.map_err(|source| ValidationError::CertificateDirectory {
            path: dir.to_path_buf(),
            source,
        })
    }
}

/// Create `dir` if missing and prove it accepts new files.
///
/// Writability is probed by creating (and immediately dropping) an anonymous
/// temporary file inside it.
pub fn ensure_writable_dir(dir: &Path) -> io::Result<()> {
    if !dir.exists() {
        fs::create_dir_all(dir)?;
    }
    if !dir.is_dir() {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            "path exists but is not a directory",
        ));
    }
    tempfile::tempfile_in(dir).map(drop)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Error, ErrorKind};

    #[test]
    fn test_cookie_dir_context() {
        let result: Result<(), io::Error> =
            Err(Error::new(ErrorKind::PermissionDenied, "read-only"));
        let err = result.cookie_dir_context(Path::new("/jar")).unwrap_err();

        match err {
            ValidationError::CookieDirectory { path, source } => {
                assert_eq!(path, Path::new("/jar"));
                assert_eq!(source.kind(), ErrorKind::PermissionDenied);
            }
            _ => panic!("Expected CookieDirectory"),
        }
    }

    #[test]
    fn test_cert_dir_context() {
        let result: Result<(), io::Error> = Err(Error::new(ErrorKind::NotFound, "gone"));
        let err = result.cert_dir_context(Path::new("/certs")).unwrap_err();
        assert!(matches!(err, ValidationError::CertificateDirectory { .. }));
    }

    #[test]
    fn test_ensure_writable_dir_creates_nested() {
        let root = tempfile::tempdir().unwrap();
        let nested = root.path().join("a").join("b");
        ensure_writable_dir(&nested).unwrap();
        assert!(nested.is_dir());
    }

    #[test]
    fn test_ensure_writable_dir_rejects_file() {
        let file = tempfile::NamedTempFile::new().unwrap();
        assert!(ensure_writable_dir(file.path()).is_err());
    }
}
