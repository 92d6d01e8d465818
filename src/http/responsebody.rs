//! Response body storage.
//!
//! Bodies are spooled: kept in memory up to [`SPOOL_THRESHOLD`] bytes and moved
//! to an anonymous temporary file past that.

use std::io::{Read, Seek, SeekFrom, Write};

use tempfile::SpooledTempFile;

use crate::base::neterror::FetchError;

/// In-memory limit before a body spills to disk.
pub const SPOOL_THRESHOLD: usize = 2 * 1024 * 1024;

/// A readable, rewindable byte stream a response can own.
pub trait BodyStream: Read + Seek + Send {}

impl<T: Read + Seek + Send> BodyStream for T {}

/// Write side used while a transfer is in flight.
#[derive(Debug)]
pub struct SpooledBody {
    file: SpooledTempFile,
    written: u64,
}

impl Default for SpooledBody {
    fn default() -> Self {
        Self::new()
    }
}

impl SpooledBody {
    pub fn new() -> Self {
        Self {
            file: SpooledTempFile::new(SPOOL_THRESHOLD),
            written: 0,
        }
    }

    /// Append a chunk, returning how many bytes were stored.
    pub fn write_chunk(&mut self, chunk: &[u8]) -> usize {
        match self.file.write_all(chunk) {
            Ok(()) => {
                self.written += chunk.len() as u64;
                chunk.len()
            }
            Err(e) => {
                tracing::debug!(error = %e, "failed to spool body chunk");
                0
            }
        }
    }

    /// Drop everything written so far.
    pub fn reset(&mut self) -> std::io::Result<()> {
        self.file.seek(SeekFrom::Start(0))?;
        self.file.set_len(0)?;
        self.written = 0;
        Ok(())
    }

    pub fn len(&self) -> u64 {
        self.written
    }

    pub fn is_empty(&self) -> bool {
        self.written == 0
    }

    pub fn is_rolled(&self) -> bool {
        self.file.is_rolled()
    }

    pub fn into_body(self) -> ResponseBody {
        ResponseBody::new(self.file)
    }
}

/// The body half of a response: an owned stream that can be closed once.
pub struct ResponseBody {
    inner: Option<Box<dyn BodyStream>>,
}

impl std::fmt::Debug for ResponseBody {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResponseBody")
            .field("closed", &self.inner.is_none())
            .finish()
    }
}

impl ResponseBody {
    pub fn new(stream: impl BodyStream + 'static) -> Self {
        Self {
            inner: Some(Box::new(stream)),
        }
    }

    /// Rewind to the start and read everything.
    pub fn read_all(&mut self) -> Result<Vec<u8>, FetchError> {
        let stream = self
            .inner
            .as_mut()
            .ok_or_else(|| FetchError::Stream("body stream is closed".into()))?;

        stream
            .seek(SeekFrom::Start(0))
            .map_err(|e| FetchError::Stream(format!("body stream is not seekable: {}", e)))?;

        let mut buf = Vec::new();
        stream
            .read_to_end(&mut buf)
            .map_err(|e| FetchError::Stream(e.to_string()))?;
        Ok(buf)
    }

    /// Release the stream. Returns `false` if it was already closed.
    pub fn close(&mut self) -> bool {
        self.inner.take().is_some()
    }

    pub fn is_closed(&self) -> bool {
        self.inner.is_none()
    }
}
