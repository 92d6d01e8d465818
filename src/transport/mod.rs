//! The transfer engine seam.
//!
//! A [`Transport`] hands out [`TransferHandle`]s. A handle is configured
//! through an open option map, runs a transfer while pushing raw header lines
//! and body chunks into a [`TransferSink`], and answers introspection queries
//! afterwards. Nothing above this module sees a structured response from the
//! engine; status, version and headers are rebuilt from the raw lines.
//!
//! - [`CurlTransport`]: libcurl easy handles via the `curl` crate
//! - [`options`]: option identifiers, values and the layered option map

pub mod curl;
pub mod options;

pub use self::curl::{CurlHandle, CurlTransport};
pub use options::{OptionId, OptionValue, TransportOptions};

use crate::base::neterror::{TransferCode, ValidationError};

/// Receives the raw bytes of a transfer as they arrive.
pub trait TransferSink {
    /// Called once per received header line, terminator included, and once for
    /// the blank line ending each header block. Returns the number of bytes
    /// consumed; anything short of `line.len()` aborts the transfer.
    fn header(&mut self, line: &[u8]) -> usize;

    /// Called for each chunk of body bytes. Same short-count contract.
    fn write(&mut self, chunk: &[u8]) -> usize;
}

/// Raw result of one `perform` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferOutcome {
    pub succeeded: bool,
    pub errno: i32,
    pub error: String,
}

impl TransferOutcome {
    pub fn ok() -> Self {
        Self {
            succeeded: true,
            errno: 0,
            error: String::new(),
        }
    }

    pub fn failed(code: TransferCode, error: impl Into<String>) -> Self {
        Self {
            succeeded: false,
            errno: code.as_i32(),
            error: error.into(),
        }
    }

    pub fn code(&self) -> TransferCode {
        TransferCode::from(self.errno)
    }
}

/// Introspection values read from a handle after a transfer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransferInfo {
    pub effective_url: Option<String>,
    pub response_code: u32,
    pub content_type: Option<String>,
    pub redirect_count: u32,
    pub redirect_url: Option<String>,
    /// Total bytes of all received header lines.
    pub header_size: u64,
    /// Raw text of the last request head actually sent.
    pub header_out: Option<String>,
}

/// One configured transfer session.
pub trait TransferHandle: Send {
    /// Apply a single knob. Unknown ids or ill-typed values are rejected.
    fn set_option(&mut self, id: OptionId, value: &OptionValue) -> Result<(), ValidationError>;

    /// Run the transfer once. May be called again to retry on the same handle.
    fn perform(&mut self, sink: &mut dyn TransferSink) -> TransferOutcome;

    fn info(&mut self) -> TransferInfo;

    /// Release the underlying engine resources. Must tolerate repeated calls.
    fn close(&mut self);
}

/// Factory for transfer handles.
pub trait Transport: Send + Sync {
    type Handle: TransferHandle + 'static;

    fn open(&self) -> Self::Handle;
}
