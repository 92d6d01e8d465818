//! Base types and error handling.
//!
//! - [`TransferCode`]: transport result codes (libcurl numbering)
//! - [`ValidationError`] / [`FetchError`]: the crate's error taxonomy
//! - [`context`]: IO error context helpers

pub mod context;
pub mod neterror;

pub use neterror::{FetchError, TransferCode, ValidationError};
