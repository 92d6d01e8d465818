//! # curlreq
//!
//! A synchronous HTTP execution engine driven by libcurl.
//!
//! `curlreq` separates the description of a request from its execution.
//! A [`RequestSpec`] is an immutable value built by chaining `with_*` calls;
//! a [`Client`] runs it over a transport handle and hands back a [`Response`]
//! snapshot that owns the spooled body and the handle itself.
//!
//! ## Features
//!
//! - **Immutable builder**: every refinement returns a new spec
//! - **Raw header reconstruction**: status, version and headers are rebuilt
//!   from header lines as they arrive, redirect hops included
//! - **Retry on timeout**: per-request retry budget, same handle, no backoff
//! - **Lazy bodies**: spooled in memory up to 2 MiB, then on disk, read on demand
//! - **Pluggable transport**: libcurl by default, any [`transport::Transport`]
//!   for tests or other engines
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use curlreq::{Client, RequestSpec};
//!
//! let spec = RequestSpec::new()
//!     .with_url("https://httpbin.org/post")?
//!     .with_ajax()
//!     .post_json(r#"{"hello":"world"}"#);
//!
//! let resp = Client::new().fetch(&spec)?;
//! println!("{} {}", resp.status(), resp.status_text());
//! println!("{}", resp);
//! ```
//!
//! ## Modules
//!
//! - [`base`] - Error definitions and IO context helpers
//! - [`http`] - Header codec, transaction, response envelope and bodies
//! - [`transport`] - Transport traits, option map and the libcurl backend
//! - [`tls`] - CA bundle sources
//! - [`urlrequest`] - The request builder

pub mod base;
pub mod client;
pub mod http;
pub mod tls;
pub mod transport;
pub mod urlrequest;

pub use base::{FetchError, TransferCode, ValidationError};
pub use client::{Client, ClientBuilder};
pub use crate::http::{HeaderList, HeaderRetention, RequestData, Response};
pub use urlrequest::RequestSpec;
