//! Request description.
//!
//! - [`RequestSpec`]: the immutable builder handed to `Client::fetch`
//! - [`validate_url`] / [`parse_method`]: argument checks shared with the executor

pub mod request;

pub use request::{parse_method, validate_url, RequestSpec, USER_AGENT, VALID_METHODS, VERSION};
