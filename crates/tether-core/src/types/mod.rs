//! Core request types.
//!
//! These types validate at construction time where the wire format demands
//! it (base URL, method names).

mod api_url;
mod request;

pub use api_url::ApiUrl;
pub use request::{Method, Request, RequestOptions, Response};
