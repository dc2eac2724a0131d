//! tether-http - reqwest-backed transport and token renewal.
//!
//! [`HttpApi`] talks to the remote service: it logs in, creates accounts,
//! exchanges refresh tokens, and builds a [`tether_core::RequestClient`]
//! whose requests go through [`HttpTransport`].

mod api;
mod config;
mod http;

pub use api::HttpApi;
pub use config::HttpConfig;
pub use http::client::HttpTransport;
