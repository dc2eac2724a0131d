//! tether-core - Bearer-token request client with single-flight renewal.
//!
//! All authenticated calls flow through a [`RequestClient`], which attaches
//! the stored access token and hands authorization failures to a
//! [`RefreshCoordinator`]. The coordinator runs at most one renewal exchange
//! at a time, replays each failed request once with the renewed token, and
//! signs the session out when renewal is no longer possible.
//!
//! The network and storage sit behind the [`Transport`], [`RenewalExchange`]
//! and [`CredentialStore`] traits; `tether-http` and `tether-file` provide
//! the production implementations.

pub mod client;
pub mod coordinator;
pub mod credentials;
pub mod error;
pub mod memory;
pub mod notifier;
pub mod tokens;
pub mod traits;
pub mod types;

#[cfg(test)]
mod testing;

pub use client::{DEFAULT_RENEWAL_TIMEOUT, RequestClient, RequestClientBuilder};
pub use coordinator::RefreshCoordinator;
pub use credentials::Credentials;
pub use error::{AuthError, Error};
pub use memory::MemoryStore;
pub use notifier::SessionNotifier;
pub use tokens::{AccessToken, CredentialPair, RefreshToken};
pub use traits::{CredentialStore, RenewalExchange, Transport};
pub use types::{ApiUrl, Method, Request, RequestOptions, Response};

/// Result type alias using the crate's Error type.
pub type Result<T> = std::result::Result<T, Error>;
