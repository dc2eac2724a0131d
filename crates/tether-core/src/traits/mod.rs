//! Core traits at the seams of the request client.

mod renewal;
mod store;
mod transport;

pub use renewal::RenewalExchange;
pub use store::CredentialStore;
pub use transport::Transport;
