//! tether-file - Filesystem-backed credential store.
//!
//! [`FileStore`] keeps the credential pair in a single JSON file so a
//! session survives process restarts.

mod store;

pub use store::{FileStore, StoredCredentials};
