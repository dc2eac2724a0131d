//! Credential store trait.

use crate::{CredentialPair, Result};

/// Durable storage for the signed-in credential pair.
///
/// The store is the single source of truth for credentials. Reads happen at
/// request construction time, so all operations are synchronous.
pub trait CredentialStore: Send + Sync {
    /// Returns the stored pair, if any.
    fn get(&self) -> Result<Option<CredentialPair>>;

    /// Replaces the stored pair.
    fn set(&self, pair: &CredentialPair) -> Result<()>;

    /// Removes the stored pair.
    fn clear(&self) -> Result<()>;
}
