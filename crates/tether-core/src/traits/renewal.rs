//! Renewal exchange trait.

use async_trait::async_trait;

use crate::{CredentialPair, RefreshToken, Result};

/// Exchanges a refresh token for a new credential pair.
///
/// The exchange is side-effecting on the server (it may rotate the refresh
/// token), so callers must not run two exchanges with the same token at once.
#[async_trait]
pub trait RenewalExchange: Send + Sync {
    async fn renew(&self, refresh_token: &RefreshToken) -> Result<CredentialPair>;
}
