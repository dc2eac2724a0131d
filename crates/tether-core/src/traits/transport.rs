//! Transport trait.

use async_trait::async_trait;

use crate::types::{Request, Response};
use crate::{AccessToken, Result};

/// Sends one request over the network.
///
/// Implementations attach `token` as a bearer `Authorization` header when
/// present, return the response unchanged for success statuses, and map any
/// other status to [`Error::Status`](crate::Error::Status).
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: &Request, token: Option<&AccessToken>) -> Result<Response>;
}
