//! The request client used by application call sites.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, info, instrument};

use crate::coordinator::RefreshCoordinator;
use crate::notifier::SessionNotifier;
use crate::traits::{CredentialStore, RenewalExchange, Transport};
use crate::types::{Request, Response};
use crate::{AccessToken, CredentialPair, Result};

/// Renewal exchanges taking longer than this count as failed.
pub const DEFAULT_RENEWAL_TIMEOUT: Duration = Duration::from_secs(30);

/// Sends requests with the stored access token attached, renewing it
/// transparently when it expires.
///
/// Cheap to clone; clones share the credential store and renewal state.
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use tether_core::{MemoryStore, Request, RequestClient};
/// # use tether_core::{RenewalExchange, Transport};
///
/// # async fn example(
/// #     transport: Arc<dyn Transport>,
/// #     renewal: Arc<dyn RenewalExchange>,
/// # ) -> tether_core::Result<()> {
/// let client = RequestClient::builder(transport, renewal, Arc::new(MemoryStore::new())).build();
/// client.register_on_session_ended(|| eprintln!("Please sign in again"));
///
/// let response = client.request(Request::get("/children/")).await?;
/// println!("{}", response.text());
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct RequestClient {
    inner: Arc<ClientInner>,
}

struct ClientInner {
    transport: Arc<dyn Transport>,
    store: Arc<dyn CredentialStore>,
    coordinator: RefreshCoordinator,
    notifier: SessionNotifier,
}

/// Builder for [`RequestClient`].
pub struct RequestClientBuilder {
    transport: Arc<dyn Transport>,
    renewal: Arc<dyn RenewalExchange>,
    store: Arc<dyn CredentialStore>,
    renewal_timeout: Option<Duration>,
}

impl RequestClientBuilder {
    /// Bound each renewal exchange; `None` waits indefinitely.
    pub fn renewal_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.renewal_timeout = timeout;
        self
    }

    pub fn build(self) -> RequestClient {
        let notifier = SessionNotifier::new();
        let coordinator = RefreshCoordinator::new(
            self.store.clone(),
            self.renewal,
            notifier.clone(),
            self.renewal_timeout,
        );

        RequestClient {
            inner: Arc::new(ClientInner {
                transport: self.transport,
                store: self.store,
                coordinator,
                notifier,
            }),
        }
    }
}

impl RequestClient {
    pub fn builder(
        transport: Arc<dyn Transport>,
        renewal: Arc<dyn RenewalExchange>,
        store: Arc<dyn CredentialStore>,
    ) -> RequestClientBuilder {
        RequestClientBuilder {
            transport,
            renewal,
            store,
            renewal_timeout: Some(DEFAULT_RENEWAL_TIMEOUT),
        }
    }

    /// Send a request with the current access token attached.
    ///
    /// An authorization failure is handed to the refresh coordinator; if it
    /// yields a fresh token the request is replayed once with it. The caller
    /// sees either the response or the error of the last attempt.
    ///
    /// # Errors
    ///
    /// Transport and non-authorization status errors are returned as they
    /// occurred. Unrecoverable authorization failures are returned as
    /// [`Error::Auth`](crate::Error::Auth).
    #[instrument(skip(self, request), fields(method = %request.method(), path = request.path()))]
    pub async fn request(&self, request: Request) -> Result<Response> {
        let mut request = request;
        let mut token = self.access_token()?;

        loop {
            debug!(retried = request.is_retried(), "Sending request");

            let failure = match self.inner.transport.send(&request, token.as_ref()).await {
                Ok(response) => return Ok(response),
                Err(err) if err.is_auth_failure() => err,
                Err(err) => return Err(err),
            };

            let fresh = self
                .inner
                .coordinator
                .recover(&request, token.as_ref(), failure)
                .await?;

            token = Some(fresh);
            request = request.as_retry();
        }
    }

    pub async fn get(&self, path: &str) -> Result<Response> {
        self.request(Request::get(path)).await
    }

    pub async fn post<B: Serialize>(&self, path: &str, body: &B) -> Result<Response> {
        self.request(Request::post(path).with_body(body)?).await
    }

    pub async fn put<B: Serialize>(&self, path: &str, body: &B) -> Result<Response> {
        self.request(Request::put(path).with_body(body)?).await
    }

    pub async fn patch<B: Serialize>(&self, path: &str, body: &B) -> Result<Response> {
        self.request(Request::patch(path).with_body(body)?).await
    }

    pub async fn delete(&self, path: &str) -> Result<Response> {
        self.request(Request::delete(path)).await
    }

    /// GET a path and decode the JSON body.
    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        self.get(path).await?.json()
    }

    /// Store the pair obtained from a login.
    pub fn set_credentials(&self, pair: &CredentialPair) -> Result<()> {
        self.inner.store.set(pair)
    }

    /// Returns the stored pair, if any.
    pub fn credentials(&self) -> Result<Option<CredentialPair>> {
        self.inner.store.get()
    }

    /// Clear the stored credentials and abandon any in-flight renewal.
    ///
    /// Requests waiting on that renewal fail with
    /// [`AuthError::SessionEnded`](crate::AuthError::SessionEnded). The
    /// session-ended callback is not invoked.
    pub fn logout(&self) -> Result<()> {
        info!("Logging out");
        self.inner.store.clear()?;
        self.inner.coordinator.reset();
        Ok(())
    }

    /// Force a renewal and return the new access token.
    pub async fn refresh(&self) -> Result<AccessToken> {
        self.inner.coordinator.renew_now().await
    }

    /// Register the callback invoked when renewal fails and the session is
    /// signed out. Replaces any previous registration.
    pub fn register_on_session_ended<F>(&self, callback: F)
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.inner.notifier.register(callback);
    }

    /// Returns the refresh coordinator.
    pub fn coordinator(&self) -> &RefreshCoordinator {
        &self.inner.coordinator
    }

    fn access_token(&self) -> Result<Option<AccessToken>> {
        Ok(self.inner.store.get()?.map(|pair| pair.access_token))
    }
}

impl fmt::Debug for RequestClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestClient")
            .field("coordinator", &self.inner.coordinator)
            .field("tokens", &"[REDACTED]")
            .finish()
    }
}
