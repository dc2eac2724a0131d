//! Single-flight credential renewal.
//!
//! The [`RefreshCoordinator`] turns authorization failures into at most one
//! in-flight renewal exchange. The first failing request opens a renewal
//! episode; requests failing while it runs join the episode's waiter queue.
//! When the exchange settles, one drain routine delivers the outcome to every
//! waiter in the order they failed:
//!
//! - success: the new pair is stored and every waiter gets the new access
//!   token to retry with, once;
//! - failure: the store is cleared, every waiter gets
//!   [`AuthError::RenewalFailed`], and the session-ended callback fires once.
//!
//! The renewal runs on its own task, so it settles even if the request that
//! started it is dropped.

use std::collections::VecDeque;
use std::fmt;
use std::mem;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use tokio::sync::oneshot;
use tracing::{debug, info, instrument, warn};

use crate::error::{AuthError, Error, TransportError};
use crate::notifier::SessionNotifier;
use crate::traits::{CredentialStore, RenewalExchange};
use crate::types::Request;
use crate::{AccessToken, CredentialPair, RefreshToken, Result};

/// What a waiter receives when its episode settles.
type Decision = std::result::Result<AccessToken, AuthError>;

#[derive(Debug)]
enum Phase {
    Idle,
    Refreshing {
        episode: u64,
        waiters: VecDeque<oneshot::Sender<Decision>>,
    },
}

#[derive(Debug)]
struct RenewalState {
    phase: Phase,
    episodes: u64,
}

/// How a failed request proceeds.
enum Entry {
    /// The store already holds a newer access token; retry with it.
    Current(AccessToken),
    /// Wait for the current renewal episode.
    Waiting(oneshot::Receiver<Decision>),
}

/// Coordinates credential renewal across concurrent requests.
///
/// Cheap to clone; clones share state.
#[derive(Clone)]
pub struct RefreshCoordinator {
    inner: Arc<CoordinatorInner>,
}

struct CoordinatorInner {
    store: Arc<dyn CredentialStore>,
    renewal: Arc<dyn RenewalExchange>,
    notifier: SessionNotifier,
    renewal_timeout: Option<Duration>,
    state: Mutex<RenewalState>,
}

impl RefreshCoordinator {
    pub fn new(
        store: Arc<dyn CredentialStore>,
        renewal: Arc<dyn RenewalExchange>,
        notifier: SessionNotifier,
        renewal_timeout: Option<Duration>,
    ) -> Self {
        Self {
            inner: Arc::new(CoordinatorInner {
                store,
                renewal,
                notifier,
                renewal_timeout,
                state: Mutex::new(RenewalState {
                    phase: Phase::Idle,
                    episodes: 0,
                }),
            }),
        }
    }

    /// Resolve an authorization failure on `request`.
    ///
    /// `sent_with` is the access token the failed request carried. Returns the
    /// access token to retry with, or the error the caller should see:
    ///
    /// - failures that are not authorization failures are returned unchanged;
    /// - a request already carrying the retry marker gets
    ///   [`AuthError::RetryRejected`];
    /// - with no refresh token stored, [`AuthError::NoRefreshToken`].
    #[instrument(skip_all, fields(method = %request.method(), path = request.path()))]
    pub async fn recover(
        &self,
        request: &Request,
        sent_with: Option<&AccessToken>,
        failure: Error,
    ) -> Result<AccessToken> {
        if !failure.is_auth_failure() {
            return Err(failure);
        }

        if request.is_retried() {
            debug!("Retried request rejected again");
            return Err(AuthError::RetryRejected.into());
        }

        match self.enter(sent_with, false)? {
            Entry::Current(token) => {
                debug!("Credentials already renewed, retrying with stored token");
                Ok(token)
            }
            Entry::Waiting(rx) => wait(rx).await,
        }
    }

    /// Renew now, regardless of the current access token.
    ///
    /// Joins the in-flight renewal if there is one.
    #[instrument(skip_all)]
    pub async fn renew_now(&self) -> Result<AccessToken> {
        match self.enter(None, true)? {
            Entry::Current(token) => Ok(token),
            Entry::Waiting(rx) => wait(rx).await,
        }
    }

    /// Abandon any in-flight renewal.
    ///
    /// Waiters are rejected with [`AuthError::SessionEnded`]; when the
    /// abandoned exchange settles its result is discarded. Called after the
    /// credentials are cleared on logout.
    pub fn reset(&self) {
        let phase = mem::replace(&mut self.inner.lock_state().phase, Phase::Idle);
        if let Phase::Refreshing { episode, waiters } = phase {
            info!(episode, waiting = waiters.len(), "Abandoning token renewal");
            drain(waiters, Err(AuthError::SessionEnded));
        }
    }

    /// Returns true while a renewal exchange is in flight.
    pub fn is_refreshing(&self) -> bool {
        matches!(self.inner.lock_state().phase, Phase::Refreshing { .. })
    }

    /// Number of callers waiting on the in-flight renewal.
    pub fn waiting(&self) -> usize {
        match &self.inner.lock_state().phase {
            Phase::Refreshing { waiters, .. } => waiters.len(),
            Phase::Idle => 0,
        }
    }

    /// The `Idle -> Refreshing` gate. Holds the state lock only for its own
    /// duration, never across an await.
    fn enter(&self, sent_with: Option<&AccessToken>, force: bool) -> Result<Entry> {
        let mut state = self.inner.lock_state();

        if let Phase::Refreshing { episode, waiters } = &mut state.phase {
            let (tx, rx) = oneshot::channel();
            waiters.push_back(tx);
            debug!(
                episode = *episode,
                position = waiters.len(),
                "Renewal in progress, queued"
            );
            return Ok(Entry::Waiting(rx));
        }

        let pair = self
            .inner
            .store
            .get()?
            .ok_or(AuthError::NoRefreshToken)?;

        if !force && sent_with != Some(&pair.access_token) {
            return Ok(Entry::Current(pair.access_token));
        }

        let refresh_token = pair.refresh_token.ok_or(AuthError::NoRefreshToken)?;

        state.episodes += 1;
        let episode = state.episodes;
        let (tx, rx) = oneshot::channel();
        state.phase = Phase::Refreshing {
            episode,
            waiters: VecDeque::from([tx]),
        };
        drop(state);

        info!(episode, "Starting token renewal");
        let inner = Arc::clone(&self.inner);
        tokio::spawn(async move { inner.run_renewal(episode, refresh_token).await });

        Ok(Entry::Waiting(rx))
    }
}

impl CoordinatorInner {
    fn lock_state(&self) -> MutexGuard<'_, RenewalState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    async fn run_renewal(self: Arc<Self>, episode: u64, refresh_token: RefreshToken) {
        let outcome = self.exchange(&refresh_token).await;

        let waiters = {
            let mut state = self.lock_state();
            match mem::replace(&mut state.phase, Phase::Idle) {
                Phase::Refreshing {
                    episode: current,
                    waiters,
                } if current == episode => waiters,
                other => {
                    state.phase = other;
                    debug!(episode, "Renewal superseded, discarding result");
                    return;
                }
            }
        };

        match outcome {
            Ok(pair) => {
                let decision = self.commit(&refresh_token, pair);
                drain(waiters, decision);
            }
            Err(err) => {
                warn!(episode, error = %err, "Token renewal failed, ending session");
                if let Err(err) = self.store.clear() {
                    warn!(error = %err, "Failed to clear credentials");
                }
                // Notify first so callers see the session ended by the time
                // their error arrives.
                self.notifier.notify();
                drain(
                    waiters,
                    Err(AuthError::RenewalFailed {
                        reason: err.to_string(),
                    }),
                );
            }
        }
    }

    async fn exchange(&self, refresh_token: &RefreshToken) -> Result<CredentialPair> {
        let renewal = self.renewal.renew(refresh_token);
        match self.renewal_timeout {
            Some(limit) => tokio::time::timeout(limit, renewal)
                .await
                .unwrap_or_else(|_| {
                    Err(TransportError::Timeout {
                        duration_ms: limit.as_millis() as u64,
                    }
                    .into())
                }),
            None => renewal.await,
        }
    }

    /// Store a renewed pair unless the credentials changed underneath the
    /// exchange. A cleared store means the session ended; a different
    /// refresh token means a newer login, whose pair wins.
    fn commit(&self, used: &RefreshToken, pair: CredentialPair) -> Decision {
        match self.store.get() {
            Ok(Some(current)) if current.refresh_token.as_ref() != Some(used) => {
                info!("Credentials replaced during renewal, using stored pair");
                Ok(current.access_token)
            }
            Ok(None) => {
                info!("Credentials cleared during renewal, discarding renewed pair");
                Err(AuthError::SessionEnded)
            }
            Ok(Some(_)) | Err(_) => {
                if let Err(err) = self.store.set(&pair) {
                    warn!(error = %err, "Failed to persist renewed credentials");
                }
                info!("Token renewal succeeded");
                Ok(pair.access_token)
            }
        }
    }
}

/// Deliver one decision to every waiter, oldest first.
fn drain(waiters: VecDeque<oneshot::Sender<Decision>>, decision: Decision) {
    for waiter in waiters {
        // A dropped receiver means the caller went away; nothing to deliver.
        let _ = waiter.send(decision.clone());
    }
}

async fn wait(rx: oneshot::Receiver<Decision>) -> Result<AccessToken> {
    match rx.await {
        Ok(decision) => decision.map_err(Error::from),
        Err(_) => Err(AuthError::SessionEnded.into()),
    }
}

impl fmt::Debug for RefreshCoordinator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RefreshCoordinator")
            .field("refreshing", &self.is_refreshing())
            .field("waiting", &self.waiting())
            .field("renewal_timeout", &self.inner.renewal_timeout)
            .finish()
    }
}
