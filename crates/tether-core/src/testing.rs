//! In-process fakes for exercising the client and coordinator.

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::json;
use tokio::sync::{Notify, Semaphore};

use crate::error::StatusError;
use crate::traits::{RenewalExchange, Transport};
use crate::types::{Request, Response};
use crate::{AccessToken, CredentialPair, RefreshToken, Result};

/// One call seen by [`FakeTransport`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct SentRequest {
    pub path: String,
    pub token: Option<String>,
    pub retried: bool,
}

/// Accepts requests carrying one of its valid tokens and answers 401
/// otherwise. Paths starting with `/fail` answer 500.
#[derive(Debug, Default)]
pub(crate) struct FakeTransport {
    valid: Mutex<HashSet<String>>,
    sent: Mutex<Vec<SentRequest>>,
}

impl FakeTransport {
    pub fn new(valid: &[&str]) -> Arc<Self> {
        Arc::new(Self {
            valid: Mutex::new(valid.iter().map(|t| t.to_string()).collect()),
            sent: Mutex::new(Vec::new()),
        })
    }

    pub fn accept(&self, token: &str) {
        self.valid.lock().unwrap().insert(token.to_string());
    }

    pub fn sent(&self) -> Vec<SentRequest> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Transport for FakeTransport {
    async fn send(&self, request: &Request, token: Option<&AccessToken>) -> Result<Response> {
        self.sent.lock().unwrap().push(SentRequest {
            path: request.path().to_string(),
            token: token.map(|t| t.as_str().to_string()),
            retried: request.is_retried(),
        });

        if request.path().starts_with("/fail") {
            return Err(StatusError::new(500, None, Some("boom".into())).into());
        }

        let authorized = token.is_some_and(|t| self.valid.lock().unwrap().contains(t.as_str()));
        if !authorized {
            return Err(StatusError::new(
                401,
                Some("token_not_valid".into()),
                Some("Given token not valid for any token type".into()),
            )
            .into());
        }

        let body = json!({
            "path": request.path(),
            "authorization": token.map(AccessToken::bearer),
        });
        Ok(Response::new(200, body.to_string()))
    }
}

/// Renewal exchange returning a fixed pair (or failing), optionally held
/// until [`FakeRenewal::release`] is called.
pub(crate) struct FakeRenewal {
    transport: Arc<FakeTransport>,
    outcome: Option<CredentialPair>,
    gate: Option<Semaphore>,
    started: Notify,
    calls: AtomicUsize,
    completed: AtomicUsize,
    used: Mutex<Vec<String>>,
}

impl FakeRenewal {
    fn build(
        transport: Arc<FakeTransport>,
        outcome: Option<CredentialPair>,
        gated: bool,
    ) -> Arc<Self> {
        Arc::new(Self {
            transport,
            outcome,
            gate: gated.then(|| Semaphore::new(0)),
            started: Notify::new(),
            calls: AtomicUsize::new(0),
            completed: AtomicUsize::new(0),
            used: Mutex::new(Vec::new()),
        })
    }

    /// Succeeds immediately; the transport starts accepting the new token.
    pub fn new(transport: Arc<FakeTransport>, pair: CredentialPair) -> Arc<Self> {
        Self::build(transport, Some(pair), false)
    }

    /// Succeeds once released.
    pub fn gated(transport: Arc<FakeTransport>, pair: CredentialPair) -> Arc<Self> {
        Self::build(transport, Some(pair), true)
    }

    /// Fails once released.
    pub fn failing_gated(transport: Arc<FakeTransport>) -> Arc<Self> {
        Self::build(transport, None, true)
    }

    pub fn release(&self) {
        if let Some(gate) = &self.gate {
            gate.add_permits(1);
        }
    }

    pub async fn wait_started(&self) {
        self.started.notified().await;
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn completed(&self) -> usize {
        self.completed.load(Ordering::SeqCst)
    }

    pub fn used(&self) -> Vec<String> {
        self.used.lock().unwrap().clone()
    }
}

#[async_trait]
impl RenewalExchange for FakeRenewal {
    async fn renew(&self, refresh_token: &RefreshToken) -> Result<CredentialPair> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.used
            .lock()
            .unwrap()
            .push(refresh_token.as_str().to_string());
        self.started.notify_one();

        if let Some(gate) = &self.gate {
            gate.acquire().await.unwrap().forget();
        }

        let result = match &self.outcome {
            Some(pair) => {
                self.transport.accept(pair.access_token.as_str());
                Ok(pair.clone())
            }
            None => Err(StatusError::new(
                401,
                Some("token_not_valid".into()),
                Some("Token is invalid or expired".into()),
            )
            .into()),
        };
        self.completed.fetch_add(1, Ordering::SeqCst);
        result
    }
}
