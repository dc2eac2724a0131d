//! Session-ended notification slot.

use std::fmt;
use std::sync::{Arc, Mutex};

type Callback = Arc<dyn Fn() + Send + Sync>;

/// A single-slot callback invoked when the session can no longer be renewed.
///
/// Registering a callback replaces the previous one. Clones share the slot.
#[derive(Clone, Default)]
pub struct SessionNotifier {
    slot: Arc<Mutex<Option<Callback>>>,
}

impl SessionNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the callback, replacing any previous registration.
    pub fn register<F>(&self, callback: F)
    where
        F: Fn() + Send + Sync + 'static,
    {
        let mut slot = self.slot.lock().unwrap_or_else(|e| e.into_inner());
        *slot = Some(Arc::new(callback));
    }

    /// Invoke the registered callback.
    ///
    /// Returns false if nothing is registered. The callback runs outside the
    /// slot lock, so it may re-register.
    pub fn notify(&self) -> bool {
        let callback = {
            let slot = self.slot.lock().unwrap_or_else(|e| e.into_inner());
            slot.clone()
        };

        match callback {
            Some(callback) => {
                callback();
                true
            }
            None => false,
        }
    }
}

impl fmt::Debug for SessionNotifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let registered = self
            .slot
            .lock()
            .map(|slot| slot.is_some())
            .unwrap_or(false);
        f.debug_struct("SessionNotifier")
            .field("registered", &registered)
            .finish()
    }
}
