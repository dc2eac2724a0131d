//! In-memory credential store.

use std::sync::RwLock;

use crate::traits::CredentialStore;
use crate::{CredentialPair, Result};

/// A [`CredentialStore`] that keeps the pair in process memory.
///
/// Useful for tests and for applications that persist credentials elsewhere.
#[derive(Debug, Default)]
pub struct MemoryStore {
    pair: RwLock<Option<CredentialPair>>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store already holding `pair`.
    pub fn with_pair(pair: CredentialPair) -> Self {
        Self {
            pair: RwLock::new(Some(pair)),
        }
    }
}

impl CredentialStore for MemoryStore {
    fn get(&self) -> Result<Option<CredentialPair>> {
        let pair = self.pair.read().unwrap_or_else(|e| e.into_inner());
        Ok(pair.clone())
    }

    fn set(&self, pair: &CredentialPair) -> Result<()> {
        let mut slot = self.pair.write().unwrap_or_else(|e| e.into_inner());
        *slot = Some(pair.clone());
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        let mut slot = self.pair.write().unwrap_or_else(|e| e.into_inner());
        *slot = None;
        Ok(())
    }
}
