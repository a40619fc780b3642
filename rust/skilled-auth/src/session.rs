use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;
use tokio::sync::RwLock;

/// Errors that can occur when working with a session store
#[derive(Error, Debug)]
pub enum SessionError {
    /// The underlying session storage failed
    #[error("Session backend error: {0}")]
    Backend(String),
}

/// A [SessionStore] holds the values attached to one client session for as
/// long as that session lives.
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
pub trait SessionStore: Send + Sync {
    /// Retrieve the value (if any) stored against the given key
    async fn get(&self, key: &str) -> Result<Option<Value>, SessionError>;

    /// Store the given value against the given key
    async fn set(&mut self, key: &str, value: Value) -> Result<(), SessionError>;

    /// Drop every value of the session
    async fn destroy(&mut self) -> Result<(), SessionError>;
}

/// A trivial [SessionStore] backed by a [HashMap]. Clones share the same
/// session.
#[derive(Clone, Debug, Default)]
pub struct MemorySession {
    entries: Arc<RwLock<HashMap<String, Value>>>,
}

impl MemorySession {
    /// Create an empty session
    pub fn new() -> Self {
        Self::default()
    }
}

#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
impl SessionStore for MemorySession {
    async fn get(&self, key: &str) -> Result<Option<Value>, SessionError> {
        let entries = self.entries.read().await;
        Ok(entries.get(key).cloned())
    }

    async fn set(&mut self, key: &str, value: Value) -> Result<(), SessionError> {
        let mut entries = self.entries.write().await;
        entries.insert(key.to_owned(), value);
        Ok(())
    }

    async fn destroy(&mut self) -> Result<(), SessionError> {
        self.entries.write().await.clear();
        Ok(())
    }
}
