//! In-memory collaborators shared by the integration tests.
#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use serde_json::Value;
use skilled_auth::{
    AuthenticationConfig, AuthenticationError, MemorySession, SessionError, SessionStore, User,
    UserKey, UserStore,
};

#[derive(Default)]
pub struct MemoryUsers {
    users: HashMap<UserKey, (User, String)>,
}

impl MemoryUsers {
    pub fn with_user(mut self, user: User, password: &str) -> Self {
        self.users
            .insert(user.key.clone(), (user, password.to_string()));
        self
    }
}

#[async_trait]
impl UserStore for MemoryUsers {
    type Error = AuthenticationError;

    async fn find(&self, key: &UserKey) -> Result<Option<User>, Self::Error> {
        Ok(self.users.get(key).map(|(user, _)| user.clone()))
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, Self::Error> {
        Ok(self
            .users
            .values()
            .find(|(user, _)| user.username == username)
            .map(|(user, _)| user.clone()))
    }

    async fn verify_password(&self, user: &User, password: &str) -> Result<bool, Self::Error> {
        Ok(self
            .users
            .get(&user.key)
            .is_some_and(|(_, expected)| expected == password))
    }
}

/// A session over a [MemorySession] that can be told to refuse writes of the
/// user key. Clones share both the values and the switch.
#[derive(Clone, Default)]
pub struct RejectingSession {
    inner: MemorySession,
    reject_user_key: Arc<AtomicBool>,
}

impl RejectingSession {
    pub fn new(inner: MemorySession) -> Self {
        Self {
            inner,
            reject_user_key: Arc::default(),
        }
    }

    pub fn reject_user_writes(&self) {
        self.reject_user_key.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl SessionStore for RejectingSession {
    async fn get(&self, key: &str) -> Result<Option<Value>, SessionError> {
        self.inner.get(key).await
    }

    async fn set(&mut self, key: &str, value: Value) -> Result<(), SessionError> {
        let user_key = AuthenticationConfig::default().user_session_key;
        if key == user_key && self.reject_user_key.load(Ordering::SeqCst) {
            return Err(SessionError::Backend(format!("write to {key} refused")));
        }
        self.inner.set(key, value).await
    }

    async fn destroy(&mut self) -> Result<(), SessionError> {
        self.inner.destroy().await
    }
}
