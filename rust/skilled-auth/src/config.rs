use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Session key holding the identity of the logged in user.
pub const DEFAULT_USER_SESSION_KEY: &str = "authentication.user";

/// Session key holding the serialized permission tree.
pub const DEFAULT_PERMISSIONS_SESSION_KEY: &str = "authentication.capabilities";

/// Configuration for the authentication service
///
/// Deserializes from a settings document; missing fields keep their
/// defaults.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthenticationConfig {
    /// Session key under which the user's identity key is stored
    pub user_session_key: String,

    /// Session key under which the permission tree is stored
    pub permissions_session_key: String,

    /// Seconds to wait before answering a rejected login. `None` or `0`
    /// answers immediately.
    pub delay_after_login_failed: Option<u64>,
}

impl Default for AuthenticationConfig {
    fn default() -> Self {
        Self {
            user_session_key: DEFAULT_USER_SESSION_KEY.to_string(),
            permissions_session_key: DEFAULT_PERMISSIONS_SESSION_KEY.to_string(),
            delay_after_login_failed: None,
        }
    }
}

impl AuthenticationConfig {
    /// Create a configuration with default session keys and no delay
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the session key for the user's identity
    pub fn with_user_session_key(mut self, key: impl Into<String>) -> Self {
        self.user_session_key = key.into();
        self
    }

    /// Set the session key for the permission tree
    pub fn with_permissions_session_key(mut self, key: impl Into<String>) -> Self {
        self.permissions_session_key = key.into();
        self
    }

    /// Set the delay applied after a rejected login
    pub fn with_delay_after_login_failed(mut self, seconds: u64) -> Self {
        self.delay_after_login_failed = Some(seconds);
        self
    }

    /// The delay applied after a rejected login, if any
    pub fn login_failure_delay(&self) -> Option<Duration> {
        self.delay_after_login_failed
            .filter(|seconds| *seconds > 0)
            .map(Duration::from_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn it_fills_missing_fields_with_defaults() {
        let config: AuthenticationConfig =
            serde_json::from_str(r#"{ "delay_after_login_failed": 2 }"#).unwrap();

        assert_eq!(config.user_session_key, DEFAULT_USER_SESSION_KEY);
        assert_eq!(config.permissions_session_key, DEFAULT_PERMISSIONS_SESSION_KEY);
        assert_eq!(config.login_failure_delay(), Some(Duration::from_secs(2)));
    }

    #[test]
    fn it_treats_a_zero_delay_as_no_delay() {
        let config = AuthenticationConfig::new().with_delay_after_login_failed(0);
        assert_eq!(config.login_failure_delay(), None);
    }

    #[test]
    fn it_overrides_session_keys() {
        let config = AuthenticationConfig::new()
            .with_user_session_key("auth.who")
            .with_permissions_session_key("auth.acl");

        assert_eq!(config.user_session_key, "auth.who");
        assert_eq!(config.permissions_session_key, "auth.acl");
    }
}
