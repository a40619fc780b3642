use serde_json::from_value;
use skilled_acl::{Acl, ResourceType};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::{
    AuthenticationConfig, AuthenticationError, Credentials, ProfileLoader, ResourceCatalog,
    ResourceFactory, Securable, SessionStore, User, UserKey, UserStore,
};

/// Why a login was turned down.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginFailure {
    /// No username was submitted
    #[error("The username field is required")]
    UsernameRequired,

    /// No password was submitted
    #[error("The password field is required")]
    PasswordRequired,

    /// No user has this username, or the password does not match
    #[error("Invalid username or password")]
    InvalidAccount,
}

impl LoginFailure {
    /// The submitted field the failure is reported against.
    pub fn field(&self) -> &'static str {
        match self {
            LoginFailure::UsernameRequired | LoginFailure::InvalidAccount => "username",
            LoginFailure::PasswordRequired => "password",
        }
    }
}

/// Result of a login attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginOutcome {
    /// The user is logged in and their permissions are stored in the session
    Authenticated(User),
    /// The credentials were turned down
    Rejected(Vec<LoginFailure>),
}

impl LoginOutcome {
    /// Whether the login succeeded.
    pub fn is_authenticated(&self) -> bool {
        matches!(self, LoginOutcome::Authenticated(_))
    }
}

/// Session-scoped authentication: logs users in and out and answers
/// permission checks from the permission tree stored at login.
pub struct Authentication<Users, Session>
where
    Users: UserStore,
    Session: SessionStore,
{
    config: AuthenticationConfig,
    users: Users,
    session: Session,
    catalog: ResourceCatalog,
    user: Option<User>,
}

impl<Users, Session> Authentication<Users, Session>
where
    Users: UserStore,
    Session: SessionStore,
{
    /// Create the service over a user store and the current session.
    pub fn new(config: AuthenticationConfig, users: Users, session: Session) -> Self {
        Self {
            config,
            users,
            session,
            catalog: ResourceCatalog::new(),
            user: None,
        }
    }

    /// Register a resource type.
    pub fn add_resource<F>(&mut self, factory: F) -> &mut Self
    where
        F: ResourceFactory + 'static,
    {
        self.catalog.register(factory);
        self
    }

    /// Every registered resource type.
    pub fn resources(&self) -> Vec<ResourceType> {
        self.catalog.resource_types()
    }

    /// Check `credentials` and, when they match a user, load that user's
    /// permissions into the session.
    ///
    /// Both fields are trimmed and required. Rejections wait for the
    /// configured delay before returning.
    pub async fn login(
        &mut self,
        credentials: &Credentials,
    ) -> Result<LoginOutcome, AuthenticationError> {
        let username = credentials.username.trim();
        let password = credentials.password.trim();

        let mut failures = Vec::new();
        let mut account = None;

        if username.is_empty() {
            failures.push(LoginFailure::UsernameRequired);
        } else {
            let found = self
                .users
                .find_by_username(username)
                .await
                .map_err(Into::<AuthenticationError>::into)?;

            let verified = match &found {
                Some(user) => self
                    .users
                    .verify_password(user, password)
                    .await
                    .map_err(Into::<AuthenticationError>::into)?,
                None => false,
            };

            if verified {
                account = found;
            } else {
                failures.push(LoginFailure::InvalidAccount);
            }
        }

        if password.is_empty() {
            failures.push(LoginFailure::PasswordRequired);
        }

        match account {
            Some(user) if failures.is_empty() => {
                let loaded = ProfileLoader::new(&self.catalog, &self.config)
                    .load(&user, &mut self.session)
                    .await;
                if let Err(error) = loaded {
                    self.user = None;
                    return Err(error);
                }
                info!(user = %user.key, "login succeeded");

                self.user = Some(user.clone());
                Ok(LoginOutcome::Authenticated(user))
            }
            _ => {
                warn!(username, ?failures, "login rejected");
                if let Some(delay) = self.config.login_failure_delay() {
                    tokio::time::sleep(delay).await;
                }
                Ok(LoginOutcome::Rejected(failures))
            }
        }
    }

    /// End the session.
    pub async fn logout(&mut self) -> Result<(), AuthenticationError> {
        self.session.destroy().await?;
        if let Some(user) = self.user.take() {
            info!(user = %user.key, "logged out");
        }
        Ok(())
    }

    /// The permission tree stored at login, if any.
    pub async fn permissions(&self) -> Result<Option<Acl>, AuthenticationError> {
        match self.session.get(&self.config.permissions_session_key).await? {
            Some(value) => Ok(Some(from_value(value)?)),
            None => Ok(None),
        }
    }

    /// Whether the session's user holds `permission`. False when nobody is
    /// logged in.
    pub async fn user_can(&self, permission: &str) -> Result<bool, AuthenticationError> {
        Ok(self
            .permissions()
            .await?
            .is_some_and(|acl| acl.is_allowed(permission)))
    }

    /// The logged in user, reloaded from the user store on first access.
    pub async fn user(&mut self) -> Result<Option<User>, AuthenticationError> {
        if let Some(user) = &self.user {
            return Ok(Some(user.clone()));
        }

        let Some(value) = self.session.get(&self.config.user_session_key).await? else {
            return Ok(None);
        };

        let key: UserKey = from_value(value)?;
        debug!(user = %key, "reloading session user");
        let user = self
            .users
            .find(&key)
            .await
            .map_err(Into::<AuthenticationError>::into)?;

        self.user = user.clone();
        Ok(user)
    }

    /// Whether a user is logged in.
    pub async fn is_logged_in(&mut self) -> Result<bool, AuthenticationError> {
        Ok(self.user().await?.is_some())
    }

    /// Narrow `query` to the records the session may touch under
    /// `capability`. See [`Securable::secure`].
    pub async fn secure<M>(
        &self,
        model: &M,
        capability: &str,
        query: &mut M::Query,
    ) -> Result<(), AuthenticationError>
    where
        M: Securable,
    {
        let acl = self
            .permissions()
            .await?
            .ok_or(AuthenticationError::MissingPermissions)?;
        model.secure(&acl, capability, query);
        Ok(())
    }
}
