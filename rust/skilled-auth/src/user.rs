//! Users and roles as handed over by the user store.

use std::fmt::{Display, Formatter};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use skilled_acl::ResourceType;

use crate::AuthenticationError;

macro_rules! key_type {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// The key as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_owned())
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }

        impl From<u64> for $name {
            fn from(value: u64) -> Self {
                Self(value.to_string())
            }
        }

        impl Display for $name {
            fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

key_type!(
    /// Primary key of a user in the user store.
    UserKey
);

key_type!(
    /// Key of the assignment linking a user to one of their roles. Resource
    /// factories use it to look up which records the assignment covers.
    AssignmentKey
);

/// A role held by a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    /// Role name, for diagnostics.
    pub name: String,
    /// The user-to-role assignment this role was reached through.
    pub assignment: AssignmentKey,
    /// Dotted capabilities the role grants.
    #[serde(default)]
    pub permissions: Vec<String>,
    /// Resource types the role's grants are scoped by. When absent the role
    /// is granted every registered resource type without restriction.
    #[serde(default)]
    pub resources_support: Option<Vec<ResourceType>>,
}

impl Role {
    /// Create a role without permissions or resource support.
    pub fn new(name: impl Into<String>, assignment: impl Into<AssignmentKey>) -> Self {
        Self {
            name: name.into(),
            assignment: assignment.into(),
            permissions: Vec::new(),
            resources_support: None,
        }
    }

    /// Add a granted capability.
    pub fn with_permission(mut self, permission: impl Into<String>) -> Self {
        self.permissions.push(permission.into());
        self
    }

    /// Scope the role's grants by `kind`.
    pub fn with_resource_support(mut self, kind: impl Into<ResourceType>) -> Self {
        self.resources_support
            .get_or_insert_with(Vec::new)
            .push(kind.into());
        self
    }

    /// The declared resource types, or `None` when the role declares none.
    /// An empty declaration counts as none.
    pub fn supported_resources(&self) -> Option<&[ResourceType]> {
        self.resources_support
            .as_deref()
            .filter(|kinds| !kinds.is_empty())
    }
}

/// An authenticated user and the roles they hold.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Identity key, kept in the session while logged in.
    pub key: UserKey,
    /// Login name.
    pub username: String,
    /// Roles in the order the user store lists them.
    #[serde(default)]
    pub roles: Vec<Role>,
}

impl User {
    /// Create a user without roles.
    pub fn new(key: impl Into<UserKey>, username: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            username: username.into(),
            roles: Vec::new(),
        }
    }

    /// Add a role.
    pub fn with_role(mut self, role: Role) -> Self {
        self.roles.push(role);
        self
    }
}

/// Username and password submitted to a login.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Credentials {
    /// Submitted login name.
    pub username: String,
    /// Submitted password.
    pub password: String,
}

impl Credentials {
    /// Create credentials from a username and password.
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

/// A [UserStore] looks users up and checks their passwords. How passwords
/// are hashed is entirely up to the implementer.
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
pub trait UserStore: Send + Sync {
    /// The error type produced by this [UserStore]
    type Error: Into<AuthenticationError>;

    /// Retrieve a user by identity key
    async fn find(&self, key: &UserKey) -> Result<Option<User>, Self::Error>;

    /// Retrieve a user by login name
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, Self::Error>;

    /// Whether `password` is the password of `user`
    async fn verify_password(&self, user: &User, password: &str) -> Result<bool, Self::Error>;
}
