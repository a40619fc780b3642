use skilled_acl::ResourceType;
use thiserror::Error;

use crate::SessionError;

/// The common error type used by this crate
#[derive(Error, Debug)]
pub enum AuthenticationError {
    /// A role declares support for a resource type nobody registered
    #[error("Unknown resource type: {0}")]
    UnknownResourceType(ResourceType),

    /// A resource factory could not build the records of a role assignment
    #[error("Failed to build resource {kind}: {reason}")]
    ResourceBuild {
        /// The resource type being built.
        kind: ResourceType,
        /// What went wrong.
        reason: String,
    },

    /// A resource factory produced a resource filed under another type
    #[error("Resource factory for {expected} built a {actual} resource")]
    MismatchedResourceType {
        /// The type the factory is registered for.
        expected: ResourceType,
        /// The type of the resource it returned.
        actual: ResourceType,
    },

    /// An error that occurs when working with the user store
    #[error("User store error: {0}")]
    UserStore(String),

    /// An error that occurs when reading or writing the session
    #[error("Session error: {0}")]
    Session(#[from] SessionError),

    /// Session values could not be encoded or decoded
    #[error("Failed to serialize/deserialize session value: {0}")]
    Serialization(String),

    /// The session holds no permission tree
    #[error("No permissions loaded for the current session")]
    MissingPermissions,
}

impl From<serde_json::Error> for AuthenticationError {
    fn from(error: serde_json::Error) -> Self {
        AuthenticationError::Serialization(error.to_string())
    }
}
