#![warn(missing_docs)]

//! Session authentication backed by hierarchical permission trees.
//!
//! At login the roles of a user are turned into an [`Acl`] by the
//! [`ProfileLoader`] and stored in the session; later requests answer
//! permission checks from the stored tree without touching the user store.
//!
//! # Collaborators
//!
//! | Trait | Supplies |
//! |-------|----------|
//! | [`UserStore`] | Users, their roles and password checks |
//! | [`ResourceFactory`] | Records a role assignment is limited to, per resource type |
//! | [`SessionStore`] | Per-session key/value storage |
//! | [`Securable`] | Query filters per resource type, for data scoping |
//!
//! # Roles and resources
//!
//! A role declaring `resources_support` has its grants scoped to the records
//! the declared factories report for the role's assignment. A role declaring
//! nothing is granted every registered resource type in full.
//!
//! [`Acl`]: skilled_acl::Acl

mod error;
pub use error::*;

mod config;
pub use config::*;

mod session;
pub use session::*;

mod user;
pub use user::*;

mod catalog;
pub use catalog::*;

mod loader;
pub use loader::*;

mod secure;
pub use secure::*;

mod authentication;
pub use authentication::*;
