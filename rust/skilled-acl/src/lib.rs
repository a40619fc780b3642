#![warn(missing_docs)]

//! Hierarchical permission trees with resource scoping.
//!
//! Capabilities are dotted paths (`article.edit`, `admin.*`). Granting one
//! stores it in a trie with one node per segment; each node may additionally
//! carry, per resource type, the set of records the grant is limited to.
//!
//! # Matching
//!
//! | Granted         | Query                | Allowed |
//! |-----------------|----------------------|---------|
//! | `article.edit`  | `article.edit`       | yes     |
//! | `article.edit`  | `article`            | no      |
//! | `article`       | `article.edit`       | yes     |
//! | `article.edit`  | `article.*`          | yes     |
//! | `article.*`     | `article.delete`     | yes     |
//!
//! A `*` segment in a query fans out over every granted child; a granted `*`
//! segment stands in for any single queried segment.
//!
//! # Resource scoping
//!
//! [`Acl::is_allowed_on`] additionally requires the record to be covered by
//! a [`Resource`] of the queried type on the granting node.
//! [`Acl::resources_for`] collects, along a capability path, the union of the
//! records granted for a resource type; data access code uses it to narrow
//! queries.
//!
//! ```
//! use skilled_acl::{Acl, Resource};
//!
//! let mut acl = Acl::new();
//! acl.allow("article", &[Resource::only("Article", [1u64])]);
//! acl.allow("article.edit", &[Resource::only("Article", [2u64])]);
//!
//! let scope = acl.resources_for("article.edit", "Article").unwrap();
//! assert!(scope.has(&1u64.into()));
//! assert!(scope.has(&2u64.into()));
//! ```

mod resource;
pub use resource::*;

mod path;
pub use path::*;

mod node;
pub use node::*;

mod acl;
pub use acl::*;
