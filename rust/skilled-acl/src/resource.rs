//! Resource scoping for capability grants.
//!
//! A [`Resource`] narrows a granted capability down to a set of concrete
//! records of one kind (articles `5` and `7`, posts `10` and `11`) or lets it
//! apply to every record of that kind.
//!
//! ```text
//! Resource { kind: "Article", scope: Only {5, 7} }
//!   ∪ Resource { kind: "Article", scope: Only {7, 9} }  → Only {5, 7, 9}
//!   ∪ Resource { kind: "Article", scope: All }          → All
//! ```

use std::collections::BTreeSet;
use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

/// Tag identifying a kind of resource (e.g. `"Article"`).
///
/// Resources of different kinds attached to the same permission node are
/// filed under their tag and never merged with each other.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResourceType(String);

impl ResourceType {
    /// Create a new resource type tag.
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// The tag as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ResourceType {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for ResourceType {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl Display for ResourceType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifier of a single record within a resource type.
///
/// Numeric keys are stored in their decimal form so that `5u64` and `"5"`
/// name the same record.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResourceId(String);

impl ResourceId {
    /// The identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ResourceId {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

impl From<String> for ResourceId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

macro_rules! numeric_resource_id {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for ResourceId {
                fn from(value: $ty) -> Self {
                    Self(value.to_string())
                }
            }
        )*
    };
}

numeric_resource_id!(u32, u64, i32, i64, usize);

impl Display for ResourceId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// The records a grant covers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceSet {
    /// Every record of the resource type.
    All,
    /// Exactly the listed records.
    Only(BTreeSet<ResourceId>),
}

impl Default for ResourceSet {
    fn default() -> Self {
        Self::Only(BTreeSet::new())
    }
}

impl ResourceSet {
    /// Merge `other` into this set. `All` absorbs everything.
    pub fn union(&mut self, other: &ResourceSet) {
        match other {
            ResourceSet::All => *self = ResourceSet::All,
            ResourceSet::Only(theirs) => {
                if let ResourceSet::Only(ours) = self {
                    ours.extend(theirs.iter().cloned());
                }
            }
        }
    }

    /// Whether the record `id` is covered.
    pub fn has(&self, id: &ResourceId) -> bool {
        match self {
            ResourceSet::All => true,
            ResourceSet::Only(ids) => ids.contains(id),
        }
    }
}

/// A typed set of records a capability grant is scoped to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resource {
    kind: ResourceType,
    scope: ResourceSet,
}

impl Resource {
    /// An empty resource of the given type; covers no records until
    /// identifiers are added.
    pub fn new(kind: impl Into<ResourceType>) -> Self {
        Self {
            kind: kind.into(),
            scope: ResourceSet::default(),
        }
    }

    /// A resource covering exactly `ids`.
    pub fn only<I, T>(kind: impl Into<ResourceType>, ids: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<ResourceId>,
    {
        Self {
            kind: kind.into(),
            scope: ResourceSet::Only(ids.into_iter().map(Into::into).collect()),
        }
    }

    /// A resource covering every record of its type.
    pub fn all(kind: impl Into<ResourceType>) -> Self {
        Self {
            kind: kind.into(),
            scope: ResourceSet::All,
        }
    }

    /// The type tag this resource is filed under.
    pub fn kind(&self) -> &ResourceType {
        &self.kind
    }

    /// Add a single record. No effect once the resource accepts all.
    pub fn insert(&mut self, id: impl Into<ResourceId>) {
        if let ResourceSet::Only(ids) = &mut self.scope {
            ids.insert(id.into());
        }
    }

    /// Merge the records of `other` into this resource.
    ///
    /// Both sides are expected to share a type tag; callers file resources by
    /// tag before merging.
    pub fn union(&mut self, other: &Resource) {
        debug_assert_eq!(self.kind, other.kind, "union across resource types");
        self.scope.union(&other.scope);
    }

    /// Whether the record `id` is covered.
    pub fn has(&self, id: &ResourceId) -> bool {
        self.scope.has(id)
    }

    /// Whether every record is covered.
    pub fn all_accept(&self) -> bool {
        matches!(self.scope, ResourceSet::All)
    }

    /// Widen this resource to cover every record.
    pub fn accept_all(&mut self) {
        self.scope = ResourceSet::All;
    }

    /// The explicitly listed records, or `None` when all are accepted.
    pub fn identifiers(&self) -> Option<&BTreeSet<ResourceId>> {
        match &self.scope {
            ResourceSet::All => None,
            ResourceSet::Only(ids) => Some(ids),
        }
    }
}
