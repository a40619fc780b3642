//! Permission tree nodes.
//!
//! Each node stands for one segment of a dotted capability. Following the
//! segments `s1 … sn` from the root reaches the node for `s1.….sn`:
//!
//! ```text
//! root
//!   ├── article            allowed, Article: {1}
//!   │     ├── edit         allowed, Article: {2}
//!   │     └── delete
//!   └── admin
//!         └── *            allowed, Article: all
//! ```
//!
//! A child literally named `*` is a wildcard grant and stands in for any
//! single segment during lookups. A `*` segment in a *query* instead fans out
//! over every child.

use std::collections::BTreeMap;
use std::collections::btree_map::Entry;

use serde::{Deserialize, Serialize};

use crate::{Resource, ResourceId, ResourceType, WILDCARD};

/// A node of the permission tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AclNode {
    name: String,
    allowed: bool,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    children: BTreeMap<String, AclNode>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    resources: BTreeMap<ResourceType, Resource>,
}

impl AclNode {
    /// Create a childless node with no resources attached.
    pub fn new(name: impl Into<String>, allowed: bool) -> Self {
        Self {
            name: name.into(),
            allowed,
            children: BTreeMap::new(),
            resources: BTreeMap::new(),
        }
    }

    /// The path segment this node represents.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether the capability ending at this node is granted outright.
    pub fn granted(&self) -> bool {
        self.allowed
    }

    /// Direct children keyed by segment.
    pub fn children(&self) -> &BTreeMap<String, AclNode> {
        &self.children
    }

    /// The child for `segment`, if one was ever granted below this node.
    pub fn child(&self, segment: &str) -> Option<&AclNode> {
        self.children.get(segment)
    }

    /// Resources attached to this node, keyed by type.
    pub fn resources(&self) -> &BTreeMap<ResourceType, Resource> {
        &self.resources
    }

    /// The resource of `kind` attached to this node.
    pub fn resource(&self, kind: &ResourceType) -> Option<&Resource> {
        self.resources.get(kind)
    }

    /// Whether this node's resource of `kind` covers `id`. False when no
    /// resource of that kind is attached.
    pub fn has_resource(&self, kind: &ResourceType, id: &ResourceId) -> bool {
        self.resources
            .get(kind)
            .is_some_and(|resource| resource.has(id))
    }

    /// Attach `resource`, merging it into an existing resource of the same
    /// type.
    pub fn add_resource(&mut self, resource: Resource) -> &mut Self {
        match self.resources.entry(resource.kind().clone()) {
            Entry::Vacant(entry) => {
                entry.insert(resource);
            }
            Entry::Occupied(mut entry) => entry.get_mut().union(&resource),
        }
        self
    }

    /// Grant the capability formed by `path` below this node, scoped to
    /// `resources`.
    ///
    /// Missing nodes along the way are created ungranted. Granting the same
    /// path again merges resources instead of replacing them.
    pub fn allow(&mut self, path: &[String], resources: &[Resource]) {
        match path.split_first() {
            Some((segment, rest)) => self
                .children
                .entry(segment.clone())
                .or_insert_with(|| AclNode::new(segment.clone(), false))
                .allow(rest, resources),
            None => {
                self.allowed = true;
                for resource in resources {
                    self.add_resource(resource.clone());
                }
            }
        }
    }

    /// Whether the capability formed by `path` below this node is granted,
    /// optionally for the single record `target`.
    ///
    /// Every node on the way down is checked, so a granted ancestor answers
    /// for all of its descendants.
    pub fn is_allowed(
        &self,
        path: &[String],
        target: Option<(&ResourceType, &ResourceId)>,
    ) -> bool {
        if self.allowed && target.is_none_or(|(kind, id)| self.has_resource(kind, id)) {
            return true;
        }

        let Some((segment, rest)) = path.split_first() else {
            return false;
        };

        if segment == WILDCARD {
            return self
                .children
                .values()
                .any(|child| child.is_allowed(rest, target));
        }

        if self
            .children
            .get(segment)
            .is_some_and(|child| child.is_allowed(rest, target))
        {
            return true;
        }

        self.children
            .get(WILDCARD)
            .is_some_and(|child| child.is_allowed(rest, target))
    }

    /// The records of `kind` covered along `path`.
    ///
    /// Resources of this node are merged with whatever the matching
    /// descendants carry, so a scope granted on `article` still applies when
    /// asking about `article.edit`. Stored resources are never modified; the
    /// result is a fresh value.
    pub fn resources_for(&self, path: &[String], kind: &ResourceType) -> Option<Resource> {
        let own = self.resources.get(kind).cloned();

        let Some((segment, rest)) = path.split_first() else {
            return own;
        };

        let exact = self
            .children
            .get(segment)
            .and_then(|child| child.resources_for(rest, kind));

        let wildcard = if segment == WILDCARD {
            None
        } else {
            self.children
                .get(WILDCARD)
                .and_then(|child| child.resources_for(rest, kind))
        };

        merge(merge(own, exact), wildcard)
    }
}

fn merge(left: Option<Resource>, right: Option<Resource>) -> Option<Resource> {
    match (left, right) {
        (Some(mut left), Some(right)) => {
            left.union(&right);
            Some(left)
        }
        (left, right) => left.or(right),
    }
}
