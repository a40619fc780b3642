use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::{AclNode, CapabilityPath, Resource, ResourceId, ResourceType};

/// Name of the node anchoring every permission tree.
pub const ROOT: &str = "root";

/// A permission tree answering "may this session do X (to record Y)?".
///
/// Capabilities are dotted strings such as `article.edit`. They are granted
/// with [`Acl::allow`] while a session's profile is loaded and queried with
/// [`Acl::is_allowed`], [`Acl::is_allowed_on`] and [`Acl::resources_for`]
/// afterwards.
///
/// ```
/// use skilled_acl::{Acl, Resource};
///
/// let mut acl = Acl::new();
/// acl.allow("article.edit", &[Resource::only("Article", [5u64])]);
///
/// assert!(acl.is_allowed("article.edit"));
/// assert!(acl.is_allowed_on("article.edit", "Article", 5u64));
/// assert!(!acl.is_allowed_on("article.edit", "Article", 6u64));
/// assert!(acl.is_allowed("article.*"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Acl {
    root: AclNode,
}

impl Default for Acl {
    fn default() -> Self {
        Self {
            root: AclNode::new(ROOT, false),
        }
    }
}

impl Acl {
    /// An empty tree granting nothing.
    pub fn new() -> Self {
        Self::default()
    }

    /// The root node. It never represents a capability of its own.
    pub fn root(&self) -> &AclNode {
        &self.root
    }

    /// Grant `capability`, scoped to `resources`.
    pub fn allow(&mut self, capability: &str, resources: &[Resource]) {
        trace!(capability, resources = resources.len(), "granting capability");
        let path = CapabilityPath::parse(capability);
        self.root.allow(path.segments(), resources);
    }

    /// Whether `capability` is granted, regardless of resource scope.
    pub fn is_allowed(&self, capability: &str) -> bool {
        let path = CapabilityPath::parse(capability);
        self.root.is_allowed(path.segments(), None)
    }

    /// Whether `capability` is granted on the record `id` of `kind`.
    pub fn is_allowed_on(
        &self,
        capability: &str,
        kind: impl Into<ResourceType>,
        id: impl Into<ResourceId>,
    ) -> bool {
        let path = CapabilityPath::parse(capability);
        let (kind, id) = (kind.into(), id.into());
        self.root.is_allowed(path.segments(), Some((&kind, &id)))
    }

    /// The records of `kind` that `capability` covers, merged across every
    /// granted node along its path. `None` when nothing of that kind was
    /// granted there.
    pub fn resources_for(
        &self,
        capability: &str,
        kind: impl Into<ResourceType>,
    ) -> Option<Resource> {
        let path = CapabilityPath::parse(capability);
        self.root.resources_for(path.segments(), &kind.into())
    }
}
