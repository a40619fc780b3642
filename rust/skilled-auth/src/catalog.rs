//! Registered resource types and how their records are looked up.

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use async_trait::async_trait;
use skilled_acl::{Resource, ResourceId, ResourceType};

use crate::{AssignmentKey, AuthenticationError};

/// A [ResourceFactory] knows, for one resource type, which records a role
/// assignment is limited to.
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
pub trait ResourceFactory: Send + Sync {
    /// The type tag of the resources this factory builds
    fn resource_type(&self) -> ResourceType;

    /// Build the resource covering the records granted to `assignment`
    async fn build_from_assignment(
        &self,
        assignment: &AssignmentKey,
    ) -> Result<Resource, AuthenticationError>;

    /// Build a resource covering every record of this type
    fn accept_all(&self) -> Resource {
        Resource::all(self.resource_type())
    }
}

/// A [ResourceFactory] answering from a fixed assignment → records table.
/// Assignments missing from the table cover no records.
#[derive(Debug, Clone)]
pub struct StaticResourceFactory {
    kind: ResourceType,
    assignments: HashMap<AssignmentKey, BTreeSet<ResourceId>>,
}

impl StaticResourceFactory {
    /// Create a factory for `kind` with an empty table
    pub fn new(kind: impl Into<ResourceType>) -> Self {
        Self {
            kind: kind.into(),
            assignments: HashMap::new(),
        }
    }

    /// Grant `ids` to `assignment`
    pub fn with_assignment<I, T>(mut self, assignment: impl Into<AssignmentKey>, ids: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<ResourceId>,
    {
        self.assignments
            .entry(assignment.into())
            .or_default()
            .extend(ids.into_iter().map(Into::into));
        self
    }
}

#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
impl ResourceFactory for StaticResourceFactory {
    fn resource_type(&self) -> ResourceType {
        self.kind.clone()
    }

    async fn build_from_assignment(
        &self,
        assignment: &AssignmentKey,
    ) -> Result<Resource, AuthenticationError> {
        let ids = self.assignments.get(assignment).cloned().unwrap_or_default();
        Ok(Resource::only(self.kind.clone(), ids))
    }
}

/// The resource types known to the application, in registration order.
#[derive(Clone, Default)]
pub struct ResourceCatalog {
    factories: Vec<Arc<dyn ResourceFactory>>,
}

impl ResourceCatalog {
    /// Create an empty catalog
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a resource type. A later registration for the same type
    /// replaces the earlier one in place.
    pub fn register<F>(&mut self, factory: F) -> &mut Self
    where
        F: ResourceFactory + 'static,
    {
        let kind = factory.resource_type();
        let factory: Arc<dyn ResourceFactory> = Arc::new(factory);

        match self
            .factories
            .iter_mut()
            .find(|existing| existing.resource_type() == kind)
        {
            Some(existing) => *existing = factory,
            None => self.factories.push(factory),
        }
        self
    }

    /// The factory registered for `kind`
    pub fn get(&self, kind: &ResourceType) -> Option<&Arc<dyn ResourceFactory>> {
        self.factories
            .iter()
            .find(|factory| &factory.resource_type() == kind)
    }

    /// Every registered factory
    pub fn iter(&self) -> impl Iterator<Item = &Arc<dyn ResourceFactory>> {
        self.factories.iter()
    }

    /// Every registered type tag
    pub fn resource_types(&self) -> Vec<ResourceType> {
        self.factories
            .iter()
            .map(|factory| factory.resource_type())
            .collect()
    }

    /// Number of registered types
    pub fn len(&self) -> usize {
        self.factories.len()
    }

    /// Whether no type is registered
    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }
}

impl std::fmt::Debug for ResourceCatalog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResourceCatalog")
            .field("resource_types", &self.resource_types())
            .finish()
    }
}
