//! Narrowing data queries to the records a session may touch.

use skilled_acl::{Acl, Resource, ResourceType};

/// Narrows a query of type `Q` to the records of a [`Resource`].
pub type ScopeFilter<Q> = Box<dyn Fn(&Resource, &mut Q) + Send + Sync>;

/// A model whose rows are owned by, or belong to, scoped resources.
///
/// ```
/// use skilled_acl::{Acl, Resource};
/// use skilled_auth::{ScopeFilter, Securable};
///
/// struct Articles;
///
/// impl Securable for Articles {
///     type Query = Vec<String>;
///
///     fn affected_by(&self) -> Vec<(skilled_acl::ResourceType, ScopeFilter<Vec<String>>)> {
///         vec![(
///             "Article".into(),
///             Box::new(|resource: &Resource, query: &mut Vec<String>| {
///                 let ids = resource.identifiers().into_iter().flatten();
///                 query.extend(ids.map(|id| format!("article.id = {id}")));
///             }),
///         )]
///     }
/// }
///
/// let mut acl = Acl::new();
/// acl.allow("article.edit", &[Resource::only("Article", [5u64])]);
///
/// let mut query = Vec::new();
/// Articles.secure(&acl, "article.edit", &mut query);
/// assert_eq!(query, ["article.id = 5"]);
/// ```
pub trait Securable {
    /// The query being narrowed.
    type Query;

    /// For every resource type the model is scoped by, the filter applying
    /// that scope.
    fn affected_by(&self) -> Vec<(ResourceType, ScopeFilter<Self::Query>)>;

    /// Apply the filter of every resource type that `capability` grants only
    /// partially. Types granted in full, or not at all, leave `query` as is.
    fn secure(&self, acl: &Acl, capability: &str, query: &mut Self::Query) {
        for (kind, filter) in self.affected_by() {
            match acl.resources_for(capability, kind) {
                Some(resource) if !resource.all_accept() => filter(&resource, query),
                _ => {}
            }
        }
    }
}
