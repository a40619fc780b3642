//! Turning a user's roles into the permission tree of their session.
//!
//! ```text
//! User
//!   ├── Role "editor" (assignment 42, supports Post)
//!   │     resources: [Post {10, 11}]          ← Post factory, assignment 42
//!   │     permissions: post.publish, post.edit
//!   └── Role "admin" (no declared support)
//!         resources: [Post: all, User: all]   ← every registered type
//!         permissions: admin.*
//! ```
//!
//! Every permission of a role is granted with that role's resources; grants
//! of several roles on the same capability merge their resources.

use serde_json::to_value;
use skilled_acl::{Acl, Resource};
use tracing::{debug, warn};

use crate::{AuthenticationConfig, AuthenticationError, ResourceCatalog, Role, SessionStore, User};

/// Builds and stores the permission tree of a logged in user.
pub struct ProfileLoader<'a> {
    catalog: &'a ResourceCatalog,
    config: &'a AuthenticationConfig,
}

impl<'a> ProfileLoader<'a> {
    /// Create a loader resolving resource types through `catalog` and
    /// storing under the session keys of `config`.
    pub fn new(catalog: &'a ResourceCatalog, config: &'a AuthenticationConfig) -> Self {
        Self { catalog, config }
    }

    /// Build a fresh permission tree from the roles of `user`.
    pub async fn build(&self, user: &User) -> Result<Acl, AuthenticationError> {
        let mut acl = Acl::new();

        for role in &user.roles {
            let resources = self.resources_of(role).await?;
            debug!(
                user = %user.key,
                role = %role.name,
                resources = ?resources.iter().map(Resource::kind).collect::<Vec<_>>(),
                permissions = role.permissions.len(),
                "loading role"
            );

            for permission in &role.permissions {
                acl.allow(permission, &resources);
            }
        }

        Ok(acl)
    }

    /// Build the permission tree of `user` and store it, together with the
    /// user's identity key, in `session`.
    ///
    /// Nothing is written when building fails. When storing fails the
    /// session is destroyed, so it never pairs one user's identity with
    /// another user's tree.
    pub async fn load<S>(&self, user: &User, session: &mut S) -> Result<Acl, AuthenticationError>
    where
        S: SessionStore + ?Sized,
    {
        let acl = self.build(user).await?;

        if let Err(error) = self.store(user, &acl, session).await {
            warn!(user = %user.key, %error, "storing profile failed, destroying session");
            if let Err(cleanup) = session.destroy().await {
                warn!(%cleanup, "session could not be destroyed");
            }
            return Err(error);
        }

        Ok(acl)
    }

    async fn store<S>(
        &self,
        user: &User,
        acl: &Acl,
        session: &mut S,
    ) -> Result<(), AuthenticationError>
    where
        S: SessionStore + ?Sized,
    {
        let permissions = to_value(acl)?;
        let key = to_value(&user.key)?;

        session
            .set(&self.config.permissions_session_key, permissions)
            .await?;
        session.set(&self.config.user_session_key, key).await?;

        Ok(())
    }

    async fn resources_of(&self, role: &Role) -> Result<Vec<Resource>, AuthenticationError> {
        let Some(supported) = role.supported_resources() else {
            return Ok(self
                .catalog
                .iter()
                .map(|factory| factory.accept_all())
                .collect());
        };

        let mut resources = Vec::with_capacity(supported.len());
        for kind in supported {
            let factory = self
                .catalog
                .get(kind)
                .ok_or_else(|| AuthenticationError::UnknownResourceType(kind.clone()))?;

            let resource = factory.build_from_assignment(&role.assignment).await?;
            if resource.kind() != kind {
                return Err(AuthenticationError::MismatchedResourceType {
                    expected: kind.clone(),
                    actual: resource.kind().clone(),
                });
            }
            resources.push(resource);
        }

        Ok(resources)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{AssignmentKey, MemorySession, ResourceFactory, SessionError, StaticResourceFactory};
    use async_trait::async_trait;
    use serde_json::Value;
    use skilled_acl::ResourceType;

    fn catalog() -> ResourceCatalog {
        let mut catalog = ResourceCatalog::new();
        catalog
            .register(StaticResourceFactory::new("Post").with_assignment(42u64, [10u64, 11]))
            .register(StaticResourceFactory::new("User"));
        catalog
    }

    fn editor() -> User {
        User::new(1u64, "jane").with_role(
            Role::new("editor", 42u64)
                .with_permission("post.publish")
                .with_resource_support("Post"),
        )
    }

    struct UnavailableFactory;

    #[async_trait]
    impl ResourceFactory for UnavailableFactory {
        fn resource_type(&self) -> ResourceType {
            "Post".into()
        }

        async fn build_from_assignment(
            &self,
            _assignment: &AssignmentKey,
        ) -> Result<Resource, AuthenticationError> {
            Err(AuthenticationError::ResourceBuild {
                kind: self.resource_type(),
                reason: "database unavailable".into(),
            })
        }
    }

    struct MislabelledFactory;

    #[async_trait]
    impl ResourceFactory for MislabelledFactory {
        fn resource_type(&self) -> ResourceType {
            "Post".into()
        }

        async fn build_from_assignment(
            &self,
            _assignment: &AssignmentKey,
        ) -> Result<Resource, AuthenticationError> {
            Ok(Resource::only("Blog", [1u64]))
        }
    }

    /// Shares its values with `inner` and refuses writes to `rejected_key`.
    struct RejectingSession {
        inner: MemorySession,
        rejected_key: Option<String>,
    }

    #[async_trait]
    impl SessionStore for RejectingSession {
        async fn get(&self, key: &str) -> Result<Option<Value>, SessionError> {
            self.inner.get(key).await
        }

        async fn set(&mut self, key: &str, value: Value) -> Result<(), SessionError> {
            if self.rejected_key.as_deref() == Some(key) {
                return Err(SessionError::Backend(format!("write to {key} refused")));
            }
            self.inner.set(key, value).await
        }

        async fn destroy(&mut self) -> Result<(), SessionError> {
            self.inner.destroy().await
        }
    }

    #[tokio::test]
    async fn it_scopes_roles_that_declare_support() -> anyhow::Result<()> {
        let catalog = catalog();
        let config = AuthenticationConfig::default();
        let user = User::new(1u64, "jane").with_role(
            Role::new("editor", 42u64)
                .with_permission("post.publish")
                .with_resource_support("Post"),
        );

        let acl = ProfileLoader::new(&catalog, &config).build(&user).await?;

        assert_eq!(
            acl.resources_for("post.publish", "Post"),
            Some(Resource::only("Post", [10u64, 11]))
        );
        assert_eq!(acl.resources_for("post.publish", "User"), None);

        Ok(())
    }

    #[tokio::test]
    async fn it_accepts_all_registered_types_without_declared_support() -> anyhow::Result<()> {
        let catalog = catalog();
        let config = AuthenticationConfig::default();
        let user = User::new(1u64, "root")
            .with_role(Role::new("admin", 1u64).with_permission("admin.users"));

        let acl = ProfileLoader::new(&catalog, &config).build(&user).await?;

        for kind in ["Post", "User"] {
            let resource = acl.resources_for("admin.users", kind).unwrap();
            assert!(resource.all_accept(), "{kind} should accept all");
        }

        Ok(())
    }

    #[tokio::test]
    async fn it_fails_on_unregistered_resource_types() {
        let catalog = catalog();
        let config = AuthenticationConfig::default();
        let user = User::new(1u64, "jane").with_role(
            Role::new("editor", 42u64)
                .with_permission("post.publish")
                .with_resource_support("Comment"),
        );

        let result = ProfileLoader::new(&catalog, &config).build(&user).await;
        assert!(matches!(
            result,
            Err(AuthenticationError::UnknownResourceType(kind))
                if kind == ResourceType::from("Comment")
        ));
    }

    #[tokio::test]
    async fn it_stores_the_tree_and_identity_in_the_session() -> anyhow::Result<()> {
        let catalog = catalog();
        let config = AuthenticationConfig::default();
        let user = User::new(7u64, "jane")
            .with_role(Role::new("reader", 3u64).with_permission("post.read"));
        let mut session = MemorySession::new();

        let acl = ProfileLoader::new(&catalog, &config)
            .load(&user, &mut session)
            .await?;

        let stored: Acl = serde_json::from_value(
            session
                .get(&config.permissions_session_key)
                .await?
                .unwrap(),
        )?;
        assert_eq!(stored, acl);
        assert_eq!(
            session.get(&config.user_session_key).await?,
            Some(serde_json::json!("7"))
        );

        Ok(())
    }

    #[tokio::test]
    async fn it_aborts_when_a_factory_fails() -> anyhow::Result<()> {
        let mut catalog = ResourceCatalog::new();
        catalog.register(UnavailableFactory);
        let config = AuthenticationConfig::default();
        let mut session = MemorySession::new();

        let result = ProfileLoader::new(&catalog, &config)
            .load(&editor(), &mut session)
            .await;

        assert!(matches!(
            result,
            Err(AuthenticationError::ResourceBuild { kind, .. })
                if kind == ResourceType::from("Post")
        ));
        assert_eq!(session.get(&config.permissions_session_key).await?, None);
        assert_eq!(session.get(&config.user_session_key).await?, None);

        Ok(())
    }

    #[tokio::test]
    async fn it_rejects_resources_built_for_another_type() -> anyhow::Result<()> {
        let mut catalog = ResourceCatalog::new();
        catalog.register(MislabelledFactory);
        let config = AuthenticationConfig::default();
        let mut session = MemorySession::new();

        let result = ProfileLoader::new(&catalog, &config)
            .load(&editor(), &mut session)
            .await;

        assert!(matches!(
            result,
            Err(AuthenticationError::MismatchedResourceType { expected, actual })
                if expected == ResourceType::from("Post") && actual == ResourceType::from("Blog")
        ));
        assert_eq!(session.get(&config.permissions_session_key).await?, None);
        assert_eq!(session.get(&config.user_session_key).await?, None);

        Ok(())
    }

    #[tokio::test]
    async fn it_destroys_the_session_when_storing_fails() -> anyhow::Result<()> {
        let catalog = catalog();
        let config = AuthenticationConfig::default();
        let loader = ProfileLoader::new(&catalog, &config);
        let shared = MemorySession::new();
        let mut session = RejectingSession {
            inner: shared.clone(),
            rejected_key: None,
        };

        let reader = User::new(1u64, "alice")
            .with_role(Role::new("reader", 3u64).with_permission("post.read"));
        loader.load(&reader, &mut session).await?;

        session.rejected_key = Some(config.user_session_key.clone());
        let admin = User::new(2u64, "bob")
            .with_role(Role::new("admin", 5u64).with_permission("admin.*"));
        let result = loader.load(&admin, &mut session).await;

        assert!(matches!(result, Err(AuthenticationError::Session(_))));
        assert_eq!(shared.get(&config.user_session_key).await?, None);
        assert_eq!(shared.get(&config.permissions_session_key).await?, None);

        Ok(())
    }
}
