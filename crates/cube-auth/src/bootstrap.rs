//! Default service bindings installed once at process start.

use std::sync::Arc;

use tracing::{info, warn};

use cube_core::config::AppConfig;
use cube_core::result::AppResult;
use cube_core::traits::{CacheProvider, NamedRepository, Repository};
use cube_database::DatabasePool;
use cube_database::MemoryTable;
use cube_database::repositories::{
    AuditLogRepository, MenuRepository, RoleRepository, UserRepository,
};
use cube_entity::{AuditLogEntry, Menu, Role, User};

use crate::provider::{
    AuditStore, ManageProvider, MenuStore, RoleStore, SessionProvider, UserStore,
};
use crate::registry::ServiceRegistry;
use crate::session::SessionStore;

/// The provider bound by default: sessions over the stock [`User`] entity.
pub type DefaultProvider = SessionProvider<User>;

/// Stores bound by [`register_defaults`].
#[derive(Clone)]
pub struct DefaultStores {
    pub users: Arc<dyn UserStore<User>>,
    pub roles: Arc<RoleStore>,
    pub menus: Arc<MenuStore>,
    pub audit: Arc<AuditStore>,
}

impl DefaultStores {
    /// Process-local stores, seeded with the built-in roles.
    pub async fn in_memory() -> AppResult<Self> {
        let roles = Arc::new(MemoryTable::<Role>::new());
        for (name, remark) in [
            ("Administrator", "Full access"),
            ("Member", "Default role for registered users"),
        ] {
            if roles.find_by_name(name).await?.is_none() {
                let mut role = Role::new(name).system();
                role.remark = Some(remark.to_string());
                roles.create(&role).await?;
            }
        }

        Ok(Self {
            users: Arc::new(MemoryTable::<User>::new()),
            roles,
            menus: Arc::new(MemoryTable::<Menu>::new()),
            audit: Arc::new(MemoryTable::<AuditLogEntry>::new()),
        })
    }

    /// PostgreSQL-backed stores sharing one pool.
    pub fn postgres(db: &DatabasePool) -> Self {
        let pool = db.pool().clone();
        Self {
            users: Arc::new(UserRepository::new(pool.clone())),
            roles: Arc::new(RoleRepository::new(pool.clone())),
            menus: Arc::new(MenuRepository::new(pool.clone())),
            audit: Arc::new(AuditLogRepository::new(pool)),
        }
    }
}

/// Installs the default bindings: user, role, menu, and audit stores, the
/// session store, and the default provider (as itself and as
/// `dyn ManageProvider<User = User>`).
///
/// Bindings already present in `registry` win, so an application can
/// override any of them before calling this.
pub fn register_defaults(
    registry: &mut ServiceRegistry,
    config: &AppConfig,
    stores: DefaultStores,
    cache: Arc<dyn CacheProvider>,
) -> AppResult<Arc<DefaultProvider>> {
    registry.register_default::<AppConfig>(Arc::new(config.clone()));
    registry.register_default::<dyn UserStore<User>>(stores.users);
    registry.register_default::<RoleStore>(stores.roles);
    registry.register_default::<MenuStore>(stores.menus);
    registry.register_default::<AuditStore>(stores.audit);
    registry.register_default::<SessionStore>(Arc::new(SessionStore::new(cache, &config.session)));

    if !registry.contains::<DefaultProvider>() {
        let provider = SessionProvider::new(
            registry.require::<dyn UserStore<User>>()?,
            &config.auth,
            &config.session,
        )
        .with_roles(registry.require::<RoleStore>()?)
        .with_audit(registry.require::<AuditStore>()?);
        registry.register(Arc::new(provider));
    }

    let provider = registry.require::<DefaultProvider>()?;
    registry.register_default::<dyn ManageProvider<User = User>>(provider.clone());

    info!(
        services = registry.len(),
        session_key = %provider.session_key(),
        cookie_key = %provider.remember_me().cookie_key(),
        "Registered default services"
    );
    Ok(provider)
}

/// Looks up the role given to self-registered accounts. Falls back to 0
/// (no role) when the configured role does not exist.
pub async fn resolve_default_role(
    registry: &ServiceRegistry,
    config: &AppConfig,
) -> AppResult<i32> {
    let roles = registry.require::<RoleStore>()?;
    match roles.find_by_name(&config.auth.default_role).await? {
        Some(role) => Ok(role.id),
        None => {
            warn!(role = %config.auth.default_role, "Default role not found");
            Ok(0)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use cube_cache::memory::MemoryCacheProvider;
    use cube_core::types::PageRequest;

    #[tokio::test]
    async fn test_register_defaults_binds_everything() {
        let mut registry = ServiceRegistry::new();
        let stores = DefaultStores::in_memory().await.unwrap();
        let cache = Arc::new(MemoryCacheProvider::default());

        register_defaults(&mut registry, &AppConfig::default(), stores, cache).unwrap();

        assert!(registry.contains::<AppConfig>());
        assert!(registry.contains::<dyn UserStore<User>>());
        assert!(registry.contains::<RoleStore>());
        assert!(registry.contains::<MenuStore>());
        assert!(registry.contains::<AuditStore>());
        assert!(registry.contains::<SessionStore>());
        assert!(registry.contains::<DefaultProvider>());
        assert!(registry.contains::<dyn ManageProvider<User = User>>());
    }

    #[tokio::test]
    async fn test_in_memory_roles_are_seeded() {
        let stores = DefaultStores::in_memory().await.unwrap();
        let page = stores.roles.find_all(&PageRequest::default()).await.unwrap();
        let names: Vec<_> = page.items.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["Administrator", "Member"]);
        assert!(page.items.iter().all(|r| r.is_system));
    }

    #[tokio::test]
    async fn test_existing_bindings_are_kept() {
        let mut registry = ServiceRegistry::new();
        let custom_roles = Arc::new(MemoryTable::<Role>::new());
        custom_roles.create(&Role::new("Auditor")).await.unwrap();
        registry.register::<RoleStore>(custom_roles);

        let stores = DefaultStores::in_memory().await.unwrap();
        let cache = Arc::new(MemoryCacheProvider::default());
        register_defaults(&mut registry, &AppConfig::default(), stores, cache).unwrap();

        let roles = registry.require::<RoleStore>().unwrap();
        assert_eq!(roles.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_resolved_provider_is_usable_as_trait_object() {
        let mut registry = ServiceRegistry::new();
        let stores = DefaultStores::in_memory().await.unwrap();
        let cache = Arc::new(MemoryCacheProvider::default());
        register_defaults(&mut registry, &AppConfig::default(), stores, cache).unwrap();

        let provider = registry.require::<dyn ManageProvider<User = User>>().unwrap();
        let user = provider.register("neo", "pw", 2, true).await.unwrap();
        let found = provider.find_by_name("NEO").await.unwrap().unwrap();
        assert_eq!(found.id, user.id);
    }

    #[tokio::test]
    async fn test_default_role_resolves_by_name() {
        let mut registry = ServiceRegistry::new();
        let stores = DefaultStores::in_memory().await.unwrap();
        let cache = Arc::new(MemoryCacheProvider::default());
        let mut config = AppConfig::default();
        register_defaults(&mut registry, &config, stores, cache).unwrap();

        assert_eq!(resolve_default_role(&registry, &config).await.unwrap(), 2);
        config.auth.default_role = "administrator".to_string();
        assert_eq!(resolve_default_role(&registry, &config).await.unwrap(), 1);
        config.auth.default_role = "Guest".to_string();
        assert_eq!(resolve_default_role(&registry, &config).await.unwrap(), 0);
    }
}
