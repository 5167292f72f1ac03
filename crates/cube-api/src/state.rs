//! Application state shared across all handlers and middleware.

use std::sync::Arc;

use cube_auth::bootstrap;
use cube_auth::{ManageProvider, ServiceRegistry, SessionStore};
use cube_core::config::AppConfig;
use cube_core::result::AppResult;
use cube_core::traits::CacheProvider;
use cube_entity::User;

/// The provider type handlers are written against.
pub type UserProvider = dyn ManageProvider<User = User>;

/// Application state containing all shared dependencies.
///
/// Passed to every Axum handler via `State<AppState>`.
/// All fields are `Arc`-wrapped for cheap cloning across tasks.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration
    pub config: Arc<AppConfig>,
    /// Registry holding every bound service
    pub registry: Arc<ServiceRegistry>,
    /// Current-user provider
    pub provider: Arc<UserProvider>,
    /// Session storage
    pub sessions: Arc<SessionStore>,
    /// Cache backing the sessions
    pub cache: Arc<dyn CacheProvider>,
    /// Role id given to self-registered accounts (0 for none)
    pub default_role_id: i32,
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("registry", &self.registry)
            .field("sessions", &self.sessions)
            .field("default_role_id", &self.default_role_id)
            .finish()
    }
}

impl AppState {
    /// Resolves the state from a registry populated by
    /// [`cube_auth::bootstrap::register_defaults`].
    pub async fn from_registry(
        registry: ServiceRegistry,
        cache: Arc<dyn CacheProvider>,
    ) -> AppResult<Self> {
        let config = registry.require::<AppConfig>()?;
        let default_role_id = bootstrap::resolve_default_role(&registry, &config).await?;
        Ok(Self {
            provider: registry.require::<UserProvider>()?,
            sessions: registry.require::<SessionStore>()?,
            config,
            cache,
            default_role_id,
            registry: Arc::new(registry),
        })
    }
}
