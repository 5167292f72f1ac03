//! Session-backed provider for any [`ManageUser`] type.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tracing::{debug, info, warn};

use cube_core::config::{AuthConfig, SessionConfig};
use cube_core::error::AppError;
use cube_core::result::AppResult;
use cube_core::traits::{NamedRepository, Repository};
use cube_entity::{AuditLogEntry, ManageUser};

use crate::context::AuthContext;
use crate::cookie::RememberMe;
use crate::password::PasswordHasher;

use super::{AuditStore, LoginSource, ManageProvider, RoleStore, UserStore};

/// Keeps the current user in the request session under a configured key.
///
/// Without a session in the context every current-user operation is a
/// silent no-op.
pub struct SessionProvider<U: ManageUser> {
    users: Arc<dyn UserStore<U>>,
    audit: Option<Arc<AuditStore>>,
    hasher: PasswordHasher,
    remember: RememberMe,
    session_key: String,
    password_min_length: usize,
}

impl<U: ManageUser> fmt::Debug for SessionProvider<U> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionProvider")
            .field("session_key", &self.session_key)
            .field("hasher", &self.hasher)
            .field("remember", &self.remember)
            .field("audit", &self.audit.is_some())
            .finish()
    }
}

impl<U: ManageUser> SessionProvider<U> {
    /// Creates a provider over `users`.
    pub fn new(users: Arc<dyn UserStore<U>>, auth: &AuthConfig, session: &SessionConfig) -> Self {
        Self {
            users,
            audit: None,
            hasher: PasswordHasher::new(auth.password_algorithm),
            remember: RememberMe::new(auth),
            session_key: session.key.clone(),
            password_min_length: auth.password_min_length.max(1),
        }
    }

    /// Records logins, logouts, and registrations in `audit`.
    pub fn with_audit(mut self, audit: Arc<AuditStore>) -> Self {
        self.audit = Some(audit);
        self
    }

    /// Resolves principal role names through `roles`.
    pub fn with_roles(mut self, roles: Arc<RoleStore>) -> Self {
        self.remember = self.remember.with_roles(roles);
        self
    }

    /// Session key holding the current user.
    pub fn session_key(&self) -> &str {
        &self.session_key
    }

    pub fn hasher(&self) -> &PasswordHasher {
        &self.hasher
    }

    async fn write_audit(&self, action: &str, user: &U, ip: Option<&str>) -> AppResult<()> {
        let Some(audit) = &self.audit else {
            return Ok(());
        };
        let entry = AuditLogEntry::new("User", action, user.name(), user.id(), None).with_ip(ip);
        audit.create(&entry).await?;
        Ok(())
    }

    /// Flips the stored user offline, if its type tracks that flag.
    async fn mark_offline(&self, previous: &U) -> AppResult<()> {
        let Some(mut user) = self.users.find_by_id(&previous.id()).await? else {
            return Ok(());
        };
        if user.set_online(false) {
            self.users.update(&user).await?;
            debug!(user_id = user.id(), "User marked offline");
        }
        Ok(())
    }
}

#[async_trait]
impl<U: ManageUser> ManageProvider for SessionProvider<U> {
    type User = U;

    async fn current(&self, ctx: &AuthContext) -> AppResult<Option<U>> {
        match ctx.session() {
            Some(session) => session.get::<U>(&self.session_key).await,
            None => Ok(None),
        }
    }

    async fn set_current(&self, ctx: &mut AuthContext, user: Option<U>) -> AppResult<()> {
        let Some(session) = ctx.session().cloned() else {
            return Ok(());
        };

        // Every change of identity moves to a new session id.
        let fresh = match user {
            Some(user) => {
                let fresh = session.regenerate().await?;
                fresh.set(&self.session_key, &user).await?;
                fresh
            }
            None => {
                if let Some(previous) = session.get::<U>(&self.session_key).await? {
                    self.mark_offline(&previous).await?;
                }
                session.regenerate().await?
            }
        };
        ctx.replace_session(fresh);
        Ok(())
    }

    async fn find_by_id(&self, id: i64) -> AppResult<Option<U>> {
        self.users.find_by_id(&id).await
    }

    async fn find_by_name(&self, name: &str) -> AppResult<Option<U>> {
        self.users.find_by_name(name).await
    }

    async fn login(
        &self,
        ctx: &mut AuthContext,
        name: &str,
        password: &str,
        remember_me: bool,
    ) -> AppResult<Option<U>> {
        let Some(user) = self.users.find_by_name(name).await? else {
            debug!(name, "Login for unknown user");
            return Ok(None);
        };
        if !user.enabled() {
            warn!(user_id = user.id(), name, "Login attempt for disabled user");
            return Ok(None);
        }
        let Some(hash) = user.password_hash() else {
            return Ok(None);
        };
        if !self.hasher.verify_password(password, hash)? {
            warn!(user_id = user.id(), name, "Login failed: bad password");
            return Ok(None);
        }

        let user = self.complete_login(ctx, user, LoginSource::Password).await?;
        if remember_me {
            self.remember.save_cookie(ctx, Some(&user), self.remember.max_age());
        }
        Ok(Some(user))
    }

    async fn complete_login(
        &self,
        ctx: &mut AuthContext,
        user: U,
        source: LoginSource,
    ) -> AppResult<U> {
        let mut user = user;
        user.set_online(true);
        user.record_login(Utc::now(), ctx.client_ip());
        let user = self.users.update(&user).await?;

        self.set_current(ctx, Some(user.clone())).await?;
        self.write_audit(source.audit_action(), &user, ctx.client_ip()).await?;

        info!(user_id = user.id(), name = %user.name(), %source, "User logged in");
        Ok(user)
    }

    async fn logout(&self, ctx: &mut AuthContext) -> AppResult<()> {
        let user = self.current(ctx).await?;
        self.set_current(ctx, None).await?;
        self.remember.save_cookie::<U>(ctx, None, self.remember.max_age());

        if let Some(user) = user {
            self.write_audit("Logout", &user, ctx.client_ip()).await?;
            info!(user_id = user.id(), name = %user.name(), "User logged out");
        }
        Ok(())
    }

    async fn register(
        &self,
        name: &str,
        password: &str,
        role_id: i32,
        enabled: bool,
    ) -> AppResult<U> {
        let name = name.trim();
        if name.is_empty() {
            return Err(AppError::validation("User name is required"));
        }
        if password.chars().count() < self.password_min_length {
            return Err(AppError::validation(format!(
                "Password must be at least {} characters",
                self.password_min_length
            )));
        }

        let hash = self.hasher.hash_password(password)?;
        let user = self
            .users
            .create(&U::new_account(name, &hash, role_id, enabled))
            .await?;
        self.write_audit("Register", &user, None).await?;

        info!(user_id = user.id(), name = %user.name(), "User registered");
        Ok(user)
    }

    fn remember_me(&self) -> &RememberMe {
        &self.remember
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use axum_extra::extract::cookie::{Cookie, CookieJar};
    use cube_cache::memory::MemoryCacheProvider;
    use cube_core::config::AppConfig;
    use cube_core::error::ErrorKind;
    use cube_core::traits::CacheProvider;
    use cube_database::MemoryTable;
    use cube_entity::{Role, User};

    use crate::session::SessionStore;

    const SECRET_MD5: &str = "5ebe2294ecd0e0f08eab7690d2a6ee69";

    struct Harness {
        provider: SessionProvider<User>,
        users: Arc<MemoryTable<User>>,
        audit: Arc<MemoryTable<AuditLogEntry>>,
        cache: Arc<MemoryCacheProvider>,
        sessions: SessionStore,
    }

    impl Harness {
        fn new() -> Self {
            let config = AppConfig::default();
            let users = Arc::new(MemoryTable::<User>::new());
            let audit = Arc::new(MemoryTable::<AuditLogEntry>::new());
            let cache = Arc::new(MemoryCacheProvider::default());
            let sessions = SessionStore::new(cache.clone(), &config.session);
            let provider = SessionProvider::new(users.clone(), &config.auth, &config.session)
                .with_audit(audit.clone());
            Self {
                provider,
                users,
                audit,
                cache,
                sessions,
            }
        }

        fn context(&self) -> AuthContext {
            AuthContext::new(Some(self.sessions.create()), CookieJar::new())
        }

        fn context_with_cookie(&self, value: &str) -> AuthContext {
            let jar = CookieJar::new().add(Cookie::new("cube_user", value.to_string()));
            AuthContext::new(Some(self.sessions.create()), jar)
        }

        async fn audit_actions(&self) -> Vec<String> {
            let page = self
                .audit
                .find_all(&cube_core::types::PageRequest::new(1, 100))
                .await
                .unwrap();
            page.items.into_iter().map(|e| e.action).collect()
        }
    }

    #[tokio::test]
    async fn test_alice_register_login_remember_me() {
        let h = Harness::new();
        let mut ctx = h.context();

        h.provider.register("alice", "secret", 0, true).await.unwrap();
        let user = h
            .provider
            .login(&mut ctx, "alice", "secret", true)
            .await
            .unwrap()
            .unwrap();

        assert_eq!(user.name, "alice");
        assert!(user.online);
        assert_eq!(user.logins, 1);
        assert_eq!(
            ctx.cookie("cube_user").as_deref(),
            Some(format!("u=alice&p={SECRET_MD5}").as_str())
        );
        let current = h.provider.current(&ctx).await.unwrap().unwrap();
        assert_eq!(current.id, user.id);
    }

    #[tokio::test]
    async fn test_login_without_remember_me_writes_no_cookie() {
        let h = Harness::new();
        let mut ctx = h.context();
        h.provider.register("bob", "pw", 1, true).await.unwrap();

        let user = h.provider.login(&mut ctx, "bob", "pw", false).await.unwrap();
        assert_eq!(user.map(|u| u.name), Some("bob".to_string()));
        assert!(ctx.cookie("cube_user").is_none());
    }

    #[tokio::test]
    async fn test_wrong_password_leaves_current_unchanged() {
        let h = Harness::new();
        let mut ctx = h.context();
        h.provider.register("carol", "right", 1, true).await.unwrap();
        h.provider.register("dave", "pw", 1, true).await.unwrap();
        h.provider.login(&mut ctx, "dave", "pw", false).await.unwrap();

        let result = h.provider.login(&mut ctx, "carol", "wrong", true).await.unwrap();
        assert!(result.is_none());
        let current = h.provider.current(&ctx).await.unwrap().unwrap();
        assert_eq!(current.name, "dave");
        assert!(ctx.cookie("cube_user").is_none());

        let carol = h.users.find_by_name("carol").await.unwrap().unwrap();
        assert_eq!(carol.logins, 0);
    }

    #[tokio::test]
    async fn test_unknown_and_disabled_users_cannot_login() {
        let h = Harness::new();
        let mut ctx = h.context();
        h.provider.register("erin", "pw", 1, false).await.unwrap();

        assert!(h.provider.login(&mut ctx, "erin", "pw", false).await.unwrap().is_none());
        assert!(h.provider.login(&mut ctx, "nobody", "pw", false).await.unwrap().is_none());
        assert!(h.provider.current(&ctx).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_logout_clears_session_and_online_flag() {
        let h = Harness::new();
        let mut ctx = h.context();
        h.provider.register("alice", "secret", 0, true).await.unwrap();
        let user = h
            .provider
            .login(&mut ctx, "alice", "secret", true)
            .await
            .unwrap()
            .unwrap();

        let login_sid = ctx.session().unwrap().id().to_string();
        assert!(h.cache.exists(&format!("session:{login_sid}:Admin")).await.unwrap());

        h.provider.logout(&mut ctx).await.unwrap();

        assert!(h.provider.current(&ctx).await.unwrap().is_none());
        let sid = ctx.session().unwrap().id().to_string();
        assert_ne!(sid, login_sid);
        assert!(!h.cache.exists(&format!("session:{login_sid}:Admin")).await.unwrap());
        assert!(!h.cache.exists(&format!("session:{sid}:Admin")).await.unwrap());
        assert_eq!(ctx.cookie("cube_user").as_deref(), Some(""));

        let stored = h.users.find_by_id(&user.id).await.unwrap().unwrap();
        assert!(!stored.online);
        assert_eq!(h.audit_actions().await, vec!["Register", "Login", "Logout"]);
    }

    #[tokio::test]
    async fn test_no_session_is_a_silent_noop() {
        let h = Harness::new();
        let mut ctx = AuthContext::anonymous();
        h.provider.register("frank", "pw", 1, true).await.unwrap();
        let frank = h.users.find_by_name("frank").await.unwrap().unwrap();

        h.provider.set_current(&mut ctx, Some(frank)).await.unwrap();
        assert!(h.provider.current(&ctx).await.unwrap().is_none());
        h.provider.set_current(&mut ctx, None).await.unwrap();
        h.provider.logout(&mut ctx).await.unwrap();
    }

    #[tokio::test]
    async fn test_register_validation_and_conflict() {
        let h = Harness::new();

        let err = h.provider.register("  ", "pw", 1, true).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);
        let err = h.provider.register("gina", "", 1, true).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);

        let user = h.provider.register("gina", "pw", 2, true).await.unwrap();
        assert_eq!(user.password_hash, h.provider.hasher().hash_password("pw").unwrap());
        let err = h.provider.register("GINA", "pw", 1, true).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Conflict);
    }

    #[tokio::test]
    async fn test_find_by_id_str_rejects_malformed_ids() {
        let h = Harness::new();
        let user = h.provider.register("hank", "pw", 1, true).await.unwrap();

        let found = h.provider.find_by_id_str(&user.id.to_string()).await.unwrap();
        assert_eq!(found.map(|u| u.name), Some("hank".to_string()));
        assert!(h.provider.find_by_id_str("404").await.unwrap().is_none());
        let err = h.provider.find_by_id_str("abc").await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);
    }

    #[tokio::test]
    async fn test_save_cookie_is_idempotent() {
        let h = Harness::new();
        let mut ctx = h.context();
        let user = h.provider.register("ivy", "pw", 1, true).await.unwrap();
        let remember = h.provider.remember_me();

        assert!(remember.save_cookie(&mut ctx, Some(&user), remember.max_age()));
        assert!(!remember.save_cookie(&mut ctx, Some(&user), remember.max_age()));

        let encoded = ctx.cookie("cube_user").unwrap();
        let mut fresh = h.context_with_cookie(&encoded);
        assert!(!remember.save_cookie(&mut fresh, Some(&user), remember.max_age()));
    }

    #[tokio::test]
    async fn test_load_cookie_rejects_changed_password() {
        let h = Harness::new();
        let mut user = h.provider.register("jack", "old", 1, true).await.unwrap();
        let old_cookie = format!("u=jack&p={}", user.password_hash);

        user.password_hash = h.provider.hasher().hash_password("new").unwrap();
        h.users.update(&user).await.unwrap();

        let mut ctx = h.context_with_cookie(&old_cookie);
        let loaded = h
            .provider
            .remember_me()
            .load_cookie(&h.provider, &mut ctx, true)
            .await
            .unwrap();
        assert!(loaded.is_none());
        assert!(h.provider.current(&ctx).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_load_cookie_rejects_disabled_user() {
        let h = Harness::new();
        let mut user = h.provider.register("kim", "pw", 1, true).await.unwrap();
        user.enabled = false;
        h.users.update(&user).await.unwrap();

        let mut ctx = h.context_with_cookie(&format!("u=kim&p={}", user.password_hash));
        let loaded = h
            .provider
            .remember_me()
            .load_cookie(&h.provider, &mut ctx, true)
            .await
            .unwrap();
        assert!(loaded.is_none());
    }

    #[tokio::test]
    async fn test_load_cookie_read_only_without_auto_login() {
        let h = Harness::new();
        h.provider.register("alice", "secret", 0, true).await.unwrap();

        let mut ctx = h.context_with_cookie(&format!("u=alice&p={}", SECRET_MD5.to_uppercase()));
        let loaded = h
            .provider
            .remember_me()
            .load_cookie(&h.provider, &mut ctx, false)
            .await
            .unwrap()
            .unwrap();

        assert_eq!(loaded.name, "alice");
        assert!(!loaded.online);
        assert!(h.provider.current(&ctx).await.unwrap().is_none());
        assert_eq!(h.audit_actions().await, vec!["Register"]);
    }

    #[tokio::test]
    async fn test_load_cookie_auto_login_persists_and_audits() {
        let h = Harness::new();
        h.provider.register("alice", "secret", 0, true).await.unwrap();

        let mut ctx = h
            .context_with_cookie(&format!("u=alice&p={SECRET_MD5}"))
            .with_client_ip(Some("10.1.2.3".to_string()));
        let loaded = h
            .provider
            .remember_me()
            .load_cookie(&h.provider, &mut ctx, true)
            .await
            .unwrap()
            .unwrap();

        assert!(loaded.online);
        assert_eq!(loaded.last_login_ip.as_deref(), Some("10.1.2.3"));
        let current = h.provider.current(&ctx).await.unwrap().unwrap();
        assert_eq!(current.name, "alice");
        assert_eq!(h.audit_actions().await, vec!["Register", "AutoLogin"]);
    }

    #[tokio::test]
    async fn test_load_cookie_ignores_malformed_and_unknown() {
        let h = Harness::new();
        for value in ["garbage", "u=ghost&p=abc"] {
            let mut ctx = h.context_with_cookie(value);
            let loaded = h
                .provider
                .remember_me()
                .load_cookie(&h.provider, &mut ctx, true)
                .await
                .unwrap();
            assert!(loaded.is_none());
        }
    }

    #[tokio::test]
    async fn test_set_principal_resolves_role_names() {
        let roles = Arc::new(MemoryTable::<Role>::new());
        let admin = roles.create(&Role::new("Administrator")).await.unwrap();

        let mut h = Harness::new();
        let config = AppConfig::default();
        h.provider = SessionProvider::new(h.users.clone(), &config.auth, &config.session)
            .with_roles(roles.clone());

        let mut user = h.provider.register("lee", "pw", admin.id, true).await.unwrap();
        user.role_ids = Some("99".to_string());
        h.users.update(&user).await.unwrap();

        let mut ctx = h.context();
        let remember = h.provider.remember_me().clone();
        assert!(remember.set_principal(&h.provider, &mut ctx).await.unwrap().is_none());
        assert!(ctx.principal().is_none());

        h.provider.login(&mut ctx, "lee", "pw", false).await.unwrap();
        let principal = remember.set_principal(&h.provider, &mut ctx).await.unwrap().unwrap();
        assert_eq!(principal.name, "lee");
        assert_eq!(principal.roles, vec!["Administrator".to_string(), "99".to_string()]);
        assert_eq!(ctx.principal(), Some(&principal));
    }

    #[tokio::test]
    async fn test_login_moves_user_to_new_session() {
        let h = Harness::new();
        let planted = h.sessions.create();
        let mut ctx = AuthContext::new(Some(planted.clone()), CookieJar::new());
        h.provider.register("mona", "pw", 1, true).await.unwrap();

        h.provider.login(&mut ctx, "mona", "pw", false).await.unwrap().unwrap();

        let sid = ctx.session().unwrap().id().to_string();
        assert_ne!(sid, planted.id());
        let other = AuthContext::new(Some(h.sessions.open(planted.id())), CookieJar::new());
        assert!(h.provider.current(&other).await.unwrap().is_none());
        assert_eq!(h.provider.current(&ctx).await.unwrap().unwrap().name, "mona");
    }

    #[tokio::test]
    async fn test_cookie_auto_login_moves_user_to_new_session() {
        let h = Harness::new();
        h.provider.register("alice", "secret", 0, true).await.unwrap();

        let mut ctx = h.context_with_cookie(&format!("u=alice&p={SECRET_MD5}"));
        let before = ctx.session().unwrap().id().to_string();
        h.provider
            .remember_me()
            .load_cookie(&h.provider, &mut ctx, true)
            .await
            .unwrap()
            .unwrap();

        assert_ne!(ctx.session().unwrap().id(), before);
    }
}
