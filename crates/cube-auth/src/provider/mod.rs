//! The current-user provider contract.
//!
//! A [`ManageProvider`] locates, authenticates, registers, and persists the
//! logged-in user of a request. [`SessionProvider`] is the default
//! implementation, generic over any [`ManageUser`] type and backed by the
//! request session and the remember-me cookie.

pub mod session;

use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;

use cube_core::result::AppResult;
use cube_core::traits::{NamedRepository, Repository};
use cube_core::types::UserId;
use cube_entity::{AuditLogEntry, ManageUser, Menu, Role};

use crate::context::AuthContext;
use crate::cookie::RememberMe;

pub use session::SessionProvider;

/// Persistence required for a user type: keyed CRUD plus lookup by name.
pub trait UserStore<U>: Repository<U, i64> + NamedRepository<U>
where
    U: ManageUser,
{
}

impl<U, T> UserStore<U> for T
where
    U: ManageUser,
    T: Repository<U, i64> + NamedRepository<U> + ?Sized,
{
}

/// Persistence for the small named catalogs (roles, menus).
pub trait CatalogStore<T>: Repository<T, i32> + NamedRepository<T>
where
    T: Send + Sync + serde::Serialize + 'static,
{
}

impl<T, S> CatalogStore<T> for S
where
    T: Send + Sync + serde::Serialize + 'static,
    S: Repository<T, i32> + NamedRepository<T> + ?Sized,
{
}

/// Role persistence.
pub type RoleStore = dyn CatalogStore<Role>;

/// Menu persistence.
pub type MenuStore = dyn CatalogStore<Menu>;

/// Audit log persistence.
pub type AuditStore = dyn Repository<AuditLogEntry, i64>;

/// How a user came to be logged in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginSource {
    /// Name and password.
    Password,
    /// Remember-me cookie.
    Cookie,
}

impl LoginSource {
    /// Audit action recorded for this kind of login.
    pub fn audit_action(self) -> &'static str {
        match self {
            Self::Password => "Login",
            Self::Cookie => "AutoLogin",
        }
    }
}

impl fmt::Display for LoginSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Password => write!(f, "password"),
            Self::Cookie => write!(f, "cookie"),
        }
    }
}

/// Authentication and registration facade for one user type.
///
/// Absence (no session, unknown user, wrong password, disabled account) is
/// reported as `Ok(None)` or a silent no-op. Malformed input is a
/// `Validation` error, and persistence failures propagate unchanged.
#[async_trait]
pub trait ManageProvider: Send + Sync + 'static {
    /// The managed user type.
    type User: ManageUser;

    /// The user logged in for this request, if any.
    async fn current(&self, ctx: &AuthContext) -> AppResult<Option<Self::User>>;

    /// Logs `user` in for this request, or logs out with `None`. Either
    /// way the request continues on a new session id.
    async fn set_current(&self, ctx: &mut AuthContext, user: Option<Self::User>) -> AppResult<()>;

    async fn find_by_id(&self, id: i64) -> AppResult<Option<Self::User>>;

    async fn find_by_name(&self, name: &str) -> AppResult<Option<Self::User>>;

    /// Looks up a user by a textual id, rejecting non-numeric input.
    async fn find_by_id_str(&self, id: &str) -> AppResult<Option<Self::User>> {
        let id = UserId::from_str(id)?;
        self.find_by_id(id.get()).await
    }

    /// Verifies credentials and logs the user in.
    ///
    /// With `remember_me` the remember-me cookie is written as well.
    async fn login(
        &self,
        ctx: &mut AuthContext,
        name: &str,
        password: &str,
        remember_me: bool,
    ) -> AppResult<Option<Self::User>>;

    /// Applies the side effects of a successful login to an already
    /// verified user: online flag and login counters persisted, session
    /// entry written, audit entry recorded.
    async fn complete_login(
        &self,
        ctx: &mut AuthContext,
        user: Self::User,
        source: LoginSource,
    ) -> AppResult<Self::User>;

    /// Logs the current user out and expires the remember-me cookie.
    async fn logout(&self, ctx: &mut AuthContext) -> AppResult<()>;

    /// Creates and persists a new account.
    async fn register(
        &self,
        name: &str,
        password: &str,
        role_id: i32,
        enabled: bool,
    ) -> AppResult<Self::User>;

    /// Remember-me cookie helper bound to this provider.
    fn remember_me(&self) -> &RememberMe;
}
