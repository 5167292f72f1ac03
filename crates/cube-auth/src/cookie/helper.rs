//! Reconciles the logged-in user with the remember-me cookie and attaches
//! the request principal.

use std::fmt;
use std::sync::Arc;

use axum_extra::extract::cookie::{Cookie, SameSite};
use time::{Duration, OffsetDateTime};
use tracing::{debug, info, warn};

use cube_core::config::{AuthConfig, MAX_REMEMBER_DAYS};
use cube_core::result::AppResult;
use cube_core::traits::Repository;
use cube_entity::ManageUser;

use crate::context::AuthContext;
use crate::principal::Principal;
use crate::provider::{LoginSource, ManageProvider, RoleStore};

use super::codec::RememberCookie;

/// Remember-me cookie helper.
#[derive(Clone)]
pub struct RememberMe {
    cookie_key: String,
    max_age: Duration,
    secure: bool,
    roles: Option<Arc<RoleStore>>,
}

impl fmt::Debug for RememberMe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RememberMe")
            .field("cookie_key", &self.cookie_key)
            .field("max_age", &self.max_age)
            .field("secure", &self.secure)
            .field("roles", &self.roles.is_some())
            .finish()
    }
}

impl RememberMe {
    /// Creates a helper using the configured cookie key (or `cube_user`).
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            cookie_key: config.resolved_cookie_key().to_string(),
            max_age: Duration::days(config.remember_days.clamp(1, MAX_REMEMBER_DAYS)),
            secure: config.cookie_secure,
            roles: None,
        }
    }

    /// Resolves principal role names through `roles`.
    pub fn with_roles(mut self, roles: Arc<RoleStore>) -> Self {
        self.roles = Some(roles);
        self
    }

    /// Name of the remember-me cookie.
    pub fn cookie_key(&self) -> &str {
        &self.cookie_key
    }

    /// Lifetime applied to the cookie when "remember me" is requested.
    pub fn max_age(&self) -> Duration {
        self.max_age
    }

    /// Attaches a principal for the current user to the context.
    ///
    /// Role names come from the role store; a role that cannot be found is
    /// represented by its id. Does nothing when no user is logged in.
    pub async fn set_principal<P>(
        &self,
        provider: &P,
        ctx: &mut AuthContext,
    ) -> AppResult<Option<Principal>>
    where
        P: ManageProvider + ?Sized,
    {
        let Some(user) = provider.current(ctx).await? else {
            return Ok(None);
        };

        let mut roles = Vec::new();
        for role_id in user.role_ids() {
            let name = match &self.roles {
                Some(store) => store.find_by_id(&role_id).await?.map(|role| role.name),
                None => None,
            };
            roles.push(name.unwrap_or_else(|| role_id.to_string()));
        }

        let principal = Principal::new(user.id(), user.name(), roles);
        ctx.set_principal(Some(principal.clone()));
        Ok(Some(principal))
    }

    /// Validates the remember-me cookie against the user store.
    ///
    /// Every rejection (missing or malformed cookie, unknown or disabled
    /// user, hash mismatch) yields `Ok(None)`. With `auto_login` a valid
    /// cookie logs the user in through
    /// [`ManageProvider::complete_login`], which persists the login and
    /// records an `AutoLogin` audit entry. Without it this is a pure read.
    pub async fn load_cookie<P>(
        &self,
        provider: &P,
        ctx: &mut AuthContext,
        auto_login: bool,
    ) -> AppResult<Option<P::User>>
    where
        P: ManageProvider + ?Sized,
    {
        let Some(raw) = ctx.cookie(&self.cookie_key) else {
            return Ok(None);
        };
        let Some(cookie) = RememberCookie::decode(&raw) else {
            debug!(cookie = %self.cookie_key, "Ignoring malformed remember-me cookie");
            return Ok(None);
        };

        let Some(user) = provider.find_by_name(&cookie.name).await? else {
            warn!(name = %cookie.name, "Remember-me cookie names an unknown user");
            return Ok(None);
        };
        if !user.enabled() {
            warn!(user_id = user.id(), name = %cookie.name, "Remember-me cookie for disabled user");
            return Ok(None);
        }
        let matches = user
            .password_hash()
            .is_some_and(|hash| hash.eq_ignore_ascii_case(&cookie.password_hash));
        if !matches {
            warn!(user_id = user.id(), name = %cookie.name, "Remember-me cookie hash mismatch");
            return Ok(None);
        }

        if !auto_login {
            return Ok(Some(user));
        }

        let user = provider.complete_login(ctx, user, LoginSource::Cookie).await?;
        info!(user_id = user.id(), name = %user.name(), "User logged in from remember-me cookie");
        Ok(Some(user))
    }

    /// Writes or expires the remember-me cookie.
    ///
    /// For a user holding a password hash the cookie is written only when
    /// the value differs from what the request already carries. `None`
    /// expires the cookie. Returns whether a cookie was written.
    pub fn save_cookie<U: ManageUser>(
        &self,
        ctx: &mut AuthContext,
        user: Option<&U>,
        max_age: Duration,
    ) -> bool {
        let Some(user) = user else {
            let expired = Cookie::build((self.cookie_key.clone(), String::new()))
                .path("/")
                .http_only(true)
                .max_age(Duration::ZERO)
                .expires(OffsetDateTime::now_utc() - Duration::days(1))
                .build();
            ctx.add_cookie(expired);
            debug!(cookie = %self.cookie_key, "Expired remember-me cookie");
            return true;
        };

        let Some(hash) = user.password_hash() else {
            return false;
        };

        let value = RememberCookie::new(user.name(), hash).encode();
        if ctx.cookie(&self.cookie_key).as_deref() == Some(value.as_str()) {
            return false;
        }

        let cookie = Cookie::build((self.cookie_key.clone(), value))
            .path("/")
            .http_only(true)
            .secure(self.secure)
            .same_site(SameSite::Lax)
            .max_age(max_age)
            .build();
        ctx.add_cookie(cookie);
        debug!(user_id = user.id(), cookie = %self.cookie_key, "Wrote remember-me cookie");
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lifetime_is_clamped() {
        let mut config = AuthConfig {
            remember_days: i64::MAX,
            ..AuthConfig::default()
        };
        assert_eq!(RememberMe::new(&config).max_age(), Duration::days(MAX_REMEMBER_DAYS));

        config.remember_days = 0;
        assert_eq!(RememberMe::new(&config).max_age(), Duration::days(1));
    }

    #[test]
    fn test_cookie_key_falls_back() {
        assert_eq!(RememberMe::new(&AuthConfig::default()).cookie_key(), "cube_user");
    }
}
