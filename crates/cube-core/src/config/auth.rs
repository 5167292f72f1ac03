//! Authentication and remember-me configuration.

use serde::{Deserialize, Serialize};

/// Cookie name used for the remember-me cookie when none is configured.
pub const DEFAULT_COOKIE_KEY: &str = "cube_user";

/// Longest accepted remember-me lifetime (10 years).
pub const MAX_REMEMBER_DAYS: i64 = 3650;

/// Password hashing algorithm used for newly registered users.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PasswordAlgorithm {
    /// Unsalted MD5 hex digest, compatible with existing remember-me cookies.
    #[default]
    Md5,
    /// Argon2id PHC string.
    Argon2,
}

/// Authentication and credential configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Remember-me cookie name. Empty falls back to [`DEFAULT_COOKIE_KEY`].
    #[serde(default)]
    pub cookie_key: String,
    /// Remember-me cookie lifetime in days, at most [`MAX_REMEMBER_DAYS`].
    #[serde(default = "default_remember_days")]
    pub remember_days: i64,
    /// Hash algorithm applied on registration.
    #[serde(default)]
    pub password_algorithm: PasswordAlgorithm,
    /// Minimum password length accepted by registration.
    #[serde(default = "default_password_min")]
    pub password_min_length: usize,
    /// Whether the remember-me cookie is flagged `Secure`.
    #[serde(default)]
    pub cookie_secure: bool,
    /// Role granted to self-registered accounts.
    #[serde(default = "default_role")]
    pub default_role: String,
}

impl AuthConfig {
    /// Returns the configured cookie key or the fixed fallback name.
    pub fn resolved_cookie_key(&self) -> &str {
        let key = self.cookie_key.trim();
        if key.is_empty() {
            DEFAULT_COOKIE_KEY
        } else {
            key
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            cookie_key: String::new(),
            remember_days: default_remember_days(),
            password_algorithm: PasswordAlgorithm::default(),
            password_min_length: default_password_min(),
            cookie_secure: false,
            default_role: default_role(),
        }
    }
}

fn default_remember_days() -> i64 {
    365
}

fn default_password_min() -> usize {
    1
}

fn default_role() -> String {
    "Member".to_string()
}
