//! Session configuration.

use serde::{Deserialize, Serialize};

/// Longest accepted idle timeout (30 days).
pub const MAX_IDLE_TIMEOUT_MINUTES: u64 = 30 * 24 * 60;

/// Session key and lifetime configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Key under which the current user is stored in the session.
    #[serde(default = "default_key")]
    pub key: String,
    /// Name of the cookie carrying the session identifier.
    #[serde(default = "default_cookie_name")]
    pub cookie_name: String,
    /// Idle timeout in minutes; session entries expire after this long.
    /// At most [`MAX_IDLE_TIMEOUT_MINUTES`].
    #[serde(default = "default_idle_timeout")]
    pub idle_timeout_minutes: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            key: default_key(),
            cookie_name: default_cookie_name(),
            idle_timeout_minutes: default_idle_timeout(),
        }
    }
}

fn default_key() -> String {
    "Admin".to_string()
}

fn default_cookie_name() -> String {
    "cube_sid".to_string()
}

fn default_idle_timeout() -> u64 {
    20
}
