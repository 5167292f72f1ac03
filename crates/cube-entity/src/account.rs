//! The user contract consumed by authentication providers.

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde::de::DeserializeOwned;

/// Capabilities a user type must expose to be managed by a provider.
///
/// Only identity is mandatory. Credentials, roles, and the online flag are
/// optional capabilities with neutral defaults: a type that keeps no
/// password hash never gets a remember-me cookie, a type without roles
/// yields an empty principal role list, and a type without an online flag
/// is never re-persisted on logout.
///
/// Implementors are stored in the session as JSON, hence the serde bounds.
pub trait ManageUser: Clone + Send + Sync + Serialize + DeserializeOwned + 'static {
    /// Numeric identity.
    fn id(&self) -> i64;

    /// Unique login name.
    fn name(&self) -> &str;

    /// Whether the account may log in.
    fn enabled(&self) -> bool;

    /// Builds a not-yet-persisted account from registration input.
    ///
    /// `password_hash` is already hashed by the caller.
    fn new_account(name: &str, password_hash: &str, role_id: i32, enabled: bool) -> Self;

    /// Human-readable name, defaults to the login name.
    fn display_name(&self) -> &str {
        self.name()
    }

    /// Stored password hash, if this type holds credentials.
    fn password_hash(&self) -> Option<&str> {
        None
    }

    /// Ids of the roles granted to this user, primary role first.
    fn role_ids(&self) -> Vec<i32> {
        Vec::new()
    }

    /// Sets the online flag. Returns `false` if the type has no such flag.
    fn set_online(&mut self, _online: bool) -> bool {
        false
    }

    /// Records a successful login (counter, time, address).
    fn record_login(&mut self, _at: DateTime<Utc>, _ip: Option<&str>) {}
}
