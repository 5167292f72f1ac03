//! User entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::account::ManageUser;

/// A registered user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct User {
    /// Unique user identifier (0 until persisted).
    pub id: i64,
    /// Unique login name.
    pub name: String,
    /// Password hash (MD5 hex or Argon2 PHC string).
    pub password_hash: String,
    /// Human-readable display name.
    pub display_name: Option<String>,
    /// Whether the account may log in.
    pub enabled: bool,
    /// Primary role.
    pub role_id: i32,
    /// Additional role ids, comma separated.
    pub role_ids: Option<String>,
    /// Whether the user currently has an authenticated session.
    pub online: bool,
    /// Number of successful logins.
    pub logins: i32,
    /// Last successful login time.
    pub last_login_at: Option<DateTime<Utc>>,
    /// Address of the last successful login.
    pub last_login_ip: Option<String>,
    /// When the user registered.
    pub registered_at: DateTime<Utc>,
    /// When the user was last updated.
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Parses the extra role list, skipping malformed entries.
    pub fn extra_role_ids(&self) -> Vec<i32> {
        self.role_ids
            .as_deref()
            .unwrap_or_default()
            .split(',')
            .filter_map(|s| s.trim().parse::<i32>().ok())
            .filter(|id| *id > 0)
            .collect()
    }
}

impl ManageUser for User {
    fn id(&self) -> i64 {
        self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn enabled(&self) -> bool {
        self.enabled
    }

    fn new_account(name: &str, password_hash: &str, role_id: i32, enabled: bool) -> Self {
        let now = Utc::now();
        Self {
            id: 0,
            name: name.to_string(),
            password_hash: password_hash.to_string(),
            display_name: None,
            enabled,
            role_id,
            role_ids: None,
            online: false,
            logins: 0,
            last_login_at: None,
            last_login_ip: None,
            registered_at: now,
            updated_at: now,
        }
    }

    fn display_name(&self) -> &str {
        self.display_name.as_deref().unwrap_or(&self.name)
    }

    fn password_hash(&self) -> Option<&str> {
        if self.password_hash.is_empty() {
            None
        } else {
            Some(&self.password_hash)
        }
    }

    fn role_ids(&self) -> Vec<i32> {
        let mut ids = Vec::new();
        if self.role_id > 0 {
            ids.push(self.role_id);
        }
        for id in self.extra_role_ids() {
            if !ids.contains(&id) {
                ids.push(id);
            }
        }
        ids
    }

    fn set_online(&mut self, online: bool) -> bool {
        self.online = online;
        true
    }

    fn record_login(&mut self, at: DateTime<Utc>, ip: Option<&str>) {
        self.logins += 1;
        self.last_login_at = Some(at);
        self.last_login_ip = ip.map(String::from);
        self.updated_at = at;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_account_is_offline_and_unsaved() {
        let user = User::new_account("alice", "5ebe2294ecd0e0f08eab7690d2a6ee69", 1, true);
        assert_eq!(user.id, 0);
        assert!(!user.online);
        assert_eq!(ManageUser::password_hash(&user), Some("5ebe2294ecd0e0f08eab7690d2a6ee69"));
        assert_eq!(ManageUser::display_name(&user), "alice");
    }

    #[test]
    fn test_role_ids_merge_primary_and_extra() {
        let mut user = User::new_account("bob", "x", 2, true);
        user.role_ids = Some("3, 2,abc,0,4".to_string());
        assert_eq!(ManageUser::role_ids(&user), vec![2, 3, 4]);

        user.role_id = 0;
        user.role_ids = None;
        assert!(ManageUser::role_ids(&user).is_empty());
    }

    #[test]
    fn test_record_login_updates_metadata() {
        let mut user = User::new_account("carol", "x", 1, true);
        let now = Utc::now();
        user.record_login(now, Some("10.0.0.1"));
        user.record_login(now, None);
        assert_eq!(user.logins, 2);
        assert_eq!(user.last_login_at, Some(now));
        assert_eq!(user.last_login_ip, None);
    }

    #[test]
    fn test_empty_hash_means_no_credentials() {
        let user = User::new_account("dave", "", 1, true);
        assert_eq!(ManageUser::password_hash(&user), None);
    }
}
