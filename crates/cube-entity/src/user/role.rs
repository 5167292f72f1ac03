//! Role entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A named role granted to users.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Role {
    /// Unique role identifier (0 until persisted).
    pub id: i32,
    /// Unique role name.
    pub name: String,
    /// Whether the role is in effect.
    pub enabled: bool,
    /// Built-in roles cannot be deleted.
    pub is_system: bool,
    /// Free-form description.
    pub remark: Option<String>,
    /// When the role was created.
    pub created_at: DateTime<Utc>,
}

impl Role {
    /// Creates an enabled, non-system role that has not been persisted yet.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: 0,
            name: name.into(),
            enabled: true,
            is_system: false,
            remark: None,
            created_at: Utc::now(),
        }
    }

    /// Marks the role as built-in.
    pub fn system(mut self) -> Self {
        self.is_system = true;
        self
    }
}
