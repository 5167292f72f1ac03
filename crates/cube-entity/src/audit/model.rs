//! Audit log entry entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// An immutable audit log entry recording an account action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct AuditLogEntry {
    /// Unique audit entry identifier (0 until persisted).
    pub id: i64,
    /// Category of the subject (e.g., `"User"`).
    pub category: String,
    /// The action that was performed (e.g., `"Login"`, `"AutoLogin"`).
    pub action: String,
    /// Name of the subject.
    pub subject: String,
    /// Identifier of the subject.
    pub subject_id: i64,
    /// Additional free-form details.
    pub detail: Option<String>,
    /// Address of the actor.
    pub ip_address: Option<String>,
    /// When the action occurred.
    pub created_at: DateTime<Utc>,
}

impl AuditLogEntry {
    /// Builds an entry that has not been persisted yet.
    pub fn new(
        category: impl Into<String>,
        action: impl Into<String>,
        subject: impl Into<String>,
        subject_id: i64,
        detail: Option<String>,
    ) -> Self {
        Self {
            id: 0,
            category: category.into(),
            action: action.into(),
            subject: subject.into(),
            subject_id,
            detail,
            ip_address: None,
            created_at: Utc::now(),
        }
    }

    /// Attaches the actor's address.
    pub fn with_ip(mut self, ip: Option<&str>) -> Self {
        self.ip_address = ip.map(String::from);
        self
    }
}
