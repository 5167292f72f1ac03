//! Menu entity model.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A node of the back-office navigation tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Menu {
    /// Unique menu identifier (0 until persisted).
    pub id: i32,
    /// Unique menu name.
    pub name: String,
    /// Caption shown to users.
    pub display_name: Option<String>,
    /// Target address.
    pub url: Option<String>,
    /// Parent node, 0 for roots.
    pub parent_id: i32,
    /// Sort order among siblings.
    pub sort: i32,
    /// Whether the node is shown.
    pub visible: bool,
}

impl Menu {
    /// Creates a visible root menu that has not been persisted yet.
    pub fn new(name: impl Into<String>, url: Option<&str>) -> Self {
        Self {
            id: 0,
            name: name.into(),
            display_name: None,
            url: url.map(String::from),
            parent_id: 0,
            sort: 0,
            visible: true,
        }
    }

    /// Whether this node is a root.
    pub fn is_root(&self) -> bool {
        self.parent_id == 0
    }
}
