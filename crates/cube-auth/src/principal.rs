//! Request-scoped identity used for authorization checks.

use serde::{Deserialize, Serialize};

/// The authenticated identity of a request together with its role names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    /// User identifier.
    pub user_id: i64,
    /// Login name.
    pub name: String,
    /// Role names, primary role first.
    pub roles: Vec<String>,
}

impl Principal {
    /// Creates a principal.
    pub fn new(user_id: i64, name: impl Into<String>, roles: Vec<String>) -> Self {
        Self {
            user_id,
            name: name.into(),
            roles,
        }
    }

    /// Case-insensitive role membership test.
    pub fn is_in_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r.eq_ignore_ascii_case(role))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_in_role() {
        let principal = Principal::new(1, "alice", vec!["Administrator".into(), "7".into()]);
        assert!(principal.is_in_role("administrator"));
        assert!(principal.is_in_role("7"));
        assert!(!principal.is_in_role("Member"));
    }
}
