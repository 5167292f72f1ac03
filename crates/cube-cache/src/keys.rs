//! Cache key builders for session entries.
//!
//! Centralising key construction keeps the layout in one place:
//! `session:{sid}:{key}`.

const SESSION: &str = "session";

/// Cache key for one value stored in a session.
pub fn session_entry(session_id: &str, key: &str) -> String {
    format!("{SESSION}:{session_id}:{key}")
}

/// Pattern matching every value of a session.
pub fn session_pattern(session_id: &str) -> String {
    format!("{SESSION}:{session_id}:*")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_keys() {
        assert_eq!(session_entry("abc", "Admin"), "session:abc:Admin");
        assert_eq!(session_pattern("abc"), "session:abc:*");
    }
}
