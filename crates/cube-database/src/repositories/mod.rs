//! PostgreSQL repository implementations for all Cube entities.

pub mod audit;
pub mod menu;
pub mod role;
pub mod user;

pub use audit::AuditLogRepository;
pub use menu::MenuRepository;
pub use role::RoleRepository;
pub use user::UserRepository;

/// Name lookup shared by the named tables. Matches the
/// `LOWER(TRIM(name))` unique indexes and the in-memory store's
/// normalization.
pub(crate) fn find_by_name_sql(table: &str) -> String {
    format!("SELECT * FROM {table} WHERE LOWER(TRIM(name)) = LOWER(TRIM($1))")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_lookup_trims_both_sides() {
        assert_eq!(
            find_by_name_sql("roles"),
            "SELECT * FROM roles WHERE LOWER(TRIM(name)) = LOWER(TRIM($1))"
        );
    }

    #[test]
    fn test_migration_indexes_match_lookup() {
        let migration = include_str!("../../../../migrations/20250101000000_membership.sql");
        for table in ["users", "roles", "menus"] {
            let index = format!("ON {table} (LOWER(TRIM(name)))");
            assert!(migration.contains(&index), "missing trimmed index on {table}");
        }
    }
}
