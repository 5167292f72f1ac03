//! In-process tables used when no database is configured, and by tests.
//!
//! A [`MemoryTable`] assigns sequential keys on `create` and keeps a
//! lower-cased name index so that unique names are enforced atomically
//! through the `dashmap` entry API.

mod rows;

use std::hash::Hash;
use std::sync::atomic::{AtomicI64, Ordering};

use async_trait::async_trait;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use tracing::debug;

use cube_core::error::AppError;
use cube_core::result::AppResult;
use cube_core::traits::{NamedRepository, Repository};
use cube_core::types::pagination::{PageRequest, PageResponse};

/// A row type that can live in a [`MemoryTable`].
pub trait TableRow: Clone + Send + Sync + serde::Serialize + 'static {
    /// Primary key type.
    type Key: Copy + Eq + Hash + Ord + Send + Sync + std::fmt::Display + 'static;

    /// Entity label used in error messages.
    const LABEL: &'static str;

    /// Rows that reject `update` and `delete`.
    const APPEND_ONLY: bool = false;

    /// Current key; meaningless before `create`.
    fn key(&self) -> Self::Key;

    /// Stores the key assigned by the table.
    fn assign_key(&mut self, seq: i64);

    /// Unique name, if the entity has one.
    fn unique_name(&self) -> Option<&str> {
        None
    }
}

/// A concurrent in-memory table.
#[derive(Debug)]
pub struct MemoryTable<E: TableRow> {
    rows: DashMap<E::Key, E>,
    names: DashMap<String, E::Key>,
    seq: AtomicI64,
}

impl<E: TableRow> MemoryTable<E> {
    /// Creates an empty table whose first key is 1.
    pub fn new() -> Self {
        Self {
            rows: DashMap::new(),
            names: DashMap::new(),
            seq: AtomicI64::new(0),
        }
    }
}

impl<E: TableRow> Default for MemoryTable<E> {
    fn default() -> Self {
        Self::new()
    }
}

fn normalize(name: &str) -> String {
    name.trim().to_lowercase()
}

#[async_trait]
impl<E: TableRow> Repository<E, E::Key> for MemoryTable<E> {
    async fn find_by_id(&self, id: &E::Key) -> AppResult<Option<E>> {
        Ok(self.rows.get(id).map(|row| row.value().clone()))
    }

    async fn find_all(&self, page: &PageRequest) -> AppResult<PageResponse<E>> {
        let mut all: Vec<E> = self.rows.iter().map(|row| row.value().clone()).collect();
        all.sort_by_key(|row| row.key());
        let total = all.len() as u64;

        let items = all
            .into_iter()
            .skip(page.offset() as usize)
            .take(page.limit() as usize)
            .collect();

        Ok(PageResponse::new(items, page.page, page.page_size, total))
    }

    async fn create(&self, entity: &E) -> AppResult<E> {
        let mut row = entity.clone();

        match row.unique_name().map(normalize) {
            Some(name) => match self.names.entry(name) {
                Entry::Occupied(_) => {
                    return Err(AppError::conflict(format!(
                        "{} '{}' already exists",
                        E::LABEL,
                        entity.unique_name().unwrap_or_default()
                    )));
                }
                Entry::Vacant(slot) => {
                    row.assign_key(self.seq.fetch_add(1, Ordering::SeqCst) + 1);
                    slot.insert(row.key());
                }
            },
            None => row.assign_key(self.seq.fetch_add(1, Ordering::SeqCst) + 1),
        }

        debug!(table = E::LABEL, key = %row.key(), "Inserted row");
        self.rows.insert(row.key(), row.clone());
        Ok(row)
    }

    async fn update(&self, entity: &E) -> AppResult<E> {
        if E::APPEND_ONLY {
            return Err(AppError::validation(format!("{} entries are immutable", E::LABEL)));
        }

        let key = entity.key();
        let previous = self
            .rows
            .get(&key)
            .map(|row| row.value().clone())
            .ok_or_else(|| AppError::not_found(format!("{} {key} not found", E::LABEL)))?;

        let old_name = previous.unique_name().map(normalize);
        let new_name = entity.unique_name().map(normalize);
        if old_name != new_name {
            if let Some(name) = new_name {
                match self.names.entry(name) {
                    Entry::Occupied(_) => {
                        return Err(AppError::conflict(format!(
                            "{} '{}' already exists",
                            E::LABEL,
                            entity.unique_name().unwrap_or_default()
                        )));
                    }
                    Entry::Vacant(slot) => {
                        slot.insert(key);
                    }
                }
            }
            if let Some(name) = old_name {
                self.names.remove(&name);
            }
        }

        self.rows.insert(key, entity.clone());
        Ok(entity.clone())
    }

    async fn delete(&self, id: &E::Key) -> AppResult<bool> {
        if E::APPEND_ONLY {
            return Err(AppError::validation(format!("{} entries are immutable", E::LABEL)));
        }

        match self.rows.remove(id) {
            Some((_, row)) => {
                if let Some(name) = row.unique_name() {
                    self.names.remove(&normalize(name));
                }
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn count(&self) -> AppResult<u64> {
        Ok(self.rows.len() as u64)
    }
}

#[async_trait]
impl<E: TableRow> NamedRepository<E> for MemoryTable<E> {
    async fn find_by_name(&self, name: &str) -> AppResult<Option<E>> {
        let key = match self.names.get(&normalize(name)) {
            Some(key) => *key.value(),
            None => return Ok(None),
        };
        Ok(self.rows.get(&key).map(|row| row.value().clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cube_core::error::ErrorKind;
    use cube_entity::audit::AuditLogEntry;
    use cube_entity::user::{Role, User};
    use cube_entity::ManageUser;

    #[tokio::test]
    async fn test_create_assigns_sequential_keys() {
        let table = MemoryTable::<User>::new();
        let a = table.create(&User::new_account("alice", "h", 1, true)).await.unwrap();
        let b = table.create(&User::new_account("bob", "h", 1, true)).await.unwrap();
        assert_eq!(a.id, 1);
        assert_eq!(b.id, 2);
        assert_eq!(table.count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_names_are_unique_case_insensitive() {
        let table = MemoryTable::<User>::new();
        table.create(&User::new_account("Alice", "h", 1, true)).await.unwrap();
        let err = table
            .create(&User::new_account("alice", "h", 1, true))
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Conflict);

        let found = table.find_by_name("ALICE").await.unwrap().unwrap();
        assert_eq!(found.name, "Alice");
    }

    #[tokio::test]
    async fn test_name_lookup_ignores_surrounding_whitespace() {
        let table = MemoryTable::<User>::new();
        table.create(&User::new_account("alice", "h", 1, true)).await.unwrap();

        let found = table.find_by_name("  Alice ").await.unwrap().unwrap();
        assert_eq!(found.name, "alice");
        let err = table
            .create(&User::new_account(" ALICE", "h", 1, true))
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Conflict);
    }

    #[tokio::test]
    async fn test_update_renames_index() {
        let table = MemoryTable::<Role>::new();
        let mut role = table.create(&Role::new("Editor")).await.unwrap();
        table.create(&Role::new("Viewer")).await.unwrap();

        role.name = "Writer".to_string();
        table.update(&role).await.unwrap();
        assert!(table.find_by_name("editor").await.unwrap().is_none());
        assert_eq!(table.find_by_name("writer").await.unwrap().unwrap().id, role.id);

        role.name = "viewer".to_string();
        let err = table.update(&role).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Conflict);
    }

    #[tokio::test]
    async fn test_update_missing_row_is_not_found() {
        let table = MemoryTable::<User>::new();
        let mut ghost = User::new_account("ghost", "h", 1, true);
        ghost.id = 99;
        let err = table.update(&ghost).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_delete_frees_name() {
        let table = MemoryTable::<User>::new();
        let user = table.create(&User::new_account("erin", "h", 1, true)).await.unwrap();
        assert!(table.delete(&user.id).await.unwrap());
        assert!(!table.delete(&user.id).await.unwrap());
        table.create(&User::new_account("erin", "h", 1, true)).await.unwrap();
    }

    #[tokio::test]
    async fn test_audit_table_is_append_only() {
        let table = MemoryTable::<AuditLogEntry>::new();
        let entry = table
            .create(&AuditLogEntry::new("User", "Login", "alice", 1, None))
            .await
            .unwrap();
        assert_eq!(entry.id, 1);
        assert!(table.update(&entry).await.is_err());
        assert!(table.delete(&entry.id).await.is_err());
    }

    #[tokio::test]
    async fn test_find_all_pages_in_key_order() {
        let table = MemoryTable::<User>::new();
        for name in ["u1", "u2", "u3"] {
            table.create(&User::new_account(name, "h", 1, true)).await.unwrap();
        }
        let page = table.find_all(&PageRequest::new(2, 2)).await.unwrap();
        assert_eq!(page.total_items, 3);
        assert_eq!(page.items.len(), 1);
        assert_eq!(page.items[0].name, "u3");
    }
}
