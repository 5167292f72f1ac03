//! `TableRow` bindings for the Cube entities.

use cube_entity::audit::AuditLogEntry;
use cube_entity::menu::Menu;
use cube_entity::user::{Role, User};

use super::TableRow;

impl TableRow for User {
    type Key = i64;
    const LABEL: &'static str = "User";

    fn key(&self) -> i64 {
        self.id
    }

    fn assign_key(&mut self, seq: i64) {
        self.id = seq;
    }

    fn unique_name(&self) -> Option<&str> {
        Some(&self.name)
    }
}

impl TableRow for Role {
    type Key = i32;
    const LABEL: &'static str = "Role";

    fn key(&self) -> i32 {
        self.id
    }

    fn assign_key(&mut self, seq: i64) {
        self.id = seq as i32;
    }

    fn unique_name(&self) -> Option<&str> {
        Some(&self.name)
    }
}

impl TableRow for Menu {
    type Key = i32;
    const LABEL: &'static str = "Menu";

    fn key(&self) -> i32 {
        self.id
    }

    fn assign_key(&mut self, seq: i64) {
        self.id = seq as i32;
    }

    fn unique_name(&self) -> Option<&str> {
        Some(&self.name)
    }
}

impl TableRow for AuditLogEntry {
    type Key = i64;
    const LABEL: &'static str = "Audit log";
    const APPEND_ONLY: bool = true;

    fn key(&self) -> i64 {
        self.id
    }

    fn assign_key(&mut self, seq: i64) {
        self.id = seq;
    }
}
