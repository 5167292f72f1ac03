//! Audit log entity.

pub mod model;

pub use model::AuditLogEntry;
