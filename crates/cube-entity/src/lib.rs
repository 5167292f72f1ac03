//! # cube-entity
//!
//! Domain entity models for Cube membership. Every struct in this crate
//! represents a database table row; all derive `Debug`, `Clone`,
//! `Serialize`, `Deserialize`, and `sqlx::FromRow`.
//!
//! [`ManageUser`] is the contract the authentication layer is written
//! against, so that an application can plug in its own user type.

pub mod account;
pub mod audit;
pub mod menu;
pub mod user;

pub use account::ManageUser;
pub use audit::AuditLogEntry;
pub use menu::Menu;
pub use user::{Role, User};
