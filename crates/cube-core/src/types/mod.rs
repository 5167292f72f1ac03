//! Core type definitions used across the Cube workspace.

pub mod id;
pub mod pagination;

pub use id::{MenuId, RoleId, UserId};
pub use pagination::{PageRequest, PageResponse};
