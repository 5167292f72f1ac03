//! # cube-database
//!
//! Persistence for Cube entities. Two interchangeable backends implement
//! the `cube-core` repository traits:
//!
//! - `repositories`: PostgreSQL through sqlx, with embedded migrations
//! - `memory`: process-local tables backed by `dashmap`

pub mod connection;
pub mod memory;
pub mod migration;
pub mod repositories;

pub use connection::DatabasePool;
pub use memory::MemoryTable;
