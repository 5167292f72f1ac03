//! Core traits defined in `cube-core` and implemented by other crates.

pub mod cache;
pub mod repository;

pub use cache::CacheProvider;
pub use repository::{NamedRepository, Repository};
