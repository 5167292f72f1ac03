//! Per-client sessions stored through a [`CacheProvider`](cube_core::traits::CacheProvider).

pub mod handle;
pub mod store;

pub use handle::Session;
pub use store::SessionStore;
