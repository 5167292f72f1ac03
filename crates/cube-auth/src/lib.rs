//! # cube-auth
//!
//! Current-user management for Cube.
//!
//! ## Modules
//!
//! - `provider`: the [`ManageProvider`] contract and its session-backed implementation
//! - `session`: per-client key/value sessions stored through a cache provider
//! - `cookie`: remember-me cookie codec and reconciliation helper
//! - `password`: MD5 and Argon2id password hashing
//! - `registry`: explicitly constructed service registry
//! - `bootstrap`: default bindings installed once at process start

pub mod bootstrap;
pub mod context;
pub mod cookie;
pub mod password;
pub mod principal;
pub mod provider;
pub mod registry;
pub mod session;

pub use context::AuthContext;
pub use cookie::{RememberCookie, RememberMe};
pub use password::PasswordHasher;
pub use principal::Principal;
pub use provider::{LoginSource, ManageProvider, SessionProvider, UserStore};
pub use registry::ServiceRegistry;
pub use session::{Session, SessionStore};
