//! Remember-me cookie handling.

pub mod codec;
pub mod helper;

pub use codec::RememberCookie;
pub use helper::RememberMe;
