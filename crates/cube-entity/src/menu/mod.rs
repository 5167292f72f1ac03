//! Navigation menu entity.

pub mod model;

pub use model::Menu;
