//! Path codec: rebuilding nested values from path-addressed leaves.
//!
//! Flattening happens during normalization (see [`crate::store`]); this module
//! implements the inverse direction.

pub mod path;

pub use path::{assign, build_base, materialize};
