//! Data model types for the cache.
//!
//! - Identifiers ([`StoreId`]) and the default identity scheme
//! - Paths and container markers
//! - Templates and refs (flattened entity bodies)
//! - Entity records ([`Model`])

pub mod entity;
pub mod id;
pub mod path;
pub mod template;

pub use entity::Model;
pub use id::{default_identity, is_truthy, StoreId, ID_FIELD, TYPE_FIELD};
pub use path::{child_path, format_path, Key, Marker, Path, Segment};
pub use template::{Normalized, Refs, Slot, Template};
