//! normcache: a normalized, in-memory object-graph cache.
//!
//! Payloads (typically API responses) are split into identity-bearing
//! entities, each stored exactly once. Entities refer to one another by
//! [`StoreId`]; when an entity is ingested again with new content, every
//! cached view that embeds it is rebuilt and subscribers are notified once.
//!
//! # Quick Start
//!
//! ```rust
//! use normcache::{Listener, Store};
//! use serde_json::json;
//!
//! let mut store = Store::default();
//! let response = store.parse(&json!({
//!     "type": "user", "id": "1", "name": "alex",
//!     "friend": {"type": "user", "id": "2", "name": "sasha"},
//! })).unwrap();
//!
//! store.subscribe(["user:2"], &Listener::new(|ids| {
//!     println!("changed: {ids:?}");
//! })).unwrap();
//!
//! // Updating user:2 also rebuilds user:1, which embeds it.
//! store.parse(&json!({"type": "user", "id": "2", "name": "sasha b"})).unwrap();
//!
//! let user = store.join_refs(&response.template, &response.refs).unwrap();
//! assert_eq!(user["friend"]["name"], "sasha b");
//! ```
//!
//! # Modules
//!
//! - [`model`]: identifiers, paths, templates and entity records
//! - [`codec`]: rebuilding containers from path-addressed values
//! - [`store`]: normalization, reconciliation, joins and subscriptions
//! - [`config`]: identity resolution, hooks and orphan policy
//! - [`validate`]: graph consistency checks
//! - [`error`]: error types
//!
//! # Identity
//!
//! By default an object is an entity when its `type` and `id` fields are both
//! truthy; its key is `"<type>:<id>"`. Use [`Config::identity`] to change this.
//!
//! # Threading
//!
//! All operations are synchronous. Everything that can memoize or mutate takes
//! `&mut self`; a store can be moved between threads, and concurrent writers
//! must share it behind their own lock.

pub mod codec;
pub mod config;
pub mod error;
pub mod model;
pub mod store;
pub mod validate;

// Re-export commonly used types at crate root
pub use config::{Config, OrphanPolicy};
pub use error::{CacheError, GraphError, HookError, HookStage};
pub use model::{Key, Marker, Model, Normalized, Path, Refs, Segment, Slot, StoreId, Template};
pub use store::{Listener, Store};
pub use validate::check_graph;

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
