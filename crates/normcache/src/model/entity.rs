//! Registry record for a single entity.

use std::sync::Arc;

use rustc_hash::FxHashSet;
use serde_json::Value;

use crate::model::template::{Normalized, Refs, Template};
use crate::model::StoreId;
use crate::store::Listener;

/// A stored entity: its flattened body, graph edges, memoized view and
/// subscribers.
///
/// Children are always derived from [`Model::refs`]; only the reverse edges
/// (`parents`) are stored.
#[derive(Debug)]
pub struct Model {
    store_id: StoreId,
    pub(crate) parents: FxHashSet<StoreId>,
    pub(crate) body: Arc<Normalized>,
    pub(crate) prepared: Option<Arc<Value>>,
    pub(crate) listeners: FxHashSet<Listener>,
}

impl Model {
    pub(crate) fn new(store_id: StoreId) -> Self {
        Self {
            store_id,
            parents: FxHashSet::default(),
            body: Arc::default(),
            prepared: None,
            listeners: FxHashSet::default(),
        }
    }

    /// The entity's key.
    pub fn store_id(&self) -> &StoreId {
        &self.store_id
    }

    /// Entities whose refs point at this entity.
    pub fn parents(&self) -> &FxHashSet<StoreId> {
        &self.parents
    }

    /// Directly nested entities, by path.
    pub fn refs(&self) -> &Refs {
        &self.body.refs
    }

    /// Non-entity content, by path.
    pub fn template(&self) -> &Template {
        &self.body.template
    }

    /// Distinct ids referenced by this entity.
    pub fn children(&self) -> FxHashSet<StoreId> {
        self.body.refs.children()
    }

    /// Returns true if a joined view is currently memoized.
    pub fn is_prepared(&self) -> bool {
        self.prepared.is_some()
    }

    /// Number of listeners subscribed to this entity.
    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    /// No parents and no listeners.
    pub(crate) fn is_orphan(&self) -> bool {
        self.parents.is_empty() && self.listeners.is_empty()
    }
}
