//! The normalized entity store.
//!
//! [`Store::parse`] runs the whole update pipeline to completion:
//!
//! 1. normalize the payload breadth-first, inserting every entity it contains
//! 2. optionally sweep entities orphaned by the update
//! 3. invalidate and rebuild the joined views of every affected ancestor
//! 4. notify each subscribed listener once with the affected ids

mod graph;
mod join;
mod normalize;
mod notify;
mod reconcile;

pub use notify::Listener;

use rustc_hash::{FxHashMap, FxHashSet};
use serde_json::Value;
use tracing::debug;

use crate::config::{Config, OrphanPolicy};
use crate::error::CacheError;
use crate::model::{Model, Normalized, StoreId};

/// Insertion-ordered set of ids.
#[derive(Debug, Default, Clone)]
pub(crate) struct IdSet {
    order: Vec<StoreId>,
    members: FxHashSet<StoreId>,
}

impl IdSet {
    /// Adds `id`, returning false if it was already present.
    pub(crate) fn insert(&mut self, id: StoreId) -> bool {
        if self.members.contains(&id) {
            return false;
        }
        self.members.insert(id.clone());
        self.order.push(id);
        true
    }

    pub(crate) fn contains(&self, id: &StoreId) -> bool {
        self.members.contains(id)
    }

    pub(crate) fn get(&self, index: usize) -> Option<&StoreId> {
        self.order.get(index)
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = &StoreId> {
        self.order.iter()
    }

    pub(crate) fn retain(&mut self, mut keep: impl FnMut(&StoreId) -> bool) {
        self.order.retain(|id| keep(id));
        self.members = self.order.iter().cloned().collect();
    }

    pub(crate) fn len(&self) -> usize {
        self.order.len()
    }

    pub(crate) fn to_vec(&self) -> Vec<StoreId> {
        self.order.clone()
    }
}

/// In-memory normalized object-graph cache.
///
/// Every entity is stored once, keyed by its [`StoreId`]. A `Store` is an
/// ordinary owned value; independent stores never share state.
#[derive(Debug, Default)]
pub struct Store {
    config: Config,
    pub(crate) models: FxHashMap<StoreId, Model>,
    /// Ids inserted during the current `parse` call.
    touched: IdSet,
    /// Children that lost a parent link during the current `parse` call.
    detached: Vec<StoreId>,
}

impl Store {
    /// Creates an empty store.
    pub fn new(config: Config) -> Self {
        Self {
            config,
            models: FxHashMap::default(),
            touched: IdSet::default(),
            detached: Vec::new(),
        }
    }

    /// Returns the store configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Ingests a payload.
    ///
    /// Every entity found in `data` is inserted or replaced, the joined views
    /// of their ancestors are rebuilt, and listeners on any affected entity
    /// are notified once. Returns the normalized form of `data` itself, which
    /// [`Store::join_refs`] turns back into the payload shape.
    ///
    /// On error the remainder of the call is abandoned. Entities inserted so
    /// far stay inserted and the memoized views of their ancestors are
    /// dropped, but no listener is notified.
    pub fn parse(&mut self, data: &Value) -> Result<Normalized, CacheError> {
        let outcome = self.normalize(data, None);
        let mut touched = std::mem::take(&mut self.touched);
        let detached = std::mem::take(&mut self.detached);
        let normalized = match outcome {
            Ok(normalized) => normalized,
            Err(err) => {
                self.invalidate_ancestors(&touched);
                return Err(err);
            }
        };

        if self.config.orphan_policy == OrphanPolicy::Collect && !detached.is_empty() {
            let collected = self.sweep_orphans(detached, &normalized.refs);
            touched.retain(|id| !collected.contains(id));
        }

        let affected = self.reconcile(&touched)?;
        self.notify(&affected);

        debug!(
            entities = self.models.len(),
            touched = touched.len(),
            affected = affected.len(),
            "parsed payload"
        );
        Ok(normalized)
    }

    /// Returns true if `id` has been inserted.
    pub fn contains(&self, id: &str) -> bool {
        self.models.contains_key(id)
    }

    /// Returns the record for `id`.
    pub fn model(&self, id: &str) -> Option<&Model> {
        self.models.get(id)
    }

    /// Iterates over every stored entity.
    pub fn models(&self) -> impl Iterator<Item = &Model> {
        self.models.values()
    }

    /// Number of stored entities.
    pub fn len(&self) -> usize {
        self.models.len()
    }

    /// Returns true if no entity is stored.
    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }
}
