//! Entity insertion and graph edge maintenance.

use std::collections::VecDeque;
use std::sync::Arc;

use rustc_hash::FxHashSet;
use serde_json::Value;
use tracing::{debug, trace};

use crate::error::CacheError;
use crate::model::{Model, Refs, StoreId};
use crate::store::Store;

impl Store {
    /// Inserts or replaces the entity `id` with the given raw body.
    ///
    /// An id already inserted during the current `parse` call only gains the
    /// parent link; its body is not normalized again.
    pub(crate) fn insert(
        &mut self,
        id: &StoreId,
        body: &Value,
        parent: Option<&StoreId>,
    ) -> Result<(), CacheError> {
        if self.touched.contains(id) {
            if let (Some(parent), Some(model)) = (parent, self.models.get_mut(id.as_str())) {
                model.parents.insert(parent.clone());
            }
            return Ok(());
        }

        let model = self
            .models
            .entry(id.clone())
            .or_insert_with(|| Model::new(id.clone()));
        model.prepared = None;
        let old_children = model.children();
        self.touched.insert(id.clone());
        trace!(id = %id, "inserting entity");

        let normalized = self.normalize(body, Some(id))?;
        let new_children = normalized.refs.children();

        let model = self
            .models
            .get_mut(id.as_str())
            .ok_or_else(|| CacheError::unknown(id.clone()))?;
        model.body = Arc::new(normalized);
        if let Some(parent) = parent {
            model.parents.insert(parent.clone());
        }

        for stale in old_children.difference(&new_children) {
            if let Some(child) = self.models.get_mut(stale.as_str()) {
                child.parents.remove(id.as_str());
                self.detached.push(stale.clone());
            }
        }
        Ok(())
    }

    /// Removes orphans among `candidates`, cascading to their children.
    ///
    /// Ids referenced by `keep` survive regardless. Orphans that only
    /// reference each other in a cycle are never orphans and stay.
    pub(crate) fn sweep_orphans(
        &mut self,
        candidates: impl IntoIterator<Item = StoreId>,
        keep: &Refs,
    ) -> FxHashSet<StoreId> {
        let mut collected = FxHashSet::default();
        let mut queue: VecDeque<StoreId> = candidates.into_iter().collect();

        while let Some(id) = queue.pop_front() {
            if keep.contains_id(id.as_str()) || collected.contains(&id) {
                continue;
            }
            let orphan = self
                .models
                .get(id.as_str())
                .is_some_and(Model::is_orphan);
            if !orphan {
                continue;
            }
            let Some(model) = self.models.remove(id.as_str()) else {
                continue;
            };
            for child in model.children() {
                if let Some(child_model) = self.models.get_mut(child.as_str()) {
                    if child_model.parents.remove(id.as_str()) {
                        queue.push_back(child);
                    }
                }
            }
            trace!(id = %id, "collected orphan");
            collected.insert(id);
        }

        if !collected.is_empty() {
            debug!(collected = collected.len(), "orphan sweep finished");
        }
        collected
    }

    /// Removes every entity with no parents and no listeners, cascading to
    /// children that become orphans. Returns the removed ids.
    ///
    /// Parse roots have no parents; subscribe to the ones that must survive.
    pub fn collect_orphans(&mut self) -> Vec<StoreId> {
        let candidates: Vec<StoreId> = self
            .models
            .values()
            .filter(|model| model.is_orphan())
            .map(|model| model.store_id().clone())
            .collect();
        let mut collected: Vec<StoreId> = self
            .sweep_orphans(candidates, &Refs::new())
            .into_iter()
            .collect();
        collected.sort();
        collected
    }
}
