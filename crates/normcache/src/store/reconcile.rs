//! Propagating updates to ancestors.

use tracing::debug;

use crate::error::CacheError;
use crate::model::StoreId;
use crate::store::{IdSet, Store};

impl Store {
    /// Invalidates and rebuilds every ancestor of the touched entities.
    ///
    /// Returns the touched ids followed by every affected ancestor, in
    /// discovery order. Touched entities are left unprepared; they were just
    /// rebuilt from their payload and join lazily.
    pub(crate) fn reconcile(&mut self, touched: &IdSet) -> Result<Vec<StoreId>, CacheError> {
        let ancestors = self.invalidate_ancestors(touched);

        let stale: Vec<StoreId> = ancestors
            .iter()
            .filter(|id| !touched.contains(id))
            .cloned()
            .collect();
        for id in &stale {
            self.join(id.as_str())?;
        }

        debug!(
            touched = touched.len(),
            rebuilt = stale.len(),
            "reconciled ancestors"
        );

        let mut affected = touched.to_vec();
        affected.extend(stale);
        Ok(affected)
    }

    /// Drops the memoized view of every transitive ancestor of `touched`,
    /// returning the ancestors in discovery order.
    ///
    /// Touched ids are not expanded further; their own ancestors are reached
    /// through them being touched as well.
    pub(crate) fn invalidate_ancestors(&mut self, touched: &IdSet) -> IdSet {
        let mut ancestors = IdSet::default();
        for id in touched.iter() {
            if let Some(model) = self.models.get(id.as_str()) {
                for parent in &model.parents {
                    ancestors.insert(parent.clone());
                }
            }
        }

        let mut cursor = 0;
        while let Some(id) = ancestors.get(cursor).cloned() {
            cursor += 1;
            if touched.contains(&id) {
                continue;
            }
            if let Some(model) = self.models.get_mut(id.as_str()) {
                model.prepared = None;
                for parent in &model.parents {
                    ancestors.insert(parent.clone());
                }
            }
        }
        ancestors
    }
}
