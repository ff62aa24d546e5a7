//! Subscriptions and batched change notification.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use rustc_hash::FxHashSet;
use tracing::trace;

use crate::error::CacheError;
use crate::model::StoreId;
use crate::store::Store;

type ListenerFn = dyn Fn(&[StoreId]) + Send + Sync;

/// Handle to a change callback.
///
/// Cloning a listener yields the same handle; equality and hashing follow
/// handle identity, so a listener registered under several entities fires
/// once per `parse` call.
#[derive(Clone)]
pub struct Listener(Arc<ListenerFn>);

impl Listener {
    /// Wraps a callback receiving every affected id of a `parse` call.
    pub fn new<F>(callback: F) -> Self
    where
        F: Fn(&[StoreId]) + Send + Sync + 'static,
    {
        Listener(Arc::new(callback))
    }

    fn call(&self, ids: &[StoreId]) {
        (self.0)(ids)
    }

    fn addr(&self) -> *const () {
        Arc::as_ptr(&self.0) as *const ()
    }
}

impl PartialEq for Listener {
    fn eq(&self, other: &Self) -> bool {
        self.addr() == other.addr()
    }
}

impl Eq for Listener {}

impl Hash for Listener {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.addr().hash(state);
    }
}

impl fmt::Debug for Listener {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Listener").field(&self.addr()).finish()
    }
}

impl Store {
    /// Attaches `listener` to every entity in `ids`.
    ///
    /// Fails with [`CacheError::UnknownEntity`] before touching any listener
    /// set if one of the ids was never inserted.
    pub fn subscribe<I, S>(&mut self, ids: I, listener: &Listener) -> Result<(), CacheError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let ids = self.resolve_known(ids)?;
        for id in ids {
            if let Some(model) = self.models.get_mut(id.as_str()) {
                model.listeners.insert(listener.clone());
            }
        }
        Ok(())
    }

    /// Detaches `listener` from every entity in `ids`.
    pub fn unsubscribe<I, S>(&mut self, ids: I, listener: &Listener) -> Result<(), CacheError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let ids = self.resolve_known(ids)?;
        for id in ids {
            if let Some(model) = self.models.get_mut(id.as_str()) {
                model.listeners.remove(listener);
            }
        }
        Ok(())
    }

    /// Invokes every listener attached to any of `affected`, exactly once,
    /// with the whole batch.
    pub(crate) fn notify(&self, affected: &[StoreId]) {
        let mut seen = FxHashSet::default();
        let mut listeners = Vec::new();
        for id in affected {
            let Some(model) = self.models.get(id.as_str()) else {
                continue;
            };
            for listener in &model.listeners {
                if seen.insert(listener.clone()) {
                    listeners.push(listener.clone());
                }
            }
        }

        trace!(
            listeners = listeners.len(),
            affected = affected.len(),
            "notifying listeners"
        );
        for listener in listeners {
            listener.call(affected);
        }
    }

    fn resolve_known<I, S>(&self, ids: I) -> Result<Vec<StoreId>, CacheError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        ids.into_iter()
            .map(|id| {
                let id = id.as_ref();
                if self.models.contains_key(id) {
                    Ok(StoreId::from(id))
                } else {
                    Err(CacheError::unknown(id))
                }
            })
            .collect()
    }
}
