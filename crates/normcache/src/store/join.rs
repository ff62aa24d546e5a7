//! Reconstructing joined values.
//!
//! Joining an entity materializes its template and assigns the joined value
//! of every child at its ref path. Results are memoized per entity.
//!
//! Reference cycles are cut with a per-call stack: a ref to an entity that is
//! still being built embeds a shallow stub of it (its template only). A value
//! that embeds a stub of an entity deeper in the caller chain than itself
//! depends on where the join started and is not memoized.

use std::sync::Arc;

use rustc_hash::FxHashMap;
use serde_json::Value;
use tracing::trace;

use crate::codec::{assign, materialize};
use crate::error::{CacheError, HookStage};
use crate::model::{Refs, StoreId, Template};
use crate::store::Store;

/// Entities currently being built, with their stack depth.
#[derive(Debug, Default)]
struct JoinStack {
    frames: FxHashMap<StoreId, usize>,
}

/// A joined value plus the shallowest stack frame it stubbed, if any.
struct Built {
    value: Arc<Value>,
    low: Option<usize>,
}

impl Store {
    /// Returns the joined value of entity `id`.
    ///
    /// Fails with [`CacheError::UnknownEntity`] if `id` was never inserted.
    pub fn get(&mut self, id: &str) -> Result<Arc<Value>, CacheError> {
        self.join(id)
    }

    /// Returns the memoized joined value of `id`, building it if needed.
    pub fn join(&mut self, id: &str) -> Result<Arc<Value>, CacheError> {
        let mut stack = JoinStack::default();
        self.join_entity(id, &mut stack).map(|built| built.value)
    }

    /// Reconstructs an arbitrary template and refs pair, such as the result
    /// of [`Store::parse`].
    ///
    /// A pair consisting of a single entity at the root path yields that
    /// entity's joined value unchanged.
    pub fn join_refs(
        &mut self,
        template: &Template,
        refs: &Refs,
    ) -> Result<Arc<Value>, CacheError> {
        if template.is_empty() {
            if let Some(id) = refs.root_singleton() {
                return self.join(id.as_str());
            }
        }
        let mut stack = JoinStack::default();
        let (value, _) = self.assemble(template, refs, &mut stack)?;
        Ok(Arc::new(value))
    }

    fn join_entity(&mut self, id: &str, stack: &mut JoinStack) -> Result<Built, CacheError> {
        let model = self.models.get(id).ok_or_else(|| CacheError::unknown(id))?;
        if let Some(prepared) = &model.prepared {
            return Ok(Built {
                value: Arc::clone(prepared),
                low: None,
            });
        }
        if let Some(&frame) = stack.frames.get(id) {
            trace!(id, frame, "reference cycle, embedding stub");
            return Ok(Built {
                value: Arc::new(materialize(model.template())),
                low: Some(frame),
            });
        }

        let body = Arc::clone(&model.body);
        let depth = stack.frames.len();
        stack.frames.insert(StoreId::from(id), depth);
        let assembled = self.assemble(&body.template, &body.refs, stack);
        stack.frames.remove(id);
        let (value, low) = assembled?;

        let value = Arc::new(value);
        self.run_join_hook(&value)?;

        let low = low.filter(|frame| *frame < depth);
        if low.is_none() {
            if let Some(model) = self.models.get_mut(id) {
                model.prepared = Some(Arc::clone(&value));
            }
        }
        trace!(id, memoized = low.is_none(), "joined entity");
        Ok(Built { value, low })
    }

    fn assemble(
        &mut self,
        template: &Template,
        refs: &Refs,
        stack: &mut JoinStack,
    ) -> Result<(Value, Option<usize>), CacheError> {
        let mut base = materialize(template);
        let mut low: Option<usize> = None;
        for (path, child) in refs.iter() {
            let built = self.join_entity(child.as_str(), stack)?;
            low = match (low, built.low) {
                (Some(a), Some(b)) => Some(a.min(b)),
                (a, b) => a.or(b),
            };
            assign(&mut base, path, Arc::unwrap_or_clone(built.value));
        }
        Ok((base, low))
    }

    fn run_join_hook(&self, value: &Value) -> Result<(), CacheError> {
        match &self.config.join_hook {
            Some(hook) => hook(value).map_err(|source| CacheError::Hook {
                stage: HookStage::Join,
                source,
            }),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use serde_json::json;

    use super::*;
    use crate::config::Config;

    #[test]
    fn test_memo_hit_returns_same_value() {
        let mut store = Store::default();
        store.parse(&json!({"type": "user", "id": "1", "name": "a"})).unwrap();
        let first = store.get("user:1").unwrap();
        let second = store.join("user:1").unwrap();
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn test_join_hook_fires_per_construction() {
        let built = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&built);
        let mut store = Store::new(Config::new().on_join(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }));
        store
            .parse(&json!({"type": "user", "id": "1", "friend": {"type": "user", "id": "2"}}))
            .unwrap();

        store.get("user:1").unwrap();
        assert_eq!(built.load(Ordering::SeqCst), 2);
        store.get("user:1").unwrap();
        store.get("user:2").unwrap();
        assert_eq!(built.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_join_hook_failure() {
        let mut store = Store::new(Config::new().on_join(|_| Err("rejected".into())));
        store.parse(&json!({"type": "user", "id": "1"})).unwrap();
        let err = store.get("user:1").unwrap_err();
        assert!(matches!(
            err,
            CacheError::Hook {
                stage: HookStage::Join,
                ..
            }
        ));
        assert!(!store.model("user:1").unwrap().is_prepared());
    }

    #[test]
    fn test_mutual_reference_is_stubbed() {
        let mut store = Store::default();
        store
            .parse(&json!({
                "type": "user", "id": "1", "name": "a",
                "friend": {
                    "type": "user", "id": "2", "name": "b",
                    "friend": {"type": "user", "id": "1"},
                },
            }))
            .unwrap();

        let one = store.get("user:1").unwrap();
        assert_eq!(
            *one,
            json!({
                "type": "user", "id": "1", "name": "a",
                "friend": {
                    "type": "user", "id": "2", "name": "b",
                    "friend": {"type": "user", "id": "1", "name": "a"},
                },
            })
        );
        // user:2 was built relative to user:1's frame, so it is rebuilt on
        // its own terms.
        assert!(store.model("user:1").unwrap().is_prepared());
        assert!(!store.model("user:2").unwrap().is_prepared());

        // The memoized user:1 is reused as-is underneath user:2.
        let two = store.get("user:2").unwrap();
        assert_eq!(two["friend"], *one);
        assert!(store.model("user:2").unwrap().is_prepared());
    }

    #[test]
    fn test_self_reference_is_memoized() {
        let mut store = Store::default();
        store
            .parse(&json!({"type": "node", "id": "1", "v": 1, "next": {"type": "node", "id": "1"}}))
            .unwrap();
        let node = store.get("node:1").unwrap();
        assert_eq!(node["next"], json!({"type": "node", "id": "1", "v": 1}));
        assert!(store.model("node:1").unwrap().is_prepared());
    }

    #[test]
    fn test_join_refs_unknown_child() {
        let mut store = Store::default();
        let mut refs = Refs::new();
        refs.insert(Vec::new(), StoreId::from("ghost:1"));
        let err = store.join_refs(&Template::default(), &refs).unwrap_err();
        assert!(err.is_unknown_entity());
    }
}
