//! Structural validation of the entity graph.
//!
//! The store maintains these properties on every update; this module checks
//! them from the outside, for tests and for callers that want an assertion
//! after a failed (non-atomic) `parse`.

use crate::error::GraphError;
use crate::store::Store;

/// Checks the reference graph of `store`.
///
/// - every ref target is a stored entity
/// - every parent is a stored entity
/// - if `B` is a child of `A`, `A` is among `B`'s parents
///
/// Parents without a matching ref are tolerated: a failed `parse` can leave
/// such links behind, and they only widen invalidation.
pub fn check_graph(store: &Store) -> Result<(), GraphError> {
    for model in store.models() {
        let owner = model.store_id();

        for (_, child) in model.refs().iter() {
            let Some(child_model) = store.model(child.as_str()) else {
                return Err(GraphError::DanglingRef {
                    owner: owner.clone(),
                    child: child.clone(),
                });
            };
            if !child_model.parents().contains(owner) {
                return Err(GraphError::MissingParentLink {
                    parent: owner.clone(),
                    child: child.clone(),
                });
            }
        }

        for parent in model.parents() {
            if !store.contains(parent.as_str()) {
                return Err(GraphError::DanglingParent {
                    child: owner.clone(),
                    parent: parent.clone(),
                });
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::config::{Config, OrphanPolicy};

    #[test]
    fn test_valid_graph() {
        let mut store = Store::default();
        store
            .parse(&json!({
                "items": [
                    {"type": "user", "id": "1", "best": {"type": "user", "id": "2"}},
                    {"type": "user", "id": "2", "best": {"type": "user", "id": "1"}},
                ]
            }))
            .unwrap();
        assert!(check_graph(&store).is_ok());
    }

    #[test]
    fn test_graph_after_collection() {
        let mut store = Store::new(Config::new().orphan_policy(OrphanPolicy::Collect));
        store
            .parse(&json!({"type": "user", "id": "1", "pet": {"type": "pet", "id": "1"}}))
            .unwrap();
        store.parse(&json!({"type": "user", "id": "1"})).unwrap();
        assert!(check_graph(&store).is_ok());
    }

    #[test]
    fn test_missing_parent_link_detected() {
        let mut store = Store::default();
        store
            .parse(&json!({"type": "user", "id": "1", "pet": {"type": "pet", "id": "1"}}))
            .unwrap();
        if let Some(pet) = store.models.get_mut("pet:1") {
            pet.parents.clear();
        }
        assert_eq!(
            check_graph(&store),
            Err(GraphError::MissingParentLink {
                parent: "user:1".into(),
                child: "pet:1".into(),
            })
        );
    }
}
