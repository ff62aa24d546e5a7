//! Flattening payloads into templates and refs.
//!
//! Values are walked breadth-first. Each one is classified once into a
//! [`Shape`]; entities are handed to the graph store and never expanded
//! inline.

use std::collections::VecDeque;

use serde_json::{Map, Value};

use crate::error::{CacheError, HookStage};
use crate::model::{child_path, Marker, Normalized, Path, Refs, Segment, Slot, StoreId, Template};
use crate::store::Store;

/// Structural class of a payload value.
#[derive(Debug)]
enum Shape<'v> {
    Sequence(&'v [Value]),
    Entity(StoreId),
    Keyed(&'v Map<String, Value>),
    Leaf,
}

/// Container marker for a value.
pub(crate) fn marker_of(value: &Value) -> Marker {
    if value.is_array() {
        Marker::Sequence
    } else {
        Marker::Keyed
    }
}

impl Store {
    /// Normalizes `data`, inserting every entity it references.
    ///
    /// With an `owner`, `data` is that entity's own body: its root is
    /// flattened rather than recorded as a reference to itself, and every
    /// nested entity gets the owner as a parent.
    pub(crate) fn normalize(
        &mut self,
        data: &Value,
        owner: Option<&StoreId>,
    ) -> Result<Normalized, CacheError> {
        let mut template = Template::new(marker_of(data));
        let mut refs = Refs::new();
        let mut queue: VecDeque<(Path, &Value)> = VecDeque::from([(Path::new(), data)]);
        let mut body_root = owner.is_some();

        while let Some((path, value)) = queue.pop_front() {
            let shape = self.classify(value, std::mem::take(&mut body_root))?;
            match shape {
                Shape::Leaf => template.push(path, Slot::Scalar(value.clone())),
                Shape::Entity(id) => {
                    self.observe_entity(value)?;
                    self.insert(&id, value, owner)?;
                    refs.insert(path, id);
                }
                Shape::Keyed(members) => {
                    if members.is_empty() {
                        template.push(path, Slot::Empty(Marker::Keyed));
                        continue;
                    }
                    for (name, member) in members {
                        let segment = Segment::field(name.as_str(), marker_of(member));
                        queue.push_back((child_path(&path, segment), member));
                    }
                }
                Shape::Sequence(items) => {
                    if items.is_empty() {
                        template.push(path, Slot::Empty(Marker::Sequence));
                        continue;
                    }
                    for (position, item) in items.iter().enumerate() {
                        let segment = Segment::index(position, marker_of(item));
                        queue.push_back((child_path(&path, segment), item));
                    }
                }
            }
        }

        Ok(Normalized { template, refs })
    }

    fn classify<'v>(&self, value: &'v Value, body_root: bool) -> Result<Shape<'v>, CacheError> {
        match value {
            Value::Array(items) => Ok(Shape::Sequence(items)),
            Value::Object(members) if body_root => Ok(Shape::Keyed(members)),
            Value::Object(members) => {
                let identity = self
                    .config
                    .resolve_identity(value)
                    .map_err(|source| CacheError::Identity { source })?;
                Ok(match identity {
                    Some(id) => Shape::Entity(id),
                    None => Shape::Keyed(members),
                })
            }
            _ => Ok(Shape::Leaf),
        }
    }

    fn observe_entity(&self, payload: &Value) -> Result<(), CacheError> {
        match &self.config.parse_hook {
            Some(hook) => hook(payload).map_err(|source| CacheError::Hook {
                stage: HookStage::Parse,
                source,
            }),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::model::Key;

    fn field(name: &str) -> Segment {
        Segment::field(name, Marker::Keyed)
    }

    #[test]
    fn test_scalar_root() {
        let mut store = Store::default();
        let normalized = store.parse(&json!(42)).unwrap();
        assert!(normalized.refs.is_empty());
        assert_eq!(
            normalized.template.slots(),
            &[(Path::new(), Slot::Scalar(json!(42)))]
        );
    }

    #[test]
    fn test_entity_root_is_single_ref() {
        let mut store = Store::default();
        let normalized = store
            .parse(&json!({"type": "user", "id": "1", "name": "a"}))
            .unwrap();
        assert!(normalized.template.is_empty());
        assert_eq!(normalized.template.root(), Marker::Keyed);
        assert_eq!(
            normalized.refs.root_singleton().map(StoreId::as_str),
            Some("user:1")
        );
    }

    #[test]
    fn test_entity_body_is_flattened() {
        let mut store = Store::default();
        store
            .parse(&json!({
                "type": "user",
                "id": "1",
                "tags": ["a", []],
                "meta": {},
                "friend": {"type": "user", "id": "2"},
            }))
            .unwrap();

        let user = store.model("user:1").unwrap();
        let slots = user.template().slots();
        assert!(slots.contains(&(vec![field("id")], Slot::Scalar(json!("1")))));
        assert!(slots.contains(&(vec![field("meta")], Slot::Empty(Marker::Keyed))));
        assert!(slots.contains(&(
            vec![
                Segment::field("tags", Marker::Sequence),
                Segment::index(1, Marker::Sequence)
            ],
            Slot::Empty(Marker::Sequence)
        )));
        assert_eq!(
            user.refs().get(&[field("friend")]).map(StoreId::as_str),
            Some("user:2")
        );
        assert!(slots.iter().all(|(path, _)| path.first() != Some(&field("friend"))));
    }

    #[test]
    fn test_sequence_members_use_positions() {
        let mut store = Store::default();
        let normalized = store
            .parse(&json!([{"type": "user", "id": "1"}, {"plain": true}]))
            .unwrap();
        assert_eq!(normalized.template.root(), Marker::Sequence);

        let (path, id) = normalized.refs.iter().next().unwrap();
        assert_eq!(path[0].key, Key::Index(0));
        assert_eq!(id.as_str(), "user:1");

        let (path, _) = &normalized.template.slots()[0];
        assert_eq!(path[0].key, Key::Index(1));
        assert_eq!(path[1].key, Key::Field("plain".into()));
    }

    #[test]
    fn test_non_identity_object_is_keyed() {
        let mut store = Store::default();
        let normalized = store
            .parse(&json!({"type": "user", "id": ""}))
            .unwrap();
        assert!(normalized.refs.is_empty());
        assert!(store.is_empty());
        assert_eq!(normalized.template.len(), 2);
    }

    #[test]
    fn test_identity_failure_propagates() {
        let mut store = Store::new(
            crate::Config::new().identity(|_| Err("resolver offline".into())),
        );
        let err = store.parse(&json!({"a": 1})).unwrap_err();
        assert!(matches!(err, CacheError::Identity { .. }));
    }
}
