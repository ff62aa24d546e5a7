//! Flattened entity bodies: templates and refs.
//!
//! Normalizing a value splits it into a [`Template`] (every non-entity leaf
//! keyed by its path) and [`Refs`] (every directly nested entity keyed by its
//! path). A path appears in exactly one of the two.

use rustc_hash::{FxHashMap, FxHashSet};
use serde_json::{Map, Value};

use crate::model::path::{Marker, Path, Segment};
use crate::model::StoreId;

/// A terminal value recorded in a template.
#[derive(Debug, Clone, PartialEq)]
pub enum Slot {
    /// Scalar payload value (null, bool, number, string).
    Scalar(Value),
    /// Empty container that must be recreated as-is.
    Empty(Marker),
}

impl Slot {
    /// Materializes the slot as a payload value.
    pub fn to_value(&self) -> Value {
        match self {
            Slot::Scalar(value) => value.clone(),
            Slot::Empty(Marker::Keyed) => Value::Object(Map::new()),
            Slot::Empty(Marker::Sequence) => Value::Array(Vec::new()),
        }
    }
}

/// Root container marker plus ordered (path, slot) pairs.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Template {
    root: Marker,
    slots: Vec<(Path, Slot)>,
}

impl Template {
    /// Creates an empty template whose root container has the given kind.
    pub fn new(root: Marker) -> Self {
        Self {
            root,
            slots: Vec::new(),
        }
    }

    /// Kind of the container the template materializes into.
    pub fn root(&self) -> Marker {
        self.root
    }

    /// Appends a slot.
    pub fn push(&mut self, path: Path, slot: Slot) {
        self.slots.push((path, slot));
    }

    /// Returns the recorded slots in discovery order.
    pub fn slots(&self) -> &[(Path, Slot)] {
        &self.slots
    }

    /// Returns true if no slot was recorded.
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Number of recorded slots.
    pub fn len(&self) -> usize {
        self.slots.len()
    }
}

/// Ordered mapping from path to the entity found at that path.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Refs {
    entries: Vec<(Path, StoreId)>,
    positions: FxHashMap<Path, usize>,
}

impl Refs {
    /// Creates an empty mapping.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the entity found at `path`, replacing any previous entry at
    /// the same path in place.
    pub fn insert(&mut self, path: Path, id: StoreId) {
        if let Some(&position) = self.positions.get(&path) {
            self.entries[position].1 = id;
            return;
        }
        self.positions.insert(path.clone(), self.entries.len());
        self.entries.push((path, id));
    }

    /// Iterates over (path, id) entries in discovery order.
    pub fn iter(&self) -> impl Iterator<Item = (&[Segment], &StoreId)> {
        self.entries.iter().map(|(path, id)| (path.as_slice(), id))
    }

    /// Returns the entity recorded at `path`, if any.
    pub fn get(&self, path: &[Segment]) -> Option<&StoreId> {
        self.positions
            .get(path)
            .map(|&position| &self.entries[position].1)
    }

    /// Distinct child ids.
    pub fn children(&self) -> FxHashSet<StoreId> {
        self.entries.iter().map(|(_, id)| id.clone()).collect()
    }

    /// Returns true if `id` is referenced at any path.
    pub fn contains_id(&self, id: &str) -> bool {
        self.entries.iter().any(|(_, child)| child.as_str() == id)
    }

    /// The id at the root path when it is the only entry.
    pub fn root_singleton(&self) -> Option<&StoreId> {
        match self.entries.as_slice() {
            [(path, id)] if path.is_empty() => Some(id),
            _ => None,
        }
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if no entity was referenced.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Result of normalizing a value: its template and its refs.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Normalized {
    pub template: Template,
    pub refs: Refs,
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_slot_to_value() {
        assert_eq!(Slot::Scalar(json!(3)).to_value(), json!(3));
        assert_eq!(Slot::Empty(Marker::Keyed).to_value(), json!({}));
        assert_eq!(Slot::Empty(Marker::Sequence).to_value(), json!([]));
    }

    #[test]
    fn test_root_singleton() {
        let mut refs = Refs::new();
        refs.insert(Vec::new(), StoreId::from("user:1"));
        assert_eq!(refs.root_singleton().map(StoreId::as_str), Some("user:1"));

        refs.insert(
            vec![Segment::field("friend", Marker::Keyed)],
            StoreId::from("user:2"),
        );
        assert_eq!(refs.root_singleton(), None);
    }

    #[test]
    fn test_children_deduplicates() {
        let mut refs = Refs::new();
        refs.insert(vec![Segment::field("a", Marker::Keyed)], StoreId::from("user:1"));
        refs.insert(vec![Segment::field("b", Marker::Keyed)], StoreId::from("user:1"));
        assert_eq!(refs.len(), 2);
        assert_eq!(refs.children().len(), 1);
        assert!(refs.contains_id("user:1"));
    }

    #[test]
    fn test_insert_replaces_in_place() {
        let friend = vec![Segment::field("friend", Marker::Keyed)];
        let mut refs = Refs::new();
        refs.insert(friend.clone(), StoreId::from("user:1"));
        refs.insert(vec![Segment::index(0, Marker::Keyed)], StoreId::from("user:3"));
        refs.insert(friend.clone(), StoreId::from("user:2"));

        assert_eq!(refs.len(), 2);
        assert_eq!(refs.get(&friend).map(StoreId::as_str), Some("user:2"));
        let order: Vec<&str> = refs.iter().map(|(_, id)| id.as_str()).collect();
        assert_eq!(order, vec!["user:2", "user:3"]);
    }

    #[test]
    fn test_many_entries_stay_addressable() {
        let mut refs = Refs::new();
        for i in 0..10_000 {
            refs.insert(
                vec![Segment::index(i, Marker::Keyed)],
                StoreId::new(format!("user:{i}")),
            );
        }
        assert_eq!(refs.len(), 10_000);
        let last = [Segment::index(9_999, Marker::Keyed)];
        assert_eq!(refs.get(&last).map(StoreId::as_str), Some("user:9999"));
    }
}
