//! Rebuilding containers from path-addressed values.
//!
//! Writes follow the marker convention of [`Segment`]: every intermediate
//! container created along a path has the kind recorded by the segment that
//! addresses it. Sequences grow on demand and are padded with `null`.

use serde_json::{Map, Value};

use crate::model::{Key, Marker, Segment, Template};

/// Builds an empty container of the given kind.
pub fn build_base(root: Marker) -> Value {
    match root {
        Marker::Keyed => Value::Object(Map::new()),
        Marker::Sequence => Value::Array(Vec::new()),
    }
}

/// Writes `value` at `path` inside `target`.
///
/// Intermediate containers are created (or replaced, when a different kind is
/// in the way) per each segment's marker. Any existing value at the exact path
/// is overwritten. The empty path replaces `target` itself.
pub fn assign(target: &mut Value, path: &[Segment], value: Value) {
    let Some((last, intermediate)) = path.split_last() else {
        *target = value;
        return;
    };

    let mut cursor = target;
    for segment in intermediate {
        let next = member_mut(cursor, &segment.key);
        if !has_kind(next, segment.marker) {
            *next = build_base(segment.marker);
        }
        cursor = next;
    }
    *member_mut(cursor, &last.key) = value;
}

/// Materializes a template: the root container plus every slot.
pub fn materialize(template: &Template) -> Value {
    let mut base = build_base(template.root());
    for (path, slot) in template.slots() {
        assign(&mut base, path, slot.to_value());
    }
    base
}

/// Returns the member addressed by `key`, coercing `container` to the kind the
/// key implies and creating the member as `null` when absent.
fn member_mut<'a>(container: &'a mut Value, key: &Key) -> &'a mut Value {
    match key {
        Key::Field(name) => object_mut(container)
            .entry(name.clone())
            .or_insert(Value::Null),
        Key::Index(position) => {
            let items = array_mut(container);
            if items.len() <= *position {
                items.resize(*position + 1, Value::Null);
            }
            &mut items[*position]
        }
    }
}

fn object_mut(value: &mut Value) -> &mut Map<String, Value> {
    match value {
        Value::Object(map) => map,
        other => {
            *other = Value::Object(Map::new());
            object_mut(other)
        }
    }
}

fn array_mut(value: &mut Value) -> &mut Vec<Value> {
    match value {
        Value::Array(items) => items,
        other => {
            *other = Value::Array(Vec::new());
            array_mut(other)
        }
    }
}

fn has_kind(value: &Value, marker: Marker) -> bool {
    match marker {
        Marker::Keyed => value.is_object(),
        Marker::Sequence => value.is_array(),
    }
}
