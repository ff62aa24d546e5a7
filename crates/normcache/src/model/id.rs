//! Entity identifiers.
//!
//! Every entity is keyed by a [`StoreId`]. The default resolver derives it
//! from the payload's `type` and `id` fields as `"<type>:<id>"`, so the key is
//! unique across entity types.

use std::borrow::Borrow;
use std::fmt;

use serde_json::Value;

/// Field holding the entity type in the default identity scheme.
pub const TYPE_FIELD: &str = "type";

/// Field holding the per-type identifier in the default identity scheme.
pub const ID_FIELD: &str = "id";

/// Unique key of an entity in the store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StoreId(String);

impl StoreId {
    /// Creates a store id from any string-like key.
    pub fn new(key: impl Into<String>) -> Self {
        StoreId(key.into())
    }

    /// Returns the key as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StoreId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for StoreId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for StoreId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for StoreId {
    fn from(key: &str) -> Self {
        StoreId(key.to_owned())
    }
}

impl From<String> for StoreId {
    fn from(key: String) -> Self {
        StoreId(key)
    }
}

impl PartialEq<str> for StoreId {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for StoreId {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

/// Default identity resolution.
///
/// Returns `Some("<type>:<id>")` when `value` is an object whose `type` and
/// `id` fields are both present and truthy, `None` otherwise.
pub fn default_identity(value: &Value) -> Option<StoreId> {
    let object = value.as_object()?;
    let kind = object.get(TYPE_FIELD).filter(|v| is_truthy(v))?;
    let id = object.get(ID_FIELD).filter(|v| is_truthy(v))?;
    Some(StoreId(format!("{}:{}", key_part(kind), key_part(id))))
}

/// Truthiness of a payload value: `null`, `false`, `0` and `""` are falsy.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn key_part(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_default_identity() {
        let id = default_identity(&json!({"type": "user", "id": "1", "name": "a"}));
        assert_eq!(id, Some(StoreId::from("user:1")));
    }

    #[test]
    fn test_default_identity_numeric_id() {
        let id = default_identity(&json!({"type": "comment", "id": 42}));
        assert_eq!(id.as_ref().map(StoreId::as_str), Some("comment:42"));
    }

    #[test]
    fn test_default_identity_requires_both_fields() {
        assert_eq!(default_identity(&json!({"type": "user"})), None);
        assert_eq!(default_identity(&json!({"id": "1"})), None);
        assert_eq!(default_identity(&json!({"type": "user", "id": ""})), None);
        assert_eq!(default_identity(&json!({"type": "user", "id": 0})), None);
        assert_eq!(default_identity(&json!({"type": null, "id": "1"})), None);
    }

    #[test]
    fn test_default_identity_non_object() {
        assert_eq!(default_identity(&json!("user:1")), None);
        assert_eq!(default_identity(&json!([{"type": "user", "id": "1"}])), None);
    }

    #[test]
    fn test_store_id_borrow() {
        let id = StoreId::from("user:1");
        assert_eq!(id, "user:1");
        assert_eq!(id.to_string(), "user:1");
    }
}
