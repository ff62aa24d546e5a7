//! Paths addressing values inside a payload.
//!
//! A path is an ordered list of [`Segment`]s. Each segment carries the key
//! used to reach a value from its container plus a [`Marker`] describing the
//! kind of container that value is, so reconstruction can materialize the
//! right container kind at every step.

use std::fmt;

/// Container kind recorded for a path step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Marker {
    /// Key/value container (JSON object), or any non-sequence value.
    #[default]
    Keyed,
    /// Ordered sequence (JSON array).
    Sequence,
}

/// Key of a member within its container.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Key {
    /// Named member of a keyed container.
    Field(String),
    /// Positional member of a sequence.
    Index(usize),
}

/// One step of a [`Path`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Segment {
    /// Field name or position within the parent container.
    pub key: Key,
    /// Kind of the value found at this step.
    pub marker: Marker,
}

impl Segment {
    /// Segment addressing a keyed-container member.
    pub fn field(name: impl Into<String>, marker: Marker) -> Self {
        Self {
            key: Key::Field(name.into()),
            marker,
        }
    }

    /// Segment addressing a sequence position.
    pub fn index(position: usize, marker: Marker) -> Self {
        Self {
            key: Key::Index(position),
            marker,
        }
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.marker == Marker::Sequence {
            f.write_str("[]")?;
        }
        match &self.key {
            Key::Field(name) => f.write_str(name),
            Key::Index(i) => write!(f, "{i}"),
        }
    }
}

/// Ordered sequence of segments; the empty path is the root.
pub type Path = Vec<Segment>;

/// Extends `path` by one segment, returning a new path.
pub fn child_path(path: &[Segment], segment: Segment) -> Path {
    let mut child = Vec::with_capacity(path.len() + 1);
    child.extend_from_slice(path);
    child.push(segment);
    child
}

/// Formats a path as dot-separated segments, `$` for the root.
pub fn format_path(path: &[Segment]) -> String {
    if path.is_empty() {
        return "$".to_string();
    }
    path.iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(".")
}
