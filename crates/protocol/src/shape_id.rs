use std::sync::Arc;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Identifier of an interactive shape on the map (its SVG `id`).
///
/// Hover tracking clones the current shape on every sampled position, so
/// the string is shared rather than copied.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ShapeId(Arc<str>);

impl ShapeId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::ops::Deref for ShapeId {
    type Target = str;

    fn deref(&self) -> &str {
        &self.0
    }
}

// `Arc<str>` hashes like `str`, so maps keyed by `ShapeId` can be queried
// with a plain `&str`.
impl std::borrow::Borrow<str> for ShapeId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ShapeId {
    fn from(s: &str) -> Self {
        ShapeId(Arc::from(s))
    }
}

impl From<String> for ShapeId {
    fn from(s: String) -> Self {
        ShapeId(Arc::from(s))
    }
}

impl std::fmt::Display for ShapeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl Serialize for ShapeId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for ShapeId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        String::deserialize(deserializer).map(ShapeId::from)
    }
}
