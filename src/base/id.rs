//! Identifiers of ODL objects.

use std::sync::Arc;

/// Identifier of an object in an ODL corpus.
///
/// Identifiers are opaque strings assigned by the exporting tool. They are the
/// only way entities refer to each other, both in the raw graph and in the
/// reconstructed model, so cloning one is a reference-count bump.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId(pub Arc<str>);

impl ObjectId {
    /// Create a new object ID.
    pub fn new(id: impl Into<Arc<str>>) -> Self {
        Self(id.into())
    }

    /// Get the ID as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ObjectId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::ops::Deref for ObjectId {
    type Target = str;

    fn deref(&self) -> &str {
        &self.0
    }
}

impl std::borrow::Borrow<str> for ObjectId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ObjectId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for ObjectId {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<&ObjectId> for ObjectId {
    fn from(id: &ObjectId) -> Self {
        id.clone()
    }
}
