//! Lookup failures of the object index.

use thiserror::Error;

use crate::base::ObjectId;

/// A query against the index that cannot be answered.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LookupError {
    /// An object was queried for its Version record but has none.
    #[error("object `{id}` has no Version record")]
    MissingVersion { id: ObjectId },

    /// An object carries more than one Version record.
    #[error("object `{id}` has {count} Version records, expected exactly one")]
    MultipleVersions { id: ObjectId, count: usize },

    /// A referenced identifier does not exist in the corpus.
    #[error("object `{id}` does not exist")]
    MissingObject { id: ObjectId },
}
