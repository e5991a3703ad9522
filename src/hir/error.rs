//! Fatal reconstruction errors.

use thiserror::Error;

use crate::base::ObjectId;
use crate::index::LookupError;

use super::text::DecodeError;

/// Errors that abort model reconstruction.
///
/// Every variant names the object (or package path) it concerns so the
/// message is actionable without a debugger.
#[derive(Debug, Error)]
pub enum ExtractError {
    /// An object or its Version record cannot be found.
    #[error(transparent)]
    Lookup(#[from] LookupError),

    /// A mandatory reference could not be resolved.
    #[error("`{from}` references `{target}`, which cannot be resolved")]
    UnresolvedReference { from: ObjectId, target: ObjectId },

    /// A Role is not bound to any Association.
    #[error("role `{role}` is not bound to an association")]
    RoleWithoutAssociation { role: ObjectId },

    /// A multiplicity literal outside the known table.
    #[error("unknown multiplicity `{literal}` in association `{association}`")]
    UnknownMultiplicity {
        association: ObjectId,
        literal: String,
    },

    /// A token marker does not match the decoded text at its position.
    #[error("cannot replace token `{literal}` at position {offset} in text of `{owner}`:\n\n{text}")]
    TokenMismatch {
        owner: ObjectId,
        literal: String,
        offset: usize,
        text: String,
    },

    /// An event-action block with an event type code outside the known set.
    #[error("event action block `{block}` has unknown event type {code}")]
    UnknownEventType { block: ObjectId, code: i64 },

    /// A mandatory attribute is absent.
    #[error("object `{id}` lacks required attribute `{name}`")]
    MissingAttribute { id: ObjectId, name: &'static str },

    /// An attribute is present but its value cannot be interpreted.
    #[error("attribute `{name}` of `{id}` has invalid value `{value}`")]
    InvalidAttribute {
        id: ObjectId,
        name: &'static str,
        value: String,
    },

    /// A mandatory relationship is absent.
    #[error("object `{id}` lacks required relationship `{role}`")]
    MissingRelationship { id: ObjectId, role: &'static str },

    /// No top-level package matches the first segment of a package path.
    #[error("package `{name}` not found")]
    PackageNotFound { name: String },

    /// A package has no child package with the requested name.
    #[error("subpackage `{name}` of `{parent}` not found")]
    SubpackageNotFound { parent: ObjectId, name: String },

    /// A package containment item that should be a Package is not one.
    #[error("package item `{child}` of `{parent}` is not a package")]
    NotAPackage { parent: ObjectId, child: ObjectId },

    /// A package was reached twice while walking the hierarchy.
    #[error("cycle detected in package hierarchy at `{id}`")]
    CycleDetected { id: ObjectId },

    /// A state is its own ancestor.
    #[error("cycle detected in state nesting at `{id}`")]
    StateCycle { id: ObjectId },

    /// The corpus has no Model object.
    #[error("no model object found")]
    MissingModel,

    /// External rich-text content could not be read.
    #[error("cannot read content `{name}`: {source}")]
    Content {
        name: String,
        #[source]
        source: std::io::Error,
    },

    /// Rich text could not be decoded.
    #[error("cannot decode rich text of `{owner}`: {source}")]
    RichText {
        owner: ObjectId,
        #[source]
        source: DecodeError,
    },
}

/// Result alias for reconstruction stages.
pub type Result<T, E = ExtractError> = std::result::Result<T, E>;
