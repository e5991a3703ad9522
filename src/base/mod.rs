//! Foundation types for the ODL toolchain.
//!
//! This module provides fundamental types used throughout the crate:
//! - [`ObjectId`] - Shared identifiers of ODL objects
//! - [`TextRange`], [`TextSize`] - Source positions (byte offsets)
//! - [`Position`], [`LineIndex`] - Line/column conversion for diagnostics
//! - [`normalize_name`] - Display-name normalization used by every stage
//! - [`schema`] - Kind tags, relationship roles and attribute names of the corpus
//!
//! This module has NO dependencies on other odl modules.

mod id;
mod name;
mod position;
pub mod schema;

pub use id::ObjectId;
pub use name::normalize_name;
pub use position::{LineIndex, Position};

// Re-export text-size types for convenience
pub use text_size::{TextRange, TextSize};
