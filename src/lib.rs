//! # odl-base
//!
//! Reconstruction of class diagrams and state machines from the ODL
//! repository exports of a legacy modeling tool.
//!
//! ## Module Structure (dependency order)
//!
//! ```text
//! interchange → Corpus loading (directory / ZIP), XMI export
//!   ↓
//! rtf         → Rich-text decoding of descriptions and action bodies
//!   ↓
//! hir         → Classes, associations, events, states, transitions
//!   ↓
//! index       → Kind buckets and Version lookup over the parsed file
//!   ↓
//! parser      → Logos lexer, tolerant recursive-descent parser
//!   ↓
//! syntax      → OdlFile, RawObject, Detail records
//!   ↓
//! base        → Primitives (ObjectId, names, positions, corpus vocabulary)
//! ```

// ============================================================================
// MODULES (dependency order: base → syntax → parser → index → hir → rtf → interchange)
// ============================================================================

/// Foundation types: ObjectId, name normalization, TextRange
pub mod base;

/// Syntax: raw ODL records
pub mod syntax;

/// Parser: Logos lexer and object parser
pub mod parser;

/// Read-only object index
pub mod index;

/// High-level IR: the reconstructed model
pub mod hir;

/// RTF to plain-text decoding
pub mod rtf;

/// Corpus loading and XMI export
#[cfg(feature = "interchange")]
pub mod interchange;

// Re-export foundation types
pub use base::{LineIndex, ObjectId, Position, TextRange, TextSize, normalize_name};

pub use hir::{ExtractError, ExtractOptions, Model, reconstruct, reconstruct_source};
pub use parser::parse;
