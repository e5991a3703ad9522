//! Logos-based parser for the ODL object format
//!
//! ## Architecture
//!
//! ```text
//! Source Text
//!     ↓
//! Artifact stripping → text without exporter line continuations
//!     ↓
//! Lexer (logos) → Tokens with TokenKind
//!     ↓
//! Parser → OdlFile (identifier → RawObject)
//! ```
//!
//! Parsing is error tolerant. Every problem becomes a [`SyntaxError`] with a
//! line/column position and the offending input is skipped.

#[allow(clippy::module_inception)]
mod parser;

mod lexer;

pub use lexer::{LINE_CONTINUATION_ARTIFACT, Lexer, Token, TokenKind, strip_export_artifacts, tokenize};
pub use parser::{Parse, SyntaxError, parse};
