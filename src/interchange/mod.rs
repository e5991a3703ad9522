//! Corpus loading and XMI export.
//!
//! ```text
//! ┌──────────────────┐     ┌──────────────┐     ┌──────────────┐
//! │ export dir / ZIP │ ──▶ │    Corpus    │ ──▶ │  hir::Model  │
//! └──────────────────┘     └──────────────┘     └──────┬───────┘
//!                                                      │
//!                                                      ▼
//!                                               ┌──────────────┐
//!                                               │  XmiWriter   │
//!                                               └──────────────┘
//! ```
//!
//! ## Usage
//!
//! ```ignore
//! use odl::hir::ExtractOptions;
//! use odl::interchange::{Corpus, XmiWriter};
//!
//! let corpus = Corpus::open("export.zip")?;
//! let model = corpus.reconstruct(&ExtractOptions::new().with_package("Lifts"))?;
//! let xmi = XmiWriter::new().write(&model)?;
//! ```

mod corpus;
mod error;
mod xmi;

use std::path::Path;

pub use corpus::{CONTENTS_FILE, Corpus};
pub use error::InterchangeError;
pub use xmi::{DERIVED_ATTRIBUTE_TYPE, INTEGER_TYPE, UML_NAMESPACE, XMI_NAMESPACE, XSI_NAMESPACE, XmiWriter};

use crate::hir::ExtractOptions;

/// Reconstruct the corpus at `path` and render it as an XMI document.
pub fn export(path: &Path, options: &ExtractOptions) -> Result<Vec<u8>, InterchangeError> {
    let corpus = Corpus::open(path)?;
    let model = corpus.reconstruct(options)?;
    XmiWriter::new().write(&model)
}
