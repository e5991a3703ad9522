//! Syntax: the raw, unresolved object graph of an ODL file.

pub mod file;

pub use file::{AttributeValue, Declaration, Detail, OdlFile, RawObject};
