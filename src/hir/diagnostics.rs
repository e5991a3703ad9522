//! Diagnostics: recoverable reconstruction warnings.
//!
//! Fatal problems are [`ExtractError`](super::ExtractError)s. Everything the
//! reconstruction can work around is recorded here instead, with a stable
//! code, and logged through `tracing` as it is collected.

use std::sync::Arc;

use crate::base::{ObjectId, Position};
use crate::parser::SyntaxError;

// ============================================================================
// DIAGNOSTIC TYPES
// ============================================================================

/// Severity level of a diagnostic.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Severity {
    Warning,
    Info,
}

/// A diagnostic message with the object it concerns.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Diagnostic {
    /// Severity level.
    pub severity: Severity,
    /// Warning code (e.g., "W0003").
    pub code: &'static str,
    /// The diagnostic message.
    pub message: Arc<str>,
    /// Object the diagnostic is about, if any.
    pub object: Option<ObjectId>,
    /// Source position, for diagnostics raised while parsing.
    pub position: Option<Position>,
}

impl Diagnostic {
    /// Create a new warning diagnostic.
    pub fn warning(code: &'static str, message: impl Into<Arc<str>>) -> Self {
        Self {
            severity: Severity::Warning,
            code,
            message: message.into(),
            object: None,
            position: None,
        }
    }

    /// Attach the object this diagnostic concerns.
    pub fn with_object(mut self, object: impl Into<ObjectId>) -> Self {
        self.object = Some(object.into());
        self
    }

    /// Attach a source position.
    pub fn with_position(mut self, position: Position) -> Self {
        self.position = Some(position);
        self
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] ", self.code)?;
        if let Some(position) = self.position {
            write!(f, "{position}: ")?;
        }
        f.write_str(&self.message)
    }
}

// ============================================================================
// DIAGNOSTIC CODES
// ============================================================================

/// Standard diagnostic codes.
pub mod codes {
    /// Malformed input skipped by the parser, including duplicate identifiers.
    pub const SYNTAX: &str = "W0001";
    /// Attribute or parameter without a type.
    pub const MISSING_TYPE: &str = "W0002";
    /// Text token with no link to a model object.
    pub const UNLINKED_TOKEN: &str = "W0003";
    /// Signal event used by a transition but absent from the event catalog.
    pub const UNLINKED_SIGNAL_EVENT: &str = "W0004";
    /// Typedef construction that is not converted (alias, sequence, array).
    pub const UNHANDLED_TYPEDEF: &str = "W0005";
    /// Superclass outside the selected package scope.
    pub const SUPERCLASS_OUT_OF_SCOPE: &str = "W0006";
}

// ============================================================================
// DIAGNOSTIC COLLECTOR
// ============================================================================

/// Collects diagnostics during reconstruction.
///
/// Stages running in parallel each fill their own collector; the results are
/// merged with [`DiagnosticCollector::extend`] in input order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DiagnosticCollector {
    diagnostics: Vec<Diagnostic>,
}

impl DiagnosticCollector {
    /// Create a new empty collector.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a diagnostic and log it.
    pub fn add(&mut self, diagnostic: Diagnostic) {
        match diagnostic.severity {
            Severity::Warning => tracing::warn!(
                code = diagnostic.code,
                object = diagnostic.object.as_ref().map(ObjectId::as_str),
                "{}",
                diagnostic.message
            ),
            Severity::Info => tracing::info!(code = diagnostic.code, "{}", diagnostic.message),
        }
        self.diagnostics.push(diagnostic);
    }

    /// Record parser errors. They were logged when the parser raised them.
    pub fn syntax_errors(&mut self, errors: &[SyntaxError]) {
        self.diagnostics.extend(errors.iter().map(|error| {
            Diagnostic::warning(codes::SYNTAX, error.message.as_str()).with_position(error.position)
        }));
    }

    /// Add a missing attribute type warning.
    pub fn missing_attribute_type(&mut self, attribute: &ObjectId, name: &str, class: &str) {
        self.add(
            Diagnostic::warning(
                codes::MISSING_TYPE,
                format!("attribute \"{name}\" of \"{class}\" does not have type"),
            )
            .with_object(attribute),
        );
    }

    /// Add a missing parameter type warning.
    pub fn missing_parameter_type(&mut self, parameter: &ObjectId, name: &str, event: &str) {
        self.add(
            Diagnostic::warning(
                codes::MISSING_TYPE,
                format!("parameter \"{name}\" of \"{event}\" does not have type"),
            )
            .with_object(parameter),
        );
    }

    /// Add an unlinked token warning.
    pub fn unlinked_token(&mut self, owner: &ObjectId, context: &str, literal: &str, offset: usize) {
        self.add(
            Diagnostic::warning(
                codes::UNLINKED_TOKEN,
                format!("in \"{context}\", token \"{literal}\" not linked at position {offset}"),
            )
            .with_object(owner),
        );
    }

    /// Add an unlinked signal event warning.
    pub fn unlinked_signal_event(&mut self, event: &ObjectId, name: &str) {
        self.add(
            Diagnostic::warning(
                codes::UNLINKED_SIGNAL_EVENT,
                format!("signal event \"{name}\" is used but not part of the selected events"),
            )
            .with_object(event),
        );
    }

    /// Add an unhandled typedef warning.
    pub fn unhandled_typedef(&mut self, typedef: &ObjectId, construction: &str, name: &str) {
        self.add(
            Diagnostic::warning(
                codes::UNHANDLED_TYPEDEF,
                format!("{construction} type \"{name}\" unhandled"),
            )
            .with_object(typedef),
        );
    }

    /// Add a superclass out of scope warning.
    pub fn superclass_out_of_scope(&mut self, class: &ObjectId, superclass: &ObjectId) {
        self.add(
            Diagnostic::warning(
                codes::SUPERCLASS_OUT_OF_SCOPE,
                format!("superclass `{superclass}` of `{class}` is outside the selected scope"),
            )
            .with_object(class),
        );
    }

    /// Append all diagnostics of another collector, preserving their order.
    ///
    /// The other collector's diagnostics were already logged when added.
    pub fn extend(&mut self, other: DiagnosticCollector) {
        self.diagnostics.extend(other.diagnostics);
    }

    /// Get all diagnostics.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Diagnostics with the given code.
    pub fn with_code<'a>(&'a self, code: &'a str) -> impl Iterator<Item = &'a Diagnostic> + 'a {
        self.diagnostics.iter().filter(move |d| d.code == code)
    }

    /// Get the number of warnings.
    pub fn warning_count(&self) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == Severity::Warning)
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    /// Take all diagnostics, leaving the collector empty.
    pub fn take(&mut self) -> Vec<Diagnostic> {
        std::mem::take(&mut self.diagnostics)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diagnostic_display() {
        let diag = Diagnostic::warning(codes::SYNTAX, "unexpected `;`")
            .with_position(Position::new(2, 4));
        assert_eq!(diag.to_string(), "[W0001] 3:5: unexpected `;`");
    }

    #[test]
    fn test_collector_counts_and_codes() {
        let mut collector = DiagnosticCollector::new();
        collector.missing_attribute_type(&ObjectId::from("a1"), "speed", "Motor");
        collector.unhandled_typedef(&ObjectId::from("t1"), "alias", "Speed");

        assert_eq!(collector.warning_count(), 2);
        let missing: Vec<_> = collector.with_code(codes::MISSING_TYPE).collect();
        assert_eq!(missing.len(), 1);
        assert_eq!(&*missing[0].message, "attribute \"speed\" of \"Motor\" does not have type");
        assert_eq!(missing[0].object.as_ref().unwrap().as_str(), "a1");
    }

    #[test]
    fn test_extend_preserves_order() {
        let mut first = DiagnosticCollector::new();
        first.unlinked_signal_event(&ObjectId::from("e1"), "Go");
        let mut second = DiagnosticCollector::new();
        second.unlinked_signal_event(&ObjectId::from("e2"), "Stop");

        first.extend(second);
        let objects: Vec<_> = first
            .take()
            .into_iter()
            .map(|d| d.object.unwrap().to_string())
            .collect();
        assert_eq!(objects, vec!["e1", "e2"]);
        assert!(first.is_empty());
    }
}
