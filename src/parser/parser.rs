//! Recursive descent parser for ODL
//!
//! Builds an [`OdlFile`] from tokens. The parser never fails: unexpected
//! input is reported as a [`SyntaxError`] and skipped.

use std::fmt;

use text_size::TextRange;

use super::lexer::{Lexer, Token, TokenKind, strip_export_artifacts};
use crate::base::{LineIndex, ObjectId, Position};
use crate::syntax::{AttributeValue, Declaration, Detail, OdlFile, RawObject};

/// Parse result containing the object graph and any errors
#[derive(Debug, Clone)]
pub struct Parse {
    pub file: OdlFile,
    pub errors: Vec<SyntaxError>,
}

impl Parse {
    /// Check if parsing succeeded without errors
    pub fn ok(&self) -> bool {
        self.errors.is_empty()
    }
}

/// A syntax error with location and message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxError {
    pub message: String,
    pub range: TextRange,
    pub position: Position,
}

impl fmt::Display for SyntaxError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.position, self.message)
    }
}

/// Parse ODL text into an object graph
pub fn parse(input: &str) -> Parse {
    let text = strip_export_artifacts(input);
    let tokens: Vec<_> = Lexer::new(&text).collect();
    let line_index = LineIndex::new(&text);
    let mut parser = Parser::new(&tokens, &line_index);
    parser.parse_source_file();
    let parse = parser.finish();
    tracing::debug!(
        objects = parse.file.len(),
        errors = parse.errors.len(),
        "parsed ODL source"
    );
    parse
}

/// The parser state
struct Parser<'a> {
    tokens: &'a [Token<'a>],
    pos: usize,
    line_index: &'a LineIndex,
    file: OdlFile,
    errors: Vec<SyntaxError>,
}

impl<'a> Parser<'a> {
    fn new(tokens: &'a [Token<'a>], line_index: &'a LineIndex) -> Self {
        Self {
            tokens,
            pos: 0,
            line_index,
            file: OdlFile::new(),
            errors: Vec::new(),
        }
    }

    fn finish(self) -> Parse {
        Parse {
            file: self.file,
            errors: self.errors,
        }
    }

    // =========================================================================
    // Token inspection
    // =========================================================================

    fn current(&self) -> Option<&Token<'a>> {
        self.tokens.get(self.pos)
    }

    fn current_kind(&self) -> Option<TokenKind> {
        self.current().map(|t| t.kind)
    }

    fn at(&self, kind: TokenKind) -> bool {
        self.current_kind() == Some(kind)
    }

    fn at_eof(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    // =========================================================================
    // Token consumption
    // =========================================================================

    fn bump(&mut self) {
        if !self.at_eof() {
            self.pos += 1;
        }
    }

    fn eat(&mut self, kind: TokenKind) -> bool {
        if self.at(kind) {
            self.bump();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, kind: TokenKind) -> bool {
        if self.eat(kind) {
            true
        } else {
            self.error(format!("expected {}", kind.describe()));
            false
        }
    }

    /// Consume a string token and return its decoded value.
    fn expect_string(&mut self) -> Option<String> {
        let value = self.current().and_then(Token::string_value);
        match value {
            Some(value) => {
                self.bump();
                Some(value)
            }
            None => {
                self.error("expected string");
                None
            }
        }
    }

    // =========================================================================
    // Error handling
    // =========================================================================

    fn error(&mut self, message: impl Into<String>) {
        let message = message.into();
        let range = match self.current() {
            Some(token) => token.range,
            None => {
                let end = self.tokens.last().map(|t| t.range.end()).unwrap_or_default();
                TextRange::empty(end)
            }
        };
        self.push_error(message, range);
    }

    fn push_error(&mut self, message: String, range: TextRange) {
        let position = self.line_index.position(range.start());
        tracing::warn!(%position, "{message}");
        self.errors.push(SyntaxError {
            message,
            range,
            position,
        });
    }

    /// Report the current token as unexpected and skip it.
    fn error_skip(&mut self, context: &str) {
        if let Some(token) = self.current() {
            let message = match token.kind {
                TokenKind::Error => format!("illegal character `{}`", token.text),
                kind => format!("unexpected {} {context}", kind.describe()),
            };
            self.error(message);
            self.bump();
        }
    }

    // =========================================================================
    // Grammar rules
    // =========================================================================

    /// SourceFile = (TopEntry ';')*
    fn parse_source_file(&mut self) {
        while !self.at_eof() {
            match self.current_kind() {
                Some(TokenKind::ObjectKw | TokenKind::ConfigurationKw) => {
                    let start = self.current().map(|t| t.range).unwrap_or_default();
                    if let Some(object) = self.parse_top_entry() {
                        self.expect(TokenKind::Semicolon);
                        self.insert(object, start);
                    }
                }
                _ => self.error_skip("at top level"),
            }
        }
    }

    fn insert(&mut self, object: RawObject, at: TextRange) {
        let id = object.id.clone();
        if self.file.insert(object).is_some() {
            self.push_error(
                format!("duplicate object `{id}`, later definition replaces earlier"),
                at,
            );
        }
    }

    /// TopEntry = ('Object' | 'Configuration') STRING STRING Details
    fn parse_top_entry(&mut self) -> Option<RawObject> {
        let declaration = if self.eat(TokenKind::ConfigurationKw) {
            Declaration::Configuration
        } else {
            self.bump();
            Declaration::Object
        };
        let tag = self.expect_string()?;
        let id = self.expect_string()?;
        let details = self.parse_details()?;

        let mut object = RawObject::new(tag, ObjectId::from(id)).with_declaration(declaration);
        object.details = details;
        Some(object)
    }

    /// Details = '{' (Detail ';')* '}'
    fn parse_details(&mut self) -> Option<Vec<Detail>> {
        if !self.expect(TokenKind::LBrace) {
            return None;
        }
        let mut details = Vec::new();
        loop {
            match self.current_kind() {
                None => {
                    self.error("unterminated detail list");
                    break;
                }
                Some(TokenKind::RBrace) => {
                    self.bump();
                    break;
                }
                Some(
                    TokenKind::AttributeKw
                    | TokenKind::RelationshipKw
                    | TokenKind::VersionKw
                    | TokenKind::ConfigurationKw
                    | TokenKind::FileKw,
                ) => {
                    if let Some(detail) = self.parse_detail() {
                        details.push(detail);
                        self.expect(TokenKind::Semicolon);
                    }
                }
                Some(_) => self.error_skip("in detail list"),
            }
        }
        Some(details)
    }

    /// Detail = Attribute | Relationship | Version | Configuration | File
    fn parse_detail(&mut self) -> Option<Detail> {
        match self.current_kind()? {
            TokenKind::AttributeKw => {
                self.bump();
                let name = self.expect_string()?;
                let value = self.parse_attribute_value()?;
                Some(Detail::Attribute {
                    name: name.into(),
                    value,
                })
            }
            TokenKind::RelationshipKw => {
                self.bump();
                let role = self.expect_string()?;
                let target_kind = self.expect_string()?;
                let target = self.expect_string()?;
                Some(Detail::Relationship {
                    role: role.into(),
                    target_kind: target_kind.into(),
                    target: target.into(),
                })
            }
            TokenKind::VersionKw => {
                self.bump();
                let label = self.expect_string()?;
                let details = self.parse_details()?;
                Some(Detail::Version { label, details })
            }
            TokenKind::ConfigurationKw => {
                self.bump();
                let kind = self.expect_string()?;
                let name = self.expect_string()?;
                let id = self.expect_string()?;
                Some(Detail::Configuration {
                    kind: kind.into(),
                    name,
                    id: id.into(),
                })
            }
            TokenKind::FileKw => {
                self.bump();
                if self.expect(TokenKind::OperationKw) && self.expect(TokenKind::CopyKw) {
                    Some(Detail::File)
                } else {
                    None
                }
            }
            _ => None,
        }
    }

    /// AttributeValue = TRUE | FALSE | STRING Details | STRING (',' STRING)*
    fn parse_attribute_value(&mut self) -> Option<AttributeValue> {
        if self.eat(TokenKind::TrueKw) {
            return Some(AttributeValue::Bool(true));
        }
        if self.eat(TokenKind::FalseKw) {
            return Some(AttributeValue::Bool(false));
        }
        let first = self.expect_string()?;
        if self.at(TokenKind::LBrace) {
            let details = self.parse_details()?;
            return Some(AttributeValue::Nested {
                value: first,
                details,
            });
        }
        let mut values = vec![first];
        while self.eat(TokenKind::Comma) {
            values.push(self.expect_string()?);
        }
        Some(AttributeValue::Strings(values))
    }
}
