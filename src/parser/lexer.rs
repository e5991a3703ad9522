//! Logos-based lexer for ODL
//!
//! Fast tokenization using the logos crate.

use std::borrow::Cow;

use logos::Logos;
use text_size::{TextRange, TextSize};

/// Byte-level artifact of the exporting tool: a string broken across lines
/// with a backslash continuation. It carries no meaning and is removed before
/// tokenizing.
pub const LINE_CONTINUATION_ARTIFACT: &str = "\"\\\r\n    \"";

/// A token with its kind, text, and position
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token<'a> {
    pub kind: TokenKind,
    pub text: &'a str,
    pub range: TextRange,
}

impl Token<'_> {
    /// Decoded contents of a string token.
    ///
    /// Strips the surrounding quotes, resolves `\\` and `\"` escapes and drops
    /// form-feed characters. Returns `None` for any other token kind.
    pub fn string_value(&self) -> Option<String> {
        if self.kind != TokenKind::String {
            return None;
        }
        let inner = &self.text[1..self.text.len() - 1];
        let mut out = String::with_capacity(inner.len());
        let mut chars = inner.chars();
        while let Some(c) = chars.next() {
            match c {
                '\\' => {
                    if let Some(escaped) = chars.next() {
                        out.push(escaped);
                    }
                }
                '\x0c' => {}
                other => out.push(other),
            }
        }
        Some(out)
    }
}

/// Lexer wrapping the logos-generated tokenizer
pub struct Lexer<'a> {
    inner: logos::Lexer<'a, TokenKind>,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            inner: TokenKind::lexer(input),
        }
    }
}

impl<'a> Iterator for Lexer<'a> {
    type Item = Token<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let logos_token = self.inner.next()?;
        let text = self.inner.slice();
        let span = self.inner.span();
        let range = TextRange::new(
            TextSize::new(span.start as u32),
            TextSize::new(span.end as u32),
        );

        let kind = logos_token.unwrap_or(TokenKind::Error);

        Some(Token { kind, text, range })
    }
}

/// Tokenize an entire string into a Vec
pub fn tokenize(input: &str) -> Vec<Token<'_>> {
    Lexer::new(input).collect()
}

/// Remove export artifacts that would otherwise split string literals.
pub fn strip_export_artifacts(input: &str) -> Cow<'_, str> {
    if input.contains(LINE_CONTINUATION_ARTIFACT) {
        Cow::Owned(input.replace(LINE_CONTINUATION_ARTIFACT, ""))
    } else {
        Cow::Borrowed(input)
    }
}

/// Token kinds of the ODL grammar.
///
/// Whitespace and `//` comments are skipped. Anything unmatched becomes
/// [`TokenKind::Error`] so the parser can report and skip it.
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[logos(skip r"([ \t\r\n]+|//[^\n]*)")]
pub enum TokenKind {
    // =========================================================================
    // RESERVED WORDS
    // =========================================================================
    #[token("Configuration")]
    ConfigurationKw,
    #[token("Attribute")]
    AttributeKw,
    #[token("Version")]
    VersionKw,
    #[token("Object")]
    ObjectKw,
    #[token("Relationship")]
    RelationshipKw,
    #[token("TRUE")]
    TrueKw,
    #[token("FALSE")]
    FalseKw,
    #[token("File")]
    FileKw,
    #[token("Operation")]
    OperationKw,
    #[token("Copy")]
    CopyKw,

    // =========================================================================
    // LITERALS
    // =========================================================================
    /// Identifier that is not a reserved word. The grammar never accepts one.
    #[regex(r"[a-zA-Z][a-zA-Z0-9_]*")]
    Ident,

    #[regex(r#""([^"\\]|\\["\\])*""#)]
    String,

    // =========================================================================
    // PUNCTUATION
    // =========================================================================
    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,
    #[token(",")]
    Comma,
    #[token(";")]
    Semicolon,

    Error,
}

impl TokenKind {
    /// Human-readable description used in syntax warnings.
    pub fn describe(self) -> &'static str {
        match self {
            Self::ConfigurationKw => "`Configuration`",
            Self::AttributeKw => "`Attribute`",
            Self::VersionKw => "`Version`",
            Self::ObjectKw => "`Object`",
            Self::RelationshipKw => "`Relationship`",
            Self::TrueKw => "`TRUE`",
            Self::FalseKw => "`FALSE`",
            Self::FileKw => "`File`",
            Self::OperationKw => "`Operation`",
            Self::CopyKw => "`Copy`",
            Self::Ident => "identifier",
            Self::String => "string",
            Self::LBrace => "`{`",
            Self::RBrace => "`}`",
            Self::Comma => "`,`",
            Self::Semicolon => "`;`",
            Self::Error => "illegal character",
        }
    }
}
