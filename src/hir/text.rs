//! Rich-text resolution and token substitution.
//!
//! Guards, actions, attribute defaults and time/change expressions are stored
//! as rich text, either inline or in an external file next to the corpus.
//! The text embeds position-addressed tokens that refer to model objects.
//! [`TextResolver`] decodes the text and replaces every token by the name of
//! the object it refers to.

use std::collections::BTreeMap;

use rustc_hash::FxHashMap;
use smol_str::SmolStr;
use thiserror::Error;

use super::diagnostics::DiagnosticCollector;
use super::error::{ExtractError, Result};
use crate::base::schema::{ObjectKind, attr, role};
use crate::base::{ObjectId, normalize_name};
use crate::index::{ObjectIndex, VersionView};
use crate::syntax::{AttributeValue, Detail};

// ============================================================================
// COLLABORATOR SEAMS
// ============================================================================

/// Failure reported by a [`RichTextDecoder`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct DecodeError {
    pub message: String,
}

impl DecodeError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Converts rich-text bytes into plain text.
pub trait RichTextDecoder: Send + Sync {
    fn decode(&self, data: &[u8]) -> std::result::Result<String, DecodeError>;
}

/// Decoder for payloads that are already plain text.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainText;

impl RichTextDecoder for PlainText {
    fn decode(&self, data: &[u8]) -> std::result::Result<String, DecodeError> {
        Ok(String::from_utf8_lossy(data).into_owned())
    }
}

/// Provides the bytes of external rich-text files referenced by name.
pub trait ContentSource: Send + Sync {
    fn read(&self, name: &str) -> std::io::Result<Vec<u8>>;
}

/// In-memory content, keyed by file name.
#[derive(Debug, Clone, Default)]
pub struct MemoryContent {
    files: FxHashMap<String, Vec<u8>>,
}

impl MemoryContent {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_file(mut self, name: impl Into<String>, data: impl Into<Vec<u8>>) -> Self {
        self.files.insert(name.into(), data.into());
        self
    }
}

impl ContentSource for MemoryContent {
    fn read(&self, name: &str) -> std::io::Result<Vec<u8>> {
        self.files.get(name).cloned().ok_or_else(|| {
            std::io::Error::new(std::io::ErrorKind::NotFound, format!("no content named `{name}`"))
        })
    }
}

// ============================================================================
// TOKENS
// ============================================================================

/// A position-addressed reference inside decoded text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextToken {
    /// Zero-based character offset into the decoded text.
    pub offset: usize,
    /// Text expected at `offset`.
    pub literal: String,
    /// Normalized name of the linked object, if the token is linked.
    pub target: Option<SmolStr>,
}

/// Replace tokens in `text`, rightmost first.
///
/// Tokens starting at or beyond the end of the text are ignored. Every other
/// token must match the text at its offset. Unlinked tokens are replaced by
/// their normalized literal and reported.
pub fn substitute_tokens(
    text: &str,
    tokens: &BTreeMap<usize, TextToken>,
    owner: &ObjectId,
    context: &str,
    diagnostics: &mut DiagnosticCollector,
) -> Result<String> {
    let mut chars: Vec<char> = text.chars().collect();
    let len = chars.len();

    for token in tokens.range(..len).rev().map(|(_, token)| token) {
        let literal: Vec<char> = token.literal.chars().collect();
        let end = token.offset + literal.len();
        if end > chars.len() || chars[token.offset..end] != literal[..] {
            return Err(ExtractError::TokenMismatch {
                owner: owner.clone(),
                literal: token.literal.clone(),
                offset: token.offset,
                text: text.to_string(),
            });
        }

        let replacement = match &token.target {
            Some(name) => name.clone(),
            None => {
                diagnostics.unlinked_token(owner, context, &token.literal, token.offset);
                normalize_name(&token.literal)
            }
        };
        chars.splice(token.offset..end, replacement.chars());
    }

    Ok(chars.into_iter().collect())
}

// ============================================================================
// RESOLVER
// ============================================================================

/// Resolves the rich text attached to Version records.
#[derive(Clone, Copy)]
pub struct TextResolver<'a, 'f> {
    index: &'a ObjectIndex<'f>,
    content: &'a dyn ContentSource,
    decoder: &'a dyn RichTextDecoder,
}

impl<'a, 'f> TextResolver<'a, 'f> {
    pub fn new(
        index: &'a ObjectIndex<'f>,
        content: &'a dyn ContentSource,
        decoder: &'a dyn RichTextDecoder,
    ) -> Self {
        Self {
            index,
            content,
            decoder,
        }
    }

    /// Plain text of `version` with all tokens substituted.
    ///
    /// `context` is the class the text belongs to; it only appears in
    /// diagnostics. A record without rich text, or with an empty payload,
    /// yields the empty string.
    pub fn resolve(
        &self,
        version: &VersionView<'f>,
        context: &ObjectId,
        diagnostics: &mut DiagnosticCollector,
    ) -> Result<String> {
        let Some(data) = self.payload(version)? else {
            return Ok(String::new());
        };
        if data.is_empty() {
            return Ok(String::new());
        }

        let decoded = self
            .decoder
            .decode(&data)
            .map_err(|source| ExtractError::RichText {
                owner: version.id().clone(),
                source,
            })?;
        let text = decoded.replace("\n\n", "\n");

        let tokens = self.tokens(version)?;
        if tokens.is_empty() {
            return Ok(text);
        }
        let context_name = self
            .index
            .name(context)
            .map(|name| name.to_string())
            .unwrap_or_else(|_| context.to_string());
        substitute_tokens(&text, &tokens, version.id(), &context_name, diagnostics)
    }

    /// Raw bytes of the last rich-text attribute, if any.
    fn payload(&self, version: &VersionView<'f>) -> Result<Option<Vec<u8>>> {
        let value = version.details().iter().rev().find_map(|detail| match detail {
            Detail::Attribute { name, value } if name == attr::RTF => Some(value),
            _ => None,
        });
        let Some(value) = value else {
            return Ok(None);
        };

        let first = value.first_str();
        match (value.arity(), first) {
            (1, Some(inline)) => Ok(Some(inline.as_bytes().to_vec())),
            (2, Some(name)) => {
                let mut data = self
                    .content
                    .read(name)
                    .map_err(|source| ExtractError::Content {
                        name: name.to_string(),
                        source,
                    })?;
                data.retain(|&byte| byte != 0x0c);
                Ok(Some(data))
            }
            _ => Err(ExtractError::InvalidAttribute {
                id: version.id().clone(),
                name: attr::RTF,
                value: describe(value),
            }),
        }
    }

    /// Tokens of `version`, keyed by offset. A later token at the same offset wins.
    pub fn tokens(&self, version: &VersionView<'f>) -> Result<BTreeMap<usize, TextToken>> {
        let mut tokens = BTreeMap::new();
        for token_id in version.targets(role::TEXT_OBJECT_TO_MODEL_OBJECT_TOKEN, ObjectKind::ModelObjectToken) {
            let token_version = self.index.version(token_id)?;
            let Some(start) = token_version.attribute_str(attr::TOKEN_START) else {
                tracing::debug!(token = %token_id, "token without start position ignored");
                continue;
            };
            let offset = start.trim().parse::<usize>().map_err(|_| ExtractError::InvalidAttribute {
                id: token_id.clone(),
                name: attr::TOKEN_START,
                value: start.to_string(),
            })?;
            let last_name = token_version.attribute_str(attr::LAST_NAME_TEXT).ok_or_else(|| {
                ExtractError::MissingAttribute {
                    id: token_id.clone(),
                    name: attr::LAST_NAME_TEXT,
                }
            })?;
            let mut literal = last_name.to_string();
            literal.pop();

            let target = match token_version
                .relationships(role::MODEL_OBJECT_TOKEN_TO_MODEL_OBJECT)
                .last()
            {
                Some((_, target)) => Some(self.index.name(target)?),
                None => None,
            };

            tokens.insert(
                offset,
                TextToken {
                    offset,
                    literal,
                    target,
                },
            );
        }
        Ok(tokens)
    }
}

fn describe(value: &AttributeValue) -> String {
    match value {
        AttributeValue::Bool(value) => value.to_string(),
        AttributeValue::Strings(values) => values.join(", "),
        AttributeValue::Nested { value, .. } => value.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hir::diagnostics::codes;
    use crate::syntax::{OdlFile, RawObject};

    fn token(offset: usize, literal: &str, target: Option<&str>) -> TextToken {
        TextToken {
            offset,
            literal: literal.to_string(),
            target: target.map(SmolStr::from),
        }
    }

    #[test]
    fn test_linked_token_is_replaced() {
        let mut diagnostics = DiagnosticCollector::new();
        let tokens = BTreeMap::from([(6, token(6, "X", Some("Signal_1")))]);
        let text = substitute_tokens("Go to X now", &tokens, &"g".into(), "Door", &mut diagnostics)
            .unwrap();
        assert_eq!(text, "Go to Signal_1 now");
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn test_mismatching_token_fails() {
        let mut diagnostics = DiagnosticCollector::new();
        let tokens = BTreeMap::from([(6, token(6, "Y", Some("Signal_1")))]);
        let err = substitute_tokens("Go to X now", &tokens, &"g".into(), "Door", &mut diagnostics)
            .unwrap_err();
        match err {
            ExtractError::TokenMismatch {
                literal, offset, text, ..
            } => {
                assert_eq!(literal, "Y");
                assert_eq!(offset, 6);
                assert_eq!(text, "Go to X now");
            }
            other => panic!("unexpected error {other}"),
        }
    }

    #[test]
    fn test_unlinked_token_uses_normalized_literal() {
        let mut diagnostics = DiagnosticCollector::new();
        let tokens = BTreeMap::from([(4, token(4, "my var", None))]);
        let text = substitute_tokens("set my var", &tokens, &"a".into(), "Door", &mut diagnostics)
            .unwrap();
        assert_eq!(text, "set my_var");
        assert_eq!(diagnostics.with_code(codes::UNLINKED_TOKEN).count(), 1);
    }

    #[test]
    fn test_tokens_beyond_text_are_ignored() {
        let mut diagnostics = DiagnosticCollector::new();
        let tokens = BTreeMap::from([(40, token(40, "Z", Some("Zed")))]);
        let text =
            substitute_tokens("short", &tokens, &"a".into(), "Door", &mut diagnostics).unwrap();
        assert_eq!(text, "short");
    }

    #[test]
    fn test_offsets_count_characters() {
        let mut diagnostics = DiagnosticCollector::new();
        let tokens = BTreeMap::from([(2, token(2, "X", Some("Éva")))]);
        let text = substitute_tokens("é X", &tokens, &"a".into(), "Door", &mut diagnostics).unwrap();
        assert_eq!(text, "é Éva");
    }

    fn resolver_file() -> OdlFile {
        OdlFile::new()
            .with_object(RawObject::of_kind(ObjectKind::Class, "c").with_version("Name: Door", vec![]))
            .with_object(RawObject::of_kind(ObjectKind::Event, "e").with_version("Name: Open Now", vec![]))
            .with_object(RawObject::of_kind(ObjectKind::ModelObjectToken, "t").with_version(
                "Token ",
                vec![
                    Detail::attribute(attr::TOKEN_START, "5"),
                    Detail::attribute(attr::LAST_NAME_TEXT, "Open Now\u{1}"),
                    Detail::relationship(role::MODEL_OBJECT_TOKEN_TO_MODEL_OBJECT, ObjectKind::Event, "e"),
                ],
            ))
            .with_object(RawObject::of_kind(ObjectKind::GuardCondition, "g").with_version(
                "Guard ",
                vec![
                    Detail::attribute_value(
                        attr::RTF,
                        AttributeValue::Nested {
                            value: "guard.rtf".into(),
                            details: vec![Detail::File],
                        },
                    ),
                    Detail::relationship(
                        role::TEXT_OBJECT_TO_MODEL_OBJECT_TOKEN,
                        ObjectKind::ModelObjectToken,
                        "t",
                    ),
                ],
            ))
            .with_object(RawObject::of_kind(ObjectKind::GuardCondition, "empty").with_version(
                "Guard ",
                vec![Detail::attribute(attr::RTF, "")],
            ))
    }

    #[test]
    fn test_resolve_external_text() {
        let file = resolver_file();
        let index = ObjectIndex::new(&file);
        let content = MemoryContent::new().with_file("guard.rtf", b"when\x0c Open Now\n\nfires".to_vec());
        let resolver = TextResolver::new(&index, &content, &PlainText);
        let mut diagnostics = DiagnosticCollector::new();

        let text = resolver
            .resolve(&index.version("g").unwrap(), &"c".into(), &mut diagnostics)
            .unwrap();
        assert_eq!(text, "when Open_Now\nfires");
    }

    #[test]
    fn test_resolve_empty_and_absent_text() {
        let file = resolver_file();
        let index = ObjectIndex::new(&file);
        let content = MemoryContent::new();
        let resolver = TextResolver::new(&index, &content, &PlainText);
        let mut diagnostics = DiagnosticCollector::new();

        let empty = resolver
            .resolve(&index.version("empty").unwrap(), &"c".into(), &mut diagnostics)
            .unwrap();
        assert_eq!(empty, "");
        let absent = resolver
            .resolve(&index.version("c").unwrap(), &"c".into(), &mut diagnostics)
            .unwrap();
        assert_eq!(absent, "");
    }

    #[test]
    fn test_missing_external_content_is_an_error() {
        let file = resolver_file();
        let index = ObjectIndex::new(&file);
        let content = MemoryContent::new();
        let resolver = TextResolver::new(&index, &content, &PlainText);
        let mut diagnostics = DiagnosticCollector::new();

        let err = resolver
            .resolve(&index.version("g").unwrap(), &"c".into(), &mut diagnostics)
            .unwrap_err();
        assert!(matches!(err, ExtractError::Content { name, .. } if name == "guard.rtf"));
    }
}
