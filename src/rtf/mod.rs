//! Default rich-text decoder.
//!
//! Converts the RTF fragments stored by the modeling tool into plain text:
//! paragraphs become line breaks, escapes are resolved and non-text
//! destinations (font tables, pictures, metadata) are dropped. Input that is
//! not RTF is passed through unchanged.

mod lexer;

use logos::Logos;

use crate::hir::{DecodeError, RichTextDecoder};

use lexer::{RtfToken, split_control_word};

/// Destinations whose content is never text.
const SKIPPED_DESTINATIONS: &[&str] = &[
    "fonttbl",
    "colortbl",
    "stylesheet",
    "info",
    "pict",
    "header",
    "footer",
    "object",
    "listtable",
    "listoverridetable",
    "rsidtbl",
    "generator",
    "themedata",
    "colorschememapping",
    "latentstyles",
    "datastore",
];

/// RTF to plain-text decoder.
#[derive(Debug, Clone, Copy, Default)]
pub struct RtfDecoder;

impl RichTextDecoder for RtfDecoder {
    fn decode(&self, data: &[u8]) -> Result<String, DecodeError> {
        let text = decode_bytes(data);
        if !text.trim_start().starts_with("{\\rtf") {
            return Ok(text);
        }
        rtf_to_text(&text)
    }
}

/// Interpret bytes as UTF-8, falling back to Latin-1.
pub fn decode_bytes(data: &[u8]) -> String {
    match std::str::from_utf8(data) {
        Ok(text) => text.to_string(),
        Err(_) => data.iter().map(|&byte| byte as char).collect(),
    }
}

#[derive(Debug, Clone, Copy)]
struct GroupState {
    skip: bool,
    unicode_skip: usize,
}

impl Default for GroupState {
    fn default() -> Self {
        Self {
            skip: false,
            unicode_skip: 1,
        }
    }
}

struct Writer {
    out: String,
    /// Fallback characters still to drop after a `\u` escape.
    pending_skip: usize,
}

impl Writer {
    fn push(&mut self, state: &GroupState, c: char) {
        if self.pending_skip > 0 {
            self.pending_skip -= 1;
        } else if !state.skip {
            self.out.push(c);
        }
    }
}

/// Convert an RTF document to plain text.
pub fn rtf_to_text(input: &str) -> Result<String, DecodeError> {
    let mut stack = vec![GroupState::default()];
    let mut writer = Writer {
        out: String::with_capacity(input.len() / 2),
        pending_skip: 0,
    };
    let mut lexer = RtfToken::lexer(input);

    while let Some(token) = lexer.next() {
        let slice = lexer.slice();
        let Some(state) = stack.last_mut() else {
            return Err(DecodeError::new("unbalanced group end"));
        };
        match token {
            Ok(RtfToken::GroupStart) => {
                let inner = *state;
                stack.push(inner);
            }
            Ok(RtfToken::GroupEnd) => {
                stack.pop();
                if stack.is_empty() {
                    // Trailing content after the document group is ignored.
                    break;
                }
            }
            Ok(RtfToken::ControlWord) => {
                let (name, param) = split_control_word(slice);
                if SKIPPED_DESTINATIONS.contains(&name) {
                    state.skip = true;
                    continue;
                }
                let state = *state;
                match name {
                    "par" | "line" | "row" | "page" => writer.push(&state, '\n'),
                    "tab" | "cell" => writer.push(&state, '\t'),
                    "emdash" => writer.push(&state, '\u{2014}'),
                    "endash" => writer.push(&state, '\u{2013}'),
                    "bullet" => writer.push(&state, '\u{2022}'),
                    "lquote" => writer.push(&state, '\u{2018}'),
                    "rquote" => writer.push(&state, '\u{2019}'),
                    "ldblquote" => writer.push(&state, '\u{201C}'),
                    "rdblquote" => writer.push(&state, '\u{201D}'),
                    "uc" => {
                        if let Some(state) = stack.last_mut() {
                            state.unicode_skip = param.unwrap_or(1).max(0) as usize;
                        }
                    }
                    "u" => {
                        let code = param.unwrap_or(0);
                        let code = if code < 0 { code + 0x10000 } else { code };
                        let c = char::from_u32(code as u32).unwrap_or('\u{FFFD}');
                        writer.push(&state, c);
                        writer.pending_skip = state.unicode_skip;
                    }
                    _ => {}
                }
            }
            Ok(RtfToken::HexEscape) => {
                let byte = u8::from_str_radix(&slice[2..], 16)
                    .map_err(|err| DecodeError::new(format!("bad hex escape `{slice}`: {err}")))?;
                let state = *state;
                writer.push(&state, byte as char);
            }
            Ok(RtfToken::ControlSymbol) => {
                let state_copy = *state;
                match &slice[1..] {
                    "*" => state.skip = true,
                    "\\" | "{" | "}" => {
                        for c in slice[1..].chars() {
                            writer.push(&state_copy, c);
                        }
                    }
                    "~" => writer.push(&state_copy, '\u{00A0}'),
                    "_" => writer.push(&state_copy, '-'),
                    "\n" | "\r" => writer.push(&state_copy, '\n'),
                    _ => {}
                }
            }
            Ok(RtfToken::Newline) => {}
            Ok(RtfToken::Text) => {
                let state = *state;
                for c in slice.chars() {
                    writer.push(&state, c);
                }
            }
            Err(()) => {
                tracing::debug!(text = slice, "skipping malformed RTF input");
            }
        }
    }

    let mut out = writer.out;
    while out.ends_with('\n') {
        out.pop();
    }
    Ok(out)
}
