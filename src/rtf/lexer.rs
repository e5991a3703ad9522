//! Logos-based lexer for RTF

use logos::Logos;

/// RTF token kinds.
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
pub enum RtfToken {
    #[token("{")]
    GroupStart,
    #[token("}")]
    GroupEnd,

    /// `\word`, optionally with a numeric parameter and one delimiting space.
    #[regex(r"\\[a-zA-Z]+(-?[0-9]+)? ?")]
    ControlWord,

    /// `\'hh` escape.
    #[regex(r"\\'[0-9a-fA-F][0-9a-fA-F]")]
    HexEscape,

    /// Backslash followed by a single non-letter.
    #[regex(r"\\[^a-zA-Z']")]
    ControlSymbol,

    /// Raw line breaks carry no meaning in RTF.
    #[regex(r"[\r\n]+")]
    Newline,

    #[regex(r"[^\\{}\r\n]+")]
    Text,
}

/// Split a control word token into its name and optional parameter.
pub fn split_control_word(text: &str) -> (&str, Option<i32>) {
    let body = text.trim_end_matches(' ').trim_start_matches('\\');
    let split = body
        .find(|c: char| c == '-' || c.is_ascii_digit())
        .unwrap_or(body.len());
    let (name, param) = body.split_at(split);
    (name, param.parse().ok())
}
