//! Position tracking for parse diagnostics
//!
//! Stores the source location (line/column) of tokens so that warnings about
//! malformed corpus input can point at the offending line.

use text_size::TextSize;

/// A position in source code (0-indexed)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl Position {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Humans count lines from one
        write!(f, "{}:{}", self.line + 1, self.column + 1)
    }
}

/// Maps byte offsets to line/column positions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineIndex {
    /// Byte offset of the first character of every line.
    line_starts: Vec<TextSize>,
}

impl LineIndex {
    pub fn new(text: &str) -> Self {
        let mut line_starts = vec![TextSize::new(0)];
        for (offset, byte) in text.bytes().enumerate() {
            if byte == b'\n' {
                line_starts.push(TextSize::new(offset as u32 + 1));
            }
        }
        Self { line_starts }
    }

    /// Convert a byte offset into a line/column position.
    pub fn position(&self, offset: TextSize) -> Position {
        let line = match self.line_starts.binary_search(&offset) {
            Ok(line) => line,
            Err(next) => next - 1,
        };
        let column = u32::from(offset) - u32::from(self.line_starts[line]);
        Position::new(line, column as usize)
    }

    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_on_first_line() {
        let index = LineIndex::new("Object \"a\"");
        assert_eq!(index.position(TextSize::new(7)), Position::new(0, 7));
    }

    #[test]
    fn test_position_after_newlines() {
        let index = LineIndex::new("a\nbc\n\nd");
        assert_eq!(index.line_count(), 4);
        assert_eq!(index.position(TextSize::new(2)), Position::new(1, 0));
        assert_eq!(index.position(TextSize::new(3)), Position::new(1, 1));
        assert_eq!(index.position(TextSize::new(6)), Position::new(3, 0));
    }

    #[test]
    fn test_position_display_is_one_based() {
        assert_eq!(Position::new(0, 4).to_string(), "1:5");
    }
}
