use std::ops::Range;
use std::{fmt, io};

/// A position in the parsed text, as a 0-based `line`, a 0-based `column`
/// counted in code points and a 0-based byte `offset` from the start of the
/// file.
#[derive(Eq, PartialEq, Debug, Copy, Clone)]
pub struct TextPosition {
    pub line: u64,
    pub column: u64,
    pub offset: u64,
}

/// An error in the syntax of the parsed file.
///
/// Carries a message and the byte range of the offending input.
#[derive(Debug, thiserror::Error)]
pub struct SyntaxError {
    location: Range<TextPosition>,
    message: String,
}

impl SyntaxError {
    pub(crate) fn new(location: Range<TextPosition>, message: impl Into<String>) -> Self {
        Self {
            location,
            message: message.into(),
        }
    }

    /// The location of the error inside of the file.
    #[inline]
    pub fn location(&self) -> Range<TextPosition> {
        self.location.clone()
    }

    /// The error message.
    #[inline]
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for SyntaxError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (start, end) = (self.location.start, self.location.end);
        // Positions are 0-based internally but displayed starting from 1
        write!(
            f,
            "Parser error at line {} column {}",
            start.line + 1,
            start.column + 1
        )?;
        if end.offset > start.offset + 1 {
            if start.line == end.line {
                write!(f, " to column {}", end.column + 1)?;
            } else {
                write!(f, " to line {} column {}", end.line + 1, end.column + 1)?;
            }
        }
        write!(f, ": {}", self.message)
    }
}

impl From<SyntaxError> for io::Error {
    #[inline]
    fn from(error: SyntaxError) -> Self {
        Self::new(io::ErrorKind::InvalidData, error)
    }
}

/// The union of [`SyntaxError`] and [`io::Error`], for parsers reading from a
/// [`Read`](io::Read) implementation.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    /// I/O error during parsing (file not found...).
    #[error(transparent)]
    Io(#[from] io::Error),
    /// An error in the file syntax.
    #[error(transparent)]
    Syntax(#[from] SyntaxError),
}

impl From<ParseError> for io::Error {
    #[inline]
    fn from(error: ParseError) -> Self {
        match error {
            ParseError::Syntax(e) => e.into(),
            ParseError::Io(e) => e,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn position(line: u64, column: u64, offset: u64) -> TextPosition {
        TextPosition {
            line,
            column,
            offset,
        }
    }

    #[test]
    fn display_single_position() {
        let e = SyntaxError::new(position(0, 4, 4)..position(0, 5, 5), "unexpected token");
        assert_eq!(e.to_string(), "Parser error at line 1 column 5: unexpected token");
    }

    #[test]
    fn display_range_on_one_line() {
        let e = SyntaxError::new(position(2, 0, 10)..position(2, 6, 16), "bad IRI");
        assert_eq!(
            e.to_string(),
            "Parser error at line 3 column 1 to column 7: bad IRI"
        );
    }

    #[test]
    fn display_multi_line_range() {
        let e = SyntaxError::new(position(0, 3, 3)..position(1, 2, 8), "unterminated string");
        assert_eq!(
            e.to_string(),
            "Parser error at line 1 column 4 to line 2 column 3: unterminated string"
        );
    }
}
