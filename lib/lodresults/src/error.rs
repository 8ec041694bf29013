use lodrdf::TermParseError;
use std::io;
use std::ops::Range;
use std::sync::Arc;

/// A position in a text i.e. a `line` number starting from 0, a `column` number starting from 0 (in number of code points) and a global file `offset` starting from 0 (in number of bytes).
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub struct TextPosition {
    pub line: u64,
    pub column: u64,
    pub offset: u64,
}

/// An error in the syntax of the parsed file.
#[derive(Debug, thiserror::Error)]
#[error(transparent)]
pub struct QueryResultsSyntaxError {
    cause: SyntaxErrorCause,
}

#[derive(Debug, thiserror::Error)]
enum SyntaxErrorCause {
    #[error(transparent)]
    Json(#[from] json_event_parser::JsonSyntaxError),
    #[error(transparent)]
    Xml(#[from] quick_xml::Error),
    #[error("Error {error} on '{term}' in line {}", location.start.line + 1)]
    Term {
        #[source]
        error: TermParseError,
        term: String,
        location: Range<TextPosition>,
    },
    #[error("{msg}")]
    Msg {
        msg: String,
        location: Option<Range<TextPosition>>,
    },
}

impl QueryResultsSyntaxError {
    /// Builds an error from a printable error message.
    #[inline]
    pub(crate) fn msg(msg: impl Into<String>) -> Self {
        Self {
            cause: SyntaxErrorCause::Msg {
                msg: msg.into(),
                location: None,
            },
        }
    }

    /// Builds an error from a printable error message and a location.
    #[inline]
    pub(crate) fn located_message(msg: impl Into<String>, location: Range<TextPosition>) -> Self {
        Self {
            cause: SyntaxErrorCause::Msg {
                msg: msg.into(),
                location: Some(location),
            },
        }
    }

    /// Builds an error from a term parsing error and a location.
    #[inline]
    pub(crate) fn term(
        error: TermParseError,
        term: impl Into<String>,
        location: Range<TextPosition>,
    ) -> Self {
        Self {
            cause: SyntaxErrorCause::Term {
                error,
                term: term.into(),
                location,
            },
        }
    }

    /// The location of the error inside of the file, when known.
    #[inline]
    pub fn location(&self) -> Option<Range<TextPosition>> {
        match &self.cause {
            SyntaxErrorCause::Json(e) => {
                let location = e.location();
                let convert = |p: json_event_parser::TextPosition| TextPosition {
                    line: p.line,
                    column: p.column,
                    offset: p.offset,
                };
                Some(convert(location.start)..convert(location.end))
            }
            SyntaxErrorCause::Term { location, .. } => Some(location.clone()),
            SyntaxErrorCause::Msg { location, .. } => location.clone(),
            SyntaxErrorCause::Xml(_) => None,
        }
    }
}

impl From<json_event_parser::JsonSyntaxError> for QueryResultsSyntaxError {
    #[inline]
    fn from(error: json_event_parser::JsonSyntaxError) -> Self {
        Self {
            cause: SyntaxErrorCause::Json(error),
        }
    }
}

impl From<QueryResultsSyntaxError> for io::Error {
    #[inline]
    fn from(error: QueryResultsSyntaxError) -> Self {
        match error.cause {
            SyntaxErrorCause::Xml(quick_xml::Error::Io(e)) => unwrap_shared_io_error(e),
            cause => Self::new(
                io::ErrorKind::InvalidData,
                QueryResultsSyntaxError { cause },
            ),
        }
    }
}

/// Error returned during SPARQL result formats format parsing.
#[derive(Debug, thiserror::Error)]
pub enum QueryResultsParseError {
    /// I/O error during parsing (file not found...).
    #[error(transparent)]
    Io(#[from] io::Error),
    /// An error in the file syntax.
    #[error(transparent)]
    Syntax(#[from] QueryResultsSyntaxError),
}

impl From<QueryResultsParseError> for io::Error {
    #[inline]
    fn from(error: QueryResultsParseError) -> Self {
        match error {
            QueryResultsParseError::Io(error) => error,
            QueryResultsParseError::Syntax(error) => error.into(),
        }
    }
}

impl From<json_event_parser::JsonParseError> for QueryResultsParseError {
    fn from(error: json_event_parser::JsonParseError) -> Self {
        match error {
            json_event_parser::JsonParseError::Syntax(error) => {
                QueryResultsSyntaxError::from(error).into()
            }
            json_event_parser::JsonParseError::Io(error) => error.into(),
        }
    }
}

impl From<quick_xml::Error> for QueryResultsParseError {
    #[inline]
    fn from(error: quick_xml::Error) -> Self {
        match error {
            quick_xml::Error::Io(e) => Self::Io(unwrap_shared_io_error(e)),
            error => Self::Syntax(QueryResultsSyntaxError {
                cause: SyntaxErrorCause::Xml(error),
            }),
        }
    }
}

impl From<quick_xml::escape::EscapeError> for QueryResultsParseError {
    #[inline]
    fn from(error: quick_xml::escape::EscapeError) -> Self {
        quick_xml::Error::from(error).into()
    }
}

impl From<quick_xml::encoding::EncodingError> for QueryResultsParseError {
    #[inline]
    fn from(error: quick_xml::encoding::EncodingError) -> Self {
        quick_xml::Error::from(error).into()
    }
}

/// quick-xml wraps its I/O errors in an `Arc` to stay cloneable.
fn unwrap_shared_io_error(error: Arc<io::Error>) -> io::Error {
    Arc::try_unwrap(error).unwrap_or_else(|e| io::Error::new(e.kind(), e))
}
