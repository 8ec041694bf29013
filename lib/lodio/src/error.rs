use crate::format::RdfFormat;
use crate::formatter::TermPosition;
use std::io;
use std::ops::Range;

/// Error returned during RDF format parsing.
#[derive(Debug, thiserror::Error)]
pub enum RdfParseError {
    /// I/O error during parsing (file not found...).
    #[error(transparent)]
    Io(#[from] io::Error),
    /// An error in the file syntax.
    #[error(transparent)]
    Syntax(#[from] RdfSyntaxError),
}

impl From<lodttl::ParseError> for RdfParseError {
    #[inline]
    fn from(error: lodttl::ParseError) -> Self {
        match error {
            lodttl::ParseError::Syntax(e) => Self::Syntax(e.into()),
            lodttl::ParseError::Io(e) => Self::Io(e),
        }
    }
}

impl From<lodrdfxml::RdfXmlParseError> for RdfParseError {
    #[inline]
    fn from(error: lodrdfxml::RdfXmlParseError) -> Self {
        match error {
            lodrdfxml::RdfXmlParseError::Syntax(e) => Self::Syntax(e.into()),
            lodrdfxml::RdfXmlParseError::Io(e) => Self::Io(e),
        }
    }
}

impl From<RdfParseError> for io::Error {
    #[inline]
    fn from(error: RdfParseError) -> Self {
        match error {
            RdfParseError::Io(error) => error,
            RdfParseError::Syntax(error) => error.into(),
        }
    }
}

/// An error in the syntax of the parsed file.
#[derive(Debug, thiserror::Error)]
#[error(transparent)]
pub struct RdfSyntaxError(#[from] SyntaxErrorKind);

#[derive(Debug, thiserror::Error)]
enum SyntaxErrorKind {
    #[error(transparent)]
    Turtle(#[from] lodttl::SyntaxError),
    #[error(transparent)]
    RdfXml(#[from] lodrdfxml::RdfXmlSyntaxError),
    #[error("{0}")]
    Msg(&'static str),
}

impl RdfSyntaxError {
    /// The location of the error inside of the file.
    ///
    /// Only the text-based parsers track locations, XML errors return [`None`].
    #[inline]
    pub fn location(&self) -> Option<Range<TextPosition>> {
        let SyntaxErrorKind::Turtle(e) = &self.0 else {
            return None;
        };
        let location = e.location();
        Some(position_from_ttl(location.start)..position_from_ttl(location.end))
    }

    pub(crate) fn msg(msg: &'static str) -> Self {
        Self(SyntaxErrorKind::Msg(msg))
    }
}

impl From<lodttl::SyntaxError> for RdfSyntaxError {
    #[inline]
    fn from(error: lodttl::SyntaxError) -> Self {
        Self(SyntaxErrorKind::Turtle(error))
    }
}

impl From<lodrdfxml::RdfXmlSyntaxError> for RdfSyntaxError {
    #[inline]
    fn from(error: lodrdfxml::RdfXmlSyntaxError) -> Self {
        Self(SyntaxErrorKind::RdfXml(error))
    }
}

impl From<RdfSyntaxError> for io::Error {
    #[inline]
    fn from(error: RdfSyntaxError) -> Self {
        match error.0 {
            SyntaxErrorKind::Turtle(error) => error.into(),
            SyntaxErrorKind::RdfXml(error) => error.into(),
            SyntaxErrorKind::Msg(msg) => Self::new(io::ErrorKind::InvalidData, msg),
        }
    }
}

/// A position in a text, as a 0-based `line`, a 0-based `column` counted in
/// code points and a 0-based byte `offset` from the beginning of the file.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub struct TextPosition {
    pub line: u64,
    pub column: u64,
    pub offset: u64,
}

fn position_from_ttl(position: lodttl::TextPosition) -> TextPosition {
    TextPosition {
        line: position.line,
        column: position.column,
        offset: position.offset,
    }
}

/// A term can't be written at the requested position of the output syntax.
///
/// Returned by the formatters of this crate instead of ever emitting a
/// document the syntax grammar would reject.
#[derive(Debug, Clone, thiserror::Error)]
#[error("{kind} is not allowed in the {position} position of {format}")]
pub struct UnserializableError {
    pub(crate) kind: &'static str,
    pub(crate) position: TermPosition,
    pub(crate) format: &'static str,
}

impl UnserializableError {
    /// The position the term was about to be written at.
    #[inline]
    pub fn position(&self) -> TermPosition {
        self.position
    }
}

/// The serialization format can't represent the data it was given.
#[derive(Debug, Clone, thiserror::Error)]
#[error("the {format} format does not support {feature}")]
pub struct CapabilityError {
    pub(crate) format: RdfFormat,
    pub(crate) feature: &'static str,
}

impl CapabilityError {
    /// The format that lacks the capability.
    #[inline]
    pub fn format(&self) -> RdfFormat {
        self.format
    }
}
