//! A [N-Quads](https://www.w3.org/TR/n-quads/) streaming parser implemented by
//! [`NQuadsParser`] and a serializer implemented by [`NQuadsSerializer`].

use crate::line_formats::NQuadsRecognizer;
use crate::ntriples::NTriplesDialect;
use crate::toolkit::{Parser, ParseError, ReaderIterator, SliceIterator, SyntaxError};
use lodrdf::Quad;
use std::io::{self, Read, Write};

/// A [N-Quads](https://www.w3.org/TR/n-quads/) streaming parser.
///
/// ```
/// use lodrdf::GraphName;
/// use lodttl::NQuadsParser;
///
/// let file = br#"<http://example.com/alice> <http://xmlns.com/foaf/0.1/knows> <http://example.com/bob> <http://example.com/people> .
/// <http://example.com/alice> <http://xmlns.com/foaf/0.1/name> "Alice" ."#;
///
/// let quads = NQuadsParser::new()
///     .for_slice(file)
///     .collect::<Result<Vec<_>, _>>()?;
/// assert_eq!(quads.len(), 2);
/// assert_eq!(quads[1].graph_name, GraphName::DefaultGraph);
/// # Result::<_, Box<dyn std::error::Error>>::Ok(())
/// ```
#[derive(Default, Clone)]
#[must_use]
pub struct NQuadsParser {
    dialect: NTriplesDialect,
    lenient: bool,
    with_quoted_triples: bool,
}

impl NQuadsParser {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Selects the accepted [`NTriplesDialect`], shared with N-Triples.
    #[inline]
    pub fn with_dialect(mut self, dialect: NTriplesDialect) -> Self {
        self.dialect = dialect;
        self
    }

    /// Skips some validations and recovers after syntax errors.
    #[inline]
    pub fn lenient(mut self) -> Self {
        self.lenient = true;
        self
    }

    /// Enables quoted triples (`<< s p o >>`) in the subject and object positions.
    #[inline]
    pub fn with_quoted_triples(mut self) -> Self {
        self.with_quoted_triples = true;
        self
    }

    /// Parses from a [`Read`] implementation, reading it chunk by chunk.
    pub fn for_reader<R: Read>(self, reader: R) -> ReaderNQuadsParser<R> {
        let lenient = self.lenient;
        ReaderNQuadsParser {
            inner: self.low_level().parser.for_reader(reader, lenient),
        }
    }

    /// Parses from a complete in-memory byte slice.
    pub fn for_slice(self, slice: &[u8]) -> SliceNQuadsParser<'_> {
        SliceNQuadsParser {
            inner: NQuadsRecognizer::new_slice_parser(
                slice,
                true,
                self.with_quoted_triples && self.dialect != NTriplesDialect::Original,
                self.dialect == NTriplesDialect::Original,
                self.lenient,
            )
            .into_iter(self.lenient),
        }
    }

    /// Builds a parser to which data is fed chunk by chunk, any chunk size.
    pub fn low_level(self) -> LowLevelNQuadsParser {
        LowLevelNQuadsParser {
            parser: NQuadsRecognizer::new_parser(
                true,
                self.with_quoted_triples && self.dialect != NTriplesDialect::Original,
                self.dialect == NTriplesDialect::Original,
                self.lenient,
            ),
        }
    }
}

/// Parses a N-Quads file from a [`Read`] implementation.
///
/// Can be built using [`NQuadsParser::for_reader`].
#[must_use]
pub struct ReaderNQuadsParser<R: Read> {
    inner: ReaderIterator<R, NQuadsRecognizer>,
}

impl<R: Read> Iterator for ReaderNQuadsParser<R> {
    type Item = Result<Quad, ParseError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }
}

/// Parses a N-Quads file from a byte slice.
///
/// Can be built using [`NQuadsParser::for_slice`].
#[must_use]
pub struct SliceNQuadsParser<'a> {
    inner: SliceIterator<'a, NQuadsRecognizer>,
}

impl Iterator for SliceNQuadsParser<'_> {
    type Item = Result<Quad, SyntaxError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }
}

/// Parses a N-Quads file by feeding it chunk by chunk.
///
/// Can be built using [`NQuadsParser::low_level`].
pub struct LowLevelNQuadsParser {
    parser: Parser<Vec<u8>, NQuadsRecognizer>,
}

impl LowLevelNQuadsParser {
    /// Adds some extra bytes to the parser. Should be called when [`parse_next`](Self::parse_next) returns [`None`] and there is still unread data.
    pub fn extend_from_slice(&mut self, other: &[u8]) {
        self.parser.extend_from_slice(other)
    }

    /// Tells the parser that the file is finished.
    pub fn end(&mut self) {
        self.parser.end()
    }

    /// Returns if the parsing is finished.
    pub fn is_end(&self) -> bool {
        self.parser.is_end()
    }

    /// Attempts to parse a new quad from the already provided data.
    pub fn parse_next(&mut self) -> Option<Result<Quad, SyntaxError>> {
        self.parser.parse_next()
    }
}

/// A [N-Quads](https://www.w3.org/TR/n-quads/) serializer.
///
/// ```
/// use lodrdf::{NamedNode, Quad};
/// use lodttl::NQuadsSerializer;
///
/// let mut serializer = NQuadsSerializer::new().for_writer(Vec::new());
/// serializer.serialize_quad(&Quad::new(
///     NamedNode::new("http://example.com/people#alice")?,
///     NamedNode::new("http://xmlns.com/foaf/0.1/knows")?,
///     NamedNode::new("http://example.com/people#bob")?,
///     NamedNode::new("http://example.com/people")?,
/// ))?;
/// assert_eq!(
///     serializer.finish().as_slice(),
///     b"<http://example.com/people#alice> <http://xmlns.com/foaf/0.1/knows> <http://example.com/people#bob> <http://example.com/people> .\n"
/// );
/// # Result::<_, Box<dyn std::error::Error>>::Ok(())
/// ```
#[derive(Default, Clone)]
#[must_use]
pub struct NQuadsSerializer;

impl NQuadsSerializer {
    #[inline]
    pub fn new() -> Self {
        Self
    }

    /// Writes a N-Quads file to a [`Write`] implementation.
    pub fn for_writer<W: Write>(self, writer: W) -> WriterNQuadsSerializer<W> {
        WriterNQuadsSerializer {
            writer,
            low_level_writer: self.low_level(),
        }
    }

    /// Builds a low-level N-Quads writer.
    #[allow(clippy::unused_self)]
    pub fn low_level(self) -> LowLevelNQuadsSerializer {
        LowLevelNQuadsSerializer
    }
}

/// Writes a N-Quads file to a [`Write`] implementation.
///
/// Can be built using [`NQuadsSerializer::for_writer`].
#[must_use]
pub struct WriterNQuadsSerializer<W: Write> {
    writer: W,
    low_level_writer: LowLevelNQuadsSerializer,
}

impl<W: Write> WriterNQuadsSerializer<W> {
    /// Writes an extra quad.
    pub fn serialize_quad(&mut self, q: &Quad) -> io::Result<()> {
        self.low_level_writer.serialize_quad(q, &mut self.writer)
    }

    /// Ends the write process and returns the underlying [`Write`].
    pub fn finish(self) -> W {
        self.writer
    }
}

/// Writes a N-Quads file by using a low-level API.
///
/// Can be built using [`NQuadsSerializer::low_level`].
pub struct LowLevelNQuadsSerializer;

impl LowLevelNQuadsSerializer {
    /// Writes an extra quad.
    #[allow(clippy::unused_self)]
    pub fn serialize_quad(&mut self, q: &Quad, mut writer: impl Write) -> io::Result<()> {
        writeln!(writer, "{q} .")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lodrdf::{BlankNode, GraphName, NamedNode};

    #[test]
    fn parse_graph_names() -> Result<(), Box<dyn std::error::Error>> {
        let file = br#"<http://example.com/s> <http://example.com/p> <http://example.com/o> <http://example.com/g> .
<http://example.com/s> <http://example.com/p> <http://example.com/o> _:g .
<http://example.com/s> <http://example.com/p> <http://example.com/o> .
"#;
        let quads = NQuadsParser::new()
            .for_slice(file)
            .collect::<Result<Vec<_>, _>>()?;
        assert_eq!(
            quads[0].graph_name,
            NamedNode::new("http://example.com/g")?.into()
        );
        assert_eq!(quads[1].graph_name, BlankNode::new("g")?.into());
        assert_eq!(quads[2].graph_name, GraphName::DefaultGraph);
        Ok(())
    }

    #[test]
    fn rejects_two_statements_on_one_line() {
        let file = b"<http://example.com/s> <http://example.com/p> <http://example.com/o> . <http://example.com/s> <http://example.com/p> <http://example.com/o> .\n";
        assert!(NQuadsParser::new().for_slice(file).any(|r| r.is_err()));
    }

    #[test]
    fn rejects_relative_iris() {
        let file = b"</s> <http://example.com/p> <http://example.com/o> .\n";
        assert!(NQuadsParser::new().for_slice(file).next().unwrap().is_err());
    }

    #[test]
    fn reader_and_slice_agree() -> Result<(), Box<dyn std::error::Error>> {
        let file: &[u8] = br#"<http://example.com/s> <http://example.com/p> "1"^^<http://www.w3.org/2001/XMLSchema#integer> <http://example.com/g> .
"#;
        let from_slice = NQuadsParser::new()
            .for_slice(file)
            .collect::<Result<Vec<_>, _>>()?;
        let from_reader = NQuadsParser::new()
            .for_reader(file)
            .collect::<Result<Vec<_>, _>>()?;
        assert_eq!(from_slice, from_reader);
        Ok(())
    }
}
