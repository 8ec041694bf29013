//! A [N-Triples](https://www.w3.org/TR/n-triples/) streaming parser implemented by
//! [`NTriplesParser`] and a serializer implemented by [`NTriplesSerializer`].

use crate::line_formats::NQuadsRecognizer;
use crate::toolkit::{Parser, ParseError, ReaderIterator, SliceIterator, SyntaxError};
use lodrdf::Triple;
use std::io::{self, Read, Write};

/// The flavor of N-Triples accepted by the parser.
#[derive(Default, Clone, Copy, Eq, PartialEq, Debug)]
pub enum NTriplesDialect {
    /// The historical dialect: ASCII only, no quoted triples.
    Original,
    /// The RDF 1.1 dialect, full Unicode.
    #[default]
    Rdf11,
}

/// A [N-Triples](https://www.w3.org/TR/n-triples/) streaming parser.
///
/// Collect all the names found in the file:
/// ```
/// use lodrdf::NamedNode;
/// use lodttl::NTriplesParser;
///
/// let file = br#"<http://example.com/alice> <http://xmlns.com/foaf/0.1/name> "Alice" .
/// <http://example.com/alice> <http://xmlns.com/foaf/0.1/knows> <http://example.com/bob> .
/// <http://example.com/bob> <http://xmlns.com/foaf/0.1/name> "Bob" ."#;
///
/// let name = NamedNode::new("http://xmlns.com/foaf/0.1/name")?;
/// let mut names = Vec::new();
/// for triple in NTriplesParser::new().for_slice(file) {
///     let triple = triple?;
///     if triple.predicate == name {
///         names.push(triple.object);
///     }
/// }
/// assert_eq!(names.len(), 2);
/// # Result::<_, Box<dyn std::error::Error>>::Ok(())
/// ```
#[derive(Default, Clone)]
#[must_use]
pub struct NTriplesParser {
    dialect: NTriplesDialect,
    lenient: bool,
    with_quoted_triples: bool,
}

impl NTriplesParser {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Selects the accepted [`NTriplesDialect`].
    #[inline]
    pub fn with_dialect(mut self, dialect: NTriplesDialect) -> Self {
        self.dialect = dialect;
        self
    }

    /// Skips some validations and recovers after syntax errors.
    ///
    /// In this mode errors do not stop the parse: the parser drops the broken
    /// statement, resynchronizes on the next line and keeps emitting triples,
    /// with the errors interleaved into the stream.
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
    pub fn for_reader<R: Read>(self, reader: R) -> ReaderNTriplesParser<R> {
        let lenient = self.lenient;
        ReaderNTriplesParser {
            inner: self.low_level().parser.for_reader(reader, lenient),
        }
    }

    /// Parses from a complete in-memory byte slice.
    pub fn for_slice(self, slice: &[u8]) -> SliceNTriplesParser<'_> {
        SliceNTriplesParser {
            inner: NQuadsRecognizer::new_slice_parser(
                slice,
                false,
                self.with_quoted_triples && self.dialect != NTriplesDialect::Original,
                self.dialect == NTriplesDialect::Original,
                self.lenient,
            )
            .into_iter(self.lenient),
        }
    }

    /// Builds a parser to which data is fed chunk by chunk, any chunk size.
    ///
    /// ```
    /// use lodttl::NTriplesParser;
    ///
    /// let file = b"<http://example.com/alice> <http://xmlns.com/foaf/0.1/knows> <http://example.com/bob> .\n";
    ///
    /// let mut count = 0;
    /// let mut parser = NTriplesParser::new().low_level();
    /// let mut chunks = file.chunks(11); // Any chunk size works
    /// while !parser.is_end() {
    ///     match chunks.next() {
    ///         Some(chunk) => parser.extend_from_slice(chunk),
    ///         None => parser.end(),
    ///     }
    ///     while let Some(triple) = parser.parse_next() {
    ///         triple?;
    ///         count += 1;
    ///     }
    /// }
    /// assert_eq!(count, 1);
    /// # Result::<_, Box<dyn std::error::Error>>::Ok(())
    /// ```
    pub fn low_level(self) -> LowLevelNTriplesParser {
        LowLevelNTriplesParser {
            parser: NQuadsRecognizer::new_parser(
                false,
                self.with_quoted_triples && self.dialect != NTriplesDialect::Original,
                self.dialect == NTriplesDialect::Original,
                self.lenient,
            ),
        }
    }
}

/// Parses a N-Triples file from a [`Read`] implementation.
///
/// Can be built using [`NTriplesParser::for_reader`].
#[must_use]
pub struct ReaderNTriplesParser<R: Read> {
    inner: ReaderIterator<R, NQuadsRecognizer>,
}

impl<R: Read> Iterator for ReaderNTriplesParser<R> {
    type Item = Result<Triple, ParseError>;

    fn next(&mut self) -> Option<Self::Item> {
        Some(self.inner.next()?.map(Into::into))
    }
}

/// Parses a N-Triples file from a byte slice.
///
/// Can be built using [`NTriplesParser::for_slice`].
#[must_use]
pub struct SliceNTriplesParser<'a> {
    inner: SliceIterator<'a, NQuadsRecognizer>,
}

impl Iterator for SliceNTriplesParser<'_> {
    type Item = Result<Triple, SyntaxError>;

    fn next(&mut self) -> Option<Self::Item> {
        Some(self.inner.next()?.map(Into::into))
    }
}

/// Parses a N-Triples file by feeding it chunk by chunk.
///
/// Can be built using [`NTriplesParser::low_level`].
pub struct LowLevelNTriplesParser {
    parser: Parser<Vec<u8>, NQuadsRecognizer>,
}

impl LowLevelNTriplesParser {
    /// Adds some extra bytes to the parser. Should be called when [`parse_next`](Self::parse_next) returns [`None`] and there is still unread data.
    pub fn extend_from_slice(&mut self, other: &[u8]) {
        self.parser.extend_from_slice(other)
    }

    /// Tells the parser that the file is finished.
    ///
    /// This triggers the parsing of the final bytes and might lead [`parse_next`](Self::parse_next) to return some extra values.
    pub fn end(&mut self) {
        self.parser.end()
    }

    /// Returns if the parsing is finished i.e. [`end`](Self::end) has been called and [`parse_next`](Self::parse_next) is always going to return `None`.
    pub fn is_end(&self) -> bool {
        self.parser.is_end()
    }

    /// Attempts to parse a new triple from the already provided data.
    ///
    /// Returns [`None`] if the parsing is finished or more data is required.
    pub fn parse_next(&mut self) -> Option<Result<Triple, SyntaxError>> {
        Some(self.parser.parse_next()?.map(Into::into))
    }
}

/// A [N-Triples](https://www.w3.org/TR/n-triples/) serializer.
///
/// ```
/// use lodrdf::{NamedNode, Triple};
/// use lodttl::NTriplesSerializer;
///
/// let mut serializer = NTriplesSerializer::new().for_writer(Vec::new());
/// serializer.serialize_triple(&Triple::new(
///     NamedNode::new("http://example.com/people#alice")?,
///     NamedNode::new("http://xmlns.com/foaf/0.1/knows")?,
///     NamedNode::new("http://example.com/people#bob")?,
/// ))?;
/// assert_eq!(
///     serializer.finish().as_slice(),
///     b"<http://example.com/people#alice> <http://xmlns.com/foaf/0.1/knows> <http://example.com/people#bob> .\n"
/// );
/// # Result::<_, Box<dyn std::error::Error>>::Ok(())
/// ```
#[derive(Default, Clone)]
#[must_use]
pub struct NTriplesSerializer;

impl NTriplesSerializer {
    #[inline]
    pub fn new() -> Self {
        Self
    }

    /// Writes a N-Triples file to a [`Write`] implementation.
    pub fn for_writer<W: Write>(self, writer: W) -> WriterNTriplesSerializer<W> {
        WriterNTriplesSerializer {
            writer,
            low_level_writer: self.low_level(),
        }
    }

    /// Builds a low-level N-Triples writer.
    #[allow(clippy::unused_self)]
    pub fn low_level(self) -> LowLevelNTriplesSerializer {
        LowLevelNTriplesSerializer
    }
}

/// Writes a N-Triples file to a [`Write`] implementation.
///
/// Can be built using [`NTriplesSerializer::for_writer`].
#[must_use]
pub struct WriterNTriplesSerializer<W: Write> {
    writer: W,
    low_level_writer: LowLevelNTriplesSerializer,
}

impl<W: Write> WriterNTriplesSerializer<W> {
    /// Writes an extra triple.
    pub fn serialize_triple(&mut self, t: &Triple) -> io::Result<()> {
        self.low_level_writer.serialize_triple(t, &mut self.writer)
    }

    /// Ends the write process and returns the underlying [`Write`].
    pub fn finish(self) -> W {
        self.writer
    }
}

/// Writes a N-Triples file by using a low-level API.
///
/// Can be built using [`NTriplesSerializer::low_level`].
pub struct LowLevelNTriplesSerializer;

impl LowLevelNTriplesSerializer {
    /// Writes an extra triple.
    #[allow(clippy::unused_self)]
    pub fn serialize_triple(&mut self, t: &Triple, mut writer: impl Write) -> io::Result<()> {
        writeln!(writer, "{t} .")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lodrdf::{BlankNode, Literal, NamedNode, Subject, Term};

    #[test]
    fn parse_simple_file() -> Result<(), Box<dyn std::error::Error>> {
        let triples = NTriplesParser::new()
            .for_slice(
                br#"<http://example.com/s> <http://example.com/p> "foo\nbar"@en .
_:b0 <http://example.com/p> <http://example.com/o> . # trailing comment
"#,
            )
            .collect::<Result<Vec<_>, _>>()?;
        assert_eq!(triples.len(), 2);
        assert_eq!(
            triples[0].object,
            Literal::new_language_tagged_literal("foo\nbar", "en")?.into()
        );
        assert_eq!(triples[1].subject, BlankNode::new("b0")?.into());
        Ok(())
    }

    #[test]
    fn rejects_a_truncated_final_statement() {
        let file = b"<http://example.com/s> <http://example.com/p> \"unterminated";
        let error = NTriplesParser::new()
            .for_slice(file)
            .next()
            .unwrap()
            .unwrap_err();
        assert!(error.to_string().contains("Unexpected end of file"));
    }

    #[test]
    fn parse_is_chunk_size_independent() -> Result<(), Box<dyn std::error::Error>> {
        let file = "<http://example.com/s> <http://example.com/p> \"caf\u{e9}\"^^<http://www.w3.org/2001/XMLSchema#string> .\n<http://example.com/s> <http://example.com/p2> <http://example.com/o> .\n";
        let mut expected = None;
        for chunk_size in 1..=8 {
            let mut parser = NTriplesParser::new().low_level();
            let mut triples = Vec::new();
            let mut chunks = file.as_bytes().chunks(chunk_size);
            while !parser.is_end() {
                if let Some(chunk) = chunks.next() {
                    parser.extend_from_slice(chunk);
                } else {
                    parser.end();
                }
                while let Some(triple) = parser.parse_next() {
                    triples.push(triple?);
                }
            }
            assert_eq!(triples.len(), 2);
            if let Some(expected) = &expected {
                assert_eq!(*expected, triples);
            } else {
                expected = Some(triples);
            }
        }
        Ok(())
    }

    #[test]
    fn original_dialect_rejects_raw_unicode() {
        let file = "<http://example.com/s> <http://example.com/p> \"caf\u{e9}\" .\n";
        assert!(
            NTriplesParser::new()
                .with_dialect(NTriplesDialect::Original)
                .for_slice(file.as_bytes())
                .any(|r| r.is_err())
        );
        assert!(
            NTriplesParser::new()
                .for_slice(file.as_bytes())
                .all(|r| r.is_ok())
        );
    }

    #[test]
    fn lenient_recovers_on_next_line() {
        let file = br#"<http://example.com/s> <http://example.com/p> <http://example.com/o> .
<http://example.com/s> "not a predicate" <http://example.com/o> .
<http://example.com/s2> <http://example.com/p> <http://example.com/o> .
"#;
        let results = NTriplesParser::new()
            .lenient()
            .for_slice(file)
            .collect::<Vec<_>>();
        assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 2);
        assert_eq!(results.iter().filter(|r| r.is_err()).count(), 1);

        // In strict mode the parse is fused right after the error
        let results = NTriplesParser::new().for_slice(file).collect::<Vec<_>>();
        assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
        assert!(results.last().unwrap().is_err());
    }

    #[test]
    fn parse_quoted_triple() -> Result<(), Box<dyn std::error::Error>> {
        let file = br#"<< <http://example.com/s> <http://example.com/p> "o" >> <http://example.com/q> <http://example.com/o2> .
"#;
        let triples = NTriplesParser::new()
            .with_quoted_triples()
            .for_slice(file)
            .collect::<Result<Vec<_>, _>>()?;
        assert_eq!(triples.len(), 1);
        let Subject::Triple(inner) = &triples[0].subject else {
            panic!("expected a quoted triple subject");
        };
        assert_eq!(inner.object, Term::from(Literal::from("o")));
        assert!(
            NTriplesParser::new().for_slice(file).next().unwrap().is_err(),
            "quoted triples must be opt-in"
        );
        Ok(())
    }

    #[test]
    fn serialize_escapes_line_jumps() -> Result<(), Box<dyn std::error::Error>> {
        let mut serializer = NTriplesSerializer::new().for_writer(Vec::new());
        serializer.serialize_triple(&Triple::new(
            NamedNode::new("http://example.com/s")?,
            NamedNode::new("http://example.com/p")?,
            Literal::new_simple_literal("a\nb\"c"),
        ))?;
        assert_eq!(
            String::from_utf8(serializer.finish())?,
            "<http://example.com/s> <http://example.com/p> \"a\\nb\\\"c\" .\n"
        );
        Ok(())
    }
}
