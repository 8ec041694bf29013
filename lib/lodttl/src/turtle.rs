//! A [Turtle](https://www.w3.org/TR/turtle/) streaming parser implemented by
//! [`TurtleParser`] and a serializer implemented by [`TurtleSerializer`].

use crate::terse::{TerseOptions, TerseRecognizer};
use crate::toolkit::{Parser, ParseError, ReaderIterator, SliceIterator, SyntaxError};
use crate::trig::{LowLevelTriGSerializer, TriGSerializer};
use lodrdf::{GraphName, Quad, Triple};
use oxiri::{Iri, IriParseError};
use std::collections::HashMap;
use std::io::{self, Read, Write};

/// The flavor of Turtle accepted by the parser.
#[derive(Default, Clone, Copy, Eq, PartialEq, Debug)]
pub enum TurtleDialect {
    /// The original team submission: `@prefix`/`@base` directives only,
    /// no quoted triples.
    Original,
    /// The W3C recommendation, plus quoted triples when enabled.
    #[default]
    W3C,
}

/// A [Turtle](https://www.w3.org/TR/turtle/) streaming parser.
///
/// ```
/// use lodrdf::NamedNode;
/// use lodttl::TurtleParser;
///
/// let file = br#"@base <http://example.com/> .
/// @prefix foaf: <http://xmlns.com/foaf/0.1/> .
/// <#alice> foaf:name "Alice" ;
///     foaf:knows <#bob> .
/// <#bob> foaf:name "Bob" ."#;
///
/// let name = NamedNode::new("http://xmlns.com/foaf/0.1/name")?;
/// let mut names = Vec::new();
/// for triple in TurtleParser::new().for_slice(file) {
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
pub struct TurtleParser {
    dialect: TurtleDialect,
    lenient: bool,
    base_iri: Option<Iri<String>>,
    prefixes: HashMap<String, Iri<String>>,
    with_quoted_triples: bool,
}

impl TurtleParser {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Selects the accepted [`TurtleDialect`].
    #[inline]
    pub fn with_dialect(mut self, dialect: TurtleDialect) -> Self {
        self.dialect = dialect;
        self
    }

    /// Skips some validations and recovers after syntax errors.
    #[inline]
    pub fn lenient(mut self) -> Self {
        self.lenient = true;
        self
    }

    /// The IRI relative IRI references are resolved against.
    #[inline]
    pub fn with_base_iri(mut self, base_iri: impl Into<String>) -> Result<Self, IriParseError> {
        self.base_iri = Some(Iri::parse(base_iri.into())?);
        Ok(self)
    }

    /// Declares a prefix as if the file started with a `@prefix` directive.
    #[inline]
    pub fn with_prefix(
        mut self,
        prefix_name: impl Into<String>,
        prefix_iri: impl Into<String>,
    ) -> Result<Self, IriParseError> {
        self.prefixes
            .insert(prefix_name.into(), Iri::parse(prefix_iri.into())?);
        Ok(self)
    }

    /// Enables quoted triples (`<< s p o >>`) and annotations (`{| ... |}`).
    ///
    /// Only honored by the [`TurtleDialect::W3C`] dialect.
    #[inline]
    pub fn with_quoted_triples(mut self) -> Self {
        self.with_quoted_triples = true;
        self
    }

    /// Parses from a [`Read`] implementation, reading it chunk by chunk.
    pub fn for_reader<R: Read>(self, reader: R) -> ReaderTurtleParser<R> {
        let lenient = self.lenient;
        ReaderTurtleParser {
            inner: self.low_level().parser.for_reader(reader, lenient),
        }
    }

    /// Parses from a complete in-memory byte slice.
    pub fn for_slice(self, slice: &[u8]) -> SliceTurtleParser<'_> {
        let lenient = self.lenient;
        SliceTurtleParser {
            inner: TerseRecognizer::new_slice_parser(slice, self.terse_options())
                .into_iter(lenient),
        }
    }

    /// Builds a parser to which data is fed chunk by chunk, any chunk size.
    pub fn low_level(self) -> LowLevelTurtleParser {
        LowLevelTurtleParser {
            parser: TerseRecognizer::new_parser(self.terse_options()),
        }
    }

    fn terse_options(self) -> TerseOptions {
        TerseOptions {
            with_graph_name: false,
            with_quoted_triples: self.with_quoted_triples && self.dialect == TurtleDialect::W3C,
            sparql_style_directives: self.dialect == TurtleDialect::W3C,
            in_block_directives: false,
            graph_keyword: false,
            anonymous_graph_name: false,
            lenient: self.lenient,
            base_iri: self.base_iri,
            prefixes: self.prefixes,
        }
    }
}

/// Parses a Turtle file from a [`Read`] implementation.
///
/// Can be built using [`TurtleParser::for_reader`].
#[must_use]
pub struct ReaderTurtleParser<R: Read> {
    inner: ReaderIterator<R, TerseRecognizer>,
}

impl<R: Read> Iterator for ReaderTurtleParser<R> {
    type Item = Result<Triple, ParseError>;

    fn next(&mut self) -> Option<Self::Item> {
        Some(self.inner.next()?.map(Into::into))
    }
}

impl<R: Read> ReaderTurtleParser<R> {
    /// The prefixes declared so far, including the ones from directives already parsed.
    pub fn prefixes(&self) -> impl Iterator<Item = (&str, &str)> {
        self.inner
            .parser
            .context
            .prefixes()
            .map(|(name, iri)| (name.as_str(), iri.as_str()))
    }

    /// The base IRI in effect, if any.
    pub fn base_iri(&self) -> Option<&str> {
        self.inner
            .parser
            .context
            .base_iri()
            .map(|iri| iri.as_str())
    }
}

/// Parses a Turtle file from a byte slice.
///
/// Can be built using [`TurtleParser::for_slice`].
#[must_use]
pub struct SliceTurtleParser<'a> {
    inner: SliceIterator<'a, TerseRecognizer>,
}

impl Iterator for SliceTurtleParser<'_> {
    type Item = Result<Triple, SyntaxError>;

    fn next(&mut self) -> Option<Self::Item> {
        Some(self.inner.next()?.map(Into::into))
    }
}

impl SliceTurtleParser<'_> {
    /// The prefixes declared so far, including the ones from directives already parsed.
    pub fn prefixes(&self) -> impl Iterator<Item = (&str, &str)> {
        self.inner
            .parser
            .context
            .prefixes()
            .map(|(name, iri)| (name.as_str(), iri.as_str()))
    }

    /// The base IRI in effect, if any.
    pub fn base_iri(&self) -> Option<&str> {
        self.inner
            .parser
            .context
            .base_iri()
            .map(|iri| iri.as_str())
    }
}

/// Parses a Turtle file by feeding it chunk by chunk.
///
/// Can be built using [`TurtleParser::low_level`].
pub struct LowLevelTurtleParser {
    parser: Parser<Vec<u8>, TerseRecognizer>,
}

impl LowLevelTurtleParser {
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

    /// Attempts to parse a new triple from the already provided data.
    pub fn parse_next(&mut self) -> Option<Result<Triple, SyntaxError>> {
        Some(self.parser.parse_next()?.map(Into::into))
    }

    /// The prefixes declared so far, including the ones from directives already parsed.
    pub fn prefixes(&self) -> impl Iterator<Item = (&str, &str)> {
        self.parser
            .context
            .prefixes()
            .map(|(name, iri)| (name.as_str(), iri.as_str()))
    }

    /// The base IRI in effect, if any.
    pub fn base_iri(&self) -> Option<&str> {
        self.parser.context.base_iri().map(|iri| iri.as_str())
    }
}

/// A [Turtle](https://www.w3.org/TR/turtle/) serializer.
///
/// Groups consecutive triples sharing a subject or a subject and a predicate
/// with `;` and `,`, and compacts IRIs with the declared prefixes.
///
/// ```
/// use lodrdf::{NamedNode, Triple};
/// use lodttl::TurtleSerializer;
///
/// let mut serializer = TurtleSerializer::new().for_writer(Vec::new());
/// serializer.serialize_triple(&Triple::new(
///     NamedNode::new("http://example.com/people#alice")?,
///     NamedNode::new("http://xmlns.com/foaf/0.1/knows")?,
///     NamedNode::new("http://example.com/people#bob")?,
/// ))?;
/// assert_eq!(
///     serializer.finish()?.as_slice(),
///     b"<http://example.com/people#alice> <http://xmlns.com/foaf/0.1/knows> <http://example.com/people#bob> .\n"
/// );
/// # Result::<_, Box<dyn std::error::Error>>::Ok(())
/// ```
#[derive(Default, Clone)]
#[must_use]
pub struct TurtleSerializer {
    inner: TriGSerializer,
}

impl TurtleSerializer {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares a prefix, written out as a `@prefix` directive and used to
    /// compact matching IRIs.
    pub fn with_prefix(
        mut self,
        prefix_name: impl Into<String>,
        prefix_iri: impl Into<String>,
    ) -> Result<Self, IriParseError> {
        self.inner = self.inner.with_prefix(prefix_name, prefix_iri)?;
        Ok(self)
    }

    /// Writes a Turtle file to a [`Write`] implementation.
    pub fn for_writer<W: Write>(self, writer: W) -> WriterTurtleSerializer<W> {
        WriterTurtleSerializer {
            writer,
            low_level_writer: self.low_level(),
        }
    }

    /// Builds a low-level Turtle writer.
    pub fn low_level(self) -> LowLevelTurtleSerializer {
        LowLevelTurtleSerializer {
            inner: self.inner.low_level(),
        }
    }
}

/// Writes a Turtle file to a [`Write`] implementation.
///
/// Can be built using [`TurtleSerializer::for_writer`].
#[must_use]
pub struct WriterTurtleSerializer<W: Write> {
    writer: W,
    low_level_writer: LowLevelTurtleSerializer,
}

impl<W: Write> WriterTurtleSerializer<W> {
    /// Writes an extra triple.
    pub fn serialize_triple(&mut self, t: &Triple) -> io::Result<()> {
        self.low_level_writer.serialize_triple(t, &mut self.writer)
    }

    /// Ends the write process and returns the underlying [`Write`].
    pub fn finish(mut self) -> io::Result<W> {
        self.low_level_writer.finish(&mut self.writer)?;
        Ok(self.writer)
    }
}

/// Writes a Turtle file by using a low-level API.
///
/// Can be built using [`TurtleSerializer::low_level`].
pub struct LowLevelTurtleSerializer {
    inner: LowLevelTriGSerializer,
}

impl LowLevelTurtleSerializer {
    /// Writes an extra triple.
    pub fn serialize_triple(&mut self, t: &Triple, writer: impl Write) -> io::Result<()> {
        self.inner.serialize_quad(
            &Quad {
                subject: t.subject.clone(),
                predicate: t.predicate.clone(),
                object: t.object.clone(),
                graph_name: GraphName::DefaultGraph,
            },
            writer,
        )
    }

    /// Finishes to write the file.
    pub fn finish(&mut self, writer: impl Write) -> io::Result<()> {
        self.inner.finish(writer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lodrdf::vocab::rdf;
    use lodrdf::{BlankNode, Literal, NamedNode, Subject, Term};

    #[test]
    fn parse_collections() -> Result<(), Box<dyn std::error::Error>> {
        let file = br#"@prefix ex: <http://example.com/> .
ex:s ex:p (ex:a ex:b) .
"#;
        let triples = TurtleParser::new()
            .for_slice(file)
            .collect::<Result<Vec<_>, _>>()?;
        // rdf:first/rdf:rest pairs for both members plus the closing rdf:nil
        // and the main triple pointing at the list head
        assert_eq!(triples.len(), 5);
        assert!(triples
            .iter()
            .any(|t| t.subject == Subject::NamedNode(NamedNode::new_unchecked("http://example.com/s"))));
        Ok(())
    }

    #[test]
    fn parse_collection_in_subject_position() -> Result<(), Box<dyn std::error::Error>> {
        let file = br#"@prefix ex: <http://example.com/> .
(1 2 3) ex:p "v" .
"#;
        let triples = TurtleParser::new()
            .for_slice(file)
            .collect::<Result<Vec<_>, _>>()?;
        // three rdf:first/rdf:rest cells plus the statement about the head
        assert_eq!(triples.len(), 7);
        assert_eq!(
            triples
                .iter()
                .filter(|t| t.predicate.as_str() == rdf::FIRST)
                .count(),
            3
        );
        assert_eq!(
            triples
                .iter()
                .filter(|t| t.object == Term::NamedNode(NamedNode::new_unchecked(rdf::NIL)))
                .count(),
            1
        );
        Ok(())
    }

    #[test]
    fn anonymous_blank_nodes_are_distinct() -> Result<(), Box<dyn std::error::Error>> {
        let file = br#"@prefix ex: <http://example.com/> .
[] a ex:X .
[] a ex:X .
_:a a ex:Y .
_:a a ex:Z .
"#;
        let triples = TurtleParser::new()
            .for_slice(file)
            .collect::<Result<Vec<_>, _>>()?;
        assert_eq!(triples.len(), 4);
        assert_ne!(triples[0].subject, triples[1].subject);
        assert_eq!(triples[2].subject, triples[3].subject);
        Ok(())
    }

    #[test]
    fn parse_blank_node_property_lists() -> Result<(), Box<dyn std::error::Error>> {
        let file = br#"@prefix ex: <http://example.com/> .
ex:s ex:p [ ex:q "v" ; ex:r 1 ] .
"#;
        let triples = TurtleParser::new()
            .for_slice(file)
            .collect::<Result<Vec<_>, _>>()?;
        assert_eq!(triples.len(), 3);
        let Term::BlankNode(b) = &triples
            .iter()
            .find(|t| t.predicate.as_str() == "http://example.com/p")
            .unwrap()
            .object
        else {
            panic!("the property list should be a blank node");
        };
        assert!(triples
            .iter()
            .any(|t| t.subject == Subject::BlankNode(b.clone())
                && t.object == Term::Literal(Literal::new_simple_literal("v"))));
        Ok(())
    }

    #[test]
    fn parse_exposes_prefixes_and_base() -> Result<(), Box<dyn std::error::Error>> {
        let file = br#"@base <http://example.com/> .
@prefix ex: <http://example.com/ns#> .
<s> ex:p <o> .
"#;
        let mut parser = TurtleParser::new().for_slice(file);
        assert_eq!(parser.prefixes().count(), 0);
        while parser.next().is_some() {}
        assert_eq!(
            parser.prefixes().collect::<Vec<_>>(),
            [("ex", "http://example.com/ns#")]
        );
        assert_eq!(parser.base_iri(), Some("http://example.com/"));
        Ok(())
    }

    #[test]
    fn parse_sparql_style_directives() -> Result<(), Box<dyn std::error::Error>> {
        let file = br#"PREFIX ex: <http://example.com/>
BASE <http://example.com/>
ex:s ex:p <o> .
"#;
        let triples = TurtleParser::new()
            .for_slice(file)
            .collect::<Result<Vec<_>, _>>()?;
        assert_eq!(triples[0].object, NamedNode::new("http://example.com/o")?.into());

        // The original dialect only knows @prefix and @base
        assert!(TurtleParser::new()
            .with_dialect(TurtleDialect::Original)
            .for_slice(file)
            .any(|r| r.is_err()));
        Ok(())
    }

    #[test]
    fn parse_annotated_triple() -> Result<(), Box<dyn std::error::Error>> {
        let file = br#"@prefix ex: <http://example.com/> .
ex:s ex:p ex:o {| ex:certainty 0.9 |} .
"#;
        let triples = TurtleParser::new()
            .with_quoted_triples()
            .for_slice(file)
            .collect::<Result<Vec<_>, _>>()?;
        assert_eq!(triples.len(), 2);
        let Subject::Triple(quoted) = &triples[1].subject else {
            panic!("the annotation subject should be the quoted triple");
        };
        assert_eq!(**quoted, triples[0]);
        Ok(())
    }

    #[test]
    fn quoted_triples_are_opt_in() {
        let file = b"<< <http://example.com/s> <http://example.com/p> <http://example.com/o> >> <http://example.com/q> <http://example.com/v> .";
        assert!(TurtleParser::new().for_slice(file).any(|r| r.is_err()));
        assert!(TurtleParser::new()
            .with_quoted_triples()
            .for_slice(file)
            .all(|r| r.is_ok()));
    }

    #[test]
    fn serialize_compacts_known_prefixes() -> Result<(), Box<dyn std::error::Error>> {
        let mut serializer = TurtleSerializer::new()
            .with_prefix("ex", "http://example.com/")?
            .for_writer(Vec::new());
        serializer.serialize_triple(&Triple::new(
            NamedNode::new("http://example.com/s")?,
            NamedNode::new("http://example.com/p")?,
            NamedNode::new("http://other.example/o")?,
        ))?;
        serializer.serialize_triple(&Triple::new(
            NamedNode::new("http://example.com/s")?,
            NamedNode::new("http://example.com/p")?,
            Literal::new_typed_literal("12", NamedNode::new_unchecked("http://www.w3.org/2001/XMLSchema#integer")),
        ))?;
        assert_eq!(
            String::from_utf8(serializer.finish()?)?,
            "@prefix ex: <http://example.com/> .\nex:s ex:p <http://other.example/o> , 12 .\n"
        );
        Ok(())
    }

    #[test]
    fn roundtrip_blank_nodes() -> Result<(), Box<dyn std::error::Error>> {
        let triple = Triple::new(
            BlankNode::new("a")?,
            NamedNode::new("http://example.com/p")?,
            BlankNode::new("b")?,
        );
        let mut serializer = TurtleSerializer::new().for_writer(Vec::new());
        serializer.serialize_triple(&triple)?;
        let serialized = serializer.finish()?;
        let parsed = TurtleParser::new()
            .for_slice(&serialized)
            .collect::<Result<Vec<_>, _>>()?;
        assert_eq!(parsed, [triple]);
        Ok(())
    }
}
