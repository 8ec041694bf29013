//! A [TriG](https://www.w3.org/TR/trig/) streaming parser implemented by [`TriGParser`]
//! and a serializer implemented by [`TriGSerializer`].

use crate::terse::{TerseOptions, TerseRecognizer};
use crate::toolkit::{Parser, ParseError, ReaderIterator, SliceIterator, SyntaxError};
use lodrdf::vocab::xsd;
use lodrdf::{GraphName, Literal, NamedNode, Namespaces, Quad, Subject, Term};
use oxiri::{Iri, IriParseError};
use std::collections::HashMap;
use std::fmt;
use std::io::{self, Read, Write};

/// The flavor of TriG accepted by the parser.
#[derive(Default, Clone, Copy, Eq, PartialEq, Debug)]
pub enum TriGDialect {
    /// The original TriG: no `GRAPH` keyword, directives only at the top level.
    Original,
    /// The W3C member submission: directives are also allowed inside graph
    /// blocks and are scoped to the block.
    MemberSubmission,
    /// The RDF 1.1 recommendation: `GRAPH` keyword, SPARQL-style directives,
    /// `[]` as a graph name.
    #[default]
    Rdf11,
}

/// A [TriG](https://www.w3.org/TR/trig/) streaming parser.
///
/// ```
/// use lodrdf::NamedNode;
/// use lodttl::TriGParser;
///
/// let file = br#"@prefix foaf: <http://xmlns.com/foaf/0.1/> .
/// <http://example.com/people> {
///     <http://example.com/people#alice> foaf:name "Alice" ;
///         foaf:knows <http://example.com/people#bob> .
/// }"#;
///
/// let name = NamedNode::new("http://xmlns.com/foaf/0.1/name")?;
/// let mut count = 0;
/// for quad in TriGParser::new().for_slice(file) {
///     let quad = quad?;
///     if quad.predicate == name {
///         count += 1;
///     }
/// }
/// assert_eq!(count, 1);
/// # Result::<_, Box<dyn std::error::Error>>::Ok(())
/// ```
#[derive(Default, Clone)]
#[must_use]
pub struct TriGParser {
    dialect: TriGDialect,
    lenient: bool,
    base_iri: Option<Iri<String>>,
    prefixes: HashMap<String, Iri<String>>,
    with_quoted_triples: bool,
}

impl TriGParser {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Selects the accepted [`TriGDialect`].
    #[inline]
    pub fn with_dialect(mut self, dialect: TriGDialect) -> Self {
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
    /// Only honored by the [`TriGDialect::Rdf11`] dialect.
    #[inline]
    pub fn with_quoted_triples(mut self) -> Self {
        self.with_quoted_triples = true;
        self
    }

    /// Parses from a [`Read`] implementation, reading it chunk by chunk.
    pub fn for_reader<R: Read>(self, reader: R) -> ReaderTriGParser<R> {
        let lenient = self.lenient;
        ReaderTriGParser {
            inner: self.low_level().parser.for_reader(reader, lenient),
        }
    }

    /// Parses from a complete in-memory byte slice.
    pub fn for_slice(self, slice: &[u8]) -> SliceTriGParser<'_> {
        let lenient = self.lenient;
        SliceTriGParser {
            inner: TerseRecognizer::new_slice_parser(slice, self.terse_options(true))
                .into_iter(lenient),
        }
    }

    /// Builds a parser to which data is fed chunk by chunk, any chunk size.
    pub fn low_level(self) -> LowLevelTriGParser {
        LowLevelTriGParser {
            parser: TerseRecognizer::new_parser(self.terse_options(true)),
        }
    }

    fn terse_options(self, with_graph_name: bool) -> TerseOptions {
        TerseOptions {
            with_graph_name,
            with_quoted_triples: self.with_quoted_triples && self.dialect == TriGDialect::Rdf11,
            sparql_style_directives: self.dialect == TriGDialect::Rdf11,
            in_block_directives: self.dialect == TriGDialect::MemberSubmission,
            graph_keyword: self.dialect == TriGDialect::Rdf11,
            anonymous_graph_name: self.dialect == TriGDialect::Rdf11,
            lenient: self.lenient,
            base_iri: self.base_iri,
            prefixes: self.prefixes,
        }
    }
}

/// Parses a TriG file from a [`Read`] implementation.
///
/// Can be built using [`TriGParser::for_reader`].
#[must_use]
pub struct ReaderTriGParser<R: Read> {
    inner: ReaderIterator<R, TerseRecognizer>,
}

impl<R: Read> Iterator for ReaderTriGParser<R> {
    type Item = Result<Quad, ParseError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }
}

impl<R: Read> ReaderTriGParser<R> {
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

/// Parses a TriG file from a byte slice.
///
/// Can be built using [`TriGParser::for_slice`].
#[must_use]
pub struct SliceTriGParser<'a> {
    inner: SliceIterator<'a, TerseRecognizer>,
}

impl Iterator for SliceTriGParser<'_> {
    type Item = Result<Quad, SyntaxError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }
}

impl SliceTriGParser<'_> {
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

/// Parses a TriG file by feeding it chunk by chunk.
///
/// Can be built using [`TriGParser::low_level`].
pub struct LowLevelTriGParser {
    parser: Parser<Vec<u8>, TerseRecognizer>,
}

impl LowLevelTriGParser {
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

/// A [TriG](https://www.w3.org/TR/trig/) serializer.
///
/// Groups consecutive quads sharing a graph name into a graph block, and quads
/// sharing a subject or a subject and a predicate with `;` and `,`.
///
/// ```
/// use lodrdf::{NamedNode, Quad};
/// use lodttl::TriGSerializer;
///
/// let mut serializer = TriGSerializer::new().for_writer(Vec::new());
/// serializer.serialize_quad(&Quad::new(
///     NamedNode::new("http://example.com/people#alice")?,
///     NamedNode::new("http://xmlns.com/foaf/0.1/knows")?,
///     NamedNode::new("http://example.com/people#bob")?,
///     NamedNode::new("http://example.com/people")?,
/// ))?;
/// assert_eq!(
///     serializer.finish()?.as_slice(),
///     b"<http://example.com/people> {\n\t<http://example.com/people#alice> <http://xmlns.com/foaf/0.1/knows> <http://example.com/people#bob> .\n}\n"
/// );
/// # Result::<_, Box<dyn std::error::Error>>::Ok(())
/// ```
#[derive(Default, Clone)]
#[must_use]
pub struct TriGSerializer {
    prefixes: Namespaces,
}

impl TriGSerializer {
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
        let iri = Iri::parse(prefix_iri.into())?;
        self.prefixes.add(prefix_name.into(), iri.into_inner());
        Ok(self)
    }

    /// Writes a TriG file to a [`Write`] implementation.
    pub fn for_writer<W: Write>(self, writer: W) -> WriterTriGSerializer<W> {
        WriterTriGSerializer {
            writer,
            low_level_writer: self.low_level(),
        }
    }

    /// Builds a low-level TriG writer.
    pub fn low_level(self) -> LowLevelTriGSerializer {
        LowLevelTriGSerializer {
            prefixes: self.prefixes,
            header_written: false,
            current_graph_name: GraphName::DefaultGraph,
            current_subject_predicate: None,
        }
    }
}

/// Writes a TriG file to a [`Write`] implementation.
///
/// Can be built using [`TriGSerializer::for_writer`].
#[must_use]
pub struct WriterTriGSerializer<W: Write> {
    writer: W,
    low_level_writer: LowLevelTriGSerializer,
}

impl<W: Write> WriterTriGSerializer<W> {
    /// Writes an extra quad.
    pub fn serialize_quad(&mut self, q: &Quad) -> io::Result<()> {
        self.low_level_writer.serialize_quad(q, &mut self.writer)
    }

    /// Ends the write process and returns the underlying [`Write`].
    pub fn finish(mut self) -> io::Result<W> {
        self.low_level_writer.finish(&mut self.writer)?;
        Ok(self.writer)
    }
}

/// Writes a TriG file by using a low-level API.
///
/// Can be built using [`TriGSerializer::low_level`].
pub struct LowLevelTriGSerializer {
    prefixes: Namespaces,
    header_written: bool,
    current_graph_name: GraphName,
    current_subject_predicate: Option<(Subject, NamedNode)>,
}

impl LowLevelTriGSerializer {
    /// Writes an extra quad.
    pub fn serialize_quad(&mut self, q: &Quad, mut writer: impl Write) -> io::Result<()> {
        if !self.header_written {
            self.header_written = true;
            for (prefix, namespace) in self.prefixes.iter() {
                writeln!(writer, "@prefix {prefix}: <{namespace}> .")?;
            }
        }
        if q.graph_name != self.current_graph_name {
            self.close_graph(&mut writer)?;
            self.current_graph_name = q.graph_name.clone();
            self.current_subject_predicate = Some((q.subject.clone(), q.predicate.clone()));
            match &self.current_graph_name {
                GraphName::NamedNode(g) => writeln!(writer, "{} {{", self.named(g))?,
                GraphName::BlankNode(g) => writeln!(writer, "{g} {{")?,
                GraphName::DefaultGraph => {
                    return self.write_triple_start(q, writer);
                }
            }
            write!(writer, "\t")?;
            return self.write_triple_start(q, writer);
        }
        match self.current_subject_predicate.take() {
            Some((subject, predicate)) if subject == q.subject && predicate == q.predicate => {
                self.current_subject_predicate = Some((subject, predicate));
                write!(writer, " , {}", self.term(&q.object))
            }
            Some((subject, _)) if subject == q.subject => {
                self.current_subject_predicate = Some((subject, q.predicate.clone()));
                writeln!(writer, " ;")?;
                self.block_indent(&mut writer)?;
                write!(
                    writer,
                    "\t{} {}",
                    self.named(&q.predicate),
                    self.term(&q.object)
                )
            }
            Some(_) => {
                self.current_subject_predicate = Some((q.subject.clone(), q.predicate.clone()));
                writeln!(writer, " .")?;
                self.block_indent(&mut writer)?;
                self.write_triple_start(q, writer)
            }
            None => {
                self.current_subject_predicate = Some((q.subject.clone(), q.predicate.clone()));
                self.block_indent(&mut writer)?;
                self.write_triple_start(q, writer)
            }
        }
    }

    /// Finishes to write the file.
    pub fn finish(&mut self, mut writer: impl Write) -> io::Result<()> {
        self.close_graph(&mut writer)
    }

    /// Ends the pending statement and closes the graph block if one is open.
    fn close_graph(&mut self, mut writer: impl Write) -> io::Result<()> {
        if self.current_subject_predicate.take().is_some() {
            writeln!(writer, " .")?;
        }
        if !matches!(self.current_graph_name, GraphName::DefaultGraph) {
            writeln!(writer, "}}")?;
        }
        Ok(())
    }

    fn block_indent(&self, mut writer: impl Write) -> io::Result<()> {
        if !matches!(self.current_graph_name, GraphName::DefaultGraph) {
            write!(writer, "\t")?;
        }
        Ok(())
    }

    fn write_triple_start(&self, q: &Quad, mut writer: impl Write) -> io::Result<()> {
        write!(
            writer,
            "{} {} {}",
            TurtleSubject {
                subject: &q.subject,
                prefixes: &self.prefixes,
            },
            self.named(&q.predicate),
            self.term(&q.object)
        )
    }

    fn term<'a>(&'a self, term: &'a Term) -> TurtleTerm<'a> {
        TurtleTerm {
            term,
            prefixes: &self.prefixes,
        }
    }

    fn named<'a>(&'a self, node: &'a NamedNode) -> TurtleNamedNode<'a> {
        TurtleNamedNode {
            node,
            prefixes: &self.prefixes,
        }
    }
}

struct TurtleNamedNode<'a> {
    node: &'a NamedNode,
    prefixes: &'a Namespaces,
}

impl fmt::Display for TurtleNamedNode<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some((prefix, local)) = self.prefixes.reduce(self.node.as_str()) {
            write!(f, "{prefix}:{local}")
        } else {
            write!(f, "{}", self.node)
        }
    }
}

struct TurtleSubject<'a> {
    subject: &'a Subject,
    prefixes: &'a Namespaces,
}

impl fmt::Display for TurtleSubject<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.subject {
            Subject::NamedNode(v) => TurtleNamedNode {
                node: v,
                prefixes: self.prefixes,
            }
            .fmt(f),
            Subject::BlankNode(v) => write!(f, "{v}"),
            Subject::Triple(t) => write!(
                f,
                "<< {} {} {} >>",
                TurtleSubject {
                    subject: &t.subject,
                    prefixes: self.prefixes,
                },
                TurtleNamedNode {
                    node: &t.predicate,
                    prefixes: self.prefixes,
                },
                TurtleTerm {
                    term: &t.object,
                    prefixes: self.prefixes,
                }
            ),
        }
    }
}

struct TurtleTerm<'a> {
    term: &'a Term,
    prefixes: &'a Namespaces,
}

impl fmt::Display for TurtleTerm<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.term {
            Term::NamedNode(v) => TurtleNamedNode {
                node: v,
                prefixes: self.prefixes,
            }
            .fmt(f),
            Term::BlankNode(v) => write!(f, "{v}"),
            Term::Literal(v) => {
                let value = v.value();
                let datatype = v.datatype();
                let inline = match datatype.as_str() {
                    xsd::BOOLEAN => is_turtle_boolean(value),
                    xsd::INTEGER => is_turtle_integer(value),
                    xsd::DECIMAL => is_turtle_decimal(value),
                    xsd::DOUBLE => is_turtle_double(value),
                    _ => false,
                };
                if inline {
                    write!(f, "{value}")
                } else if v.is_plain() || v.language().is_some() {
                    write!(f, "{v}")
                } else {
                    write!(
                        f,
                        "{}^^{}",
                        Literal::new_simple_literal(value),
                        TurtleNamedNode {
                            node: &datatype,
                            prefixes: self.prefixes,
                        }
                    )
                }
            }
            Term::Triple(t) => write!(
                f,
                "<< {} {} {} >>",
                TurtleSubject {
                    subject: &t.subject,
                    prefixes: self.prefixes,
                },
                TurtleNamedNode {
                    node: &t.predicate,
                    prefixes: self.prefixes,
                },
                TurtleTerm {
                    term: &t.object,
                    prefixes: self.prefixes,
                }
            ),
        }
    }
}

fn is_turtle_boolean(value: &str) -> bool {
    matches!(value, "true" | "false")
}

// [19]  INTEGER  ::=  [+-]? [0-9]+
fn is_turtle_integer(value: &str) -> bool {
    let digits = strip_sign(value.as_bytes());
    !digits.is_empty() && digits.iter().all(u8::is_ascii_digit)
}

// [20]  DECIMAL  ::=  [+-]? [0-9]* '.' [0-9]+
fn is_turtle_decimal(value: &str) -> bool {
    let (rest, _) = eat_digits(strip_sign(value.as_bytes()));
    let Some(fraction) = rest.strip_prefix(b".") else {
        return false;
    };
    !fraction.is_empty() && fraction.iter().all(u8::is_ascii_digit)
}

// [21]   DOUBLE    ::=  [+-]? ([0-9]+ '.' [0-9]* EXPONENT | '.' [0-9]+ EXPONENT | [0-9]+ EXPONENT)
// [154s] EXPONENT  ::=  [eE] [+-]? [0-9]+
fn is_turtle_double(value: &str) -> bool {
    let (rest, before) = eat_digits(strip_sign(value.as_bytes()));
    let (rest, after) = if let Some(fraction) = rest.strip_prefix(b".") {
        eat_digits(fraction)
    } else {
        (rest, false)
    };
    let Some(rest) = rest.strip_prefix(b"e").or_else(|| rest.strip_prefix(b"E")) else {
        return false;
    };
    let exponent = strip_sign(rest);
    (before || after) && !exponent.is_empty() && exponent.iter().all(u8::is_ascii_digit)
}

fn strip_sign(value: &[u8]) -> &[u8] {
    match value.first() {
        Some(b'+' | b'-') => &value[1..],
        _ => value,
    }
}

/// Returns the remainder after a possibly empty digit run and whether at least
/// one digit was seen.
fn eat_digits(value: &[u8]) -> (&[u8], bool) {
    let end = value
        .iter()
        .position(|b| !b.is_ascii_digit())
        .unwrap_or(value.len());
    (&value[end..], end > 0)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::panic_in_result_fn)]

    use super::*;
    use lodrdf::{BlankNode, Literal};

    #[test]
    fn serialize_groups_graphs_subjects_and_predicates() -> io::Result<()> {
        let mut serializer = TriGSerializer::new().for_writer(Vec::new());
        let s = NamedNode::new_unchecked("http://example.com/s");
        let p = NamedNode::new_unchecked("http://example.com/p");
        let p2 = NamedNode::new_unchecked("http://example.com/p2");
        let g = NamedNode::new_unchecked("http://example.com/g");
        serializer.serialize_quad(&Quad::new(
            s.clone(),
            p.clone(),
            NamedNode::new_unchecked("http://example.com/o"),
            g.clone(),
        ))?;
        serializer.serialize_quad(&Quad::new(
            s.clone(),
            p.clone(),
            Literal::new_simple_literal("foo"),
            g.clone(),
        ))?;
        serializer.serialize_quad(&Quad::new(
            s.clone(),
            p2.clone(),
            Literal::new_language_tagged_literal_unchecked("foo", "en"),
            g.clone(),
        ))?;
        serializer.serialize_quad(&Quad::new(
            BlankNode::new_unchecked("b"),
            p2.clone(),
            BlankNode::new_unchecked("b2"),
            g.clone(),
        ))?;
        serializer.serialize_quad(&Quad::new(
            BlankNode::new_unchecked("b"),
            p2.clone(),
            Literal::new_typed_literal("true", NamedNode::new_unchecked(xsd::BOOLEAN)),
            GraphName::DefaultGraph,
        ))?;
        serializer.serialize_quad(&Quad::new(
            BlankNode::new_unchecked("b"),
            p2,
            Literal::new_typed_literal("false", NamedNode::new_unchecked(xsd::BOOLEAN)),
            NamedNode::new_unchecked("http://example.com/g2"),
        ))?;
        assert_eq!(
            String::from_utf8(serializer.finish()?).unwrap(),
            "<http://example.com/g> {\n\t<http://example.com/s> <http://example.com/p> <http://example.com/o> , \"foo\" ;\n\t\t<http://example.com/p2> \"foo\"@en .\n\t_:b <http://example.com/p2> _:b2 .\n}\n_:b <http://example.com/p2> true .\n<http://example.com/g2> {\n\t_:b <http://example.com/p2> false .\n}\n"
        );
        Ok(())
    }

    #[test]
    fn serialize_with_prefixes() -> Result<(), Box<dyn std::error::Error>> {
        let mut serializer = TriGSerializer::new()
            .with_prefix("ex", "http://example.com/")?
            .for_writer(Vec::new());
        serializer.serialize_quad(&Quad::new(
            NamedNode::new("http://example.com/s")?,
            NamedNode::new("http://example.com/p")?,
            NamedNode::new("http://example.com/o")?,
            GraphName::DefaultGraph,
        ))?;
        assert_eq!(
            String::from_utf8(serializer.finish()?)?,
            "@prefix ex: <http://example.com/> .\nex:s ex:p ex:o .\n"
        );
        Ok(())
    }

    #[test]
    fn parse_graph_blocks() -> Result<(), Box<dyn std::error::Error>> {
        let file = br#"@prefix ex: <http://example.com/> .
ex:s ex:p ex:o .
ex:g { ex:s ex:p ex:o2 . }
GRAPH ex:g2 { ex:s ex:p ex:o3 }
"#;
        let quads = TriGParser::new()
            .for_slice(file)
            .collect::<Result<Vec<_>, _>>()?;
        assert_eq!(quads.len(), 3);
        assert_eq!(quads[0].graph_name, GraphName::DefaultGraph);
        assert_eq!(
            quads[1].graph_name,
            NamedNode::new("http://example.com/g")?.into()
        );
        assert_eq!(
            quads[2].graph_name,
            NamedNode::new("http://example.com/g2")?.into()
        );
        Ok(())
    }

    #[test]
    fn original_dialect_rejects_graph_keyword() {
        let file = b"GRAPH <http://example.com/g> { <http://example.com/s> <http://example.com/p> <http://example.com/o> }";
        assert!(TriGParser::new()
            .with_dialect(TriGDialect::Original)
            .for_slice(file)
            .any(|r| r.is_err()));
        assert!(TriGParser::new().for_slice(file).all(|r| r.is_ok()));
    }

    #[test]
    fn member_submission_scopes_in_block_directives() -> Result<(), Box<dyn std::error::Error>> {
        let file = br#"@prefix ex: <http://example.com/> .
<http://example.com/g> {
    @prefix ex: <http://example.org/inner/> .
    ex:s ex:p ex:o .
}
ex:s2 ex:p2 ex:o2 .
"#;
        let quads = TriGParser::new()
            .with_dialect(TriGDialect::MemberSubmission)
            .for_slice(file)
            .collect::<Result<Vec<_>, _>>()?;
        assert_eq!(quads.len(), 2);
        assert_eq!(
            quads[0].subject,
            NamedNode::new("http://example.org/inner/s")?.into()
        );
        // The in-block redeclaration must not leak out of the graph block
        assert_eq!(
            quads[1].subject,
            NamedNode::new("http://example.com/s2")?.into()
        );
        Ok(())
    }

    #[test]
    fn rdf11_rejects_in_block_directives() {
        let file = br#"<http://example.com/g> {
    @prefix ex: <http://example.org/> .
    ex:s ex:p ex:o .
}
"#;
        assert!(TriGParser::new().for_slice(file).any(|r| r.is_err()));
    }
}
