//! Utilities to read RDF graphs and datasets.

use crate::error::{RdfParseError, RdfSyntaxError};
use crate::format::RdfFormat;
use lodrdf::{BlankNode, GraphName, IriParseError, Quad, Subject, Term, Triple};
use lodrdfxml::{RdfXmlParser, ReaderRdfXmlParser, SliceRdfXmlParser};
use lodttl::n3::{N3Parser, N3Quad, N3Term, ReaderN3Parser, SliceN3Parser};
use lodttl::nquads::{NQuadsParser, ReaderNQuadsParser, SliceNQuadsParser};
use lodttl::ntriples::{NTriplesParser, ReaderNTriplesParser, SliceNTriplesParser};
use lodttl::trig::{ReaderTriGParser, SliceTriGParser, TriGParser};
use lodttl::turtle::{ReaderTurtleParser, SliceTurtleParser, TurtleParser};
use std::collections::HashMap;
use std::io::Read;

/// Parsers for RDF serialization formats.
///
/// The following formats are supported:
/// * [N3](https://w3c.github.io/N3/spec/) ([`RdfFormat::N3`])
/// * [N-Quads](https://www.w3.org/TR/n-quads/) ([`RdfFormat::NQuads`])
/// * [N-Triples](https://www.w3.org/TR/n-triples/) ([`RdfFormat::NTriples`])
/// * [RDF/XML](https://www.w3.org/TR/rdf-syntax-grammar/) ([`RdfFormat::RdfXml`])
/// * [TriG](https://www.w3.org/TR/trig/) ([`RdfFormat::TriG`])
/// * [Turtle](https://www.w3.org/TR/turtle/) ([`RdfFormat::Turtle`])
///
/// Useful options:
/// - [`with_base_iri`](Self::with_base_iri) to resolve relative IRIs against a base.
/// - [`rename_blank_nodes`](Self::rename_blank_nodes) to replace blank node ids with fresh ones so that merged graphs cannot clash.
/// - [`without_named_graphs`](Self::without_named_graphs) to parse a single graph.
/// - [`lenient`](Self::lenient) to skip some validations if the file is already known to be valid.
///
/// ```
/// use lodio::{RdfFormat, RdfParser};
///
/// let file = "<http://example.com/people#alice> <http://xmlns.com/foaf/0.1/knows> <http://example.com/people#bob> .";
///
/// let quads = RdfParser::from_format(RdfFormat::NTriples)
///     .for_reader(file.as_bytes())
///     .collect::<Result<Vec<_>, _>>()?;
///
/// assert_eq!(quads.len(), 1);
/// assert_eq!(quads[0].subject.to_string(), "<http://example.com/people#alice>");
/// # std::io::Result::Ok(())
/// ```
#[must_use]
pub struct RdfParser {
    inner: InnerParser,
    default_graph: GraphName,
    without_named_graphs: bool,
    rename_blank_nodes: bool,
}

enum InnerParser {
    N3(N3Parser),
    NQuads(NQuadsParser),
    NTriples(NTriplesParser),
    RdfXml(RdfXmlParser),
    TriG(TriGParser),
    Turtle(TurtleParser),
}

impl RdfParser {
    /// Builds a parser for the given format.
    #[inline]
    pub fn from_format(format: RdfFormat) -> Self {
        Self {
            inner: match format {
                RdfFormat::N3 => InnerParser::N3(N3Parser::new()),
                RdfFormat::NQuads => {
                    InnerParser::NQuads(NQuadsParser::new().with_quoted_triples())
                }
                RdfFormat::NTriples => {
                    InnerParser::NTriples(NTriplesParser::new().with_quoted_triples())
                }
                RdfFormat::RdfXml => InnerParser::RdfXml(RdfXmlParser::new()),
                RdfFormat::TriG => InnerParser::TriG(TriGParser::new().with_quoted_triples()),
                RdfFormat::Turtle => {
                    InnerParser::Turtle(TurtleParser::new().with_quoted_triples())
                }
            },
            default_graph: GraphName::DefaultGraph,
            without_named_graphs: false,
            rename_blank_nodes: false,
        }
    }

    /// The format the parser uses.
    ///
    /// ```
    /// use lodio::{RdfFormat, RdfParser};
    ///
    /// assert_eq!(
    ///     RdfParser::from_format(RdfFormat::Turtle).format(),
    ///     RdfFormat::Turtle
    /// );
    /// ```
    pub fn format(&self) -> RdfFormat {
        match &self.inner {
            InnerParser::N3(_) => RdfFormat::N3,
            InnerParser::NQuads(_) => RdfFormat::NQuads,
            InnerParser::NTriples(_) => RdfFormat::NTriples,
            InnerParser::RdfXml(_) => RdfFormat::RdfXml,
            InnerParser::TriG(_) => RdfFormat::TriG,
            InnerParser::Turtle(_) => RdfFormat::Turtle,
        }
    }

    /// Provides an IRI that could be used to resolve the file relative IRIs.
    ///
    /// ```
    /// use lodio::{RdfFormat, RdfParser};
    ///
    /// let file = "<#alice> <#knows> <#bob> .";
    ///
    /// let quads = RdfParser::from_format(RdfFormat::Turtle)
    ///     .with_base_iri("http://example.com/people")?
    ///     .for_reader(file.as_bytes())
    ///     .collect::<Result<Vec<_>, _>>()?;
    ///
    /// assert_eq!(quads.len(), 1);
    /// assert_eq!(quads[0].subject.to_string(), "<http://example.com/people#alice>");
    /// # Result::<_, Box<dyn std::error::Error>>::Ok(())
    /// ```
    #[inline]
    pub fn with_base_iri(mut self, base_iri: impl Into<String>) -> Result<Self, IriParseError> {
        self.inner = match self.inner {
            InnerParser::N3(p) => InnerParser::N3(p.with_base_iri(base_iri)?),
            InnerParser::RdfXml(p) => InnerParser::RdfXml(p.with_base_iri(base_iri)?),
            InnerParser::TriG(p) => InnerParser::TriG(p.with_base_iri(base_iri)?),
            InnerParser::Turtle(p) => InnerParser::Turtle(p.with_base_iri(base_iri)?),
            // Line-based formats only contain absolute IRIs
            inner @ (InnerParser::NQuads(_) | InnerParser::NTriples(_)) => inner,
        };
        Ok(self)
    }

    /// Provides the graph name that should replace the default graph in the returned quads.
    ///
    /// ```
    /// use lodio::{RdfFormat, RdfParser};
    /// use lodrdf::NamedNode;
    ///
    /// let file = "<http://example.com/people#alice> <http://xmlns.com/foaf/0.1/knows> <http://example.com/people#bob> .";
    ///
    /// let quads = RdfParser::from_format(RdfFormat::Turtle)
    ///     .with_default_graph(NamedNode::new("http://example.com/people")?)
    ///     .for_reader(file.as_bytes())
    ///     .collect::<Result<Vec<_>, _>>()?;
    ///
    /// assert_eq!(quads.len(), 1);
    /// assert_eq!(quads[0].graph_name.to_string(), "<http://example.com/people>");
    /// # Result::<_, Box<dyn std::error::Error>>::Ok(())
    /// ```
    #[inline]
    pub fn with_default_graph(mut self, default_graph: impl Into<GraphName>) -> Self {
        self.default_graph = default_graph.into();
        self
    }

    /// Makes the parser fail on named graphs.
    ///
    /// The parser is then restricted to a single [RDF graph](https://www.w3.org/TR/rdf11-concepts/#dfn-rdf-graph) instead of an [RDF dataset](https://www.w3.org/TR/rdf11-concepts/#dfn-rdf-dataset).
    ///
    /// ```
    /// use lodio::{RdfFormat, RdfParser};
    ///
    /// let file = "<http://example.com/people#alice> <http://xmlns.com/foaf/0.1/knows> <http://example.com/people#bob> <http://example.com/people> .";
    ///
    /// let parser = RdfParser::from_format(RdfFormat::NQuads).without_named_graphs();
    /// assert!(parser.for_reader(file.as_bytes()).next().unwrap().is_err());
    /// ```
    #[inline]
    pub fn without_named_graphs(mut self) -> Self {
        self.without_named_graphs = true;
        self
    }

    /// Replaces the blank node ids from the serialization with random ones.
    ///
    /// Merging the output of two parses then cannot produce accidental id clashes.
    ///
    /// ```
    /// use lodio::{RdfFormat, RdfParser};
    ///
    /// let file = "_:b0 <http://xmlns.com/foaf/0.1/name> \"Alice\" .";
    ///
    /// let result1 = RdfParser::from_format(RdfFormat::NQuads)
    ///     .rename_blank_nodes()
    ///     .for_reader(file.as_bytes())
    ///     .collect::<Result<Vec<_>, _>>()?;
    /// let result2 = RdfParser::from_format(RdfFormat::NQuads)
    ///     .rename_blank_nodes()
    ///     .for_reader(file.as_bytes())
    ///     .collect::<Result<Vec<_>, _>>()?;
    /// assert_ne!(result1, result2);
    /// # Result::<_, Box<dyn std::error::Error>>::Ok(())
    /// ```
    #[inline]
    pub fn rename_blank_nodes(mut self) -> Self {
        self.rename_blank_nodes = true;
        self
    }

    /// Assumes the file is valid to make parsing faster.
    ///
    /// It will skip some validations.
    ///
    /// Note that if the file is actually not valid, broken RDF might be emitted by the parser.
    #[inline]
    pub fn lenient(mut self) -> Self {
        self.inner = match self.inner {
            InnerParser::N3(p) => InnerParser::N3(p.lenient()),
            InnerParser::NQuads(p) => InnerParser::NQuads(p.lenient()),
            InnerParser::NTriples(p) => InnerParser::NTriples(p.lenient()),
            InnerParser::RdfXml(p) => InnerParser::RdfXml(p.lenient()),
            InnerParser::TriG(p) => InnerParser::TriG(p.lenient()),
            InnerParser::Turtle(p) => InnerParser::Turtle(p.lenient()),
        };
        self
    }

    fn mapper(&self) -> QuadMapper {
        QuadMapper {
            default_graph: self.default_graph.clone(),
            without_named_graphs: self.without_named_graphs,
            blank_node_map: self.rename_blank_nodes.then(HashMap::new),
        }
    }

    /// Parses from a [`Read`] implementation and returns an iterator of quads.
    ///
    /// Reads are buffered.
    ///
    /// ```
    /// use lodio::{RdfFormat, RdfParser};
    ///
    /// let file = "<http://example.com/people#alice> <http://xmlns.com/foaf/0.1/knows> <http://example.com/people#bob> .";
    ///
    /// let quads = RdfParser::from_format(RdfFormat::NTriples)
    ///     .for_reader(file.as_bytes())
    ///     .collect::<Result<Vec<_>, _>>()?;
    ///
    /// assert_eq!(quads.len(), 1);
    /// assert_eq!(quads[0].subject.to_string(), "<http://example.com/people#alice>");
    /// # std::io::Result::Ok(())
    /// ```
    pub fn for_reader<R: Read>(self, reader: R) -> ReaderQuadParser<R> {
        let mapper = self.mapper();
        ReaderQuadParser {
            inner: match self.inner {
                InnerParser::N3(p) => InnerReaderParser::N3(p.for_reader(reader)),
                InnerParser::NQuads(p) => InnerReaderParser::NQuads(p.for_reader(reader)),
                InnerParser::NTriples(p) => InnerReaderParser::NTriples(p.for_reader(reader)),
                InnerParser::RdfXml(p) => InnerReaderParser::RdfXml(p.for_reader(reader)),
                InnerParser::TriG(p) => InnerReaderParser::TriG(p.for_reader(reader)),
                InnerParser::Turtle(p) => InnerReaderParser::Turtle(p.for_reader(reader)),
            },
            mapper,
        }
    }

    /// Parses from a byte slice and returns an iterator of quads.
    ///
    /// ```
    /// use lodio::{RdfFormat, RdfParser};
    ///
    /// let file = "<http://example.com/people#alice> <http://xmlns.com/foaf/0.1/knows> <http://example.com/people#bob> .";
    ///
    /// let quads = RdfParser::from_format(RdfFormat::NTriples)
    ///     .for_slice(file.as_bytes())
    ///     .collect::<Result<Vec<_>, _>>()?;
    ///
    /// assert_eq!(quads.len(), 1);
    /// assert_eq!(quads[0].subject.to_string(), "<http://example.com/people#alice>");
    /// # Result::<_, lodio::RdfSyntaxError>::Ok(())
    /// ```
    pub fn for_slice(self, slice: &[u8]) -> SliceQuadParser<'_> {
        let mapper = self.mapper();
        SliceQuadParser {
            inner: match self.inner {
                InnerParser::N3(p) => InnerSliceParser::N3(p.for_slice(slice)),
                InnerParser::NQuads(p) => InnerSliceParser::NQuads(p.for_slice(slice)),
                InnerParser::NTriples(p) => InnerSliceParser::NTriples(p.for_slice(slice)),
                InnerParser::RdfXml(p) => InnerSliceParser::RdfXml(p.for_slice(slice)),
                InnerParser::TriG(p) => InnerSliceParser::TriG(p.for_slice(slice)),
                InnerParser::Turtle(p) => InnerSliceParser::Turtle(p.for_slice(slice)),
            },
            mapper,
        }
    }
}

impl From<RdfFormat> for RdfParser {
    fn from(format: RdfFormat) -> Self {
        Self::from_format(format)
    }
}

/// What a single step of a format-specific parser produced, before graph name
/// and blank node remapping are applied.
enum Parsed {
    Triple(Triple),
    Quad(Quad),
    N3(Box<N3Quad>),
}

impl QuadMapper {
    fn map_parsed(&mut self, parsed: Parsed) -> Result<Quad, RdfSyntaxError> {
        match parsed {
            Parsed::Triple(triple) => Ok(self.map_triple_to_quad(triple)),
            Parsed::Quad(quad) => self.map_quad(quad),
            Parsed::N3(quad) => self.map_n3_quad(*quad),
        }
    }
}

/// Parses an RDF file from a [`Read`] implementation.
///
/// Can be built using [`RdfParser::for_reader`].
///
/// Reads are buffered.
///
/// ```
/// use lodio::{RdfFormat, RdfParser};
///
/// let file = "<http://example.com/people#alice> <http://xmlns.com/foaf/0.1/knows> <http://example.com/people#bob> .";
///
/// let quads = RdfParser::from_format(RdfFormat::NTriples)
///     .for_reader(file.as_bytes())
///     .collect::<Result<Vec<_>, _>>()?;
///
/// assert_eq!(quads.len(), 1);
/// assert_eq!(quads[0].subject.to_string(), "<http://example.com/people#alice>");
/// # std::io::Result::Ok(())
/// ```
#[must_use]
pub struct ReaderQuadParser<R: Read> {
    inner: InnerReaderParser<R>,
    mapper: QuadMapper,
}

enum InnerReaderParser<R: Read> {
    N3(ReaderN3Parser<R>),
    NQuads(ReaderNQuadsParser<R>),
    NTriples(ReaderNTriplesParser<R>),
    RdfXml(ReaderRdfXmlParser<R>),
    TriG(ReaderTriGParser<R>),
    Turtle(ReaderTurtleParser<R>),
}

impl<R: Read> Iterator for ReaderQuadParser<R> {
    type Item = Result<Quad, RdfParseError>;

    fn next(&mut self) -> Option<Self::Item> {
        let parsed = match &mut self.inner {
            InnerReaderParser::N3(parser) => parser
                .next()?
                .map(|q| Parsed::N3(Box::new(q)))
                .map_err(RdfParseError::from),
            InnerReaderParser::NQuads(parser) => {
                parser.next()?.map(Parsed::Quad).map_err(Into::into)
            }
            InnerReaderParser::NTriples(parser) => {
                parser.next()?.map(Parsed::Triple).map_err(Into::into)
            }
            InnerReaderParser::RdfXml(parser) => {
                parser.next()?.map(Parsed::Triple).map_err(Into::into)
            }
            InnerReaderParser::TriG(parser) => {
                parser.next()?.map(Parsed::Quad).map_err(Into::into)
            }
            InnerReaderParser::Turtle(parser) => {
                parser.next()?.map(Parsed::Triple).map_err(Into::into)
            }
        };
        Some(parsed.and_then(|parsed| self.mapper.map_parsed(parsed).map_err(Into::into)))
    }
}

impl<R: Read> ReaderQuadParser<R> {
    /// The list of IRI prefixes considered at the current step of the parsing.
    ///
    /// This method returns (prefix name, prefix value) tuples.
    /// It is empty at the beginning of the parsing and gets updated when prefixes are
    /// encountered. It is empty for formats without prefix declarations.
    ///
    /// ```
    /// use lodio::{RdfFormat, RdfParser};
    ///
    /// let file = "@prefix foaf: <http://xmlns.com/foaf/0.1/> .
    /// <http://example.com/people#alice> a foaf:Person .";
    ///
    /// let mut parser = RdfParser::from_format(RdfFormat::Turtle).for_reader(file.as_bytes());
    /// assert_eq!(parser.prefixes().count(), 0); // No prefix at the beginning
    ///
    /// parser.next().unwrap()?;
    /// assert_eq!(
    ///     parser.prefixes().collect::<Vec<_>>(),
    ///     [("foaf", "http://xmlns.com/foaf/0.1/")]
    /// );
    /// # Result::<_, Box<dyn std::error::Error>>::Ok(())
    /// ```
    pub fn prefixes(&self) -> Box<dyn Iterator<Item = (&str, &str)> + '_> {
        match &self.inner {
            InnerReaderParser::N3(p) => Box::new(p.prefixes()),
            InnerReaderParser::RdfXml(p) => Box::new(p.prefixes()),
            InnerReaderParser::TriG(p) => Box::new(p.prefixes()),
            InnerReaderParser::Turtle(p) => Box::new(p.prefixes()),
            InnerReaderParser::NQuads(_) | InnerReaderParser::NTriples(_) => {
                Box::new(std::iter::empty())
            }
        }
    }

    /// The base IRI considered at the current step of the parsing, if any.
    ///
    /// ```
    /// use lodio::{RdfFormat, RdfParser};
    ///
    /// let file = "@base <http://example.com/people> .
    /// <#alice> <#knows> <#bob> .";
    ///
    /// let mut parser = RdfParser::from_format(RdfFormat::Turtle).for_reader(file.as_bytes());
    /// assert!(parser.base_iri().is_none()); // No base at the beginning
    ///
    /// parser.next().unwrap()?;
    /// assert_eq!(parser.base_iri(), Some("http://example.com/people"));
    /// # Result::<_, Box<dyn std::error::Error>>::Ok(())
    /// ```
    pub fn base_iri(&self) -> Option<&str> {
        match &self.inner {
            InnerReaderParser::N3(p) => p.base_iri(),
            InnerReaderParser::RdfXml(p) => p.base_iri(),
            InnerReaderParser::TriG(p) => p.base_iri(),
            InnerReaderParser::Turtle(p) => p.base_iri(),
            InnerReaderParser::NQuads(_) | InnerReaderParser::NTriples(_) => None,
        }
    }
}

/// Parses an RDF file from a byte slice.
///
/// Can be built using [`RdfParser::for_slice`].
///
/// ```
/// use lodio::{RdfFormat, RdfParser};
///
/// let file = "<http://example.com/people#alice> <http://xmlns.com/foaf/0.1/knows> <http://example.com/people#bob> .";
///
/// let quads = RdfParser::from_format(RdfFormat::NTriples)
///     .for_slice(file.as_bytes())
///     .collect::<Result<Vec<_>, _>>()?;
///
/// assert_eq!(quads.len(), 1);
/// assert_eq!(quads[0].subject.to_string(), "<http://example.com/people#alice>");
/// # Result::<_, lodio::RdfSyntaxError>::Ok(())
/// ```
#[must_use]
pub struct SliceQuadParser<'a> {
    inner: InnerSliceParser<'a>,
    mapper: QuadMapper,
}

enum InnerSliceParser<'a> {
    N3(SliceN3Parser<'a>),
    NQuads(SliceNQuadsParser<'a>),
    NTriples(SliceNTriplesParser<'a>),
    RdfXml(SliceRdfXmlParser<'a>),
    TriG(SliceTriGParser<'a>),
    Turtle(SliceTurtleParser<'a>),
}

impl Iterator for SliceQuadParser<'_> {
    type Item = Result<Quad, RdfSyntaxError>;

    fn next(&mut self) -> Option<Self::Item> {
        let parsed = match &mut self.inner {
            InnerSliceParser::N3(parser) => parser
                .next()?
                .map(|q| Parsed::N3(Box::new(q)))
                .map_err(RdfSyntaxError::from),
            InnerSliceParser::NQuads(parser) => {
                parser.next()?.map(Parsed::Quad).map_err(Into::into)
            }
            InnerSliceParser::NTriples(parser) => {
                parser.next()?.map(Parsed::Triple).map_err(Into::into)
            }
            InnerSliceParser::RdfXml(parser) => {
                parser.next()?.map(Parsed::Triple).map_err(Into::into)
            }
            InnerSliceParser::TriG(parser) => {
                parser.next()?.map(Parsed::Quad).map_err(Into::into)
            }
            InnerSliceParser::Turtle(parser) => {
                parser.next()?.map(Parsed::Triple).map_err(Into::into)
            }
        };
        Some(parsed.and_then(|parsed| self.mapper.map_parsed(parsed)))
    }
}

impl SliceQuadParser<'_> {
    /// The list of IRI prefixes considered at the current step of the parsing.
    ///
    /// See [`ReaderQuadParser::prefixes`].
    pub fn prefixes(&self) -> Box<dyn Iterator<Item = (&str, &str)> + '_> {
        match &self.inner {
            InnerSliceParser::N3(p) => Box::new(p.prefixes()),
            InnerSliceParser::RdfXml(p) => Box::new(p.prefixes()),
            InnerSliceParser::TriG(p) => Box::new(p.prefixes()),
            InnerSliceParser::Turtle(p) => Box::new(p.prefixes()),
            InnerSliceParser::NQuads(_) | InnerSliceParser::NTriples(_) => {
                Box::new(std::iter::empty())
            }
        }
    }

    /// The base IRI considered at the current step of the parsing, if any.
    ///
    /// See [`ReaderQuadParser::base_iri`].
    pub fn base_iri(&self) -> Option<&str> {
        match &self.inner {
            InnerSliceParser::N3(p) => p.base_iri(),
            InnerSliceParser::RdfXml(p) => p.base_iri(),
            InnerSliceParser::TriG(p) => p.base_iri(),
            InnerSliceParser::Turtle(p) => p.base_iri(),
            InnerSliceParser::NQuads(_) | InnerSliceParser::NTriples(_) => None,
        }
    }
}

/// Applies the parser options to the raw parser output: default graph
/// replacement, named graph rejection and blank node renaming.
struct QuadMapper {
    default_graph: GraphName,
    without_named_graphs: bool,
    blank_node_map: Option<HashMap<BlankNode, BlankNode>>,
}

impl QuadMapper {
    fn map_blank_node(&mut self, node: BlankNode) -> BlankNode {
        match &mut self.blank_node_map {
            Some(map) => map.entry(node).or_insert_with(BlankNode::default).clone(),
            None => node,
        }
    }

    fn map_subject(&mut self, node: Subject) -> Subject {
        match node {
            Subject::NamedNode(node) => node.into(),
            Subject::BlankNode(node) => self.map_blank_node(node).into(),
            Subject::Triple(triple) => self.map_triple(*triple).into(),
        }
    }

    fn map_term(&mut self, node: Term) -> Term {
        match node {
            Term::NamedNode(node) => node.into(),
            Term::BlankNode(node) => self.map_blank_node(node).into(),
            Term::Literal(literal) => literal.into(),
            Term::Triple(triple) => self.map_triple(*triple).into(),
        }
    }

    fn map_triple(&mut self, triple: Triple) -> Triple {
        Triple {
            subject: self.map_subject(triple.subject),
            predicate: triple.predicate,
            object: self.map_term(triple.object),
        }
    }

    fn map_graph_name(&mut self, graph_name: GraphName) -> Result<GraphName, RdfSyntaxError> {
        if self.without_named_graphs && !graph_name.is_default_graph() {
            return Err(RdfSyntaxError::msg("Named graphs are not allowed"));
        }
        Ok(match graph_name {
            GraphName::NamedNode(node) => node.into(),
            GraphName::BlankNode(node) => self.map_blank_node(node).into(),
            GraphName::DefaultGraph => self.default_graph.clone(),
        })
    }

    fn map_quad(&mut self, quad: Quad) -> Result<Quad, RdfSyntaxError> {
        Ok(Quad {
            subject: self.map_subject(quad.subject),
            predicate: quad.predicate,
            object: self.map_term(quad.object),
            graph_name: self.map_graph_name(quad.graph_name)?,
        })
    }

    fn map_triple_to_quad(&mut self, triple: Triple) -> Quad {
        self.map_triple(triple).in_graph(self.default_graph.clone())
    }

    fn map_n3_quad(&mut self, quad: N3Quad) -> Result<Quad, RdfSyntaxError> {
        let subject = match quad.subject {
            N3Term::NamedNode(s) => Subject::from(s),
            N3Term::BlankNode(s) => self.map_blank_node(s).into(),
            N3Term::Triple(s) => self.map_triple(*s).into(),
            N3Term::Literal(_) => {
                return Err(RdfSyntaxError::msg(
                    "literals are not allowed in regular RDF subjects",
                ));
            }
            N3Term::Variable(_) => {
                return Err(RdfSyntaxError::msg(
                    "variables are not allowed in regular RDF subjects",
                ));
            }
        };
        let N3Term::NamedNode(predicate) = quad.predicate else {
            return Err(RdfSyntaxError::msg(
                "only IRIs are allowed in regular RDF predicates",
            ));
        };
        let object = match quad.object {
            N3Term::NamedNode(o) => Term::from(o),
            N3Term::BlankNode(o) => self.map_blank_node(o).into(),
            N3Term::Literal(o) => o.into(),
            N3Term::Triple(o) => self.map_triple(*o).into(),
            N3Term::Variable(_) => {
                return Err(RdfSyntaxError::msg(
                    "variables are not allowed in regular RDF objects",
                ));
            }
        };
        Ok(Quad {
            subject,
            predicate,
            object,
            graph_name: self.map_graph_name(quad.graph_name)?,
        })
    }
}
