//! Utilities to write RDF graphs and datasets.

use crate::error::CapabilityError;
use crate::format::RdfFormat;
use lodrdf::{GraphName, IriParseError, Quad, Triple};
use lodrdfxml::{RdfXmlSerializer, WriterRdfXmlSerializer};
use lodttl::nquads::{NQuadsSerializer, WriterNQuadsSerializer};
use lodttl::ntriples::{NTriplesSerializer, WriterNTriplesSerializer};
use lodttl::trig::{TriGSerializer, WriterTriGSerializer};
use lodttl::turtle::{TurtleSerializer, WriterTurtleSerializer};
use std::io::{self, Write};

/// A serializer for RDF serialization formats.
///
/// The following formats are supported:
/// * [N3](https://w3c.github.io/N3/spec/) ([`RdfFormat::N3`], written as Turtle)
/// * [N-Quads](https://www.w3.org/TR/n-quads/) ([`RdfFormat::NQuads`])
/// * [N-Triples](https://www.w3.org/TR/n-triples/) ([`RdfFormat::NTriples`])
/// * [RDF/XML](https://www.w3.org/TR/rdf-syntax-grammar/) ([`RdfFormat::RdfXml`])
/// * [TriG](https://www.w3.org/TR/trig/) ([`RdfFormat::TriG`])
/// * [Turtle](https://www.w3.org/TR/turtle/) ([`RdfFormat::Turtle`])
///
/// ```
/// use lodio::{RdfFormat, RdfSerializer};
/// use lodrdf::{NamedNode, Quad};
///
/// let mut serializer = RdfSerializer::from_format(RdfFormat::NQuads).for_writer(Vec::new());
/// serializer.serialize_quad(&Quad {
///     subject: NamedNode::new("http://example.com/people#alice")?.into(),
///     predicate: NamedNode::new("http://xmlns.com/foaf/0.1/knows")?,
///     object: NamedNode::new("http://example.com/people#bob")?.into(),
///     graph_name: NamedNode::new("http://example.com/people")?.into(),
/// })?;
/// assert_eq!(serializer.finish()?, b"<http://example.com/people#alice> <http://xmlns.com/foaf/0.1/knows> <http://example.com/people#bob> <http://example.com/people> .\n");
/// # Result::<_, Box<dyn std::error::Error>>::Ok(())
/// ```
#[must_use]
pub struct RdfSerializer {
    format: RdfFormat,
    inner: InnerSerializer,
}

enum InnerSerializer {
    NQuads(NQuadsSerializer),
    NTriples(NTriplesSerializer),
    RdfXml(RdfXmlSerializer),
    TriG(TriGSerializer),
    Turtle(TurtleSerializer),
}

impl RdfSerializer {
    /// Builds a serializer for the given format.
    #[inline]
    pub fn from_format(format: RdfFormat) -> Self {
        let inner = match format {
            RdfFormat::NQuads => InnerSerializer::NQuads(NQuadsSerializer::new()),
            RdfFormat::NTriples => InnerSerializer::NTriples(NTriplesSerializer::new()),
            RdfFormat::RdfXml => InnerSerializer::RdfXml(RdfXmlSerializer::new()),
            RdfFormat::TriG => InnerSerializer::TriG(TriGSerializer::new()),
            // Turtle is a subset of N3
            RdfFormat::Turtle | RdfFormat::N3 => InnerSerializer::Turtle(TurtleSerializer::new()),
        };
        Self { format, inner }
    }

    /// The format the serializer serializes to.
    ///
    /// ```
    /// use lodio::{RdfFormat, RdfSerializer};
    ///
    /// assert_eq!(
    ///     RdfSerializer::from_format(RdfFormat::Turtle).format(),
    ///     RdfFormat::Turtle
    /// );
    /// ```
    pub fn format(&self) -> RdfFormat {
        self.format
    }

    /// If the format supports it, sets a prefix.
    ///
    /// ```
    /// use lodio::{RdfFormat, RdfSerializer};
    /// use lodrdf::vocab::rdf;
    /// use lodrdf::{NamedNode, Triple};
    ///
    /// let mut serializer = RdfSerializer::from_format(RdfFormat::Turtle)
    ///     .with_prefix("foaf", "http://xmlns.com/foaf/0.1/")?
    ///     .for_writer(Vec::new());
    /// serializer.serialize_triple(&Triple {
    ///     subject: NamedNode::new("http://example.com/people#alice")?.into(),
    ///     predicate: NamedNode::new_unchecked(rdf::TYPE),
    ///     object: NamedNode::new("http://xmlns.com/foaf/0.1/Person")?.into(),
    /// })?;
    /// let output = String::from_utf8(serializer.finish()?)?;
    /// assert!(output.starts_with("@prefix foaf: <http://xmlns.com/foaf/0.1/> ."));
    /// assert!(output.contains("foaf:Person"));
    /// # Result::<_, Box<dyn std::error::Error>>::Ok(())
    /// ```
    #[inline]
    pub fn with_prefix(
        mut self,
        prefix_name: impl Into<String>,
        prefix_iri: impl Into<String>,
    ) -> Result<Self, IriParseError> {
        self.inner = match self.inner {
            InnerSerializer::TriG(inner) => {
                InnerSerializer::TriG(inner.with_prefix(prefix_name, prefix_iri)?)
            }
            InnerSerializer::Turtle(inner) => {
                InnerSerializer::Turtle(inner.with_prefix(prefix_name, prefix_iri)?)
            }
            // The line-based formats and RDF/XML never abbreviate IRIs
            inner @ (InnerSerializer::NQuads(_)
            | InnerSerializer::NTriples(_)
            | InnerSerializer::RdfXml(_)) => inner,
        };
        Ok(self)
    }

    /// Serializes to a [`Write`] implementation.
    ///
    /// <div class="warning">Do not forget to run the [`finish`](WriterQuadSerializer::finish()) method to properly write the last bytes of the file.</div>
    ///
    /// <div class="warning">This writer does unbuffered writes. You might want to use [`BufWriter`](io::BufWriter) to avoid that.</div>
    ///
    /// ```
    /// use lodio::{RdfFormat, RdfSerializer};
    /// use lodrdf::{NamedNode, Quad};
    ///
    /// let mut serializer = RdfSerializer::from_format(RdfFormat::NQuads).for_writer(Vec::new());
    /// serializer.serialize_quad(&Quad {
    ///     subject: NamedNode::new("http://example.com/people#alice")?.into(),
    ///     predicate: NamedNode::new("http://xmlns.com/foaf/0.1/knows")?,
    ///     object: NamedNode::new("http://example.com/people#bob")?.into(),
    ///     graph_name: NamedNode::new("http://example.com/people")?.into(),
    /// })?;
    /// assert_eq!(serializer.finish()?, b"<http://example.com/people#alice> <http://xmlns.com/foaf/0.1/knows> <http://example.com/people#bob> <http://example.com/people> .\n");
    /// # Result::<_, Box<dyn std::error::Error>>::Ok(())
    /// ```
    pub fn for_writer<W: Write>(self, writer: W) -> WriterQuadSerializer<W> {
        let inner = match self.inner {
            InnerSerializer::NQuads(inner) => InnerWriter::NQuads(inner.for_writer(writer)),
            InnerSerializer::NTriples(inner) => {
                InnerWriter::NTriples(inner.for_writer(writer))
            }
            InnerSerializer::RdfXml(inner) => InnerWriter::RdfXml(inner.for_writer(writer)),
            InnerSerializer::TriG(inner) => InnerWriter::TriG(inner.for_writer(writer)),
            InnerSerializer::Turtle(inner) => InnerWriter::Turtle(inner.for_writer(writer)),
        };
        WriterQuadSerializer {
            format: self.format,
            inner,
        }
    }
}

impl From<RdfFormat> for RdfSerializer {
    fn from(format: RdfFormat) -> Self {
        Self::from_format(format)
    }
}

/// Serializes quads or triples to a [`Write`] implementation.
///
/// Can be built using [`RdfSerializer::for_writer`].
///
/// Serializing a quad in a named graph into a format that only supports
/// graphs (N-Triples, Turtle, RDF/XML...) fails with a [`CapabilityError`]
/// wrapped in an [`io::Error`]:
///
/// ```
/// use lodio::{RdfFormat, RdfSerializer};
/// use lodrdf::{NamedNode, Quad};
///
/// let mut serializer = RdfSerializer::from_format(RdfFormat::NTriples).for_writer(Vec::new());
/// let result = serializer.serialize_quad(&Quad {
///     subject: NamedNode::new("http://example.com/people#alice")?.into(),
///     predicate: NamedNode::new("http://xmlns.com/foaf/0.1/knows")?,
///     object: NamedNode::new("http://example.com/people#bob")?.into(),
///     graph_name: NamedNode::new("http://example.com/people")?.into(),
/// });
/// assert!(result.is_err());
/// # Result::<_, Box<dyn std::error::Error>>::Ok(())
/// ```
#[must_use]
pub struct WriterQuadSerializer<W: Write> {
    format: RdfFormat,
    inner: InnerWriter<W>,
}

enum InnerWriter<W: Write> {
    NQuads(WriterNQuadsSerializer<W>),
    NTriples(WriterNTriplesSerializer<W>),
    RdfXml(WriterRdfXmlSerializer<W>),
    TriG(WriterTriGSerializer<W>),
    Turtle(WriterTurtleSerializer<W>),
}

impl<W: Write> WriterQuadSerializer<W> {
    /// The format this serializer writes.
    pub fn format(&self) -> RdfFormat {
        self.format
    }

    /// Serializes a [`Quad`].
    pub fn serialize_quad(&mut self, quad: &Quad) -> io::Result<()> {
        match &mut self.inner {
            InnerWriter::NQuads(inner) => inner.serialize_quad(quad),
            InnerWriter::TriG(inner) => inner.serialize_quad(quad),
            InnerWriter::NTriples(inner) => {
                inner.serialize_triple(&to_triple(quad, self.format)?)
            }
            InnerWriter::RdfXml(inner) => {
                inner.serialize_triple(&to_triple(quad, self.format)?)
            }
            InnerWriter::Turtle(inner) => {
                inner.serialize_triple(&to_triple(quad, self.format)?)
            }
        }
    }

    /// Serializes a [`Triple`] in the default graph.
    pub fn serialize_triple(&mut self, triple: &Triple) -> io::Result<()> {
        match &mut self.inner {
            InnerWriter::NQuads(inner) => inner.serialize_quad(&in_default_graph(triple)),
            InnerWriter::TriG(inner) => inner.serialize_quad(&in_default_graph(triple)),
            InnerWriter::NTriples(inner) => inner.serialize_triple(triple),
            InnerWriter::RdfXml(inner) => inner.serialize_triple(triple),
            InnerWriter::Turtle(inner) => inner.serialize_triple(triple),
        }
    }

    /// Writes the last bytes of the file.
    ///
    /// Note that this function does not flush the writer. You need to do that if you are using a [`BufWriter`](io::BufWriter).
    pub fn finish(self) -> io::Result<W> {
        Ok(match self.inner {
            InnerWriter::NQuads(inner) => inner.finish(),
            InnerWriter::NTriples(inner) => inner.finish(),
            InnerWriter::RdfXml(inner) => inner.finish()?,
            InnerWriter::TriG(inner) => inner.finish()?,
            InnerWriter::Turtle(inner) => inner.finish()?,
        })
    }
}

fn in_default_graph(triple: &Triple) -> Quad {
    Quad {
        subject: triple.subject.clone(),
        predicate: triple.predicate.clone(),
        object: triple.object.clone(),
        graph_name: GraphName::DefaultGraph,
    }
}

fn to_triple(quad: &Quad, format: RdfFormat) -> io::Result<Triple> {
    if quad.graph_name == GraphName::DefaultGraph {
        Ok(Triple {
            subject: quad.subject.clone(),
            predicate: quad.predicate.clone(),
            object: quad.object.clone(),
        })
    } else {
        Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            CapabilityError {
                format,
                feature: "named graphs",
            },
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::RdfParser;
    use lodrdf::{Dataset, NamedNode};

    fn example_quads() -> Vec<Quad> {
        vec![
            Quad {
                subject: NamedNode::new_unchecked("http://example.com/people#alice").into(),
                predicate: NamedNode::new_unchecked("http://xmlns.com/foaf/0.1/knows"),
                object: NamedNode::new_unchecked("http://example.com/people#bob").into(),
                graph_name: GraphName::DefaultGraph,
            },
            Quad {
                subject: NamedNode::new_unchecked("http://example.com/people#alice").into(),
                predicate: NamedNode::new_unchecked("http://xmlns.com/foaf/0.1/name"),
                object: lodrdf::Literal::from("caf\u{e9}").into(),
                graph_name: NamedNode::new_unchecked("http://example.com/people").into(),
            },
        ]
    }

    #[test]
    fn dataset_formats_round_trip() -> io::Result<()> {
        for format in [RdfFormat::NQuads, RdfFormat::TriG] {
            let mut serializer = RdfSerializer::from_format(format).for_writer(Vec::new());
            for quad in example_quads() {
                serializer.serialize_quad(&quad)?;
            }
            let buffer = serializer.finish()?;

            let mut expected = Dataset::new();
            for quad in example_quads() {
                expected.insert(quad);
            }
            let mut parsed = Dataset::new();
            for quad in RdfParser::from_format(format).for_reader(buffer.as_slice()) {
                parsed.insert(quad?);
            }
            assert_eq!(parsed, expected, "round-trip failure for {format}");
        }
        Ok(())
    }

    #[test]
    fn named_graph_in_graph_format_is_an_error() {
        for format in [RdfFormat::NTriples, RdfFormat::Turtle, RdfFormat::RdfXml] {
            let mut serializer = RdfSerializer::from_format(format).for_writer(Vec::new());
            let error = serializer.serialize_quad(&example_quads()[1]).unwrap_err();
            assert_eq!(error.kind(), io::ErrorKind::InvalidInput);
        }
    }
}
