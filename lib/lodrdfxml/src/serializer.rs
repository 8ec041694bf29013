use crate::utils::{is_name_char, is_name_start_char};
use lodrdf::{NamedNode, Subject, Term, Triple};
use quick_xml::escape::escape;
use quick_xml::events::attributes::Attribute;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::name::QName;
use quick_xml::Writer;
use std::borrow::Cow;
use std::io;
use std::io::Write;

const RDF_NS: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#";
const XMLNS_NS: &str = "http://www.w3.org/2000/xmlns/";

/// A [RDF/XML](https://www.w3.org/TR/rdf-syntax-grammar/) serializer.
///
/// ```
/// use lodrdf::{NamedNode, Triple};
/// use lodrdfxml::RdfXmlSerializer;
///
/// let mut serializer = RdfXmlSerializer::new().for_writer(Vec::new());
/// serializer.serialize_triple(&Triple::new(
///     NamedNode::new("http://example.com#me")?,
///     NamedNode::new("http://www.w3.org/1999/02/22-rdf-syntax-ns#type")?,
///     NamedNode::new("http://schema.org/Person")?,
/// ))?;
/// assert_eq!(
///     b"<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<rdf:RDF xmlns:rdf=\"http://www.w3.org/1999/02/22-rdf-syntax-ns#\">\n\t<rdf:Description rdf:about=\"http://example.com#me\">\n\t\t<rdf:type rdf:resource=\"http://schema.org/Person\"/>\n\t</rdf:Description>\n</rdf:RDF>",
///     serializer.finish()?.as_slice()
/// );
/// # Result::<_, Box<dyn std::error::Error>>::Ok(())
/// ```
#[derive(Default, Clone)]
#[must_use]
pub struct RdfXmlSerializer;

impl RdfXmlSerializer {
    /// Builds a new [`RdfXmlSerializer`].
    #[inline]
    pub fn new() -> Self {
        Self
    }

    /// Writes a RDF/XML file to a [`Write`] implementation.
    ///
    /// This writer does unbuffered writes.
    #[allow(clippy::unused_self)]
    pub fn for_writer<W: Write>(self, writer: W) -> WriterRdfXmlSerializer<W> {
        WriterRdfXmlSerializer {
            writer: Writer::new_with_indent(writer, b'\t', 1),
            triples: XmlTripleWriter { open_subject: None },
        }
    }
}

/// Writes a RDF/XML file to a [`Write`] implementation.
///
/// Can be built using [`RdfXmlSerializer::for_writer`].
///
/// Statements sharing a subject are grouped under a single `rdf:Description`
/// element as long as they are serialized consecutively.
#[must_use]
pub struct WriterRdfXmlSerializer<W: Write> {
    writer: Writer<W>,
    triples: XmlTripleWriter,
}

impl<W: Write> WriterRdfXmlSerializer<W> {
    /// Writes an extra triple.
    pub fn serialize_triple(&mut self, triple: &Triple) -> io::Result<()> {
        let mut events = Vec::new();
        self.triples.write_triple(triple, &mut events)?;
        self.write_events(events)
    }

    /// Ends the write process and returns the underlying [`Write`].
    pub fn finish(mut self) -> io::Result<W> {
        let mut events = Vec::new();
        self.triples.finish(&mut events);
        self.write_events(events)?;
        Ok(self.writer.into_inner())
    }

    fn write_events(&mut self, events: Vec<Event<'_>>) -> io::Result<()> {
        for event in events {
            self.writer.write_event(event)?;
        }
        Ok(())
    }
}

/// Turns triples into XML events, keeping track of the `rdf:Description`
/// element left open for subject grouping.
struct XmlTripleWriter {
    open_subject: Option<Subject>,
}

impl XmlTripleWriter {
    fn write_triple<'a>(&mut self, triple: &'a Triple, events: &mut Vec<Event<'a>>) -> io::Result<()> {
        if self.open_subject.is_none() {
            write_document_start(events);
        }
        if self.open_subject.as_ref() != Some(&triple.subject) {
            if self.open_subject.is_some() {
                events.push(Event::End(BytesEnd::new("rdf:Description")));
            }
            events.push(Event::Start(description_start(&triple.subject)?));
            self.open_subject = Some(triple.subject.clone());
        }

        let (tag, xmlns) = property_name(&triple.predicate)?;
        let mut property = BytesStart::new(tag.clone());
        if let Some(xmlns) = xmlns {
            property.push_attribute(xmlns);
        }
        match &triple.object {
            Term::NamedNode(node) => {
                property.push_attribute(("rdf:resource", node.as_str()));
                events.push(Event::Empty(property));
            }
            Term::BlankNode(node) => {
                property.push_attribute(("rdf:nodeID", node.as_str()));
                events.push(Event::Empty(property));
            }
            Term::Literal(literal) => {
                if let Some(language) = literal.language() {
                    property.push_attribute(("xml:lang", language));
                } else if !literal.is_plain() {
                    property.push_attribute(Attribute {
                        key: QName(b"rdf:datatype"),
                        value: Cow::Owned(
                            escape(literal.datatype().as_str()).into_owned().into_bytes(),
                        ),
                    });
                }
                events.push(Event::Start(property));
                events.push(Event::Text(BytesText::new(literal.value())));
                events.push(Event::End(BytesEnd::new(tag)));
            }
            Term::Triple(_) => {
                return Err(io::Error::new(
                    io::ErrorKind::InvalidInput,
                    "RDF/XML only supports named, blank or literal objects",
                ));
            }
        }
        Ok(())
    }

    fn finish(&self, events: &mut Vec<Event<'static>>) {
        if self.open_subject.is_none() {
            write_document_start(events);
        } else {
            events.push(Event::End(BytesEnd::new("rdf:Description")));
        }
        events.push(Event::End(BytesEnd::new("rdf:RDF")));
    }
}

fn write_document_start(events: &mut Vec<Event<'_>>) {
    events.push(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)));
    let mut root = BytesStart::new("rdf:RDF");
    root.push_attribute(("xmlns:rdf", RDF_NS));
    events.push(Event::Start(root));
}

fn description_start(subject: &Subject) -> io::Result<BytesStart<'static>> {
    let mut element = BytesStart::new("rdf:Description");
    match subject {
        Subject::NamedNode(node) => element.push_attribute(("rdf:about", node.as_str())),
        Subject::BlankNode(node) => element.push_attribute(("rdf:nodeID", node.as_str())),
        Subject::Triple(_) => {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "RDF/XML only supports named or blank node subjects",
            ));
        }
    }
    Ok(element)
}

/// Derives the XML element name for a predicate, together with the `xmlns`
/// declaration to attach when the namespace is not one of the built-in ones.
fn property_name(
    predicate: &NamedNode,
) -> io::Result<(Cow<'_, str>, Option<(&'static str, &str)>)> {
    let (namespace, local) = split_iri(predicate.as_str());
    Ok(match namespace {
        RDF_NS => (Cow::Owned(format!("rdf:{local}")), None),
        XMLNS_NS => (Cow::Owned(format!("xmlns:{local}")), None),
        _ if local.is_empty() => {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!(
                    "The predicate {predicate} cannot be serialized to RDF/XML: no XML element name can be derived from it"
                ),
            ));
        }
        _ => (Cow::Borrowed(local), Some(("xmlns", namespace))),
    })
}

/// Splits an IRI into a namespace part and an XML NCName local part.
///
/// The local part starts at the first name start character following the last
/// character that cannot appear in an XML name.
fn split_iri(iri: &str) -> (&str, &str) {
    let mut local_start = None;
    for (i, c) in iri.char_indices().rev() {
        if !is_name_char(c) || c == ':' {
            return match local_start {
                Some(start) => iri.split_at(start),
                None => (iri, ""),
            };
        }
        if is_name_start_char(c) {
            local_start = Some(i);
        }
    }
    (iri, "")
}

#[cfg(test)]
mod tests {
    use super::*;
    use lodrdf::vocab::xsd;
    use lodrdf::{BlankNode, Literal, NamedNode};

    #[test]
    fn test_split_iri() {
        assert_eq!(
            split_iri("http://schema.org/Person"),
            ("http://schema.org/", "Person")
        );
        assert_eq!(split_iri("http://schema.org/"), ("http://schema.org/", ""));
        assert_eq!(
            split_iri("http://schema.org#foo"),
            ("http://schema.org#", "foo")
        );
        assert_eq!(split_iri("urn:isbn:foo"), ("urn:isbn:", "foo"));
    }

    fn serialize(triples: &[Triple]) -> io::Result<String> {
        let mut serializer = RdfXmlSerializer::new().for_writer(Vec::new());
        for triple in triples {
            serializer.serialize_triple(triple)?;
        }
        Ok(String::from_utf8(serializer.finish()?).unwrap())
    }

    #[test]
    fn groups_consecutive_triples_by_subject() -> io::Result<()> {
        let me = NamedNode::new_unchecked("http://example.com#me");
        let name = NamedNode::new_unchecked("http://schema.org/name");
        let knows = NamedNode::new_unchecked("http://schema.org/knows");
        let output = serialize(&[
            Triple::new(
                me.clone(),
                name.clone(),
                Literal::new_language_tagged_literal_unchecked("Foo", "en"),
            ),
            Triple::new(me, knows, BlankNode::new_unchecked("b0")),
            Triple::new(
                BlankNode::new_unchecked("b0"),
                name,
                Literal::new_typed_literal("42", NamedNode::new_unchecked(xsd::INTEGER)),
            ),
        ])?;
        assert_eq!(
            output,
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
             <rdf:RDF xmlns:rdf=\"http://www.w3.org/1999/02/22-rdf-syntax-ns#\">\n\
             \t<rdf:Description rdf:about=\"http://example.com#me\">\n\
             \t\t<name xmlns=\"http://schema.org/\" xml:lang=\"en\">Foo</name>\n\
             \t\t<knows xmlns=\"http://schema.org/\" rdf:nodeID=\"b0\"/>\n\
             \t</rdf:Description>\n\
             \t<rdf:Description rdf:nodeID=\"b0\">\n\
             \t\t<name xmlns=\"http://schema.org/\" rdf:datatype=\"http://www.w3.org/2001/XMLSchema#integer\">42</name>\n\
             \t</rdf:Description>\n\
             </rdf:RDF>"
        );
        Ok(())
    }

    #[test]
    fn writes_an_empty_document_without_triples() -> io::Result<()> {
        assert_eq!(
            serialize(&[])?,
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
             <rdf:RDF xmlns:rdf=\"http://www.w3.org/1999/02/22-rdf-syntax-ns#\">\n\
             </rdf:RDF>"
        );
        Ok(())
    }

    #[test]
    fn rejects_predicates_without_xml_local_name() {
        let result = serialize(&[Triple::new(
            NamedNode::new_unchecked("http://example.com/s"),
            NamedNode::new_unchecked("http://example.com/ns/"),
            NamedNode::new_unchecked("http://example.com/o"),
        )]);
        assert_eq!(result.unwrap_err().kind(), io::ErrorKind::InvalidInput);
    }

    #[test]
    fn rejects_quoted_triples() {
        let quoted = Triple::new(
            NamedNode::new_unchecked("http://example.com/s"),
            NamedNode::new_unchecked("http://example.com/ns#p"),
            NamedNode::new_unchecked("http://example.com/o"),
        );
        let result = serialize(&[Triple::new(
            NamedNode::new_unchecked("http://example.com/s"),
            NamedNode::new_unchecked("http://example.com/ns#q"),
            quoted,
        )]);
        assert_eq!(result.unwrap_err().kind(), io::ErrorKind::InvalidInput);
    }
}
