use crate::error::{RdfXmlParseError, RdfXmlSyntaxError};
use crate::utils::is_nc_name;
use lodrdf::vocab::rdf;
use lodrdf::{BlankNode, Literal, NamedNode, Subject, Term, Triple};
use oxilangtag::LanguageTag;
use oxiri::{Iri, IriParseError};
use quick_xml::escape::{resolve_xml_entity, unescape_with};
use quick_xml::events::attributes::Attribute;
use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use quick_xml::name::{LocalName, PrefixDeclaration, PrefixIter, QName, ResolveResult};
use quick_xml::{Decoder, NsReader, Writer};
use std::borrow::Cow;
use std::collections::{HashMap, HashSet};
use std::io::{BufReader, Read};
use std::str;

/// A [RDF/XML](https://www.w3.org/TR/rdf-syntax-grammar/) streaming parser.
///
/// The parser reads the file in streaming. It keeps in memory only a stack for
/// the nested XML elements and the set of already seen `rdf:ID` values, used to
/// detect duplicate ids.
///
/// RDF constructs are recognized by their expanded namespace name, never by the
/// prefix they are spelled with.
///
/// Count the number of people:
/// ```
/// use lodrdf::vocab::rdf;
/// use lodrdf::NamedNode;
/// use lodrdfxml::RdfXmlParser;
///
/// let file = r#"<?xml version="1.0"?>
/// <rdf:RDF xmlns:rdf="http://www.w3.org/1999/02/22-rdf-syntax-ns#" xmlns:schema="http://schema.org/">
///  <rdf:Description rdf:about="http://example.com/foo">
///    <rdf:type rdf:resource="http://schema.org/Person" />
///    <schema:name>Foo</schema:name>
///  </rdf:Description>
///  <schema:Person rdf:about="http://example.com/bar" schema:name="Bar" />
/// </rdf:RDF>"#;
///
/// let rdf_type = NamedNode::new_unchecked(rdf::TYPE);
/// let schema_person = NamedNode::new("http://schema.org/Person")?;
/// let mut count = 0;
/// for triple in RdfXmlParser::new().for_reader(file.as_bytes()) {
///     let triple = triple?;
///     if triple.predicate == rdf_type && triple.object == schema_person.clone().into() {
///         count += 1;
///     }
/// }
/// assert_eq!(2, count);
/// # Result::<_, Box<dyn std::error::Error>>::Ok(())
/// ```
#[derive(Default, Clone)]
#[must_use]
pub struct RdfXmlParser {
    lenient: bool,
    base: Option<Iri<String>>,
    custom_entities: bool,
}

impl RdfXmlParser {
    /// Builds a new [`RdfXmlParser`].
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Assumes the file is valid to make parsing faster.
    ///
    /// It will skip some validations.
    ///
    /// Note that if the file is actually not valid, the parser might emit broken RDF.
    #[inline]
    pub fn lenient(mut self) -> Self {
        self.lenient = true;
        self
    }

    /// Base IRI to resolve the relative IRIs in the file against.
    #[inline]
    pub fn with_base_iri(mut self, base_iri: impl Into<String>) -> Result<Self, IriParseError> {
        self.base = Some(Iri::parse(base_iri.into())?);
        Ok(self)
    }

    /// Allows `<!ENTITY>` declarations in the internal DTD subset.
    ///
    /// Entity declarations are disabled by default: a document carrying them is
    /// rejected, and any entity reference that is not one of the predefined XML
    /// entities fails the parse.
    #[inline]
    pub fn with_custom_entities(mut self) -> Self {
        self.custom_entities = true;
        self
    }

    /// Parses a RDF/XML file from a [`Read`] implementation.
    pub fn for_reader<R: Read>(self, reader: R) -> ReaderRdfXmlParser<R> {
        ReaderRdfXmlParser {
            results: Vec::new(),
            parser: self.into_inner(BufReader::new(reader)),
            reader_buffer: Vec::default(),
        }
    }

    /// Parses a RDF/XML file from a byte slice.
    pub fn for_slice(self, slice: &(impl AsRef<[u8]> + ?Sized)) -> SliceRdfXmlParser<'_> {
        SliceRdfXmlParser {
            results: Vec::new(),
            parser: self.into_inner(slice.as_ref()),
        }
    }

    fn into_inner<T>(self, reader: T) -> InnerRdfXmlParser<T> {
        let mut reader = NsReader::from_reader(reader);
        reader.config_mut().expand_empty_elements = true;
        InnerRdfXmlParser {
            reader,
            stack: vec![ElementFrame::Doc { base: self.base }],
            entities: HashMap::new(),
            allow_entities: self.custom_entities,
            literal_depth: 0,
            seen_ids: HashSet::default(),
            done: false,
            lenient: self.lenient,
        }
    }
}

/// Parses a RDF/XML file from a [`Read`] implementation.
///
/// Can be built using [`RdfXmlParser::for_reader`].
#[must_use]
pub struct ReaderRdfXmlParser<R: Read> {
    results: Vec<Triple>,
    parser: InnerRdfXmlParser<BufReader<R>>,
    reader_buffer: Vec<u8>,
}

impl<R: Read> Iterator for ReaderRdfXmlParser<R> {
    type Item = Result<Triple, RdfXmlParseError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(triple) = self.results.pop() {
                return Some(Ok(triple));
            } else if self.parser.done {
                return None;
            }
            if let Err(e) = self.parse_step() {
                return Some(Err(e));
            }
        }
    }
}

impl<R: Read> ReaderRdfXmlParser<R> {
    /// The list of namespace prefixes in scope at the current step of the parsing.
    ///
    /// This method returns (prefix name, prefix value) tuples.
    /// It is empty at the beginning of the parsing and gets updated when prefix
    /// declarations are encountered.
    ///
    /// ```
    /// use lodrdfxml::RdfXmlParser;
    ///
    /// let file = r#"<?xml version="1.0"?>
    /// <rdf:RDF xmlns:rdf="http://www.w3.org/1999/02/22-rdf-syntax-ns#" xmlns:schema="http://schema.org/">
    ///  <rdf:Description rdf:about="http://example.com/foo">
    ///    <schema:name>Foo</schema:name>
    ///  </rdf:Description>
    /// </rdf:RDF>"#;
    ///
    /// let mut parser = RdfXmlParser::new().for_reader(file.as_bytes());
    /// assert_eq!(parser.prefixes().collect::<Vec<_>>(), []);
    ///
    /// parser.next().unwrap()?; // We read the first triple
    /// assert_eq!(
    ///     parser.prefixes().collect::<Vec<_>>(),
    ///     [
    ///         ("rdf", "http://www.w3.org/1999/02/22-rdf-syntax-ns#"),
    ///         ("schema", "http://schema.org/")
    ///     ]
    /// );
    /// # Result::<_, Box<dyn std::error::Error>>::Ok(())
    /// ```
    pub fn prefixes(&self) -> RdfXmlPrefixesIter<'_> {
        RdfXmlPrefixesIter {
            inner: self.parser.reader.prefixes(),
            decoder: self.parser.reader.decoder(),
            lenient: self.parser.lenient,
        }
    }

    /// The base IRI in scope at the current step of the parsing.
    pub fn base_iri(&self) -> Option<&str> {
        Some(self.parser.current_base()?.as_str())
    }

    /// The current byte position in the input data.
    pub fn buffer_position(&self) -> u64 {
        self.parser.reader.buffer_position()
    }

    fn parse_step(&mut self) -> Result<(), RdfXmlParseError> {
        self.reader_buffer.clear();
        let event = self
            .parser
            .reader
            .read_event_into(&mut self.reader_buffer)?;
        self.parser.parse_event(event, &mut self.results)
    }
}

/// Parses a RDF/XML file from a byte slice.
///
/// Can be built using [`RdfXmlParser::for_slice`].
#[must_use]
pub struct SliceRdfXmlParser<'a> {
    results: Vec<Triple>,
    parser: InnerRdfXmlParser<&'a [u8]>,
}

impl Iterator for SliceRdfXmlParser<'_> {
    type Item = Result<Triple, RdfXmlSyntaxError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(triple) = self.results.pop() {
                return Some(Ok(triple));
            } else if self.parser.done {
                return None;
            }
            if let Err(e) = self.parse_step() {
                return Some(Err(match e {
                    RdfXmlParseError::Syntax(e) => e,
                    // I/O errors can't happen when reading from a slice
                    RdfXmlParseError::Io(e) => RdfXmlSyntaxError::msg(e.to_string()),
                }));
            }
        }
    }
}

impl SliceRdfXmlParser<'_> {
    /// The list of namespace prefixes in scope at the current step of the parsing.
    ///
    /// This method returns (prefix name, prefix value) tuples.
    pub fn prefixes(&self) -> RdfXmlPrefixesIter<'_> {
        RdfXmlPrefixesIter {
            inner: self.parser.reader.prefixes(),
            decoder: self.parser.reader.decoder(),
            lenient: self.parser.lenient,
        }
    }

    /// The base IRI in scope at the current step of the parsing.
    pub fn base_iri(&self) -> Option<&str> {
        Some(self.parser.current_base()?.as_str())
    }

    /// The current byte position in the input data.
    pub fn buffer_position(&self) -> u64 {
        self.parser.reader.buffer_position()
    }

    fn parse_step(&mut self) -> Result<(), RdfXmlParseError> {
        let event = self.parser.reader.read_event()?;
        self.parser.parse_event(event, &mut self.results)
    }
}

/// Iterator on the parsed namespace prefixes.
///
/// See [`ReaderRdfXmlParser::prefixes`].
pub struct RdfXmlPrefixesIter<'a> {
    inner: PrefixIter<'a>,
    decoder: Decoder,
    lenient: bool,
}

impl RdfXmlPrefixesIter<'_> {
    /// Decodes without allocating. Declarations needing unescaping or
    /// transcoding can't be returned as borrowed strings and are skipped.
    fn decode<'v>(&self, value: &'v [u8]) -> Option<&'v str> {
        let Cow::Borrowed(value) = self.decoder.decode(value).ok()? else {
            return None;
        };
        match unescape_with(value, |_| None).ok()? {
            Cow::Borrowed(value) => Some(value),
            Cow::Owned(_) => None,
        }
    }
}

impl<'a> Iterator for RdfXmlPrefixesIter<'a> {
    type Item = (&'a str, &'a str);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let (key, value) = self.inner.next()?;
            let prefix = match key {
                PrefixDeclaration::Default => "",
                PrefixDeclaration::Named(name) => {
                    let Some(name) = self.decode(name) else {
                        continue;
                    };
                    if !self.lenient && !is_nc_name(name) {
                        continue; // We don't return invalid prefixes
                    }
                    name
                }
            };
            let Some(iri) = self.decode(value.0) else {
                continue;
            };
            if !self.lenient && Iri::parse(iri).is_err() {
                continue; // We don't return invalid prefixes
            }
            return Some((prefix, iri));
        }
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

macro_rules! rdf_iri {
    ($local:literal) => {
        concat!("http://www.w3.org/1999/02/22-rdf-syntax-ns#", $local)
    };
}

const RDF_ABOUT: &str = rdf_iri!("about");
const RDF_ABOUT_EACH: &str = rdf_iri!("aboutEach");
const RDF_ABOUT_EACH_PREFIX: &str = rdf_iri!("aboutEachPrefix");
const RDF_BAG_ID: &str = rdf_iri!("bagID");
const RDF_DATATYPE: &str = rdf_iri!("datatype");
const RDF_DESCRIPTION: &str = rdf_iri!("Description");
const RDF_ID: &str = rdf_iri!("ID");
const RDF_LI: &str = rdf_iri!("li");
const RDF_NODE_ID: &str = rdf_iri!("nodeID");
const RDF_PARSE_TYPE: &str = rdf_iri!("parseType");
const RDF_RDF: &str = rdf_iri!("RDF");
const RDF_RESOURCE: &str = rdf_iri!("resource");

/// Names that are never valid as node or property element names.
fn is_reserved_element_name(name: &str) -> bool {
    matches!(
        name,
        RDF_ABOUT
            | RDF_ABOUT_EACH
            | RDF_ABOUT_EACH_PREFIX
            | RDF_BAG_ID
            | RDF_DATATYPE
            | RDF_ID
            | RDF_LI
            | RDF_NODE_ID
            | RDF_PARSE_TYPE
            | RDF_RDF
            | RDF_RESOURCE
    )
}

fn is_reserved_attribute_name(name: &str) -> bool {
    matches!(
        name,
        RDF_ABOUT_EACH | RDF_ABOUT_EACH_PREFIX | RDF_LI | RDF_RDF | RDF_RESOURCE
    )
}

#[derive(Clone, Debug)]
enum PropertyObject {
    Resource(Subject),
    Literal(String),
}

enum ElementFrame {
    Doc {
        base: Option<Iri<String>>,
    },
    Rdf {
        base: Option<Iri<String>>,
        language: Option<String>,
    },
    Node {
        base: Option<Iri<String>>,
        language: Option<String>,
        subject: Subject,
        next_li: u64,
    },
    // Resource, literal or empty property element
    Property {
        predicate: NamedNode,
        base: Option<Iri<String>>,
        language: Option<String>,
        subject: Subject,
        object: Option<PropertyObject>,
        reify_id: Option<NamedNode>,
        datatype: Option<NamedNode>,
    },
    CollectionProperty {
        predicate: NamedNode,
        base: Option<Iri<String>>,
        language: Option<String>,
        subject: Subject,
        items: Vec<Subject>,
        reify_id: Option<NamedNode>,
    },
    LiteralProperty {
        predicate: NamedNode,
        base: Option<Iri<String>>,
        language: Option<String>,
        subject: Subject,
        writer: Writer<Vec<u8>>,
        reify_id: Option<NamedNode>,
        emit: bool, // false for parseType="Other"
    },
}

impl ElementFrame {
    fn language(&self) -> Option<&str> {
        match self {
            Self::Doc { .. } => None,
            Self::Rdf { language, .. }
            | Self::Node { language, .. }
            | Self::Property { language, .. }
            | Self::CollectionProperty { language, .. }
            | Self::LiteralProperty { language, .. } => language.as_deref(),
        }
    }

    fn base(&self) -> Option<&Iri<String>> {
        match self {
            Self::Doc { base }
            | Self::Rdf { base, .. }
            | Self::Node { base, .. }
            | Self::Property { base, .. }
            | Self::CollectionProperty { base, .. }
            | Self::LiteralProperty { base, .. } => base.as_ref(),
        }
    }
}

#[derive(Default, PartialEq, Eq, Clone, Copy)]
enum ParseHint {
    #[default]
    Plain,
    Collection,
    Literal,
    Resource,
    Opaque,
}

/// The RDF-relevant attributes of a single element start tag.
#[derive(Default)]
struct ElementAttributes {
    language: Option<String>,
    base: Option<Iri<String>>,
    id: Option<String>,
    node_id: Option<BlankNode>,
    about: Option<String>,
    resource: Option<String>,
    datatype: Option<String>,
    type_iri: Option<String>,
    parse_type: ParseHint,
    properties: Vec<(NamedNode, String)>,
}

struct InnerRdfXmlParser<R> {
    reader: NsReader<R>,
    stack: Vec<ElementFrame>,
    entities: HashMap<String, String>,
    allow_entities: bool,
    literal_depth: usize,
    seen_ids: HashSet<String>,
    done: bool,
    lenient: bool,
}

impl<R> InnerRdfXmlParser<R> {
    fn parse_event(
        &mut self,
        event: Event<'_>,
        results: &mut Vec<Triple>,
    ) -> Result<(), RdfXmlParseError> {
        match event {
            Event::Start(event) => self.parse_start_event(&event, results),
            Event::End(event) => self.parse_end_event(&event, results),
            Event::Text(event) => self.parse_text_event(&event),
            Event::CData(event) => self.parse_text_event(&event.escape()?),
            Event::Decl(decl) => {
                if let Some(encoding) = decl.encoding().transpose()? {
                    if !declares_utf8(&encoding) {
                        return Err(RdfXmlSyntaxError::msg(
                            "Only UTF-8 is supported by the RDF/XML parser",
                        )
                        .into());
                    }
                }
                Ok(())
            }
            Event::DocType(dt) => self.parse_doctype(&dt),
            Event::Empty(_) => Err(RdfXmlSyntaxError::msg(
                "The expand_empty_elements option must be enabled",
            )
            .into()),
            Event::Comment(_) | Event::PI(_) => Ok(()),
            Event::Eof => {
                self.done = true;
                Ok(())
            }
        }
    }

    fn parse_doctype(&mut self, dt: &BytesText<'_>) -> Result<(), RdfXmlParseError> {
        let text = self.reader.decoder().decode(dt.as_ref())?;
        let mut rest = text.as_ref();
        while let Some(start) = rest.find("<!ENTITY") {
            if !self.allow_entities {
                return Err(RdfXmlSyntaxError::msg(
                    "<!ENTITY declarations are only supported when custom entities are enabled",
                )
                .into());
            }
            rest = rest[start + "<!ENTITY".len()..].trim_start();
            // Parameter entities are declared with a leading %
            if let Some(after_percent) = rest.strip_prefix('%') {
                rest = after_percent.trim_start();
            }
            let name_end = rest
                .find(|c: char| c.is_ascii_whitespace())
                .ok_or_else(|| {
                    RdfXmlSyntaxError::msg(
                        "<!ENTITY declarations should contain both an entity name and an entity value",
                    )
                })?;
            let name = &rest[..name_end];
            rest = rest[name_end..].trim_start().strip_prefix('"').ok_or_else(|| {
                RdfXmlSyntaxError::msg("<!ENTITY values should be enclosed in double quotes")
            })?;
            let value_end = rest.find('"').ok_or_else(|| {
                RdfXmlSyntaxError::msg(
                    "<!ENTITY declarations values should be enclosed in double quotes",
                )
            })?;
            let raw_value = &rest[..value_end];
            rest = rest[value_end + 1..]
                .trim_start()
                .strip_prefix('>')
                .ok_or_else(|| {
                    RdfXmlSyntaxError::msg("<!ENTITY declarations values should end with >")
                })?;

            // Entity values may reference already declared entities
            let value = unescape_with(raw_value, |e| self.lookup_entity(e))?.to_string();
            self.entities.insert(name.to_owned(), value);
        }
        Ok(())
    }

    fn parse_start_event(
        &mut self,
        event: &BytesStart<'_>,
        results: &mut Vec<Triple>,
    ) -> Result<(), RdfXmlParseError> {
        // Inside of a rdf:XMLLiteral the XML is copied verbatim
        if let Some(ElementFrame::LiteralProperty { .. }) = self.stack.last() {
            return self.copy_start_to_literal(event);
        }

        let tag_name = self.expanded_name(event.name(), false)?;
        let attrs = self.scan_attributes(event)?;
        let base = attrs.base;

        let reify_id = match attrs.id {
            Some(id) => {
                let iri = self.resolve_iri(base.as_ref(), id)?;
                if !self.lenient && !self.seen_ids.insert(iri.as_str().into()) {
                    return Err(RdfXmlSyntaxError::msg(format!(
                        "{iri} has already been used as rdf:ID value"
                    ))
                    .into());
                }
                Some(iri)
            }
            None => None,
        };
        let about = attrs
            .about
            .map(|v| self.resolve_iri(base.as_ref(), v))
            .transpose()?;
        let resource = attrs
            .resource
            .map(|v| self.resolve_iri(base.as_ref(), v))
            .transpose()?;
        let datatype = attrs
            .datatype
            .map(|v| self.resolve_iri(base.as_ref(), v))
            .transpose()?;
        let type_iri = attrs
            .type_iri
            .map(|v| self.resolve_iri(base.as_ref(), v))
            .transpose()?;

        let frame = match self.stack.last() {
            Some(ElementFrame::Doc { .. }) => {
                if tag_name == RDF_RDF {
                    ElementFrame::Rdf {
                        base,
                        language: attrs.language,
                    }
                } else {
                    self.open_node_element(
                        tag_name,
                        base,
                        attrs.language,
                        reify_id,
                        attrs.node_id,
                        about,
                        type_iri,
                        attrs.properties,
                        results,
                    )?
                }
            }
            Some(
                ElementFrame::Rdf { .. }
                | ElementFrame::Property { .. }
                | ElementFrame::CollectionProperty { .. },
            ) => self.open_node_element(
                tag_name,
                base,
                attrs.language,
                reify_id,
                attrs.node_id,
                about,
                type_iri,
                attrs.properties,
                results,
            )?,
            Some(ElementFrame::Node { subject, .. }) => {
                let subject = subject.clone();
                self.open_property_element(
                    tag_name,
                    base,
                    attrs.language,
                    subject,
                    reify_id,
                    attrs.node_id,
                    resource,
                    datatype,
                    type_iri,
                    attrs.parse_type,
                    attrs.properties,
                    results,
                )?
            }
            Some(ElementFrame::LiteralProperty { .. }) => {
                return Err(RdfXmlSyntaxError::msg(
                    "rdf:parseType=\"Literal\" content should not be parsed as RDF/XML",
                )
                .into());
            }
            None => {
                return Err(RdfXmlSyntaxError::msg(
                    "No state in the stack: the XML is not balanced",
                )
                .into());
            }
        };
        self.stack.push(frame);
        Ok(())
    }

    /// Forwards a start tag into the buffer of the enclosing `rdf:XMLLiteral`.
    ///
    /// The namespaces in scope are redeclared on the root of the literal so
    /// that the buffered XML stays self-contained.
    fn copy_start_to_literal(&mut self, event: &BytesStart<'_>) -> Result<(), RdfXmlParseError> {
        let name = self
            .reader
            .decoder()
            .decode(event.name().as_ref())?
            .to_string();
        let mut copy = BytesStart::new(name);
        for attribute in event.attributes() {
            copy.push_attribute(attribute?);
        }
        if self.literal_depth == 0 {
            for (prefix, namespace) in self.reader.prefixes() {
                let key = match prefix {
                    PrefixDeclaration::Default => b"xmlns".to_vec(),
                    PrefixDeclaration::Named(name) => {
                        let mut key = Vec::with_capacity(6 + name.len());
                        key.extend_from_slice(b"xmlns:");
                        key.extend_from_slice(name);
                        key
                    }
                };
                copy.push_attribute((key.as_slice(), namespace.into_inner()));
            }
        }
        if let Some(ElementFrame::LiteralProperty { writer, .. }) = self.stack.last_mut() {
            writer.write_event(Event::Start(copy))?;
            self.literal_depth += 1;
        }
        Ok(())
    }

    fn parse_end_event(
        &mut self,
        event: &BytesEnd<'_>,
        results: &mut Vec<Triple>,
    ) -> Result<(), RdfXmlParseError> {
        // Inside of a rdf:XMLLiteral the XML is copied verbatim
        if self.literal_depth > 0 {
            if let Some(ElementFrame::LiteralProperty { writer, .. }) = self.stack.last_mut() {
                writer.write_event(Event::End(BytesEnd::new(
                    self.reader.decoder().decode(event.name().as_ref())?,
                )))?;
                self.literal_depth -= 1;
                return Ok(());
            }
        }

        if let Some(frame) = self.stack.pop() {
            self.close_frame(frame, results)?;
        }
        Ok(())
    }

    fn parse_text_event(&mut self, event: &BytesText<'_>) -> Result<(), RdfXmlParseError> {
        let text = event.unescape_with(|e| self.lookup_entity(e))?.to_string();
        match self.stack.last_mut() {
            Some(ElementFrame::Property { object, .. }) if !object_is_set(object) => {
                *object = Some(PropertyObject::Literal(text));
                Ok(())
            }
            Some(ElementFrame::LiteralProperty { writer, .. }) => {
                writer.write_event(Event::Text(BytesText::new(&text)))?;
                Ok(())
            }
            _ if text.bytes().all(is_whitespace) => Ok(()),
            _ => Err(RdfXmlSyntaxError::msg(format!("Unexpected text event: '{text}'")).into()),
        }
    }

    fn scan_attributes(
        &self,
        event: &BytesStart<'_>,
    ) -> Result<ElementAttributes, RdfXmlParseError> {
        let mut attrs = ElementAttributes::default();
        for attribute in event.attributes() {
            let attribute = attribute?;
            if attribute.key.as_ref().starts_with(b"xml") {
                match attribute.key.as_ref() {
                    b"xml:lang" => {
                        let tag = self.attribute_value(&attribute)?.to_ascii_lowercase();
                        attrs.language = Some(if self.lenient {
                            tag
                        } else {
                            LanguageTag::parse(tag.clone())
                                .map_err(|error| {
                                    RdfXmlSyntaxError::invalid_language_tag(tag, error)
                                })?
                                .into_inner()
                        });
                    }
                    b"xml:base" => {
                        let iri = self.attribute_value(&attribute)?;
                        attrs.base = Some(if self.lenient {
                            Iri::parse_unchecked(iri)
                        } else {
                            Iri::parse(iri.clone())
                                .map_err(|error| RdfXmlSyntaxError::invalid_iri(iri, error))?
                        });
                    }
                    _ => (), // Other xml:* attributes are not relevant to RDF
                }
                continue;
            }
            let name = self.expanded_name(attribute.key, true)?;
            match name.as_str() {
                RDF_ID => {
                    let id = self.attribute_value(&attribute)?;
                    if !is_nc_name(&id) {
                        return Err(RdfXmlSyntaxError::msg(format!(
                            "{id} is not a valid rdf:ID value"
                        ))
                        .into());
                    }
                    attrs.id = Some(format!("#{id}"));
                }
                RDF_BAG_ID => {
                    let bag_id = self.attribute_value(&attribute)?;
                    if !is_nc_name(&bag_id) {
                        return Err(RdfXmlSyntaxError::msg(format!(
                            "{bag_id} is not a valid rdf:bagID value"
                        ))
                        .into());
                    }
                }
                RDF_NODE_ID => {
                    let id = self.attribute_value(&attribute)?;
                    if !is_nc_name(&id) {
                        return Err(RdfXmlSyntaxError::msg(format!(
                            "{id} is not a valid rdf:nodeID value"
                        ))
                        .into());
                    }
                    attrs.node_id = Some(BlankNode::new_unchecked(id));
                }
                RDF_ABOUT => attrs.about = Some(self.attribute_value(&attribute)?),
                RDF_RESOURCE => attrs.resource = Some(self.attribute_value(&attribute)?),
                RDF_DATATYPE => attrs.datatype = Some(self.attribute_value(&attribute)?),
                RDF_PARSE_TYPE => {
                    attrs.parse_type = match attribute.value.as_ref() {
                        b"Collection" => ParseHint::Collection,
                        b"Literal" => ParseHint::Literal,
                        b"Resource" => ParseHint::Resource,
                        _ => ParseHint::Opaque,
                    };
                }
                rdf::TYPE => attrs.type_iri = Some(self.attribute_value(&attribute)?),
                reserved if is_reserved_attribute_name(reserved) => {
                    return Err(RdfXmlSyntaxError::msg(format!(
                        "{reserved} is not a valid attribute"
                    ))
                    .into());
                }
                _ => {
                    let value = self.attribute_value(&attribute)?;
                    attrs.properties.push((self.validate_iri(name)?, value));
                }
            }
        }
        Ok(attrs)
    }

    #[allow(clippy::too_many_arguments)]
    fn open_node_element(
        &self,
        tag_name: String,
        base: Option<Iri<String>>,
        language: Option<String>,
        id: Option<NamedNode>,
        node_id: Option<BlankNode>,
        about: Option<NamedNode>,
        type_iri: Option<NamedNode>,
        properties: Vec<(NamedNode, String)>,
        results: &mut Vec<Triple>,
    ) -> Result<ElementFrame, RdfXmlParseError> {
        if is_reserved_element_name(&tag_name) {
            return Err(RdfXmlSyntaxError::msg(format!(
                "Invalid node element tag name: {tag_name}"
            ))
            .into());
        }
        let iri = self.validate_iri(tag_name)?;

        let subject: Subject = match (id, node_id, about) {
            (Some(id), None, None) => id.into(),
            (None, Some(node_id), None) => node_id.into(),
            (None, None, Some(about)) => about.into(),
            (None, None, None) => BlankNode::default().into(),
            _ => {
                return Err(RdfXmlSyntaxError::msg(
                    "rdf:ID, rdf:nodeID and rdf:about are mutually exclusive",
                )
                .into());
            }
        };

        self.push_literal_triples(&subject, properties, language.as_deref(), results);

        if let Some(type_iri) = type_iri {
            results.push(Triple::new(
                subject.clone(),
                NamedNode::new_unchecked(rdf::TYPE),
                type_iri,
            ));
        }
        if iri.as_str() != RDF_DESCRIPTION {
            results.push(Triple::new(
                subject.clone(),
                NamedNode::new_unchecked(rdf::TYPE),
                iri,
            ));
        }
        Ok(ElementFrame::Node {
            base,
            language,
            subject,
            next_li: 0,
        })
    }

    #[allow(clippy::too_many_arguments)]
    fn open_property_element(
        &mut self,
        tag_name: String,
        base: Option<Iri<String>>,
        language: Option<String>,
        subject: Subject,
        reify_id: Option<NamedNode>,
        node_id: Option<BlankNode>,
        resource: Option<NamedNode>,
        datatype: Option<NamedNode>,
        type_iri: Option<NamedNode>,
        parse_type: ParseHint,
        properties: Vec<(NamedNode, String)>,
        results: &mut Vec<Triple>,
    ) -> Result<ElementFrame, RdfXmlParseError> {
        let predicate = if tag_name == RDF_LI {
            let Some(ElementFrame::Node { next_li, .. }) = self.stack.last_mut() else {
                return Err(RdfXmlSyntaxError::msg(format!(
                    "Invalid property element tag name: {tag_name}"
                ))
                .into());
            };
            *next_li += 1;
            NamedNode::new_unchecked(format!(
                "http://www.w3.org/1999/02/22-rdf-syntax-ns#_{next_li}"
            ))
        } else if is_reserved_element_name(&tag_name) || tag_name == RDF_DESCRIPTION {
            return Err(RdfXmlSyntaxError::msg(format!(
                "Invalid property element tag name: {tag_name}"
            ))
            .into());
        } else {
            self.validate_iri(tag_name)?
        };

        Ok(match parse_type {
            ParseHint::Plain => {
                if resource.is_none() && node_id.is_none() && properties.is_empty() {
                    ElementFrame::Property {
                        predicate,
                        base,
                        language,
                        subject,
                        object: None,
                        reify_id,
                        datatype,
                    }
                } else {
                    let object: Subject = match (resource, node_id) {
                        (Some(resource), None) => resource.into(),
                        (None, Some(node_id)) => node_id.into(),
                        (None, None) => BlankNode::default().into(),
                        (Some(_), Some(_)) => {
                            return Err(RdfXmlSyntaxError::msg(
                                "Not both rdf:resource and rdf:nodeID could be set at the same time",
                            )
                            .into());
                        }
                    };
                    self.push_literal_triples(&object, properties, language.as_deref(), results);
                    if let Some(type_iri) = type_iri {
                        results.push(Triple::new(
                            object.clone(),
                            NamedNode::new_unchecked(rdf::TYPE),
                            type_iri,
                        ));
                    }
                    ElementFrame::Property {
                        predicate,
                        base,
                        language,
                        subject,
                        object: Some(PropertyObject::Resource(object)),
                        reify_id,
                        datatype,
                    }
                }
            }
            ParseHint::Resource => {
                let object = BlankNode::default();
                let triple = Triple::new(subject, predicate, object.clone());
                if let Some(id) = reify_id {
                    reify(triple.clone(), id, results);
                }
                results.push(triple);
                ElementFrame::Node {
                    base,
                    language,
                    subject: object.into(),
                    next_li: 0,
                }
            }
            ParseHint::Collection => ElementFrame::CollectionProperty {
                predicate,
                base,
                language,
                subject,
                items: Vec::new(),
                reify_id,
            },
            ParseHint::Literal | ParseHint::Opaque => ElementFrame::LiteralProperty {
                predicate,
                base,
                language,
                subject,
                writer: Writer::new(Vec::new()),
                reify_id,
                emit: parse_type == ParseHint::Literal,
            },
        })
    }

    fn close_frame(
        &mut self,
        frame: ElementFrame,
        results: &mut Vec<Triple>,
    ) -> Result<(), RdfXmlSyntaxError> {
        match frame {
            ElementFrame::Property {
                predicate,
                language,
                subject,
                object,
                reify_id,
                datatype,
                ..
            } => {
                let object: Term = match object {
                    Some(PropertyObject::Resource(node)) => node.into(),
                    Some(PropertyObject::Literal(text)) => {
                        self.text_literal(text, language, datatype).into()
                    }
                    None => self.text_literal(String::new(), language, datatype).into(),
                };
                let triple = Triple::new(subject, predicate, object);
                if let Some(id) = reify_id {
                    reify(triple.clone(), id, results);
                }
                results.push(triple);
            }
            ElementFrame::CollectionProperty {
                predicate,
                subject,
                items,
                reify_id,
                ..
            } => {
                let list = items.into_iter().rev().fold(
                    Subject::from(NamedNode::new_unchecked(rdf::NIL)),
                    |rest, item| {
                        let cell = Subject::from(BlankNode::default());
                        results.push(Triple::new(
                            cell.clone(),
                            NamedNode::new_unchecked(rdf::FIRST),
                            item,
                        ));
                        results.push(Triple::new(
                            cell.clone(),
                            NamedNode::new_unchecked(rdf::REST),
                            rest,
                        ));
                        cell
                    },
                );
                let triple = Triple::new(subject, predicate, list);
                if let Some(id) = reify_id {
                    reify(triple.clone(), id, results);
                }
                results.push(triple);
            }
            ElementFrame::LiteralProperty {
                predicate,
                subject,
                writer,
                reify_id,
                emit,
                ..
            } => {
                if !emit {
                    return Ok(());
                }
                let content = writer.into_inner();
                if content.is_empty() {
                    return Err(RdfXmlSyntaxError::msg(format!(
                        "No value found for rdf:XMLLiteral value of property {predicate}"
                    )));
                }
                let text = str::from_utf8(&content).map_err(|_| {
                    RdfXmlSyntaxError::msg("The XML literal is not in valid UTF-8")
                })?;
                let triple = Triple::new(
                    subject,
                    predicate,
                    Literal::new_typed_literal(text, NamedNode::new_unchecked(rdf::XML_LITERAL)),
                );
                if let Some(id) = reify_id {
                    reify(triple.clone(), id, results);
                }
                results.push(triple);
            }
            ElementFrame::Node { subject, .. } => match self.stack.last_mut() {
                Some(ElementFrame::Property { object, .. }) => {
                    if object_is_set(object) {
                        return Err(RdfXmlSyntaxError::msg(
                            "Unexpected node, a text value is already present",
                        ));
                    }
                    *object = Some(PropertyObject::Resource(subject));
                }
                Some(ElementFrame::CollectionProperty { items, .. }) => items.push(subject),
                _ => (),
            },
            ElementFrame::Doc { .. } | ElementFrame::Rdf { .. } => (),
        }
        Ok(())
    }

    /// Expands a qualified name into its full namespace name.
    fn expanded_name(
        &self,
        qname: QName<'_>,
        is_attribute: bool,
    ) -> Result<String, RdfXmlParseError> {
        let (namespace, local_name): (ResolveResult<'_>, LocalName<'_>) = if is_attribute {
            self.reader.resolve_attribute(qname)
        } else {
            self.reader.resolve_element(qname)
        };
        match namespace {
            ResolveResult::Bound(ns) => {
                let mut name = Vec::with_capacity(ns.as_ref().len() + local_name.as_ref().len());
                name.extend_from_slice(ns.as_ref());
                name.extend_from_slice(local_name.as_ref());
                let name = self.reader.decoder().decode(&name)?;
                Ok(unescape_with(&name, |e| self.lookup_entity(e))?.into_owned())
            }
            ResolveResult::Unbound => {
                Err(RdfXmlSyntaxError::msg("XML namespaces are required in RDF/XML").into())
            }
            ResolveResult::Unknown(prefix) => Err(RdfXmlSyntaxError::msg(format!(
                "Unknown prefix {}:",
                self.reader.decoder().decode(&prefix)?
            ))
            .into()),
        }
    }

    fn text_literal(
        &self,
        value: String,
        language: Option<String>,
        datatype: Option<NamedNode>,
    ) -> Literal {
        let language = language.or_else(|| self.current_language().map(ToOwned::to_owned));
        match (datatype, language) {
            (Some(datatype), _) => Literal::new_typed_literal(value, datatype),
            (None, Some(language)) => {
                Literal::new_language_tagged_literal_unchecked(value, language)
            }
            (None, None) => Literal::new_simple_literal(value),
        }
    }

    fn push_literal_triples(
        &self,
        subject: &Subject,
        properties: Vec<(NamedNode, String)>,
        language: Option<&str>,
        results: &mut Vec<Triple>,
    ) {
        let language = language.or_else(|| self.current_language());
        for (predicate, value) in properties {
            let literal = match language {
                Some(language) => Literal::new_language_tagged_literal_unchecked(value, language),
                None => Literal::new_simple_literal(value),
            };
            results.push(Triple::new(subject.clone(), predicate, literal));
        }
    }

    fn attribute_value(&self, attribute: &Attribute<'_>) -> Result<String, RdfXmlParseError> {
        Ok(attribute
            .decode_and_unescape_value_with(self.reader.decoder(), |e| self.lookup_entity(e))?
            .into_owned())
    }

    fn resolve_iri(
        &self,
        base: Option<&Iri<String>>,
        value: String,
    ) -> Result<NamedNode, RdfXmlSyntaxError> {
        let Some(base) = base.or_else(|| self.current_base()) else {
            return self.validate_iri(value);
        };
        let iri = if self.lenient {
            base.resolve_unchecked(&value)
        } else {
            base.resolve(&value)
                .map_err(|error| RdfXmlSyntaxError::invalid_iri(value, error))?
        };
        Ok(NamedNode::new_unchecked(iri.into_inner()))
    }

    fn validate_iri(&self, value: String) -> Result<NamedNode, RdfXmlSyntaxError> {
        Ok(NamedNode::new_unchecked(if self.lenient {
            value
        } else {
            Iri::parse(value.clone())
                .map_err(|error| RdfXmlSyntaxError::invalid_iri(value, error))?
                .into_inner()
        }))
    }

    fn current_language(&self) -> Option<&str> {
        self.stack.iter().rev().find_map(ElementFrame::language)
    }

    fn current_base(&self) -> Option<&Iri<String>> {
        self.stack.iter().rev().find_map(ElementFrame::base)
    }

    fn lookup_entity(&self, e: &str) -> Option<&str> {
        resolve_xml_entity(e).or_else(|| self.entities.get(e).map(String::as_str))
    }
}

fn reify(triple: Triple, id: NamedNode, results: &mut Vec<Triple>) {
    let Triple {
        subject,
        predicate,
        object,
    } = triple;
    for (p, o) in [
        (rdf::TYPE, Term::from(NamedNode::new_unchecked(rdf::STATEMENT))),
        (rdf::SUBJECT, subject.into()),
        (rdf::PREDICATE, predicate.into()),
        (rdf::OBJECT, object),
    ] {
        results.push(Triple::new(id.clone(), NamedNode::new_unchecked(p), o));
    }
}

fn object_is_set(object: &Option<PropertyObject>) -> bool {
    match object {
        Some(PropertyObject::Resource(_)) => true,
        Some(PropertyObject::Literal(text)) => !text.bytes().all(is_whitespace),
        None => false,
    }
}

fn is_whitespace(c: u8) -> bool {
    matches!(c, b' ' | b'\t' | b'\n' | b'\r')
}

fn declares_utf8(encoding: &[u8]) -> bool {
    matches!(
        encoding.to_ascii_lowercase().as_slice(),
        b"unicode-1-1-utf-8"
            | b"unicode11utf8"
            | b"unicode20utf8"
            | b"utf-8"
            | b"utf8"
            | b"x-unicode20utf8"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn nn(iri: &str) -> NamedNode {
        NamedNode::new_unchecked(iri)
    }

    fn parse(file: &str) -> Vec<Triple> {
        RdfXmlParser::new()
            .for_slice(file)
            .collect::<Result<_, _>>()
            .unwrap()
    }

    fn parse_set(file: &str) -> HashSet<Triple> {
        RdfXmlParser::new()
            .for_slice(file)
            .collect::<Result<_, _>>()
            .unwrap()
    }

    #[test]
    fn parse_node_and_property_elements() {
        let file = r#"<?xml version="1.0"?>
<rdf:RDF xmlns:rdf="http://www.w3.org/1999/02/22-rdf-syntax-ns#" xmlns:schema="http://schema.org/">
  <rdf:Description rdf:about="http://example.com/foo">
    <rdf:type rdf:resource="http://schema.org/Person"/>
    <schema:name>Foo</schema:name>
  </rdf:Description>
  <schema:Person rdf:about="http://example.com/bar" schema:name="Bar"/>
</rdf:RDF>"#;
        let expected = HashSet::from([
            Triple::new(
                nn("http://example.com/foo"),
                nn(rdf::TYPE),
                nn("http://schema.org/Person"),
            ),
            Triple::new(
                nn("http://example.com/foo"),
                nn("http://schema.org/name"),
                Literal::new_simple_literal("Foo"),
            ),
            Triple::new(
                nn("http://example.com/bar"),
                nn(rdf::TYPE),
                nn("http://schema.org/Person"),
            ),
            Triple::new(
                nn("http://example.com/bar"),
                nn("http://schema.org/name"),
                Literal::new_simple_literal("Bar"),
            ),
        ]);
        assert_eq!(parse_set(file), expected);
    }

    #[test]
    fn resolves_against_xml_base() {
        let file = r#"<?xml version="1.0"?>
<rdf:RDF xmlns:rdf="http://www.w3.org/1999/02/22-rdf-syntax-ns#" xml:base="http://example.org/dir/file#frag">
  <rdf:Description rdf:about="">
    <rdf:type rdf:resource="other"/>
  </rdf:Description>
</rdf:RDF>"#;
        let triples = parse(file);
        assert_eq!(
            triples,
            [Triple::new(
                nn("http://example.org/dir/file"),
                nn(rdf::TYPE),
                nn("http://example.org/dir/other"),
            )]
        );
    }

    #[test]
    fn li_elements_are_numbered() {
        let file = r#"<?xml version="1.0"?>
<rdf:RDF xmlns:rdf="http://www.w3.org/1999/02/22-rdf-syntax-ns#">
  <rdf:Description rdf:about="http://example.com/list">
    <rdf:li rdf:resource="http://example.com/a"/>
    <rdf:li rdf:resource="http://example.com/b"/>
  </rdf:Description>
</rdf:RDF>"#;
        let expected = HashSet::from([
            Triple::new(
                nn("http://example.com/list"),
                nn("http://www.w3.org/1999/02/22-rdf-syntax-ns#_1"),
                nn("http://example.com/a"),
            ),
            Triple::new(
                nn("http://example.com/list"),
                nn("http://www.w3.org/1999/02/22-rdf-syntax-ns#_2"),
                nn("http://example.com/b"),
            ),
        ]);
        assert_eq!(parse_set(file), expected);
    }

    #[test]
    fn parse_type_collection_builds_list() {
        let file = r#"<?xml version="1.0"?>
<rdf:RDF xmlns:rdf="http://www.w3.org/1999/02/22-rdf-syntax-ns#" xmlns:ex="http://example.com/ns#">
  <rdf:Description rdf:about="http://example.com/s">
    <ex:p rdf:parseType="Collection">
      <rdf:Description rdf:about="http://example.com/a"/>
      <rdf:Description rdf:about="http://example.com/b"/>
    </ex:p>
  </rdf:Description>
</rdf:RDF>"#;
        let triples = parse(file);
        assert_eq!(triples.len(), 5);

        let find = |subject: &Subject, predicate: &NamedNode| {
            triples
                .iter()
                .find(|t| t.subject == *subject && t.predicate == *predicate)
                .unwrap()
                .object
                .clone()
        };
        let as_subject = |term: Term| match term {
            Term::BlankNode(node) => Subject::from(node),
            term => panic!("expected a blank node, got {term}"),
        };

        let head = triples
            .iter()
            .find(|t| t.predicate == nn("http://example.com/ns#p"))
            .unwrap();
        assert_eq!(head.subject, nn("http://example.com/s").into());
        let cell1 = as_subject(head.object.clone());
        assert_eq!(
            find(&cell1, &nn(rdf::FIRST)),
            nn("http://example.com/a").into()
        );
        let cell2 = as_subject(find(&cell1, &nn(rdf::REST)));
        assert_eq!(
            find(&cell2, &nn(rdf::FIRST)),
            nn("http://example.com/b").into()
        );
        assert_eq!(find(&cell2, &nn(rdf::REST)), nn(rdf::NIL).into());
    }

    #[test]
    fn parse_type_resource_inserts_blank_node() {
        let file = r#"<?xml version="1.0"?>
<rdf:RDF xmlns:rdf="http://www.w3.org/1999/02/22-rdf-syntax-ns#" xmlns:ex="http://example.com/ns#">
  <rdf:Description rdf:about="http://example.com/s">
    <ex:p rdf:parseType="Resource">
      <ex:q rdf:resource="http://example.com/o"/>
    </ex:p>
  </rdf:Description>
</rdf:RDF>"#;
        let triples = parse(file);
        assert_eq!(triples.len(), 2);
        let outer = triples
            .iter()
            .find(|t| t.predicate == nn("http://example.com/ns#p"))
            .unwrap();
        let inner = triples
            .iter()
            .find(|t| t.predicate == nn("http://example.com/ns#q"))
            .unwrap();
        let Term::BlankNode(node) = &outer.object else {
            panic!("expected a blank node object");
        };
        assert_eq!(inner.subject, node.clone().into());
        assert_eq!(inner.object, nn("http://example.com/o").into());
    }

    #[test]
    fn parse_type_literal_keeps_markup() {
        let file = r#"<?xml version="1.0"?>
<rdf:RDF xmlns:rdf="http://www.w3.org/1999/02/22-rdf-syntax-ns#">
  <rdf:Description rdf:about="http://example.com/s">
    <ex:p rdf:parseType="Literal" xmlns:ex="http://example.com/ns#"><b>bold</b></ex:p>
  </rdf:Description>
</rdf:RDF>"#;
        let triples = parse(file);
        assert_eq!(triples.len(), 1);
        assert_eq!(
            triples[0].object,
            Literal::new_typed_literal(
                "<b xmlns:rdf=\"http://www.w3.org/1999/02/22-rdf-syntax-ns#\" xmlns:ex=\"http://example.com/ns#\">bold</b>",
                nn(rdf::XML_LITERAL),
            )
            .into()
        );
    }

    #[test]
    fn rdf_id_reifies_the_statement() {
        let file = r#"<?xml version="1.0"?>
<rdf:RDF xmlns:rdf="http://www.w3.org/1999/02/22-rdf-syntax-ns#" xml:base="http://example.com/">
  <rdf:Description rdf:about="http://example.com/s">
    <ex:p xmlns:ex="http://example.com/ns#" rdf:ID="st">o</ex:p>
  </rdf:Description>
</rdf:RDF>"#;
        let triples = parse_set(file);
        assert_eq!(triples.len(), 5);
        let statement = nn("http://example.com/#st");
        assert!(triples.contains(&Triple::new(
            statement.clone(),
            nn(rdf::TYPE),
            nn(rdf::STATEMENT)
        )));
        assert!(triples.contains(&Triple::new(
            statement.clone(),
            nn(rdf::SUBJECT),
            nn("http://example.com/s")
        )));
        assert!(triples.contains(&Triple::new(
            statement.clone(),
            nn(rdf::PREDICATE),
            nn("http://example.com/ns#p")
        )));
        assert!(triples.contains(&Triple::new(
            statement,
            nn(rdf::OBJECT),
            Literal::new_simple_literal("o")
        )));
    }

    #[test]
    fn duplicate_rdf_id_is_rejected() {
        let file = r#"<?xml version="1.0"?>
<rdf:RDF xmlns:rdf="http://www.w3.org/1999/02/22-rdf-syntax-ns#" xml:base="http://example.com/">
  <rdf:Description rdf:about="http://example.com/s">
    <ex:p xmlns:ex="http://example.com/ns#" rdf:ID="st">a</ex:p>
    <ex:p xmlns:ex="http://example.com/ns#" rdf:ID="st">b</ex:p>
  </rdf:Description>
</rdf:RDF>"#;
        assert!(RdfXmlParser::new()
            .for_slice(file)
            .collect::<Result<Vec<_>, _>>()
            .is_err());
        assert!(RdfXmlParser::new()
            .lenient()
            .for_slice(file)
            .collect::<Result<Vec<_>, _>>()
            .is_ok());
    }

    #[test]
    fn prefix_spelling_does_not_matter() {
        let with_usual_prefix = r#"<?xml version="1.0"?>
<rdf:RDF xmlns:rdf="http://www.w3.org/1999/02/22-rdf-syntax-ns#">
  <rdf:Description rdf:about="http://example.com/s">
    <rdf:type rdf:resource="http://example.com/T"/>
  </rdf:Description>
</rdf:RDF>"#;
        let with_rebound_prefix = r#"<?xml version="1.0"?>
<x:RDF xmlns:x="http://www.w3.org/1999/02/22-rdf-syntax-ns#">
  <x:Description x:about="http://example.com/s">
    <x:type x:resource="http://example.com/T"/>
  </x:Description>
</x:RDF>"#;
        let with_default_namespace = r#"<?xml version="1.0"?>
<RDF xmlns="http://www.w3.org/1999/02/22-rdf-syntax-ns#" xmlns:r="http://www.w3.org/1999/02/22-rdf-syntax-ns#">
  <Description r:about="http://example.com/s">
    <type r:resource="http://example.com/T"/>
  </Description>
</RDF>"#;
        let expected = HashSet::from([Triple::new(
            nn("http://example.com/s"),
            nn(rdf::TYPE),
            nn("http://example.com/T"),
        )]);
        assert_eq!(parse_set(with_usual_prefix), expected);
        assert_eq!(parse_set(with_rebound_prefix), expected);
        assert_eq!(parse_set(with_default_namespace), expected);
    }

    #[test]
    fn language_is_inherited_and_lowercased() {
        let file = r#"<?xml version="1.0"?>
<rdf:RDF xmlns:rdf="http://www.w3.org/1999/02/22-rdf-syntax-ns#" xml:lang="EN">
  <rdf:Description rdf:about="http://example.com/s" xmlns:ex="http://example.com/ns#">
    <ex:p>hello</ex:p>
  </rdf:Description>
</rdf:RDF>"#;
        let triples = parse(file);
        assert_eq!(
            triples,
            [Triple::new(
                nn("http://example.com/s"),
                nn("http://example.com/ns#p"),
                Literal::new_language_tagged_literal_unchecked("hello", "en"),
            )]
        );
    }

    #[test]
    fn invalid_language_tag_is_rejected() {
        let file = r#"<?xml version="1.0"?>
<rdf:RDF xmlns:rdf="http://www.w3.org/1999/02/22-rdf-syntax-ns#">
  <rdf:Description rdf:about="http://example.com/s" xmlns:ex="http://example.com/ns#">
    <ex:p xml:lang="en gb">hello</ex:p>
  </rdf:Description>
</rdf:RDF>"#;
        assert!(RdfXmlParser::new()
            .for_slice(file)
            .collect::<Result<Vec<_>, _>>()
            .is_err());
        assert!(RdfXmlParser::new()
            .lenient()
            .for_slice(file)
            .collect::<Result<Vec<_>, _>>()
            .is_ok());
    }

    #[test]
    fn entity_declarations_are_opt_in() {
        let file = r#"<?xml version="1.0"?>
<!DOCTYPE rdf:RDF [<!ENTITY ex "http://example.com/">]>
<rdf:RDF xmlns:rdf="http://www.w3.org/1999/02/22-rdf-syntax-ns#" xmlns:s="http://schema.org/">
  <rdf:Description rdf:about="&ex;s" s:name="x"/>
</rdf:RDF>"#;
        assert!(RdfXmlParser::new()
            .for_slice(file)
            .collect::<Result<Vec<_>, _>>()
            .is_err());
        let triples = RdfXmlParser::new()
            .with_custom_entities()
            .for_slice(file)
            .collect::<Result<Vec<_>, _>>()
            .unwrap();
        assert_eq!(
            triples,
            [Triple::new(
                nn("http://example.com/s"),
                nn("http://schema.org/name"),
                Literal::new_simple_literal("x"),
            )]
        );
    }

    #[test]
    fn undeclared_entity_reference_fails() {
        let file = r#"<?xml version="1.0"?>
<rdf:RDF xmlns:rdf="http://www.w3.org/1999/02/22-rdf-syntax-ns#" xmlns:s="http://schema.org/">
  <rdf:Description rdf:about="http://example.com/s">
    <s:name>&unknown;</s:name>
  </rdf:Description>
</rdf:RDF>"#;
        assert!(RdfXmlParser::new()
            .for_slice(file)
            .collect::<Result<Vec<_>, _>>()
            .is_err());
    }

    #[test]
    fn exposes_prefixes_and_base_iri() {
        let file = r#"<?xml version="1.0"?>
<rdf:RDF xmlns:rdf="http://www.w3.org/1999/02/22-rdf-syntax-ns#" xmlns:schema="http://schema.org/" xml:base="http://example.com/">
  <rdf:Description rdf:about="foo" schema:name="Foo"/>
</rdf:RDF>"#;
        let mut parser = RdfXmlParser::new().for_slice(file);
        assert_eq!(parser.prefixes().count(), 0);
        assert!(parser.base_iri().is_none());
        parser.next().unwrap().unwrap();
        assert_eq!(
            parser.prefixes().collect::<Vec<_>>(),
            [
                ("rdf", "http://www.w3.org/1999/02/22-rdf-syntax-ns#"),
                ("schema", "http://schema.org/")
            ]
        );
        assert_eq!(parser.base_iri(), Some("http://example.com/"));
    }
}
