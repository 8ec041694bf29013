//! Implementation of [SPARQL Query Results XML Format](https://www.w3.org/TR/rdf-sparql-XMLres/)

use crate::error::{QueryResultsParseError, QueryResultsSyntaxError};
use lodrdf::vocab::rdf;
use lodrdf::{BlankNode, Literal, NamedNode, Subject, Term, Triple, Variable};
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};
use std::borrow::Cow;
use std::collections::HashMap;
use std::io::{self, BufReader, Read, Write};

const RESULTS_NAMESPACE: &str = "http://www.w3.org/2005/sparql-results#";

pub fn write_boolean_xml_result<W: Write>(writer: W, value: bool) -> io::Result<W> {
    let mut out = XmlOut::new(writer);
    out.preamble()?;
    out.open("head")?;
    out.close("head")?;
    out.open("boolean")?;
    out.text(if value { "true" } else { "false" })?;
    out.close("boolean")?;
    out.close("sparql")?;
    Ok(out.into_inner())
}

/// Thin layer over the quick-xml writer with the error mapping applied once.
struct XmlOut<W: Write> {
    writer: Writer<W>,
}

impl<W: Write> XmlOut<W> {
    fn new(writer: W) -> Self {
        Self {
            writer: Writer::new(writer),
        }
    }

    fn event(&mut self, event: Event<'_>) -> io::Result<()> {
        self.writer.write_event(event)
    }

    /// The XML declaration and the root `<sparql>` tag.
    fn preamble(&mut self) -> io::Result<()> {
        self.event(Event::Decl(BytesDecl::new("1.0", None, None)))?;
        self.event(Event::Start(
            BytesStart::new("sparql").with_attributes([("xmlns", RESULTS_NAMESPACE)]),
        ))
    }

    fn open(&mut self, name: &str) -> io::Result<()> {
        self.event(Event::Start(BytesStart::new(name)))
    }

    fn open_with(&mut self, name: &str, attribute: (&str, &str)) -> io::Result<()> {
        self.event(Event::Start(BytesStart::new(name).with_attributes([attribute])))
    }

    fn close(&mut self, name: &str) -> io::Result<()> {
        self.event(Event::End(BytesEnd::new(name)))
    }

    fn text(&mut self, value: &str) -> io::Result<()> {
        self.event(Event::Text(BytesText::new(value)))
    }

    /// A `<name>text</name>` element.
    fn leaf(&mut self, name: &str, value: &str) -> io::Result<()> {
        self.open(name)?;
        self.text(value)?;
        self.close(name)
    }

    fn into_inner(self) -> W {
        self.writer.into_inner()
    }
}

pub struct XmlSolutionsWriter<W: Write> {
    out: XmlOut<W>,
}

impl<W: Write> XmlSolutionsWriter<W> {
    pub fn start(writer: W, variables: &[Variable]) -> io::Result<Self> {
        let mut out = XmlOut::new(writer);
        out.preamble()?;
        out.open("head")?;
        for variable in variables {
            out.event(Event::Empty(
                BytesStart::new("variable").with_attributes([("name", variable.as_str())]),
            ))?;
        }
        out.close("head")?;
        out.open("results")?;
        Ok(Self { out })
    }

    pub fn write<'a>(
        &mut self,
        solution: impl IntoIterator<Item = (&'a Variable, &'a Term)>,
    ) -> io::Result<()> {
        self.out.open("result")?;
        for (variable, value) in solution {
            self.out.open_with("binding", ("name", variable.as_str()))?;
            write_xml_term(&mut self.out, value)?;
            self.out.close("binding")?;
        }
        self.out.close("result")
    }

    pub fn finish(mut self) -> io::Result<W> {
        self.out.close("results")?;
        self.out.close("sparql")?;
        Ok(self.out.into_inner())
    }
}

fn write_xml_term<W: Write>(out: &mut XmlOut<W>, term: &Term) -> io::Result<()> {
    match term {
        Term::NamedNode(node) => out.leaf("uri", node.as_str()),
        Term::BlankNode(node) => out.leaf("bnode", node.as_str()),
        Term::Literal(literal) => {
            let mut start = BytesStart::new("literal");
            if let Some(language) = literal.language() {
                start.push_attribute(("xml:lang", language));
            } else if !literal.is_plain() {
                let datatype = literal.datatype();
                start.push_attribute(("datatype", datatype.as_str()));
            }
            out.event(Event::Start(start))?;
            out.text(literal.value())?;
            out.close("literal")
        }
        Term::Triple(triple) => write_xml_triple(out, triple),
    }
}

fn write_xml_triple<W: Write>(out: &mut XmlOut<W>, triple: &Triple) -> io::Result<()> {
    out.open("triple")?;
    out.open("subject")?;
    write_xml_term(out, &triple.subject.clone().into())?;
    out.close("subject")?;
    out.open("predicate")?;
    out.leaf("uri", triple.predicate.as_str())?;
    out.close("predicate")?;
    out.open("object")?;
    write_xml_term(out, &triple.object)?;
    out.close("object")?;
    out.close("triple")
}

pub enum XmlQueryResultsReader<R: Read> {
    Solutions {
        variables: Vec<Variable>,
        solutions: XmlSolutionsReader<R>,
    },
    Boolean(bool),
}

impl<R: Read> XmlQueryResultsReader<R> {
    pub fn read(source: R) -> Result<Self, QueryResultsParseError> {
        enum HeadState {
            Start,
            Sparql,
            Head,
            AfterHead,
            Boolean,
        }

        let mut reader = Reader::from_reader(BufReader::new(source));
        let config = reader.config_mut();
        config.trim_text_start = true;
        config.trim_text_end = true;
        config.expand_empty_elements = true;

        let mut buffer = Vec::default();
        let mut variables = Vec::default();
        let mut state = HeadState::Start;

        loop {
            buffer.clear();
            let event = reader.read_event_into(&mut buffer)?;
            match event {
                Event::Start(event) => {
                    let name = event.local_name();
                    match state {
                        HeadState::Start => {
                            if name.as_ref() == b"sparql" {
                                state = HeadState::Sparql;
                            } else {
                                return Err(unexpected_tag(&reader, &event, "<sparql>"));
                            }
                        }
                        HeadState::Sparql => {
                            if name.as_ref() == b"head" {
                                state = HeadState::Head;
                            } else {
                                return Err(unexpected_tag(&reader, &event, "<head>"));
                            }
                        }
                        HeadState::Head => {
                            if name.as_ref() == b"variable" {
                                let name =
                                    name_attribute(&reader, &event)?.ok_or_else(|| {
                                        QueryResultsSyntaxError::msg(
                                            "No name attribute found for the <variable> tag",
                                        )
                                    })?;
                                let variable = Variable::new(name).map_err(|e| {
                                    QueryResultsSyntaxError::msg(format!(
                                        "Invalid variable name: {e}"
                                    ))
                                })?;
                                if variables.contains(&variable) {
                                    return Err(QueryResultsSyntaxError::msg(format!(
                                        "The variable {variable} is declared twice"
                                    ))
                                    .into());
                                }
                                variables.push(variable);
                            } else if name.as_ref() != b"link" {
                                return Err(unexpected_tag(
                                    &reader,
                                    &event,
                                    "<variable> or <link>",
                                ));
                            }
                        }
                        HeadState::AfterHead => {
                            if name.as_ref() == b"boolean" {
                                state = HeadState::Boolean;
                            } else if name.as_ref() == b"results" {
                                let positions = variables
                                    .iter()
                                    .enumerate()
                                    .map(|(i, var)| (var.as_str().to_owned(), i))
                                    .collect();
                                return Ok(Self::Solutions {
                                    variables,
                                    solutions: XmlSolutionsReader {
                                        reader,
                                        buffer,
                                        positions,
                                        returns: Vec::new(),
                                        triples: Vec::new(),
                                    },
                                });
                            } else if name.as_ref() != b"link" {
                                return Err(unexpected_tag(
                                    &reader,
                                    &event,
                                    "<results> or <boolean>",
                                ));
                            }
                        }
                        HeadState::Boolean => {
                            return Err(unexpected_tag(&reader, &event, "a boolean value"));
                        }
                    }
                }
                Event::Text(event) => {
                    let value = event.unescape()?;
                    return if matches!(state, HeadState::Boolean) {
                        match value.as_ref() {
                            "true" => Ok(Self::Boolean(true)),
                            "false" => Ok(Self::Boolean(false)),
                            _ => Err(QueryResultsSyntaxError::msg(format!(
                                "Unexpected boolean value. Found '{value}'"
                            ))
                            .into()),
                        }
                    } else {
                        Err(QueryResultsSyntaxError::msg(format!(
                            "Unexpected textual value found: '{value}'"
                        ))
                        .into())
                    };
                }
                Event::End(event) => {
                    if matches!(state, HeadState::Head) && event.local_name().as_ref() == b"head" {
                        state = HeadState::AfterHead;
                    } else if !matches!(state, HeadState::Head) {
                        return Err(early_end_error());
                    }
                }
                Event::Eof => return Err(early_end_error()),
                _ => (),
            }
        }
    }
}

fn early_end_error() -> QueryResultsParseError {
    QueryResultsSyntaxError::msg(
        "Unexpected early file end. All results file should have a <head> and a <result> or <boolean> tag",
    )
    .into()
}

/// Where the parser currently is inside a `<result>` element.
#[derive(Clone, Copy)]
enum RowState {
    Start,
    Result,
    Binding,
    Uri,
    BNode,
    Literal,
    Triple,
    Subject,
    Predicate,
    Object,
    End,
}

/// The three children of a `<triple>` element, filled as they close.
#[derive(Default)]
struct TripleParts {
    subject: Option<Term>,
    predicate: Option<Term>,
    object: Option<Term>,
}

impl TripleParts {
    fn build(self) -> Result<Triple, QueryResultsParseError> {
        let (Some(subject), Some(predicate), Some(object)) =
            (self.subject, self.predicate, self.object)
        else {
            return Err(QueryResultsSyntaxError::msg(
                "A <triple> should contain a <subject>, a <predicate> and an <object>",
            )
            .into());
        };
        let subject = match subject {
            Term::NamedNode(s) => Subject::NamedNode(s),
            Term::BlankNode(s) => Subject::BlankNode(s),
            Term::Triple(s) => Subject::Triple(s),
            Term::Literal(_) => {
                return Err(QueryResultsSyntaxError::msg(
                    "The <subject> value should not be a <literal>",
                )
                .into())
            }
        };
        let Term::NamedNode(predicate) = predicate else {
            return Err(
                QueryResultsSyntaxError::msg("The <predicate> value should be an <uri>").into(),
            );
        };
        Ok(Triple::new(subject, predicate, object))
    }
}

pub struct XmlSolutionsReader<R: Read> {
    reader: Reader<BufReader<R>>,
    buffer: Vec<u8>,
    positions: HashMap<String, usize>,
    /// States to come back to once the current term element is closed.
    returns: Vec<RowState>,
    /// One entry per nesting level of quoted triples.
    triples: Vec<TripleParts>,
}

impl<R: Read> XmlSolutionsReader<R> {
    pub fn read_next(&mut self) -> Result<Option<Vec<Option<Term>>>, QueryResultsParseError> {
        let mut state = RowState::Start;
        let mut row = vec![None; self.positions.len()];
        let mut current_var = None;
        let mut term: Option<Term> = None;
        let mut lang = None;
        let mut datatype = None;
        loop {
            self.buffer.clear();
            let event = self.reader.read_event_into(&mut self.buffer)?;
            match event {
                Event::Start(event) => {
                    let name = event.local_name();
                    match state {
                        RowState::Start => {
                            if name.as_ref() == b"result" {
                                state = RowState::Result;
                            } else {
                                return Err(unexpected_tag(&self.reader, &event, "<result>"));
                            }
                        }
                        RowState::Result => {
                            if name.as_ref() == b"binding" {
                                current_var = Some(
                                    name_attribute(&self.reader, &event)?.ok_or_else(|| {
                                        QueryResultsSyntaxError::msg(
                                            "No name attribute found for the <binding> tag",
                                        )
                                    })?,
                                );
                                state = RowState::Binding;
                            } else {
                                return Err(unexpected_tag(&self.reader, &event, "<binding>"));
                            }
                        }
                        RowState::Binding
                        | RowState::Subject
                        | RowState::Predicate
                        | RowState::Object => {
                            if term.is_some() {
                                return Err(QueryResultsSyntaxError::msg(
                                    "There is already a value for the current binding",
                                )
                                .into());
                            }
                            self.returns.push(state);
                            match name.as_ref() {
                                b"uri" => state = RowState::Uri,
                                b"bnode" => state = RowState::BNode,
                                b"literal" => {
                                    for attr in event.attributes() {
                                        let attr = attr.map_err(quick_xml::Error::from)?;
                                        if attr.key.as_ref() == b"xml:lang" {
                                            lang = Some(
                                                attr.decode_and_unescape_value(
                                                    self.reader.decoder(),
                                                )?
                                                .to_string(),
                                            );
                                        } else if attr.key.local_name().as_ref() == b"datatype" {
                                            let iri = attr
                                                .decode_and_unescape_value(self.reader.decoder())?;
                                            datatype = Some(NamedNode::new(iri.to_string())
                                                .map_err(|e| {
                                                    QueryResultsSyntaxError::msg(format!(
                                                        "Invalid datatype IRI '{iri}': {e}"
                                                    ))
                                                })?);
                                        }
                                    }
                                    state = RowState::Literal;
                                }
                                b"triple" => {
                                    self.triples.push(TripleParts::default());
                                    state = RowState::Triple;
                                }
                                _ => {
                                    return Err(unexpected_tag(
                                        &self.reader,
                                        &event,
                                        "<uri>, <bnode> or <literal>",
                                    ));
                                }
                            }
                        }
                        RowState::Triple => match name.as_ref() {
                            b"subject" => state = RowState::Subject,
                            b"predicate" => state = RowState::Predicate,
                            b"object" => state = RowState::Object,
                            _ => {
                                return Err(unexpected_tag(
                                    &self.reader,
                                    &event,
                                    "<subject>, <predicate> or <object>",
                                ));
                            }
                        },
                        _ => (),
                    }
                }
                Event::Text(event) => {
                    let data = event.unescape()?;
                    term = Some(match state {
                        RowState::Uri => NamedNode::new(data.to_string())
                            .map_err(|e| {
                                QueryResultsSyntaxError::msg(format!(
                                    "Invalid IRI value '{data}': {e}"
                                ))
                            })?
                            .into(),
                        RowState::BNode => BlankNode::new(data.to_string())
                            .map_err(|e| {
                                QueryResultsSyntaxError::msg(format!(
                                    "Invalid blank node value '{data}': {e}"
                                ))
                            })?
                            .into(),
                        RowState::Literal => {
                            build_literal(data, lang.take(), datatype.take())?.into()
                        }
                        _ => {
                            return Err(QueryResultsSyntaxError::msg(format!(
                                "Unexpected textual value found: {data}"
                            ))
                            .into());
                        }
                    });
                }
                Event::End(_) => match state {
                    RowState::Start => state = RowState::End,
                    RowState::Result => return Ok(Some(row)),
                    RowState::Binding => {
                        let Some(var) = &current_var else {
                            return Err(QueryResultsSyntaxError::msg(
                                "No name found for <binding> tag",
                            )
                            .into());
                        };
                        let Some(position) = self.positions.get(var) else {
                            return Err(QueryResultsSyntaxError::msg(format!(
                                "The variable '{var}' is used in a binding but not declared in the variables list"
                            ))
                            .into());
                        };
                        row[*position] = term.take();
                        state = RowState::Result;
                    }
                    RowState::Subject => {
                        if let Some(parts) = self.triples.last_mut() {
                            parts.subject = term.take();
                        }
                        state = RowState::Triple;
                    }
                    RowState::Predicate => {
                        if let Some(parts) = self.triples.last_mut() {
                            parts.predicate = term.take();
                        }
                        state = RowState::Triple;
                    }
                    RowState::Object => {
                        if let Some(parts) = self.triples.last_mut() {
                            parts.object = term.take();
                        }
                        state = RowState::Triple;
                    }
                    RowState::Uri => state = self.pop_return()?,
                    RowState::BNode => {
                        if term.is_none() {
                            // <bnode/> gets a fresh blank node
                            term = Some(BlankNode::default().into());
                        }
                        state = self.pop_return()?;
                    }
                    RowState::Literal => {
                        if term.is_none() {
                            // <literal/> is the empty literal
                            term = Some(build_literal("", lang.take(), datatype.take())?.into());
                        }
                        state = self.pop_return()?;
                    }
                    RowState::Triple => {
                        let parts = self.triples.pop().ok_or_else(|| {
                            QueryResultsSyntaxError::msg("Unexpected </triple> tag")
                        })?;
                        term = Some(parts.build()?.into());
                        state = self.pop_return()?;
                    }
                    RowState::End => (),
                },
                Event::Eof => return Ok(None),
                _ => (),
            }
        }
    }

    fn pop_return(&mut self) -> Result<RowState, QueryResultsParseError> {
        self.returns
            .pop()
            .ok_or_else(|| QueryResultsSyntaxError::msg("Empty stack").into())
    }
}

fn build_literal(
    value: impl Into<String>,
    lang: Option<String>,
    datatype: Option<NamedNode>,
) -> Result<Literal, QueryResultsParseError> {
    match lang {
        Some(lang) => {
            if let Some(datatype) = datatype {
                if datatype != rdf::LANG_STRING {
                    return Err(QueryResultsSyntaxError::msg(format!(
                        "xml:lang value '{lang}' provided with the datatype {datatype}"
                    ))
                    .into());
                }
            }
            Literal::new_language_tagged_literal(value, &lang).map_err(|e| {
                QueryResultsSyntaxError::msg(format!("Invalid xml:lang value '{lang}': {e}")).into()
            })
        }
        None => Ok(if let Some(datatype) = datatype {
            Literal::new_typed_literal(value, datatype)
        } else {
            Literal::new_simple_literal(value)
        }),
    }
}

/// The decoded value of the `name` attribute, if any.
fn name_attribute<T>(
    reader: &Reader<T>,
    event: &BytesStart<'_>,
) -> Result<Option<String>, QueryResultsParseError> {
    for attr in event.attributes() {
        let attr = attr.map_err(quick_xml::Error::from)?;
        if attr.key.local_name().as_ref() == b"name" {
            return Ok(Some(
                attr.decode_and_unescape_value(reader.decoder())?.to_string(),
            ));
        }
    }
    Ok(None)
}

fn unexpected_tag<T>(
    reader: &Reader<T>,
    event: &BytesStart<'_>,
    expected: &str,
) -> QueryResultsParseError {
    match decode(reader, &event.name()) {
        Ok(found) => {
            QueryResultsSyntaxError::msg(format!("Expecting {expected}, found <{found}>")).into()
        }
        Err(e) => e,
    }
}

fn decode<'a, T>(
    reader: &Reader<T>,
    data: &'a impl AsRef<[u8]>,
) -> Result<Cow<'a, str>, QueryResultsParseError> {
    Ok(reader.decoder().decode(data.as_ref())?)
}
