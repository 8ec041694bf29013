//! Implementation of [SPARQL Query Results JSON Format](https://www.w3.org/TR/sparql11-results-json/)

use crate::error::{QueryResultsParseError, QueryResultsSyntaxError};
use json_event_parser::{JsonEvent, ReaderJsonParser, WriterJsonSerializer};
use lodrdf::vocab::rdf;
use lodrdf::{BlankNode, Literal, NamedNode, Subject, Term, Triple, Variable};
use std::collections::HashMap;
use std::io::{self, Read, Write};

pub fn write_boolean_json_result<W: Write>(writer: W, value: bool) -> io::Result<W> {
    let mut out = JsonOut::new(writer);
    out.emit(JsonEvent::StartObject)?;
    out.key("head")?;
    out.emit(JsonEvent::StartObject)?;
    out.emit(JsonEvent::EndObject)?;
    out.key("boolean")?;
    out.emit(JsonEvent::Boolean(value))?;
    out.emit(JsonEvent::EndObject)?;
    out.finish()
}

pub struct JsonSolutionsWriter<W: Write> {
    out: JsonOut<W>,
}

impl<W: Write> JsonSolutionsWriter<W> {
    pub fn start(writer: W, variables: &[Variable]) -> io::Result<Self> {
        let mut out = JsonOut::new(writer);
        out.emit(JsonEvent::StartObject)?;
        out.key("head")?;
        out.emit(JsonEvent::StartObject)?;
        out.key("vars")?;
        out.emit(JsonEvent::StartArray)?;
        for variable in variables {
            out.string(variable.as_str())?;
        }
        out.emit(JsonEvent::EndArray)?;
        out.emit(JsonEvent::EndObject)?;
        out.key("results")?;
        out.emit(JsonEvent::StartObject)?;
        out.key("bindings")?;
        out.emit(JsonEvent::StartArray)?;
        Ok(Self { out })
    }

    pub fn write<'a>(
        &mut self,
        solution: impl IntoIterator<Item = (&'a Variable, &'a Term)>,
    ) -> io::Result<()> {
        self.out.emit(JsonEvent::StartObject)?;
        for (variable, value) in solution {
            self.out.key(variable.as_str())?;
            self.out.term(value)?;
        }
        self.out.emit(JsonEvent::EndObject)
    }

    pub fn finish(mut self) -> io::Result<W> {
        self.out.emit(JsonEvent::EndArray)?;
        self.out.emit(JsonEvent::EndObject)?;
        self.out.emit(JsonEvent::EndObject)?;
        self.out.finish()
    }
}

/// Thin convenience layer over the JSON event serializer.
struct JsonOut<W: Write> {
    serializer: WriterJsonSerializer<W>,
}

impl<W: Write> JsonOut<W> {
    fn new(writer: W) -> Self {
        Self {
            serializer: WriterJsonSerializer::new(writer),
        }
    }

    fn emit(&mut self, event: JsonEvent<'_>) -> io::Result<()> {
        self.serializer.serialize_event(event)
    }

    fn key(&mut self, key: &str) -> io::Result<()> {
        self.emit(JsonEvent::ObjectKey(key.into()))
    }

    fn string(&mut self, value: &str) -> io::Result<()> {
        self.emit(JsonEvent::String(value.into()))
    }

    fn typed_value(&mut self, term_type: &str, value: &str) -> io::Result<()> {
        self.emit(JsonEvent::StartObject)?;
        self.key("type")?;
        self.string(term_type)?;
        self.key("value")?;
        self.string(value)?;
        Ok(())
    }

    fn term(&mut self, term: &Term) -> io::Result<()> {
        match term {
            Term::NamedNode(node) => {
                self.typed_value("uri", node.as_str())?;
                self.emit(JsonEvent::EndObject)
            }
            Term::BlankNode(node) => {
                self.typed_value("bnode", node.as_str())?;
                self.emit(JsonEvent::EndObject)
            }
            Term::Literal(literal) => {
                self.typed_value("literal", literal.value())?;
                if let Some(language) = literal.language() {
                    self.key("xml:lang")?;
                    self.string(language)?;
                } else if !literal.is_plain() {
                    self.key("datatype")?;
                    self.string(literal.datatype().as_str())?;
                }
                self.emit(JsonEvent::EndObject)
            }
            Term::Triple(triple) => self.triple(triple),
        }
    }

    fn triple(&mut self, triple: &Triple) -> io::Result<()> {
        self.emit(JsonEvent::StartObject)?;
        self.key("type")?;
        self.string("triple")?;
        self.key("value")?;
        self.emit(JsonEvent::StartObject)?;
        self.key("subject")?;
        match &triple.subject {
            Subject::NamedNode(node) => {
                self.typed_value("uri", node.as_str())?;
                self.emit(JsonEvent::EndObject)?;
            }
            Subject::BlankNode(node) => {
                self.typed_value("bnode", node.as_str())?;
                self.emit(JsonEvent::EndObject)?;
            }
            Subject::Triple(inner) => self.triple(inner)?,
        }
        self.key("predicate")?;
        self.typed_value("uri", triple.predicate.as_str())?;
        self.emit(JsonEvent::EndObject)?;
        self.key("object")?;
        self.term(&triple.object)?;
        self.emit(JsonEvent::EndObject)?;
        self.emit(JsonEvent::EndObject)
    }

    fn finish(self) -> io::Result<W> {
        self.serializer.finish()
    }
}

#[allow(clippy::large_enum_variant)]
pub enum JsonQueryResultsReader<R: Read> {
    Solutions {
        variables: Vec<Variable>,
        solutions: JsonSolutionsReader<R>,
    },
    Boolean(bool),
}

impl<R: Read> JsonQueryResultsReader<R> {
    pub fn read(reader: R) -> Result<Self, QueryResultsParseError> {
        let mut events = JsonIn::new(reader);
        events.expect_start_object("SPARQL JSON results must be an object")?;
        let mut variables: Option<Vec<Variable>> = None;
        // solutions seen before the head, buffered as (name, term) pairs
        let mut buffered: Option<Vec<Vec<(String, Term)>>> = None;
        loop {
            match events.next()? {
                Ev::Key(key) => match key.as_str() {
                    "head" => {
                        if let Some(vars) = read_head(&mut events)? {
                            variables = Some(vars);
                        }
                        if let (Some(variables), Some(buffered)) = (&variables, buffered.take()) {
                            let mapping = variable_positions(variables);
                            let mut rows = Vec::with_capacity(buffered.len());
                            for row in buffered {
                                rows.push(bind_row(row, &mapping)?);
                            }
                            return Ok(Self::Solutions {
                                variables: variables.clone(),
                                solutions: JsonSolutionsReader {
                                    events,
                                    mode: SolutionsMode::Buffered(rows.into_iter()),
                                },
                            });
                        }
                    }
                    "boolean" => {
                        if let Ev::Bool(value) = events.next()? {
                            return Ok(Self::Boolean(value));
                        }
                        return Err(QueryResultsSyntaxError::msg(
                            "the 'boolean' key must hold a boolean",
                        )
                        .into());
                    }
                    "results" => {
                        events.expect_start_object("the 'results' value must be an object")?;
                        loop {
                            match events.next()? {
                                Ev::Key(key) if key == "bindings" => break,
                                Ev::Key(_) => events.skip_value()?,
                                _ => {
                                    return Err(QueryResultsSyntaxError::msg(
                                        "the results object must contain a 'bindings' key",
                                    )
                                    .into());
                                }
                            }
                        }
                        if events.next()? != Ev::StartArray {
                            return Err(QueryResultsSyntaxError::msg(
                                "the 'bindings' value must be an array",
                            )
                            .into());
                        }
                        if let Some(variables) = variables.take() {
                            let mapping = variable_positions(&variables);
                            return Ok(Self::Solutions {
                                variables,
                                solutions: JsonSolutionsReader {
                                    events,
                                    mode: SolutionsMode::Streaming { mapping },
                                },
                            });
                        }
                        // head not seen yet, buffer everything
                        let mut rows = Vec::new();
                        while let Some(row) = read_raw_solution(&mut events)? {
                            rows.push(row);
                        }
                        // close the results object, skipping unknown keys
                        loop {
                            match events.next()? {
                                Ev::EndObject => break,
                                Ev::Key(_) => events.skip_value()?,
                                _ => {
                                    return Err(QueryResultsSyntaxError::msg(
                                        "invalid results object",
                                    )
                                    .into());
                                }
                            }
                        }
                        buffered = Some(rows);
                    }
                    _ => events.skip_value()?,
                },
                Ev::EndObject => {
                    return Err(QueryResultsSyntaxError::msg(
                        "SPARQL JSON results must contain a 'boolean' or a 'results' key",
                    )
                    .into());
                }
                _ => {
                    return Err(QueryResultsSyntaxError::msg("invalid results document").into());
                }
            }
        }
    }
}

pub struct JsonSolutionsReader<R: Read> {
    events: JsonIn<R>,
    mode: SolutionsMode,
}

enum SolutionsMode {
    Streaming { mapping: HashMap<String, usize> },
    Buffered(std::vec::IntoIter<Vec<Option<Term>>>),
}

impl<R: Read> JsonSolutionsReader<R> {
    pub fn read_next(&mut self) -> Result<Option<Vec<Option<Term>>>, QueryResultsParseError> {
        match &mut self.mode {
            SolutionsMode::Streaming { mapping } => {
                let Some(row) = read_raw_solution(&mut self.events)? else {
                    return Ok(None);
                };
                Ok(Some(bind_row(row, mapping)?))
            }
            SolutionsMode::Buffered(rows) => Ok(rows.next()),
        }
    }
}

fn variable_positions(variables: &[Variable]) -> HashMap<String, usize> {
    variables
        .iter()
        .enumerate()
        .map(|(i, v)| (v.as_str().to_owned(), i))
        .collect()
}

fn bind_row(
    row: Vec<(String, Term)>,
    mapping: &HashMap<String, usize>,
) -> Result<Vec<Option<Term>>, QueryResultsSyntaxError> {
    let mut bindings = vec![None; mapping.len()];
    for (name, term) in row {
        let position = *mapping.get(&name).ok_or_else(|| {
            QueryResultsSyntaxError::msg(format!(
                "the variable {name} has not been declared in the head"
            ))
        })?;
        bindings[position] = Some(term);
    }
    Ok(bindings)
}

/// Reads the head object, returning the declared variables if a `vars` key is present.
fn read_head<R: Read>(
    events: &mut JsonIn<R>,
) -> Result<Option<Vec<Variable>>, QueryResultsParseError> {
    events.expect_start_object("the 'head' value must be an object")?;
    let mut variables = None;
    loop {
        match events.next()? {
            Ev::Key(key) => match key.as_str() {
                "vars" => {
                    if events.next()? != Ev::StartArray {
                        return Err(QueryResultsSyntaxError::msg(
                            "the 'vars' value must be an array",
                        )
                        .into());
                    }
                    let mut vars: Vec<Variable> = Vec::new();
                    loop {
                        match events.next()? {
                            Ev::Str(name) => {
                                let variable = Variable::new(&name).map_err(|e| {
                                    QueryResultsSyntaxError::msg(format!(
                                        "invalid variable name '{name}': {e}"
                                    ))
                                })?;
                                if vars.contains(&variable) {
                                    return Err(QueryResultsSyntaxError::msg(format!(
                                        "the variable {variable} is declared twice"
                                    ))
                                    .into());
                                }
                                vars.push(variable);
                            }
                            Ev::EndArray => break,
                            _ => {
                                return Err(QueryResultsSyntaxError::msg(
                                    "variable names must be strings",
                                )
                                .into());
                            }
                        }
                    }
                    variables = Some(vars);
                }
                _ => events.skip_value()?,
            },
            Ev::EndObject => return Ok(variables),
            _ => return Err(QueryResultsSyntaxError::msg("invalid head object").into()),
        }
    }
}

/// Reads one binding object from the bindings array, or `None` at its end.
fn read_raw_solution<R: Read>(
    events: &mut JsonIn<R>,
) -> Result<Option<Vec<(String, Term)>>, QueryResultsParseError> {
    match events.next()? {
        Ev::StartObject => (),
        Ev::EndArray => return Ok(None),
        _ => return Err(QueryResultsSyntaxError::msg("expecting a solution object").into()),
    }
    let mut row = Vec::new();
    loop {
        match events.next()? {
            Ev::Key(name) => {
                let term = read_term(events)?;
                row.push((name, term));
            }
            Ev::EndObject => return Ok(Some(row)),
            _ => return Err(QueryResultsSyntaxError::msg("invalid solution object").into()),
        }
    }
}

/// Accumulated keys of a term object, before its `type` is interpreted.
#[derive(Default)]
struct TermParts {
    term_type: Option<String>,
    value: Option<String>,
    language: Option<String>,
    datatype: Option<NamedNode>,
    subject: Option<Term>,
    predicate: Option<Term>,
    object: Option<Term>,
}

fn read_term<R: Read>(events: &mut JsonIn<R>) -> Result<Term, QueryResultsParseError> {
    events.expect_start_object("RDF terms must be encoded using objects")?;
    let mut parts = TermParts::default();
    loop {
        match events.next()? {
            Ev::Key(key) => match key.as_str() {
                "type" => parts.term_type = Some(events.expect_string("the term type")?),
                "value" => {
                    // a plain string for simple terms, an object for quoted triples
                    match events.next()? {
                        Ev::Str(value) => parts.value = Some(value),
                        Ev::StartObject => read_triple_value(events, &mut parts)?,
                        _ => {
                            return Err(QueryResultsSyntaxError::msg(
                                "the term value must be a string or an object",
                            )
                            .into());
                        }
                    }
                }
                "xml:lang" => parts.language = Some(events.expect_string("the language tag")?),
                "datatype" => {
                    let iri = events.expect_string("the datatype")?;
                    parts.datatype = Some(NamedNode::new(&iri).map_err(|e| {
                        QueryResultsSyntaxError::msg(format!("invalid datatype '{iri}': {e}"))
                    })?);
                }
                _ => {
                    return Err(QueryResultsSyntaxError::msg(format!(
                        "unsupported term key: {key}"
                    ))
                    .into());
                }
            },
            Ev::EndObject => return Ok(build_term(parts)?),
            _ => return Err(QueryResultsSyntaxError::msg("invalid term object").into()),
        }
    }
}

fn read_triple_value<R: Read>(
    events: &mut JsonIn<R>,
    parts: &mut TermParts,
) -> Result<(), QueryResultsParseError> {
    loop {
        match events.next()? {
            Ev::Key(key) => match key.as_str() {
                "subject" => parts.subject = Some(read_term(events)?),
                "predicate" => parts.predicate = Some(read_term(events)?),
                "object" => parts.object = Some(read_term(events)?),
                _ => {
                    return Err(QueryResultsSyntaxError::msg(format!(
                        "unsupported triple key: {key}"
                    ))
                    .into());
                }
            },
            Ev::EndObject => return Ok(()),
            _ => return Err(QueryResultsSyntaxError::msg("invalid triple value").into()),
        }
    }
}

fn build_term(parts: TermParts) -> Result<Term, QueryResultsSyntaxError> {
    let term_type = parts
        .term_type
        .clone()
        .ok_or_else(|| QueryResultsSyntaxError::msg("a term must have a 'type' key"))?;
    let value = |parts: TermParts| {
        parts
            .value
            .ok_or_else(|| QueryResultsSyntaxError::msg("the term must have a 'value' key"))
    };
    match term_type.as_str() {
        "uri" => Ok(NamedNode::new(value(parts)?)
            .map_err(|e| QueryResultsSyntaxError::msg(format!("invalid uri value: {e}")))?
            .into()),
        "bnode" => Ok(BlankNode::new(value(parts)?)
            .map_err(|e| QueryResultsSyntaxError::msg(format!("invalid bnode value: {e}")))?
            .into()),
        "literal" | "typed-literal" => {
            if let Some(language) = parts.language.clone() {
                if let Some(datatype) = &parts.datatype {
                    if datatype.as_str() != rdf::LANG_STRING {
                        return Err(QueryResultsSyntaxError::msg(format!(
                            "the language tag '{language}' conflicts with the datatype {datatype}"
                        )));
                    }
                }
                Ok(Literal::new_language_tagged_literal(value(parts)?, &language)
                    .map_err(|e| {
                        QueryResultsSyntaxError::msg(format!(
                            "invalid language tag '{language}': {e}"
                        ))
                    })?
                    .into())
            } else if let Some(datatype) = parts.datatype.clone() {
                Ok(Literal::new_typed_literal(value(parts)?, datatype).into())
            } else {
                Ok(Literal::new_simple_literal(value(parts)?).into())
            }
        }
        "triple" => {
            let subject: Subject = match parts.subject.ok_or_else(|| {
                QueryResultsSyntaxError::msg("a triple must have a 'subject' key")
            })? {
                Term::NamedNode(s) => s.into(),
                Term::BlankNode(s) => s.into(),
                Term::Triple(s) => Subject::Triple(s),
                Term::Literal(_) => {
                    return Err(QueryResultsSyntaxError::msg(
                        "the 'subject' value must not be a literal",
                    ));
                }
            };
            let Some(Term::NamedNode(predicate)) = parts.predicate else {
                return Err(QueryResultsSyntaxError::msg(
                    "the 'predicate' value must be a uri",
                ));
            };
            let object = parts
                .object
                .ok_or_else(|| QueryResultsSyntaxError::msg("a triple must have an 'object' key"))?;
            Ok(Triple::new(subject, predicate, object).into())
        }
        _ => Err(QueryResultsSyntaxError::msg(format!(
            "unexpected term type: '{term_type}'"
        ))),
    }
}

/// Owned JSON events, so callers can keep pulling while a value is in scope.
#[derive(Eq, PartialEq)]
enum Ev {
    StartObject,
    EndObject,
    StartArray,
    EndArray,
    Key(String),
    Str(String),
    Number(String),
    Bool(bool),
    Null,
    Eof,
}

/// Pull-based access to the JSON event stream.
struct JsonIn<R: Read> {
    parser: ReaderJsonParser<R>,
}

impl<R: Read> JsonIn<R> {
    fn new(reader: R) -> Self {
        Self {
            parser: ReaderJsonParser::new(reader),
        }
    }

    fn next(&mut self) -> Result<Ev, QueryResultsParseError> {
        Ok(match self.parser.parse_next()? {
            JsonEvent::StartObject => Ev::StartObject,
            JsonEvent::EndObject => Ev::EndObject,
            JsonEvent::StartArray => Ev::StartArray,
            JsonEvent::EndArray => Ev::EndArray,
            JsonEvent::ObjectKey(key) => Ev::Key(key.into_owned()),
            JsonEvent::String(value) => Ev::Str(value.into_owned()),
            JsonEvent::Number(value) => Ev::Number(value.into_owned()),
            JsonEvent::Boolean(value) => Ev::Bool(value),
            JsonEvent::Null => Ev::Null,
            JsonEvent::Eof => Ev::Eof,
        })
    }

    fn expect_start_object(&mut self, message: &'static str) -> Result<(), QueryResultsParseError> {
        if self.next()? == Ev::StartObject {
            Ok(())
        } else {
            Err(QueryResultsSyntaxError::msg(message).into())
        }
    }

    fn expect_string(&mut self, what: &str) -> Result<String, QueryResultsParseError> {
        if let Ev::Str(value) = self.next()? {
            Ok(value)
        } else {
            Err(QueryResultsSyntaxError::msg(format!("{what} must be a string")).into())
        }
    }

    /// Skips the value following an unknown object key, however deep.
    fn skip_value(&mut self) -> Result<(), QueryResultsParseError> {
        let mut depth = 0usize;
        loop {
            match self.next()? {
                Ev::StartObject | Ev::StartArray => depth += 1,
                Ev::EndObject | Ev::EndArray => {
                    depth = depth.checked_sub(1).ok_or_else(|| {
                        QueryResultsSyntaxError::msg("unbalanced JSON document")
                    })?;
                }
                Ev::Eof => {
                    return Err(
                        QueryResultsSyntaxError::msg("unexpected end of JSON document").into(),
                    );
                }
                _ => (),
            }
            if depth == 0 {
                return Ok(());
            }
        }
    }
}
