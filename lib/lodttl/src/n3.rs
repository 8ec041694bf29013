//! A [N3](https://w3c.github.io/N3/spec/) streaming parser implemented by [`N3Parser`].

use crate::lexer::{
    expand_prefixed_name, TurtleLexer, TurtleLexerMode, TurtleLexerOptions, TurtleToken,
};
use crate::toolkit::{
    GrammarError, GrammarRecognizer, ParseError, Parser, ReaderIterator, SliceIterator,
    SyntaxError, Tokenizer,
};
use crate::{MAX_BUFFER_SIZE, MIN_BUFFER_SIZE};
use lodrdf::vocab::{log, owl, rdf, xsd};
use lodrdf::{BlankNode, GraphName, Literal, NamedNode, Subject, Term, Triple, Variable};
use oxiri::{Iri, IriParseError};
use std::collections::HashMap;
use std::fmt;
use std::io::Read;

/// A N3 term i.e. a RDF [`Term`] or a [`Variable`].
#[derive(Eq, PartialEq, Debug, Clone, Hash)]
pub enum N3Term {
    NamedNode(NamedNode),
    BlankNode(BlankNode),
    Literal(Literal),
    Triple(Box<Triple>),
    Variable(Variable),
}

impl fmt::Display for N3Term {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NamedNode(term) => term.fmt(f),
            Self::BlankNode(term) => term.fmt(f),
            Self::Literal(term) => term.fmt(f),
            Self::Triple(term) => term.fmt(f),
            Self::Variable(term) => term.fmt(f),
        }
    }
}

impl From<NamedNode> for N3Term {
    #[inline]
    fn from(node: NamedNode) -> Self {
        Self::NamedNode(node)
    }
}

impl From<BlankNode> for N3Term {
    #[inline]
    fn from(node: BlankNode) -> Self {
        Self::BlankNode(node)
    }
}

impl From<Literal> for N3Term {
    #[inline]
    fn from(literal: Literal) -> Self {
        Self::Literal(literal)
    }
}

impl From<Triple> for N3Term {
    #[inline]
    fn from(triple: Triple) -> Self {
        Self::Triple(Box::new(triple))
    }
}

impl From<Variable> for N3Term {
    #[inline]
    fn from(variable: Variable) -> Self {
        Self::Variable(variable)
    }
}

impl From<Subject> for N3Term {
    #[inline]
    fn from(node: Subject) -> Self {
        match node {
            Subject::NamedNode(node) => node.into(),
            Subject::BlankNode(node) => node.into(),
            Subject::Triple(triple) => Self::Triple(triple),
        }
    }
}

impl From<Term> for N3Term {
    #[inline]
    fn from(node: Term) -> Self {
        match node {
            Term::NamedNode(node) => node.into(),
            Term::BlankNode(node) => node.into(),
            Term::Literal(node) => node.into(),
            Term::Triple(triple) => Self::Triple(triple),
        }
    }
}

/// A N3 quad i.e. a quad composed of [`N3Term`].
///
/// The `graph_name` encodes the formula the triple is in: each `{ ... }`
/// formula is identified by a fresh blank node.
#[derive(Eq, PartialEq, Debug, Clone, Hash)]
pub struct N3Quad {
    pub subject: N3Term,
    pub predicate: N3Term,
    pub object: N3Term,
    pub graph_name: GraphName,
}

impl fmt::Display for N3Quad {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.subject, self.predicate, self.object)?;
        if self.graph_name != GraphName::DefaultGraph {
            write!(f, " {}", self.graph_name)?;
        }
        Ok(())
    }
}

/// A [N3](https://w3c.github.io/N3/spec/) streaming parser.
///
/// ```
/// use lodrdf::NamedNode;
/// use lodrdf::vocab::rdf;
/// use lodttl::n3::{N3Parser, N3Term};
///
/// let file = br#"@base <http://example.com/> .
/// @prefix schema: <http://schema.org/> .
/// <alice> a schema:Person ;
///     schema:name "Alice" .
/// <bob> a schema:Person ;
///     schema:name "Bob" ."#;
///
/// let rdf_type = N3Term::NamedNode(NamedNode::new_unchecked(rdf::TYPE));
/// let schema_person = N3Term::NamedNode(NamedNode::new("http://schema.org/Person")?);
/// let mut count = 0;
/// for triple in N3Parser::new().for_slice(file) {
///     let triple = triple?;
///     if triple.predicate == rdf_type && triple.object == schema_person {
///         count += 1;
///     }
/// }
/// assert_eq!(2, count);
/// # Result::<_, Box<dyn std::error::Error>>::Ok(())
/// ```
#[derive(Default, Clone)]
#[must_use]
pub struct N3Parser {
    lenient: bool,
    base_iri: Option<Iri<String>>,
    prefixes: HashMap<String, Iri<String>>,
}

impl N3Parser {
    #[inline]
    pub fn new() -> Self {
        Self::default()
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

    /// Parses from a [`Read`] implementation, reading it chunk by chunk.
    pub fn for_reader<R: Read>(self, reader: R) -> ReaderN3Parser<R> {
        let lenient = self.lenient;
        ReaderN3Parser {
            inner: self.low_level().parser.for_reader(reader, lenient),
        }
    }

    /// Parses from a complete in-memory byte slice.
    pub fn for_slice(self, slice: &[u8]) -> SliceN3Parser<'_> {
        SliceN3Parser {
            inner: N3Recognizer::new_slice_parser(slice, self.lenient, self.base_iri, self.prefixes)
                .into_iter(self.lenient),
        }
    }

    /// Builds a parser to which data is fed chunk by chunk, any chunk size.
    pub fn low_level(self) -> LowLevelN3Parser {
        LowLevelN3Parser {
            parser: N3Recognizer::new_parser(self.lenient, self.base_iri, self.prefixes),
        }
    }
}

/// Parses a N3 file from a [`Read`] implementation.
///
/// Can be built using [`N3Parser::for_reader`].
#[must_use]
pub struct ReaderN3Parser<R: Read> {
    inner: ReaderIterator<R, N3Recognizer>,
}

impl<R: Read> Iterator for ReaderN3Parser<R> {
    type Item = Result<N3Quad, ParseError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }
}

impl<R: Read> ReaderN3Parser<R> {
    /// The prefixes declared so far, including the ones from directives already parsed.
    pub fn prefixes(&self) -> impl Iterator<Item = (&str, &str)> {
        self.inner.parser.context.prefixes()
    }

    /// The base IRI in effect, if any.
    pub fn base_iri(&self) -> Option<&str> {
        self.inner.parser.context.base_iri()
    }
}

/// Parses a N3 file from a byte slice.
///
/// Can be built using [`N3Parser::for_slice`].
#[must_use]
pub struct SliceN3Parser<'a> {
    inner: SliceIterator<'a, N3Recognizer>,
}

impl Iterator for SliceN3Parser<'_> {
    type Item = Result<N3Quad, SyntaxError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }
}

impl SliceN3Parser<'_> {
    /// The prefixes declared so far, including the ones from directives already parsed.
    pub fn prefixes(&self) -> impl Iterator<Item = (&str, &str)> {
        self.inner.parser.context.prefixes()
    }

    /// The base IRI in effect, if any.
    pub fn base_iri(&self) -> Option<&str> {
        self.inner.parser.context.base_iri()
    }
}

/// Parses a N3 file by feeding it chunk by chunk.
///
/// Can be built using [`N3Parser::low_level`].
pub struct LowLevelN3Parser {
    parser: Parser<Vec<u8>, N3Recognizer>,
}

impl LowLevelN3Parser {
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
    pub fn parse_next(&mut self) -> Option<Result<N3Quad, SyntaxError>> {
        self.parser.parse_next()
    }

    /// The prefixes declared so far, including the ones from directives already parsed.
    pub fn prefixes(&self) -> impl Iterator<Item = (&str, &str)> {
        self.parser.context.prefixes()
    }

    /// The base IRI in effect, if any.
    pub fn base_iri(&self) -> Option<&str> {
        self.parser.context.base_iri()
    }
}

/// A verb with its direction: `<=` and `is ... of` swap subject and object.
#[derive(Clone)]
enum Verb {
    Forward(N3Term),
    Backward(N3Term),
}

pub struct N3Recognizer {
    stack: Vec<N3State>,
    terms: Vec<N3Term>,
    verbs: Vec<Verb>,
    formulas: Vec<BlankNode>,
}

pub struct N3RecognizerContext {
    lexer_options: TurtleLexerOptions,
    prefixes: HashMap<String, Iri<String>>,
}

impl N3RecognizerContext {
    /// The (prefix name, prefix IRI) pairs in effect.
    pub fn prefixes(&self) -> impl Iterator<Item = (&str, &str)> {
        self.prefixes
            .iter()
            .map(|(name, iri)| (name.as_str(), iri.as_str()))
    }

    /// The base IRI in effect, if any.
    pub fn base_iri(&self) -> Option<&str> {
        self.lexer_options.base_iri.as_ref().map(Iri::as_str)
    }
}

impl GrammarRecognizer for N3Recognizer {
    type TokenSource = TurtleLexer;
    type Output = N3Quad;
    type Context = N3RecognizerContext;

    fn error_recovery_state(mut self) -> Self {
        self.stack.clear();
        self.terms.clear();
        self.verbs.clear();
        self.formulas.clear();
        self
    }

    fn recognize_next(
        mut self,
        token: TurtleToken<'_>,
        context: &mut N3RecognizerContext,
        results: &mut Vec<N3Quad>,
        errors: &mut Vec<GrammarError>,
    ) -> Self {
        if matches!(token, TurtleToken::LineJump) {
            return self;
        }
        let Some(state) = self.stack.pop() else {
            if token == TurtleToken::Punctuation(".") {
                self.stack.push(N3State::Doc);
            }
            return self;
        };
        match state {
            // n3Doc        ::=  ((n3Statement ".") | sparqlDirective)*
            // n3Directive  ::=  prefixID | base
            N3State::Doc => {
                self.stack.push(N3State::Doc);
                match token {
                    TurtleToken::Keyword(k) if k.eq_ignore_ascii_case("base") => {
                        self.stack.push(N3State::BaseIri);
                        self
                    }
                    TurtleToken::Keyword(k) if k.eq_ignore_ascii_case("prefix") => {
                        self.stack.push(N3State::PrefixName);
                        self
                    }
                    TurtleToken::LangTag("prefix") => {
                        self.stack.push(N3State::EndDot);
                        self.stack.push(N3State::PrefixName);
                        self
                    }
                    TurtleToken::LangTag("base") => {
                        self.stack.push(N3State::EndDot);
                        self.stack.push(N3State::BaseIri);
                        self
                    }
                    token => {
                        self.stack.push(N3State::EndDot);
                        self.stack.push(N3State::Triples);
                        self.recognize_next(token, context, results, errors)
                    }
                }
            }
            N3State::EndDot => {
                if token == TurtleToken::Punctuation(".") {
                    return self;
                }
                errors.push("A dot is expected at the end of N3 statements".into());
                self.recognize_next(token, context, results, errors)
            }
            N3State::BaseIri => {
                if let TurtleToken::Iri(iri) = token {
                    context.lexer_options.base_iri = Some(Iri::parse_unchecked(iri));
                    self
                } else {
                    self.fail(errors, "The BASE keyword should be followed by an IRI")
                }
            }
            N3State::PrefixName => match token {
                TurtleToken::PrefixedName { prefix, local, .. } if local.is_empty() => {
                    self.stack.push(N3State::PrefixValue {
                        name: prefix.to_owned(),
                    });
                    self
                }
                _ => self.fail(
                    errors,
                    "The PREFIX keyword should be followed by a prefix like 'ex:'",
                ),
            },
            N3State::PrefixValue { name } => {
                if let TurtleToken::Iri(iri) = token {
                    context.prefixes.insert(name, Iri::parse_unchecked(iri));
                    self
                } else {
                    self.fail(errors, "The PREFIX declaration should be followed by a prefix and its value as an IRI")
                }
            }
            // triples  ::=  subject predicateObjectList?
            N3State::Triples => {
                self.stack.push(N3State::TriplesBody);
                self.stack.push(N3State::Path);
                self.recognize_next(token, context, results, errors)
            }
            N3State::TriplesBody => {
                if !matches!(token, TurtleToken::Punctuation("." | "]" | "}" | ")")) {
                    self.stack.push(N3State::TriplesDone);
                    self.stack.push(N3State::PredicateObjects);
                }
                self.recognize_next(token, context, results, errors)
            }
            N3State::TriplesDone => {
                self.terms.pop();
                self.recognize_next(token, context, results, errors)
            }
            // predicateObjectList  ::=  verb objectList (";" (verb objectList)?)*
            N3State::PredicateObjects => {
                self.stack.push(N3State::PredicateObjectsEnd);
                self.stack.push(N3State::Objects);
                self.stack.push(N3State::Verb);
                self.recognize_next(token, context, results, errors)
            }
            N3State::PredicateObjectsEnd => {
                self.verbs.pop();
                if token == TurtleToken::Punctuation(";") {
                    self.stack.push(N3State::PredicateObjectsNext);
                    return self;
                }
                self.recognize_next(token, context, results, errors)
            }
            N3State::PredicateObjectsNext => {
                if token == TurtleToken::Punctuation(";") {
                    self.stack.push(N3State::PredicateObjectsNext);
                    return self;
                }
                if !matches!(token, TurtleToken::Punctuation("." | "}" | "]" | ")")) {
                    self.stack.push(N3State::PredicateObjectsEnd);
                    self.stack.push(N3State::Objects);
                    self.stack.push(N3State::Verb);
                }
                self.recognize_next(token, context, results, errors)
            }
            // objectList  ::=  object ("," object)*
            N3State::Objects => {
                self.stack.push(N3State::ObjectsEnd);
                self.stack.push(N3State::Path);
                self.recognize_next(token, context, results, errors)
            }
            N3State::ObjectsEnd => {
                let object = self.pop_term();
                let subject = self.peek_term();
                results.push(match self.peek_verb() {
                    Verb::Forward(predicate) => self.quad(subject, predicate, object),
                    Verb::Backward(predicate) => self.quad(object, predicate, subject),
                });
                if token == TurtleToken::Punctuation(",") {
                    self.stack.push(N3State::ObjectsEnd);
                    self.stack.push(N3State::Path);
                    return self;
                }
                self.recognize_next(token, context, results, errors)
            }
            // verb       ::=  predicate | "a" | ("has" expression) | ("is" expression "of") | "=" | "<=" | "=>"
            // predicate  ::=  expression | ("<-" expression)
            N3State::Verb => match token {
                TurtleToken::Keyword("a") => {
                    self.push_forward_verb(rdf::TYPE);
                    self
                }
                TurtleToken::Punctuation("=") => {
                    self.push_forward_verb(owl::SAME_AS);
                    self
                }
                TurtleToken::Punctuation("=>") => {
                    self.push_forward_verb(log::IMPLIES);
                    self
                }
                TurtleToken::Punctuation("<=") => {
                    self.verbs
                        .push(Verb::Backward(NamedNode::new_unchecked(log::IMPLIES).into()));
                    self
                }
                TurtleToken::Keyword("has") => {
                    self.stack.push(N3State::VerbDone);
                    self.stack.push(N3State::Path);
                    self
                }
                TurtleToken::Keyword("is") => {
                    self.stack.push(N3State::VerbIsOf);
                    self.stack.push(N3State::Path);
                    self
                }
                TurtleToken::Punctuation("<-") => {
                    self.stack.push(N3State::BackwardVerbDone);
                    self.stack.push(N3State::Path);
                    self
                }
                token => {
                    self.stack.push(N3State::VerbDone);
                    self.stack.push(N3State::Path);
                    self.recognize_next(token, context, results, errors)
                }
            },
            N3State::VerbDone => {
                let predicate = self.pop_term();
                self.verbs.push(Verb::Forward(predicate));
                self.recognize_next(token, context, results, errors)
            }
            N3State::BackwardVerbDone => {
                let predicate = self.pop_term();
                self.verbs.push(Verb::Backward(predicate));
                self.recognize_next(token, context, results, errors)
            }
            N3State::VerbIsOf => match token {
                TurtleToken::Keyword("of") => {
                    let predicate = self.pop_term();
                    self.verbs.push(Verb::Backward(predicate));
                    self
                }
                _ => self.fail(
                    errors,
                    "The keyword 'is' should be followed by a predicate then by the keyword 'of'",
                ),
            },
            // expression  ::=  path
            // path        ::=  pathItem (("!" path) | ("^" path))?
            N3State::Path => {
                self.stack.push(N3State::PathNext);
                self.stack.push(N3State::Item);
                self.recognize_next(token, context, results, errors)
            }
            N3State::PathNext => match token {
                TurtleToken::Punctuation("!") => {
                    self.stack.push(N3State::PathStep { inverse: false });
                    self.stack.push(N3State::Item);
                    self
                }
                TurtleToken::Punctuation("^") => {
                    self.stack.push(N3State::PathStep { inverse: true });
                    self.stack.push(N3State::Item);
                    self
                }
                token => self.recognize_next(token, context, results, errors),
            },
            N3State::PathStep { inverse } => {
                let predicate = self.pop_term();
                let previous = self.pop_term();
                let current = BlankNode::default();
                results.push(if inverse {
                    self.quad(current.clone(), predicate, previous)
                } else {
                    self.quad(previous, predicate, current.clone())
                });
                self.terms.push(current.into());
                self.stack.push(N3State::PathNext);
                self.recognize_next(token, context, results, errors)
            }
            // pathItem               ::=  iri | blankNode | quickVar | collection | blankNodePropertyList | iriPropertyList | literal | formula
            // blankNodePropertyList  ::=  "[" predicateObjectList "]"
            // iriPropertyList        ::=  IPLSTART iri predicateObjectList "]"
            // collection             ::=  "(" object* ")"
            N3State::Item => match token {
                TurtleToken::Punctuation("[") => {
                    self.stack.push(N3State::AnonStart);
                    self
                }
                TurtleToken::Punctuation("(") => {
                    self.stack.push(N3State::ListStart);
                    self
                }
                TurtleToken::Punctuation("{") => {
                    self.formulas.push(BlankNode::default());
                    self.stack.push(N3State::Formula);
                    self
                }
                TurtleToken::String(value) | TurtleToken::LongString(value) => {
                    self.stack.push(N3State::LiteralSuffix { value });
                    self
                }
                token => match item_term(token, context) {
                    Some(Ok(term)) => {
                        self.terms.push(term);
                        self
                    }
                    Some(Err(e)) => self.fail(errors, e),
                    None => self.fail(errors, "TOKEN is not a valid RDF value"),
                },
            },
            N3State::AnonStart => match token {
                TurtleToken::Punctuation("]") => {
                    self.terms.push(BlankNode::default().into());
                    self
                }
                TurtleToken::Keyword("id") => {
                    self.stack.push(N3State::IdPropertyList);
                    self
                }
                token => {
                    self.terms.push(BlankNode::default().into());
                    self.stack.push(N3State::AnonEnd);
                    self.stack.push(N3State::PredicateObjects);
                    self.recognize_next(token, context, results, errors)
                }
            },
            N3State::AnonEnd => {
                if token == TurtleToken::Punctuation("]") {
                    return self;
                }
                errors.push("blank node property lists should end with a ']'".into());
                self.recognize_next(token, context, results, errors)
            }
            N3State::IdPropertyList => match named_node(token, context) {
                Ok(Ok(id)) => {
                    self.terms.push(id.into());
                    self.stack.push(N3State::AnonEnd);
                    self.stack.push(N3State::PredicateObjects);
                    self
                }
                Ok(Err(e)) => self.fail(errors, e),
                Err(_) => self.fail(
                    errors,
                    "The '[ id' construction should be followed by an IRI",
                ),
            },
            N3State::ListStart => {
                if token == TurtleToken::Punctuation(")") {
                    self.terms.push(NamedNode::new_unchecked(rdf::NIL).into());
                    return self;
                }
                let root = BlankNode::default();
                self.terms.push(root.clone().into());
                self.terms.push(root.into());
                self.stack.push(N3State::ListNext);
                self.stack.push(N3State::Path);
                self.recognize_next(token, context, results, errors)
            }
            N3State::ListNext => {
                let value = self.pop_term();
                let cell = self.pop_term();
                results.push(self.quad(cell.clone(), NamedNode::new_unchecked(rdf::FIRST), value));
                if token == TurtleToken::Punctuation(")") {
                    results.push(self.quad(
                        cell,
                        NamedNode::new_unchecked(rdf::REST),
                        NamedNode::new_unchecked(rdf::NIL),
                    ));
                    return self;
                }
                let next = BlankNode::default();
                results.push(self.quad(cell, NamedNode::new_unchecked(rdf::REST), next.clone()));
                self.terms.push(next.into());
                self.stack.push(N3State::ListNext);
                self.stack.push(N3State::Path);
                self.recognize_next(token, context, results, errors)
            }
            // rdfLiteral  ::=  STRING (LANGTAG | ("^^" iri))?
            N3State::LiteralSuffix { value } => match token {
                TurtleToken::LangTag(language) => {
                    self.terms.push(
                        Literal::new_language_tagged_literal_unchecked(
                            value,
                            language.to_ascii_lowercase(),
                        )
                        .into(),
                    );
                    self
                }
                TurtleToken::Punctuation("^^") => {
                    self.stack.push(N3State::LiteralDatatype { value });
                    self
                }
                token => {
                    self.terms.push(Literal::new_simple_literal(value).into());
                    self.recognize_next(token, context, results, errors)
                }
            },
            N3State::LiteralDatatype { value } => match named_node(token, context) {
                Ok(Ok(datatype)) => {
                    self.terms
                        .push(Literal::new_typed_literal(value, datatype).into());
                    self
                }
                Ok(Err(e)) => self.fail(errors, e),
                Err(token) => {
                    errors.push("Expecting a datatype IRI after '^^', found TOKEN".into());
                    self.stack.clear();
                    self.recognize_next(token, context, results, errors)
                }
            },
            // formula         ::=  "{" formulaContent? "}"
            // formulaContent  ::=  (n3Statement ("." formulaContent?)?) | (sparqlDirective formulaContent?)
            N3State::Formula => match token {
                TurtleToken::Punctuation("}") => {
                    let formula = self.close_formula();
                    self.terms.push(formula.into());
                    self
                }
                TurtleToken::Keyword(k) if k.eq_ignore_ascii_case("base") => {
                    self.stack.push(N3State::Formula);
                    self.stack.push(N3State::BaseIri);
                    self
                }
                TurtleToken::Keyword(k) if k.eq_ignore_ascii_case("prefix") => {
                    self.stack.push(N3State::Formula);
                    self.stack.push(N3State::PrefixName);
                    self
                }
                TurtleToken::LangTag("prefix") => {
                    self.stack.push(N3State::FormulaDot);
                    self.stack.push(N3State::PrefixName);
                    self
                }
                TurtleToken::LangTag("base") => {
                    self.stack.push(N3State::FormulaDot);
                    self.stack.push(N3State::BaseIri);
                    self
                }
                token => {
                    self.stack.push(N3State::FormulaDot);
                    self.stack.push(N3State::Triples);
                    self.recognize_next(token, context, results, errors)
                }
            },
            N3State::FormulaDot => match token {
                TurtleToken::Punctuation("}") => {
                    let formula = self.close_formula();
                    self.terms.push(formula.into());
                    self
                }
                TurtleToken::Punctuation(".") => {
                    self.stack.push(N3State::Formula);
                    self
                }
                token => {
                    errors.push("A dot is expected at the end of N3 statements".into());
                    self.stack.push(N3State::Formula);
                    self.recognize_next(token, context, results, errors)
                }
            },
        }
    }

    fn recognize_end(
        self,
        _context: &mut N3RecognizerContext,
        _results: &mut Vec<Self::Output>,
        errors: &mut Vec<GrammarError>,
    ) {
        if !matches!(&*self.stack, [] | [N3State::Doc]) {
            errors.push("Unexpected end of file".into());
        }
    }

    fn lexer_options(context: &N3RecognizerContext) -> &TurtleLexerOptions {
        &context.lexer_options
    }
}

impl N3Recognizer {
    pub fn new_parser(
        lenient: bool,
        base_iri: Option<Iri<String>>,
        prefixes: HashMap<String, Iri<String>>,
    ) -> Parser<Vec<u8>, Self> {
        Parser::new(
            Tokenizer::new(
                TurtleLexer::new(TurtleLexerMode::N3, lenient),
                MIN_BUFFER_SIZE,
                MAX_BUFFER_SIZE,
                true,
                Some(b"#"),
            ),
            Self::recognizer(),
            Self::context(base_iri, prefixes),
        )
    }

    pub fn new_slice_parser(
        data: &[u8],
        lenient: bool,
        base_iri: Option<Iri<String>>,
        prefixes: HashMap<String, Iri<String>>,
    ) -> Parser<&[u8], Self> {
        Parser::new(
            Tokenizer::from_slice(
                TurtleLexer::new(TurtleLexerMode::N3, lenient),
                data,
                true,
                Some(b"#"),
            ),
            Self::recognizer(),
            Self::context(base_iri, prefixes),
        )
    }

    fn recognizer() -> Self {
        Self {
            stack: vec![N3State::Doc],
            terms: Vec::new(),
            verbs: Vec::new(),
            formulas: Vec::new(),
        }
    }

    fn context(
        base_iri: Option<Iri<String>>,
        prefixes: HashMap<String, Iri<String>>,
    ) -> N3RecognizerContext {
        N3RecognizerContext {
            lexer_options: TurtleLexerOptions { base_iri },
            prefixes,
        }
    }

    #[must_use]
    fn fail(mut self, errors: &mut Vec<GrammarError>, message: impl Into<GrammarError>) -> Self {
        errors.push(message.into());
        self.stack.clear();
        self
    }

    fn push_forward_verb(&mut self, iri: &str) {
        self.verbs
            .push(Verb::Forward(NamedNode::new_unchecked(iri).into()));
    }

    fn pop_term(&mut self) -> N3Term {
        self.terms
            .pop()
            .unwrap_or_else(|| unreachable!("The term stack is empty"))
    }

    fn peek_term(&self) -> N3Term {
        self.terms
            .last()
            .cloned()
            .unwrap_or_else(|| unreachable!("The term stack is empty"))
    }

    fn peek_verb(&self) -> Verb {
        self.verbs
            .last()
            .cloned()
            .unwrap_or_else(|| unreachable!("The verb stack is empty"))
    }

    fn close_formula(&mut self) -> BlankNode {
        self.formulas
            .pop()
            .unwrap_or_else(|| unreachable!("The formula stack is empty"))
    }

    fn quad(
        &self,
        subject: impl Into<N3Term>,
        predicate: impl Into<N3Term>,
        object: impl Into<N3Term>,
    ) -> N3Quad {
        N3Quad {
            subject: subject.into(),
            predicate: predicate.into(),
            object: object.into(),
            graph_name: self
                .formulas
                .last()
                .map_or(GraphName::DefaultGraph, |g| g.clone().into()),
        }
    }
}

/// Resolves a token that can only be an IRI, expanding prefixed names.
///
/// Tokens that cannot be an IRI are handed back to the caller.
fn named_node<'a>(
    token: TurtleToken<'a>,
    context: &N3RecognizerContext,
) -> Result<Result<NamedNode, GrammarError>, TurtleToken<'a>> {
    match token {
        TurtleToken::Iri(iri) => Ok(Ok(NamedNode::new_unchecked(iri))),
        TurtleToken::PrefixedName {
            prefix,
            local,
            needs_iri_check,
        } => Ok(
            expand_prefixed_name(prefix, &local, needs_iri_check, &context.prefixes)
                .map_err(Into::into),
        ),
        token => Err(token),
    }
}

/// Resolves the single-token `pathItem` cases: IRIs, blank node labels, quick
/// variables, numbers and booleans.
fn item_term(
    token: TurtleToken<'_>,
    context: &N3RecognizerContext,
) -> Option<Result<N3Term, GrammarError>> {
    Some(Ok(match token {
        TurtleToken::BlankNodeLabel(label) => BlankNode::new_unchecked(label).into(),
        TurtleToken::Variable(name) => Variable::new_unchecked(name).into(),
        TurtleToken::Integer(v) => typed_literal(v, xsd::INTEGER),
        TurtleToken::Decimal(v) => typed_literal(v, xsd::DECIMAL),
        TurtleToken::Double(v) => typed_literal(v, xsd::DOUBLE),
        TurtleToken::Keyword(k @ ("true" | "false")) => typed_literal(k, xsd::BOOLEAN),
        token => return named_node(token, context).ok().map(|r| r.map(Into::into)),
    }))
}

fn typed_literal(value: &str, datatype: &str) -> N3Term {
    Literal::new_typed_literal(value, NamedNode::new_unchecked(datatype)).into()
}

#[derive(Debug)]
enum N3State {
    Doc,
    EndDot,
    BaseIri,
    PrefixName,
    PrefixValue { name: String },
    Triples,
    TriplesBody,
    TriplesDone,
    PredicateObjects,
    PredicateObjectsEnd,
    PredicateObjectsNext,
    Objects,
    ObjectsEnd,
    Verb,
    VerbDone,
    BackwardVerbDone,
    VerbIsOf,
    Path,
    PathNext,
    PathStep { inverse: bool },
    Item,
    AnonStart,
    AnonEnd,
    IdPropertyList,
    ListStart,
    ListNext,
    LiteralSuffix { value: String },
    LiteralDatatype { value: String },
    Formula,
    FormulaDot,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn implies() -> N3Term {
        NamedNode::new_unchecked(log::IMPLIES).into()
    }

    #[test]
    fn parse_rule_with_formulas() -> Result<(), Box<dyn std::error::Error>> {
        let file = br#"@prefix ex: <http://example.com/> .
{ ?x ex:knows ?y . } => { ?y ex:knows ?x . } .
"#;
        let quads = N3Parser::new()
            .for_slice(file)
            .collect::<Result<Vec<_>, _>>()?;
        assert_eq!(quads.len(), 3);
        // The formula contents are grouped by fresh blank node graph names
        let GraphName::BlankNode(premise) = &quads[0].graph_name else {
            panic!("the premise should be in a formula");
        };
        let GraphName::BlankNode(conclusion) = &quads[1].graph_name else {
            panic!("the conclusion should be in a formula");
        };
        assert_ne!(premise, conclusion);
        assert_eq!(quads[2].predicate, implies());
        assert_eq!(quads[2].graph_name, GraphName::DefaultGraph);
        assert_eq!(quads[2].subject, N3Term::BlankNode(premise.clone()));
        assert_eq!(quads[2].object, N3Term::BlankNode(conclusion.clone()));
        Ok(())
    }

    #[test]
    fn parse_quick_variables() -> Result<(), Box<dyn std::error::Error>> {
        let file = b"?s <http://example.com/p> ?o .";
        let quads = N3Parser::new()
            .for_slice(file)
            .collect::<Result<Vec<_>, _>>()?;
        assert_eq!(quads[0].subject, N3Term::Variable(Variable::new("s")?));
        assert_eq!(quads[0].object, N3Term::Variable(Variable::new("o")?));
        Ok(())
    }

    #[test]
    fn parse_inverted_implication() -> Result<(), Box<dyn std::error::Error>> {
        let file = br#"@prefix ex: <http://example.com/> .
ex:a <= ex:b .
"#;
        let quads = N3Parser::new()
            .for_slice(file)
            .collect::<Result<Vec<_>, _>>()?;
        assert_eq!(quads.len(), 1);
        // "<=" swaps subject and object around log:implies
        assert_eq!(
            quads[0].subject,
            N3Term::NamedNode(NamedNode::new("http://example.com/b")?)
        );
        assert_eq!(quads[0].predicate, implies());
        assert_eq!(
            quads[0].object,
            N3Term::NamedNode(NamedNode::new("http://example.com/a")?)
        );
        Ok(())
    }

    #[test]
    fn parse_equality_and_type_shorthands() -> Result<(), Box<dyn std::error::Error>> {
        let file = br#"@prefix ex: <http://example.com/> .
ex:a = ex:b .
ex:a a ex:Class .
"#;
        let quads = N3Parser::new()
            .for_slice(file)
            .collect::<Result<Vec<_>, _>>()?;
        assert_eq!(
            quads[0].predicate,
            N3Term::NamedNode(NamedNode::new("http://www.w3.org/2002/07/owl#sameAs")?)
        );
        assert_eq!(
            quads[1].predicate,
            N3Term::NamedNode(NamedNode::new_unchecked(rdf::TYPE))
        );
        Ok(())
    }

    #[test]
    fn parse_path_expansion() -> Result<(), Box<dyn std::error::Error>> {
        let file = br#"@prefix ex: <http://example.com/> .
ex:joe!ex:mother ex:livesIn ex:rome .
"#;
        let quads = N3Parser::new()
            .for_slice(file)
            .collect::<Result<Vec<_>, _>>()?;
        assert_eq!(quads.len(), 2);
        // "joe!mother" introduces an intermediate blank node for joe's mother
        assert_eq!(
            quads[0].subject,
            N3Term::NamedNode(NamedNode::new("http://example.com/joe")?)
        );
        assert_eq!(
            quads[0].predicate,
            N3Term::NamedNode(NamedNode::new("http://example.com/mother")?)
        );
        assert_eq!(quads[0].object, quads[1].subject);
        Ok(())
    }

    #[test]
    fn parse_is_of_verb() -> Result<(), Box<dyn std::error::Error>> {
        let file = br#"@prefix ex: <http://example.com/> .
ex:rome is ex:livesIn of ex:giulia .
"#;
        let quads = N3Parser::new()
            .for_slice(file)
            .collect::<Result<Vec<_>, _>>()?;
        assert_eq!(quads.len(), 1);
        assert_eq!(
            quads[0].subject,
            N3Term::NamedNode(NamedNode::new("http://example.com/giulia")?)
        );
        assert_eq!(
            quads[0].object,
            N3Term::NamedNode(NamedNode::new("http://example.com/rome")?)
        );
        Ok(())
    }
}
