//! Shared parser implementation for Turtle and TriG.

use crate::lexer::{
    expand_prefixed_name, TurtleLexer, TurtleLexerMode, TurtleLexerOptions, TurtleToken,
};
use crate::toolkit::{GrammarError, GrammarRecognizer, Parser, Tokenizer};
use crate::{MAX_BUFFER_SIZE, MIN_BUFFER_SIZE};
use lodrdf::vocab::{rdf, xsd};
use lodrdf::{BlankNode, GraphName, Literal, NamedNode, Quad, Subject, Term, Triple};
use oxiri::Iri;
use std::collections::hash_map::Iter;
use std::collections::HashMap;

/// Recursive-descent state machine over the Turtle/TriG grammar.
///
/// The `subjects`, `predicates` and `objects` stacks hold the terms of the
/// statements currently being built, one level per nesting construct
/// (blank node property lists, collections, quoted triples).
pub struct TerseRecognizer {
    stack: Vec<TerseState>,
    subjects: Vec<Subject>,
    predicates: Vec<NamedNode>,
    objects: Vec<Term>,
    graph: GraphName,
}

/// The dialect switches shared by the Turtle and TriG front ends.
///
/// They default to the most permissive combination, the front ends restrict
/// them according to the selected dialect.
#[allow(clippy::struct_excessive_bools)]
pub struct TerseRecognizerContext {
    pub lexer_options: TurtleLexerOptions,
    pub with_graph_name: bool,
    pub with_quoted_triples: bool,
    /// `PREFIX` and `BASE` keywords without a trailing dot.
    pub sparql_style_directives: bool,
    /// `@prefix` and `@base` inside graph blocks, scoped to the block.
    pub in_block_directives: bool,
    /// The `GRAPH` keyword before a graph name.
    pub graph_keyword: bool,
    /// `[]` as a graph name.
    pub anonymous_graph_name: bool,
    prefixes: HashMap<String, Iri<String>>,
    /// Snapshots taken when entering a graph block with scoped directives.
    directive_scopes: Vec<(HashMap<String, Iri<String>>, Option<Iri<String>>)>,
}

impl TerseRecognizerContext {
    pub fn prefixes(&self) -> Iter<'_, String, Iri<String>> {
        self.prefixes.iter()
    }

    pub fn base_iri(&self) -> Option<&Iri<String>> {
        self.lexer_options.base_iri.as_ref()
    }

    fn open_directive_scope(&mut self) {
        if self.in_block_directives {
            self.directive_scopes
                .push((self.prefixes.clone(), self.lexer_options.base_iri.clone()));
        }
    }

    fn close_directive_scope(&mut self) {
        if let Some((prefixes, base_iri)) = self.directive_scopes.pop() {
            self.prefixes = prefixes;
            self.lexer_options.base_iri = base_iri;
        }
    }
}

impl GrammarRecognizer for TerseRecognizer {
    type TokenSource = TurtleLexer;
    type Output = Quad;
    type Context = TerseRecognizerContext;

    fn error_recovery_state(mut self) -> Self {
        self.reset();
        self
    }

    #[allow(clippy::too_many_lines)]
    fn recognize_next(
        mut self,
        token: TurtleToken<'_>,
        context: &mut TerseRecognizerContext,
        results: &mut Vec<Quad>,
        errors: &mut Vec<GrammarError>,
    ) -> Self {
        if matches!(token, TurtleToken::LineJump) {
            return self;
        }
        let Some(state) = self.stack.pop() else {
            // Skips junk between statements while recovering from an error
            if matches!(token, TurtleToken::Punctuation("." | "}")) {
                self.stack.push(TerseState::Doc);
            }
            return self;
        };
        match state {
            // trigDoc    ::=  (directive | block)*
            // directive  ::=  prefixID | base | sparqlPrefix | sparqlBase
            TerseState::Doc => {
                self.graph = GraphName::DefaultGraph;
                self.stack.push(TerseState::Doc);
                match token {
                    TurtleToken::LangTag("prefix") => {
                        self.stack.push(TerseState::EndDot);
                        self.stack.push(TerseState::PrefixName);
                        self
                    }
                    TurtleToken::LangTag("base") => {
                        self.stack.push(TerseState::EndDot);
                        self.stack.push(TerseState::BaseIri);
                        self
                    }
                    TurtleToken::Keyword(k)
                        if context.sparql_style_directives
                            && k.eq_ignore_ascii_case("prefix") =>
                    {
                        self.stack.push(TerseState::PrefixName);
                        self
                    }
                    TurtleToken::Keyword(k)
                        if context.sparql_style_directives && k.eq_ignore_ascii_case("base") =>
                    {
                        self.stack.push(TerseState::BaseIri);
                        self
                    }
                    TurtleToken::Keyword(k)
                        if context.with_graph_name
                            && context.graph_keyword
                            && k.eq_ignore_ascii_case("graph") =>
                    {
                        self.stack.push(TerseState::GraphBody);
                        self.stack.push(TerseState::GraphLabel);
                        self
                    }
                    TurtleToken::Punctuation("{") if context.with_graph_name => {
                        self.stack.push(TerseState::GraphBody);
                        self.recognize_next(token, context, results, errors)
                    }
                    _ => {
                        self.stack.push(TerseState::BlockStart);
                        self.recognize_next(token, context, results, errors)
                    }
                }
            }
            TerseState::EndDot => {
                self.subjects.pop();
                if token == TurtleToken::Punctuation(".") {
                    self
                } else {
                    errors.push("A dot is expected at the end of statements".into());
                    self.recognize_next(token, context, results, errors)
                }
            }
            TerseState::BaseIri => {
                if let TurtleToken::Iri(iri) = token {
                    context.lexer_options.base_iri = Some(Iri::parse_unchecked(iri));
                    self
                } else {
                    self.fail(errors, "The BASE keyword should be followed by an IRI")
                }
            }
            TerseState::PrefixName => match token {
                TurtleToken::PrefixedName { prefix, local, .. } if local.is_empty() => {
                    self.stack.push(TerseState::PrefixValue {
                        name: prefix.to_owned(),
                    });
                    self
                }
                _ => self.fail(
                    errors,
                    "The PREFIX keyword should be followed by a prefix like 'ex:'",
                ),
            },
            TerseState::PrefixValue { name } => {
                if let TurtleToken::Iri(iri) = token {
                    context.prefixes.insert(name, Iri::parse_unchecked(iri));
                    self
                } else {
                    self.fail(errors, "The PREFIX declaration should be followed by a prefix and its value as an IRI")
                }
            }
            // triplesOrGraph  ::=  labelOrSubject ( wrappedGraph | predicateObjectList '.' ) | quotedTriple predicateObjectList '.'
            // triples2        ::=  blankNodePropertyList predicateObjectList? '.' | collection predicateObjectList '.'
            TerseState::BlockStart => match token {
                TurtleToken::Punctuation("[") => {
                    self.stack.push(TerseState::GraphOrAnonSubject);
                    self
                }
                TurtleToken::Punctuation("(") => {
                    self.stack.push(TerseState::EndDot);
                    self.stack.push(TerseState::PredicateObjects);
                    self.stack.push(TerseState::SubjectListStart);
                    self
                }
                TurtleToken::Punctuation("<<") if context.with_quoted_triples => {
                    self.stack.push(TerseState::EndDot);
                    self.stack.push(TerseState::PredicateObjects);
                    self.push_quoted_frames(TerseState::QuotedEndSubject);
                    self
                }
                token => match name_or_blank(token, context) {
                    Some(Ok(term)) => {
                        self.stack.push(TerseState::GraphOrSubject { term });
                        self
                    }
                    Some(Err(e)) => self.fail(errors, e),
                    None => self.fail(errors, "TOKEN is not a valid subject or graph name"),
                },
            },
            TerseState::GraphOrSubject { term } => {
                if token == TurtleToken::Punctuation("{") && context.with_graph_name {
                    self.graph = term.into();
                    self.stack.push(TerseState::GraphBody);
                } else {
                    self.subjects.push(term.into());
                    self.stack.push(TerseState::EndDot);
                    self.stack.push(TerseState::PredicateObjects);
                }
                self.recognize_next(token, context, results, errors)
            }
            TerseState::GraphOrAnonSubject => {
                if token == TurtleToken::Punctuation("]") {
                    self.stack.push(TerseState::GraphOrSubject {
                        term: BlankNode::default().into(),
                    });
                    self
                } else {
                    self.subjects.push(BlankNode::default().into());
                    self.stack.push(TerseState::EndDot);
                    self.stack.push(TerseState::AnonSubjectEnd);
                    self.stack.push(TerseState::PredicateObjects);
                    self.recognize_next(token, context, results, errors)
                }
            }
            TerseState::AnonSubjectEnd => {
                self.stack.push(TerseState::AnonSubjectAfter);
                if token == TurtleToken::Punctuation("]") {
                    self
                } else {
                    errors.push("blank node property lists should end with a ']'".into());
                    self.recognize_next(token, context, results, errors)
                }
            }
            TerseState::AnonSubjectAfter => {
                if !matches!(token, TurtleToken::Punctuation("." | "}")) {
                    self.stack.push(TerseState::PredicateObjects);
                }
                self.recognize_next(token, context, results, errors)
            }
            TerseState::SubjectListStart => {
                if token == TurtleToken::Punctuation(")") {
                    self.subjects.push(NamedNode::new_unchecked(rdf::NIL).into());
                    self
                } else {
                    // The list head doubles as the statement subject
                    let head = BlankNode::default();
                    self.subjects.push(head.clone().into());
                    self.subjects.push(head.into());
                    self.predicates.push(NamedNode::new_unchecked(rdf::FIRST));
                    self.stack.push(TerseState::ListNext);
                    self.stack.push(TerseState::Object);
                    self.recognize_next(token, context, results, errors)
                }
            }
            // wrappedGraph  ::=  '{' triplesBlock? '}'
            // triplesBlock  ::=  triples ('.' triplesBlock?)?
            TerseState::GraphBody => {
                if token == TurtleToken::Punctuation("{") {
                    context.open_directive_scope();
                    self.stack.push(TerseState::GraphBodyEnd);
                    self.stack.push(TerseState::Triples);
                    self
                } else {
                    self.fail(
                        errors,
                        "The GRAPH keyword should be followed by a graph name and a value in '{'",
                    )
                }
            }
            TerseState::GraphBodyEnd => {
                self.subjects.pop();
                match token {
                    TurtleToken::Punctuation("}") => {
                        context.close_directive_scope();
                        self
                    }
                    TurtleToken::Punctuation(".") => {
                        self.stack.push(TerseState::GraphBodyEnd);
                        self.stack.push(TerseState::Triples);
                        self
                    }
                    _ => {
                        errors
                            .push("A '}' or a '.' is expected at the end of a graph block".into());
                        self.recognize_next(token, context, results, errors)
                    }
                }
            }
            // triples  ::=  subject predicateObjectList | blankNodePropertyList predicateObjectList?
            // subject  ::=  iri | BlankNode | collection | quotedTriple
            TerseState::Triples => match token {
                TurtleToken::Punctuation("}") => {
                    // Empty graph block
                    self.recognize_next(token, context, results, errors)
                }
                TurtleToken::LangTag("prefix") if context.in_block_directives => {
                    self.stack.push(TerseState::PrefixName);
                    self
                }
                TurtleToken::LangTag("base") if context.in_block_directives => {
                    self.stack.push(TerseState::BaseIri);
                    self
                }
                TurtleToken::Punctuation("[") => {
                    self.subjects.push(BlankNode::default().into());
                    self.stack.push(TerseState::TriplesAnonSubject);
                    self
                }
                TurtleToken::Punctuation("(") => {
                    self.stack.push(TerseState::PredicateObjects);
                    self.stack.push(TerseState::SubjectListStart);
                    self
                }
                TurtleToken::Punctuation("<<") if context.with_quoted_triples => {
                    self.stack.push(TerseState::PredicateObjects);
                    self.push_quoted_frames(TerseState::QuotedEndSubject);
                    self
                }
                token => match name_or_blank(token, context) {
                    Some(Ok(term)) => {
                        self.subjects.push(term.into());
                        self.stack.push(TerseState::PredicateObjects);
                        self
                    }
                    Some(Err(e)) => self.fail(errors, e),
                    None => self.fail(errors, "TOKEN is not a valid RDF subject"),
                },
            },
            TerseState::TriplesAnonSubject => {
                if token == TurtleToken::Punctuation("]") {
                    self.stack.push(TerseState::PredicateObjects);
                    self
                } else {
                    self.stack.push(TerseState::AnonSubjectEnd);
                    self.stack.push(TerseState::PredicateObjects);
                    self.recognize_next(token, context, results, errors)
                }
            }
            // labelOrSubject  ::=  iri | BlankNode
            TerseState::GraphLabel => match token {
                TurtleToken::Punctuation("[") if context.anonymous_graph_name => {
                    self.stack.push(TerseState::AnonGraphEnd);
                    self
                }
                token => match name_or_blank(token, context) {
                    Some(Ok(term)) => {
                        self.graph = term.into();
                        self
                    }
                    Some(Err(e)) => self.fail(errors, e),
                    None => self.fail(errors, "TOKEN is not a valid graph name"),
                },
            },
            TerseState::AnonGraphEnd => {
                if token == TurtleToken::Punctuation("]") {
                    self.graph = BlankNode::default().into();
                    self
                } else {
                    self.fail(
                        errors,
                        "Anonymous blank nodes with a property list are not allowed as graph name",
                    )
                }
            }
            // predicateObjectList  ::=  verb objectList (';' (verb objectList)?)*
            TerseState::PredicateObjects => {
                self.stack.push(TerseState::PredicateObjectsEnd);
                self.stack.push(TerseState::Objects);
                self.stack.push(TerseState::Verb);
                self.recognize_next(token, context, results, errors)
            }
            TerseState::PredicateObjectsEnd => {
                self.predicates.pop();
                if token == TurtleToken::Punctuation(";") {
                    self.stack.push(TerseState::PredicateObjectsNext);
                    self
                } else {
                    self.recognize_next(token, context, results, errors)
                }
            }
            TerseState::PredicateObjectsNext => {
                if token == TurtleToken::Punctuation(";") {
                    self.stack.push(TerseState::PredicateObjectsNext);
                    self
                } else if matches!(token, TurtleToken::Punctuation("." | "}" | "]")) {
                    self.recognize_next(token, context, results, errors)
                } else {
                    self.stack.push(TerseState::PredicateObjectsEnd);
                    self.stack.push(TerseState::Objects);
                    self.stack.push(TerseState::Verb);
                    self.recognize_next(token, context, results, errors)
                }
            }
            // objectList  ::=  object annotation? ( ',' object annotation? )*
            // annotation  ::=  '{|' predicateObjectList '|}'
            TerseState::Objects => {
                self.stack.push(TerseState::ObjectsEnd);
                self.stack.push(TerseState::Object);
                self.recognize_next(token, context, results, errors)
            }
            TerseState::ObjectsEnd => match token {
                TurtleToken::Punctuation(",") => {
                    self.objects.pop();
                    self.stack.push(TerseState::ObjectsEnd);
                    self.stack.push(TerseState::Object);
                    self
                }
                TurtleToken::Punctuation("{|") if context.with_quoted_triples => {
                    let object = self.objects.pop().unwrap();
                    let annotated = Triple::new(
                        self.subjects.last().unwrap().clone(),
                        self.predicates.last().unwrap().clone(),
                        object,
                    );
                    self.subjects.push(annotated.into());
                    self.stack.push(TerseState::AnnotationEnd);
                    self.stack.push(TerseState::PredicateObjects);
                    self
                }
                _ => {
                    self.objects.pop();
                    self.recognize_next(token, context, results, errors)
                }
            },
            TerseState::AnnotationEnd => {
                self.subjects.pop();
                self.stack.push(TerseState::ObjectsAfterAnnotation);
                if token == TurtleToken::Punctuation("|}") {
                    self
                } else {
                    self.fail(errors, "Annotations should end with '|}'")
                }
            }
            TerseState::ObjectsAfterAnnotation => {
                if token == TurtleToken::Punctuation(",") {
                    self.stack.push(TerseState::ObjectsEnd);
                    self.stack.push(TerseState::Object);
                    self
                } else {
                    self.recognize_next(token, context, results, errors)
                }
            }
            // verb  ::=  predicate | 'a'
            TerseState::Verb => match token {
                TurtleToken::Keyword("a") => {
                    self.predicates.push(NamedNode::new_unchecked(rdf::TYPE));
                    self
                }
                token => match name_or_blank(token, context) {
                    Some(Ok(NamedOrBlankNode::Named(predicate))) => {
                        self.predicates.push(predicate);
                        self
                    }
                    Some(Err(e)) => self.fail(errors, e),
                    _ => self.fail(errors, "TOKEN is not a valid predicate"),
                },
            },
            // object   ::=  iri | BlankNode | collection | blankNodePropertyList | literal | quotedTriple
            // literal  ::=  RDFLiteral | NumericLiteral | BooleanLiteral
            TerseState::Object => match token {
                TurtleToken::Punctuation("[") => {
                    self.stack.push(TerseState::AnonObject);
                    self
                }
                TurtleToken::Punctuation("(") => {
                    self.stack.push(TerseState::ObjectListStart);
                    self
                }
                TurtleToken::Punctuation("<<") if context.with_quoted_triples => {
                    self.push_quoted_frames(TerseState::QuotedEndObject { emit: true });
                    self
                }
                TurtleToken::String(value) | TurtleToken::LongString(value) => {
                    self.stack
                        .push(TerseState::LiteralSuffix { value, emit: true });
                    self
                }
                TurtleToken::Integer(v) => {
                    self.push_typed(v, xsd::INTEGER);
                    self.emit_top(results);
                    self
                }
                TurtleToken::Decimal(v) => {
                    self.push_typed(v, xsd::DECIMAL);
                    self.emit_top(results);
                    self
                }
                TurtleToken::Double(v) => {
                    self.push_typed(v, xsd::DOUBLE);
                    self.emit_top(results);
                    self
                }
                TurtleToken::Keyword(k @ ("true" | "false")) => {
                    self.push_typed(k, xsd::BOOLEAN);
                    self.emit_top(results);
                    self
                }
                token => match name_or_blank(token, context) {
                    Some(Ok(term)) => {
                        self.objects.push(term.into());
                        self.emit_top(results);
                        self
                    }
                    Some(Err(e)) => self.fail(errors, e),
                    None => self.fail(errors, "TOKEN is not a valid RDF object"),
                },
            },
            // blankNodePropertyList  ::=  '[' predicateObjectList ']'
            TerseState::AnonObject => {
                if token == TurtleToken::Punctuation("]") {
                    self.objects.push(BlankNode::default().into());
                    self.emit_top(results);
                    self
                } else {
                    self.subjects.push(BlankNode::default().into());
                    self.stack.push(TerseState::AnonObjectEnd);
                    self.stack.push(TerseState::PredicateObjects);
                    self.recognize_next(token, context, results, errors)
                }
            }
            TerseState::AnonObjectEnd => {
                if token == TurtleToken::Punctuation("]") {
                    let node = self.subjects.pop().unwrap();
                    self.objects.push(node.into());
                    self.emit_top(results);
                    self
                } else {
                    self.fail(errors, "blank node property lists should end with a ']'")
                }
            }
            // collection  ::=  '(' object* ')'
            TerseState::ObjectListStart => {
                if token == TurtleToken::Punctuation(")") {
                    self.objects.push(NamedNode::new_unchecked(rdf::NIL).into());
                    self.emit_top(results);
                    self
                } else {
                    let head = BlankNode::default();
                    self.objects.push(head.clone().into());
                    self.emit_top(results);
                    self.subjects.push(head.into());
                    self.predicates.push(NamedNode::new_unchecked(rdf::FIRST));
                    self.stack.push(TerseState::ListNext);
                    self.stack.push(TerseState::Object);
                    self.recognize_next(token, context, results, errors)
                }
            }
            // Links the cell just filled to rdf:nil or to a fresh cell.
            // Both subject-position and object-position collections end up here.
            TerseState::ListNext => {
                let cell = self.subjects.pop().unwrap();
                self.objects.pop();
                if token == TurtleToken::Punctuation(")") {
                    self.predicates.pop();
                    results.push(Quad::new(
                        cell,
                        NamedNode::new_unchecked(rdf::REST),
                        NamedNode::new_unchecked(rdf::NIL),
                        self.graph.clone(),
                    ));
                    self
                } else {
                    let next = BlankNode::default();
                    results.push(Quad::new(
                        cell,
                        NamedNode::new_unchecked(rdf::REST),
                        next.clone(),
                        self.graph.clone(),
                    ));
                    self.subjects.push(next.into());
                    self.stack.push(TerseState::ListNext);
                    self.stack.push(TerseState::Object);
                    self.recognize_next(token, context, results, errors)
                }
            }
            // RDFLiteral  ::=  String (LANGTAG | '^^' iri)?
            TerseState::LiteralSuffix { value, emit } => match token {
                TurtleToken::LangTag(tag) => {
                    self.objects.push(
                        Literal::new_language_tagged_literal_unchecked(
                            value,
                            tag.to_ascii_lowercase(),
                        )
                        .into(),
                    );
                    if emit {
                        self.emit_top(results);
                    }
                    self
                }
                TurtleToken::Punctuation("^^") => {
                    self.stack.push(TerseState::LiteralDatatype { value, emit });
                    self
                }
                _ => {
                    self.objects.push(Literal::new_simple_literal(value).into());
                    if emit {
                        self.emit_top(results);
                    }
                    self.recognize_next(token, context, results, errors)
                }
            },
            TerseState::LiteralDatatype { value, emit } => {
                let datatype = match token {
                    TurtleToken::Iri(iri) => NamedNode::new_unchecked(iri),
                    TurtleToken::PrefixedName {
                        prefix,
                        local,
                        needs_iri_check,
                    } => match expand_prefixed_name(
                        prefix,
                        &local,
                        needs_iri_check,
                        &context.prefixes,
                    ) {
                        Ok(datatype) => datatype,
                        Err(e) => return self.fail(errors, e),
                    },
                    token => {
                        return self
                            .fail(errors, "Expecting a datatype IRI after ^^, found TOKEN")
                            .recognize_next(token, context, results, errors)
                    }
                };
                self.objects
                    .push(Literal::new_typed_literal(value, datatype).into());
                if emit {
                    self.emit_top(results);
                }
                self
            }
            // quotedTriple  ::=  '<<' qtSubject verb qtObject '>>'
            TerseState::QuotedEndSubject => {
                let triple = self.pop_triple();
                self.subjects.push(triple.into());
                if token == TurtleToken::Punctuation(">>") {
                    self
                } else {
                    self.fail(errors, "Expecting '>>' to close a quoted triple, found TOKEN")
                }
            }
            TerseState::QuotedEndObject { emit } => {
                let triple = self.pop_triple();
                self.objects.push(triple.into());
                if emit {
                    self.emit_top(results);
                }
                if token == TurtleToken::Punctuation(">>") {
                    self
                } else {
                    self.fail(errors, "Expecting '>>' to close a quoted triple, found TOKEN")
                }
            }
            // qtSubject  ::=  iri | BlankNode | quotedTriple
            TerseState::QuotedSubject => match token {
                TurtleToken::Punctuation("[") => {
                    self.subjects.push(BlankNode::default().into());
                    self.stack.push(TerseState::QuotedAnonEnd);
                    self
                }
                TurtleToken::Punctuation("<<") => {
                    self.push_quoted_frames(TerseState::QuotedEndSubject);
                    self
                }
                token => match name_or_blank(token, context) {
                    Some(Ok(term)) => {
                        self.subjects.push(term.into());
                        self
                    }
                    Some(Err(e)) => self.fail(errors, e),
                    None => self.fail(errors, "TOKEN is not a valid quoted triple subject"),
                },
            },
            // qtObject  ::=  iri | BlankNode | literal | quotedTriple
            TerseState::QuotedObject => match token {
                TurtleToken::Punctuation("[") => {
                    self.objects.push(BlankNode::default().into());
                    self.stack.push(TerseState::QuotedAnonEnd);
                    self
                }
                TurtleToken::Punctuation("<<") => {
                    self.push_quoted_frames(TerseState::QuotedEndObject { emit: false });
                    self
                }
                TurtleToken::String(value) | TurtleToken::LongString(value) => {
                    self.stack
                        .push(TerseState::LiteralSuffix { value, emit: false });
                    self
                }
                TurtleToken::Integer(v) => {
                    self.push_typed(v, xsd::INTEGER);
                    self
                }
                TurtleToken::Decimal(v) => {
                    self.push_typed(v, xsd::DECIMAL);
                    self
                }
                TurtleToken::Double(v) => {
                    self.push_typed(v, xsd::DOUBLE);
                    self
                }
                TurtleToken::Keyword(k @ ("true" | "false")) => {
                    self.push_typed(k, xsd::BOOLEAN);
                    self
                }
                token => match name_or_blank(token, context) {
                    Some(Ok(term)) => {
                        self.objects.push(term.into());
                        self
                    }
                    Some(Err(e)) => self.fail(errors, e),
                    None => self.fail(errors, "TOKEN is not a valid quoted triple object"),
                },
            },
            TerseState::QuotedAnonEnd => {
                if token == TurtleToken::Punctuation("]") {
                    self
                } else {
                    self.fail(
                        errors,
                        "Anonymous blank nodes with a property list are not allowed in quoted triples",
                    )
                }
            }
        }
    }

    fn recognize_end(
        mut self,
        _context: &mut TerseRecognizerContext,
        results: &mut Vec<Quad>,
        errors: &mut Vec<GrammarError>,
    ) {
        match &*self.stack {
            [] | [TerseState::Doc] => {
                debug_assert!(
                    self.subjects.is_empty(),
                    "The subjects stack must be empty if the state stack is empty"
                );
                debug_assert!(
                    self.predicates.is_empty(),
                    "The predicates stack must be empty if the state stack is empty"
                );
                debug_assert!(
                    self.objects.is_empty(),
                    "The objects stack must be empty if the state stack is empty"
                );
            }
            [.., TerseState::LiteralSuffix { value, emit: true }] => {
                self.objects.push(Literal::new_simple_literal(value).into());
                self.emit_top(results);
                errors.push("Triples should be followed by a dot".into());
            }
            _ => errors.push("Unexpected end".into()),
        }
    }

    fn lexer_options(context: &TerseRecognizerContext) -> &TurtleLexerOptions {
        &context.lexer_options
    }
}

/// The dialect switches, in the order the front ends pass them.
pub struct TerseOptions {
    pub with_graph_name: bool,
    pub with_quoted_triples: bool,
    pub sparql_style_directives: bool,
    pub in_block_directives: bool,
    pub graph_keyword: bool,
    pub anonymous_graph_name: bool,
    pub lenient: bool,
    pub base_iri: Option<Iri<String>>,
    pub prefixes: HashMap<String, Iri<String>>,
}

impl TerseRecognizer {
    pub fn new_parser(options: TerseOptions) -> Parser<Vec<u8>, Self> {
        Parser::new(
            Tokenizer::new(
                TurtleLexer::new(TurtleLexerMode::Turtle, options.lenient),
                MIN_BUFFER_SIZE,
                MAX_BUFFER_SIZE,
                true,
                Some(b"#"),
            ),
            Self::recognizer(),
            Self::context(options),
        )
    }

    pub fn new_slice_parser(data: &[u8], options: TerseOptions) -> Parser<&[u8], Self> {
        Parser::new(
            Tokenizer::from_slice(
                TurtleLexer::new(TurtleLexerMode::Turtle, options.lenient),
                data,
                true,
                Some(b"#"),
            ),
            Self::recognizer(),
            Self::context(options),
        )
    }

    fn recognizer() -> Self {
        Self {
            stack: vec![TerseState::Doc],
            subjects: Vec::new(),
            predicates: Vec::new(),
            objects: Vec::new(),
            graph: GraphName::DefaultGraph,
        }
    }

    fn context(options: TerseOptions) -> TerseRecognizerContext {
        TerseRecognizerContext {
            lexer_options: TurtleLexerOptions {
                base_iri: options.base_iri,
            },
            with_graph_name: options.with_graph_name,
            with_quoted_triples: options.with_quoted_triples,
            sparql_style_directives: options.sparql_style_directives,
            in_block_directives: options.in_block_directives,
            graph_keyword: options.graph_keyword,
            anonymous_graph_name: options.anonymous_graph_name,
            prefixes: options.prefixes,
            directive_scopes: Vec::new(),
        }
    }

    fn reset(&mut self) {
        self.stack.clear();
        self.subjects.clear();
        self.predicates.clear();
        self.objects.clear();
        self.graph = GraphName::DefaultGraph;
    }

    #[must_use]
    fn fail(mut self, errors: &mut Vec<GrammarError>, message: impl Into<GrammarError>) -> Self {
        errors.push(message.into());
        self.reset();
        self
    }

    /// Emits a statement made of the tops of the three term stacks.
    fn emit_top(&mut self, results: &mut Vec<Quad>) {
        results.push(Quad::new(
            self.subjects.last().unwrap().clone(),
            self.predicates.last().unwrap().clone(),
            self.objects.last().unwrap().clone(),
            self.graph.clone(),
        ));
    }

    fn push_typed(&mut self, value: &str, datatype: &str) {
        self.objects
            .push(Literal::new_typed_literal(value, NamedNode::new_unchecked(datatype)).into());
    }

    /// Pops a completed quoted triple off the three term stacks.
    fn pop_triple(&mut self) -> Triple {
        let object = self.objects.pop().unwrap();
        let predicate = self.predicates.pop().unwrap();
        let subject = self.subjects.pop().unwrap();
        Triple::new(subject, predicate, object)
    }

    fn push_quoted_frames(&mut self, end: TerseState) {
        self.stack.push(end);
        self.stack.push(TerseState::QuotedObject);
        self.stack.push(TerseState::Verb);
        self.stack.push(TerseState::QuotedSubject);
    }
}

/// Resolves a token to an IRI or a labeled blank node, the three token kinds
/// accepted wherever both are allowed. `None` means the token is of another
/// kind entirely.
fn name_or_blank(
    token: TurtleToken<'_>,
    context: &TerseRecognizerContext,
) -> Option<Result<NamedOrBlankNode, GrammarError>> {
    Some(match token {
        TurtleToken::Iri(iri) => Ok(NamedNode::new_unchecked(iri).into()),
        TurtleToken::PrefixedName {
            prefix,
            local,
            needs_iri_check,
        } => expand_prefixed_name(prefix, &local, needs_iri_check, &context.prefixes)
            .map(Into::into)
            .map_err(Into::into),
        TurtleToken::BlankNodeLabel(label) => Ok(BlankNode::new_unchecked(label).into()),
        _ => return None,
    })
}

#[derive(Debug)]
enum TerseState {
    Doc,
    EndDot,
    BaseIri,
    PrefixName,
    PrefixValue {
        name: String,
    },
    BlockStart,
    GraphOrSubject {
        term: NamedOrBlankNode,
    },
    GraphOrAnonSubject,
    AnonSubjectEnd,
    AnonSubjectAfter,
    SubjectListStart,
    GraphBody,
    GraphBodyEnd,
    GraphLabel,
    AnonGraphEnd,
    Triples,
    TriplesAnonSubject,
    PredicateObjects,
    PredicateObjectsEnd,
    PredicateObjectsNext,
    Objects,
    ObjectsEnd,
    AnnotationEnd,
    ObjectsAfterAnnotation,
    Verb,
    Object,
    AnonObject,
    AnonObjectEnd,
    ObjectListStart,
    ListNext,
    LiteralSuffix {
        value: String,
        emit: bool,
    },
    LiteralDatatype {
        value: String,
        emit: bool,
    },
    QuotedEndSubject,
    QuotedEndObject {
        emit: bool,
    },
    QuotedSubject,
    QuotedObject,
    QuotedAnonEnd,
}

/// A node that can still become either a graph name or a subject.
#[derive(Debug)]
enum NamedOrBlankNode {
    Named(NamedNode),
    Blank(BlankNode),
}

impl From<NamedNode> for NamedOrBlankNode {
    fn from(node: NamedNode) -> Self {
        Self::Named(node)
    }
}

impl From<BlankNode> for NamedOrBlankNode {
    fn from(node: BlankNode) -> Self {
        Self::Blank(node)
    }
}

impl From<NamedOrBlankNode> for GraphName {
    fn from(node: NamedOrBlankNode) -> Self {
        match node {
            NamedOrBlankNode::Named(node) => node.into(),
            NamedOrBlankNode::Blank(node) => node.into(),
        }
    }
}

impl From<NamedOrBlankNode> for Subject {
    fn from(node: NamedOrBlankNode) -> Self {
        match node {
            NamedOrBlankNode::Named(node) => node.into(),
            NamedOrBlankNode::Blank(node) => node.into(),
        }
    }
}

impl From<NamedOrBlankNode> for Term {
    fn from(node: NamedOrBlankNode) -> Self {
        match node {
            NamedOrBlankNode::Named(node) => node.into(),
            NamedOrBlankNode::Blank(node) => node.into(),
        }
    }
}
