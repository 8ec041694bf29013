//! Shared parser implementation for N-Triples and N-Quads.

use crate::lexer::{TurtleLexer, TurtleLexerMode, TurtleLexerOptions, TurtleToken};
use crate::toolkit::{GrammarError, GrammarRecognizer, Parser, Tokenizer};
use crate::{MAX_BUFFER_SIZE, MIN_BUFFER_SIZE};
use lodrdf::vocab::rdf;
use lodrdf::{BlankNode, GraphName, Literal, NamedNode, Quad, Subject, Term, Triple};

pub struct NQuadsRecognizer {
    stack: Vec<NQuadsState>,
    subjects: Vec<Subject>,
    predicates: Vec<NamedNode>,
    objects: Vec<Term>,
    lenient: bool,
}

pub struct NQuadsRecognizerContext {
    with_graph_name: bool,
    with_quoted_triples: bool,
    lexer_options: TurtleLexerOptions,
}

enum NQuadsState {
    Subject,
    Predicate,
    Object,
    // Also the end of a quoted triple when the stack is not empty
    GraphOrQuoteEnd,
    Dot,
    LiteralSuffix { value: String },
    LiteralDatatype { value: String },
    LineEnd,
    Recover,
    QuotedSubjectDone,
    QuotedObjectDone,
}

impl GrammarRecognizer for NQuadsRecognizer {
    type TokenSource = TurtleLexer;
    type Output = Quad;
    type Context = NQuadsRecognizerContext;

    fn error_recovery_state(mut self) -> Self {
        self.subjects.clear();
        self.predicates.clear();
        self.objects.clear();
        self.stack.clear();
        self.stack.push(NQuadsState::Recover);
        self
    }

    fn recognize_next(
        mut self,
        token: TurtleToken<'_>,
        context: &mut NQuadsRecognizerContext,
        results: &mut Vec<Quad>,
        errors: &mut Vec<GrammarError>,
    ) -> Self {
        let state = self.stack.pop().unwrap_or(NQuadsState::Subject);
        match state {
            NQuadsState::Subject => match token {
                TurtleToken::LineJump => {
                    if self.stack.is_empty() {
                        return self;
                    }
                    self.fail(
                        token,
                        "line jumps are not allowed inside of quoted triples",
                        context,
                        results,
                        errors,
                    )
                }
                TurtleToken::Iri(s) => {
                    self.subjects.push(NamedNode::new_unchecked(s).into());
                    self.stack.push(NQuadsState::Predicate);
                    self
                }
                TurtleToken::BlankNodeLabel(s) => {
                    self.subjects.push(BlankNode::new_unchecked(s).into());
                    self.stack.push(NQuadsState::Predicate);
                    self
                }
                TurtleToken::Punctuation("<<") if context.with_quoted_triples => {
                    self.stack.push(NQuadsState::QuotedSubjectDone);
                    self.stack.push(NQuadsState::Subject);
                    self
                }
                _ => self.fail(
                    token,
                    "The subject of a triple must be an IRI or a blank node",
                    context,
                    results,
                    errors,
                ),
            },
            NQuadsState::Predicate => match token {
                TurtleToken::Iri(p) => {
                    self.predicates.push(NamedNode::new_unchecked(p));
                    self.stack.push(NQuadsState::Object);
                    self
                }
                TurtleToken::LineJump => self.fail(
                    token,
                    "line jumps are not allowed in the middle of triples",
                    context,
                    results,
                    errors,
                ),
                _ => self.fail(
                    token,
                    "The predicate of a triple must be an IRI",
                    context,
                    results,
                    errors,
                ),
            },
            NQuadsState::Object => match token {
                TurtleToken::Iri(o) => {
                    self.objects.push(NamedNode::new_unchecked(o).into());
                    self.stack.push(NQuadsState::GraphOrQuoteEnd);
                    self
                }
                TurtleToken::BlankNodeLabel(o) => {
                    self.objects.push(BlankNode::new_unchecked(o).into());
                    self.stack.push(NQuadsState::GraphOrQuoteEnd);
                    self
                }
                TurtleToken::String(value) => {
                    self.stack.push(NQuadsState::LiteralSuffix { value });
                    self
                }
                TurtleToken::Punctuation("<<") if context.with_quoted_triples => {
                    self.stack.push(NQuadsState::QuotedObjectDone);
                    self.stack.push(NQuadsState::Subject);
                    self
                }
                TurtleToken::LineJump => self.fail(
                    token,
                    "line jumps are not allowed in the middle of triples",
                    context,
                    results,
                    errors,
                ),
                _ => self.fail(
                    token,
                    "The object of a triple must be an IRI, a blank node or a literal",
                    context,
                    results,
                    errors,
                ),
            },
            NQuadsState::LiteralSuffix { value } => match token {
                TurtleToken::LangTag(language) => {
                    let literal = Literal::new_language_tagged_literal_unchecked(
                        value,
                        language.to_ascii_lowercase(),
                    );
                    self.objects.push(literal.into());
                    self.stack.push(NQuadsState::GraphOrQuoteEnd);
                    self
                }
                TurtleToken::Punctuation("^^") => {
                    self.stack.push(NQuadsState::LiteralDatatype { value });
                    self
                }
                _ => {
                    self.objects.push(Literal::new_simple_literal(value).into());
                    self.stack.push(NQuadsState::GraphOrQuoteEnd);
                    self.recognize_next(token, context, results, errors)
                }
            },
            NQuadsState::LiteralDatatype { value } => match token {
                TurtleToken::Iri(d) => {
                    if !self.lenient && d == rdf::LANG_STRING {
                        errors.push(
                            "The datatype of a literal without a language tag must not be rdf:langString"
                                .into(),
                        );
                    }
                    let datatype = NamedNode::new_unchecked(d);
                    self.objects
                        .push(Literal::new_typed_literal(value, datatype).into());
                    self.stack.push(NQuadsState::GraphOrQuoteEnd);
                    self
                }
                TurtleToken::LineJump => self.fail(
                    token,
                    "line jumps are not allowed in the middle of triples",
                    context,
                    results,
                    errors,
                ),
                _ => self.fail(
                    token,
                    "A literal datatype must be an IRI",
                    context,
                    results,
                    errors,
                ),
            },
            NQuadsState::GraphOrQuoteEnd => {
                if !self.stack.is_empty() {
                    // Inside a quoted triple, only '>>' can follow the object
                    return if token == TurtleToken::Punctuation(">>") {
                        self
                    } else {
                        self.fail(
                            token,
                            "Expecting the end of a quoted triple '>>'",
                            context,
                            results,
                            errors,
                        )
                    };
                }
                match token {
                    TurtleToken::Iri(g) if context.with_graph_name => {
                        self.emit_quad(results, NamedNode::new_unchecked(g).into());
                        self.stack.push(NQuadsState::Dot);
                        self
                    }
                    TurtleToken::BlankNodeLabel(g) if context.with_graph_name => {
                        self.emit_quad(results, BlankNode::new_unchecked(g).into());
                        self.stack.push(NQuadsState::Dot);
                        self
                    }
                    _ => {
                        self.emit_quad(results, GraphName::DefaultGraph);
                        self.stack.push(NQuadsState::Dot);
                        self.recognize_next(token, context, results, errors)
                    }
                }
            }
            NQuadsState::Dot => match token {
                TurtleToken::Punctuation(".") => {
                    self.stack.push(NQuadsState::LineEnd);
                    self
                }
                TurtleToken::LineJump => self
                    .fail(
                        token,
                        "Statements must be followed by a dot",
                        context,
                        results,
                        errors,
                    )
                    .recognize_next(TurtleToken::LineJump, context, results, errors),
                _ => {
                    errors.push("Statements must be followed by a dot".into());
                    self.recognize_next(token, context, results, errors)
                }
            },
            NQuadsState::LineEnd => {
                if token == TurtleToken::LineJump {
                    return self;
                }
                errors.push(
                    "Only a single triple or quad can be written in a line, found TOKEN".into(),
                );
                self.recognize_next(token, context, results, errors)
            }
            NQuadsState::QuotedSubjectDone => {
                let quoted = self.pop_triple();
                self.subjects.push(quoted.into());
                self.stack.push(NQuadsState::Predicate);
                self.recognize_next(token, context, results, errors)
            }
            NQuadsState::QuotedObjectDone => {
                let quoted = self.pop_triple();
                self.objects.push(quoted.into());
                self.stack.push(NQuadsState::GraphOrQuoteEnd);
                self.recognize_next(token, context, results, errors)
            }
            NQuadsState::Recover => {
                if token != TurtleToken::LineJump {
                    self.stack.push(NQuadsState::Recover);
                }
                self
            }
        }
    }

    fn recognize_end(
        mut self,
        _context: &mut NQuadsRecognizerContext,
        results: &mut Vec<Quad>,
        errors: &mut Vec<GrammarError>,
    ) {
        match &*self.stack {
            [] | [NQuadsState::Subject | NQuadsState::LineEnd] => (),
            [NQuadsState::Dot] => errors.push("Statements must be followed by a dot".into()),
            [NQuadsState::GraphOrQuoteEnd] => {
                self.emit_quad(results, GraphName::DefaultGraph);
                errors.push("Statements must be followed by a dot".into())
            }
            [NQuadsState::LiteralSuffix { value }] => {
                self.objects.push(Literal::new_simple_literal(value).into());
                self.emit_quad(results, GraphName::DefaultGraph);
                errors.push("Statements must be followed by a dot".into())
            }
            _ => errors.push("Unexpected end".into()),
        }
    }

    fn lexer_options(context: &NQuadsRecognizerContext) -> &TurtleLexerOptions {
        &context.lexer_options
    }
}

impl NQuadsRecognizer {
    pub fn new_parser(
        with_graph_name: bool,
        with_quoted_triples: bool,
        ascii_only: bool,
        lenient: bool,
    ) -> Parser<Vec<u8>, Self> {
        Parser::new(
            Tokenizer::new(
                Self::lexer(ascii_only, lenient),
                MIN_BUFFER_SIZE,
                MAX_BUFFER_SIZE,
                false,
                Some(b"#"),
            ),
            Self::recognizer(lenient),
            Self::context(with_graph_name, with_quoted_triples),
        )
    }

    pub fn new_slice_parser(
        data: &[u8],
        with_graph_name: bool,
        with_quoted_triples: bool,
        ascii_only: bool,
        lenient: bool,
    ) -> Parser<&[u8], Self> {
        Parser::new(
            Tokenizer::from_slice(Self::lexer(ascii_only, lenient), data, false, Some(b"#")),
            Self::recognizer(lenient),
            Self::context(with_graph_name, with_quoted_triples),
        )
    }

    fn lexer(ascii_only: bool, lenient: bool) -> TurtleLexer {
        let lexer = TurtleLexer::new(TurtleLexerMode::NTriples, lenient);
        if ascii_only {
            lexer.with_ascii_only()
        } else {
            lexer
        }
    }

    fn recognizer(lenient: bool) -> Self {
        Self {
            stack: vec![NQuadsState::Subject],
            subjects: Vec::new(),
            predicates: Vec::new(),
            objects: Vec::new(),
            lenient,
        }
    }

    fn context(with_graph_name: bool, with_quoted_triples: bool) -> NQuadsRecognizerContext {
        NQuadsRecognizerContext {
            with_graph_name,
            with_quoted_triples,
            lexer_options: TurtleLexerOptions::default(),
        }
    }

    #[must_use]
    fn fail(
        self,
        token: TurtleToken<'_>,
        message: impl Into<GrammarError>,
        context: &mut NQuadsRecognizerContext,
        results: &mut Vec<Quad>,
        errors: &mut Vec<GrammarError>,
    ) -> Self {
        errors.push(message.into());
        let this = self.error_recovery_state();
        if token == TurtleToken::LineJump {
            // A line jump recovers on the spot
            this.recognize_next(token, context, results, errors)
        } else {
            this
        }
    }

    fn pop_triple(&mut self) -> Triple {
        let (Some(object), Some(predicate), Some(subject)) = (
            self.objects.pop(),
            self.predicates.pop(),
            self.subjects.pop(),
        ) else {
            unreachable!("the state machine fills the terms before popping a triple")
        };
        Triple {
            subject,
            predicate,
            object,
        }
    }

    fn emit_quad(&mut self, results: &mut Vec<Quad>, graph_name: GraphName) {
        let triple = self.pop_triple();
        results.push(triple.in_graph(graph_name))
    }
}
