use crate::toolkit::error::{ParseError, SyntaxError};
use crate::toolkit::tokenizer::{TokenSource, Tokenizer};
use std::io::Read;
use std::ops::Deref;

/// A grammar rule recognizer driven token by token.
///
/// The recognizer is a state machine value: `recognize_next` consumes `self`
/// and returns the next state, pushing recognized outputs into `results` and
/// grammar errors into `errors`.
pub trait GrammarRecognizer: Sized {
    type TokenSource: TokenSource;
    type Output;
    type Context;

    /// The state to restart from after an error, so a lenient parse can
    /// resynchronize on the next statement boundary.
    fn error_recovery_state(self) -> Self;

    fn recognize_next(
        self,
        token: <Self::TokenSource as TokenSource>::Token<'_>,
        context: &mut Self::Context,
        results: &mut Vec<Self::Output>,
        errors: &mut Vec<GrammarError>,
    ) -> Self;

    fn recognize_end(
        self,
        context: &mut Self::Context,
        results: &mut Vec<Self::Output>,
        errors: &mut Vec<GrammarError>,
    );

    fn lexer_options(context: &Self::Context) -> &<Self::TokenSource as TokenSource>::Options;
}

/// A grammar-level error message, positioned later by the parser.
pub struct GrammarError {
    pub message: String,
}

impl<S: Into<String>> From<S> for GrammarError {
    fn from(message: S) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// A parser, driving a [`Tokenizer`] through a [`GrammarRecognizer`].
///
/// Outputs are pulled with [`Parser::parse_next`]; a statement is only ever
/// returned whole, so a caller that stops pulling cancels the parse cleanly.
pub struct Parser<B, R: GrammarRecognizer> {
    tokenizer: Tokenizer<B, R::TokenSource>,
    state: Option<R>,
    pub context: R::Context,
    results: Vec<R::Output>,
    errors: Vec<GrammarError>,
}

impl<B, R: GrammarRecognizer> Parser<B, R> {
    pub fn new(tokenizer: Tokenizer<B, R::TokenSource>, recognizer: R, context: R::Context) -> Self {
        Self {
            tokenizer,
            state: Some(recognizer),
            context,
            results: vec![],
            errors: vec![],
        }
    }
}

impl<B: Deref<Target = [u8]>, R: GrammarRecognizer> Parser<B, R> {
    #[inline]
    pub fn is_end(&self) -> bool {
        self.state.is_none() && self.results.is_empty() && self.errors.is_empty()
    }

    pub fn parse_next(&mut self) -> Option<Result<R::Output, SyntaxError>> {
        loop {
            if let Some(error) = self.errors.pop() {
                return Some(Err(SyntaxError::new(
                    self.tokenizer.last_token_location(),
                    error
                        .message
                        .replace("TOKEN", &self.tokenizer.last_token_source()),
                )));
            }
            if let Some(result) = self.results.pop() {
                return Some(Ok(result));
            }
            if let Some(result) = self.tokenizer.next_token(R::lexer_options(&self.context)) {
                match result {
                    Ok(token) => {
                        self.state = self.state.take().map(|state| {
                            state.recognize_next(
                                token,
                                &mut self.context,
                                &mut self.results,
                                &mut self.errors,
                            )
                        });
                        continue;
                    }
                    Err(e) => {
                        self.state = self.state.take().map(R::error_recovery_state);
                        return Some(Err(e));
                    }
                }
            }
            if self.tokenizer.is_end() {
                self.state.take()?.recognize_end(
                    &mut self.context,
                    &mut self.results,
                    &mut self.errors,
                );
            } else {
                return None;
            }
        }
    }
}

impl<R: GrammarRecognizer> Parser<Vec<u8>, R> {
    #[inline]
    pub fn end(&mut self) {
        self.tokenizer.end();
    }

    pub fn extend_from_slice(&mut self, other: &[u8]) {
        self.tokenizer.push(other);
    }

    pub fn fill_from_reader(&mut self, reader: &mut impl Read) -> std::io::Result<()> {
        self.tokenizer.fill_from_reader(reader)
    }

    pub fn for_reader<RD: Read>(self, reader: RD, lenient: bool) -> ReaderIterator<RD, R> {
        ReaderIterator {
            reader,
            parser: self,
            lenient,
            is_fused: false,
        }
    }
}

impl<'a, R: GrammarRecognizer> Parser<&'a [u8], R> {
    pub fn into_iter(self, lenient: bool) -> SliceIterator<'a, R> {
        SliceIterator {
            parser: self,
            lenient,
            is_fused: false,
        }
    }
}

/// Iterator over the outputs of a parse fed from a [`Read`].
///
/// In the default strict mode the iterator is fused right after the first
/// syntax error; in lenient mode it resynchronizes and keeps going, with the
/// errors interleaved into the stream.
pub struct ReaderIterator<RD: Read, R: GrammarRecognizer> {
    reader: RD,
    pub parser: Parser<Vec<u8>, R>,
    lenient: bool,
    is_fused: bool,
}

impl<RD: Read, R: GrammarRecognizer> Iterator for ReaderIterator<RD, R> {
    type Item = Result<R::Output, ParseError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.is_fused {
            return None;
        }
        while !self.parser.is_end() {
            if let Some(result) = self.parser.parse_next() {
                if result.is_err() && !self.lenient {
                    self.is_fused = true;
                }
                return Some(result.map_err(ParseError::Syntax));
            }
            if let Err(e) = self.parser.fill_from_reader(&mut self.reader) {
                self.is_fused = true;
                return Some(Err(e.into()));
            }
        }
        None
    }
}

/// Iterator over the outputs of a parse of an in-memory slice.
pub struct SliceIterator<'a, R: GrammarRecognizer> {
    pub parser: Parser<&'a [u8], R>,
    lenient: bool,
    is_fused: bool,
}

impl<R: GrammarRecognizer> Iterator for SliceIterator<'_, R> {
    type Item = Result<R::Output, SyntaxError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.is_fused {
            return None;
        }
        let result = self.parser.parse_next()?;
        if result.is_err() && !self.lenient {
            self.is_fused = true;
        }
        Some(result)
    }
}
