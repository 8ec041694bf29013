//! Push-based consumption of parser output.
//!
//! A [`QuadSink`] receives every statement of a document one by one and can
//! request an early stop, which [`parse_to_sink`] reports as a clean
//! [`SinkOutcome::Stopped`] termination instead of an error.

use crate::error::RdfParseError;
use crate::parser::ReaderQuadParser;
use lodrdf::{Dataset, Namespaces, Quad, Subject, Term, Triple};
use std::io::Read;

/// Whether a sink wants more statements.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
#[must_use]
pub enum SinkResult {
    /// Keep feeding statements.
    Continue,
    /// Stop the parse, the sink has seen enough.
    Stop,
}

/// How a parse driven by [`parse_to_sink`] ended.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum SinkOutcome {
    /// The whole document was parsed.
    Completed,
    /// The sink requested a stop before the end of the document.
    Stopped,
}

/// A consumer of a stream of quads.
///
/// All methods except [`quad`](QuadSink::quad) have empty default
/// implementations so simple sinks only implement what they need.
pub trait QuadSink {
    /// Called once before the first statement.
    fn start(&mut self) {}

    /// Called for each parsed quad.
    fn quad(&mut self, quad: &Quad) -> SinkResult;

    /// Called for each namespace declaration of the document.
    fn namespace(&mut self, _prefix: &str, _iri: &str) {}

    /// Called when the document declares a base IRI.
    fn base_iri(&mut self, _iri: &str) {}

    /// Called once after the last statement.
    fn end(&mut self) {}
}

/// Drives a parser to completion, pushing everything into the given sink.
///
/// The declared namespaces and base IRI are reported after the statements,
/// right before [`end`](QuadSink::end), because the streaming parsers only
/// expose the full declaration list once they have reached it. If parsing
/// fails the error is returned immediately and `end` is not called.
///
/// ```
/// use lodio::{parse_to_sink, CountingSink, RdfFormat, RdfParser, SinkOutcome};
///
/// let file = "<http://example.com/s> <http://example.com/p> <http://example.com/o> .";
///
/// let mut sink = CountingSink::new();
/// let parser = RdfParser::from_format(RdfFormat::NTriples).for_reader(file.as_bytes());
/// assert_eq!(parse_to_sink(parser, &mut sink)?, SinkOutcome::Completed);
/// assert_eq!(sink.asserted(), 1);
/// # Result::<_, lodio::RdfParseError>::Ok(())
/// ```
pub fn parse_to_sink<R: Read, S: QuadSink>(
    mut parser: ReaderQuadParser<R>,
    sink: &mut S,
) -> Result<SinkOutcome, RdfParseError> {
    sink.start();
    let mut outcome = SinkOutcome::Completed;
    for quad in &mut parser {
        let quad = quad?;
        if sink.quad(&quad) == SinkResult::Stop {
            outcome = SinkOutcome::Stopped;
            break;
        }
    }
    for (prefix, iri) in parser.prefixes() {
        sink.namespace(prefix, iri);
    }
    if let Some(iri) = parser.base_iri() {
        sink.base_iri(iri);
    }
    sink.end();
    Ok(outcome)
}

/// Accumulates the statements into a [`Dataset`] and the declarations into
/// [`Namespaces`].
///
/// This sink is a plain single-threaded accumulator and is not meant to be
/// shared: feed it from one parser at a time and read the result out once
/// parsing is done.
#[derive(Debug, Default)]
pub struct DatasetSink {
    dataset: Dataset,
    namespaces: Namespaces,
    base_iri: Option<String>,
}

impl DatasetSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// The statements collected so far.
    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    /// The namespace declarations collected so far.
    pub fn namespaces(&self) -> &Namespaces {
        &self.namespaces
    }

    /// The base IRI of the document, if one was declared.
    pub fn base_iri(&self) -> Option<&str> {
        self.base_iri.as_deref()
    }

    /// Consumes the sink and returns the collected statements.
    pub fn into_dataset(self) -> Dataset {
        self.dataset
    }

    /// Consumes the sink and returns the collected statements and namespaces.
    pub fn into_parts(self) -> (Dataset, Namespaces) {
        (self.dataset, self.namespaces)
    }
}

impl QuadSink for DatasetSink {
    fn quad(&mut self, quad: &Quad) -> SinkResult {
        self.dataset.insert(quad.clone());
        SinkResult::Continue
    }

    fn namespace(&mut self, prefix: &str, iri: &str) {
        self.namespaces.add(prefix, iri);
    }

    fn base_iri(&mut self, iri: &str) {
        self.base_iri = Some(iri.into());
    }
}

/// Counts statements in constant memory instead of materializing them.
///
/// Asserted statements and quotations are counted separately: every `Triple`
/// term nested anywhere inside an asserted quad adds one to the quoted
/// counter per level of quotation, so `<< << s p o >> p1 o1 >> p2 o2 .`
/// counts 1 asserted and 2 quoted.
#[derive(Eq, PartialEq, Debug, Default, Clone, Copy)]
pub struct CountingSink {
    asserted: u64,
    quoted: u64,
}

impl CountingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// The number of asserted statements seen.
    pub fn asserted(&self) -> u64 {
        self.asserted
    }

    /// The number of quoted triples seen inside asserted statements.
    pub fn quoted(&self) -> u64 {
        self.quoted
    }
}

impl QuadSink for CountingSink {
    fn quad(&mut self, quad: &Quad) -> SinkResult {
        self.asserted += 1;
        self.quoted += quoted_in_subject(&quad.subject) + quoted_in_term(&quad.object);
        SinkResult::Continue
    }
}

fn quoted_in_triple(triple: &Triple) -> u64 {
    1 + quoted_in_subject(&triple.subject) + quoted_in_term(&triple.object)
}

fn quoted_in_subject(subject: &Subject) -> u64 {
    if let Subject::Triple(triple) = subject {
        quoted_in_triple(triple)
    } else {
        0
    }
}

fn quoted_in_term(term: &Term) -> u64 {
    if let Term::Triple(triple) = term {
        quoted_in_triple(triple)
    } else {
        0
    }
}

/// Forwards the first `limit` quads to an inner sink, then requests a stop.
pub struct PagingSink<S: QuadSink> {
    inner: S,
    remaining: usize,
}

impl<S: QuadSink> PagingSink<S> {
    pub fn new(inner: S, limit: usize) -> Self {
        Self {
            inner,
            remaining: limit,
        }
    }

    /// The wrapped sink.
    pub fn inner(&self) -> &S {
        &self.inner
    }

    /// Consumes the sink and returns the wrapped one.
    pub fn into_inner(self) -> S {
        self.inner
    }
}

impl<S: QuadSink> QuadSink for PagingSink<S> {
    fn start(&mut self) {
        self.inner.start();
    }

    fn quad(&mut self, quad: &Quad) -> SinkResult {
        if self.remaining == 0 {
            return SinkResult::Stop;
        }
        self.remaining -= 1;
        let result = self.inner.quad(quad);
        if self.remaining == 0 {
            SinkResult::Stop
        } else {
            result
        }
    }

    fn namespace(&mut self, prefix: &str, iri: &str) {
        self.inner.namespace(prefix, iri);
    }

    fn base_iri(&mut self, iri: &str) {
        self.inner.base_iri(iri);
    }

    fn end(&mut self) {
        self.inner.end();
    }
}

/// Fans every event out to several sinks.
///
/// Each quad is delivered to all the chained sinks, and a stop is requested
/// as soon as any of them asks for one, ending the parse for all of them.
#[derive(Default)]
pub struct ChainedSink<'a> {
    sinks: Vec<&'a mut dyn QuadSink>,
}

impl<'a> ChainedSink<'a> {
    pub fn new() -> Self {
        Self { sinks: Vec::new() }
    }

    /// Adds a sink to the chain.
    pub fn push(&mut self, sink: &'a mut dyn QuadSink) {
        self.sinks.push(sink);
    }
}

impl QuadSink for ChainedSink<'_> {
    fn start(&mut self) {
        for sink in &mut self.sinks {
            sink.start();
        }
    }

    fn quad(&mut self, quad: &Quad) -> SinkResult {
        let mut result = SinkResult::Continue;
        for sink in &mut self.sinks {
            if sink.quad(quad) == SinkResult::Stop {
                result = SinkResult::Stop;
            }
        }
        result
    }

    fn namespace(&mut self, prefix: &str, iri: &str) {
        for sink in &mut self.sinks {
            sink.namespace(prefix, iri);
        }
    }

    fn base_iri(&mut self, iri: &str) {
        for sink in &mut self.sinks {
            sink.base_iri(iri);
        }
    }

    fn end(&mut self) {
        for sink in &mut self.sinks {
            sink.end();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{RdfFormat, RdfParser};

    fn run<S: QuadSink>(format: RdfFormat, file: &str, sink: &mut S) -> SinkOutcome {
        parse_to_sink(
            RdfParser::from_format(format).for_reader(file.as_bytes()),
            sink,
        )
        .unwrap()
    }

    #[test]
    fn dataset_sink_collects_statements_and_declarations() {
        let file = "@base <http://example.com/> .
        @prefix schema: <http://schema.org/> .
        <s> a schema:Person .
        <s> schema:name \"Foo\" .";
        let mut sink = DatasetSink::new();
        assert_eq!(run(RdfFormat::Turtle, file, &mut sink), SinkOutcome::Completed);
        assert_eq!(sink.dataset().len(), 2);
        assert_eq!(sink.namespaces().get("schema"), Some("http://schema.org/"));
        assert_eq!(sink.base_iri(), Some("http://example.com/"));
    }

    #[test]
    fn counting_sink_counts_quotations_per_level() {
        let mut sink = CountingSink::new();
        run(
            RdfFormat::NTriples,
            "<< <http://example.com/s> <http://example.com/p> <http://example.com/o> >> <http://example.com/p2> <http://example.com/o2> .",
            &mut sink,
        );
        assert_eq!(sink.asserted(), 1);
        assert_eq!(sink.quoted(), 1);

        let mut sink = CountingSink::new();
        run(
            RdfFormat::NTriples,
            "<< << <http://example.com/s> <http://example.com/p> <http://example.com/o> >> <http://example.com/p1> <http://example.com/o1> >> <http://example.com/p2> <http://example.com/o2> .",
            &mut sink,
        );
        assert_eq!(sink.asserted(), 1);
        assert_eq!(sink.quoted(), 2);
    }

    #[test]
    fn counting_sink_counts_quoted_objects() {
        let mut sink = CountingSink::new();
        run(
            RdfFormat::NTriples,
            "<http://example.com/s> <http://example.com/p> << <http://example.com/a> <http://example.com/b> <http://example.com/c> >> .",
            &mut sink,
        );
        assert_eq!(sink.asserted(), 1);
        assert_eq!(sink.quoted(), 1);
    }

    #[test]
    fn paging_sink_stops_after_limit() {
        let file = "<http://example.com/s> <http://example.com/p> <http://example.com/o1> .
        <http://example.com/s> <http://example.com/p> <http://example.com/o2> .
        <http://example.com/s> <http://example.com/p> <http://example.com/o3> .";
        let mut sink = PagingSink::new(CountingSink::new(), 2);
        assert_eq!(run(RdfFormat::NTriples, file, &mut sink), SinkOutcome::Stopped);
        assert_eq!(sink.inner().asserted(), 2);
    }

    #[test]
    fn paging_sink_with_zero_limit_forwards_nothing() {
        let file = "<http://example.com/s> <http://example.com/p> <http://example.com/o> .";
        let mut sink = PagingSink::new(CountingSink::new(), 0);
        assert_eq!(run(RdfFormat::NTriples, file, &mut sink), SinkOutcome::Stopped);
        assert_eq!(sink.inner().asserted(), 0);
    }

    #[test]
    fn chained_sink_stops_all_when_any_stops() {
        let file = "<http://example.com/s> <http://example.com/p> <http://example.com/o1> .
        <http://example.com/s> <http://example.com/p> <http://example.com/o2> .
        <http://example.com/s> <http://example.com/p> <http://example.com/o3> .";
        let mut counter = CountingSink::new();
        let mut pager = PagingSink::new(CountingSink::new(), 1);
        let mut chain = ChainedSink::new();
        chain.push(&mut counter);
        chain.push(&mut pager);
        assert_eq!(run(RdfFormat::NTriples, file, &mut chain), SinkOutcome::Stopped);
        // the stop request ends the parse for every chained sink
        assert_eq!(counter.asserted(), 1);
    }

    #[test]
    fn sink_stop_is_not_an_error() {
        let file = "<http://example.com/s> <http://example.com/p> <http://example.com/o> .
        this is not valid N-Triples";
        let mut sink = PagingSink::new(DatasetSink::new(), 1);
        let parser = RdfParser::from_format(RdfFormat::NTriples).for_reader(file.as_bytes());
        // the sink stops before the syntax error is reached
        assert_eq!(parse_to_sink(parser, &mut sink).unwrap(), SinkOutcome::Stopped);
        assert_eq!(sink.into_inner().into_dataset().len(), 1);
    }
}
