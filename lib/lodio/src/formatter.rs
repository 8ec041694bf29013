//! Per-syntax term and statement formatters.
//!
//! Unlike the streaming serializers, the formatters turn a single term or
//! statement into a [`String`], validating that the term is allowed at the
//! requested position of the target syntax. They return
//! [`UnserializableError`] instead of ever emitting output the syntax
//! grammar would reject.

use crate::error::UnserializableError;
use lodrdf::vocab::xsd;
use lodrdf::{GraphName, Literal, Namespaces, Quad, Term, Triple, Variable};
use std::fmt;

/// The position of a term inside a statement.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash)]
pub enum TermPosition {
    Subject,
    Predicate,
    Object,
    GraphName,
}

impl fmt::Display for TermPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Subject => "subject",
            Self::Predicate => "predicate",
            Self::Object => "object",
            Self::GraphName => "graph name",
        })
    }
}

/// Formats terms and statements using the N-Triples / N-Quads syntax.
///
/// The output is ASCII-only: characters outside the ASCII range are escaped
/// with `\uXXXX` or `\UXXXXXXXX`.
///
/// ```
/// use lodio::{NTriplesFormatter, TermPosition};
/// use lodrdf::{Literal, Term};
///
/// let formatter = NTriplesFormatter::new();
/// assert_eq!(
///     formatter.format_term(&Literal::from("caf\u{e9}").into(), TermPosition::Object)?,
///     "\"caf\\u00E9\""
/// );
/// assert!(formatter
///     .format_term(&Literal::from("x").into(), TermPosition::Subject)
///     .is_err());
/// # Result::<_, lodio::UnserializableError>::Ok(())
/// ```
#[derive(Debug, Default, Clone, Copy)]
pub struct NTriplesFormatter;

impl NTriplesFormatter {
    pub fn new() -> Self {
        Self
    }

    /// Formats a single term at the given position.
    pub fn format_term(
        &self,
        term: &Term,
        position: TermPosition,
    ) -> Result<String, UnserializableError> {
        let mut out = String::new();
        write_ntriples_term(&mut out, term, position)?;
        Ok(out)
    }

    /// Formats a whole triple, terminated by ` .`.
    pub fn format_triple(&self, triple: &Triple) -> Result<String, UnserializableError> {
        let mut out = String::new();
        write_ntriples_triple(&mut out, triple)?;
        out.push_str(" .");
        Ok(out)
    }

    /// Formats a whole quad in the N-Quads syntax, terminated by ` .`.
    pub fn format_quad(&self, quad: &Quad) -> Result<String, UnserializableError> {
        let mut out = String::new();
        write_ntriples_triple(
            &mut out,
            &Triple {
                subject: quad.subject.clone(),
                predicate: quad.predicate.clone(),
                object: quad.object.clone(),
            },
        )?;
        match &quad.graph_name {
            GraphName::NamedNode(node) => {
                out.push(' ');
                write_iri(&mut out, node.as_str(), true);
            }
            GraphName::BlankNode(node) => {
                out.push_str(" _:");
                out.push_str(node.as_str());
            }
            GraphName::DefaultGraph => (),
        }
        out.push_str(" .");
        Ok(out)
    }
}

fn write_ntriples_triple(out: &mut String, triple: &Triple) -> Result<(), UnserializableError> {
    write_ntriples_term(out, &triple.subject.clone().into(), TermPosition::Subject)?;
    out.push(' ');
    write_iri(out, triple.predicate.as_str(), true);
    out.push(' ');
    write_ntriples_term(out, &triple.object, TermPosition::Object)
}

fn write_ntriples_term(
    out: &mut String,
    term: &Term,
    position: TermPosition,
) -> Result<(), UnserializableError> {
    match term {
        Term::NamedNode(node) => {
            write_iri(out, node.as_str(), true);
            Ok(())
        }
        Term::BlankNode(node) => {
            if position == TermPosition::Predicate {
                return Err(unserializable("a blank node", position, "N-Triples"));
            }
            out.push_str("_:");
            out.push_str(node.as_str());
            Ok(())
        }
        Term::Literal(literal) => {
            if position != TermPosition::Object {
                return Err(unserializable("a literal", position, "N-Triples"));
            }
            write_quoted_string(out, literal.value(), true);
            if let Some(language) = literal.language() {
                out.push('@');
                out.push_str(language);
            } else if !literal.is_plain() {
                out.push_str("^^");
                write_iri(out, literal.datatype().as_str(), true);
            }
            Ok(())
        }
        Term::Triple(triple) => {
            if position == TermPosition::Predicate || position == TermPosition::GraphName {
                return Err(unserializable("a quoted triple", position, "N-Triples"));
            }
            out.push_str("<< ");
            write_ntriples_triple(out, triple)?;
            out.push_str(" >>");
            Ok(())
        }
    }
}

/// Formats terms and statements using the Turtle syntax.
///
/// IRIs are reduced to prefixed names when a declared namespace matches and
/// the remaining local part is valid in the prefixed name grammar, and
/// literals of the common XSD numeric and boolean datatypes are written bare
/// when their lexical form allows it.
///
/// ```
/// use lodio::{TermPosition, TurtleFormatter};
/// use lodrdf::{NamedNode, Namespaces};
///
/// let mut namespaces = Namespaces::new();
/// namespaces.add("schema", "http://schema.org/");
/// let formatter = TurtleFormatter::with_namespaces(namespaces);
/// assert_eq!(
///     formatter.format_term(
///         &NamedNode::new("http://schema.org/name")?.into(),
///         TermPosition::Predicate
///     )?,
///     "schema:name"
/// );
/// # Result::<_, Box<dyn std::error::Error>>::Ok(())
/// ```
#[derive(Debug, Default, Clone)]
pub struct TurtleFormatter {
    namespaces: Namespaces,
}

impl TurtleFormatter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a formatter reducing IRIs against the given namespaces.
    pub fn with_namespaces(namespaces: Namespaces) -> Self {
        Self { namespaces }
    }

    /// The namespaces used for prefixed name reduction.
    pub fn namespaces(&self) -> &Namespaces {
        &self.namespaces
    }

    /// Formats a single term at the given position.
    pub fn format_term(
        &self,
        term: &Term,
        position: TermPosition,
    ) -> Result<String, UnserializableError> {
        let mut out = String::new();
        write_terse_term(&mut out, term, position, &self.namespaces, "Turtle", true)?;
        Ok(out)
    }

    /// Formats a whole triple, terminated by ` .`.
    pub fn format_triple(&self, triple: &Triple) -> Result<String, UnserializableError> {
        let mut out = String::new();
        write_terse_triple(&mut out, triple, &self.namespaces, "Turtle", true)?;
        out.push_str(" .");
        Ok(out)
    }
}

/// Formats terms and statements for inclusion in SPARQL queries.
///
/// It shares the Turtle term syntax and additionally accepts
/// [`Variable`]s, which are valid in every position. Quoted triples are
/// rejected, the SPARQL grammar has no syntax for them.
///
/// ```
/// use lodio::SparqlFormatter;
/// use lodrdf::Variable;
///
/// let formatter = SparqlFormatter::new();
/// assert_eq!(
///     formatter.format_variable(&Variable::new("name")?),
///     "?name"
/// );
/// # Result::<_, Box<dyn std::error::Error>>::Ok(())
/// ```
#[derive(Debug, Default, Clone)]
pub struct SparqlFormatter {
    namespaces: Namespaces,
}

impl SparqlFormatter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a formatter reducing IRIs against the given namespaces.
    pub fn with_namespaces(namespaces: Namespaces) -> Self {
        Self { namespaces }
    }

    /// Formats a single term at the given position.
    pub fn format_term(
        &self,
        term: &Term,
        position: TermPosition,
    ) -> Result<String, UnserializableError> {
        let mut out = String::new();
        write_terse_term(&mut out, term, position, &self.namespaces, "SPARQL", false)?;
        Ok(out)
    }

    /// Formats a variable.
    pub fn format_variable(&self, variable: &Variable) -> String {
        format!("?{}", variable.as_str())
    }
}

fn write_terse_triple(
    out: &mut String,
    triple: &Triple,
    namespaces: &Namespaces,
    format: &'static str,
    allow_quoted: bool,
) -> Result<(), UnserializableError> {
    write_terse_term(
        out,
        &triple.subject.clone().into(),
        TermPosition::Subject,
        namespaces,
        format,
        allow_quoted,
    )?;
    out.push(' ');
    write_reduced_iri(out, triple.predicate.as_str(), namespaces);
    out.push(' ');
    write_terse_term(
        out,
        &triple.object,
        TermPosition::Object,
        namespaces,
        format,
        allow_quoted,
    )
}

fn write_terse_term(
    out: &mut String,
    term: &Term,
    position: TermPosition,
    namespaces: &Namespaces,
    format: &'static str,
    allow_quoted: bool,
) -> Result<(), UnserializableError> {
    match term {
        Term::NamedNode(node) => {
            write_reduced_iri(out, node.as_str(), namespaces);
            Ok(())
        }
        Term::BlankNode(node) => {
            if position == TermPosition::Predicate {
                return Err(unserializable("a blank node", position, format));
            }
            out.push_str("_:");
            out.push_str(node.as_str());
            Ok(())
        }
        Term::Literal(literal) => {
            if position != TermPosition::Object {
                return Err(unserializable("a literal", position, format));
            }
            write_terse_literal(out, literal, namespaces);
            Ok(())
        }
        Term::Triple(triple) => {
            if !allow_quoted
                || position == TermPosition::Predicate
                || position == TermPosition::GraphName
            {
                return Err(unserializable("a quoted triple", position, format));
            }
            out.push_str("<< ");
            write_terse_triple(out, triple, namespaces, format, allow_quoted)?;
            out.push_str(" >>");
            Ok(())
        }
    }
}

fn write_terse_literal(out: &mut String, literal: &Literal, namespaces: &Namespaces) {
    let value = literal.value();
    if let Some(language) = literal.language() {
        write_quoted_string(out, value, false);
        out.push('@');
        out.push_str(language);
        return;
    }
    let datatype = literal.datatype();
    if literal.is_plain() {
        write_quoted_string(out, value, false);
    } else if datatype == xsd::INTEGER && is_turtle_integer(value)
        || datatype == xsd::DECIMAL && is_turtle_decimal(value)
        || datatype == xsd::DOUBLE && is_turtle_double(value)
        || datatype == xsd::BOOLEAN && is_turtle_boolean(value)
    {
        out.push_str(value);
    } else {
        write_quoted_string(out, value, false);
        out.push_str("^^");
        write_reduced_iri(out, datatype.as_str(), namespaces);
    }
}

/// Writes the IRI as a prefixed name if a namespace matches and the
/// reduction survives lexical re-validation, as `<iri>` otherwise.
fn write_reduced_iri(out: &mut String, iri: &str, namespaces: &Namespaces) {
    if let Some((prefix, local)) = namespaces.reduce(iri) {
        if is_valid_prefix(prefix) && is_valid_local_name(local) {
            out.push_str(prefix);
            out.push(':');
            out.push_str(local);
            return;
        }
    }
    write_iri(out, iri, false);
}

fn is_valid_prefix(prefix: &str) -> bool {
    let mut chars = prefix.chars();
    let Some(first) = chars.next() else {
        // the empty prefix of a default namespace declaration
        return true;
    };
    if !first.is_alphabetic() {
        return false;
    }
    let mut last = first;
    for c in chars {
        if !(c.is_alphanumeric() || matches!(c, '_' | '-' | '.')) {
            return false;
        }
        last = c;
    }
    last != '.'
}

fn is_valid_local_name(local: &str) -> bool {
    let mut chars = local.chars();
    let Some(first) = chars.next() else {
        // "prefix:" with an empty local part is valid
        return true;
    };
    if !(first.is_alphanumeric() || matches!(first, '_' | ':')) {
        return false;
    }
    let mut last = first;
    for c in chars {
        if !(c.is_alphanumeric() || matches!(c, '_' | '-' | '.' | ':')) {
            return false;
        }
        last = c;
    }
    last != '.'
}

/// Writes `<iri>`, escaping the characters the IRIREF production forbids.
fn write_iri(out: &mut String, iri: &str, ascii_only: bool) {
    out.push('<');
    for c in iri.chars() {
        match c {
            '<' | '>' | '"' | '{' | '}' | '|' | '^' | '`' | '\\' => write_escaped_char(out, c),
            c if u32::from(c) <= 0x20 => write_escaped_char(out, c),
            c if ascii_only && !c.is_ascii() => write_escaped_char(out, c),
            c => out.push(c),
        }
    }
    out.push('>');
}

fn write_quoted_string(out: &mut String, value: &str, ascii_only: bool) {
    out.push('"');
    for c in value.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if u32::from(c) < 0x20 => write_escaped_char(out, c),
            c if ascii_only && !c.is_ascii() => write_escaped_char(out, c),
            c => out.push(c),
        }
    }
    out.push('"');
}

fn write_escaped_char(out: &mut String, c: char) {
    let code = u32::from(c);
    if code <= 0xFFFF {
        out.push_str(&format!("\\u{code:04X}"));
    } else {
        out.push_str(&format!("\\U{code:08X}"));
    }
}

fn unserializable(
    kind: &'static str,
    position: TermPosition,
    format: &'static str,
) -> UnserializableError {
    UnserializableError {
        kind,
        position,
        format,
    }
}

// Turtle grammar productions for the bare literal forms.

/// Matches the INTEGER production: `[+-]? [0-9]+`.
fn is_turtle_integer(value: &str) -> bool {
    let mut value = value.as_bytes();
    if let Some(v) = value.strip_prefix(b"+") {
        value = v;
    } else if let Some(v) = value.strip_prefix(b"-") {
        value = v;
    }
    !value.is_empty() && value.iter().all(u8::is_ascii_digit)
}

/// Matches the DECIMAL production: `[+-]? [0-9]* '.' [0-9]+`.
fn is_turtle_decimal(value: &str) -> bool {
    let mut value = value.as_bytes();
    if let Some(v) = value.strip_prefix(b"+") {
        value = v;
    } else if let Some(v) = value.strip_prefix(b"-") {
        value = v;
    }
    while value.first().is_some_and(u8::is_ascii_digit) {
        value = &value[1..];
    }
    let Some(value) = value.strip_prefix(b".") else {
        return false;
    };
    !value.is_empty() && value.iter().all(u8::is_ascii_digit)
}

/// Matches the DOUBLE production: mantissa with `.` or not, then exponent.
fn is_turtle_double(value: &str) -> bool {
    let mut value = value.as_bytes();
    if let Some(v) = value.strip_prefix(b"+") {
        value = v;
    } else if let Some(v) = value.strip_prefix(b"-") {
        value = v;
    }
    let mut with_before = false;
    while value.first().is_some_and(u8::is_ascii_digit) {
        value = &value[1..];
        with_before = true;
    }
    let mut with_after = false;
    if let Some(v) = value.strip_prefix(b".") {
        value = v;
        while value.first().is_some_and(u8::is_ascii_digit) {
            value = &value[1..];
            with_after = true;
        }
    }
    if let Some(v) = value.strip_prefix(b"e").or_else(|| value.strip_prefix(b"E")) {
        value = v;
    } else {
        return false;
    }
    if let Some(v) = value.strip_prefix(b"+").or_else(|| value.strip_prefix(b"-")) {
        value = v;
    }
    (with_before || with_after) && !value.is_empty() && value.iter().all(u8::is_ascii_digit)
}

fn is_turtle_boolean(value: &str) -> bool {
    matches!(value, "true" | "false")
}

#[cfg(test)]
mod tests {
    use super::*;
    use lodrdf::{BlankNode, NamedNode};

    fn schema_namespaces() -> Namespaces {
        let mut namespaces = Namespaces::new();
        namespaces.add("schema", "http://schema.org/");
        namespaces
    }

    #[test]
    fn ntriples_positions() {
        let formatter = NTriplesFormatter::new();
        let literal = Term::from(Literal::from("x"));
        assert!(formatter.format_term(&literal, TermPosition::Subject).is_err());
        assert!(formatter.format_term(&literal, TermPosition::Predicate).is_err());
        assert!(formatter.format_term(&literal, TermPosition::GraphName).is_err());
        assert_eq!(
            formatter.format_term(&literal, TermPosition::Object).unwrap(),
            "\"x\""
        );

        let bnode = Term::from(BlankNode::new("b0").unwrap());
        assert!(formatter.format_term(&bnode, TermPosition::Predicate).is_err());
        assert_eq!(
            formatter.format_term(&bnode, TermPosition::Subject).unwrap(),
            "_:b0"
        );
    }

    #[test]
    fn ntriples_escapes_non_ascii() {
        let formatter = NTriplesFormatter::new();
        assert_eq!(
            formatter
                .format_term(&Literal::from("caf\u{e9}\u{1F600}").into(), TermPosition::Object)
                .unwrap(),
            "\"caf\\u00E9\\U0001F600\""
        );
        assert_eq!(
            formatter
                .format_term(
                    &NamedNode::new("http://example.com/caf\u{e9}").unwrap().into(),
                    TermPosition::Subject
                )
                .unwrap(),
            "<http://example.com/caf\\u00E9>"
        );
    }

    #[test]
    fn ntriples_quad_with_graph_name() {
        let formatter = NTriplesFormatter::new();
        let quad = Quad {
            subject: NamedNode::new("http://example.com/s").unwrap().into(),
            predicate: NamedNode::new("http://example.com/p").unwrap(),
            object: Literal::new_language_tagged_literal("ol\u{e9}", "es")
                .unwrap()
                .into(),
            graph_name: NamedNode::new("http://example.com/g").unwrap().into(),
        };
        assert_eq!(
            formatter.format_quad(&quad).unwrap(),
            "<http://example.com/s> <http://example.com/p> \"ol\\u00E9\"@es <http://example.com/g> ."
        );
    }

    #[test]
    fn ntriples_quoted_triple() {
        let formatter = NTriplesFormatter::new();
        let quoted = Term::from(Triple {
            subject: NamedNode::new("http://example.com/s").unwrap().into(),
            predicate: NamedNode::new("http://example.com/p").unwrap(),
            object: NamedNode::new("http://example.com/o").unwrap().into(),
        });
        assert_eq!(
            formatter.format_term(&quoted, TermPosition::Subject).unwrap(),
            "<< <http://example.com/s> <http://example.com/p> <http://example.com/o> >>"
        );
        assert!(formatter.format_term(&quoted, TermPosition::Predicate).is_err());
    }

    #[test]
    fn turtle_reduces_to_prefixed_names() {
        let formatter = TurtleFormatter::with_namespaces(schema_namespaces());
        assert_eq!(
            formatter
                .format_term(
                    &NamedNode::new("http://schema.org/name").unwrap().into(),
                    TermPosition::Predicate
                )
                .unwrap(),
            "schema:name"
        );
        // a local part the prefixed name grammar rejects falls back to the full IRI
        assert_eq!(
            formatter
                .format_term(
                    &NamedNode::new("http://schema.org/a%20b").unwrap().into(),
                    TermPosition::Object
                )
                .unwrap(),
            "<http://schema.org/a%20b>"
        );
        // trailing dots are not valid at the end of a local part
        assert_eq!(
            formatter
                .format_term(
                    &NamedNode::new("http://schema.org/name.").unwrap().into(),
                    TermPosition::Object
                )
                .unwrap(),
            "<http://schema.org/name.>"
        );
    }

    #[test]
    fn turtle_compacts_literals() {
        let formatter = TurtleFormatter::new();
        assert_eq!(
            formatter
                .format_term(&Literal::from(42).into(), TermPosition::Object)
                .unwrap(),
            "42"
        );
        assert_eq!(
            formatter
                .format_term(&Literal::from(true).into(), TermPosition::Object)
                .unwrap(),
            "true"
        );
        // an integer-typed literal with a non-integer lexical form keeps the full syntax
        let odd = Literal::new_typed_literal("abc", NamedNode::new_unchecked(xsd::INTEGER));
        assert_eq!(
            formatter.format_term(&odd.into(), TermPosition::Object).unwrap(),
            "\"abc\"^^<http://www.w3.org/2001/XMLSchema#integer>"
        );
    }

    #[test]
    fn turtle_keeps_unicode_raw() {
        let formatter = TurtleFormatter::new();
        assert_eq!(
            formatter
                .format_term(&Literal::from("caf\u{e9}").into(), TermPosition::Object)
                .unwrap(),
            "\"caf\u{e9}\""
        );
    }

    #[test]
    fn sparql_rejects_quoted_triples() {
        let formatter = SparqlFormatter::new();
        let quoted = Term::from(Triple {
            subject: NamedNode::new("http://example.com/s").unwrap().into(),
            predicate: NamedNode::new("http://example.com/p").unwrap(),
            object: NamedNode::new("http://example.com/o").unwrap().into(),
        });
        assert!(formatter.format_term(&quoted, TermPosition::Subject).is_err());
    }

    #[test]
    fn sparql_formats_variables() {
        let formatter = SparqlFormatter::new();
        assert_eq!(
            formatter.format_variable(&Variable::new("name").unwrap()),
            "?name"
        );
    }

    #[test]
    fn bare_literal_grammar() {
        assert!(is_turtle_integer("42"));
        assert!(is_turtle_integer("-42"));
        assert!(!is_turtle_integer("4.2"));
        assert!(is_turtle_decimal("4.2"));
        assert!(is_turtle_decimal("-.5"));
        assert!(!is_turtle_decimal("42"));
        assert!(is_turtle_double("4.2e1"));
        assert!(is_turtle_double("-42E+3"));
        assert!(!is_turtle_double("4.2"));
    }
}
