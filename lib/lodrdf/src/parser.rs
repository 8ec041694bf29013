use crate::vocab::xsd;
use crate::{
    BlankNode, GraphName, Literal, NamedNode, Quad, Subject, Term, Triple, Variable,
};
use std::str::FromStr;

/// Quoted triples nested deeper than this are rejected instead of risking a
/// stack overflow.
const MAX_QUOTED_TRIPLE_DEPTH: usize = 128;

/// An error raised during term serialization parsing using the [`FromStr`] trait.
#[derive(Debug, thiserror::Error)]
#[error("{message}")]
pub struct TermParseError {
    message: String,
}

impl TermParseError {
    fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl FromStr for NamedNode {
    type Err = TermParseError;

    /// Parses a named node from its N-Triples and Turtle serialization
    ///
    /// ```
    /// use lodrdf::NamedNode;
    /// use std::str::FromStr;
    ///
    /// assert_eq!(
    ///     NamedNode::from_str("<http://example.com>")?,
    ///     NamedNode::new("http://example.com")?
    /// );
    /// # Result::<_, Box<dyn std::error::Error>>::Ok(())
    /// ```
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut scanner = Scanner::new(s);
        let node = scanner.named_node()?;
        scanner.expect_end("a named node")?;
        Ok(node)
    }
}

impl FromStr for BlankNode {
    type Err = TermParseError;

    /// Parses a blank node from its N-Triples serialization
    ///
    /// ```
    /// use lodrdf::BlankNode;
    /// use std::str::FromStr;
    ///
    /// assert_eq!(BlankNode::from_str("_:node1")?, BlankNode::new("node1")?);
    /// # Result::<_, Box<dyn std::error::Error>>::Ok(())
    /// ```
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut scanner = Scanner::new(s);
        let node = scanner.blank_node()?;
        scanner.expect_end("a blank node")?;
        Ok(node)
    }
}

impl FromStr for Literal {
    type Err = TermParseError;

    /// Parses a literal from its N-Triples or Turtle serialization
    ///
    /// ```
    /// use lodrdf::vocab::xsd;
    /// use lodrdf::{Literal, NamedNode};
    /// use std::str::FromStr;
    ///
    /// assert_eq!(
    ///     Literal::from_str("\"a\\nb\"")?,
    ///     Literal::new_simple_literal("a\nb")
    /// );
    /// assert_eq!(
    ///     Literal::from_str("\"hello\"@en")?,
    ///     Literal::new_language_tagged_literal("hello", "en")?
    /// );
    /// assert_eq!(
    ///     Literal::from_str("true")?,
    ///     Literal::new_typed_literal("true", NamedNode::new_unchecked(xsd::BOOLEAN))
    /// );
    /// assert_eq!(
    ///     Literal::from_str("-122.23")?,
    ///     Literal::new_typed_literal("-122.23", NamedNode::new_unchecked(xsd::DECIMAL))
    /// );
    /// # Result::<_, Box<dyn std::error::Error>>::Ok(())
    /// ```
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut scanner = Scanner::new(s);
        let literal = scanner.literal()?;
        scanner.expect_end("a literal")?;
        Ok(literal)
    }
}

impl FromStr for Term {
    type Err = TermParseError;

    /// Parses a term from its N-Triples serialization
    ///
    /// ```
    /// use lodrdf::*;
    /// use std::str::FromStr;
    ///
    /// assert_eq!(
    ///     Term::from_str("\"hello\"")?,
    ///     Literal::new_simple_literal("hello").into()
    /// );
    /// # Result::<_, Box<dyn std::error::Error>>::Ok(())
    /// ```
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut scanner = Scanner::new(s);
        let term = scanner.term(0)?;
        scanner.expect_end("a term")?;
        Ok(term)
    }
}

impl FromStr for Triple {
    type Err = TermParseError;

    /// Parses a triple from its N-Triples serialization
    ///
    /// ```
    /// use lodrdf::{BlankNode, Literal, NamedNode, Triple};
    /// use std::str::FromStr;
    ///
    /// assert_eq!(
    ///     Triple::from_str("_:s <http://example.com/p> \"o\" .")?,
    ///     Triple::new(
    ///         BlankNode::new("s")?,
    ///         NamedNode::new("http://example.com/p")?,
    ///         Literal::new_simple_literal("o")
    ///     )
    /// );
    /// # Result::<_, Box<dyn std::error::Error>>::Ok(())
    /// ```
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut scanner = Scanner::new(s);
        let triple = scanner.triple(0)?;
        scanner.skip_final_dot();
        scanner.expect_end("a triple")?;
        Ok(triple)
    }
}

impl FromStr for Quad {
    type Err = TermParseError;

    /// Parses a quad from its N-Quads serialization
    ///
    /// ```
    /// use lodrdf::{BlankNode, GraphName, Literal, NamedNode, Quad};
    /// use std::str::FromStr;
    ///
    /// assert_eq!(
    ///     Quad::from_str("_:s <http://example.com/p> \"o\" <http://example.com/g> .")?,
    ///     Quad::new(
    ///         BlankNode::new("s")?,
    ///         NamedNode::new("http://example.com/p")?,
    ///         Literal::new_simple_literal("o"),
    ///         NamedNode::new("http://example.com/g")?
    ///     )
    /// );
    /// # Result::<_, Box<dyn std::error::Error>>::Ok(())
    /// ```
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut scanner = Scanner::new(s);
        let triple = scanner.triple(0)?;
        let graph_name = scanner.graph_name()?;
        scanner.skip_final_dot();
        scanner.expect_end("a quad")?;
        Ok(triple.in_graph(graph_name))
    }
}

impl FromStr for Variable {
    type Err = TermParseError;

    /// Parses a variable from its SPARQL serialization
    ///
    /// ```
    /// use lodrdf::Variable;
    /// use std::str::FromStr;
    ///
    /// assert_eq!(Variable::from_str("$name")?, Variable::new("name")?);
    /// # Result::<_, Box<dyn std::error::Error>>::Ok(())
    /// ```
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s
            .strip_prefix('?')
            .or_else(|| s.strip_prefix('$'))
            .ok_or_else(|| TermParseError::new("a variable must start with '?' or '$'"))?;
        Self::new(name)
            .map_err(|e| TermParseError::new(format!("invalid variable name '{name}': {e}")))
    }
}

/// Cursor over the remaining input.
struct Scanner<'a> {
    input: &'a str,
}

impl<'a> Scanner<'a> {
    fn new(input: &'a str) -> Self {
        Self { input }
    }

    fn skip_whitespace(&mut self) {
        self.input = self.input.trim_start();
    }

    fn skip_final_dot(&mut self) {
        self.skip_whitespace();
        if let Some(rest) = self.input.strip_prefix('.') {
            self.input = rest;
        }
    }

    fn expect_end(&mut self, what: &str) -> Result<(), TermParseError> {
        self.skip_whitespace();
        if self.input.is_empty() {
            Ok(())
        } else {
            Err(TermParseError::new(format!(
                "unexpected trailing content after {what}: '{}'",
                self.input
            )))
        }
    }

    fn eat(&mut self, prefix: &str) -> bool {
        if let Some(rest) = self.input.strip_prefix(prefix) {
            self.input = rest;
            true
        } else {
            false
        }
    }

    fn named_node(&mut self) -> Result<NamedNode, TermParseError> {
        self.skip_whitespace();
        if !self.eat("<") {
            return Err(TermParseError::new("a named node must start with '<'"));
        }
        let end = self
            .input
            .find('>')
            .ok_or_else(|| TermParseError::new("a named node must end with '>'"))?;
        let iri = &self.input[..end];
        self.input = &self.input[end + 1..];
        let iri = if iri.contains('\\') {
            unescape(iri, false)?
        } else {
            iri.to_owned()
        };
        NamedNode::new(&iri)
            .map_err(|e| TermParseError::new(format!("invalid IRI '{iri}': {e}")))
    }

    fn blank_node(&mut self) -> Result<BlankNode, TermParseError> {
        self.skip_whitespace();
        if !self.eat("_:") {
            return Err(TermParseError::new("a blank node must start with '_:'"));
        }
        let mut end = self
            .input
            .find(|c: char| c.is_whitespace() || "<>\"'@^:?$(){}[]".contains(c))
            .unwrap_or(self.input.len());
        // a final '.' is the statement terminator, not part of the label
        while self.input[..end].ends_with('.') {
            end -= 1;
        }
        let id = &self.input[..end];
        self.input = &self.input[end..];
        BlankNode::new(id)
            .map_err(|e| TermParseError::new(format!("invalid blank node id '{id}': {e}")))
    }

    fn literal(&mut self) -> Result<Literal, TermParseError> {
        self.skip_whitespace();
        if self.input.starts_with('"') {
            self.quoted_literal()
        } else {
            self.bare_literal()
        }
    }

    fn quoted_literal(&mut self) -> Result<Literal, TermParseError> {
        debug_assert!(self.input.starts_with('"'));
        // find the closing quote, skipping escaped characters
        let bytes = self.input.as_bytes();
        let mut i = 1;
        loop {
            match bytes.get(i) {
                Some(b'"') => break,
                Some(b'\\') => i += 2,
                Some(_) => i += 1,
                None => return Err(TermParseError::new("unterminated string literal")),
            }
        }
        let value = unescape(&self.input[1..i], true)?;
        self.input = &self.input[i + 1..];
        if self.eat("@") {
            let end = self
                .input
                .find(|c: char| !c.is_ascii_alphanumeric() && c != '-')
                .unwrap_or(self.input.len());
            let tag = &self.input[..end];
            self.input = &self.input[end..];
            Literal::new_language_tagged_literal(value, tag)
                .map_err(|e| TermParseError::new(format!("invalid language tag '{tag}': {e}")))
        } else if self.eat("^^") {
            Ok(Literal::new_typed_literal(value, self.named_node()?))
        } else {
            Ok(Literal::new_simple_literal(value))
        }
    }

    /// `true`, `false` and the numeric shorthand from the Turtle grammar.
    fn bare_literal(&mut self) -> Result<Literal, TermParseError> {
        for keyword in ["true", "false"] {
            if self.eat(keyword) {
                return Ok(Literal::new_typed_literal(
                    keyword,
                    NamedNode::new_unchecked(xsd::BOOLEAN),
                ));
            }
        }
        let bytes = self.input.as_bytes();
        let mut i = usize::from(matches!(bytes.first(), Some(b'+' | b'-')));
        let integer_digits = count_digits(&bytes[i..]);
        i += integer_digits;
        let mut fraction_digits = 0;
        let has_dot = bytes.get(i) == Some(&b'.');
        if has_dot {
            fraction_digits = count_digits(&bytes[i + 1..]);
            if fraction_digits > 0 {
                i += 1 + fraction_digits;
            }
        }
        let datatype = if matches!(bytes.get(i), Some(b'e' | b'E')) {
            let mut j = i + 1;
            if matches!(bytes.get(j), Some(b'+' | b'-')) {
                j += 1;
            }
            let exponent_digits = count_digits(&bytes[j..]);
            if exponent_digits == 0 {
                return Err(TermParseError::new("missing exponent digits"));
            }
            i = j + exponent_digits;
            xsd::DOUBLE
        } else if has_dot && fraction_digits > 0 {
            xsd::DECIMAL
        } else if integer_digits > 0 {
            xsd::INTEGER
        } else {
            return Err(TermParseError::new(format!(
                "unexpected term serialization: '{}'",
                self.input
            )));
        };
        let value = &self.input[..i];
        self.input = &self.input[i..];
        Ok(Literal::new_typed_literal(
            value,
            NamedNode::new_unchecked(datatype),
        ))
    }

    fn term(&mut self, depth: usize) -> Result<Term, TermParseError> {
        self.skip_whitespace();
        if self.input.starts_with("<<") {
            if depth >= MAX_QUOTED_TRIPLE_DEPTH {
                return Err(TermParseError::new("too many nested quoted triples"));
            }
            self.eat("<<");
            let triple = self.triple(depth + 1)?;
            self.skip_whitespace();
            if !self.eat(">>") {
                return Err(TermParseError::new("a quoted triple must end with '>>'"));
            }
            Ok(triple.into())
        } else if self.input.starts_with('<') {
            Ok(self.named_node()?.into())
        } else if self.input.starts_with("_:") {
            Ok(self.blank_node()?.into())
        } else {
            Ok(self.literal()?.into())
        }
    }

    fn triple(&mut self, depth: usize) -> Result<Triple, TermParseError> {
        let subject: Subject = match self.term(depth)? {
            Term::NamedNode(s) => s.into(),
            Term::BlankNode(s) => s.into(),
            Term::Literal(_) => {
                return Err(TermParseError::new(
                    "literals are not allowed in subject position",
                ));
            }
            Term::Triple(s) => (*s).into(),
        };
        let predicate = self.named_node()?;
        let object = self.term(depth)?;
        Ok(Triple {
            subject,
            predicate,
            object,
        })
    }

    fn graph_name(&mut self) -> Result<GraphName, TermParseError> {
        self.skip_whitespace();
        if self.input.starts_with('<') {
            Ok(self.named_node()?.into())
        } else if self.input.starts_with("_:") {
            Ok(self.blank_node()?.into())
        } else {
            Ok(GraphName::DefaultGraph)
        }
    }
}

fn count_digits(bytes: &[u8]) -> usize {
    bytes.iter().take_while(|b| b.is_ascii_digit()).count()
}

/// Decodes `\uXXXX`/`\UXXXXXXXX` escapes, and the single-character string
/// escapes when `string_escapes` is set (IRIs only allow the unicode forms).
fn unescape(s: &str, string_escapes: bool) -> Result<String, TermParseError> {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        let Some(escape) = chars.next() else {
            return Err(TermParseError::new("truncated escape sequence"));
        };
        match escape {
            'u' => out.push(decode_code_point(&mut chars, 4)?),
            'U' => out.push(decode_code_point(&mut chars, 8)?),
            't' if string_escapes => out.push('\t'),
            'b' if string_escapes => out.push('\u{8}'),
            'n' if string_escapes => out.push('\n'),
            'r' if string_escapes => out.push('\r'),
            'f' if string_escapes => out.push('\u{C}'),
            '"' | '\'' | '\\' if string_escapes => out.push(escape),
            _ if string_escapes => {
                return Err(TermParseError::new(format!("unknown escape '\\{escape}'")));
            }
            _ => {
                // IRIs keep unrecognized backslash sequences as-is, IRI
                // validation decides whether they are acceptable
                out.push('\\');
                out.push(escape);
            }
        }
    }
    Ok(out)
}

fn decode_code_point(
    chars: &mut std::str::Chars<'_>,
    len: usize,
) -> Result<char, TermParseError> {
    let mut value: u32 = 0;
    for _ in 0..len {
        let digit = chars
            .next()
            .and_then(|c| c.to_digit(16))
            .ok_or_else(|| TermParseError::new("invalid unicode escape"))?;
        value = value * 16 + digit;
    }
    char::from_u32(value)
        .ok_or_else(|| TermParseError::new(format!("invalid unicode code point U+{value:X}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unicode_escapes() {
        assert_eq!(
            Term::from_str("\"caf\\u00E9 caf\\U000000E9\"").unwrap(),
            Literal::new_simple_literal("caf\u{e9} caf\u{e9}").into()
        );
        assert_eq!(
            Term::from_str("<http://example.com/\\u00E9\\U000000E9>").unwrap(),
            NamedNode::new_unchecked("http://example.com/\u{e9}\u{e9}").into()
        );
    }

    #[test]
    fn quoted_triple_parsing() {
        assert_eq!(
            Term::from_str("<< _:s <http://example.com/p> \"o\" >>").unwrap(),
            Triple::new(
                BlankNode::new("s").unwrap(),
                NamedNode::new("http://example.com/p").unwrap(),
                Literal::new_simple_literal("o"),
            )
            .into()
        );
    }

    #[test]
    fn numeric_shorthand() {
        assert_eq!(
            Literal::from_str("+122").unwrap(),
            Literal::new_typed_literal("+122", NamedNode::new_unchecked(xsd::INTEGER))
        );
        assert_eq!(
            Literal::from_str("-122e+1").unwrap(),
            Literal::new_typed_literal("-122e+1", NamedNode::new_unchecked(xsd::DOUBLE))
        );
        assert!(Literal::from_str("12.").is_err());
        assert!(Literal::from_str("1e").is_err());
    }

    #[test]
    fn trailing_content_is_rejected() {
        assert!(NamedNode::from_str("<http://example.com> x").is_err());
        assert!(Term::from_str("\"a\" \"b\"").is_err());
    }
}
