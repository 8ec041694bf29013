use rand::random;
use std::fmt;

/// An owned RDF [blank node](https://www.w3.org/TR/rdf11-concepts/#dfn-blank-node).
///
/// The common way to create a new blank node is to use the [`BlankNode::default()`] function,
/// which allocates a fresh process-unique identifier. Every anonymous node written `[]` or
/// produced by a collection goes through it, so two occurrences are always distinct nodes.
///
/// It is also possible to create a blank node from an explicit identifier using
/// [`BlankNode::new()`]. Such labels are only meaningful inside a single parse unit.
///
/// [`fmt::Display`] writes the N-Triples, Turtle, and SPARQL serialization:
/// ```
/// use lodrdf::BlankNode;
///
/// assert_eq!(BlankNode::new("b42")?.to_string(), "_:b42");
/// # Result::<_, lodrdf::BlankNodeIdParseError>::Ok(())
/// ```
#[derive(Eq, PartialEq, Ord, PartialOrd, Debug, Clone, Hash)]
pub struct BlankNode {
    id: String,
}

impl BlankNode {
    /// Builds a blank node from its label, validating it against the N-Triples, Turtle,
    /// and SPARQL `BLANK_NODE_LABEL` productions.
    pub fn new(id: impl Into<String>) -> Result<Self, BlankNodeIdParseError> {
        let id = id.into();
        validate_blank_node_identifier(&id)?;
        Ok(Self { id })
    }

    /// Builds a blank node from its label without validating it.
    ///
    /// The caller must guarantee that `id` matches the `BLANK_NODE_LABEL` production.
    /// Use [`BlankNode::new()`] on untrusted data.
    #[inline]
    pub fn new_unchecked(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }

    /// The blank node label, without the `_:` prefix.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.id
    }

    /// Extracts the blank node label, without the `_:` prefix.
    #[inline]
    pub fn into_string(self) -> String {
        self.id
    }
}

impl Default for BlankNode {
    /// Allocates a blank node with a fresh process-unique identifier.
    #[inline]
    fn default() -> Self {
        // The "e" prefix keeps the id starting with a letter so it is also a valid XML NCName
        Self {
            id: format!("e{:x}", random::<u128>()),
        }
    }
}

impl fmt::Display for BlankNode {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "_:{}", self.id)
    }
}

// BLANK_NODE_LABEL first character: PN_CHARS_U or a digit
fn is_label_start(c: char) -> bool {
    matches!(c,
        '0'..='9' | '_' | ':' | 'A'..='Z' | 'a'..='z'
        | '\u{00C0}'..='\u{00D6}' | '\u{00D8}'..='\u{00F6}' | '\u{00F8}'..='\u{02FF}'
        | '\u{0370}'..='\u{037D}' | '\u{037F}'..='\u{1FFF}' | '\u{200C}'..='\u{200D}'
        | '\u{2070}'..='\u{218F}' | '\u{2C00}'..='\u{2FEF}' | '\u{3001}'..='\u{D7FF}'
        | '\u{F900}'..='\u{FDCF}' | '\u{FDF0}'..='\u{FFFD}' | '\u{10000}'..='\u{EFFFF}')
}

// Following characters also allow PN_CHARS and the dot
fn is_label_char(c: char) -> bool {
    is_label_start(c)
        || matches!(c,
            '.' | '-' | '\u{00B7}' | '\u{0300}'..='\u{036F}' | '\u{203F}'..='\u{2040}')
}

fn validate_blank_node_identifier(id: &str) -> Result<(), BlankNodeIdParseError> {
    let mut chars = id.chars();
    if !chars.next().is_some_and(is_label_start) || !chars.all(is_label_char) {
        return Err(BlankNodeIdParseError);
    }
    // A trailing dot belongs to the enclosing statement, not to the label
    if id.ends_with('.') {
        return Err(BlankNodeIdParseError);
    }
    Ok(())
}

/// An error raised during [`BlankNode`] label validation.
#[derive(Debug, thiserror::Error)]
#[error("The blank node identifier is invalid")]
pub struct BlankNodeIdParseError;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn as_str_keeps_dots() {
        let b = BlankNode::new("b0.c1").unwrap();
        assert_eq!(b.as_str(), "b0.c1");
    }

    #[test]
    fn new_validates() {
        assert!(BlankNode::new("b42").is_ok());
        assert!(BlankNode::new("0b").is_ok());
        assert!(BlankNode::new("-b").is_err());
        assert!(BlankNode::new("b.").is_err());
        assert!(BlankNode::new("").is_err());
    }

    #[test]
    fn default_is_unique_and_ncname_safe() {
        let a = BlankNode::default();
        let b = BlankNode::default();
        assert_ne!(a, b);
        assert!(a.as_str().starts_with('e'));
    }
}
