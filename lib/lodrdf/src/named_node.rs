use oxiri::{Iri, IriParseError};
use std::cmp::Ordering;
use std::fmt;

/// An owned RDF [IRI](https://www.w3.org/TR/rdf11-concepts/#dfn-iri).
///
/// [`fmt::Display`] writes the N-Triples, Turtle, and SPARQL serialization:
/// ```
/// use lodrdf::NamedNode;
///
/// assert_eq!(
///     NamedNode::new("http://example.com/people#alice")?.to_string(),
///     "<http://example.com/people#alice>"
/// );
/// # Result::<_, oxiri::IriParseError>::Ok(())
/// ```
#[derive(Eq, PartialEq, Ord, PartialOrd, Debug, Clone, Hash)]
pub struct NamedNode {
    iri: String,
}

impl NamedNode {
    /// Builds an [IRI](https://www.w3.org/TR/rdf11-concepts/#dfn-iri), validating it.
    pub fn new(iri: impl Into<String>) -> Result<Self, IriParseError> {
        Ok(Iri::parse(iri.into())?.into())
    }

    /// Builds an [IRI](https://www.w3.org/TR/rdf11-concepts/#dfn-iri) without validating it.
    ///
    /// The caller must guarantee that `iri` is a valid IRI.
    /// Use [`NamedNode::new()`] on untrusted data.
    #[inline]
    pub fn new_unchecked(iri: impl Into<String>) -> Self {
        Self { iri: iri.into() }
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.iri
    }

    #[inline]
    pub fn into_string(self) -> String {
        self.iri
    }
}

impl fmt::Display for NamedNode {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{}>", self.iri)
    }
}

impl PartialEq<str> for NamedNode {
    #[inline]
    fn eq(&self, other: &str) -> bool {
        self.iri == other
    }
}

impl PartialEq<&str> for NamedNode {
    #[inline]
    fn eq(&self, other: &&str) -> bool {
        self.iri == **other
    }
}

impl PartialEq<NamedNode> for str {
    #[inline]
    fn eq(&self, other: &NamedNode) -> bool {
        other.iri == self
    }
}

impl PartialOrd<str> for NamedNode {
    #[inline]
    fn partial_cmp(&self, other: &str) -> Option<Ordering> {
        Some(self.iri.as_str().cmp(other))
    }
}

impl From<Iri<String>> for NamedNode {
    #[inline]
    fn from(iri: Iri<String>) -> Self {
        Self {
            iri: iri.into_inner(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_validates() {
        assert!(NamedNode::new("http://xmlns.com/foaf/0.1/knows").is_ok());
        assert!(NamedNode::new("people#alice").is_err());
        assert!(NamedNode::new("http://example.com/a b").is_err());
    }

    #[test]
    fn display_is_n_triples() {
        assert_eq!(
            NamedNode::new_unchecked("http://example.com/people").to_string(),
            "<http://example.com/people>"
        );
    }
}
