use crate::named_node::NamedNode;
use oxiri::{Iri, IriParseError};
use std::fmt;

/// An ordered prefix to namespace IRI map.
///
/// Insertion order is preserved by iteration and re-declaring a prefix replaces
/// the namespace in place, so a serializer emits prefixes in the order the
/// parser saw them.
///
/// ```
/// use lodrdf::Namespaces;
///
/// let mut namespaces = Namespaces::new();
/// namespaces.add("ex", "http://example.com/ns#");
/// let term = namespaces.expand("ex", "foo", None)?;
/// assert_eq!(term.as_str(), "http://example.com/ns#foo");
/// assert_eq!(
///     namespaces.reduce("http://example.com/ns#foo"),
///     Some(("ex", "foo"))
/// );
/// # Result::<_, lodrdf::ResolutionError>::Ok(())
/// ```
#[derive(Debug, Clone, Default, Eq, PartialEq)]
pub struct Namespaces {
    entries: Vec<(String, String)>,
}

impl Namespaces {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares a prefix, replacing any previous declaration of the same prefix in place.
    pub fn add(&mut self, prefix: impl Into<String>, namespace: impl Into<String>) {
        let prefix = prefix.into();
        let namespace = namespace.into();
        if let Some(entry) = self.entries.iter_mut().find(|(p, _)| *p == prefix) {
            entry.1 = namespace;
        } else {
            self.entries.push((prefix, namespace));
        }
    }

    /// Removes a prefix declaration, returning the namespace IRI it pointed to.
    pub fn remove(&mut self, prefix: &str) -> Option<String> {
        let index = self.entries.iter().position(|(p, _)| p == prefix)?;
        Some(self.entries.remove(index).1)
    }

    /// The namespace IRI a prefix points to.
    pub fn get(&self, prefix: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(p, _)| p == prefix)
            .map(|(_, ns)| ns.as_str())
    }

    /// Iterates the `(prefix, namespace)` pairs in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(p, ns)| (p.as_str(), ns.as_str()))
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Expands a prefixed name into an absolute IRI.
    ///
    /// The concatenation of the namespace and the local part is resolved against
    /// `base` if it is not already absolute, then validated.
    pub fn expand(
        &self,
        prefix: &str,
        local: &str,
        base: Option<&str>,
    ) -> Result<NamedNode, ResolutionError> {
        let namespace = self
            .get(prefix)
            .ok_or_else(|| ResolutionError::UnknownPrefix(prefix.into()))?;
        // Resolution of an already absolute reference returns it unchanged
        Self::resolve_inner(&format!("{namespace}{local}"), base)
    }

    /// Resolves a possibly relative IRI reference against a base IRI.
    ///
    /// This is plain [RFC 3986](https://www.rfc-editor.org/rfc/rfc3986) resolution:
    /// in particular an empty reference against a base carrying a fragment returns
    /// the base without its fragment.
    pub fn resolve(reference: &str, base: Option<&str>) -> Result<NamedNode, ResolutionError> {
        Self::resolve_inner(reference, base)
    }

    fn resolve_inner(reference: &str, base: Option<&str>) -> Result<NamedNode, ResolutionError> {
        if let Some(base) = base {
            let base = Iri::parse(base.to_owned()).map_err(|error| ResolutionError::InvalidIri {
                iri: base.into(),
                error,
            })?;
            Ok(base
                .resolve(reference)
                .map_err(|error| ResolutionError::InvalidIri {
                    iri: reference.into(),
                    error,
                })?
                .into())
        } else {
            Ok(Iri::parse(reference.to_owned())
                .map_err(|error| ResolutionError::InvalidIri {
                    iri: reference.into(),
                    error,
                })?
                .into())
        }
    }

    /// Finds the longest declared namespace this IRI starts with and splits it
    /// into a `(prefix, local)` pair.
    ///
    /// Returns `None` if no namespace matches or if the local part would not be
    /// lexically valid in Turtle, so callers can fall back to the `<iri>` form
    /// instead of emitting a name that does not parse back.
    pub fn reduce<'a>(&self, iri: &'a str) -> Option<(&str, &'a str)> {
        let (prefix, namespace) = self
            .entries
            .iter()
            .filter(|(_, ns)| !ns.is_empty() && iri.starts_with(ns.as_str()))
            .max_by_key(|(_, ns)| ns.len())?;
        let local = &iri[namespace.len()..];
        if is_valid_local_part(local) {
            Some((prefix, local))
        } else {
            None
        }
    }
}

impl<'a> IntoIterator for &'a Namespaces {
    type Item = (&'a str, &'a str);
    type IntoIter = Box<dyn Iterator<Item = (&'a str, &'a str)> + 'a>;

    fn into_iter(self) -> Self::IntoIter {
        Box::new(self.iter())
    }
}

impl FromIterator<(String, String)> for Namespaces {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        let mut namespaces = Self::new();
        for (prefix, ns) in iter {
            namespaces.add(prefix, ns);
        }
        namespaces
    }
}

/// Checks the Turtle `PN_LOCAL` production, without the escape forms.
///
/// Escapes could make more local parts expressible but a reduction that needs
/// them is rarely what a user wants to read, so we reject instead.
fn is_valid_local_part(local: &str) -> bool {
    let mut chars = local.chars();
    let Some(first) = chars.next() else {
        return true; // empty local parts are allowed: "ex:"
    };
    if !(is_pn_chars_u(first) || first == ':' || first.is_ascii_digit()) {
        return false;
    }
    let mut last = first;
    for c in chars {
        if !(is_pn_chars(c) || c == '.' || c == ':') {
            return false;
        }
        last = c;
    }
    last != '.'
}

fn is_pn_chars_base(c: char) -> bool {
    matches!(c,
        'A'..='Z'
        | 'a'..='z'
        | '\u{00C0}'..='\u{00D6}'
        | '\u{00D8}'..='\u{00F6}'
        | '\u{00F8}'..='\u{02FF}'
        | '\u{0370}'..='\u{037D}'
        | '\u{037F}'..='\u{1FFF}'
        | '\u{200C}'..='\u{200D}'
        | '\u{2070}'..='\u{218F}'
        | '\u{2C00}'..='\u{2FEF}'
        | '\u{3001}'..='\u{D7FF}'
        | '\u{F900}'..='\u{FDCF}'
        | '\u{FDF0}'..='\u{FFFD}'
        | '\u{10000}'..='\u{EFFFF}')
}

fn is_pn_chars_u(c: char) -> bool {
    c == '_' || is_pn_chars_base(c)
}

fn is_pn_chars(c: char) -> bool {
    is_pn_chars_u(c)
        || matches!(c,
            '-' | '0'..='9' | '\u{00B7}' | '\u{0300}'..='\u{036F}' | '\u{203F}'..='\u{2040}')
}

/// An error raised when a prefixed name or a relative IRI cannot be turned
/// into an absolute IRI.
#[derive(Debug, thiserror::Error)]
pub enum ResolutionError {
    /// The prefix of the prefixed name has not been declared.
    #[error("The prefix {0}: has not been declared")]
    UnknownPrefix(String),
    /// The expansion or resolution did not produce a valid absolute IRI.
    #[error("Invalid IRI {iri}: {error}")]
    InvalidIri {
        iri: String,
        #[source]
        error: IriParseError,
    },
}

impl fmt::Display for Namespaces {
    /// Writes the namespaces as Turtle `@prefix` directives.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (prefix, ns) in self.iter() {
            writeln!(f, "@prefix {prefix}: <{ns}> .")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn redeclaration_replaces_in_place() {
        let mut namespaces = Namespaces::new();
        namespaces.add("a", "http://example.com/a#");
        namespaces.add("b", "http://example.com/b#");
        namespaces.add("a", "http://example.com/a2#");
        let order: Vec<_> = namespaces.iter().collect();
        assert_eq!(
            order,
            [
                ("a", "http://example.com/a2#"),
                ("b", "http://example.com/b#")
            ]
        );
    }

    #[test]
    fn expand_unknown_prefix() {
        let namespaces = Namespaces::new();
        assert!(matches!(
            namespaces.expand("ex", "foo", None),
            Err(ResolutionError::UnknownPrefix(_))
        ));
    }

    #[test]
    fn reduce_longest_match_wins() {
        let mut namespaces = Namespaces::new();
        namespaces.add("ex", "http://example.com/");
        namespaces.add("ns", "http://example.com/ns#");
        assert_eq!(
            namespaces.reduce("http://example.com/ns#foo"),
            Some(("ns", "foo"))
        );
    }

    #[test]
    fn reduce_rejects_invalid_local_part() {
        let mut namespaces = Namespaces::new();
        namespaces.add("ex", "http://example.com/");
        assert_eq!(namespaces.reduce("http://example.com/a/b"), None);
        assert_eq!(namespaces.reduce("http://example.com/trailing."), None);
        assert_eq!(namespaces.reduce("http://example.com/ok"), Some(("ex", "ok")));
    }

    #[test]
    fn expand_then_reduce_round_trip() {
        let mut namespaces = Namespaces::new();
        namespaces.add("ex", "http://example.com/ns#");
        let iri = namespaces.expand("ex", "foo", None).unwrap();
        let (prefix, local) = namespaces.reduce(iri.as_str()).unwrap();
        assert_eq!(
            namespaces.expand(prefix, local, None).unwrap().as_str(),
            iri.as_str()
        );
    }

    #[test]
    fn resolve_empty_reference_drops_fragment() {
        assert_eq!(
            Namespaces::resolve("", Some("http://example.org#fragment"))
                .unwrap()
                .as_str(),
            "http://example.org"
        );
    }
}
