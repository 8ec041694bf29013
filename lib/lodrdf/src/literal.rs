use crate::named_node::NamedNode;
use crate::vocab::{rdf, xsd};
use oxilangtag::{LanguageTag, LanguageTagParseError};
use std::fmt;
use std::fmt::Write;

/// An owned RDF [literal](https://www.w3.org/TR/rdf11-concepts/#dfn-literal).
///
/// The default string formatter is returning an N-Triples, Turtle, and SPARQL compatible representation:
/// ```
/// use lodrdf::vocab::xsd;
/// use lodrdf::{Literal, NamedNode};
///
/// assert_eq!(
///     Literal::new_simple_literal("line1\nline2").to_string(),
///     "\"line1\\nline2\""
/// );
///
/// assert_eq!(
///     Literal::new_typed_literal("2024-02-29", NamedNode::new_unchecked(xsd::DATE)).to_string(),
///     r#""2024-02-29"^^<http://www.w3.org/2001/XMLSchema#date>"#
/// );
///
/// assert_eq!(
///     Literal::new_language_tagged_literal("bonjour", "fr")?.to_string(),
///     r#""bonjour"@fr"#
/// );
/// # Result::<_, oxilangtag::LanguageTagParseError>::Ok(())
/// ```
#[derive(Eq, PartialEq, Debug, Clone, Hash)]
pub struct Literal {
    value: String,
    annotation: Annotation,
}

/// What qualifies the lexical form. Simple literals carry nothing, the
/// `xsd:string` datatype being implicit.
#[derive(Eq, PartialEq, Debug, Clone, Hash)]
enum Annotation {
    None,
    Language(String),
    Datatype(NamedNode),
}

impl Literal {
    /// Builds an RDF [simple literal](https://www.w3.org/TR/rdf11-concepts/#dfn-simple-literal).
    #[inline]
    pub fn new_simple_literal(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            annotation: Annotation::None,
        }
    }

    /// Builds an RDF [literal](https://www.w3.org/TR/rdf11-concepts/#dfn-literal) with a [datatype](https://www.w3.org/TR/rdf11-concepts/#dfn-datatype-iri).
    ///
    /// `xsd:string` and `rdf:langString` datatypes are normalized: an `xsd:string` typed
    /// literal is a simple literal.
    #[inline]
    pub fn new_typed_literal(value: impl Into<String>, datatype: impl Into<NamedNode>) -> Self {
        let datatype = datatype.into();
        Self {
            value: value.into(),
            annotation: if datatype == xsd::STRING {
                Annotation::None
            } else {
                Annotation::Datatype(datatype)
            },
        }
    }

    /// Builds an RDF [language-tagged string](https://www.w3.org/TR/rdf11-concepts/#dfn-language-tagged-string).
    ///
    /// The language tag is checked to be [well-formed BCP 47](https://tools.ietf.org/html/bcp47)
    /// and is converted to lowercase.
    #[inline]
    pub fn new_language_tagged_literal(
        value: impl Into<String>,
        language: impl Into<String>,
    ) -> Result<Self, LanguageTagParseError> {
        let mut language = language.into();
        language.make_ascii_lowercase();
        Ok(Self::new_language_tagged_literal_unchecked(
            value,
            LanguageTag::parse(language)?.into_inner(),
        ))
    }

    /// Builds an RDF [language-tagged string](https://www.w3.org/TR/rdf11-concepts/#dfn-language-tagged-string).
    ///
    /// It is the caller's responsibility to check that `language` is a lowercase
    /// [BCP 47](https://tools.ietf.org/html/bcp47) language tag.
    ///
    /// [`Literal::new_language_tagged_literal()`] is a safe version of this constructor and should
    /// be used for untrusted data.
    #[inline]
    pub fn new_language_tagged_literal_unchecked(
        value: impl Into<String>,
        language: impl Into<String>,
    ) -> Self {
        Self {
            value: value.into(),
            annotation: Annotation::Language(language.into()),
        }
    }

    /// The literal [lexical form](https://www.w3.org/TR/rdf11-concepts/#dfn-lexical-form).
    #[inline]
    pub fn value(&self) -> &str {
        &self.value
    }

    /// The literal [language tag](https://www.w3.org/TR/rdf11-concepts/#dfn-language-tag) if it is a
    /// [language-tagged string](https://www.w3.org/TR/rdf11-concepts/#dfn-language-tagged-string).
    #[inline]
    pub fn language(&self) -> Option<&str> {
        match &self.annotation {
            Annotation::Language(language) => Some(language),
            Annotation::None | Annotation::Datatype(_) => None,
        }
    }

    /// The literal [datatype](https://www.w3.org/TR/rdf11-concepts/#dfn-datatype-iri).
    ///
    /// The datatype is always set: it is `rdf:langString` for
    /// [language-tagged strings](https://www.w3.org/TR/rdf11-concepts/#dfn-language-tagged-string)
    /// and `xsd:string` for simple literals.
    #[inline]
    pub fn datatype(&self) -> NamedNode {
        match &self.annotation {
            Annotation::None => NamedNode::new_unchecked(xsd::STRING),
            Annotation::Language(_) => NamedNode::new_unchecked(rdf::LANG_STRING),
            Annotation::Datatype(datatype) => datatype.clone(),
        }
    }

    /// Checks if this literal could be [simple](https://www.w3.org/TR/rdf11-concepts/#dfn-simple-literal).
    #[inline]
    pub fn is_plain(&self) -> bool {
        !matches!(self.annotation, Annotation::Datatype(_))
    }

    /// Extracts the lexical form, dropping the datatype and the language tag.
    #[inline]
    pub fn into_value(self) -> String {
        self.value
    }

    fn native(value: impl ToString, datatype: &str) -> Self {
        Self {
            value: value.to_string(),
            annotation: Annotation::Datatype(NamedNode::new_unchecked(datatype)),
        }
    }
}

impl fmt::Display for Literal {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        print_quoted_str(&self.value, f)?;
        match &self.annotation {
            Annotation::None => Ok(()),
            Annotation::Language(language) => write!(f, "@{language}"),
            Annotation::Datatype(datatype) => write!(f, "^^{datatype}"),
        }
    }
}

impl From<&str> for Literal {
    #[inline]
    fn from(value: &str) -> Self {
        Self::new_simple_literal(value)
    }
}

impl From<String> for Literal {
    #[inline]
    fn from(value: String) -> Self {
        Self::new_simple_literal(value)
    }
}

impl From<bool> for Literal {
    #[inline]
    fn from(value: bool) -> Self {
        Self::native(value, xsd::BOOLEAN)
    }
}

impl From<i64> for Literal {
    #[inline]
    fn from(value: i64) -> Self {
        Self::native(value, xsd::INTEGER)
    }
}

impl From<i32> for Literal {
    #[inline]
    fn from(value: i32) -> Self {
        i64::from(value).into()
    }
}

impl From<f64> for Literal {
    #[inline]
    fn from(value: f64) -> Self {
        Self::native(value, xsd::DOUBLE)
    }
}

/// Writes the N-Triples escaped form of a string, quotes included.
pub(crate) fn print_quoted_str(string: &str, f: &mut impl Write) -> fmt::Result {
    f.write_char('"')?;
    for c in string.chars() {
        match c {
            '"' => f.write_str("\\\"")?,
            '\\' => f.write_str("\\\\")?,
            '\n' => f.write_str("\\n")?,
            '\r' => f.write_str("\\r")?,
            '\t' => f.write_str("\\t")?,
            '\u{08}' => f.write_str("\\b")?,
            '\u{0C}' => f.write_str("\\f")?,
            '\0'..='\u{1F}' | '\u{7F}' => write!(f, "\\u{:04X}", u32::from(c))?,
            _ => f.write_char(c)?,
        }
    }
    f.write_char('"')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn simple_literal_display() {
        assert_eq!(
            Literal::new_simple_literal("a\"b\\c").to_string(),
            "\"a\\\"b\\\\c\""
        );
    }

    #[test]
    fn control_characters_are_escaped() {
        assert_eq!(
            Literal::new_simple_literal("a\u{1B}b").to_string(),
            "\"a\\u001Bb\""
        );
    }

    #[test]
    fn xsd_string_is_normalized_to_simple() {
        let l = Literal::new_typed_literal("foo", NamedNode::new_unchecked(xsd::STRING));
        assert_eq!(l, Literal::new_simple_literal("foo"));
        assert_eq!(l.datatype(), NamedNode::new_unchecked(xsd::STRING));
    }

    #[test]
    fn language_tag_validation() {
        assert!(Literal::new_language_tagged_literal("foo", "en-GB").is_ok());
        assert!(Literal::new_language_tagged_literal("foo", "en-123").is_ok());
        assert!(Literal::new_language_tagged_literal("foo", "en-x-abc123").is_ok());
        assert!(Literal::new_language_tagged_literal("foo", "en gb").is_err());
    }

    #[test]
    fn language_tag_is_lowercased() {
        assert_eq!(
            Literal::new_language_tagged_literal("foo", "en-GB")
                .unwrap()
                .language(),
            Some("en-gb")
        );
    }

    #[test]
    fn datatype_of_language_tagged() {
        assert_eq!(
            Literal::new_language_tagged_literal_unchecked("foo", "en").datatype(),
            NamedNode::new_unchecked(rdf::LANG_STRING)
        );
    }
}
