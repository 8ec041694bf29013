use std::fmt;

/// A SPARQL or N3 [variable](https://www.w3.org/TR/sparql11-query/#sparqlQuerySyntax).
///
/// [`fmt::Display`] writes the SPARQL serialization:
/// ```
/// use lodrdf::Variable;
///
/// assert_eq!(Variable::new("name")?.to_string(), "?name");
/// # Result::<_, lodrdf::VariableNameParseError>::Ok(())
/// ```
#[derive(Eq, PartialEq, Ord, PartialOrd, Debug, Clone, Hash)]
pub struct Variable {
    name: String,
}

impl Variable {
    /// Builds a variable from its name, validating it against the SPARQL `VARNAME` production.
    pub fn new(name: impl Into<String>) -> Result<Self, VariableNameParseError> {
        let name = name.into();
        validate_variable_identifier(&name)?;
        Ok(Self { name })
    }

    /// Builds a variable from its name without validating it.
    ///
    /// The caller must guarantee that `name` matches the SPARQL `VARNAME` production.
    /// Use [`Variable::new()`] on untrusted data.
    #[inline]
    pub fn new_unchecked(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn into_string(self) -> String {
        self.name
    }
}

impl fmt::Display for Variable {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "?{}", self.name)
    }
}

// VARNAME first character: PN_CHARS_U without ':', or a digit
fn is_name_start(c: char) -> bool {
    matches!(c,
        '0'..='9' | '_' | 'A'..='Z' | 'a'..='z'
        | '\u{00C0}'..='\u{00D6}' | '\u{00D8}'..='\u{00F6}' | '\u{00F8}'..='\u{02FF}'
        | '\u{0370}'..='\u{037D}' | '\u{037F}'..='\u{1FFF}' | '\u{200C}'..='\u{200D}'
        | '\u{2070}'..='\u{218F}' | '\u{2C00}'..='\u{2FEF}' | '\u{3001}'..='\u{D7FF}'
        | '\u{F900}'..='\u{FDCF}' | '\u{FDF0}'..='\u{FFFD}' | '\u{10000}'..='\u{EFFFF}')
}

fn is_name_char(c: char) -> bool {
    is_name_start(c)
        || matches!(c, '\u{00B7}' | '\u{0300}'..='\u{036F}' | '\u{203F}'..='\u{2040}')
}

fn validate_variable_identifier(id: &str) -> Result<(), VariableNameParseError> {
    let mut chars = id.chars();
    if chars.next().is_some_and(is_name_start) && chars.all(is_name_char) {
        Ok(())
    } else {
        Err(VariableNameParseError)
    }
}

/// An error raised during [`Variable`] name validation.
#[derive(Debug, thiserror::Error)]
#[error("The variable name is invalid")]
pub struct VariableNameParseError;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation() {
        assert!(Variable::new("name").is_ok());
        assert!(Variable::new("n4me_1").is_ok());
        assert!(Variable::new("0age").is_ok());
        assert!(Variable::new("").is_err());
        assert!(Variable::new("two words").is_err());
        assert!(Variable::new("a:b").is_err());
    }
}
