//! IRI constants of the vocabularies used across the parsers and serializers.

pub mod rdf {
    //! [RDF](https://www.w3.org/TR/rdf11-concepts/) vocabulary.

    /// The datatype of RDF [language-tagged strings](https://www.w3.org/TR/rdf11-concepts/#dfn-language-tagged-string).
    pub const LANG_STRING: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#langString";
    /// The first item in an RDF list.
    pub const FIRST: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#first";
    /// The rest of an RDF list after the first item.
    pub const REST: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#rest";
    /// The empty RDF list.
    pub const NIL: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#nil";
    /// The subject of a reified statement.
    pub const SUBJECT: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#subject";
    /// The predicate of a reified statement.
    pub const PREDICATE: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#predicate";
    /// The object of a reified statement.
    pub const OBJECT: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#object";
    /// The class of reified statements.
    pub const STATEMENT: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#Statement";
    /// The predicate linking a resource to its class.
    pub const TYPE: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#type";
    /// The datatype of XML literals.
    pub const XML_LITERAL: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#XMLLiteral";
}

pub mod xsd {
    //! The subset of [XML Schema datatypes](https://www.w3.org/TR/xmlschema11-2/) the
    //! Turtle family maps shorthand tokens to.

    pub const BOOLEAN: &str = "http://www.w3.org/2001/XMLSchema#boolean";
    pub const DATE: &str = "http://www.w3.org/2001/XMLSchema#date";
    pub const DECIMAL: &str = "http://www.w3.org/2001/XMLSchema#decimal";
    pub const DOUBLE: &str = "http://www.w3.org/2001/XMLSchema#double";
    pub const INTEGER: &str = "http://www.w3.org/2001/XMLSchema#integer";
    pub const STRING: &str = "http://www.w3.org/2001/XMLSchema#string";
}

pub mod log {
    //! The [N3 logic](https://www.w3.org/2000/10/swap/log) vocabulary subset used by the N3 parser.

    pub const IMPLIES: &str = "http://www.w3.org/2000/10/swap/log#implies";
}

pub mod owl {
    //! The [OWL](https://www.w3.org/TR/owl2-overview/) vocabulary subset used by the N3 parser.

    pub const SAME_AS: &str = "http://www.w3.org/2002/07/owl#sameAs";
}
