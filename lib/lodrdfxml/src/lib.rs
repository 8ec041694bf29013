//! Streaming parser and serializer for the
//! [RDF/XML](https://www.w3.org/TR/rdf-syntax-grammar/) format.
//!
//! RDF constructs are recognized by their expanded namespace name, so the
//! `rdf:` prefix may be spelled, rebound or replaced by a default namespace
//! declaration without changing the parsed triples.
//!
//! ```
//! use lodrdf::vocab::rdf;
//! use lodrdf::NamedNode;
//! use lodrdfxml::RdfXmlParser;
//!
//! let file = r#"<?xml version="1.0"?>
//! <rdf:RDF xmlns:rdf="http://www.w3.org/1999/02/22-rdf-syntax-ns#" xmlns:schema="http://schema.org/">
//!  <rdf:Description rdf:about="http://example.com/foo">
//!    <rdf:type rdf:resource="http://schema.org/Person" />
//!    <schema:name>Foo</schema:name>
//!  </rdf:Description>
//! </rdf:RDF>"#;
//!
//! let rdf_type = NamedNode::new_unchecked(rdf::TYPE);
//! let schema_person = NamedNode::new("http://schema.org/Person")?;
//! let mut count = 0;
//! for triple in RdfXmlParser::new().for_slice(file) {
//!     let triple = triple?;
//!     if triple.predicate == rdf_type && triple.object == schema_person.clone().into() {
//!         count += 1;
//!     }
//! }
//! assert_eq!(count, 1);
//! # Result::<_, Box<dyn std::error::Error>>::Ok(())
//! ```

mod error;
mod parser;
mod serializer;
mod utils;

pub use crate::error::{RdfXmlParseError, RdfXmlSyntaxError};
pub use crate::parser::{RdfXmlParser, RdfXmlPrefixesIter, ReaderRdfXmlParser, SliceRdfXmlParser};
pub use crate::serializer::{RdfXmlSerializer, WriterRdfXmlSerializer};
