use crate::csv::{TsvQueryResultsReader, TsvSolutionsReader};
use crate::error::{QueryResultsParseError, QueryResultsSyntaxError};
use crate::format::QueryResultsFormat;
use crate::json::{JsonQueryResultsReader, JsonSolutionsReader};
use crate::solution::QuerySolution;
use crate::xml::{XmlQueryResultsReader, XmlSolutionsReader};
use lodrdf::{Term, Variable};
use std::io::Read;
use std::sync::Arc;

/// Parsers for [SPARQL query](https://www.w3.org/TR/sparql11-query/) results serialization formats.
///
/// It currently supports the following formats:
/// * [SPARQL Query Results XML Format](https://www.w3.org/TR/rdf-sparql-XMLres/) ([`QueryResultsFormat::Xml`]).
/// * [SPARQL Query Results JSON Format](https://www.w3.org/TR/sparql11-results-json/) ([`QueryResultsFormat::Json`]).
/// * [SPARQL Query Results TSV Format](https://www.w3.org/TR/sparql11-results-csv-tsv/) ([`QueryResultsFormat::Tsv`]).
///
/// The CSV format is write-only: it does not keep enough information about the
/// terms to be parsed back.
///
/// ```
/// use lodrdf::{Literal, Variable};
/// use lodresults::{QueryResultsFormat, QueryResultsParser, QueryResultsReader};
///
/// let json_parser = QueryResultsParser::from_format(QueryResultsFormat::Json);
/// // boolean
/// if let QueryResultsReader::Boolean(value) = json_parser.for_reader(br#"{"boolean":true}"#.as_slice())? {
///     assert!(value);
/// }
/// // solutions
/// if let QueryResultsReader::Solutions(solutions) = json_parser.for_reader(br#"{"head":{"vars":["name","age"]},"results":{"bindings":[{"name":{"type":"literal","value":"Alice"}}]}}"#.as_slice())? {
///     assert_eq!(solutions.variables(), &[Variable::new_unchecked("name"), Variable::new_unchecked("age")]);
///     for solution in solutions {
///         assert_eq!(solution?.get("name"), Some(&Literal::from("Alice").into()));
///     }
/// }
/// # Result::<(), lodresults::QueryResultsParseError>::Ok(())
/// ```
pub struct QueryResultsParser {
    format: QueryResultsFormat,
}

impl QueryResultsParser {
    /// Builds a parser for the given format.
    #[inline]
    pub fn from_format(format: QueryResultsFormat) -> Self {
        Self { format }
    }

    /// Reads a result file.
    ///
    /// Reads are buffered. The XML and JSON parsers read the document head
    /// eagerly, so this call already fails on a malformed preamble.
    ///
    /// ```
    /// use lodrdf::{Literal, Variable};
    /// use lodresults::{QueryResultsFormat, QueryResultsParser, QueryResultsReader};
    ///
    /// let xml_parser = QueryResultsParser::from_format(QueryResultsFormat::Xml);
    ///
    /// if let QueryResultsReader::Solutions(solutions) = xml_parser.for_reader(br#"<sparql xmlns="http://www.w3.org/2005/sparql-results#"><head><variable name="name"/></head><results><result><binding name="name"><literal>Alice</literal></binding></result></results></sparql>"#.as_slice())? {
    ///     assert_eq!(solutions.variables(), &[Variable::new_unchecked("name")]);
    ///     for solution in solutions {
    ///         assert_eq!(solution?.get("name"), Some(&Literal::from("Alice").into()));
    ///     }
    /// }
    /// # Result::<(), lodresults::QueryResultsParseError>::Ok(())
    /// ```
    pub fn for_reader<R: Read>(
        &self,
        reader: R,
    ) -> Result<QueryResultsReader<R>, QueryResultsParseError> {
        Ok(match self.format {
            QueryResultsFormat::Xml => match XmlQueryResultsReader::read(reader)? {
                XmlQueryResultsReader::Boolean(value) => QueryResultsReader::Boolean(value),
                XmlQueryResultsReader::Solutions {
                    variables,
                    solutions,
                } => QueryResultsReader::solutions(variables, SolutionsReaderKind::Xml(solutions)),
            },
            QueryResultsFormat::Json => match JsonQueryResultsReader::read(reader)? {
                JsonQueryResultsReader::Boolean(value) => QueryResultsReader::Boolean(value),
                JsonQueryResultsReader::Solutions {
                    variables,
                    solutions,
                } => QueryResultsReader::solutions(variables, SolutionsReaderKind::Json(solutions)),
            },
            QueryResultsFormat::Tsv => match TsvQueryResultsReader::read(reader)? {
                TsvQueryResultsReader::Boolean(value) => QueryResultsReader::Boolean(value),
                TsvQueryResultsReader::Solutions {
                    variables,
                    solutions,
                } => QueryResultsReader::solutions(variables, SolutionsReaderKind::Tsv(solutions)),
            },
            QueryResultsFormat::Csv => {
                return Err(QueryResultsSyntaxError::msg(
                    "CSV SPARQL results syntax is lossy and can't be parsed to a proper RDF representation",
                )
                .into())
            }
        })
    }
}

impl From<QueryResultsFormat> for QueryResultsParser {
    fn from(format: QueryResultsFormat) -> Self {
        Self::from_format(format)
    }
}

/// The reader for a given read of a results file.
///
/// It is either a read boolean ([`bool`]) or a streaming reader of a set of solutions ([`SolutionsReader`]).
///
/// ```
/// use lodresults::{QueryResultsFormat, QueryResultsParser, QueryResultsReader};
///
/// let tsv_parser = QueryResultsParser::from_format(QueryResultsFormat::Tsv);
/// if let QueryResultsReader::Boolean(value) = tsv_parser.for_reader(b"true".as_slice())? {
///     assert!(value);
/// }
/// # Result::<(), lodresults::QueryResultsParseError>::Ok(())
/// ```
pub enum QueryResultsReader<R: Read> {
    Solutions(SolutionsReader<R>),
    Boolean(bool),
}

impl<R: Read> QueryResultsReader<R> {
    fn solutions(variables: Vec<Variable>, solutions: SolutionsReaderKind<R>) -> Self {
        Self::Solutions(SolutionsReader {
            variables: variables.into(),
            solutions,
        })
    }
}

/// A streaming reader of a set of [`QuerySolution`] solutions.
///
/// It implements the [`Iterator`] API to iterate over the solutions.
///
/// ```
/// use lodrdf::{Literal, Variable};
/// use lodresults::{QueryResultsFormat, QueryResultsParser, QueryResultsReader};
///
/// let tsv_parser = QueryResultsParser::from_format(QueryResultsFormat::Tsv);
/// if let QueryResultsReader::Solutions(solutions) = tsv_parser.for_reader(b"?name\t?age\n\"Alice\"\t".as_slice())? {
///     assert_eq!(solutions.variables(), &[Variable::new_unchecked("name"), Variable::new_unchecked("age")]);
///     for solution in solutions {
///         assert_eq!(solution?.get("name"), Some(&Literal::from("Alice").into()));
///     }
/// }
/// # Result::<(), lodresults::QueryResultsParseError>::Ok(())
/// ```
pub struct SolutionsReader<R: Read> {
    variables: Arc<[Variable]>,
    solutions: SolutionsReaderKind<R>,
}

enum SolutionsReaderKind<R: Read> {
    Xml(XmlSolutionsReader<R>),
    Json(JsonSolutionsReader<R>),
    Tsv(TsvSolutionsReader<R>),
}

impl<R: Read> SolutionsReaderKind<R> {
    fn read_next(&mut self) -> Result<Option<Vec<Option<Term>>>, QueryResultsParseError> {
        match self {
            Self::Xml(reader) => reader.read_next(),
            Self::Json(reader) => reader.read_next(),
            Self::Tsv(reader) => reader.read_next(),
        }
    }
}

impl<R: Read> SolutionsReader<R> {
    /// Ordered list of the declared variables at the beginning of the results.
    #[inline]
    pub fn variables(&self) -> &[Variable] {
        &self.variables
    }
}

impl<R: Read> Iterator for SolutionsReader<R> {
    type Item = Result<QuerySolution, QueryResultsParseError>;

    fn next(&mut self) -> Option<Self::Item> {
        let values = match self.solutions.read_next() {
            Ok(values) => values?,
            Err(e) => return Some(Err(e)),
        };
        Some(Ok((Arc::clone(&self.variables), values).into()))
    }
}
