use crate::csv::{
    write_boolean_csv_result, write_boolean_tsv_result, CsvSolutionsWriter, TsvSolutionsWriter,
};
use crate::format::QueryResultsFormat;
use crate::json::{write_boolean_json_result, JsonSolutionsWriter};
use crate::xml::{write_boolean_xml_result, XmlSolutionsWriter};
use lodrdf::{Term, Variable};
use std::io::{self, Write};

/// A serializer for [SPARQL query](https://www.w3.org/TR/sparql11-query/) results serialization formats.
///
/// It currently supports the following formats:
/// * [SPARQL Query Results XML Format](https://www.w3.org/TR/rdf-sparql-XMLres/) ([`QueryResultsFormat::Xml`])
/// * [SPARQL Query Results JSON Format](https://www.w3.org/TR/sparql11-results-json/) ([`QueryResultsFormat::Json`])
/// * [SPARQL Query Results CSV Format](https://www.w3.org/TR/sparql11-results-csv-tsv/) ([`QueryResultsFormat::Csv`])
/// * [SPARQL Query Results TSV Format](https://www.w3.org/TR/sparql11-results-csv-tsv/) ([`QueryResultsFormat::Tsv`])
///
/// ```
/// use lodrdf::{Literal, Term, Variable};
/// use lodresults::{QueryResultsFormat, QueryResultsSerializer};
/// use std::iter::once;
///
/// let json_serializer = QueryResultsSerializer::from_format(QueryResultsFormat::Json);
///
/// // boolean
/// let mut buffer = Vec::new();
/// json_serializer.serialize_boolean_to_writer(&mut buffer, true)?;
/// assert_eq!(buffer, br#"{"head":{},"boolean":true}"#);
///
/// // solutions
/// let mut buffer = Vec::new();
/// let mut serializer = json_serializer.serialize_solutions_to_writer(&mut buffer, vec![Variable::new_unchecked("name"), Variable::new_unchecked("age")])?;
/// let name = Variable::new_unchecked("name");
/// let alice = Term::from(Literal::from("Alice"));
/// serializer.serialize(once((&name, &alice)))?;
/// serializer.finish()?;
/// assert_eq!(buffer, br#"{"head":{"vars":["name","age"]},"results":{"bindings":[{"name":{"type":"literal","value":"Alice"}}]}}"#);
/// # std::io::Result::Ok(())
/// ```
pub struct QueryResultsSerializer {
    format: QueryResultsFormat,
}

impl QueryResultsSerializer {
    /// Builds a serializer for the given format.
    #[inline]
    pub fn from_format(format: QueryResultsFormat) -> Self {
        Self { format }
    }

    /// Writes a boolean query result (from an `ASK` query) into the given [`Write`] implementation.
    ///
    /// ```
    /// use lodresults::{QueryResultsFormat, QueryResultsSerializer};
    ///
    /// let xml_serializer = QueryResultsSerializer::from_format(QueryResultsFormat::Xml);
    /// let mut buffer = Vec::new();
    /// xml_serializer.serialize_boolean_to_writer(&mut buffer, true)?;
    /// assert_eq!(buffer, br#"<?xml version="1.0"?><sparql xmlns="http://www.w3.org/2005/sparql-results#"><head></head><boolean>true</boolean></sparql>"#);
    /// # std::io::Result::Ok(())
    /// ```
    pub fn serialize_boolean_to_writer<W: Write>(&self, writer: W, value: bool) -> io::Result<W> {
        match self.format {
            QueryResultsFormat::Xml => write_boolean_xml_result(writer, value),
            QueryResultsFormat::Json => write_boolean_json_result(writer, value),
            QueryResultsFormat::Csv => write_boolean_csv_result(writer, value),
            QueryResultsFormat::Tsv => write_boolean_tsv_result(writer, value),
        }
    }

    /// Returns a [`WriterSolutionsSerializer`] allowing writing query solutions into the given [`Write`] implementation.
    ///
    /// This writes the file header eagerly. Call
    /// [`finish`](WriterSolutionsSerializer::finish()) at the end to write the
    /// file trailer, the output is truncated otherwise.
    ///
    /// ```
    /// use lodrdf::{Literal, Term, Variable};
    /// use lodresults::{QueryResultsFormat, QueryResultsSerializer};
    /// use std::iter::once;
    ///
    /// let xml_serializer = QueryResultsSerializer::from_format(QueryResultsFormat::Xml);
    /// let mut buffer = Vec::new();
    /// let mut serializer = xml_serializer.serialize_solutions_to_writer(&mut buffer, vec![Variable::new_unchecked("name"), Variable::new_unchecked("age")])?;
    /// let name = Variable::new_unchecked("name");
    /// let alice = Term::from(Literal::from("Alice"));
    /// serializer.serialize(once((&name, &alice)))?;
    /// serializer.finish()?;
    /// assert_eq!(buffer, br#"<?xml version="1.0"?><sparql xmlns="http://www.w3.org/2005/sparql-results#"><head><variable name="name"/><variable name="age"/></head><results><result><binding name="name"><literal>Alice</literal></binding></result></results></sparql>"#);
    /// # std::io::Result::Ok(())
    /// ```
    pub fn serialize_solutions_to_writer<W: Write>(
        &self,
        writer: W,
        variables: Vec<Variable>,
    ) -> io::Result<WriterSolutionsSerializer<W>> {
        let inner = match self.format {
            QueryResultsFormat::Xml => {
                FormatSolutionsWriter::Xml(XmlSolutionsWriter::start(writer, &variables)?)
            }
            QueryResultsFormat::Json => {
                FormatSolutionsWriter::Json(JsonSolutionsWriter::start(writer, &variables)?)
            }
            QueryResultsFormat::Csv => {
                FormatSolutionsWriter::Csv(CsvSolutionsWriter::start(writer, variables)?)
            }
            QueryResultsFormat::Tsv => {
                FormatSolutionsWriter::Tsv(TsvSolutionsWriter::start(writer, variables)?)
            }
        };
        Ok(WriterSolutionsSerializer { inner })
    }
}

impl From<QueryResultsFormat> for QueryResultsSerializer {
    fn from(format: QueryResultsFormat) -> Self {
        Self::from_format(format)
    }
}

/// Serializes a set of query solutions.
/// Could be built using a [`QueryResultsSerializer`].
///
/// Call [`finish`](WriterSolutionsSerializer::finish()) at the end to write
/// the file trailer, the output is truncated otherwise.
///
/// ```
/// use lodrdf::{Literal, Term, Variable};
/// use lodresults::{QueryResultsFormat, QueryResultsSerializer};
/// use std::iter::once;
///
/// let tsv_serializer = QueryResultsSerializer::from_format(QueryResultsFormat::Tsv);
/// let mut buffer = Vec::new();
/// let mut serializer = tsv_serializer.serialize_solutions_to_writer(&mut buffer, vec![Variable::new_unchecked("name"), Variable::new_unchecked("age")])?;
/// let name = Variable::new_unchecked("name");
/// let alice = Term::from(Literal::from("Alice"));
/// serializer.serialize(once((&name, &alice)))?;
/// serializer.finish()?;
/// assert_eq!(buffer, b"?name\t?age\n\"Alice\"\t\n");
/// # std::io::Result::Ok(())
/// ```
#[must_use]
pub struct WriterSolutionsSerializer<W: Write> {
    inner: FormatSolutionsWriter<W>,
}

enum FormatSolutionsWriter<W: Write> {
    Xml(XmlSolutionsWriter<W>),
    Json(JsonSolutionsWriter<W>),
    Csv(CsvSolutionsWriter<W>),
    Tsv(TsvSolutionsWriter<W>),
}

impl<W: Write> WriterSolutionsSerializer<W> {
    /// Writes a solution.
    ///
    /// A solution is anything that iterates over variable and term pairs, a
    /// [`QuerySolution`](crate::QuerySolution) reference included.
    ///
    /// ```
    /// use lodrdf::{Literal, Term, Variable};
    /// use lodresults::{QueryResultsFormat, QueryResultsSerializer, QuerySolution};
    /// use std::iter::once;
    ///
    /// let json_serializer = QueryResultsSerializer::from_format(QueryResultsFormat::Json);
    /// let mut buffer = Vec::new();
    /// let mut serializer = json_serializer.serialize_solutions_to_writer(&mut buffer, vec![Variable::new_unchecked("name"), Variable::new_unchecked("age")])?;
    /// let name = Variable::new_unchecked("name");
    /// let alice = Term::from(Literal::from("Alice"));
    /// serializer.serialize(once((&name, &alice)))?;
    /// serializer.serialize(&QuerySolution::from((vec![Variable::new_unchecked("age")], vec![Some(Literal::from("33").into())])))?;
    /// serializer.finish()?;
    /// assert_eq!(buffer, br#"{"head":{"vars":["name","age"]},"results":{"bindings":[{"name":{"type":"literal","value":"Alice"}},{"age":{"type":"literal","value":"33"}}]}}"#);
    /// # std::io::Result::Ok(())
    /// ```
    pub fn serialize<'a>(
        &mut self,
        solution: impl IntoIterator<Item = (&'a Variable, &'a Term)>,
    ) -> io::Result<()> {
        match &mut self.inner {
            FormatSolutionsWriter::Xml(w) => w.write(solution),
            FormatSolutionsWriter::Json(w) => w.write(solution),
            FormatSolutionsWriter::Csv(w) => w.write(solution),
            FormatSolutionsWriter::Tsv(w) => w.write(solution),
        }
    }

    /// Writes the last bytes of the file.
    pub fn finish(self) -> io::Result<W> {
        match self.inner {
            FormatSolutionsWriter::Xml(w) => w.finish(),
            FormatSolutionsWriter::Json(w) => w.finish(),
            FormatSolutionsWriter::Csv(w) => Ok(w.finish()),
            FormatSolutionsWriter::Tsv(w) => Ok(w.finish()),
        }
    }
}
