//! Implementation of [SPARQL 1.1 Query Results CSV and TSV Formats](https://www.w3.org/TR/sparql11-results-csv-tsv/)

use crate::error::{QueryResultsParseError, QueryResultsSyntaxError, TextPosition};
use lodrdf::vocab::xsd;
use lodrdf::{Term, Variable};
use memchr::memchr;
use std::io::{self, Read, Write};
use std::str::{self, FromStr};

const MAX_BUFFER_SIZE: usize = 4096 * 4096;

pub fn write_boolean_csv_result<W: Write>(mut writer: W, value: bool) -> io::Result<W> {
    writer.write_all(if value { b"true" } else { b"false" })?;
    Ok(writer)
}

pub fn write_boolean_tsv_result<W: Write>(mut writer: W, value: bool) -> io::Result<W> {
    writer.write_all(if value { b"true" } else { b"false" })?;
    Ok(writer)
}

/// The CSV and TSV formats only differ by the cell separator, the line ending,
/// the variable header spelling and the way a term is written.
#[derive(Clone, Copy, PartialEq, Eq)]
enum TableSyntax {
    Csv,
    Tsv,
}

impl TableSyntax {
    fn separator(self) -> char {
        match self {
            Self::Csv => ',',
            Self::Tsv => '\t',
        }
    }

    fn line_ending(self) -> &'static str {
        match self {
            Self::Csv => "\r\n",
            Self::Tsv => "\n",
        }
    }
}

struct TabularSolutionsWriter<W: Write> {
    syntax: TableSyntax,
    variables: Vec<Variable>,
    writer: W,
    line: String,
}

impl<W: Write> TabularSolutionsWriter<W> {
    fn start(syntax: TableSyntax, mut writer: W, variables: Vec<Variable>) -> io::Result<Self> {
        let mut line = String::new();
        for (i, variable) in variables.iter().enumerate() {
            if i > 0 {
                line.push(syntax.separator());
            }
            if syntax == TableSyntax::Tsv {
                line.push('?');
            }
            line.push_str(variable.as_str());
        }
        line.push_str(syntax.line_ending());
        writer.write_all(line.as_bytes())?;
        line.clear();
        Ok(Self {
            syntax,
            variables,
            writer,
            line,
        })
    }

    fn write<'a>(
        &mut self,
        solution: impl IntoIterator<Item = (&'a Variable, &'a Term)>,
    ) -> io::Result<()> {
        let mut values = vec![None; self.variables.len()];
        for (variable, value) in solution {
            if let Some(position) = self.variables.iter().position(|v| v == variable) {
                values[position] = Some(value);
            }
        }
        for (i, value) in values.into_iter().enumerate() {
            if i > 0 {
                self.line.push(self.syntax.separator());
            }
            if let Some(value) = value {
                match self.syntax {
                    TableSyntax::Csv => write_csv_term(&mut self.line, value),
                    TableSyntax::Tsv => write_tsv_term(&mut self.line, value),
                }
            }
        }
        self.line.push_str(self.syntax.line_ending());
        self.writer.write_all(self.line.as_bytes())?;
        self.line.clear();
        Ok(())
    }

    fn finish(self) -> W {
        self.writer
    }
}

pub struct CsvSolutionsWriter<W: Write> {
    inner: TabularSolutionsWriter<W>,
}

impl<W: Write> CsvSolutionsWriter<W> {
    pub fn start(writer: W, variables: Vec<Variable>) -> io::Result<Self> {
        Ok(Self {
            inner: TabularSolutionsWriter::start(TableSyntax::Csv, writer, variables)?,
        })
    }

    pub fn write<'a>(
        &mut self,
        solution: impl IntoIterator<Item = (&'a Variable, &'a Term)>,
    ) -> io::Result<()> {
        self.inner.write(solution)
    }

    pub fn finish(self) -> W {
        self.inner.finish()
    }
}

pub struct TsvSolutionsWriter<W: Write> {
    inner: TabularSolutionsWriter<W>,
}

impl<W: Write> TsvSolutionsWriter<W> {
    pub fn start(writer: W, variables: Vec<Variable>) -> io::Result<Self> {
        Ok(Self {
            inner: TabularSolutionsWriter::start(TableSyntax::Tsv, writer, variables)?,
        })
    }

    pub fn write<'a>(
        &mut self,
        solution: impl IntoIterator<Item = (&'a Variable, &'a Term)>,
    ) -> io::Result<()> {
        self.inner.write(solution)
    }

    pub fn finish(self) -> W {
        self.inner.finish()
    }
}

/// CSV keeps only the lexical form of the terms.
fn write_csv_term(output: &mut String, term: &Term) {
    match term {
        Term::NamedNode(node) => output.push_str(node.as_str()),
        Term::BlankNode(node) => {
            output.push_str("_:");
            output.push_str(node.as_str());
        }
        Term::Literal(literal) => write_escaped_csv_string(output, literal.value()),
        Term::Triple(triple) => {
            write_csv_term(output, &triple.subject.clone().into());
            output.push(' ');
            output.push_str(triple.predicate.as_str());
            output.push(' ');
            write_csv_term(output, &triple.object);
        }
    }
}

fn write_escaped_csv_string(output: &mut String, s: &str) {
    if !s
        .bytes()
        .any(|c| matches!(c, b'"' | b',' | b'\n' | b'\r'))
    {
        output.push_str(s);
        return;
    }
    output.push('"');
    for c in s.chars() {
        if c == '"' {
            output.push_str("\"\"");
        } else {
            output.push(c);
        }
    }
    output.push('"');
}

/// TSV uses the N-Triples spelling, with the shorthand for the literals that
/// are unambiguous in Turtle.
fn write_tsv_term(output: &mut String, term: &Term) {
    match term {
        Term::NamedNode(node) => {
            output.push('<');
            output.push_str(node.as_str());
            output.push('>');
        }
        Term::BlankNode(node) => {
            output.push_str("_:");
            output.push_str(node.as_str());
        }
        Term::Literal(literal) => {
            let value = literal.value();
            if let Some(language) = literal.language() {
                write_tsv_quoted_str(output, value);
                output.push('@');
                output.push_str(language);
            } else {
                match literal.datatype() {
                    d if d == xsd::BOOLEAN && is_turtle_boolean(value) => output.push_str(value),
                    d if d == xsd::INTEGER && is_turtle_integer(value) => output.push_str(value),
                    d if d == xsd::DECIMAL && is_turtle_decimal(value) => output.push_str(value),
                    d if d == xsd::DOUBLE && is_turtle_double(value) => output.push_str(value),
                    d if d == xsd::STRING => write_tsv_quoted_str(output, value),
                    datatype => {
                        write_tsv_quoted_str(output, value);
                        output.push_str("^^<");
                        output.push_str(datatype.as_str());
                        output.push('>');
                    }
                }
            }
        }
        Term::Triple(triple) => {
            output.push_str("<< ");
            write_tsv_term(output, &triple.subject.clone().into());
            output.push(' ');
            output.push('<');
            output.push_str(triple.predicate.as_str());
            output.push('>');
            output.push(' ');
            write_tsv_term(output, &triple.object);
            output.push_str(" >>");
        }
    }
}

fn write_tsv_quoted_str(output: &mut String, string: &str) {
    output.push('"');
    for c in string.chars() {
        match c {
            '\t' => output.push_str("\\t"),
            '\n' => output.push_str("\\n"),
            '\r' => output.push_str("\\r"),
            '"' => output.push_str("\\\""),
            '\\' => output.push_str("\\\\"),
            _ => output.push(c),
        }
    }
    output.push('"');
}

fn is_turtle_boolean(value: &str) -> bool {
    matches!(value, "true" | "false")
}

fn strip_sign(value: &[u8]) -> &[u8] {
    match value.first() {
        Some(b'+' | b'-') => &value[1..],
        _ => value,
    }
}

/// Returns the remainder after a possibly empty digit run and whether at least
/// one digit was seen.
fn eat_digits(value: &[u8]) -> (&[u8], bool) {
    let end = value
        .iter()
        .position(|b| !b.is_ascii_digit())
        .unwrap_or(value.len());
    (&value[end..], end > 0)
}

// [19]  INTEGER  ::=  [+-]? [0-9]+
fn is_turtle_integer(value: &str) -> bool {
    let (rest, some_digits) = eat_digits(strip_sign(value.as_bytes()));
    some_digits && rest.is_empty()
}

// [20]  DECIMAL  ::=  [+-]? [0-9]* '.' [0-9]+
fn is_turtle_decimal(value: &str) -> bool {
    let (rest, _) = eat_digits(strip_sign(value.as_bytes()));
    let Some(rest) = rest.strip_prefix(b".") else {
        return false;
    };
    let (rest, some_digits) = eat_digits(rest);
    some_digits && rest.is_empty()
}

// [21]    DOUBLE    ::=  [+-]? ([0-9]+ '.' [0-9]* EXPONENT | '.' [0-9]+ EXPONENT | [0-9]+ EXPONENT)
// [154s]  EXPONENT  ::=  [eE] [+-]? [0-9]+
fn is_turtle_double(value: &str) -> bool {
    let (rest, digits_before) = eat_digits(strip_sign(value.as_bytes()));
    let (rest, digits_after) = if let Some(rest) = rest.strip_prefix(b".") {
        eat_digits(rest)
    } else {
        (rest, false)
    };
    let Some(rest) = rest
        .strip_prefix(b"e")
        .or_else(|| rest.strip_prefix(b"E"))
    else {
        return false;
    };
    let (rest, exponent_digits) = eat_digits(strip_sign(rest));
    (digits_before || digits_after) && exponent_digits && rest.is_empty()
}

pub enum TsvQueryResultsReader<R: Read> {
    Solutions {
        variables: Vec<Variable>,
        solutions: TsvSolutionsReader<R>,
    },
    Boolean(bool),
}

impl<R: Read> TsvQueryResultsReader<R> {
    pub fn read(mut reader: R) -> Result<Self, QueryResultsParseError> {
        let mut lines = LineReader::new();
        let (line, _) = lines.next_line(&mut reader)?;
        let line = line.trim_matches(|c| matches!(c, ' ' | '\r' | '\n'));

        // A boolean result file is a single "true" or "false" line
        if line.eq_ignore_ascii_case("true") {
            return Ok(Self::Boolean(true));
        }
        if line.eq_ignore_ascii_case("false") {
            return Ok(Self::Boolean(false));
        }

        let mut variables = Vec::new();
        if !line.is_empty() {
            for v in line.split('\t') {
                let v = v.trim();
                if v.is_empty() {
                    return Err(QueryResultsSyntaxError::msg("Empty column on the first row. The first row should be a list of variables like ?foo or $bar").into());
                }
                let variable = Variable::from_str(v).map_err(|e| {
                    QueryResultsSyntaxError::msg(format!("Invalid variable declaration '{v}': {e}"))
                })?;
                if variables.contains(&variable) {
                    return Err(QueryResultsSyntaxError::msg(format!(
                        "The variable {variable} is declared twice"
                    ))
                    .into());
                }
                variables.push(variable);
            }
        }
        let column_len = variables.len();
        Ok(Self::Solutions {
            variables,
            solutions: TsvSolutionsReader {
                reader,
                lines,
                column_len,
            },
        })
    }
}

pub struct TsvSolutionsReader<R: Read> {
    reader: R,
    lines: LineReader,
    column_len: usize,
}

impl<R: Read> TsvSolutionsReader<R> {
    pub fn read_next(&mut self) -> Result<Option<Vec<Option<Term>>>, QueryResultsParseError> {
        let column_len = self.column_len;
        let (line, location) = self.lines.next_line(&mut self.reader)?;
        Ok(parse_tsv_row(line, column_len, location)?)
    }
}

fn parse_tsv_row(
    line: &str,
    column_len: usize,
    location: LineLocation,
) -> Result<Option<Vec<Option<Term>>>, QueryResultsSyntaxError> {
    if line.is_empty() {
        return Ok(None); // EOF
    }
    let mut terms = Vec::new();
    let mut chars_before = 0_u64;
    let mut bytes_before = 0_u64;
    for cell in line.split('\t') {
        let value = cell.trim();
        if value.is_empty() {
            terms.push(None);
        } else {
            let term = Term::from_str(value).map_err(|e| {
                let start = TextPosition {
                    line: location.line,
                    column: chars_before,
                    offset: location.start_offset + bytes_before,
                };
                let end = TextPosition {
                    line: location.line,
                    column: chars_before + value.chars().count() as u64,
                    offset: location.start_offset + bytes_before + value.len() as u64,
                };
                QueryResultsSyntaxError::term(e, value, start..end)
            })?;
            terms.push(Some(term));
        }
        chars_before += cell.chars().count() as u64 + 1;
        bytes_before += cell.len() as u64 + 1;
    }
    if terms.len() == column_len {
        Ok(Some(terms))
    } else if column_len == 0 && terms == [None] {
        Ok(Some(Vec::new())) // Zero columns case
    } else {
        Err(QueryResultsSyntaxError::located_message(
            format!(
                "This TSV files has {} columns but we found a row on line {} with {} columns: {}",
                column_len,
                location.line,
                terms.len(),
                line
            ),
            TextPosition {
                line: location.line,
                column: 0,
                offset: location.start_offset,
            }..TextPosition {
                line: location.line,
                column: line.chars().count() as u64,
                offset: location.end_offset,
            },
        ))
    }
}

#[derive(Clone, Copy)]
struct LineLocation {
    /// 0-based line number
    line: u64,
    start_offset: u64,
    end_offset: u64,
}

/// Splits a [`Read`] into lines without assuming it is buffered.
struct LineReader {
    buffer: Vec<u8>,
    consumed: usize,
    filled: usize,
    line_count: u64,
    global_offset: u64,
}

impl LineReader {
    fn new() -> Self {
        Self {
            buffer: Vec::new(),
            consumed: 0,
            filled: 0,
            line_count: 0,
            global_offset: 0,
        }
    }

    /// Returns the next line, its terminating line jump included, together
    /// with its location. The returned line is empty only at the end of the
    /// stream.
    fn next_line(
        &mut self,
        reader: &mut impl Read,
    ) -> Result<(&str, LineLocation), QueryResultsParseError> {
        let line_end = loop {
            if let Some(eol) = memchr(b'\n', &self.buffer[self.consumed..self.filled]) {
                break self.consumed + eol + 1;
            }
            if self.consumed > 0 {
                self.buffer.copy_within(self.consumed..self.filled, 0);
                self.filled -= self.consumed;
                self.consumed = 0;
            }
            if self.filled + 1024 > self.buffer.len() {
                if self.filled + 1024 > MAX_BUFFER_SIZE {
                    return Err(io::Error::new(
                        io::ErrorKind::OutOfMemory,
                        format!("Reached the buffer maximal size of {MAX_BUFFER_SIZE}"),
                    )
                    .into());
                }
                self.buffer.resize(self.filled + 1024, b'\0');
            }
            let read = reader.read(&mut self.buffer[self.filled..])?;
            if read == 0 {
                break self.filled; // EOF, the remaining bytes are the last line
            }
            self.filled += read;
        };
        let line = str::from_utf8(&self.buffer[self.consumed..line_end]).map_err(|e| {
            QueryResultsParseError::from(QueryResultsSyntaxError::msg(format!(
                "Invalid UTF-8 in the TSV file: {e}"
            )))
        })?;
        let location = LineLocation {
            line: self.line_count,
            start_offset: self.global_offset,
            end_offset: self.global_offset + (line_end - self.consumed) as u64,
        };
        self.line_count += 1;
        self.global_offset = location.end_offset;
        self.consumed = line_end;
        Ok((line, location))
    }
}

#[cfg(test)]
#[allow(clippy::panic_in_result_fn)]
mod tests {
    use super::*;
    use lodrdf::{BlankNode, Literal, NamedNode};
    use std::error::Error;

    fn build_example() -> (Vec<Variable>, Vec<Vec<Option<Term>>>) {
        let s = Variable::new_unchecked("s");
        let value = Variable::new_unchecked("value");
        let iri: Term = NamedNode::new_unchecked("http://example.org/a").into();
        let rows = vec![
            vec![
                Some(iri.clone()),
                Some(Literal::new_simple_literal("hello").into()),
            ],
            vec![
                Some(iri.clone()),
                Some(Literal::new_simple_literal("quote\"inside").into()),
            ],
            vec![
                Some(BlankNode::new_unchecked("n1").into()),
                Some(Literal::new_simple_literal("blank").into()),
            ],
            vec![None, Some(Literal::new_simple_literal("no subject").into())],
            vec![None, None],
            vec![Some(iri), None],
            vec![
                Some(BlankNode::new_unchecked("n2").into()),
                Some(Literal::new_language_tagged_literal_unchecked("greeting", "fr").into()),
            ],
            vec![
                Some(BlankNode::new_unchecked("n2").into()),
                Some(
                    Literal::new_typed_literal("42", NamedNode::new_unchecked(xsd::INTEGER)).into(),
                ),
            ],
            vec![None, Some(Literal::new_simple_literal("sep,\t\r\n").into())],
        ];
        (vec![s, value], rows)
    }

    fn write_all<W: Write>(
        writer: &mut TabularSolutionsWriter<W>,
        variables: &[Variable],
        solutions: &[Vec<Option<Term>>],
    ) -> io::Result<()> {
        for solution in solutions {
            writer.write(
                variables
                    .iter()
                    .zip(solution)
                    .filter_map(|(v, s)| s.as_ref().map(|s| (v, s))),
            )?;
        }
        Ok(())
    }

    #[test]
    fn csv_serialization() -> io::Result<()> {
        let (variables, solutions) = build_example();
        let mut writer = CsvSolutionsWriter::start(Vec::new(), variables.clone())?;
        write_all(&mut writer.inner, &variables, &solutions)?;
        let buffer = String::from_utf8(writer.finish()).unwrap();
        assert_eq!(buffer, "s,value\r\nhttp://example.org/a,hello\r\nhttp://example.org/a,\"quote\"\"inside\"\r\n_:n1,blank\r\n,no subject\r\n,\r\nhttp://example.org/a,\r\n_:n2,greeting\r\n_:n2,42\r\n,\"sep,\t\r\n\"\r\n");
        Ok(())
    }

    #[test]
    fn tsv_roundtrip() -> Result<(), Box<dyn Error>> {
        let (variables, solutions) = build_example();

        let mut writer = TsvSolutionsWriter::start(Vec::new(), variables.clone())?;
        write_all(&mut writer.inner, &variables, &solutions)?;
        let buffer = String::from_utf8(writer.finish()).unwrap();
        assert_eq!(buffer, "?s\t?value\n<http://example.org/a>\t\"hello\"\n<http://example.org/a>\t\"quote\\\"inside\"\n_:n1\t\"blank\"\n\t\"no subject\"\n\t\n<http://example.org/a>\t\n_:n2\t\"greeting\"@fr\n_:n2\t42\n\t\"sep,\\t\\r\\n\"\n");

        if let TsvQueryResultsReader::Solutions {
            solutions: mut solutions_iter,
            variables: actual_variables,
        } = TsvQueryResultsReader::read(buffer.as_bytes())?
        {
            assert_eq!(actual_variables.as_slice(), variables.as_slice());
            let mut rows = Vec::new();
            while let Some(row) = solutions_iter.read_next()? {
                rows.push(row);
            }
            assert_eq!(rows, solutions);
        } else {
            unreachable!()
        }

        Ok(())
    }

    #[test]
    fn bad_tsv_does_not_panic() {
        let mut bad_tsvs = vec![
            "?",
            "?v",
            "?v?w",
            "?v\n<",
            "?v\n_",
            "?v\n_:",
            "?v\n\"",
            "?v\n<<",
            "?v\n1\t2\n",
            "?v\n\n",
        ];
        let unterminated_iris = format!("?v\n{}\n", "<".repeat(100_000));
        bad_tsvs.push(&unterminated_iris);
        for bad_tsv in bad_tsvs {
            if let Ok(TsvQueryResultsReader::Solutions { mut solutions, .. }) =
                TsvQueryResultsReader::read(bad_tsv.as_bytes())
            {
                while let Ok(Some(_)) = solutions.read_next() {}
            }
        }
    }

    #[test]
    fn no_columns_csv_serialization() -> io::Result<()> {
        let mut writer = CsvSolutionsWriter::start(Vec::new(), Vec::new())?;
        writer.write([])?;
        let buffer = String::from_utf8(writer.finish()).unwrap();
        assert_eq!(buffer, "\r\n\r\n");
        Ok(())
    }

    #[test]
    fn no_columns_tsv_serialization() -> io::Result<()> {
        let mut writer = TsvSolutionsWriter::start(Vec::new(), Vec::new())?;
        writer.write([])?;
        let buffer = String::from_utf8(writer.finish()).unwrap();
        assert_eq!(buffer, "\n\n");
        Ok(())
    }

    #[test]
    fn no_columns_tsv_parsing() -> io::Result<()> {
        if let TsvQueryResultsReader::Solutions {
            mut solutions,
            variables,
        } = TsvQueryResultsReader::read(b"\n\n".as_slice())?
        {
            assert_eq!(variables, Vec::<Variable>::new());
            assert_eq!(solutions.read_next()?, Some(Vec::new()));
            assert_eq!(solutions.read_next()?, None);
        } else {
            unreachable!()
        }
        Ok(())
    }

    #[test]
    fn no_results_csv_serialization() -> io::Result<()> {
        let writer = CsvSolutionsWriter::start(Vec::new(), vec![Variable::new_unchecked("out")])?;
        let buffer = String::from_utf8(writer.finish()).unwrap();
        assert_eq!(buffer, "out\r\n");
        Ok(())
    }

    #[test]
    fn no_results_tsv_serialization() -> io::Result<()> {
        let writer = TsvSolutionsWriter::start(Vec::new(), vec![Variable::new_unchecked("out")])?;
        let buffer = String::from_utf8(writer.finish()).unwrap();
        assert_eq!(buffer, "?out\n");
        Ok(())
    }

    #[test]
    fn no_results_tsv_parsing() -> io::Result<()> {
        if let TsvQueryResultsReader::Solutions {
            mut solutions,
            variables,
        } = TsvQueryResultsReader::read(b"?out\n".as_slice())?
        {
            assert_eq!(variables, vec![Variable::new_unchecked("out")]);
            assert_eq!(solutions.read_next()?, None);
        } else {
            unreachable!()
        }
        Ok(())
    }
}
