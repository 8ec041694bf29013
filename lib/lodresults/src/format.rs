use std::fmt;

/// [SPARQL query](https://www.w3.org/TR/sparql11-query/) results serialization formats.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash)]
#[non_exhaustive]
pub enum QueryResultsFormat {
    /// [SPARQL Query Results XML Format](https://www.w3.org/TR/rdf-sparql-XMLres/)
    Xml,
    /// [SPARQL Query Results JSON Format](https://www.w3.org/TR/sparql11-results-json/)
    Json,
    /// [SPARQL Query Results CSV Format](https://www.w3.org/TR/sparql11-results-csv-tsv/)
    Csv,
    /// [SPARQL Query Results TSV Format](https://www.w3.org/TR/sparql11-results-csv-tsv/)
    Tsv,
}

/// Static facts about one format, looked up through [`QueryResultsFormat::metadata`].
struct FormatMetadata {
    iri: &'static str,
    media_type: &'static str,
    file_extension: &'static str,
    name: &'static str,
}

impl QueryResultsFormat {
    const fn metadata(self) -> &'static FormatMetadata {
        match self {
            Self::Xml => &FormatMetadata {
                iri: "http://www.w3.org/ns/formats/SPARQL_Results_XML",
                media_type: "application/sparql-results+xml",
                file_extension: "srx",
                name: "SPARQL Results in XML",
            },
            Self::Json => &FormatMetadata {
                iri: "http://www.w3.org/ns/formats/SPARQL_Results_JSON",
                media_type: "application/sparql-results+json",
                file_extension: "srj",
                name: "SPARQL Results in JSON",
            },
            Self::Csv => &FormatMetadata {
                iri: "http://www.w3.org/ns/formats/SPARQL_Results_CSV",
                media_type: "text/csv; charset=utf-8",
                file_extension: "csv",
                name: "SPARQL Results in CSV",
            },
            Self::Tsv => &FormatMetadata {
                iri: "http://www.w3.org/ns/formats/SPARQL_Results_TSV",
                media_type: "text/tab-separated-values; charset=utf-8",
                file_extension: "tsv",
                name: "SPARQL Results in TSV",
            },
        }
    }

    /// The format canonical IRI according to the [Unique URIs for file formats registry](https://www.w3.org/ns/formats/).
    ///
    /// ```
    /// use lodresults::QueryResultsFormat;
    ///
    /// assert_eq!(
    ///     QueryResultsFormat::Xml.iri(),
    ///     "http://www.w3.org/ns/formats/SPARQL_Results_XML"
    /// )
    /// ```
    #[inline]
    pub const fn iri(self) -> &'static str {
        self.metadata().iri
    }

    /// The format [IANA media type](https://tools.ietf.org/html/rfc2046).
    ///
    /// ```
    /// use lodresults::QueryResultsFormat;
    ///
    /// assert_eq!(
    ///     QueryResultsFormat::Tsv.media_type(),
    ///     "text/tab-separated-values; charset=utf-8"
    /// )
    /// ```
    #[inline]
    pub const fn media_type(self) -> &'static str {
        self.metadata().media_type
    }

    /// The format [IANA-registered](https://tools.ietf.org/html/rfc2046) file extension.
    ///
    /// ```
    /// use lodresults::QueryResultsFormat;
    ///
    /// assert_eq!(QueryResultsFormat::Csv.file_extension(), "csv")
    /// ```
    #[inline]
    pub const fn file_extension(self) -> &'static str {
        self.metadata().file_extension
    }

    /// The format name.
    ///
    /// ```
    /// use lodresults::QueryResultsFormat;
    ///
    /// assert_eq!(QueryResultsFormat::Xml.name(), "SPARQL Results in XML")
    /// ```
    #[inline]
    pub const fn name(self) -> &'static str {
        self.metadata().name
    }

    /// Resolves a format from a media type.
    ///
    /// Media type parameters are ignored and a few common aliases are accepted,
    /// so `"application/xml"` maps to `Xml` even if it is not its canonical
    /// media type.
    ///
    /// ```
    /// use lodresults::QueryResultsFormat;
    ///
    /// assert_eq!(
    ///     QueryResultsFormat::from_media_type("text/csv; charset=utf-8"),
    ///     Some(QueryResultsFormat::Csv)
    /// )
    /// ```
    #[inline]
    pub fn from_media_type(media_type: &str) -> Option<Self> {
        let essence = media_type.split(';').next()?.trim();
        let (main_type, subtype) = essence.split_once('/')?;
        let main_type = main_type.trim();
        if !main_type.eq_ignore_ascii_case("application") && !main_type.eq_ignore_ascii_case("text")
        {
            return None;
        }
        let subtype = subtype.trim();
        let subtype = subtype.strip_prefix("x-").unwrap_or(subtype);
        match subtype.to_ascii_lowercase().as_str() {
            "sparql-results+xml" | "xml" => Some(Self::Xml),
            "sparql-results+json" | "json" => Some(Self::Json),
            "csv" | "plain" => Some(Self::Csv),
            "tab-separated-values" | "tsv" => Some(Self::Tsv),
            _ => None,
        }
    }

    /// Resolves a format from a file extension.
    ///
    /// A few aliases are accepted.
    ///
    /// ```
    /// use lodresults::QueryResultsFormat;
    ///
    /// assert_eq!(
    ///     QueryResultsFormat::from_extension("srx"),
    ///     Some(QueryResultsFormat::Xml)
    /// )
    /// ```
    #[inline]
    pub fn from_extension(extension: &str) -> Option<Self> {
        match extension.to_ascii_lowercase().as_str() {
            "srx" | "xml" => Some(Self::Xml),
            "srj" | "json" => Some(Self::Json),
            "csv" | "txt" => Some(Self::Csv),
            "tsv" => Some(Self::Tsv),
            _ => None,
        }
    }
}

impl fmt::Display for QueryResultsFormat {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn media_type_lookup() {
        assert_eq!(
            QueryResultsFormat::from_media_type("application/sparql-results+json"),
            Some(QueryResultsFormat::Json)
        );
        assert_eq!(
            QueryResultsFormat::from_media_type("application/x-sparql-results+xml;charset=utf-8"),
            Some(QueryResultsFormat::Xml)
        );
        assert_eq!(
            QueryResultsFormat::from_media_type("text/tab-separated-values"),
            Some(QueryResultsFormat::Tsv)
        );
        assert_eq!(QueryResultsFormat::from_media_type("text/html"), None);
        assert_eq!(QueryResultsFormat::from_media_type("json"), None);
    }

    #[test]
    fn extension_lookup() {
        assert_eq!(
            QueryResultsFormat::from_extension("SRX"),
            Some(QueryResultsFormat::Xml)
        );
        assert_eq!(
            QueryResultsFormat::from_extension("txt"),
            Some(QueryResultsFormat::Csv)
        );
        assert_eq!(QueryResultsFormat::from_extension("ttl"), None);
    }
}
