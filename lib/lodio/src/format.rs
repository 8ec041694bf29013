use std::fmt;
use std::path::Path;

/// RDF serialization formats.
///
/// The enumeration is non exhaustive: new formats may be added over time.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash)]
#[non_exhaustive]
pub enum RdfFormat {
    /// [N3](https://w3c.github.io/N3/spec/)
    N3,
    /// [N-Quads](https://www.w3.org/TR/n-quads/)
    NQuads,
    /// [N-Triples](https://www.w3.org/TR/n-triples/)
    NTriples,
    /// [RDF/XML](https://www.w3.org/TR/rdf-syntax-grammar/)
    RdfXml,
    /// [TriG](https://www.w3.org/TR/trig/)
    TriG,
    /// [Turtle](https://www.w3.org/TR/turtle/)
    Turtle,
}

/// Static facts about one format, looked up through [`RdfFormat::metadata`].
struct FormatMetadata {
    iri: &'static str,
    media_type: &'static str,
    file_extension: &'static str,
    name: &'static str,
}

impl RdfFormat {
    const fn metadata(self) -> &'static FormatMetadata {
        match self {
            Self::N3 => &FormatMetadata {
                iri: "http://www.w3.org/ns/formats/N3",
                media_type: "text/n3",
                file_extension: "n3",
                name: "N3",
            },
            Self::NQuads => &FormatMetadata {
                iri: "http://www.w3.org/ns/formats/N-Quads",
                media_type: "application/n-quads",
                file_extension: "nq",
                name: "N-Quads",
            },
            Self::NTriples => &FormatMetadata {
                iri: "http://www.w3.org/ns/formats/N-Triples",
                media_type: "application/n-triples",
                file_extension: "nt",
                name: "N-Triples",
            },
            Self::RdfXml => &FormatMetadata {
                iri: "http://www.w3.org/ns/formats/RDF_XML",
                media_type: "application/rdf+xml",
                file_extension: "rdf",
                name: "RDF/XML",
            },
            Self::TriG => &FormatMetadata {
                iri: "http://www.w3.org/ns/formats/TriG",
                media_type: "application/trig",
                file_extension: "trig",
                name: "TriG",
            },
            Self::Turtle => &FormatMetadata {
                iri: "http://www.w3.org/ns/formats/Turtle",
                media_type: "text/turtle",
                file_extension: "ttl",
                name: "Turtle",
            },
        }
    }

    /// The format canonical IRI according to the [Unique URIs for file formats registry](https://www.w3.org/ns/formats/).
    ///
    /// ```
    /// use lodio::RdfFormat;
    ///
    /// assert_eq!(RdfFormat::TriG.iri(), "http://www.w3.org/ns/formats/TriG")
    /// ```
    #[inline]
    pub const fn iri(self) -> &'static str {
        self.metadata().iri
    }

    /// The format [IANA media type](https://tools.ietf.org/html/rfc2046).
    ///
    /// ```
    /// use lodio::RdfFormat;
    ///
    /// assert_eq!(RdfFormat::Turtle.media_type(), "text/turtle")
    /// ```
    #[inline]
    pub const fn media_type(self) -> &'static str {
        self.metadata().media_type
    }

    /// The format [IANA-registered](https://tools.ietf.org/html/rfc2046) file extension.
    ///
    /// ```
    /// use lodio::RdfFormat;
    ///
    /// assert_eq!(RdfFormat::NQuads.file_extension(), "nq")
    /// ```
    #[inline]
    pub const fn file_extension(self) -> &'static str {
        self.metadata().file_extension
    }

    /// The format name.
    ///
    /// ```
    /// use lodio::RdfFormat;
    ///
    /// assert_eq!(RdfFormat::RdfXml.name(), "RDF/XML")
    /// ```
    #[inline]
    pub const fn name(self) -> &'static str {
        self.metadata().name
    }

    /// Checks if the format supports [RDF datasets](https://www.w3.org/TR/rdf11-concepts/#dfn-rdf-dataset) and not only [RDF graphs](https://www.w3.org/TR/rdf11-concepts/#dfn-rdf-graph).
    ///
    /// ```
    /// use lodio::RdfFormat;
    ///
    /// assert!(RdfFormat::TriG.supports_datasets());
    /// assert!(!RdfFormat::Turtle.supports_datasets());
    /// ```
    #[inline]
    pub const fn supports_datasets(self) -> bool {
        matches!(self, Self::NQuads | Self::TriG)
    }

    /// Resolves a format from a media type.
    ///
    /// A few aliases are accepted.
    /// For example, "application/xml" resolves to RDF/XML even if it is not its canonical media type.
    ///
    /// Example:
    /// ```
    /// use lodio::RdfFormat;
    ///
    /// assert_eq!(
    ///     RdfFormat::from_media_type("application/n-quads; charset=utf-8"),
    ///     Some(RdfFormat::NQuads)
    /// )
    /// ```
    pub fn from_media_type(media_type: &str) -> Option<Self> {
        let mut parts = media_type.split(';');
        let (main_type, subtype) = parts.next()?.split_once('/')?;
        let main_type = main_type.trim();
        if !main_type.eq_ignore_ascii_case("application") && !main_type.eq_ignore_ascii_case("text")
        {
            return None;
        }
        for parameter in parts {
            let (key, value) = parameter.split_once('=')?;
            if key.trim().eq_ignore_ascii_case("charset") && !charset_is_ascii_compatible(value) {
                return None;
            }
        }
        let subtype = subtype.trim();
        let subtype = subtype.strip_prefix("x-").unwrap_or(subtype);
        match subtype.to_ascii_lowercase().as_str() {
            "n3" => Some(Self::N3),
            "n-quads" | "nquads" => Some(Self::NQuads),
            "n-triples" | "ntriples" | "plain" => Some(Self::NTriples),
            "rdf+xml" | "xml" => Some(Self::RdfXml),
            "trig" => Some(Self::TriG),
            "turtle" => Some(Self::Turtle),
            _ => None,
        }
    }

    /// Resolves a format from a file extension.
    ///
    /// A few aliases are accepted.
    ///
    /// Example:
    /// ```
    /// use lodio::RdfFormat;
    ///
    /// assert_eq!(RdfFormat::from_extension("ttl"), Some(RdfFormat::Turtle))
    /// ```
    pub fn from_extension(extension: &str) -> Option<Self> {
        match extension.to_ascii_lowercase().as_str() {
            "n3" => Some(Self::N3),
            "nq" => Some(Self::NQuads),
            "nt" | "txt" => Some(Self::NTriples),
            "rdf" | "xml" => Some(Self::RdfXml),
            "trig" => Some(Self::TriG),
            "ttl" => Some(Self::Turtle),
            _ => None,
        }
    }

    /// Looks for a known format from a file path.
    ///
    /// Exactly one compression suffix (`gz`, `bz2` or `xz`) is stripped before
    /// looking at the extension, so a compressed file keeps its format
    /// detectable from its name.
    ///
    /// Example:
    /// ```
    /// use lodio::RdfFormat;
    /// use std::path::Path;
    ///
    /// assert_eq!(
    ///     RdfFormat::from_path(Path::new("data.ttl")),
    ///     Some(RdfFormat::Turtle)
    /// );
    /// assert_eq!(
    ///     RdfFormat::from_path(Path::new("data.ttl.gz")),
    ///     Some(RdfFormat::Turtle)
    /// );
    /// assert_eq!(RdfFormat::from_path(Path::new("data.gz")), None);
    /// // only a single compression layer is stripped
    /// assert_eq!(RdfFormat::from_path(Path::new("data.ttl.gz.gz")), None);
    /// ```
    pub fn from_path(path: &Path) -> Option<Self> {
        let extension = path.extension()?.to_str()?;
        if matches!(extension.to_ascii_lowercase().as_str(), "gz" | "bz2" | "xz") {
            Path::new(path.file_stem()?)
                .extension()?
                .to_str()
                .and_then(Self::from_extension)
        } else {
            Self::from_extension(extension)
        }
    }
}

fn charset_is_ascii_compatible(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "ascii" | "utf8" | "utf-8"
    )
}

impl fmt::Display for RdfFormat {
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
        let turtle = Some(RdfFormat::Turtle);
        assert_eq!(RdfFormat::from_media_type("text/turtle; charset=utf-8"), turtle);
        assert_eq!(RdfFormat::from_media_type("application/x-turtle"), turtle);
        assert_eq!(
            RdfFormat::from_media_type("application/xml"),
            Some(RdfFormat::RdfXml)
        );
        assert_eq!(
            RdfFormat::from_media_type("text/plain;charset=ASCII"),
            Some(RdfFormat::NTriples)
        );
        assert_eq!(RdfFormat::from_media_type("text/plain;charset=koi8-r"), None);
        assert_eq!(RdfFormat::from_media_type("application/json"), None);
        assert_eq!(RdfFormat::from_media_type("image/turtle"), None);
        assert_eq!(RdfFormat::from_media_type("turtle"), None);
    }

    #[test]
    fn extension_lookup() {
        assert_eq!(RdfFormat::from_extension("nq"), Some(RdfFormat::NQuads));
        assert_eq!(RdfFormat::from_extension("TTL"), Some(RdfFormat::Turtle));
        assert_eq!(RdfFormat::from_extension("txt"), Some(RdfFormat::NTriples));
        assert_eq!(RdfFormat::from_extension("json"), None);
    }

    #[test]
    fn path_lookup() {
        assert_eq!(
            RdfFormat::from_path(Path::new("/tmp/data.rdf")),
            Some(RdfFormat::RdfXml)
        );
        assert_eq!(
            RdfFormat::from_path(Path::new("data.nq.bz2")),
            Some(RdfFormat::NQuads)
        );
        assert_eq!(
            RdfFormat::from_path(Path::new("data.trig.xz")),
            Some(RdfFormat::TriG)
        );
        assert_eq!(RdfFormat::from_path(Path::new("data.gz")), None);
        assert_eq!(RdfFormat::from_path(Path::new("data.ttl.gz.gz")), None);
        assert_eq!(RdfFormat::from_path(Path::new("data")), None);
    }
}
