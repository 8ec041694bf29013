#![allow(clippy::range_plus_one)]

use crate::toolkit::{TokenSource, TokenSourceError};
use memchr::{memchr, memchr2};
use oxilangtag::LanguageTag;
use oxiri::Iri;
use std::borrow::Cow;
use std::cmp::min;
use std::ops::Range;
use std::str;

#[derive(Debug, PartialEq, Eq)]
pub enum TurtleToken<'a> {
    /// An IRI reference, already resolved against the base IRI.
    Iri(String),
    PrefixedName {
        prefix: &'a str,
        local: Cow<'a, str>,
        /// The local part contains characters that could make the expanded IRI
        /// invalid, so the expansion must be validated again.
        needs_iri_check: bool,
    },
    Variable(Cow<'a, str>),
    BlankNodeLabel(&'a str),
    String(String),
    LongString(String),
    Integer(&'a str),
    Decimal(&'a str),
    Double(&'a str),
    LangTag(&'a str),
    Punctuation(&'a str),
    Keyword(&'a str),
    /// Only emitted for the line-based formats, where it is a statement boundary.
    LineJump,
}

#[derive(Eq, PartialEq, Clone, Copy)]
pub enum TurtleLexerMode {
    /// No prefixed names, no single-quoted or long strings.
    NTriples,
    Turtle,
    /// Turtle plus variables and the implication arrows.
    N3,
}

#[derive(Default)]
pub struct TurtleLexerOptions {
    pub base_iri: Option<Iri<String>>,
}

pub struct TurtleLexer {
    mode: TurtleLexerMode,
    lenient: bool,
    /// Rejects raw non-ASCII bytes, the historical N-Triples discipline.
    ascii_only: bool,
}

/// The (bytes consumed, token or error) pair handed back to the tokenizer, or
/// `None` when the window may be incomplete.
type Scan<'a> = Option<(usize, Result<TurtleToken<'a>, TokenSourceError>)>;

fn token(len: usize, token: TurtleToken<'_>) -> Scan<'_> {
    Some((len, Ok(token)))
}

fn failure<'a>(len: usize, location: Range<usize>, message: impl Into<String>) -> Scan<'a> {
    Some((len, Err((location, message.into()).into())))
}

impl TokenSource for TurtleLexer {
    type Token<'a> = TurtleToken<'a>;
    type Options = TurtleLexerOptions;

    fn recognize_next_token<'a>(
        &mut self,
        data: &'a [u8],
        is_ending: bool,
        options: &TurtleLexerOptions,
    ) -> Scan<'a> {
        let (consumed, result) = self.scan(data, is_ending, options)?;
        if self.ascii_only {
            if let Some(offset) = data[..consumed].iter().position(|b| !b.is_ascii()) {
                return failure(
                    consumed,
                    offset..consumed,
                    "Non-ASCII characters are not allowed by this dialect, use \\u escape sequences",
                );
            }
        }
        Some((consumed, result))
    }
}

impl TurtleLexer {
    pub fn new(mode: TurtleLexerMode, lenient: bool) -> Self {
        Self {
            mode,
            lenient,
            ascii_only: false,
        }
    }

    pub fn with_ascii_only(mut self) -> Self {
        self.ascii_only = true;
        self
    }

    fn scan<'a>(&self, data: &'a [u8], is_ending: bool, options: &TurtleLexerOptions) -> Scan<'a> {
        let n3 = self.mode == TurtleLexerMode::N3;
        match *data.first()? {
            b'<' => self.scan_after_angle(data, is_ending, options),
            b'>' => match data.get(1)? {
                b'>' => token(2, TurtleToken::Punctuation(">>")),
                _ => token(1, TurtleToken::Punctuation(">")),
            },
            b'_' => match data.get(1)? {
                b':' => Self::scan_bnode_label(data, is_ending),
                c => failure(1, 0..1, format!("Unexpected character '{}'", char::from(*c))),
            },
            b'"' => self.scan_quoted(data, b'"'),
            b'\'' if self.mode != TurtleLexerMode::NTriples => self.scan_quoted(data, b'\''),
            b'@' => self.scan_lang_tag(data, is_ending),
            b'.' => match data.get(1) {
                Some(b'0'..=b'9') => Self::scan_number(data, is_ending),
                Some(_) => token(1, TurtleToken::Punctuation(".")),
                None => is_ending.then(|| (1, Ok(TurtleToken::Punctuation(".")))),
            },
            b'^' => match data.get(1)? {
                b'^' => token(2, TurtleToken::Punctuation("^^")),
                _ => token(1, TurtleToken::Punctuation("^")),
            },
            b'{' => match data.get(1) {
                Some(b'|') => token(2, TurtleToken::Punctuation("{|")),
                Some(_) => token(1, TurtleToken::Punctuation("{")),
                None => is_ending.then(|| (1, Ok(TurtleToken::Punctuation("{")))),
            },
            b'|' => match data.get(1)? {
                b'}' => token(2, TurtleToken::Punctuation("|}")),
                _ => token(1, TurtleToken::Punctuation("|")),
            },
            b'(' => token(1, TurtleToken::Punctuation("(")),
            b')' => token(1, TurtleToken::Punctuation(")")),
            b'[' => token(1, TurtleToken::Punctuation("[")),
            b']' => token(1, TurtleToken::Punctuation("]")),
            b'}' => token(1, TurtleToken::Punctuation("}")),
            b',' => token(1, TurtleToken::Punctuation(",")),
            b';' => token(1, TurtleToken::Punctuation(";")),
            b'!' if n3 => token(1, TurtleToken::Punctuation("!")),
            b'=' if n3 => match data.get(1) {
                Some(b'>') => token(2, TurtleToken::Punctuation("=>")),
                Some(_) => token(1, TurtleToken::Punctuation("=")),
                None => is_ending.then(|| (1, Ok(TurtleToken::Punctuation("=")))),
            },
            b'\n' => token(1, TurtleToken::LineJump),
            b'\r' => match data.get(1) {
                Some(b'\n') => token(2, TurtleToken::LineJump),
                Some(_) => token(1, TurtleToken::LineJump),
                None => is_ending.then(|| (1, Ok(TurtleToken::LineJump))),
            },
            b'0'..=b'9' | b'+' | b'-' => Self::scan_number(data, is_ending),
            b'?' if n3 => self.scan_variable(data, is_ending),
            _ => self.scan_pname_or_keyword(data, is_ending),
        }
    }

    /// Everything starting with `<`: the `<<` quotation bracket, the N3
    /// arrows, and IRI references.
    fn scan_after_angle<'a>(
        &self,
        data: &'a [u8],
        is_ending: bool,
        options: &TurtleLexerOptions,
    ) -> Scan<'a> {
        match data.get(1) {
            Some(b'<') => token(2, TurtleToken::Punctuation("<<")),
            Some(b'=' | b'-') if self.mode == TurtleLexerMode::N3 => {
                // '<=' and '<-' unless this is an IRI like <=-relations.example/>
                let arrow = if data[1] == b'=' { "<=" } else { "<-" };
                match self.scan_iri_ref(data, options) {
                    Some((consumed, Ok(iri))) => token(consumed, iri),
                    Some((_, Err(_))) => token(2, TurtleToken::Punctuation(arrow)),
                    None if is_ending => token(2, TurtleToken::Punctuation(arrow)),
                    None => None,
                }
            }
            Some(_) => self.scan_iri_ref(data, options),
            None if is_ending => failure(1, 0..1, "Unexpected end of file, expecting an IRI"),
            None => None,
        }
    }

    // [18] IRIREF  ::=  '<' ([^#x00-#x20<>"{}|^`\] | UCHAR)* '>'
    fn scan_iri_ref(&self, data: &[u8], options: &TurtleLexerOptions) -> Scan<'static> {
        let mut bytes = Vec::new();
        let mut i = 1;
        loop {
            let stop = i + memchr2(b'>', b'\\', &data[i..])?;
            bytes.extend_from_slice(&data[i..stop]);
            i = stop;
            if data[i] == b'>' {
                return Some((i + 1, self.finish_iri(bytes, 0..i + 1, options)));
            }
            // an escape sequence, only the \u/\U forms are allowed here
            let (extra, decoded) = self.scan_escape(&data[i..], i, false)?;
            i += extra + 1;
            match decoded {
                Ok(c) => {
                    let mut buf = [0; 4];
                    bytes.extend_from_slice(c.encode_utf8(&mut buf).as_bytes());
                }
                Err(e) => return Some((i, Err(e))),
            }
        }
    }

    fn finish_iri(
        &self,
        bytes: Vec<u8>,
        location: Range<usize>,
        options: &TurtleLexerOptions,
    ) -> Result<TurtleToken<'static>, TokenSourceError> {
        let iri = string_from_utf8(bytes, location.clone())?;
        let resolved = match (options.base_iri.as_ref(), self.lenient) {
            (Some(base), true) => base.resolve_unchecked(&iri).into_inner(),
            (Some(base), false) => base
                .resolve(&iri)
                .map_err(|e| (location, e.to_string()))?
                .into_inner(),
            (None, true) => iri,
            (None, false) => Iri::parse(iri)
                .map_err(|e| (location, e.to_string()))?
                .into_inner(),
        };
        Ok(TurtleToken::Iri(resolved))
    }

    // [139s]  PNAME_NS   ::=  PN_PREFIX? ':'
    // [140s]  PNAME_LN   ::=  PNAME_NS PN_LOCAL
    // [167s]  PN_PREFIX  ::=  PN_CHARS_BASE ((PN_CHARS | '.')* PN_CHARS)?
    fn scan_pname_or_keyword<'a>(&self, data: &'a [u8], is_ending: bool) -> Scan<'a> {
        let mut i = 0;
        loop {
            let Some(decoded) = Self::scan_utf8_char(&data[i..], i) else {
                if !is_ending {
                    return None;
                }
                while data[..i].ends_with(b".") {
                    i -= 1;
                }
                return if i == 0 {
                    failure(1, 0..1, format!("Unexpected byte {}", data[0]))
                } else {
                    Some((i, str_from_utf8(&data[..i], 0..i).map(TurtleToken::Keyword)))
                };
            };
            let (c, width) = match decoded {
                Ok(pair) => pair,
                Err(e) => return Some((e.location.end, Err(e))),
            };
            if c == ':' {
                i += width;
                break;
            }
            if i == 0 {
                if !is_pn_chars_base(c) {
                    return failure(
                        width,
                        0..width,
                        format!("'{c}' is not allowed at the beginning of a prefix name"),
                    );
                }
                i += width;
            } else if is_pn_chars(c) || c == '.' {
                i += width;
            } else {
                // the run before this character is a bare keyword like 'a'
                while data[..i].ends_with(b".") {
                    i -= 1;
                }
                return Some((i, str_from_utf8(&data[..i], 0..i).map(TurtleToken::Keyword)));
            }
        }
        let prefix = match str_from_utf8(&data[..i - 1], 0..i - 1) {
            Ok(prefix) => prefix,
            Err(e) => return Some((i, Err(e))),
        };
        if prefix.ends_with('.') {
            return failure(
                i,
                0..i,
                format!(
                    "'{prefix}' is not a valid prefix: prefixes are not allowed to end with '.'"
                ),
            );
        }
        let (consumed, local) = self.scan_pn_local(&data[i..], is_ending)?;
        Some((
            consumed + i,
            local.map(|(local, needs_iri_check)| TurtleToken::PrefixedName {
                prefix,
                local,
                needs_iri_check,
            }),
        ))
    }

    // [36]  QUICK_VAR_NAME  ::=  "?" PN_LOCAL
    fn scan_variable<'a>(&self, data: &'a [u8], is_ending: bool) -> Scan<'a> {
        let (consumed, result) = self.scan_pn_local(&data[1..], is_ending)?;
        Some((
            consumed + 1,
            result.and_then(|(name, _)| {
                if name.is_empty() {
                    Err((0..consumed, "A variable name is not allowed to be empty").into())
                } else {
                    Ok(TurtleToken::Variable(name))
                }
            }),
        ))
    }

    // [168s]  PN_LOCAL  ::=  (PN_CHARS_U | ':' | [0-9] | PLX) ((PN_CHARS | '.' | ':' | PLX)* (PN_CHARS | ':' | PLX))?
    #[allow(clippy::type_complexity)]
    fn scan_pn_local<'a>(
        &self,
        data: &'a [u8],
        is_ending: bool,
    ) -> Option<(usize, Result<(Cow<'a, str>, bool), TokenSourceError>)> {
        let mut i = 0;
        // allocated lazily, only once an escape forces a copy
        let mut unescaped: Option<String> = None;
        let mut copied_up_to = 0;
        let mut needs_iri_check = false;
        let mut trailing_dots = 0;
        loop {
            let Some(decoded) = Self::scan_utf8_char(&data[i..], i) else {
                if !is_ending {
                    return None;
                }
                // strip the trailing dots, they belong to the statement
                let local = if let Some(mut unescaped) = unescaped {
                    match str_from_utf8(&data[copied_up_to..i], copied_up_to..i) {
                        Ok(chunk) => unescaped.push_str(chunk),
                        Err(e) => return Some((i, Err(e))),
                    }
                    while unescaped.ends_with('.') {
                        unescaped.pop();
                        i -= 1;
                    }
                    Cow::Owned(unescaped)
                } else {
                    let mut local = match str_from_utf8(&data[..i], 0..i) {
                        Ok(local) => local,
                        Err(e) => return Some((i, Err(e))),
                    };
                    while let Some(shorter) = local.strip_suffix('.') {
                        local = shorter;
                        i -= 1;
                    }
                    Cow::Borrowed(local)
                };
                return Some((i, Ok((local, needs_iri_check))));
            };
            let (c, width) = match decoded {
                Ok(pair) => pair,
                Err(e) => return Some((e.location.end, Err(e))),
            };
            if c == '%' {
                // PERCENT escape, kept verbatim in the local part
                i += 1;
                let a = char::from(*data.get(i)?);
                i += 1;
                let b = char::from(*data.get(i)?);
                if !a.is_ascii_hexdigit() || !b.is_ascii_hexdigit() {
                    return Some((i + 1, Err((
                        i - 2..=i,
                        format!("escapes in IRIs should be % followed by two hexadecimal characters, found '%{a}{b}'"),
                    ).into())));
                }
                i += 1;
                trailing_dots = 0;
            } else if c == '\\' {
                i += 1;
                let a = char::from(*data.get(i)?);
                if self.lenient
                    || matches!(
                        a,
                        '_' | '~'
                            | '.'
                            | '-'
                            | '!'
                            | '$'
                            | '&'
                            | '\''
                            | '('
                            | ')'
                            | '*'
                            | '+'
                            | ','
                            | ';'
                            | '='
                    )
                {
                    // always fine once unescaped
                } else if matches!(a, '/' | '?' | '#' | '@' | '%') {
                    // fine but the expanded IRI must be validated again
                    needs_iri_check = true;
                } else {
                    return Some((i + 1, Err((
                        i..=i,
                        format!("The characters that are allowed to be escaped in IRIs are _~.-!$&'()*+,;=/?#@%, found '{a}'"),
                    ).into())));
                }
                let unescaped = unescaped.get_or_insert_with(String::new);
                if i - copied_up_to > 1 {
                    match str_from_utf8(&data[copied_up_to..i - 1], copied_up_to..i - 1) {
                        Ok(chunk) => unescaped.push_str(chunk),
                        Err(e) => return Some((i, Err(e))),
                    }
                }
                unescaped.push(a);
                i += 1;
                copied_up_to = i;
                trailing_dots = 0;
            } else if i == 0 {
                if !(is_pn_chars_u(c) || c == ':' || c.is_ascii_digit()) {
                    return Some((0, Ok((Cow::Borrowed(""), false))));
                }
                if !self.lenient {
                    needs_iri_check |= is_pn_chars_base_but_invalid_iri(c) || c == ':';
                }
                i += width;
            } else if is_pn_chars(c) || c == ':' {
                if !self.lenient {
                    needs_iri_check |= is_pn_chars_base_but_invalid_iri(c) || c == ':';
                }
                i += width;
                trailing_dots = 0;
            } else if c == '.' {
                i += width;
                trailing_dots += 1;
            } else {
                // end of the local part, trailing dots excluded
                let local = if let Some(mut unescaped) = unescaped {
                    match str_from_utf8(&data[copied_up_to..i], copied_up_to..i) {
                        Ok(chunk) => unescaped.push_str(chunk),
                        Err(e) => return Some((i, Err(e))),
                    }
                    for _ in 0..trailing_dots {
                        unescaped.pop();
                    }
                    i -= trailing_dots;
                    Cow::Owned(unescaped)
                } else {
                    let local = match str_from_utf8(&data[..i], 0..i) {
                        Ok(local) => local,
                        Err(e) => return Some((i, Err(e))),
                    };
                    i -= trailing_dots;
                    Cow::Borrowed(&local[..local.len() - trailing_dots])
                };
                return Some((i, Ok((local, needs_iri_check))));
            }
        }
    }

    // [141s]  BLANK_NODE_LABEL  ::=  '_:' (PN_CHARS_U | [0-9]) ((PN_CHARS | '.')* PN_CHARS)?
    fn scan_bnode_label(data: &[u8], is_ending: bool) -> Scan<'_> {
        let mut i = 2;
        while let Some(decoded) = Self::scan_utf8_char(&data[i..], i) {
            let (c, width) = match decoded {
                Ok(pair) => pair,
                Err(e) => return Some((e.location.end, Err(e))),
            };
            let valid = if i == 2 {
                is_pn_chars_u(c) || c.is_ascii_digit()
            } else {
                is_pn_chars(c)
            };
            if valid {
                i += width;
            } else if i == 2 {
                return failure(i, 0..i, "A blank node ID cannot be empty");
            } else if c == '.' && data[i - 1] != b'.' {
                // a single interior dot may still be part of the label
                i += width;
            } else {
                break;
            }
        }
        if !is_ending && Self::scan_utf8_char(&data[i..], i).is_none() {
            return None;
        }
        // the label ends before any trailing dot
        if data[i - 1] == b'.' {
            i -= 1;
        }
        if i == 2 {
            failure(i, 0..i, "A blank node ID cannot be empty")
        } else {
            Some((
                i,
                str_from_utf8(&data[2..i], 2..i).map(TurtleToken::BlankNodeLabel),
            ))
        }
    }

    // [144s]  LANGTAG  ::=  '@' [a-zA-Z]+ ('-' [a-zA-Z0-9]+)*
    fn scan_lang_tag<'a>(&self, data: &'a [u8], is_ending: bool) -> Scan<'a> {
        let mut block_open = true;
        for (i, c) in data[1..].iter().enumerate() {
            if i == 0 {
                if !c.is_ascii_alphabetic() {
                    return failure(1, 1..2, "A language code should always start with a letter");
                }
                block_open = false;
            } else if c.is_ascii_alphanumeric() {
                block_open = false;
            } else if *c == b'-' && !block_open {
                block_open = true;
            } else if block_open {
                // a dangling '-', the tag ends before it
                return Some((i, self.finish_lang_tag(&data[1..i], 1..i)));
            } else {
                return Some((i + 1, self.finish_lang_tag(&data[1..=i], 1..i + 1)));
            }
        }
        if is_ending && data.len() > 1 && !block_open {
            let end = data.len();
            return Some((end, self.finish_lang_tag(&data[1..end], 1..end)));
        }
        None
    }

    fn finish_lang_tag<'a>(
        &self,
        tag: &'a [u8],
        location: Range<usize>,
    ) -> Result<TurtleToken<'a>, TokenSourceError> {
        let tag = str_from_utf8(tag, location.clone())?;
        Ok(TurtleToken::LangTag(if self.lenient {
            tag
        } else {
            LanguageTag::parse(tag)
                .map_err(|e| (location, e.to_string()))?
                .into_inner()
        }))
    }

    fn scan_quoted(&self, data: &[u8], delimiter: u8) -> Scan<'static> {
        if self.mode != TurtleLexerMode::NTriples
            && *data.get(1)? == delimiter
            && *data.get(2)? == delimiter
        {
            self.scan_long_string(data, delimiter)
        } else {
            self.scan_string(data, delimiter)
        }
    }

    // [22]  STRING_LITERAL_QUOTE         ::=  '"' ([^#x22#x5C#xA#xD] | ECHAR | UCHAR)* '"'
    // [23]  STRING_LITERAL_SINGLE_QUOTE  ::=  "'" ([^#x27#x5C#xA#xD] | ECHAR | UCHAR)* "'"
    fn scan_string(&self, data: &[u8], delimiter: u8) -> Scan<'static> {
        let mut value = String::new();
        let mut i = 1;
        loop {
            let mut run = memchr2(delimiter, b'\\', &data[i..])?;
            if !self.lenient {
                // raw line jumps end the literal with an error
                if let Some(jump) = memchr2(b'\n', b'\r', &data[i..i + run]) {
                    run = jump;
                }
            }
            match str_from_utf8(&data[i..i + run], i..i + run) {
                Ok(s) => value.push_str(s),
                Err(e) => return Some((i + run, Err(e))),
            }
            i += run;
            match data[i] {
                c if c == delimiter => return token(i + 1, TurtleToken::String(value)),
                b'\\' => {
                    let (extra, decoded) = self.scan_escape(&data[i..], i, true)?;
                    i += extra + 1;
                    match decoded {
                        Ok(c) => value.push(c),
                        Err(e) => {
                            // skip ahead to the closing quote before reporting
                            let close = memchr(delimiter, &data[i..])?;
                            return Some((i + close + 1, Err(e)));
                        }
                    }
                }
                b'\n' | b'\r' => {
                    let close = memchr(delimiter, &data[i..])?;
                    return failure(
                        i + close + 1,
                        i..i + 1,
                        "Line jumps are not allowed in string literals, use \\n",
                    );
                }
                _ => unreachable!(),
            }
        }
    }

    // [24]  STRING_LITERAL_LONG_SINGLE_QUOTE  ::=  "'''" (("'" | "''")? ([^'\] | ECHAR | UCHAR))* "'''"
    // [25]  STRING_LITERAL_LONG_QUOTE         ::=  '"""' (('"' | '""')? ([^"\] | ECHAR | UCHAR))* '"""'
    fn scan_long_string(&self, data: &[u8], delimiter: u8) -> Scan<'static> {
        let mut value = String::new();
        let mut i = 3;
        loop {
            let run = memchr2(delimiter, b'\\', &data[i..])?;
            match str_from_utf8(&data[i..i + run], i..i + run) {
                Ok(s) => value.push_str(s),
                Err(e) => return Some((i + run, Err(e))),
            }
            i += run;
            match data[i] {
                c if c == delimiter => {
                    if *data.get(i + 1)? == delimiter && *data.get(i + 2)? == delimiter {
                        return token(i + 3, TurtleToken::LongString(value));
                    }
                    i += 1;
                    value.push(char::from(delimiter));
                }
                b'\\' => {
                    let (extra, decoded) = self.scan_escape(&data[i..], i, true)?;
                    i += extra + 1;
                    match decoded {
                        Ok(c) => value.push(c),
                        Err(e) => return Some((i, Err(e))),
                    }
                }
                _ => unreachable!(),
            }
        }
    }

    // [19]  INTEGER    ::=  [+-]? [0-9]+
    // [20]  DECIMAL    ::=  [+-]? [0-9]* '.' [0-9]+
    // [21]  DOUBLE     ::=  [+-]? ([0-9]+ '.' [0-9]* EXPONENT | '.' [0-9]+ EXPONENT | [0-9]+ EXPONENT)
    // [154s] EXPONENT  ::=  [eE] [+-]? [0-9]+
    fn scan_number(data: &[u8], is_ending: bool) -> Scan<'_> {
        let mut i = usize::from(matches!(*data.first()?, b'+' | b'-'));
        let integer_digits = Self::scan_digits(&data[i..], is_ending)?;
        i += integer_digits;

        let mut fraction_digits = None;
        if Self::byte_or_eof(data, i, is_ending)? == Some(b'.') {
            i += 1;
            let digits = Self::scan_digits(&data[i..], is_ending)?;
            i += digits;
            fraction_digits = Some(digits);
        }

        if matches!(Self::byte_or_eof(data, i, is_ending)?, Some(b'e' | b'E')) {
            i += 1;
            if matches!(Self::byte_or_eof(data, i, is_ending)?, Some(b'+' | b'-')) {
                i += 1;
            }
            let exponent_digits = Self::scan_digits(&data[i..], is_ending)?;
            i += exponent_digits;
            return Some((
                i,
                if exponent_digits == 0 {
                    Err((0..i, "A double exponent cannot be empty").into())
                } else if integer_digits == 0 && fraction_digits.unwrap_or(0) == 0 {
                    Err((0..i, "A double should not be empty").into())
                } else {
                    str_from_utf8(&data[..i], 0..i).map(TurtleToken::Double)
                },
            ));
        }
        match fraction_digits {
            Some(0) => {
                // the '.' was a statement terminator after all
                i -= 1;
                Some((
                    i,
                    if integer_digits == 0 {
                        Err((0..i, "An integer should not be empty").into())
                    } else {
                        str_from_utf8(&data[..i], 0..i).map(TurtleToken::Integer)
                    },
                ))
            }
            Some(_) => Some((i, str_from_utf8(&data[..i], 0..i).map(TurtleToken::Decimal))),
            None => Some((
                i,
                if integer_digits == 0 {
                    Err((0..i, "An integer should not be empty").into())
                } else {
                    str_from_utf8(&data[..i], 0..i).map(TurtleToken::Integer)
                },
            )),
        }
    }

    /// `Some(Some(byte))`, `Some(None)` at a final EOF, `None` when more data
    /// might still arrive.
    fn byte_or_eof(data: &[u8], i: usize, is_ending: bool) -> Option<Option<u8>> {
        match data.get(i) {
            Some(b) => Some(Some(*b)),
            None if is_ending => Some(None),
            None => None,
        }
    }

    fn scan_digits(data: &[u8], is_ending: bool) -> Option<usize> {
        match data.iter().position(|b| !b.is_ascii_digit()) {
            Some(i) => Some(i),
            None => is_ending.then_some(data.len()),
        }
    }

    // [26]   UCHAR  ::=  '\u' HEX HEX HEX HEX | '\U' HEX HEX HEX HEX HEX HEX HEX HEX
    // [159s] ECHAR  ::=  '\' [tbnrf"'\]
    fn scan_escape(
        &self,
        data: &[u8],
        position: usize,
        with_echar: bool,
    ) -> Option<(usize, Result<char, TokenSourceError>)> {
        match *data.get(1)? {
            b'u' => match Self::scan_hex_char(&data[2..], 4, 'u', position) {
                Ok(c) => Some((5, Ok(c?))),
                Err(e) => {
                    if self.lenient {
                        // UTF-16 surrogate pairs are common in data exported from old systems
                        match Self::scan_surrogate_pair(&data[2..], position) {
                            Ok(c) => Some((11, Ok(c?))),
                            Err(e) => Some((5, Err(e))),
                        }
                    } else {
                        Some((5, Err(e)))
                    }
                }
            },
            b'U' => match Self::scan_hex_char(&data[2..], 8, 'U', position) {
                Ok(c) => Some((9, Ok(c?))),
                Err(e) => Some((9, Err(e))),
            },
            b't' if with_echar => Some((1, Ok('\t'))),
            b'b' if with_echar => Some((1, Ok('\x08'))),
            b'n' if with_echar => Some((1, Ok('\n'))),
            b'r' if with_echar => Some((1, Ok('\r'))),
            b'f' if with_echar => Some((1, Ok('\x0C'))),
            b'"' if with_echar => Some((1, Ok('"'))),
            b'\'' if with_echar => Some((1, Ok('\''))),
            b'\\' if with_echar => Some((1, Ok('\\'))),
            c => Some((
                1,
                Err((
                    position..position + 2,
                    format!("Unexpected escape character '\\{}'", char::from(c)),
                )
                    .into()),
            )),
        }
    }

    fn scan_hex_char(
        data: &[u8],
        len: usize,
        escape_char: char,
        position: usize,
    ) -> Result<Option<char>, TokenSourceError> {
        if data.len() < len {
            return Ok(None);
        }
        let mut code_point: u32 = 0;
        for (i, c) in data[..len].iter().enumerate() {
            let Some(digit) = char::from(*c).to_digit(16) else {
                let val = str::from_utf8(&data[..len]).unwrap_or_default();
                return Err((
                    position + i + 2..position + i + 3,
                    format!(
                        "The escape sequence '\\{escape_char}{val}' is not a valid hexadecimal string"
                    ),
                )
                    .into());
            };
            code_point = code_point * 16 + digit;
        }
        let c = char::from_u32(code_point).ok_or_else(|| {
            let val = str::from_utf8(&data[..len]).unwrap_or_default();
            (
                position..position + len + 2,
                format!(
                    "The escape sequence '\\{escape_char}{val}' is encoding {code_point:X} that is not a valid unicode character",
                ),
            )
        })?;
        Ok(Some(c))
    }

    fn scan_surrogate_pair(
        data: &[u8],
        position: usize,
    ) -> Result<Option<char>, TokenSourceError> {
        let Some(high_slice) = data.get(..4) else {
            return Ok(None);
        };
        let high_text = str_from_utf8(high_slice, position..position + 6)?;
        let high = u16::from_str_radix(high_text, 16).map_err(|e| {
            (
                position..position + 6,
                format!(
                    "The escape sequence '\\u{high_text}' is not a valid hexadecimal string: {e}"
                ),
            )
        })?;
        if !matches!(high, 0xD800..=0xDFFF) {
            return Err((
                position..position + 6,
                format!("The escape sequence '\\u{high_text}' is not a UTF-16 surrogate"),
            )
                .into());
        }
        match (data.get(4), data.get(5)) {
            (Some(b'\\'), Some(b'u')) => (),
            (Some(_), Some(_)) => {
                return Err((
                    position..position + 6,
                    format!(
                        "UTF-16 surrogate escape sequence '\\u{high_text}' must be followed by another surrogate escape sequence"
                    ),
                )
                    .into());
            }
            _ => return Ok(None),
        }
        let Some(low_slice) = data.get(6..10) else {
            return Ok(None);
        };
        let low_text = str_from_utf8(low_slice, position + 6..position + 12)?;
        let low = u16::from_str_radix(low_text, 16).map_err(|e| {
            (
                position + 6..position + 12,
                format!(
                    "The escape sequence '\\u{low_text}' is not a valid hexadecimal string: {e}"
                ),
            )
        })?;
        let mut decoded = char::decode_utf16([high, low]);
        let c = decoded.next().and_then(Result::ok).ok_or_else(|| {
            (
                position..position + 12,
                format!(
                    "Escape sequences '\\u{high_text}\\u{low_text}' do not form a valid UTF-16 surrogate pair"
                ),
            )
        })?;
        debug_assert_eq!(decoded.next(), None);
        Ok(Some(c))
    }

    /// Incremental UTF-8 decoding of one character, without assuming the whole
    /// window is valid UTF-8.
    fn scan_utf8_char(
        data: &[u8],
        position: usize,
    ) -> Option<Result<(char, usize), TokenSourceError>> {
        let first = *data.first()?;
        if first.is_ascii() {
            return Some(Ok((char::from(first), 1)));
        }
        let (continuation_bytes, mut code_point, mut low, mut high) = match first {
            0xC2..=0xDF => (1, u32::from(first) & 0x1F, 0x80, 0xBF),
            0xE0..=0xEF => (
                2,
                u32::from(first) & 0xF,
                if first == 0xE0 { 0xA0 } else { 0x80 },
                if first == 0xED { 0x9F } else { 0xBF },
            ),
            0xF0..=0xF4 => (
                3,
                u32::from(first) & 0x7,
                if first == 0xF0 { 0x90 } else { 0x80 },
                if first == 0xF4 { 0x8F } else { 0xBF },
            ),
            _ => {
                return Some(Err((
                    position..=position,
                    "Invalid UTF-8 character encoding",
                )
                    .into()));
            }
        };
        for i in 1..=continuation_bytes {
            let byte = *data.get(i)?;
            if byte < low || high < byte {
                return Some(Err((
                    position..=position + i,
                    "Invalid UTF-8 character encoding",
                )
                    .into()));
            }
            low = 0x80;
            high = 0xBF;
            code_point = (code_point << 6) | (u32::from(byte) & 0x3F);
        }
        Some(
            char::from_u32(code_point)
                .map(|c| (c, continuation_bytes + 1))
                .ok_or_else(|| {
                    (
                        position..=position + continuation_bytes,
                        format!("The codepoint {code_point:X} is not a valid unicode character"),
                    )
                        .into()
                }),
        )
    }
}

// [157s]  PN_CHARS_BASE  ::=  [A-Z] | [a-z] | [#x00C0-#x00D6] | [#x00D8-#x00F6] | [#x00F8-#x02FF] | [#x0370-#x037D] | [#x037F-#x1FFF] | [#x200C-#x200D] | [#x2070-#x218F] | [#x2C00-#x2FEF] | [#x3001-#xD7FF] | [#xF900-#xFDCF] | [#xFDF0-#xFFFD] | [#x10000-#xEFFFF]
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

// [158s]  PN_CHARS_U  ::=  PN_CHARS_BASE | '_'
pub(crate) fn is_pn_chars_u(c: char) -> bool {
    is_pn_chars_base(c) || c == '_'
}

// [160s]  PN_CHARS  ::=  PN_CHARS_U | '-' | [0-9] | #x00B7 | [#x0300-#x036F] | [#x203F-#x2040]
pub(crate) fn is_pn_chars(c: char) -> bool {
    is_pn_chars_u(c)
        || matches!(c,
    '-' | '0'..='9' | '\u{00B7}' | '\u{0300}'..='\u{036F}' | '\u{203F}'..='\u{2040}')
}

// Characters that are in PN_CHARS_BASE but not allowed anywhere in an IRI
fn is_pn_chars_base_but_invalid_iri(c: char) -> bool {
    matches!(c, '\u{FFF0}'..='\u{FFFD}')
        || u32::from(c) % u32::from('\u{FFFE}') == 0
        || u32::from(c) % u32::from('\u{FFFF}') == 0
}

/// Expands a prefixed name against the current prefix table, re-validating the
/// resulting IRI when the local part could have broken it.
pub(crate) fn expand_prefixed_name(
    prefix: &str,
    local: &str,
    needs_iri_check: bool,
    prefixes: &std::collections::HashMap<String, Iri<String>>,
) -> Result<lodrdf::NamedNode, String> {
    if let Some(start) = prefixes.get(prefix) {
        let iri = format!("{start}{local}");
        if needs_iri_check || start.path().is_empty() {
            // We always validate if the local part might end up in the IRI authority
            if let Err(e) = Iri::parse(iri.as_str()) {
                return Err(format!(
                    "The prefixed name {prefix}:{local} builds IRI {iri} that is invalid: {e}"
                ));
            }
        }
        Ok(lodrdf::NamedNode::new_unchecked(iri))
    } else {
        Err(format!("The prefix {prefix}: has not been declared"))
    }
}

fn str_from_utf8(data: &[u8], range: Range<usize>) -> Result<&str, TokenSourceError> {
    str::from_utf8(data).map_err(|e| {
        (
            range.start + e.valid_up_to()..min(range.end, range.start + e.valid_up_to() + 4),
            format!("Invalid UTF-8: {e}"),
        )
            .into()
    })
}

fn string_from_utf8(data: Vec<u8>, range: Range<usize>) -> Result<String, TokenSourceError> {
    String::from_utf8(data).map_err(|e| {
        (
            range.start + e.utf8_error().valid_up_to()
                ..min(range.end, range.start + e.utf8_error().valid_up_to() + 4),
            format!("Invalid UTF-8: {e}"),
        )
            .into()
    })
}
