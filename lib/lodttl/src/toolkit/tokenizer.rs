use crate::toolkit::error::{SyntaxError, TextPosition};
use memchr::{memchr2, memrchr};
use std::borrow::Cow;
use std::cmp::min;
use std::io::{self, Read};
use std::ops::{Deref, Range, RangeInclusive};

/// A token recognizer over a byte window.
///
/// Implementations must be incremental: when the bytes seen so far could still be
/// extended into a longer token and the stream is not ending, they return `None`
/// so the [`Tokenizer`] can fetch more data. This is what makes token boundaries
/// independent of how the input is chunked.
pub trait TokenSource {
    type Token<'a>
    where
        Self: 'a;
    type Options: Default;

    /// Tries to recognize the token starting at `data[0]`.
    ///
    /// Returns the number of consumed bytes together with the token or an error,
    /// or `None` if more data is needed. Must consume at least one byte when
    /// returning `Some`.
    fn recognize_next_token<'a>(
        &mut self,
        data: &'a [u8],
        is_ending: bool,
        options: &Self::Options,
    ) -> Option<(usize, Result<Self::Token<'a>, TokenSourceError>)>;
}

/// An error raised by a [`TokenSource`], with a byte range relative to the token start.
pub struct TokenSourceError {
    pub location: Range<usize>,
    pub message: String,
}

impl<S: Into<String>> From<(Range<usize>, S)> for TokenSourceError {
    fn from((location, message): (Range<usize>, S)) -> Self {
        Self {
            location,
            message: message.into(),
        }
    }
}

#[allow(clippy::range_plus_one)]
impl<S: Into<String>> From<(RangeInclusive<usize>, S)> for TokenSourceError {
    fn from((location, message): (RangeInclusive<usize>, S)) -> Self {
        (*location.start()..*location.end() + 1, message).into()
    }
}

impl<S: Into<String>> From<(usize, S)> for TokenSourceError {
    fn from((location, message): (usize, S)) -> Self {
        (location..=location, message).into()
    }
}

#[derive(Clone, Copy)]
struct BufferPosition {
    line_start_buffer_offset: usize,
    buffer_offset: usize,
    /// Code points of the current line that were dropped by a buffer shrink.
    chars_before_line_start: u64,
    global_offset: u64,
    global_line: u64,
}

/// Incremental tokenizer: owns the byte buffer, skips whitespace and comments,
/// and tracks line/column/offset positions.
///
/// Data is fed either chunk by chunk with [`Tokenizer::push`] then [`Tokenizer::end`]
/// (the chunk size is irrelevant, one byte at a time works), or from a [`Read`]
/// with [`Tokenizer::fill_from_reader`].
pub struct Tokenizer<B, S: TokenSource> {
    source: S,
    data: B,
    position: BufferPosition,
    previous_position: BufferPosition,
    is_ending: bool,
    min_buffer_size: usize,
    max_buffer_size: usize,
    is_line_jump_whitespace: bool,
    line_comment_start: Option<&'static [u8]>,
}

impl<B, S: TokenSource> Tokenizer<B, S> {
    fn starting_position() -> BufferPosition {
        BufferPosition {
            line_start_buffer_offset: 0,
            buffer_offset: 0,
            chars_before_line_start: 0,
            global_offset: 0,
            global_line: 0,
        }
    }
}

impl<S: TokenSource> Tokenizer<Vec<u8>, S> {
    pub fn new(
        source: S,
        min_buffer_size: usize,
        max_buffer_size: usize,
        is_line_jump_whitespace: bool,
        line_comment_start: Option<&'static [u8]>,
    ) -> Self {
        Self {
            source,
            data: Vec::new(),
            position: Self::starting_position(),
            previous_position: Self::starting_position(),
            is_ending: false,
            min_buffer_size,
            max_buffer_size,
            is_line_jump_whitespace,
            line_comment_start,
        }
    }

    /// Appends a chunk of data to the buffer. Any chunk size works.
    pub fn push(&mut self, other: &[u8]) {
        self.shrink_data();
        self.data.extend_from_slice(other);
    }

    /// Tells the tokenizer that no more data will arrive.
    ///
    /// End of stream is idempotent: once every buffered token has been returned,
    /// [`Tokenizer::next_token`] keeps returning `None`.
    #[inline]
    pub fn end(&mut self) {
        self.is_ending = true;
    }

    /// Fills the buffer with a single `read` call, marking the end of the
    /// stream when the reader returns 0 bytes.
    pub fn fill_from_reader(&mut self, reader: &mut impl Read) -> io::Result<()> {
        self.shrink_data();
        if self.data.len() == self.max_buffer_size {
            return Err(io::Error::new(
                io::ErrorKind::OutOfMemory,
                format!(
                    "Reached the buffer maximal size of {}",
                    self.max_buffer_size
                ),
            ));
        }
        let min_end = min(self.data.len() + self.min_buffer_size, self.max_buffer_size);
        let new_start = self.data.len();
        self.data.resize(min_end, 0);
        if self.data.len() < self.data.capacity() {
            // We keep extending to have as much space as available without reallocation
            self.data.resize(self.data.capacity(), 0);
        }
        let read = reader.read(&mut self.data[new_start..])?;
        self.data.truncate(new_start + read);
        self.is_ending = read == 0;
        Ok(())
    }

    fn shrink_data(&mut self) {
        let shift = self.position.buffer_offset;
        if shift == 0 {
            return;
        }
        if self.position.line_start_buffer_offset < shift {
            self.position.chars_before_line_start += count_code_points(
                &self.data[self.position.line_start_buffer_offset..shift],
            );
            self.position.line_start_buffer_offset = 0;
        } else {
            self.position.line_start_buffer_offset -= shift;
        }
        self.data.copy_within(shift.., 0);
        self.data.truncate(self.data.len() - shift);
        self.position.buffer_offset = 0;
        self.previous_position = self.position;
    }
}

impl<'a, S: TokenSource> Tokenizer<&'a [u8], S> {
    /// Builds a tokenizer over a complete in-memory document.
    pub fn from_slice(
        source: S,
        data: &'a [u8],
        is_line_jump_whitespace: bool,
        line_comment_start: Option<&'static [u8]>,
    ) -> Self {
        Self {
            source,
            data,
            position: Self::starting_position(),
            previous_position: Self::starting_position(),
            is_ending: true,
            min_buffer_size: 0,
            max_buffer_size: usize::MAX,
            is_line_jump_whitespace,
            line_comment_start,
        }
    }
}

impl<B: Deref<Target = [u8]>, S: TokenSource> Tokenizer<B, S> {
    /// Returns the next token, consuming it.
    ///
    /// `None` means either that more data is needed or, if [`Tokenizer::is_end`]
    /// holds, that the stream is finished.
    pub fn next_token(&mut self, options: &S::Options) -> Option<Result<S::Token<'_>, SyntaxError>> {
        self.skip_whitespaces_and_comments()?;
        self.previous_position = self.position;
        let Some((consumed, result)) = self.source.recognize_next_token(
            &self.data[self.position.buffer_offset..],
            self.is_ending,
            options,
        ) else {
            return if self.is_ending {
                if self.position.buffer_offset == self.data.len() {
                    None // We have finished
                } else {
                    let start = self.text_position_for(self.position);
                    // Only `self.position` may be touched here, the recognized
                    // token still borrows `self.data`
                    self.position = advanced(
                        self.position,
                        &self.data,
                        self.data.len() - self.position.buffer_offset,
                    );
                    let end = self.text_position_for(self.position);
                    Some(Err(SyntaxError::new(start..end, "Unexpected end of file")))
                }
            } else {
                None
            };
        };
        debug_assert!(
            consumed > 0,
            "The token source must consume at least one byte each time"
        );
        debug_assert!(
            self.position.buffer_offset + consumed <= self.data.len(),
            "The token source tried to consume {consumed} bytes but only {} bytes are readable",
            self.data.len() - self.position.buffer_offset
        );
        let token_start = self.position;
        // Written out instead of a `&mut self` helper call so the borrow of the
        // token returned below stays limited to `self.data`
        self.position = advanced(self.position, &self.data, consumed);
        match result {
            Ok(token) => Some(Ok(token)),
            Err(e) => {
                let start_offset = min(e.location.start, consumed);
                let end_offset = min(e.location.end, consumed);
                let error_start =
                    self.text_position_for(advanced(token_start, &self.data, start_offset));
                let error_end =
                    self.text_position_for(advanced(token_start, &self.data, end_offset));
                Some(Err(SyntaxError::new(error_start..error_end, e.message)))
            }
        }
    }

    /// Looks at the next token without consuming it.
    ///
    /// Repeated calls return the same token until [`Tokenizer::next_token`] is called.
    pub fn peek_token(&mut self, options: &S::Options) -> Option<Result<S::Token<'_>, SyntaxError>> {
        self.skip_whitespaces_and_comments()?;
        let (consumed, result) = self.source.recognize_next_token(
            &self.data[self.position.buffer_offset..],
            self.is_ending,
            options,
        )?;
        match result {
            Ok(token) => Some(Ok(token)),
            Err(e) => {
                let start_offset = min(e.location.start, consumed);
                let end_offset = min(e.location.end, consumed);
                let error_start =
                    self.text_position_for(advanced(self.position, &self.data, start_offset));
                let error_end =
                    self.text_position_for(advanced(self.position, &self.data, end_offset));
                Some(Err(SyntaxError::new(error_start..error_end, e.message)))
            }
        }
    }

    pub fn is_end(&self) -> bool {
        self.is_ending && self.data.len() == self.position.buffer_offset
    }

    /// The position of the last token returned by [`Tokenizer::next_token`].
    pub fn last_token_location(&self) -> Range<TextPosition> {
        self.text_position_for(self.previous_position)..self.text_position_for(self.position)
    }

    /// The source text of the last token returned by [`Tokenizer::next_token`].
    pub fn last_token_source(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(
            &self.data[self.previous_position.buffer_offset..self.position.buffer_offset],
        )
    }

    /// The position right after the last consumed token.
    pub fn current_position(&self) -> TextPosition {
        self.text_position_for(self.position)
    }

    fn text_position_for(&self, position: BufferPosition) -> TextPosition {
        TextPosition {
            line: position.global_line,
            column: position.chars_before_line_start
                + count_code_points(
                    &self.data[position.line_start_buffer_offset..position.buffer_offset],
                ),
            offset: position.global_offset,
        }
    }

    fn advance_position(&mut self, consumed: usize) {
        self.position = advanced(self.position, &self.data, consumed);
    }

    fn skip_whitespaces_and_comments(&mut self) -> Option<()> {
        loop {
            self.skip_whitespaces();
            let Some(line_comment_start) = self.line_comment_start else {
                return Some(());
            };
            let start = self.position.buffer_offset;
            if !self.data[start..].starts_with(line_comment_start) {
                return Some(());
            }
            // The comment ends before the line jump so the line jump can be a token
            if let Some(end) = memchr2(b'\r', b'\n', &self.data[start + line_comment_start.len()..])
            {
                self.advance_position(end + line_comment_start.len());
                continue;
            }
            if self.is_ending {
                let remaining = self.data.len() - start;
                self.advance_position(remaining); // EOF
                return Some(());
            }
            return None; // We need more data
        }
    }

    fn skip_whitespaces(&mut self) {
        let whitespace_len = self.data[self.position.buffer_offset..]
            .iter()
            .take_while(|&&c| {
                matches!(c, b' ' | b'\t')
                    || (self.is_line_jump_whitespace && matches!(c, b'\r' | b'\n'))
            })
            .count();
        self.advance_position(whitespace_len);
    }
}

fn advanced(mut position: BufferPosition, data: &[u8], consumed: usize) -> BufferPosition {
    let consumed_data = &data[position.buffer_offset..position.buffer_offset + consumed];
    if let Some(last_line_jump) = memrchr(b'\n', consumed_data) {
        position.global_line += consumed_data
            .iter()
            .filter(|c| **c == b'\n')
            .count() as u64;
        position.line_start_buffer_offset = position.buffer_offset + last_line_jump + 1;
        position.chars_before_line_start = 0;
    }
    position.buffer_offset += consumed;
    position.global_offset += consumed as u64;
    position
}

/// Counts code points without a full UTF-8 decode: continuation bytes are skipped.
fn count_code_points(data: &[u8]) -> u64 {
    data.iter().filter(|b| (**b & 0xC0) != 0x80).count() as u64
}
