//! The tokenizer state machine: turns physical lines into records of
//! fields. See the module-level docs in `lib.rs` for the public contract.

use compact_str::CompactString;
use log::trace;

use crate::builder::TokenizerBuilder;
use crate::config::{EscapeMode, QuoteMode, QuotedQuotePolicy, TokenizerConfig};
use crate::cursor::{CharCursor, EOL};
use crate::errors::{Result, TokenizerError};
use crate::line_feeder::{LineFeeder, LineFilter};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RecordState {
    NotEnd,
    End,
}

#[derive(Clone, Copy)]
enum FieldState {
    Begin,
    FirstTrim,
    Value,
    LastTrimOrValue,
    QuotedValue,
    AfterQuotedValue,
}

struct CurrentLine {
    text: String,
    chars: Vec<char>,
}

impl CurrentLine {
    fn new(text: String) -> Self {
        let chars = text.chars().collect();
        CurrentLine { text, chars }
    }
}

/// A snapshot of the tokenizer's progress, useful for logging and for
/// explaining why a record came from a line number other than a naive
/// running count would predict.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenizerStats {
    pub current_line_number: u64,
    pub records_parsed: u64,
    pub skipped_lines: Vec<u64>,
}

/// The streaming tokenizer state machine.
///
/// `line` and `line_pos` play the role of a [`CharCursor`]: a cursor is
/// constructed fresh for every character read rather than held as a field.
pub struct Tokenizer<I> {
    config: TokenizerConfig,
    feeder: LineFeeder<I>,
    line: Option<CurrentLine>,
    line_pos: usize,
    record_state: RecordState,
    quoted_value_lines: Vec<String>,
    was_quoted_column: bool,
    records_parsed: u64,
}

impl<I: Iterator<Item = String>> Tokenizer<I> {
    pub(crate) fn new(config: TokenizerConfig, lines: I, extra_filters: Vec<Box<dyn LineFilter>>) -> Self {
        let comment_marker = config.comment_line_marker.clone();
        Tokenizer {
            config,
            feeder: LineFeeder::new(lines, comment_marker, extra_filters),
            line: None,
            line_pos: 0,
            record_state: RecordState::End,
            quoted_value_lines: Vec::new(),
            was_quoted_column: false,
            records_parsed: 0,
        }
    }

    /// Entry point for building a tokenizer; equivalent to
    /// `TokenizerBuilder::new()`.
    pub fn builder() -> TokenizerBuilder {
        TokenizerBuilder::new()
    }

    pub fn current_line_number(&self) -> u64 {
        self.feeder.line_number()
    }

    pub fn stats(&self) -> TokenizerStats {
        TokenizerStats {
            current_line_number: self.current_line_number(),
            records_parsed: self.records_parsed,
            skipped_lines: self.feeder.skipped_lines().to_vec(),
        }
    }

    /// Unconditionally consumes and discards one upstream line, without any
    /// state-machine interpretation. Returns `false` once the upstream
    /// source (and pushback stack) are exhausted.
    pub fn skip_header_line(&mut self) -> bool {
        self.feeder.next_line(false).is_some()
    }

    /// Abandons the current record. If the tokenizer was mid-quote, the
    /// first absorbed physical line is returned and every subsequent
    /// absorbed line plus the line currently being scanned (if the
    /// upstream source hadn't already been exhausted, e.g. by an
    /// `EndOfFileInQuotedField` error) are pushed back for re-delivery.
    pub fn skip_current_line(&mut self) -> String {
        self.record_state = RecordState::End;
        if self.quoted_value_lines.is_empty() {
            let skipped = self.line.take().map(|l| l.text).unwrap_or_default();
            self.line_pos = 0;
            skipped
        } else {
            let mut absorbed = std::mem::take(&mut self.quoted_value_lines);
            let skipped = absorbed.remove(0);
            match self.line.take() {
                Some(current) => {
                    trace!(
                        "skip_current_line: returning absorbed line as skipped, pushing back {} line(s)",
                        absorbed.len() + 1
                    );
                    self.feeder.push_back(absorbed, current.text);
                }
                None if !absorbed.is_empty() => {
                    // Scanning hit true end-of-input mid-quote: there is no
                    // "current" physical line left, just the tail of what
                    // was already absorbed. The most recently absorbed one
                    // stands in for "current"; everything before it is
                    // still "absorbed_lines", in original order.
                    let current_text = absorbed.pop().expect("checked non-empty above");
                    trace!(
                        "skip_current_line: returning absorbed line as skipped, pushing back {} line(s)",
                        absorbed.len() + 1
                    );
                    self.feeder.push_back(absorbed, current_text);
                }
                None => {}
            }
            self.line_pos = 0;
            skipped
        }
    }

    /// Advances to the next record, skipping blank and comment lines.
    /// Equivalent to `next_record_with(true)`.
    pub fn next_record(&mut self) -> Result<bool> {
        self.next_record_with(true)
    }

    /// Advances to the next record with an explicit blank/comment-line skip
    /// policy. Fails if the current record has not been fully drained.
    pub fn next_record_with(&mut self, skip_blank_and_comment_lines: bool) -> Result<bool> {
        if self.record_state != RecordState::End {
            return Err(TokenizerError::RecordHasUnexpectedTrailingColumn {
                line: self.current_line_number(),
            }
            .into());
        }
        match self.feeder.next_line(skip_blank_and_comment_lines) {
            Some(text) => {
                self.set_line(text);
                self.record_state = RecordState::NotEnd;
                self.records_parsed += 1;
                Ok(true)
            }
            None => {
                self.line = None;
                Ok(false)
            }
        }
    }

    pub fn has_next_column(&self) -> bool {
        self.record_state == RecordState::NotEnd
    }

    /// Extracts the next field as a raw string. Fails if the current record
    /// has already ended.
    pub fn next_column(&mut self) -> Result<String> {
        if !self.has_next_column() {
            return Err(TokenizerError::RecordDoesNotHaveExpectedColumn {
                line: self.current_line_number(),
            }
            .into());
        }
        let field = self.scan_next_field()?;
        // A successfully-delivered field is no longer "in progress": clear
        // its absorbed-line trail so a later skip_current_line() call only
        // ever sees lines belonging to a column that hasn't been read yet.
        self.quoted_value_lines.clear();
        Ok(field)
    }

    /// Like [`Tokenizer::next_column`], but applies the configured
    /// null-string semantics (or, absent a configured null string, treats
    /// an empty *unquoted* field as null).
    pub fn next_column_or_null(&mut self) -> Result<Option<String>> {
        let raw = self.next_column()?;
        match &self.config.null_string {
            Some(marker) => {
                if &raw == marker {
                    Ok(None)
                } else {
                    Ok(Some(raw))
                }
            }
            None => {
                if raw.is_empty() && !self.was_quoted_column {
                    Ok(None)
                } else {
                    Ok(Some(raw))
                }
            }
        }
    }

    pub fn was_quoted_column(&self) -> bool {
        self.was_quoted_column
    }

    fn set_line(&mut self, text: String) {
        self.line = Some(CurrentLine::new(text));
        self.line_pos = 0;
    }

    fn line_chars(&self) -> &[char] {
        &self
            .line
            .as_ref()
            .expect("CharCursor operation invoked after end of input")
            .chars
    }

    /// Reads the character at `line_pos` and advances, returning `EOL` past
    /// the end of the line.
    fn advance(&mut self) -> char {
        let line = self
            .line
            .as_ref()
            .expect("CharCursor operation invoked after end of input");
        CharCursor::new(&line.chars).next(&mut self.line_pos)
    }

    fn peek_char(&self) -> char {
        CharCursor::new(self.line_chars()).peek(self.line_pos)
    }

    fn slice(&self, start: usize, end: usize) -> String {
        self.line_chars()[start..end].iter().collect()
    }

    fn flush_into(&self, buffer: &mut CompactString, start: usize, end: usize) {
        for &c in &self.line_chars()[start..end] {
            buffer.push(c);
        }
    }

    fn is_quote(&self, c: char) -> bool {
        matches!(self.config.quote, QuoteMode::Enabled(q) if q == c)
    }

    fn is_escape(&self, c: char) -> bool {
        matches!(self.config.escape, EscapeMode::Enabled(e) if e == c) && !self.is_quote(c)
    }

    fn quote_char(&self) -> char {
        match self.config.quote {
            QuoteMode::Enabled(q) => q,
            QuoteMode::Disabled => EOL,
        }
    }

    /// Returns `true` if `c` is the delimiter's head character and, when
    /// the delimiter is multi-character, the following substring also
    /// matches, in which case `line_pos` is advanced past it. No
    /// backtracking: a head match with a failing tail leaves `c` to be
    /// treated as an ordinary character.
    fn try_consume_delimiter(&mut self, c: char) -> bool {
        if c != self.config.delimiter.head {
            return false;
        }
        let tail_len = self.config.delimiter.tail.len();
        if tail_len == 0 {
            return true;
        }
        let end = self.line_pos + tail_len;
        let matched = {
            let line = self
                .line
                .as_ref()
                .expect("CharCursor operation invoked after end of input");
            end <= line.chars.len() && line.chars[self.line_pos..end] == self.config.delimiter.tail[..]
        };
        if matched {
            self.line_pos = end;
        }
        matched
    }

    /// Non-mutating peek: would the character at `pos` (and, for a
    /// multi-character delimiter, the substring following it) form a
    /// delimiter boundary, or is it `EOL`?
    fn peeks_like_delimiter_or_eol_at(&self, pos: usize) -> bool {
        let line = self
            .line
            .as_ref()
            .expect("CharCursor operation invoked after end of input");
        let c = CharCursor::new(&line.chars).peek(pos);
        if c == EOL {
            return true;
        }
        if c != self.config.delimiter.head {
            return false;
        }
        let tail = &self.config.delimiter.tail;
        if tail.is_empty() {
            return true;
        }
        let start = pos + 1;
        let end = start + tail.len();
        end <= line.chars.len() && line.chars[start..end] == tail[..]
    }

    fn check_quoted_size(&self, value_start: usize, quoted_buffer: &CompactString) -> Result<()> {
        let current_len = (self.line_pos - value_start) + quoted_buffer.chars().count();
        if current_len > self.config.max_quoted_field_length {
            return Err(TokenizerError::QuotedFieldLengthLimitExceeded {
                limit: self.config.max_quoted_field_length,
                line: self.current_line_number(),
            }
            .into());
        }
        Ok(())
    }

    fn scan_next_field(&mut self) -> Result<String> {
        self.was_quoted_column = false;
        self.quoted_value_lines.clear();

        let mut state = FieldState::Begin;
        let mut value_start = self.line_pos;
        let mut value_end = self.line_pos;
        let mut quoted_buffer = CompactString::default();

        loop {
            let pos_before = self.line_pos;
            let c = self.advance();

            state = match state {
                FieldState::Begin => {
                    if self.try_consume_delimiter(c) {
                        return Ok(String::new());
                    } else if c == EOL {
                        self.record_state = RecordState::End;
                        return Ok(String::new());
                    } else if c == ' ' && self.config.trim_if_not_quoted {
                        FieldState::FirstTrim
                    } else if self.is_quote(c) {
                        self.was_quoted_column = true;
                        quoted_buffer = CompactString::default();
                        value_start = self.line_pos;
                        FieldState::QuotedValue
                    } else {
                        value_start = pos_before;
                        FieldState::Value
                    }
                }
                FieldState::FirstTrim => {
                    if self.try_consume_delimiter(c) {
                        return Ok(String::new());
                    } else if c == EOL {
                        self.record_state = RecordState::End;
                        return Ok(String::new());
                    } else if c == ' ' {
                        FieldState::FirstTrim
                    } else if self.is_quote(c) {
                        self.was_quoted_column = true;
                        quoted_buffer = CompactString::default();
                        value_start = self.line_pos;
                        FieldState::QuotedValue
                    } else {
                        value_start = pos_before;
                        FieldState::Value
                    }
                }
                FieldState::Value => {
                    if self.try_consume_delimiter(c) {
                        return Ok(self.slice(value_start, pos_before));
                    } else if c == EOL {
                        self.record_state = RecordState::End;
                        return Ok(self.slice(value_start, self.line_pos));
                    } else if c == ' ' && self.config.trim_if_not_quoted {
                        value_end = pos_before;
                        FieldState::LastTrimOrValue
                    } else {
                        FieldState::Value
                    }
                }
                FieldState::LastTrimOrValue => {
                    if self.try_consume_delimiter(c) {
                        return Ok(self.slice(value_start, value_end));
                    } else if c == EOL {
                        self.record_state = RecordState::End;
                        return Ok(self.slice(value_start, value_end));
                    } else if c == ' ' {
                        FieldState::LastTrimOrValue
                    } else {
                        FieldState::Value
                    }
                }
                FieldState::QuotedValue => {
                    if c == EOL {
                        self.flush_into(&mut quoted_buffer, value_start, self.line_pos);
                        quoted_buffer.push_str(self.config.newline.as_str());
                        let finished_text = self
                            .line
                            .take()
                            .expect("line present while scanning a quoted value")
                            .text;
                        self.quoted_value_lines.push(finished_text);
                        match self.feeder.next_line(false) {
                            Some(text) => {
                                trace!(
                                    "quoted field spans line {}, absorbing next physical line",
                                    self.current_line_number()
                                );
                                self.set_line(text);
                            }
                            None => {
                                return Err(TokenizerError::EndOfFileInQuotedField {
                                    line: self.current_line_number(),
                                }
                                .into())
                            }
                        }
                        value_start = 0;
                        FieldState::QuotedValue
                    } else if self.is_quote(c) {
                        let next = self.peek_char();
                        let doubled = self.is_quote(next);
                        if doubled
                            && (self.config.quoted_quote_policy == QuotedQuotePolicy::Rfc4180Only
                                || !self.peeks_like_delimiter_or_eol_at(self.line_pos + 1))
                        {
                            self.flush_into(&mut quoted_buffer, value_start, self.line_pos);
                            self.advance(); // consume the paired quote
                            value_start = self.line_pos;
                            FieldState::QuotedValue
                        } else if self.config.quoted_quote_policy
                            == QuotedQuotePolicy::AcceptStrayAssumingNoDelimitersInFields
                            && !self.peeks_like_delimiter_or_eol_at(self.line_pos)
                        {
                            self.check_quoted_size(value_start, &quoted_buffer)?;
                            FieldState::QuotedValue
                        } else {
                            self.flush_into(&mut quoted_buffer, value_start, pos_before);
                            FieldState::AfterQuotedValue
                        }
                    } else if self.is_escape(c) {
                        let next = self.peek_char();
                        if self.is_quote(next) || self.is_escape(next) {
                            self.flush_into(&mut quoted_buffer, value_start, pos_before);
                            quoted_buffer.push(next);
                            self.advance(); // consume the escaped character
                            value_start = self.line_pos;
                        } else {
                            self.check_quoted_size(value_start, &quoted_buffer)?;
                        }
                        FieldState::QuotedValue
                    } else {
                        self.check_quoted_size(value_start, &quoted_buffer)?;
                        FieldState::QuotedValue
                    }
                }
                FieldState::AfterQuotedValue => {
                    if self.try_consume_delimiter(c) {
                        return Ok(quoted_buffer.to_string());
                    } else if c == EOL {
                        self.record_state = RecordState::End;
                        return Ok(quoted_buffer.to_string());
                    } else if c == ' ' {
                        FieldState::AfterQuotedValue
                    } else {
                        return Err(TokenizerError::InvalidCharacterAfterQuote {
                            found: c,
                            quote: self.quote_char(),
                            line: self.current_line_number(),
                        }
                        .into());
                    }
                }
            };
        }
    }
}
