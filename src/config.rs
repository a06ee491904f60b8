//! Immutable configuration types, as validated and produced by
//! [`crate::builder::TokenizerBuilder`].

/// How a quoted field's value may be delimited.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuoteMode {
    /// Quoting is enabled; fields may be enclosed in `char`.
    Enabled(char),
    /// Quoting is disabled entirely; a quote character has no special meaning.
    Disabled,
}

impl Default for QuoteMode {
    fn default() -> Self {
        QuoteMode::Enabled('"')
    }
}

/// The escape character used inside quoted fields, if any.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EscapeMode {
    Enabled(char),
    Disabled,
}

impl Default for EscapeMode {
    fn default() -> Self {
        EscapeMode::Enabled('\\')
    }
}

/// Line terminator reinserted between physical lines absorbed into a
/// multi-line quoted field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Newline {
    CrLf,
    Cr,
    Lf,
}

impl Newline {
    pub fn as_str(self) -> &'static str {
        match self {
            Newline::CrLf => "\r\n",
            Newline::Cr => "\r",
            Newline::Lf => "\n",
        }
    }
}

impl Default for Newline {
    fn default() -> Self {
        Newline::CrLf
    }
}

/// What to do about a quote character found inside a quoted field that is
/// not part of a well-formed RFC 4180 doubled-quote pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuotedQuotePolicy {
    /// Only doubled quotes (`""`) are accepted inside a quoted field; any
    /// other quote closes the field.
    Rfc4180Only,
    /// A quote not immediately followed by a delimiter or end-of-line is
    /// assumed to be a literal, stray quote rather than a closing quote.
    /// Only safe to use when fields are known not to contain the delimiter
    /// character themselves.
    AcceptStrayAssumingNoDelimitersInFields,
}

impl Default for QuotedQuotePolicy {
    fn default() -> Self {
        QuotedQuotePolicy::Rfc4180Only
    }
}

/// A (possibly multi-character) field delimiter, split into the character
/// scanned directly by the state machine and the literal suffix that must
/// follow it for a delimiter boundary to be recognized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Delimiter {
    pub head: char,
    pub tail: Vec<char>,
}

impl Delimiter {
    pub fn parse(raw: &str) -> Option<Self> {
        let mut chars = raw.chars();
        let head = chars.next()?;
        let tail = chars.collect();
        Some(Delimiter { head, tail })
    }
}

/// The full, validated configuration of a [`crate::tokenizer::Tokenizer`].
#[derive(Debug, Clone)]
pub struct TokenizerConfig {
    pub(crate) delimiter: Delimiter,
    pub(crate) quote: QuoteMode,
    pub(crate) escape: EscapeMode,
    pub(crate) newline: Newline,
    pub(crate) trim_if_not_quoted: bool,
    pub(crate) quoted_quote_policy: QuotedQuotePolicy,
    pub(crate) max_quoted_field_length: usize,
    pub(crate) comment_line_marker: Option<String>,
    pub(crate) null_string: Option<String>,
}

pub(crate) const DEFAULT_MAX_QUOTED_FIELD_LENGTH: usize = 131_072;
