//! Validating, fluently-chained construction of a [`Tokenizer`].

use crate::config::{
    Delimiter, EscapeMode, Newline, QuoteMode, QuotedQuotePolicy, TokenizerConfig,
    DEFAULT_MAX_QUOTED_FIELD_LENGTH,
};
use crate::errors::{ConfigError, Result};
use crate::line_feeder::LineFilter;
use crate::tokenizer::Tokenizer;

/// Accumulates tokenizer configuration and, on [`TokenizerBuilder::build`],
/// validates it and binds it to a concrete line source.
///
/// Mirrors the mutably-chained builder convention (`fn opt(&mut self, ..)
/// -> &mut Self`) used throughout this crate's reference implementation,
/// rather than a consuming `self -> Self` builder.
pub struct TokenizerBuilder {
    delimiter: String,
    quote: QuoteMode,
    escape: EscapeMode,
    newline: Newline,
    trim_if_not_quoted: bool,
    quoted_quote_policy: QuotedQuotePolicy,
    max_quoted_field_length: usize,
    comment_line_marker: Option<String>,
    null_string: Option<String>,
    extra_filters: Vec<Box<dyn LineFilter>>,
}

impl TokenizerBuilder {
    pub fn new() -> Self {
        TokenizerBuilder {
            delimiter: ",".to_string(),
            quote: QuoteMode::default(),
            escape: EscapeMode::default(),
            newline: Newline::default(),
            trim_if_not_quoted: false,
            quoted_quote_policy: QuotedQuotePolicy::default(),
            max_quoted_field_length: DEFAULT_MAX_QUOTED_FIELD_LENGTH,
            comment_line_marker: None,
            null_string: None,
            extra_filters: Vec::new(),
        }
    }

    pub fn delimiter<S: Into<String>>(&mut self, delimiter: S) -> &mut Self {
        self.delimiter = delimiter.into();
        self
    }

    pub fn quote(&mut self, quote: QuoteMode) -> &mut Self {
        self.quote = quote;
        self
    }

    pub fn escape(&mut self, escape: EscapeMode) -> &mut Self {
        self.escape = escape;
        self
    }

    pub fn newline(&mut self, newline: Newline) -> &mut Self {
        self.newline = newline;
        self
    }

    pub fn trim_if_not_quoted(&mut self, trim: bool) -> &mut Self {
        self.trim_if_not_quoted = trim;
        self
    }

    pub fn quotes_in_quoted_fields(&mut self, policy: QuotedQuotePolicy) -> &mut Self {
        self.quoted_quote_policy = policy;
        self
    }

    pub fn max_quoted_field_length(&mut self, limit: usize) -> &mut Self {
        self.max_quoted_field_length = limit;
        self
    }

    pub fn comment_line_marker<S: Into<String>>(&mut self, marker: S) -> &mut Self {
        self.comment_line_marker = Some(marker.into());
        self
    }

    pub fn null_string<S: Into<String>>(&mut self, marker: S) -> &mut Self {
        self.null_string = Some(marker.into());
        self
    }

    /// Registers an additional line filter (see
    /// [`crate::line_feeder::LineFilter`]), evaluated alongside the
    /// built-in blank-line and comment-marker policy.
    pub fn add_line_filter(&mut self, filter: Box<dyn LineFilter>) -> &mut Self {
        self.extra_filters.push(filter);
        self
    }

    /// Validates the accumulated configuration and constructs a
    /// [`Tokenizer`] bound to `lines`.
    pub fn build<I: Iterator<Item = String>>(&mut self, lines: I) -> Result<Tokenizer<I>> {
        let delimiter = Delimiter::parse(&self.delimiter).ok_or(ConfigError::EmptyDelimiter)?;

        if self.trim_if_not_quoted
            && self.quoted_quote_policy
                == QuotedQuotePolicy::AcceptStrayAssumingNoDelimitersInFields
        {
            return Err(ConfigError::TrimIncompatibleWithStrayQuotePolicy.into());
        }

        let config = TokenizerConfig {
            delimiter,
            quote: self.quote,
            escape: self.escape,
            newline: self.newline,
            trim_if_not_quoted: self.trim_if_not_quoted,
            quoted_quote_policy: self.quoted_quote_policy,
            max_quoted_field_length: self.max_quoted_field_length,
            comment_line_marker: std::mem::take(&mut self.comment_line_marker),
            null_string: std::mem::take(&mut self.null_string),
        };

        Ok(Tokenizer::new(
            config,
            lines,
            std::mem::take(&mut self.extra_filters),
        ))
    }
}

impl Default for TokenizerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_delimiter_is_rejected() {
        let err = TokenizerBuilder::new()
            .delimiter("")
            .build(std::iter::empty())
            .unwrap_err();
        assert_eq!(err, ConfigError::EmptyDelimiter.into());
    }

    #[test]
    fn trim_with_stray_quote_policy_is_rejected() {
        let err = TokenizerBuilder::new()
            .trim_if_not_quoted(true)
            .quotes_in_quoted_fields(QuotedQuotePolicy::AcceptStrayAssumingNoDelimitersInFields)
            .build(std::iter::empty())
            .unwrap_err();
        assert_eq!(
            err,
            ConfigError::TrimIncompatibleWithStrayQuotePolicy.into()
        );
    }

    #[test]
    fn defaults_build_successfully() {
        let tokenizer = TokenizerBuilder::new().build(std::iter::empty());
        assert!(tokenizer.is_ok());
    }
}
