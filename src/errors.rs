use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Top-level error type for everything this crate can fail with.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Tokenize(#[from] TokenizerError),
}

/// Raised by [`crate::builder::TokenizerBuilder::build`] when the accumulated
/// configuration is not internally consistent.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("delimiter must be a non-empty string")]
    EmptyDelimiter,
    #[error(
        "trim_if_not_quoted=true is incompatible with the accept-stray-quotes policy, \
         because trimming trailing spaces off a field that may contain stray quotes \
         makes the quote/delimiter tie-break ambiguous"
    )]
    TrimIncompatibleWithStrayQuotePolicy,
}

/// Raised while tokenizing a record.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TokenizerError {
    #[error("next_record called at line {line} before the current record was fully drained")]
    RecordHasUnexpectedTrailingColumn { line: u64 },
    #[error("next_column called at line {line} after the current record had already ended")]
    RecordDoesNotHaveExpectedColumn { line: u64 },
    #[error("end of input while scanning a quoted field that started at line {line}")]
    EndOfFileInQuotedField { line: u64 },
    #[error("invalid character {found:?} after closing quote {quote:?} at line {line}")]
    InvalidCharacterAfterQuote { found: char, quote: char, line: u64 },
    #[error("quoted field at line {line} exceeded the {limit}-character length limit")]
    QuotedFieldLengthLimitExceeded { limit: usize, line: u64 },
}
