//! A streaming, RFC 4180-ish delimited-text tokenizer.
//!
//! [`TokenizerBuilder`] configures the dialect (delimiter, quoting,
//! escaping, trimming, null markers, comment lines, ...) and binds it to
//! any `Iterator<Item = String>` of physical lines, producing a
//! [`Tokenizer`] that yields one record at a time, one column at a time,
//! without ever materializing the whole input in memory.
//!
//! ```
//! use dsv_tokenizer::TokenizerBuilder;
//!
//! let lines = vec!["name,age".to_string(), "ferris,1".to_string()];
//! let mut tokenizer = TokenizerBuilder::new().build(lines.into_iter()).unwrap();
//!
//! while tokenizer.next_record().unwrap() {
//!     let mut record = Vec::new();
//!     while tokenizer.has_next_column() {
//!         record.push(tokenizer.next_column().unwrap());
//!     }
//!     println!("{record:?}");
//! }
//! ```

mod builder;
mod config;
mod cursor;
mod errors;
mod line_feeder;
mod tokenizer;

pub use builder::TokenizerBuilder;
pub use config::{EscapeMode, Newline, QuoteMode, QuotedQuotePolicy};
pub use errors::{ConfigError, Error, Result, TokenizerError};
pub use line_feeder::{LineFilter, SkipLinesFromStart, SkipLinesStartingWith, TakeLinesStartingWith};
pub use tokenizer::{Tokenizer, TokenizerStats};
