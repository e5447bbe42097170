//! CJK bigram analysis and FST term dictionaries for full-text search.
//!
//! Two subsystems, one data path. The analysis chain turns raw CJK/mixed
//! text into a stream of bigram tokens with honest offsets and positions;
//! the FST engine turns the sorted term set that indexing produces into a
//! compact term dictionary with exact lookup, sorted enumeration with seek,
//! and ordinal reverse lookup.
//!
//! # Architecture
//!
//! ```text
//! ┌────────────────┐   ┌─────────────────┐   ┌──────────────┐   ┌────────────┐
//! │ ScriptTokenizer│──▶│ WidthNormalizer │──▶│ BigramFormer │──▶│ StopFilter │
//! │  (token.rs)    │   │   (width.rs)    │   │ (bigram.rs)  │   │(analyzer.rs│
//! └────────────────┘   └─────────────────┘   └──────────────┘   └────────────┘
//!                                                                      │ terms
//!                                                                      ▼
//!                      ┌─────────────────┐   ┌──────────────────────────────┐
//!                      │  fst::Builder   │──▶│ fst::Fst  (lookup, enum,     │
//!                      │ (sorted input)  │   │  seek, get_by_output, save)  │
//!                      └─────────────────┘   └──────────────────────────────┘
//!                                                         │
//!                                                         ▼
//!                                            ┌──────────────────────┐
//!                                            │    TermDictionary    │
//!                                            │    (dictionary.rs)   │
//!                                            └──────────────────────┘
//! ```
//!
//! # Usage
//!
//! ```
//! use mojigram::{CjkAnalyzer, TermDictionary};
//! use std::collections::BTreeSet;
//!
//! let analyzer = CjkAnalyzer::new();
//! let mut terms: BTreeSet<String> = BTreeSet::new();
//! for token in analyzer.analyze("京都大学で検索") {
//!     terms.insert(token.text_string());
//! }
//!
//! let dict = TermDictionary::build(&terms).unwrap();
//! let ord = dict.ord("検索").unwrap();
//! assert_eq!(dict.term(ord).as_deref(), Some("検索"));
//! ```
//!
//! The compiled structures are write-once: build (or load) on one thread,
//! then traverse read-only from as many threads as you like, each with its
//! own cursor.

// Module declarations
mod analyzer;
mod bigram;
mod dictionary;
pub mod fst;
mod token;
mod width;

// Re-exports for public API
pub use analyzer::{default_stopwords, CjkAnalyzer, CjkTokenStream, LowercaseFilter, StopFilter};
pub use bigram::{BigramFormer, CodepointBuffer};
pub use dictionary::{TermDictionary, TermIter};
pub use fst::{
    byte_labels, codepoint_labels, get_by_output, Builder, BuilderOptions, BytesOutputs, Fst,
    FstEnum, FstError, InputMode, LongOutputs, NoOutputs, OutputAlgebra, PairOutputs,
};
pub use token::{classify, collect_tokens, Script, ScriptSet, ScriptTokenizer, Token, TokenStream, TokenType};
pub use width::{fold_width, WidthNormalizer};
