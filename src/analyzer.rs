// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! The assembled CJK analysis chain.
//!
//! [`CjkAnalyzer`] wires the full pipeline the way the index builder and the
//! CLI consume it:
//!
//! ```text
//! ScriptTokenizer -> WidthNormalizer -> LowercaseFilter -> BigramFormer -> StopFilter
//! ```
//!
//! Width folding runs before bigramming so halfwidth kana pair correctly;
//! stopword removal runs last so English function words are dropped after
//! they have already isolated the CJK runs around them.

use std::collections::HashSet;
use std::sync::{Arc, OnceLock};

use crate::bigram::BigramFormer;
use crate::token::{ScriptSet, ScriptTokenizer, Token, TokenStream};
use crate::width::WidthNormalizer;

// ============================================================================
// LOWERCASE FILTER
// ============================================================================

/// Lowercases token text in place. CJK codepoints are unaffected.
pub struct LowercaseFilter<S: TokenStream> {
    inner: S,
}

impl<S: TokenStream> LowercaseFilter<S> {
    pub fn new(inner: S) -> LowercaseFilter<S> {
        LowercaseFilter { inner }
    }
}

impl<S: TokenStream> TokenStream for LowercaseFilter<S> {
    fn advance(&mut self) -> bool {
        if !self.inner.advance() {
            return false;
        }
        let text = &mut self.inner.token_mut().text;
        let needs_work = text.iter().any(|&cp| {
            char::from_u32(cp).map_or(false, |c| c.is_uppercase())
        });
        if needs_work {
            let lowered: Vec<u32> = text
                .iter()
                .flat_map(|&cp| match char::from_u32(cp) {
                    Some(c) => c.to_lowercase().map(|l| l as u32).collect::<Vec<_>>(),
                    None => vec![cp],
                })
                .collect();
            *text = lowered;
        }
        true
    }

    fn token(&self) -> &Token {
        self.inner.token()
    }

    fn token_mut(&mut self) -> &mut Token {
        self.inner.token_mut()
    }

    fn reset(&mut self) {
        self.inner.reset();
    }
}

// ============================================================================
// STOP FILTER
// ============================================================================

/// Drops tokens found in a stop set, folding their position increments into
/// the next surviving token so phrase positions stay honest.
pub struct StopFilter<S: TokenStream> {
    inner: S,
    stopwords: Arc<HashSet<String>>,
}

impl<S: TokenStream> StopFilter<S> {
    pub fn new(inner: S, stopwords: Arc<HashSet<String>>) -> StopFilter<S> {
        StopFilter { inner, stopwords }
    }
}

impl<S: TokenStream> TokenStream for StopFilter<S> {
    fn advance(&mut self) -> bool {
        let mut skipped: u32 = 0;
        while self.inner.advance() {
            let text = self.inner.token().text_string();
            if self.stopwords.contains(&text) {
                skipped += self.inner.token().position_increment;
                continue;
            }
            if skipped > 0 {
                let tok = self.inner.token_mut();
                tok.position_increment += skipped;
            }
            return true;
        }
        false
    }

    fn token(&self) -> &Token {
        self.inner.token()
    }

    fn token_mut(&mut self) -> &mut Token {
        self.inner.token_mut()
    }

    fn reset(&mut self) {
        self.inner.reset();
    }
}

// ============================================================================
// DEFAULT STOPWORDS
// ============================================================================

/// English function words, per the classic CJK analyzer list. CJK bigrams
/// never collide with these.
const DEFAULT_STOPWORDS: &[&str] = &[
    "a", "and", "are", "as", "at", "be", "but", "by", "for", "if", "in",
    "into", "is", "it", "no", "not", "of", "on", "or", "s", "such", "t",
    "that", "the", "their", "then", "there", "these", "they", "this", "to",
    "was", "will", "with", "www",
];

/// Process-wide default stop set, built on first use.
pub fn default_stopwords() -> &'static Arc<HashSet<String>> {
    static SET: OnceLock<Arc<HashSet<String>>> = OnceLock::new();
    SET.get_or_init(|| {
        Arc::new(DEFAULT_STOPWORDS.iter().map(|w| w.to_string()).collect())
    })
}

// ============================================================================
// ANALYZER
// ============================================================================

/// The concrete stream type [`CjkAnalyzer::token_stream`] returns.
pub type CjkTokenStream =
    StopFilter<BigramFormer<LowercaseFilter<WidthNormalizer<ScriptTokenizer>>>>;

/// Configuration + assembly for the CJK analysis chain.
#[derive(Clone)]
pub struct CjkAnalyzer {
    scripts: ScriptSet,
    output_unigrams: bool,
    stopwords: Arc<HashSet<String>>,
}

impl CjkAnalyzer {
    /// All CJK scripts bigrammed, bigrams only, default stop set.
    pub fn new() -> CjkAnalyzer {
        CjkAnalyzer {
            scripts: ScriptSet::all(),
            output_unigrams: false,
            stopwords: Arc::clone(default_stopwords()),
        }
    }

    pub fn scripts(mut self, scripts: ScriptSet) -> CjkAnalyzer {
        self.scripts = scripts;
        self
    }

    /// Emit every CJK position as both a unigram and bigram synonyms.
    pub fn output_unigrams(mut self, yes: bool) -> CjkAnalyzer {
        self.output_unigrams = yes;
        self
    }

    pub fn stopwords(mut self, stopwords: Arc<HashSet<String>>) -> CjkAnalyzer {
        self.stopwords = stopwords;
        self
    }

    pub fn token_stream(&self, text: &str) -> CjkTokenStream {
        StopFilter::new(
            BigramFormer::new(
                LowercaseFilter::new(WidthNormalizer::new(ScriptTokenizer::new(text))),
                self.scripts,
                self.output_unigrams,
            ),
            Arc::clone(&self.stopwords),
        )
    }

    /// Run the chain over `text` and collect the emitted tokens.
    pub fn analyze(&self, text: &str) -> Vec<Token> {
        let mut stream = self.token_stream(text);
        crate::token::collect_tokens(&mut stream)
    }
}

impl Default for CjkAnalyzer {
    fn default() -> Self {
        CjkAnalyzer::new()
    }
}
