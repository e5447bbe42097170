// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Token model and the pull-based stream abstraction the analysis chain is
//! built on.
//!
//! A [`Token`] is a buffer of codepoints plus character offsets into the
//! original input and position bookkeeping. Filters mutate tokens in place
//! (clear-and-refill) rather than allocating per stage, so a full analysis
//! pass over a document allocates roughly nothing after warmup.
//!
//! [`TokenStream`] is the cooperative pipeline contract: each stage pulls
//! from its upstream synchronously via `advance()`. A stream instance is
//! single-threaded; share text between threads, not streams.

use std::fmt;

// ============================================================================
// SCRIPT CLASSIFICATION
// ============================================================================

/// Script class of a codepoint, as far as bigram formation cares.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Script {
    Han,
    Hiragana,
    Katakana,
    Hangul,
    /// Everything else: Latin, digits, and any script we do not bigram.
    Other,
}

/// Classify a single codepoint.
///
/// Halfwidth kana (`U+FF65..=U+FF9F`) classify as Katakana so they reach the
/// width filter inside kana tokens instead of being lumped into OTHER runs.
pub fn classify(cp: u32) -> Script {
    match cp {
        0x4E00..=0x9FFF | 0x3400..=0x4DBF | 0xF900..=0xFAFF | 0x20000..=0x2A6DF
        | 0x2A700..=0x2EBEF => Script::Han,
        0x3041..=0x309F => Script::Hiragana,
        0x30A0..=0x30FF | 0x31F0..=0x31FF | 0xFF65..=0xFF9F => Script::Katakana,
        0xAC00..=0xD7AF | 0x1100..=0x11FF | 0xA960..=0xA97F | 0xD7B0..=0xD7FF => Script::Hangul,
        _ => Script::Other,
    }
}

/// Bit-flag set of scripts eligible for bigram formation.
///
/// Fixed at filter construction, immutable thereafter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScriptSet(u8);

impl ScriptSet {
    pub const HAN: ScriptSet = ScriptSet(0b0001);
    pub const HIRAGANA: ScriptSet = ScriptSet(0b0010);
    pub const KATAKANA: ScriptSet = ScriptSet(0b0100);
    pub const HANGUL: ScriptSet = ScriptSet(0b1000);

    /// All four CJK scripts (the default configuration).
    pub const fn all() -> ScriptSet {
        ScriptSet(0b1111)
    }

    pub const fn empty() -> ScriptSet {
        ScriptSet(0)
    }

    /// Whether tokens of `script` participate in bigram formation.
    /// OTHER is never eligible.
    pub fn contains(self, script: Script) -> bool {
        let bit = match script {
            Script::Han => Self::HAN.0,
            Script::Hiragana => Self::HIRAGANA.0,
            Script::Katakana => Self::KATAKANA.0,
            Script::Hangul => Self::HANGUL.0,
            Script::Other => return false,
        };
        self.0 & bit != 0
    }
}

impl std::ops::BitOr for ScriptSet {
    type Output = ScriptSet;

    fn bitor(self, rhs: ScriptSet) -> ScriptSet {
        ScriptSet(self.0 | rhs.0)
    }
}

impl Default for ScriptSet {
    fn default() -> Self {
        ScriptSet::all()
    }
}

// ============================================================================
// TOKEN
// ============================================================================

/// What kind of token this is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenType {
    /// Produced by the tokenizer: the script run this token came from.
    Script(Script),
    /// A unigram emitted by the bigram stage.
    Single,
    /// A bigram emitted by the bigram stage.
    Double,
}

impl TokenType {
    /// Script classification, if this token still carries one.
    pub fn script(self) -> Option<Script> {
        match self {
            TokenType::Script(s) => Some(s),
            _ => None,
        }
    }
}

/// A unit of analyzed text.
///
/// Offsets are character (not byte) positions in the original input, and
/// `end` is exclusive. `position_length > 1` marks a token as a synonym span
/// over that many positions; phrase-style consumers must honor it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    /// Codepoints of the token text.
    pub text: Vec<u32>,
    pub start: usize,
    pub end: usize,
    pub position_increment: u32,
    pub position_length: u32,
    pub ttype: TokenType,
}

impl Token {
    pub fn new() -> Token {
        Token {
            text: Vec::new(),
            start: 0,
            end: 0,
            position_increment: 1,
            position_length: 1,
            ttype: TokenType::Script(Script::Other),
        }
    }

    /// Reset to the state a fresh token has, keeping the text allocation.
    pub fn clear(&mut self) {
        self.text.clear();
        self.start = 0;
        self.end = 0;
        self.position_increment = 1;
        self.position_length = 1;
        self.ttype = TokenType::Script(Script::Other);
    }

    /// Token text as a `String`. Unpaired surrogate values cannot occur here
    /// (we deal in codepoints, not UTF-16 units); invalid scalars map to
    /// U+FFFD.
    pub fn text_string(&self) -> String {
        self.text
            .iter()
            .map(|&cp| char::from_u32(cp).unwrap_or('\u{FFFD}'))
            .collect()
    }

    /// Fill this token from parts, clearing previous state first.
    pub fn set(&mut self, text: &[u32], start: usize, end: usize, ttype: TokenType) {
        self.clear();
        self.text.extend_from_slice(text);
        self.start = start;
        self.end = end;
        self.ttype = ttype;
    }
}

impl Default for Token {
    fn default() -> Self {
        Token::new()
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}..{})", self.text_string(), self.start, self.end)
    }
}

// ============================================================================
// TOKEN STREAM
// ============================================================================

/// Pull-based token stream.
///
/// `advance()` moves to the next token and returns false at end of stream;
/// after a false return the stream stays exhausted until `reset()`. The
/// current token is reachable through `token()` / `token_mut()` and is only
/// valid until the next `advance()`.
///
/// Implementations are not thread-safe; use one stream per caller.
pub trait TokenStream {
    fn advance(&mut self) -> bool;

    fn token(&self) -> &Token;

    fn token_mut(&mut self) -> &mut Token;

    /// Return the stream to its initial state so the same input can be
    /// consumed again.
    fn reset(&mut self);
}

/// Drain a stream into owned tokens. Test and CLI convenience.
pub fn collect_tokens<S: TokenStream>(stream: &mut S) -> Vec<Token> {
    let mut out = Vec::new();
    while stream.advance() {
        out.push(stream.token().clone());
    }
    out
}

// ============================================================================
// SCRIPT TOKENIZER
// ============================================================================

/// Segments raw text into the token shape the CJK chain expects: Han and
/// Hiragana one codepoint per token, Katakana and Hangul as same-script runs
/// (the width filter's voicing-mark combination needs the run in one
/// buffer), alphanumeric OTHER runs, separators skipped.
///
/// Fullwidth ASCII (`U+FF01..=U+FF5E`) counts as OTHER-alphanumeric when its
/// folded form is, so strings like `ＣＤ０１` survive to the width filter as
/// a single run. Kana punctuation (`・`, `U+FF65`) is a separator, not a
/// token.
pub struct ScriptTokenizer {
    codepoints: Vec<u32>,
    pos: usize,
    token: Token,
}

impl ScriptTokenizer {
    pub fn new(text: &str) -> ScriptTokenizer {
        ScriptTokenizer {
            codepoints: text.chars().map(|c| c as u32).collect(),
            pos: 0,
            token: Token::new(),
        }
    }

    fn is_word(cp: u32) -> bool {
        let folded = if (0xFF01..=0xFF5E).contains(&cp) { cp - 0xFEE0 } else { cp };
        match char::from_u32(folded) {
            Some(c) => c.is_alphanumeric(),
            None => false,
        }
    }

    /// Whether `cp` starts or continues a token at all.
    fn is_token_char(cp: u32) -> bool {
        if classify(cp) == Script::Other {
            Self::is_word(cp)
        } else {
            char::from_u32(cp).map_or(false, |c| c.is_alphanumeric())
        }
    }
}

impl TokenStream for ScriptTokenizer {
    fn advance(&mut self) -> bool {
        let n = self.codepoints.len();
        while self.pos < n && !Self::is_token_char(self.codepoints[self.pos]) {
            self.pos += 1;
        }
        if self.pos >= n {
            return false;
        }

        let start = self.pos;
        let cp = self.codepoints[self.pos];
        let script = classify(cp);
        match script {
            Script::Han | Script::Hiragana => {
                // one token per ideograph / hiragana codepoint
                self.pos += 1;
                self.token
                    .set(&[cp], start, self.pos, TokenType::Script(script));
            }
            Script::Katakana | Script::Hangul => {
                // run of the same script
                while self.pos < n
                    && classify(self.codepoints[self.pos]) == script
                    && Self::is_token_char(self.codepoints[self.pos])
                {
                    self.pos += 1;
                }
                let run = self.codepoints[start..self.pos].to_vec();
                self.token
                    .set(&run, start, self.pos, TokenType::Script(script));
            }
            Script::Other => {
                // alphanumeric run
                while self.pos < n
                    && classify(self.codepoints[self.pos]) == Script::Other
                    && Self::is_word(self.codepoints[self.pos])
                {
                    self.pos += 1;
                }
                let run = self.codepoints[start..self.pos].to_vec();
                self.token
                    .set(&run, start, self.pos, TokenType::Script(Script::Other));
            }
        }
        true
    }

    fn token(&self) -> &Token {
        &self.token
    }

    fn token_mut(&mut self) -> &mut Token {
        &mut self.token
    }

    fn reset(&mut self) {
        self.pos = 0;
        self.token.clear();
    }
}
