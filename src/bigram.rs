// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Bigram formation over CJK token streams.
//!
//! [`BigramFormer`] buffers runs of adjacent same-eligibility CJK codepoints
//! and emits overlapping bigrams from them. A codepoint with no adjacent
//! partner comes out as a unigram. With `output_unigrams` on, every position
//! is emitted both ways: input `ABC` yields `A, AB, B, BC, C`, the bigrams
//! marked as zero-increment synonyms spanning two positions.
//!
//! Deciding whether a pending codepoint is a lone unigram or the start of a
//! bigram takes exactly one token of lookahead. The peeked token is parked
//! in a single capture slot and replayed on the next pull; there is never
//! more than one outstanding.

use crate::token::{Script, ScriptSet, Token, TokenStream, TokenType};

/// Compaction threshold for the pending-codepoint buffer. Only the last
/// codepoint can ever pair with the next token, so anything older is dead
/// weight once consumed.
const COMPACT_ABOVE: usize = 64;

// ============================================================================
// CODEPOINT BUFFER
// ============================================================================

/// Growable parallel arrays of pending codepoints and their offsets.
#[derive(Debug, Default)]
pub struct CodepointBuffer {
    codepoints: Vec<u32>,
    starts: Vec<usize>,
    ends: Vec<usize>,
}

impl CodepointBuffer {
    pub fn new() -> CodepointBuffer {
        CodepointBuffer::default()
    }

    pub fn len(&self) -> usize {
        self.codepoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codepoints.is_empty()
    }

    pub fn push(&mut self, cp: u32, start: usize, end: usize) {
        self.codepoints.push(cp);
        self.starts.push(start);
        self.ends.push(end);
    }

    pub fn get(&self, i: usize) -> (u32, usize, usize) {
        (self.codepoints[i], self.starts[i], self.ends[i])
    }

    pub fn clear(&mut self) {
        self.codepoints.clear();
        self.starts.clear();
        self.ends.clear();
    }

    /// Drop everything but the last entry.
    pub fn keep_last(&mut self) {
        let last = self.codepoints.len() - 1;
        self.codepoints.swap(0, last);
        self.starts.swap(0, last);
        self.ends.swap(0, last);
        self.codepoints.truncate(1);
        self.starts.truncate(1);
        self.ends.truncate(1);
    }
}

// ============================================================================
// BIGRAM FORMER
// ============================================================================

/// Token filter forming bigrams from adjacent eligible CJK codepoints.
///
/// Scripts outside the configured set, and non-CJK tokens, pass through
/// untouched. Adjacency means the next token starts exactly where the
/// previous one ended; any gap (stopword, charfilter hole) breaks the run.
pub struct BigramFormer<S: TokenStream> {
    inner: S,
    scripts: ScriptSet,
    output_unigrams: bool,

    buffer: CodepointBuffer,
    /// Read position into `buffer`; `buffer.len() - index > 1` means a
    /// bigram is immediately emittable.
    index: usize,
    last_end_offset: usize,
    /// One-token lookahead slot: a peeked upstream token waiting for replay.
    lone_state: Option<Token>,
    exhausted: bool,
    /// Alternation flag for `output_unigrams`: false emits the unigram and
    /// rewinds, true emits the bigram.
    ngram_state: bool,

    /// Working copy of the upstream token under examination.
    current: Token,
    /// The token this filter exposes downstream.
    token: Token,
}

impl<S: TokenStream> BigramFormer<S> {
    pub fn new(inner: S, scripts: ScriptSet, output_unigrams: bool) -> BigramFormer<S> {
        BigramFormer {
            inner,
            scripts,
            output_unigrams,
            buffer: CodepointBuffer::new(),
            index: 0,
            last_end_offset: 0,
            lone_state: None,
            exhausted: false,
            ngram_state: false,
            current: Token::new(),
            token: Token::new(),
        }
    }

    /// All four CJK scripts, bigrams only.
    pub fn with_defaults(inner: S) -> BigramFormer<S> {
        BigramFormer::new(inner, ScriptSet::all(), false)
    }

    /// Pull the next token to examine: a previously captured one first,
    /// then upstream.
    fn pull(&mut self) -> bool {
        if let Some(saved) = self.lone_state.take() {
            self.current = saved;
            return true;
        }
        if self.exhausted {
            return false;
        }
        if self.inner.advance() {
            self.current.clone_from(self.inner.token());
            true
        } else {
            self.exhausted = true;
            false
        }
    }

    /// Append the current token's codepoints to the run buffer.
    fn refill(&mut self) {
        // compact: only the last codepoint can still pair with new input
        if self.buffer.len() > COMPACT_ABOVE {
            let dropped = self.buffer.len() - 1;
            self.buffer.keep_last();
            self.index -= dropped;
        }

        let tok = &self.current;
        self.last_end_offset = tok.end;
        if tok.end - tok.start != tok.text.len() {
            // offsets were modified upstream (charfilter, synonyms);
            // preserve them as-is for every codepoint
            for &cp in &tok.text {
                self.buffer.push(cp, tok.start, tok.end);
            }
        } else {
            let mut start = tok.start;
            for &cp in &tok.text {
                self.buffer.push(cp, start, start + 1);
                start += 1;
            }
        }
    }

    fn flush_unigram(&mut self) {
        let (cp, start, end) = self.buffer.get(self.index);
        self.token.clear();
        self.token.text.push(cp);
        self.token.start = start;
        self.token.end = end;
        self.token.ttype = TokenType::Single;
        self.index += 1;
    }

    fn flush_bigram(&mut self) {
        let (a, start, _) = self.buffer.get(self.index);
        let (b, _, end) = self.buffer.get(self.index + 1);
        self.token.clear();
        self.token.text.push(a);
        self.token.text.push(b);
        self.token.start = start;
        self.token.end = end;
        self.token.ttype = TokenType::Double;
        if self.output_unigrams {
            // a bigram is a synonym spanning the two unigram positions
            self.token.position_increment = 0;
            self.token.position_length = 2;
        }
        self.index += 1;
    }

    fn has_buffered_bigram(&self) -> bool {
        self.buffer.len() - self.index > 1
    }

    /// Exactly one pending codepoint whose fate is still undecided.
    fn has_buffered_unigram(&self) -> bool {
        if self.output_unigrams {
            self.buffer.len() - self.index == 1
        } else {
            self.buffer.len() == 1 && self.index == 0
        }
    }

    fn eligible(&self, ttype: TokenType) -> bool {
        match ttype.script() {
            Some(Script::Other) | None => false,
            Some(s) => self.scripts.contains(s),
        }
    }
}

impl<S: TokenStream> TokenStream for BigramFormer<S> {
    fn advance(&mut self) -> bool {
        loop {
            if self.has_buffered_bigram() {
                // enough buffered to emit a bigram here
                if self.output_unigrams {
                    // emit the unigram first, then rewind to revisit the
                    // same position as a bigram: ABC -> A, AB, B, BC, C
                    if self.ngram_state {
                        self.flush_bigram();
                    } else {
                        self.flush_unigram();
                        self.index -= 1;
                    }
                    self.ngram_state = !self.ngram_state;
                } else {
                    self.flush_bigram();
                }
                return true;
            } else if self.pull() {
                if self.eligible(self.current.ttype) {
                    if self.current.start != self.last_end_offset {
                        // run broken by a gap
                        if self.has_buffered_unigram() {
                            // the peeked token can't pair with our pending
                            // codepoint; park it and flush the loner
                            self.lone_state = Some(self.current.clone());
                            self.flush_unigram();
                            return true;
                        }
                        self.index = 0;
                        self.buffer.clear();
                    }
                    self.refill();
                } else {
                    if self.has_buffered_unigram() {
                        self.lone_state = Some(self.current.clone());
                        self.flush_unigram();
                        return true;
                    }
                    // non-eligible tokens pass through unmodified
                    self.token.clone_from(&self.current);
                    return true;
                }
            } else {
                // upstream drained; at most one codepoint can remain
                if self.has_buffered_unigram() {
                    self.flush_unigram();
                    return true;
                }
                return false;
            }
        }
    }

    fn token(&self) -> &Token {
        &self.token
    }

    fn token_mut(&mut self) -> &mut Token {
        &mut self.token
    }

    fn reset(&mut self) {
        self.inner.reset();
        self.buffer.clear();
        self.index = 0;
        self.last_end_offset = 0;
        self.lone_state = None;
        self.exhausted = false;
        self.ngram_state = false;
        self.current.clear();
        self.token.clear();
    }
}
