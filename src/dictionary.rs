// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Term dictionary: sorted terms to dense ordinals, backed by the FST.
//!
//! This is the consumer the FST exists for. Terms go in sorted and unique
//! (the byte-sorted output of index construction), each gets the next
//! ordinal, and lookups run in either direction: term to ordinal through
//! the transducer, ordinal to term through reverse lookup over the
//! monotonic outputs.

use std::io::{self, Write};
use std::path::Path;

use crate::fst::{
    byte_labels, get_by_output, Builder, Fst, FstEnum, FstError, InputMode, LongOutputs,
};

/// Sorted term set with dense ordinals, one FST underneath.
pub struct TermDictionary {
    fst: Fst<LongOutputs>,
    len: u64,
}

impl TermDictionary {
    /// Build from strictly ascending unique terms. `None` when `terms` is
    /// empty.
    ///
    /// # Panics
    ///
    /// Out-of-order or duplicate terms trip the builder's ordering assert.
    pub fn build<I, S>(terms: I) -> Option<TermDictionary>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut builder = Builder::new(InputMode::Bytes, LongOutputs);
        let mut ord: u64 = 0;
        for term in terms {
            builder.add(&byte_labels(term.as_ref()), ord);
            ord += 1;
        }
        let fst = builder.finish()?;
        Some(TermDictionary { fst, len: ord })
    }

    /// Number of terms.
    pub fn len(&self) -> u64 {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn fst(&self) -> &Fst<LongOutputs> {
        &self.fst
    }

    /// Ordinal of `term`, or `None` when absent.
    pub fn ord(&self, term: &str) -> Option<u64> {
        self.fst.get(&byte_labels(term))
    }

    pub fn contains(&self, term: &str) -> bool {
        self.ord(term).is_some()
    }

    /// Term with ordinal `ord` (reverse lookup), or `None` out of range.
    pub fn term(&self, ord: u64) -> Option<String> {
        if ord >= self.len {
            return None;
        }
        let labels = get_by_output(&self.fst, ord)?;
        let bytes: Vec<u8> = labels.iter().map(|&l| l as u8).collect();
        String::from_utf8(bytes).ok()
    }

    /// Smallest stored term `>= term`, with its ordinal.
    pub fn seek_ceil(&self, term: &str) -> Option<(String, u64)> {
        let mut en = self.fst.enumerate();
        let (labels, ord) = en.seek_ceil(&byte_labels(term))?;
        Some((labels_to_string(labels), ord))
    }

    /// Largest stored term `<= term`, with its ordinal.
    pub fn seek_floor(&self, term: &str) -> Option<(String, u64)> {
        let mut en = self.fst.enumerate();
        let (labels, ord) = en.seek_floor(&byte_labels(term))?;
        Some((labels_to_string(labels), ord))
    }

    /// All terms in sorted order.
    pub fn iter(&self) -> TermIter<'_> {
        TermIter {
            en: self.fst.enumerate(),
            started: false,
            from: None,
        }
    }

    /// Terms in sorted order starting at the smallest term `>= from`.
    pub fn iter_from(&self, from: &str) -> TermIter<'_> {
        TermIter {
            en: self.fst.enumerate(),
            started: false,
            from: Some(byte_labels(from)),
        }
    }

    pub fn save<W: Write>(&self, w: &mut W) -> io::Result<()> {
        self.fst.save(w)
    }

    pub fn save_to_path<P: AsRef<Path>>(&self, path: P) -> io::Result<()> {
        self.fst.save_to_path(path)
    }

    pub fn load(bytes: &[u8]) -> Result<TermDictionary, FstError> {
        let fst = Fst::load(bytes, LongOutputs)?;
        Ok(TermDictionary::from_fst(fst))
    }

    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<TermDictionary, FstError> {
        let fst = Fst::load_from_path(path, LongOutputs)?;
        Ok(TermDictionary::from_fst(fst))
    }

    fn from_fst(fst: Fst<LongOutputs>) -> TermDictionary {
        // ordinals are dense, so the count is the last term's ordinal + 1;
        // the floor of a label no byte can reach lands on the last term
        let len = {
            let mut en = fst.enumerate();
            match en.seek_floor(&[u32::from(u8::MAX) + 1]) {
                Some((_, last_ord)) => last_ord + 1,
                None => 0,
            }
        };
        TermDictionary { fst, len }
    }
}

fn labels_to_string(labels: &[u32]) -> String {
    let bytes: Vec<u8> = labels.iter().map(|&l| l as u8).collect();
    String::from_utf8_lossy(&bytes).into_owned()
}

/// Sorted iterator over dictionary terms.
pub struct TermIter<'a> {
    en: FstEnum<'a, LongOutputs>,
    started: bool,
    from: Option<Vec<u32>>,
}

impl Iterator for TermIter<'_> {
    type Item = (String, u64);

    fn next(&mut self) -> Option<(String, u64)> {
        if !self.started {
            self.started = true;
            if let Some(from) = self.from.take() {
                let (labels, ord) = self.en.seek_ceil(&from)?;
                return Some((labels_to_string(labels), ord));
            }
        }
        let (labels, ord) = self.en.next()?;
        Some((labels_to_string(labels), ord))
    }
}
