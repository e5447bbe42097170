// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Output algebras: the pluggable value side of the transducer.
//!
//! The builder pushes outputs as far up the shared prefix as it can, which
//! requires three operations beyond equality: `add` (concatenate along a
//! path), `common` (what two outputs share, for prefix hoisting), and
//! `subtract` (remove a hoisted prefix). `no_output` is the identity of
//! `add` and is never stored on the wire.
//!
//! This is a closed set by design: term dictionaries want [`LongOutputs`],
//! suggesters want [`BytesOutputs`] or a [`PairOutputs`] combination, and
//! set-only automata want [`NoOutputs`]. Open-ended subclassing buys nothing
//! here and costs serialization compatibility.

use crate::fst::bytes::{write_varint, ByteReader};

/// Value side of a transducer. `add`/`common`/`subtract` must satisfy
/// `add(common(a, b), subtract(a, common(a, b))) == a`.
pub trait OutputAlgebra {
    type Value: Clone + PartialEq + std::fmt::Debug;

    /// Stable one-byte identifier, recorded in serialized headers and
    /// checked at load.
    fn algebra_id(&self) -> u8;

    fn no_output(&self) -> Self::Value;

    fn is_no_output(&self, v: &Self::Value) -> bool;

    /// Concatenate `suffix` after `prefix` along a path.
    fn add(&self, prefix: &Self::Value, suffix: &Self::Value) -> Self::Value;

    /// The shared part of two outputs that can be hoisted to a common
    /// prefix arc.
    fn common(&self, a: &Self::Value, b: &Self::Value) -> Self::Value;

    /// Remove `prefix` (which must be a `common` result against `a`) from
    /// the front of `a`.
    fn subtract(&self, a: &Self::Value, prefix: &Self::Value) -> Self::Value;

    fn write(&self, v: &Self::Value, out: &mut Vec<u8>);

    fn read<R: ByteReader>(&self, r: &mut R) -> Self::Value;
}

// ============================================================================
// NO OUTPUTS
// ============================================================================

/// Set-only automaton: every accepted input maps to the unit value.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOutputs;

impl OutputAlgebra for NoOutputs {
    type Value = ();

    fn algebra_id(&self) -> u8 {
        0
    }

    fn no_output(&self) -> () {}

    fn is_no_output(&self, _v: &()) -> bool {
        true
    }

    fn add(&self, _prefix: &(), _suffix: &()) -> () {}

    fn common(&self, _a: &(), _b: &()) -> () {}

    fn subtract(&self, _a: &(), _prefix: &()) -> () {}

    fn write(&self, _v: &(), _out: &mut Vec<u8>) {}

    fn read<R: ByteReader>(&self, _r: &mut R) -> () {}
}

// ============================================================================
// LONG OUTPUTS
// ============================================================================

/// Non-negative integers under sum, shared by minimum. The term-ordinal
/// algebra: outputs along a path add up to the stored value, and the
/// builder hoists `min` of sibling outputs onto shared prefixes.
///
/// Strictly monotonic ordinal assignment additionally enables reverse
/// lookup ([`crate::fst::get_by_output`]).
#[derive(Debug, Clone, Copy, Default)]
pub struct LongOutputs;

impl OutputAlgebra for LongOutputs {
    type Value = u64;

    fn algebra_id(&self) -> u8 {
        1
    }

    fn no_output(&self) -> u64 {
        0
    }

    fn is_no_output(&self, v: &u64) -> bool {
        *v == 0
    }

    fn add(&self, prefix: &u64, suffix: &u64) -> u64 {
        prefix + suffix
    }

    fn common(&self, a: &u64, b: &u64) -> u64 {
        (*a).min(*b)
    }

    fn subtract(&self, a: &u64, prefix: &u64) -> u64 {
        debug_assert!(prefix <= a);
        a - prefix
    }

    fn write(&self, v: &u64, out: &mut Vec<u8>) {
        write_varint(out, *v);
    }

    fn read<R: ByteReader>(&self, r: &mut R) -> u64 {
        r.read_varint()
    }
}

// ============================================================================
// BYTES OUTPUTS
// ============================================================================

/// Byte sequences under concatenation, shared by longest common prefix.
#[derive(Debug, Clone, Copy, Default)]
pub struct BytesOutputs;

impl OutputAlgebra for BytesOutputs {
    type Value = Vec<u8>;

    fn algebra_id(&self) -> u8 {
        2
    }

    fn no_output(&self) -> Vec<u8> {
        Vec::new()
    }

    fn is_no_output(&self, v: &Vec<u8>) -> bool {
        v.is_empty()
    }

    fn add(&self, prefix: &Vec<u8>, suffix: &Vec<u8>) -> Vec<u8> {
        if prefix.is_empty() {
            return suffix.clone();
        }
        if suffix.is_empty() {
            return prefix.clone();
        }
        let mut out = Vec::with_capacity(prefix.len() + suffix.len());
        out.extend_from_slice(prefix);
        out.extend_from_slice(suffix);
        out
    }

    fn common(&self, a: &Vec<u8>, b: &Vec<u8>) -> Vec<u8> {
        let n = a.iter().zip(b.iter()).take_while(|(x, y)| x == y).count();
        a[..n].to_vec()
    }

    fn subtract(&self, a: &Vec<u8>, prefix: &Vec<u8>) -> Vec<u8> {
        debug_assert!(a.starts_with(prefix));
        a[prefix.len()..].to_vec()
    }

    fn write(&self, v: &Vec<u8>, out: &mut Vec<u8>) {
        write_varint(out, v.len() as u64);
        out.extend_from_slice(v);
    }

    fn read<R: ByteReader>(&self, r: &mut R) -> Vec<u8> {
        let len = r.read_varint() as usize;
        r.read_bytes(len)
    }
}

// ============================================================================
// PAIR OUTPUTS
// ============================================================================

/// Component-wise composition of two algebras, e.g. (weight, payload) for
/// suggesters.
#[derive(Debug, Clone, Copy, Default)]
pub struct PairOutputs<A, B> {
    pub first: A,
    pub second: B,
}

impl<A: OutputAlgebra, B: OutputAlgebra> PairOutputs<A, B> {
    pub fn new(first: A, second: B) -> PairOutputs<A, B> {
        PairOutputs { first, second }
    }
}

impl<A: OutputAlgebra, B: OutputAlgebra> OutputAlgebra for PairOutputs<A, B> {
    type Value = (A::Value, B::Value);

    fn algebra_id(&self) -> u8 {
        3
    }

    fn no_output(&self) -> Self::Value {
        (self.first.no_output(), self.second.no_output())
    }

    fn is_no_output(&self, v: &Self::Value) -> bool {
        self.first.is_no_output(&v.0) && self.second.is_no_output(&v.1)
    }

    fn add(&self, prefix: &Self::Value, suffix: &Self::Value) -> Self::Value {
        (
            self.first.add(&prefix.0, &suffix.0),
            self.second.add(&prefix.1, &suffix.1),
        )
    }

    fn common(&self, a: &Self::Value, b: &Self::Value) -> Self::Value {
        (
            self.first.common(&a.0, &b.0),
            self.second.common(&a.1, &b.1),
        )
    }

    fn subtract(&self, a: &Self::Value, prefix: &Self::Value) -> Self::Value {
        (
            self.first.subtract(&a.0, &prefix.0),
            self.second.subtract(&a.1, &prefix.1),
        )
    }

    fn write(&self, v: &Self::Value, out: &mut Vec<u8>) {
        self.first.write(&v.0, out);
        self.second.write(&v.1, out);
    }

    fn read<R: ByteReader>(&self, r: &mut R) -> Self::Value {
        let a = self.first.read(r);
        let b = self.second.read(r);
        (a, b)
    }
}
