// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Finite state transducer: sorted keys to outputs in a shared-suffix DAG.
//!
//! [`Builder`] consumes (label sequence, output) pairs in strictly ascending
//! key order and produces an [`Fst`]: a single byte buffer of frozen nodes
//! plus a start offset. Shared suffixes collapse through hash-consing, and
//! outputs hoist onto shared prefixes, so a million sorted terms with
//! ordinal outputs compress to a few bytes per term.
//!
//! Once built (or loaded), an [`Fst`] is immutable and safe to traverse from
//! any number of threads; the [`Arc`] cursor carries all per-traversal
//! state, so give each thread its own.
//!
//! # Node encoding
//!
//! Nodes are written back-to-front (see [`bytes`]); a node address points at
//! its logical first byte and arcs decode through a reverse reader. Two
//! layouts:
//!
//! ```text
//! variable (fan-out < 10):
//!   arc*      flags: u8           FINAL | LAST | STOP | HAS_OUTPUT | HAS_FINAL_OUTPUT
//!             label: varint
//!             [output]            if HAS_OUTPUT, algebra-encoded
//!             [final_output]      if HAS_FINAL_OUTPUT
//!             [target: varint]    absent when STOP (an end-node sentinel)
//!
//! fixed array (fan-out >= 10):
//!   marker: u8 = 0x80
//!   num_arcs: varint
//!   bytes_per_arc: varint
//!   slot*     one arc as above, zero-padded to bytes_per_arc
//! ```
//!
//! Fixed-array nodes are binary-searched by label; variable nodes are
//! scanned. The `STOP` flag points an arc at one of two sentinel targets:
//! `-1` (final, no outgoing arcs) or `0` (non-final dead end, unused in
//! practice since dead ends are forced final at freeze time).

pub mod builder;
pub mod bytes;
pub mod enumerate;
pub mod io;
pub mod outputs;

pub use builder::{Builder, BuilderOptions};
pub use enumerate::FstEnum;
pub use io::FstError;
pub use outputs::{BytesOutputs, LongOutputs, NoOutputs, OutputAlgebra, PairOutputs};

use bytes::{ByteReader, ReverseReader};
use outputs::OutputAlgebra as Algebra;

/// Byte offset of a frozen node inside the FST buffer, or an end-node
/// sentinel.
pub type CompiledAddr = i64;

/// Sentinel target: a final node with no outgoing arcs.
pub const FINAL_END_NODE: CompiledAddr = -1;

/// Sentinel target: a non-final node with no outgoing arcs.
pub const NON_FINAL_END_NODE: CompiledAddr = 0;

pub(crate) const BIT_FINAL_ARC: u8 = 1 << 0;
pub(crate) const BIT_LAST_ARC: u8 = 1 << 1;
pub(crate) const BIT_STOP_NODE: u8 = 1 << 3;
pub(crate) const BIT_ARC_HAS_OUTPUT: u8 = 1 << 4;
pub(crate) const BIT_ARC_HAS_FINAL_OUTPUT: u8 = 1 << 5;

/// First byte of a fixed-array node. Plain flag bytes never have the high
/// bit set, so this cannot collide with a variable-layout arc.
pub(crate) const ARCS_AS_FIXED_ARRAY: u8 = 1 << 7;

/// Nodes with at least this many arcs use the fixed-array layout.
pub const FIXED_ARRAY_NUM_ARCS: usize = 10;

// ============================================================================
// INPUT MODE
// ============================================================================

/// How callers map keys to label sequences. Recorded in serialized headers;
/// traversal itself is label-agnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    /// UTF-8 bytes. Sorting bytewise matches unicode code point order.
    Bytes,
    /// UTF-32 codepoints, one label per scalar.
    Codepoints,
}

impl InputMode {
    pub(crate) fn as_u8(self) -> u8 {
        match self {
            InputMode::Bytes => 0,
            InputMode::Codepoints => 1,
        }
    }

    pub(crate) fn from_u8(v: u8) -> Option<InputMode> {
        match v {
            0 => Some(InputMode::Bytes),
            1 => Some(InputMode::Codepoints),
            _ => None,
        }
    }
}

/// Label sequence for a term in [`InputMode::Bytes`].
pub fn byte_labels(term: &str) -> Vec<u32> {
    term.bytes().map(u32::from).collect()
}

/// Label sequence for a term in [`InputMode::Codepoints`].
pub fn codepoint_labels(term: &str) -> Vec<u32> {
    term.chars().map(|c| c as u32).collect()
}

// ============================================================================
// ARC CURSOR
// ============================================================================

/// One transition, plus the cursor state needed to iterate its siblings.
///
/// Reusable across traversals to avoid allocation; not thread-safe (clone
/// one per thread instead).
#[derive(Debug, Clone)]
pub struct Arc<V> {
    pub label: u32,
    pub output: V,
    pub final_output: V,
    pub target: CompiledAddr,
    flags: u8,
    /// Variable layout: position of the next sibling's flags byte.
    next_arc: CompiledAddr,
    /// Fixed layout: position of slot 0, slot stride, index, slot count.
    arc_start: CompiledAddr,
    bytes_per_arc: u64,
    arc_idx: u64,
    num_arcs: u64,
}

impl<V> Arc<V> {
    /// The path ending with this arc is an accepted key.
    pub fn is_final(&self) -> bool {
        self.flags & BIT_FINAL_ARC != 0
    }

    /// No further sibling arcs after this one.
    pub fn is_last(&self) -> bool {
        if self.bytes_per_arc != 0 {
            self.arc_idx + 1 >= self.num_arcs
        } else {
            self.flags & BIT_LAST_ARC != 0
        }
    }
}

// ============================================================================
// COMPILED FST
// ============================================================================

/// The compiled, immutable transducer.
#[derive(Debug)]
pub struct Fst<A: Algebra> {
    pub(crate) algebra: A,
    pub(crate) data: Vec<u8>,
    pub(crate) start_node: CompiledAddr,
    pub(crate) empty_output: Option<A::Value>,
    pub(crate) input_mode: InputMode,
    pub(crate) node_count: u64,
    pub(crate) arc_count: u64,
}

impl<A: Algebra> Fst<A> {
    pub fn algebra(&self) -> &A {
        &self.algebra
    }

    pub fn input_mode(&self) -> InputMode {
        self.input_mode
    }

    /// Output of the empty key, if the empty key is accepted.
    pub fn empty_output(&self) -> Option<&A::Value> {
        self.empty_output.as_ref()
    }

    /// Frozen node count (diagnostic).
    pub fn node_count(&self) -> u64 {
        self.node_count
    }

    /// Stored arc count (diagnostic).
    pub fn arc_count(&self) -> u64 {
        self.arc_count
    }

    /// Serialized node bytes (diagnostic; excludes header/footer).
    pub fn data_len(&self) -> usize {
        self.data.len()
    }

    /// Pseudo-arc pointing at the root node. The traversal entry point.
    pub fn root_arc(&self) -> Arc<A::Value> {
        let mut arc = Arc {
            label: 0,
            output: self.algebra.no_output(),
            final_output: self.algebra.no_output(),
            target: self.start_node,
            flags: BIT_LAST_ARC,
            next_arc: 0,
            arc_start: 0,
            bytes_per_arc: 0,
            arc_idx: 0,
            num_arcs: 0,
        };
        if let Some(empty) = &self.empty_output {
            arc.flags |= BIT_FINAL_ARC;
            arc.final_output = empty.clone();
        }
        arc
    }

    /// Whether the node `arc` points at has outgoing arcs (i.e. is not an
    /// end-node sentinel).
    pub fn target_has_arcs(arc: &Arc<A::Value>) -> bool {
        arc.target > 0
    }

    /// Decode one arc at physical position `pos`, leaving cursor fields for
    /// sibling iteration untouched except `next_arc`.
    fn read_arc_body(&self, into: &mut Arc<A::Value>, pos: CompiledAddr) {
        let mut r = ReverseReader::new(&self.data, pos);
        let flags = r.read_u8();
        into.flags = flags;
        into.label = r.read_varint() as u32;
        into.output = if flags & BIT_ARC_HAS_OUTPUT != 0 {
            self.algebra.read(&mut r)
        } else {
            self.algebra.no_output()
        };
        into.final_output = if flags & BIT_ARC_HAS_FINAL_OUTPUT != 0 {
            self.algebra.read(&mut r)
        } else {
            self.algebra.no_output()
        };
        into.target = if flags & BIT_STOP_NODE != 0 {
            if flags & BIT_FINAL_ARC != 0 {
                FINAL_END_NODE
            } else {
                NON_FINAL_END_NODE
            }
        } else {
            r.read_varint() as CompiledAddr
        };
        into.next_arc = r.position();
    }

    /// Position `into` on the first arc of the node at `node`.
    fn init_node_cursor(&self, node: CompiledAddr, into: &mut Arc<A::Value>) {
        let mut r = ReverseReader::new(&self.data, node);
        if r.read_u8() == ARCS_AS_FIXED_ARRAY {
            into.num_arcs = r.read_varint();
            into.bytes_per_arc = r.read_varint();
            into.arc_start = r.position();
            into.arc_idx = 0;
            self.read_arc_body(into, into.arc_start);
        } else {
            into.num_arcs = 0;
            into.bytes_per_arc = 0;
            into.arc_idx = 0;
            into.arc_start = 0;
            self.read_arc_body(into, node);
        }
    }

    /// First outgoing arc of the node `follow` points at. Caller must have
    /// checked [`Fst::target_has_arcs`].
    pub fn read_first_target_arc(&self, follow: &Arc<A::Value>, into: &mut Arc<A::Value>) {
        debug_assert!(Self::target_has_arcs(follow));
        self.init_node_cursor(follow.target, into);
    }

    /// Advance `arc` to its next sibling; false when it was the last.
    pub fn read_next_arc(&self, arc: &mut Arc<A::Value>) -> bool {
        if arc.bytes_per_arc != 0 {
            if arc.arc_idx + 1 >= arc.num_arcs {
                return false;
            }
            arc.arc_idx += 1;
            let pos = arc.arc_start - (arc.arc_idx * arc.bytes_per_arc) as i64;
            self.read_arc_body(arc, pos);
            true
        } else {
            if arc.flags & BIT_LAST_ARC != 0 {
                return false;
            }
            let pos = arc.next_arc;
            self.read_arc_body(arc, pos);
            true
        }
    }

    /// Last outgoing arc of the node `follow` points at.
    pub(crate) fn read_last_target_arc(&self, follow: &Arc<A::Value>, into: &mut Arc<A::Value>) {
        debug_assert!(Self::target_has_arcs(follow));
        let mut r = ReverseReader::new(&self.data, follow.target);
        if r.read_u8() == ARCS_AS_FIXED_ARRAY {
            into.num_arcs = r.read_varint();
            into.bytes_per_arc = r.read_varint();
            into.arc_start = r.position();
            into.arc_idx = into.num_arcs - 1;
            let pos = into.arc_start - (into.arc_idx * into.bytes_per_arc) as i64;
            self.read_arc_body(into, pos);
        } else {
            self.init_node_cursor(follow.target, into);
            while !into.is_last() {
                self.read_next_arc(into);
            }
        }
    }

    /// Find the outgoing arc labeled `label` on the node `follow` points
    /// at. Binary search for fixed-array nodes, linear scan otherwise.
    /// Returns false (leaving `into` unspecified) when absent.
    pub fn find_target_arc(
        &self,
        label: u32,
        follow: &Arc<A::Value>,
        into: &mut Arc<A::Value>,
    ) -> bool {
        if !Self::target_has_arcs(follow) {
            return false;
        }
        let node = follow.target;
        let mut r = ReverseReader::new(&self.data, node);
        if r.read_u8() == ARCS_AS_FIXED_ARRAY {
            let num_arcs = r.read_varint();
            let bytes_per_arc = r.read_varint();
            let arc_start = r.position();
            let mut lo: i64 = 0;
            let mut hi: i64 = num_arcs as i64 - 1;
            while lo <= hi {
                let mid = lo + (hi - lo) / 2;
                let pos = arc_start - mid * bytes_per_arc as i64;
                let mut ar = ReverseReader::new(&self.data, pos);
                ar.read_u8(); // flags
                let l = ar.read_varint() as u32;
                if l < label {
                    lo = mid + 1;
                } else if l > label {
                    hi = mid - 1;
                } else {
                    into.num_arcs = num_arcs;
                    into.bytes_per_arc = bytes_per_arc;
                    into.arc_start = arc_start;
                    into.arc_idx = mid as u64;
                    self.read_arc_body(into, pos);
                    return true;
                }
            }
            false
        } else {
            self.init_node_cursor(node, into);
            loop {
                if into.label == label {
                    return true;
                }
                if into.label > label || !self.read_next_arc(into) {
                    return false;
                }
            }
        }
    }

    /// Exact lookup: the output of `input` if the full sequence is
    /// accepted, else `None`.
    pub fn get(&self, input: &[u32]) -> Option<A::Value> {
        let mut arc = self.root_arc();
        let mut scratch = self.root_arc();
        let mut output = self.algebra.no_output();
        for &label in input {
            if !self.find_target_arc(label, &arc, &mut scratch) {
                return None;
            }
            output = self.algebra.add(&output, &scratch.output);
            std::mem::swap(&mut arc, &mut scratch);
        }
        if arc.is_final() {
            Some(self.algebra.add(&output, &arc.final_output))
        } else {
            None
        }
    }

    pub fn contains(&self, input: &[u32]) -> bool {
        self.get(input).is_some()
    }

    /// Longest prefix of `input` that is an accepted key, with its output.
    /// The partial-match entry point for suggest-style callers.
    pub fn longest_match(&self, input: &[u32]) -> Option<(usize, A::Value)> {
        let mut arc = self.root_arc();
        let mut scratch = self.root_arc();
        let mut output = self.algebra.no_output();
        let mut best = if arc.is_final() {
            Some((0, arc.final_output.clone()))
        } else {
            None
        };
        for (i, &label) in input.iter().enumerate() {
            if !self.find_target_arc(label, &arc, &mut scratch) {
                break;
            }
            output = self.algebra.add(&output, &scratch.output);
            if scratch.is_final() {
                best = Some((i + 1, self.algebra.add(&output, &scratch.final_output)));
            }
            std::mem::swap(&mut arc, &mut scratch);
        }
        best
    }

    /// Sorted enumeration cursor over all accepted keys.
    pub fn enumerate(&self) -> FstEnum<'_, A> {
        FstEnum::new(self)
    }
}

// ============================================================================
// REVERSE LOOKUP
// ============================================================================

/// Find the key whose output is exactly `target`, for [`LongOutputs`] FSTs
/// whose outputs are strictly monotonic in key order (ordinals). Descends by
/// picking, at each node, the last arc whose accumulated output does not
/// exceed `target`.
///
/// With non-monotonic outputs the result is meaningless; that precondition
/// is the caller's.
pub fn get_by_output(fst: &Fst<LongOutputs>, target: u64) -> Option<Vec<u32>> {
    let root = fst.root_arc();
    if root.is_final() && root.final_output == target {
        return Some(Vec::new());
    }
    if !Fst::<LongOutputs>::target_has_arcs(&root) {
        return None;
    }

    let mut result = Vec::new();
    let mut acc: u64 = 0;
    let mut arc = root;
    let mut cursor = fst.root_arc();
    loop {
        fst.read_first_target_arc(&arc, &mut cursor);
        let mut best: Option<Arc<u64>> = None;
        loop {
            if acc + cursor.output > target {
                break;
            }
            best = Some(cursor.clone());
            if !fst.read_next_arc(&mut cursor) {
                break;
            }
        }
        let chosen = best?;
        acc += chosen.output;
        result.push(chosen.label);
        if chosen.is_final() && acc + chosen.final_output == target {
            return Some(result);
        }
        if !Fst::<LongOutputs>::target_has_arcs(&chosen) {
            return None;
        }
        arc = chosen;
    }
}
