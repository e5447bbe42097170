// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Sorted enumeration over a compiled FST, with seek.
//!
//! [`FstEnum`] is a depth-first cursor: a stack of arc positions, one per
//! key depth, each frame carrying the output accumulated above it. `next()`
//! walks keys in exact lexicographic order. `seek_ceil`/`seek_floor` keep
//! the frames that still agree with the seek target and re-descend from the
//! lowest common node instead of the root, which keeps runs of nearby seeks
//! (the term-dictionary access pattern) cheap.
//!
//! Cursors borrow the FST and carry all mutable state themselves; one
//! cursor per thread.

use crate::fst::outputs::OutputAlgebra;
use crate::fst::{Arc, Fst};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    /// Nothing emitted yet.
    Start,
    /// The empty key was just emitted; descend from the root next.
    EmittedEmpty,
    /// Positioned on an emitted key (stack top is a final arc).
    Active,
    Done,
}

struct Frame<V> {
    arc: Arc<V>,
    /// Output accumulated along the path above this frame's arc.
    base: V,
}

/// Sorted cursor over all accepted keys of an [`Fst`].
pub struct FstEnum<'f, A: OutputAlgebra> {
    fst: &'f Fst<A>,
    frames: Vec<Frame<A::Value>>,
    input: Vec<u32>,
    state: State,
}

impl<'f, A: OutputAlgebra> FstEnum<'f, A> {
    pub(crate) fn new(fst: &'f Fst<A>) -> FstEnum<'f, A> {
        FstEnum {
            fst,
            frames: Vec::new(),
            input: Vec::new(),
            state: State::Start,
        }
    }

    /// Labels of the key the cursor is positioned on.
    pub fn input(&self) -> &[u32] {
        &self.input
    }

    /// Lexicographically next key, or `None` at the end.
    pub fn next(&mut self) -> Option<(&[u32], A::Value)> {
        match self.state {
            State::Done => return None,
            State::Start => {
                self.state = State::Active;
                let root = self.fst.root_arc();
                if root.is_final() {
                    // the empty key sorts first
                    self.state = State::EmittedEmpty;
                    return Some((&self.input, root.final_output));
                }
                if !self.descend_from_root() {
                    self.state = State::Done;
                    return None;
                }
            }
            State::EmittedEmpty => {
                self.state = State::Active;
                if !self.descend_from_root() {
                    self.state = State::Done;
                    return None;
                }
            }
            State::Active => {
                let top_has_arcs = self
                    .frames
                    .last()
                    .map(|f| Fst::<A>::target_has_arcs(&f.arc))
                    .unwrap_or(false);
                if top_has_arcs {
                    // keys extending the current one come next
                    self.descend();
                } else if !self.advance_or_pop() {
                    self.state = State::Done;
                    return None;
                }
            }
        }
        self.emit_min()
    }

    /// Smallest key `>= target`, or `None` when `target` exceeds all keys.
    /// A failed seek exhausts the cursor.
    pub fn seek_ceil(&mut self, target: &[u32]) -> Option<(&[u32], A::Value)> {
        if target.is_empty() {
            self.frames.clear();
            self.input.clear();
            self.state = State::Start;
            return self.next();
        }
        let mut depth = self.common_depth(target);
        self.frames.truncate(depth);
        self.input.truncate(depth);
        self.state = State::Active;

        loop {
            if depth == target.len() {
                // full target matched
                let top = self.frames.last().expect("matched depth > 0");
                if top.arc.is_final() {
                    let v = self.value_at_top();
                    return Some((&self.input, v));
                }
                if Fst::<A>::target_has_arcs(&top.arc) {
                    self.descend();
                    return self.emit_min();
                }
                return self.backtrack_ceil();
            }
            let (parent_arc, base) = self.parent_at(depth);
            let found = if Fst::<A>::target_has_arcs(&parent_arc) {
                self.seek_arc_ge(&parent_arc, target[depth])
            } else {
                None
            };
            match found {
                Some(arc) if arc.label == target[depth] => {
                    self.input.push(arc.label);
                    self.frames.push(Frame { arc, base });
                    depth += 1;
                }
                Some(arc) => {
                    // divergence upward: smallest key through this arc wins
                    self.input.push(arc.label);
                    self.frames.push(Frame { arc, base });
                    return self.emit_min();
                }
                None => return self.backtrack_ceil(),
            }
        }
    }

    /// Largest key `<= target`, or `None` when `target` sorts below every
    /// key. A failed seek exhausts the cursor.
    pub fn seek_floor(&mut self, target: &[u32]) -> Option<(&[u32], A::Value)> {
        if target.is_empty() {
            self.frames.clear();
            self.input.clear();
            let root = self.fst.root_arc();
            if root.is_final() {
                self.state = State::EmittedEmpty;
                return Some((&self.input, root.final_output));
            }
            self.state = State::Done;
            return None;
        }
        let mut depth = self.common_depth(target);
        self.frames.truncate(depth);
        self.input.truncate(depth);
        self.state = State::Active;

        loop {
            if depth == target.len() {
                let top = self.frames.last().expect("matched depth > 0");
                if top.arc.is_final() {
                    // exact hit
                    let v = self.value_at_top();
                    return Some((&self.input, v));
                }
                // every key below extends the target, hence sorts above it
                return self.backtrack_floor();
            }
            let (parent_arc, base) = self.parent_at(depth);
            let found = if Fst::<A>::target_has_arcs(&parent_arc) {
                self.seek_arc_le(&parent_arc, target[depth])
            } else {
                None
            };
            match found {
                Some((arc, true)) => {
                    self.input.push(arc.label);
                    self.frames.push(Frame { arc, base });
                    depth += 1;
                }
                Some((arc, false)) => {
                    // divergence downward: largest key through this arc wins
                    self.input.push(arc.label);
                    self.frames.push(Frame { arc, base });
                    return self.emit_max();
                }
                None => {
                    // nothing at or below target here; the matched prefix
                    // itself is the next candidate
                    if depth == 0 {
                        let root = self.fst.root_arc();
                        if root.is_final() {
                            self.state = State::EmittedEmpty;
                            return Some((&self.input, root.final_output));
                        }
                        self.state = State::Done;
                        return None;
                    }
                    if parent_arc.is_final() {
                        let v = self.value_at_top();
                        return Some((&self.input, v));
                    }
                    return self.backtrack_floor();
                }
            }
        }
    }

    /// Output of exactly `target`, positioning the cursor like
    /// [`FstEnum::seek_ceil`]; `None` when absent.
    pub fn seek_exact(&mut self, target: &[u32]) -> Option<A::Value> {
        match self.seek_ceil(target) {
            Some((key, v)) if key == target => Some(v),
            _ => None,
        }
    }

    /// Drain the rest of the cursor into owned pairs.
    pub fn collect_remaining(&mut self) -> Vec<(Vec<u32>, A::Value)> {
        let mut out = Vec::new();
        while let Some((key, value)) = self.next() {
            out.push((key.to_vec(), value));
        }
        out
    }

    // ------------------------------------------------------------------
    // internals
    // ------------------------------------------------------------------

    /// Depth up to which the current stack already matches `target`.
    fn common_depth(&self, target: &[u32]) -> usize {
        let mut d = 0;
        while d < self.frames.len() && d < target.len() && self.input[d] == target[d] {
            d += 1;
        }
        d
    }

    fn parent_at(&self, depth: usize) -> (Arc<A::Value>, A::Value) {
        if depth == 0 {
            (self.fst.root_arc(), self.fst.algebra().no_output())
        } else {
            let f = &self.frames[depth - 1];
            (f.arc.clone(), self.fst.algebra().add(&f.base, &f.arc.output))
        }
    }

    fn value_at_top(&self) -> A::Value {
        let top = self.frames.last().expect("cursor positioned");
        let alg = self.fst.algebra();
        alg.add(&alg.add(&top.base, &top.arc.output), &top.arc.final_output)
    }

    fn descend_from_root(&mut self) -> bool {
        let root = self.fst.root_arc();
        if !Fst::<A>::target_has_arcs(&root) {
            return false;
        }
        let mut arc = self.fst.root_arc();
        self.fst.read_first_target_arc(&root, &mut arc);
        self.input.push(arc.label);
        self.frames.push(Frame {
            arc,
            base: self.fst.algebra().no_output(),
        });
        true
    }

    /// Push the first arc of the current top's target node.
    fn descend(&mut self) {
        let (from, base) = {
            let top = self.frames.last().expect("descend with empty stack");
            (
                top.arc.clone(),
                self.fst.algebra().add(&top.base, &top.arc.output),
            )
        };
        let mut arc = self.fst.root_arc();
        self.fst.read_first_target_arc(&from, &mut arc);
        self.input.push(arc.label);
        self.frames.push(Frame { arc, base });
    }

    /// Push the last arc of the current top's target node.
    fn descend_last(&mut self) {
        let (from, base) = {
            let top = self.frames.last().expect("descend with empty stack");
            (
                top.arc.clone(),
                self.fst.algebra().add(&top.base, &top.arc.output),
            )
        };
        let mut arc = self.fst.root_arc();
        self.fst.read_last_target_arc(&from, &mut arc);
        self.input.push(arc.label);
        self.frames.push(Frame { arc, base });
    }

    /// Advance the top arc to its next sibling, popping exhausted frames.
    fn advance_or_pop(&mut self) -> bool {
        loop {
            let fst = self.fst;
            match self.frames.last_mut() {
                None => return false,
                Some(top) => {
                    if fst.read_next_arc(&mut top.arc) {
                        if let Some(slot) = self.input.last_mut() {
                            *slot = top.arc.label;
                        }
                        return true;
                    }
                }
            }
            self.frames.pop();
            self.input.pop();
        }
    }

    /// Walk first-arcs down from the current top until a final arc, emit it.
    fn emit_min(&mut self) -> Option<(&[u32], A::Value)> {
        loop {
            let top_final = self.frames.last().expect("cursor positioned").arc.is_final();
            if top_final {
                let v = self.value_at_top();
                return Some((&self.input, v));
            }
            self.descend();
        }
    }

    /// Walk last-arcs down from the current top to the deepest key, emit it.
    fn emit_max(&mut self) -> Option<(&[u32], A::Value)> {
        loop {
            let top_has_arcs = {
                let top = self.frames.last().expect("cursor positioned");
                Fst::<A>::target_has_arcs(&top.arc)
            };
            if !top_has_arcs {
                debug_assert!(self.frames.last().expect("cursor positioned").arc.is_final());
                let v = self.value_at_top();
                return Some((&self.input, v));
            }
            self.descend_last();
        }
    }

    fn backtrack_ceil(&mut self) -> Option<(&[u32], A::Value)> {
        if self.advance_or_pop() {
            self.emit_min()
        } else {
            self.state = State::Done;
            None
        }
    }

    fn backtrack_floor(&mut self) -> Option<(&[u32], A::Value)> {
        loop {
            let top = match self.frames.pop() {
                None => break,
                Some(t) => t,
            };
            self.input.pop();
            let parent_arc = match self.frames.last() {
                Some(f) => f.arc.clone(),
                None => self.fst.root_arc(),
            };
            if let Some(arc) = self.seek_arc_lt(&parent_arc, top.arc.label) {
                self.input.push(arc.label);
                self.frames.push(Frame {
                    arc,
                    base: top.base,
                });
                return self.emit_max();
            }
            // no smaller sibling; the prefix ending at the parent, if final,
            // is the floor
            if let Some(f) = self.frames.last() {
                if f.arc.is_final() {
                    let v = self.value_at_top();
                    return Some((&self.input, v));
                }
            }
        }
        // ran off the root: only the empty key can still qualify
        let root = self.fst.root_arc();
        if root.is_final() {
            self.state = State::EmittedEmpty;
            return Some((&self.input, root.final_output));
        }
        self.state = State::Done;
        None
    }

    /// First arc with `label >= wanted` on the node `node_arc` points at.
    fn seek_arc_ge(&self, node_arc: &Arc<A::Value>, wanted: u32) -> Option<Arc<A::Value>> {
        let mut arc = self.fst.root_arc();
        self.fst.read_first_target_arc(node_arc, &mut arc);
        loop {
            if arc.label >= wanted {
                return Some(arc);
            }
            if !self.fst.read_next_arc(&mut arc) {
                return None;
            }
        }
    }

    /// Last arc with `label <= wanted`; the bool is true on an exact match.
    fn seek_arc_le(
        &self,
        node_arc: &Arc<A::Value>,
        wanted: u32,
    ) -> Option<(Arc<A::Value>, bool)> {
        let mut arc = self.fst.root_arc();
        self.fst.read_first_target_arc(node_arc, &mut arc);
        if arc.label > wanted {
            return None;
        }
        loop {
            if arc.label == wanted {
                return Some((arc, true));
            }
            let best = arc.clone();
            if !self.fst.read_next_arc(&mut arc) || arc.label > wanted {
                return Some((best, false));
            }
        }
    }

    /// Last arc with `label < wanted`.
    fn seek_arc_lt(&self, node_arc: &Arc<A::Value>, wanted: u32) -> Option<Arc<A::Value>> {
        if !Fst::<A>::target_has_arcs(node_arc) {
            return None;
        }
        let mut arc = self.fst.root_arc();
        self.fst.read_first_target_arc(node_arc, &mut arc);
        if arc.label >= wanted {
            return None;
        }
        loop {
            let best = arc.clone();
            if !self.fst.read_next_arc(&mut arc) || arc.label >= wanted {
                return Some(best);
            }
        }
    }
}
