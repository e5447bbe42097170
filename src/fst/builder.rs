// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Single-pass construction of a minimal FST from sorted input.
//!
//! The builder keeps one unfrozen node per depth of the last-added key (the
//! frontier). When the next key diverges at depth `d`, everything below `d`
//! can never gain another child — sorted order guarantees it — so those
//! nodes freeze: they serialize to their compact encoding, dedup through an
//! interning map keyed on that encoding (this is what turns the trie into a
//! DAG), and the parent arc swaps its child pointer for the frozen offset.
//!
//! Outputs push down the shared prefix as keys arrive: each prefix arc keeps
//! only the `common` of everything below it, children absorb the remainder.
//!
//! Input order is a hard precondition. Keys must be strictly ascending;
//! violating that would silently build a wrong automaton, so `add` asserts
//! and fails fast instead.

use std::collections::HashMap;
use std::mem;

use crate::fst::bytes::{write_varint, BytesStore};
use crate::fst::outputs::OutputAlgebra;
use crate::fst::{
    CompiledAddr, Fst, InputMode, ARCS_AS_FIXED_ARRAY, BIT_ARC_HAS_FINAL_OUTPUT,
    BIT_ARC_HAS_OUTPUT, BIT_FINAL_ARC, BIT_LAST_ARC, BIT_STOP_NODE, FINAL_END_NODE,
    FIXED_ARRAY_NUM_ARCS, NON_FINAL_END_NODE,
};

// ============================================================================
// OPTIONS
// ============================================================================

/// Construction knobs. The defaults build a minimal unpruned FST.
#[derive(Debug, Clone, Copy)]
pub struct BuilderOptions {
    /// Drop any sub-path traversed by fewer than this many input keys.
    /// 0 disables.
    pub prune1: u64,
    /// Keep a sub-path below the `prune1` bar only while its parent also
    /// clears this bar; decisions about a node depend on its parent's
    /// traversal count, not just its own. 0 disables.
    pub prune2: u64,
    /// Dedup frozen nodes through the interning table. Turning this off
    /// builds a trie-shaped automaton (faster build, larger output).
    pub share_suffix: bool,
    /// Encode high-fan-out nodes as fixed-stride arrays for binary search.
    pub allow_fixed_arrays: bool,
}

impl Default for BuilderOptions {
    fn default() -> Self {
        BuilderOptions {
            prune1: 0,
            prune2: 0,
            share_suffix: true,
            allow_fixed_arrays: true,
        }
    }
}

// ============================================================================
// UNFROZEN NODES
// ============================================================================

/// Where an arc points while the automaton is under construction.
enum Target<V> {
    /// The frontier child one depth below (the path still being extended).
    Open,
    /// A frozen node in the byte store, or an end-node sentinel.
    Frozen(CompiledAddr),
    /// An orphaned unfrozen node whose prune decision is still pending
    /// (only with `prune2` active).
    Deferred(Box<UnCompiledNode<V>>),
}

struct BuilderArc<V> {
    label: u32,
    target: Target<V>,
    output: V,
    next_final_output: V,
    is_final: bool,
}

/// A node that can still gain children. Owned by the builder's frontier (or
/// boxed on a parent arc while a prune decision is pending).
struct UnCompiledNode<V> {
    arcs: Vec<BuilderArc<V>>,
    is_final: bool,
    /// Final output (the remainder stored when this node accepts).
    output: V,
    /// How many input keys have passed through this node; drives pruning.
    input_count: u64,
}

impl<V: Clone + PartialEq + std::fmt::Debug> UnCompiledNode<V> {
    fn new(no_output: V) -> UnCompiledNode<V> {
        UnCompiledNode {
            arcs: Vec::new(),
            is_final: false,
            output: no_output,
            input_count: 0,
        }
    }

    fn add_arc(&mut self, label: u32, no_output: V) {
        debug_assert!(
            self.arcs.last().map_or(true, |a| a.label < label),
            "arc labels must be added in ascending order"
        );
        self.arcs.push(BuilderArc {
            label,
            target: Target::Open,
            output: no_output.clone(),
            next_final_output: no_output,
            is_final: false,
        });
    }

    fn last_arc_mut(&mut self, label: u32) -> &mut BuilderArc<V> {
        let arc = self.arcs.last_mut().expect("node has no arcs");
        debug_assert_eq!(arc.label, label);
        arc
    }

    fn replace_last(&mut self, label: u32, target: Target<V>, next_final_output: V, is_final: bool) {
        let arc = self.last_arc_mut(label);
        arc.target = target;
        arc.next_final_output = next_final_output;
        arc.is_final = is_final;
    }

    fn delete_last(&mut self, label: u32) {
        debug_assert_eq!(self.arcs.last().map(|a| a.label), Some(label));
        self.arcs.pop();
    }

    fn set_last_output(&mut self, label: u32, output: V) {
        self.last_arc_mut(label).output = output;
    }

    fn last_output(&self, label: u32) -> V {
        let arc = self.arcs.last().expect("node has no arcs");
        debug_assert_eq!(arc.label, label);
        arc.output.clone()
    }

    /// Push `prefix` in front of everything leaving or ending at this node.
    fn prepend_output<A: OutputAlgebra<Value = V>>(&mut self, prefix: &V, algebra: &A) {
        for arc in &mut self.arcs {
            arc.output = algebra.add(prefix, &arc.output);
        }
        if self.is_final {
            self.output = algebra.add(prefix, &self.output);
        }
    }
}

// ============================================================================
// BUILDER
// ============================================================================

/// Builds an [`Fst`] from strictly ascending (key, output) pairs.
pub struct Builder<A: OutputAlgebra> {
    algebra: A,
    input_mode: InputMode,
    opts: BuilderOptions,
    bytes: BytesStore,
    /// Interning table: canonical node encoding -> frozen offset.
    dedup: Option<HashMap<Vec<u8>, CompiledAddr>>,
    frontier: Vec<UnCompiledNode<A::Value>>,
    last_input: Vec<u32>,
    empty_output: Option<A::Value>,
    pair_count: u64,
    node_count: u64,
    arc_count: u64,
}

impl<A: OutputAlgebra> Builder<A> {
    pub fn new(input_mode: InputMode, algebra: A) -> Builder<A> {
        Builder::with_options(input_mode, algebra, BuilderOptions::default())
    }

    pub fn with_options(input_mode: InputMode, algebra: A, opts: BuilderOptions) -> Builder<A> {
        let root = UnCompiledNode::new(algebra.no_output());
        Builder {
            algebra,
            input_mode,
            opts,
            bytes: BytesStore::new(),
            dedup: if opts.share_suffix { Some(HashMap::new()) } else { None },
            frontier: vec![root],
            last_input: Vec::new(),
            empty_output: None,
            pair_count: 0,
            node_count: 0,
            arc_count: 0,
        }
    }

    /// Keys added so far.
    pub fn pair_count(&self) -> u64 {
        self.pair_count
    }

    fn ensure_frontier(&mut self, len: usize) {
        while self.frontier.len() < len {
            self.frontier.push(UnCompiledNode::new(self.algebra.no_output()));
        }
    }

    /// Add the next (key, output) pair.
    ///
    /// # Panics
    ///
    /// Keys must arrive in strictly ascending order (no duplicates); this
    /// asserts rather than build a silently wrong automaton. The empty key
    /// is allowed only first.
    pub fn add(&mut self, input: &[u32], output: A::Value) {
        if self.pair_count > 0 {
            assert!(
                input > self.last_input.as_slice(),
                "inputs must be strictly ascending: got {:?} after {:?}",
                input,
                self.last_input
            );
        }
        self.pair_count += 1;

        if input.is_empty() {
            // only representable as metadata: finality lives on incoming
            // arcs and the root has none
            self.frontier[0].input_count += 1;
            self.frontier[0].is_final = true;
            self.empty_output = Some(output);
            return;
        }

        self.ensure_frontier(input.len() + 1);

        // shared prefix scan; every node on the surviving path counts this key
        let pos_stop = self.last_input.len().min(input.len());
        let mut pos = 0;
        loop {
            self.frontier[pos].input_count += 1;
            if pos >= pos_stop || self.last_input[pos] != input[pos] {
                break;
            }
            pos += 1;
        }
        let prefix_len_plus1 = pos + 1;

        // freeze the previous key's orphaned suffix
        self.freeze_tail(prefix_len_plus1);

        // grow the new suffix
        for idx in prefix_len_plus1..=input.len() {
            let no = self.algebra.no_output();
            self.frontier[idx - 1].add_arc(input[idx - 1], no);
            self.frontier[idx].input_count += 1;
        }
        let no = self.algebra.no_output();
        let last = &mut self.frontier[input.len()];
        last.is_final = true;
        last.output = no;

        // push the conflicting outputs forward, only as far as needed
        let mut output = output;
        for idx in 1..prefix_len_plus1 {
            let (head, tail) = self.frontier.split_at_mut(idx);
            let parent = &mut head[idx - 1];
            let node = &mut tail[0];
            let last_output = parent.last_output(input[idx - 1]);
            if !self.algebra.is_no_output(&last_output) {
                let common = self.algebra.common(&output, &last_output);
                let word_suffix = self.algebra.subtract(&last_output, &common);
                parent.set_last_output(input[idx - 1], common.clone());
                node.prepend_output(&word_suffix, &self.algebra);
                output = self.algebra.subtract(&output, &common);
            }
        }

        // the divergent arc keeps whatever wasn't absorbed by the prefix
        self.frontier[prefix_len_plus1 - 1].set_last_output(input[prefix_len_plus1 - 1], output);
        self.last_input.clear();
        self.last_input.extend_from_slice(input);
    }

    /// Freeze (or prune) every frontier node below the shared-prefix depth.
    fn freeze_tail(&mut self, prefix_len_plus1: usize) {
        let down_to = prefix_len_plus1.max(1);
        if self.last_input.len() < down_to {
            return;
        }
        for idx in (down_to..=self.last_input.len()).rev() {
            let no = self.algebra.no_output();
            let mut node = mem::replace(&mut self.frontier[idx], UnCompiledNode::new(no));
            let parent_count = self.frontier[idx - 1].input_count;

            let do_prune;
            let do_compile;
            if node.input_count < self.opts.prune1 {
                do_prune = true;
                do_compile = true;
            } else if idx > prefix_len_plus1 {
                // prune when the parent, about to freeze, doesn't make the
                // cut; with prune2 == 1 keep only up to the divergent edge
                do_prune = parent_count < self.opts.prune2
                    || (self.opts.prune2 == 1 && parent_count == 1 && idx > 1);
                do_compile = true;
            } else {
                // at the prefix boundary the node stays in play unless
                // pruning forces a decision now
                do_prune = false;
                do_compile = self.opts.prune2 == 0;
            }

            if node.input_count < self.opts.prune2
                || (self.opts.prune2 == 1 && node.input_count == 1 && idx > 1)
            {
                // this node's subtree doesn't survive: drop all arcs
                // (deferred children go with them)
                node.arcs.clear();
            }

            let label = self.last_input[idx - 1];
            if do_prune {
                self.frontier[idx - 1].delete_last(label);
            } else {
                let next_final_output = node.output.clone();
                // dead ends are faked final: enumeration and reverse lookup
                // would otherwise trip over non-final sinks
                let is_final = node.is_final || node.arcs.is_empty();
                if do_compile {
                    let compiled = self.compile_node(node);
                    self.frontier[idx - 1].replace_last(
                        label,
                        Target::Frozen(compiled),
                        next_final_output,
                        is_final,
                    );
                } else {
                    self.frontier[idx - 1].replace_last(
                        label,
                        Target::Deferred(Box::new(node)),
                        next_final_output,
                        is_final,
                    );
                }
            }
        }
    }

    /// Freeze one node: resolve pending children, encode, dedup, emit.
    fn compile_node(&mut self, mut node: UnCompiledNode<A::Value>) -> CompiledAddr {
        // resolve children parked by prune2's deferred decisions
        for i in 0..node.arcs.len() {
            if matches!(node.arcs[i].target, Target::Deferred(_)) {
                let taken = mem::replace(&mut node.arcs[i].target, Target::Frozen(0));
                if let Target::Deferred(mut child) = taken {
                    if child.arcs.is_empty() {
                        child.is_final = true;
                        node.arcs[i].is_final = true;
                    }
                    let addr = self.compile_node(*child);
                    node.arcs[i].target = Target::Frozen(addr);
                }
            }
        }

        if node.arcs.is_empty() {
            return if node.is_final {
                FINAL_END_NODE
            } else {
                NON_FINAL_END_NODE
            };
        }

        // per-arc encoding; the concatenation is both the canonical dedup
        // key and the variable-layout serialization
        let num = node.arcs.len();
        let mut blocks: Vec<Vec<u8>> = Vec::with_capacity(num);
        for (i, arc) in node.arcs.iter().enumerate() {
            let target = match arc.target {
                Target::Frozen(addr) => addr,
                Target::Open | Target::Deferred(_) => {
                    unreachable!("child not frozen before parent")
                }
            };
            let mut flags = 0u8;
            if arc.is_final {
                flags |= BIT_FINAL_ARC;
            }
            if i == num - 1 {
                flags |= BIT_LAST_ARC;
            }
            if target <= 0 {
                flags |= BIT_STOP_NODE;
            }
            let has_output = !self.algebra.is_no_output(&arc.output);
            let has_final = !self.algebra.is_no_output(&arc.next_final_output);
            if has_output {
                flags |= BIT_ARC_HAS_OUTPUT;
            }
            if has_final {
                flags |= BIT_ARC_HAS_FINAL_OUTPUT;
            }

            let mut block = Vec::new();
            block.push(flags);
            write_varint(&mut block, u64::from(arc.label));
            if has_output {
                self.algebra.write(&arc.output, &mut block);
            }
            if has_final {
                self.algebra.write(&arc.next_final_output, &mut block);
            }
            if target > 0 {
                write_varint(&mut block, target as u64);
            }
            blocks.push(block);
        }

        let key: Vec<u8> = blocks.concat();
        if let Some(dedup) = &self.dedup {
            if let Some(&addr) = dedup.get(&key) {
                return addr;
            }
        }
        let addr = self.emit_node(&blocks, &key);
        if let Some(dedup) = &mut self.dedup {
            dedup.insert(key, addr);
        }
        addr
    }

    fn emit_node(&mut self, blocks: &[Vec<u8>], variable: &[u8]) -> CompiledAddr {
        self.node_count += 1;
        self.arc_count += blocks.len() as u64;
        if self.opts.allow_fixed_arrays && blocks.len() >= FIXED_ARRAY_NUM_ARCS {
            let bytes_per_arc = blocks.iter().map(|b| b.len()).max().unwrap_or(1);
            let mut out =
                Vec::with_capacity(1 + 10 + 10 + bytes_per_arc * blocks.len());
            out.push(ARCS_AS_FIXED_ARRAY);
            write_varint(&mut out, blocks.len() as u64);
            write_varint(&mut out, bytes_per_arc as u64);
            for block in blocks {
                out.extend_from_slice(block);
                out.resize(out.len() + (bytes_per_arc - block.len()), 0);
            }
            self.bytes.append_reversed(&out)
        } else {
            self.bytes.append_reversed(variable)
        }
    }

    /// Freeze everything left and return the compiled FST. `None` when no
    /// key was accepted (nothing added, or pruning removed everything).
    pub fn finish(mut self) -> Option<Fst<A>> {
        self.freeze_tail(0);
        let no = self.algebra.no_output();
        let root = mem::replace(&mut self.frontier[0], UnCompiledNode::new(no));

        if root.input_count < self.opts.prune1
            || root.input_count < self.opts.prune2
            || root.arcs.is_empty()
        {
            if self.empty_output.is_none() {
                return None;
            }
            if self.opts.prune1 > 0 || self.opts.prune2 > 0 {
                // the empty key was pruned with everything else
                return None;
            }
        }

        let start_node = self.compile_node(root);
        let Builder {
            algebra,
            input_mode,
            bytes,
            empty_output,
            node_count,
            arc_count,
            ..
        } = self;
        Some(Fst {
            algebra,
            data: bytes.into_vec(),
            start_node,
            empty_output,
            input_mode,
            node_count,
            arc_count,
        })
    }
}
