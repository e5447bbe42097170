//! Pruned construction against a brute-force prefix-count oracle.

use std::collections::{BTreeMap, BTreeSet};

use mojigram::{byte_labels, Builder, BuilderOptions, InputMode, NoOutputs};

use crate::common::labels_to_string;

/// Model of prune1: count every prefix, drop nodes traversed by fewer than
/// `k` keys. A surviving node is accepted when it was a real key, or when
/// it had children and every one of them was dropped (the automaton fakes
/// such dead ends final).
fn prune1_oracle(keys: &[&str], k: u64) -> Vec<String> {
    let mut counts: BTreeMap<String, u64> = BTreeMap::new();
    let mut children: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
    let key_set: BTreeSet<&str> = keys.iter().copied().collect();

    for key in keys {
        for depth in 1..=key.len() {
            if !key.is_char_boundary(depth) {
                continue;
            }
            let prefix = key[..depth].to_string();
            *counts.entry(prefix.clone()).or_insert(0) += 1;
            if depth > 1 {
                let parent_depth = (1..depth).rev().find(|&d| key.is_char_boundary(d));
                if let Some(pd) = parent_depth {
                    children
                        .entry(key[..pd].to_string())
                        .or_default()
                        .insert(prefix.clone());
                }
            }
        }
    }

    let mut accepted = Vec::new();
    for (prefix, &count) in &counts {
        if count < k {
            continue;
        }
        let is_key = key_set.contains(prefix.as_str());
        let kids = children.get(prefix);
        let all_children_dropped = match kids {
            Some(kids) => kids.iter().all(|c| counts[c] < k),
            None => false,
        };
        if is_key || all_children_dropped {
            accepted.push(prefix.clone());
        }
    }
    accepted
}

fn build_pruned(keys: &[&str], prune1: u64, prune2: u64) -> Vec<String> {
    let mut b = Builder::with_options(
        InputMode::Bytes,
        NoOutputs,
        BuilderOptions {
            prune1,
            prune2,
            // pruned term indexes don't share suffixes: counts decide
            // structure, not structure alone
            share_suffix: false,
            ..BuilderOptions::default()
        },
    );
    for k in keys {
        b.add(&byte_labels(k), ());
    }
    match b.finish() {
        Some(fst) => fst
            .enumerate()
            .collect_remaining()
            .into_iter()
            .map(|(labels, _)| labels_to_string(&labels))
            .collect(),
        None => Vec::new(),
    }
}

#[test]
fn prune1_matches_oracle_on_branching_corpus() {
    let keys = ["cap", "car", "cat", "dog"];
    let got = build_pruned(&keys, 2, 0);
    assert_eq!(got, prune1_oracle(&keys, 2));
    assert_eq!(got, vec!["ca".to_string()]);
}

#[test]
fn prune1_matches_oracle_on_nested_prefixes() {
    let keys = ["aa", "aab", "aac", "ab", "b", "ba"];
    let got = build_pruned(&keys, 2, 0);
    assert_eq!(got, prune1_oracle(&keys, 2));
    assert_eq!(got, vec!["aa".to_string(), "b".to_string()]);
}

#[test]
fn prune1_one_keeps_everything() {
    let keys = ["lease", "least", "leave"];
    let got = build_pruned(&keys, 1, 0);
    let want: Vec<String> = keys.iter().map(|k| k.to_string()).collect();
    assert_eq!(got, want);
}

#[test]
fn prune1_threshold_above_total_drops_all() {
    let keys = ["x", "y"];
    assert!(build_pruned(&keys, 3, 0).is_empty());
}

#[test]
fn prune2_keeps_only_the_divergent_part() {
    // apple/apply share everything but the last character, so both full
    // keys survive; banana is unique from its first character and shrinks
    // to that distinguishing edge
    let keys = ["apple", "apply", "banana"];
    let got = build_pruned(&keys, 0, 1);
    assert_eq!(
        got,
        vec!["apple".to_string(), "apply".to_string(), "b".to_string()]
    );
}

#[test]
fn surviving_paths_meet_the_count_bar() {
    // every accepted key in the pruned automaton was a prefix of at least
    // `k` original inputs
    let keys = ["aaa", "aab", "aba", "abb", "abc", "bbb"];
    let k = 2;
    let got = build_pruned(&keys, k, 0);
    assert!(!got.is_empty());
    for surviving in &got {
        let traversals = keys.iter().filter(|key| key.starts_with(surviving.as_str())).count();
        assert!(
            traversals as u64 >= k,
            "{} only traversed {} times",
            surviving,
            traversals
        );
    }
    assert_eq!(got, prune1_oracle(&keys, k));
}
