//! Randomized FST properties: round trips, ordering, seeks, reverse
//! lookup, and serialization parity, with a brute-force model as oracle.

use proptest::prelude::*;

use crate::common::{all_keys, build_fst, labels_to_string};
use mojigram::{
    byte_labels, codepoint_labels, get_by_output, Builder, BuilderOptions, BytesOutputs, Fst,
    InputMode, LongOutputs,
};

fn key_strategy() -> impl Strategy<Value = String> {
    proptest::string::string_regex("[a-e]{1,8}").unwrap()
}

fn sorted_keys(range: std::ops::Range<usize>) -> impl Strategy<Value = Vec<String>> {
    prop::collection::btree_set(key_strategy(), range)
        .prop_map(|set| set.into_iter().collect())
}

proptest! {
    #[test]
    fn ordinal_outputs_round_trip_both_directions(keys in sorted_keys(1..50)) {
        let pairs: Vec<(&str, u64)> = keys.iter()
            .enumerate()
            .map(|(i, k)| (k.as_str(), i as u64))
            .collect();
        let fst = build_fst(&pairs);

        for (k, ord) in &pairs {
            prop_assert_eq!(fst.get(&byte_labels(k)), Some(*ord));
            let back = get_by_output(&fst, *ord).expect("dense ordinal");
            prop_assert_eq!(labels_to_string(&back), k.to_string());
        }
        prop_assert_eq!(get_by_output(&fst, keys.len() as u64), None);
    }

    #[test]
    fn enumeration_is_exactly_the_input(keys in sorted_keys(1..60)) {
        let pairs: Vec<(&str, u64)> = keys.iter()
            .enumerate()
            .map(|(i, k)| (k.as_str(), (i as u64) * 7))
            .collect();
        let fst = build_fst(&pairs);
        let listed = all_keys(&fst);
        let expected: Vec<(String, u64)> = pairs.iter()
            .map(|(k, v)| (k.to_string(), *v))
            .collect();
        prop_assert_eq!(listed, expected);
    }

    #[test]
    fn random_probes_hit_iff_stored(keys in sorted_keys(1..40), probes in prop::collection::vec(key_strategy(), 1..20)) {
        let pairs: Vec<(&str, u64)> = keys.iter()
            .enumerate()
            .map(|(i, k)| (k.as_str(), i as u64))
            .collect();
        let fst = build_fst(&pairs);
        for probe in &probes {
            let expected = keys.binary_search(probe).ok().map(|i| i as u64);
            prop_assert_eq!(fst.get(&byte_labels(probe)), expected, "probe {}", probe);
        }
    }

    #[test]
    fn interleaved_seeks_match_model(keys in sorted_keys(2..40), probes in prop::collection::vec(key_strategy(), 1..12)) {
        let pairs: Vec<(&str, u64)> = keys.iter()
            .enumerate()
            .map(|(i, k)| (k.as_str(), i as u64))
            .collect();
        let fst = build_fst(&pairs);
        // one cursor across all probes: seeks must stay correct when they
        // reuse the previous position's stack
        let mut en = fst.enumerate();
        for probe in &probes {
            let expected = keys.iter().find(|k| k.as_str() >= probe.as_str()).cloned();
            let got = en.seek_ceil(&byte_labels(probe)).map(|(l, _)| labels_to_string(l));
            prop_assert_eq!(got, expected, "ceil probe {}", probe);
        }
        let mut en = fst.enumerate();
        for probe in &probes {
            let expected = keys.iter().rev().find(|k| k.as_str() <= probe.as_str()).cloned();
            let got = en.seek_floor(&byte_labels(probe)).map(|(l, _)| labels_to_string(l));
            prop_assert_eq!(got, expected, "floor probe {}", probe);
        }
    }

    #[test]
    fn serialized_form_is_behaviorally_identical(keys in sorted_keys(1..40)) {
        let pairs: Vec<(&str, u64)> = keys.iter()
            .enumerate()
            .map(|(i, k)| (k.as_str(), i as u64 + 1))
            .collect();
        let fst = build_fst(&pairs);
        let mut bytes = Vec::new();
        fst.save(&mut bytes).unwrap();
        let loaded = Fst::load(&bytes, LongOutputs).unwrap();

        prop_assert_eq!(all_keys(&fst), all_keys(&loaded));
        for (k, _) in &pairs {
            prop_assert_eq!(fst.get(&byte_labels(k)), loaded.get(&byte_labels(k)));
        }
        // a probe that is a prefix of a key but not a key behaves the same
        let probe = format!("{}", &keys[0][..keys[0].len().saturating_sub(1)]);
        prop_assert_eq!(fst.get(&byte_labels(&probe)), loaded.get(&byte_labels(&probe)));
    }

    #[test]
    fn bytes_outputs_round_trip(keys in sorted_keys(1..30)) {
        let mut b = Builder::new(InputMode::Bytes, BytesOutputs);
        let values: Vec<Vec<u8>> = keys.iter()
            .map(|k| k.bytes().rev().collect::<Vec<u8>>())
            .collect();
        for (k, v) in keys.iter().zip(&values) {
            b.add(&byte_labels(k), v.clone());
        }
        let fst = b.finish().unwrap();
        for (k, v) in keys.iter().zip(&values) {
            let got = fst.get(&byte_labels(k));
            prop_assert_eq!(got.as_ref(), Some(v));
        }
    }

    #[test]
    fn codepoint_mode_handles_cjk_keys(suffixes in prop::collection::btree_set("[\\u{4E00}-\\u{4E2F}]{1,4}", 1..20)) {
        let keys: Vec<String> = suffixes.into_iter().collect();
        let mut b = Builder::new(InputMode::Codepoints, LongOutputs);
        for (i, k) in keys.iter().enumerate() {
            b.add(&codepoint_labels(k), i as u64);
        }
        let fst = b.finish().unwrap();
        for (i, k) in keys.iter().enumerate() {
            prop_assert_eq!(fst.get(&codepoint_labels(k)), Some(i as u64));
        }
    }

    #[test]
    fn trie_mode_and_dag_mode_agree(keys in sorted_keys(1..30)) {
        let build = |share: bool| {
            let mut b = Builder::with_options(
                InputMode::Bytes,
                LongOutputs,
                BuilderOptions { share_suffix: share, ..BuilderOptions::default() },
            );
            for (i, k) in keys.iter().enumerate() {
                b.add(&byte_labels(k), i as u64);
            }
            b.finish().unwrap()
        };
        prop_assert_eq!(all_keys(&build(true)), all_keys(&build(false)));
    }
}

#[test]
fn wide_fanout_uses_and_searches_fixed_arrays() {
    // 200 distinct first labels exercise the binary-searched layout
    let keys: Vec<String> = (0u8..200)
        .map(|b| format!("{}tail", (b as char)))
        .collect();
    let mut sorted = keys.clone();
    sorted.sort();
    let mut b = Builder::new(InputMode::Codepoints, LongOutputs);
    for (i, k) in sorted.iter().enumerate() {
        b.add(&codepoint_labels(k), i as u64);
    }
    let fst = b.finish().unwrap();
    for (i, k) in sorted.iter().enumerate() {
        assert_eq!(fst.get(&codepoint_labels(k)), Some(i as u64));
    }
    // a first label above every stored one misses
    assert_eq!(fst.get(&codepoint_labels("Ātail")), None);
}
