//! Shared helpers for the integration and property test suites.

#![allow(dead_code)]

use mojigram::{byte_labels, Builder, Fst, InputMode, LongOutputs, Token};

/// Build an FST over sorted (term, output) pairs.
pub fn build_fst(pairs: &[(&str, u64)]) -> Fst<LongOutputs> {
    let mut b = Builder::new(InputMode::Bytes, LongOutputs);
    for (k, v) in pairs {
        b.add(&byte_labels(k), *v);
    }
    b.finish().expect("non-empty input")
}

/// Byte labels back to a string (keys built with `byte_labels`).
pub fn labels_to_string(labels: &[u32]) -> String {
    let bytes: Vec<u8> = labels.iter().map(|&l| l as u8).collect();
    String::from_utf8(bytes).expect("valid utf-8 key")
}

/// All keys of an FST in enumeration order, as strings.
pub fn all_keys(fst: &Fst<LongOutputs>) -> Vec<(String, u64)> {
    fst.enumerate()
        .collect_remaining()
        .into_iter()
        .map(|(labels, v)| (labels_to_string(&labels), v))
        .collect()
}

/// Token texts only.
pub fn texts(tokens: &[Token]) -> Vec<String> {
    tokens.iter().map(|t| t.text_string()).collect()
}
