//! On-disk format durability: files survive the round trip intact, and
//! damaged files are refused loudly instead of traversed.

use std::fs;

use mojigram::{FstError, TermDictionary};

use crate::common::build_fst;

fn sample_dict() -> TermDictionary {
    let terms = ["案内", "検索", "東京", "試験"];
    let mut sorted: Vec<&str> = terms.to_vec();
    sorted.sort();
    TermDictionary::build(sorted).unwrap()
}

#[test]
fn file_round_trip_preserves_everything() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("dict.moji");

    let dict = sample_dict();
    dict.save_to_path(&path).unwrap();
    let loaded = TermDictionary::load_from_path(&path).unwrap();

    assert_eq!(loaded.len(), dict.len());
    let a: Vec<(String, u64)> = dict.iter().collect();
    let b: Vec<(String, u64)> = loaded.iter().collect();
    assert_eq!(a, b);
    assert_eq!(
        loaded.fst().node_count(),
        dict.fst().node_count(),
        "diagnostic counts survive"
    );
}

#[test]
fn every_single_byte_flip_in_header_is_caught() {
    let mut bytes = Vec::new();
    sample_dict().save(&mut bytes).unwrap();
    for i in 0..48 {
        let mut damaged = bytes.clone();
        damaged[i] ^= 0x5A;
        assert!(
            TermDictionary::load(&damaged).is_err(),
            "header byte {} flip went unnoticed",
            i
        );
    }
}

#[test]
fn node_data_corruption_fails_the_checksum() {
    let mut bytes = Vec::new();
    sample_dict().save(&mut bytes).unwrap();
    let mid = bytes.len() - 20;
    bytes[mid] ^= 0x01;
    match TermDictionary::load(&bytes) {
        Err(FstError::Corrupt(reason)) => {
            assert!(reason.contains("checksum"), "unexpected reason: {}", reason)
        }
        other => panic!("expected checksum failure, got {:?}", other.map(|d| d.len())),
    }
}

#[test]
fn truncation_at_any_point_is_refused() {
    let mut bytes = Vec::new();
    sample_dict().save(&mut bytes).unwrap();
    for keep in [0, 10, 47, 48, bytes.len() / 2, bytes.len() - 1] {
        assert!(
            TermDictionary::load(&bytes[..keep]).is_err(),
            "truncation to {} bytes went unnoticed",
            keep
        );
    }
}

#[test]
fn foreign_files_are_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("not-a-dict");
    fs::write(&path, b"just some text, definitely not a dictionary").unwrap();
    assert!(TermDictionary::load_from_path(&path).is_err());
}

#[test]
fn raw_fst_files_and_dictionary_files_are_the_same_format() {
    // a dictionary file is exactly an FST file with ordinal outputs
    let fst = build_fst(&[("ab", 0), ("cd", 1)]);
    let mut bytes = Vec::new();
    fst.save(&mut bytes).unwrap();
    let dict = TermDictionary::load(&bytes).unwrap();
    assert_eq!(dict.len(), 2);
    assert_eq!(dict.ord("cd"), Some(1));
}
