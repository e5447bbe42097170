//! The full data path: documents through the CJK chain into a term
//! dictionary, queried from multiple threads.

use std::collections::BTreeSet;
use std::sync::Arc as StdArc;
use std::thread;

use mojigram::{CjkAnalyzer, ScriptSet, TermDictionary};

fn build_dict(docs: &[&str], analyzer: &CjkAnalyzer) -> TermDictionary {
    let mut terms: BTreeSet<String> = BTreeSet::new();
    for doc in docs {
        for token in analyzer.analyze(doc) {
            terms.insert(token.text_string());
        }
    }
    TermDictionary::build(&terms).expect("corpus has terms")
}

#[test]
fn japanese_corpus_end_to_end() {
    let docs = [
        "多くの学生が試験に落ちた",
        "東京タワーの高さは333メートル",
        "ＡＩによる全文検索エンジン",
    ];
    let dict = build_dict(&docs, &CjkAnalyzer::new());

    // bigrams from each document
    for gram in ["学生", "試験", "東京", "検索"] {
        assert!(dict.contains(gram), "missing {}", gram);
    }
    // width folding happened: fullwidth ＡＩ became ascii, lowercased
    assert!(dict.contains("ai"));
    // ordinals are dense and reversible
    for ord in 0..dict.len() {
        let term = dict.term(ord).expect("dense ordinal");
        assert_eq!(dict.ord(&term), Some(ord));
    }
}

#[test]
fn query_grams_align_with_index_grams() {
    let analyzer = CjkAnalyzer::new();
    let dict = build_dict(&["試験に合格する方法"], &analyzer);
    for token in analyzer.analyze("試験に合格") {
        assert!(
            dict.contains(&token.text_string()),
            "query gram {:?} not indexed",
            token.text_string()
        );
    }
}

#[test]
fn script_restriction_carries_through() {
    let analyzer = CjkAnalyzer::new().scripts(ScriptSet::HAN);
    let dict = build_dict(&["東京タワー"], &analyzer);
    assert!(dict.contains("東京"));
    // katakana passed through as one untouched token
    assert!(dict.contains("タワー"));
    assert!(!dict.contains("タワ"));
}

#[test]
fn unigram_mode_indexes_both_granularities() {
    let analyzer = CjkAnalyzer::new().output_unigrams(true);
    let dict = build_dict(&["検索"], &analyzer);
    assert!(dict.contains("検"));
    assert!(dict.contains("索"));
    assert!(dict.contains("検索"));
}

#[test]
fn concurrent_readers_share_one_dictionary() {
    let docs = ["自然言語処理による全文検索", "東京と大阪の案内"];
    let dict = StdArc::new(build_dict(&docs, &CjkAnalyzer::new()));

    let mut handles = Vec::new();
    for worker in 0u64..4 {
        let dict = StdArc::clone(&dict);
        handles.push(thread::spawn(move || {
            // each thread uses its own cursors; the dictionary is shared
            for round in 0u64..50 {
                let ord = (worker + round) % dict.len();
                let term = dict.term(ord).expect("dense ordinal");
                assert_eq!(dict.ord(&term), Some(ord));
                let (ceil, _) = dict.seek_ceil(&term).expect("term exists");
                assert_eq!(ceil, term);
            }
        }));
    }
    for h in handles {
        h.join().expect("reader thread");
    }
}
