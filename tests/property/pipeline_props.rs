//! Randomized analysis-chain invariants over generated mixed-script text.

use proptest::prelude::*;

use mojigram::{collect_tokens, BigramFormer, ScriptSet, ScriptTokenizer, TokenType};

fn mixed_text() -> impl Strategy<Value = String> {
    // han runs, kana runs, ascii words and separators, concatenated
    let chunk = prop_oneof![
        proptest::string::string_regex("[\\u{4E00}-\\u{4E40}]{1,6}").unwrap(),
        proptest::string::string_regex("[\\u{30A1}-\\u{30F4}]{1,5}").unwrap(),
        proptest::string::string_regex("[a-z]{1,7}").unwrap(),
        Just(" ".to_string()),
        Just("、".to_string()),
    ];
    prop::collection::vec(chunk, 1..12).prop_map(|chunks| chunks.concat())
}

proptest! {
    #[test]
    fn offsets_are_monotonic_and_in_bounds(text in mixed_text()) {
        let char_count = text.chars().count();
        let mut stream = BigramFormer::with_defaults(ScriptTokenizer::new(&text));
        let mut last_start = 0usize;
        for token in collect_tokens(&mut stream) {
            prop_assert!(token.start <= token.end);
            prop_assert!(token.end <= char_count);
            prop_assert!(token.start >= last_start, "offsets went backwards");
            last_start = token.start;
            prop_assert!(!token.text.is_empty());
        }
    }

    #[test]
    fn gram_text_matches_its_offsets(text in mixed_text()) {
        let chars: Vec<char> = text.chars().collect();
        let mut stream = BigramFormer::with_defaults(ScriptTokenizer::new(&text));
        for token in collect_tokens(&mut stream) {
            // every emitted token's text is exactly the input slice its
            // offsets claim
            let slice: String = chars[token.start..token.end].iter().collect();
            prop_assert_eq!(token.text_string(), slice);
        }
    }

    #[test]
    fn unigram_mode_is_a_superset(text in mixed_text()) {
        let mut bigrams_only =
            BigramFormer::new(ScriptTokenizer::new(&text), ScriptSet::all(), false);
        let mut with_unigrams =
            BigramFormer::new(ScriptTokenizer::new(&text), ScriptSet::all(), true);
        let plain: Vec<String> = collect_tokens(&mut bigrams_only)
            .iter()
            .filter(|t| t.ttype == TokenType::Double)
            .map(|t| t.text_string())
            .collect();
        let expanded: Vec<String> = collect_tokens(&mut with_unigrams)
            .iter()
            .map(|t| t.text_string())
            .collect();
        // every bigram from plain mode appears in unigram mode too
        for gram in &plain {
            prop_assert!(expanded.contains(gram), "missing {:?}", gram);
        }
    }

    #[test]
    fn positions_never_decrease(text in mixed_text()) {
        let mut stream = BigramFormer::new(
            ScriptTokenizer::new(&text),
            ScriptSet::all(),
            true,
        );
        // position_increment 0 is allowed (synonym bigrams), but the
        // running position total only moves forward
        let mut total: u64 = 0;
        for token in collect_tokens(&mut stream) {
            total += u64::from(token.position_increment);
        }
        let mut plain = BigramFormer::new(ScriptTokenizer::new(&text), ScriptSet::all(), false);
        let plain_count = collect_tokens(&mut plain).len() as u64;
        // with unigrams on, positions advance once per unigram; never more
        // than the plain token count plus the unigram count
        prop_assert!(total >= plain_count / 2);
    }
}
