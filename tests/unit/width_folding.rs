//! Width folding behavior through the public filter API.

use mojigram::{collect_tokens, ScriptTokenizer, TokenStream, WidthNormalizer};

fn folded(text: &str) -> Vec<String> {
    let mut stream = WidthNormalizer::new(ScriptTokenizer::new(text));
    collect_tokens(&mut stream)
        .iter()
        .map(|t| t.text_string())
        .collect()
}

#[test]
fn fullwidth_block_folds_to_ascii() {
    // every fullwidth form maps to the shifted basic-Latin codepoint
    for cp in 0xFF01u32..=0xFF5E {
        let Some(full) = char::from_u32(cp) else { continue };
        let expected = char::from_u32(cp - 0xFEE0).unwrap();
        if !expected.is_alphanumeric() {
            // punctuation never survives tokenization; skip
            continue;
        }
        let out = folded(&full.to_string());
        assert_eq!(out, vec![expected.to_string()], "U+{:04X}", cp);
    }
}

#[test]
fn voiced_mark_combines_into_previous_kana() {
    // カ + halfwidth voiced mark -> single ガ codepoint
    let out = folded("カﾞ");
    assert_eq!(out, vec!["ガ".to_string()]);
}

#[test]
fn halfwidth_katakana_words_fold_whole() {
    assert_eq!(folded("ﾊﾟｰｾﾝﾄ"), vec!["パーセント".to_string()]);
    assert_eq!(folded("ﾀﾞﾒ"), vec!["ダメ".to_string()]);
}

#[test]
fn mark_that_cannot_combine_stays_standalone() {
    let mut stream = WidthNormalizer::new(ScriptTokenizer::new("ｱﾞ"));
    assert!(stream.advance());
    // ア does not voice; the mark normalizes to combining U+3099
    assert_eq!(stream.token().text, vec![0x30A2, 0x3099]);
    assert!(!stream.advance());
}

#[test]
fn offsets_are_untouched_by_folding() {
    let mut stream = WidthNormalizer::new(ScriptTokenizer::new("ab ｶﾞｷ cd"));
    let tokens = collect_tokens(&mut stream);
    assert_eq!(tokens.len(), 3);
    // the kana token still spans its original three characters even though
    // folding shrank the text to two codepoints
    assert_eq!((tokens[1].start, tokens[1].end), (3, 6));
    assert_eq!(tokens[1].text, vec![0x30AC, 0x30AD]);
    assert_eq!((tokens[2].start, tokens[2].end), (7, 9));
}
