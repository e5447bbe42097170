//! Bigram formation: adjacency, lone characters, unigram interleave, and
//! runs broken by upstream gaps.

use mojigram::{
    collect_tokens, BigramFormer, Script, ScriptSet, ScriptTokenizer, Token, TokenStream,
    TokenType,
};

/// Hand-built upstream for offset-gap scenarios a real tokenizer cannot
/// produce directly (e.g. a stopword filter having removed tokens).
struct VecStream {
    tokens: Vec<Token>,
    pos: usize,
    current: Token,
}

impl VecStream {
    fn new(tokens: Vec<Token>) -> VecStream {
        VecStream {
            tokens,
            pos: 0,
            current: Token::new(),
        }
    }
}

impl TokenStream for VecStream {
    fn advance(&mut self) -> bool {
        if self.pos < self.tokens.len() {
            self.current = self.tokens[self.pos].clone();
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn token(&self) -> &Token {
        &self.current
    }

    fn token_mut(&mut self) -> &mut Token {
        &mut self.current
    }

    fn reset(&mut self) {
        self.pos = 0;
        self.current.clear();
    }
}

fn han_token(c: char, start: usize) -> Token {
    let mut t = Token::new();
    t.set(&[c as u32], start, start + 1, TokenType::Script(Script::Han));
    t
}

fn gram_texts<S: TokenStream>(stream: &mut S) -> Vec<String> {
    collect_tokens(stream)
        .iter()
        .map(|t| t.text_string())
        .collect()
}

#[test]
fn four_adjacent_codepoints_make_three_bigrams() {
    let mut s = BigramFormer::with_defaults(ScriptTokenizer::new("学生試験"));
    let tokens = collect_tokens(&mut s);
    let texts: Vec<String> = tokens.iter().map(|t| t.text_string()).collect();
    assert_eq!(texts, vec!["学生", "生試", "試験"]);
    assert!(tokens.iter().all(|t| t.ttype == TokenType::Double));
    assert!(tokens.iter().all(|t| t.position_increment == 1));
    assert!(tokens.iter().all(|t| t.position_length == 1));
}

#[test]
fn isolated_codepoint_becomes_single_unigram() {
    let mut s = BigramFormer::with_defaults(ScriptTokenizer::new("x 学 y"));
    let tokens = collect_tokens(&mut s);
    let singles: Vec<&Token> = tokens
        .iter()
        .filter(|t| t.ttype == TokenType::Single)
        .collect();
    assert_eq!(singles.len(), 1);
    assert_eq!(singles[0].text_string(), "学");
}

#[test]
fn unigram_interleave_is_lazy_and_ordered() {
    let mut s = BigramFormer::new(
        ScriptTokenizer::new("学生試"),
        ScriptSet::all(),
        true,
    );
    let tokens = collect_tokens(&mut s);
    let texts: Vec<String> = tokens.iter().map(|t| t.text_string()).collect();
    assert_eq!(texts, vec!["学", "学生", "生", "生試", "試"]);

    for t in &tokens {
        match t.ttype {
            TokenType::Double => {
                assert_eq!(t.position_increment, 0);
                assert_eq!(t.position_length, 2);
            }
            TokenType::Single => {
                assert_eq!(t.position_increment, 1);
                assert_eq!(t.position_length, 1);
            }
            TokenType::Script(_) => panic!("unexpected pass-through"),
        }
    }
}

#[test]
fn upstream_gap_breaks_the_run() {
    // 学[0,1) 生[1,2) then a hole (removed stopword), then 試[5,6) 験[6,7)
    let upstream = VecStream::new(vec![
        han_token('学', 0),
        han_token('生', 1),
        han_token('試', 5),
        han_token('験', 6),
    ]);
    let mut s = BigramFormer::with_defaults(upstream);
    assert_eq!(gram_texts(&mut s), vec!["学生", "試験"]);
}

#[test]
fn gap_after_lone_codepoint_flushes_it_as_unigram() {
    // 学[0,1) then 生[3,4): not adjacent, so each is a loner
    let upstream = VecStream::new(vec![han_token('学', 0), han_token('生', 3)]);
    let mut s = BigramFormer::with_defaults(upstream);
    let tokens = collect_tokens(&mut s);
    let texts: Vec<String> = tokens.iter().map(|t| t.text_string()).collect();
    assert_eq!(texts, vec!["学", "生"]);
    assert!(tokens.iter().all(|t| t.ttype == TokenType::Single));
    // offsets preserved through the deferral
    assert_eq!((tokens[0].start, tokens[0].end), (0, 1));
    assert_eq!((tokens[1].start, tokens[1].end), (3, 4));
}

#[test]
fn non_eligible_script_passes_through_unchanged() {
    let mut s = BigramFormer::new(
        ScriptTokenizer::new("株価がある"),
        ScriptSet::HAN,
        false,
    );
    let tokens = collect_tokens(&mut s);
    let texts: Vec<String> = tokens.iter().map(|t| t.text_string()).collect();
    // hiragana が/あ/る pass through as their original script tokens
    assert_eq!(texts, vec!["株価", "が", "あ", "る"]);
    assert_eq!(tokens[0].ttype, TokenType::Double);
    assert_eq!(tokens[1].ttype, TokenType::Script(Script::Hiragana));
}

#[test]
fn hangul_bigrams_when_enabled() {
    let mut s = BigramFormer::with_defaults(ScriptTokenizer::new("위키백과"));
    assert_eq!(gram_texts(&mut s), vec!["위키", "키백", "백과"]);
}

#[test]
fn reset_clears_deferred_state() {
    let upstream = VecStream::new(vec![han_token('学', 0), han_token('生', 3)]);
    let mut s = BigramFormer::with_defaults(upstream);
    // consume only the first deferred unigram, then reset mid-stream
    assert!(s.advance());
    assert_eq!(s.token().text_string(), "学");
    s.reset();
    assert_eq!(gram_texts(&mut s), vec!["学", "生"]);
}
