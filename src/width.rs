// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Width normalization: fullwidth ASCII and halfwidth kana folding.
//!
//! This is deliberately not NFKC. It handles exactly the practical CJK width
//! subset: the fullwidth ASCII block shifts down by `0xFEE0`, halfwidth kana
//! map through a fixed table, and the two halfwidth voicing marks combine
//! into the preceding kana when possible (`ｶ` + `ﾞ` becomes the single
//! codepoint `ガ`, shrinking the buffer by one). A mark that cannot combine
//! falls back to its standalone combining form (`U+3099`/`U+309A`).
//!
//! Token offsets are never touched; only the text buffer changes.

use crate::token::{Token, TokenStream};

/// Fullwidth ASCII block.
const FULLWIDTH_START: u32 = 0xFF01;
const FULLWIDTH_END: u32 = 0xFF5E;
/// Distance from a fullwidth form down to its basic-Latin equivalent.
const FULLWIDTH_SHIFT: u32 = 0xFEE0;

/// Halfwidth kana block.
const HALFWIDTH_KANA_START: u32 = 0xFF65;
const HALFWIDTH_KANA_END: u32 = 0xFF9F;
/// Halfwidth voiced / semi-voiced sound marks.
const HW_VOICED_MARK: u32 = 0xFF9E;
const HW_SEMI_VOICED_MARK: u32 = 0xFF9F;
/// Standalone combining marks the halfwidth marks normalize to when they
/// cannot merge into the preceding kana.
const COMBINING_VOICED: u32 = 0x3099;
const COMBINING_SEMI_VOICED: u32 = 0x309A;

/// Kana that can absorb a voicing mark live in this range.
const COMBINABLE_START: u32 = 0x30A6;
const COMBINABLE_END: u32 = 0x30FD;

/// Fullwidth equivalents of `U+FF65..=U+FF9F`, indexed from `U+FF65`.
/// The last two entries are the standalone combining marks; the combining
/// path below is tried first for those.
#[rustfmt::skip]
const KANA_NORM: [u32; 59] = [
    0x30FB, 0x30F2, 0x30A1, 0x30A3, 0x30A5, 0x30A7, 0x30A9, 0x30E3, // ･ｦｧｨｩｪｫｬ
    0x30E5, 0x30E7, 0x30C3, 0x30FC, 0x30A2, 0x30A4, 0x30A6, 0x30A8, // ｭｮｯｰｱｲｳｴ
    0x30AA, 0x30AB, 0x30AD, 0x30AF, 0x30B1, 0x30B3, 0x30B5, 0x30B7, // ｵｶｷｸｹｺｻｼ
    0x30B9, 0x30BB, 0x30BD, 0x30BF, 0x30C1, 0x30C4, 0x30C6, 0x30C8, // ｽｾｿﾀﾁﾂﾃﾄ
    0x30CA, 0x30CB, 0x30CC, 0x30CD, 0x30CE, 0x30CF, 0x30D2, 0x30D5, // ﾅﾆﾇﾈﾉﾊﾋﾌ
    0x30D8, 0x30DB, 0x30DE, 0x30DF, 0x30E0, 0x30E1, 0x30E2, 0x30E4, // ﾍﾎﾏﾐﾑﾒﾓﾔ
    0x30E6, 0x30E8, 0x30E9, 0x30EA, 0x30EB, 0x30EC, 0x30ED, 0x30EF, // ﾕﾖﾗﾘﾙﾚﾛﾜ
    0x30F3, 0x3099, 0x309A,                                         // ﾝﾞﾟ
];

/// Delta added to a kana when a voiced mark combines into it, 0 when the
/// pair does not combine. `ウ` jumps to `ヴ`, the wa row to `ヷ..ヺ`, the
/// iteration mark to `ヾ`, everything else in the k/s/t/h rows moves one up.
fn voiced_delta(cp: u32) -> u32 {
    match cp {
        0x30A6 => 78, // ウ -> ヴ
        0x30AB | 0x30AD | 0x30AF | 0x30B1 | 0x30B3 // カ キ ク ケ コ
        | 0x30B5 | 0x30B7 | 0x30B9 | 0x30BB | 0x30BD // サ シ ス セ ソ
        | 0x30BF | 0x30C1 | 0x30C4 | 0x30C6 | 0x30C8 // タ チ ツ テ ト
        | 0x30CF | 0x30D2 | 0x30D5 | 0x30D8 | 0x30DB // ハ ヒ フ ヘ ホ
        | 0x30FD => 1, // ヽ -> ヾ
        0x30EF..=0x30F2 => 8, // ワ ヰ ヱ ヲ -> ヷ ヸ ヹ ヺ
        _ => 0,
    }
}

/// Same for the semi-voiced mark: only the h row combines.
fn semi_voiced_delta(cp: u32) -> u32 {
    match cp {
        0x30CF | 0x30D2 | 0x30D5 | 0x30D8 | 0x30DB => 2, // ハ ヒ フ ヘ ホ -> パ行
        _ => 0,
    }
}

/// Rewrite a codepoint buffer in place. Exposed for token-free callers
/// (query normalization, tests); the filter below applies it per token.
pub fn fold_width(text: &mut Vec<u32>) {
    let mut i = 0;
    while i < text.len() {
        let cp = text[i];
        if (FULLWIDTH_START..=FULLWIDTH_END).contains(&cp) {
            text[i] = cp - FULLWIDTH_SHIFT;
        } else if (HALFWIDTH_KANA_START..=HALFWIDTH_KANA_END).contains(&cp) {
            if (cp == HW_VOICED_MARK || cp == HW_SEMI_VOICED_MARK) && i > 0 {
                let prev = text[i - 1];
                if (COMBINABLE_START..=COMBINABLE_END).contains(&prev) {
                    let delta = if cp == HW_VOICED_MARK {
                        voiced_delta(prev)
                    } else {
                        semi_voiced_delta(prev)
                    };
                    if delta != 0 {
                        // merge the mark into the previous kana and
                        // re-visit the merged position
                        text[i - 1] = prev + delta;
                        text.remove(i);
                        i -= 1;
                        continue;
                    }
                }
                text[i] = if cp == HW_VOICED_MARK {
                    COMBINING_VOICED
                } else {
                    COMBINING_SEMI_VOICED
                };
            } else {
                text[i] = KANA_NORM[(cp - HALFWIDTH_KANA_START) as usize];
            }
        }
        i += 1;
    }
}

/// Token filter that folds widths in place.
///
/// Stateless across tokens; the only lookahead is against the previous
/// character in the same buffer, for voicing-mark combination.
pub struct WidthNormalizer<S: TokenStream> {
    inner: S,
}

impl<S: TokenStream> WidthNormalizer<S> {
    pub fn new(inner: S) -> WidthNormalizer<S> {
        WidthNormalizer { inner }
    }
}

impl<S: TokenStream> TokenStream for WidthNormalizer<S> {
    fn advance(&mut self) -> bool {
        if !self.inner.advance() {
            return false;
        }
        fold_width(&mut self.inner.token_mut().text);
        true
    }

    fn token(&self) -> &Token {
        self.inner.token()
    }

    fn token_mut(&mut self) -> &mut Token {
        self.inner.token_mut()
    }

    fn reset(&mut self) {
        self.inner.reset();
    }
}
