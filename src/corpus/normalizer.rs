//! Text normalization capability.

use unicode_normalization::UnicodeNormalization;

/// Canonicalizes text before segmentation and comparison.
///
/// Implementations must be idempotent: `normalize(normalize(x)) == normalize(x)`.
pub trait Normalizer: Send + Sync {
    /// Return the canonical form of `text`.
    fn normalize(&self, text: &str) -> String;
}

impl<F> Normalizer for F
where
    F: Fn(&str) -> String + Send + Sync,
{
    fn normalize(&self, text: &str) -> String {
        self(text)
    }
}

const ZWNJ: char = '\u{200C}';
const TATWEEL: char = '\u{0640}';

/// NFKC plus Persian orthography unification.
///
/// - Arabic yeh / alef maksura become Persian yeh, Arabic kaf becomes keheh
/// - tatweel and Arabic harakat are dropped
/// - runs of ZWNJ collapse to one, whitespace runs collapse to a single space
#[derive(Debug, Clone, Copy, Default)]
pub struct PersianNormalizer;

impl Normalizer for PersianNormalizer {
    fn normalize(&self, text: &str) -> String {
        let mut out = String::with_capacity(text.len());
        let mut pending_space = false;

        for c in text.nfkc() {
            if c.is_whitespace() {
                pending_space = !out.is_empty();
                continue;
            }
            let c = match c {
                '\u{064A}' | '\u{0649}' => '\u{06CC}',
                '\u{0643}' => '\u{06A9}',
                c => c,
            };
            if c == TATWEEL || is_harakat(c) {
                continue;
            }
            if c == ZWNJ && (out.ends_with(ZWNJ) || pending_space) {
                continue;
            }
            if pending_space {
                if out.ends_with(ZWNJ) {
                    out.pop();
                }
                out.push(' ');
                pending_space = false;
            }
            out.push(c);
        }

        while out.ends_with(ZWNJ) {
            out.pop();
        }
        out
    }
}

fn is_harakat(c: char) -> bool {
    ('\u{064B}'..='\u{0652}').contains(&c)
}
