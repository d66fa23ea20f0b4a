//! Tiered segmentation
//!
//! Escalates tier by tier only for units that do not fit:
//! 1. sentences, ending in `. ! ? \n` or the Devanagari danda / double danda
//! 2. clauses, ending in `, ; :`
//! 3. forced word windows; a single word longer than the character cap is
//!    sliced at fixed character offsets
//!
//! Every emitted unit is trimmed, non-empty and fits the given `UnitLimits`.
//! Order is preserved across all tiers and no word is ever dropped.

use once_cell::sync::Lazy;
use regex::Regex;

use super::normalize::{char_len, count_words};
use crate::profile::ChunkingProfile;

// Terminator runs with no preceding text form their own match so leading
// punctuation is never lost.
static SENTENCE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[^.!?\n\x{0964}\x{0965}]+[.!?\n\x{0964}\x{0965}]*|[.!?\n\x{0964}\x{0965}]+")
        .expect("sentence pattern")
});

static CLAUSE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^,;:]+[,;:]*|[,;:]+").expect("clause pattern"));

/// Size bound a single unit must satisfy.
///
/// `max_chars = None` bounds by words only; forced splitting then cuts exact
/// word windows and never breaks a word.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnitLimits {
    pub max_chars: Option<usize>,
    pub max_words: usize,
}

impl UnitLimits {
    pub fn for_profile(profile: &ChunkingProfile) -> Self {
        Self {
            max_chars: Some(profile.hard_char_cap.max(1)),
            max_words: profile.max_words_per_chunk.max(1),
        }
    }

    pub fn words_only(max_words: usize) -> Self {
        Self {
            max_chars: None,
            max_words: max_words.max(1),
        }
    }

    #[inline]
    pub fn admits(&self, text: &str) -> bool {
        self.admits_counts(char_len(text), count_words(text))
    }

    #[inline]
    pub(crate) fn admits_counts(&self, chars: usize, words: usize) -> bool {
        words <= self.max_words && self.max_chars.map_or(true, |cap| chars <= cap)
    }
}

/// Sentence tier. Input without any match yields the whole trimmed input.
pub fn split_sentences(text: &str) -> Vec<String> {
    split_with(&SENTENCE, text)
}

/// Clause tier.
pub fn split_clauses(sentence: &str) -> Vec<String> {
    split_with(&CLAUSE, sentence)
}

fn split_with(pattern: &Regex, text: &str) -> Vec<String> {
    let units: Vec<String> = pattern
        .find_iter(text)
        .map(|m| m.as_str().trim())
        .filter(|s| !s.is_empty())
        .map(str::to_owned)
        .collect();
    if !units.is_empty() {
        return units;
    }
    let whole = text.trim();
    if whole.is_empty() {
        Vec::new()
    } else {
        vec![whole.to_owned()]
    }
}

/// Forced tier: greedy word accumulation under `limits`.
pub fn force_split(unit: &str, limits: UnitLimits) -> Vec<String> {
    let mut acc = WordAccumulator::new(limits);
    for word in unit.split_whitespace() {
        acc.push(word);
    }
    acc.finish()
}

/// Run all tiers over already-normalized text.
pub fn segment_units(text: &str, limits: UnitLimits) -> Vec<String> {
    split_sentences(text)
        .into_iter()
        .flat_map(|sentence| {
            if limits.admits(&sentence) {
                return vec![sentence];
            }
            split_clauses(&sentence)
                .into_iter()
                .flat_map(|clause| {
                    if limits.admits(&clause) {
                        vec![clause]
                    } else {
                        force_split(&clause, limits)
                    }
                })
                .collect()
        })
        .collect()
}

struct WordAccumulator {
    limits: UnitLimits,
    buffer: String,
    chars: usize,
    words: usize,
    out: Vec<String>,
}

impl WordAccumulator {
    fn new(limits: UnitLimits) -> Self {
        Self {
            limits,
            buffer: String::new(),
            chars: 0,
            words: 0,
            out: Vec::new(),
        }
    }

    fn push(&mut self, word: &str) {
        let word_chars = char_len(word);
        if let Some(cap) = self.limits.max_chars {
            if word_chars > cap {
                self.flush();
                self.out.extend(slice_chars(word, cap));
                return;
            }
        }
        if !self.buffer.is_empty()
            && !self
                .limits
                .admits_counts(self.chars + 1 + word_chars, self.words + 1)
        {
            self.flush();
        }
        if !self.buffer.is_empty() {
            self.buffer.push(' ');
            self.chars += 1;
        }
        self.buffer.push_str(word);
        self.chars += word_chars;
        self.words += 1;
    }

    fn flush(&mut self) {
        if !self.buffer.is_empty() {
            self.out.push(std::mem::take(&mut self.buffer));
        }
        self.chars = 0;
        self.words = 0;
    }

    fn finish(mut self) -> Vec<String> {
        self.flush();
        self.out
    }
}

fn slice_chars(word: &str, cap: usize) -> Vec<String> {
    let chars: Vec<char> = word.chars().collect();
    chars
        .chunks(cap.max(1))
        .map(|piece| piece.iter().collect())
        .collect()
}
