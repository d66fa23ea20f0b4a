use tracing::debug;

use super::chunker::{index_pieces, LongTextChunk};
use super::normalize::{count_words, normalize_text};
use super::pack::GreedyPacker;
use super::segment::{segment_units, UnitLimits};

/// Default word ceiling per window.
pub const MAX_WORDS_PER_WINDOW: usize = 500;

/// Word-bounded batches aligned to sentence boundaries where possible.
///
/// Character caps are ignored and a word is never broken. Text already within
/// the ceiling comes back as a single window equal to the normalized text.
/// A ceiling of zero is treated as one.
pub fn build_sentence_aligned_word_windows(
    text: &str,
    max_words_per_window: usize,
) -> Vec<LongTextChunk> {
    let normalized = normalize_text(text);
    if normalized.is_empty() {
        return Vec::new();
    }

    let max_words = max_words_per_window.max(1);
    let total_words = count_words(&normalized);
    if total_words <= max_words {
        return index_pieces(vec![normalized]);
    }

    let limits = UnitLimits::words_only(max_words);
    let mut packer = GreedyPacker::new(None, max_words);
    for unit in segment_units(&normalized, limits) {
        packer.push(unit);
    }

    let windows = index_pieces(packer.finish());
    debug!(
        target: "chunker",
        windows = windows.len(),
        total_words,
        max_words,
        "Built sentence-aligned word windows"
    );
    windows
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_text_short_circuits() {
        let windows = build_sentence_aligned_word_windows("  a b\n\nc.  ", 500);
        assert_eq!(windows.len(), 1);
        assert_eq!(windows[0].text(), "a b\nc.");
    }

    #[test]
    fn test_sentences_stay_whole_when_they_fit() {
        let text = "one two three. four five. six seven eight.";
        let windows = build_sentence_aligned_word_windows(text, 5);
        let texts: Vec<&str> = windows.iter().map(|w| w.text()).collect();
        assert_eq!(texts, vec!["one two three. four five.", "six seven eight."]);
    }

    #[test]
    fn test_oversized_sentence_becomes_exact_windows() {
        let words: Vec<String> = (0..10).map(|i| format!("w{i}")).collect();
        let text = words.join(" ");
        let windows = build_sentence_aligned_word_windows(&text, 4);
        let counts: Vec<usize> = windows.iter().map(|w| w.word_count()).collect();
        assert_eq!(counts, vec![4, 4, 2]);
    }
}
