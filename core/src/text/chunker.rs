use serde::Serialize;
use tracing::debug;

use super::normalize::{char_len, count_words, normalize_text};
use super::pack::GreedyPacker;
use super::segment::{force_split, segment_units, UnitLimits};
use crate::profile::ChunkingProfile;

/// One bounded text record in final output order.
///
/// `char_count` and `word_count` are derived from `text` at construction and
/// cannot be set independently.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LongTextChunk {
    index: usize,
    text: String,
    char_count: usize,
    word_count: usize,
}

impl LongTextChunk {
    pub(crate) fn new(index: usize, text: String) -> Self {
        let char_count = char_len(&text);
        let word_count = count_words(&text);
        Self {
            index,
            text,
            char_count,
            word_count,
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn char_count(&self) -> usize {
        self.char_count
    }

    pub fn word_count(&self) -> usize {
        self.word_count
    }
}

pub(crate) fn index_pieces(pieces: Vec<String>) -> Vec<LongTextChunk> {
    pieces
        .into_iter()
        .enumerate()
        .map(|(index, text)| LongTextChunk::new(index, text))
        .collect()
}

/// Split `text` into engine-safe chunks for one synthesis profile.
///
/// Units are packed greedily under `target_char_cap` and
/// `max_words_per_chunk`; no chunk ever exceeds `hard_char_cap`. Empty or
/// whitespace-only input yields no chunks.
pub fn build_long_text_chunks(text: &str, profile: &ChunkingProfile) -> Vec<LongTextChunk> {
    let normalized = normalize_text(text);
    if normalized.is_empty() {
        return Vec::new();
    }

    let limits = UnitLimits::for_profile(profile);
    let target = profile.target_char_cap.min(profile.hard_char_cap).max(1);
    let mut packer = GreedyPacker::new(Some(target), limits.max_words);

    for unit in segment_units(&normalized, limits) {
        if limits.admits(&unit) {
            packer.push(unit);
        } else {
            for piece in force_split(&unit, limits) {
                packer.emit_alone(piece);
            }
        }
    }

    let chunks = index_pieces(packer.finish());
    debug!(
        target: "chunker",
        chunks = chunks.len(),
        chars = char_len(&normalized),
        hard_char_cap = profile.hard_char_cap,
        target_char_cap = profile.target_char_cap,
        "Built long-text chunks"
    );
    chunks
}
