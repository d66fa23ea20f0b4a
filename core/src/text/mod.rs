//! Text preparation for long-form narration
//!
//! Raw text flows through three stages before it reaches a synthesis engine:
//! - `normalize`: canonical single-spaced form
//! - `segment`: sentence -> clause -> forced word/character units
//! - `chunker` / `windows`: greedy packing of units into bounded records
//!
//! Lengths are measured in characters (Unicode scalar values), never bytes,
//! so Devanagari and Latin text share the same caps.

pub mod chunker;
pub mod normalize;
mod pack;
pub mod segment;
pub mod windows;

pub use chunker::{build_long_text_chunks, LongTextChunk};
pub use normalize::{char_len, count_words, normalize_text};
pub use segment::{force_split, segment_units, split_clauses, split_sentences, UnitLimits};
pub use windows::{build_sentence_aligned_word_windows, MAX_WORDS_PER_WINDOW};
