use super::normalize::{char_len, count_words};

/// Greedy accumulator shared by the chunk packer and the word-window packer.
///
/// A unit is appended (joined with one space) while the candidate stays within
/// `max_chars` (if any) and `max_words`; otherwise the buffer is flushed and
/// the unit starts a new one. A unit always fits an empty buffer.
pub(crate) struct GreedyPacker {
    max_chars: Option<usize>,
    max_words: usize,
    buffer: String,
    chars: usize,
    words: usize,
    out: Vec<String>,
}

impl GreedyPacker {
    pub(crate) fn new(max_chars: Option<usize>, max_words: usize) -> Self {
        Self {
            max_chars,
            max_words,
            buffer: String::new(),
            chars: 0,
            words: 0,
            out: Vec::new(),
        }
    }

    pub(crate) fn push(&mut self, unit: String) {
        let unit_chars = char_len(&unit);
        let unit_words = count_words(&unit);
        if self.buffer.is_empty() {
            self.start(unit, unit_chars, unit_words);
            return;
        }
        let chars = self.chars + 1 + unit_chars;
        let words = self.words + unit_words;
        let fits = words <= self.max_words && self.max_chars.map_or(true, |cap| chars <= cap);
        if fits {
            self.buffer.push(' ');
            self.buffer.push_str(&unit);
            self.chars = chars;
            self.words = words;
        } else {
            self.flush();
            self.start(unit, unit_chars, unit_words);
        }
    }

    /// Emit `piece` as its own record, closing any open buffer first.
    pub(crate) fn emit_alone(&mut self, piece: String) {
        self.flush();
        if !piece.is_empty() {
            self.out.push(piece);
        }
    }

    pub(crate) fn finish(mut self) -> Vec<String> {
        self.flush();
        self.out
    }

    fn start(&mut self, unit: String, chars: usize, words: usize) {
        self.buffer = unit;
        self.chars = chars;
        self.words = words;
    }

    fn flush(&mut self) {
        if !self.buffer.is_empty() {
            self.out.push(std::mem::take(&mut self.buffer));
        }
        self.chars = 0;
        self.words = 0;
    }
}
