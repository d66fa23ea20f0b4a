// VoiceForge Core Library
// Text segmentation, chunking profiles and request preflight for long-form narration

pub mod config;
pub mod preflight;
pub mod profile;
pub mod synthesis;
pub mod text;

// Export core types
pub use config::PipelineConfig;
pub use preflight::{preflight_word_limit, PreflightResult, MAX_WORDS_PER_REQUEST};
pub use profile::{
    ChunkingProfile, LanguageBucket, ProfileTable, SpeedBounds, ENGINE_COMPACT, ENGINE_EXTENDED,
};
pub use synthesis::{SynthesisAttempt, SynthesisRequest, VoiceSelection};
pub use text::{
    build_long_text_chunks, build_sentence_aligned_word_windows, char_len, count_words,
    normalize_text, LongTextChunk, MAX_WORDS_PER_WINDOW,
};

// Error types
use thiserror::Error;

#[derive(Error, Debug)]
pub enum VfError {
    #[error("Preflight rejected: {reason}")]
    PreflightRejected {
        word_count: usize,
        max_words: usize,
        reason: String,
    },

    #[error(
        "Chunk {} of {chunk_total} failed after {} attempts: {last_error}",
        .chunk_index + 1,
        .attempts.len()
    )]
    ChunkSynthesisExhausted {
        chunk_index: usize,
        chunk_total: usize,
        attempts: Vec<SynthesisAttempt>,
        last_error: String,
    },

    #[error("Malformed audio buffer: {0}")]
    MalformedBuffer(String),

    #[error("Synthesis error: {0}")]
    Synthesis(String),

    #[error("Invalid value for `{field}`: {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("Unknown engine: {0}")]
    UnknownEngine(String),

    #[error("Synthesis cancelled")]
    Cancelled,

    #[error("Config error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

impl VfError {
    pub fn invalid(field: impl Into<String>, reason: impl Into<String>) -> Self {
        VfError::InvalidInput {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, VfError>;
