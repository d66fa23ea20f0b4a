use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::text::{count_words, normalize_text};
use crate::{Result, VfError};

/// Word ceiling for one narration request.
pub const MAX_WORDS_PER_REQUEST: usize = 5000;

/// Outcome of the cost-free word check run before any dispatch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreflightResult {
    pub ok: bool,
    pub word_count: usize,
    pub max_words: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl PreflightResult {
    /// `Ok(self)` when accepted, `VfError::PreflightRejected` otherwise.
    pub fn into_result(self) -> Result<Self> {
        if self.ok {
            return Ok(self);
        }
        Err(VfError::PreflightRejected {
            word_count: self.word_count,
            max_words: self.max_words,
            reason: self.reason.unwrap_or_default(),
        })
    }
}

/// Count words of the normalized text against `max_words`.
pub fn preflight_word_limit(text: &str, max_words: usize) -> PreflightResult {
    let word_count = count_words(&normalize_text(text));
    if word_count <= max_words {
        return PreflightResult {
            ok: true,
            word_count,
            max_words,
            reason: None,
        };
    }
    warn!(target: "preflight", word_count, max_words, "Request exceeds word limit");
    PreflightResult {
        ok: false,
        word_count,
        max_words,
        reason: Some(format!(
            "Text has {word_count} words; the limit is {max_words} words per request. \
             Split it into smaller parts and try again."
        )),
    }
}
