//! Synthesis collaborator contract types
//!
//! `SynthesisRequest` is what one engine call receives; `SynthesisAttempt` is
//! the record written for every dispatch attempt (a chunk retried twice has
//! three attempts sharing `chunk_index`).

use serde::{Deserialize, Serialize};

use crate::profile::ProfileTable;
use crate::Result;

/// Payload of one synthesis call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SynthesisRequest {
    pub text: String,
    pub voice_id: String,
    pub language: String,
    pub speed: f32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub emotion: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trace_id: Option<String>,
}

/// One dispatch attempt for one chunk. `attempt` is 1-based.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SynthesisAttempt {
    pub chunk_index: usize,
    pub chunk_total: usize,
    pub attempt: u32,
    pub trace_id: String,
}

/// Voice settings shared by every chunk of a narration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VoiceSelection {
    pub engine: String,
    pub voice_id: String,
    pub language: String,
    #[serde(default)]
    pub speed: Option<f32>,
    #[serde(default)]
    pub emotion: Option<String>,
    #[serde(default)]
    pub style: Option<String>,
}

impl VoiceSelection {
    pub fn new(
        engine: impl Into<String>,
        voice_id: impl Into<String>,
        language: impl Into<String>,
    ) -> Self {
        Self {
            engine: engine.into(),
            voice_id: voice_id.into(),
            language: language.into(),
            speed: None,
            emotion: None,
            style: None,
        }
    }

    pub fn with_speed(mut self, speed: f32) -> Self {
        self.speed = Some(speed);
        self
    }

    pub fn with_emotion(mut self, emotion: impl Into<String>) -> Self {
        self.emotion = Some(emotion.into());
        self
    }

    pub fn with_style(mut self, style: impl Into<String>) -> Self {
        self.style = Some(style.into());
        self
    }

    /// Speed after clamping to the engine's bounds. Fails on non-finite input.
    pub fn effective_speed(&self, table: &ProfileTable) -> Result<f32> {
        table.speed_bounds(&self.engine).clamp(self.speed)
    }

    /// Request for one chunk; `speed` must already be clamped.
    pub fn request_for(&self, text: impl Into<String>, speed: f32) -> SynthesisRequest {
        SynthesisRequest {
            text: text.into(),
            voice_id: self.voice_id.clone(),
            language: self.language.clone(),
            speed,
            emotion: self.emotion.clone(),
            style: self.style.clone(),
            trace_id: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::ENGINE_COMPACT;

    #[test]
    fn test_request_serializes_camel_case_and_skips_absent_fields() {
        let voice = VoiceSelection::new(ENGINE_COMPACT, "v-1", "hi").with_emotion("calm");
        let req = voice.request_for("नमस्ते।", 1.0);
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["voiceId"], "v-1");
        assert_eq!(json["emotion"], "calm");
        assert!(json.get("style").is_none());
        assert!(json.get("traceId").is_none());
    }

    #[test]
    fn test_effective_speed_is_clamped_per_engine() {
        let table = ProfileTable::builtin();
        let voice = VoiceSelection::new(ENGINE_COMPACT, "v", "en").with_speed(1.8);
        assert_eq!(voice.effective_speed(&table).unwrap(), 1.30);

        let bad = VoiceSelection::new(ENGINE_COMPACT, "v", "en").with_speed(f32::INFINITY);
        assert!(bad.effective_speed(&table).is_err());
    }
}
