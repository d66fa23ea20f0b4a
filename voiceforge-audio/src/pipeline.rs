//! Long-form narration facade
//!
//! normalize -> preflight -> profile lookup -> chunk -> dispatch -> stitch

use std::sync::Arc;

use serde::Serialize;
use tracing::info;

use voiceforge_core::{
    build_long_text_chunks, build_sentence_aligned_word_windows, normalize_text, ChunkingProfile,
    LongTextChunk, PipelineConfig, PreflightResult, ProfileTable, Result, SynthesisAttempt,
    VoiceSelection,
};

use crate::dispatch::DispatchGovernor;
use crate::pcm::PcmBuffer;
use crate::stitch::stitch_with_crossfade;
use crate::synth::SpeechSynthesizer;

/// Everything decided before the first synthesis call.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NarrationPlan {
    pub preflight: PreflightResult,
    pub profile: ChunkingProfile,
    pub speed: f32,
    pub chunks: Vec<LongTextChunk>,
}

#[derive(Debug, Clone)]
pub struct NarrationOutput {
    pub audio: PcmBuffer,
    pub chunks: Vec<LongTextChunk>,
    pub attempts: Vec<SynthesisAttempt>,
    pub preflight: PreflightResult,
}

pub struct LongFormPipeline {
    profiles: ProfileTable,
    config: PipelineConfig,
    governor: DispatchGovernor,
}

impl LongFormPipeline {
    /// Pipeline over `synthesizer` with the governor derived from `config`.
    pub fn new(
        synthesizer: Arc<dyn SpeechSynthesizer>,
        profiles: ProfileTable,
        config: PipelineConfig,
    ) -> Result<Self> {
        config.validate()?;
        let governor = DispatchGovernor::from_config(synthesizer, &config);
        Ok(Self {
            profiles,
            config,
            governor,
        })
    }

    /// Pipeline around a governor built by the caller (custom retry policy,
    /// trace ids, events, cancellation).
    pub fn with_governor(
        governor: DispatchGovernor,
        profiles: ProfileTable,
        config: PipelineConfig,
    ) -> Result<Self> {
        config.validate()?;
        let governor = governor.with_max_words_per_request(config.max_words_per_request);
        Ok(Self {
            profiles,
            config,
            governor,
        })
    }

    pub fn profiles(&self) -> &ProfileTable {
        &self.profiles
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn governor(&self) -> &DispatchGovernor {
        &self.governor
    }

    /// Dry run: preflight, profile, clamped speed and chunks. Fails with
    /// `PreflightRejected` over the word limit.
    pub fn plan(&self, text: &str, voice: &VoiceSelection) -> Result<NarrationPlan> {
        let normalized = normalize_text(text);
        let preflight = self.governor.preflight(&normalized).into_result()?;
        let profile = self.profiles.resolve(&voice.engine, &voice.language)?;
        let speed = voice.effective_speed(&self.profiles)?;
        let chunks = build_long_text_chunks(&normalized, &profile);

        info!(
            target: "pipeline",
            engine = %voice.engine,
            language = %voice.language,
            words = preflight.word_count,
            chunks = chunks.len(),
            speed,
            "Narration planned"
        );
        Ok(NarrationPlan {
            preflight,
            profile,
            speed,
            chunks,
        })
    }

    /// Synthesize `text` end to end into one stitched buffer.
    pub async fn narrate(&self, text: &str, voice: &VoiceSelection) -> Result<NarrationOutput> {
        let plan = self.plan(text, voice)?;
        let outcome = self
            .governor
            .dispatch_chunks(&plan.chunks, voice, plan.speed)
            .await?;
        let audio = stitch_with_crossfade(&outcome.buffers, plan.profile.join_crossfade_ms);

        info!(
            target: "pipeline",
            chunks = plan.chunks.len(),
            attempts = outcome.attempts.len(),
            duration_ms = audio.duration_ms(),
            "Narration complete"
        );
        Ok(NarrationOutput {
            audio,
            chunks: plan.chunks,
            attempts: outcome.attempts,
            preflight: plan.preflight,
        })
    }

    /// Sentence-aligned word windows using the configured ceiling.
    pub fn windows(&self, text: &str) -> Vec<LongTextChunk> {
        build_sentence_aligned_word_windows(text, self.config.max_words_per_window)
    }
}
