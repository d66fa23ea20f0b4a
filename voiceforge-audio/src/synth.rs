use async_trait::async_trait;

use voiceforge_core::{Result, SynthesisRequest};

use crate::pcm::PcmBuffer;

/// A speech engine that turns one request into decoded audio.
///
/// Implementations must be safe to call concurrently; the governor may run
/// several chunks of one narration at once.
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    /// Engine name used in logs (e.g., "http:compact")
    fn name(&self) -> String;

    /// Synthesize a single chunk
    async fn synthesize(&self, request: SynthesisRequest) -> Result<PcmBuffer>;
}
