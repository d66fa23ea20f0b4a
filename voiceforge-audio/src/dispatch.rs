//! Synthesis dispatch governor
//!
//! Sends one request per chunk to a [`SpeechSynthesizer`], retrying each chunk
//! under a [`RetryPolicy`]. Buffers come back in chunk order whatever the
//! completion order. Any chunk that runs out of attempts fails the whole
//! request; no partial audio is returned.
//!
//! Emits optional progress events:
//! - `AttemptStarted`, `AttemptFailed`, `ChunkCompleted`

use std::sync::Arc;
use std::time::Duration;

use futures::stream::{self, StreamExt};
use serde::Serialize;
use tokio::sync::mpsc::UnboundedSender;
use tokio::time::timeout;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use voiceforge_core::{
    preflight_word_limit, LongTextChunk, PipelineConfig, PreflightResult, Result,
    SynthesisAttempt, SynthesisRequest, VfError, VoiceSelection, MAX_WORDS_PER_REQUEST,
};

use crate::pcm::PcmBuffer;
use crate::retry::{RetryPolicy, StagedBackoff};
use crate::synth::SpeechSynthesizer;
use crate::trace::{TimestampTraceIds, TraceIdGenerator};

/// Progress notifications for one dispatch run.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum DispatchEvent {
    AttemptStarted(SynthesisAttempt),
    #[serde(rename_all = "camelCase")]
    AttemptFailed {
        attempt: SynthesisAttempt,
        error: String,
        /// Wait before the next attempt; `None` when this was the last one.
        backoff_ms: Option<u64>,
    },
    #[serde(rename_all = "camelCase")]
    ChunkCompleted {
        chunk_index: usize,
        chunk_total: usize,
        samples: usize,
    },
}

/// Buffers in chunk order plus every attempt made, grouped by chunk.
#[derive(Debug, Clone)]
pub struct DispatchOutcome {
    pub buffers: Vec<PcmBuffer>,
    pub attempts: Vec<SynthesisAttempt>,
}

pub struct DispatchGovernor {
    synthesizer: Arc<dyn SpeechSynthesizer>,
    retry: Arc<dyn RetryPolicy>,
    trace_ids: Arc<dyn TraceIdGenerator>,
    cancel: CancellationToken,
    max_concurrency: usize,
    max_words_per_request: usize,
    attempt_timeout: Option<Duration>,
    events: Option<UnboundedSender<DispatchEvent>>,
}

impl DispatchGovernor {
    /// Sequential dispatch with the standard 3-attempt schedule.
    pub fn new(synthesizer: Arc<dyn SpeechSynthesizer>) -> Self {
        Self {
            synthesizer,
            retry: Arc::new(StagedBackoff::standard()),
            trace_ids: Arc::new(TimestampTraceIds),
            cancel: CancellationToken::new(),
            max_concurrency: 1,
            max_words_per_request: MAX_WORDS_PER_REQUEST,
            attempt_timeout: None,
            events: None,
        }
    }

    pub fn from_config(synthesizer: Arc<dyn SpeechSynthesizer>, config: &PipelineConfig) -> Self {
        Self::new(synthesizer)
            .with_retry_policy(Arc::new(StagedBackoff::from_config(config)))
            .with_max_concurrency(config.max_concurrency)
            .with_max_words_per_request(config.max_words_per_request)
    }

    pub fn with_retry_policy(mut self, retry: Arc<dyn RetryPolicy>) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_trace_ids(mut self, trace_ids: Arc<dyn TraceIdGenerator>) -> Self {
        self.trace_ids = trace_ids;
        self
    }

    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn with_max_concurrency(mut self, n: usize) -> Self {
        self.max_concurrency = n.max(1);
        self
    }

    pub fn with_max_words_per_request(mut self, max_words: usize) -> Self {
        self.max_words_per_request = max_words;
        self
    }

    /// Per-attempt deadline; an attempt that overruns counts as failed.
    pub fn with_attempt_timeout(mut self, limit: Duration) -> Self {
        self.attempt_timeout = Some(limit);
        self
    }

    pub fn with_events(mut self, tx: UnboundedSender<DispatchEvent>) -> Self {
        self.events = Some(tx);
        self
    }

    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub fn synthesizer_name(&self) -> String {
        self.synthesizer.name()
    }

    /// Word check against this governor's request ceiling.
    pub fn preflight(&self, text: &str) -> PreflightResult {
        preflight_word_limit(text, self.max_words_per_request)
    }

    /// Preflight `text`, then synthesize every chunk.
    ///
    /// `speed` must already be clamped for `voice.engine`. A rejected
    /// preflight returns `VfError::PreflightRejected` without calling the
    /// synthesizer.
    pub async fn dispatch(
        &self,
        text: &str,
        chunks: &[LongTextChunk],
        voice: &VoiceSelection,
        speed: f32,
    ) -> Result<DispatchOutcome> {
        self.preflight(text).into_result()?;
        self.dispatch_chunks(chunks, voice, speed).await
    }

    /// Synthesize `chunks` without a word check.
    pub async fn dispatch_chunks(
        &self,
        chunks: &[LongTextChunk],
        voice: &VoiceSelection,
        speed: f32,
    ) -> Result<DispatchOutcome> {
        if self.cancel.is_cancelled() {
            return Err(VfError::Cancelled);
        }
        let chunk_total = chunks.len();
        info!(
            target: "dispatch",
            engine = %voice.engine,
            synthesizer = %self.synthesizer.name(),
            chunks = chunk_total,
            concurrency = self.max_concurrency,
            "Dispatching chunks"
        );

        let mut results = stream::iter(
            chunks
                .iter()
                .map(|chunk| self.synthesize_chunk(chunk, chunk_total, voice, speed)),
        )
        .buffered(self.max_concurrency);

        let mut buffers = Vec::with_capacity(chunk_total);
        let mut attempts = Vec::with_capacity(chunk_total);
        while let Some(result) = results.next().await {
            let (buffer, chunk_attempts) = result?;
            buffers.push(buffer);
            attempts.extend(chunk_attempts);
        }

        info!(
            target: "dispatch",
            chunks = chunk_total,
            attempts = attempts.len(),
            "All chunks synthesized"
        );
        Ok(DispatchOutcome { buffers, attempts })
    }

    async fn synthesize_chunk(
        &self,
        chunk: &LongTextChunk,
        chunk_total: usize,
        voice: &VoiceSelection,
        speed: f32,
    ) -> Result<(PcmBuffer, Vec<SynthesisAttempt>)> {
        let max_attempts = self.retry.max_attempts().max(1);
        let mut attempts = Vec::with_capacity(max_attempts as usize);
        let mut last_error = String::new();

        for attempt in 1..=max_attempts {
            if self.cancel.is_cancelled() {
                return Err(VfError::Cancelled);
            }
            let trace_id = self.trace_ids.next_id(&voice.engine);
            let record = SynthesisAttempt {
                chunk_index: chunk.index(),
                chunk_total,
                attempt,
                trace_id: trace_id.clone(),
            };
            attempts.push(record.clone());
            self.emit(DispatchEvent::AttemptStarted(record.clone()));
            debug!(
                target: "dispatch",
                chunk = chunk.index(),
                attempt,
                trace_id = %trace_id,
                chars = chunk.char_count(),
                "Synthesis attempt"
            );

            let mut request = voice.request_for(chunk.text(), speed);
            request.trace_id = Some(trace_id);

            match self.attempt_once(request).await {
                Ok(buffer) => {
                    self.emit(DispatchEvent::ChunkCompleted {
                        chunk_index: chunk.index(),
                        chunk_total,
                        samples: buffer.len(),
                    });
                    return Ok((buffer, attempts));
                }
                Err(VfError::Cancelled) => return Err(VfError::Cancelled),
                Err(err) => {
                    last_error = err.to_string();
                    let backoff =
                        (attempt < max_attempts).then(|| self.retry.delay_before_retry(attempt));
                    warn!(
                        target: "dispatch",
                        chunk = chunk.index(),
                        attempt,
                        error = %last_error,
                        backoff_ms = ?backoff.map(|d| d.as_millis()),
                        "Synthesis attempt failed"
                    );
                    self.emit(DispatchEvent::AttemptFailed {
                        attempt: record,
                        error: last_error.clone(),
                        backoff_ms: backoff.map(|d| d.as_millis() as u64),
                    });
                    if let Some(delay) = backoff {
                        tokio::select! {
                            _ = self.cancel.cancelled() => return Err(VfError::Cancelled),
                            _ = tokio::time::sleep(delay) => {}
                        }
                    }
                }
            }
        }

        Err(VfError::ChunkSynthesisExhausted {
            chunk_index: chunk.index(),
            chunk_total,
            attempts,
            last_error,
        })
    }

    /// One synthesizer call, raced against cancellation and the optional
    /// deadline. A malformed buffer is an error like any other.
    async fn attempt_once(&self, request: SynthesisRequest) -> Result<PcmBuffer> {
        let call = self.synthesizer.synthesize(request);
        let guarded = async {
            match self.attempt_timeout {
                Some(limit) => match timeout(limit, call).await {
                    Ok(res) => res,
                    Err(_) => Err(VfError::Synthesis(format!(
                        "attempt timed out after {} ms",
                        limit.as_millis()
                    ))),
                },
                None => call.await,
            }
        };
        let buffer = tokio::select! {
            _ = self.cancel.cancelled() => return Err(VfError::Cancelled),
            res = guarded => res?,
        };
        buffer.validate()?;
        Ok(buffer)
    }

    fn emit(&self, event: DispatchEvent) {
        if let Some(tx) = &self.events {
            // receiver may be gone; progress is best effort
            let _ = tx.send(event);
        }
    }
}
