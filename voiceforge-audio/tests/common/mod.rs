#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use voiceforge_audio::{PcmBuffer, SpeechSynthesizer, TraceIdGenerator};
use voiceforge_core::{Result, SynthesisRequest, VfError};

/// Synthesizer whose answer for call N (0-based, across all chunks) comes
/// from a closure. Records every request it sees.
pub struct ScriptedSynth<F> {
    calls: AtomicUsize,
    requests: Mutex<Vec<SynthesisRequest>>,
    script: F,
}

impl<F> ScriptedSynth<F>
where
    F: Fn(&SynthesisRequest, usize) -> Result<PcmBuffer> + Send + Sync,
{
    pub fn new(script: F) -> Self {
        Self {
            calls: AtomicUsize::new(0),
            requests: Mutex::new(Vec::new()),
            script,
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn requests(&self) -> Vec<SynthesisRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl<F> SpeechSynthesizer for ScriptedSynth<F>
where
    F: Fn(&SynthesisRequest, usize) -> Result<PcmBuffer> + Send + Sync,
{
    fn name(&self) -> String {
        "scripted".to_string()
    }

    async fn synthesize(&self, request: SynthesisRequest) -> Result<PcmBuffer> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().unwrap().push(request.clone());
        (self.script)(&request, n)
    }
}

/// Sleeps for a per-text delay before answering with a constant buffer
/// whose samples equal `value_for(text)`.
pub struct DelayedSynth {
    pub delay_for: fn(&str) -> Duration,
    pub value_for: fn(&str) -> f32,
    pub frames: usize,
}

#[async_trait]
impl SpeechSynthesizer for DelayedSynth {
    fn name(&self) -> String {
        "delayed".to_string()
    }

    async fn synthesize(&self, request: SynthesisRequest) -> Result<PcmBuffer> {
        tokio::time::sleep((self.delay_for)(&request.text)).await;
        Ok(PcmBuffer::mono(
            24_000,
            vec![(self.value_for)(&request.text); self.frames],
        ))
    }
}

/// `trace-0`, `trace-1`, ...
#[derive(Default)]
pub struct SequentialTraceIds {
    next: AtomicUsize,
}

impl TraceIdGenerator for SequentialTraceIds {
    fn next_id(&self, engine: &str) -> String {
        format!("{engine}-{}", self.next.fetch_add(1, Ordering::SeqCst))
    }
}

pub fn tone(frames: usize) -> PcmBuffer {
    PcmBuffer::mono(24_000, vec![0.25; frames])
}

pub fn transient(msg: &str) -> VfError {
    VfError::Synthesis(msg.to_string())
}
