// Long-form synthesis: dispatch governance and audio reassembly

// Shared audio utilities
pub(crate) mod utils;

pub mod dispatch;
pub mod http;
pub mod pcm;
pub mod pipeline;
pub mod retry;
pub mod stitch;
pub mod synth;
pub mod trace;

pub use dispatch::{DispatchEvent, DispatchGovernor, DispatchOutcome};
pub use http::{HttpSynthesizer, HttpSynthesizerConfig};
pub use pcm::PcmBuffer;
pub use pipeline::{LongFormPipeline, NarrationOutput, NarrationPlan};
pub use retry::{ExponentialBackoff, RetryPolicy, StagedBackoff};
pub use stitch::{crossfade_samples, stitch_with_crossfade, DEFAULT_SAMPLE_RATE};
pub use synth::SpeechSynthesizer;
pub use trace::{TimestampTraceIds, TraceIdGenerator};

// Core types used across the audio API
pub use voiceforge_core::{Result, VfError};
