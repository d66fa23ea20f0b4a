use serde::{Deserialize, Serialize};

use voiceforge_core::{Result, VfError};

/// Decoded audio: one sample vector per channel plus the sample rate.
///
/// Produced by a synthesizer and never mutated afterwards. Samples are
/// nominally in -1.0..=1.0.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PcmBuffer {
    sample_rate: u32,
    channels: Vec<Vec<f32>>,
}

impl PcmBuffer {
    pub fn new(sample_rate: u32, channels: Vec<Vec<f32>>) -> Self {
        Self {
            sample_rate,
            channels,
        }
    }

    pub fn mono(sample_rate: u32, samples: Vec<f32>) -> Self {
        Self::new(sample_rate, vec![samples])
    }

    pub fn silence(sample_rate: u32, frames: usize, channel_count: usize) -> Self {
        Self::new(sample_rate, vec![vec![0.0; frames]; channel_count.max(1)])
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn channels(&self) -> &[Vec<f32>] {
        &self.channels
    }

    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    /// Frames per channel. Ragged buffers count only the frames every
    /// channel has.
    pub fn len(&self) -> usize {
        self.channels.iter().map(Vec::len).min().unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn duration_ms(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.len() as f64 * 1000.0 / self.sample_rate as f64
    }

    /// Channel `index`, or the last channel when this buffer has fewer.
    pub fn channel_or_last(&self, index: usize) -> &[f32] {
        match self.channels.len() {
            0 => &[],
            n => &self.channels[index.min(n - 1)],
        }
    }

    /// Frame-interleaved samples (L R L R ...).
    pub fn interleaved(&self) -> Vec<f32> {
        let frames = self.len();
        let mut out = Vec::with_capacity(frames * self.channels.len());
        for frame in 0..frames {
            for channel in &self.channels {
                out.push(channel[frame]);
            }
        }
        out
    }

    /// Reject buffers a stitcher cannot use: no frames, zero sample rate,
    /// ragged channels or non-finite samples.
    pub fn validate(&self) -> Result<()> {
        if self.sample_rate == 0 {
            return Err(VfError::MalformedBuffer("sample_rate is zero".into()));
        }
        if self.channels.is_empty() {
            return Err(VfError::MalformedBuffer("buffer has no channels".into()));
        }
        let frames = self.len();
        if frames == 0 {
            return Err(VfError::MalformedBuffer("buffer has no samples".into()));
        }
        if let Some((i, ch)) = self
            .channels
            .iter()
            .enumerate()
            .find(|(_, ch)| ch.len() != frames)
        {
            return Err(VfError::MalformedBuffer(format!(
                "channel {i} has {} samples, expected {frames}",
                ch.len()
            )));
        }
        for (i, ch) in self.channels.iter().enumerate() {
            if let Some(pos) = ch.iter().position(|s| !s.is_finite()) {
                return Err(VfError::MalformedBuffer(format!(
                    "channel {i} sample {pos} is not finite"
                )));
            }
        }
        Ok(())
    }
}
