//! Crossfade stitching of ordered per-chunk buffers
//!
//! Consecutive buffers overlap by
//! `min(round(rate * ms / 1000), len(previous), len(current))` frames; the
//! overlap is blended linearly, `out * (1 - t) + next * t`, with
//! `t = i / (overlap - 1)` (or 1 for a single-frame overlap). Everything
//! outside the overlaps is copied verbatim. Ragged buffers contribute only
//! the frames all of their channels share.

use tracing::{debug, warn};

use crate::pcm::PcmBuffer;

/// Sample rate of the silent fallback produced for an empty input list.
pub const DEFAULT_SAMPLE_RATE: u32 = 24_000;

/// Frames covered by `crossfade_ms` at `sample_rate`, rounded to nearest.
pub fn crossfade_samples(sample_rate: u32, crossfade_ms: u32) -> usize {
    (sample_rate as f64 * crossfade_ms as f64 / 1000.0).round() as usize
}

/// Merge `buffers` (in order) into one, blending each junction.
///
/// - no buffers: one silent frame at `DEFAULT_SAMPLE_RATE`
/// - one buffer: returned unchanged
/// - otherwise: sample rate of the first buffer, channel count of the widest
pub fn stitch_with_crossfade(buffers: &[PcmBuffer], join_crossfade_ms: u32) -> PcmBuffer {
    let first = match buffers {
        [] => return PcmBuffer::silence(DEFAULT_SAMPLE_RATE, 1, 1),
        [single] => return single.clone(),
        [first, ..] => first,
    };

    let sample_rate = first.sample_rate();
    if let Some(odd) = buffers.iter().find(|b| b.sample_rate() != sample_rate) {
        warn!(
            target: "stitch",
            expected = sample_rate,
            found = odd.sample_rate(),
            "Mixed sample rates; using the first buffer's rate"
        );
    }

    let channel_count = buffers
        .iter()
        .map(PcmBuffer::channel_count)
        .max()
        .unwrap_or(1)
        .max(1);
    let fade = crossfade_samples(sample_rate, join_crossfade_ms);
    let overlaps: Vec<usize> = buffers
        .windows(2)
        .map(|pair| fade.min(pair[0].len()).min(pair[1].len()))
        .collect();
    let total = buffers.iter().map(PcmBuffer::len).sum::<usize>() - overlaps.iter().sum::<usize>();

    let mut out: Vec<Vec<f32>> = (0..channel_count)
        .map(|c| {
            let mut channel = Vec::with_capacity(total);
            channel.extend_from_slice(&first.channel_or_last(c)[..first.len()]);
            channel
        })
        .collect();

    for (next, &overlap) in buffers[1..].iter().zip(&overlaps) {
        for (c, channel) in out.iter_mut().enumerate() {
            let src = &next.channel_or_last(c)[..next.len()];
            blend_into(channel, src, overlap);
        }
    }

    debug!(
        target: "stitch",
        buffers = buffers.len(),
        channels = channel_count,
        crossfade_samples = fade,
        frames = total,
        "Stitched buffers"
    );
    PcmBuffer::new(sample_rate, out)
}

fn blend_into(channel: &mut Vec<f32>, src: &[f32], overlap: usize) {
    let start = channel.len() - overlap;
    for (i, &incoming) in src[..overlap].iter().enumerate() {
        let t = if overlap > 1 {
            i as f32 / (overlap - 1) as f32
        } else {
            1.0
        };
        let slot = &mut channel[start + i];
        *slot = *slot * (1.0 - t) + incoming * t;
    }
    channel.extend_from_slice(&src[overlap..]);
}
