use std::io;
use std::path::Path;

use hound::{SampleFormat, WavSpec, WavWriter};
use voiceforge_audio::PcmBuffer;

/// Write `buffer` as 16-bit PCM WAV, clamping samples to -1.0..=1.0.
pub fn write_wav(path: impl AsRef<Path>, buffer: &PcmBuffer) -> io::Result<()> {
    let channels = u16::try_from(buffer.channel_count())
        .map_err(|_| io::Error::other("too many channels for WAV"))?;
    let spec = WavSpec {
        channels,
        sample_rate: buffer.sample_rate(),
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    };

    let mut writer = WavWriter::create(path, spec).map_err(|e| io::Error::other(e.to_string()))?;
    for sample in buffer.interleaved() {
        let sample_i16 = (sample.clamp(-1.0, 1.0) * i16::MAX as f32) as i16;
        writer
            .write_sample(sample_i16)
            .map_err(|e| io::Error::other(e.to_string()))?;
    }
    writer
        .finalize()
        .map_err(|e| io::Error::other(e.to_string()))?;
    Ok(())
}
