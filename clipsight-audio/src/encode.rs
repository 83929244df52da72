use crate::error::AudioError;
use hound::{SampleFormat, WavSpec, WavWriter};
use std::io::Cursor;

/// Maps a float sample in `[-1.0, 1.0]` to 16-bit PCM.
///
/// Negative values scale by 32768 and non-negative values by 32767, so both
/// endpoints land exactly on `i16::MIN` and `i16::MAX`. The conversion
/// truncates toward zero. Out-of-range input is clamped first.
pub fn quantize_sample(sample: f32) -> i16 {
    let s = sample.clamp(-1.0, 1.0);
    if s < 0.0 {
        (s * 0x8000 as f32) as i16
    } else {
        (s * 0x7FFF as f32) as i16
    }
}

/// Serializes interleaved f32 samples as a complete 16-bit PCM WAV file:
/// the canonical 44-byte RIFF header followed by little-endian samples in
/// frame order.
pub fn encode_wav(samples: &[f32], sample_rate: u32, channels: u16) -> Result<Vec<u8>, AudioError> {
    let mut cursor = Cursor::new(Vec::new());
    {
        let spec = WavSpec {
            channels,
            sample_rate,
            bits_per_sample: 16,
            sample_format: SampleFormat::Int,
        };
        let mut writer = WavWriter::new(&mut cursor, spec)?;
        for &sample in samples {
            writer.write_sample(quantize_sample(sample))?;
        }
        writer.finalize()?;
    }

    Ok(cursor.into_inner())
}
