use crate::encode::encode_wav;
use crate::error::AudioError;
use crate::pcm_decode::pcm_decode;
use clipsight_core::MediaSource;
use tracing::debug;

/// Re-encodes the source's full audio track as a 16-bit PCM WAV file at its
/// native sample rate and channel layout. No downmix, no resampling, no
/// duration cap; a decode failure here is an error, not a degradation.
pub async fn export_wav(source: &MediaSource) -> Result<Vec<u8>, AudioError> {
    let path = source.path().to_path_buf();
    let (samples, sample_rate, channels) = tokio::task::spawn_blocking(move || pcm_decode(&path))
        .await
        .map_err(|e| AudioError::Decode(e.to_string()))?
        .map_err(|e| AudioError::Decode(format!("{e:#}")))?;

    debug!(
        "exporting {} samples at {} hz across {} channels",
        samples.len(),
        sample_rate,
        channels
    );

    encode_wav(&samples, sample_rate, channels)
}
