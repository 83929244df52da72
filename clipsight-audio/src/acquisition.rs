use crate::audio_processing::{audio_to_mono, resample, PcmBuffer};
use crate::error::AudioError;
use crate::pcm_decode::pcm_decode;
use clipsight_core::{find_ffmpeg_path, MediaSource, ProgressScope};
use std::path::Path;
use std::process::Stdio;
use tokio::io::AsyncReadExt;
use tokio::process::Command;
use tracing::{debug, warn};

/// Sample rate the speech recognition contract expects.
pub const ASR_SAMPLE_RATE: u32 = 16000;

/// Outcome of preparing the audio track for transcription.
#[derive(Debug, Clone)]
pub struct AudioAcquisitionResult {
    /// Mono samples at [`ASR_SAMPLE_RATE`].
    pub samples: PcmBuffer,
    /// Seconds of audio actually kept.
    pub duration: f64,
    /// Seconds of audio in the container before any truncation.
    pub original_duration: f64,
    pub truncated: bool,
    /// Set when a degraded path produced the samples.
    pub warning: Option<String>,
}

/// Prepares the source's audio for transcription: decode, downmix to mono,
/// resample to 16 khz, and cap at `budget_seconds`.
///
/// Decode problems never abort the run. A failed in-process decode falls
/// back to ffmpeg; if that fails too, the result is silence of the expected
/// length with a recorded warning. The only error is a source that cannot
/// be read at all.
pub async fn acquire_audio(
    source: &MediaSource,
    budget_seconds: f64,
    progress: &ProgressScope,
) -> Result<AudioAcquisitionResult, AudioError> {
    progress.emit(0.0, "decoding audio track").await;

    let path = source.path().to_path_buf();
    let decoded = tokio::task::spawn_blocking(move || pcm_decode(&path))
        .await
        .map_err(|e| AudioError::Decode(e.to_string()))?;

    match decoded {
        Ok((samples, sample_rate, channels)) => {
            let original_duration =
                samples.len() as f64 / (sample_rate as f64 * channels.max(1) as f64);

            progress.emit(0.4, "downmixing to mono").await;
            let mono = audio_to_mono(&samples, channels);

            progress.emit(0.7, "resampling to 16 khz").await;
            let resampled = resample(&mono, sample_rate, ASR_SAMPLE_RATE);

            let (kept, clipped) = apply_budget(resampled, budget_seconds);
            let truncated = clipped || original_duration > budget_seconds;
            let duration = kept.len() as f64 / ASR_SAMPLE_RATE as f64;

            progress.emit(1.0, "audio ready").await;
            Ok(AudioAcquisitionResult {
                samples: PcmBuffer::mono(kept, ASR_SAMPLE_RATE),
                duration,
                original_duration,
                truncated,
                warning: None,
            })
        }
        Err(primary_err) => {
            if !tokio::fs::try_exists(source.path()).await.unwrap_or(false) {
                return Err(AudioError::Unreadable(
                    source.path().display().to_string(),
                ));
            }

            warn!(
                "in-process audio decode failed: {:#}; falling back to ffmpeg",
                primary_err
            );
            progress.emit(0.4, "decoding audio via ffmpeg").await;

            match ffmpeg_decode_mono(source.path(), budget_seconds).await {
                Ok(samples) => {
                    let container = source.duration().await.unwrap_or_default();
                    let decoded_seconds = samples.len() as f64 / ASR_SAMPLE_RATE as f64;
                    let original_duration = if container > 0.0 {
                        container
                    } else {
                        decoded_seconds
                    };

                    let (kept, clipped) = apply_budget(samples, budget_seconds);
                    let truncated = clipped || original_duration > budget_seconds;
                    let duration = kept.len() as f64 / ASR_SAMPLE_RATE as f64;

                    progress.emit(1.0, "audio ready").await;
                    Ok(AudioAcquisitionResult {
                        samples: PcmBuffer::mono(kept, ASR_SAMPLE_RATE),
                        duration,
                        original_duration,
                        truncated,
                        warning: Some(format!(
                            "in-process audio decode failed ({primary_err:#}); decoded via ffmpeg"
                        )),
                    })
                }
                Err(fallback_err) => {
                    warn!(
                        "ffmpeg audio decode failed: {:#}; substituting silence",
                        fallback_err
                    );

                    let container = source.duration().await.unwrap_or_default();
                    let kept_seconds = if container > 0.0 {
                        container.min(budget_seconds)
                    } else {
                        budget_seconds
                    };
                    let samples =
                        vec![0.0f32; (kept_seconds * ASR_SAMPLE_RATE as f64) as usize];

                    progress.emit(1.0, "audio unavailable").await;
                    Ok(AudioAcquisitionResult {
                        samples: PcmBuffer::mono(samples, ASR_SAMPLE_RATE),
                        duration: kept_seconds,
                        original_duration: if container > 0.0 {
                            container
                        } else {
                            kept_seconds
                        },
                        truncated: container > budget_seconds,
                        warning: Some(format!(
                            "audio decode failed ({fallback_err:#}); substituted {kept_seconds:.1}s of silence"
                        )),
                    })
                }
            }
        }
    }
}

fn apply_budget(samples: Vec<f32>, budget_seconds: f64) -> (Vec<f32>, bool) {
    let max_samples = (budget_seconds * ASR_SAMPLE_RATE as f64) as usize;
    if samples.len() > max_samples {
        debug!(
            "truncating audio from {} to {} samples",
            samples.len(),
            max_samples
        );
        let mut samples = samples;
        samples.truncate(max_samples);
        (samples, true)
    } else {
        (samples, false)
    }
}

async fn ffmpeg_decode_mono(path: &Path, budget_seconds: f64) -> anyhow::Result<Vec<f32>> {
    let ffmpeg_path = find_ffmpeg_path().ok_or_else(|| anyhow::anyhow!("ffmpeg not found"))?;

    let mut command = Command::new(ffmpeg_path);
    command
        .arg("-i")
        .arg(path)
        .args(["-vn", "-acodec", "pcm_f32le", "-f", "f32le", "-ac", "1", "-ar"])
        .arg(ASR_SAMPLE_RATE.to_string())
        .arg("-t")
        .arg(format!("{:.3}", budget_seconds))
        .arg("-")
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());

    #[cfg(windows)]
    {
        use std::os::windows::process::CommandExt;
        const CREATE_NO_WINDOW: u32 = 0x08000000;
        command.creation_flags(CREATE_NO_WINDOW);
    }

    debug!("ffmpeg command: {:?}", command);

    let mut child = command.spawn()?;
    let mut stdout = child.stdout.take().expect("failed to open stdout");
    let mut stderr = child.stderr.take().expect("failed to open stderr");

    let mut raw = Vec::new();
    stdout.read_to_end(&mut raw).await?;

    let status = child.wait().await?;
    if !status.success() {
        let mut error_message = String::new();
        stderr.read_to_string(&mut error_message).await?;
        return Err(anyhow::anyhow!("ffmpeg process failed: {}", error_message));
    }

    let samples = raw
        .chunks_exact(4)
        .map(|bytes| f32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
        .collect();

    Ok(samples)
}
