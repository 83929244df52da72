use crate::capabilities::{CapabilityContext, CapabilityOutcome, CapabilitySettings};
use crate::report::{AnalysisReport, FrameAnnotation};
use chrono::Utc;
use clipsight_audio::{
    acquire_audio, AudioAcquisitionResult, AudioError, RawTranscript, TranscriptionResult,
};
use clipsight_core::{MediaSource, ProgressSender, SourceError};
use clipsight_vision::{extract_keyframes, KeyframeError};
use thiserror::Error;
use tokio::sync::OnceCell;
use tracing::{debug, error, info, warn};

/// Fatal pipeline failures. Everything else degrades into the report.
#[derive(Error, Debug)]
pub enum AnalyzeError {
    #[error(transparent)]
    Source(#[from] SourceError),

    #[error(transparent)]
    Keyframe(#[from] KeyframeError),

    #[error(transparent)]
    Audio(#[from] AudioError),
}

/// Pipeline stage, in execution order. `Failed` is terminal and reached
/// only from fatal conditions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStage {
    Idle,
    Initializing,
    ExtractingFrames,
    AnnotatingFrames,
    Transcribing,
    Done,
    Failed,
}

/// Tunables for an analyzer instance.
#[derive(Debug, Clone)]
pub struct AnalyzerSettings {
    /// Keyframes sampled per video.
    pub keyframe_count: usize,
    /// Most audio seconds fed to transcription.
    pub audio_budget_seconds: f64,
    pub capabilities: CapabilitySettings,
}

impl Default for AnalyzerSettings {
    fn default() -> Self {
        AnalyzerSettings {
            keyframe_count: 6,
            audio_budget_seconds: 30.0,
            capabilities: CapabilitySettings::default(),
        }
    }
}

// Progress weight bands per stage. Backend initialization dominates
// because remote backends may pull models on first contact.
const INIT_BAND: (u8, u8) = (0, 55);
const EXTRACT_BAND: (u8, u8) = (55, 60);
const ANNOTATE_BAND: (u8, u8) = (60, 80);
const ACQUIRE_BAND: (u8, u8) = (80, 90);

/// Drives one video through frame extraction, annotation, and
/// transcription, composing partial results under partial failure.
///
/// The capability context is built lazily on the first run and reused;
/// the analyzer itself is cheap to share across tasks.
pub struct VideoAnalyzer {
    settings: AnalyzerSettings,
    capabilities: OnceCell<CapabilityContext>,
}

impl VideoAnalyzer {
    pub fn new(settings: AnalyzerSettings) -> Self {
        VideoAnalyzer {
            settings,
            capabilities: OnceCell::new(),
        }
    }

    pub fn settings(&self) -> &AnalyzerSettings {
        &self.settings
    }

    /// Runs the full pipeline over one video.
    ///
    /// Missing or failing backends degrade the relevant report section;
    /// only an unreadable source or a failed keyframe extraction abort
    /// the run. Progress lands on 100 exactly once per call.
    pub async fn analyze(
        &self,
        source: &MediaSource,
        progress: &ProgressSender,
    ) -> Result<AnalysisReport, AnalyzeError> {
        let started = std::time::Instant::now();
        info!(
            "analyzing {} ({} bytes)",
            source.file_name(),
            source.file_size()
        );

        let mut stage = RunStage::Idle;
        debug!("run stage: {:?}", stage);

        stage = RunStage::Initializing;
        debug!("run stage: {:?}", stage);
        let init_scope = progress.scope(INIT_BAND.0, INIT_BAND.1);
        let capabilities = match self.capabilities.get() {
            Some(context) => {
                init_scope.emit(1.0, "backends ready").await;
                context
            }
            None => {
                self.capabilities
                    .get_or_init(|| {
                        CapabilityContext::initialize(&self.settings.capabilities, &init_scope)
                    })
                    .await
            }
        };

        stage = RunStage::ExtractingFrames;
        debug!("run stage: {:?}", stage);
        let extract_scope = progress.scope(EXTRACT_BAND.0, EXTRACT_BAND.1);
        extract_scope.emit(0.0, "extracting keyframes").await;
        let keyframes = match extract_keyframes(source, self.settings.keyframe_count).await {
            Ok(keyframes) => keyframes,
            Err(e) => {
                error!("keyframe extraction failed: {}", e);
                debug!("run stage: {:?}", RunStage::Failed);
                return Err(e.into());
            }
        };
        extract_scope
            .emit(1.0, format!("extracted {} keyframes", keyframes.len()))
            .await;

        stage = RunStage::AnnotatingFrames;
        debug!("run stage: {:?}", stage);
        let annotate_scope = progress.scope(ANNOTATE_BAND.0, ANNOTATE_BAND.1);
        let total = keyframes.len();
        let mut annotations = Vec::with_capacity(total);
        for (index, frame) in keyframes.iter().enumerate() {
            annotate_scope
                .emit(
                    index as f64 / total as f64,
                    format!("analyzing frame {} of {}", index + 1, total),
                )
                .await;

            let objects = match capabilities.detect_objects(&frame.image).await {
                CapabilityOutcome::Ok(objects) => objects,
                CapabilityOutcome::Unavailable => Vec::new(),
                CapabilityOutcome::Failed(reason) => {
                    warn!("detection degraded on frame {}: {}", index + 1, reason);
                    Vec::new()
                }
            };

            let text = match capabilities.recognize_text(&frame.image).await {
                CapabilityOutcome::Ok(text) => text,
                CapabilityOutcome::Unavailable => String::new(),
                CapabilityOutcome::Failed(reason) => {
                    warn!("ocr degraded on frame {}: {}", index + 1, reason);
                    String::new()
                }
            };

            annotations.push(FrameAnnotation {
                timestamp: frame.timestamp,
                image: frame.jpeg.clone(),
                objects,
                text,
            });
        }
        annotate_scope.emit(1.0, "frames annotated").await;

        stage = RunStage::Transcribing;
        debug!("run stage: {:?}", stage);
        let transcription = if self.settings.capabilities.disable_transcription {
            progress
                .report(ACQUIRE_BAND.0, "transcription disabled")
                .await;
            None
        } else {
            Some(self.transcribe_stage(source, capabilities, progress).await?)
        };

        let report = AnalysisReport {
            filename: source.file_name().to_string(),
            filesize: source.file_size(),
            timestamp: Utc::now(),
            transcription,
            keyframes: annotations,
        };

        stage = RunStage::Done;
        debug!("run stage: {:?}", stage);
        progress.report(100, "analysis complete").await;
        info!(
            "analysis of {} finished in {:.1}s",
            source.file_name(),
            started.elapsed().as_secs_f64()
        );

        Ok(report)
    }

    async fn transcribe_stage(
        &self,
        source: &MediaSource,
        capabilities: &CapabilityContext,
        progress: &ProgressSender,
    ) -> Result<TranscriptionResult, AnalyzeError> {
        let acquire_scope = progress.scope(ACQUIRE_BAND.0, ACQUIRE_BAND.1);
        let acquired =
            acquire_audio(source, self.settings.audio_budget_seconds, &acquire_scope).await?;

        if let Some(warning) = &acquired.warning {
            warn!("audio acquisition degraded: {}", warning);
        }

        progress.report(92, "running speech recognition").await;
        let outcome = capabilities.transcribe(&acquired.samples).await;
        let result = compose_transcription(outcome, &acquired);

        progress.report(99, "transcript ready").await;
        Ok(result)
    }
}

/// Folds the speech backend's outcome and the acquisition flags into the
/// report's transcription section. Degradations become bracketed
/// diagnostics in the text plus an `error` field; truncation prepends a
/// note. Never fails.
fn compose_transcription(
    outcome: CapabilityOutcome<RawTranscript>,
    acquired: &AudioAcquisitionResult,
) -> TranscriptionResult {
    let mut result = match outcome {
        CapabilityOutcome::Ok(raw) => {
            let trimmed = raw.text.trim();
            let text = if trimmed.is_empty() {
                "[no speech detected]".to_string()
            } else {
                trimmed.to_string()
            };
            TranscriptionResult {
                text,
                duration: acquired.duration,
                chunks: raw.chunks,
                language: raw.language,
                error: None,
            }
        }
        CapabilityOutcome::Unavailable => TranscriptionResult {
            text: "[transcription unavailable: no speech backend]".to_string(),
            duration: acquired.duration,
            chunks: Vec::new(),
            language: None,
            error: Some("no speech backend configured".to_string()),
        },
        CapabilityOutcome::Failed(reason) => TranscriptionResult {
            text: format!("[transcription failed: {}]", reason),
            duration: acquired.duration,
            chunks: Vec::new(),
            language: None,
            error: Some(reason),
        },
    };

    if acquired.truncated {
        result.text = format!(
            "[note: only the first {:.0}s of {:.1}s were transcribed]\n\n{}",
            acquired.duration, acquired.original_duration, result.text
        );
    }

    if let Some(warning) = &acquired.warning {
        result.error = Some(match result.error.take() {
            Some(existing) => format!("{}; {}", warning, existing),
            None => warning.clone(),
        });
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use clipsight_audio::{PcmBuffer, TranscriptChunk, ASR_SAMPLE_RATE};

    fn acquired(duration: f64, original: f64, truncated: bool, warning: Option<&str>) -> AudioAcquisitionResult {
        AudioAcquisitionResult {
            samples: PcmBuffer::mono(
                vec![0.0; (duration * ASR_SAMPLE_RATE as f64) as usize],
                ASR_SAMPLE_RATE,
            ),
            duration,
            original_duration: original,
            truncated,
            warning: warning.map(|w| w.to_string()),
        }
    }

    #[test]
    fn successful_transcription_keeps_text_and_chunks() {
        let raw = RawTranscript {
            text: " hello there ".to_string(),
            chunks: vec![TranscriptChunk {
                text: "hello there".to_string(),
                start: 0.0,
                end: 1.2,
            }],
            language: Some("en".to_string()),
        };

        let result =
            compose_transcription(CapabilityOutcome::Ok(raw), &acquired(10.0, 10.0, false, None));

        assert_eq!(result.text, "hello there");
        assert_eq!(result.chunks.len(), 1);
        assert_eq!(result.language.as_deref(), Some("en"));
        assert!(result.error.is_none());
    }

    #[test]
    fn empty_transcript_becomes_no_speech_marker() {
        let raw = RawTranscript::default();
        let result =
            compose_transcription(CapabilityOutcome::Ok(raw), &acquired(5.0, 5.0, false, None));

        assert_eq!(result.text, "[no speech detected]");
        assert!(result.error.is_none());
    }

    #[test]
    fn missing_backend_degrades_with_diagnostic() {
        let result = compose_transcription(
            CapabilityOutcome::Unavailable,
            &acquired(5.0, 5.0, false, None),
        );

        assert!(result.text.starts_with("[transcription unavailable"));
        assert!(result.error.is_some());
    }

    #[test]
    fn backend_failure_is_recorded_not_raised() {
        let result = compose_transcription(
            CapabilityOutcome::Failed("connection refused".to_string()),
            &acquired(5.0, 5.0, false, None),
        );

        assert_eq!(result.text, "[transcription failed: connection refused]");
        assert_eq!(result.error.as_deref(), Some("connection refused"));
    }

    #[test]
    fn truncation_prepends_note() {
        let raw = RawTranscript {
            text: "partial".to_string(),
            ..Default::default()
        };
        let result =
            compose_transcription(CapabilityOutcome::Ok(raw), &acquired(30.0, 45.2, true, None));

        assert!(
            result.text.starts_with("[note: only the first 30s of 45.2s were transcribed]"),
            "unexpected text: {}",
            result.text
        );
        assert!(result.text.ends_with("partial"));
    }

    #[test]
    fn acquisition_warning_lands_in_error_field() {
        let raw = RawTranscript {
            text: "anything".to_string(),
            ..Default::default()
        };
        let result = compose_transcription(
            CapabilityOutcome::Ok(raw),
            &acquired(30.0, 30.0, false, Some("decoded via ffmpeg")),
        );

        assert_eq!(result.error.as_deref(), Some("decoded via ffmpeg"));
    }
}
