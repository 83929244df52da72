use clipsight_audio::{PcmBuffer, RawTranscript, RemoteTranscriber, SpeechTranscriber};
use clipsight_core::{Language, ProgressScope};
use clipsight_vision::{
    DetectedObject, HttpObjectDetector, ObjectDetector, TesseractOcr, TextRecognizer,
};
use image::DynamicImage;
use std::sync::Arc;
use tracing::{info, warn};

/// Result of invoking an optional capability.
#[derive(Debug)]
pub enum CapabilityOutcome<T> {
    Ok(T),
    /// The backend was never configured or failed to initialize.
    Unavailable,
    /// The backend was called and failed.
    Failed(String),
}

/// Configuration for the optional inference backends.
#[derive(Debug, Clone, Default)]
pub struct CapabilitySettings {
    pub asr_url: Option<String>,
    pub asr_api_key: Option<String>,
    pub detector_url: Option<String>,
    pub languages: Vec<Language>,
    pub disable_transcription: bool,
    pub disable_detection: bool,
    pub disable_ocr: bool,
}

/// Holds whichever inference backends could be brought up.
///
/// A backend that is not configured, or whose initialization fails, is
/// recorded as absent and surfaces per call as
/// [`CapabilityOutcome::Unavailable`]. Initialization never aborts a run.
pub struct CapabilityContext {
    transcriber: Option<Arc<dyn SpeechTranscriber>>,
    detector: Option<Arc<dyn ObjectDetector>>,
    ocr: Option<Arc<dyn TextRecognizer>>,
}

impl CapabilityContext {
    pub async fn initialize(
        settings: &CapabilitySettings,
        progress: &ProgressScope,
    ) -> CapabilityContext {
        progress.emit(0.0, "initializing analysis backends").await;

        let transcriber: Option<Arc<dyn SpeechTranscriber>> = if settings.disable_transcription {
            None
        } else {
            match &settings.asr_url {
                Some(url) => {
                    info!("speech backend: {}", url);
                    Some(Arc::new(RemoteTranscriber::new(
                        url.clone(),
                        settings.asr_api_key.clone(),
                    )))
                }
                None => {
                    warn!("no speech backend configured");
                    None
                }
            }
        };
        progress.emit(0.45, "speech backend ready").await;

        let detector: Option<Arc<dyn ObjectDetector>> = if settings.disable_detection {
            None
        } else {
            match &settings.detector_url {
                Some(url) => {
                    info!("detection backend: {}", url);
                    Some(Arc::new(HttpObjectDetector::new(url.clone())))
                }
                None => {
                    warn!("no detection backend configured");
                    None
                }
            }
        };
        progress.emit(0.65, "detection backend ready").await;

        let ocr: Option<Arc<dyn TextRecognizer>> = if settings.disable_ocr {
            None
        } else {
            match TesseractOcr::new(settings.languages.clone()) {
                Ok(ocr) => {
                    info!("ocr backend: tesseract");
                    Some(Arc::new(ocr))
                }
                Err(e) => {
                    warn!("ocr backend unavailable: {:#}", e);
                    None
                }
            }
        };
        progress.emit(1.0, "backends ready").await;

        CapabilityContext {
            transcriber,
            detector,
            ocr,
        }
    }

    /// For embedders and tests that bring their own backends.
    pub fn with_backends(
        transcriber: Option<Arc<dyn SpeechTranscriber>>,
        detector: Option<Arc<dyn ObjectDetector>>,
        ocr: Option<Arc<dyn TextRecognizer>>,
    ) -> CapabilityContext {
        CapabilityContext {
            transcriber,
            detector,
            ocr,
        }
    }

    pub fn has_transcriber(&self) -> bool {
        self.transcriber.is_some()
    }

    pub async fn transcribe(&self, audio: &PcmBuffer) -> CapabilityOutcome<RawTranscript> {
        match &self.transcriber {
            None => CapabilityOutcome::Unavailable,
            Some(backend) => match backend.transcribe(audio).await {
                Ok(transcript) => CapabilityOutcome::Ok(transcript),
                Err(e) => {
                    warn!("transcription failed: {:#}", e);
                    CapabilityOutcome::Failed(format!("{e:#}"))
                }
            },
        }
    }

    pub async fn detect_objects(
        &self,
        image: &DynamicImage,
    ) -> CapabilityOutcome<Vec<DetectedObject>> {
        match &self.detector {
            None => CapabilityOutcome::Unavailable,
            Some(backend) => match backend.detect(image).await {
                Ok(objects) => CapabilityOutcome::Ok(objects),
                Err(e) => {
                    warn!("object detection failed: {:#}", e);
                    CapabilityOutcome::Failed(format!("{e:#}"))
                }
            },
        }
    }

    pub async fn recognize_text(&self, image: &DynamicImage) -> CapabilityOutcome<String> {
        match &self.ocr {
            None => CapabilityOutcome::Unavailable,
            Some(backend) => match backend.recognize(image).await {
                Ok(text) => CapabilityOutcome::Ok(text),
                Err(e) => {
                    warn!("ocr failed: {:#}", e);
                    CapabilityOutcome::Failed(format!("{e:#}"))
                }
            },
        }
    }
}
