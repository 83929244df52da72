use base64::{engine::general_purpose, Engine as _};
use chrono::{DateTime, Utc};
use clipsight_audio::TranscriptionResult;
use clipsight_vision::DetectedObject;
use serde::{Serialize, Serializer};

fn serialize_jpeg_base64<S>(jpeg: &Vec<u8>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&general_purpose::STANDARD.encode(jpeg))
}

/// One annotated keyframe as it appears in the report.
#[derive(Debug, Clone, Serialize)]
pub struct FrameAnnotation {
    /// Seconds from the start of the video.
    pub timestamp: f64,
    /// JPEG bytes; base64 in JSON.
    #[serde(serialize_with = "serialize_jpeg_base64")]
    pub image: Vec<u8>,
    /// Empty when no detection backend ran for this frame.
    pub objects: Vec<DetectedObject>,
    /// Empty when no text was recognized.
    pub text: String,
}

/// Top-level analysis output for one video.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisReport {
    pub filename: String,
    pub filesize: u64,
    /// Completion time, RFC 3339 UTC.
    pub timestamp: DateTime<Utc>,
    /// `None` only when transcription was explicitly disabled.
    pub transcription: Option<TranscriptionResult>,
    pub keyframes: Vec<FrameAnnotation>,
}
