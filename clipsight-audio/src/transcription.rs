use crate::audio_processing::PcmBuffer;
use crate::encode::encode_wav;
use anyhow::Result;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, error, info};

/// A timed span of recognized speech.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptChunk {
    pub text: String,
    /// Seconds from the start of the analyzed audio.
    pub start: f64,
    pub end: f64,
}

/// What a speech backend returns, before report shaping.
#[derive(Debug, Clone, Default)]
pub struct RawTranscript {
    pub text: String,
    pub chunks: Vec<TranscriptChunk>,
    pub language: Option<String>,
}

/// Transcription section of the analysis report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscriptionResult {
    pub text: String,
    /// Seconds of audio the transcript covers.
    pub duration: f64,
    pub chunks: Vec<TranscriptChunk>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    /// Diagnostic when transcription degraded; `None` on the happy path.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Contract for speech-to-text backends.
///
/// Implementations receive mono 16 khz PCM and are called at most once at
/// a time per pipeline run.
#[async_trait]
pub trait SpeechTranscriber: Send + Sync {
    async fn transcribe(&self, audio: &PcmBuffer) -> Result<RawTranscript>;
}

/// Speech backend reached over HTTP: posts the clip as a WAV body and reads
/// `{text, chunks, language}` JSON back.
pub struct RemoteTranscriber {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

impl RemoteTranscriber {
    pub fn new(base_url: impl Into<String>, api_key: Option<String>) -> Self {
        RemoteTranscriber {
            client: Client::new(),
            base_url: base_url.into(),
            api_key,
        }
    }
}

#[async_trait]
impl SpeechTranscriber for RemoteTranscriber {
    async fn transcribe(&self, audio: &PcmBuffer) -> Result<RawTranscript> {
        debug!("starting remote transcription");

        let wav_data = encode_wav(&audio.samples, audio.sample_rate, audio.channels)?;

        let mut request = self
            .client
            .post(&self.base_url)
            .header("Content-Type", "audio/wav")
            .timeout(Duration::from_secs(180));
        if let Some(api_key) = &self.api_key {
            request = request.header("Authorization", format!("Bearer {}", api_key));
        }

        let response = request.body(wav_data).send().await?;
        if !response.status().is_success() {
            error!("speech service returned {}", response.status());
            return Err(anyhow::anyhow!(
                "speech service error: {}",
                response.status()
            ));
        }

        let result: Value = response.json().await?;
        let text = result["text"].as_str().unwrap_or("").trim().to_string();
        let language = result["language"].as_str().map(|s| s.to_string());
        let chunks = result["chunks"]
            .as_array()
            .map(|entries| {
                entries
                    .iter()
                    .filter_map(|entry| {
                        Some(TranscriptChunk {
                            text: entry["text"].as_str()?.trim().to_string(),
                            start: entry["start"].as_f64().unwrap_or(0.0),
                            end: entry["end"].as_f64().unwrap_or(0.0),
                        })
                    })
                    .collect()
            })
            .unwrap_or_default();

        if text.is_empty() {
            info!("transcription is empty");
        } else {
            info!("transcription successful, length: {} characters", text.len());
        }

        Ok(RawTranscript {
            text,
            chunks,
            language,
        })
    }
}
