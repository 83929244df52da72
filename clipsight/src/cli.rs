use crate::capabilities::CapabilitySettings;
use crate::pipeline::AnalyzerSettings;
use clap::Parser;
use clipsight_core::Language;
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    author,
    version,
    about,
    long_about = None,
    name = "clipsight"
)]
pub struct Cli {
    /// Video file to analyze
    pub video: PathBuf,

    /// Number of keyframes to sample, evenly spaced through the video
    #[arg(short = 'f', long, default_value_t = 6)]
    pub frames: usize,

    /// Maximum seconds of audio fed to transcription
    #[arg(long, default_value_t = 30.0)]
    pub audio_budget: f64,

    /// Report path. Defaults to the video path with an .analysis.json extension
    #[arg(short = 'o', long)]
    pub output: Option<PathBuf>,

    /// Also write the decoded audio track next to the video as WAV
    #[arg(long, default_value_t = false)]
    pub export_audio: bool,

    /// Languages to consider for on-frame text (can be specified multiple times)
    #[arg(short = 'l', long = "language", value_enum)]
    pub languages: Vec<Language>,

    /// Speech recognition endpoint (receives WAV, returns a JSON transcript)
    #[arg(long, env = "CLIPSIGHT_ASR_URL")]
    pub asr_url: Option<String>,

    /// Bearer token sent to the speech recognition endpoint
    #[arg(long, env = "CLIPSIGHT_ASR_API_KEY")]
    pub asr_api_key: Option<String>,

    /// Object detection endpoint (receives a JPEG, returns JSON detections)
    #[arg(long, env = "CLIPSIGHT_DETECTOR_URL")]
    pub detector_url: Option<String>,

    /// Skip transcription; the report carries no transcription section
    #[arg(long, default_value_t = false)]
    pub disable_transcription: bool,

    /// Skip object detection; frames carry empty object lists
    #[arg(long, default_value_t = false)]
    pub disable_detection: bool,

    /// Skip on-frame text recognition; frames carry empty text
    #[arg(long, default_value_t = false)]
    pub disable_ocr: bool,

    /// Enable debug logging for clipsight modules
    #[arg(long)]
    pub debug: bool,

    /// Log directory. Default to $HOME/.clipsight
    #[arg(long)]
    pub log_dir: Option<String>,
}

impl Cli {
    pub fn analyzer_settings(&self) -> AnalyzerSettings {
        AnalyzerSettings {
            keyframe_count: self.frames,
            audio_budget_seconds: self.audio_budget,
            capabilities: CapabilitySettings {
                asr_url: self.asr_url.clone(),
                asr_api_key: self.asr_api_key.clone(),
                detector_url: self.detector_url.clone(),
                languages: self.languages.clone(),
                disable_transcription: self.disable_transcription,
                disable_detection: self.disable_detection,
                disable_ocr: self.disable_ocr,
            },
        }
    }

    /// Report destination: `-o` if given, else `<video stem>.analysis.json`
    /// next to the input.
    pub fn output_path(&self) -> PathBuf {
        self.output
            .clone()
            .unwrap_or_else(|| self.video.with_extension("analysis.json"))
    }
}
