use clipsight_core::{find_ffmpeg_path, MediaSource};
use image::codecs::jpeg::JpegEncoder;
use image::DynamicImage;
use std::io::Cursor;
use std::path::Path;
use std::process::Stdio;
use std::sync::Arc;
use thiserror::Error;
use tokio::io::AsyncReadExt;
use tokio::process::Command;
use tracing::{debug, info};

/// JPEG quality applied to every captured keyframe.
pub const KEYFRAME_JPEG_QUALITY: u8 = 85;

/// Errors raised while sampling keyframes from a video.
#[derive(Error, Debug)]
pub enum KeyframeError {
    /// Requested zero frames
    #[error("keyframe count must be at least 1")]
    InvalidCount,

    /// ffmpeg binary not found
    #[error("ffmpeg not found")]
    FfmpegMissing,

    /// Duration probe failed
    #[error("duration probe failed: {0}")]
    Probe(String),

    /// A seek produced no usable frame
    #[error("frame capture at {timestamp:.2}s failed: {reason}")]
    Capture { timestamp: f64, reason: String },

    /// Frame bytes could not be decoded or re-encoded
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// A captured video frame with its JPEG rendition.
///
/// The JPEG is encoded once at capture, at native dimensions; downstream
/// consumers share the decoded image through the `Arc`.
#[derive(Debug, Clone)]
pub struct Keyframe {
    /// Seek position in seconds from the start of the video.
    pub timestamp: f64,
    pub image: Arc<DynamicImage>,
    pub jpeg: Vec<u8>,
}

/// Evenly spaced interior timestamps: `duration / (n + 1)` apart, excluding
/// both the start and the end of the video.
pub fn sample_timestamps(duration: f64, n: usize) -> Vec<f64> {
    let interval = duration / (n as f64 + 1.0);
    (1..=n).map(|i| interval * i as f64).collect()
}

/// Captures `n` keyframes sequentially, one ffmpeg seek per frame.
///
/// Frames come back in timestamp order. Any individual capture failure
/// aborts the extraction; partial sets are never returned.
pub async fn extract_keyframes(
    source: &MediaSource,
    n: usize,
) -> Result<Vec<Keyframe>, KeyframeError> {
    if n == 0 {
        return Err(KeyframeError::InvalidCount);
    }

    let duration = source
        .duration()
        .await
        .map_err(|e| KeyframeError::Probe(e.to_string()))?;
    let timestamps = sample_timestamps(duration, n);

    info!(
        "extracting {} keyframes from {} ({:.1}s)",
        n,
        source.file_name(),
        duration
    );

    let mut keyframes = Vec::with_capacity(n);
    for timestamp in timestamps {
        let keyframe = capture_frame(source.path(), timestamp).await?;
        keyframes.push(keyframe);
    }

    Ok(keyframes)
}

async fn capture_frame(path: &Path, timestamp: f64) -> Result<Keyframe, KeyframeError> {
    let ffmpeg_path = find_ffmpeg_path().ok_or(KeyframeError::FfmpegMissing)?;

    let offset_str = format!("{:.3}", timestamp);
    debug!("capturing frame at {}s from {:?}", offset_str, path);

    let mut command = Command::new(ffmpeg_path);
    command
        .arg("-ss")
        .arg(&offset_str)
        .arg("-i")
        .arg(path)
        .args(["-vframes", "1", "-f", "image2pipe", "-vcodec", "png", "-"])
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());

    #[cfg(windows)]
    {
        use std::os::windows::process::CommandExt;
        const CREATE_NO_WINDOW: u32 = 0x08000000;
        command.creation_flags(CREATE_NO_WINDOW);
    }

    let mut child = command.spawn()?;
    let mut stdout = child.stdout.take().expect("failed to open stdout");
    let mut stderr = child.stderr.take().expect("failed to open stderr");

    let mut frame_data = Vec::new();
    stdout.read_to_end(&mut frame_data).await?;

    let status = child.wait().await?;
    if !status.success() {
        let mut error_message = String::new();
        stderr.read_to_string(&mut error_message).await?;
        return Err(KeyframeError::Capture {
            timestamp,
            reason: error_message,
        });
    }

    if frame_data.is_empty() {
        return Err(KeyframeError::Capture {
            timestamp,
            reason: "no frame data received".to_string(),
        });
    }

    let image = image::load_from_memory(&frame_data)?;
    let jpeg = encode_jpeg(&image)?;

    Ok(Keyframe {
        timestamp,
        image: Arc::new(image),
        jpeg,
    })
}

/// Encodes a frame as JPEG at [`KEYFRAME_JPEG_QUALITY`], native dimensions.
pub fn encode_jpeg(image: &DynamicImage) -> Result<Vec<u8>, image::ImageError> {
    let mut jpeg_buffer = Vec::new();
    let mut cursor = Cursor::new(&mut jpeg_buffer);
    let mut encoder = JpegEncoder::new_with_quality(&mut cursor, KEYFRAME_JPEG_QUALITY);
    encoder.encode_image(image)?;
    Ok(jpeg_buffer)
}
