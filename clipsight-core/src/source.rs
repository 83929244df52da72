use crate::ffmpeg::find_ffprobe_path;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::process::Command;
use tokio::sync::OnceCell;
use tracing::debug;

/// Errors raised while opening or probing an input video.
#[derive(Error, Debug)]
pub enum SourceError {
    /// Path missing, unreadable, or not a regular file
    #[error("source not readable: {0}")]
    Unreadable(String),

    /// ffprobe missing or exited with failure
    #[error("duration probe failed: {0}")]
    Probe(String),

    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Deserialize)]
struct FFprobeOutput {
    format: Format,
}

#[derive(Debug, Deserialize)]
struct Format {
    duration: Option<String>,
}

/// Immutable handle to the input video file.
///
/// Opening validates that the path is a readable regular file; the
/// container duration is probed lazily, once, on first use.
pub struct MediaSource {
    path: PathBuf,
    file_name: String,
    file_size: u64,
    duration: OnceCell<f64>,
}

impl MediaSource {
    pub async fn open(path: impl AsRef<Path>) -> Result<MediaSource, SourceError> {
        let path = path.as_ref();
        let metadata = tokio::fs::metadata(path)
            .await
            .map_err(|_| SourceError::Unreadable(path.display().to_string()))?;
        if !metadata.is_file() {
            return Err(SourceError::Unreadable(path.display().to_string()));
        }

        let file_name = path
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or("unknown")
            .to_string();

        debug!("opened source {} ({} bytes)", file_name, metadata.len());

        Ok(MediaSource {
            path: path.to_path_buf(),
            file_name,
            file_size: metadata.len(),
            duration: OnceCell::new(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn file_size(&self) -> u64 {
        self.file_size
    }

    /// Container duration in seconds, probed via ffprobe and cached.
    pub async fn duration(&self) -> Result<f64, SourceError> {
        self.duration
            .get_or_try_init(|| probe_duration(&self.path))
            .await
            .map(|duration| *duration)
    }
}

async fn probe_duration(path: &Path) -> Result<f64, SourceError> {
    let ffprobe_path =
        find_ffprobe_path().ok_or_else(|| SourceError::Probe("ffprobe not found".to_string()))?;

    let mut cmd = Command::new(&ffprobe_path);
    cmd.args(["-v", "quiet", "-print_format", "json", "-show_format"])
        .arg(path);

    #[cfg(windows)]
    {
        use std::os::windows::process::CommandExt;
        const CREATE_NO_WINDOW: u32 = 0x08000000;
        cmd.creation_flags(CREATE_NO_WINDOW);
    }

    let output = cmd.output().await?;
    if !output.status.success() {
        return Err(SourceError::Probe(
            String::from_utf8_lossy(&output.stderr).to_string(),
        ));
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    let metadata: FFprobeOutput =
        serde_json::from_str(&stdout).map_err(|e| SourceError::Probe(e.to_string()))?;

    let duration = metadata
        .format
        .duration
        .and_then(|d| d.parse::<f64>().ok())
        .unwrap_or(0.0);

    debug!("probed duration {}s for {:?}", duration, path);
    Ok(duration)
}
