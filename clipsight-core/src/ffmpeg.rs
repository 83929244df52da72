use once_cell::sync::Lazy;
use std::path::PathBuf;
use tracing::debug;
use which::which;

#[cfg(not(windows))]
const FFMPEG_EXECUTABLE: &str = "ffmpeg";

#[cfg(windows)]
const FFMPEG_EXECUTABLE: &str = "ffmpeg.exe";

#[cfg(not(windows))]
const FFPROBE_EXECUTABLE: &str = "ffprobe";

#[cfg(windows)]
const FFPROBE_EXECUTABLE: &str = "ffprobe.exe";

static FFMPEG_PATH: Lazy<Option<PathBuf>> = Lazy::new(find_ffmpeg_path_internal);
static FFPROBE_PATH: Lazy<Option<PathBuf>> = Lazy::new(find_ffprobe_path_internal);

pub fn find_ffmpeg_path() -> Option<PathBuf> {
    FFMPEG_PATH.as_ref().cloned()
}

pub fn find_ffprobe_path() -> Option<PathBuf> {
    FFPROBE_PATH.as_ref().cloned()
}

fn find_ffmpeg_path_internal() -> Option<PathBuf> {
    debug!("starting search for ffmpeg executable");

    // Check if `ffmpeg` is in the PATH environment variable
    if let Ok(path) = which(FFMPEG_EXECUTABLE) {
        debug!("found ffmpeg in PATH: {:?}", path);
        return Some(path);
    }
    debug!("ffmpeg not found in PATH");

    // Check in current working directory
    if let Ok(cwd) = std::env::current_dir() {
        let ffmpeg_in_cwd = cwd.join(FFMPEG_EXECUTABLE);
        if ffmpeg_in_cwd.is_file() {
            debug!("found ffmpeg in current working directory: {:?}", ffmpeg_in_cwd);
            return Some(ffmpeg_in_cwd);
        }
        debug!("ffmpeg not found in current working directory");
    }

    // Check in the same folder as the executable
    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_folder) = exe_path.parent() {
            let ffmpeg_in_exe_folder = exe_folder.join(FFMPEG_EXECUTABLE);
            if ffmpeg_in_exe_folder.exists() {
                debug!("found ffmpeg in executable folder: {:?}", ffmpeg_in_exe_folder);
                return Some(ffmpeg_in_exe_folder);
            }
            debug!("ffmpeg not found in executable folder");
        }
    }

    debug!("ffmpeg not found");
    None
}

fn find_ffprobe_path_internal() -> Option<PathBuf> {
    // Prefer the sibling of whatever ffmpeg we resolved, so both tools come
    // from the same installation
    if let Some(ffmpeg) = FFMPEG_PATH.as_ref() {
        let sibling = ffmpeg.with_file_name(FFPROBE_EXECUTABLE);
        if sibling.is_file() {
            debug!("found ffprobe next to ffmpeg: {:?}", sibling);
            return Some(sibling);
        }
    }

    if let Ok(path) = which(FFPROBE_EXECUTABLE) {
        debug!("found ffprobe in PATH: {:?}", path);
        return Some(path);
    }

    debug!("ffprobe not found");
    None
}
