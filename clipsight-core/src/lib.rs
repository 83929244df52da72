pub mod ffmpeg;
pub use ffmpeg::{find_ffmpeg_path, find_ffprobe_path};
pub mod language;
pub use language::Language;
pub mod progress;
pub use progress::{ProgressScope, ProgressSender, ProgressUpdate};
pub mod source;
pub use source::{MediaSource, SourceError};
