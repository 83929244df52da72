pub mod capabilities;
pub mod cli;
pub mod pipeline;
pub mod report;

pub use capabilities::{CapabilityContext, CapabilityOutcome, CapabilitySettings};
pub use pipeline::{AnalyzeError, AnalyzerSettings, RunStage, VideoAnalyzer};
pub use report::{AnalysisReport, FrameAnnotation};
