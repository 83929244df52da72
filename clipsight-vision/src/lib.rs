pub mod detection;
pub mod keyframe;
pub mod ocr;

pub use detection::{DetectedObject, HttpObjectDetector, ObjectDetector};
pub use keyframe::{
    encode_jpeg, extract_keyframes, sample_timestamps, Keyframe, KeyframeError,
    KEYFRAME_JPEG_QUALITY,
};
pub use ocr::{TesseractOcr, TextRecognizer};
