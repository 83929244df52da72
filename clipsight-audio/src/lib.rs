mod acquisition;
mod audio_processing;
mod encode;
mod error;
mod export;
mod pcm_decode;
mod transcription;

pub use acquisition::{acquire_audio, AudioAcquisitionResult, ASR_SAMPLE_RATE};
pub use audio_processing::{audio_to_mono, resample, PcmBuffer};
pub use encode::{encode_wav, quantize_sample};
pub use error::AudioError;
pub use export::export_wav;
pub use pcm_decode::pcm_decode;
pub use transcription::{
    RawTranscript, RemoteTranscriber, SpeechTranscriber, TranscriptChunk, TranscriptionResult,
};
