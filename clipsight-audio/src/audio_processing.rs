use tracing::debug;

/// Interleaved f32 PCM tagged with its format.
#[derive(Debug, Clone)]
pub struct PcmBuffer {
    pub samples: Vec<f32>,
    pub sample_rate: u32,
    pub channels: u16,
}

impl PcmBuffer {
    pub fn mono(samples: Vec<f32>, sample_rate: u32) -> Self {
        PcmBuffer {
            samples,
            sample_rate,
            channels: 1,
        }
    }

    pub fn duration_seconds(&self) -> f64 {
        if self.sample_rate == 0 || self.channels == 0 {
            return 0.0;
        }
        self.samples.len() as f64 / (self.sample_rate as f64 * self.channels as f64)
    }
}

/// Averages interleaved samples across channels into a single mono stream.
pub fn audio_to_mono(audio: &[f32], channels: u16) -> Vec<f32> {
    if channels <= 1 {
        return audio.to_vec();
    }

    let mut mono_samples = Vec::with_capacity(audio.len() / channels as usize);
    for chunk in audio.chunks(channels as usize) {
        let sum: f32 = chunk.iter().sum();
        mono_samples.push(sum / channels as f32);
    }

    mono_samples
}

/// Linear-interpolation resampler.
///
/// Output length is `round(len * to_rate / from_rate)`. Each output sample
/// reads the fractional source position `i * from_rate / to_rate` and blends
/// the two bracketing input samples, the upper one clamped to the last
/// index. Equal rates and empty input pass through untouched.
pub fn resample(input: &[f32], from_rate: u32, to_rate: u32) -> Vec<f32> {
    if from_rate == to_rate || input.is_empty() {
        return input.to_vec();
    }

    debug!(
        "resampling {} samples from {} hz to {} hz",
        input.len(),
        from_rate,
        to_rate
    );

    let ratio = from_rate as f64 / to_rate as f64;
    let new_len = (input.len() as f64 / ratio).round() as usize;
    let mut output = Vec::with_capacity(new_len);

    for i in 0..new_len {
        let src_index = i as f64 * ratio;
        let floor_index = src_index.floor() as usize;
        let ceil_index = (floor_index + 1).min(input.len() - 1);
        let t = src_index - floor_index as f64;

        let sample = input[floor_index] as f64 * (1.0 - t) + input[ceil_index] as f64 * t;
        output.push(sample as f32);
    }

    output
}
