use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::CODEC_TYPE_NULL;
use tracing::debug;

/// Decodes the first audio track of a media file to interleaved f32 samples.
///
/// # Returns
/// * `Ok((Vec<f32>, u32, u16))` - Interleaved PCM samples, sample rate, and
///   channel count at the track's native format
/// * `Err(anyhow::Error)` - If decoding fails
///
/// # Errors
/// Returns an error if:
/// * The file cannot be opened
/// * No supported audio tracks are found
/// * Decoding fails
pub fn pcm_decode<P: AsRef<std::path::Path>>(path: P) -> anyhow::Result<(Vec<f32>, u32, u16)> {
    debug!("starting pcm decode for {:?}", path.as_ref());

    let src = std::fs::File::open(&path)?;
    let mss = symphonia::core::io::MediaSourceStream::new(Box::new(src), Default::default());

    let hint = symphonia::core::probe::Hint::new();
    let probed = symphonia::default::get_probe().format(
        &hint,
        mss,
        &Default::default(),
        &Default::default(),
    )?;

    let mut format = probed.format;

    // Find the first decodeable audio track
    let track = format
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
        .ok_or_else(|| anyhow::anyhow!("no supported audio tracks found"))?;

    let mut decoder = symphonia::default::get_codecs()
        .make(&track.codec_params, &Default::default())
        .map_err(|_| anyhow::anyhow!("unsupported codec"))?;

    let track_id = track.id;
    let sample_rate = track
        .codec_params
        .sample_rate
        .ok_or_else(|| anyhow::anyhow!("could not determine sample rate"))?;
    let mut channels = track.codec_params.channels.map(|c| c.count() as u16);

    let mut pcm_data = Vec::new();
    let mut sample_buf: Option<SampleBuffer<f32>> = None;

    while let Ok(packet) = format.next_packet() {
        // Skip metadata and packets from other tracks
        while !format.metadata().is_latest() {
            format.metadata().pop();
        }
        if packet.track_id() != track_id {
            continue;
        }

        let decoded = decoder.decode(&packet)?;
        if sample_buf.is_none() {
            let spec = *decoded.spec();
            channels.get_or_insert(spec.channels.count() as u16);
            sample_buf = Some(SampleBuffer::<f32>::new(decoded.capacity() as u64, spec));
        }
        if let Some(buf) = sample_buf.as_mut() {
            buf.copy_interleaved_ref(decoded);
            pcm_data.extend_from_slice(buf.samples());
        }
    }

    let channels = channels.unwrap_or(1);
    debug!(
        "decoded {} samples at {} hz across {} channels",
        pcm_data.len(),
        sample_rate,
        channels
    );

    Ok((pcm_data, sample_rate, channels))
}
