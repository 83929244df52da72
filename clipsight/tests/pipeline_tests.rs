#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use clipsight::{
        AnalyzerSettings, CapabilityContext, CapabilityOutcome, CapabilitySettings, VideoAnalyzer,
    };
    use clipsight_audio::{PcmBuffer, RawTranscript, SpeechTranscriber};
    use clipsight_core::{MediaSource, ProgressSender};
    use clipsight_vision::{DetectedObject, ObjectDetector};
    use image::DynamicImage;
    use std::process::Command;
    use std::sync::Arc;

    struct CannedTranscriber;

    #[async_trait]
    impl SpeechTranscriber for CannedTranscriber {
        async fn transcribe(&self, _audio: &PcmBuffer) -> anyhow::Result<RawTranscript> {
            Ok(RawTranscript {
                text: "canned transcript".to_string(),
                chunks: Vec::new(),
                language: Some("en".to_string()),
            })
        }
    }

    struct FailingDetector;

    #[async_trait]
    impl ObjectDetector for FailingDetector {
        async fn detect(&self, _image: &DynamicImage) -> anyhow::Result<Vec<DetectedObject>> {
            Err(anyhow::anyhow!("connection refused"))
        }
    }

    fn silent_buffer() -> PcmBuffer {
        PcmBuffer::mono(vec![0.0; 16000], 16000)
    }

    #[tokio::test]
    async fn test_missing_backends_surface_as_unavailable() {
        let context = CapabilityContext::with_backends(None, None, None);

        assert!(!context.has_transcriber());
        assert!(matches!(
            context.transcribe(&silent_buffer()).await,
            CapabilityOutcome::Unavailable
        ));

        let frame = DynamicImage::new_rgb8(4, 4);
        assert!(matches!(
            context.detect_objects(&frame).await,
            CapabilityOutcome::Unavailable
        ));
        assert!(matches!(
            context.recognize_text(&frame).await,
            CapabilityOutcome::Unavailable
        ));
    }

    #[tokio::test]
    async fn test_configured_backend_returns_its_result() {
        let context = CapabilityContext::with_backends(Some(Arc::new(CannedTranscriber)), None, None);

        match context.transcribe(&silent_buffer()).await {
            CapabilityOutcome::Ok(raw) => {
                assert_eq!(raw.text, "canned transcript");
                assert_eq!(raw.language.as_deref(), Some("en"));
            }
            other => panic!("expected a transcript, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_backend_failure_is_captured_not_raised() {
        let context = CapabilityContext::with_backends(None, Some(Arc::new(FailingDetector)), None);

        let frame = DynamicImage::new_rgb8(4, 4);
        match context.detect_objects(&frame).await {
            CapabilityOutcome::Failed(reason) => {
                assert!(reason.contains("connection refused"))
            }
            other => panic!("expected a captured failure, got {:?}", other),
        }
    }

    // needs ffmpeg and ffprobe on the path
    #[tokio::test]
    #[ignore]
    async fn test_analyze_generated_video_end_to_end() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("clip.mp4");

        let output = Command::new("ffmpeg")
            .args([
                "-f",
                "lavfi",
                "-i",
                "testsrc=duration=3:size=320x240:rate=10",
                "-f",
                "lavfi",
                "-i",
                "sine=frequency=440:duration=3",
                "-c:a",
                "aac",
                "-pix_fmt",
                "yuv420p",
                "-shortest",
                "-y",
                path.to_str().unwrap(),
            ])
            .output()
            .unwrap();
        assert!(
            output.status.success(),
            "failed to generate test video: {}",
            String::from_utf8_lossy(&output.stderr)
        );

        let source = MediaSource::open(&path).await.unwrap();
        let analyzer = VideoAnalyzer::new(AnalyzerSettings {
            keyframe_count: 4,
            audio_budget_seconds: 30.0,
            capabilities: CapabilitySettings {
                disable_ocr: true,
                ..CapabilitySettings::default()
            },
        });

        let (progress, mut updates) = ProgressSender::channel(256);
        let report = analyzer.analyze(&source, &progress).await.unwrap();
        drop(progress);

        let mut percents = Vec::new();
        while let Some(update) = updates.recv().await {
            percents.push(update.percent);
        }

        assert!(percents.windows(2).all(|pair| pair[0] <= pair[1]));
        assert_eq!(percents.last().copied(), Some(100));
        assert_eq!(percents.iter().filter(|p| **p == 100).count(), 1);

        assert_eq!(report.filename, "clip.mp4");
        assert_eq!(report.keyframes.len(), 4);
        assert!(report
            .keyframes
            .windows(2)
            .all(|pair| pair[0].timestamp < pair[1].timestamp));
        for frame in &report.keyframes {
            assert!(!frame.image.is_empty());
            assert!(frame.objects.is_empty());
            assert!(frame.text.is_empty());
        }

        // no speech backend is configured, so the section degrades
        let transcription = report.transcription.expect("transcription should be present");
        assert!(transcription.text.starts_with("[transcription unavailable"));
        assert!(transcription.error.is_some());
        assert!(transcription.duration > 2.0 && transcription.duration < 3.5);
    }
}
