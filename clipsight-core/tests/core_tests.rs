#[cfg(test)]
mod tests {
    use clipsight_core::{MediaSource, SourceError};
    use std::process::Command;

    #[tokio::test]
    async fn test_open_missing_path_is_unreadable() {
        let result = MediaSource::open("/definitely/not/here.mp4").await;
        assert!(matches!(result, Err(SourceError::Unreadable(_))));
    }

    #[tokio::test]
    async fn test_open_directory_is_unreadable() {
        let dir = tempfile::tempdir().unwrap();
        let result = MediaSource::open(dir.path()).await;
        assert!(matches!(result, Err(SourceError::Unreadable(_))));
    }

    #[tokio::test]
    async fn test_open_reads_metadata() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("clip.mp4");
        std::fs::write(&path, vec![0u8; 1234]).unwrap();

        let source = MediaSource::open(&path).await.unwrap();

        assert_eq!(source.file_name(), "clip.mp4");
        assert_eq!(source.file_size(), 1234);
        assert_eq!(source.path(), path.as_path());
    }

    // needs ffmpeg and ffprobe on the path
    #[tokio::test]
    #[ignore]
    async fn test_duration_probe_matches_generated_video() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("testsrc.mp4");

        let output = Command::new("ffmpeg")
            .args([
                "-f",
                "lavfi",
                "-i",
                "testsrc=duration=2:size=160x120:rate=10",
                "-pix_fmt",
                "yuv420p",
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
        let duration = source.duration().await.unwrap();

        assert!((duration - 2.0).abs() < 0.2, "probed {duration}s");

        // second read comes from the cache, same value
        let again = source.duration().await.unwrap();
        assert_eq!(duration, again);
    }
}
