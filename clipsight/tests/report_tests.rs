#[cfg(test)]
mod tests {
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine;
    use chrono::Utc;
    use clipsight::{AnalysisReport, FrameAnnotation};
    use clipsight_audio::TranscriptionResult;
    use clipsight_vision::DetectedObject;
    use serde_json::Value;

    fn sample_report() -> AnalysisReport {
        AnalysisReport {
            filename: "clip.mp4".to_string(),
            filesize: 4096,
            timestamp: Utc::now(),
            transcription: Some(TranscriptionResult {
                text: "hello".to_string(),
                duration: 12.5,
                chunks: Vec::new(),
                language: None,
                error: None,
            }),
            keyframes: vec![FrameAnnotation {
                timestamp: 3.5,
                image: vec![0xFF, 0xD8, 0xFF, 0xD9],
                objects: vec![DetectedObject {
                    label: "cat".to_string(),
                    confidence: 0.92,
                    bounding_box: [10.0, 20.0, 110.0, 220.0],
                }],
                text: "on-frame text".to_string(),
            }],
        }
    }

    fn sorted_keys(value: &Value) -> Vec<String> {
        let mut keys: Vec<String> = value
            .as_object()
            .expect("expected a json object")
            .keys()
            .cloned()
            .collect();
        keys.sort();
        keys
    }

    #[test]
    fn test_report_carries_exactly_the_contract_keys() {
        let json = serde_json::to_value(sample_report()).unwrap();

        assert_eq!(
            sorted_keys(&json),
            vec!["filename", "filesize", "keyframes", "timestamp", "transcription"]
        );
        assert_eq!(json["filename"], "clip.mp4");
        assert_eq!(json["filesize"], 4096);
        assert!(json["timestamp"].is_string());
    }

    #[test]
    fn test_frame_entries_embed_base64_jpeg() {
        let json = serde_json::to_value(sample_report()).unwrap();
        let frame = &json["keyframes"][0];

        assert_eq!(
            sorted_keys(frame),
            vec!["image", "objects", "text", "timestamp"]
        );
        assert_eq!(frame["timestamp"], 3.5);
        assert_eq!(frame["text"], "on-frame text");

        let encoded = frame["image"].as_str().unwrap();
        let decoded = STANDARD.decode(encoded).unwrap();
        assert_eq!(decoded, vec![0xFF, 0xD8, 0xFF, 0xD9]);
    }

    #[test]
    fn test_detections_expose_label_confidence_and_box() {
        let json = serde_json::to_value(sample_report()).unwrap();
        let object = &json["keyframes"][0]["objects"][0];

        assert_eq!(
            sorted_keys(object),
            vec!["bounding_box", "confidence", "label"]
        );
        assert_eq!(object["label"], "cat");
        assert_eq!(object["bounding_box"].as_array().unwrap().len(), 4);
    }

    #[test]
    fn test_empty_transcription_fields_are_omitted() {
        let json = serde_json::to_value(sample_report()).unwrap();
        let transcription = json["transcription"].as_object().unwrap();

        assert!(!transcription.contains_key("language"));
        assert!(!transcription.contains_key("error"));
        assert_eq!(transcription["text"], "hello");
        assert_eq!(transcription["duration"], 12.5);
    }

    #[test]
    fn test_degraded_transcription_keeps_its_error() {
        let mut report = sample_report();
        report.transcription = Some(TranscriptionResult {
            text: "[transcription failed: timeout]".to_string(),
            duration: 0.0,
            chunks: Vec::new(),
            language: None,
            error: Some("timeout".to_string()),
        });

        let json = serde_json::to_value(report).unwrap();
        assert_eq!(json["transcription"]["error"], "timeout");
    }

    #[test]
    fn test_disabled_transcription_serializes_as_null() {
        let mut report = sample_report();
        report.transcription = None;

        let json = serde_json::to_value(report).unwrap();
        assert!(json["transcription"].is_null());
        assert!(json.as_object().unwrap().contains_key("transcription"));
    }
}
