use crate::keyframe::encode_jpeg;
use anyhow::Result;
use async_trait::async_trait;
use image::DynamicImage;
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::time::timeout;
use tracing::debug;

/// One detected object in source-pixel coordinates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectedObject {
    pub label: String,
    /// In `[0.0, 1.0]`.
    pub confidence: f32,
    /// x, y, width, height in pixels of the analyzed frame.
    pub bounding_box: [f32; 4],
}

/// Contract for object detection backends.
#[async_trait]
pub trait ObjectDetector: Send + Sync {
    async fn detect(&self, image: &DynamicImage) -> Result<Vec<DetectedObject>>;
}

/// Detection backend reached over HTTP: uploads the frame as multipart JPEG
/// and reads a JSON array of detections back.
pub struct HttpObjectDetector {
    client: Client,
    endpoint: String,
}

impl HttpObjectDetector {
    pub fn new(endpoint: impl Into<String>) -> Self {
        HttpObjectDetector {
            client: Client::new(),
            endpoint: endpoint.into(),
        }
    }
}

#[async_trait]
impl ObjectDetector for HttpObjectDetector {
    async fn detect(&self, image: &DynamicImage) -> Result<Vec<DetectedObject>> {
        let jpeg = encode_jpeg(image)?;

        let part = Part::bytes(jpeg)
            .file_name("frame.jpg")
            .mime_str("image/jpeg")?;
        let form = Form::new().part("file", part);

        let request = self
            .client
            .post(&self.endpoint)
            .header("accept", "application/json")
            .multipart(form)
            .send();

        let response = match timeout(Duration::from_secs(60), request).await {
            Ok(Ok(response)) => response,
            Ok(Err(e)) => return Err(anyhow::anyhow!("request error: {}", e)),
            Err(_) => return Err(anyhow::anyhow!("detection request timed out")),
        };

        if !response.status().is_success() {
            return Err(anyhow::anyhow!(
                "detection service error: {}",
                response.status()
            ));
        }

        let objects: Vec<DetectedObject> = response.json().await?;
        debug!("detector returned {} objects", objects.len());
        Ok(objects)
    }
}
