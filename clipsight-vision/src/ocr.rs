use anyhow::Result;
use async_trait::async_trait;
use clipsight_core::Language;
use image::DynamicImage;
use rusty_tesseract::{Args, Image};
use std::collections::HashMap;
use tracing::debug;

/// Contract for on-frame text recognition backends.
#[async_trait]
pub trait TextRecognizer: Send + Sync {
    /// Returns the recognized text, trimmed; empty when the frame carries
    /// no legible text.
    async fn recognize(&self, image: &DynamicImage) -> Result<String>;
}

/// Local OCR through the tesseract binary.
pub struct TesseractOcr {
    languages: Vec<Language>,
}

impl TesseractOcr {
    /// Fails when no tesseract binary is on PATH.
    pub fn new(languages: Vec<Language>) -> Result<Self> {
        which::which("tesseract")
            .map_err(|_| anyhow::anyhow!("tesseract not found in PATH"))?;
        Ok(TesseractOcr { languages })
    }
}

#[async_trait]
impl TextRecognizer for TesseractOcr {
    async fn recognize(&self, image: &DynamicImage) -> Result<String> {
        let image = image.clone();
        let languages = self.languages.clone();
        let text =
            tokio::task::spawn_blocking(move || perform_ocr_tesseract(&image, &languages))
                .await??;
        Ok(text)
    }
}

fn perform_ocr_tesseract(image: &DynamicImage, languages: &[Language]) -> Result<String> {
    let language_string = match languages.is_empty() {
        true => "eng".to_string(),
        _ => languages
            .iter()
            .map(|language| language.tesseract_code().to_string())
            .collect::<Vec<String>>()
            .join("+"),
    };

    let args = Args {
        lang: language_string,
        config_variables: HashMap::new(),
        dpi: Some(600),
        psm: Some(1), // automatic page segmentation with OSD
        oem: Some(1), // neural nets LSTM engine only
    };

    let ocr_image = Image::from_dynamic_image(image)
        .map_err(|e| anyhow::anyhow!("tesseract image conversion failed: {:?}", e))?;
    let text = rusty_tesseract::image_to_string(&ocr_image, &args)
        .map_err(|e| anyhow::anyhow!("tesseract failed: {:?}", e))?;

    debug!("ocr produced {} characters", text.trim().len());
    Ok(text.trim().to_string())
}
