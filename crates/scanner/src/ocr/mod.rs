//! OCR text producers. Both turn an ordered list of base64 images into one
//! block of recognized notation text.

mod local;
mod remote;

use async_trait::async_trait;

pub use local::LocalOcr;
pub use remote::RemoteOcr;

use crate::config::{OcrMode, ScanConfig};
use crate::error::ScanError;

/// Notice shown to the user when a scan attempt fails.
pub const OCR_FAILURE_NOTICE: &str = "could not scan this image, is your network connected?";

#[async_trait]
pub trait OcrProducer: Send + Sync {
    fn name(&self) -> &'static str;

    /// Recognize the text of `images`, in order. Failures are not retried.
    async fn recognize(&self, images: &[String]) -> Result<String, ScanError>;
}

/// Build the producer selected by `OCR_MODE`.
pub fn producer_from_config(config: &ScanConfig) -> Result<Box<dyn OcrProducer>, ScanError> {
    match config.ocr_mode {
        OcrMode::Remote => {
            let url = config
                .ocr_reader_url
                .as_deref()
                .ok_or(ScanError::Config("OCR_READER_URL not set"))?;
            Ok(Box::new(RemoteOcr::new(url, config.ocr_timeout_secs)?))
        }
        OcrMode::Local => Ok(Box::new(LocalOcr::new(
            &config.tesseract_path,
            &config.ocr_language,
        ))),
    }
}
