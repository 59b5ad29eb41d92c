use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::OcrProducer;
use crate::error::ScanError;

#[derive(Serialize)]
struct ReadRequest<'a> {
    images: &'a [String],
}

#[derive(Deserialize)]
struct ReadResponse {
    text: Vec<String>,
}

/// HTTP OCR service client.
pub struct RemoteOcr {
    client: Client,
    url: String,
}

impl RemoteOcr {
    pub fn new(url: &str, timeout_secs: u64) -> Result<Self, ScanError> {
        let client = Client::builder()
            .user_agent("ChessScan/1.0")
            .timeout(Duration::from_secs(timeout_secs))
            .build()?;
        Ok(Self {
            client,
            url: url.to_string(),
        })
    }
}

#[async_trait]
impl OcrProducer for RemoteOcr {
    fn name(&self) -> &'static str {
        "remote"
    }

    async fn recognize(&self, images: &[String]) -> Result<String, ScanError> {
        debug!(url = %self.url, images = images.len(), "posting images to OCR service");

        let resp = self
            .client
            .post(&self.url)
            .json(&ReadRequest { images })
            .send()
            .await
            .map_err(|e| ScanError::Ocr(format!("Request error: {e}")))?;

        if !resp.status().is_success() {
            warn!(status = %resp.status(), "OCR service returned an error");
            return Err(ScanError::Ocr(format!("HTTP {}", resp.status())));
        }

        let body: ReadResponse = resp
            .json()
            .await
            .map_err(|e| ScanError::Ocr(format!("Invalid OCR response: {e}")))?;
        Ok(body.text.concat())
    }
}
