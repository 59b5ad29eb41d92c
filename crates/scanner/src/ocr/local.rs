use std::process::Stdio;

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::debug;

use super::OcrProducer;
use crate::error::ScanError;

/// Local OCR worker process, run once per image.
pub struct LocalOcr {
    path: String,
    language: String,
}

impl LocalOcr {
    pub fn new(path: &str, language: &str) -> Self {
        Self {
            path: path.to_string(),
            language: language.to_string(),
        }
    }

    async fn read_page(&self, bytes: &[u8]) -> Result<String, ScanError> {
        let mut child = Command::new(&self.path)
            .args(["stdin", "stdout", "-l", &self.language])
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| ScanError::Ocr(format!("Failed to spawn {}: {e}", self.path)))?;

        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| ScanError::Ocr("worker stdin unavailable".to_string()))?;
        stdin.write_all(bytes).await?;
        drop(stdin);

        let output = child.wait_with_output().await?;
        if !output.status.success() {
            return Err(ScanError::Ocr(format!("worker exited with {}", output.status)));
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

/// Decode a base64 image, with or without a `data:...;base64,` prefix.
pub(crate) fn decode_image(image: &str) -> Result<Vec<u8>, ScanError> {
    let payload = match image.split_once(";base64,") {
        Some((_, data)) => data,
        None => image,
    };
    STANDARD
        .decode(payload.trim())
        .map_err(|e| ScanError::Ocr(format!("Invalid image data: {e}")))
}

#[async_trait]
impl OcrProducer for LocalOcr {
    fn name(&self) -> &'static str {
        "local"
    }

    async fn recognize(&self, images: &[String]) -> Result<String, ScanError> {
        let mut pages = Vec::with_capacity(images.len());
        for (i, image) in images.iter().enumerate() {
            let bytes = decode_image(image)?;
            debug!(page = i, bytes = bytes.len(), "running local OCR worker");
            pages.push(self.read_page(&bytes).await?);
        }
        Ok(pages.join("\n"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_image_strips_data_url() {
        assert_eq!(decode_image("data:image/png;base64,aGk=").unwrap(), b"hi");
        assert_eq!(decode_image("aGk=").unwrap(), b"hi");
        assert!(decode_image("***").is_err());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_pages_joined_with_newline() {
        use std::os::unix::fs::PermissionsExt;

        let script = std::env::temp_dir().join(format!("echo-ocr-{}.sh", std::process::id()));
        std::fs::write(&script, "#!/bin/sh\ncat\n").unwrap();
        std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();

        let ocr = LocalOcr::new(script.to_str().unwrap(), "eng");
        let text = ocr
            .recognize(&["ZTQ=".to_string(), "data:image/png;base64,ZTU=".to_string()])
            .await
            .unwrap();
        assert_eq!(text, "e4\ne5");

        std::fs::remove_file(&script).unwrap();
    }

    #[tokio::test]
    async fn test_missing_worker_is_ocr_failure() {
        let ocr = LocalOcr::new("/nonexistent/ocr-worker", "eng");
        let err = ocr.recognize(&["aGk=".to_string()]).await.unwrap_err();
        assert!(matches!(err, ScanError::Ocr(_)));
    }
}
