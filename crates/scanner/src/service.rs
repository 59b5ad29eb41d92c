//! Scan attempts: OCR an image set, then feed the text to the import session.

use std::sync::Arc;

use notation_core::{RulesEngine, ShakmatyEngine};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::error::ScanError;
use crate::ocr::{OcrProducer, OCR_FAILURE_NOTICE};
use crate::recovery::{Outcome, SharedSession};

pub struct ScanService<E = ShakmatyEngine> {
    producer: Arc<dyn OcrProducer>,
    session: SharedSession<E>,
}

impl<E: RulesEngine> ScanService<E> {
    pub fn new(producer: Arc<dyn OcrProducer>, session: SharedSession<E>) -> Self {
        Self { producer, session }
    }

    pub fn session(&self) -> &SharedSession<E> {
        &self.session
    }

    /// Run one scan attempt.
    ///
    /// Returns `Ok(None)` if `cancel` fires first. The OCR request keeps
    /// running in the background and its result is dropped.
    pub async fn scan(
        &self,
        images: Vec<String>,
        cancel: &CancellationToken,
    ) -> Result<Option<Outcome>, ScanError> {
        let producer = Arc::clone(&self.producer);
        let name = producer.name();
        info!(producer = name, images = images.len(), "scan started");

        let request = tokio::spawn(async move { producer.recognize(&images).await });

        let text = tokio::select! {
            _ = cancel.cancelled() => {
                info!(producer = name, "scan abandoned, OCR result will be ignored");
                return Ok(None);
            }
            joined = request => joined
                .map_err(|e| ScanError::Ocr(format!("OCR task failed: {e}")))
                .and_then(|result| result),
        };

        let text = text.inspect_err(|e| warn!(error = %e, "{OCR_FAILURE_NOTICE}"))?;
        Ok(Some(self.session.submit(&text).await))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use async_trait::async_trait;

    use super::*;
    use crate::recovery::ImportSession;

    struct FixedText {
        text: &'static str,
        delay: Duration,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl OcrProducer for FixedText {
        fn name(&self) -> &'static str {
            "fixed"
        }

        async fn recognize(&self, _images: &[String]) -> Result<String, ScanError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(self.delay).await;
            Ok(self.text.to_string())
        }
    }

    struct Offline;

    #[async_trait]
    impl OcrProducer for Offline {
        fn name(&self) -> &'static str {
            "offline"
        }

        async fn recognize(&self, _images: &[String]) -> Result<String, ScanError> {
            Err(ScanError::Ocr("connection refused".into()))
        }
    }

    fn service(producer: Arc<dyn OcrProducer>) -> ScanService {
        ScanService::new(producer, SharedSession::new(ImportSession::new()))
    }

    #[tokio::test]
    async fn test_scan_submits_recognized_text() {
        let producer = Arc::new(FixedText {
            text: "1. e4 e5\n2. Nf3",
            delay: Duration::ZERO,
            calls: AtomicUsize::new(0),
        });
        let service = service(producer.clone());

        let outcome = service
            .scan(vec!["aGk=".into()], &CancellationToken::new())
            .await
            .unwrap();
        let Some(Outcome::Accepted(game)) = outcome else {
            panic!("expected accepted game");
        };
        assert_eq!(game.total_moves, 2);
        assert_eq!(producer.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_ocr_failure_ends_attempt() {
        let service = service(Arc::new(Offline));
        let err = service
            .scan(vec![], &CancellationToken::new())
            .await
            .unwrap_err();
        assert!(matches!(err, ScanError::Ocr(_)));
        assert!(service.session().game().await.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancelled_scan_ignores_result() {
        let service = service(Arc::new(FixedText {
            text: "1. e4 e5",
            delay: Duration::from_secs(5),
            calls: AtomicUsize::new(0),
        }));
        let cancel = CancellationToken::new();
        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(1)).await;
            trigger.cancel();
        });

        let outcome = service.scan(vec![], &cancel).await.unwrap();
        assert!(outcome.is_none());

        tokio::time::sleep(Duration::from_secs(10)).await;
        assert!(service.session().game().await.is_none());
    }
}
