use std::sync::atomic::{AtomicU64, Ordering};

use thiserror::Error;

use crate::extract::Extractor;
use crate::preprocess::{self, CropSelection, PrepareError};
use crate::recognizer::{LanguageHint, OcrBackend, RecognitionError};
use crate::types::ExtractedReceipt;

#[derive(Debug, Error)]
pub enum ScanError {
    #[error("image preparation failed: {0}")]
    Prepare(#[from] PrepareError),
    #[error("recognition failed: {0}")]
    Recognition(#[from] RecognitionError),
    #[error("scan superseded by a newer request")]
    Superseded,
}

/// The outcome of one slip scan: the raw engine text and the structured
/// fields extracted from it. The caller copies fields into its own form
/// state and may re-run the scan after re-cropping.
#[derive(Debug, Clone)]
pub struct ScanResult {
    pub ocr_text: String,
    pub receipt: ExtractedReceipt,
}

/// Orchestrates: prepare (crop/rescale) → recognize → extract.
pub struct SlipScanner<B: OcrBackend> {
    backend: B,
}

impl<B: OcrBackend> SlipScanner<B> {
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    /// Run the pipeline on raw slip bytes. A degenerate crop falls back to
    /// the full image instead of failing the scan.
    pub async fn scan(
        &self,
        data: &[u8],
        crop: Option<&CropSelection>,
        hint: LanguageHint,
    ) -> Result<ScanResult, ScanError> {
        let prepared = match crop {
            Some(sel) => match preprocess::prepare_slip(data, Some(sel)) {
                Ok(buf) => buf,
                Err(PrepareError::InvalidCrop) => {
                    tracing::warn!("degenerate crop region, falling back to full image");
                    preprocess::prepare_slip(data, None)?
                }
                Err(e) => return Err(e.into()),
            },
            None => preprocess::prepare_slip(data, None)?,
        };

        let ocr_text = self.backend.recognize(&prepared, hint).map_err(|e| {
            tracing::warn!(error = %e, "recognition failed");
            ScanError::from(e)
        })?;
        let receipt = Extractor::extract(&ocr_text);
        Ok(ScanResult { ocr_text, receipt })
    }

    /// Like [`scan`](Self::scan), but tied to a [`ScanSession`] token: when a
    /// newer token was issued while recognition was in flight (the user
    /// re-cropped or picked another image), the stale result is discarded
    /// and `ScanError::Superseded` is returned instead.
    pub async fn scan_current(
        &self,
        session: &ScanSession,
        token: ScanToken,
        data: &[u8],
        crop: Option<&CropSelection>,
        hint: LanguageHint,
    ) -> Result<ScanResult, ScanError> {
        let result = self.scan(data, crop, hint).await?;
        if !session.is_current(token) {
            return Err(ScanError::Superseded);
        }
        Ok(result)
    }
}

// ── Scan sequencing ───────────────────────────────────────────────────────────

/// Monotonic sequence of scan requests for one user surface. Starting a new
/// scan invalidates every token issued before it, which is what makes stale
/// recognition results detectable deterministically.
#[derive(Debug, Default)]
pub struct ScanSession {
    seq: AtomicU64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanToken(u64);

impl ScanSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issue a token for a new scan, superseding all earlier ones.
    pub fn begin(&self) -> ScanToken {
        ScanToken(self.seq.fetch_add(1, Ordering::SeqCst) + 1)
    }

    pub fn is_current(&self, token: ScanToken) -> bool {
        self.seq.load(Ordering::SeqCst) == token.0
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::preprocess::CropRegion;
    use crate::recognizer::{FailingRecognizer, MockRecognizer};
    use image::{DynamicImage, ImageBuffer, Luma};
    use std::io::Cursor;

    fn tiny_png() -> Vec<u8> {
        let img = ImageBuffer::from_fn(8, 8, |_, _| Luma([200u8]));
        let mut buf = Cursor::new(Vec::new());
        DynamicImage::ImageLuma8(img)
            .write_to(&mut buf, image::ImageFormat::Png)
            .unwrap();
        buf.into_inner()
    }

    #[tokio::test]
    async fn scan_produces_extracted_receipt() {
        let scanner = SlipScanner::new(MockRecognizer::new(
            "COFFEE SHOP\nLatte 4.50\nTOTAL $9.00\n01/02/2023",
        ));
        let result = scanner
            .scan(&tiny_png(), None, LanguageHint::default())
            .await
            .unwrap();

        assert_eq!(result.receipt.description.as_deref(), Some("COFFEE SHOP"));
        assert_eq!(result.receipt.amount.as_deref(), Some("9.00"));
        assert!(result.ocr_text.contains("Latte"));
    }

    #[tokio::test]
    async fn degenerate_crop_falls_back_to_full_image() {
        let scanner = SlipScanner::new(MockRecognizer::new("TOTAL 5.00"));
        let crop = CropSelection {
            region: CropRegion { x: 0.0, y: 0.0, width: 0.0, height: 0.0 },
            display_width: 100.0,
            display_height: 100.0,
        };
        let result = scanner
            .scan(&tiny_png(), Some(&crop), LanguageHint::default())
            .await
            .unwrap();
        assert_eq!(result.receipt.amount.as_deref(), Some("5.00"));
    }

    #[tokio::test]
    async fn engine_failure_surfaces_as_recognition_error() {
        let scanner = SlipScanner::new(FailingRecognizer);
        let err = scanner
            .scan(&tiny_png(), None, LanguageHint::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ScanError::Recognition(_)));
    }

    #[tokio::test]
    async fn unreadable_bytes_surface_as_prepare_error() {
        let scanner = SlipScanner::new(MockRecognizer::new("ignored"));
        let err = scanner
            .scan(b"definitely not an image", None, LanguageHint::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ScanError::Prepare(_)));
    }

    #[tokio::test]
    async fn superseded_scan_is_discarded() {
        let scanner = SlipScanner::new(MockRecognizer::new("TOTAL 5.00"));
        let session = ScanSession::new();

        let stale = session.begin();
        let current = session.begin();

        let err = scanner
            .scan_current(&session, stale, &tiny_png(), None, LanguageHint::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ScanError::Superseded));

        let ok = scanner
            .scan_current(&session, current, &tiny_png(), None, LanguageHint::default())
            .await
            .unwrap();
        assert_eq!(ok.receipt.amount.as_deref(), Some("5.00"));
    }

    #[test]
    fn tokens_are_monotonic() {
        let session = ScanSession::new();
        let t1 = session.begin();
        assert!(session.is_current(t1));
        let t2 = session.begin();
        assert!(!session.is_current(t1));
        assert!(session.is_current(t2));
    }
}
