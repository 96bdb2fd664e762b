use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RecognitionError {
    #[error("image decode error: {0}")]
    ImageDecode(String),
    #[error("OCR engine error: {0}")]
    Engine(String),
    #[error("Tesseract not available — build with `tesseract` feature")]
    NotAvailable,
}

/// Which language pack(s) the engine should load for a slip. Thai slips often
/// mix scripts, so the combined hint is the usual default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LanguageHint {
    English,
    Thai,
    EnglishThai,
}

impl LanguageHint {
    /// The identifier the external engine expects.
    pub fn engine_code(self) -> &'static str {
        match self {
            LanguageHint::English => "eng",
            LanguageHint::Thai => "tha",
            LanguageHint::EnglishThai => "eng+tha",
        }
    }
}

impl Default for LanguageHint {
    fn default() -> Self {
        LanguageHint::EnglishThai
    }
}

impl std::str::FromStr for LanguageHint {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "eng" | "english" => Ok(LanguageHint::English),
            "tha" | "thai" => Ok(LanguageHint::Thai),
            "eng+tha" | "english-thai" => Ok(LanguageHint::EnglishThai),
            other => Err(format!("unknown language hint: '{other}'")),
        }
    }
}

/// Abstraction over an OCR backend. Implementations accept prepared JPEG/PNG
/// bytes plus a language hint and return the recognized multi-line text.
/// A call may take seconds; callers treat it as one suspending unit of work.
pub trait OcrBackend: Send + Sync {
    fn recognize(&self, image_bytes: &[u8], hint: LanguageHint) -> Result<String, RecognitionError>;
}

// ── Mock backends (always available, used for tests) ──────────────────────────

/// Returns a pre-set string — lets the extraction pipeline be exercised
/// without Tesseract installed.
pub struct MockRecognizer {
    pub text: String,
}

impl MockRecognizer {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

impl OcrBackend for MockRecognizer {
    fn recognize(&self, _image_bytes: &[u8], _hint: LanguageHint) -> Result<String, RecognitionError> {
        Ok(self.text.clone())
    }
}

/// Always fails — for exercising the manual-entry fallback path.
pub struct FailingRecognizer;

impl OcrBackend for FailingRecognizer {
    fn recognize(&self, _image_bytes: &[u8], _hint: LanguageHint) -> Result<String, RecognitionError> {
        Err(RecognitionError::Engine("simulated engine failure".into()))
    }
}

// ── Tesseract backend (optional, gated behind `tesseract` feature) ─────────────

#[cfg(feature = "tesseract")]
pub mod tesseract_backend {
    use super::{LanguageHint, OcrBackend, RecognitionError};
    use leptess::LepTess;

    pub struct TesseractRecognizer {
        data_path: Option<String>,
    }

    impl TesseractRecognizer {
        pub fn new(data_path: Option<String>) -> Self {
            Self { data_path }
        }
    }

    impl OcrBackend for TesseractRecognizer {
        fn recognize(
            &self,
            image_bytes: &[u8],
            hint: LanguageHint,
        ) -> Result<String, RecognitionError> {
            let mut lt = LepTess::new(self.data_path.as_deref(), hint.engine_code())
                .map_err(|e| RecognitionError::Engine(e.to_string()))?;
            lt.set_image_from_mem(image_bytes)
                .map_err(|e| RecognitionError::ImageDecode(e.to_string()))?;
            lt.get_utf8_text()
                .map_err(|e| RecognitionError::Engine(e.to_string()))
        }
    }
}
