pub mod extract;
pub mod pipeline;
pub mod preprocess;
pub mod recognizer;
pub mod types;

pub use extract::Extractor;
pub use pipeline::{ScanError, ScanResult, ScanSession, ScanToken, SlipScanner};
pub use preprocess::{prepare_slip, CropRegion, CropSelection, PrepareError};
pub use recognizer::{
    FailingRecognizer, LanguageHint, MockRecognizer, OcrBackend, RecognitionError,
};
pub use types::{CandidateItem, ExtractedReceipt, DEFAULT_ITEM_CATEGORY};
