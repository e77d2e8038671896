//! OCR engine contract and adapter.
//!
//! The pipeline is backend-agnostic: any text-recognition engine that can
//! turn image bytes into words with confidence scores plugs in behind
//! [`OcrEngine`]. The [`OcrAdapter`] owns lazy initialization, format
//! sniffing, and the recognition timeout.

pub mod adapter;
pub mod stub;

pub use adapter::OcrAdapter;
pub use stub::StaticOcrEngine;

use async_trait::async_trait;

use verifid_core::error::OcrError;
use verifid_core::models::RecognitionResult;

/// Contract any OCR backend must satisfy.
///
/// Implementations declare their own thread-safety; the adapter holds the
/// engine behind an `Arc` and calls may run concurrently.
#[async_trait]
pub trait OcrEngine: Send + Sync {
    /// Engine identifier for logging (e.g. "tesseract").
    fn name(&self) -> &'static str;

    /// Content types the backend accepts. The adapter rejects sniffed
    /// payload formats outside this set before calling `recognize`.
    fn supported_formats(&self) -> Vec<String>;

    /// Recognize text in raw image bytes. Confidence values are
    /// engine-reported percentages and must be passed through unmodified.
    async fn recognize(&self, image: &[u8], language: &str)
        -> Result<RecognitionResult, OcrError>;
}
