//! Deterministic OCR engine for tests and backend-free wiring.

use async_trait::async_trait;

use verifid_core::error::OcrError;
use verifid_core::models::{BoundingBox, RecognitionResult, RecognizedWord};

use super::OcrEngine;

/// Engine that returns a fixed [`RecognitionResult`] regardless of input.
///
/// Useful for pipeline tests (byte-identical input yields byte-identical
/// recognition) and for hosts that want to exercise the pipeline without a
/// real backend.
pub struct StaticOcrEngine {
    result: RecognitionResult,
}

impl StaticOcrEngine {
    pub fn new(result: RecognitionResult) -> Self {
        Self { result }
    }

    /// Build a result from plain text, giving every word the same
    /// confidence and synthetic left-to-right bounding boxes.
    pub fn from_text(text: &str, confidence: f32) -> Self {
        let words = text
            .split_whitespace()
            .enumerate()
            .map(|(i, w)| RecognizedWord {
                text: w.to_string(),
                confidence,
                bounds: BoundingBox {
                    x: (i as u32) * 100,
                    y: 0,
                    width: 90,
                    height: 20,
                },
            })
            .collect();
        Self {
            result: RecognitionResult {
                text: text.to_string(),
                words,
                confidence,
            },
        }
    }
}

#[async_trait]
impl OcrEngine for StaticOcrEngine {
    fn name(&self) -> &'static str {
        "static"
    }

    fn supported_formats(&self) -> Vec<String> {
        vec!["image/jpeg".to_string(), "image/png".to_string()]
    }

    async fn recognize(
        &self,
        _image: &[u8],
        _language: &str,
    ) -> Result<RecognitionResult, OcrError> {
        Ok(self.result.clone())
    }
}
