//! OCR recognition output.

use serde::{Deserialize, Serialize};

/// Pixel-space bounding region of a recognized word.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// A single recognized word with its engine-reported confidence.
///
/// Confidence is a percentage in [0, 100] and is passed through from the
/// backend unmodified.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RecognizedWord {
    pub text: String,
    pub confidence: f32,
    pub bounds: BoundingBox,
}

/// Output of one OCR pass over an uploaded image. Produced once per run and
/// consumed read-only by the classifier and the age extractor.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RecognitionResult {
    /// Full recognized text in reading order.
    pub text: String,
    pub words: Vec<RecognizedWord>,
    /// Engine-reported overall confidence in [0, 100].
    pub confidence: f32,
}

impl RecognitionResult {
    /// Recognized text uppercased, the form keyword and date matching use.
    pub fn normalized_text(&self) -> String {
        self.text.to_uppercase()
    }
}
