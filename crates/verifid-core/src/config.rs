//! Configuration module
//!
//! Environment-driven configuration for the verification pipeline. Every
//! tunable has a named default; the classifier threshold in particular is
//! configuration, not a hardcoded constant.

use std::env;

// Named defaults
const MAX_UPLOAD_SIZE_MB: usize = 10;
const OCR_TIMEOUT_SECS: u64 = 30;
const OCR_LANGUAGE: &str = "eng";
/// Minimum aggregate keyword confidence (0-100) for a document type to be
/// accepted by the classifier.
const CLASSIFY_MIN_CONFIDENCE: f32 = 40.0;

/// Verification pipeline configuration.
#[derive(Clone, Debug)]
pub struct VerifierConfig {
    /// Maximum accepted upload size in bytes.
    pub max_upload_size_bytes: usize,
    /// Content types admitted by the upload gate. PDF is admitted here and
    /// rejected later by the OCR adapter; that split keeps the gate cheap
    /// and the limitation explicit.
    pub allowed_content_types: Vec<String>,
    /// Language hint passed through to the OCR backend.
    pub ocr_language: String,
    /// Upper bound on a single recognition call.
    pub ocr_timeout_secs: u64,
    /// Minimum aggregate keyword confidence (0-100) for classification.
    pub classify_min_confidence: f32,
}

impl Default for VerifierConfig {
    fn default() -> Self {
        Self {
            max_upload_size_bytes: MAX_UPLOAD_SIZE_MB * 1024 * 1024,
            allowed_content_types: vec![
                "image/jpeg".to_string(),
                "image/png".to_string(),
                "application/pdf".to_string(),
            ],
            ocr_language: OCR_LANGUAGE.to_string(),
            ocr_timeout_secs: OCR_TIMEOUT_SECS,
            classify_min_confidence: CLASSIFY_MIN_CONFIDENCE,
        }
    }
}

impl VerifierConfig {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();

        let max_upload_size_mb = env::var("MAX_UPLOAD_SIZE_MB")
            .unwrap_or_else(|_| MAX_UPLOAD_SIZE_MB.to_string())
            .parse::<usize>()
            .unwrap_or(MAX_UPLOAD_SIZE_MB);

        let allowed_content_types = env::var("ALLOWED_CONTENT_TYPES")
            .unwrap_or_else(|_| "image/jpeg,image/png,application/pdf".to_string())
            .split(',')
            .map(|s| s.trim().to_lowercase())
            .filter(|s| !s.is_empty())
            .collect();

        let config = Self {
            max_upload_size_bytes: max_upload_size_mb * 1024 * 1024,
            allowed_content_types,
            ocr_language: env::var("OCR_LANGUAGE").unwrap_or_else(|_| OCR_LANGUAGE.to_string()),
            ocr_timeout_secs: env::var("OCR_TIMEOUT_SECS")
                .unwrap_or_else(|_| OCR_TIMEOUT_SECS.to_string())
                .parse()
                .unwrap_or(OCR_TIMEOUT_SECS),
            classify_min_confidence: env::var("CLASSIFY_MIN_CONFIDENCE")
                .unwrap_or_else(|_| CLASSIFY_MIN_CONFIDENCE.to_string())
                .parse()
                .unwrap_or(CLASSIFY_MIN_CONFIDENCE),
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.max_upload_size_bytes == 0 {
            return Err(anyhow::anyhow!("MAX_UPLOAD_SIZE_MB must be greater than 0"));
        }

        if self.allowed_content_types.is_empty() {
            return Err(anyhow::anyhow!(
                "ALLOWED_CONTENT_TYPES must list at least one content type"
            ));
        }

        if self.ocr_timeout_secs == 0 {
            return Err(anyhow::anyhow!("OCR_TIMEOUT_SECS must be greater than 0"));
        }

        if !(0.0..=100.0).contains(&self.classify_min_confidence) {
            return Err(anyhow::anyhow!(
                "CLASSIFY_MIN_CONFIDENCE must be between 0 and 100"
            ));
        }

        Ok(())
    }
}
