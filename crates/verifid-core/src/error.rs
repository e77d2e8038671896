//! Error types module
//!
//! Every pipeline stage returns a structured outcome; the enums here cover
//! the two failure families that terminate a run: input rejection at the
//! upload gate and processing failure in the OCR stage. Classification
//! rejections and extraction fallbacks are not errors and are carried in
//! their result types instead.

/// Log level for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Debug level - for expected, user-correctable rejections
    Debug,
    /// Warning level - for degraded outcomes
    Warn,
    /// Error level - for system-side failures
    Error,
}

/// Rejection at the upload gate. User-correctable; surfaced verbatim.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UploadError {
    #[error("Unsupported file type: {0}")]
    UnsupportedType(String),

    #[error("File too large: {size} bytes (max: {max} bytes)")]
    TooLarge { size: usize, max: usize },
}

/// Failure in the OCR stage. System-side; not user-correctable.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum OcrError {
    /// Engine initialization failed permanently; recognition is off for the
    /// remainder of the process lifetime.
    #[error("OCR engine unavailable")]
    Unavailable,

    #[error("Unsupported input format: {0}")]
    UnsupportedFormat(String),

    #[error("OCR engine error: {0}")]
    Engine(String),
}

/// A run-terminating stage failure, as seen by the orchestrator.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PipelineError {
    #[error(transparent)]
    Upload(#[from] UploadError),

    #[error(transparent)]
    Ocr(#[from] OcrError),
}

impl PipelineError {
    /// Whether resubmitting a corrected file can resolve this failure.
    pub fn is_user_correctable(&self) -> bool {
        matches!(self, PipelineError::Upload(_))
    }

    /// Client-facing message (may differ from internal error message)
    pub fn client_message(&self) -> String {
        match self {
            PipelineError::Upload(e) => e.to_string(),
            PipelineError::Ocr(OcrError::UnsupportedFormat(ref msg)) => msg.clone(),
            PipelineError::Ocr(_) => {
                "Document processing is temporarily unavailable, try again later".to_string()
            }
        }
    }

    /// Log level for this error
    pub fn log_level(&self) -> LogLevel {
        match self {
            PipelineError::Upload(_) => LogLevel::Debug,
            PipelineError::Ocr(OcrError::UnsupportedFormat(_)) => LogLevel::Warn,
            PipelineError::Ocr(_) => LogLevel::Error,
        }
    }
}
