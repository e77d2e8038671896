//! Upload gate - size/type policy enforced before any expensive work.

use crate::config::VerifierConfig;
use crate::error::UploadError;
use crate::models::UploadedFile;

/// Admission control for uploaded files.
///
/// Checks run in order and short-circuit on the first failure: content type
/// against the configured allow-list, then declared size against the
/// configured maximum. The gate has no side effects and never reads the
/// payload bytes.
pub struct UploadGate {
    max_size_bytes: usize,
    allowed_content_types: Vec<String>,
}

impl UploadGate {
    pub fn new(max_size_bytes: usize, allowed_content_types: Vec<String>) -> Self {
        Self {
            max_size_bytes,
            allowed_content_types: allowed_content_types
                .into_iter()
                .map(|ct| ct.to_lowercase())
                .collect(),
        }
    }

    pub fn from_config(config: &VerifierConfig) -> Self {
        Self::new(
            config.max_upload_size_bytes,
            config.allowed_content_types.clone(),
        )
    }

    pub fn admit(&self, file: &UploadedFile) -> Result<(), UploadError> {
        let content_type = file.content_type.to_lowercase();
        if !self.allowed_content_types.iter().any(|ct| *ct == content_type) {
            tracing::debug!(
                filename = %file.original_filename,
                content_type = %file.content_type,
                "upload rejected: content type not in allow-list"
            );
            return Err(UploadError::UnsupportedType(file.content_type.clone()));
        }

        if file.declared_size > self.max_size_bytes {
            tracing::debug!(
                filename = %file.original_filename,
                declared_size = file.declared_size,
                max = self.max_size_bytes,
                "upload rejected: declared size over limit"
            );
            return Err(UploadError::TooLarge {
                size: file.declared_size,
                max: self.max_size_bytes,
            });
        }

        Ok(())
    }
}
