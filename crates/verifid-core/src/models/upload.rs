//! Uploaded file input.

/// A candidate file as submitted by the caller. Immutable; owned exclusively
/// by one pipeline run and discarded when the run reaches a terminal state.
#[derive(Clone, Debug)]
pub struct UploadedFile {
    pub data: Vec<u8>,
    /// Content type as declared by the caller, lowercased.
    pub content_type: String,
    /// Size as declared by the caller. The gate checks this before any byte
    /// of the payload is read.
    pub declared_size: usize,
    pub original_filename: String,
}

impl UploadedFile {
    pub fn new(
        data: Vec<u8>,
        content_type: impl Into<String>,
        declared_size: usize,
        original_filename: impl Into<String>,
    ) -> Self {
        Self {
            data,
            content_type: content_type.into().to_lowercase(),
            declared_size,
            original_filename: original_filename.into(),
        }
    }
}
