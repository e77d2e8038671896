//! Verification record builder.

use chrono::Utc;

use verifid_core::models::record::VERIFICATION_METHOD;
use verifid_core::models::{
    AgeExtraction, DocumentClassification, DocumentType, VerificationRecord,
};

/// Assemble the terminal artifact of a successful run. Called only when
/// extraction succeeded; copies fields verbatim and stamps the current
/// time. Pure construction, no side effects.
pub fn build_record(
    extraction: &AgeExtraction,
    classification: &DocumentClassification,
) -> VerificationRecord {
    VerificationRecord {
        method: VERIFICATION_METHOD.to_string(),
        birthdate: extraction.birthdate,
        age: extraction.age,
        verified: extraction.success && classification.document_type != DocumentType::Unknown,
        document_type: classification.document_type,
        confidence: classification.confidence,
        created_at: Utc::now(),
    }
}
