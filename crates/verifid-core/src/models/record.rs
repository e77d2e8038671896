//! Verification record - the terminal artifact of a successful run.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::classification::DocumentType;

/// Verification method tag carried on every record produced by this
/// pipeline.
pub const VERIFICATION_METHOD: &str = "id_upload";

/// Structured, timestamped verification result. Created exactly once per
/// successful run, owned by the caller afterwards, and treated as
/// append-only evidence - never mutated.
///
/// Invariant: `verified == true` implies `birthdate` and `age` are present
/// and `document_type != Unknown`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerificationRecord {
    pub method: String,
    pub birthdate: Option<NaiveDate>,
    pub age: Option<u32>,
    pub verified: bool,
    pub document_type: DocumentType,
    /// Classification confidence in [0, 100].
    pub confidence: f32,
    pub created_at: DateTime<Utc>,
}

impl VerificationRecord {
    /// Whether the record satisfies its own verified-implies-complete
    /// invariant.
    pub fn is_consistent(&self) -> bool {
        !self.verified
            || (self.birthdate.is_some()
                && self.age.is_some()
                && self.document_type != DocumentType::Unknown)
    }
}
