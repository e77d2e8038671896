//! Document classification output.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum DocumentType {
    Passport,
    DriversLicense,
    NationalId,
    Unknown,
}

impl Display for DocumentType {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            DocumentType::Passport => write!(f, "passport"),
            DocumentType::DriversLicense => write!(f, "drivers_license"),
            DocumentType::NationalId => write!(f, "national_id"),
            DocumentType::Unknown => write!(f, "unknown"),
        }
    }
}

impl FromStr for DocumentType {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "passport" => Ok(DocumentType::Passport),
            "drivers_license" => Ok(DocumentType::DriversLicense),
            "national_id" => Ok(DocumentType::NationalId),
            "unknown" => Ok(DocumentType::Unknown),
            _ => Err(anyhow::anyhow!("Invalid document type: {}", s)),
        }
    }
}

/// Decision of whether recognized text represents a known identity-document
/// type. Derived purely from a [`RecognitionResult`](super::RecognitionResult)
/// and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentClassification {
    pub is_valid: bool,
    pub document_type: DocumentType,
    /// Aggregate keyword confidence in [0, 100] for the winning type.
    pub confidence: f32,
    /// When `is_valid` is false, the signals that were searched and not
    /// found, for user-facing remediation messages.
    pub reasons: Vec<String>,
}

impl DocumentClassification {
    pub fn valid(document_type: DocumentType, confidence: f32) -> Self {
        Self {
            is_valid: true,
            document_type,
            confidence,
            reasons: Vec::new(),
        }
    }

    pub fn invalid(confidence: f32, reasons: Vec<String>) -> Self {
        debug_assert!(!reasons.is_empty(), "invalid classification needs reasons");
        Self {
            is_valid: false,
            document_type: DocumentType::Unknown,
            confidence,
            reasons,
        }
    }
}
