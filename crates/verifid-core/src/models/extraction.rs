//! Age extraction output.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};

/// Why age extraction fell back. None of these is a hard error; the caller
/// proceeds with a degraded verification.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ExtractionFailure {
    NoDateFound,
    InvalidDate,
    FutureDate,
}

impl Display for ExtractionFailure {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            ExtractionFailure::NoDateFound => write!(f, "no_date_found"),
            ExtractionFailure::InvalidDate => write!(f, "invalid_date"),
            ExtractionFailure::FutureDate => write!(f, "future_date"),
        }
    }
}

/// Result of attempting to extract a birthdate/age claim from classified
/// document text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgeExtraction {
    pub success: bool,
    pub birthdate: Option<NaiveDate>,
    pub age: Option<u32>,
    /// Which pattern produced the result (e.g. `passport:dd_mon_yyyy`).
    pub extraction_method: String,
    pub failure: Option<ExtractionFailure>,
}

impl AgeExtraction {
    pub fn found(birthdate: NaiveDate, age: u32, extraction_method: impl Into<String>) -> Self {
        Self {
            success: true,
            birthdate: Some(birthdate),
            age: Some(age),
            extraction_method: extraction_method.into(),
            failure: None,
        }
    }

    pub fn failed(failure: ExtractionFailure, extraction_method: impl Into<String>) -> Self {
        Self {
            success: false,
            birthdate: None,
            age: None,
            extraction_method: extraction_method.into(),
            failure: Some(failure),
        }
    }
}
