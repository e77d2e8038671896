//! Verifid Core Library
//!
//! This crate provides the domain models, error taxonomy, configuration, and
//! upload validation shared by the verification pipeline components.

pub mod config;
pub mod error;
pub mod models;
pub mod validation;

// Re-export commonly used types
pub use config::VerifierConfig;
pub use error::{LogLevel, OcrError, PipelineError, UploadError};
pub use validation::UploadGate;
