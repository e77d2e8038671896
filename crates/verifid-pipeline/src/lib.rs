//! Verifid Pipeline
//!
//! Document-based age/identity verification: OCR adapter, document
//! classifier, age extractor, record builder, and the orchestrator that
//! drives them through the run state machine.

pub mod classify;
pub mod extract;
pub mod ocr;
pub mod pipeline;
pub mod record;
pub mod service;

pub use classify::{ClassifierConfig, DocumentClassifier, KeywordTable};
pub use extract::AgeExtractor;
pub use ocr::{OcrAdapter, OcrEngine, StaticOcrEngine};
pub use pipeline::Orchestrator;
pub use record::build_record;
pub use service::{RunHandle, VerificationService};
