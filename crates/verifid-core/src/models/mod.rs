pub mod classification;
pub mod extraction;
pub mod recognition;
pub mod record;
pub mod run;
pub mod upload;

pub use classification::{DocumentClassification, DocumentType};
pub use extraction::{AgeExtraction, ExtractionFailure};
pub use recognition::{BoundingBox, RecognitionResult, RecognizedWord};
pub use record::VerificationRecord;
pub use run::{RunEvent, RunPayload, RunState};
pub use upload::UploadedFile;
