//! Pipeline orchestrator - drives one run through the state machine.
//!
//! The orchestrator is the single place that translates stage outcomes into
//! state transitions. Every code path reaches a terminal state; stage
//! failures never escape as panics or errors. Cancellation is checked
//! before each stage transition, and the OCR call itself races the token so
//! a superseded run never blocks on a stalled backend.

use std::sync::Arc;

use tokio::sync::mpsc::UnboundedSender;
use tokio_util::sync::CancellationToken;

use verifid_core::config::VerifierConfig;
use verifid_core::error::PipelineError;
use verifid_core::models::{RunEvent, RunState, UploadedFile};
use verifid_core::validation::UploadGate;

use crate::classify::DocumentClassifier;
use crate::extract::AgeExtractor;
use crate::ocr::OcrAdapter;
use crate::record::build_record;

/// Drives Upload Gate -> OCR -> Classifier -> Age Extractor -> Record
/// Builder for one submission. Stage execution is strictly sequential; the
/// shared OCR adapter is the only cross-run state.
pub struct Orchestrator {
    gate: UploadGate,
    ocr: Arc<OcrAdapter>,
    classifier: DocumentClassifier,
    extractor: AgeExtractor,
}

impl Orchestrator {
    pub fn new(config: &VerifierConfig, ocr: Arc<OcrAdapter>) -> Self {
        Self {
            gate: UploadGate::from_config(config),
            ocr,
            classifier: DocumentClassifier::from_config(config),
            extractor: AgeExtractor::new(),
        }
    }

    /// Run the full pipeline for one file, emitting a [`RunEvent`] per
    /// transition. Returns the state the run stopped in; when the run is
    /// superseded (token cancelled) the return value is the last
    /// non-terminal state and no further events are emitted.
    pub async fn run(
        &self,
        file: UploadedFile,
        events: UnboundedSender<RunEvent>,
        cancel: CancellationToken,
    ) -> RunState {
        // Validating
        if cancel.is_cancelled() {
            return RunState::Idle;
        }
        let _ = events.send(RunEvent::entered(RunState::Validating));

        if let Err(e) = self.gate.admit(&file) {
            let err = PipelineError::from(e);
            tracing::debug!(filename = %file.original_filename, error = %err, "upload rejected");
            let _ = events.send(RunEvent::rejected(err.client_message(), Vec::new()));
            return RunState::Rejected;
        }

        // Analyzing
        if cancel.is_cancelled() {
            return RunState::Validating;
        }
        let _ = events.send(RunEvent::entered(RunState::Analyzing));

        let recognition = tokio::select! {
            _ = cancel.cancelled() => return RunState::Analyzing,
            result = self.ocr.recognize(&file) => result,
        };

        let recognition = match recognition {
            Ok(recognition) => recognition,
            Err(e) => {
                let err = PipelineError::from(e);
                tracing::error!(filename = %file.original_filename, error = %err, "OCR stage failed");
                let _ = events.send(RunEvent::failed(err.client_message()));
                return RunState::Failed;
            }
        };

        // Classifying
        if cancel.is_cancelled() {
            return RunState::Analyzing;
        }
        let _ = events.send(RunEvent::entered(RunState::Classifying));

        let classification = self.classifier.classify(&recognition);
        if !classification.is_valid {
            tracing::debug!(reasons = ?classification.reasons, "document not recognized");
            let _ = events.send(RunEvent::rejected(
                "not a recognized identity document",
                classification.reasons.clone(),
            ));
            return RunState::Rejected;
        }

        // Extracting
        if cancel.is_cancelled() {
            return RunState::Classifying;
        }
        let _ = events.send(RunEvent::entered(RunState::Extracting));

        let extraction = self.extractor.extract(&recognition, &classification);
        if !extraction.success {
            // Not an error: the caller proceeds with a degraded verification.
            let failure = extraction
                .failure
                .unwrap_or(verifid_core::models::ExtractionFailure::NoDateFound);
            tracing::warn!(
                document_type = %classification.document_type,
                %failure,
                "age extraction fell back"
            );
            let _ = events.send(RunEvent::fallback(failure));
            return RunState::FallbackNoAge;
        }

        let record = build_record(&extraction, &classification);
        tracing::info!(
            document_type = %record.document_type,
            age = record.age,
            "verification record built"
        );
        let _ = events.send(RunEvent::succeeded(record));
        RunState::Succeeded
    }
}
