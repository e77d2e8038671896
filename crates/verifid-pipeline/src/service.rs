//! Verification service - the inbound interface of the pipeline.
//!
//! `submit` starts a fresh run per uploaded file and returns a handle the
//! caller consumes events from. Submissions supersede each other
//! (last-submission-wins): submitting while a run is in flight cancels the
//! previous run's token, and its remaining results are discarded.

use std::sync::Arc;

use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use verifid_core::config::VerifierConfig;
use verifid_core::models::{RunEvent, RunState, UploadedFile};

use crate::ocr::OcrAdapter;
use crate::pipeline::Orchestrator;

/// Caller-side handle for one pipeline run.
pub struct RunHandle {
    pub run_id: Uuid,
    events: mpsc::UnboundedReceiver<RunEvent>,
    cancel: CancellationToken,
}

impl RunHandle {
    /// Next state-transition event, or `None` once the run has finished
    /// (or was superseded) and all events were consumed.
    pub async fn next_event(&mut self) -> Option<RunEvent> {
        self.events.recv().await
    }

    /// Best-effort cancellation of this run.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Drain events until a terminal state or the channel closes.
    pub async fn wait_terminal(&mut self) -> Option<RunEvent> {
        while let Some(event) = self.events.recv().await {
            if event.state.is_terminal() {
                return Some(event);
            }
        }
        None
    }
}

struct ActiveRun {
    run_id: Uuid,
    cancel: CancellationToken,
    task: JoinHandle<RunState>,
}

/// Entry point for pipeline runs. Holds the shared OCR adapter (via the
/// orchestrator) and the currently in-flight run.
pub struct VerificationService {
    orchestrator: Arc<Orchestrator>,
    current: Mutex<Option<ActiveRun>>,
}

impl VerificationService {
    pub fn new(config: &VerifierConfig, ocr: Arc<OcrAdapter>) -> Self {
        Self {
            orchestrator: Arc::new(Orchestrator::new(config, ocr)),
            current: Mutex::new(None),
        }
    }

    /// Begin a pipeline run for an uploaded file. Any in-flight run is
    /// cancelled first; only the new run's terminal state will be
    /// observable.
    pub async fn submit(
        &self,
        data: Vec<u8>,
        content_type: impl Into<String>,
        declared_size: usize,
        filename: impl Into<String>,
    ) -> RunHandle {
        let file = UploadedFile::new(data, content_type, declared_size, filename);
        let run_id = Uuid::new_v4();
        let cancel = CancellationToken::new();
        let (tx, rx) = mpsc::unbounded_channel();

        let mut current = self.current.lock().await;
        if let Some(previous) = current.take() {
            if !previous.task.is_finished() {
                tracing::debug!(
                    superseded = %previous.run_id,
                    by = %run_id,
                    "cancelling in-flight run"
                );
            }
            previous.cancel.cancel();
        }

        let orchestrator = self.orchestrator.clone();
        let run_cancel = cancel.clone();
        let task = tokio::spawn(async move { orchestrator.run(file, tx, run_cancel).await });

        *current = Some(ActiveRun {
            run_id,
            cancel: cancel.clone(),
            task,
        });

        tracing::debug!(%run_id, "pipeline run started");
        RunHandle {
            run_id,
            events: rx,
            cancel,
        }
    }

    /// Best-effort cancellation by handle. Equivalent to
    /// [`RunHandle::cancel`]; also clears the service's in-flight slot when
    /// the handle refers to the current run.
    pub async fn cancel(&self, handle: &RunHandle) {
        handle.cancel();
        let mut current = self.current.lock().await;
        if current.as_ref().is_some_and(|run| run.run_id == handle.run_id) {
            *current = None;
        }
    }
}
