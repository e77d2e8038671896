//! End-to-end pipeline tests with deterministic OCR engines.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{Datelike, Utc};

use verifid_core::config::VerifierConfig;
use verifid_core::error::OcrError;
use verifid_core::models::{
    DocumentType, ExtractionFailure, RecognitionResult, RunEvent, RunPayload, RunState,
    VerificationRecord,
};
use verifid_pipeline::ocr::adapter::EngineFactory;
use verifid_pipeline::{OcrAdapter, OcrEngine, RunHandle, StaticOcrEngine, VerificationService};

const JPEG_BYTES: &[u8] = &[0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10, 0x4A, 0x46, 0x49, 0x46];

const PASSPORT_TEXT: &str =
    "PASSPORT REPUBLIC OF UTOPIA NATIONALITY UTOPIAN DATE OF BIRTH 03 MAR 1985";

fn jpeg_payload(total_len: usize) -> Vec<u8> {
    let mut data = JPEG_BYTES.to_vec();
    data.resize(total_len, 0);
    data
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn service_with_text(text: &str) -> VerificationService {
    init_tracing();
    let config = VerifierConfig::default();
    let adapter = OcrAdapter::with_engine(
        Arc::new(StaticOcrEngine::from_text(text, 90.0)),
        &config,
    );
    VerificationService::new(&config, Arc::new(adapter))
}

fn counting_factory(inits: Arc<AtomicUsize>, text: &'static str) -> EngineFactory {
    Box::new(move || {
        inits.fetch_add(1, Ordering::SeqCst);
        Ok(Arc::new(StaticOcrEngine::from_text(text, 90.0)) as Arc<dyn OcrEngine>)
    })
}

async fn collect_until_terminal(handle: &mut RunHandle) -> Vec<RunEvent> {
    let mut events = Vec::new();
    while let Some(event) = handle.next_event().await {
        let terminal = event.state.is_terminal();
        events.push(event);
        if terminal {
            break;
        }
    }
    events
}

fn states(events: &[RunEvent]) -> Vec<RunState> {
    events.iter().map(|e| e.state).collect()
}

fn record_of(events: &[RunEvent]) -> VerificationRecord {
    match &events.last().expect("no events").payload {
        RunPayload::Record { record } => record.clone(),
        other => panic!("expected record payload, got {:?}", other),
    }
}

async fn terminal_record(handle: &mut RunHandle) -> VerificationRecord {
    match handle.wait_terminal().await.expect("run produced no terminal event").payload {
        RunPayload::Record { record } => record,
        other => panic!("expected record payload, got {:?}", other),
    }
}

#[tokio::test]
async fn unsupported_mime_type_is_rejected_without_ocr() {
    let inits = Arc::new(AtomicUsize::new(0));
    let config = VerifierConfig::default();
    let adapter = OcrAdapter::new(counting_factory(inits.clone(), PASSPORT_TEXT), &config);
    let service = VerificationService::new(&config, Arc::new(adapter));

    let mut handle = service
        .submit(jpeg_payload(1024), "text/plain", 1024, "notes.txt")
        .await;
    let events = collect_until_terminal(&mut handle).await;

    assert_eq!(states(&events), vec![RunState::Validating, RunState::Rejected]);
    match &events.last().unwrap().payload {
        RunPayload::Rejection { reason, .. } => assert!(reason.contains("text/plain")),
        other => panic!("expected rejection payload, got {:?}", other),
    }
    assert_eq!(inits.load(Ordering::SeqCst), 0, "OCR must not be touched");
}

#[tokio::test]
async fn oversized_file_is_rejected_before_ocr() {
    let inits = Arc::new(AtomicUsize::new(0));
    let config = VerifierConfig::default();
    let adapter = OcrAdapter::new(counting_factory(inits.clone(), PASSPORT_TEXT), &config);
    let service = VerificationService::new(&config, Arc::new(adapter));

    let declared = 11 * 1024 * 1024;
    let mut handle = service
        .submit(jpeg_payload(64), "image/jpeg", declared, "huge.jpg")
        .await;
    let events = collect_until_terminal(&mut handle).await;

    assert_eq!(states(&events), vec![RunState::Validating, RunState::Rejected]);
    match &events.last().unwrap().payload {
        RunPayload::Rejection { reason, .. } => assert!(reason.contains("too large")),
        other => panic!("expected rejection payload, got {:?}", other),
    }
    assert_eq!(inits.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn clear_passport_upload_succeeds_end_to_end() {
    let service = service_with_text(PASSPORT_TEXT);
    let mut handle = service
        .submit(jpeg_payload(2 * 1024 * 1024), "image/jpeg", 2 * 1024 * 1024, "passport.jpg")
        .await;
    let events = collect_until_terminal(&mut handle).await;

    assert_eq!(
        states(&events),
        vec![
            RunState::Validating,
            RunState::Analyzing,
            RunState::Classifying,
            RunState::Extracting,
            RunState::Succeeded,
        ]
    );

    let record = record_of(&events);
    assert_eq!(record.document_type, DocumentType::Passport);
    assert!(record.verified);
    assert_eq!(record.birthdate.unwrap().year(), 1985);
    assert!(record.age.unwrap() >= 38);
    assert!(record.is_consistent());

    // The record travels to the registration collaborator as JSON.
    let json = serde_json::to_string(&record).unwrap();
    let back: VerificationRecord = serde_json::from_str(&json).unwrap();
    assert_eq!(back, record);
}

#[tokio::test]
async fn unrecognized_document_is_rejected_with_reasons() {
    let service = service_with_text("GROCERY RECEIPT TOTAL 12.99 THANK YOU");
    let mut handle = service
        .submit(jpeg_payload(1024), "image/jpeg", 1024, "receipt.jpg")
        .await;
    let events = collect_until_terminal(&mut handle).await;

    assert_eq!(events.last().unwrap().state, RunState::Rejected);
    match &events.last().unwrap().payload {
        RunPayload::Rejection { details, .. } => assert!(!details.is_empty()),
        other => panic!("expected rejection payload, got {:?}", other),
    }
}

#[tokio::test]
async fn future_birthdate_falls_back_without_record() {
    let service = service_with_text("PASSPORT NATIONALITY UTOPIAN DOB 01 JAN 2099");
    let mut handle = service
        .submit(jpeg_payload(1024), "image/jpeg", 1024, "passport.jpg")
        .await;
    let events = collect_until_terminal(&mut handle).await;

    assert_eq!(events.last().unwrap().state, RunState::FallbackNoAge);
    match &events.last().unwrap().payload {
        RunPayload::Fallback { failure } => {
            assert_eq!(*failure, ExtractionFailure::FutureDate)
        }
        other => panic!("expected fallback payload, got {:?}", other),
    }
}

#[tokio::test]
async fn missing_birthdate_falls_back_not_fails() {
    let service = service_with_text("PASSPORT NATIONALITY UTOPIAN");
    let mut handle = service
        .submit(jpeg_payload(1024), "image/jpeg", 1024, "passport.jpg")
        .await;
    let events = collect_until_terminal(&mut handle).await;

    assert_eq!(events.last().unwrap().state, RunState::FallbackNoAge);
    match &events.last().unwrap().payload {
        RunPayload::Fallback { failure } => {
            assert_eq!(*failure, ExtractionFailure::NoDateFound)
        }
        other => panic!("expected fallback payload, got {:?}", other),
    }
}

#[tokio::test]
async fn declared_pdf_fails_processing_not_validation() {
    let service = service_with_text(PASSPORT_TEXT);
    let mut handle = service
        .submit(b"%PDF-1.4\n".to_vec(), "application/pdf", 9, "scan.pdf")
        .await;
    let events = collect_until_terminal(&mut handle).await;

    // The gate admits declared PDFs; the OCR adapter rejects them as a
    // documented limitation, which surfaces as a processing failure.
    assert_eq!(
        states(&events),
        vec![RunState::Validating, RunState::Analyzing, RunState::Failed]
    );
    match &events.last().unwrap().payload {
        RunPayload::ProcessingError { message } => assert!(message.contains("PDF")),
        other => panic!("expected processing error payload, got {:?}", other),
    }
}

#[tokio::test]
async fn identical_input_yields_identical_record_except_timestamp() {
    let service = service_with_text(PASSPORT_TEXT);
    let payload = jpeg_payload(1024);

    let mut first = service
        .submit(payload.clone(), "image/jpeg", payload.len(), "passport.jpg")
        .await;
    let record_a = terminal_record(&mut first).await;

    let mut second = service
        .submit(payload.clone(), "image/jpeg", payload.len(), "passport.jpg")
        .await;
    let record_b = terminal_record(&mut second).await;

    assert_eq!(record_a.method, record_b.method);
    assert_eq!(record_a.birthdate, record_b.birthdate);
    assert_eq!(record_a.age, record_b.age);
    assert_eq!(record_a.verified, record_b.verified);
    assert_eq!(record_a.document_type, record_b.document_type);
    assert_eq!(record_a.confidence, record_b.confidence);
    assert!(record_b.created_at >= record_a.created_at);
}

struct SlowEngine {
    inner: StaticOcrEngine,
    delay: Duration,
}

#[async_trait]
impl OcrEngine for SlowEngine {
    fn name(&self) -> &'static str {
        "slow"
    }

    fn supported_formats(&self) -> Vec<String> {
        self.inner.supported_formats()
    }

    async fn recognize(
        &self,
        image: &[u8],
        language: &str,
    ) -> Result<RecognitionResult, OcrError> {
        tokio::time::sleep(self.delay).await;
        self.inner.recognize(image, language).await
    }
}

#[tokio::test]
async fn later_submission_supersedes_in_flight_run() {
    let config = VerifierConfig::default();
    let engine = Arc::new(SlowEngine {
        inner: StaticOcrEngine::from_text(PASSPORT_TEXT, 90.0),
        delay: Duration::from_millis(200),
    });
    let adapter = OcrAdapter::with_engine(engine, &config);
    let service = VerificationService::new(&config, Arc::new(adapter));

    let mut first = service
        .submit(jpeg_payload(1024), "image/jpeg", 1024, "first.jpg")
        .await;
    // Let run A reach its OCR call before superseding it.
    tokio::time::sleep(Duration::from_millis(50)).await;

    let mut second = service
        .submit(jpeg_payload(1024), "image/jpeg", 1024, "second.jpg")
        .await;

    let second_events = collect_until_terminal(&mut second).await;
    assert_eq!(second_events.last().unwrap().state, RunState::Succeeded);

    // Run A's channel closes without ever reaching a terminal state.
    assert!(first.wait_terminal().await.is_none());
}

#[tokio::test]
async fn explicit_cancel_discards_the_run() {
    let config = VerifierConfig::default();
    let engine = Arc::new(SlowEngine {
        inner: StaticOcrEngine::from_text(PASSPORT_TEXT, 90.0),
        delay: Duration::from_millis(200),
    });
    let adapter = OcrAdapter::with_engine(engine, &config);
    let service = VerificationService::new(&config, Arc::new(adapter));

    let mut handle = service
        .submit(jpeg_payload(1024), "image/jpeg", 1024, "cancelled.jpg")
        .await;
    tokio::time::sleep(Duration::from_millis(50)).await;
    service.cancel(&handle).await;

    assert!(handle.wait_terminal().await.is_none());
}

#[tokio::test(start_paused = true)]
async fn backend_stall_reaches_failed_state() {
    struct StallingEngine;

    #[async_trait]
    impl OcrEngine for StallingEngine {
        fn name(&self) -> &'static str {
            "stalling"
        }

        fn supported_formats(&self) -> Vec<String> {
            vec!["image/jpeg".to_string()]
        }

        async fn recognize(
            &self,
            _image: &[u8],
            _language: &str,
        ) -> Result<RecognitionResult, OcrError> {
            tokio::time::sleep(Duration::from_secs(7200)).await;
            unreachable!()
        }
    }

    let config = VerifierConfig::default();
    let adapter = OcrAdapter::with_engine(Arc::new(StallingEngine), &config);
    let service = VerificationService::new(&config, Arc::new(adapter));

    let mut handle = service
        .submit(jpeg_payload(1024), "image/jpeg", 1024, "stall.jpg")
        .await;
    let events = collect_until_terminal(&mut handle).await;
    assert_eq!(events.last().unwrap().state, RunState::Failed);
}

#[tokio::test]
async fn record_timestamp_is_recent() {
    let service = service_with_text(PASSPORT_TEXT);
    let mut handle = service
        .submit(jpeg_payload(1024), "image/jpeg", 1024, "passport.jpg")
        .await;
    let record = record_of(&collect_until_terminal(&mut handle).await);
    let elapsed = Utc::now().signed_duration_since(record.created_at);
    assert!(elapsed.num_seconds() < 60);
}
