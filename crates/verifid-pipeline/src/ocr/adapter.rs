//! OCR adapter: format sniffing, single-flight engine init, timeouts.

use std::sync::Arc;
use std::time::Duration;

use image::ImageFormat;
use tokio::sync::Mutex;

use verifid_core::config::VerifierConfig;
use verifid_core::error::OcrError;
use verifid_core::models::{RecognitionResult, UploadedFile};

use super::OcrEngine;

/// Constructs the backend engine. Engine startup cost is non-trivial, so
/// the factory is called lazily and at most twice per process lifetime.
pub type EngineFactory = Box<dyn Fn() -> Result<Arc<dyn OcrEngine>, OcrError> + Send + Sync>;

/// Initial attempt plus one retry; after that the adapter stays unavailable.
const MAX_INIT_ATTEMPTS: u32 = 2;

enum EngineSlot {
    Uninitialized { attempts: u32 },
    Ready(Arc<dyn OcrEngine>),
    Unavailable,
}

/// Wraps a pluggable recognition backend.
///
/// The engine slot is the one shared, stateful resource across pipeline
/// runs: initialization is single-flight (the mutex is held for the whole
/// factory call, so concurrent first callers wait and reuse the result),
/// and the handle is reused until process teardown.
pub struct OcrAdapter {
    slot: Mutex<EngineSlot>,
    factory: EngineFactory,
    language: String,
    timeout: Duration,
}

impl OcrAdapter {
    pub fn new(factory: EngineFactory, config: &VerifierConfig) -> Self {
        Self {
            slot: Mutex::new(EngineSlot::Uninitialized { attempts: 0 }),
            factory,
            language: config.ocr_language.clone(),
            timeout: Duration::from_secs(config.ocr_timeout_secs),
        }
    }

    /// Adapter over an already-constructed engine. Used for wiring
    /// deterministic engines in tests and host applications that manage
    /// engine lifetime themselves.
    pub fn with_engine(engine: Arc<dyn OcrEngine>, config: &VerifierConfig) -> Self {
        Self {
            slot: Mutex::new(EngineSlot::Ready(engine)),
            factory: Box::new(|| Err(OcrError::Unavailable)),
            language: config.ocr_language.clone(),
            timeout: Duration::from_secs(config.ocr_timeout_secs),
        }
    }

    /// Recognize text in an uploaded file.
    ///
    /// Fails fast on unsupported payload formats before any engine work:
    /// PDF conversion is a known limitation of this pipeline, not a silent
    /// degradation.
    pub async fn recognize(&self, file: &UploadedFile) -> Result<RecognitionResult, OcrError> {
        let format = sniff_format(&file.data)?;

        let engine = self.engine().await?;
        if !engine.supported_formats().iter().any(|f| f == format) {
            return Err(OcrError::UnsupportedFormat(format!(
                "{} engine does not accept {}",
                engine.name(),
                format
            )));
        }

        match tokio::time::timeout(self.timeout, engine.recognize(&file.data, &self.language))
            .await
        {
            Ok(result) => result,
            Err(_) => {
                tracing::error!(
                    engine = engine.name(),
                    timeout_secs = self.timeout.as_secs(),
                    "OCR recognition timed out"
                );
                Err(OcrError::Engine(format!(
                    "recognition timed out after {}s",
                    self.timeout.as_secs()
                )))
            }
        }
    }

    async fn engine(&self) -> Result<Arc<dyn OcrEngine>, OcrError> {
        let mut slot = self.slot.lock().await;
        match &*slot {
            EngineSlot::Ready(engine) => Ok(engine.clone()),
            EngineSlot::Unavailable => Err(OcrError::Unavailable),
            EngineSlot::Uninitialized { attempts } => {
                let attempt = attempts + 1;
                match (self.factory)() {
                    Ok(engine) => {
                        tracing::info!(engine = engine.name(), attempt, "OCR engine initialized");
                        *slot = EngineSlot::Ready(engine.clone());
                        Ok(engine)
                    }
                    Err(e) => {
                        if attempt >= MAX_INIT_ATTEMPTS {
                            tracing::error!(
                                error = %e,
                                attempt,
                                "OCR engine initialization failed, marking unavailable"
                            );
                            *slot = EngineSlot::Unavailable;
                        } else {
                            tracing::warn!(
                                error = %e,
                                attempt,
                                "OCR engine initialization failed, one retry remaining"
                            );
                            *slot = EngineSlot::Uninitialized { attempts: attempt };
                        }
                        Err(OcrError::Unavailable)
                    }
                }
            }
        }
    }
}

/// Check payload magic bytes against the formats the pipeline can feed to a
/// backend, returning the sniffed content type. Declared content types are
/// checked earlier by the upload gate; this guards against payloads that do
/// not match their declaration.
fn sniff_format(data: &[u8]) -> Result<&'static str, OcrError> {
    if data.starts_with(b"%PDF") {
        return Err(OcrError::UnsupportedFormat(
            "PDF input is not supported; upload a JPEG or PNG image of the document".to_string(),
        ));
    }

    match image::guess_format(data) {
        Ok(ImageFormat::Jpeg) => Ok("image/jpeg"),
        Ok(ImageFormat::Png) => Ok("image/png"),
        Ok(other) => Err(OcrError::UnsupportedFormat(format!(
            "unsupported image format: {:?}",
            other
        ))),
        Err(_) => Err(OcrError::UnsupportedFormat(
            "unrecognized image data".to_string(),
        )),
    }
}
