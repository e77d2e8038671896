//! Document classifier - decides whether recognized text is a known
//! identity-document type.
//!
//! Pure function of the recognition result: keyword tables per document
//! type, each match weighted by the confidence of the word it appears in.
//! Thresholds and tables are configuration with documented defaults, not
//! hardcoded magic numbers.

use verifid_core::config::VerifierConfig;
use verifid_core::models::{DocumentClassification, DocumentType, RecognitionResult};

/// Signal phrases for one document type, in priority order of the table
/// list. Keywords containing whitespace or `<` are matched against the full
/// recognized text (weighted by overall confidence); single tokens are
/// matched word-exact against recognized words (weighted by the best
/// matching word's confidence).
#[derive(Clone, Debug)]
pub struct KeywordTable {
    pub document_type: DocumentType,
    /// (keyword, weight) pairs. Scores are normalized against the table's
    /// total weight, so tables of different sizes compare fairly.
    pub keywords: Vec<(String, f32)>,
}

impl KeywordTable {
    fn new(document_type: DocumentType, keywords: &[(&str, f32)]) -> Self {
        Self {
            document_type,
            keywords: keywords
                .iter()
                .map(|(k, w)| (k.to_string(), *w))
                .collect(),
        }
    }

    /// Default signal tables. Weights reflect how unambiguous each marker
    /// is: the strongest marker of a type at high word confidence clears
    /// the default minimum on its own, weaker markers need corroboration.
    /// Table order is the tie-break priority: passports carry the strongest
    /// unambiguous markers.
    pub fn default_tables() -> Vec<KeywordTable> {
        vec![
            KeywordTable::new(
                DocumentType::Passport,
                &[
                    ("PASSPORT", 4.0),
                    ("NATIONALITY", 1.5),
                    ("PLACE OF BIRTH", 1.0),
                    ("P<", 2.0),
                ],
            ),
            KeywordTable::new(
                DocumentType::DriversLicense,
                &[
                    ("DRIVER", 2.5),
                    ("LICENSE", 2.0),
                    ("LICENCE", 2.0),
                    ("CLASS", 0.5),
                    ("ENDORSEMENTS", 0.5),
                    ("RESTRICTIONS", 0.5),
                ],
            ),
            KeywordTable::new(
                DocumentType::NationalId,
                &[
                    ("NATIONAL", 2.0),
                    ("IDENTITY", 2.0),
                    ("ID CARD", 2.5),
                    ("IDENTIFICATION", 2.0),
                ],
            ),
        ]
    }

    fn total_weight(&self) -> f32 {
        self.keywords.iter().map(|(_, w)| w).sum()
    }
}

#[derive(Clone, Debug)]
pub struct ClassifierConfig {
    /// Minimum aggregate confidence (0-100) for a type to be accepted.
    pub min_confidence: f32,
    pub tables: Vec<KeywordTable>,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            min_confidence: 40.0,
            tables: KeywordTable::default_tables(),
        }
    }
}

pub struct DocumentClassifier {
    config: ClassifierConfig,
}

impl DocumentClassifier {
    pub fn new(config: ClassifierConfig) -> Self {
        Self { config }
    }

    pub fn from_config(config: &VerifierConfig) -> Self {
        Self::new(ClassifierConfig {
            min_confidence: config.classify_min_confidence,
            ..ClassifierConfig::default()
        })
    }

    /// Classify a recognition result. No I/O; never fails.
    pub fn classify(&self, result: &RecognitionResult) -> DocumentClassification {
        let text = result.normalized_text();
        let words = normalized_words(result);

        let mut best: Option<(DocumentType, f32)> = None;
        let mut reasons = Vec::new();

        for table in &self.config.tables {
            let mut raw = 0.0f32;
            let mut matched_any = false;

            for (keyword, weight) in &table.keywords {
                let confidence = if keyword.contains(' ') || keyword.contains('<') {
                    if text.contains(keyword.as_str()) {
                        Some(result.confidence)
                    } else {
                        None
                    }
                } else {
                    words
                        .iter()
                        .filter(|(w, _)| w == keyword)
                        .map(|(_, c)| *c)
                        .fold(None, |acc: Option<f32>, c| {
                            Some(acc.map_or(c, |a| a.max(c)))
                        })
                };

                if let Some(confidence) = confidence {
                    matched_any = true;
                    raw += weight * (confidence / 100.0);
                }
            }

            let score = 100.0 * raw / table.total_weight();

            if score >= self.config.min_confidence {
                // Strictly-greater keeps the earlier (higher priority) type
                // on ties.
                if best.map_or(true, |(_, s)| score > s) {
                    best = Some((table.document_type, score));
                }
            } else if matched_any {
                reasons.push(format!(
                    "{} markers too weak: confidence {:.0} below minimum {:.0}",
                    table.document_type, score, self.config.min_confidence
                ));
            } else {
                let searched: Vec<&str> = table
                    .keywords
                    .iter()
                    .map(|(k, _)| k.as_str())
                    .collect();
                reasons.push(format!(
                    "no {} markers found (searched: {})",
                    table.document_type,
                    searched.join(", ")
                ));
            }
        }

        match best {
            Some((document_type, score)) => {
                tracing::debug!(%document_type, confidence = score, "document classified");
                DocumentClassification::valid(document_type, score)
            }
            None => {
                tracing::debug!(?reasons, "document not recognized");
                DocumentClassification::invalid(0.0, reasons)
            }
        }
    }
}

/// Recognized words uppercased and stripped of surrounding punctuation,
/// falling back to whitespace-split text at overall confidence when the
/// backend reports no word boxes.
fn normalized_words(result: &RecognitionResult) -> Vec<(String, f32)> {
    let strip = |s: &str| -> String {
        s.trim_matches(|c: char| !c.is_alphanumeric())
            .to_uppercase()
    };

    if result.words.is_empty() {
        result
            .text
            .split_whitespace()
            .map(|w| (strip(w), result.confidence))
            .collect()
    } else {
        result
            .words
            .iter()
            .map(|w| (strip(&w.text), w.confidence))
            .collect()
    }
}
