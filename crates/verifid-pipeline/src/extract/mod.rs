//! Age extractor - locates a birthdate token in classified document text
//! and derives age.
//!
//! Patterns are tried in a document-type-specific order, and a match in the
//! window after a birth label (DOB, DATE OF BIRTH, BIRTH) wins over a bare
//! token elsewhere in the text. Candidate dates must be real calendar dates
//! strictly in the past.

use chrono::{Datelike, NaiveDate, Utc};
use regex::Regex;

use verifid_core::models::{
    AgeExtraction, DocumentClassification, DocumentType, ExtractionFailure, RecognitionResult,
};

/// Characters of text after a birth label within which a date token is
/// considered labeled.
const LABEL_WINDOW: usize = 24;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum DatePattern {
    /// `15 JUN 1990` (month names may be spelled out).
    DdMonYyyy,
    /// `1990-06-15`
    Iso,
    /// `06/15/1990` or `15/06/1990`, interpreted per document type.
    Slash,
    /// `15.06.1990`
    Dotted,
    /// MRZ-style `YYMMDD` followed by a check digit and sex marker.
    MrzYymmdd,
}

impl DatePattern {
    fn method(&self) -> &'static str {
        match self {
            DatePattern::DdMonYyyy => "dd_mon_yyyy",
            DatePattern::Iso => "iso_8601",
            DatePattern::Slash => "slash",
            DatePattern::Dotted => "dmy_dotted",
            DatePattern::MrzYymmdd => "mrz_yymmdd",
        }
    }
}

/// Search order per document type.
fn patterns_for(document_type: DocumentType) -> &'static [DatePattern] {
    match document_type {
        DocumentType::Passport => &[
            DatePattern::DdMonYyyy,
            DatePattern::MrzYymmdd,
            DatePattern::Iso,
        ],
        DocumentType::DriversLicense => &[
            DatePattern::Slash,
            DatePattern::DdMonYyyy,
            DatePattern::Iso,
        ],
        DocumentType::NationalId => &[
            DatePattern::Iso,
            DatePattern::Dotted,
            DatePattern::Slash,
        ],
        // The extractor is only invoked on valid classifications, which
        // never carry Unknown; fall back to the widest net anyway.
        DocumentType::Unknown => &[
            DatePattern::DdMonYyyy,
            DatePattern::Iso,
            DatePattern::Slash,
            DatePattern::Dotted,
        ],
    }
}

/// Raw year/month/day parts plus the method that produced them, before
/// calendar validation.
struct Candidate {
    year: i32,
    month: u32,
    day: u32,
    method: String,
}

pub struct AgeExtractor {
    label_re: Regex,
    dd_mon_yyyy_re: Regex,
    iso_re: Regex,
    slash_re: Regex,
    dotted_re: Regex,
    mrz_re: Regex,
}

impl Default for AgeExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl AgeExtractor {
    pub fn new() -> Self {
        // The patterns are fixed; compiling them cannot fail.
        Self {
            label_re: Regex::new(r"DATE OF BIRTH|DOB|BIRTH").expect("label regex"),
            dd_mon_yyyy_re: Regex::new(
                r"\b(\d{1,2})\s+(JAN|FEB|MAR|APR|MAY|JUN|JUL|AUG|SEP|OCT|NOV|DEC)[A-Z]*\s+(\d{4})\b",
            )
            .expect("dd mon yyyy regex"),
            iso_re: Regex::new(r"\b(\d{4})-(\d{2})-(\d{2})\b").expect("iso regex"),
            slash_re: Regex::new(r"\b(\d{1,2})/(\d{1,2})/(\d{4})\b").expect("slash regex"),
            dotted_re: Regex::new(r"\b(\d{1,2})\.(\d{1,2})\.(\d{4})\b").expect("dotted regex"),
            mrz_re: Regex::new(r"(\d{2})(\d{2})(\d{2})\d[MF<]").expect("mrz regex"),
        }
    }

    /// Extract a birthdate/age claim. Only invoked on valid
    /// classifications; never panics on malformed input.
    pub fn extract(
        &self,
        result: &RecognitionResult,
        classification: &DocumentClassification,
    ) -> AgeExtraction {
        self.extract_at(result, classification, Utc::now().date_naive())
    }

    /// Extraction with an explicit "today", so age arithmetic is testable.
    pub fn extract_at(
        &self,
        result: &RecognitionResult,
        classification: &DocumentClassification,
        today: NaiveDate,
    ) -> AgeExtraction {
        let text = result.normalized_text();
        let patterns = patterns_for(classification.document_type);

        let candidate = match self.find_candidate(&text, patterns, classification.document_type, today) {
            Some(candidate) => candidate,
            None => {
                tracing::debug!(
                    document_type = %classification.document_type,
                    "no date token found in recognized text"
                );
                return AgeExtraction::failed(ExtractionFailure::NoDateFound, "none");
            }
        };

        let birthdate = match NaiveDate::from_ymd_opt(candidate.year, candidate.month, candidate.day)
        {
            Some(date) => date,
            None => {
                return AgeExtraction::failed(ExtractionFailure::InvalidDate, candidate.method)
            }
        };

        if birthdate >= today {
            return AgeExtraction::failed(ExtractionFailure::FutureDate, candidate.method);
        }

        AgeExtraction::found(birthdate, age_in_years(birthdate, today), candidate.method)
    }

    /// Two passes over the pattern order: label-anchored matches first,
    /// then bare tokens anywhere in the text.
    fn find_candidate(
        &self,
        text: &str,
        patterns: &[DatePattern],
        document_type: DocumentType,
        today: NaiveDate,
    ) -> Option<Candidate> {
        for pattern in patterns {
            for label in self.label_re.find_iter(text) {
                let start = label.end();
                let mut end = (start + LABEL_WINDOW).min(text.len());
                while !text.is_char_boundary(end) {
                    end -= 1;
                }
                if let Some(c) = self.match_pattern(*pattern, &text[start..end], document_type, today)
                {
                    return Some(Candidate {
                        method: format!("{}:labeled_{}", document_type, pattern.method()),
                        ..c
                    });
                }
            }
        }

        for pattern in patterns {
            if let Some(c) = self.match_pattern(*pattern, text, document_type, today) {
                return Some(Candidate {
                    method: format!("{}:{}", document_type, pattern.method()),
                    ..c
                });
            }
        }

        None
    }

    fn match_pattern(
        &self,
        pattern: DatePattern,
        text: &str,
        document_type: DocumentType,
        today: NaiveDate,
    ) -> Option<Candidate> {
        let candidate = |year, month, day| {
            Some(Candidate {
                year,
                month,
                day,
                method: String::new(),
            })
        };

        match pattern {
            DatePattern::DdMonYyyy => {
                let caps = self.dd_mon_yyyy_re.captures(text)?;
                candidate(
                    caps[3].parse().ok()?,
                    month_number(&caps[2])?,
                    caps[1].parse().ok()?,
                )
            }
            DatePattern::Iso => {
                let caps = self.iso_re.captures(text)?;
                candidate(
                    caps[1].parse().ok()?,
                    caps[2].parse().ok()?,
                    caps[3].parse().ok()?,
                )
            }
            DatePattern::Slash => {
                let caps = self.slash_re.captures(text)?;
                let a: u32 = caps[1].parse().ok()?;
                let b: u32 = caps[2].parse().ok()?;
                let year: i32 = caps[3].parse().ok()?;
                // US licenses print MM/DD; elsewhere DD/MM. When the first
                // component cannot be a month the interpretation flips.
                let (month, day) = match document_type {
                    DocumentType::DriversLicense if a <= 12 => (a, b),
                    _ => (b, a),
                };
                candidate(year, month, day)
            }
            DatePattern::Dotted => {
                let caps = self.dotted_re.captures(text)?;
                candidate(caps[3].parse().ok()?, caps[2].parse().ok()?, caps[1].parse().ok()?)
            }
            DatePattern::MrzYymmdd => {
                let caps = self.mrz_re.captures(text)?;
                let yy: i32 = caps[1].parse().ok()?;
                // Two-digit year pivot: years beyond the current two-digit
                // year belong to the previous century.
                let year = if yy > today.year() % 100 {
                    1900 + yy
                } else {
                    2000 + yy
                };
                candidate(year, caps[2].parse().ok()?, caps[3].parse().ok()?)
            }
        }
    }
}

/// Whole years between `birth` and `today`: year difference, minus one when
/// today's month/day precedes the birth month/day. Matches the convention
/// used for registration-age checks.
pub fn age_in_years(birth: NaiveDate, today: NaiveDate) -> u32 {
    let mut age = today.year() - birth.year();
    if (today.month(), today.day()) < (birth.month(), birth.day()) {
        age -= 1;
    }
    age.max(0) as u32
}

fn month_number(abbrev: &str) -> Option<u32> {
    match abbrev {
        "JAN" => Some(1),
        "FEB" => Some(2),
        "MAR" => Some(3),
        "APR" => Some(4),
        "MAY" => Some(5),
        "JUN" => Some(6),
        "JUL" => Some(7),
        "AUG" => Some(8),
        "SEP" => Some(9),
        "OCT" => Some(10),
        "NOV" => Some(11),
        "DEC" => Some(12),
        _ => None,
    }
}
