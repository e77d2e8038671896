//! Pipeline run state machine and the events it emits.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

use super::extraction::ExtractionFailure;
use super::record::VerificationRecord;

/// States of one pipeline run. Transitions are one-directional; a run is
/// discarded after reaching a terminal state and a new submission always
/// starts a fresh instance.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum RunState {
    Idle,
    Validating,
    Analyzing,
    Classifying,
    Extracting,
    Succeeded,
    FallbackNoAge,
    Rejected,
    Failed,
}

impl RunState {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            RunState::Succeeded | RunState::FallbackNoAge | RunState::Rejected | RunState::Failed
        )
    }
}

impl Display for RunState {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            RunState::Idle => write!(f, "idle"),
            RunState::Validating => write!(f, "validating"),
            RunState::Analyzing => write!(f, "analyzing"),
            RunState::Classifying => write!(f, "classifying"),
            RunState::Extracting => write!(f, "extracting"),
            RunState::Succeeded => write!(f, "succeeded"),
            RunState::FallbackNoAge => write!(f, "fallback_no_age"),
            RunState::Rejected => write!(f, "rejected"),
            RunState::Failed => write!(f, "failed"),
        }
    }
}

impl FromStr for RunState {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "idle" => Ok(RunState::Idle),
            "validating" => Ok(RunState::Validating),
            "analyzing" => Ok(RunState::Analyzing),
            "classifying" => Ok(RunState::Classifying),
            "extracting" => Ok(RunState::Extracting),
            "succeeded" => Ok(RunState::Succeeded),
            "fallback_no_age" => Ok(RunState::FallbackNoAge),
            "rejected" => Ok(RunState::Rejected),
            "failed" => Ok(RunState::Failed),
            _ => Err(anyhow::anyhow!("Invalid run state: {}", s)),
        }
    }
}

/// State-specific payload attached to a run event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RunPayload {
    None,
    /// Upload gate or classifier rejection, user-correctable.
    Rejection {
        reason: String,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        details: Vec<String>,
    },
    /// System-side processing failure, "try again later" territory.
    ProcessingError { message: String },
    /// Extraction fell back; registration may proceed without an age claim.
    Fallback { failure: ExtractionFailure },
    /// Terminal artifact of a successful run.
    Record { record: VerificationRecord },
}

/// One state-transition event, streamed to the UI-facing collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunEvent {
    pub state: RunState,
    pub payload: RunPayload,
}

impl RunEvent {
    pub fn entered(state: RunState) -> Self {
        Self {
            state,
            payload: RunPayload::None,
        }
    }

    pub fn rejected(reason: impl Into<String>, details: Vec<String>) -> Self {
        Self {
            state: RunState::Rejected,
            payload: RunPayload::Rejection {
                reason: reason.into(),
                details,
            },
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            state: RunState::Failed,
            payload: RunPayload::ProcessingError {
                message: message.into(),
            },
        }
    }

    pub fn fallback(failure: ExtractionFailure) -> Self {
        Self {
            state: RunState::FallbackNoAge,
            payload: RunPayload::Fallback { failure },
        }
    }

    pub fn succeeded(record: VerificationRecord) -> Self {
        Self {
            state: RunState::Succeeded,
            payload: RunPayload::Record { record },
        }
    }
}
