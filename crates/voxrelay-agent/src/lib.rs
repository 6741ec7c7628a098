//! Voice agent. Sequences transcription, generation and synthesis for one
//! turn of a conversation.
//!
//! The chat pipeline never fails outright: every stage error is mapped to a
//! fixed reply plus the fallback audio URL, so callers always get something
//! playable back. The echo and direct-synthesis pipelines return errors as-is.

use serde::Serialize;

pub mod pipeline;

pub use pipeline::VoiceAgent;

pub const HEARING_TROUBLE: &str = "I'm having trouble hearing you right now.";
pub const THINKING_TROUBLE: &str = "I'm having trouble thinking right now.";
pub const GENERIC_FAILURE: &str = "Something went wrong. Please try again later.";
pub const NO_TRANSCRIPT: &str = "Could not transcribe audio.";

/// How far a chat turn got before it returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnOutcome {
    Completed,
    TranscriptionFailed,
    GenerationFailed,
    SynthesisFailed,
    TotalFailure,
}

impl TurnOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            TurnOutcome::Completed => "completed",
            TurnOutcome::TranscriptionFailed => "transcription_failed",
            TurnOutcome::GenerationFailed => "generation_failed",
            TurnOutcome::SynthesisFailed => "synthesis_failed",
            TurnOutcome::TotalFailure => "total_failure",
        }
    }
}

/// Reply body of the chat endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatReply {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transcription: Option<String>,
    pub llm_response: String,
    pub audio_url: String,
    #[serde(skip)]
    pub outcome: TurnOutcome,
}

impl ChatReply {
    /// Reply for a failure outside the three pipeline stages, e.g. an
    /// unreadable upload.
    pub fn total_failure(error: impl Into<String>, fallback_audio_url: &str) -> Self {
        Self {
            error: Some(error.into()),
            transcription: None,
            llm_response: GENERIC_FAILURE.to_string(),
            audio_url: fallback_audio_url.to_string(),
            outcome: TurnOutcome::TotalFailure,
        }
    }
}

/// Reply body of the echo endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EchoReply {
    pub transcription: String,
    pub audio_url: String,
}
