//! The turn pipeline: transcribe → generate → synthesize.

use std::sync::Arc;

use tracing::{info, warn};

use voxrelay_core::error::Result;
use voxrelay_core::session::{SessionStore, Turn};
use voxrelay_media::{SpeechSynthesizer, SpeechToText, VoiceConfig};
use voxrelay_providers::LlmProvider;

use crate::{ChatReply, EchoReply, TurnOutcome, HEARING_TROUBLE, THINKING_TROUBLE};

/// Owns the three adapters and the session store.
pub struct VoiceAgent {
    stt: Arc<dyn SpeechToText>,
    llm: Arc<dyn LlmProvider>,
    tts: Arc<dyn SpeechSynthesizer>,
    sessions: Arc<dyn SessionStore>,
    fallback_audio_url: String,
}

impl VoiceAgent {
    pub fn new(
        stt: Arc<dyn SpeechToText>,
        llm: Arc<dyn LlmProvider>,
        tts: Arc<dyn SpeechSynthesizer>,
        sessions: Arc<dyn SessionStore>,
        fallback_audio_url: impl Into<String>,
    ) -> Self {
        Self {
            stt,
            llm,
            tts,
            sessions,
            fallback_audio_url: fallback_audio_url.into(),
        }
    }

    pub fn fallback_audio_url(&self) -> &str {
        &self.fallback_audio_url
    }

    pub fn sessions(&self) -> &Arc<dyn SessionStore> {
        &self.sessions
    }

    /// Run one chat turn for `session_id`.
    ///
    /// A transcription or generation failure ends the turn early with a fixed
    /// reply. A synthesis failure only swaps in the fallback audio. The
    /// assistant turn is recorded before synthesis and is kept either way.
    pub async fn chat(&self, session_id: &str, audio: &[u8]) -> ChatReply {
        let user_text = match self.stt.transcribe(audio).await {
            Ok(text) => text,
            Err(e) => {
                warn!(session = session_id, kind = e.kind(), error = %e, "Transcription failed");
                return self.degraded(String::new(), HEARING_TROUBLE, TurnOutcome::TranscriptionFailed);
            }
        };

        self.sessions.append(session_id, Turn::user(&user_text)).await;
        let history = self.sessions.get_or_create(session_id).await;

        let reply = match self.llm.generate(&history).await {
            Ok(reply) => reply,
            Err(e) => {
                warn!(
                    session = session_id,
                    model = self.llm.model(),
                    kind = e.kind(),
                    error = %e,
                    "Generation failed"
                );
                return self.degraded(user_text, THINKING_TROUBLE, TurnOutcome::GenerationFailed);
            }
        };

        self.sessions.append(session_id, Turn::assistant(&reply)).await;

        let voice = VoiceConfig::new("it-IT-giorgio")
            .with_style("Narration")
            .with_locale("en-US");
        let (audio_url, outcome) = match self.tts.synthesize(&reply, &voice).await {
            Ok(url) => (url, TurnOutcome::Completed),
            Err(e) => {
                warn!(session = session_id, kind = e.kind(), error = %e, "Synthesis failed");
                (self.fallback_audio_url.clone(), TurnOutcome::SynthesisFailed)
            }
        };

        info!(
            session = session_id,
            outcome = outcome.as_str(),
            "Chat turn finished"
        );

        ChatReply {
            error: None,
            transcription: Some(user_text),
            llm_response: reply,
            audio_url,
            outcome,
        }
    }

    fn degraded(&self, transcription: String, message: &str, outcome: TurnOutcome) -> ChatReply {
        ChatReply {
            error: None,
            transcription: Some(transcription),
            llm_response: message.to_string(),
            audio_url: self.fallback_audio_url.clone(),
            outcome,
        }
    }

    /// Synthesize `text` directly, no session involved.
    pub async fn generate_voice(&self, text: &str) -> Result<String> {
        let voice = VoiceConfig::new("en-US-miles");
        self.tts.synthesize(text, &voice).await
    }

    /// Transcribe `audio` and read the transcription back verbatim.
    pub async fn echo(&self, audio: &[u8]) -> Result<EchoReply> {
        let transcription = self.stt.transcribe(audio).await?;
        let voice = VoiceConfig::new("en-US-miles");
        let audio_url = self.tts.synthesize(&transcription, &voice).await?;
        Ok(EchoReply {
            transcription,
            audio_url,
        })
    }
}
