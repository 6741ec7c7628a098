//! Text-to-speech returning a hosted audio URL.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use voxrelay_core::config::TtsConfig;
use voxrelay_core::error::{Result, VoxRelayError};

const DEFAULT_BASE_URL: &str = "https://api.murf.ai";

/// Voice selection for one synthesis call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VoiceConfig {
    #[serde(rename = "voiceId")]
    pub voice_id: String,

    /// Delivery style (e.g. "Narration").
    #[serde(skip_serializing_if = "Option::is_none")]
    pub style: Option<String>,

    /// Target pronunciation locale for multi-native voices (e.g. "en-US").
    #[serde(rename = "multiNativeLocale", skip_serializing_if = "Option::is_none")]
    pub locale: Option<String>,
}

impl VoiceConfig {
    pub fn new(voice_id: impl Into<String>) -> Self {
        Self {
            voice_id: voice_id.into(),
            style: None,
            locale: None,
        }
    }

    pub fn with_style(mut self, style: impl Into<String>) -> Self {
        self.style = Some(style.into());
        self
    }

    pub fn with_locale(mut self, locale: impl Into<String>) -> Self {
        self.locale = Some(locale.into());
        self
    }
}

/// Text-to-speech provider.
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    fn provider_name(&self) -> &str;

    /// Synthesize `text` and return a URL to the generated audio.
    async fn synthesize(&self, text: &str, voice: &VoiceConfig) -> Result<String>;
}

pub struct MurfSynthesizer {
    base_url: String,
    config: TtsConfig,
    client: reqwest::Client,
}

#[derive(Debug, Serialize)]
struct MurfRequest<'a> {
    #[serde(flatten)]
    voice: &'a VoiceConfig,
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct MurfResponse {
    #[serde(rename = "audioFile", default)]
    audio_file: Option<String>,
}

impl MurfSynthesizer {
    pub fn new(config: TtsConfig) -> Self {
        Self {
            base_url: config
                .base_url
                .as_deref()
                .unwrap_or(DEFAULT_BASE_URL)
                .trim_end_matches('/')
                .to_string(),
            config,
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl SpeechSynthesizer for MurfSynthesizer {
    fn provider_name(&self) -> &str {
        "murf"
    }

    async fn synthesize(&self, text: &str, voice: &VoiceConfig) -> Result<String> {
        let api_key = self
            .config
            .resolve_api_key()
            .ok_or_else(|| VoxRelayError::Synthesis("No TTS API key configured".into()))?;

        debug!(voice = %voice.voice_id, text_len = text.len(), "Requesting speech synthesis");

        let resp = self
            .client
            .post(format!("{}/v1/speech/generate", self.base_url))
            .header("api-key", &api_key)
            .header("Content-Type", "application/json")
            .timeout(self.config.timeout())
            .json(&MurfRequest { voice, text })
            .send()
            .await
            .map_err(|e| VoxRelayError::Synthesis(e.to_string()))?;

        // The raw body is the error detail callers surface verbatim.
        if !resp.status().is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(VoxRelayError::Synthesis(body));
        }

        let parsed: MurfResponse = resp
            .json()
            .await
            .map_err(|e| VoxRelayError::Synthesis(e.to_string()))?;

        let audio_url = parsed
            .audio_file
            .ok_or_else(|| VoxRelayError::Synthesis("response has no audioFile".into()))?;

        info!(voice = %voice.voice_id, "Speech synthesized");
        Ok(audio_url)
    }
}
