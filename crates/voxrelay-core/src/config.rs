//! Configuration loading and validation.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Top-level VoxRelay configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gateway: Option<GatewayConfig>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub transcription: Option<TranscriptionConfig>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub llm: Option<LlmConfig>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub tts: Option<TtsConfig>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub chat: Option<ChatConfig>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub logging: Option<LoggingConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub bind: Option<String>,

    /// Directory served under `/static` (default: "static").
    #[serde(skip_serializing_if = "Option::is_none")]
    pub static_dir: Option<String>,

    /// Maximum accepted upload size in bytes (default: 25 MiB).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_upload_bytes: Option<usize>,
}

fn default_port() -> u16 {
    8000
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            bind: None,
            static_dir: None,
            max_upload_bytes: None,
        }
    }
}

/// Speech-to-text (AssemblyAI) configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscriptionConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    #[serde(default = "default_transcription_key_env")]
    pub api_key_env: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,

    /// Delay between transcript status polls (default: 3000).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub poll_interval_ms: Option<u64>,
}

fn default_transcription_key_env() -> Option<String> {
    Some("ASSEMBLY_API_KEY".into())
}

impl Default for TranscriptionConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_key_env: default_transcription_key_env(),
            base_url: None,
            poll_interval_ms: None,
        }
    }
}

impl TranscriptionConfig {
    pub fn resolve_api_key(&self) -> Option<String> {
        resolve_secret_field(&self.api_key, &self.api_key_env)
    }

    pub fn poll_interval(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.poll_interval_ms.unwrap_or(3000))
    }
}

/// Language model (Gemini) configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    #[serde(default = "default_llm_key_env")]
    pub api_key_env: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,

    /// Model used for every request (default: "gemini-2.5-flash").
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
}

fn default_llm_key_env() -> Option<String> {
    Some("GEMINI_API_KEY".into())
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_key_env: default_llm_key_env(),
            base_url: None,
            model: None,
        }
    }
}

impl LlmConfig {
    pub fn resolve_api_key(&self) -> Option<String> {
        resolve_secret_field(&self.api_key, &self.api_key_env)
    }

    pub fn model(&self) -> String {
        self.model
            .clone()
            .unwrap_or_else(|| "gemini-2.5-flash".to_string())
    }
}

/// Text-to-speech (Murf) configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TtsConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    #[serde(default = "default_tts_key_env")]
    pub api_key_env: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,

    /// Request timeout in seconds (default: 10).
    #[serde(default = "default_tts_timeout")]
    pub timeout_secs: u64,
}

fn default_tts_key_env() -> Option<String> {
    Some("MURF_API_KEY".into())
}

fn default_tts_timeout() -> u64 {
    10
}

impl Default for TtsConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_key_env: default_tts_key_env(),
            base_url: None,
            timeout_secs: default_tts_timeout(),
        }
    }
}

impl TtsConfig {
    pub fn resolve_api_key(&self) -> Option<String> {
        resolve_secret_field(&self.api_key, &self.api_key_env)
    }

    pub fn timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChatConfig {
    /// Audio returned whenever a chat stage fails (default: "/static/fallback.mp3").
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fallback_audio_url: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log format: "plain" (default) or "json".
    #[serde(default = "default_log_format")]
    pub format: String,

    /// Log level override (trace/debug/info/warn/error).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub level: Option<String>,

    /// Per-crate log level overrides (e.g. "voxrelay_gateway=debug").
    #[serde(default)]
    pub filters: Vec<String>,

    /// Output target: "stderr" (default) or "stdout".
    #[serde(default = "default_log_output")]
    pub output: String,
}

fn default_log_format() -> String {
    "plain".into()
}

fn default_log_output() -> String {
    "stderr".into()
}

/// Resolve a secret: check the direct value first, then the env-var reference.
pub fn resolve_secret_field(direct: &Option<String>, env_var: &Option<String>) -> Option<String> {
    if let Some(val) = direct {
        if !val.is_empty() {
            return Some(val.clone());
        }
    }
    if let Some(env) = env_var {
        if let Ok(val) = std::env::var(env) {
            if !val.is_empty() {
                return Some(val);
            }
        }
    }
    None
}

/// Substitute `${ENV_VAR}` patterns in a string with their environment variable values.
fn substitute_env_vars(input: &str) -> String {
    let re = regex::Regex::new(r"\$\{([^}]+)\}").unwrap();
    re.replace_all(input, |caps: &regex::Captures| {
        let var_name = &caps[1];
        std::env::var(var_name).unwrap_or_default()
    })
    .into_owned()
}

impl Config {
    /// Load config from a JSON5 file, substituting `${ENV_VAR}` references.
    pub fn load(path: &Path) -> crate::error::Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let raw = std::fs::read_to_string(path).map_err(crate::error::VoxRelayError::Io)?;

        let substituted = substitute_env_vars(&raw);

        let config: Config = json5::from_str(&substituted)
            .map_err(|e| crate::error::VoxRelayError::Config(e.to_string()))?;

        Ok(config)
    }

    /// Default config file location.
    pub fn config_path() -> PathBuf {
        data_dir().join("config.json")
    }

    /// Gateway port.
    pub fn gateway_port(&self) -> u16 {
        self.gateway.as_ref().map(|g| g.port).unwrap_or(8000)
    }

    /// Gateway bind address.
    pub fn gateway_bind(&self) -> String {
        self.gateway
            .as_ref()
            .and_then(|g| g.bind.clone())
            .unwrap_or_else(|| "0.0.0.0".to_string())
    }

    /// Directory served under `/static`.
    pub fn static_dir(&self) -> PathBuf {
        let dir = self
            .gateway
            .as_ref()
            .and_then(|g| g.static_dir.as_deref())
            .unwrap_or("static");
        PathBuf::from(shellexpand::tilde(dir).as_ref())
    }

    pub fn max_upload_bytes(&self) -> usize {
        self.gateway
            .as_ref()
            .and_then(|g| g.max_upload_bytes)
            .unwrap_or(25 * 1024 * 1024)
    }

    pub fn fallback_audio_url(&self) -> String {
        self.chat
            .as_ref()
            .and_then(|c| c.fallback_audio_url.clone())
            .unwrap_or_else(|| "/static/fallback.mp3".to_string())
    }

    /// Effective speech-to-text config (defaults when the section is absent).
    pub fn transcription(&self) -> TranscriptionConfig {
        self.transcription.clone().unwrap_or_default()
    }

    /// Effective language model config.
    pub fn llm(&self) -> LlmConfig {
        self.llm.clone().unwrap_or_default()
    }

    /// Effective text-to-speech config.
    pub fn tts(&self) -> TtsConfig {
        self.tts.clone().unwrap_or_default()
    }

    /// Validate config, returning (warnings, errors).
    pub fn validate(&self) -> (Vec<String>, Vec<String>) {
        let mut warnings = Vec::new();
        let mut errors = Vec::new();

        if self.transcription().resolve_api_key().is_none() {
            warnings.push("Transcription provider has no API key configured".to_string());
        }
        if self.llm().resolve_api_key().is_none() {
            warnings.push("Language model provider has no API key configured".to_string());
        }
        if self.tts().resolve_api_key().is_none() {
            warnings.push("TTS provider has no API key configured".to_string());
        }

        let static_dir = self.static_dir();
        if !static_dir.is_dir() {
            warnings.push(format!(
                "Static directory not found: {} (fallback audio will 404)",
                static_dir.display()
            ));
        }

        if let Some(gw) = &self.gateway {
            if gw.port == 0 {
                errors.push("Gateway port cannot be 0".to_string());
            }
        }

        if self.tts().timeout_secs == 0 {
            errors.push("TTS timeout cannot be 0".to_string());
        }

        (warnings, errors)
    }
}

/// Base directory for VoxRelay data: `~/.voxrelay/`
pub fn data_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".voxrelay")
}
