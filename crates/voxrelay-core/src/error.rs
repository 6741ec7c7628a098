use thiserror::Error;

#[derive(Debug, Error)]
pub enum VoxRelayError {
    #[error("Config error: {0}")]
    Config(String),

    #[error("Transcription error: {0}")]
    Transcription(String),

    #[error("Transcription error: empty transcript")]
    EmptyTranscript,

    #[error("Generation error: {0}")]
    Generation(String),

    #[error("Synthesis error: {0}")]
    Synthesis(String),

    #[error("Upload error: {0}")]
    Upload(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl VoxRelayError {
    /// Stable label for logs and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Config(_) => "config",
            Self::Transcription(_) => "transcription",
            Self::EmptyTranscript => "empty_transcript",
            Self::Generation(_) => "generation",
            Self::Synthesis(_) => "synthesis",
            Self::Upload(_) => "upload",
            Self::Io(_) => "io",
            Self::Json(_) => "json",
            Self::Other(_) => "other",
        }
    }

    /// The provider-facing detail without the variant prefix.
    ///
    /// For `Synthesis` this is the raw response body of a non-success call.
    pub fn detail(&self) -> String {
        match self {
            Self::Config(d)
            | Self::Transcription(d)
            | Self::Generation(d)
            | Self::Synthesis(d)
            | Self::Upload(d) => d.clone(),
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, VoxRelayError>;
