//! Speech-to-text from uploaded audio bytes.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, info, trace};

use voxrelay_core::config::TranscriptionConfig;
use voxrelay_core::error::{Result, VoxRelayError};

const DEFAULT_BASE_URL: &str = "https://api.assemblyai.com";

/// Speech-to-text provider.
#[async_trait]
pub trait SpeechToText: Send + Sync {
    /// Provider name for logs.
    fn provider_name(&self) -> &str;

    /// Transcribe an audio payload in whatever container the provider accepts.
    ///
    /// Fails with `Transcription` on provider errors and `EmptyTranscript`
    /// when nothing was recognised.
    async fn transcribe(&self, audio: &[u8]) -> Result<String>;
}

/// AssemblyAI transcriber: upload, submit, then poll until done.
pub struct AssemblyAiTranscriber {
    base_url: String,
    config: TranscriptionConfig,
    client: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    upload_url: String,
}

#[derive(Debug, Deserialize)]
struct TranscriptResponse {
    id: String,
    status: String,
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

impl AssemblyAiTranscriber {
    pub fn new(config: TranscriptionConfig) -> Self {
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

    async fn read_json<T: serde::de::DeserializeOwned>(resp: reqwest::Response) -> Result<T> {
        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(VoxRelayError::Transcription(format!(
                "AssemblyAI API error {status}: {body}"
            )));
        }
        resp.json()
            .await
            .map_err(|e| VoxRelayError::Transcription(format!("invalid AssemblyAI response: {e}")))
    }
}

fn transport(e: reqwest::Error) -> VoxRelayError {
    VoxRelayError::Transcription(e.to_string())
}

#[async_trait]
impl SpeechToText for AssemblyAiTranscriber {
    fn provider_name(&self) -> &str {
        "assemblyai"
    }

    async fn transcribe(&self, audio: &[u8]) -> Result<String> {
        let api_key = self.config.resolve_api_key().ok_or_else(|| {
            VoxRelayError::Transcription("No transcription API key configured".into())
        })?;

        debug!(audio_bytes = audio.len(), "Uploading audio for transcription");

        let resp = self
            .client
            .post(format!("{}/v2/upload", self.base_url))
            .header("authorization", &api_key)
            .header("content-type", "application/octet-stream")
            .body(audio.to_vec())
            .send()
            .await
            .map_err(transport)?;
        let upload: UploadResponse = Self::read_json(resp).await?;

        let resp = self
            .client
            .post(format!("{}/v2/transcript", self.base_url))
            .header("authorization", &api_key)
            .json(&json!({ "audio_url": upload.upload_url }))
            .send()
            .await
            .map_err(transport)?;
        let mut transcript: TranscriptResponse = Self::read_json(resp).await?;

        let poll_url = format!("{}/v2/transcript/{}", self.base_url, transcript.id);
        loop {
            match transcript.status.as_str() {
                "completed" => break,
                "error" => {
                    return Err(VoxRelayError::Transcription(
                        transcript
                            .error
                            .unwrap_or_else(|| "transcription failed".into()),
                    ));
                }
                status => trace!(id = %transcript.id, status, "Transcript pending"),
            }

            tokio::time::sleep(self.config.poll_interval()).await;

            let resp = self
                .client
                .get(&poll_url)
                .header("authorization", &api_key)
                .send()
                .await
                .map_err(transport)?;
            transcript = Self::read_json(resp).await?;
        }

        let text = transcript.text.unwrap_or_default();
        if text.is_empty() {
            return Err(VoxRelayError::EmptyTranscript);
        }

        info!(id = %transcript.id, chars = text.len(), "Audio transcribed");
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use axum::{
        body::Bytes,
        http::{HeaderMap, StatusCode},
        routing::{get, post},
        Json, Router,
    };

    async fn spawn_mock(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{addr}")
    }

    fn transcriber_for(base_url: String) -> AssemblyAiTranscriber {
        AssemblyAiTranscriber::new(TranscriptionConfig {
            api_key: Some("test-key".into()),
            api_key_env: None,
            base_url: Some(base_url),
            poll_interval_ms: Some(10),
        })
    }

    /// Mock that accepts the upload and reports `final_status` after one poll.
    fn mock_provider(final_body: serde_json::Value, polls: Arc<AtomicUsize>) -> Router {
        Router::new()
            .route(
                "/v2/upload",
                post(|headers: HeaderMap, body: Bytes| async move {
                    assert_eq!(headers["authorization"], "test-key");
                    assert_eq!(&body[..], b"RIFF-fake-audio");
                    Json(json!({ "upload_url": "https://cdn.assemblyai.test/abc" }))
                }),
            )
            .route(
                "/v2/transcript",
                post(|Json(body): Json<serde_json::Value>| async move {
                    assert_eq!(body["audio_url"], "https://cdn.assemblyai.test/abc");
                    Json(json!({ "id": "t-1", "status": "queued" }))
                }),
            )
            .route(
                "/v2/transcript/{id}",
                get(move || {
                    let polls = polls.clone();
                    let final_body = final_body.clone();
                    async move {
                        if polls.fetch_add(1, Ordering::SeqCst) == 0 {
                            Json(json!({ "id": "t-1", "status": "processing" }))
                        } else {
                            Json(final_body)
                        }
                    }
                }),
            )
    }

    #[tokio::test]
    async fn test_transcribe_polls_until_completed() {
        let polls = Arc::new(AtomicUsize::new(0));
        let router = mock_provider(
            json!({ "id": "t-1", "status": "completed", "text": "Hello" }),
            polls.clone(),
        );
        let stt = transcriber_for(spawn_mock(router).await);

        let text = stt.transcribe(b"RIFF-fake-audio").await.unwrap();
        assert_eq!(text, "Hello");
        assert_eq!(polls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_empty_text_is_empty_transcript() {
        let router = mock_provider(
            json!({ "id": "t-1", "status": "completed", "text": "" }),
            Arc::new(AtomicUsize::new(0)),
        );
        let stt = transcriber_for(spawn_mock(router).await);

        let err = stt.transcribe(b"RIFF-fake-audio").await.unwrap_err();
        assert!(matches!(err, VoxRelayError::EmptyTranscript));
    }

    #[tokio::test]
    async fn test_provider_error_status() {
        let router = mock_provider(
            json!({ "id": "t-1", "status": "error", "error": "Audio file is corrupt" }),
            Arc::new(AtomicUsize::new(0)),
        );
        let stt = transcriber_for(spawn_mock(router).await);

        let err = stt.transcribe(b"RIFF-fake-audio").await.unwrap_err();
        assert_eq!(err.detail(), "Audio file is corrupt");
    }

    #[tokio::test]
    async fn test_upload_rejected() {
        let router = Router::new().route(
            "/v2/upload",
            post(|| async { (StatusCode::UNAUTHORIZED, "Invalid API key") }),
        );
        let stt = transcriber_for(spawn_mock(router).await);

        let err = stt.transcribe(b"RIFF-fake-audio").await.unwrap_err();
        assert_eq!(err.kind(), "transcription");
        assert!(err.detail().contains("Invalid API key"));
    }

    #[tokio::test]
    async fn test_missing_api_key() {
        let stt = AssemblyAiTranscriber::new(TranscriptionConfig {
            api_key: None,
            api_key_env: Some("NONEXISTENT_VR_ASSEMBLY_KEY".into()),
            base_url: None,
            poll_interval_ms: None,
        });
        let err = stt.transcribe(b"audio").await.unwrap_err();
        assert!(err.detail().contains("No transcription API key"));
    }
}
