//! HTTP handlers.
//!
//! Pipeline endpoints always answer 200; failures are reported in the body.

use std::sync::Arc;

use axum::{
    extract::{multipart::MultipartRejection, Multipart, Path, State},
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, warn};

#[cfg(feature = "metrics")]
use voxrelay_agent::TurnOutcome;
use voxrelay_agent::{ChatReply, NO_TRANSCRIPT};
use voxrelay_core::error::{Result, VoxRelayError};

use crate::state::GatewayState;

/// Multipart field carrying the recorded audio.
const UPLOAD_FIELD: &str = "file";

#[derive(Debug, Deserialize)]
pub struct GenerateVoiceRequest {
    pub text: String,
}

/// `GET /health`
pub async fn health(State(state): State<Arc<GatewayState>>) -> Json<Value> {
    let sessions = state.sessions.session_count().await;
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "sessions": sessions,
    }))
}

/// `POST /generate-voice`
pub async fn generate_voice(
    State(state): State<Arc<GatewayState>>,
    Json(req): Json<GenerateVoiceRequest>,
) -> Json<Value> {
    #[cfg(feature = "metrics")]
    let start = std::time::Instant::now();

    let body = match state.agent.generate_voice(&req.text).await {
        Ok(audio_url) => json!({ "audio_url": audio_url }),
        Err(e) => {
            warn!(kind = e.kind(), error = %e, "Voice generation failed");
            #[cfg(feature = "metrics")]
            crate::metrics::record_stage_failure("/generate-voice", e.kind());
            json!({ "error": e.detail() })
        }
    };

    #[cfg(feature = "metrics")]
    crate::metrics::record_request("/generate-voice", start.elapsed().as_secs_f64());

    Json(body)
}

/// `POST /echo`
pub async fn echo(
    State(state): State<Arc<GatewayState>>,
    multipart: std::result::Result<Multipart, MultipartRejection>,
) -> Json<Value> {
    #[cfg(feature = "metrics")]
    let start = std::time::Instant::now();

    let result = match read_upload(multipart).await {
        Ok(audio) => state.agent.echo(&audio).await,
        Err(e) => Err(e),
    };

    let body = match result {
        Ok(reply) => json!(reply),
        Err(e) => {
            warn!(kind = e.kind(), error = %e, "Echo failed");
            #[cfg(feature = "metrics")]
            crate::metrics::record_stage_failure("/echo", e.kind());
            match e {
                VoxRelayError::EmptyTranscript => json!({ "error": NO_TRANSCRIPT }),
                other => json!({ "error": other.detail() }),
            }
        }
    };

    #[cfg(feature = "metrics")]
    crate::metrics::record_request("/echo", start.elapsed().as_secs_f64());

    Json(body)
}

/// `POST /agent/chat/{session_id}`
pub async fn agent_chat(
    State(state): State<Arc<GatewayState>>,
    Path(session_id): Path<String>,
    multipart: std::result::Result<Multipart, MultipartRejection>,
) -> Json<ChatReply> {
    #[cfg(feature = "metrics")]
    let start = std::time::Instant::now();

    let reply = match read_upload(multipart).await {
        Ok(audio) => state.agent.chat(&session_id, &audio).await,
        Err(e) => {
            warn!(session = %session_id, kind = e.kind(), error = %e, "Chat upload unreadable");
            ChatReply::total_failure(e.detail(), state.agent.fallback_audio_url())
        }
    };

    #[cfg(feature = "metrics")]
    {
        if reply.outcome != TurnOutcome::Completed {
            crate::metrics::record_stage_failure("/agent/chat", reply.outcome.as_str());
        }
        crate::metrics::record_request("/agent/chat", start.elapsed().as_secs_f64());
    }

    Json(reply)
}

/// Read the bytes of the `file` field, skipping any other fields.
async fn read_upload(
    multipart: std::result::Result<Multipart, MultipartRejection>,
) -> Result<Vec<u8>> {
    let mut multipart =
        multipart.map_err(|e| VoxRelayError::Upload(format!("multipart error: {e}")))?;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| VoxRelayError::Upload(format!("multipart error: {e}")))?
    {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }
        let filename = field.file_name().map(str::to_string);
        let data = field
            .bytes()
            .await
            .map_err(|e| VoxRelayError::Upload(format!("multipart error: {e}")))?;
        debug!(filename = ?filename, bytes = data.len(), "Received upload");
        return Ok(data.to_vec());
    }

    Err(VoxRelayError::Upload("no file provided".to_string()))
}
