//! Gateway shared state.

use std::sync::Arc;

use voxrelay_agent::VoiceAgent;
use voxrelay_core::config::Config;
use voxrelay_core::session::SessionStore;

/// Shared state handed to every request handler.
pub struct GatewayState {
    pub config: Arc<Config>,
    pub agent: Arc<VoiceAgent>,
    pub sessions: Arc<dyn SessionStore>,
}

impl GatewayState {
    pub fn new(config: Arc<Config>, agent: Arc<VoiceAgent>) -> Self {
        let sessions = agent.sessions().clone();
        Self {
            config,
            agent,
            sessions,
        }
    }
}
