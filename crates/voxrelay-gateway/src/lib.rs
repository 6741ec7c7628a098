//! HTTP gateway for the voice agent.
//!
//! Hosts the JSON/multipart endpoints, the embedded landing page and the
//! static directory that carries the fallback audio.

#[cfg(feature = "metrics")]
pub mod metrics;
pub mod routes;
pub mod server;
pub mod state;

pub use server::{router, start_gateway};
pub use state::GatewayState;
