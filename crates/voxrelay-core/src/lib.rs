//! Core config, errors, and session model for VoxRelay.

pub mod config;
pub mod error;
pub mod session;
pub mod session_store;
