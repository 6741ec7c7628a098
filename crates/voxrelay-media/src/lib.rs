//! Speech adapters for speech-to-text and text-to-speech over HTTP providers.

pub mod stt;
pub mod tts;

pub use stt::{AssemblyAiTranscriber, SpeechToText};
pub use tts::{MurfSynthesizer, SpeechSynthesizer, VoiceConfig};
