//! Language model provider abstraction.
//!
//! Each provider implements the [`LlmProvider`] trait: given the full turn
//! history of a session, produce the assistant's next reply.

use async_trait::async_trait;

use voxrelay_core::error::Result;
use voxrelay_core::session::Turn;

#[cfg(feature = "google")]
pub mod google;

#[cfg(feature = "google")]
pub use google::GeminiProvider;

/// The core language model provider trait.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Provider identifier (e.g., "google").
    fn id(&self) -> &str;

    /// Model every request is sent to.
    fn model(&self) -> &str;

    /// Generate a reply to the conversation so far.
    ///
    /// Fails with `VoxRelayError::Generation` on any provider error.
    async fn generate(&self, conversation: &[Turn]) -> Result<String>;
}

/// Flatten a conversation into a single prompt.
///
/// One `"<Role>: <content>"` line per turn, in order. Nothing is dropped, so
/// the prompt grows with the session.
pub fn format_conversation(turns: &[Turn]) -> String {
    turns
        .iter()
        .map(|t| format!("{}: {}", t.role.label(), t.content))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_conversation_labels_and_order() {
        let turns = vec![
            Turn::user("Hello"),
            Turn::assistant("Hi there!"),
            Turn::user("What's the weather?"),
        ];
        assert_eq!(
            format_conversation(&turns),
            "User: Hello\nAssistant: Hi there!\nUser: What's the weather?"
        );
    }

    #[test]
    fn test_format_conversation_single_and_empty() {
        assert_eq!(format_conversation(&[Turn::user("Hello")]), "User: Hello");
        assert_eq!(format_conversation(&[]), "");
    }

    #[test]
    fn test_format_conversation_keeps_multiline_content() {
        let turns = vec![Turn::assistant("line one\nline two")];
        assert_eq!(format_conversation(&turns), "Assistant: line one\nline two");
    }
}
