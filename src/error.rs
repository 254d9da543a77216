//! Error types for the dost chat pipeline.

/// Top-level error type for the chat companion.
#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    /// Configuration error (including missing provider credentials).
    #[error("config error: {0}")]
    Config(String),

    /// Language model provider error.
    #[error("LLM error: {0}")]
    Llm(String),

    /// Voice input (speech recognition) error.
    #[error("voice input error: {0}")]
    VoiceInput(String),

    /// Voice output (speech synthesis) error.
    #[error("voice output error: {0}")]
    VoiceOutput(String),

    /// Channel send/receive error.
    #[error("channel error: {0}")]
    Channel(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience result type.
pub type Result<T> = std::result::Result<T, ChatError>;
