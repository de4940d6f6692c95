use std::path::PathBuf;

/// Errors produced while resolving, generating, or writing speech.
#[derive(thiserror::Error, Debug)]
pub enum TtsError {
    #[error("Input file is empty: {}", .0.display())]
    EmptyInput(PathBuf),
    #[error("Reference audio file not found: {}", .0.display())]
    MissingReferenceAudio(PathBuf),
    #[error("Reference text file not found: {0}")]
    MissingReferenceText(String),
    #[error("Reference transcript is empty")]
    EmptyReferenceText,
    #[error("No audio was generated.")]
    EmptyGeneration,
    #[error("Unknown engine '{0}'. Expected one of: kokoro, qwen3-clone, qwen3-custom")]
    UnknownEngine(String),
    #[error("Invalid generation request: {0}")]
    InvalidRequest(String),
    #[error("Model '{model_id}' not found at {}", .path.display())]
    ModelNotFound { model_id: String, path: PathBuf },
    #[error("Model '{model_id}' does not support {capability}")]
    Unsupported {
        model_id: String,
        capability: &'static str,
    },
    #[error(transparent)]
    Model(Box<dyn std::error::Error + Send + Sync>),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("WAV error: {0}")]
    Wav(#[from] hound::Error),
    #[error("Invalid voice alias file: {0}")]
    AliasFile(#[from] serde_json::Error),
}

impl TtsError {
    /// Wrap an error raised by a model collaborator without altering its message.
    pub fn model<E>(err: E) -> Self
    where
        E: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        TtsError::Model(err.into())
    }
}

pub type Result<T> = std::result::Result<T, TtsError>;
