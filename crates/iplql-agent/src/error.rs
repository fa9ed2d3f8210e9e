use thiserror::Error;

/// Failure of the language model call itself
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("OpenAI request failed: {0}")]
    OpenAi(#[from] async_openai::error::OpenAIError),

    #[error("No response from the language model")]
    EmptyResponse,

    #[error("The language model refused the request: {0}")]
    Refusal(String),

    #[error("{0}")]
    Other(String),
}

#[derive(Debug, Error)]
pub enum TranslationError {
    #[error("Invalid translation request: {0}")]
    InvalidRequest(String),

    #[error("Language model call failed: {0}")]
    Model(#[from] ModelError),

    #[error("Malformed model output: {reason}. Response: {content}")]
    Malformed { reason: String, content: String },
}
