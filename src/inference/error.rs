use thiserror::Error;

/// Failure taxonomy for inference calls. Callers never retry: the scheduler
/// swallows failures until the next tick and the thought pipeline degrades
/// to its keyword fallback.
#[derive(Debug, Error)]
pub enum InferenceError {
    #[error("request transport failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("endpoint returned status {status}")]
    Request { status: reqwest::StatusCode },

    #[error("response contained no choices")]
    EmptyChoices,

    #[error("response content did not match the expected schema: {0}")]
    Decode(#[from] serde_json::Error),
}
