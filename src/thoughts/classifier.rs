use async_trait::async_trait;

use crate::db::models::ResearchReport;
use crate::inference::{InferenceClient, InferenceError};

/// Text-classification capability consumed by the thought pipeline.
/// Implemented by [`InferenceClient`]; tests inject fakes.
#[async_trait]
pub trait ThoughtClassifier: Send + Sync {
    /// `true` when the text is a reminder, `false` when it is a research item.
    async fn classify_reminder(&self, text: &str) -> Result<bool, InferenceError>;

    async fn generate_research(&self, query: &str) -> Result<ResearchReport, InferenceError>;
}

#[async_trait]
impl ThoughtClassifier for InferenceClient {
    async fn classify_reminder(&self, text: &str) -> Result<bool, InferenceError> {
        InferenceClient::classify_reminder(self, text).await
    }

    async fn generate_research(&self, query: &str) -> Result<ResearchReport, InferenceError> {
        InferenceClient::generate_research(self, query).await
    }
}
