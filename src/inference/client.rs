//! Request/response wrapper around the remote chat-completion endpoint.
//!
//! Single attempt per call, no retry. Three modes share one transport:
//! the vision screen analyzer, the reminder/research text classifier and
//! the research report generator.

use std::time::Duration;

use base64::{engine::general_purpose, Engine as _};
use log::warn;
use reqwest::Client;

use super::error::InferenceError;
use super::prompts::{REMINDER_CLASSIFIER_PROMPT, RESEARCH_PROMPT, SCREEN_ANALYSIS_PROMPT};
use super::types::{
    strip_code_fences, ChatMessage, ChatRequest, ChatResponse, ReminderVerdict, ScreenContext,
};
use crate::db::models::ResearchReport;

/// Ceiling for the vision path; screenshots push large payloads through
/// slow local models.
const VISION_TIMEOUT: Duration = Duration::from_secs(120);

#[derive(Debug, Clone)]
pub struct InferenceConfig {
    pub base_url: String,
    pub api_token: String,
    pub classifier_model: String,
    pub research_model: String,
    pub vision_model: String,
    /// Sent as the `user` field on every request.
    pub client_tag: String,
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.helmholtz-blablador.fz-juelich.de/v1".into(),
            api_token: String::new(),
            classifier_model: "alias-fast".into(),
            research_model: "alias-large".into(),
            vision_model: "alias-vision".into(),
            client_tag: "desktop-client".into(),
        }
    }
}

impl InferenceConfig {
    /// Reads endpoint overrides from the environment, falling back to the
    /// defaults. The token has no default; an empty token still sends the
    /// request and surfaces as a `Request` failure.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(url) = std::env::var("FLOWBUDDY_API_BASE") {
            config.base_url = url.trim_end_matches('/').to_string();
        }
        if let Ok(token) = std::env::var("FLOWBUDDY_API_TOKEN") {
            config.api_token = token;
        }
        config
    }
}

pub struct InferenceClient {
    client: Client,
    config: InferenceConfig,
}

impl InferenceClient {
    pub fn new(config: InferenceConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    /// Classifies a downsampled screenshot as work or distraction.
    pub async fn analyze_screen(&self, jpeg_bytes: &[u8]) -> Result<ScreenContext, InferenceError> {
        let image_base64 = general_purpose::STANDARD.encode(jpeg_bytes);

        let request = ChatRequest {
            model: self.config.vision_model.clone(),
            messages: vec![ChatMessage::user_with_image(
                SCREEN_ANALYSIS_PROMPT,
                image_base64,
            )],
            temperature: 0.0,
            top_p: 1.0,
            top_k: -1,
            n: 1,
            max_tokens: 256,
            stop: None,
            stream: false,
            presence_penalty: 0.0,
            frequency_penalty: 0.0,
            user: self.config.client_tag.clone(),
            seed: Some(42),
        };

        let content = self.chat(request, Some(VISION_TIMEOUT)).await?;
        let context: ScreenContext = serde_json::from_str(strip_code_fences(&content))?;
        Ok(context)
    }

    /// Binary reminder-vs-research classification of captured text.
    pub async fn classify_reminder(&self, text: &str) -> Result<bool, InferenceError> {
        let request = ChatRequest {
            model: self.config.classifier_model.clone(),
            messages: vec![
                ChatMessage::system(REMINDER_CLASSIFIER_PROMPT),
                ChatMessage::user(text),
            ],
            temperature: 0.1,
            top_p: 1.0,
            top_k: -1,
            n: 1,
            max_tokens: 50,
            stop: None,
            stream: false,
            presence_penalty: 0.0,
            frequency_penalty: 0.0,
            user: self.config.client_tag.clone(),
            seed: Some(42),
        };

        let content = self.chat(request, None).await?;
        let verdict: ReminderVerdict = serde_json::from_str(strip_code_fences(&content))?;
        Ok(verdict.is_reminder)
    }

    /// Generates a research report for an offloaded thought.
    pub async fn generate_research(&self, query: &str) -> Result<ResearchReport, InferenceError> {
        let request = ChatRequest {
            model: self.config.research_model.clone(),
            messages: vec![
                ChatMessage::system(RESEARCH_PROMPT),
                ChatMessage::user(query),
            ],
            temperature: 0.7,
            top_p: 1.0,
            top_k: -1,
            n: 1,
            max_tokens: 5000,
            stop: None,
            stream: false,
            presence_penalty: 0.0,
            frequency_penalty: 0.0,
            user: self.config.client_tag.clone(),
            seed: Some(42),
        };

        let content = self.chat(request, None).await?;
        let mut report: ResearchReport = serde_json::from_str(strip_code_fences(&content))?;
        // The prompt asks for at most 5 action items; enforce it regardless
        // of what the model returns.
        report.action_items.truncate(5);
        Ok(report)
    }

    async fn chat(
        &self,
        request: ChatRequest,
        timeout: Option<Duration>,
    ) -> Result<String, InferenceError> {
        let url = format!("{}/chat/completions", self.config.base_url);

        let mut builder = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.config.api_token))
            .json(&request);
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        let response = builder.send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!("inference endpoint returned {status}: {body}");
            return Err(InferenceError::Request { status });
        }

        let body = response.text().await?;
        let parsed: ChatResponse = serde_json::from_str(&body)?;
        let choice = parsed
            .choices
            .into_iter()
            .next()
            .ok_or(InferenceError::EmptyChoices)?;

        Ok(choice.message.content)
    }
}
